use super::mesh::Vertex;

/// The prop triangle: one colored triangle standing on the ground plane,
/// apex up, facing -Z after the look-at orientation is applied.
pub fn prop_triangle() -> Vec<Vertex> {
    vec![
        Vertex {
            position: [0.5, 0.0, 0.0],
            color: [1.0, 0.0, 0.0],
        },
        Vertex {
            position: [-0.5, 0.0, 0.0],
            color: [0.0, 1.0, 0.0],
        },
        Vertex {
            position: [0.0, 1.0, 0.0],
            color: [0.0, 0.0, 1.0],
        },
    ]
}

/// The floor: a 22x22 gray quad on the y = 0 plane, one unit wider than the
/// ±10 wander bounds so props never walk off the edge visually.
pub fn floor_quad() -> Vec<Vertex> {
    const GRAY: [f32; 3] = [0.5, 0.5, 0.5];
    vec![
        Vertex {
            position: [-11.0, 0.0, -11.0],
            color: GRAY,
        },
        Vertex {
            position: [-11.0, 0.0, 11.0],
            color: GRAY,
        },
        Vertex {
            position: [11.0, 0.0, -11.0],
            color: GRAY,
        },
        Vertex {
            position: [11.0, 0.0, -11.0],
            color: GRAY,
        },
        Vertex {
            position: [11.0, 0.0, 11.0],
            color: GRAY,
        },
        Vertex {
            position: [-11.0, 0.0, 11.0],
            color: GRAY,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_geometry_has_expected_counts() {
        assert_eq!(prop_triangle().len(), 3);
        assert_eq!(floor_quad().len(), 6);
    }

    #[test]
    fn floor_lies_on_ground_plane() {
        assert!(floor_quad().iter().all(|v| v.position[1] == 0.0));
    }
}
