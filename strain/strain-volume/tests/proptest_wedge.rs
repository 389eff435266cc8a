//! Property-based tests for wedge interpolation and probing.
//!
//! Run with: cargo test -p strain-volume -- proptest

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use nalgebra::{Point3, Vector3};
use proptest::prelude::*;
use strain_types::{Surface, SENTINEL};
use strain_volume::wedge::{evaluate, locate};
use strain_volume::{extrude_surface, probe_volume};

// =============================================================================
// Strategies
// =============================================================================

/// A non-degenerate extruded wedge: a well-shaped base triangle and an
/// offset with a clear component along the triangle normal.
fn arb_wedge() -> impl Strategy<Value = [Point3<f64>; 6]> {
    (
        prop::array::uniform3(-50.0..50.0f64),
        1.0..10.0f64,
        1.0..10.0f64,
        0.2..0.8f64,
        -0.2..0.2f64,
        -0.2..0.2f64,
        0.5..10.0f64,
    )
        .prop_map(|([x, y, z], a, b, c, ox, oy, oz)| {
            let p0 = Point3::new(x, y, z);
            let p1 = p0 + Vector3::new(a, 0.0, 0.1 * a);
            let p2 = p0 + Vector3::new(c * a, b, -0.1 * b);
            let offset = Vector3::new(ox, oy, oz);
            [
                p0 - offset,
                p1 - offset,
                p2 - offset,
                p0 + offset,
                p1 + offset,
                p2 + offset,
            ]
        })
}

/// Parametric coordinates strictly inside the element.
fn arb_interior_pcoords() -> impl Strategy<Value = [f64; 3]> {
    (0.01..0.98f64, 0.01..0.99f64, 0.01..0.99f64).prop_map(|(r, frac, t)| {
        let s = (1.0 - r) * frac * 0.99;
        [r, s, t]
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn proptest_interior_weights_form_partition_of_unity(
        wedge in arb_wedge(),
        pc in arb_interior_pcoords(),
    ) {
        let point = evaluate(&wedge, pc);
        let hit = locate(&wedge, &point);
        prop_assert!(hit.is_some());
        let hit = hit.unwrap();

        let sum: f64 = hit.weights.iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-9);
        for w in hit.weights {
            prop_assert!((0.0..=1.0).contains(&w));
        }
        for (solved, expected) in hit.pcoords.iter().zip(pc) {
            prop_assert!((solved - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn proptest_points_beyond_far_face_are_outside(
        wedge in arb_wedge(),
        pc in arb_interior_pcoords(),
        beyond in 0.01..2.0f64,
    ) {
        let [r, s, _] = pc;
        let point = evaluate(&wedge, [r, s, 1.0 + beyond]);
        prop_assert!(locate(&wedge, &point).is_none());
    }

    #[test]
    fn proptest_far_points_probe_to_sentinel(
        offset in prop::array::uniform3(20.0..1000.0f64),
    ) {
        let donor = Surface::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
        .with_field("strain", vec![1.0, 2.0, 3.0, 4.0])
        .unwrap();
        let volume = extrude_surface(&donor, Vector3::z()).unwrap();

        let query = Surface::new(
            vec![Point3::new(offset[0], offset[1], offset[2])],
            vec![],
        )
        .unwrap();
        let probed = probe_volume(&volume, &query).unwrap();
        prop_assert_eq!(probed.surface.single_field().unwrap().values()[0], SENTINEL);
    }
}
