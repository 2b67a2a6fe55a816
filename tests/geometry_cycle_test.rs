use dfokit::prelude::*;
use float_cmp::{approx_eq, F64Margin};
use ndarray::prelude::*;

const MARGIN: F64Margin = F64Margin {
    epsilon: 1e-12,
    ulps: 4,
};

// Replace edge column `jdrop` with `d` and rebuild the 2x2 inverse by the
// closed-form adjugate. Stands in for the incremental update a real driver
// would carry.
fn replace_vertex(sim: &mut Array2<f64>, simi: &mut Array2<f64>, jdrop: usize, d: &Array1<f64>) {
    sim.column_mut(jdrop).assign(d);
    let det = sim[[0, 0]] * sim[[1, 1]] - sim[[0, 1]] * sim[[1, 0]];
    *simi = array![
        [sim[[1, 1]] / det, -sim[[0, 1]] / det],
        [-sim[[1, 0]] / det, sim[[0, 0]] / det]
    ];
}

#[test]
fn test_geometry_repair_cycle_restores_adequacy() {
    // A simplex squeezed flat in the second coordinate. One repair cycle,
    // assess then pick a vertex then step then replace, must restore a
    // well-poised set.
    let mut sim = array![[1.0, 0.0, 0.0], [0.0, 0.01, 0.0]];
    let mut simi = array![[1.0, 0.0], [0.0, 100.0]];
    let factors = GeometryFactors::default();
    let delta = 1.0;

    assert!(check_inverse_pair(&sim, &simi, 1e-10).is_ok());
    assert!(!assess_geometry(delta, &factors, &sim, &simi));

    let jdrop = drop_for_geometry(delta, &factors, &sim, &simi);
    assert_eq!(jdrop, Some(1));
    let jdrop = jdrop.unwrap();

    let conmat = Array2::<f64>::zeros((0, 3));
    let cval = array![0.0, 0.0, 0.0];
    let fval = array![0.0, 0.0, 0.0];
    let d = simplex_geometry_step(jdrop, 0.0, &conmat, &cval, delta, &factors, &fval, &simi);
    assert!(approx_eq!(f64, d[0], 0.0, MARGIN));
    assert!(approx_eq!(f64, d[1], 0.5, MARGIN));

    replace_vertex(&mut sim, &mut simi, jdrop, &d);
    assert!(check_inverse_pair(&sim, &simi, 1e-10).is_ok());
    assert!(assess_geometry(delta, &factors, &sim, &simi));
}

#[test]
fn test_accepted_trust_step_updates_the_set() {
    let mut sim = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    let mut simi = array![[1.0, 0.0], [0.0, 1.0]];
    let factors = GeometryFactors::default();
    let delta = 1.0;

    // An improving step dominated by the first coordinate displaces the
    // first vertex, and the updated pair stays consistent and adequate.
    let d = array![2.0, 0.0];
    let jdrop = drop_after_trust_step(true, &d, delta, &factors, &sim, &simi);
    assert_eq!(jdrop, Some(0));

    replace_vertex(&mut sim, &mut simi, jdrop.unwrap(), &d);
    assert!(check_inverse_pair(&sim, &simi, 1e-10).is_ok());
    assert!(assess_geometry(delta, &factors, &sim, &simi));
}

#[test]
fn test_rejected_zero_step_leaves_the_set() {
    let sim = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    let simi = array![[1.0, 0.0], [0.0, 1.0]];
    let factors = GeometryFactors::default();

    let d = array![0.0, 0.0];
    assert_eq!(
        drop_after_trust_step(false, &d, 1.0, &factors, &sim, &simi),
        None
    );
}

#[test]
fn test_quadratic_step_stays_in_radius_over_a_sweep() {
    let cases: Vec<(Array1<f64>, Array2<f64>, f64)> = vec![
        (array![1.0, 0.0], array![[2.0, 0.0], [0.0, -1.0]], 1.0),
        (array![3.0, 4.0], Array2::zeros((2, 2)), 2.0),
        (array![1.0, 1.0], array![[2.0, 0.0], [0.0, -1.0]], 0.5),
        (
            array![0.3, -0.7, 0.2],
            array![[1.0, 0.5, 0.0], [0.5, -2.0, 0.1], [0.0, 0.1, 0.7]],
            1.5,
        ),
        (array![0.0, 0.0], array![[1.0, 0.0], [0.0, 1.0]], 1.0),
    ];

    for (g, h, delbar) in cases {
        let QuadStepResult { d, vmax } = geometry_step(&g, &h, delbar);
        let len = d.dot(&d).sqrt();
        assert!(len <= delbar * (1.0 + 1e-8));
        assert!(vmax >= 0.0 && vmax.is_finite());
        assert!(d.iter().all(|x| x.is_finite()));
        // The reported estimate may neglect a small cross curvature term
        // but never underreports the achieved model value by much.
        let phi = g.dot(&d) + 0.5 * d.dot(&h.dot(&d));
        assert!(phi.abs() <= vmax * 1.05 + 1e-12);
    }
}
