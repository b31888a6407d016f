use dsge_linalg::{LyapunovOptions, SpdFactor, lyapunov, spectral_radius};
use ndarray::{Array2, array};

fn min_eigenvalue_2x2(m: &Array2<f64>) -> f64 {
    let (a, b, d) = (m[[0, 0]], m[[0, 1]], m[[1, 1]]);
    let tr = a + d;
    let det = a * d - b * b;
    0.5 * (tr - (tr * tr - 4.0 * det).max(0.0).sqrt())
}

#[test]
fn stationary_covariance_is_symmetric_psd() {
    let cases = [
        (array![[0.95, 0.1], [-0.2, 0.5]], array![[1.0, 0.0], [0.3, 0.2]]),
        (array![[0.0, 1.0], [-0.5, 0.9]], array![[0.0], [1.0]]),
        (array![[0.99, 0.0], [0.0, -0.99]], array![[0.1, 0.0], [0.0, 0.1]]),
    ];
    for (a, b) in cases {
        assert!(spectral_radius(a.view()).unwrap() < 1.0);
        let q = b.dot(&b.t());
        let s = lyapunov(a.view(), q.view(), LyapunovOptions::default()).unwrap();
        assert_eq!(s[[0, 1]], s[[1, 0]]);
        assert!(min_eigenvalue_2x2(&s) >= -1e-12);
    }
}

#[test]
fn full_rank_noise_gives_positive_definite_covariance() {
    let a = array![[0.7, 0.2, 0.0], [0.1, 0.6, 0.1], [0.0, -0.3, 0.4]];
    let q = Array2::<f64>::eye(3);
    let s = lyapunov(a.view(), q.view(), LyapunovOptions::default()).unwrap();
    assert!(SpdFactor::new(s.view()).is_ok());
}
