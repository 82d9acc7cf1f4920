use approx::assert_abs_diff_eq;
use fl_nn::{Encoder, MixtureOfSoftmax, MosConfig};
use fl_tensor::{CpuBackend, Shape, Tensor};

fn batch(rows: usize, cols: usize) -> Tensor {
    Tensor::from_fn(Shape::new(vec![rows, cols]), |i| (i as f32 * 0.37).sin())
}

#[test]
fn test_probabilities_for_a_batch() {
    let backend = CpuBackend::new();
    let mos = MixtureOfSoftmax::new(4, 3, 2, true, false).unwrap();

    let y = mos.forward(&batch(5, 4), &backend).unwrap();

    assert_eq!(y.shape().dims(), &[5, 3]);
    for r in 0..5 {
        let row = y.row(r).unwrap();
        assert!(row.iter().all(|&p| p > 0.0 && p < 1.0));
        assert_abs_diff_eq!(row.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
    }
}

#[test]
fn test_log_output_matches_probabilities() {
    let backend = CpuBackend::new();
    let config = MosConfig::new(4, 3).with_mixture_count(2).with_seed(9);
    let log_mos = MixtureOfSoftmax::from_config(&config).unwrap();
    let prob_mos = MixtureOfSoftmax::from_config(&config.clone().with_log_output(false)).unwrap();

    let x = batch(5, 4);
    let log_p = log_mos.forward(&x, &backend).unwrap();
    let p = prob_mos.forward(&x, &backend).unwrap();

    for (lp, p) in log_p.data().iter().zip(p.data()) {
        assert_abs_diff_eq!(lp.exp(), *p, epsilon = 1e-5);
    }
}

#[test]
fn test_raw_mixture_is_bounded_by_tanh() {
    let backend = CpuBackend::new();
    let mos = MixtureOfSoftmax::new(4, 6, 3, false, true).unwrap();

    let y = mos.forward(&batch(8, 4), &backend).unwrap();

    // A convex combination of tanh outputs stays inside (-1, 1).
    assert!(y.data().iter().all(|v| v.abs() < 1.0));
}

#[test]
fn test_config_from_json_builds_layer() {
    let config = MosConfig::from_json(r#"{"input_size": 4, "output_size": 7, "mixture_count": 3}"#)
        .unwrap();
    let mos = MixtureOfSoftmax::from_config(&config).unwrap();

    assert_eq!(mos.input_dim(), 4);
    assert_eq!(mos.output_dim(), 7);
    assert_eq!(mos.mixture_count(), 3);
    // gate (4x3 + 3) and three components (4x7 + 7)
    assert_eq!(mos.num_parameters(), 15 + 3 * 35);
}
