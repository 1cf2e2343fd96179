use fheml_core::{
    activate, activate_derivative, build_constant_matrix, build_constant_vector,
    build_random_matrix, encrypt_constant, weighted_sum, CkksParams, Decryptor, HeError,
    SchemeContext,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn setup(seed: u64) -> (SchemeContext, Decryptor, StdRng) {
    let mut rng = StdRng::seed_from_u64(seed);
    let (ctx, sk) = SchemeContext::generate(CkksParams::toy(), &mut rng).unwrap();
    let dec = ctx.decryptor(&sk);
    (ctx, dec, rng)
}

fn assert_close(got: f64, want: f64) {
    assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
}

#[test]
fn constant_matrix_then_activate_then_derivative() {
    let (ctx, dec, _) = setup(1);

    let m = build_constant_matrix(&ctx, 2, 3, 0.5).unwrap();
    assert_eq!(m.iter_rows().count(), 2);
    for row in m.iter_rows() {
        assert_eq!(row.len(), 3);
        for c in row {
            assert_close(dec.decrypt_value(c), 0.5);
        }
    }

    let x = encrypt_constant(&ctx, 0.8).unwrap();
    let y = activate(&ctx, &x).unwrap();
    assert_close(dec.decrypt_value(&y), 0.64);
    assert!(y.scale() <= ctx.scale_ceiling());

    let d = activate_derivative(&ctx, &y).unwrap();
    assert_close(dec.decrypt_value(&d), 0.2304);
    assert_close(dec.decrypt_value(&x), 0.8);
}

#[test]
fn one_neuron_forward_and_backward() {
    let (ctx, dec, mut rng) = setup(2);

    let weights = build_random_matrix(&ctx, 1, 3, -0.5, 0.5, &mut rng).unwrap();
    let bias = build_constant_vector(&ctx, 1, 0.0).unwrap();
    let inputs = [
        encrypt_constant(&ctx, 0.2).unwrap(),
        encrypt_constant(&ctx, -0.4).unwrap(),
        encrypt_constant(&ctx, 0.9).unwrap(),
    ];
    let w: Vec<f64> = weights.row(0).iter().map(|c| dec.decrypt_value(c)).collect();
    let expected = 0.2 * w[0] - 0.4 * w[1] + 0.9 * w[2];

    let z = weighted_sum(&ctx, &inputs, weights.row(0)).unwrap();
    assert_close(dec.decrypt_value(&z), expected);

    // bias sits at the default scale, so it joins after activation
    let mut y = activate(&ctx, &z).unwrap();
    assert_eq!(y.level(), ctx.chain().max_level() - 2);
    assert_close(dec.decrypt_value(&y), expected * expected);

    let b = ctx
        .encoder()
        .encode_at(dec.decrypt_value(&bias[0]), y.parms_id(), y.scale())
        .unwrap();
    ctx.evaluator().add_plain_inplace(&mut y, &b).unwrap();

    let yv = dec.decrypt_value(&y);
    let d = activate_derivative(&ctx, &y).unwrap();
    assert_close(dec.decrypt_value(&d), yv * (1.0 - yv));
}

#[test]
fn mismatched_operands_are_rejected() {
    let (ctx, _, _) = setup(3);
    let x = encrypt_constant(&ctx, 0.8).unwrap();
    let y = activate(&ctx, &x).unwrap();

    let mut z = x.clone();
    let err = ctx.evaluator().sub_inplace(&mut z, &y).unwrap_err();
    assert!(matches!(err, HeError::ParamsMismatch { .. }));
}

#[test]
fn repeated_activation_runs_out_of_levels() {
    let (ctx, _, _) = setup(4);
    let mut y = encrypt_constant(&ctx, 0.9).unwrap();
    for _ in 0..ctx.chain().max_level() {
        y = activate(&ctx, &y).unwrap();
    }
    assert_eq!(y.level(), 0);
    let err = activate(&ctx, &y).unwrap_err();
    assert!(matches!(err, HeError::LevelExhausted { level: 0, .. }));
}
