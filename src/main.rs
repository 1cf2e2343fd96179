//! Demo: encrypted activation and derivative for a handful of inputs,
//! with a per-step CSV trace.

use csv::Writer;
use fheml_core::{
    activate, activate_derivative, build_constant_matrix, build_random_matrix, encrypt_constant,
    weighted_sum, CkksParams, SchemeContext,
};
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use std::error::Error;
use std::time::Instant;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // optional: path to a params JSON file
    let params = match std::env::args().nth(1) {
        Some(path) => CkksParams::from_json_file(path)?,
        None => CkksParams::toy(),
    };
    println!(
        "N = {}, log Q = {}, levels = {}, scale = 2^{}, ceiling = 2^{}",
        params.poly_degree,
        params.total_bits()?,
        params.level_bits.len(),
        params.scale_bits,
        params.scale_ceiling_bits
    );

    let mut rng = StdRng::from_entropy();
    let start = Instant::now();
    let (ctx, secret_key) = SchemeContext::generate(params, &mut rng)?;
    let dec = ctx.decryptor(&secret_key);
    info!("keys generated in {:?}", start.elapsed());

    let mut wtr = Writer::from_path("activation_trace.csv")?;
    wtr.write_record([
        "input",
        "activated",
        "expected",
        "derivative",
        "expected_derivative",
        "level",
        "log2_scale",
        "time_ms",
    ])?;

    // 2x3 bias-style matrix, every cell an independent copy of Enc(0.5)
    let bias = build_constant_matrix(&ctx, 2, 3, 0.5)?;
    for (i, row) in bias.iter_rows().enumerate() {
        let values: Vec<String> = row
            .iter()
            .map(|c| format!("{:.6}", dec.decrypt_value(c)))
            .collect();
        println!("bias[{i}] = [{}]", values.join(", "));
    }

    for v in [0.8, 0.5, -0.3, 0.95] {
        let t = Instant::now();
        let x = encrypt_constant(&ctx, v)?;
        let y = activate(&ctx, &x)?;
        let d = activate_derivative(&ctx, &y)?;
        let elapsed_ms = t.elapsed().as_secs_f64() * 1000.0;

        let (yv, dv) = (dec.decrypt_value(&y), dec.decrypt_value(&d));
        let want = v * v;
        println!(
            "x = {v:>6}: act = {yv:.6} (want {want:.6}), d = {dv:.6} (want {:.6}), \
             level {}, noise {:.2e}",
            want * (1.0 - want),
            y.level(),
            dec.noise_estimate(&d)
        );
        wtr.write_record(&[
            v.to_string(),
            format!("{yv:.9}"),
            format!("{want:.9}"),
            format!("{dv:.9}"),
            format!("{:.9}", want * (1.0 - want)),
            y.level().to_string(),
            format!("{:.2}", y.scale().log2()),
            format!("{elapsed_ms:.3}"),
        ])?;
    }

    // one neuron: random weights, weighted sum at scale Δ², activation
    let weights = build_random_matrix(&ctx, 1, 4, -1.0, 1.0, &mut rng)?;
    let inputs = (0..4)
        .map(|i| encrypt_constant(&ctx, 0.25 * i as f64))
        .collect::<Result<Vec<_>, _>>()?;
    let z = weighted_sum(&ctx, &inputs, weights.row(0))?;
    let y = activate(&ctx, &z)?;
    println!(
        "neuron: z = {:.6} at 2^{:.0}, act = {:.6} at level {}",
        dec.decrypt_value(&z),
        z.scale().log2(),
        dec.decrypt_value(&y),
        y.level()
    );

    wtr.flush()?;
    info!("done in {:?}", start.elapsed());
    Ok(())
}
