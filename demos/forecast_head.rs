//! Forecast Head Example
//!
//! This example wires a residual LSTM encoder to a Gaussian output head and
//! draws denormalized samples from the resulting distribution.

use burn::backend::NdArray;
use burn::tensor::{Int, Tensor};
use tshead::prelude::*;

fn main() {
    println!("=== Forecast Head Example ===\n");

    type Backend = NdArray<f32>;
    let device = Default::default();

    let (batch, steps, features) = (4, 24, 8);

    // Encoder: residual connections require input width == hidden width
    let encoder = ResidualCell::new(LSTMCell::<Backend>::new(features, features, &device));

    let inputs = Tensor::<Backend, 3>::random(
        [batch, steps, features],
        burn::tensor::Distribution::Uniform(-1.0, 1.0),
        &device,
    );
    let valid_length = Tensor::<Backend, 1, Int>::from_ints([24, 20, 12, 24], &device);

    println!("Unrolling encoder...");
    let options = UnrollOptions::new()
        .with_layout(Layout::BatchMajor)
        .with_valid_length(valid_length);
    let (hidden, states) = encoder.unroll(Sequence::Merged(inputs), None, &options);
    let hidden = match hidden {
        Sequence::Merged(tensor) => tensor,
        Sequence::PerStep(steps) => Tensor::stack(steps, 1),
    };
    println!("  Hidden shape: {:?}", hidden.dims());
    println!("  Final states: {}", states.len());
    println!();

    // Head: project hidden features onto Gaussian arguments
    let output = GaussianOutput;
    let proj = match DistributionOutput::<Backend>::get_args_proj(&output, features, &device) {
        Ok(proj) => proj,
        Err(err) => {
            eprintln!("failed to build projection: {}", err);
            return;
        }
    };
    println!("Projection arguments:");
    for (name, width) in proj.args_dim().names().zip(proj.args_dim().widths()) {
        println!("  - {}: {}", name, width);
    }
    println!();

    let args = match proj.forward(hidden) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("domain map failed: {}", err);
            return;
        }
    };

    // Denormalize with a per-series location and scale
    let loc = Tensor::<Backend, 3>::full([batch, 1, 1], 100.0, &device);
    let scale = Tensor::<Backend, 3>::full([batch, 1, 1], 15.0, &device);
    let distr = match output.distribution(args, Some(loc), Some(scale)) {
        Ok(distr) => distr,
        Err(err) => {
            eprintln!("failed to build distribution: {}", err);
            return;
        }
    };

    println!("Distribution:");
    println!("  Affine: {}", distr.is_affine());
    println!("  Batch shape: {:?}", distr.batch_shape());
    println!("  Event dim: {}", distr.event_dim());

    let sample = distr.sample();
    println!("  Sample mean: {:.3}", sample.mean().into_scalar());

    let target = Tensor::<Backend, 3>::full([batch, steps, 1], 100.0, &device);
    println!("  Mean NLL at target: {:.3}", distr.loss(target).mean().into_scalar());

    println!("\n=== Forecast Head Example completed! ===");
}
