//! Example walking through multi-channel convolution
//!
//! Run with: RUST_LOG=debug cargo run --example basic_convolution

use chanconv::{
    convolve_channels, convolve_channels_with, output_shape, ConvError, ConvSpec, Padding,
};
use scirs2_core::ndarray_ext::{Array3, Array4};

fn main() -> Result<(), ConvError> {
    env_logger::init();

    println!("=== Multi-channel Convolution Example ===\n");

    // Example 1: all-ones batch and kernel
    println!("1. All-ones, valid padding");
    println!("--------------------------");

    let images = Array4::<f64>::ones((1, 5, 5, 2));
    let kernel = Array3::<f64>::ones((3, 3, 2));
    let out = convolve_channels(&images.view(), &kernel.view(), Padding::Valid, (1, 1))?;

    println!("images {:?} * kernel {:?} -> {:?}", images.shape(), kernel.shape(), out.shape());
    println!("{:?}\n", out.index_axis(scirs2_core::ndarray_ext::Axis(0), 0));

    // Example 2: padding policies side by side
    println!("2. Padding policies");
    println!("-------------------");

    let images = Array4::from_shape_fn((2, 8, 8, 3), |(n, i, j, ch)| (n + i + j + ch) as f64);
    let kernel = Array3::from_shape_fn((3, 3, 3), |(a, b, _)| if a == 1 && b == 1 { 1.0 } else { 0.0 });

    for padding in ["valid", "same", "(1, 1)"] {
        let padding: Padding = padding.parse()?;
        let spec = ConvSpec::new().with_padding(padding).with_stride((2, 2));
        let shape = output_shape(images.shape(), kernel.shape(), &spec)?;
        let out = convolve_channels_with(&images.view(), &kernel.view(), &spec)?;
        println!("padding {:<8} stride (2, 2) -> {:?} (sum {:.1})", padding.to_string(), shape, out.sum());
    }
    println!();

    // Example 3: errors are reported before any work happens
    println!("3. Rejected inputs");
    println!("------------------");

    let wrong_depth = Array3::<f64>::ones((3, 3, 4));
    match convolve_channels(&images.view(), &wrong_depth.view(), Padding::Valid, (1, 1)) {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("{}", e),
    }

    let huge = Array3::<f64>::ones((9, 9, 3));
    match convolve_channels(&images.view(), &huge.view(), Padding::Valid, (1, 1)) {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("{}", e),
    }

    match "reflect".parse::<Padding>() {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("{}", e),
    }

    Ok(())
}
