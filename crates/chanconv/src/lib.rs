//! # chanconv
//!
//! Multi-channel 2D convolution over batches of images.
//!
//! **Version:** 0.1.0-alpha.2
//!
//! ## Overview
//!
//! A batch of `m` images of shape `(h, w, c)` is convolved with one kernel of
//! shape `(kh, kw, c)`. The kernel is applied to every image and across all
//! channels at once, so each image yields a single-channel feature map and the
//! output has shape `(m, out_h, out_w)`.
//!
//! **Key Features:**
//! - ✅ **Padding policies** - `same`, `valid` or an explicit `(ph, pw)` pair
//! - ✅ **Strides** - independent vertical and horizontal step
//! - ✅ **Up-front validation** - shape, stride and size errors before allocation
//! - ✅ **Parallel kernel** - output rows spread over the thread pool (feature-gated)
//! - ✅ **Static and dynamic ranks** - `ArrayView4`/`ArrayView3` or `ArrayViewD`
//!
//! ## Quick Start
//!
//! ```rust
//! use scirs2_core::ndarray_ext::{Array3, Array4};
//! use chanconv::{convolve_channels, output_shape, ConvSpec, Padding};
//!
//! let images = Array4::<f64>::ones((1, 5, 5, 2));
//! let kernel = Array3::<f64>::ones((3, 3, 2));
//!
//! let out = convolve_channels(&images.view(), &kernel.view(), Padding::Valid, (1, 1)).unwrap();
//! assert_eq!(out.shape(), &[1, 3, 3]);
//! assert_eq!(out[[0, 1, 1]], 18.0); // 3 * 3 * 2
//!
//! // Shapes can be checked without running the convolution.
//! // `same` at stride 2 pads ((5 - 1) * 2 + 3 - 5) / 2 + 1 = 4 per side.
//! let spec = ConvSpec::new().with_stride((2, 2));
//! assert_eq!(output_shape(&[1, 5, 5, 2], &[3, 3, 2], &spec).unwrap(), [1, 6, 6]);
//! ```
//!
//! ## Padding
//!
//! | Policy | `(ph, pw)` |
//! |--------|------------|
//! | `Valid` | `(0, 0)` |
//! | `Same` | `((h-1)*sh + kh - h) / 2 + 1`, `((w-1)*sw + kw - w) / 2 + 1` |
//! | `Explicit(ph, pw)` | as given |
//!
//! `"same"`, `"valid"` and `"ph,pw"` also parse through [`std::str::FromStr`].
//!
//! ## Features
//!
//! - `parallel` (default) - Enable the parallel kernel using the scirs2 thread pool
//!
//! ## Logging
//!
//! The crate logs through the `log` facade: resolved geometry at `debug`, the
//! chosen execution path at `trace`, and a `warn` when `same` padding is used
//! with a non-unit stride. Install any `log` backend to see them.
//!
//! ## SciRS2 Integration
//!
//! All array operations use `scirs2_core::ndarray_ext` and numeric traits
//! come from `scirs2_core::numeric`.

pub mod config;
pub mod convolve;
pub mod error;
pub mod geometry;
pub mod pad;
pub mod padding;


// Re-exports
pub use config::*;
pub use convolve::*;
pub use error::{ConvError, ConvResult};
pub use geometry::*;
pub use pad::*;
pub use padding::*;
