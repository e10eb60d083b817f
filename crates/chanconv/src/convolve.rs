//! Multi-channel 2D convolution over image batches
//!
//! A batch `(m, h, w, c)` is convolved with a single kernel `(kh, kw, c)`.
//! Each output cell is the sum over height, width *and* channel of the
//! elementwise product between the kernel and its receptive field, so the
//! channel axis is consumed and the output is `(m, out_h, out_w)`.
//!
//! ```text
//! out[n, i, j] = Σ_a Σ_b Σ_ch  P[n, i*sh + a, j*sw + b, ch] · K[a, b, ch]
//! ```
//!
//! where `P` is the zero-padded batch (see [`crate::zero_pad`]).
//!
//! # Execution paths
//!
//! - [`convolve_channels_serial`] - single-threaded
//! - [`convolve_channels_parallel`] - output rows spread over the scirs2 thread
//!   pool (feature `parallel`)
//! - [`convolve_channels_with`] - picks one from `ConvSpec::parallel_threshold`
//!
//! Within a cell both paths accumulate in `(kh, kw, c)` row-major order.

use scirs2_core::ndarray_ext::{
    s, Array3, ArrayView3, ArrayView4, ArrayViewD, ArrayViewMut2, Axis, Ix3, Ix4, Zip,
};
use scirs2_core::numeric::Float;

use crate::config::ConvSpec;
use crate::error::ConvResult;
use crate::geometry::{rank_error, ConvGeometry};
use crate::pad::zero_pad;
use crate::padding::Padding;

/// Convolve a batch of multi-channel images with one kernel.
///
/// # Arguments
///
/// * `images` - Batch with shape `(m, h, w, c)`
/// * `kernel` - Kernel with shape `(kh, kw, c)`
/// * `padding` - [`Padding::Same`], [`Padding::Valid`] or an explicit `(ph, pw)`
/// * `stride` - `(sh, sw)`, both positive
///
/// # Returns
///
/// Feature maps with shape `(m, out_h, out_w)`
///
/// # Errors
///
/// * [`ConvError::ShapeMismatch`](crate::ConvError::ShapeMismatch) if the kernel depth differs from `c`
/// * [`ConvError::InvalidDimensions`](crate::ConvError::InvalidDimensions) if the kernel does not fit the padded image
/// * [`ConvError::InvalidArgument`](crate::ConvError::InvalidArgument) for a zero stride, an empty axis,
///   or padding/stride whose size arithmetic overflows `usize`
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::{Array3, Array4};
/// use chanconv::{convolve_channels, Padding};
///
/// let images = Array4::<f64>::ones((1, 5, 5, 2));
/// let kernel = Array3::<f64>::ones((3, 3, 2));
/// let out = convolve_channels(&images.view(), &kernel.view(), Padding::Valid, (1, 1)).unwrap();
///
/// assert_eq!(out.shape(), &[1, 3, 3]);
/// assert!(out.iter().all(|&v| v == 18.0));
/// ```
pub fn convolve_channels<T>(
    images: &ArrayView4<T>,
    kernel: &ArrayView3<T>,
    padding: impl Into<Padding>,
    stride: (usize, usize),
) -> ConvResult<Array3<T>>
where
    T: Float + Send + Sync,
{
    let spec = ConvSpec::new().with_padding(padding).with_stride(stride);
    convolve_channels_with(images, kernel, &spec)
}

/// Convolve using every setting in `spec`, choosing the execution path.
///
/// The parallel kernel runs when the `parallel` feature is enabled and the
/// output has at least `spec.parallel_threshold` cells.
pub fn convolve_channels_with<T>(
    images: &ArrayView4<T>,
    kernel: &ArrayView3<T>,
    spec: &ConvSpec,
) -> ConvResult<Array3<T>>
where
    T: Float + Send + Sync,
{
    let geom = ConvGeometry::new(images.shape(), kernel.shape(), spec)?;

    #[cfg(feature = "parallel")]
    if geom.output_len() >= spec.parallel_threshold {
        log::trace!("conv: parallel path for {} cells", geom.output_len());
        return Ok(run_parallel(images, kernel, &geom));
    }

    log::trace!("conv: serial path for {} cells", geom.output_len());
    Ok(run_serial(images, kernel, &geom))
}

/// Single-threaded convolution
pub fn convolve_channels_serial<T>(
    images: &ArrayView4<T>,
    kernel: &ArrayView3<T>,
    spec: &ConvSpec,
) -> ConvResult<Array3<T>>
where
    T: Float,
{
    let geom = ConvGeometry::new(images.shape(), kernel.shape(), spec)?;
    Ok(run_serial(images, kernel, &geom))
}

/// Convolution with output rows processed in parallel
///
/// Each task owns one output row `(:, i, :)`, so every cell is written once
/// and no synchronisation is needed beyond the final join.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::{Array3, Array4};
/// use chanconv::{convolve_channels_parallel, ConvSpec};
///
/// let images = Array4::<f32>::ones((8, 32, 32, 3));
/// let kernel = Array3::<f32>::ones((3, 3, 3));
/// let out = convolve_channels_parallel(&images.view(), &kernel.view(), &ConvSpec::new()).unwrap();
/// assert_eq!(out.shape(), &[8, 34, 34]);
/// ```
#[cfg(feature = "parallel")]
pub fn convolve_channels_parallel<T>(
    images: &ArrayView4<T>,
    kernel: &ArrayView3<T>,
    spec: &ConvSpec,
) -> ConvResult<Array3<T>>
where
    T: Float + Send + Sync,
{
    let geom = ConvGeometry::new(images.shape(), kernel.shape(), spec)?;
    Ok(run_parallel(images, kernel, &geom))
}

/// Convolve dynamically shaped arrays.
///
/// `images` must be rank 4 and `kernel` rank 3; anything else is reported as
/// [`ConvError::InvalidArgument`](crate::ConvError::InvalidArgument).
pub fn convolve_channels_dyn<T>(
    images: &ArrayViewD<T>,
    kernel: &ArrayViewD<T>,
    spec: &ConvSpec,
) -> ConvResult<Array3<T>>
where
    T: Float + Send + Sync,
{
    let images = images
        .view()
        .into_dimensionality::<Ix4>()
        .map_err(|_| rank_error("images", "(m, h, w, c)", images.shape()))?;
    let kernel = kernel
        .view()
        .into_dimensionality::<Ix3>()
        .map_err(|_| rank_error("kernel", "(kh, kw, kc)", kernel.shape()))?;

    convolve_channels_with(&images, &kernel, spec)
}

fn run_serial<T>(images: &ArrayView4<T>, kernel: &ArrayView3<T>, geom: &ConvGeometry) -> Array3<T>
where
    T: Float,
{
    let padded = zero_pad(images, geom.padding());
    let padded = padded.view();
    let [m, out_h, out_w] = geom.output_shape();
    let mut output = Array3::<T>::zeros((m, out_h, out_w));

    for (i, row) in output.axis_iter_mut(Axis(1)).enumerate() {
        convolve_row(&padded, kernel, geom, i, row);
    }
    output
}

#[cfg(feature = "parallel")]
fn run_parallel<T>(
    images: &ArrayView4<T>,
    kernel: &ArrayView3<T>,
    geom: &ConvGeometry,
) -> Array3<T>
where
    T: Float + Send + Sync,
{
    use scirs2_core::parallel_ops::*;

    let padded = zero_pad(images, geom.padding());
    let padded = padded.view();
    let [m, out_h, out_w] = geom.output_shape();
    let mut output = Array3::<T>::zeros((m, out_h, out_w));

    output
        .axis_iter_mut(Axis(1))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, row)| convolve_row(&padded, kernel, geom, i, row));
    output
}

/// Fill output row `i`, shape `(m, out_w)`, for every image at once.
fn convolve_row<T>(
    padded: &ArrayView4<T>,
    kernel: &ArrayView3<T>,
    geom: &ConvGeometry,
    i: usize,
    mut row: ArrayViewMut2<T>,
) where
    T: Float,
{
    let (_, out_w) = geom.output_hw();
    for j in 0..out_w {
        let (rows, cols) = geom.receptive_field(i, j);
        let window = padded.slice(s![.., rows, cols, ..]);

        for (n, field) in window.outer_iter().enumerate() {
            row[[n, j]] = Zip::from(&field)
                .and(kernel)
                .fold(T::zero(), |acc, &x, &k| acc + x * k);
        }
    }
}
