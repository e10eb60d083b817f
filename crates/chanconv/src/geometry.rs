//! Shape validation and output-size arithmetic
//!
//! [`ConvGeometry`] is computed once per call from the input shapes and the
//! [`ConvSpec`]. Every error a convolution can raise is raised here, before
//! anything is allocated.
//!
//! # Output size
//!
//! ```text
//! out_h = (h + 2 * ph - kh) / sh + 1
//! out_w = (w + 2 * pw - kw) / sw + 1
//! ```

use std::ops::Range;

use crate::config::ConvSpec;
use crate::error::{ConvError, ConvResult};
use crate::padding::Padding;

/// Resolved geometry of one convolution call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvGeometry {
    batch: usize,
    input: (usize, usize),
    channels: usize,
    kernel: (usize, usize),
    stride: (usize, usize),
    padding: (usize, usize),
    output: (usize, usize),
}

impl ConvGeometry {
    /// Validate shapes and resolve padding and output size.
    ///
    /// # Arguments
    ///
    /// * `images_shape` - `[m, h, w, c]`
    /// * `kernel_shape` - `[kh, kw, kc]`
    /// * `spec` - padding and stride
    ///
    /// # Errors
    ///
    /// * [`ConvError::InvalidArgument`] for a wrong rank, a zero stride, an
    ///   empty spatial/channel axis, or padding/stride whose size arithmetic
    ///   overflows `usize`
    /// * [`ConvError::ShapeMismatch`] when `kc != c`
    /// * [`ConvError::InvalidDimensions`] when the kernel does not fit the
    ///   padded image
    ///
    /// # Examples
    ///
    /// ```
    /// use chanconv::{ConvGeometry, ConvSpec, Padding};
    ///
    /// let spec = ConvSpec::new().with_padding(Padding::Valid);
    /// let geom = ConvGeometry::new(&[1, 5, 5, 2], &[3, 3, 2], &spec).unwrap();
    /// assert_eq!(geom.output_shape(), [1, 3, 3]);
    /// ```
    pub fn new(images_shape: &[usize], kernel_shape: &[usize], spec: &ConvSpec) -> ConvResult<Self> {
        let &[m, h, w, c] = images_shape else {
            return Err(rank_error("images", "(m, h, w, c)", images_shape));
        };
        let &[kh, kw, kc] = kernel_shape else {
            return Err(rank_error("kernel", "(kh, kw, kc)", kernel_shape));
        };
        spec.validate()?;

        if kc != c {
            return Err(ConvError::shape_mismatch(c, kc));
        }
        if h == 0 || w == 0 || c == 0 {
            return Err(ConvError::invalid_argument(
                "images",
                format!("height, width and channels must be non-zero, got {:?}", images_shape),
            ));
        }
        if kh == 0 || kw == 0 {
            return Err(ConvError::invalid_argument(
                "kernel",
                format!("height and width must be non-zero, got {:?}", kernel_shape),
            ));
        }

        let stride = spec.stride;
        let (ph, pw) = spec.padding.resolve((h, w), (kh, kw), stride)?;
        let padded = (padded_extent(h, ph)?, padded_extent(w, pw)?);
        if padded.0 < kh || padded.1 < kw {
            return Err(ConvError::invalid_dimensions(padded, (kh, kw), stride));
        }

        let output = (
            (padded.0 - kh) / stride.0 + 1,
            (padded.1 - kw) / stride.1 + 1,
        );
        // m * out_h * out_w must be addressable
        m.checked_mul(output.0)
            .and_then(|x| x.checked_mul(output.1))
            .ok_or_else(|| {
                ConvError::invalid_argument(
                    "padding",
                    format!("output of {} x {:?} cells overflows usize", m, output),
                )
            })?;

        if spec.padding == Padding::Same && stride != (1, 1) {
            log::warn!(
                "'same' padding with stride {:?}: output {:?} does not match input size {}x{}",
                stride,
                output,
                h,
                w
            );
        }

        let geom = Self {
            batch: m,
            input: (h, w),
            channels: c,
            kernel: (kh, kw),
            stride,
            padding: (ph, pw),
            output,
        };
        log::debug!(
            "conv geometry: images {:?} kernel {:?} padding {} -> ({}, {}) stride {:?} output {:?}",
            images_shape,
            kernel_shape,
            spec.padding,
            ph,
            pw,
            stride,
            geom.output_shape()
        );
        Ok(geom)
    }

    /// Number of images `m`
    pub fn batch(&self) -> usize {
        self.batch
    }

    /// Input spatial size `(h, w)`
    pub fn input_hw(&self) -> (usize, usize) {
        self.input
    }

    /// Channel depth shared by images and kernel
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Kernel spatial size `(kh, kw)`
    pub fn kernel_hw(&self) -> (usize, usize) {
        self.kernel
    }

    /// Stride `(sh, sw)`
    pub fn stride(&self) -> (usize, usize) {
        self.stride
    }

    /// Resolved symmetric padding `(ph, pw)`
    pub fn padding(&self) -> (usize, usize) {
        self.padding
    }

    /// Output spatial size `(out_h, out_w)`
    pub fn output_hw(&self) -> (usize, usize) {
        self.output
    }

    /// `[m, h + 2ph, w + 2pw, c]`
    pub fn padded_shape(&self) -> [usize; 4] {
        [
            self.batch,
            self.input.0 + 2 * self.padding.0,
            self.input.1 + 2 * self.padding.1,
            self.channels,
        ]
    }

    /// `[m, out_h, out_w]`
    pub fn output_shape(&self) -> [usize; 3] {
        [self.batch, self.output.0, self.output.1]
    }

    /// Total number of output cells
    pub fn output_len(&self) -> usize {
        self.batch * self.output.0 * self.output.1
    }

    /// Row and column ranges of the padded batch read by output cell `(i, j)`
    pub fn receptive_field(&self, i: usize, j: usize) -> (Range<usize>, Range<usize>) {
        let top = i * self.stride.0;
        let left = j * self.stride.1;
        (top..top + self.kernel.0, left..left + self.kernel.1)
    }
}

/// `n + 2 * p`, or an error when it does not fit in `usize`
fn padded_extent(n: usize, p: usize) -> ConvResult<usize> {
    p.checked_mul(2)
        .and_then(|both| both.checked_add(n))
        .ok_or_else(|| {
            ConvError::invalid_argument(
                "padding",
                format!("{} + 2 * {} overflows usize", n, p),
            )
        })
}

/// Error for an array whose rank is not the expected one
pub(crate) fn rank_error(parameter: &str, expected: &str, shape: &[usize]) -> ConvError {
    ConvError::invalid_argument(
        parameter,
        format!(
            "expected shape {}, got rank {} shape {:?}",
            expected,
            shape.len(),
            shape
        ),
    )
}

/// Output shape `[m, out_h, out_w]` of a convolution, without computing it.
///
/// # Examples
///
/// ```
/// use chanconv::{output_shape, ConvSpec, Padding};
///
/// let spec = ConvSpec::new().with_padding(Padding::Valid).with_stride((2, 2));
/// assert_eq!(output_shape(&[4, 9, 7, 3], &[3, 3, 3], &spec).unwrap(), [4, 4, 3]);
/// ```
pub fn output_shape(
    images_shape: &[usize],
    kernel_shape: &[usize],
    spec: &ConvSpec,
) -> ConvResult<[usize; 3]> {
    ConvGeometry::new(images_shape, kernel_shape, spec).map(|geom| geom.output_shape())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ConvSpec {
        ConvSpec::new().with_padding(Padding::Valid)
    }

    #[test]
    fn test_valid_geometry() {
        let geom = ConvGeometry::new(&[2, 5, 6, 3], &[3, 2, 3], &valid()).unwrap();

        assert_eq!(geom.batch(), 2);
        assert_eq!(geom.channels(), 3);
        assert_eq!(geom.padding(), (0, 0));
        assert_eq!(geom.padded_shape(), [2, 5, 6, 3]);
        assert_eq!(geom.output_shape(), [2, 3, 5]);
        assert_eq!(geom.output_len(), 30);
    }

    #[test]
    fn test_same_geometry_unit_stride() {
        let geom = ConvGeometry::new(&[1, 5, 5, 1], &[3, 3, 1], &ConvSpec::new()).unwrap();

        assert_eq!(geom.padding(), (2, 2));
        assert_eq!(geom.padded_shape(), [1, 9, 9, 1]);
        // (5 + 4 - 3) / 1 + 1
        assert_eq!(geom.output_shape(), [1, 7, 7]);
    }

    #[test]
    fn test_strided_geometry() {
        let spec = valid().with_stride((2, 3));
        let geom = ConvGeometry::new(&[1, 10, 11, 2], &[3, 2, 2], &spec).unwrap();

        // (10 - 3) / 2 + 1 = 4, (11 - 2) / 3 + 1 = 4
        assert_eq!(geom.output_hw(), (4, 4));
    }

    #[test]
    fn test_explicit_padding_geometry() {
        let spec = ConvSpec::new().with_padding((1, 0)).with_stride((2, 2));
        let geom = ConvGeometry::new(&[3, 4, 4, 1], &[2, 2, 1], &spec).unwrap();

        assert_eq!(geom.padded_shape(), [3, 6, 4, 1]);
        // (6 - 2) / 2 + 1 = 3, (4 - 2) / 2 + 1 = 2
        assert_eq!(geom.output_shape(), [3, 3, 2]);
    }

    #[test]
    fn test_receptive_field() {
        let spec = valid().with_stride((2, 3));
        let geom = ConvGeometry::new(&[1, 10, 11, 2], &[3, 2, 2], &spec).unwrap();

        assert_eq!(geom.receptive_field(0, 0), (0..3, 0..2));
        assert_eq!(geom.receptive_field(3, 2), (6..9, 6..8));
    }

    #[test]
    fn test_channel_mismatch() {
        let err = ConvGeometry::new(&[1, 5, 5, 2], &[3, 3, 3], &valid()).unwrap_err();
        assert_eq!(err, ConvError::shape_mismatch(2, 3));
    }

    #[test]
    fn test_kernel_larger_than_input() {
        let err = ConvGeometry::new(&[1, 2, 5, 1], &[3, 3, 1], &valid()).unwrap_err();
        assert_eq!(err, ConvError::invalid_dimensions((2, 5), (3, 3), (1, 1)));
    }

    #[test]
    fn test_padding_rescues_large_kernel() {
        let spec = ConvSpec::new().with_padding((1, 0));
        let geom = ConvGeometry::new(&[1, 2, 5, 1], &[3, 3, 1], &spec).unwrap();
        assert_eq!(geom.output_shape(), [1, 2, 3]);
    }

    #[test]
    fn test_wrong_rank() {
        let err = ConvGeometry::new(&[5, 5, 2], &[3, 3, 2], &valid()).unwrap_err();
        assert!(matches!(err, ConvError::InvalidArgument { ref parameter, .. } if parameter == "images"));

        let err = ConvGeometry::new(&[1, 5, 5, 2], &[3, 3], &valid()).unwrap_err();
        assert!(matches!(err, ConvError::InvalidArgument { ref parameter, .. } if parameter == "kernel"));
    }

    #[test]
    fn test_zero_extents() {
        assert!(ConvGeometry::new(&[1, 0, 5, 1], &[1, 1, 1], &valid()).is_err());
        assert!(ConvGeometry::new(&[1, 5, 5, 0], &[1, 1, 0], &valid()).is_err());
        assert!(ConvGeometry::new(&[1, 5, 5, 1], &[0, 1, 1], &valid()).is_err());
    }

    #[test]
    fn test_empty_batch_is_allowed() {
        let geom = ConvGeometry::new(&[0, 5, 5, 1], &[3, 3, 1], &valid()).unwrap();
        assert_eq!(geom.output_shape(), [0, 3, 3]);
        assert_eq!(geom.output_len(), 0);
    }

    #[test]
    fn test_zero_stride() {
        let spec = valid().with_stride((0, 1));
        let err = ConvGeometry::new(&[1, 5, 5, 1], &[3, 3, 1], &spec).unwrap_err();
        assert!(matches!(err, ConvError::InvalidArgument { ref parameter, .. } if parameter == "stride"));
    }

    #[test]
    fn test_huge_explicit_padding_is_an_error() {
        let spec = ConvSpec::new().with_padding((usize::MAX / 2, 0));
        let err = ConvGeometry::new(&[1, 5, 5, 1], &[3, 3, 1], &spec).unwrap_err();
        assert!(matches!(err, ConvError::InvalidArgument { ref parameter, .. } if parameter == "padding"));
    }

    #[test]
    fn test_huge_stride_with_same_is_an_error() {
        let spec = ConvSpec::new().with_padding(Padding::Same).with_stride((usize::MAX, 1));
        let err = ConvGeometry::new(&[1, 5, 5, 1], &[3, 3, 1], &spec).unwrap_err();
        assert!(matches!(err, ConvError::InvalidArgument { ref parameter, .. } if parameter == "stride"));
    }

    #[test]
    fn test_huge_stride_with_valid_is_fine() {
        let spec = valid().with_stride((usize::MAX, usize::MAX));
        let geom = ConvGeometry::new(&[2, 5, 5, 1], &[3, 3, 1], &spec).unwrap();
        assert_eq!(geom.output_shape(), [2, 1, 1]);
    }

    #[test]
    fn test_output_cell_count_overflow_is_an_error() {
        // padded extent fits, but m * out_h * out_w does not
        let spec = ConvSpec::new().with_padding((usize::MAX / 8, usize::MAX / 8));
        let err = ConvGeometry::new(&[4, 1, 1, 1], &[1, 1, 1], &spec).unwrap_err();
        assert!(matches!(err, ConvError::InvalidArgument { ref parameter, .. } if parameter == "padding"));
    }

    #[test]
    fn test_same_with_stride_geometry() {
        // ph = ((5 - 1) * 2 + 3 - 5) / 2 + 1 = 4 -> padded 13 -> (13 - 3) / 2 + 1 = 6
        let spec = ConvSpec::new().with_stride((2, 2));
        let geom = ConvGeometry::new(&[1, 5, 5, 2], &[3, 3, 2], &spec).unwrap();
        assert_eq!(geom.padding(), (4, 4));
        assert_eq!(geom.output_shape(), [1, 6, 6]);
    }

    #[test]
    fn test_rank_error_reports_full_shape() {
        let err = ConvGeometry::new(&[5, 5, 2], &[3, 3, 2], &valid()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("rank 3"));
        assert!(msg.contains("[5, 5, 2]"));
    }

    #[test]
    fn test_output_shape_helper() {
        let spec = valid().with_stride((2, 2));
        assert_eq!(output_shape(&[4, 9, 7, 3], &[3, 3, 3], &spec).unwrap(), [4, 4, 3]);
        assert!(output_shape(&[4, 9, 7, 3], &[3, 3, 1], &spec).is_err());
    }
}
