//! Error types for convolution operations
//!
//! Every failure is detected while the call's geometry is being resolved,
//! before any output is allocated, so a caller never observes partial results.

use thiserror::Error;

/// Error type for convolution operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvError {
    /// Kernel channel depth does not equal image channel depth
    #[error(
        "shape mismatch: kernel has {kernel_channels} channels but images have {image_channels}"
    )]
    ShapeMismatch {
        image_channels: usize,
        kernel_channels: usize,
    },

    /// Padding, stride and kernel yield a non-positive output size
    #[error(
        "invalid dimensions: kernel {kernel:?} does not fit padded input {padded:?} with stride {stride:?}"
    )]
    InvalidDimensions {
        padded: (usize, usize),
        kernel: (usize, usize),
        stride: (usize, usize),
    },

    /// A parameter is outside its allowed domain
    #[error("invalid argument '{parameter}': {reason}")]
    InvalidArgument { parameter: String, reason: String },
}

/// Result type for convolution operations
pub type ConvResult<T> = Result<T, ConvError>;

impl ConvError {
    /// Create a shape mismatch error
    pub fn shape_mismatch(image_channels: usize, kernel_channels: usize) -> Self {
        ConvError::ShapeMismatch {
            image_channels,
            kernel_channels,
        }
    }

    /// Create an invalid dimensions error
    pub fn invalid_dimensions(
        padded: (usize, usize),
        kernel: (usize, usize),
        stride: (usize, usize),
    ) -> Self {
        ConvError::InvalidDimensions {
            padded,
            kernel,
            stride,
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        ConvError::InvalidArgument {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}
