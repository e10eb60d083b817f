//! Convolution configuration

use crate::error::{ConvError, ConvResult};
use crate::padding::Padding;

/// Default minimum number of output cells before the parallel kernel is used
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// Parameters controlling a single convolution call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvSpec {
    /// Padding policy
    pub padding: Padding,
    /// Vertical and horizontal step `(sh, sw)`
    pub stride: (usize, usize),
    /// Output cells (`m * out_h * out_w`) at which the parallel kernel takes over
    pub parallel_threshold: usize,
}

impl Default for ConvSpec {
    fn default() -> Self {
        Self {
            padding: Padding::Same,
            stride: (1, 1),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ConvSpec {
    /// Create a spec with `same` padding and unit stride
    pub fn new() -> Self {
        Self::default()
    }

    /// Set padding policy
    pub fn with_padding(mut self, padding: impl Into<Padding>) -> Self {
        self.padding = padding.into();
        self
    }

    /// Set stride
    pub fn with_stride(mut self, stride: (usize, usize)) -> Self {
        self.stride = stride;
        self
    }

    /// Set the parallel dispatch threshold
    pub fn with_parallel_threshold(mut self, cells: usize) -> Self {
        self.parallel_threshold = cells;
        self
    }

    /// Check the parameters that do not depend on input shapes
    pub fn validate(&self) -> ConvResult<()> {
        let (sh, sw) = self.stride;
        if sh == 0 || sw == 0 {
            return Err(ConvError::invalid_argument(
                "stride",
                format!("must be a pair of positive integers, got ({}, {})", sh, sw),
            ));
        }
        Ok(())
    }
}
