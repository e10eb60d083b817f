//! Padding policies and their resolution into explicit row/column counts
//!
//! A [`Padding`] is either a named policy (`same`, `valid`) or an explicit
//! pair `(ph, pw)`. Padding is always zero valued and symmetric: `ph` rows are
//! added above *and* below each image, `pw` columns left *and* right.
//!
//! # Same padding
//!
//! `same` resolves to
//!
//! ```text
//! ph = ((h - 1) * sh + kh - h) / 2 + 1
//! pw = ((w - 1) * sw + kw - w) / 2 + 1
//! ```
//!
//! with floor division. The formula is stride aware and is kept exactly as is
//! so results stay bit compatible with existing outputs.

use std::fmt;
use std::str::FromStr;

use crate::error::{ConvError, ConvResult};

/// Padding policy for a convolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Padding {
    /// Stride-aware padding intended to preserve spatial size
    #[default]
    Same,
    /// No padding - output shrinks by the kernel extent
    Valid,
    /// Explicit symmetric padding `(rows, columns)`
    Explicit(usize, usize),
}

impl Padding {
    /// Resolve the policy into `(ph, pw)` for the given geometry.
    ///
    /// # Errors
    ///
    /// [`ConvError::InvalidArgument`] when `same` is asked for an empty axis or
    /// when `(n - 1) * s + k` does not fit in `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chanconv::Padding;
    ///
    /// assert_eq!(Padding::Valid.resolve((5, 5), (3, 3), (1, 1)).unwrap(), (0, 0));
    /// assert_eq!(Padding::Same.resolve((5, 5), (3, 3), (1, 1)).unwrap(), (2, 2));
    /// assert_eq!(Padding::Explicit(1, 4).resolve((5, 5), (3, 3), (2, 2)).unwrap(), (1, 4));
    /// ```
    pub fn resolve(
        &self,
        (h, w): (usize, usize),
        (kh, kw): (usize, usize),
        (sh, sw): (usize, usize),
    ) -> ConvResult<(usize, usize)> {
        match *self {
            Padding::Valid => Ok((0, 0)),
            Padding::Same => Ok((same_amount(h, kh, sh)?, same_amount(w, kw, sw)?)),
            Padding::Explicit(ph, pw) => Ok((ph, pw)),
        }
    }
}

/// `((n - 1) * s + k - n) / 2 + 1`, with every step checked.
fn same_amount(n: usize, k: usize, s: usize) -> ConvResult<usize> {
    let span = n
        .checked_sub(1)
        .ok_or_else(|| ConvError::invalid_argument("images", "'same' padding needs a non-empty axis"))?
        .checked_mul(s)
        .and_then(|x| x.checked_add(k))
        .ok_or_else(|| {
            ConvError::invalid_argument(
                "stride",
                format!(
                    "'same' padding for size {} with kernel {} and stride {} overflows usize",
                    n, k, s
                ),
            )
        })?;
    let excess = span.checked_sub(n).ok_or_else(|| {
        ConvError::invalid_argument(
            "stride",
            format!("'same' padding needs positive kernel and stride, got {} and {}", k, s),
        )
    })?;
    Ok(excess / 2 + 1)
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Padding::Same => write!(f, "same"),
            Padding::Valid => write!(f, "valid"),
            Padding::Explicit(ph, pw) => write!(f, "({}, {})", ph, pw),
        }
    }
}

impl From<(usize, usize)> for Padding {
    fn from((ph, pw): (usize, usize)) -> Self {
        Padding::Explicit(ph, pw)
    }
}

impl FromStr for Padding {
    type Err = ConvError;

    /// Accepts `same`, `valid` (any case) or a pair such as `1,2` / `(1, 2)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "same" => return Ok(Padding::Same),
            "valid" => return Ok(Padding::Valid),
            _ => {}
        }

        let reject = || {
            ConvError::invalid_argument(
                "padding",
                format!(
                    "expected 'same', 'valid' or a pair of non-negative integers, got '{}'",
                    s
                ),
            )
        };

        let inner = trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(trimmed);
        let mut parts = inner.split(',').map(str::trim);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(ph), Some(pw), None) => {
                let ph = ph.parse::<usize>().map_err(|_| reject())?;
                let pw = pw.parse::<usize>().map_err(|_| reject())?;
                Ok(Padding::Explicit(ph, pw))
            }
            _ => Err(reject()),
        }
    }
}
