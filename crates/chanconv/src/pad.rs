//! Zero padding of image batches

use scirs2_core::ndarray_ext::{s, Array4, ArrayView4};
use scirs2_core::numeric::Num;

/// Surround every image with `ph` zero rows and `pw` zero columns on each side.
///
/// The batch and channel axes are untouched; the original pixels land in the
/// centred region `[:, ph..ph + h, pw..pw + w, :]`.
///
/// # Complexity
///
/// Time: O(m * (h + 2ph) * (w + 2pw) * c)
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::Array4;
/// use chanconv::zero_pad;
///
/// let images = Array4::<f64>::ones((2, 3, 3, 1));
/// let padded = zero_pad(&images.view(), (1, 2));
/// assert_eq!(padded.shape(), &[2, 5, 7, 1]);
/// assert_eq!(padded[[0, 0, 0, 0]], 0.0);
/// assert_eq!(padded[[1, 1, 2, 0]], 1.0);
/// ```
pub fn zero_pad<T>(images: &ArrayView4<T>, (ph, pw): (usize, usize)) -> Array4<T>
where
    T: Clone + Num,
{
    let (m, h, w, c) = images.dim();
    if ph == 0 && pw == 0 {
        return images.to_owned();
    }

    let mut padded = Array4::<T>::zeros((m, h + 2 * ph, w + 2 * pw, c));
    padded
        .slice_mut(s![.., ph..ph + h, pw..pw + w, ..])
        .assign(images);
    padded
}
