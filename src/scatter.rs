use crate::blend::BlendError;
use crate::image::{ensure_size, GrayViewMut, InputError, Mask};
use crate::index::IndexGrid;

/// Round half to even and clamp into `[0, 255]`; NaN becomes 0.
#[inline]
pub fn saturate_u8(value: f64) -> u8 {
    // `as` saturates and maps NaN to 0.
    value.round_ties_even() as u8
}

/// Write solved values into the masked pixels of `dst`; other pixels are left alone.
pub fn scatter(
    x: &[f64],
    mask: &Mask,
    index: &IndexGrid,
    dst: &mut GrayViewMut<'_>,
) -> Result<(), BlendError> {
    let size = mask.size();
    index.check_mask(mask)?;
    ensure_size(size, dst.size())?;
    if x.len() != index.count() {
        return Err(InputError::LengthMismatch {
            expected: index.count(),
            actual: x.len(),
        }
        .into());
    }

    for y in 0..size.1 {
        let row = dst.row_mut(y);
        for (px, out) in row.iter_mut().enumerate() {
            if !mask.get(px, y) {
                continue;
            }
            let k = index
                .get(px, y)
                .ok_or(InputError::IndexMismatch { x: px, y })?;
            *out = saturate_u8(x[k]);
        }
    }
    Ok(())
}
