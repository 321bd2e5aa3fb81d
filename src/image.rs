use core::fmt;

use crate::region::Rect;

/// Validation errors for image buffers, masks and regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The mask has zero width or height.
    EmptyMask,
    /// The image has zero width or height.
    EmptyImage,
    /// Row stride is shorter than the row width.
    StrideTooSmall { width: usize, stride: usize },
    /// Backing buffer cannot hold `height` rows of the given stride.
    BufferTooSmall { required: usize, actual: usize },
    /// Two inputs that must share a shape do not.
    SizeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// A rectangle does not fit inside the image.
    RectOutOfBounds { rect: Rect, width: usize, height: usize },
    /// The polygon contour has no points.
    EmptyContour,
    /// A contour point lies outside the image.
    ContourOutOfBounds { x: i32, y: i32, width: usize, height: usize },
    /// Mask and index grid disagree on whether `(x, y)` is unknown.
    IndexMismatch { x: usize, y: usize },
    /// A vector does not have one entry per unknown.
    LengthMismatch { expected: usize, actual: usize },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMask => write!(f, "mask is empty"),
            Self::EmptyImage => write!(f, "image is empty"),
            Self::StrideTooSmall { width, stride } => {
                write!(f, "stride {stride} is smaller than width {width}")
            }
            Self::BufferTooSmall { required, actual } => {
                write!(f, "buffer holds {actual} bytes, {required} required")
            }
            Self::SizeMismatch { expected, actual } => write!(
                f,
                "size {}x{} does not match expected {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            Self::RectOutOfBounds {
                rect,
                width,
                height,
            } => write!(
                f,
                "rect {}x{} at ({}, {}) exceeds image {width}x{height}",
                rect.width, rect.height, rect.x, rect.y
            ),
            Self::EmptyContour => write!(f, "contour has no points"),
            Self::ContourOutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(f, "contour point ({x}, {y}) outside image {width}x{height}"),
            Self::IndexMismatch { x, y } => {
                write!(f, "index grid and mask disagree at pixel ({x}, {y})")
            }
            Self::LengthMismatch { expected, actual } => {
                write!(f, "vector length {actual} does not match expected {expected}")
            }
        }
    }
}

impl std::error::Error for InputError {}

fn required_len(width: usize, height: usize, stride: usize) -> usize {
    if height == 0 {
        0
    } else {
        (height - 1) * stride + width
    }
}

fn check_layout(width: usize, height: usize, stride: usize, len: usize) -> Result<(), InputError> {
    if width == 0 || height == 0 {
        return Err(InputError::EmptyImage);
    }
    if stride < width {
        return Err(InputError::StrideTooSmall { width, stride });
    }
    let required = required_len(width, height, stride);
    if len < required {
        return Err(InputError::BufferTooSmall {
            required,
            actual: len,
        });
    }
    Ok(())
}

fn check_rect(rect: Rect, width: usize, height: usize) -> Result<(), InputError> {
    if rect.width == 0 || rect.height == 0 {
        return Err(InputError::EmptyImage);
    }
    if rect.x + rect.width > width || rect.y + rect.height > height {
        return Err(InputError::RectOutOfBounds {
            rect,
            width,
            height,
        });
    }
    Ok(())
}

/// Borrowed single-channel 8-bit image with a row stride.
#[derive(Clone, Copy, Debug)]
pub struct GrayView<'a> {
    width: usize,
    height: usize,
    stride: usize, // elements between rows
    data: &'a [u8],
}

impl<'a> GrayView<'a> {
    pub fn new(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a [u8],
    ) -> Result<Self, InputError> {
        check_layout(width, height, stride, data.len())?;
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    /// Contiguous view, `stride == width`.
    pub fn from_slice(width: usize, height: usize, data: &'a [u8]) -> Result<Self, InputError> {
        Self::new(width, height, width, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    /// Borrow the pixels inside `rect` without copying.
    pub fn sub_view(&self, rect: Rect) -> Result<GrayView<'a>, InputError> {
        check_rect(rect, self.width, self.height)?;
        let start = rect.y * self.stride + rect.x;
        let end = start + required_len(rect.width, rect.height, self.stride);
        Ok(GrayView {
            width: rect.width,
            height: rect.height,
            stride: self.stride,
            data: &self.data[start..end],
        })
    }
}

/// Mutable counterpart of [`GrayView`].
#[derive(Debug)]
pub struct GrayViewMut<'a> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a mut [u8],
}

impl<'a> GrayViewMut<'a> {
    pub fn new(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a mut [u8],
    ) -> Result<Self, InputError> {
        check_layout(width, height, stride, data.len())?;
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    pub fn from_slice(width: usize, height: usize, data: &'a mut [u8]) -> Result<Self, InputError> {
        Self::new(width, height, width, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.stride + x] = value;
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.stride;
        &mut self.data[start..start + self.width]
    }

    pub fn as_view(&self) -> GrayView<'_> {
        GrayView {
            width: self.width,
            height: self.height,
            stride: self.stride,
            data: &*self.data,
        }
    }

    /// Mutably borrow the pixels inside `rect`; writes land in the parent buffer.
    pub fn sub_view_mut(&mut self, rect: Rect) -> Result<GrayViewMut<'_>, InputError> {
        check_rect(rect, self.width, self.height)?;
        let start = rect.y * self.stride + rect.x;
        let end = start + required_len(rect.width, rect.height, self.stride);
        Ok(GrayViewMut {
            width: rect.width,
            height: rect.height,
            stride: self.stride,
            data: &mut self.data[start..end],
        })
    }
}

/// Owned bitmap mask; `true` marks a pixel to solve for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    data: Vec<bool>,
}

impl Mask {
    /// All-false mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![false; width * height],
        }
    }

    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Build from an 8-bit mask buffer; any non-zero byte is `true`.
    pub fn from_bytes(view: &GrayView<'_>) -> Self {
        Self::from_fn(view.width(), view.height(), |x, y| view.get(x, y) != 0)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        self.data[y * self.width + x] = value;
    }

    /// Number of `true` cells.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

pub(crate) fn ensure_size(
    expected: (usize, usize),
    actual: (usize, usize),
) -> Result<(), InputError> {
    if expected != actual {
        return Err(InputError::SizeMismatch { expected, actual });
    }
    Ok(())
}
