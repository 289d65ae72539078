//! Numeric pixel grids.
//!
//! A [`Grid`] is a planar `(C, H, W)` image or a `(B, C, H, W)` batch of
//! images stored in one contiguous buffer of a single [`DType`].
//!
//! # Layout
//!
//! Samples are stored row-major, channel-planar:
//!
//! ```text
//! index = ((b * C + c) * H + y) * W + x
//! ```
//!
//! # Example
//!
//! ```rust
//! use visaug_core::{Grid, Shape};
//!
//! let grid = Grid::from_vec(Shape::image(3, 2, 4), vec![0u8; 3 * 2 * 4]).unwrap();
//! assert_eq!(grid.shape().dims(), vec![3, 2, 4]);
//! assert!(!grid.is_batched());
//!
//! let batch = Grid::stack(&[grid.clone(), grid]).unwrap();
//! assert_eq!(batch.shape().dims(), vec![2, 3, 2, 4]);
//! ```

use std::fmt;

use half::f16;

use crate::dtype::{Cast, DType, Sample};
use crate::error::{Error, Result};

/// Dimensions of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    /// Leading batch dimension, `None` for a single image.
    pub batch: Option<usize>,
    /// Channel count.
    pub channels: usize,
    /// Rows.
    pub height: usize,
    /// Columns.
    pub width: usize,
}

impl Shape {
    /// Shape of a single `(C, H, W)` image.
    pub const fn image(channels: usize, height: usize, width: usize) -> Self {
        Self { batch: None, channels, height, width }
    }

    /// Shape of a `(B, C, H, W)` batch.
    pub const fn batch(batch: usize, channels: usize, height: usize, width: usize) -> Self {
        Self { batch: Some(batch), channels, height, width }
    }

    /// Number of images described (1 for an unbatched shape).
    #[inline]
    pub fn num_images(&self) -> usize {
        self.batch.unwrap_or(1)
    }

    /// Samples per image plane (`H * W`).
    #[inline]
    pub fn plane_len(&self) -> usize {
        self.height * self.width
    }

    /// Samples per image (`C * H * W`).
    #[inline]
    pub fn image_len(&self) -> usize {
        self.channels * self.plane_len()
    }

    /// Total number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.num_images() * self.image_len()
    }

    /// Whether the shape holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Same shape with a different spatial size.
    pub fn with_size(&self, height: usize, width: usize) -> Self {
        Self { height, width, ..*self }
    }

    /// Same shape with a different channel count.
    pub fn with_channels(&self, channels: usize) -> Self {
        Self { channels, ..*self }
    }

    /// Dimensions as a list, batch first when present.
    pub fn dims(&self) -> Vec<usize> {
        match self.batch {
            Some(b) => vec![b, self.channels, self.height, self.width],
            None => vec![self.channels, self.height, self.width],
        }
    }

    /// Shape of one element.
    pub fn element(&self) -> Self {
        Self { batch: None, ..*self }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.dims().iter().map(|d| d.to_string()).collect();
        write!(f, "[{}]", dims.join(", "))
    }
}

/// Typed sample storage.
#[derive(Debug, Clone, PartialEq)]
pub enum GridData {
    /// `u8` samples.
    U8(Vec<u8>),
    /// `i8` samples.
    I8(Vec<i8>),
    /// `i16` samples.
    I16(Vec<i16>),
    /// `i32` samples.
    I32(Vec<i32>),
    /// `i64` samples.
    I64(Vec<i64>),
    /// `f16` samples.
    F16(Vec<f16>),
    /// `f32` samples.
    F32(Vec<f32>),
    /// `f64` samples.
    F64(Vec<f64>),
}

/// Runs `$body` with `$v` bound to the inner vector of any variant.
macro_rules! with_data {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            GridData::U8($v) => $body,
            GridData::I8($v) => $body,
            GridData::I16($v) => $body,
            GridData::I32($v) => $body,
            GridData::I64($v) => $body,
            GridData::F16($v) => $body,
            GridData::F32($v) => $body,
            GridData::F64($v) => $body,
        }
    };
}

/// Like [`with_data!`] but wraps a same-typed result vector back into its variant.
macro_rules! map_data {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            GridData::U8($v) => GridData::U8($body),
            GridData::I8($v) => GridData::I8($body),
            GridData::I16($v) => GridData::I16($body),
            GridData::I32($v) => GridData::I32($body),
            GridData::I64($v) => GridData::I64($body),
            GridData::F16($v) => GridData::F16($body),
            GridData::F32($v) => GridData::F32($body),
            GridData::F64($v) => GridData::F64($body),
        }
    };
}

/// Conversion between a concrete sample vector and [`GridData`].
pub trait StorageType: Sample {
    /// Borrows the vector if `data` holds this type.
    fn slice(data: &GridData) -> Option<&[Self]>;
    /// Mutably borrows the vector if `data` holds this type.
    fn slice_mut(data: &mut GridData) -> Option<&mut [Self]>;
    /// Wraps a vector.
    fn wrap(values: Vec<Self>) -> GridData;
}

macro_rules! impl_storage {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl StorageType for $t {
                fn slice(data: &GridData) -> Option<&[Self]> {
                    match data {
                        GridData::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                fn slice_mut(data: &mut GridData) -> Option<&mut [Self]> {
                    match data {
                        GridData::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                fn wrap(values: Vec<Self>) -> GridData {
                    GridData::$variant(values)
                }
            }
        )*
    };
}

impl_storage!(
    u8 => U8,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f16 => F16,
    f32 => F32,
    f64 => F64,
);

fn narrow<T: StorageType>(values: &[f64], cast: Cast) -> GridData {
    T::wrap(values.iter().map(|&v| T::from_f64(v, cast)).collect())
}

fn gather_typed<T: Sample>(src: &[T], index: &[Option<usize>], fill: &[f64], plane: usize) -> Vec<T> {
    let fill: Vec<T> = fill.iter().map(|&f| T::from_f64(f, Cast::Round)).collect();
    index
        .iter()
        .enumerate()
        .map(|(i, idx)| match idx {
            Some(j) => src[*j],
            None => fill[i / plane],
        })
        .collect()
}

impl GridData {
    /// Zero-filled storage.
    pub fn zeros(dtype: DType, len: usize) -> Self {
        match dtype {
            DType::U8 => Self::U8(vec![0; len]),
            DType::I8 => Self::I8(vec![0; len]),
            DType::I16 => Self::I16(vec![0; len]),
            DType::I32 => Self::I32(vec![0; len]),
            DType::I64 => Self::I64(vec![0; len]),
            DType::F16 => Self::F16(vec![f16::ZERO; len]),
            DType::F32 => Self::F32(vec![0.0; len]),
            DType::F64 => Self::F64(vec![0.0; len]),
        }
    }

    /// Narrows `f64` values into `dtype` storage.
    pub fn from_f64(dtype: DType, values: &[f64], cast: Cast) -> Self {
        match dtype {
            DType::U8 => narrow::<u8>(values, cast),
            DType::I8 => narrow::<i8>(values, cast),
            DType::I16 => narrow::<i16>(values, cast),
            DType::I32 => narrow::<i32>(values, cast),
            DType::I64 => narrow::<i64>(values, cast),
            DType::F16 => narrow::<f16>(values, cast),
            DType::F32 => narrow::<f32>(values, cast),
            DType::F64 => Self::F64(values.to_vec()),
        }
    }

    /// Sample type.
    pub fn dtype(&self) -> DType {
        match self {
            Self::U8(_) => DType::U8,
            Self::I8(_) => DType::I8,
            Self::I16(_) => DType::I16,
            Self::I32(_) => DType::I32,
            Self::I64(_) => DType::I64,
            Self::F16(_) => DType::F16,
            Self::F32(_) => DType::F32,
            Self::F64(_) => DType::F64,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        with_data!(self, v => v.len())
    }

    /// Whether the storage is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample at `index` widened to `f64`.
    #[inline]
    pub fn get_f64(&self, index: usize) -> f64 {
        with_data!(self, v => v[index].to_f64())
    }

    /// All samples widened to `f64`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        with_data!(self, v => v.iter().map(|s| s.to_f64()).collect())
    }

    /// Contiguous sub-range in the same dtype.
    pub fn slice_range(&self, start: usize, end: usize) -> Self {
        map_data!(self, v => v[start..end].to_vec())
    }

    /// Builds new storage by indexing into `self`.
    ///
    /// `index[i] = None` takes the fill value of plane `i / plane_len`;
    /// `fill` holds one value per output plane. The copy is exact, with
    /// no float round trip.
    pub fn gather(&self, index: &[Option<usize>], fill: &[f64], plane_len: usize) -> Self {
        map_data!(self, v => gather_typed(v, index, fill, plane_len))
    }

    /// Concatenates storages of the same dtype.
    pub fn concat(parts: &[&GridData]) -> Result<Self> {
        let Some(first) = parts.first() else {
            return Err(Error::InvalidArgument("cannot concatenate zero grids".into()));
        };
        let dtype = first.dtype();
        let mut out = GridData::zeros(dtype, 0);
        for part in parts {
            if part.dtype() != dtype {
                return Err(Error::TypeMismatch(format!(
                    "cannot concatenate {} with {}",
                    dtype,
                    part.dtype()
                )));
            }
            append(&mut out, part);
        }
        Ok(out)
    }
}

fn append(dst: &mut GridData, src: &GridData) {
    match (dst, src) {
        (GridData::U8(a), GridData::U8(b)) => a.extend_from_slice(b),
        (GridData::I8(a), GridData::I8(b)) => a.extend_from_slice(b),
        (GridData::I16(a), GridData::I16(b)) => a.extend_from_slice(b),
        (GridData::I32(a), GridData::I32(b)) => a.extend_from_slice(b),
        (GridData::I64(a), GridData::I64(b)) => a.extend_from_slice(b),
        (GridData::F16(a), GridData::F16(b)) => a.extend_from_slice(b),
        (GridData::F32(a), GridData::F32(b)) => a.extend_from_slice(b),
        (GridData::F64(a), GridData::F64(b)) => a.extend_from_slice(b),
        _ => {}
    }
}

/// A `(C, H, W)` image or `(B, C, H, W)` batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    shape: Shape,
    data: GridData,
}

impl Grid {
    /// Creates a grid after validating the buffer length and dimensions.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if any of `C`, `H`, `W` or `B` is zero
    /// - [`Error::ShapeMismatch`] if the buffer length does not match
    pub fn new(shape: Shape, data: GridData) -> Result<Self> {
        if shape.channels == 0 || shape.height == 0 || shape.width == 0 || shape.batch == Some(0) {
            return Err(Error::InvalidArgument(format!(
                "grid dimensions must be positive, got {shape}"
            )));
        }
        if data.len() != shape.len() {
            return Err(Error::ShapeMismatch(format!(
                "buffer holds {} samples but shape {} needs {}",
                data.len(),
                shape,
                shape.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Trusted constructor for callers that already hold a consistent shape.
    pub(crate) fn from_parts(shape: Shape, data: GridData) -> Self {
        debug_assert_eq!(shape.len(), data.len());
        Self { shape, data }
    }

    /// Creates a grid from a typed vector.
    pub fn from_vec<T: StorageType>(shape: Shape, values: Vec<T>) -> Result<Self> {
        Self::new(shape, T::wrap(values))
    }

    /// Creates a grid by narrowing `f64` values.
    pub fn from_f64(shape: Shape, dtype: DType, values: &[f64], cast: Cast) -> Result<Self> {
        Self::new(shape, GridData::from_f64(dtype, values, cast))
    }

    /// Zero-filled grid.
    pub fn zeros(shape: Shape, dtype: DType) -> Result<Self> {
        Self::new(shape, GridData::zeros(dtype, shape.len()))
    }

    /// Grid whose sample at `(c, y, x)` is `f(c, y, x)`.
    pub fn from_fn<F>(shape: Shape, dtype: DType, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize, usize) -> f64,
    {
        let mut values = Vec::with_capacity(shape.len());
        for _ in 0..shape.num_images() {
            for c in 0..shape.channels {
                for y in 0..shape.height {
                    for x in 0..shape.width {
                        values.push(f(c, y, x));
                    }
                }
            }
        }
        Self::from_f64(shape, dtype, &values, Cast::Round)
    }

    /// Dimensions.
    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Sample type.
    #[inline]
    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    /// Underlying storage.
    #[inline]
    pub fn data(&self) -> &GridData {
        &self.data
    }

    /// Consumes the grid, returning its storage.
    pub fn into_data(self) -> GridData {
        self.data
    }

    /// Channel count.
    #[inline]
    pub fn channels(&self) -> usize {
        self.shape.channels
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.shape.height
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.shape.width
    }

    /// Whether the grid carries a batch dimension.
    #[inline]
    pub fn is_batched(&self) -> bool {
        self.shape.batch.is_some()
    }

    /// Typed view of the samples, if the dtype matches `T`.
    pub fn as_slice<T: StorageType>(&self) -> Option<&[T]> {
        T::slice(&self.data)
    }

    /// Mutable typed view of the samples.
    pub fn as_mut_slice<T: StorageType>(&mut self) -> Option<&mut [T]> {
        T::slice_mut(&mut self.data)
    }

    /// All samples widened to `f64`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.data.to_f64_vec()
    }

    /// Sample of image `b`, channel `c`, row `y`, column `x` as `f64`.
    #[inline]
    pub fn get(&self, b: usize, c: usize, y: usize, x: usize) -> f64 {
        let s = &self.shape;
        self.data.get_f64(((b * s.channels + c) * s.height + y) * s.width + x)
    }

    /// Borrows element `index` of a batch as a standalone image.
    ///
    /// For an unbatched grid only index 0 is valid and returns a copy.
    pub fn element(&self, index: usize) -> Result<Grid> {
        let n = self.shape.num_images();
        if index >= n {
            return Err(Error::InvalidArgument(format!(
                "element {index} out of range for batch of {n}"
            )));
        }
        let len = self.shape.image_len();
        Ok(Grid {
            shape: self.shape.element(),
            data: self.data.slice_range(index * len, (index + 1) * len),
        })
    }

    /// Splits into standalone images.
    pub fn unbind(&self) -> Vec<Grid> {
        let len = self.shape.image_len();
        (0..self.shape.num_images())
            .map(|i| Grid {
                shape: self.shape.element(),
                data: self.data.slice_range(i * len, (i + 1) * len),
            })
            .collect()
    }

    /// Stacks unbatched images of identical shape and dtype into a batch.
    pub fn stack(items: &[Grid]) -> Result<Grid> {
        let Some(first) = items.first() else {
            return Err(Error::InvalidArgument("cannot stack an empty list".into()));
        };
        let elem = first.shape.element();
        for item in items {
            if item.is_batched() || item.shape != elem {
                return Err(Error::ShapeMismatch(format!(
                    "cannot stack {} with {}",
                    item.shape, elem
                )));
            }
        }
        let parts: Vec<&GridData> = items.iter().map(|g| &g.data).collect();
        let data = GridData::concat(&parts)?;
        Grid::new(Shape::batch(items.len(), elem.channels, elem.height, elem.width), data)
    }

    /// Re-stacks per-element results; an unbatched result must hold one image.
    pub fn restack(items: Vec<Grid>, batched: bool) -> Result<Grid> {
        if batched {
            return Grid::stack(&items);
        }
        let mut items = items;
        match (items.pop(), items.is_empty()) {
            (Some(single), true) => Ok(single),
            _ => Err(Error::ShapeMismatch(
                "unbatched result must hold exactly one image".into(),
            )),
        }
    }

    /// Adds a leading batch dimension of size 1.
    pub fn unsqueeze(self) -> Grid {
        let s = self.shape;
        Grid {
            shape: Shape { batch: Some(s.num_images()), ..s },
            data: self.data,
        }
    }

    /// Drops the batch dimension.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] if the batch holds more than one image.
    pub fn squeeze(self) -> Result<Grid> {
        match self.shape.batch {
            None => Ok(self),
            Some(1) => Ok(Grid { shape: self.shape.element(), data: self.data }),
            Some(b) => Err(Error::ShapeMismatch(format!("cannot squeeze a batch of {b}"))),
        }
    }

    /// Same samples, reinterpreted under a new shape of equal length.
    pub fn reshape(self, shape: Shape) -> Result<Grid> {
        Grid::new(shape, self.data)
    }

    /// Copies samples through an index map (see [`GridData::gather`]).
    pub fn gather(&self, shape: Shape, index: &[Option<usize>], fill: &[f64]) -> Result<Grid> {
        if index.len() != shape.len() || fill.len() != shape.num_images() * shape.channels {
            return Err(Error::ShapeMismatch(format!(
                "gather map of {} entries does not fit {shape}",
                index.len()
            )));
        }
        Grid::new(shape, self.data.gather(index, fill, shape.plane_len()))
    }
}
