//! N-dimensional postgres array.
//!
//! Elements are stored flattened in row-major order, the shape is described
//! by one [`ArrayDimension`] per axis, outermost first.
//!
//! # Example
//!
//! ```
//! use pgtype::types::{AssignTo, Int4Array, Set};
//!
//! let mut array = Int4Array::default();
//! array.set(vec![vec![1, 2], vec![3, 4]]).unwrap();
//!
//! assert_eq!(array.dimensions.len(), 2);
//! assert_eq!(array.index_of(&[2, 1]), Some(2));
//!
//! let nested: Vec<Vec<i64>> = array.assign().unwrap();
//! assert_eq!(nested, [[1, 2], [3, 4]]);
//!
//! // flat target for two dimensional array
//! assert!(AssignTo::<Vec<i64>>::assign(&array).is_err());
//! ```
use bytes::{Buf, BufMut, BytesMut};
use std::slice;

use super::{
    AssignTo, Bool, ConversionError, Date, Int2, Int4, Int8, IsNull, PgValue, Set, Text,
    Timestamp, Timestamptz, WireError, encode_status,
};
use crate::{
    Status,
    ext::SliceExt,
    postgres::{Oid, PgType},
};

mod text;

/// Maximum number of dimensions postgres accept.
pub const MAX_DIMENSIONS: usize = 6;

/// Element type of an [`Array`].
pub trait Element: PgValue + Clone {
    /// Oid of the array type.
    const ARRAY_OID: Oid;
    /// Name of the array type, which is the element name prefixed with underscore.
    const ARRAY_NAME: &'static str;
}

/// One axis of an [`Array`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayDimension {
    /// Number of elements in this axis.
    pub length: i32,
    /// Index of the first element, postgres arrays start at `1` by default.
    pub lower_bound: i32,
}

impl ArrayDimension {
    /// Create dimension with `length` and lower bound of `1`.
    pub const fn new(length: i32) -> Self {
        Self { length, lower_bound: 1 }
    }
}

/// Postgres array of element `T`.
///
/// A present array without dimensions is the empty array `{}`, which is
/// different from `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub struct Array<T> {
    pub elements: Vec<T>,
    pub dimensions: Vec<ArrayDimension>,
    pub status: Status,
}

pub type BoolArray = Array<Bool>;
pub type Int2Array = Array<Int2>;
pub type Int4Array = Array<Int4>;
pub type Int8Array = Array<Int8>;
pub type TextArray = Array<Text>;
pub type DateArray = Array<Date>;
pub type TimestampArray = Array<Timestamp>;
pub type TimestamptzArray = Array<Timestamptz>;

impl<T> Default for Array<T> {
    fn default() -> Self {
        Self { elements: vec![], dimensions: vec![], status: Status::Undefined }
    }
}

impl<T> Array<T> {
    /// Create present array, element count must match the dimensions.
    ///
    /// An array with zero length axis is normalized to the empty array.
    pub fn new(elements: Vec<T>, dimensions: Vec<ArrayDimension>) -> Result<Self, ConversionError> {
        let Some(expected) = expected_len(&dimensions) else {
            return Err(ConversionError::dimensions("negative dimension length"));
        };
        if expected != elements.len() {
            return Err(ConversionError::dimensions("element count does not match dimensions"));
        }
        if expected == 0 {
            return Ok(Self::empty());
        }
        Ok(Self { elements, dimensions, status: Status::Present })
    }

    /// Create present one dimensional array.
    pub fn from_elements(elements: Vec<T>) -> Result<Self, ConversionError> {
        if elements.is_empty() {
            return Ok(Self::empty());
        }
        let Ok(length) = i32::try_from(elements.len()) else {
            return Err(ConversionError::dimensions("sequence too long"));
        };
        let dimensions = vec![ArrayDimension::new(length)];
        Ok(Self { elements, dimensions, status: Status::Present })
    }

    /// Create the empty array `{}`.
    pub fn empty() -> Self {
        Self { elements: vec![], dimensions: vec![], status: Status::Present }
    }

    /// Returns the position in [`elements`][Array::elements] of an element
    /// addressed by postgres subscripts, one per dimension.
    ///
    /// Returns [`None`] when subscripts count does not match the dimensions or out of bounds.
    pub fn index_of(&self, index: &[i32]) -> Option<usize> {
        if index.len() != self.dimensions.len() || index.is_empty() {
            return None;
        }
        let mut offset = 0usize;
        for (&i, dim) in index.iter().zip(&self.dimensions) {
            let pos = i64::from(i) - i64::from(dim.lower_bound);
            if pos < 0 || pos >= i64::from(dim.length) {
                return None;
            }
            offset = offset
                .checked_mul(usize::try_from(dim.length).ok()?)?
                .checked_add(usize::try_from(pos).ok()?)?;
        }
        (offset < self.elements.len()).then_some(offset)
    }

    /// Returns element addressed by postgres subscripts.
    pub fn get(&self, index: &[i32]) -> Option<&T> {
        self.elements.get(self.index_of(index)?)
    }
}

/// Number of elements required by the dimensions, [`None`] for negative length.
fn expected_len(dimensions: &[ArrayDimension]) -> Option<usize> {
    if dimensions.is_empty() {
        return Some(0);
    }
    dimensions.iter().try_fold(1usize, |acc, dim| {
        acc.checked_mul(usize::try_from(dim.length).ok()?)
    })
}

impl<T: Element> Array<T> {
    fn check(&self) -> Result<(), WireError> {
        match expected_len(&self.dimensions) {
            Some(expected) if expected == self.elements.len() => Ok(()),
            Some(expected) => Err(WireError::Dimensions {
                oid: Self::OID,
                elements: self.elements.len(),
                expected,
            }),
            None => Err(WireError::malformed(
                Self::OID,
                self.elements.len(),
                "negative dimension length",
            )),
        }
    }
}

impl<T: Element> PgType for Array<T> {
    const OID: Oid = T::ARRAY_OID;
    const NAME: &'static str = T::ARRAY_NAME;
}

impl<T: Element> PgValue for Array<T> {
    fn status(&self) -> Status {
        self.status
    }

    fn null() -> Self {
        Self { status: Status::Null, ..Default::default() }
    }

    fn decode_binary(src: Option<&[u8]>) -> Result<Self, WireError> {
        let Some(mut src) = src else {
            return Ok(Self::null());
        };
        let len = src.len();
        let truncated = || WireError::Truncated { oid: Self::OID, len };
        let malformed = |reason| WireError::malformed(Self::OID, len, reason);

        let ndim = src.try_get_i32().map_err(|_| truncated())?;
        // has null flag, recomputed on encode
        let _flags = src.try_get_i32().map_err(|_| truncated())?;
        // element oid, the codec is chosen by the array oid
        let _element = src.try_get_u32().map_err(|_| truncated())?;

        let ndim = usize::try_from(ndim).map_err(|_| malformed("negative dimension count"))?;
        if ndim > MAX_DIMENSIONS {
            return Err(malformed("too many dimensions"));
        }

        let mut dimensions = Vec::with_capacity(ndim);
        for _ in 0..ndim {
            let length = src.try_get_i32().map_err(|_| truncated())?;
            let lower_bound = src.try_get_i32().map_err(|_| truncated())?;
            if length < 0 {
                return Err(malformed("negative dimension length"));
            }
            dimensions.push(ArrayDimension { length, lower_bound });
        }

        let expected = expected_len(&dimensions).ok_or_else(|| malformed("too many elements"))?;

        // every element is at least its length prefix
        let mut elements = Vec::with_capacity(expected.min(src.len() / 4));
        for _ in 0..expected {
            let element = match src.try_get_i32().map_err(|_| truncated())? {
                -1 => T::null(),
                elen => {
                    let elen = usize::try_from(elen).map_err(|_| malformed("negative element length"))?;
                    T::decode_binary(Some(src.try_split_to(elen).ok_or_else(truncated)?))?
                }
            };
            elements.push(element);
        }

        if !src.is_empty() {
            return Err(malformed("trailing bytes after last element"));
        }

        if elements.is_empty() {
            return Ok(Self::empty());
        }

        Ok(Self { elements, dimensions, status: Status::Present })
    }

    fn decode_text(src: Option<&[u8]>) -> Result<Self, WireError> {
        let Some(src) = src else {
            return Ok(Self::null());
        };
        let literal = text::parse(Self::OID, src)?;
        if literal.elements.is_empty() {
            return Ok(Self::empty());
        }
        let elements = literal
            .elements
            .iter()
            .map(|element| match element {
                Some(element) => T::decode_text(Some(element.as_slice())),
                None => Ok(T::null()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { elements, dimensions: literal.dimensions, status: Status::Present })
    }

    fn encode_binary(&self, buf: &mut BytesMut) -> Result<IsNull, WireError> {
        encode_status!(self);
        self.check()?;

        if self.elements.is_empty() {
            buf.put_i32(0);
            buf.put_i32(0);
            buf.put_u32(T::OID);
            return Ok(IsNull::No);
        }

        let out_of_range = || WireError::OutOfRange { oid: Self::OID };
        let has_null = self.elements.iter().any(|e| e.status().is_null());
        let ndim = i32::try_from(self.dimensions.len()).map_err(|_| out_of_range())?;
        buf.put_i32(ndim);
        buf.put_i32(has_null.into());
        buf.put_u32(T::OID);

        for dim in &self.dimensions {
            buf.put_i32(dim.length);
            buf.put_i32(dim.lower_bound);
        }

        for element in &self.elements {
            let offset = buf.len();
            buf.put_i32(-1);
            if let IsNull::No = element.encode_binary(buf)? {
                let elen = i32::try_from(buf.len() - offset - 4).map_err(|_| out_of_range())?;
                buf[offset..offset + 4].copy_from_slice(&elen.to_be_bytes());
            }
        }

        Ok(IsNull::No)
    }

    fn encode_text(&self, buf: &mut BytesMut) -> Result<IsNull, WireError> {
        encode_status!(self);
        self.check()?;

        if self.elements.is_empty() {
            buf.put_slice(b"{}");
            return Ok(IsNull::No);
        }

        if self.dimensions.iter().any(|dim| dim.lower_bound != 1) {
            let mut int = itoa::Buffer::new();
            for dim in &self.dimensions {
                let upper = i64::from(dim.lower_bound) + i64::from(dim.length) - 1;
                buf.put_u8(b'[');
                buf.put_slice(int.format(dim.lower_bound).as_bytes());
                buf.put_u8(b':');
                buf.put_slice(int.format(upper).as_bytes());
                buf.put_u8(b']');
            }
            buf.put_u8(b'=');
        }

        // elements per brace group of each dimension, outermost first
        let mut counts = Vec::with_capacity(self.dimensions.len());
        let mut count = 1usize;
        for dim in self.dimensions.iter().rev() {
            count *= dim.length as usize;
            counts.push(count);
        }
        counts.reverse();

        let mut scratch = BytesMut::new();
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                buf.put_u8(b',');
            }
            for count in &counts {
                if i % count == 0 {
                    buf.put_u8(b'{');
                }
            }

            scratch.clear();
            match element.encode_text(&mut scratch)? {
                IsNull::Yes => buf.put_slice(b"NULL"),
                IsNull::No => text::put_element(buf, &scratch),
            }

            for count in &counts {
                if (i + 1) % count == 0 {
                    buf.put_u8(b'}');
                }
            }
        }

        Ok(IsNull::No)
    }
}

/// A native value which can be flattened into array elements.
///
/// Implemented by supported native scalars, their [`Option`], and
/// [`Vec`] of any of them, one nesting level per dimension.
pub trait ArrayInput<T> {
    /// Push elements in row-major order while recording the dimension at `depth`.
    fn flatten_into(
        self,
        depth: usize,
        dimensions: &mut Vec<ArrayDimension>,
        elements: &mut Vec<T>,
    ) -> Result<(), ConversionError>;
}

/// A native value which can be built from array elements.
///
/// Implemented by supported native scalars, their [`Option`], and
/// [`Vec`] of any of them, one nesting level per dimension.
pub trait ArrayOutput<T>: Sized {
    /// Build from elements in row-major order shaped by `dimensions`.
    fn build(elements: &mut slice::Iter<'_, T>, dimensions: &[ArrayDimension]) -> Result<Self, ConversionError>;
}

impl<T, N> ArrayInput<T> for Vec<N>
where
    N: ArrayInput<T>,
{
    fn flatten_into(
        self,
        depth: usize,
        dimensions: &mut Vec<ArrayDimension>,
        elements: &mut Vec<T>,
    ) -> Result<(), ConversionError> {
        let length = i32::try_from(self.len())
            .map_err(|_| ConversionError::dimensions("sequence too long"))?;
        match dimensions.get(depth) {
            Some(dim) if dim.length != length => {
                return Err(ConversionError::dimensions("sibling sequences have different length"));
            }
            Some(_) => {}
            None => dimensions.push(ArrayDimension::new(length)),
        }
        for item in self {
            item.flatten_into(depth + 1, dimensions, elements)?;
        }
        Ok(())
    }
}

impl<T, N> ArrayOutput<T> for Vec<N>
where
    N: ArrayOutput<T>,
{
    fn build(elements: &mut slice::Iter<'_, T>, dimensions: &[ArrayDimension]) -> Result<Self, ConversionError> {
        let Some((dim, inner)) = dimensions.split_first() else {
            return Err(ConversionError::dimensions("array has fewer dimensions than the target"));
        };
        (0..dim.length).map(|_| N::build(elements, inner)).collect()
    }
}

macro_rules! native_element {
    ($($native:ty),* $(,)?) => {$(
        impl<T> ArrayInput<T> for $native
        where
            T: Set<$native> + Default,
        {
            fn flatten_into(
                self,
                _: usize,
                _: &mut Vec<ArrayDimension>,
                elements: &mut Vec<T>,
            ) -> Result<(), ConversionError> {
                let mut element = T::default();
                element.set(self)?;
                elements.push(element);
                Ok(())
            }
        }
    )*};
}

macro_rules! native_output {
    ($($native:ty),* $(,)?) => {$(
        impl<T> ArrayOutput<T> for $native
        where
            T: AssignTo<$native>,
        {
            fn build(elements: &mut slice::Iter<'_, T>, dimensions: &[ArrayDimension]) -> Result<Self, ConversionError> {
                if !dimensions.is_empty() {
                    return Err(ConversionError::dimensions("array has more dimensions than the target"));
                }
                match elements.next() {
                    Some(element) => element.assign(),
                    None => Err(ConversionError::dimensions("array has fewer elements than its dimensions")),
                }
            }
        }
    )*};
}

macro_rules! native {
    ($($native:ty),* $(,)?) => {
        native_element!($($native, Option<$native>,)*);
        native_output!($($native, Option<$native>,)*);
    };
}

native!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, String,
    time::Date, time::PrimitiveDateTime, time::OffsetDateTime, time::UtcDateTime,
);

impl<'a, T> ArrayInput<T> for &'a str
where
    T: Set<&'a str> + Default,
{
    fn flatten_into(
        self,
        _: usize,
        _: &mut Vec<ArrayDimension>,
        elements: &mut Vec<T>,
    ) -> Result<(), ConversionError> {
        let mut element = T::default();
        element.set(self)?;
        elements.push(element);
        Ok(())
    }
}

impl<'a, T> ArrayInput<T> for Option<&'a str>
where
    T: Set<Option<&'a str>> + Default,
{
    fn flatten_into(
        self,
        _: usize,
        _: &mut Vec<ArrayDimension>,
        elements: &mut Vec<T>,
    ) -> Result<(), ConversionError> {
        let mut element = T::default();
        element.set(self)?;
        elements.push(element);
        Ok(())
    }
}

impl<T, N> Set<Vec<N>> for Array<T>
where
    T: Element,
    N: ArrayInput<T>,
{
    /// Lower bound of every dimension is `1`.
    fn set(&mut self, value: Vec<N>) -> Result<(), ConversionError> {
        let mut dimensions = vec![];
        let mut elements = vec![];
        value.flatten_into(0, &mut dimensions, &mut elements)?;
        *self = Self::new(elements, dimensions)?;
        Ok(())
    }
}

impl<T, N> AssignTo<Vec<N>> for Array<T>
where
    T: Element,
    N: ArrayOutput<T>,
{
    /// `NULL` array is assigned as empty [`Vec`].
    fn assign(&self) -> Result<Vec<N>, ConversionError> {
        match self.status {
            Status::Present => {}
            Status::Null => return Ok(vec![]),
            Status::Undefined => return Err(ConversionError::undefined::<Vec<N>>()),
        }
        if self.elements.is_empty() {
            return Ok(vec![]);
        }
        let mut elements = self.elements.iter();
        let value = Vec::<N>::build(&mut elements, &self.dimensions)?;
        if elements.next().is_some() {
            return Err(ConversionError::dimensions("array has more elements than its dimensions"));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn dims(dims: &[(i32, i32)]) -> Vec<ArrayDimension> {
        dims.iter()
            .map(|&(length, lower_bound)| ArrayDimension { length, lower_bound })
            .collect()
    }

    fn txt(string: &str) -> Text {
        Text::new(string)
    }

    #[test]
    fn int2_transcode() {
        let cases = [
            Int2Array::empty(),
            Int2Array::new(vec![Int2::new(1), Int2::null()], dims(&[(2, 1)])).unwrap(),
            Int2Array::null(),
            Int2Array::new(
                vec![
                    Int2::new(1),
                    Int2::new(2),
                    Int2::new(3),
                    Int2::new(4),
                    Int2::null(),
                    Int2::new(6),
                ],
                dims(&[(3, 1), (2, 1)]),
            )
            .unwrap(),
            Int2Array::new(
                vec![Int2::new(1), Int2::new(2), Int2::new(3), Int2::new(4)],
                dims(&[(2, 4), (2, 2)]),
            )
            .unwrap(),
            Int2Array::new(
                vec![Int2::new(-7), Int2::new(0), Int2::new(7)],
                dims(&[(1, -3), (3, 0)]),
            )
            .unwrap(),
        ];
        crate::types::transcode(&cases);
    }

    #[test]
    fn text_transcode() {
        let cases = [
            TextArray::empty(),
            TextArray::new(vec![txt("foo"), Text::null()], dims(&[(2, 1)])).unwrap(),
            TextArray::null(),
            TextArray::new(
                vec![
                    txt("bar "),
                    txt("NuLL"),
                    txt("wow\"quz\\"),
                    txt(""),
                    Text::null(),
                    txt("null"),
                ],
                dims(&[(3, 1), (2, 1)]),
            )
            .unwrap(),
            TextArray::new(
                vec![txt("bar"), txt("baz"), txt("quz"), txt("foo")],
                dims(&[(2, 4), (2, 2)]),
            )
            .unwrap(),
        ];
        crate::types::transcode(&cases);
    }

    #[test]
    fn alias_transcode() {
        use crate::types::InfinityModifier::{Infinity, NegativeInfinity};
        use time::macros::{date, datetime};

        crate::types::transcode(&[
            BoolArray::from_elements(vec![Bool::new(true), Bool::null(), Bool::new(false)]).unwrap(),
            BoolArray::null(),
        ]);
        crate::types::transcode(&[
            Int4Array::new(vec![Int4::new(i32::MIN), Int4::null()], dims(&[(1, 0), (2, -1)])).unwrap(),
            Int4Array::empty(),
        ]);
        crate::types::transcode(&[
            Int8Array::from_elements(vec![Int8::new(i64::MIN), Int8::null(), Int8::new(i64::MAX)])
                .unwrap(),
            Int8Array::null(),
        ]);
        crate::types::transcode(&[
            DateArray::new(
                vec![
                    Date::new(date!(1800 - 01 - 01)),
                    Date::infinite(Infinity),
                    Date::null(),
                    Date::new(date!(2200 - 12 - 31)),
                ],
                dims(&[(2, 1), (2, 3)]),
            )
            .unwrap(),
            DateArray::empty(),
        ]);
        crate::types::transcode(&[
            TimestampArray::from_elements(vec![
                Timestamp::new(datetime!(1800-01-01 00:00:00)),
                Timestamp::infinite(NegativeInfinity),
                Timestamp::null(),
                Timestamp::new(datetime!(2200-12-31 23:59:59.999999)),
            ])
            .unwrap(),
            TimestampArray::null(),
        ]);
        crate::types::transcode(&[
            TimestamptzArray::new(
                vec![
                    Timestamptz::new(datetime!(1800-01-01 00:00 UTC)),
                    Timestamptz::null(),
                    Timestamptz::infinite(Infinity),
                    Timestamptz::infinite(NegativeInfinity),
                ],
                dims(&[(4, 2)]),
            )
            .unwrap(),
            TimestamptzArray::empty(),
            TimestamptzArray::null(),
        ]);
    }

    #[test]
    fn text_quoting() {
        let array = TextArray::new(
            vec![
                txt("bar "),
                txt("NuLL"),
                txt("wow\"quz\\"),
                txt(""),
                Text::null(),
                txt("null"),
            ],
            dims(&[(3, 1), (2, 1)]),
        )
        .unwrap();
        let mut buf = BytesMut::new();
        array.encode_text(&mut buf).unwrap();
        assert_eq!(
            &buf[..],
            br#"{{"bar ","NuLL"},{"wow\"quz\\",""},{NULL,"null"}}"#
        );

        let array = TextArray::new(
            vec![txt("bar"), txt("baz"), txt("quz"), txt("foo")],
            dims(&[(2, 4), (2, 2)]),
        )
        .unwrap();
        let mut buf = BytesMut::new();
        array.encode_text(&mut buf).unwrap();
        assert_eq!(&buf[..], b"[4:5][2:3]={{bar,baz},{quz,foo}}");
    }

    #[test]
    fn null_and_empty() {
        let mut empty = BytesMut::new();
        Int4Array::empty().encode_binary(&mut empty).unwrap();
        assert_eq!(&empty[..], &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 23]);

        let mut buf = BytesMut::new();
        assert_eq!(Int4Array::null().encode_binary(&mut buf).unwrap(), IsNull::Yes);
        assert!(buf.is_empty());

        assert_eq!(Int4Array::decode_text(Some(b"{}")).unwrap(), Int4Array::empty());
        assert_ne!(Int4Array::empty(), Int4Array::null());

        // lower bound of an empty array is dropped
        let zero = Int4Array {
            elements: vec![],
            dimensions: dims(&[(0, 5)]),
            status: Status::Present,
        };
        let mut buf = BytesMut::new();
        zero.encode_binary(&mut buf).unwrap();
        assert_eq!(buf, empty);
        let mut buf = BytesMut::new();
        zero.encode_text(&mut buf).unwrap();
        assert_eq!(&buf[..], b"{}");
    }

    #[test]
    fn strict_binary() {
        let mut buf = BytesMut::new();
        Int4Array::from_elements(vec![Int4::new(1), Int4::new(2)]).unwrap()
            .encode_binary(&mut buf)
            .unwrap();

        let truncated = &buf[..buf.len() - 1];
        assert!(matches!(
            Int4Array::decode_binary(Some(truncated)),
            Err(WireError::Truncated { oid: 1007, .. })
        ));

        let mut trailing = buf.to_vec();
        trailing.push(0);
        assert!(matches!(
            Int4Array::decode_binary(Some(&trailing[..])),
            Err(WireError::Malformed { oid: 1007, .. })
        ));

        let mut negative = buf.to_vec();
        negative[12..16].copy_from_slice(&(-2i32).to_be_bytes());
        assert!(Int4Array::decode_binary(Some(&negative[..])).is_err());

        let mut bad_element = buf.to_vec();
        bad_element[20..24].copy_from_slice(&3i32.to_be_bytes());
        assert!(Int4Array::decode_binary(Some(&bad_element[..])).is_err());

        assert!(Int4Array::decode_binary(Some(&[0, 0, 0, 1])).is_err());
    }

    #[test]
    fn dimension_arithmetic() {
        assert!(Int4Array::new(vec![Int4::new(1)], dims(&[(2, 1)])).is_err());
        assert!(Int4Array::new(vec![], dims(&[(-1, 1)])).is_err());

        let array = Int4Array::new(
            (0..6).map(Int4::new).collect(),
            dims(&[(2, 0), (3, -1)]),
        )
        .unwrap();
        assert_eq!(array.index_of(&[0, -1]), Some(0));
        assert_eq!(array.index_of(&[1, 1]), Some(5));
        assert_eq!(array.get(&[1, 0]), Some(&Int4::new(4)));
        assert_eq!(array.index_of(&[2, 0]), None);
        assert_eq!(array.index_of(&[1]), None);

        let mut buf = BytesMut::new();
        let broken = Int4Array { elements: vec![Int4::new(1)], ..array };
        assert!(matches!(
            broken.encode_binary(&mut buf),
            Err(WireError::Dimensions { elements: 1, expected: 6, .. })
        ));
    }

    #[test]
    fn set() {
        let mut array = TextArray::default();
        array.set(vec!["foo"]).unwrap();
        assert_eq!(array, TextArray::new(vec![txt("foo")], dims(&[(1, 1)])).unwrap());

        array.set(None::<Vec<String>>).unwrap();
        assert_eq!(array, TextArray::null());

        array.set(vec![vec![Some("a"), None], vec![Some("b"), Some("c")]]).unwrap();
        assert_eq!(array.dimensions, dims(&[(2, 1), (2, 1)]));
        assert_eq!(array.elements[1], Text::null());

        let before = array.clone();
        let err = array.set(vec![vec!["a"], vec!["b", "c"]]).unwrap_err();
        assert!(matches!(err, ConversionError::Dimensions { .. }));
        assert_eq!(array, before);

        let mut array = Int2Array::default();
        assert!(array.set(vec![1u32, 70_000]).is_err());
        array.set(Vec::<Vec<i16>>::new()).unwrap();
        assert_eq!(array, Int2Array::empty());
        array.set(vec![Vec::<i16>::new(), vec![]]).unwrap();
        assert_eq!(array, Int2Array::empty());
    }

    #[test]
    fn assign() {
        let array = Int2Array::from_elements(vec![Int2::new(1)]).unwrap();
        let mut target = Vec::<u16>::new();
        array.assign_to(&mut target).unwrap();
        assert_eq!(target, [1]);

        let array = Int2Array::from_elements(vec![Int2::new(-1)]).unwrap();
        assert!(array.assign_to(&mut target).is_err());
        assert_eq!(target, [1]);

        let array = Int2Array::from_elements(vec![Int2::null()]).unwrap();
        assert!(matches!(
            AssignTo::<Vec<i16>>::assign(&array),
            Err(ConversionError::Null { .. })
        ));
        assert_eq!(AssignTo::<Vec<Option<i16>>>::assign(&array).unwrap(), [None]);

        let mut target = vec![String::from("stale")];
        TextArray::null().assign_to(&mut target).unwrap();
        assert!(target.is_empty());
        assert_eq!(AssignTo::<Option<Vec<String>>>::assign(&TextArray::null()).unwrap(), None);
        assert!(AssignTo::<Vec<String>>::assign(&TextArray::default()).is_err());

        let array = Int4Array::new(
            (1..=4).map(Int4::new).collect(),
            dims(&[(2, 1), (2, 1)]),
        )
        .unwrap();
        assert!(AssignTo::<Vec<i32>>::assign(&array).is_err());
        assert!(AssignTo::<Vec<Vec<Vec<i32>>>>::assign(&array).is_err());
        assert_eq!(AssignTo::<Vec<Vec<i32>>>::assign(&array).unwrap(), [[1, 2], [3, 4]]);
    }
}
