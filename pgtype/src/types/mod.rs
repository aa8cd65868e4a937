//! Typed postgres values.
//!
//! Every type here pairs a native payload with a [`Status`], and implements
//! [`PgValue`] for the binary and text wire formats.
//!
//! Conversion from and to native values goes through [`Set`] and
//! [`AssignTo`]. The list of accepted native types is closed: each typed value
//! implements the conversion for a fixed set of native types, any other type
//! is rejected at compile time.
//!
//! | type           | oid    | native types                                         |
//! |----------------|--------|------------------------------------------------------|
//! | [`Bool`]       | `16`   | `bool`                                               |
//! | [`Int2`]       | `21`   | integers, `&str`                                     |
//! | [`Int4`]       | `23`   | integers, `&str`                                     |
//! | [`Int8`]       | `20`   | integers, `&str`                                     |
//! | [`Text`]       | `25`   | `String`, `&str`                                     |
//! | [`Date`]       | `1082` | [`time::Date`]                                       |
//! | [`Timestamp`]  | `1114` | [`time::PrimitiveDateTime`]                          |
//! | [`Timestamptz`]| `1184` | [`time::OffsetDateTime`], [`time::UtcDateTime`]      |
//! | [`Array`]      |        | `Vec` of the above, nested `Vec` for more dimensions |
//!
//! Any native type `N` above is also accepted as `Option<N>`, where [`None`] is `NULL`.
use bytes::BytesMut;

use crate::{
    Status,
    postgres::{Oid, PgType},
};

mod error;
mod infinity;

mod boolean;
mod int;
mod text;
mod date;
mod timestamp;
mod timestamptz;

pub mod array;

pub use error::{ConversionError, WireError};
pub use infinity::InfinityModifier;

pub use boolean::Bool;
pub use int::{Int2, Int4, Int8};
pub use text::Text;
pub use date::Date;
pub use timestamp::Timestamp;
pub use timestamptz::Timestamptz;

pub use array::{
    Array, ArrayDimension, BoolArray, DateArray, Element, Int2Array, Int4Array, Int8Array,
    TextArray, TimestampArray, TimestamptzArray,
};

/// Returned by encoder to indicate whether the value is `NULL`.
///
/// A `NULL` value writes nothing, the caller writes the `-1` length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsNull {
    Yes,
    No,
}

/// A typed postgres value.
pub trait PgValue: PgType + Default + Sized {
    /// Returns the value status.
    fn status(&self) -> Status;

    /// Create a `NULL` value.
    fn null() -> Self;

    /// Decode from binary format, [`None`] is SQL `NULL`.
    fn decode_binary(src: Option<&[u8]>) -> Result<Self, WireError>;

    /// Decode from text format, [`None`] is SQL `NULL`.
    fn decode_text(src: Option<&[u8]>) -> Result<Self, WireError>;

    /// Encode in binary format.
    ///
    /// Encoding an [`Undefined`][Status::Undefined] value is an error.
    fn encode_binary(&self, buf: &mut BytesMut) -> Result<IsNull, WireError>;

    /// Encode in text format.
    ///
    /// Encoding an [`Undefined`][Status::Undefined] value is an error.
    fn encode_text(&self, buf: &mut BytesMut) -> Result<IsNull, WireError>;
}

/// Populate a typed value from native value `N`.
pub trait Set<N> {
    /// Set the value, `self` is untouched on failure.
    fn set(&mut self, value: N) -> Result<(), ConversionError>;
}

/// Convert a typed value into native value `N`.
pub trait AssignTo<N> {
    /// Convert into a new native value.
    fn assign(&self) -> Result<N, ConversionError>;

    /// Assign into `target`, `target` is untouched on failure.
    fn assign_to(&self, target: &mut N) -> Result<(), ConversionError> {
        *target = self.assign()?;
        Ok(())
    }
}

impl<T, N> Set<Option<N>> for T
where
    T: PgValue + Set<N>,
{
    fn set(&mut self, value: Option<N>) -> Result<(), ConversionError> {
        match value {
            Some(value) => <T as Set<N>>::set(self, value),
            None => {
                *self = T::null();
                Ok(())
            }
        }
    }
}

impl<T, N> AssignTo<Option<N>> for T
where
    T: PgValue + AssignTo<N>,
{
    fn assign(&self) -> Result<Option<N>, ConversionError> {
        match self.status() {
            Status::Null => Ok(None),
            _ => <T as AssignTo<N>>::assign(self).map(Some),
        }
    }
}

/// Status check before encoding, returns early for `NULL` and undefined value.
macro_rules! encode_status {
    ($me:ident) => {
        match $me.status {
            $crate::Status::Present => {}
            $crate::Status::Null => return Ok($crate::types::IsNull::Yes),
            $crate::Status::Undefined => {
                return Err($crate::types::WireError::EncodeUndefined { oid: Self::OID })
            }
        }
    };
}

pub(crate) use encode_status;

/// Status check before assigning into native `N`.
pub(crate) fn assign_status<N>(status: Status) -> Result<(), ConversionError> {
    match status {
        Status::Present => Ok(()),
        Status::Null => Err(ConversionError::null::<N>()),
        Status::Undefined => Err(ConversionError::undefined::<N>()),
    }
}

/// Read fixed size binary value.
pub(crate) fn fixed<const N: usize>(oid: Oid, src: &[u8]) -> Result<[u8; N], WireError> {
    src.try_into().map_err(|_| WireError::InvalidLength {
        oid,
        expected: N,
        found: src.len(),
    })
}

/// Read utf8 text value.
pub(crate) fn utf8(oid: Oid, src: &[u8]) -> Result<&str, WireError> {
    std::str::from_utf8(src).map_err(|_| WireError::Utf8 { oid, len: src.len() })
}

/// Assert every value survives both formats unchanged.
#[cfg(test)]
pub(crate) fn transcode<T: PgValue + PartialEq + std::fmt::Debug>(values: &[T]) {
    for value in values {
        let mut buf = BytesMut::new();
        let src = match value.encode_binary(&mut buf).unwrap() {
            IsNull::Yes => None,
            IsNull::No => Some(&buf[..]),
        };
        assert_eq!(&T::decode_binary(src).unwrap(), value, "{} binary", T::NAME);

        let mut buf = BytesMut::new();
        let src = match value.encode_text(&mut buf).unwrap() {
            IsNull::Yes => None,
            IsNull::No => Some(&buf[..]),
        };
        assert_eq!(&T::decode_text(src).unwrap(), value, "{} text", T::NAME);
    }
}
