//! Codec error types.
use std::{any::type_name, fmt};

use super::InfinityModifier;
use crate::postgres::Oid;

/// An error when converting between typed value and native value.
pub enum ConversionError {
    /// Value was never populated.
    Undefined {
        to: &'static str,
    },
    /// `NULL` into a target without null representation.
    Null {
        to: &'static str,
    },
    /// Value does not fit in the target.
    OutOfRange {
        value: String,
        from: &'static str,
        to: &'static str,
    },
    /// String could not be parsed as the target.
    Unparsable {
        value: String,
        to: &'static str,
    },
    /// Infinite temporal value into a finite target.
    Infinite {
        modifier: InfinityModifier,
        to: &'static str,
    },
    /// Array shape does not match the native sequence.
    Dimensions {
        reason: &'static str,
    },
}

impl ConversionError {
    pub(crate) fn undefined<T>() -> Self {
        Self::Undefined { to: type_name::<T>() }
    }

    pub(crate) fn null<T>() -> Self {
        Self::Null { to: type_name::<T>() }
    }

    pub(crate) fn out_of_range<F: fmt::Display, T>(value: F) -> Self {
        Self::OutOfRange {
            value: value.to_string(),
            from: type_name::<F>(),
            to: type_name::<T>(),
        }
    }

    pub(crate) fn unparsable<T>(value: &str) -> Self {
        Self::Unparsable { value: value.into(), to: type_name::<T>() }
    }

    pub(crate) fn infinite<T>(modifier: InfinityModifier) -> Self {
        Self::Infinite { modifier, to: type_name::<T>() }
    }

    pub(crate) fn dimensions(reason: &'static str) -> Self {
        Self::Dimensions { reason }
    }
}

impl std::error::Error for ConversionError { }

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined { to } => write!(f, "cannot assign undefined value to `{to}`"),
            Self::Null { to } => write!(f, "cannot assign NULL to `{to}`"),
            Self::OutOfRange { value, from, to } => {
                write!(f, "`{from}` value {value} is out of range for `{to}`")
            }
            Self::Unparsable { value, to } => write!(f, "cannot parse {value:?} as `{to}`"),
            Self::Infinite { modifier, to } => write!(f, "cannot assign {modifier} to `{to}`"),
            Self::Dimensions { reason } => write!(f, "dimension mismatch: {reason}"),
        }
    }
}

impl fmt::Debug for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// An error when reading or writing postgres wire format.
///
/// Every variant names the type oid, and the raw length where one exists.
pub enum WireError {
    /// Fixed size type with unexpected length.
    InvalidLength {
        oid: Oid,
        expected: usize,
        found: usize,
    },
    /// Value ended before a length prefixed field.
    Truncated {
        oid: Oid,
        len: usize,
    },
    /// Value is not in the expected format.
    Malformed {
        oid: Oid,
        len: usize,
        reason: &'static str,
    },
    /// Text value is not utf8.
    Utf8 {
        oid: Oid,
        len: usize,
    },
    /// Array elements count does not match its dimensions.
    Dimensions {
        oid: Oid,
        elements: usize,
        expected: usize,
    },
    /// Value is valid in postgres but not representable in native type.
    OutOfRange {
        oid: Oid,
    },
    /// Attempt to encode an undefined value.
    EncodeUndefined {
        oid: Oid,
    },
    /// No codec registered for the oid.
    UnknownOid {
        oid: Oid,
    },
    /// Codec received value of other type.
    TypeMismatch {
        oid: Oid,
        found: Oid,
    },
}

impl WireError {
    pub(crate) fn malformed(oid: Oid, len: usize, reason: &'static str) -> Self {
        Self::Malformed { oid, len, reason }
    }
}

impl std::error::Error for WireError { }

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength { oid, expected, found } => {
                write!(f, "invalid length for oid {oid}: expected {expected}, found {found}")
            }
            Self::Truncated { oid, len } => write!(f, "truncated value for oid {oid} ({len} bytes)"),
            Self::Malformed { oid, len, reason } => {
                write!(f, "malformed value for oid {oid} ({len} bytes): {reason}")
            }
            Self::Utf8 { oid, len } => write!(f, "invalid utf8 for oid {oid} ({len} bytes)"),
            Self::Dimensions { oid, elements, expected } => write!(
                f,
                "array of oid {oid} have {elements} elements, dimensions require {expected}"
            ),
            Self::OutOfRange { oid } => write!(f, "value of oid {oid} is out of native range"),
            Self::EncodeUndefined { oid } => write!(f, "cannot encode undefined value of oid {oid}"),
            Self::UnknownOid { oid } => write!(f, "no codec for oid {oid}"),
            Self::TypeMismatch { oid, found } => {
                write!(f, "codec for oid {oid} received value of oid {found}")
            }
        }
    }
}

impl fmt::Debug for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
