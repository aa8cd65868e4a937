use std::fmt;

/// Infinity sentinel of temporal types.
///
/// Orthogonal to the time payload, when not [`None`][InfinityModifier::None]
/// the payload holds the postgres epoch and must not be read as an instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InfinityModifier {
    /// Finite value.
    #[default]
    None,
    /// `infinity`, later than every other value.
    Infinity,
    /// `-infinity`, earlier than every other value.
    NegativeInfinity,
}

impl InfinityModifier {
    /// Returns the postgres text token, or [`None`] for finite value.
    pub fn as_token(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Infinity => Some("infinity"),
            Self::NegativeInfinity => Some("-infinity"),
        }
    }

    pub(crate) fn from_token(src: &[u8]) -> Self {
        match src {
            b"infinity" => Self::Infinity,
            b"-infinity" => Self::NegativeInfinity,
            _ => Self::None,
        }
    }

    /// Map the binary sentinels of an integer representation.
    pub(crate) fn from_sentinel<I: Ord + Copy>(value: I, min: I, max: I) -> Self {
        if value == max {
            Self::Infinity
        } else if value == min {
            Self::NegativeInfinity
        } else {
            Self::None
        }
    }
}

impl fmt::Display for InfinityModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token().unwrap_or("finite"))
    }
}

/// Shared temporal codec plumbing.
///
/// `$name` must have `status`, `infinity` and a payload field, `$zero` is
/// the payload of a non finite or null value.
macro_rules! temporal {
    (
        $name:ident, $field:ident: $native:ty = $zero:expr,
        sentinel $int:ty,
        oid $oid:path, $pgname:literal,
        array $arr_oid:path, $arr_name:literal
    ) => {
        impl $name {
            /// Create present finite value.
            pub const fn new($field: $native) -> Self {
                Self { $field, infinity: InfinityModifier::None, status: Status::Present }
            }

            /// Create present infinite value.
            pub const fn infinite(infinity: InfinityModifier) -> Self {
                Self { $field: $zero, infinity, status: Status::Present }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self { $field: $zero, infinity: InfinityModifier::None, status: Status::Undefined }
            }
        }

        impl PgType for $name {
            const OID: Oid = $oid;
            const NAME: &'static str = $pgname;
        }

        impl crate::types::Element for $name {
            const ARRAY_OID: Oid = $arr_oid;
            const ARRAY_NAME: &'static str = $arr_name;
        }

        impl PgValue for $name {
            fn status(&self) -> Status {
                self.status
            }

            fn null() -> Self {
                Self { status: Status::Null, ..Default::default() }
            }

            fn decode_binary(src: Option<&[u8]>) -> Result<Self, WireError> {
                let Some(src) = src else {
                    return Ok(Self::null());
                };
                let int = <$int>::from_be_bytes(fixed(Self::OID, src)?);
                match InfinityModifier::from_sentinel(int, <$int>::MIN, <$int>::MAX) {
                    InfinityModifier::None => Ok(Self::new(Self::from_wire(int)?)),
                    infinity => Ok(Self::infinite(infinity)),
                }
            }

            fn decode_text(src: Option<&[u8]>) -> Result<Self, WireError> {
                let Some(src) = src else {
                    return Ok(Self::null());
                };
                match InfinityModifier::from_token(src) {
                    InfinityModifier::None => Ok(Self::new(Self::parse(src)?)),
                    infinity => Ok(Self::infinite(infinity)),
                }
            }

            fn encode_binary(&self, buf: &mut BytesMut) -> Result<IsNull, WireError> {
                encode_status!(self);
                let int = match self.infinity {
                    InfinityModifier::None => self.to_wire()?,
                    InfinityModifier::Infinity => <$int>::MAX,
                    InfinityModifier::NegativeInfinity => <$int>::MIN,
                };
                buf.put_slice(&int.to_be_bytes());
                Ok(IsNull::No)
            }

            fn encode_text(&self, buf: &mut BytesMut) -> Result<IsNull, WireError> {
                encode_status!(self);
                match self.infinity.as_token() {
                    Some(token) => buf.put_slice(token.as_bytes()),
                    None => buf.put_slice(self.format()?.as_bytes()),
                }
                Ok(IsNull::No)
            }
        }
    };
}

/// Generate [`Set`] and [`AssignTo`] of a native temporal type.
///
/// Conversion goes through `$into` and `$from` which take and return the payload type.
macro_rules! temporal_native {
    ($name:ident, $native:ty, |$v:ident| $into:expr, |$p:ident| $from:expr) => {
        impl Set<$native> for $name {
            fn set(&mut self, $v: $native) -> Result<(), ConversionError> {
                *self = Self::new($into);
                Ok(())
            }
        }

        impl AssignTo<$native> for $name {
            fn assign(&self) -> Result<$native, ConversionError> {
                assign_status::<$native>(self.status)?;
                if self.infinity != InfinityModifier::None {
                    return Err(ConversionError::infinite::<$native>(self.infinity));
                }
                let $p = self.value();
                Ok($from)
            }
        }
    };
}

pub(crate) use temporal;
pub(crate) use temporal_native;
