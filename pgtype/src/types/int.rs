use bytes::{BufMut, BytesMut};

use super::{
    AssignTo, ConversionError, Element, IsNull, PgValue, Set, WireError, assign_status,
    encode_status, fixed, utf8,
};
use crate::{
    Status,
    postgres::{Oid, PgType, oid},
};

macro_rules! int {
    (
        $(#[$doc:meta])*
        $name:ident($int:ty), $oid:path, $pgname:literal,
        array $arr_oid:path, $arr_name:literal
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name {
            pub int: $int,
            pub status: Status,
        }

        impl $name {
            /// Create present value.
            pub const fn new(int: $int) -> Self {
                Self { int, status: Status::Present }
            }
        }

        impl PgType for $name {
            const OID: Oid = $oid;
            const NAME: &'static str = $pgname;
        }

        impl Element for $name {
            const ARRAY_OID: Oid = $arr_oid;
            const ARRAY_NAME: &'static str = $arr_name;
        }

        impl PgValue for $name {
            fn status(&self) -> Status {
                self.status
            }

            fn null() -> Self {
                Self { int: 0, status: Status::Null }
            }

            fn decode_binary(src: Option<&[u8]>) -> Result<Self, WireError> {
                let Some(src) = src else {
                    return Ok(Self::null());
                };
                Ok(Self::new(<$int>::from_be_bytes(fixed(Self::OID, src)?)))
            }

            fn decode_text(src: Option<&[u8]>) -> Result<Self, WireError> {
                let Some(src) = src else {
                    return Ok(Self::null());
                };
                match utf8(Self::OID, src)?.parse() {
                    Ok(int) => Ok(Self::new(int)),
                    Err(_) => Err(WireError::malformed(Self::OID, src.len(), "invalid integer")),
                }
            }

            fn encode_binary(&self, buf: &mut BytesMut) -> Result<IsNull, WireError> {
                encode_status!(self);
                buf.put_slice(&self.int.to_be_bytes());
                Ok(IsNull::No)
            }

            fn encode_text(&self, buf: &mut BytesMut) -> Result<IsNull, WireError> {
                encode_status!(self);
                buf.put_slice(itoa::Buffer::new().format(self.int).as_bytes());
                Ok(IsNull::No)
            }
        }

        impl<'a> Set<&'a str> for $name {
            fn set(&mut self, value: &'a str) -> Result<(), ConversionError> {
                let int = value
                    .parse::<$int>()
                    .map_err(|_| ConversionError::unparsable::<$int>(value))?;
                *self = Self::new(int);
                Ok(())
            }
        }

        int_native!($name($int): i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
    };
}

/// Range checked conversion with every native integer.
macro_rules! int_native {
    ($name:ident($int:ty): $($native:ty),*) => {$(
        impl Set<$native> for $name {
            fn set(&mut self, value: $native) -> Result<(), ConversionError> {
                let int = <$int>::try_from(value)
                    .map_err(|_| ConversionError::out_of_range::<$native, $int>(value))?;
                *self = Self::new(int);
                Ok(())
            }
        }

        impl AssignTo<$native> for $name {
            fn assign(&self) -> Result<$native, ConversionError> {
                assign_status::<$native>(self.status)?;
                <$native>::try_from(self.int)
                    .map_err(|_| ConversionError::out_of_range::<$int, $native>(self.int))
            }
        }
    )*};
}

int! {
    /// `int2`, signed two-byte integer.
    Int2(i16), oid::INT2, "int2",
    array oid::INT2_ARRAY, "_int2"
}

int! {
    /// `int4`, signed four-byte integer.
    Int4(i32), oid::INT4, "int4",
    array oid::INT4_ARRAY, "_int4"
}

int! {
    /// `int8`, signed eight-byte integer.
    Int8(i64), oid::INT8, "int8",
    array oid::INT8_ARRAY, "_int8"
}
