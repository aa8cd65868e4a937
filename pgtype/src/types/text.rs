use bytes::{BufMut, BytesMut};

use super::{AssignTo, ConversionError, IsNull, PgValue, Set, WireError, assign_status, encode_status, utf8};
use crate::{
    Status,
    postgres::{Oid, PgType, oid},
};

/// `text`, variable-length string.
///
/// Also used for `varchar`, both share the same wire format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    pub string: String,
    pub status: Status,
}

impl Text {
    /// Create present value.
    pub fn new(string: impl Into<String>) -> Self {
        Self { string: string.into(), status: Status::Present }
    }

    fn decode(src: Option<&[u8]>) -> Result<Self, WireError> {
        match src {
            Some(src) => Ok(Self::new(utf8(Self::OID, src)?)),
            None => Ok(Self::null()),
        }
    }

    fn encode(&self, buf: &mut BytesMut) -> Result<IsNull, WireError> {
        encode_status!(self);
        buf.put_slice(self.string.as_bytes());
        Ok(IsNull::No)
    }
}

impl PgType for Text {
    const OID: Oid = oid::TEXT;
    const NAME: &'static str = "text";
}

impl super::Element for Text {
    const ARRAY_OID: Oid = oid::TEXT_ARRAY;
    const ARRAY_NAME: &'static str = "_text";
}

/// Binary and text format are the same.
impl PgValue for Text {
    fn status(&self) -> Status {
        self.status
    }

    fn null() -> Self {
        Self { string: String::new(), status: Status::Null }
    }

    fn decode_binary(src: Option<&[u8]>) -> Result<Self, WireError> {
        Self::decode(src)
    }

    fn decode_text(src: Option<&[u8]>) -> Result<Self, WireError> {
        Self::decode(src)
    }

    fn encode_binary(&self, buf: &mut BytesMut) -> Result<IsNull, WireError> {
        self.encode(buf)
    }

    fn encode_text(&self, buf: &mut BytesMut) -> Result<IsNull, WireError> {
        self.encode(buf)
    }
}

impl Set<String> for Text {
    fn set(&mut self, value: String) -> Result<(), ConversionError> {
        *self = Self::new(value);
        Ok(())
    }
}

impl<'a> Set<&'a str> for Text {
    fn set(&mut self, value: &'a str) -> Result<(), ConversionError> {
        *self = Self::new(value);
        Ok(())
    }
}

impl AssignTo<String> for Text {
    fn assign(&self) -> Result<String, ConversionError> {
        assign_status::<String>(self.status)?;
        Ok(self.string.clone())
    }
}
