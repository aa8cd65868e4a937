use bytes::{BufMut, BytesMut};

use super::{AssignTo, ConversionError, IsNull, PgValue, Set, WireError, assign_status, encode_status, fixed};
use crate::{
    Status,
    postgres::{Oid, PgType, oid},
};

/// `bool`, single byte boolean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bool {
    pub bool: bool,
    pub status: Status,
}

impl Bool {
    /// Create present value.
    pub const fn new(bool: bool) -> Self {
        Self { bool, status: Status::Present }
    }
}

impl PgType for Bool {
    const OID: Oid = oid::BOOL;
    const NAME: &'static str = "bool";
}

impl super::Element for Bool {
    const ARRAY_OID: Oid = oid::BOOL_ARRAY;
    const ARRAY_NAME: &'static str = "_bool";
}

impl PgValue for Bool {
    fn status(&self) -> Status {
        self.status
    }

    fn null() -> Self {
        Self { bool: false, status: Status::Null }
    }

    fn decode_binary(src: Option<&[u8]>) -> Result<Self, WireError> {
        let Some(src) = src else {
            return Ok(Self::null());
        };
        match fixed::<1>(Self::OID, src)? {
            [0] => Ok(Self::new(false)),
            [1] => Ok(Self::new(true)),
            _ => Err(WireError::malformed(Self::OID, 1, "boolean byte is not 0 or 1")),
        }
    }

    fn decode_text(src: Option<&[u8]>) -> Result<Self, WireError> {
        let Some(src) = src else {
            return Ok(Self::null());
        };
        match src {
            b"t" | b"true" => Ok(Self::new(true)),
            b"f" | b"false" => Ok(Self::new(false)),
            _ => Err(WireError::malformed(Self::OID, src.len(), "invalid boolean")),
        }
    }

    fn encode_binary(&self, buf: &mut BytesMut) -> Result<IsNull, WireError> {
        encode_status!(self);
        buf.put_u8(self.bool.into());
        Ok(IsNull::No)
    }

    fn encode_text(&self, buf: &mut BytesMut) -> Result<IsNull, WireError> {
        encode_status!(self);
        buf.put_u8(if self.bool { b't' } else { b'f' });
        Ok(IsNull::No)
    }
}

impl Set<bool> for Bool {
    fn set(&mut self, value: bool) -> Result<(), ConversionError> {
        *self = Self::new(value);
        Ok(())
    }
}

impl AssignTo<bool> for Bool {
    fn assign(&self) -> Result<bool, ConversionError> {
        assign_status::<bool>(self.status)?;
        Ok(self.bool)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn transcode() {
        crate::types::transcode(&[Bool::new(true), Bool::new(false), Bool::null()]);
        assert_eq!(Bool::decode_text(None).unwrap(), Bool::null());
        assert!(Bool::decode_binary(Some(&[2])).is_err());
        assert!(Bool::decode_text(Some(b"yes")).is_err());
    }

    #[test]
    fn assign() {
        let mut target = true;
        assert!(Bool::null().assign_to(&mut target).is_err());
        assert!(target);

        Bool::new(false).assign_to(&mut target).unwrap();
        assert!(!target);

        let mut value = Bool::default();
        value.set(Some(true)).unwrap();
        assert_eq!(value, Bool::new(true));
    }
}
