use bytes::{Buf, BufMut, Bytes};

use crate::{common::ByteStr, postgres::ProtocolError};

/// Integer signess in postgres docs is awful.
pub trait UsizeExt {
    /// Length is `usize` in rust, while sometime postgres want `u32`,
    /// this will panic when overflow instead of wrapping.
    fn to_u32(self) -> u32;
    /// Length is `usize` in rust, while sometime postgres want `u16`,
    /// this will panic when overflow instead of wrapping.
    fn to_u16(self) -> u16;
    /// Length is `usize` in rust, while length prefixed value want `i32`,
    /// this will panic when overflow instead of wrapping.
    fn to_i32(self) -> i32;
}

/// Nul string operation.
pub trait StrExt {
    /// String length plus nul (1).
    fn nul_string_len(&self) -> u32;
}

/// Nul string operation in [`BufMut`]
pub trait BufMutExt {
    /// Write string and nul termination.
    fn put_nul_string(&mut self, string: &str);
}

/// Nul string operation in [`Bytes`]
pub trait BytesExt {
    /// Try to read nul terminated string.
    ///
    /// Using [`ByteStr`] avoid allocating [`Vec`] as it required for [`String::from_utf8`]
    fn get_nul_bytestr(&mut self) -> Result<ByteStr, ProtocolError>;
}

/// Checked split over a borrowed value.
///
/// Integer reads use [`Buf::try_get_i32`] and friends, this is the
/// borrowed counterpart of [`Bytes::split_to`] that does not panic.
pub trait SliceExt<'a> {
    /// Split `len` bytes off the front.
    fn try_split_to(&mut self, len: usize) -> Option<&'a [u8]>;
}

impl UsizeExt for usize {
    fn to_u32(self) -> u32 {
        self.try_into().expect("message size too large for protocol")
    }

    fn to_u16(self) -> u16 {
        self.try_into().expect("message size too large for protocol")
    }

    fn to_i32(self) -> i32 {
        self.try_into().expect("value size too large for protocol")
    }
}

impl StrExt for str {
    fn nul_string_len(&self) -> u32 {
        self.len().to_u32() + 1/* nul */
    }
}

impl<B: BufMut> BufMutExt for B {
    fn put_nul_string(&mut self, string: &str) {
        self.put(string.as_bytes());
        self.put_u8(b'\0');
    }
}

impl BytesExt for Bytes {
    fn get_nul_bytestr(&mut self) -> Result<ByteStr, ProtocolError> {
        let Some(end) = self.iter().position(|e| matches!(e, b'\0')) else {
            return Err(ProtocolError::malformed("string is not nul terminated"));
        };
        let me = self.split_to(end);
        Buf::advance(self, 1); // nul
        ByteStr::from_utf8(me).map_err(|_| ProtocolError::malformed("string is not utf8"))
    }
}

impl<'a> SliceExt<'a> for &'a [u8] {
    fn try_split_to(&mut self, len: usize) -> Option<&'a [u8]> {
        if self.len() < len {
            return None;
        }
        let (me, rest) = self.split_at(len);
        *self = rest;
        Some(me)
    }
}
