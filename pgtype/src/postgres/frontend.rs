//! Postgres Frontend Messages
//!
//! <https://www.postgresql.org/docs/current/protocol-message-formats.html>
use bytes::{BufMut, BytesMut};

use super::{Oid, PgFormat};
use crate::ext::{BufMutExt, StrExt, UsizeExt};

/// Write a frontend message to `buf`.
pub fn write<F: FrontendProtocol>(msg: F, buf: &mut BytesMut) {
    // msgtype + length
    const PREFIX: usize = 1 + 4;

    let size_hint = msg.size_hint();
    buf.reserve(PREFIX + size_hint as usize);

    let offset = buf.len();
    buf.put_u8(F::MSGTYPE);
    buf.put_u32(4 + size_hint);

    msg.encode(&mut *buf);

    assert_eq!(
        buf.len() - offset,
        PREFIX + size_hint as usize,
        "Frontend message body size not equal to size hint"
    );
}

/// A type which can be encoded into postgres frontend message
pub trait FrontendProtocol {
    /// Message type.
    const MSGTYPE: u8;

    /// Size of the main body.
    ///
    /// Note that this is **only** the size of main body as oppose of actual postgres message which
    /// include the length itself.
    fn size_hint(&self) -> u32;

    /// Write the main body of the message.
    ///
    /// The lenght of body written must be equal to the
    /// length returned by [`size_hint`][FrontendProtocol::size_hint].
    fn encode(self, buf: impl BufMut);
}

/// Identifies the message as a simple query
#[derive(Debug)]
pub struct Query<'a> {
    /// the query string itself
    pub sql: &'a str,
}

impl FrontendProtocol for Query<'_> {
    const MSGTYPE: u8 = b'Q';

    fn size_hint(&self) -> u32 {
        self.sql.nul_string_len()
    }

    fn encode(self, mut buf: impl BufMut) {
        buf.put_nul_string(self.sql);
    }
}

/// An argument of a [`FunctionCall`].
///
/// Arguments are always sent in [`Binary`][PgFormat::Binary] format.
#[derive(Debug, Clone, Copy)]
pub enum FnArg<'a> {
    /// `int4` argument.
    Int4(i32),
    /// `int8` argument.
    Int8(i64),
    /// `oid` argument.
    Oid(Oid),
    /// `bytea` argument.
    Bytes(&'a [u8]),
}

impl FnArg<'_> {
    /// The length of the argument value, in bytes (this count does not include itself).
    pub fn len(&self) -> usize {
        match self {
            FnArg::Int4(_) | FnArg::Oid(_) => size_of::<i32>(),
            FnArg::Int8(_) => size_of::<i64>(),
            FnArg::Bytes(bytes) => bytes.len(),
        }
    }

    /// Returns `true` if argument value have zero length.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn put(&self, mut buf: impl BufMut) {
        match *self {
            FnArg::Int4(int) => buf.put_i32(int),
            FnArg::Int8(int) => buf.put_i64(int),
            FnArg::Oid(oid) => buf.put_u32(oid),
            FnArg::Bytes(bytes) => buf.put_slice(bytes),
        }
    }
}

/// Identifies the message as a function call.
///
/// This is the fast-path interface, it calls a server function directly by
/// its [`Oid`] without going through the query parser.
#[derive(Debug)]
pub struct FunctionCall<'a> {
    /// Specifies the object ID of the function to call.
    pub function: Oid,
    /// The arguments to the function.
    pub args: &'a [FnArg<'a>],
    /// The format code for the function result.
    pub result_format: PgFormat,
}

impl FrontendProtocol for FunctionCall<'_> {
    const MSGTYPE: u8 = b'F';

    fn size_hint(&self) -> u32 {
        let args = self
            .args
            .iter()
            .map(|arg| size_of::<i32>().to_u32() + arg.len().to_u32())
            .sum::<u32>();

        size_of::<Oid>().to_u32()
            // one format code applied to all arguments
            + size_of::<u16>().to_u32() * 2
            + size_of::<u16>().to_u32()
            + args
            + size_of::<u16>().to_u32()
    }

    fn encode(self, mut buf: impl BufMut) {
        buf.put_u32(self.function);

        buf.put_u16(1);
        buf.put_u16(PgFormat::Binary.format_code());

        buf.put_u16(self.args.len().to_u16());
        for arg in self.args {
            buf.put_i32(arg.len().to_i32());
            arg.put(&mut buf);
        }

        buf.put_u16(self.result_format.format_code());
    }
}
