//! Postgres large object.
//!
//! A large object is a server side byte stream addressed by [`Oid`]. It is
//! accessed through a descriptor that only lives as long as the transaction
//! which opened it, so everything here borrows a [`Transaction`].
//!
//! Every operation is one [fast-path][crate::fastpath] call.
//!
//! ```no_run
//! # async fn test(conn: &mut impl pgtype::transport::PgTransport) -> pgtype::Result<()> {
//! use pgtype::large_object::{Mode, Whence};
//!
//! let mut tx = pgtype::begin(conn).await?;
//! let mut objects = tx.large_objects();
//!
//! let oid = objects.create(0).await?;
//! let mut lo = objects.open(oid, Mode::READ | Mode::WRITE).await?;
//! lo.write(b"testing").await?;
//! lo.seek(0, Whence::Start).await?;
//!
//! let mut buf = [0u8; 16];
//! let read = lo.read(&mut buf).await?;
//! assert_eq!(&buf[..read.n], b"testing");
//! assert!(read.eof);
//!
//! lo.close().await?;
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```
//!
//! <https://www.postgresql.org/docs/current/lo-interfaces.html>
use bytes::Bytes;
use std::{fmt, ops::BitOr};

use crate::{
    Error, Result,
    common::verbose,
    ext::UsizeExt,
    fastpath::{self, expect_value},
    postgres::{Oid, ProtocolError, frontend::FnArg, oid::{INT4, INT8, OID}},
    transaction::Transaction,
    transport::PgTransport,
    types::fixed,
};

mod config;

pub use config::{Config, MAX_CHUNK_SIZE};

macro_rules! functions {
    ($($name:ident = $oid:literal;)*) => {
        /// Server side large object functions, by `pg_proc` oid.
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy)]
        enum Function {
            $($name,)*
        }

        impl Function {
            fn oid(self) -> Oid {
                match self {
                    $(Self::$name => $oid,)*
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }
        }
    };
}

functions! {
    lo_create = 715;
    lo_open = 952;
    lo_close = 953;
    loread = 954;
    lowrite = 955;
    lo_unlink = 964;
    lo_lseek64 = 3170;
    lo_tell64 = 3171;
    lo_truncate64 = 3172;
}

async fn call<IO: PgTransport>(
    tx: &mut Transaction<IO>,
    function: Function,
    args: &[FnArg<'_>],
) -> Result<Option<Bytes>> {
    verbose!(function = function.name(), "large object");
    fastpath::call(tx, function.oid(), args)
        .await
        .map_err(|err| err.context(function.name()))
}

async fn call_int4<IO: PgTransport>(
    tx: &mut Transaction<IO>,
    function: Function,
    args: &[FnArg<'_>],
) -> Result<i32> {
    let value = expect_value(function.name(), call(tx, function, args).await?)?;
    match fixed(INT4, &value) {
        Ok(int) => Ok(i32::from_be_bytes(int)),
        Err(err) => Err(Error::from(err).context(function.name())),
    }
}

async fn call_int8<IO: PgTransport>(
    tx: &mut Transaction<IO>,
    function: Function,
    args: &[FnArg<'_>],
) -> Result<i64> {
    let value = expect_value(function.name(), call(tx, function, args).await?)?;
    match fixed(INT8, &value) {
        Ok(int) => Ok(i64::from_be_bytes(int)),
        Err(err) => Err(Error::from(err).context(function.name())),
    }
}

/// Large object open mode.
///
/// Combine with `|`, e.g. `Mode::READ | Mode::WRITE`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mode(i32);

impl Mode {
    /// `INV_WRITE`
    pub const WRITE: Mode = Mode(0x20000);
    /// `INV_READ`
    pub const READ: Mode = Mode(0x40000);

    /// Mode without any bit, opening with it is an error.
    pub const fn empty() -> Mode {
        Mode(0)
    }

    /// The raw bits sent to the server.
    pub const fn bits(self) -> i32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 & (Self::READ.0 | Self::WRITE.0) == 0
    }

    /// Returns `true` if all bits of `other` are set.
    pub const fn contains(self, other: Mode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Mode {
    type Output = Mode;

    fn bitor(self, rhs: Mode) -> Mode {
        Mode(self.0 | rhs.0)
    }
}

impl fmt::Debug for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.contains(Self::READ), self.contains(Self::WRITE)) {
            (true, true) => f.write_str("READ | WRITE"),
            (true, false) => f.write_str("READ"),
            (false, true) => f.write_str("WRITE"),
            (false, false) => f.write_str("EMPTY"),
        }
    }
}

/// Reference point of [`LargeObject::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// `SEEK_SET`
    Start,
    /// `SEEK_CUR`
    Current,
    /// `SEEK_END`
    End,
}

impl Whence {
    fn to_i32(self) -> i32 {
        match self {
            Whence::Start => 0,
            Whence::Current => 1,
            Whence::End => 2,
        }
    }
}

/// The result of [`LargeObject::read`].
///
/// A read that fills less than the buffer reports the bytes it got *and*
/// the end of stream, there is no extra empty read needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Number of bytes written into the buffer.
    pub n: usize,
    /// The end of the object is reached.
    pub eof: bool,
}

/// Large object interface of a [`Transaction`].
///
/// Created by [`Transaction::large_objects`].
pub struct LargeObjects<'tx, IO: PgTransport> {
    tx: &'tx mut Transaction<IO>,
    config: Config,
}

impl<'tx, IO> LargeObjects<'tx, IO>
where
    IO: PgTransport
{
    pub(crate) fn new(tx: &'tx mut Transaction<IO>, config: Config) -> Self {
        Self { tx, config }
    }

    /// Create a new large object.
    ///
    /// `0` let the server assign the oid. Returns the oid of the new object.
    pub async fn create(&mut self, oid: Oid) -> Result<Oid> {
        let value = call(self.tx, Function::lo_create, &[FnArg::Oid(oid)]).await?;
        let value = expect_value(Function::lo_create.name(), value)?;
        match fixed(OID, &value) {
            Ok(oid) => Ok(u32::from_be_bytes(oid)),
            Err(err) => Err(Error::from(err).context(Function::lo_create.name())),
        }
    }

    /// Open an existing large object.
    ///
    /// Missing object is a server error with code `42704`.
    pub async fn open(&mut self, oid: Oid, mode: Mode) -> Result<LargeObject<'_, IO>> {
        if mode.is_empty() {
            return Err(Error::from(LargeObjectError::EmptyMode).context(Function::lo_open.name()));
        }

        let args = [FnArg::Oid(oid), FnArg::Int4(mode.bits())];
        let fd = call_int4(self.tx, Function::lo_open, &args).await?;
        verbose!(oid, fd, ?mode, "large object open");

        Ok(LargeObject { tx: &mut *self.tx, config: self.config, oid, fd, mode })
    }

    /// Delete a large object.
    ///
    /// Missing object is a server error with code `42704`.
    pub async fn unlink(&mut self, oid: Oid) -> Result<()> {
        call_int4(self.tx, Function::lo_unlink, &[FnArg::Oid(oid)]).await?;
        Ok(())
    }
}

/// An open large object descriptor.
///
/// Created by [`LargeObjects::open`], the descriptor is closed by
/// [`LargeObject::close`] or when the transaction ends.
pub struct LargeObject<'a, IO: PgTransport> {
    tx: &'a mut Transaction<IO>,
    config: Config,
    oid: Oid,
    fd: i32,
    mode: Mode,
}

impl<IO> LargeObject<'_, IO>
where
    IO: PgTransport
{
    /// The object oid.
    pub fn oid(&self) -> Oid {
        self.oid
    }

    /// The server descriptor.
    pub fn fd(&self) -> i32 {
        self.fd
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Write `buf` at current position.
    ///
    /// Returns the number of bytes written, which is less than `buf` length
    /// only when the server accept less.
    pub async fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if !self.mode.contains(Mode::WRITE) {
            let err = LargeObjectError::NotWritable { fd: self.fd };
            return Err(Error::from(err).context(Function::lowrite.name()));
        }

        let mut written = 0;

        for chunk in buf.chunks(self.config.chunk_size) {
            let args = [FnArg::Int4(self.fd), FnArg::Bytes(chunk)];
            let n = call_int4(self.tx, Function::lowrite, &args).await?;
            let Some(n) = usize::try_from(n).ok().filter(|n| *n <= chunk.len()) else {
                let err = ProtocolError::malformed("lowrite count outside the written chunk");
                return Err(Error::from(err).context(Function::lowrite.name()));
            };
            written += n;
            if n < chunk.len() {
                break;
            }
        }

        verbose!(fd = self.fd, written, "large object write");

        Ok(written)
    }

    /// Read into `buf` from current position.
    ///
    /// Empty `buf` returns immediately without end of stream.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        if buf.is_empty() {
            return Ok(ReadOutcome { n: 0, eof: false });
        }

        let mut n = 0;

        for chunk in buf.chunks_mut(self.config.chunk_size) {
            let args = [FnArg::Int4(self.fd), FnArg::Int4(chunk.len().to_i32())];
            let value = call(self.tx, Function::loread, &args).await?;
            let value = expect_value(Function::loread.name(), value)?;

            let Some(target) = chunk.get_mut(..value.len()) else {
                let err = ProtocolError::malformed("loread returned more than requested");
                return Err(Error::from(err).context(Function::loread.name()));
            };
            target.copy_from_slice(&value);
            n += value.len();

            if value.len() < chunk.len() {
                verbose!(fd = self.fd, n, "large object read eof");
                return Ok(ReadOutcome { n, eof: true });
            }
        }

        Ok(ReadOutcome { n, eof: false })
    }

    /// Move current position, returns the new position.
    pub async fn seek(&mut self, offset: i64, whence: Whence) -> Result<i64> {
        let args = [FnArg::Int4(self.fd), FnArg::Int8(offset), FnArg::Int4(whence.to_i32())];
        call_int8(self.tx, Function::lo_lseek64, &args).await
    }

    /// Returns current position.
    pub async fn tell(&mut self) -> Result<i64> {
        call_int8(self.tx, Function::lo_tell64, &[FnArg::Int4(self.fd)]).await
    }

    /// Truncate or extend the object to `size` bytes.
    pub async fn truncate(&mut self, size: i64) -> Result<()> {
        let args = [FnArg::Int4(self.fd), FnArg::Int8(size)];
        call_int4(self.tx, Function::lo_truncate64, &args).await?;
        Ok(())
    }

    /// Close the descriptor.
    pub async fn close(self) -> Result<()> {
        call_int4(self.tx, Function::lo_close, &[FnArg::Int4(self.fd)]).await?;
        verbose!(fd = self.fd, "large object close");
        Ok(())
    }
}

impl<IO> fmt::Debug for LargeObject<'_, IO>
where
    IO: PgTransport
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LargeObject")
            .field("oid", &self.oid)
            .field("fd", &self.fd)
            .field("mode", &self.mode)
            .finish()
    }
}

/// Large object misuse detected before any request.
pub enum LargeObjectError {
    /// Open mode have neither [`Mode::READ`] nor [`Mode::WRITE`].
    EmptyMode,
    /// Write to descriptor opened without [`Mode::WRITE`].
    NotWritable { fd: i32 },
}

impl std::error::Error for LargeObjectError { }

impl fmt::Display for LargeObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMode => f.write_str("large object open mode is empty"),
            Self::NotWritable { fd } => write!(f, "large object descriptor {fd} was not opened for writing"),
        }
    }
}

impl fmt::Debug for LargeObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
