//! `pgtype` error types.
use std::{backtrace::Backtrace, fmt, io};

use crate::{
    large_object::LargeObjectError,
    postgres::{ErrorResponse, ProtocolError},
    transaction::CommitRolledBack,
    types::{ConversionError, WireError},
};

/// A specialized [`Result`] type for `pgtype` operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All possible error from `pgtype` library.
pub struct Error {
    context: String,
    backtrace: Backtrace,
    kind: ErrorKind,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Returns the SQLSTATE code if this is a server error.
    ///
    /// <https://www.postgresql.org/docs/current/errcodes-appendix.html>
    pub fn code(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Database(err) => Some(err.code()),
            _ => None,
        }
    }

    /// Attach context, e.g. the operation that failed.
    pub(crate) fn context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}

/// All possible error kind from `pgtype` library.
pub enum ErrorKind {
    Protocol(ProtocolError),
    Io(io::Error),
    Database(ErrorResponse),
    Conversion(ConversionError),
    Wire(WireError),
    LargeObject(LargeObjectError),
    CommitRolledBack(CommitRolledBack),
}

macro_rules! from {
    (<$ty:ty>$pat:pat => $body:expr) => {
        impl From<$ty> for Error {
            fn from($pat: $ty) -> Self {
                let backtrace = std::backtrace::Backtrace::capture();
                Self { context: String::new(), backtrace, kind: $body }
            }
        }
    };
}

from!(<ErrorKind>e => e);
from!(<ProtocolError>e => ErrorKind::Protocol(e));
from!(<io::Error>e => ErrorKind::Io(e));
from!(<ErrorResponse>e => ErrorKind::Database(e));
from!(<ConversionError>e => ErrorKind::Conversion(e));
from!(<WireError>e => ErrorKind::Wire(e));
from!(<LargeObjectError>e => ErrorKind::LargeObject(e));
from!(<CommitRolledBack>e => ErrorKind::CommitRolledBack(e));

impl std::error::Error for Error { }

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.context.is_empty() {
            write!(f, "{}: ", self.context)?;
        }

        fmt::Display::fmt(&self.kind, f)?;

        if let std::backtrace::BacktraceStatus::Captured = self.backtrace.status() {
            let mut backtrace = self.backtrace.to_string();
            write!(f, "\n\n")?;
            writeln!(f, "Stack backtrace:")?;
            backtrace.truncate(backtrace.trim_end().len());
            write!(f, "{}", backtrace)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl std::error::Error for ErrorKind { }

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol(e) => e.fmt(f),
            Self::Io(e) => e.fmt(f),
            Self::Database(e) => e.fmt(f),
            Self::Conversion(e) => e.fmt(f),
            Self::Wire(e) => e.fmt(f),
            Self::LargeObject(e) => e.fmt(f),
            Self::CommitRolledBack(e) => e.fmt(f),
        }
    }
}

impl fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
