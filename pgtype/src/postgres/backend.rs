//! Postgres Backend Messages
use bytes::{Buf, Bytes};
use std::fmt;

use super::ProtocolError;
use crate::{common::ByteStr, ext::BytesExt};

/// A type that can be decoded into postgres backend message
pub trait BackendProtocol: Sized {
    fn decode(msgtype: u8, body: Bytes) -> Result<Self, ProtocolError>;
}

/// Postgres backend messages
#[derive(Debug)]
pub enum BackendMessage {
    CommandComplete(CommandComplete),
    ErrorResponse(ErrorResponse),
    FunctionCallResponse(FunctionCallResponse),
    NoticeResponse(NoticeResponse),
    ReadyForQuery(ReadyForQuery),
}

macro_rules! match_backend {
    ($($name:ident,)*) => {
        impl BackendMessage {
            pub fn msgtype(&self) -> u8 {
                match self {
                    $(Self::$name(_) => $name::MSGTYPE,)*
                }
            }

            /// Get message name from message type.
            ///
            /// Returns `"Unknown"` for unknown message type.
            pub fn message_name(msgtype: u8) -> &'static str {
                match msgtype {
                    $($name::MSGTYPE => stringify!($name),)*
                    _ => "Unknown",
                }
            }
        }
        impl BackendProtocol for BackendMessage {
            fn decode(msgtype: u8, body: Bytes) -> Result<Self, ProtocolError> {
                let message = match msgtype {
                    $($name::MSGTYPE => Self::$name(<$name as BackendProtocol>::decode(msgtype, body)?),)*
                    _ => return Err(ProtocolError::unknown(msgtype)),
                };
                Ok(message)
            }
        }
    };
}

match_backend! {
    CommandComplete,
    ErrorResponse,
    FunctionCallResponse,
    NoticeResponse,
    ReadyForQuery,
}

macro_rules! assert_msgtype {
    ($typ:ident) => {
        if Self::MSGTYPE != $typ {
            return Err(ProtocolError::unexpected(Self::MSGTYPE, $typ))
        }
    };
}

/// A warning message. The frontend should display the message.
#[derive(Debug)]
pub struct NoticeResponse {
    pub body: Bytes,
}

impl NoticeResponse {
    pub const MSGTYPE: u8 = b'N';
}

impl BackendProtocol for NoticeResponse {
    fn decode(msgtype: u8, body: Bytes) -> Result<Self, ProtocolError> {
        assert_msgtype!(msgtype);
        Ok(NoticeResponse { body })
    }
}

/// Identifies the message as an error
///
/// The message body consists of one or more identified fields, followed by a zero byte as a terminator.
/// Fields can appear in any order.
///
/// For each field there is the following:
///
/// `Byte1` A code identifying the field type; if zero, this is the message terminator and no string follows.
/// Since more field types might be added in future,
/// frontends should silently ignore fields of unrecognized type.
///
/// `String` The field value.
///
/// <https://www.postgresql.org/docs/current/protocol-error-fields.html>
#[derive(Default)]
pub struct ErrorResponse {
    severity: ByteStr,
    code: ByteStr,
    message: ByteStr,
    detail: Option<ByteStr>,
    hint: Option<ByteStr>,
}

impl ErrorResponse {
    pub const MSGTYPE: u8 = b'E';

    /// Severity, e.g. `ERROR`, `FATAL`, or `PANIC`, never localized.
    pub fn severity(&self) -> &str {
        &self.severity
    }

    /// The SQLSTATE code for the error.
    ///
    /// <https://www.postgresql.org/docs/current/errcodes-appendix.html>
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The primary human-readable error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// An optional secondary error message carrying more detail about the problem.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// An optional suggestion what to do about the problem.
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }
}

impl BackendProtocol for ErrorResponse {
    fn decode(msgtype: u8, mut body: Bytes) -> Result<Self, ProtocolError> {
        assert_msgtype!(msgtype);
        let mut me = Self::default();
        loop {
            if !body.has_remaining() {
                return Err(ProtocolError::malformed("error fields is not terminated"));
            }
            let field = body.get_u8();
            if field == b'\0' {
                break;
            }
            let value = body.get_nul_bytestr()?;
            match field {
                // `V` is the non localized severity, prefer it when present
                b'S' if me.severity.is_empty() => me.severity = value,
                b'V' => me.severity = value,
                b'C' => me.code = value,
                b'M' => me.message = value,
                b'D' => me.detail = Some(value),
                b'H' => me.hint = Some(value),
                _ => {}
            }
        }
        Ok(me)
    }
}

impl std::error::Error for ErrorResponse { }

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.severity, self.message, self.code)?;
        if let Some(detail) = &self.detail {
            write!(f, ", {detail}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// Identifies the message as a command-completed response
///
/// The command tag is usually a single word that identifies which SQL command was completed.
/// A `COMMIT` of an aborted transaction reports `ROLLBACK` as its tag.
#[derive(Debug)]
pub struct CommandComplete {
    /// The command tag.
    pub tag: ByteStr,
}

impl CommandComplete {
    pub const MSGTYPE: u8 = b'C';
}

impl BackendProtocol for CommandComplete {
    fn decode(msgtype: u8, mut body: Bytes) -> Result<Self, ProtocolError> {
        assert_msgtype!(msgtype);
        Ok(Self {
            tag: body.get_nul_bytestr()?,
        })
    }
}

/// Identifies the message as a function call result.
#[derive(Debug)]
pub struct FunctionCallResponse {
    /// The value of the function result, in the format requested by the call.
    ///
    /// [`None`] when the function returns `NULL`.
    pub value: Option<Bytes>,
}

impl FunctionCallResponse {
    pub const MSGTYPE: u8 = b'V';
}

impl BackendProtocol for FunctionCallResponse {
    fn decode(msgtype: u8, mut body: Bytes) -> Result<Self, ProtocolError> {
        assert_msgtype!(msgtype);
        if body.remaining() < 4 {
            return Err(ProtocolError::malformed("function result length is missing"));
        }
        let value = match body.get_i32() {
            -1 => None,
            len => {
                let Ok(len) = usize::try_from(len) else {
                    return Err(ProtocolError::malformed("negative function result length"));
                };
                if body.remaining() != len {
                    return Err(ProtocolError::malformed("function result length mismatch"));
                }
                Some(body)
            }
        };
        Ok(Self { value })
    }
}

/// Identifies the message type. ReadyForQuery is sent whenever the backend is ready for a new query cycle.
#[derive(Debug)]
pub struct ReadyForQuery {
    /// Current backend transaction status indicator.
    ///
    /// Possible values are `I` if idle (not in a transaction block),
    /// `T` if in a transaction block, or `E` if in a failed transaction block
    /// (queries will be rejected until block is ended).
    pub tx_status: u8,
}

impl ReadyForQuery {
    pub const MSGTYPE: u8 = b'Z';
}

impl BackendProtocol for ReadyForQuery {
    fn decode(msgtype: u8, mut body: Bytes) -> Result<Self, ProtocolError> {
        assert_msgtype!(msgtype);
        if !body.has_remaining() {
            return Err(ProtocolError::malformed("transaction status is missing"));
        }
        Ok(Self {
            tx_status: body.get_u8(),
        })
    }
}
