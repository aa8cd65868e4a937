//! Protocol error
use std::fmt;

use super::BackendMessage;

/// An error when translating buffer from postgres
pub enum ProtocolError {
    Unexpected {
        expect: Option<u8>,
        found: u8,
    },
    Malformed {
        reason: &'static str,
    },
}

impl ProtocolError {
    pub(crate) fn unknown(found: u8) -> ProtocolError {
        Self::Unexpected { expect: None, found }
    }

    pub(crate) fn unexpected(expect: u8, found: u8) -> ProtocolError {
        Self::Unexpected { expect: Some(expect), found }
    }

    pub(crate) fn malformed(reason: &'static str) -> ProtocolError {
        Self::Malformed { reason }
    }
}

impl std::error::Error for ProtocolError { }

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ProtocolError::Unexpected { expect, found } => {
                let found = BackendMessage::message_name(found);
                match expect {
                    Some(m) => write!(
                        f,
                        "Expected message `{}` found `{found}`",
                        BackendMessage::message_name(m),
                    ),
                    None => write!(f, "Unexpected message `{found}`"),
                }
            }
            ProtocolError::Malformed { reason } => write!(f, "Malformed message: {reason}"),
        }
    }
}

impl fmt::Debug for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
