/// Postgres data transmission format.
///
/// Every [`PgValue`][crate::types::PgValue] has a codec for both, the
/// [`Registry`][crate::Registry] picks one by this format.
///
/// <https://www.postgresql.org/docs/current/protocol-overview.html#PROTOCOL-FORMAT-CODES>
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PgFormat {
    /// Format code `0`, human readable, without trailing nul.
    #[default]
    Text,
    /// Format code `1`, type specific, integers in network byte order.
    Binary,
}

impl PgFormat {
    /// Return format code for current format.
    pub fn format_code(&self) -> u16 {
        match self {
            PgFormat::Text => 0,
            PgFormat::Binary => 1,
        }
    }

    /// Returns format from its format code.
    pub fn from_code(code: u16) -> Option<PgFormat> {
        match code {
            0 => Some(PgFormat::Text),
            1 => Some(PgFormat::Binary),
            _ => None,
        }
    }
}
