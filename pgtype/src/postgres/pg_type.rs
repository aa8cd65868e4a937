
/// Postgres object identifier.
///
/// The oid type is implemented as an unsigned four-byte integer.
///
/// <https://www.postgresql.org/docs/current/datatype-oid.html>
pub type Oid = u32;

/// A type that have corresponding postgres oid.
pub trait PgType {
    /// The type oid.
    const OID: Oid;
    /// The type name as in `pg_type.typname`.
    const NAME: &'static str;
}

/// Builtin type oids.
///
/// Values are taken from `pg_type.dat`, they are stable across server versions.
pub mod oid {
    use super::Oid;

    macro_rules! oid {
        ($($name:ident = $oid:literal $(, $doc:literal)?;)*) => {$(
            $(#[doc = $doc])?
            pub const $name: Oid = $oid;
        )*};
    }

    oid! {
        UNSPECIFIED = 0, "0 means type unspecified";
        BOOL = 16, "`bool` boolean, 'true'/'false'";
        BYTEA = 17, "`bytea` variable-length string, binary values escaped";
        INT8 = 20, "`int8` ~18 digit integer, 8-byte storage";
        INT2 = 21, "`int2` -32 thousand to 32 thousand, 2-byte storage";
        INT4 = 23, "`int4` -2 billion to 2 billion integer, 4-byte storage";
        TEXT = 25, "`text` variable-length string, no limit specified";
        OID = 26, "`oid` object identifier(oid), maximum 4 billion";
        VARCHAR = 1043, "`varchar` varchar(length), non-blank-padded string";
        DATE = 1082, "`date` date";
        TIMESTAMP = 1114, "`timestamp` date and time";
        TIMESTAMPTZ = 1184, "`timestamptz` date and time with time zone";

        BOOL_ARRAY = 1000;
        INT2_ARRAY = 1005;
        INT4_ARRAY = 1007;
        TEXT_ARRAY = 1009;
        VARCHAR_ARRAY = 1015;
        INT8_ARRAY = 1016;
        TIMESTAMP_ARRAY = 1115;
        DATE_ARRAY = 1182;
        TIMESTAMPTZ_ARRAY = 1185;
    }
}
