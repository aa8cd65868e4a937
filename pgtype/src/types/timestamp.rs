use bytes::{BufMut, BytesMut};
use time::{
    Duration, PrimitiveDateTime,
    format_description::{BorrowedFormatItem as I, Component as C, modifier},
};

use super::{
    AssignTo, ConversionError, IsNull, PgValue, Set, WireError, assign_status, encode_status,
    fixed,
    date::{DATE, PG_EPOCH},
    infinity::{InfinityModifier, temporal, temporal_native},
    utf8,
};
use crate::{
    Status,
    postgres::{Oid, PgType, oid},
};

pub(crate) const PRIMITIVE_PG_EPOCH: PrimitiveDateTime =
    PrimitiveDateTime::new(PG_EPOCH, time::Time::MIDNIGHT);

const SUBSECOND: modifier::Subsecond = {
    let mut m = modifier::Subsecond::default();
    m.digits = modifier::SubsecondDigits::Six;
    m
};

/// `HH:MM:SS`, without subsecond.
pub(crate) const TIME: &[I<'_>] = &[
    I::Component(C::Hour(modifier::Hour::default())),
    I::Literal(b":"),
    I::Component(C::Minute(modifier::Minute::default())),
    I::Literal(b":"),
    I::Component(C::Second(modifier::Second::default())),
];

const ANY_SUBSECOND: &[I<'_>] = &[
    I::Literal(b"."),
    I::Component(C::Subsecond(modifier::Subsecond::default())),
];

const ANY_SUBSECOND_ITEM: &I<'_> = &I::Compound(ANY_SUBSECOND);

/// Postgres accept any subsecond digits and omit it when zero.
pub(crate) const PARSE_SUBSECOND: I<'_> = I::Optional(ANY_SUBSECOND_ITEM);

/// Always written in microsecond precision.
pub(crate) const FORMAT_SUBSECOND: &[I<'_>] = &[
    I::Literal(b"."),
    I::Component(C::Subsecond(SUBSECOND)),
];

const PARSE: &[I<'_>] = &[
    I::Compound(DATE),
    I::Literal(b" "),
    I::Compound(TIME),
    PARSE_SUBSECOND,
];

const FORMAT: &[I<'_>] = &[
    I::Compound(DATE),
    I::Literal(b" "),
    I::Compound(TIME),
    I::Compound(FORMAT_SUBSECOND),
];

/// `timestamp`, date and time without time zone.
///
/// Binary format is microseconds since `2000-01-01 00:00:00` as `i64`, with
/// `i64::MAX` and `i64::MIN` for `infinity` and `-infinity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub time: PrimitiveDateTime,
    pub infinity: InfinityModifier,
    pub status: Status,
}

temporal! {
    Timestamp, time: PrimitiveDateTime = PRIMITIVE_PG_EPOCH,
    sentinel i64,
    oid oid::TIMESTAMP, "timestamp",
    array oid::TIMESTAMP_ARRAY, "_timestamp"
}

temporal_native!(Timestamp, PrimitiveDateTime, |value| value, |time| time);

impl Timestamp {
    fn value(&self) -> PrimitiveDateTime {
        self.time
    }

    fn from_wire(micros: i64) -> Result<PrimitiveDateTime, WireError> {
        PRIMITIVE_PG_EPOCH
            .checked_add(Duration::microseconds(micros))
            .ok_or(WireError::OutOfRange { oid: Self::OID })
    }

    fn to_wire(&self) -> Result<i64, WireError> {
        let micros = (self.time - PRIMITIVE_PG_EPOCH).whole_nanoseconds().div_euclid(1000);
        i64::try_from(micros).map_err(|_| WireError::OutOfRange { oid: Self::OID })
    }

    fn parse(src: &[u8]) -> Result<PrimitiveDateTime, WireError> {
        PrimitiveDateTime::parse(utf8(Self::OID, src)?, &PARSE)
            .map_err(|_| WireError::malformed(Self::OID, src.len(), "invalid timestamp"))
    }

    fn format(&self) -> Result<String, WireError> {
        self.time
            .format(&FORMAT)
            .map_err(|_| WireError::OutOfRange { oid: Self::OID })
    }
}
