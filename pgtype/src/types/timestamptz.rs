use bytes::{BufMut, BytesMut};
use time::{
    Duration, OffsetDateTime, UtcDateTime, UtcOffset,
    format_description::{BorrowedFormatItem as I, Component as C, modifier},
};

use super::{
    AssignTo, ConversionError, IsNull, PgValue, Set, WireError, assign_status, encode_status,
    fixed,
    date::{DATE, PG_EPOCH},
    infinity::{InfinityModifier, temporal, temporal_native},
    timestamp::{FORMAT_SUBSECOND, PARSE_SUBSECOND, TIME},
    utf8,
};
use crate::{
    Status,
    postgres::{Oid, PgType, oid},
};

const UTC_PG_EPOCH: OffsetDateTime = OffsetDateTime::new_utc(PG_EPOCH, time::Time::MIDNIGHT);

const OFFSET_HOUR: modifier::OffsetHour = {
    let mut m = modifier::OffsetHour::default();
    m.sign_is_mandatory = true;
    m
};

const OFFSET_MINUTE: &[I<'_>] = &[
    I::Literal(b":"),
    I::Component(C::OffsetMinute(modifier::OffsetMinute::default())),
];

const OFFSET_SECOND: &[I<'_>] = &[
    I::Literal(b":"),
    I::Component(C::OffsetSecond(modifier::OffsetSecond::default())),
];

const OFFSET_MINUTE_ITEM: &I<'_> = &I::Compound(OFFSET_MINUTE);
const OFFSET_SECOND_ITEM: &I<'_> = &I::Compound(OFFSET_SECOND);

/// Postgres omit offset minute and second when zero.
const PARSE: &[I<'_>] = &[
    I::Compound(DATE),
    I::Literal(b" "),
    I::Compound(TIME),
    PARSE_SUBSECOND,
    I::Component(C::OffsetHour(OFFSET_HOUR)),
    I::Optional(OFFSET_MINUTE_ITEM),
    I::Optional(OFFSET_SECOND_ITEM),
];

const FORMAT: &[I<'_>] = &[
    I::Compound(DATE),
    I::Literal(b" "),
    I::Compound(TIME),
    I::Compound(FORMAT_SUBSECOND),
    I::Component(C::OffsetHour(OFFSET_HOUR)),
    I::Compound(OFFSET_MINUTE),
];

/// `timestamptz`, date and time with time zone.
///
/// Postgres store the instant in UTC. The value is encoded in UTC and
/// decoded in whatever offset the server sent, equality is by instant.
///
/// Binary format is microseconds since `2000-01-01 00:00:00 UTC` as `i64`,
/// with `i64::MAX` and `i64::MIN` for `infinity` and `-infinity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamptz {
    pub time: OffsetDateTime,
    pub infinity: InfinityModifier,
    pub status: Status,
}

temporal! {
    Timestamptz, time: OffsetDateTime = UTC_PG_EPOCH,
    sentinel i64,
    oid oid::TIMESTAMPTZ, "timestamptz",
    array oid::TIMESTAMPTZ_ARRAY, "_timestamptz"
}

temporal_native!(Timestamptz, OffsetDateTime, |value| value, |time| time);
temporal_native!(Timestamptz, UtcDateTime, |value| value.to_offset(UtcOffset::UTC), |time| time.to_utc());

impl Timestamptz {
    fn value(&self) -> OffsetDateTime {
        self.time
    }

    fn from_wire(micros: i64) -> Result<OffsetDateTime, WireError> {
        UTC_PG_EPOCH
            .checked_add(Duration::microseconds(micros))
            .ok_or(WireError::OutOfRange { oid: Self::OID })
    }

    fn to_wire(&self) -> Result<i64, WireError> {
        let micros = (self.time - UTC_PG_EPOCH).whole_nanoseconds().div_euclid(1000);
        i64::try_from(micros).map_err(|_| WireError::OutOfRange { oid: Self::OID })
    }

    fn parse(src: &[u8]) -> Result<OffsetDateTime, WireError> {
        OffsetDateTime::parse(utf8(Self::OID, src)?, &PARSE)
            .map_err(|_| WireError::malformed(Self::OID, src.len(), "invalid timestamptz"))
    }

    fn format(&self) -> Result<String, WireError> {
        self.time
            .to_offset(UtcOffset::UTC)
            .format(&FORMAT)
            .map_err(|_| WireError::OutOfRange { oid: Self::OID })
    }
}

#[cfg(test)]
mod test {
    use time::macros::{datetime, utc_datetime};

    use super::*;

    #[test]
    fn text() {
        let value = Timestamptz::decode_text(Some(b"2024-03-04 12:06:07.5+07")).unwrap();
        assert_eq!(value.time, datetime!(2024-03-04 05:06:07.5 UTC));
        assert_eq!(value.time.offset(), UtcOffset::from_hms(7, 0, 0).unwrap());

        let value = Timestamptz::decode_text(Some(b"2024-03-04 00:36:07-04:30")).unwrap();
        assert_eq!(value.time, datetime!(2024-03-04 05:06:07 UTC));

        let mut buf = BytesMut::new();
        value.encode_text(&mut buf).unwrap();
        assert_eq!(&buf[..], b"2024-03-04 05:06:07.000000+00:00");

        assert!(Timestamptz::decode_text(Some(b"2024-03-04 05:06:07")).is_err());
    }

    #[test]
    fn binary() {
        let value = Timestamptz::new(datetime!(2000-01-01 07:00 +7));
        let mut buf = BytesMut::new();
        value.encode_binary(&mut buf).unwrap();
        assert_eq!(&buf[..], &0i64.to_be_bytes());
        assert_eq!(Timestamptz::decode_binary(Some(&buf[..])).unwrap(), value);
    }

    #[test]
    fn transcode() {
        crate::types::transcode(&[
            Timestamptz::new(datetime!(1800-01-01 00:00 UTC)),
            Timestamptz::new(datetime!(1999-12-31 23:59:59.999999 UTC)),
            Timestamptz::new(datetime!(2200-12-31 12:30:45.123456 -3:30)),
            Timestamptz::infinite(InfinityModifier::Infinity),
            Timestamptz::infinite(InfinityModifier::NegativeInfinity),
            Timestamptz::null(),
        ]);
    }

    #[test]
    fn sub_microsecond_before_epoch() {
        let value = Timestamptz::new(datetime!(1999-12-31 23:59:59.9999995 UTC));

        let mut buf = BytesMut::new();
        value.encode_binary(&mut buf).unwrap();
        assert_eq!(&buf[..], &(-1i64).to_be_bytes());
        let binary = Timestamptz::decode_binary(Some(&buf[..])).unwrap();

        let mut buf = BytesMut::new();
        value.encode_text(&mut buf).unwrap();
        let text = Timestamptz::decode_text(Some(&buf[..])).unwrap();

        assert_eq!(binary, text);
        assert_eq!(binary.time, datetime!(1999-12-31 23:59:59.999999 UTC));
    }

    #[test]
    fn infinity_exclusive() {
        for infinity in [InfinityModifier::Infinity, InfinityModifier::NegativeInfinity] {
            let value = Timestamptz::infinite(infinity);

            let mut target = datetime!(2020-01-01 00:00 UTC);
            let err = value.assign_to(&mut target).unwrap_err();
            assert!(matches!(err, ConversionError::Infinite { .. }));
            assert_eq!(target, datetime!(2020-01-01 00:00 UTC));

            assert!(AssignTo::<UtcDateTime>::assign(&value).is_err());
            assert!(AssignTo::<Option<OffsetDateTime>>::assign(&value).is_err());
        }

        let mut target = datetime!(2020-01-01 00:00 UTC);
        assert!(Timestamptz::null().assign_to(&mut target).is_err());
    }

    #[test]
    fn native() {
        let mut value = Timestamptz::default();
        value.set(utc_datetime!(2001-02-03 04:05:06)).unwrap();
        assert_eq!(value.time, datetime!(2001-02-03 04:05:06 UTC));

        value.set(None::<OffsetDateTime>).unwrap();
        assert_eq!(value.status, Status::Null);
        assert_eq!(AssignTo::<Option<UtcDateTime>>::assign(&value).unwrap(), None);
    }
}
