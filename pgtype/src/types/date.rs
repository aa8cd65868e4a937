use bytes::{BufMut, BytesMut};
use time::{
    Duration,
    format_description::{BorrowedFormatItem as I, Component as C, modifier},
};

use super::{
    AssignTo, ConversionError, IsNull, PgValue, Set, WireError, assign_status, encode_status,
    fixed,
    infinity::{InfinityModifier, temporal, temporal_native},
    utf8,
};
use crate::{
    Status,
    postgres::{Oid, PgType, oid},
};

/// Postgres epoch, `2000-01-01`.
pub(crate) const PG_EPOCH: time::Date = {
    // source: `from_julian_day` docs
    match time::Date::from_julian_day(2_451_545) {
        Ok(ok) => ok,
        Err(_) => panic!("julian day of postgres epoch is in range"),
    }
};

pub(crate) const DATE: &[I<'_>] = &[
    I::Component(C::Year(modifier::Year::default())),
    I::Literal(b"-"),
    I::Component(C::Month(modifier::Month::default())),
    I::Literal(b"-"),
    I::Component(C::Day(modifier::Day::default())),
];

/// `date`, calendar date.
///
/// Binary format is days since `2000-01-01` as `i32`, with
/// `i32::MAX` and `i32::MIN` for `infinity` and `-infinity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date {
    pub date: time::Date,
    pub infinity: InfinityModifier,
    pub status: Status,
}

temporal! {
    Date, date: time::Date = PG_EPOCH,
    sentinel i32,
    oid oid::DATE, "date",
    array oid::DATE_ARRAY, "_date"
}

temporal_native!(Date, time::Date, |value| value, |date| date);

impl Date {
    fn value(&self) -> time::Date {
        self.date
    }

    fn from_wire(days: i32) -> Result<time::Date, WireError> {
        PG_EPOCH
            .checked_add(Duration::days(days.into()))
            .ok_or(WireError::OutOfRange { oid: Self::OID })
    }

    fn to_wire(&self) -> Result<i32, WireError> {
        let days = (self.date - PG_EPOCH).whole_days();
        i32::try_from(days).map_err(|_| WireError::OutOfRange { oid: Self::OID })
    }

    fn parse(src: &[u8]) -> Result<time::Date, WireError> {
        time::Date::parse(utf8(Self::OID, src)?, &DATE)
            .map_err(|_| WireError::malformed(Self::OID, src.len(), "invalid date"))
    }

    fn format(&self) -> Result<String, WireError> {
        self.date
            .format(&DATE)
            .map_err(|_| WireError::OutOfRange { oid: Self::OID })
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;

    use super::*;

    #[test]
    fn binary() {
        let mut buf = BytesMut::new();
        Date::new(date!(2000 - 01 - 02)).encode_binary(&mut buf).unwrap();
        assert_eq!(&buf[..], &1i32.to_be_bytes());

        let decoded = Date::decode_binary(Some(&(-1i32).to_be_bytes())).unwrap();
        assert_eq!(decoded, Date::new(date!(1999 - 12 - 31)));

        let inf = Date::decode_binary(Some(&i32::MAX.to_be_bytes())).unwrap();
        assert_eq!(inf, Date::infinite(InfinityModifier::Infinity));
        assert_eq!(inf.date, PG_EPOCH);

        assert!(Date::decode_binary(Some(&[0, 0])).is_err());
        assert_eq!(Date::decode_binary(None).unwrap().status, Status::Null);
    }

    #[test]
    fn text() {
        for (native, text) in [
            (Date::new(date!(1990 - 05 - 17)), "1990-05-17"),
            (Date::infinite(InfinityModifier::NegativeInfinity), "-infinity"),
        ] {
            let mut buf = BytesMut::new();
            native.encode_text(&mut buf).unwrap();
            assert_eq!(&buf[..], text.as_bytes());
            assert_eq!(Date::decode_text(Some(text.as_bytes())).unwrap(), native);
        }
        assert!(Date::decode_text(Some(b"1990-13-01")).is_err());
    }

    #[test]
    fn transcode() {
        crate::types::transcode(&[
            Date::new(date!(1800 - 01 - 01)),
            Date::new(date!(1999 - 12 - 31)),
            Date::new(date!(2000 - 01 - 01)),
            Date::new(date!(2200 - 12 - 31)),
            Date::infinite(InfinityModifier::Infinity),
            Date::infinite(InfinityModifier::NegativeInfinity),
            Date::null(),
        ]);
    }

    #[test]
    fn assign() {
        let mut value = Date::default();
        value.set(date!(2024 - 02 - 29)).unwrap();
        assert_eq!(AssignTo::<time::Date>::assign(&value).unwrap(), date!(2024 - 02 - 29));

        let inf = Date::infinite(InfinityModifier::Infinity);
        let mut target = date!(1970 - 01 - 01);
        assert!(inf.assign_to(&mut target).is_err());
        assert_eq!(target, date!(1970 - 01 - 01));
        assert!(AssignTo::<Option<time::Date>>::assign(&inf).is_err());
        assert_eq!(AssignTo::<Option<time::Date>>::assign(&Date::null()).unwrap(), None);
    }
}
