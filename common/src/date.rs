//! Calendar [`Date`]s and inclusive [`DateRange`]s of them.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{fmt, str::FromStr};

#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::macros::format_description;

/// Calendar date without a time zone.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Date(time::Date);

impl Date {
    /// Returns the current [`Date`] in UTC.
    #[must_use]
    pub fn today() -> Self {
        Self(time::OffsetDateTime::now_utc().date())
    }

    /// Creates a new [`Date`] from the provided calendar components.
    ///
    /// [`None`] is returned if the components don't form a valid date.
    #[must_use]
    pub fn from_calendar(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = time::Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// Returns this [`Date`] shifted by the provided number of days.
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn checked_add_days(self, days: i64) -> Option<Self> {
        self.0.checked_add(time::Duration::days(days)).map(Self)
    }

    /// Returns the first day of this [`Date`]'s month.
    #[must_use]
    pub fn start_of_month(self) -> Self {
        Self(self.0.replace_day(1).unwrap_or(self.0))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self
            .0
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

impl FromStr for Date {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format = format_description!("[year]-[month]-[day]");
        time::Date::parse(s.trim(), format)
            .map(Self)
            .map_err(|_| "invalid `Date`, expected `YYYY-MM-DD`")
    }
}

impl From<time::Date> for Date {
    fn from(d: time::Date) -> Self {
        Self(d)
    }
}

impl From<Date> for time::Date {
    fn from(d: Date) -> Self {
        d.0
    }
}

#[cfg(feature = "postgres")]
impl FromSql<'_> for Date {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl ToSql for Date {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, w)
    }
}

/// Inclusive range of [`Date`]s, whose end is strictly after its start.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DateRange {
    /// First [`Date`] of this [`DateRange`].
    start: Date,

    /// Last [`Date`] of this [`DateRange`].
    end: Date,
}

impl DateRange {
    /// Creates a new [`DateRange`] out of the provided bounds.
    ///
    /// [`None`] is returned if `end` is not strictly after `start`.
    #[must_use]
    pub fn new(start: Date, end: Date) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    /// Returns the first [`Date`] of this [`DateRange`].
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Returns the last [`Date`] of this [`DateRange`].
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Returns the number of days between the bounds of this [`DateRange`].
    ///
    /// Always positive.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end.0 - self.start.0).whole_days()
    }

    /// Indicates whether this [`DateRange`] shares at least one [`Date`] with
    /// the `other` one.
    ///
    /// Touching bounds overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.

    use std::str::FromStr as _;

    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    use super::Date;

    impl Serialize for Date {
        fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
            ser.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for Date {
        fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
            let s = String::deserialize(de)?;
            Self::from_str(&s).map_err(de::Error::custom)
        }
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Calendar date in `YYYY-MM-DD` format.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Date = super::Date;

    impl Date {
        fn to_output<S: ScalarValue>(d: &Date) -> Value<S> {
            Value::scalar(d.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Date` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Date` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use super::{Date, DateRange};

    fn date(s: &str) -> Date {
        Date::from_str(s).unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(date(start), date(end)).unwrap()
    }

    #[test]
    fn parses_and_formats() {
        assert_eq!(
            date("2025-07-01"),
            Date::from_calendar(2025, 7, 1).unwrap(),
        );
        assert_eq!(date("2025-07-01").to_string(), "2025-07-01");
        assert_eq!(date(" 2025-12-31 ").to_string(), "2025-12-31");

        assert!(Date::from_str("2025-13-01").is_err());
        assert!(Date::from_str("2025-02-30").is_err());
        assert!(Date::from_str("01.07.2025").is_err());
        assert!(Date::from_str("").is_err());
    }

    #[test]
    fn range_requires_end_after_start() {
        let new = |start, end| DateRange::new(date(start), date(end));

        assert!(new("2025-06-01", "2025-06-03").is_some());
        assert!(new("2025-06-03", "2025-06-03").is_none());
        assert!(new("2025-06-03", "2025-06-01").is_none());
    }

    #[test]
    fn counts_days() {
        assert_eq!(range("2025-06-01", "2025-06-03").days(), 2);
        assert_eq!(range("2025-07-01", "2025-07-03").days(), 2);
        assert_eq!(range("2025-02-28", "2025-03-01").days(), 1);
        assert_eq!(range("2024-02-28", "2024-03-01").days(), 2);
        assert_eq!(range("2024-12-31", "2025-01-31").days(), 31);
    }

    #[test]
    fn overlapping() {
        let booked = range("2025-07-01", "2025-07-03");

        for (start, end) in [
            ("2025-07-01", "2025-07-03"),
            ("2025-07-02", "2025-07-04"),
            ("2025-06-28", "2025-07-01"),
            ("2025-07-03", "2025-07-05"),
            ("2025-06-01", "2025-08-01"),
        ] {
            let other = range(start, end);
            assert!(booked.overlaps(&other), "{booked} vs {other}");
            assert!(other.overlaps(&booked), "{other} vs {booked}");
        }

        for (start, end) in [
            ("2025-06-01", "2025-06-30"),
            ("2025-07-04", "2025-07-10"),
        ] {
            let other = range(start, end);
            assert!(!booked.overlaps(&other), "{booked} vs {other}");
            assert!(!other.overlaps(&booked), "{other} vs {booked}");
        }
    }

    #[test]
    fn month_start() {
        assert_eq!(date("2025-07-19").start_of_month(), date("2025-07-01"));
        assert_eq!(date("2025-07-01").start_of_month(), date("2025-07-01"));
    }
}
