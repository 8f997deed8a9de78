use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::sqlite::{Sqlite, SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef};
use sqlx::{Decode, Encode, Type};
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// UTC instant with microsecond precision, stored as INTEGER microseconds
/// since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    pub fn now() -> Self {
        Self::truncate(OffsetDateTime::now_utc())
    }

    pub fn from_micros(micros: i64) -> Result<Self, time::error::ComponentRange> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(micros) * 1_000).map(Self)
    }

    pub fn as_micros(&self) -> i64 {
        (self.0.unix_timestamp_nanos() / 1_000) as i64
    }

    /// Drops sub-microsecond precision and normalises to UTC.
    pub fn truncate(at: OffsetDateTime) -> Self {
        let at = at.to_offset(time::UtcOffset::UTC);
        let nanos = at.nanosecond();
        Self(at.replace_nanosecond(nanos - nanos % 1_000).unwrap_or(at))
    }

    /// Parses an RFC 3339 timestamp, as produced by [`Timestamp::iso`].
    pub fn parse_iso(value: &str) -> Result<Self, time::error::Parse> {
        OffsetDateTime::parse(value.trim(), &Rfc3339).map(Self::truncate)
    }

    /// Parses the value of an HTML `datetime-local` input, read as UTC.
    pub fn parse_datetime_local(value: &str) -> Result<Self, time::error::Parse> {
        let value = value.trim();
        let with_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
        let without_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]");

        PrimitiveDateTime::parse(value, with_seconds)
            .or_else(|_| PrimitiveDateTime::parse(value, without_seconds))
            .map(|at| Self(at.assume_utc()))
    }

    pub fn iso(&self) -> String {
        self.0.format(&Rfc3339).unwrap_or_default()
    }

    /// `hh:mm AM`
    pub fn display_time(&self) -> String {
        self.0
            .format(format_description!(
                "[hour repr:12 padding:zero]:[minute] [period case:upper]"
            ))
            .unwrap_or_default()
    }

    pub fn display_date_time(&self) -> String {
        self.0
            .format(format_description!(
                "[weekday repr:short], [month repr:short] [day padding:none], [year] [hour]:[minute] UTC"
            ))
            .unwrap_or_default()
    }

    pub fn display_date(&self) -> String {
        self.0
            .format(format_description!(
                "[month repr:short] [day padding:none], [year]"
            ))
            .unwrap_or_default()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iso())
    }
}

impl Type<Sqlite> for Timestamp {
    fn type_info() -> SqliteTypeInfo {
        <i64 as Type<Sqlite>>::type_info()
    }

    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <i64 as Type<Sqlite>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Sqlite> for Timestamp {
    fn encode_by_ref(&self, buf: &mut Vec<SqliteArgumentValue<'q>>) -> IsNull {
        <i64 as Encode<'q, Sqlite>>::encode(self.as_micros(), buf)
    }
}

impl<'r> Decode<'r, Sqlite> for Timestamp {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let micros = <i64 as Decode<'r, Sqlite>>::decode(value)?;
        Ok(Self::from_micros(micros)?)
    }
}

#[cfg(test)]
mod test {
    use super::Timestamp;

    #[test]
    fn iso_round_trip_keeps_microseconds() {
        let at = Timestamp::from_micros(1_700_000_000_123_456).unwrap();
        let iso = at.iso();

        assert_eq!(iso, "2023-11-14T22:13:20.123456Z");
        assert_eq!(Timestamp::parse_iso(&iso).unwrap(), at);
    }

    #[test]
    fn parse_iso_drops_nanoseconds() {
        let at = Timestamp::parse_iso("2023-11-14T22:13:20.123456789Z").unwrap();
        assert_eq!(at.as_micros(), 1_700_000_000_123_456);
    }

    #[test]
    fn parse_iso_normalises_offset() {
        let at = Timestamp::parse_iso("2023-11-14T23:13:20+01:00").unwrap();
        assert_eq!(at.as_micros(), 1_700_000_000_000_000);
        assert_eq!(at.iso(), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn parse_iso_rejects_garbage() {
        assert!(Timestamp::parse_iso("yesterday").is_err());
    }

    #[test]
    fn display_time_is_twelve_hour() {
        let at = Timestamp::from_micros(1_700_000_000_000_000).unwrap();
        assert_eq!(at.display_time(), "10:13 PM");
    }

    #[test]
    fn datetime_local_with_and_without_seconds() {
        let short = Timestamp::parse_datetime_local("2023-11-14T22:13").unwrap();
        let long = Timestamp::parse_datetime_local("2023-11-14T22:13:20").unwrap();

        assert_eq!(short.as_micros(), 1_699_999_980_000_000);
        assert_eq!(long.as_micros(), 1_700_000_000_000_000);
        assert!(Timestamp::parse_datetime_local("14/11/2023").is_err());
    }
}
