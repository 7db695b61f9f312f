//! Conversions between the dates sent by clients and the dates stored in the database.
//!
//! Dates are stored as RFC 3339 text in UTC, truncated to whole seconds, so
//! that ordering the text orders the dates.

use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
    format_description::well_known::Rfc3339, macros::format_description,
};

use crate::Error;

/// Parse a date sent by a client.
///
/// Accepts an RFC 3339 date-time, e.g. "2025-03-01T14:30:00.000Z", or a plain
/// date, e.g. "2025-03-01", which is taken as midnight UTC.
///
/// # Errors
/// Returns [Error::InvalidInput] if `text` is in neither format.
pub fn parse_date_input(text: &str) -> Result<OffsetDateTime, Error> {
    let text = text.trim();

    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        return Ok(date_time.to_offset(UtcOffset::UTC));
    }

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
        .map_err(|_| Error::InvalidInput(format!("Fecha inválida: {text}")))
}

/// Format `date_time` the way dates are stored in the database.
///
/// # Errors
/// Returns [Error::InvalidInput] if the date cannot be written as RFC 3339,
/// e.g. a year before 0.
pub fn format_stored_date(date_time: OffsetDateTime) -> Result<String, Error> {
    date_time
        .to_offset(UtcOffset::UTC)
        .replace_nanosecond(0)
        .map_err(|error| Error::InvalidInput(format!("Fecha inválida: {error}")))?
        .format(&Rfc3339)
        .map_err(|error| Error::InvalidInput(format!("Fecha inválida: {error}")))
}

pub(super) fn parse_stored_date(text: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(text, &Rfc3339)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::Error;

    use super::{format_stored_date, parse_date_input};

    #[test]
    fn parses_date_time_and_converts_to_utc() {
        assert_eq!(
            parse_date_input("2025-03-01T10:00:00-03:00"),
            Ok(datetime!(2025-03-01 13:00 UTC))
        );
    }

    #[test]
    fn parses_plain_date_as_midnight_utc() {
        assert_eq!(
            parse_date_input("2025-03-01"),
            Ok(datetime!(2025-03-01 00:00 UTC))
        );
    }

    #[test]
    fn rejects_other_formats() {
        assert!(matches!(
            parse_date_input("01/03/2025"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn stored_dates_drop_subseconds() {
        assert_eq!(
            format_stored_date(datetime!(2025-03-01 13:00:05.250 UTC)),
            Ok("2025-03-01T13:00:05Z".to_owned())
        );
    }
}
