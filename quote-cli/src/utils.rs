use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid number '{input}': {source}")]
    Decimal {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },

    #[error("'{0}' must not be negative")]
    Negative(String),

    #[error("invalid date '{input}', expected YYYY-MM-DD: {source}")]
    Date {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Strips surrounding whitespace and thousands separators.
fn clean_number(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a number such as `"1,234.56"`. Blank input is zero.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseError> {
    let cleaned = clean_number(s);
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }
    cleaned.parse().map_err(|source| {
        tracing::error!(input = %s, "invalid number: {source}");
        ParseError::Decimal {
            input: s.to_string(),
            source,
        }
    })
}

/// Parses a distance or duration, rejecting negative values.
pub fn parse_non_negative(s: &str) -> Result<Decimal, ParseError> {
    let value = parse_decimal(s)?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ParseError::Negative(s.trim().to_string()));
    }
    Ok(value)
}

/// `None` for blank or unparsable input; the latter is logged.
pub fn parse_optional_decimal(s: &str) -> Option<Decimal> {
    let cleaned = clean_number(s);
    if cleaned.is_empty() {
        return None;
    }
    match cleaned.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(input = %s, "ignoring invalid number: {e}");
            None
        }
    }
}

/// Parses an ISO `YYYY-MM-DD` date. Used as a clap value parser.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|source| ParseError::Date {
        input: s.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_decimal_strips_separators_and_whitespace() {
        assert_eq!(parse_decimal(" 1,250.5 ").unwrap(), dec!(1250.5));
    }

    #[test]
    fn parse_decimal_blank_is_zero() {
        assert_eq!(parse_decimal("   ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_decimal_rejects_words() {
        assert!(matches!(
            parse_decimal("twelve"),
            Err(ParseError::Decimal { .. })
        ));
    }

    #[test]
    fn parse_non_negative_rejects_negative_distance() {
        assert_eq!(parse_non_negative("12").unwrap(), dec!(12));
        assert_eq!(parse_non_negative("0").unwrap(), Decimal::ZERO);
        assert_eq!(
            parse_non_negative("-3").unwrap_err().to_string(),
            "'-3' must not be negative"
        );
    }

    #[test]
    fn parse_optional_decimal_ignores_blank_and_invalid() {
        assert_eq!(parse_optional_decimal("25"), Some(dec!(25)));
        assert_eq!(parse_optional_decimal(""), None);
        assert_eq!(parse_optional_decimal("soon"), None);
    }

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date(" 2026-11-14 ").unwrap(),
            NaiveDate::from_ymd_opt(2026, 11, 14).unwrap()
        );
        assert!(parse_date("11/14/2026").is_err());
    }
}
