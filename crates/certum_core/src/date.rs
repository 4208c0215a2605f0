//! Calendar dates carried on certificates.

use crate::error::{CoreError, CoreResult};
use chrono::NaiveDate;

/// Format accepted for issue and expiration dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date
///
/// # Errors
///
/// Returns error if the input is not a real calendar date
pub fn parse_calendar_date(input: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| CoreError::InvalidDate {
        input: input.to_string(),
    })
}
