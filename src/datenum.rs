//! Serial day-number conversion.
//!
//! Result records carry timestamps as MATLAB-style serial day-numbers: the
//! integer part counts days from the proleptic calendar origin (day 1 is
//! 0000-01-01 in that convention) and the fraction encodes the time of day.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Offset between the serial day-number origin and the proleptic Gregorian
/// ordinal used by chrono (ordinal 1 = 0001-01-01).
const ORIGIN_OFFSET_DAYS: i64 = 366;

/// Errors raised when a serial day-number cannot be mapped to a calendar value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DateError {
    #[error("serial day-number {0} is not finite")]
    NotFinite(f64),

    #[error("serial day-number {0} is negative")]
    Negative(f64),

    #[error("serial day-number {0} is outside the supported calendar range")]
    OutOfRange(f64),
}

/// Convert a serial day-number into a calendar date-time.
///
/// Hours, minutes and seconds are peeled off the fractional day one unit at a
/// time and the seconds are rounded to the nearest whole second. A rounded
/// value of 60 seconds rolls into the next minute (or day) through calendar
/// addition.
pub fn datenum_to_datetime(datenum: f64) -> Result<NaiveDateTime, DateError> {
    if !datenum.is_finite() {
        return Err(DateError::NotFinite(datenum));
    }
    if datenum < 0.0 {
        return Err(DateError::Negative(datenum));
    }
    if datenum >= i32::MAX as f64 {
        return Err(DateError::OutOfRange(datenum));
    }

    let whole_days = datenum.trunc();
    let day_fraction = datenum - whole_days;
    let hours = day_fraction * 24.0;
    let minutes = hours.fract() * 60.0;
    let seconds = minutes.fract() * 60.0;

    let origin = NaiveDate::from_num_days_from_ce_opt(whole_days as i32)
        .ok_or(DateError::OutOfRange(datenum))?
        .and_time(NaiveTime::MIN);

    let offset = Duration::hours(hours.trunc() as i64)
        + Duration::minutes(minutes.trunc() as i64)
        + Duration::seconds(seconds.round_ties_even() as i64)
        - Duration::days(ORIGIN_OFFSET_DAYS);

    origin
        .checked_add_signed(offset)
        .ok_or(DateError::OutOfRange(datenum))
}

/// Parse the measurement start time from a Polly data filename.
///
/// Filenames look like `2019_05_20_Mon_LACROS_00_00_01.nc`: the first three
/// underscore-separated tokens are the date and the last three two-digit
/// numeric tokens are the time of day.
pub fn parse_polly_filename(name: &str) -> Option<NaiveDateTime> {
    let file_name = std::path::Path::new(name).file_name()?.to_str()?;
    let stem = file_name.split('.').next()?;
    let tokens: Vec<&str> = stem.split('_').collect();
    if tokens.len() < 6 {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(
        tokens[0].parse().ok()?,
        tokens[1].parse().ok()?,
        tokens[2].parse().ok()?,
    )?;
    if tokens[0].len() != 4 || tokens[1].len() != 2 || tokens[2].len() != 2 {
        return None;
    }

    let is_two_digits = |t: &str| t.len() == 2 && t.bytes().all(|b| b.is_ascii_digit());
    let clock: Vec<u32> = tokens[3..]
        .iter()
        .rev()
        .take(3)
        .filter(|t| is_two_digits(t))
        .filter_map(|t| t.parse().ok())
        .collect();
    if clock.len() != 3 {
        return None;
    }

    let time = NaiveTime::from_hms_opt(clock[2], clock[1], clock[0])?;
    Some(NaiveDateTime::new(date, time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn known_serial_days() {
        assert_eq!(
            datenum_to_datetime(737426.0).unwrap(),
            ymd_hms(2019, 1, 1, 0, 0, 0)
        );
        assert_eq!(
            datenum_to_datetime(719529.0).unwrap(),
            ymd_hms(1970, 1, 1, 0, 0, 0)
        );
        assert_eq!(
            datenum_to_datetime(737426.5).unwrap(),
            ymd_hms(2019, 1, 1, 12, 0, 0)
        );
        assert_eq!(
            datenum_to_datetime(737426.75).unwrap(),
            ymd_hms(2019, 1, 1, 18, 0, 0)
        );
    }

    #[test]
    fn seconds_rounding_rolls_over() {
        // one minute after midnight lands on 59.999.. seconds before rounding
        let one_minute = 1.0 / 24.0 / 60.0;
        assert_eq!(
            datenum_to_datetime(737426.0 + one_minute).unwrap(),
            ymd_hms(2019, 1, 1, 0, 1, 0)
        );

        let almost_midnight = 737426.0 + (86_399.8 / 86_400.0);
        assert_eq!(
            datenum_to_datetime(almost_midnight).unwrap(),
            ymd_hms(2019, 1, 2, 0, 0, 0)
        );
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(matches!(
            datenum_to_datetime(f64::NAN),
            Err(DateError::NotFinite(_))
        ));
        assert!(matches!(
            datenum_to_datetime(f64::INFINITY),
            Err(DateError::NotFinite(_))
        ));
        assert_eq!(datenum_to_datetime(-1.0), Err(DateError::Negative(-1.0)));
        assert!(matches!(
            datenum_to_datetime(1e12),
            Err(DateError::OutOfRange(_))
        ));
    }

    #[test]
    fn polly_filename_start_time() {
        assert_eq!(
            parse_polly_filename("2019_05_20_Mon_LACROS_00_00_01.nc"),
            Some(ymd_hms(2019, 5, 20, 0, 0, 1))
        );
        assert_eq!(
            parse_polly_filename("2020_01_31_Fri_DWD_13_30_00.nc.zip"),
            Some(ymd_hms(2020, 1, 31, 13, 30, 0))
        );
        assert_eq!(parse_polly_filename("overlap.nc"), None);
        assert_eq!(parse_polly_filename("2019_13_20_Mon_X_00_00_01.nc"), None);
    }

    #[test]
    fn polly_filename_needs_two_digit_clock() {
        assert_eq!(
            parse_polly_filename("/data/2019_05_20_Mon_LACROS_23_59_59_att_bsc.nc"),
            None
        );
        assert_eq!(parse_polly_filename("2019_05_20_Mon_LACROS_0a_00_01.nc"), None);
        assert_eq!(parse_polly_filename("2019_05_20_Mon_LACROS_0_00_01.nc"), None);
        assert_eq!(
            parse_polly_filename("/data/2019_05_20_Mon_LACROS_23_59_59.nc"),
            Some(ymd_hms(2019, 5, 20, 23, 59, 59))
        );
    }
}
