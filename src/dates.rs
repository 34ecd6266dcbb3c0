use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Decimal year of a UTC instant, e.g. 2020-07-02 ~ 2020.5.
pub fn decimal_year(time: DateTime<Utc>) -> f64 {
    let year = time.year();
    let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap();
    let days_in_year = (end - start).num_days() as f64;

    let elapsed = time.ordinal0() as f64
        + (time.timestamp() - time.date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp())
            as f64
            / 86_400.0;

    year as f64 + elapsed / days_in_year
}

/// Parses the `MM/DD/YYYY` edition date carried in a coefficient-file
/// header into a decimal year. `None` when the string does not parse, in
/// which case callers fall back to the model epoch.
pub fn edition_date_to_decimal_year(edition_date: &str) -> Option<f64> {
    let date = NaiveDate::parse_from_str(edition_date.trim(), "%m/%d/%Y").ok()?;
    let start = NaiveDate::from_ymd_opt(date.year(), 1, 1)?;
    let end = NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)?;
    let days_in_year = (end - start).num_days() as f64;
    Some(date.year() as f64 + date.ordinal0() as f64 / days_in_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use float_eq::assert_float_eq;

    #[test]
    fn january_first_is_a_whole_year() {
        let t = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert_float_eq!(decimal_year(t), 2023.0, abs <= 1e-9);
    }

    #[test]
    fn midyear_is_about_half() {
        let t = Utc.with_ymd_and_hms(2023, 7, 2, 12, 0, 0).unwrap();
        assert_float_eq!(decimal_year(t), 2023.5, abs <= 0.01);
    }

    #[test]
    fn edition_dates_parse_to_decimal_years() {
        let y = edition_date_to_decimal_year("12/10/2024").unwrap();
        assert!(y > 2024.9 && y < 2025.0);
        assert!(edition_date_to_decimal_year("not-a-date").is_none());
    }
}
