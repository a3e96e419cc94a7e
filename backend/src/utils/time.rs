use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Returns the current time in the configured timezone.
pub fn now_in_timezone(tz: &Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(tz)
}

/// Returns today's date in the configured timezone.
pub fn today_local(tz: &Tz) -> NaiveDate {
    now_in_timezone(tz).date_naive()
}

/// Formats a UTC instant as a human-readable local timestamp, used in SOS
/// alert messages and report footers.
pub fn human_timestamp(at: DateTime<Utc>, tz: &Tz) -> String {
    at.with_timezone(tz).format("%B %-d, %Y %-I:%M %p %Z").to_string()
}

/// Human-readable day heading for narrative grouping.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn now_in_timezone_returns_datetime_in_tz() {
        let tz = chrono_tz::UTC;
        let result = now_in_timezone(&tz);
        assert_eq!(result.timezone(), tz);
    }

    #[test]
    fn today_local_returns_naive_date() {
        let tz = chrono_tz::UTC;
        let result = today_local(&tz);
        assert_eq!(result, Utc::now().date_naive());
    }

    #[test]
    fn human_timestamp_renders_local_time() {
        let at = Utc.with_ymd_and_hms(2025, 3, 3, 18, 30, 0).unwrap();
        let formatted = human_timestamp(at, &chrono_tz::UTC);
        assert_eq!(formatted, "March 3, 2025 6:30 PM UTC");
    }

    #[test]
    fn day_label_is_human_readable() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert_eq!(day_label(date), "Monday, March 3, 2025");
    }
}
