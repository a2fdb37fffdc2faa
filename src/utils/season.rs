use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// The MLB season a date belongs to. Unlike winter sports, a season sits
/// entirely inside one calendar year, spring training through World Series.
pub fn season_of(date: DateTime<Utc>) -> u16 {
    date.year() as u16
}

pub fn current_season() -> u16 {
    season_of(Utc::now())
}

/// Inclusive season enumeration feeding the head-to-head aggregator.
/// An inverted range is empty rather than an error.
pub fn season_range(first: u16, last: u16) -> Vec<u16> {
    (first..=last).collect()
}

/// Today's date in the `YYYY-MM-DD` form the schedule endpoint expects.
pub fn today_ymd() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// The dates shown by the schedule navigation strip: `radius` days on each
/// side of `center`, in order.
pub fn date_window(center: NaiveDate, radius: i64) -> Vec<NaiveDate> {
    (-radius..=radius)
        .map(|offset| center + Duration::days(offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn season_is_the_calendar_year() {
        let opening_day = Utc.with_ymd_and_hms(2024, 3, 28, 17, 0, 0).unwrap();
        let world_series = Utc.with_ymd_and_hms(2024, 10, 30, 0, 0, 0).unwrap();
        assert_eq!(season_of(opening_day), 2024);
        assert_eq!(season_of(world_series), 2024);
    }

    #[test]
    fn season_range_is_inclusive() {
        assert_eq!(season_range(2021, 2023), vec![2021, 2022, 2023]);
        assert_eq!(season_range(2024, 2024), vec![2024]);
    }

    #[test]
    fn inverted_season_range_is_empty() {
        assert!(season_range(2024, 2021).is_empty());
    }

    #[test]
    fn date_window_is_ordered_and_centered() {
        let center = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let window = date_window(center, 2);
        assert_eq!(window.len(), 5);
        assert_eq!(window[0], NaiveDate::from_ymd_opt(2024, 6, 29).unwrap());
        assert_eq!(window[2], center);
        assert_eq!(window[4], NaiveDate::from_ymd_opt(2024, 7, 3).unwrap());
    }

    #[test]
    fn date_window_crosses_month_boundaries() {
        let center = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
        let window = date_window(center, 1);
        assert_eq!(window[0], NaiveDate::from_ymd_opt(2024, 7, 31).unwrap());
        assert_eq!(window[2], NaiveDate::from_ymd_opt(2024, 8, 2).unwrap());
    }
}
