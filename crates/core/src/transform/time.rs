use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::records::TimeRow;

/// Day of week numbered 1 = Sunday through 7 = Saturday.
pub fn weekday_number(date: NaiveDate) -> i32 {
    date.weekday().number_from_sunday() as i32
}

/// Breaks a timestamp into its calendar parts.
pub fn time_row(start_time: NaiveDateTime) -> TimeRow {
    TimeRow {
        start_time,
        hour: start_time.hour() as i32,
        day: start_time.day() as i32,
        week: start_time.iso_week().week() as i32,
        month: start_time.month() as i32,
        year: start_time.year(),
        weekday: weekday_number(start_time.date()),
    }
}

/// Builds the time dimension: one row per distinct timestamp, in first-seen
/// order.
pub fn build_time_table<I>(timestamps: I) -> Vec<TimeRow>
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    let mut seen = HashSet::new();
    timestamps
        .into_iter()
        .filter(|ts| seen.insert(*ts))
        .map(time_row)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::epoch_millis_to_timestamp;

    fn at(millis: i64) -> NaiveDateTime {
        epoch_millis_to_timestamp(millis).unwrap()
    }

    #[test]
    fn test_time_row_parts() {
        // 2018-11-15 00:30:26.796, a Thursday in ISO week 46
        let row = time_row(at(1542241826796));
        assert_eq!(row.hour, 0);
        assert_eq!(row.day, 15);
        assert_eq!(row.week, 46);
        assert_eq!(row.month, 11);
        assert_eq!(row.year, 2018);
        assert_eq!(row.weekday, 5);
    }

    #[test]
    fn test_weekday_numbering_starts_on_sunday() {
        let sunday = NaiveDate::from_ymd_opt(2018, 11, 4).unwrap();
        let monday = NaiveDate::from_ymd_opt(2018, 11, 5).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2018, 11, 10).unwrap();
        assert_eq!(weekday_number(sunday), 1);
        assert_eq!(weekday_number(monday), 2);
        assert_eq!(weekday_number(saturday), 7);
    }

    #[test]
    fn test_iso_week_crosses_year_boundary() {
        // 2018-12-31 10:00 belongs to ISO week 1 of 2019
        let row = time_row(at(1546250400000));
        assert_eq!(row.week, 1);
        assert_eq!(row.year, 2018);
        assert_eq!(row.month, 12);
        assert_eq!(row.weekday, 2);
    }

    #[test]
    fn test_build_time_table_dedups_timestamps() {
        let timestamps = vec![
            at(1542241826796),
            at(1541105830796),
            at(1542241826796),
            at(1541332800000),
            at(1541105830796),
        ];
        let rows = build_time_table(timestamps);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].start_time, at(1542241826796));
        assert_eq!(rows[1].start_time, at(1541105830796));
        assert_eq!(rows[2].start_time, at(1541332800000));
    }

    #[test]
    fn test_time_parts_are_in_range_and_consistent() {
        let timestamps: Vec<NaiveDateTime> = (0..500)
            .map(|i| at(1_541_030_400_000 + i * 7_919_311))
            .collect();
        for row in build_time_table(timestamps) {
            assert!((0..=23).contains(&row.hour));
            assert!((1..=31).contains(&row.day));
            assert!((1..=12).contains(&row.month));
            assert!((1..=53).contains(&row.week));
            assert!((1..=7).contains(&row.weekday));
            assert_eq!(row.weekday, weekday_number(row.start_time.date()));
            assert_eq!(row.day as u32, row.start_time.day());
            assert_eq!(row.year, row.start_time.year());
        }
    }
}
