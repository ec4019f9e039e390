use chrono::Datelike;
use proptest::prelude::*;

use polly_display::datenum::datenum_to_datetime;

proptest! {
    /// Later serial day-numbers never map to earlier date-times.
    #[test]
    fn conversion_is_monotonic(start in 700_000.0f64..800_000.0, step in 0.0f64..2.0) {
        let earlier = datenum_to_datetime(start).unwrap();
        let later = datenum_to_datetime(start + step).unwrap();
        prop_assert!(earlier <= later, "{start} -> {earlier}, {} -> {later}", start + step);
    }

    /// Whole serial days land on midnight of consecutive calendar days.
    #[test]
    fn whole_days_are_midnight(day in 700_000u32..800_000) {
        let today = datenum_to_datetime(day as f64).unwrap();
        let tomorrow = datenum_to_datetime(day as f64 + 1.0).unwrap();
        prop_assert_eq!(today.time(), chrono::NaiveTime::MIN);
        prop_assert_eq!(tomorrow.date().num_days_from_ce() - today.date().num_days_from_ce(), 1);
    }
}
