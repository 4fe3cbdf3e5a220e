// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! age() - whole calendar years between a date and an evaluation instant

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime};

use crate::model::{MagmaValue, Scalar};

impl MagmaValue {
    /// Age in whole years relative to the current wall-clock time
    pub fn age(&self) -> MagmaValue {
        self.age_at(Local::now().fixed_offset())
    }

    /// Age in whole years relative to `now`
    ///
    /// Accepts dates, datetimes and date-formatted strings. Fractional years
    /// truncate toward zero, so dates in the future give non-positive ages.
    /// Absent or unparseable values yield absent.
    pub fn age_at(&self, now: DateTime<FixedOffset>) -> MagmaValue {
        let Some(date) = self.as_date(now) else {
            return MagmaValue::Absent;
        };
        let today = now.date_naive();
        let years = if date <= today {
            whole_years(date, today)
        } else {
            -whole_years(today, date)
        };
        MagmaValue::Scalar(Scalar::Number(years as f64))
    }

    fn as_date(&self, now: DateTime<FixedOffset>) -> Option<NaiveDate> {
        match self {
            MagmaValue::Scalar(Scalar::Date(date)) => Some(*date),
            MagmaValue::Scalar(Scalar::DateTime(dt)) => {
                Some(dt.with_timezone(&now.timezone()).date_naive())
            }
            MagmaValue::Scalar(Scalar::String(s)) => parse_date(s.trim(), now),
            _ => None,
        }
    }
}

/// Parse `YYYY-MM-DD`, RFC 3339, or a local `YYYY-MM-DDTHH:MM:SS` timestamp
fn parse_date(text: &str, now: DateTime<FixedOffset>) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&now.timezone()).date_naive());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Completed years from `from` to `to`, where `from <= to`
fn whole_years(from: NaiveDate, to: NaiveDate) -> i64 {
    let mut years = i64::from(to.year() - from.year());
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use chrono::TimeZone;
    use rstest::rstest;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 10, 12, 0, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(date(2006, 5, 10), 18.0)]
    #[case(date(2006, 5, 11), 17.0)]
    #[case(date(2020, 5, 10), 4.0)]
    #[case(date(2024, 5, 10), 0.0)]
    #[case(date(2024, 11, 1), 0.0)]
    #[case(date(2026, 5, 10), -2.0)]
    fn test_age_of_dates(#[case] dob: NaiveDate, #[case] expected: f64) {
        assert_eq!(
            MagmaValue::wrap(dob).age_at(now()).value(),
            Value::Number(expected)
        );
    }

    #[test]
    fn test_leap_day_birthday() {
        let leapling = MagmaValue::wrap(date(2000, 2, 29));
        let before = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2001, 2, 28, 0, 0, 0)
            .unwrap();
        assert_eq!(leapling.age_at(before).value(), Value::Number(0.0));
    }

    #[rstest]
    #[case("2015-01-01", 9.0)]
    #[case("2015-06-01T08:30:00+00:00", 8.0)]
    #[case("2015-06-01T08:30:00", 8.0)]
    fn test_age_of_strings(#[case] text: &str, #[case] expected: f64) {
        assert_eq!(
            MagmaValue::wrap(text).age_at(now()).value(),
            Value::Number(expected)
        );
    }

    #[test]
    fn test_age_of_datetime() {
        let dob = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2006, 5, 10, 0, 0, 0)
            .unwrap();
        assert_eq!(MagmaValue::wrap(dob).age_at(now()).value(), Value::Number(18.0));
    }

    #[test]
    fn test_absent_and_garbage_are_absent() {
        assert!(MagmaValue::Absent.age_at(now()).is_absent());
        assert!(MagmaValue::wrap("yesterday").age_at(now()).is_absent());
        assert!(MagmaValue::wrap(12).age_at(now()).is_absent());
    }
}
