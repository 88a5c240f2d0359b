// Calendar Module
//
// Workday arithmetic over US federal holidays and the stable daily hash
// used to pick the day's challenges without persisting them.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use serde::Serialize;
use tracing::warn;

/// Upper bound on how far `next_workday`/`previous_workday` will scan.
pub const MAX_WORKDAY_SCAN_DAYS: i64 = 14;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// A holiday occurrence in a specific year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holiday {
    pub name: &'static str,
    pub date: NaiveDate,
}

/// Returns the federal holidays observed by the workday calendar for `year`,
/// sorted by date.
///
/// Fixed-date holidays are not shifted to an observed weekday; a holiday
/// falling on a weekend is already a non-workday.
pub fn holidays_for_year(year: i32) -> Vec<Holiday> {
    let mut holidays = Vec::with_capacity(10);

    let fixed = [
        ("New Year's Day", 1, 1),
        ("Independence Day", 7, 4),
        ("Veterans Day", 11, 11),
        ("Christmas Day", 12, 25),
    ];
    for (name, month, day) in fixed {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            holidays.push(Holiday { name, date });
        }
    }

    let floating = [
        ("Martin Luther King Jr. Day", nth_weekday_of_month(year, 1, Weekday::Mon, 3)),
        ("Presidents' Day", nth_weekday_of_month(year, 2, Weekday::Mon, 3)),
        ("Memorial Day", last_weekday_of_month(year, 5, Weekday::Mon)),
        ("Labor Day", nth_weekday_of_month(year, 9, Weekday::Mon, 1)),
        ("Thanksgiving Day", nth_weekday_of_month(year, 11, Weekday::Thu, 4)),
    ];
    for (name, date) in floating {
        if let Some(date) = date {
            holidays.push(Holiday { name, date });
        }
    }

    if let Some(thanksgiving) = nth_weekday_of_month(year, 11, Weekday::Thu, 4) {
        holidays.push(Holiday { name: "Day after Thanksgiving", date: thanksgiving + Duration::days(1) });
    }

    holidays.sort_by_key(|h| h.date);
    holidays
}

/// True when `date` is one of the holidays computed for its year
pub fn is_holiday(date: NaiveDate) -> bool {
    holidays_for_year(date.year()).iter().any(|h| h.date == date)
}

/// True for Saturday and Sunday
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_workday(date: NaiveDate) -> bool {
    !is_weekend(date) && !is_holiday(date)
}

/// The first workday strictly after `date`.
pub fn next_workday(date: NaiveDate) -> NaiveDate {
    scan_for_workday(date, 1)
}

/// The last workday strictly before `date`.
pub fn previous_workday(date: NaiveDate) -> NaiveDate {
    scan_for_workday(date, -1)
}

fn scan_for_workday(date: NaiveDate, step: i64) -> NaiveDate {
    let found = (1..=MAX_WORKDAY_SCAN_DAYS)
        .map(|offset| date + Duration::days(offset * step))
        .find(|candidate| is_workday(*candidate));

    match found {
        Some(day) => day,
        None => {
            warn!("No workday within {} days of {}", MAX_WORKDAY_SCAN_DAYS, date);
            date + Duration::days(step)
        }
    }
}

/// The `n`th (1-based) occurrence of `weekday` in the given month.
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

/// The last occurrence of `weekday` in the given month.
pub fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last_day = first_of_next.pred_opt()?;

    let back = (7 + last_day.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    Some(last_day - Duration::days(i64::from(back)))
}

/// Deterministic pool index for a given day.
///
/// 32-bit FNV-1a over the bytes of `date_string` followed by `salt`, reduced
/// modulo `pool_size`. The value depends on nothing but its inputs, so every
/// process computes the same selection for the same day. A `pool_size` of 0
/// yields 0.
pub fn daily_selection_index(date_string: &str, salt: &str, pool_size: usize) -> usize {
    if pool_size == 0 {
        return 0;
    }

    let hash = date_string
        .bytes()
        .chain(salt.bytes())
        .fold(FNV_OFFSET_BASIS, |hash, byte| (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME));

    hash as usize % pool_size
}

/// ISO `YYYY-MM-DD` form used as hash input and as the persisted challenge date
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `[date 00:00 UTC, next day 00:00 UTC)`
pub fn utc_day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN));
    (start, start + Duration::days(1))
}
