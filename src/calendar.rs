// src/calendar.rs

//! Month arithmetic and per-day views derived from the entry collection.

use crate::error::{Result, StoolError};
use crate::models::{Category, LogEntry};
use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Which weekday occupies the first column of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    /// Column headers in display order.
    pub fn headers(self) -> [&'static str; 7] {
        match self {
            WeekStart::Sunday => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
            WeekStart::Monday => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
        }
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` (1-12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Weekday index of the first of the month, counted from `week_start`.
/// This is also the number of blank cells before day 1.
pub fn first_weekday_of_month(year: i32, month: u32, week_start: WeekStart) -> u32 {
    let first = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d.weekday(),
        None => return 0,
    };
    match week_start {
        WeekStart::Sunday => first.num_days_from_sunday(),
        WeekStart::Monday => first.num_days_from_monday(),
    }
}

/// Entries recorded on `date`, in insertion order. The iterator can be cloned
/// to walk the same selection again.
pub fn entries_for_date(
    entries: &[LogEntry],
    date: NaiveDate,
) -> impl Iterator<Item = &LogEntry> + Clone + '_ {
    entries.iter().filter(move |e| e.timestamp.date() == date)
}

pub fn has_entries(entries: &[LogEntry], date: NaiveDate) -> bool {
    entries_for_date(entries, date).next().is_some()
}

/// Category of the first entry on `date`; later entries that day do not
/// change it.
pub fn day_category(entries: &[LogEntry], date: NaiveDate) -> Option<Category> {
    entries_for_date(entries, date).next().map(LogEntry::category)
}

pub fn is_today(date: NaiveDate) -> bool {
    is_today_at(date, Local::now().date_naive())
}

pub fn is_today_at(date: NaiveDate, today: NaiveDate) -> bool {
    date == today
}

/// Groups entries by date. Groups keep the order in which their date first
/// appears; entries inside a group keep insertion order.
pub fn group_by_date(entries: &[LogEntry]) -> Vec<(NaiveDate, Vec<&LogEntry>)> {
    let mut groups: Vec<(NaiveDate, Vec<&LogEntry>)> = Vec::new();
    for entry in entries {
        let date = entry.timestamp.date();
        match groups.iter_mut().find(|(d, _)| *d == date) {
            Some((_, group)) => group.push(entry),
            None => groups.push((date, vec![entry])),
        }
    }
    groups
}

/// The year and month the calendar is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayedMonth {
    year: i32,
    month: u32,
}

impl DisplayedMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(StoolError::InvalidInput(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(StoolError::InvalidInput(format!(
                "Year {} is outside the supported calendar range",
                year
            )));
        }
        Ok(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    /// The month before this one. Stays put at the start of the supported range.
    pub fn prev(self) -> Self {
        let (year, month) = if self.month == 1 {
            (self.year.checked_sub(1), 12)
        } else {
            (Some(self.year), self.month - 1)
        };
        self.moved_to(year, month)
    }

    /// The month after this one. Stays put at the end of the supported range.
    pub fn next(self) -> Self {
        let (year, month) = if self.month == 12 {
            (self.year.checked_add(1), 1)
        } else {
            (Some(self.year), self.month + 1)
        };
        self.moved_to(year, month)
    }

    fn moved_to(self, year: Option<i32>, month: u32) -> Self {
        year.and_then(|y| DisplayedMonth::new(y, month).ok()).unwrap_or(self)
    }

    pub fn name(self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    pub fn days(self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn date(self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl FromStr for DisplayedMonth {
    type Err = StoolError;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || StoolError::InvalidInput(format!("Invalid month: {} (use YYYY-MM)", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        DisplayedMonth::new(year, month)
    }
}

impl fmt::Display for DisplayedMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    pub has_entries: bool,
    pub category: Option<Category>,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub month: DisplayedMonth,
    pub week_start: WeekStart,
    pub leading_blanks: u32,
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    /// Rows of seven slots, `None` for blanks before day 1 and after the last day.
    pub fn weeks(&self) -> Vec<[Option<&DayCell>; 7]> {
        let mut slots: Vec<Option<&DayCell>> = (0..self.leading_blanks).map(|_| None).collect();
        slots.extend(self.cells.iter().map(Some));
        slots
            .chunks(7)
            .map(|chunk| {
                let mut row = [None; 7];
                row[..chunk.len()].copy_from_slice(chunk);
                row
            })
            .collect()
    }
}

pub fn month_grid(
    entries: &[LogEntry],
    month: DisplayedMonth,
    week_start: WeekStart,
    today: NaiveDate,
) -> MonthGrid {
    let cells = (1..=month.days())
        .filter_map(|day| month.date(day).map(|date| (day, date)))
        .map(|(day, date)| {
            let marked = has_entries(entries, date);
            DayCell {
                day,
                has_entries: marked,
                category: if marked { day_category(entries, date) } else { None },
                is_today: is_today_at(date, today),
            }
        })
        .collect();
    MonthGrid {
        month,
        week_start,
        leading_blanks: first_weekday_of_month(month.year(), month.month(), week_start),
        cells,
    }
}
