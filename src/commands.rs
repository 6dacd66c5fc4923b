// src/commands.rs

use crate::calendar::{self, DisplayedMonth, MonthGrid, WeekStart};
use crate::db::Storage;
use crate::error::{Result, StoolError};
use crate::models::{Color, EntryDraft, LogEntry, ShapeType, Size};
use crate::store::{demo_entries, EntryStore};
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::env;
use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;
use std::process::Command;

/// The form fields of `log`, still unparsed.
#[derive(Debug, Default)]
pub struct LogArgs {
    pub shape: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub blood: bool,
    pub pain: bool,
    pub notes: Option<String>,
    pub edit: bool,
    pub at: Option<String>,
}

/// 处理 'init' 命令
pub fn handle_init<S: Storage>(db_path: &Path, store: &EntryStore<S>) -> Result<()> {
    println!("✓ Database ready at: {}", db_path.display());
    println!("✓ {} entries stored.", store.entries().len());
    Ok(())
}

/// 处理 'log' 命令
pub fn handle_log<S: Storage>(store: &mut EntryStore<S>, args: LogArgs) -> Result<()> {
    let draft = build_draft(&args)?;
    let result = match args.at.as_deref() {
        Some(s) => store.add_at(draft, parse_timestamp(s)?),
        None => store.add(draft),
    };

    match result {
        Ok(entry) => {
            println!("✓ Entry recorded.");
            print_entry(&entry);
            Ok(())
        }
        Err(err @ StoolError::Diverged { .. }) => {
            if let StoolError::Diverged { entry, .. } = &err {
                eprintln!(
                    "Warning: entry from {} is only in memory, retrying once...",
                    entry.timestamp.format("%Y-%m-%d %H:%M")
                );
            }
            match store.flush() {
                Ok(()) => {
                    println!("✓ Entry recorded on retry.");
                    if let StoolError::Diverged { entry, .. } = &err {
                        print_entry(entry);
                    }
                    Ok(())
                }
                Err(retry_err) => {
                    tracing::warn!(error = %retry_err, "retrying the write failed");
                    Err(err)
                }
            }
        }
        Err(err) => Err(err),
    }
}

fn build_draft(args: &LogArgs) -> Result<EntryDraft> {
    let notes = if args.edit {
        read_notes_from_editor()?
    } else {
        args.notes.clone().unwrap_or_default()
    };
    Ok(EntryDraft {
        shape_type: args.shape.as_deref().map(str::parse::<ShapeType>).transpose()?,
        size: args.size.as_deref().map(str::parse::<Size>).transpose()?,
        color: args.color.as_deref().map(str::parse::<Color>).transpose()?,
        has_blood: args.blood,
        has_pain: args.pain,
        notes: notes.trim().to_string(),
    })
}

fn read_notes_from_editor() -> Result<String> {
    let temp_file = tempfile::NamedTempFile::new()?;
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = Command::new(&editor).arg(temp_file.path()).status()?;

    if !status.success() {
        return Err(StoolError::EditorError);
    }
    let mut buf = String::new();
    temp_file.reopen()?.read_to_string(&mut buf)?;
    Ok(buf)
}

/// 解析 "YYYY-MM-DDTHH:MM"，也接受带秒或用空格分隔的形式
fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| {
            StoolError::InvalidInput(format!("Invalid time: {}. Use YYYY-MM-DDTHH:MM.", s))
        })
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        StoolError::InvalidInput("Invalid date format. Use YYYY-MM-DD.".to_string())
    })
}

/// 处理 'list' 命令
pub fn handle_list<S: Storage>(
    store: &EntryStore<S>,
    date: Option<String>,
    all: bool,
    num: Option<u32>,
    default_limit: u32,
) -> Result<()> {
    let entries = store.entries();

    if all {
        let limit = num.unwrap_or(default_limit) as usize;
        let mut shown = 0;
        for (day, group) in newest_days_first(entries) {
            if shown >= limit {
                break;
            }
            println!("{}", day_heading(day));
            for entry in group.into_iter().take(limit - shown) {
                print_entry(entry);
                shown += 1;
            }
        }
        if shown == 0 {
            println!("No logs found.");
        }
        return Ok(());
    }

    let (day, heading) = match date {
        Some(d) => {
            let day = parse_date(&d)?;
            (day, day_heading(day))
        }
        None => (Local::now().date_naive(), "Today's Logs".to_string()),
    };

    let mut day_entries = calendar::entries_for_date(entries, day).peekable();
    if day_entries.peek().is_none() {
        println!("No logs found.");
        return Ok(());
    }
    println!("{}", heading);
    let limit = num.map_or(usize::MAX, |n| n as usize);
    for entry in day_entries.take(limit) {
        print_entry(entry);
    }
    Ok(())
}

/// 按日期倒序分组，--at 补录的条目也按实际日期排列
fn newest_days_first(entries: &[LogEntry]) -> Vec<(NaiveDate, Vec<&LogEntry>)> {
    let mut groups = calendar::group_by_date(entries);
    groups.sort_by(|a, b| b.0.cmp(&a.0));
    groups
}

/// 处理 'day' 命令
pub fn handle_day<S: Storage>(store: &EntryStore<S>, date: &str) -> Result<()> {
    let day = parse_date(date)?;
    let entries = store.entries();

    let Some(category) = calendar::day_category(entries, day) else {
        println!("No logs found for {}.", day);
        return Ok(());
    };

    if calendar::is_today(day) {
        println!("{} (today)", day_heading(day));
    } else {
        println!("{}", day_heading(day));
    }
    println!("Day marked as: {} {}", category.emoji(), category);
    for entry in calendar::entries_for_date(entries, day) {
        print_entry(entry);
    }
    Ok(())
}

/// 处理 'calendar' 命令
pub fn handle_calendar<S: Storage>(
    store: &EntryStore<S>,
    month: Option<String>,
    prev: Option<u32>,
    next: Option<u32>,
    week_start: WeekStart,
) -> Result<()> {
    let mut displayed = match month {
        Some(m) => m.parse::<DisplayedMonth>()?,
        None => DisplayedMonth::current(),
    };
    for _ in 0..prev.unwrap_or(0) {
        displayed = displayed.prev();
    }
    for _ in 0..next.unwrap_or(0) {
        displayed = displayed.next();
    }

    let entries = store.entries();
    let grid = calendar::month_grid(entries, displayed, week_start, Local::now().date_naive());
    print!("{}", render_month(&grid));

    for (day, group) in calendar::group_by_date(entries) {
        if !displayed.contains(day) {
            continue;
        }
        println!();
        println!("{}", day_heading(day));
        for entry in group {
            print_entry(entry);
        }
    }
    Ok(())
}

/// 处理 'options' 命令
pub fn handle_options() -> Result<()> {
    println!("Shapes:");
    for shape in ShapeType::ALL {
        let key = serde_json::to_value(shape)?;
        println!(
            "  {}  {:<34} {} ({})",
            shape.number(),
            shape.name(),
            key.as_str().unwrap_or_default(),
            shape.category()
        );
    }
    println!("Sizes:");
    for size in Size::ALL {
        println!("  {:<3} {}", size.code(), size.label());
    }
    println!("Colors:");
    for color in Color::ALL {
        println!("  {}  {}", color.hex(), color.name());
    }
    Ok(())
}

/// 处理 'seed' 命令
pub fn handle_seed<S: Storage>(store: &mut EntryStore<S>) -> Result<()> {
    if store.seed_if_empty(demo_entries())? {
        println!("✓ Added {} demo entries.", store.entries().len());
    } else {
        println!("Database already has entries, nothing seeded.");
    }
    Ok(())
}

fn day_heading(day: NaiveDate) -> String {
    day.format("%A, %B %-d, %Y").to_string()
}

fn print_entry(entry: &LogEntry) {
    let category = entry.category();
    println!(
        "{} {:<12} {:<30} {}",
        category.emoji(),
        category.label(),
        entry.description(),
        entry.timestamp.format("%H:%M")
    );
    let color = entry.color.map_or("-", |c| c.name());
    println!("   └─ Shape {}: {} | Color: {}", entry.shape_type.number(), entry.shape_type.name(), color);
    if !entry.notes.is_empty() {
        println!("   └─ {}", entry.notes);
    }
}

/// Renders the grid as text. Days with entries carry their category marker,
/// today carries '*' instead.
fn render_month(grid: &MonthGrid) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", grid.month);
    let headers: Vec<String> = grid
        .week_start
        .headers()
        .iter()
        .map(|h| format!("{:>4}", h))
        .collect();
    let _ = writeln!(out, "{}", headers.concat());

    for week in grid.weeks() {
        let mut line = String::new();
        for slot in week {
            match slot {
                Some(cell) => {
                    let mark = if cell.is_today {
                        '*'
                    } else {
                        cell.category.map_or(' ', |c| c.marker())
                    };
                    let _ = write!(line, "{:>3}{}", cell.day, mark);
                }
                None => line.push_str("    "),
            }
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }
    let _ = writeln!(out, "  c constipation  n normal  d diarrhea  * today");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStorage;
    use crate::models::Category;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[test]
    fn parses_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 22)
            .unwrap()
            .and_hms_opt(12, 40, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-01-22T12:40").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-22 12:40:00").unwrap(), expected);
        assert!(parse_timestamp("2024-01-22").is_err());
        assert!(parse_date("22/01/2024").is_err());
    }

    #[test]
    fn log_records_form_selections() {
        let mut store = EntryStore::open(SqliteStorage::open_in_memory().unwrap(), "stool-logs");
        let args = LogArgs {
            shape: Some("4".to_string()),
            size: Some("M".to_string()),
            color: Some("#8B4513".to_string()),
            notes: Some("  after coffee \n".to_string()),
            at: Some("2024-01-22T12:40".to_string()),
            ..Default::default()
        };
        handle_log(&mut store, args).unwrap();

        let entries = store.load();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].shape_type, ShapeType::SmoothSnake);
        assert_eq!(entries[0].size, Some(Size::M));
        assert_eq!(entries[0].color, Some(Color::Brown));
        assert_eq!(entries[0].notes, "after coffee");
        assert_eq!(entries[0].category(), Category::Normal);
    }

    #[test]
    fn log_rejects_unknown_values_without_writing() {
        let mut store = EntryStore::open(SqliteStorage::open_in_memory().unwrap(), "stool-logs");
        let args = LogArgs {
            size: Some("XXL".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            handle_log(&mut store, args),
            Err(StoolError::InvalidInput(_))
        ));
        assert!(store.load().is_empty());
    }

    struct FailingWrites {
        inner: SqliteStorage,
        failures_left: Cell<u32>,
    }

    impl Storage for FailingWrites {
        fn read(&self, key: &str) -> Result<Option<String>> {
            self.inner.read(key)
        }

        fn write(&self, key: &str, value: &str) -> Result<()> {
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err(StoolError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.inner.write(key, value)
        }
    }

    fn failing_store(failures: u32) -> EntryStore<FailingWrites> {
        let storage = FailingWrites {
            inner: SqliteStorage::open_in_memory().unwrap(),
            failures_left: Cell::new(failures),
        };
        EntryStore::open(storage, "stool-logs")
    }

    fn timed_args(at: &str) -> LogArgs {
        LogArgs {
            at: Some(at.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn log_succeeds_when_the_retry_writes() {
        let mut store = failing_store(1);
        handle_log(&mut store, timed_args("2024-01-22T12:40")).unwrap();
        assert!(!store.is_diverged());
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn log_reports_divergence_when_the_retry_fails() {
        let mut store = failing_store(2);
        let err = handle_log(&mut store, timed_args("2024-01-22T12:40")).unwrap_err();
        assert!(matches!(err, StoolError::Diverged { .. }));
        assert!(store.is_diverged());
        assert_eq!(store.entries().len(), 1);
    }

    #[test]
    fn newest_day_comes_first_even_when_backdated() {
        let mut store = EntryStore::open(SqliteStorage::open_in_memory().unwrap(), "stool-logs");
        for at in ["2024-01-23T08:15", "2024-01-20T09:00", "2024-01-25T07:30", "2024-01-20T21:00"] {
            handle_log(&mut store, timed_args(at)).unwrap();
        }
        let days: Vec<(NaiveDate, usize)> = newest_days_first(store.entries())
            .into_iter()
            .map(|(day, group)| (day, group.len()))
            .collect();
        assert_eq!(
            days,
            vec![
                (NaiveDate::from_ymd_opt(2024, 1, 25).unwrap(), 1),
                (NaiveDate::from_ymd_opt(2024, 1, 23).unwrap(), 1),
                (NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(), 2),
            ]
        );
    }

    #[test]
    fn renders_month_grid() {
        let entries = vec![EntryDraft {
            shape_type: Some(ShapeType::Watery),
            ..Default::default()
        }
        .into_entry(
            NaiveDate::from_ymd_opt(2024, 1, 23)
                .unwrap()
                .and_hms_opt(8, 15, 0)
                .unwrap(),
        )];
        let month = DisplayedMonth::new(2024, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let grid = calendar::month_grid(&entries, month, WeekStart::Monday, today);
        let text = render_month(&grid);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "January 2024");
        assert_eq!(lines[1], " Mon Tue Wed Thu Fri Sat Sun");
        assert_eq!(lines[2], "  1   2*  3   4   5   6   7");
        assert_eq!(lines[5], " 22  23d 24  25  26  27  28");
        assert_eq!(lines[6], " 29  30  31");
    }
}
