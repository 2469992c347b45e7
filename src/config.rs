//! Runtime settings resolved from the environment.
//!
//! Every value has a default matching the file layout the dashboard expects,
//! so running a subcommand in the data directory with no configuration works.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "HIMARK_DATA_DIR";
pub const OUTPUT_DIR_ENV: &str = "HIMARK_OUTPUT_DIR";
pub const WINDOW_START_ENV: &str = "HIMARK_WINDOW_START";
pub const WINDOW_END_ENV: &str = "HIMARK_WINDOW_END";

/// Inclusive range of calendar days kept by the per-day transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for DateWindow {
    /// 2020-04-06 through 2020-04-10, the days covered by the exercise data.
    fn default() -> Self {
        DateWindow {
            start: NaiveDate::from_ymd_opt(2020, 4, 6).expect("valid date"),
            end: NaiveDate::from_ymd_opt(2020, 4, 10).expect("valid date"),
        }
    }
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Replaces either bound when an override is given.
    pub fn with_overrides(self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        DateWindow {
            start: start.unwrap_or(self.start),
            end: end.unwrap_or(self.end),
        }
    }

    /// Reads `HIMARK_WINDOW_START` / `HIMARK_WINDOW_END`, falling back to the default window.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but is not a `YYYY-MM-DD` date.
    pub fn from_env() -> Result<Self> {
        let start = env_date(WINDOW_START_ENV)?;
        let end = env_date(WINDOW_END_ENV)?;
        Ok(DateWindow::default().with_overrides(start, end))
    }
}

fn env_date(key: &str) -> Result<Option<NaiveDate>> {
    match std::env::var(key) {
        Ok(value) => {
            let date = value
                .parse::<NaiveDate>()
                .with_context(|| format!("{key} must be a YYYY-MM-DD date, got {value:?}"))?;
            Ok(Some(date))
        }
        Err(_) => Ok(None),
    }
}

/// Where inputs are read from and outputs written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub window: DateWindow,
}

impl Settings {
    /// Builds settings from the environment, with explicit overrides taking precedence.
    pub fn load(data_dir: Option<PathBuf>, output_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir
            .or_else(|| std::env::var(DATA_DIR_ENV).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        let output_dir = output_dir
            .or_else(|| std::env::var(OUTPUT_DIR_ENV).ok().map(PathBuf::from))
            .unwrap_or_else(|| data_dir.clone());

        Ok(Settings {
            data_dir,
            output_dir,
            window: DateWindow::from_env()?,
        })
    }

    /// Resolves an input name against the data directory. Absolute paths pass through.
    pub fn input(&self, name: impl AsRef<Path>) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Resolves an output name against the output directory. Absolute paths pass through.
    pub fn output(&self, name: impl AsRef<Path>) -> PathBuf {
        self.output_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_window_is_inclusive() {
        let window = DateWindow::default();
        assert_eq!(window.start, day(2020, 4, 6));
        assert_eq!(window.end, day(2020, 4, 10));
        assert!(window.contains(day(2020, 4, 6)));
        assert!(window.contains(day(2020, 4, 10)));
        assert!(!window.contains(day(2020, 4, 5)));
        assert!(!window.contains(day(2020, 4, 11)));
    }

    #[test]
    fn test_window_overrides() {
        let window = DateWindow::default().with_overrides(Some(day(2020, 4, 8)), None);
        assert_eq!(window.start, day(2020, 4, 8));
        assert_eq!(window.end, day(2020, 4, 10));
    }

    #[test]
    fn test_paths_resolve_against_directories() {
        let settings = Settings {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("out"),
            window: DateWindow::default(),
        };
        assert_eq!(settings.input("a.csv"), PathBuf::from("data/a.csv"));
        assert_eq!(settings.output("b.csv"), PathBuf::from("out/b.csv"));
        assert_eq!(settings.input("/abs/a.csv"), PathBuf::from("/abs/a.csv"));
    }
}
