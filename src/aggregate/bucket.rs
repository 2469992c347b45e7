use chrono::{NaiveDateTime, TimeDelta};

/// Fixed-width time interval used to group reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    FiveMinutes,
    TenMinutes,
    ThirtyMinutes,
}

impl Bucket {
    pub fn minutes(self) -> i64 {
        match self {
            Bucket::FiveMinutes => 5,
            Bucket::TenMinutes => 10,
            Bucket::ThirtyMinutes => 30,
        }
    }

    /// Name of the output column holding the bucket start, e.g. `time_5min`.
    pub fn column(self) -> String {
        format!("time_{}min", self.minutes())
    }

    /// Start of the bucket containing `time`. Buckets are aligned to the Unix
    /// epoch, which for these widths means aligned to the hour.
    pub fn floor(self, time: NaiveDateTime) -> NaiveDateTime {
        let width = self.minutes() * 60;
        let secs = time.and_utc().timestamp();
        let subsec = TimeDelta::nanoseconds(i64::from(time.and_utc().timestamp_subsec_nanos()));
        time - TimeDelta::seconds(secs.rem_euclid(width)) - subsec
    }
}
