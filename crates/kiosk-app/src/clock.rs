// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset, Weekday};

/// Wall-clock source pinned to the offset detected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    offset: UtcOffset,
}

impl WallClock {
    /// Must run before other threads start: the platform offset lookup
    /// fails in a multi-threaded process, and this falls back to UTC.
    pub fn detect() -> Self {
        Self {
            offset: UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        }
    }

    pub const fn fixed(offset: UtcOffset) -> Self {
        Self { offset }
    }

    pub const fn offset(self) -> UtcOffset {
        self.offset
    }

    pub fn now(self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }

    pub fn face(self) -> ClockFace {
        ClockFace::from_datetime(self.now())
    }

    pub fn minute_of_day(self) -> u32 {
        let now = self.now();
        u32::from(now.hour()) * 60 + u32::from(now.minute())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClockFace {
    pub time: String,
    pub date: String,
}

impl ClockFace {
    pub fn from_datetime(at: OffsetDateTime) -> Self {
        let time = at
            .format(format_description!("[hour]:[minute]:[second]"))
            .unwrap_or_default();
        let date = at
            .format(format_description!("[year]/[month]/[day]"))
            .map(|date| format!("{date} ({})", weekday_label(at.weekday())))
            .unwrap_or_default();
        Self { time, date }
    }
}

const fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "月",
        Weekday::Tuesday => "火",
        Weekday::Wednesday => "水",
        Weekday::Thursday => "木",
        Weekday::Friday => "金",
        Weekday::Saturday => "土",
        Weekday::Sunday => "日",
    }
}

#[cfg(test)]
mod tests {
    use super::{ClockFace, WallClock};
    use anyhow::Result;
    use time::{Date, Month, PrimitiveDateTime, Time, UtcOffset};

    #[test]
    fn formats_24_hour_time_and_japanese_weekday() -> Result<()> {
        let at = PrimitiveDateTime::new(
            Date::from_calendar_date(2025, Month::May, 18)?,
            Time::from_hms(7, 5, 9)?,
        )
        .assume_utc();

        let face = ClockFace::from_datetime(at);
        assert_eq!(face.time, "07:05:09");
        assert_eq!(face.date, "2025/05/18 (日)");
        Ok(())
    }

    #[test]
    fn fixed_clock_reports_its_offset() -> Result<()> {
        let tokyo = UtcOffset::from_hms(9, 0, 0)?;
        let clock = WallClock::fixed(tokyo);
        assert_eq!(clock.now().offset(), tokyo);
        assert!(clock.minute_of_day() < 24 * 60);
        assert_eq!(clock.face().time.len(), "00:00:00".len());
        Ok(())
    }
}
