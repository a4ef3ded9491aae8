// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

use crate::model::{NewsSnapshot, ScheduleSnapshot, StatusSnapshot, WeatherSnapshot};
use crate::pager::LinesPerPage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeedKind {
    Status,
    Weather,
    News,
    Schedule,
}

impl FeedKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Weather => "weather",
            Self::News => "news",
            Self::Schedule => "schedule",
        }
    }

    pub const fn path(self) -> &'static str {
        match self {
            Self::Status => "/api/status",
            Self::Weather => "/api/weather",
            Self::News => "/api/news",
            Self::Schedule => "/api/schedule",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedRequest {
    Status { max_lines: LinesPerPage },
    Weather,
    News,
    Schedule,
}

impl FeedRequest {
    pub const fn kind(self) -> FeedKind {
        match self {
            Self::Status { .. } => FeedKind::Status,
            Self::Weather => FeedKind::Weather,
            Self::News => FeedKind::News,
            Self::Schedule => FeedKind::Schedule,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded {
    Status(StatusSnapshot),
    Weather(WeatherSnapshot),
    News(NewsSnapshot),
    Schedule(ScheduleSnapshot),
}

impl Loaded {
    pub const fn kind(&self) -> FeedKind {
        match self {
            Self::Status(_) => FeedKind::Status,
            Self::Weather(_) => FeedKind::Weather,
            Self::News(_) => FeedKind::News,
            Self::Schedule(_) => FeedKind::Schedule,
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            Self::Status(snapshot) => snapshot.len(),
            Self::Weather(snapshot) => snapshot.forecasts.len(),
            Self::News(snapshot) => snapshot.headlines.len(),
            Self::Schedule(snapshot) => snapshot.routes.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadFailure {
    /// Unreachable endpoint, timeout, or a non-2xx response.
    Transport,
    /// The body was not JSON or lacked the expected top-level key.
    Malformed,
}

impl LoadFailure {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Malformed => "malformed",
        }
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug)]
pub struct FailedLoad {
    pub kind: FeedKind,
    pub failure: LoadFailure,
    pub error: anyhow::Error,
}

impl fmt::Display for FailedLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} load failed ({}): {:#}", self.kind, self.failure, self.error)
    }
}

impl std::error::Error for FailedLoad {}
