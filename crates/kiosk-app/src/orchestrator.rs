// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

use crate::news::NEWS_FADE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskKind {
    Clock,
    StatusPage,
    StatusReload,
    WeatherReload,
    ScheduleReload,
    NewsReload,
    NewsCycle,
}

impl TaskKind {
    pub const ALL: [Self; 7] = [
        Self::Clock,
        Self::StatusPage,
        Self::StatusReload,
        Self::WeatherReload,
        Self::ScheduleReload,
        Self::NewsReload,
        Self::NewsCycle,
    ];

    pub const fn period(self) -> Duration {
        match self {
            Self::Clock => Duration::from_secs(1),
            Self::StatusPage => Duration::from_secs(4),
            Self::StatusReload => Duration::from_secs(60),
            Self::WeatherReload => Duration::from_secs(600),
            Self::ScheduleReload => Duration::from_secs(30),
            Self::NewsReload => Duration::from_secs(30),
            Self::NewsCycle => Duration::from_secs(4),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Clock => "clock",
            Self::StatusPage => "status-page",
            Self::StatusReload => "status-reload",
            Self::WeatherReload => "weather-reload",
            Self::ScheduleReload => "schedule-reload",
            Self::NewsReload => "news-reload",
            Self::NewsCycle => "news-cycle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    Task(TaskKind),
    NewsReveal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PeriodicTask {
    kind: TaskKind,
    period: Duration,
    next_due: Instant,
}

/// Sole owner of the periodic tasks. `start`, `suspend_all` and `resume_all`
/// are the only ways the task set changes, plus the status pager install
/// request which is refused while suspended.
///
/// The pending news reveal is a one-shot, not a periodic task, and survives
/// suspension so a headline is never left hidden behind the settings overlay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Orchestrator {
    tasks: Vec<PeriodicTask>,
    suspended: bool,
    status_pager_installed: bool,
    pending_reveal: Option<Instant>,
}

impl Orchestrator {
    /// Installs every task that is not already running. Returns how many
    /// were added, so a second call returns zero.
    pub fn start(&mut self, now: Instant) -> usize {
        self.suspended = false;
        let mut added = 0;
        for kind in TaskKind::ALL {
            if self.install(kind, now) {
                added += 1;
            }
        }
        added
    }

    pub fn suspend_all(&mut self) -> usize {
        let cancelled = self.tasks.len();
        self.tasks.clear();
        self.status_pager_installed = false;
        self.suspended = true;
        cancelled
    }

    pub fn resume_all(&mut self, now: Instant) -> usize {
        self.start(now)
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn status_pager_installed(&self) -> bool {
        self.status_pager_installed
    }

    pub fn active(&self) -> Vec<TaskKind> {
        self.tasks.iter().map(|task| task.kind).collect()
    }

    pub fn is_active(&self, kind: TaskKind) -> bool {
        self.tasks.iter().any(|task| task.kind == kind)
    }

    /// Asks for the status page-advance task. Ignored while suspended (resume
    /// installs it) and when it is already running.
    pub fn install_status_pager(&mut self, now: Instant) -> bool {
        if self.suspended {
            return false;
        }
        self.install(TaskKind::StatusPage, now)
    }

    pub fn schedule_reveal(&mut self, now: Instant) {
        self.pending_reveal = Some(now + NEWS_FADE);
    }

    pub fn reveal_pending(&self) -> bool {
        self.pending_reveal.is_some()
    }

    /// Collects everything due at `now` in task order and pushes each fired
    /// task to its next slot. A task that fell more than a period behind is
    /// rescheduled from `now` instead of firing repeatedly to catch up.
    pub fn due(&mut self, now: Instant) -> Vec<Wakeup> {
        let mut wakeups = Vec::new();
        for task in &mut self.tasks {
            if task.next_due > now {
                continue;
            }
            wakeups.push(Wakeup::Task(task.kind));
            task.next_due += task.period;
            if task.next_due <= now {
                task.next_due = now + task.period;
            }
        }
        if let Some(at) = self.pending_reveal
            && at <= now
        {
            self.pending_reveal = None;
            wakeups.push(Wakeup::NewsReveal);
        }
        wakeups
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks
            .iter()
            .map(|task| task.next_due)
            .chain(self.pending_reveal)
            .min()
    }

    fn install(&mut self, kind: TaskKind, now: Instant) -> bool {
        if self.is_active(kind) {
            return false;
        }
        self.tasks.push(PeriodicTask {
            kind,
            period: kind.period(),
            next_due: now + kind.period(),
        });
        self.tasks.sort_by_key(|task| task.kind);
        if kind == TaskKind::StatusPage {
            self.status_pager_installed = true;
        }
        true
    }
}
