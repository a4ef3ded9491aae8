// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::Duration;

use crate::model::NewsSnapshot;

pub const NEWS_FADE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadlinePhase {
    #[default]
    Shown,
    Hidden,
}

/// Rotating headline cursor. A cursor of `None` means nothing has been shown
/// yet; it becomes `Some(0)` on the first non-empty snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewsCycler {
    snapshot: NewsSnapshot,
    cursor: Option<usize>,
    displayed: Option<String>,
    phase: HeadlinePhase,
}

impl NewsCycler {
    /// Returns true when this snapshot initialized the headline.
    pub fn replace(&mut self, snapshot: NewsSnapshot) -> bool {
        self.snapshot = snapshot;
        if self.cursor.is_none() && !self.snapshot.headlines.is_empty() {
            self.cursor = Some(0);
            self.displayed = self.snapshot.headlines.first().cloned();
            self.phase = HeadlinePhase::Shown;
            return true;
        }
        false
    }

    /// Moves to the next headline and hides the current one. The caller owes
    /// a `reveal` once the fade delay elapses. Returns false (and changes
    /// nothing) when there are no headlines.
    pub fn advance(&mut self) -> bool {
        let len = self.snapshot.headlines.len();
        if len == 0 {
            return false;
        }
        let next = match self.cursor {
            Some(cursor) => (cursor + 1) % len,
            None => 0,
        };
        self.cursor = Some(next);
        self.phase = HeadlinePhase::Hidden;
        true
    }

    pub fn reveal(&mut self) -> bool {
        if self.phase == HeadlinePhase::Shown {
            return false;
        }
        let len = self.snapshot.headlines.len();
        if let Some(cursor) = self.cursor
            && len > 0
        {
            self.displayed = self.snapshot.headlines.get(cursor % len).cloned();
        }
        self.phase = HeadlinePhase::Shown;
        true
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn phase(&self) -> HeadlinePhase {
        self.phase
    }

    pub fn headline(&self) -> Option<&str> {
        match self.phase {
            HeadlinePhase::Shown => self.displayed.as_deref(),
            HeadlinePhase::Hidden => None,
        }
    }
}
