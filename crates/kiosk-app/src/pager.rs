// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::icons::IconTable;
use crate::model::{AssetId, StatusSnapshot};

pub const DEFAULT_LINES_PER_PAGE: usize = 2;
pub const STATUS_PLACEHOLDER: &str = "運行情報はありません";

/// Status lines shown per page. Always at least one; anything unusable
/// falls back to the default of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinesPerPage(usize);

impl LinesPerPage {
    pub fn new(value: i64) -> Self {
        match usize::try_from(value) {
            Ok(value) if value >= 1 => Self(value),
            _ => Self::default(),
        }
    }

    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .parse::<i64>()
            .map(Self::new)
            .unwrap_or_default()
    }

    pub const fn get(self) -> usize {
        self.0
    }

    pub fn step(self, delta: i64) -> Self {
        let next = i64::try_from(self.0)
            .unwrap_or(i64::MAX)
            .saturating_add(delta)
            .max(1);
        Self::new(next)
    }
}

impl Default for LinesPerPage {
    fn default() -> Self {
        Self(DEFAULT_LINES_PER_PAGE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub icons: Vec<AssetId>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusView {
    Placeholder,
    Page {
        index: usize,
        count: usize,
        lines: Vec<StatusLine>,
    },
}

impl StatusView {
    pub fn lines(&self) -> &[StatusLine] {
        match self {
            Self::Placeholder => &[],
            Self::Page { lines, .. } => lines,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusPager {
    snapshot: StatusSnapshot,
    cursor: usize,
    loaded: bool,
}

impl StatusPager {
    /// Swaps in a freshly loaded snapshot. The cursor only resets on the first
    /// load of the session; later reloads keep the operator on the same page
    /// and `current_page` folds it back into range if the snapshot shrank.
    /// Returns true for that first load.
    pub fn replace(&mut self, snapshot: StatusSnapshot) -> bool {
        let first = !self.loaded;
        self.snapshot = snapshot;
        self.loaded = true;
        if first {
            self.cursor = 0;
        }
        first
    }

    pub fn snapshot(&self) -> &StatusSnapshot {
        &self.snapshot
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn page_count(&self, lines_per_page: LinesPerPage) -> usize {
        self.snapshot.page_count(lines_per_page)
    }

    pub fn current_page(&self, lines_per_page: LinesPerPage) -> usize {
        match self.page_count(lines_per_page) {
            0 => 0,
            count => self.cursor % count,
        }
    }

    /// Page count is recomputed on every call so an edited lines-per-page
    /// setting takes effect on the next advance.
    pub fn advance(&mut self, lines_per_page: LinesPerPage) -> usize {
        let count = self.page_count(lines_per_page);
        if count == 0 {
            return self.cursor;
        }
        self.cursor = if count <= 1 {
            0
        } else {
            (self.current_page(lines_per_page) + 1) % count
        };
        self.cursor
    }

    pub fn render(&self, lines_per_page: LinesPerPage, icons: &IconTable) -> StatusView {
        let count = self.page_count(lines_per_page);
        if count == 0 {
            return StatusView::Placeholder;
        }

        let index = self.current_page(lines_per_page);
        let lines = self
            .snapshot
            .page(index, lines_per_page)
            .iter()
            .map(|item| StatusLine {
                icons: match &item.logo {
                    Some(logo) => vec![logo.clone()],
                    None => icons.resolve(&item.text).to_vec(),
                },
                text: item.text.clone(),
            })
            .collect();

        StatusView::Page {
            index,
            count,
            lines,
        }
    }
}
