// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::Instant;

use crate::clock::ClockFace;
use crate::feed::{FeedRequest, Loaded};
use crate::icons::IconTable;
use crate::model::WeatherSnapshot;
use crate::news::NewsCycler;
use crate::orchestrator::{Orchestrator, TaskKind, Wakeup};
use crate::pager::{StatusPager, StatusView};
use crate::routes::{RouteCard, RouteLimit, ScheduleBoard};
use crate::theme::{ColorSlot, PanelKind, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    Clock,
    StatusList,
    WeatherPanel,
    NewsHeadline,
    ScheduleBoard,
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(FeedRequest),
    Render(RenderTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsRow {
    PanelVisible(PanelKind),
    PanelColor(PanelKind, ColorSlot),
    FontFamily,
    Zoom,
    FontSize,
    Resizable,
    LinesPerPage,
    Route(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEdit {
    Toggle,
    Step(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsOverlay {
    pub open: bool,
    pub selected: usize,
}

/// Everything the panel shows plus the orchestrator that paces it. Pure
/// state: network work and drawing come back to the caller as effects.
#[derive(Debug, Clone)]
pub struct Kiosk {
    icons: IconTable,
    theme: Theme,
    clock: ClockFace,
    status: StatusPager,
    weather: WeatherSnapshot,
    news: NewsCycler,
    schedule: ScheduleBoard,
    settings: SettingsOverlay,
    orchestrator: Orchestrator,
}

impl Default for Kiosk {
    fn default() -> Self {
        Self::new(Theme::default(), IconTable::builtin())
    }
}

impl Kiosk {
    pub fn new(theme: Theme, icons: IconTable) -> Self {
        Self {
            icons,
            theme,
            clock: ClockFace::default(),
            status: StatusPager::default(),
            weather: WeatherSnapshot::default(),
            news: NewsCycler::default(),
            schedule: ScheduleBoard::default(),
            settings: SettingsOverlay::default(),
            orchestrator: Orchestrator::default(),
        }
    }

    /// Initial clock draw, one load per feed, then every periodic task.
    pub fn boot(&mut self, now: Instant, clock: ClockFace) -> Vec<Effect> {
        self.clock = clock;
        let mut effects = vec![Effect::Render(RenderTarget::Clock)];
        effects.extend(self.fetch_all());
        self.orchestrator.start(now);
        effects
    }

    pub fn fetch_all(&self) -> Vec<Effect> {
        vec![
            Effect::Fetch(self.status_request()),
            Effect::Fetch(FeedRequest::Weather),
            Effect::Fetch(FeedRequest::Schedule),
            Effect::Fetch(FeedRequest::News),
        ]
    }

    pub fn status_request(&self) -> FeedRequest {
        FeedRequest::Status {
            max_lines: self.theme.lines_per_page,
        }
    }

    pub fn reload_status(&self) -> Vec<Effect> {
        vec![Effect::Fetch(self.status_request())]
    }

    pub fn poll<F>(&mut self, now: Instant, mut clock: F) -> Vec<Effect>
    where
        F: FnMut() -> ClockFace,
    {
        let mut effects = Vec::new();
        for wakeup in self.orchestrator.due(now) {
            effects.extend(self.on_wakeup(now, wakeup, &mut clock));
        }
        effects
    }

    fn on_wakeup<F>(&mut self, now: Instant, wakeup: Wakeup, clock: &mut F) -> Vec<Effect>
    where
        F: FnMut() -> ClockFace,
    {
        match wakeup {
            Wakeup::Task(TaskKind::Clock) => {
                self.clock = clock();
                vec![Effect::Render(RenderTarget::Clock)]
            }
            Wakeup::Task(TaskKind::StatusPage) => {
                if self.status.snapshot().is_empty() {
                    return Vec::new();
                }
                self.status.advance(self.theme.lines_per_page);
                vec![Effect::Render(RenderTarget::StatusList)]
            }
            Wakeup::Task(TaskKind::StatusReload) => self.reload_status(),
            Wakeup::Task(TaskKind::WeatherReload) => vec![Effect::Fetch(FeedRequest::Weather)],
            Wakeup::Task(TaskKind::ScheduleReload) => vec![Effect::Fetch(FeedRequest::Schedule)],
            Wakeup::Task(TaskKind::NewsReload) => vec![Effect::Fetch(FeedRequest::News)],
            Wakeup::Task(TaskKind::NewsCycle) => {
                if !self.news.advance() {
                    return Vec::new();
                }
                self.orchestrator.schedule_reveal(now);
                vec![Effect::Render(RenderTarget::NewsHeadline)]
            }
            Wakeup::NewsReveal => {
                if self.news.reveal() {
                    vec![Effect::Render(RenderTarget::NewsHeadline)]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Swaps a freshly loaded snapshot in whole. Failed loads never reach
    /// here, so the previous snapshot stays as it was. While suspended the
    /// snapshot is still stored but only the settings rows are redrawn;
    /// closing the overlay draws every panel.
    pub fn on_loaded(&mut self, now: Instant, loaded: Loaded) -> Vec<Effect> {
        let mut effects = self.store_loaded(now, loaded);
        if self.orchestrator.is_suspended() {
            effects.retain(|effect| *effect == Effect::Render(RenderTarget::Settings));
        }
        effects
    }

    fn store_loaded(&mut self, now: Instant, loaded: Loaded) -> Vec<Effect> {
        match loaded {
            Loaded::Status(snapshot) => {
                if self.status.replace(snapshot) {
                    self.orchestrator.install_status_pager(now);
                    vec![Effect::Render(RenderTarget::StatusList)]
                } else {
                    Vec::new()
                }
            }
            Loaded::Weather(snapshot) => {
                self.weather = snapshot;
                vec![Effect::Render(RenderTarget::WeatherPanel)]
            }
            Loaded::News(snapshot) => {
                if self.news.replace(snapshot) {
                    vec![Effect::Render(RenderTarget::NewsHeadline)]
                } else {
                    Vec::new()
                }
            }
            Loaded::Schedule(snapshot) => {
                let mut effects = vec![Effect::Render(RenderTarget::ScheduleBoard)];
                if self.schedule.replace(snapshot) {
                    effects.push(Effect::Render(RenderTarget::Settings));
                }
                effects
            }
        }
    }

    pub fn open_settings(&mut self) -> Vec<Effect> {
        if self.settings.open {
            return Vec::new();
        }
        self.settings.open = true;
        self.orchestrator.suspend_all();
        vec![Effect::Render(RenderTarget::Settings)]
    }

    pub fn close_settings(&mut self, now: Instant) -> Vec<Effect> {
        if !self.settings.open {
            return Vec::new();
        }
        self.settings.open = false;
        self.orchestrator.resume_all(now);
        vec![
            Effect::Render(RenderTarget::Settings),
            Effect::Render(RenderTarget::StatusList),
            Effect::Render(RenderTarget::WeatherPanel),
            Effect::Render(RenderTarget::NewsHeadline),
            Effect::Render(RenderTarget::ScheduleBoard),
        ]
    }

    pub fn settings_rows(&self) -> Vec<SettingsRow> {
        let mut rows = PanelKind::ALL
            .iter()
            .map(|kind| SettingsRow::PanelVisible(*kind))
            .collect::<Vec<_>>();
        for kind in PanelKind::ALL {
            rows.push(SettingsRow::PanelColor(kind, ColorSlot::Background));
            rows.push(SettingsRow::PanelColor(kind, ColorSlot::Foreground));
        }
        rows.extend([
            SettingsRow::FontFamily,
            SettingsRow::Zoom,
            SettingsRow::FontSize,
            SettingsRow::Resizable,
            SettingsRow::LinesPerPage,
        ]);
        if let Some(filter) = self.schedule.filter() {
            rows.extend(filter.labels().iter().cloned().map(SettingsRow::Route));
        }
        rows
    }

    pub fn select_setting(&mut self, delta: i64) -> Vec<Effect> {
        let len = self.settings_rows().len();
        if len == 0 {
            return Vec::new();
        }
        let current = self.settings.selected.min(len - 1) as i64;
        self.settings.selected = (current + delta).rem_euclid(len as i64) as usize;
        vec![Effect::Render(RenderTarget::Settings)]
    }

    pub fn selected_setting(&self) -> Option<SettingsRow> {
        self.settings_rows().get(self.settings.selected).cloned()
    }

    pub fn edit_selected(&mut self, edit: SettingsEdit) -> Vec<Effect> {
        match self.selected_setting() {
            Some(row) => self.edit_setting(&row, edit),
            None => Vec::new(),
        }
    }

    pub fn edit_setting(&mut self, row: &SettingsRow, edit: SettingsEdit) -> Vec<Effect> {
        let delta = match edit {
            SettingsEdit::Toggle => 1,
            SettingsEdit::Step(delta) => delta,
        };
        let mut effects = vec![Effect::Render(RenderTarget::Settings)];
        match row {
            SettingsRow::PanelVisible(kind) => {
                self.theme.toggle_panel(*kind);
            }
            SettingsRow::PanelColor(kind, slot) => {
                self.theme.cycle_color(*kind, *slot, delta);
            }
            SettingsRow::FontFamily => {
                self.theme.cycle_font(delta);
            }
            SettingsRow::Zoom => self.theme.zoom = self.theme.zoom.step(delta),
            SettingsRow::FontSize => self.theme.font_size = self.theme.font_size.step(delta),
            SettingsRow::Resizable => self.theme.resizable = !self.theme.resizable,
            SettingsRow::LinesPerPage => {
                self.theme.lines_per_page = self.theme.lines_per_page.step(delta);
                effects.push(Effect::Render(RenderTarget::StatusList));
            }
            SettingsRow::Route(label) => match edit {
                SettingsEdit::Toggle => {
                    let visible = self
                        .schedule
                        .filter()
                        .is_some_and(|filter| filter.is_visible(label));
                    effects.extend(self.set_route_visibility(label, !visible));
                }
                SettingsEdit::Step(delta) => {
                    let limit = self
                        .schedule
                        .filter()
                        .map(|filter| filter.limit(label))
                        .unwrap_or_default();
                    effects.extend(self.set_route_limit(label, limit.step(delta)));
                }
            },
        }
        effects
    }

    pub fn set_route_visibility(&mut self, label: &str, visible: bool) -> Vec<Effect> {
        if self.schedule.set_visibility(label, visible) {
            vec![Effect::Render(RenderTarget::ScheduleBoard)]
        } else {
            Vec::new()
        }
    }

    pub fn set_route_limit(&mut self, label: &str, limit: RouteLimit) -> Vec<Effect> {
        if self.schedule.set_limit(label, limit) {
            vec![Effect::Render(RenderTarget::ScheduleBoard)]
        } else {
            Vec::new()
        }
    }

    pub fn status_view(&self) -> StatusView {
        self.status.render(self.theme.lines_per_page, &self.icons)
    }

    pub fn schedule_cards(&self) -> Vec<RouteCard> {
        self.schedule.render(&self.icons)
    }

    pub fn headline(&self) -> Option<&str> {
        self.news.headline()
    }

    pub fn weather(&self) -> &WeatherSnapshot {
        &self.weather
    }

    pub fn clock(&self) -> &ClockFace {
        &self.clock
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn status(&self) -> &StatusPager {
        &self.status
    }

    pub fn news(&self) -> &NewsCycler {
        &self.news
    }

    pub fn schedule(&self) -> &ScheduleBoard {
        &self.schedule
    }

    pub fn settings(&self) -> SettingsOverlay {
        self.settings
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }
}
