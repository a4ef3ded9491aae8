// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::pager::LinesPerPage;

pub const FONT_FAMILIES: [&str; 4] = ["sans-serif", "serif", "monospace", "Noto Sans JP"];
pub const COLOR_PALETTE: [&str; 12] = [
    "black", "white", "gray", "darkgray", "blue", "lightblue", "green", "lightgreen", "yellow",
    "red", "#1d2b53", "#fff1e8",
];
const NAMED_COLORS: [&str; 17] = [
    "reset",
    "black",
    "red",
    "green",
    "yellow",
    "blue",
    "magenta",
    "cyan",
    "gray",
    "darkgray",
    "lightred",
    "lightgreen",
    "lightyellow",
    "lightblue",
    "lightmagenta",
    "lightcyan",
    "white",
];
pub const MIN_PERCENT: u16 = 50;
pub const MAX_PERCENT: u16 = 200;
pub const PERCENT_STEP: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PanelKind {
    Status,
    Weather,
    News,
    Schedule,
}

impl PanelKind {
    pub const ALL: [Self; 4] = [Self::Status, Self::Weather, Self::News, Self::Schedule];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Status => "運行情報",
            Self::Weather => "天気",
            Self::News => "ニュース",
            Self::Schedule => "発車案内",
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Weather => "weather",
            Self::News => "news",
            Self::Schedule => "schedule",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSlot {
    Background,
    Foreground,
}

impl ColorSlot {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Background => "背景",
            Self::Foreground => "文字",
        }
    }
}

/// Accepts the terminal color names and `#rrggbb`.
pub fn validate_color(value: &str) -> Result<()> {
    let lowered = value.trim().to_ascii_lowercase();
    if NAMED_COLORS.contains(&lowered.as_str()) {
        return Ok(());
    }
    if let Some(hex) = lowered.strip_prefix('#')
        && hex.len() == 6
        && hex.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Ok(());
    }
    bail!("invalid color {value:?}; use a color name like \"white\" or #rrggbb")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(u16);

impl Percent {
    pub fn clamped(value: i64) -> Self {
        let clamped = value.clamp(i64::from(MIN_PERCENT), i64::from(MAX_PERCENT));
        Self(u16::try_from(clamped).unwrap_or(100))
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    pub fn step(self, delta: i64) -> Self {
        Self::clamped(i64::from(self.0).saturating_add(delta * PERCENT_STEP))
    }
}

impl Default for Percent {
    fn default() -> Self {
        Self(100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelStyle {
    pub visible: bool,
    pub background: String,
    pub foreground: String,
}

impl Default for PanelStyle {
    fn default() -> Self {
        Self {
            visible: true,
            background: "black".to_owned(),
            foreground: "white".to_owned(),
        }
    }
}

impl PanelStyle {
    pub fn color(&self, slot: ColorSlot) -> &str {
        match slot {
            ColorSlot::Background => &self.background,
            ColorSlot::Foreground => &self.foreground,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub status: PanelStyle,
    pub weather: PanelStyle,
    pub news: PanelStyle,
    pub schedule: PanelStyle,
    // The terminal owns font and scale; these only appear in the header readout.
    pub font_family: String,
    pub zoom: Percent,
    pub font_size: Percent,
    pub resizable: bool,
    pub lines_per_page: LinesPerPage,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            status: PanelStyle::default(),
            weather: PanelStyle::default(),
            news: PanelStyle {
                foreground: "yellow".to_owned(),
                ..PanelStyle::default()
            },
            schedule: PanelStyle::default(),
            font_family: FONT_FAMILIES[0].to_owned(),
            zoom: Percent::default(),
            font_size: Percent::default(),
            resizable: false,
            lines_per_page: LinesPerPage::default(),
        }
    }
}

impl Theme {
    pub fn panel(&self, kind: PanelKind) -> &PanelStyle {
        match kind {
            PanelKind::Status => &self.status,
            PanelKind::Weather => &self.weather,
            PanelKind::News => &self.news,
            PanelKind::Schedule => &self.schedule,
        }
    }

    pub fn panel_mut(&mut self, kind: PanelKind) -> &mut PanelStyle {
        match kind {
            PanelKind::Status => &mut self.status,
            PanelKind::Weather => &mut self.weather,
            PanelKind::News => &mut self.news,
            PanelKind::Schedule => &mut self.schedule,
        }
    }

    pub fn is_visible(&self, kind: PanelKind) -> bool {
        self.panel(kind).visible
    }

    pub fn toggle_panel(&mut self, kind: PanelKind) -> bool {
        let panel = self.panel_mut(kind);
        panel.visible = !panel.visible;
        panel.visible
    }

    pub fn set_color(&mut self, kind: PanelKind, slot: ColorSlot, value: &str) -> Result<()> {
        validate_color(value)?;
        let panel = self.panel_mut(kind);
        let target = match slot {
            ColorSlot::Background => &mut panel.background,
            ColorSlot::Foreground => &mut panel.foreground,
        };
        value.trim().clone_into(target);
        Ok(())
    }

    /// Steps through the fixed palette. A color that is not in the palette
    /// (set from config) restarts at the first entry.
    pub fn cycle_color(&mut self, kind: PanelKind, slot: ColorSlot, delta: i64) -> &str {
        let current = self.panel(kind).color(slot).to_owned();
        let next = cycle(&COLOR_PALETTE, &current, delta);
        let panel = self.panel_mut(kind);
        let target = match slot {
            ColorSlot::Background => &mut panel.background,
            ColorSlot::Foreground => &mut panel.foreground,
        };
        next.clone_into(target);
        target
    }

    pub fn cycle_font(&mut self, delta: i64) -> &str {
        let next = cycle(&FONT_FAMILIES, &self.font_family, delta);
        next.clone_into(&mut self.font_family);
        &self.font_family
    }
}

fn cycle<'a>(options: &[&'a str], current: &str, delta: i64) -> &'a str {
    let len = options.len() as i64;
    let Some(position) = options
        .iter()
        .position(|option| option.eq_ignore_ascii_case(current))
    else {
        return options[0];
    };
    let next = (position as i64 + delta).rem_euclid(len) as usize;
    options[next]
}
