// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::pager::LinesPerPage;

pub const ASSET_ROOT: &str = "/static/img/";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    pub fn from_file(file: &str) -> Self {
        Self(format!("{ASSET_ROOT}{file}"))
    }

    /// Turns a logo reference from a feed into an asset path. Absolute URLs
    /// and paths already under the asset root are kept as-is.
    pub fn qualify(reference: &str) -> Self {
        if is_qualified(reference) {
            Self(reference.to_owned())
        } else {
            Self::from_file(reference)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short label for surfaces that cannot show images: the file stem with
    /// any `icon_` prefix dropped, so `tokyurailway/icon_DT.png` becomes `DT`.
    pub fn badge(&self) -> String {
        let file = self
            .0
            .rsplit('/')
            .next()
            .unwrap_or(self.0.as_str());
        let stem = match file.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => file,
        };
        stem.strip_prefix("icon_").unwrap_or(stem).to_owned()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_qualified(reference: &str) -> bool {
    reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with(ASSET_ROOT)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusItem {
    pub text: String,
    pub logo: Option<AssetId>,
}

impl StatusItem {
    pub fn new(text: impl Into<String>, logo: Option<&str>) -> Self {
        Self {
            text: text.into(),
            logo: logo
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(AssetId::qualify),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub items: Vec<StatusItem>,
}

impl StatusSnapshot {
    pub fn new(items: Vec<StatusItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn page_count(&self, lines_per_page: LinesPerPage) -> usize {
        self.items.len().div_ceil(lines_per_page.get())
    }

    pub fn page(&self, index: usize, lines_per_page: LinesPerPage) -> &[StatusItem] {
        let per_page = lines_per_page.get();
        let start = index.saturating_mul(per_page).min(self.items.len());
        let end = start.saturating_add(per_page).min(self.items.len());
        &self.items[start..end]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forecast {
    pub date_label: String,
    pub telop: String,
    pub icon_url: Option<String>,
    pub chance_of_rain: Option<String>,
    pub wind: Option<String>,
}

impl Forecast {
    pub fn rain_label(&self) -> &str {
        self.chance_of_rain
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or("--%")
    }

    pub fn wind_label(&self) -> &str {
        self.wind.as_deref().unwrap_or("")
    }
}

pub const VISIBLE_FORECASTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeatherSnapshot {
    pub forecasts: Vec<Forecast>,
}

impl WeatherSnapshot {
    pub fn visible(&self) -> &[Forecast] {
        &self.forecasts[..self.forecasts.len().min(VISIBLE_FORECASTS)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewsSnapshot {
    pub headlines: Vec<String>,
}

impl NewsSnapshot {
    pub fn new(headlines: Vec<String>) -> Self {
        Self { headlines }
    }
}

/// Departures for one route, either a single anonymous list or one list per
/// direction in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSchedules {
    Flat(Vec<String>),
    Directional(Vec<(String, Vec<String>)>),
}

impl RouteSchedules {
    pub fn directions(&self) -> Vec<(Option<&str>, &[String])> {
        match self {
            Self::Flat(entries) => vec![(None, entries.as_slice())],
            Self::Directional(directions) => directions
                .iter()
                .map(|(name, entries)| (Some(name.as_str()), entries.as_slice()))
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for RouteSchedules {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SchedulesVisitor)
    }
}

struct SchedulesVisitor;

impl<'de> Visitor<'de> for SchedulesVisitor {
    type Value = RouteSchedules;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a list of departures or a map of direction to departures")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut entries = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(entry) = seq.next_element::<String>()? {
            entries.push(entry);
        }
        Ok(RouteSchedules::Flat(entries))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut directions: Vec<(String, Vec<String>)> = Vec::new();
        while let Some((name, entries)) = map.next_entry::<String, Vec<String>>()? {
            if directions.iter().any(|(existing, _)| *existing == name) {
                return Err(de::Error::custom(format!("duplicate direction {name:?}")));
            }
            directions.push((name, entries));
        }
        Ok(RouteSchedules::Directional(directions))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteEntry {
    pub label: String,
    pub schedules: RouteSchedules,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ScheduleSnapshot {
    pub routes: Vec<RouteEntry>,
}

impl ScheduleSnapshot {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|route| route.label.as_str())
    }
}
