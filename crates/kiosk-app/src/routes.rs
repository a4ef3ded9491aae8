// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::{BTreeMap, BTreeSet};

use crate::icons::IconTable;
use crate::model::{AssetId, ScheduleSnapshot};

pub const MIN_ROUTE_LIMIT: u8 = 1;
pub const MAX_ROUTE_LIMIT: u8 = 10;
pub const DEFAULT_ROUTE_LIMIT: u8 = 2;
pub const DEPARTURE_PREFIXES: [&str; 3] = ["先発", "次発", "次々発"];

/// Departures shown per direction for one route, always within 1..=10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteLimit(u8);

impl RouteLimit {
    pub fn new(value: i64) -> Self {
        let clamped = value.clamp(i64::from(MIN_ROUTE_LIMIT), i64::from(MAX_ROUTE_LIMIT));
        Self(u8::try_from(clamped).unwrap_or(DEFAULT_ROUTE_LIMIT))
    }

    /// Non-numeric input counts as the minimum, matching how a cleared
    /// stepper behaves.
    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .parse::<i64>()
            .map_or(Self(MIN_ROUTE_LIMIT), Self::new)
    }

    pub const fn get(self) -> usize {
        self.0 as usize
    }

    pub fn step(self, delta: i64) -> Self {
        Self::new(i64::from(self.0).saturating_add(delta))
    }
}

impl Default for RouteLimit {
    fn default() -> Self {
        Self(DEFAULT_ROUTE_LIMIT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSelector {
    pub label: String,
    pub visible: bool,
    pub limit: RouteLimit,
}

/// Operator-owned route filtering. Built once from the first schedule
/// snapshot; later snapshots never rebuild it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteFilter {
    labels: Vec<String>,
    visible: BTreeSet<String>,
    limits: BTreeMap<String, RouteLimit>,
}

impl RouteFilter {
    pub fn from_snapshot(snapshot: &ScheduleSnapshot) -> Self {
        let mut filter = Self::default();
        for label in snapshot.labels() {
            if filter.limits.contains_key(label) {
                continue;
            }
            filter.labels.push(label.to_owned());
            filter.visible.insert(label.to_owned());
            filter.limits.insert(label.to_owned(), RouteLimit::default());
        }
        filter
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn contains(&self, label: &str) -> bool {
        self.limits.contains_key(label)
    }

    pub fn is_visible(&self, label: &str) -> bool {
        self.visible.contains(label)
    }

    pub fn limit(&self, label: &str) -> RouteLimit {
        self.limits.get(label).copied().unwrap_or_default()
    }

    pub fn set_visibility(&mut self, label: &str, visible: bool) -> bool {
        if !self.contains(label) {
            return false;
        }
        if visible {
            self.visible.insert(label.to_owned())
        } else {
            self.visible.remove(label)
        }
    }

    pub fn set_limit(&mut self, label: &str, limit: RouteLimit) -> bool {
        match self.limits.get_mut(label) {
            Some(current) if *current != limit => {
                *current = limit;
                true
            }
            _ => false,
        }
    }

    pub fn selectors(&self) -> Vec<RouteSelector> {
        self.labels
            .iter()
            .map(|label| RouteSelector {
                label: label.clone(),
                visible: self.is_visible(label),
                limit: self.limit(label),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    FirstDeparture,
    SecondDeparture,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub prefix: String,
    pub detail: String,
    pub emphasis: Emphasis,
}

impl Departure {
    pub fn text(&self) -> String {
        format!("{}:{}", self.prefix, self.detail)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionBlock {
    pub name: Option<String>,
    pub departures: Vec<Departure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCard {
    pub label: String,
    pub icons: Vec<AssetId>,
    pub directions: Vec<DirectionBlock>,
}

/// Splits `prefix:detail` on the first colon and swaps in the positional
/// prefix for the first three departures.
pub fn format_departure(position: usize, raw: &str) -> Departure {
    let (original_prefix, detail) = match raw.split_once(':') {
        Some((prefix, detail)) => (prefix, detail.trim()),
        None => ("", raw.trim()),
    };
    let prefix = DEPARTURE_PREFIXES
        .get(position)
        .copied()
        .unwrap_or(original_prefix);
    let emphasis = match position {
        0 => Emphasis::FirstDeparture,
        1 => Emphasis::SecondDeparture,
        _ => Emphasis::Plain,
    };
    Departure {
        prefix: prefix.to_owned(),
        detail: detail.to_owned(),
        emphasis,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScheduleBoard {
    snapshot: Option<ScheduleSnapshot>,
    filter: Option<RouteFilter>,
}

impl ScheduleBoard {
    /// Returns true when this snapshot created the route filter.
    pub fn replace(&mut self, snapshot: ScheduleSnapshot) -> bool {
        let created = self.filter.is_none();
        if created {
            self.filter = Some(RouteFilter::from_snapshot(&snapshot));
        }
        self.snapshot = Some(snapshot);
        created
    }

    pub fn snapshot(&self) -> Option<&ScheduleSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn filter(&self) -> Option<&RouteFilter> {
        self.filter.as_ref()
    }

    pub fn set_visibility(&mut self, label: &str, visible: bool) -> bool {
        self.filter
            .as_mut()
            .is_some_and(|filter| filter.set_visibility(label, visible))
    }

    pub fn set_limit(&mut self, label: &str, limit: RouteLimit) -> bool {
        self.filter
            .as_mut()
            .is_some_and(|filter| filter.set_limit(label, limit))
    }

    pub fn render(&self, icons: &IconTable) -> Vec<RouteCard> {
        let (Some(snapshot), Some(filter)) = (&self.snapshot, &self.filter) else {
            return Vec::new();
        };

        snapshot
            .routes
            .iter()
            .filter(|route| filter.is_visible(&route.label))
            .map(|route| {
                let limit = filter.limit(&route.label).get();
                RouteCard {
                    label: route.label.clone(),
                    icons: icons.resolve(&route.label).to_vec(),
                    directions: route
                        .schedules
                        .directions()
                        .into_iter()
                        .map(|(name, entries)| DirectionBlock {
                            name: name.filter(|name| !name.is_empty()).map(str::to_owned),
                            departures: entries
                                .iter()
                                .take(limit)
                                .enumerate()
                                .map(|(position, raw)| format_departure(position, raw))
                                .collect(),
                        })
                        .collect(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Emphasis, RouteFilter, RouteLimit, ScheduleBoard, format_departure};
    use crate::icons::IconTable;
    use crate::model::{AssetId, RouteEntry, RouteSchedules, ScheduleSnapshot};

    fn flat(label: &str, entries: &[&str]) -> RouteEntry {
        RouteEntry {
            label: label.to_owned(),
            schedules: RouteSchedules::Flat(entries.iter().map(|e| (*e).to_owned()).collect()),
        }
    }

    fn sample() -> ScheduleSnapshot {
        ScheduleSnapshot {
            routes: vec![
                flat("玉11", &["発:10:05 急行", "発:10:20", "発:10:35", "発:10:50"]),
                RouteEntry {
                    label: "大井町線".to_owned(),
                    schedules: RouteSchedules::Directional(vec![
                        ("大井町方面".to_owned(), vec!["発:10:01".to_owned()]),
                        (
                            "溝の口方面".to_owned(),
                            vec!["発:10:03".to_owned(), "発:10:09".to_owned()],
                        ),
                    ]),
                },
            ],
        }
    }

    #[test]
    fn route_limit_clamps_and_parses() {
        assert_eq!(RouteLimit::new(0).get(), 1);
        assert_eq!(RouteLimit::new(42).get(), 10);
        assert_eq!(RouteLimit::parse("7").get(), 7);
        assert_eq!(RouteLimit::parse("x").get(), 1);
        assert_eq!(RouteLimit::default().step(-5).get(), 1);
    }

    #[test]
    fn first_departure_prefix_is_substituted_and_detail_kept_verbatim() {
        let departure = format_departure(0, "発:10:05 急行");
        assert_eq!(departure.prefix, "先発");
        assert_eq!(departure.detail, "10:05 急行");
        assert_eq!(departure.emphasis, Emphasis::FirstDeparture);
        assert_eq!(departure.text(), "先発:10:05 急行");
    }

    #[test]
    fn positions_past_third_keep_original_prefix() {
        assert_eq!(format_departure(1, "発:10:20").prefix, "次発");
        assert_eq!(format_departure(1, "発:10:20").emphasis, Emphasis::SecondDeparture);
        assert_eq!(format_departure(2, "発:10:35").prefix, "次々発");
        assert_eq!(format_departure(2, "発:10:35").emphasis, Emphasis::Plain);
        assert_eq!(format_departure(3, "終電:23:59").prefix, "終電");
    }

    #[test]
    fn entry_without_colon_keeps_whole_text_as_detail() {
        let departure = format_departure(4, "運休");
        assert_eq!(departure.prefix, "");
        assert_eq!(departure.detail, "運休");
    }

    #[test]
    fn filter_defaults_to_all_visible_with_limit_two() {
        let filter = RouteFilter::from_snapshot(&sample());
        assert_eq!(filter.labels(), &["玉11".to_owned(), "大井町線".to_owned()]);
        for selector in filter.selectors() {
            assert!(selector.visible);
            assert_eq!(selector.limit.get(), 2);
        }
    }

    #[test]
    fn render_honours_limits_per_direction() {
        let mut board = ScheduleBoard::default();
        assert!(board.replace(sample()));
        let cards = board.render(&IconTable::builtin());

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].departures_len(), 2);
        assert_eq!(cards[1].directions.len(), 2);
        assert_eq!(cards[1].directions[0].name.as_deref(), Some("大井町方面"));
        assert_eq!(cards[1].directions[0].departures.len(), 1);
        assert_eq!(cards[1].directions[1].departures.len(), 2);
        assert_eq!(
            cards[1].icons,
            vec![AssetId::from_file("OM.png"), AssetId::from_file("OM_1.png")]
        );
        assert!(cards[0].directions[0].name.is_none());
    }

    #[test]
    fn hiding_a_route_drops_its_card_only() {
        let mut board = ScheduleBoard::default();
        board.replace(sample());
        assert!(board.set_limit("大井町線", RouteLimit::new(4)));
        assert!(board.set_visibility("玉11", false));

        let cards = board.render(&IconTable::default());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].label, "大井町線");
        assert_eq!(
            board.filter().map(|filter| filter.limit("大井町線").get()),
            Some(4)
        );
    }

    #[test]
    fn filter_survives_reload() {
        let mut board = ScheduleBoard::default();
        board.replace(sample());
        board.set_limit("玉11", RouteLimit::new(5));
        board.set_visibility("大井町線", false);

        assert!(!board.replace(sample()));
        let cards = board.render(&IconTable::default());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].departures_len(), 4);
    }

    #[test]
    fn routes_first_seen_after_filter_creation_stay_hidden() {
        let mut board = ScheduleBoard::default();
        board.replace(sample());
        let mut later = sample();
        later.routes.push(flat("園02", &["発:11:00"]));
        board.replace(later);

        let cards = board.render(&IconTable::default());
        assert!(cards.iter().all(|card| card.label != "園02"));
        assert!(!board.set_visibility("園02", true));
    }

    #[test]
    fn edits_before_first_snapshot_are_ignored() {
        let mut board = ScheduleBoard::default();
        assert!(!board.set_visibility("玉11", false));
        assert!(board.render(&IconTable::default()).is_empty());
    }

    impl super::RouteCard {
        fn departures_len(&self) -> usize {
            self.directions
                .iter()
                .map(|direction| direction.departures.len())
                .sum()
        }
    }
}
