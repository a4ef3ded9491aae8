// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use kiosk_app::{
    FeedRequest, Forecast, Loaded, NewsSnapshot, RouteEntry, RouteSchedules, ScheduleSnapshot,
    StatusItem, StatusSnapshot, WeatherSnapshot,
};
use serde_json::{Value, json};

const STATUS_LINES: [&str; 9] = [
    "東急東横線",
    "東急田園都市線",
    "東急大井町線",
    "東急目黒線",
    "東京メトロ半蔵門線",
    "東京メトロ南北線",
    "都営三田線",
    "東武東上線",
    "横浜市営地下鉄ブルーライン",
];
const STATUS_STATES: [&str; 4] = ["平常運転", "平常運転", "遅延", "運転見合わせ"];
const HEADLINES: [&str; 8] = [
    "都内で桜が満開に 週末は花見客で混雑の見込み",
    "首都圏の鉄道 新ダイヤを発表",
    "あすは広い範囲で晴れ 最高気温は20度前後",
    "新しい駅ビルが来月開業へ",
    "物価の上昇続く 家計への影響広がる",
    "高校野球 地区大会の組み合わせ決まる",
    "国際会議 きょうから都内で開幕",
    "夜間の道路工事 来週から一部区間で",
];
const TELOPS: [(&str, &str); 5] = [
    ("晴れ", "100"),
    ("晴時々曇", "101"),
    ("曇り", "200"),
    ("曇時々雨", "202"),
    ("雨", "300"),
];
const WINDS: [&str; 4] = [
    "北の風",
    "南の風　やや強く",
    "北東の風　後　南の風",
    "西の風",
];
const DATE_LABELS: [&str; 3] = ["今日", "明日", "明後日"];
const KINDS: [&str; 3] = ["各停", "急行", "準急"];

struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for plausible panel data. The same seed always yields
/// the same sequence, and each call advances it, so repeated loads differ.
pub struct BoardFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl BoardFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn loaded(&mut self, request: FeedRequest, minute_of_day: u32) -> Loaded {
        match request {
            FeedRequest::Status { .. } => Loaded::Status(self.status_snapshot(5)),
            FeedRequest::Weather => Loaded::Weather(self.weather_snapshot()),
            FeedRequest::News => Loaded::News(self.news_snapshot(5)),
            FeedRequest::Schedule => Loaded::Schedule(self.schedule_snapshot(minute_of_day)),
        }
    }

    pub fn status_snapshot(&mut self, count: usize) -> StatusSnapshot {
        let start = self.rng.int_n(STATUS_LINES.len());
        StatusSnapshot::new(
            (0..count.min(STATUS_LINES.len()))
                .map(|offset| {
                    let line = STATUS_LINES[(start + offset) % STATUS_LINES.len()];
                    let state = self.pick(&STATUS_STATES);
                    StatusItem::new(format!("{line}：{state}"), None)
                })
                .collect(),
        )
    }

    pub fn weather_snapshot(&mut self) -> WeatherSnapshot {
        WeatherSnapshot {
            forecasts: DATE_LABELS
                .iter()
                .map(|label| {
                    let (telop, code) = TELOPS[self.rng.int_n(TELOPS.len())];
                    Forecast {
                        date_label: (*label).to_owned(),
                        telop: telop.to_owned(),
                        icon_url: Some(weather_icon_url(code)),
                        chance_of_rain: Some(format!("{}%", self.rng.int_n(11) * 10)),
                        wind: Some(self.pick(&WINDS).to_owned()),
                    }
                })
                .collect(),
        }
    }

    pub fn news_snapshot(&mut self, count: usize) -> NewsSnapshot {
        let start = self.rng.int_n(HEADLINES.len());
        NewsSnapshot::new(
            (0..count.min(HEADLINES.len()))
                .map(|offset| HEADLINES[(start + offset) % HEADLINES.len()].to_owned())
                .collect(),
        )
    }

    /// Departures from `minute_of_day` onward, so a reload later in the day
    /// shows later trains.
    pub fn schedule_snapshot(&mut self, minute_of_day: u32) -> ScheduleSnapshot {
        ScheduleSnapshot {
            routes: vec![
                RouteEntry {
                    label: "東急大井町線".to_owned(),
                    schedules: RouteSchedules::Directional(vec![
                        (
                            "大井町方面".to_owned(),
                            self.departures(minute_of_day, 6, "大井町"),
                        ),
                        (
                            "溝の口方面".to_owned(),
                            self.departures(minute_of_day, 6, "溝の口"),
                        ),
                    ]),
                },
                RouteEntry {
                    label: "東急田園都市線".to_owned(),
                    schedules: RouteSchedules::Directional(vec![
                        (
                            "渋谷方面".to_owned(),
                            self.departures(minute_of_day, 4, "渋谷"),
                        ),
                        (
                            "中央林間方面".to_owned(),
                            self.departures(minute_of_day, 4, "中央林間"),
                        ),
                    ]),
                },
                RouteEntry {
                    label: "玉11".to_owned(),
                    schedules: RouteSchedules::Flat(self.departures(
                        minute_of_day,
                        15,
                        "二子玉川駅",
                    )),
                },
                RouteEntry {
                    label: "園02".to_owned(),
                    schedules: RouteSchedules::Flat(self.departures(
                        minute_of_day,
                        20,
                        "田園調布駅",
                    )),
                },
            ],
        }
    }

    fn departures(&mut self, minute_of_day: u32, headway: u32, destination: &str) -> Vec<String> {
        let first = minute_of_day + 1 + self.rng.int_n(headway as usize) as u32;
        (0..6)
            .map(|index| {
                let at = (first + index * headway) % (24 * 60);
                let kind = self.pick(&KINDS);
                format!("発:{:02}:{:02} {kind} {destination}", at / 60, at % 60)
            })
            .collect()
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[self.rng.int_n(options.len())]
    }
}

pub fn weather_icon_url(code: &str) -> String {
    format!("https://www.jma.go.jp/bosai/forecast/img/{code}.svg")
}

pub fn status_json(items: &[(&str, Option<&str>)]) -> String {
    let rows = items
        .iter()
        .map(|(text, logo)| match logo {
            Some(logo) => json!({ "text": text, "logo": logo }),
            None => json!({ "text": text }),
        })
        .collect::<Vec<Value>>();
    json!({ "status": rows }).to_string()
}

pub fn news_json(headlines: &[&str]) -> String {
    json!({ "news": headlines }).to_string()
}

pub fn weather_json() -> String {
    json!({
        "title": "東京都 東京 の天気",
        "forecasts": [
            {
                "dateLabel": "今日",
                "telop": "晴れ",
                "image": { "url": weather_icon_url("100"), "title": "晴れ" },
                "chanceOfRain": { "T00_06": "--%", "T06_12": "0%", "T12_18": "10%", "T18_24": "10%" },
                "detail": { "weather": "晴れ", "wind": "北の風" }
            },
            {
                "dateLabel": "明日",
                "telop": "曇時々雨",
                "image": { "url": weather_icon_url("202") },
                "chanceOfRain": { "T12_18": "" },
                "detail": { "wind": "南の風　やや強く" }
            },
            {
                "dateLabel": "明後日",
                "telop": "雨",
                "image": { "url": weather_icon_url("300") },
                "chanceOfRain": {},
                "detail": {}
            },
            {
                "dateLabel": "4日後",
                "telop": "晴れ",
                "image": { "url": weather_icon_url("100") },
                "chanceOfRain": { "T12_18": "0%" },
                "detail": { "wind": "西の風" }
            }
        ]
    })
    .to_string()
}

pub fn schedule_json() -> String {
    json!({
        "routes": [
            {
                "label": "東急大井町線",
                "schedules": {
                    "大井町方面": ["発:10:05 急行 大井町", "発:10:12 各停 大井町", "発:10:20 各停 大井町"],
                    "溝の口方面": ["発:10:07 各停 溝の口", "発:10:15 急行 溝の口"]
                }
            },
            {
                "label": "玉11",
                "schedules": ["発:10:15 二子玉川駅", "発:10:45 二子玉川駅", "発:11:15 二子玉川駅"]
            }
        ]
    })
    .to_string()
}
