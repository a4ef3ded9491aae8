// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use kiosk_app::{
    FailedLoad, FeedKind, FeedRequest, Forecast, LinesPerPage, LoadFailure, Loaded, NewsSnapshot,
    ScheduleSnapshot, StatusItem, StatusSnapshot, WeatherSnapshot,
};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Blocking client for the board's four JSON endpoints.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("feed.base_url must not be empty");
        }
        let parsed =
            Url::parse(&base_url).with_context(|| format!("parse feed.base_url {base_url:?}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "feed.base_url must use http or https, got {:?}",
                parsed.scheme()
            );
        }
        if timeout.is_zero() {
            bail!("feed.timeout must be positive");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn fetch_status(&self, max_lines: LinesPerPage) -> Result<StatusSnapshot> {
        let mut url = self.endpoint(FeedKind::Status)?;
        url.query_pairs_mut()
            .append_pair("max_lines", &max_lines.get().to_string());
        let envelope: StatusEnvelope = self.get_json(url, FeedKind::Status)?;
        Ok(StatusSnapshot::new(
            envelope
                .status
                .into_iter()
                .map(|row| StatusItem::new(row.text, row.logo.as_deref()))
                .collect(),
        ))
    }

    pub fn fetch_weather(&self) -> Result<WeatherSnapshot> {
        let url = self.endpoint(FeedKind::Weather)?;
        let envelope: WeatherEnvelope = self.get_json(url, FeedKind::Weather)?;
        Ok(WeatherSnapshot {
            forecasts: envelope.forecasts.into_iter().map(Forecast::from).collect(),
        })
    }

    pub fn fetch_news(&self) -> Result<NewsSnapshot> {
        let url = self.endpoint(FeedKind::News)?;
        let envelope: NewsEnvelope = self.get_json(url, FeedKind::News)?;
        Ok(NewsSnapshot::new(envelope.news))
    }

    pub fn fetch_schedule(&self) -> Result<ScheduleSnapshot> {
        let url = self.endpoint(FeedKind::Schedule)?;
        self.get_json(url, FeedKind::Schedule)
    }

    /// Runs one loader and classifies its failure. The caller keeps the
    /// previous snapshot when this returns `Err`.
    pub fn load(&self, request: FeedRequest) -> Result<Loaded, FailedLoad> {
        let kind = request.kind();
        let result = match request {
            FeedRequest::Status { max_lines } => self.fetch_status(max_lines).map(Loaded::Status),
            FeedRequest::Weather => self.fetch_weather().map(Loaded::Weather),
            FeedRequest::News => self.fetch_news().map(Loaded::News),
            FeedRequest::Schedule => self.fetch_schedule().map(Loaded::Schedule),
        };

        match result {
            Ok(loaded) => {
                debug!(feed = %kind, items = loaded.item_count(), "feed loaded");
                Ok(loaded)
            }
            Err(error) => {
                let failure = classify(&error);
                warn!(feed = %kind, failure = %failure, error = %format!("{error:#}"), "feed load failed");
                Err(FailedLoad {
                    kind,
                    failure,
                    error,
                })
            }
        }
    }

    fn endpoint(&self, kind: FeedKind) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, kind.path());
        Url::parse(&raw).with_context(|| format!("build {kind} endpoint {raw:?}"))
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url, kind: FeedKind) -> Result<T> {
        let response = self
            .http
            .get(url)
            .header("Cache-Control", "no-store")
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let body = response
            .text()
            .with_context(|| format!("read {kind} response body"))?;
        serde_json::from_str(&body).with_context(|| format!("decode {kind} payload"))
    }
}

/// Maps a loader error onto the two failure classes the board distinguishes.
pub fn classify(error: &anyhow::Error) -> LoadFailure {
    if error
        .chain()
        .any(|cause| cause.is::<serde_json::Error>())
    {
        LoadFailure::Malformed
    } else {
        LoadFailure::Transport
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStatusError {
    pub status: u16,
    pub detail: Option<String>,
}

impl fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "server error ({}): {detail}", self.status),
            None => write!(f, "server returned {}", self.status),
        }
    }
}

impl std::error::Error for HttpStatusError {}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("request to {base_url} timed out ({error})");
    }
    anyhow!("cannot reach {base_url} -- is the board server running? ({error})")
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.is_empty())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('<'))
                .then(|| trimmed.to_owned())
        });
    anyhow::Error::new(HttpStatusError {
        status: status.as_u16(),
        detail,
    })
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    status: Vec<StatusRow>,
}

#[derive(Debug, Deserialize)]
struct StatusRow {
    text: String,
    #[serde(default)]
    logo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WeatherEnvelope {
    forecasts: Vec<ForecastRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastRow {
    #[serde(default)]
    date_label: Option<String>,
    #[serde(default)]
    telop: Option<String>,
    #[serde(default)]
    image: Option<ForecastImage>,
    #[serde(default)]
    chance_of_rain: Option<ChanceOfRain>,
    #[serde(default)]
    detail: Option<ForecastDetail>,
}

#[derive(Debug, Deserialize)]
struct ForecastImage {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChanceOfRain {
    #[serde(rename = "T12_18", default)]
    afternoon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastDetail {
    #[serde(default)]
    wind: Option<String>,
}

impl From<ForecastRow> for Forecast {
    fn from(row: ForecastRow) -> Self {
        Self {
            date_label: row.date_label.unwrap_or_default(),
            telop: row.telop.unwrap_or_default(),
            icon_url: row.image.and_then(|image| image.url),
            chance_of_rain: row.chance_of_rain.and_then(|chance| chance.afternoon),
            wind: row.detail.and_then(|detail| detail.wind),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewsEnvelope {
    news: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}
