// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use kiosk_app::{ColorSlot, FONT_FAMILIES, LinesPerPage, PanelKind, Percent, Theme, validate_color};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use url::Url;

pub const APP_NAME: &str = "kiosk";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "5s";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub feed: Feed,
    #[serde(default)]
    pub display: Display,
    #[serde(default)]
    pub panels: Panels,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            feed: Feed::default(),
            display: Display::default(),
            panels: Panels::default(),
            logging: Logging::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feed {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Display {
    pub lines_per_page: Option<i64>,
    pub font_family: Option<String>,
    pub zoom_percent: Option<i64>,
    pub font_size_percent: Option<i64>,
    pub resizable: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Panels {
    pub status: Option<Panel>,
    pub weather: Option<Panel>,
    pub news: Option<Panel>,
    pub schedule: Option<Panel>,
}

impl Panels {
    fn get(&self, kind: PanelKind) -> Option<&Panel> {
        match kind {
            PanelKind::Status => self.status.as_ref(),
            PanelKind::Weather => self.weather.as_ref(),
            PanelKind::News => self.news.as_ref(),
            PanelKind::Schedule => self.schedule.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Panel {
    pub visible: Option<bool>,
    pub background: Option<String>,
    pub foreground: Option<String>,
}

impl Panel {
    fn color(&self, slot: ColorSlot) -> Option<&str> {
        match slot {
            ColorSlot::Background => self.background.as_deref(),
            ColorSlot::Foreground => self.foreground.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Logging {
    pub path: Option<String>,
    pub level: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("KIOSK_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set KIOSK_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` at the top",
                    path.display()
                )
            })?;
        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let base_url = self.feed_base_url();
        let parsed = Url::parse(base_url).with_context(|| {
            format!(
                "feed.base_url in {} is not a valid URL: {base_url:?}",
                path.display()
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "feed.base_url in {} must use http or https, got {:?}",
                path.display(),
                parsed.scheme()
            );
        }

        let timeout = self.feed_timeout()?;
        if timeout.is_zero() {
            bail!(
                "feed.timeout in {} must be positive, got {}",
                path.display(),
                self.feed.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT)
            );
        }

        if let Some(font) = &self.display.font_family
            && !FONT_FAMILIES.iter().any(|known| known.eq_ignore_ascii_case(font))
        {
            bail!(
                "display.font_family in {} must be one of {}, got {font:?}",
                path.display(),
                FONT_FAMILIES.join(", ")
            );
        }

        for kind in PanelKind::ALL {
            let Some(panel) = self.panels.get(kind) else {
                continue;
            };
            for slot in [ColorSlot::Background, ColorSlot::Foreground] {
                if let Some(color) = panel.color(slot) {
                    validate_color(color).with_context(|| {
                        format!(
                            "panels.{}.{} in {}",
                            kind.key(),
                            slot_key(slot),
                            path.display()
                        )
                    })?;
                }
            }
        }

        self.log_level_filter()
            .with_context(|| format!("logging.level in {}", path.display()))?;
        Ok(())
    }

    pub fn feed_base_url(&self) -> &str {
        self.feed
            .base_url
            .as_deref()
            .unwrap_or(kiosk_feed::DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn feed_timeout(&self) -> Result<Duration> {
        parse_duration(self.feed.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    /// Display settings layered over the built-in theme.
    pub fn theme(&self) -> Theme {
        let mut theme = Theme::default();
        if let Some(lines) = self.display.lines_per_page {
            theme.lines_per_page = LinesPerPage::new(lines);
        }
        if let Some(font) = &self.display.font_family
            && let Some(known) = FONT_FAMILIES
                .iter()
                .find(|known| known.eq_ignore_ascii_case(font))
        {
            (*known).clone_into(&mut theme.font_family);
        }
        if let Some(zoom) = self.display.zoom_percent {
            theme.zoom = Percent::clamped(zoom);
        }
        if let Some(size) = self.display.font_size_percent {
            theme.font_size = Percent::clamped(size);
        }
        if let Some(resizable) = self.display.resizable {
            theme.resizable = resizable;
        }

        for kind in PanelKind::ALL {
            let Some(panel) = self.panels.get(kind) else {
                continue;
            };
            let style = theme.panel_mut(kind);
            if let Some(visible) = panel.visible {
                style.visible = visible;
            }
            if let Some(background) = &panel.background {
                background.trim().clone_into(&mut style.background);
            }
            if let Some(foreground) = &panel.foreground {
                foreground.trim().clone_into(&mut style.foreground);
            }
        }
        theme
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.logging.path {
            return Ok(PathBuf::from(path));
        }
        let cache_root = dirs::cache_dir().ok_or_else(|| {
            anyhow!("cannot resolve cache directory; set [logging].path in the config")
        })?;
        Ok(cache_root.join(APP_NAME).join("kiosk.log"))
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    fn log_level_filter(&self) -> Result<LevelFilter> {
        let level = self.log_level();
        level.parse::<LevelFilter>().map_err(|_| {
            anyhow!("invalid log level {level:?}; use one of off, error, warn, info, debug, trace")
        })
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# kiosk config\n# Place this file at: {}\n\nversion = 1\n\n[feed]\n# Board server serving /api/status, /api/weather, /api/news, /api/schedule\nbase_url = \"{}\"\ntimeout = \"{DEFAULT_TIMEOUT}\"\n\n[display]\n# Status lines shown per page (at least 1; anything else falls back to 2)\nlines_per_page = 2\n# One of: {}\nfont_family = \"{}\"\n# 50-200\nzoom_percent = 100\nfont_size_percent = 100\nresizable = false\n\n[panels.status]\nvisible = true\nbackground = \"black\"\nforeground = \"white\"\n\n[panels.weather]\nvisible = true\nbackground = \"black\"\nforeground = \"white\"\n\n[panels.news]\nvisible = true\nbackground = \"black\"\nforeground = \"yellow\"\n\n[panels.schedule]\nvisible = true\nbackground = \"black\"\nforeground = \"white\"\n\n[logging]\n# Optional. Default is the platform cache dir (for example ~/.cache/kiosk/kiosk.log)\n# path = \"/absolute/path/to/kiosk.log\"\n# RUST_LOG overrides this when set\nlevel = \"{DEFAULT_LOG_LEVEL}\"\n",
            path.display(),
            kiosk_feed::DEFAULT_BASE_URL,
            FONT_FAMILIES.join(", "),
            FONT_FAMILIES[0],
        )
    }
}

const fn slot_key(slot: ColorSlot) -> &'static str {
    match slot {
        ColorSlot::Background => "background",
        ColorSlot::Foreground => "foreground",
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use anyhow::Result;
    use kiosk_app::PanelKind;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.feed_base_url(), "http://127.0.0.1:5000");
        assert_eq!(config.feed_timeout()?, Duration::from_secs(5));
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.theme().lines_per_page.get(), 2);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[feed]\nbase_url = \"http://board:5000\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        assert!(error.to_string().contains("version = 1"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn full_config_builds_theme() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[feed]\nbase_url = \"http://board.local:5000///\"\ntimeout = \"750ms\"\n[display]\nlines_per_page = 4\nfont_family = \"monospace\"\nzoom_percent = 400\nfont_size_percent = 20\nresizable = true\n[panels.news]\nvisible = false\nforeground = \"#fff1e8\"\n[logging]\nlevel = \"debug\"\n",
        )?;
        let config = Config::load(&path)?;
        assert_eq!(config.feed_base_url(), "http://board.local:5000");
        assert_eq!(config.feed_timeout()?, Duration::from_millis(750));
        assert_eq!(config.log_level(), "debug");

        let theme = config.theme();
        assert_eq!(theme.lines_per_page.get(), 4);
        assert_eq!(theme.font_family, "monospace");
        assert_eq!(theme.zoom.get(), 200);
        assert_eq!(theme.font_size.get(), 50);
        assert!(theme.resizable);
        assert!(!theme.is_visible(PanelKind::News));
        assert_eq!(theme.news.foreground, "#fff1e8");
        assert_eq!(theme.news.background, "black");
        assert!(theme.is_visible(PanelKind::Status));
        Ok(())
    }

    #[test]
    fn invalid_lines_per_page_falls_back_to_default() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[display]\nlines_per_page = 0\n")?;
        assert_eq!(Config::load(&path)?.theme().lines_per_page.get(), 2);
        Ok(())
    }

    #[test]
    fn unparsable_panel_color_is_rejected() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[panels.weather]\nbackground = \"chartreuse-ish\"\n")?;
        let error = Config::load(&path).expect_err("bad color should fail");
        let message = format!("{error:#}");
        assert!(message.contains("panels.weather.background"), "{message}");
        assert!(message.contains("invalid color"), "{message}");
        Ok(())
    }

    #[test]
    fn non_http_base_url_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[feed]\nbase_url = \"file:///tmp/board\"\n")?;
        let error = Config::load(&path).expect_err("file URL should fail");
        assert!(error.to_string().contains("http or https"));
        Ok(())
    }

    #[test]
    fn zero_timeout_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[feed]\ntimeout = \"0s\"\n")?;
        let error = Config::load(&path).expect_err("zero timeout should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn unknown_font_and_log_level_are_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[display]\nfont_family = \"comic\"\n")?;
        assert!(Config::load(&path).is_err());

        let (_temp, path) = write_config("version = 1\n[logging]\nlevel = \"loud\"\n")?;
        let error = Config::load(&path).expect_err("bad level should fail");
        assert!(format!("{error:#}").contains("invalid log level"));
        Ok(())
    }

    #[test]
    fn timeout_parses_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("5s")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        assert!(parse_duration("oops").is_err());
        Ok(())
    }

    #[test]
    fn log_path_prefers_config_value() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[logging]\npath = \"/var/log/kiosk.log\"\n")?;
        assert_eq!(
            Config::load(&path)?.log_path()?,
            PathBuf::from("/var/log/kiosk.log")
        );
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("KIOSK_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("KIOSK_CONFIG_PATH");
        }
        assert_eq!(resolved?, override_path);
        Ok(())
    }

    #[test]
    fn default_path_uses_config_toml_suffix_when_no_env_override() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("KIOSK_CONFIG_PATH");
        }
        let path = Config::default_path()?;
        assert!(path.ends_with("kiosk/config.toml"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[panels.schedule]"));
        std::fs::write(&path, example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.theme().news.foreground, "yellow");
        Ok(())
    }
}
