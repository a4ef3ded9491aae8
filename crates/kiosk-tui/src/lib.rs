// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use kiosk_app::{
    AssetId, ColorSlot, Effect, Emphasis, FailedLoad, FeedKind, FeedRequest, Kiosk, LoadFailure,
    Loaded, PanelKind, PanelStyle, RouteCard, STATUS_PLACEHOLDER, SettingsEdit, SettingsRow,
    StatusView, Theme, WallClock, WeatherSnapshot,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::collections::BTreeMap;
use std::io;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const MAX_IDLE_WAIT: Duration = Duration::from_millis(100);
const FOOTER_HINT: &str = "s 設定  r 再読込  q 終了";
const SETTINGS_HINT: &str = "↑↓ 選択  space 切替  ←→ 変更  esc 閉じる";
const WEATHER_LOADING: &str = "天気を取得中";

/// Seam between the run loop and the data loaders. `spawn_load` may hand the
/// work to another thread; the default runs it inline.
pub trait DataRuntime {
    fn load(&mut self, request: FeedRequest) -> Result<Loaded, FailedLoad>;

    fn spawn_load(&mut self, request: FeedRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self.load(request);
        tx.send(InternalEvent::Loaded(result))
            .map_err(|_| anyhow!("load event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum InternalEvent {
    Loaded(Result<Loaded, FailedLoad>),
}

#[derive(Debug, Default)]
struct ViewState {
    redraw: bool,
    // Feeds whose latest load failed, cleared per feed on its next success.
    failures: BTreeMap<FeedKind, LoadFailure>,
}

impl ViewState {
    fn take_redraw(&mut self) -> bool {
        let redraw = self.redraw;
        self.redraw = false;
        redraw
    }
}

pub fn run_app<R: DataRuntime>(
    kiosk: &mut Kiosk,
    runtime: &mut R,
    clock: WallClock,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view = ViewState::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let effects = kiosk.boot(Instant::now(), clock.face());
    apply_effects(runtime, &mut view, &internal_tx, effects);
    info!("kiosk started");

    let mut result = Ok(());
    loop {
        process_internal_events(kiosk, runtime, &mut view, &internal_tx, &internal_rx);

        let effects = kiosk.poll(Instant::now(), || clock.face());
        apply_effects(runtime, &mut view, &internal_tx, effects);

        if view.take_redraw()
            && let Err(error) = terminal.draw(|frame| render(frame, kiosk, &view))
        {
            result = Err(error).context("draw frame");
            break;
        }

        let wait = kiosk
            .orchestrator()
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(MAX_IDLE_WAIT)
            .min(MAX_IDLE_WAIT);
        let has_event = event::poll(wait).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(kiosk, runtime, &mut view, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => view.redraw = true,
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    info!("kiosk stopped");
    result
}

fn apply_effects<R: DataRuntime>(
    runtime: &mut R,
    view: &mut ViewState,
    tx: &Sender<InternalEvent>,
    effects: Vec<Effect>,
) {
    for effect in effects {
        match effect {
            Effect::Fetch(request) => {
                debug!(feed = %request.kind(), "fetch requested");
                if let Err(error) = runtime.spawn_load(request, tx.clone()) {
                    warn!(feed = %request.kind(), error = %error, "could not start load");
                }
            }
            Effect::Render(_) => view.redraw = true,
        }
    }
}

fn process_internal_events<R: DataRuntime>(
    kiosk: &mut Kiosk,
    runtime: &mut R,
    view: &mut ViewState,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::Loaded(Ok(loaded)) => {
                if view.failures.remove(&loaded.kind()).is_some() {
                    view.redraw = true;
                }
                let effects = kiosk.on_loaded(Instant::now(), loaded);
                apply_effects(runtime, view, tx, effects);
            }
            InternalEvent::Loaded(Err(failed)) => {
                debug!(feed = %failed.kind, failure = %failed.failure, "keeping previous snapshot");
                view.failures.insert(failed.kind, failed.failure);
                view.redraw = true;
            }
        }
    }
}

fn handle_key_event<R: DataRuntime>(
    kiosk: &mut Kiosk,
    runtime: &mut R,
    view: &mut ViewState,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    let effects = if kiosk.settings().open {
        match key.code {
            KeyCode::Esc | KeyCode::Char('s') => {
                let effects = kiosk.close_settings(Instant::now());
                info!(
                    tasks = kiosk.orchestrator().active().len(),
                    "settings closed, periodic tasks resumed"
                );
                effects
            }
            KeyCode::Up | KeyCode::Char('k') => kiosk.select_setting(-1),
            KeyCode::Down | KeyCode::Char('j') => kiosk.select_setting(1),
            KeyCode::Char(' ') | KeyCode::Enter => kiosk.edit_selected(SettingsEdit::Toggle),
            KeyCode::Left | KeyCode::Char('-') | KeyCode::Char('h') => {
                kiosk.edit_selected(SettingsEdit::Step(-1))
            }
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char('l') => {
                kiosk.edit_selected(SettingsEdit::Step(1))
            }
            _ => Vec::new(),
        }
    } else {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('s') => {
                let effects = kiosk.open_settings();
                info!("settings opened, periodic tasks suspended");
                effects
            }
            KeyCode::Char('r') => {
                info!("manual reload of every feed");
                kiosk.fetch_all()
            }
            _ => Vec::new(),
        }
    };

    apply_effects(runtime, view, tx, effects);
    false
}

fn render(frame: &mut ratatui::Frame<'_>, kiosk: &Kiosk, view: &ViewState) {
    let theme = kiosk.theme();
    let news_visible = theme.is_visible(PanelKind::News);

    let mut rows = vec![Constraint::Length(3), Constraint::Min(1)];
    if news_visible {
        rows.push(Constraint::Length(3));
    }
    rows.push(Constraint::Length(1));
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(rows)
        .split(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            kiosk.clock().time.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::raw(kiosk.clock().date.clone()),
        Span::raw("  "),
        Span::styled(display_readout(theme), Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().title("kiosk").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    render_body(frame, layout[1], kiosk);

    if news_visible {
        let headline = kiosk.headline().unwrap_or_default().to_owned();
        let news = Paragraph::new(headline)
            .style(panel_style(theme.panel(PanelKind::News)))
            .block(
                Block::default()
                    .title(PanelKind::News.label())
                    .borders(Borders::ALL),
            );
        frame.render_widget(news, layout[2]);
    }

    let footer_area = layout[layout.len() - 1];
    let footer = Paragraph::new(footer_text(view)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, footer_area);

    if kiosk.settings().open {
        let area = centered_rect(70, 80, frame.area());
        frame.render_widget(Clear, area);
        let rows = settings_overlay_lines(kiosk);
        let inner_height = usize::from(area.height.saturating_sub(2));
        let offset = kiosk
            .settings()
            .selected
            .saturating_sub(inner_height.saturating_sub(1));
        let overlay = Paragraph::new(rows)
            .scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0))
            .block(
                Block::default()
                    .title(format!("設定  {SETTINGS_HINT}"))
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(overlay, area);
    }
}

fn render_body(frame: &mut ratatui::Frame<'_>, area: Rect, kiosk: &Kiosk) {
    let theme = kiosk.theme();
    let left_panels = [PanelKind::Status, PanelKind::Weather]
        .into_iter()
        .filter(|kind| theme.is_visible(*kind))
        .collect::<Vec<_>>();
    let schedule_visible = theme.is_visible(PanelKind::Schedule);

    let mut columns = Vec::new();
    if !left_panels.is_empty() {
        columns.push(Constraint::Percentage(if schedule_visible { 45 } else { 100 }));
    }
    if schedule_visible {
        columns.push(Constraint::Min(1));
    }
    if columns.is_empty() {
        return;
    }
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(columns)
        .split(area);

    if !left_panels.is_empty() {
        let stacked = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Ratio(1, left_panels.len() as u32);
                left_panels.len()
            ])
            .split(columns[0]);
        for (kind, slot) in left_panels.iter().zip(stacked.iter()) {
            match kind {
                PanelKind::Status => render_status(frame, *slot, kiosk),
                _ => render_weather(frame, *slot, kiosk),
            }
        }
    }

    if schedule_visible {
        render_schedule(frame, columns[columns.len() - 1], kiosk);
    }
}

fn render_status(frame: &mut ratatui::Frame<'_>, area: Rect, kiosk: &Kiosk) {
    let view = kiosk.status_view();
    let lines = status_text(&view)
        .into_iter()
        .map(Line::from)
        .collect::<Vec<_>>();
    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .style(panel_style(kiosk.theme().panel(PanelKind::Status)))
        .block(
            Block::default()
                .title(status_title(&view))
                .borders(Borders::ALL),
        );
    frame.render_widget(panel, area);
}

fn render_weather(frame: &mut ratatui::Frame<'_>, area: Rect, kiosk: &Kiosk) {
    let lines = weather_text(kiosk.weather())
        .into_iter()
        .map(Line::from)
        .collect::<Vec<_>>();
    let panel = Paragraph::new(lines)
        .style(panel_style(kiosk.theme().panel(PanelKind::Weather)))
        .block(
            Block::default()
                .title(PanelKind::Weather.label())
                .borders(Borders::ALL),
        );
    frame.render_widget(panel, area);
}

fn render_schedule(frame: &mut ratatui::Frame<'_>, area: Rect, kiosk: &Kiosk) {
    let style = panel_style(kiosk.theme().panel(PanelKind::Schedule));
    let outer = Block::default()
        .title(PanelKind::Schedule.label())
        .borders(Borders::ALL)
        .style(style);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let cards = kiosk.schedule_cards();
    let bodies = cards.iter().map(route_card_lines).collect::<Vec<_>>();
    let mut constraints = bodies
        .iter()
        .map(|lines| Constraint::Length(u16::try_from(lines.len() + 2).unwrap_or(u16::MAX)))
        .collect::<Vec<_>>();
    constraints.push(Constraint::Min(0));
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for ((card, lines), slot) in cards.iter().zip(bodies).zip(slots.iter()) {
        let widget = Paragraph::new(lines).style(style).block(
            Block::default()
                .title(with_badges(&card.icons, &card.label))
                .borders(Borders::ALL),
        );
        frame.render_widget(widget, *slot);
    }
}

fn panel_style(panel: &PanelStyle) -> Style {
    Style::default()
        .bg(parse_color(&panel.background, Color::Reset))
        .fg(parse_color(&panel.foreground, Color::Reset))
}

fn parse_color(value: &str, fallback: Color) -> Color {
    Color::from_str(value.trim()).unwrap_or(fallback)
}

fn badges(icons: &[AssetId]) -> String {
    icons
        .iter()
        .map(|icon| format!("[{}]", icon.badge()))
        .collect()
}

fn with_badges(icons: &[AssetId], text: &str) -> String {
    let badges = badges(icons);
    if badges.is_empty() {
        text.to_owned()
    } else {
        format!("{badges} {text}")
    }
}

fn status_title(view: &StatusView) -> String {
    match view {
        StatusView::Placeholder => PanelKind::Status.label().to_owned(),
        StatusView::Page { index, count, .. } => {
            format!("{}  page {}/{}", PanelKind::Status.label(), index + 1, count)
        }
    }
}

fn status_text(view: &StatusView) -> Vec<String> {
    match view {
        StatusView::Placeholder => vec![STATUS_PLACEHOLDER.to_owned()],
        StatusView::Page { lines, .. } => lines
            .iter()
            .map(|line| with_badges(&line.icons, &line.text))
            .collect(),
    }
}

fn weather_text(snapshot: &WeatherSnapshot) -> Vec<String> {
    if snapshot.forecasts.is_empty() {
        return vec![WEATHER_LOADING.to_owned()];
    }
    snapshot
        .visible()
        .iter()
        .flat_map(|forecast| {
            let icon = forecast
                .icon_url
                .as_deref()
                .map(|url| format!(" [{}]", AssetId::qualify(url).badge()))
                .unwrap_or_default();
            [
                format!("{}  {}{icon}", forecast.date_label, forecast.telop),
                format!(
                    "  降水確率：{}  風：{}",
                    forecast.rain_label(),
                    forecast.wind_label()
                ),
            ]
        })
        .collect()
}

fn departure_style(emphasis: Emphasis) -> Style {
    match emphasis {
        Emphasis::FirstDeparture => Style::default()
            .fg(Color::LightRed)
            .add_modifier(Modifier::BOLD),
        Emphasis::SecondDeparture => Style::default().add_modifier(Modifier::BOLD),
        Emphasis::Plain => Style::default(),
    }
}

fn route_card_lines(card: &RouteCard) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for direction in &card.directions {
        if let Some(name) = &direction.name {
            lines.push(Line::from(Span::styled(
                name.clone(),
                Style::default().add_modifier(Modifier::UNDERLINED),
            )));
        }
        for departure in &direction.departures {
            lines.push(Line::from(Span::styled(
                departure.text(),
                departure_style(departure.emphasis),
            )));
        }
    }
    lines
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

fn settings_row_text(kiosk: &Kiosk, row: &SettingsRow) -> String {
    let theme = kiosk.theme();
    match row {
        SettingsRow::PanelVisible(kind) => {
            format!("{} {}を表示", checkbox(theme.is_visible(*kind)), kind.label())
        }
        SettingsRow::PanelColor(kind, slot) => {
            let name = match slot {
                ColorSlot::Background => "背景色",
                ColorSlot::Foreground => "文字色",
            };
            format!(
                "{}の{name}: {}",
                kind.label(),
                theme.panel(*kind).color(*slot)
            )
        }
        SettingsRow::FontFamily => format!("フォント: {}", theme.font_family),
        SettingsRow::Zoom => format!("ズーム: {}%", theme.zoom.get()),
        SettingsRow::FontSize => format!("文字サイズ: {}%", theme.font_size.get()),
        SettingsRow::Resizable => format!("{} パネルのサイズ変更", checkbox(theme.resizable)),
        SettingsRow::LinesPerPage => {
            format!("運行情報の表示行数: {}", theme.lines_per_page.get())
        }
        SettingsRow::Route(label) => {
            let (visible, limit) = kiosk
                .schedule()
                .filter()
                .map(|filter| (filter.is_visible(label), filter.limit(label).get()))
                .unwrap_or((false, 0));
            format!("{} {label}  表示本数: {limit}", checkbox(visible))
        }
    }
}

fn settings_overlay_lines(kiosk: &Kiosk) -> Vec<Line<'static>> {
    let selected = kiosk.settings().selected;
    kiosk
        .settings_rows()
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let text = settings_row_text(kiosk, row);
            if index == selected {
                Line::from(Span::styled(
                    format!("> {text}"),
                    Style::default().add_modifier(Modifier::REVERSED),
                ))
            } else {
                Line::from(format!("  {text}"))
            }
        })
        .collect()
}

fn display_readout(theme: &Theme) -> String {
    format!(
        "{}  ズーム {}%  文字 {}%",
        theme.font_family,
        theme.zoom.get(),
        theme.font_size.get()
    )
}

fn footer_text(view: &ViewState) -> String {
    if view.failures.is_empty() {
        return FOOTER_HINT.to_owned();
    }
    let failed = view
        .failures
        .iter()
        .map(|(kind, failure)| format!("{kind} {failure}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{FOOTER_HINT}  |  load failed: {failed}")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        DataRuntime, InternalEvent, ViewState, apply_effects, display_readout, footer_text,
        handle_key_event, process_internal_events, route_card_lines, settings_row_text,
        status_text, status_title, weather_text,
    };
    use anyhow::anyhow;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use kiosk_app::{
        AssetId, ClockFace, FailedLoad, FeedKind, FeedRequest, Forecast, Kiosk, LoadFailure,
        Loaded, NewsSnapshot, PanelKind, RouteEntry, RouteSchedules, ScheduleSnapshot,
        SettingsEdit, SettingsRow, StatusItem, StatusLine, StatusSnapshot, StatusView, TaskKind,
        WeatherSnapshot,
    };
    use ratatui::style::Modifier;
    use std::sync::mpsc;
    use std::time::Instant;

    #[derive(Debug, Default)]
    struct TestRuntime {
        requests: Vec<FeedRequest>,
        failing: Vec<FeedKind>,
        status: Vec<&'static str>,
    }

    impl DataRuntime for TestRuntime {
        fn load(&mut self, request: FeedRequest) -> Result<Loaded, FailedLoad> {
            self.requests.push(request);
            let kind = request.kind();
            if self.failing.contains(&kind) {
                return Err(FailedLoad {
                    kind,
                    failure: LoadFailure::Malformed,
                    error: anyhow!("missing top-level key"),
                });
            }
            Ok(match request {
                FeedRequest::Status { .. } => Loaded::Status(StatusSnapshot::new(
                    self.status
                        .iter()
                        .map(|text| StatusItem::new(*text, None))
                        .collect(),
                )),
                FeedRequest::Weather => Loaded::Weather(WeatherSnapshot::default()),
                FeedRequest::News => {
                    Loaded::News(NewsSnapshot::new(vec!["headline".to_owned()]))
                }
                FeedRequest::Schedule => Loaded::Schedule(schedule()),
            })
        }
    }

    fn schedule() -> ScheduleSnapshot {
        ScheduleSnapshot {
            routes: vec![RouteEntry {
                label: "玉11".to_owned(),
                schedules: RouteSchedules::Flat(vec![
                    "発:10:15 二子玉川駅".to_owned(),
                    "発:10:45 二子玉川駅".to_owned(),
                    "発:11:15 二子玉川駅".to_owned(),
                ]),
            }],
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn booted(runtime: &mut TestRuntime) -> (Kiosk, ViewState) {
        let mut kiosk = Kiosk::default();
        let mut view = ViewState::default();
        let (tx, rx) = mpsc::channel();
        let effects = kiosk.boot(Instant::now(), ClockFace::default());
        apply_effects(runtime, &mut view, &tx, effects);
        process_internal_events(&mut kiosk, runtime, &mut view, &tx, &rx);
        (kiosk, view)
    }

    #[test]
    fn boot_loads_every_feed_through_the_runtime() {
        let mut runtime = TestRuntime {
            status: vec!["A", "B", "C"],
            ..TestRuntime::default()
        };
        let (kiosk, view) = booted(&mut runtime);

        assert_eq!(runtime.requests.len(), 4);
        assert_eq!(kiosk.status().snapshot().len(), 3);
        assert_eq!(kiosk.headline(), Some("headline"));
        assert!(kiosk.schedule().filter().is_some());
        assert!(view.redraw);
        assert!(view.failures.is_empty());
    }

    #[test]
    fn failed_load_keeps_previous_snapshot_and_reports_it() {
        let mut runtime = TestRuntime {
            status: vec!["A", "B"],
            ..TestRuntime::default()
        };
        let (mut kiosk, mut view) = booted(&mut runtime);
        let before = kiosk.status().snapshot().clone();

        runtime.failing.push(FeedKind::Status);
        let (tx, rx) = mpsc::channel();
        apply_effects(&mut runtime, &mut view, &tx, kiosk.reload_status());
        process_internal_events(&mut kiosk, &mut runtime, &mut view, &tx, &rx);

        assert_eq!(kiosk.status().snapshot(), &before);
        assert_eq!(view.failures.get(&FeedKind::Status), Some(&LoadFailure::Malformed));
        assert!(footer_text(&view).contains("load failed: status malformed"));

        runtime.failing.clear();
        apply_effects(&mut runtime, &mut view, &tx, kiosk.reload_status());
        process_internal_events(&mut kiosk, &mut runtime, &mut view, &tx, &rx);
        assert!(view.failures.is_empty());
    }

    #[test]
    fn footer_keeps_each_failing_feed_until_it_recovers() {
        let mut runtime = TestRuntime::default();
        let (mut kiosk, mut view) = booted(&mut runtime);
        let (tx, rx) = mpsc::channel();

        runtime.failing = vec![FeedKind::Status, FeedKind::News];
        apply_effects(&mut runtime, &mut view, &tx, kiosk.fetch_all());
        process_internal_events(&mut kiosk, &mut runtime, &mut view, &tx, &rx);
        assert_eq!(
            footer_text(&view),
            "s 設定  r 再読込  q 終了  |  load failed: status malformed, news malformed"
        );

        runtime.failing = vec![FeedKind::Status];
        apply_effects(&mut runtime, &mut view, &tx, kiosk.fetch_all());
        process_internal_events(&mut kiosk, &mut runtime, &mut view, &tx, &rx);
        assert_eq!(
            footer_text(&view),
            "s 設定  r 再読込  q 終了  |  load failed: status malformed"
        );

        runtime.failing.clear();
        apply_effects(&mut runtime, &mut view, &tx, kiosk.reload_status());
        process_internal_events(&mut kiosk, &mut runtime, &mut view, &tx, &rx);
        assert_eq!(footer_text(&view), "s 設定  r 再読込  q 終了");
    }

    #[test]
    fn header_readout_follows_font_and_scale_edits() {
        let mut kiosk = Kiosk::default();
        let before = display_readout(kiosk.theme());
        assert!(before.contains("ズーム 100%"));

        kiosk.edit_setting(&SettingsRow::Zoom, SettingsEdit::Step(1));
        kiosk.edit_setting(&SettingsRow::FontSize, SettingsEdit::Step(-1));
        kiosk.edit_setting(&SettingsRow::FontFamily, SettingsEdit::Step(1));
        let after = display_readout(kiosk.theme());
        assert!(after.contains("ズーム 110%"));
        assert!(after.contains("文字 90%"));
        assert!(after.starts_with(kiosk.theme().font_family.as_str()));
        assert_ne!(before, after);
    }

    #[test]
    fn settings_key_suspends_and_escape_resumes() {
        let mut runtime = TestRuntime::default();
        let (mut kiosk, mut view) = booted(&mut runtime);
        let (tx, _rx) = mpsc::channel::<InternalEvent>();

        assert!(!handle_key_event(&mut kiosk, &mut runtime, &mut view, &tx, press(KeyCode::Char('s'))));
        assert!(kiosk.settings().open);
        assert!(kiosk.orchestrator().active().is_empty());

        assert!(!handle_key_event(&mut kiosk, &mut runtime, &mut view, &tx, press(KeyCode::Esc)));
        assert!(!kiosk.settings().open);
        assert_eq!(kiosk.orchestrator().active(), TaskKind::ALL.to_vec());
    }

    #[test]
    fn overlay_keys_select_and_toggle_rows() {
        let mut runtime = TestRuntime::default();
        let (mut kiosk, mut view) = booted(&mut runtime);
        let (tx, _rx) = mpsc::channel::<InternalEvent>();

        handle_key_event(&mut kiosk, &mut runtime, &mut view, &tx, press(KeyCode::Char('s')));
        handle_key_event(&mut kiosk, &mut runtime, &mut view, &tx, press(KeyCode::Down));
        handle_key_event(&mut kiosk, &mut runtime, &mut view, &tx, press(KeyCode::Char(' ')));
        assert!(!kiosk.theme().is_visible(PanelKind::Weather));

        // q does not quit while the overlay owns the keyboard
        assert!(!handle_key_event(&mut kiosk, &mut runtime, &mut view, &tx, press(KeyCode::Char('q'))));
    }

    #[test]
    fn route_row_edits_rerender_without_fetching() {
        let mut runtime = TestRuntime::default();
        let (mut kiosk, mut view) = booted(&mut runtime);
        let (tx, _rx) = mpsc::channel::<InternalEvent>();
        let requests_before = runtime.requests.len();

        handle_key_event(&mut kiosk, &mut runtime, &mut view, &tx, press(KeyCode::Char('s')));
        handle_key_event(&mut kiosk, &mut runtime, &mut view, &tx, press(KeyCode::Up));
        assert_eq!(
            kiosk.selected_setting(),
            Some(SettingsRow::Route("玉11".to_owned()))
        );
        view.redraw = false;
        handle_key_event(&mut kiosk, &mut runtime, &mut view, &tx, press(KeyCode::Right));

        assert_eq!(
            kiosk.schedule().filter().map(|filter| filter.limit("玉11").get()),
            Some(3)
        );
        assert!(view.redraw);
        assert_eq!(runtime.requests.len(), requests_before);
        assert_eq!(
            settings_row_text(&kiosk, &SettingsRow::Route("玉11".to_owned())),
            "[x] 玉11  表示本数: 3"
        );
    }

    #[test]
    fn quit_keys() {
        let mut runtime = TestRuntime::default();
        let (mut kiosk, mut view) = booted(&mut runtime);
        let (tx, _rx) = mpsc::channel::<InternalEvent>();
        assert!(handle_key_event(&mut kiosk, &mut runtime, &mut view, &tx, press(KeyCode::Char('q'))));
        assert!(handle_key_event(
            &mut kiosk,
            &mut runtime,
            &mut view,
            &tx,
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        ));
    }

    #[test]
    fn reload_key_fetches_every_feed() {
        let mut runtime = TestRuntime::default();
        let (mut kiosk, mut view) = booted(&mut runtime);
        let (tx, _rx) = mpsc::channel::<InternalEvent>();
        runtime.requests.clear();

        handle_key_event(&mut kiosk, &mut runtime, &mut view, &tx, press(KeyCode::Char('r')));
        assert_eq!(runtime.requests.len(), 4);
    }

    #[test]
    fn status_panel_text_shows_badges_and_page_position() {
        let view = StatusView::Page {
            index: 1,
            count: 3,
            lines: vec![StatusLine {
                icons: vec![AssetId::from_file("tokyurailway/icon_DT.png")],
                text: "東急田園都市線：平常運転".to_owned(),
            }],
        };
        assert_eq!(status_title(&view), "運行情報  page 2/3");
        assert_eq!(status_text(&view), vec!["[DT] 東急田園都市線：平常運転"]);
        assert_eq!(
            status_text(&StatusView::Placeholder),
            vec!["運行情報はありません"]
        );
    }

    #[test]
    fn weather_text_lists_three_days_with_rain_fallback() {
        let forecast = |label: &str, rain: Option<&str>| Forecast {
            date_label: label.to_owned(),
            telop: "晴れ".to_owned(),
            icon_url: Some("https://www.jma.go.jp/bosai/forecast/img/100.svg".to_owned()),
            chance_of_rain: rain.map(str::to_owned),
            wind: None,
        };
        let snapshot = WeatherSnapshot {
            forecasts: vec![
                forecast("今日", Some("20%")),
                forecast("明日", None),
                forecast("明後日", Some("")),
                forecast("4日後", Some("0%")),
            ],
        };
        let lines = weather_text(&snapshot);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "今日  晴れ [100]");
        assert_eq!(lines[1], "  降水確率：20%  風：");
        assert!(lines[3].contains("--%"));
        assert!(lines[5].contains("--%"));
    }

    #[test]
    fn first_departure_line_is_bold() {
        let mut kiosk = Kiosk::default();
        kiosk.on_loaded(Instant::now(), Loaded::Schedule(schedule()));
        let cards = kiosk.schedule_cards();
        let lines = route_card_lines(&cards[0]);

        assert_eq!(lines.len(), 2);
        let first = &lines[0].spans[0];
        assert_eq!(first.content, "先発:10:15 二子玉川駅");
        assert!(first.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(lines[1].spans[0].content, "次発:10:45 二子玉川駅");
    }
}
