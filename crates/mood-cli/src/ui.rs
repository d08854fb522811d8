use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use chrono::DateTime;
use chrono::Local;
use chrono::Utc;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;

use mood_core::actions::{MoodAction, MoodEffect, RuntimeAction, UserAction};
use mood_core::config::UiConfig;
use mood_core::insight::count_words;
use mood_core::reducer::reduce;
use mood_core::state::{Focus, HistoryEntry, LogLevel, Mood, MoodState, NoticeLevel, Rgb};
use mood_exec::{spawn_insight, InsightResolution, InsightService};

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableBracketedPaste,
            crossterm::cursor::Show
        );
    }
}

pub fn run(
    mut state: MoodState,
    service: Arc<dyn InsightService>,
    ui_config: UiConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        crossterm::cursor::Hide
    )?;
    let _guard = TuiGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    run_app(&mut terminal, &mut state, service, &ui_config).map_err(|e| e.into())
}

enum UiEvent {
    InsightResolved(InsightResolution),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyCommand {
    Dispatch(UserAction),
    Quit,
    Ignore,
}

struct Pulse {
    mood: Mood,
    started: Instant,
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut MoodState,
    service: Arc<dyn InsightService>,
    ui_config: &UiConfig,
) -> io::Result<()> {
    let (tx, rx) = mpsc::channel();
    let notice_ttl_ms = i64::try_from(ui_config.notice_ttl_ms).unwrap_or(i64::MAX);
    let pulse_window = Duration::from_millis(ui_config.pulse_ms);
    let mut pulse: Option<Pulse> = None;

    loop {
        while let Ok(event) = rx.try_recv() {
            let action = match event {
                UiEvent::InsightResolved(resolution) => RuntimeAction::InsightResolved {
                    ticket: resolution.ticket,
                    outcome: resolution.outcome,
                },
            };
            let effects = reduce(state, MoodAction::Runtime(action));
            run_effects(effects, &tx, &service, &mut pulse);
        }

        let effects = reduce(
            state,
            MoodAction::Runtime(RuntimeAction::Tick {
                now_ms: Utc::now().timestamp_millis(),
                notice_ttl_ms,
            }),
        );
        run_effects(effects, &tx, &service, &mut pulse);

        if pulse
            .as_ref()
            .is_some_and(|p| p.started.elapsed() >= pulse_window)
        {
            pulse = None;
        }
        let pulsing = pulse.as_ref().map(|p| p.mood);

        terminal.draw(|f| ui(f, state, pulsing))?;

        if !event::poll(Duration::from_millis(16))? {
            continue;
        }

        let command = match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                map_key(key, state, Utc::now())
            }
            Event::Paste(text) if state.interaction.focus == Focus::Journal => {
                KeyCommand::Dispatch(UserAction::JournalPaste(text))
            }
            _ => KeyCommand::Ignore,
        };

        let action = match command {
            KeyCommand::Quit => return Ok(()),
            KeyCommand::Ignore => continue,
            KeyCommand::Dispatch(action) => action,
        };

        let effects = reduce(state, MoodAction::User(action));
        run_effects(effects, &tx, &service, &mut pulse);
    }
}

fn run_effects(
    effects: Vec<MoodEffect>,
    tx: &mpsc::Sender<UiEvent>,
    service: &Arc<dyn InsightService>,
    pulse: &mut Option<Pulse>,
) {
    for effect in effects {
        match effect {
            MoodEffect::DispatchInsight(request) => {
                let tx_clone = tx.clone();
                tracing::debug!(ticket = request.ticket.0, "dispatching insight request");
                spawn_insight(Arc::clone(service), request, move |resolution| {
                    let _ = tx_clone.send(UiEvent::InsightResolved(resolution));
                });
            }
            MoodEffect::CopyToClipboard(text) => match arboard::Clipboard::new() {
                Ok(mut clipboard) => {
                    if let Err(err) = clipboard.set_text(text) {
                        tracing::warn!(error = %err, "clipboard write failed");
                    }
                }
                Err(err) => tracing::warn!(error = %err, "clipboard unavailable"),
            },
            MoodEffect::Pulse(mood) => {
                *pulse = Some(Pulse {
                    mood,
                    started: Instant::now(),
                });
            }
            MoodEffect::Notify(notice) => {
                tracing::info!(kind = notice.level.label(), "{}", notice.message);
            }
            MoodEffect::RequestFrame => {}
        }
    }
}

fn map_key(key: KeyEvent, state: &MoodState, now: DateTime<Utc>) -> KeyCommand {
    use KeyCommand::{Dispatch, Ignore, Quit};

    if state.interaction.show_log {
        return match key.code {
            KeyCode::F(2) | KeyCode::Esc => Dispatch(UserAction::ToggleLog),
            _ => Ignore,
        };
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Quit,
            KeyCode::Char('g') => Dispatch(UserAction::RequestInsight),
            KeyCode::Char('s') => Dispatch(UserAction::SaveEntry { at: now }),
            KeyCode::Char('d') => Dispatch(UserAction::DiscardDraft),
            KeyCode::Char('l') => Dispatch(UserAction::DismissNotices),
            _ => Ignore,
        };
    }

    match key.code {
        KeyCode::Esc => return Quit,
        KeyCode::Tab => return Dispatch(UserAction::CycleFocus),
        KeyCode::F(2) => return Dispatch(UserAction::ToggleLog),
        _ => {}
    }

    match state.interaction.focus {
        Focus::Moods => match key.code {
            KeyCode::Left | KeyCode::Char('h') => Dispatch(UserAction::MoodCursorPrev),
            KeyCode::Right | KeyCode::Char('l') => Dispatch(UserAction::MoodCursorNext),
            KeyCode::Enter | KeyCode::Char(' ') => Dispatch(UserAction::SelectMoodAtCursor),
            KeyCode::Char(c) => {
                mood_digit(c).map_or(Ignore, |mood| Dispatch(UserAction::SelectMood(mood)))
            }
            _ => Ignore,
        },
        Focus::Journal => match key.code {
            KeyCode::Char(c) => Dispatch(UserAction::JournalInput(c)),
            KeyCode::Enter => Dispatch(UserAction::JournalNewline),
            KeyCode::Backspace => Dispatch(UserAction::JournalBackspace),
            _ => Ignore,
        },
        Focus::History => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Dispatch(UserAction::HistoryCursorUp),
            KeyCode::Down | KeyCode::Char('j') => Dispatch(UserAction::HistoryCursorDown),
            KeyCode::Enter | KeyCode::Char(' ') => Dispatch(UserAction::ToggleExpandAtCursor),
            KeyCode::Char('y') => Dispatch(UserAction::CopyExpandedEntry),
            KeyCode::Char(c) => {
                mood_digit(c).map_or(Ignore, |mood| Dispatch(UserAction::SelectMood(mood)))
            }
            _ => Ignore,
        },
    }
}

fn mood_digit(c: char) -> Option<Mood> {
    let digit = c.to_digit(10)? as usize;
    Mood::from_index(digit.checked_sub(1)?)
}

struct UiPalette {
    accent: Color,
    success: Color,
    warning: Color,
    danger: Color,
    muted: Color,
    border: Color,
    selected_bg: Color,
}

const PALETTE: UiPalette = UiPalette {
    accent: Color::Cyan,
    success: Color::Green,
    warning: Color::Yellow,
    danger: Color::Red,
    muted: Color::DarkGray,
    border: Color::Gray,
    selected_bg: Color::Rgb(40, 44, 52),
};

fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Linear blend between the two gradient stops, `t` in `0.0..=1.0`.
fn blend(from: Rgb, to: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
    Rgb::new(mix(from.r, to.r), mix(from.g, to.g), mix(from.b, to.b))
}

fn border_style(state: &MoodState, focus: Focus) -> Style {
    if state.interaction.focus == focus {
        Style::default().fg(PALETTE.accent)
    } else {
        Style::default().fg(PALETTE.border)
    }
}

fn ui(f: &mut ratatui::Frame, state: &MoodState, pulsing: Option<Mood>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, rows[0], state);
    render_mood_strip(f, rows[1], state, pulsing);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[2]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(6)])
        .split(columns[0]);

    render_journal(f, left[0], state);
    render_insight(f, left[1], state);
    render_history(f, columns[1], state);
    render_toast(f, rows[3], state);
    render_key_hints(f, rows[4], state);

    if state.interaction.show_log {
        render_log_overlay(f, state);
    }
}

fn render_header(f: &mut ratatui::Frame, area: Rect, state: &MoodState) {
    let [from, to] = state.header_gradient();
    let width = usize::from(area.width.max(1));
    let text = "MoodCanvas  ·  Paint your emotions";
    let pad = width.saturating_sub(text.chars().count()) / 2;

    let band: Vec<Span> = (0..width)
        .map(|col| {
            let t = col as f32 / (width.saturating_sub(1).max(1)) as f32;
            let bg = rgb(blend(from, to, t));
            let ch = col
                .checked_sub(pad)
                .and_then(|i| text.chars().nth(i))
                .unwrap_or(' ');
            Span::styled(
                ch.to_string(),
                Style::default()
                    .bg(bg)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        })
        .collect();

    let blank = |row_from: Rgb, row_to: Rgb| -> Line<'static> {
        Line::from(
            (0..width)
                .map(|col| {
                    let t = col as f32 / (width.saturating_sub(1).max(1)) as f32;
                    Span::styled(" ", Style::default().bg(rgb(blend(row_from, row_to, t))))
                })
                .collect::<Vec<_>>(),
        )
    };

    let p = Paragraph::new(vec![blank(from, to), Line::from(band), blank(from, to)]);
    f.render_widget(p, area);
}

fn render_mood_strip(f: &mut ratatui::Frame, area: Rect, state: &MoodState, pulsing: Option<Mood>) {
    let focused = state.interaction.focus == Focus::Moods;
    let mut spans = Vec::new();
    for (i, mood) in Mood::ALL.iter().copied().enumerate() {
        let selected = state.selection.mood == Some(mood);
        let under_cursor = focused && state.interaction.mood_cursor == mood;
        let mut style = Style::default().fg(rgb(mood.color()));
        if selected {
            style = style.bg(rgb(mood.color())).fg(Color::Black);
        } else if under_cursor {
            style = style.bg(PALETTE.selected_bg);
        }
        if selected || under_cursor {
            style = style.add_modifier(Modifier::BOLD);
        }
        if pulsing == Some(mood) {
            style = style.add_modifier(Modifier::SLOW_BLINK | Modifier::REVERSED);
        }
        spans.push(Span::styled(
            format!(" {} {} {} ", i + 1, mood.emoji(), mood.label()),
            style,
        ));
        spans.push(Span::raw("  "));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(state, Focus::Moods))
        .title("How are you feeling?");
    let p = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(p, area);
}

fn render_journal(f: &mut ratatui::Frame, area: Rect, state: &MoodState) {
    let words = count_words(&state.draft.journal_text);
    let min_words = state.policy.min_words;
    let count_style = if words >= min_words {
        Style::default().fg(PALETTE.success)
    } else {
        Style::default().fg(PALETTE.muted)
    };

    let mut lines: Vec<Line> = if state.draft.journal_text.is_empty() {
        vec![Line::from(Span::styled(
            "Write about your feelings...",
            Style::default().fg(PALETTE.muted),
        ))]
    } else {
        state
            .draft
            .journal_text
            .split('\n')
            .map(|line| Line::from(line.to_string()))
            .collect()
    };
    if state.interaction.focus == Focus::Journal {
        if let Some(last) = lines.last_mut() {
            if state.draft.journal_text.is_empty() {
                *last = Line::from(Span::styled("▏", Style::default().fg(PALETTE.accent)));
            } else {
                last.spans
                    .push(Span::styled("▏", Style::default().fg(PALETTE.accent)));
            }
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(state, Focus::Journal))
        .title("Journal")
        .title_bottom(
            Line::from(Span::styled(
                format!(" {words}/{min_words} words "),
                count_style,
            ))
            .right_aligned(),
        );
    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    f.render_widget(p, area);
}

fn render_insight(f: &mut ratatui::Frame, area: Rect, state: &MoodState) {
    let line = if state.draft.insight_pending() {
        Line::from(vec![
            Span::styled(format!("{} ", get_spinner()), Style::default().fg(PALETTE.accent)),
            Span::styled("Generating insights...", Style::default().fg(PALETTE.muted)),
        ])
    } else if let Some(insight) = &state.draft.insight {
        Line::from(Span::raw(insight.clone()))
    } else {
        Line::from(Span::styled(
            "Press Ctrl-G for an AI insight on this entry",
            Style::default().fg(PALETTE.muted),
        ))
    };

    let accent = state
        .selection
        .mood
        .map_or(PALETTE.border, |mood| rgb(mood.color()));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .title("AI Insight");
    let p = Paragraph::new(line).wrap(Wrap { trim: true }).block(block);
    f.render_widget(p, area);
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%b %-d, %Y %-I:%M %p")
        .to_string()
}

/// First `max_lines` lines of `text`, with an ellipsis when anything was cut.
fn preview_lines(text: &str, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = text.lines().take(max_lines).map(str::to_string).collect();
    if text.lines().count() > max_lines {
        if let Some(last) = lines.last_mut() {
            last.push('…');
        }
    }
    lines
}

fn history_item(entry: &HistoryEntry, expanded: bool) -> ListItem<'static> {
    let color = rgb(entry.mood.color());
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("{} {}", entry.mood.emoji(), entry.mood.label()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", format_timestamp(entry.created_at)),
            Style::default().fg(PALETTE.muted),
        ),
    ])];

    if expanded {
        lines.extend(
            entry
                .journal_text
                .lines()
                .map(|line| Line::from(format!("  {line}"))),
        );
        if let Some(insight) = &entry.insight {
            lines.push(Line::from(vec![
                Span::styled("  Insight: ", Style::default().fg(PALETTE.accent)),
                Span::raw(insight.clone()),
            ]));
        }
    } else {
        lines.extend(
            preview_lines(&entry.journal_text, 2)
                .into_iter()
                .map(|line| Line::from(Span::styled(format!("  {line}"), Style::default()))),
        );
    }
    lines.push(Line::from(""));
    ListItem::new(lines)
}

fn render_history(f: &mut ratatui::Frame, area: Rect, state: &MoodState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(state, Focus::History))
        .title(format!("Mood History ({})", state.history.len()));

    if state.history.is_empty() {
        let p = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No entries yet",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Your mood entries will appear here",
                Style::default().fg(PALETTE.muted),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(p, area);
        return;
    }

    let items: Vec<ListItem> = state
        .history
        .iter()
        .map(|entry| history_item(entry, state.history.is_expanded(entry.id)))
        .collect();
    let mut list_state = ListState::default();
    if state.interaction.focus == Focus::History {
        list_state.select(Some(state.interaction.history_cursor));
    }
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(PALETTE.selected_bg));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_toast(f: &mut ratatui::Frame, area: Rect, state: &MoodState) {
    let Some(notice) = state.notices.latest() else {
        return;
    };
    let color = match notice.level {
        NoticeLevel::Success => PALETTE.success,
        NoticeLevel::Warning => PALETTE.warning,
        NoticeLevel::Error => PALETTE.danger,
    };
    let p = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", notice.level.label()),
            Style::default().bg(color).fg(Color::Black),
        ),
        Span::styled(format!(" {}", notice.message), Style::default().fg(color)),
    ]));
    f.render_widget(p, area);
}

fn render_key_hints(f: &mut ratatui::Frame, area: Rect, state: &MoodState) {
    let key = |k: &str| Span::styled(k.to_string(), Style::default().fg(PALETTE.accent));
    let label = |l: &str| Span::styled(l.to_string(), Style::default().fg(PALETTE.muted));
    let focus = format!(" {} ", state.interaction.focus.label());
    let mut spans = vec![
        key("Tab"),
        label(&focus),
        key("^G"),
        label(" insight "),
        key("^S"),
        label(" save "),
        key("^D"),
        label(" discard "),
    ];
    if state.interaction.focus == Focus::History {
        spans.extend([key("Enter"), label(" expand "), key("y"), label(" copy ")]);
    }
    spans.extend([key("F2"), label(" log "), key("Esc"), label(" quit")]);
    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

fn render_log_overlay(f: &mut ratatui::Frame, state: &MoodState) {
    let area = centered_rect(80, 70, f.area());
    let visible = usize::from(area.height.saturating_sub(2));
    let skip = state.logs.len().saturating_sub(visible);
    let lines: Vec<Line> = state
        .logs
        .iter()
        .skip(skip)
        .map(|entry| {
            let color = match entry.level {
                LogLevel::Trace | LogLevel::Debug => PALETTE.muted,
                LogLevel::Info => PALETTE.success,
                LogLevel::Warn => PALETTE.warning,
                LogLevel::Error => PALETTE.danger,
            };
            let ticket = entry
                .ticket
                .map(|t| format!(" #{}", t.0))
                .unwrap_or_default();
            Line::from(vec![
                Span::styled(format!("{:>5} ", entry.level.label()), Style::default().fg(color)),
                Span::styled(
                    format!("[{}{}] ", entry.source.label(), ticket),
                    Style::default().fg(PALETTE.accent),
                ),
                Span::raw(entry.message.clone()),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(PALETTE.accent))
        .title("Session Log (F2 to close)");
    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn get_spinner() -> &'static str {
    let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let idx = (Utc::now().timestamp_millis() / 100).rem_euclid(frames.len() as i64) as usize;
    frames[idx]
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
