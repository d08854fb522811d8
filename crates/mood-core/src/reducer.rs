use chrono::DateTime;
use chrono::Utc;

use super::actions::MoodAction;
use super::actions::MoodEffect;
use super::actions::RuntimeAction;
use super::actions::UserAction;
use super::error::Reconciliation;
use super::error::ServiceError;
use super::error::ValidationError;
use super::insight::validate_insight_request;
use super::insight::InsightRequest;
use super::state::timestamp_ms;
use super::state::Focus;
use super::state::HistoryEntry;
use super::state::InsightTicket;
use super::state::LogEntry;
use super::state::LogLevel;
use super::state::LogSource;
use super::state::Mood;
use super::state::MoodState;
use super::state::NoticeLevel;

pub const SAVED_MESSAGE: &str = "Mood entry saved!";
pub const COPIED_MESSAGE: &str = "Entry copied to clipboard";

pub fn reduce(state: &mut MoodState, action: MoodAction) -> Vec<MoodEffect> {
    match action {
        MoodAction::User(user) => reduce_user(state, user),
        MoodAction::Runtime(runtime) => reduce_runtime(state, runtime),
    }
}

fn reduce_user(state: &mut MoodState, action: UserAction) -> Vec<MoodEffect> {
    match action {
        UserAction::SelectMood(mood) => select_mood(state, mood),
        UserAction::MoodCursorNext => {
            state.interaction.mood_cursor = state.interaction.mood_cursor.next();
            vec![MoodEffect::RequestFrame]
        }
        UserAction::MoodCursorPrev => {
            state.interaction.mood_cursor = state.interaction.mood_cursor.prev();
            vec![MoodEffect::RequestFrame]
        }
        UserAction::SelectMoodAtCursor => {
            let mood = state.interaction.mood_cursor;
            select_mood(state, mood)
        }
        UserAction::SetJournalText(text) => {
            state.draft.journal_text = text;
            vec![MoodEffect::RequestFrame]
        }
        UserAction::JournalInput(c) => {
            state.draft.journal_text.push(c);
            vec![MoodEffect::RequestFrame]
        }
        UserAction::JournalPaste(text) => {
            state.draft.journal_text.push_str(&text);
            vec![MoodEffect::RequestFrame]
        }
        UserAction::JournalBackspace => {
            state.draft.journal_text.pop();
            vec![MoodEffect::RequestFrame]
        }
        UserAction::JournalNewline => {
            state.draft.journal_text.push('\n');
            vec![MoodEffect::RequestFrame]
        }
        UserAction::RequestInsight => request_insight(state),
        UserAction::SaveEntry { at } => save_entry(state, at),
        UserAction::DiscardDraft => {
            if let Some(ticket) = state.draft.pending {
                log_ticket(
                    state,
                    LogLevel::Debug,
                    LogSource::Draft,
                    "draft discarded while insight pending",
                    ticket,
                );
            }
            state.reset_draft();
            log(state, LogLevel::Info, LogSource::Draft, "draft discarded");
            vec![MoodEffect::RequestFrame]
        }
        UserAction::ToggleExpand(id) => {
            state.history.toggle_expand(id);
            vec![MoodEffect::RequestFrame]
        }
        UserAction::HistoryCursorUp => {
            state.interaction.history_cursor = state.interaction.history_cursor.saturating_sub(1);
            vec![MoodEffect::RequestFrame]
        }
        UserAction::HistoryCursorDown => {
            let last = state.history.len().saturating_sub(1);
            state.interaction.history_cursor = (state.interaction.history_cursor + 1).min(last);
            vec![MoodEffect::RequestFrame]
        }
        UserAction::ToggleExpandAtCursor => {
            let Some(id) = state
                .history
                .get_at(state.interaction.history_cursor)
                .map(|entry| entry.id)
            else {
                return Vec::new();
            };
            state.history.toggle_expand(id);
            vec![MoodEffect::RequestFrame]
        }
        UserAction::CopyExpandedEntry => {
            let Some(text) = state.history.expanded_entry().map(HistoryEntry::clipboard_text)
            else {
                return Vec::new();
            };
            let notice = notify(state, NoticeLevel::Success, COPIED_MESSAGE);
            vec![
                MoodEffect::CopyToClipboard(text),
                notice,
                MoodEffect::RequestFrame,
            ]
        }
        UserAction::CycleFocus => {
            state.interaction.focus = state.interaction.focus.next();
            if state.interaction.focus == Focus::Moods {
                state.interaction.mood_cursor = state.selection.mood.unwrap_or(Mood::Happy);
            }
            vec![MoodEffect::RequestFrame]
        }
        UserAction::ToggleLog => {
            state.interaction.show_log = !state.interaction.show_log;
            vec![MoodEffect::RequestFrame]
        }
        UserAction::DismissNotices => {
            state.notices.clear();
            vec![MoodEffect::RequestFrame]
        }
    }
}

fn reduce_runtime(state: &mut MoodState, action: RuntimeAction) -> Vec<MoodEffect> {
    match action {
        RuntimeAction::InsightResolved { ticket, outcome } => {
            let mut effects = Vec::new();
            if resolve_insight(state, ticket, outcome, &mut effects) == Reconciliation::Applied {
                effects.push(MoodEffect::RequestFrame);
            }
            effects
        }
        RuntimeAction::Tick {
            now_ms,
            notice_ttl_ms,
        } => {
            state.clock_ms = state.clock_ms.max(now_ms);
            if state.notices.expire(state.clock_ms, notice_ttl_ms) > 0 {
                vec![MoodEffect::RequestFrame]
            } else {
                Vec::new()
            }
        }
    }
}

fn select_mood(state: &mut MoodState, mood: Mood) -> Vec<MoodEffect> {
    state.selection.mood = Some(mood);
    state.interaction.mood_cursor = mood;
    log(
        state,
        LogLevel::Debug,
        LogSource::Selection,
        format!("selected {}", mood.label()),
    );
    vec![MoodEffect::Pulse(mood), MoodEffect::RequestFrame]
}

fn request_insight(state: &mut MoodState) -> Vec<MoodEffect> {
    if let Some(ticket) = state.draft.pending {
        log_ticket(
            state,
            LogLevel::Debug,
            LogSource::Insight,
            "insight request ignored, one is already pending",
            ticket,
        );
        return Vec::new();
    }

    if let Err(err) = validate_insight_request(&state.selection, &state.draft, state.policy) {
        return reject(state, LogSource::Insight, &err);
    }

    if state.selection.mood.is_none() {
        log(
            state,
            LogLevel::Warn,
            LogSource::Insight,
            "requesting insight without a selected mood",
        );
    }

    let ticket = state.mint_ticket();
    state.draft.insight = None;
    state.draft.pending = Some(ticket);
    log_ticket(
        state,
        LogLevel::Info,
        LogSource::Insight,
        "insight request dispatched",
        ticket,
    );

    vec![
        MoodEffect::DispatchInsight(InsightRequest {
            ticket,
            mood: state.selection.mood,
            journal_text: state.draft.journal_text.clone(),
        }),
        MoodEffect::RequestFrame,
    ]
}

fn resolve_insight(
    state: &mut MoodState,
    ticket: InsightTicket,
    outcome: Result<String, ServiceError>,
    effects: &mut Vec<MoodEffect>,
) -> Reconciliation {
    if state.draft.pending != Some(ticket) {
        log_ticket(
            state,
            LogLevel::Debug,
            LogSource::Insight,
            "stale insight result discarded",
            ticket,
        );
        return Reconciliation::StaleResultDiscarded;
    }

    state.draft.pending = None;
    let outcome = outcome.and_then(|completion| {
        if completion.trim().is_empty() {
            Err(ServiceError::EmptyCompletion)
        } else {
            Ok(completion)
        }
    });

    match outcome {
        Ok(completion) => {
            state.draft.insight = Some(completion);
            log_ticket(
                state,
                LogLevel::Info,
                LogSource::Insight,
                "insight received",
                ticket,
            );
        }
        Err(err) => {
            log_ticket(
                state,
                LogLevel::Error,
                LogSource::Insight,
                format!("insight request failed: {err}"),
                ticket,
            );
            effects.push(notify(state, NoticeLevel::Error, ServiceError::USER_MESSAGE));
        }
    }
    Reconciliation::Applied
}

fn save_entry(state: &mut MoodState, at: DateTime<Utc>) -> Vec<MoodEffect> {
    state.clock_ms = state.clock_ms.max(timestamp_ms(at));

    let Some(mood) = state.selection.mood else {
        return reject(state, LogSource::History, &ValidationError::NoMoodSelected);
    };

    if let Some(ticket) = state.draft.pending {
        log_ticket(
            state,
            LogLevel::Debug,
            LogSource::History,
            "entry saved while insight pending, late result will be dropped",
            ticket,
        );
    }

    let entry = HistoryEntry {
        id: state.history.next_id(at),
        mood,
        journal_text: std::mem::take(&mut state.draft.journal_text),
        insight: state.draft.insight.take(),
        created_at: at,
    };
    let id = entry.id;
    state.history.prepend(entry);
    state.reset_draft();
    state.interaction.history_cursor = 0;

    log(
        state,
        LogLevel::Info,
        LogSource::History,
        format!("saved entry {} ({})", id.0, mood.label()),
    );
    let notice = notify(state, NoticeLevel::Success, SAVED_MESSAGE);
    vec![notice, MoodEffect::RequestFrame]
}

fn reject(state: &mut MoodState, source: LogSource, err: &ValidationError) -> Vec<MoodEffect> {
    log(state, LogLevel::Warn, source, err.to_string());
    let notice = notify(state, NoticeLevel::Warning, err.user_message());
    vec![notice, MoodEffect::RequestFrame]
}

fn notify(state: &mut MoodState, level: NoticeLevel, message: impl Into<String>) -> MoodEffect {
    let clock = state.clock_ms;
    MoodEffect::Notify(state.notices.push(level, message, clock))
}

fn log(state: &mut MoodState, level: LogLevel, source: LogSource, message: impl Into<String>) {
    state.logs.append(LogEntry::new(level, source, message));
}

fn log_ticket(
    state: &mut MoodState,
    level: LogLevel,
    source: LogSource,
    message: impl Into<String>,
    ticket: InsightTicket,
) {
    state
        .logs
        .append(LogEntry::new(level, source, message).with_ticket(ticket));
}

#[cfg(test)]
mod tests;
