use chrono::DateTime;
use chrono::Utc;

use super::error::ServiceError;
use super::insight::InsightRequest;
use super::state::EntryId;
use super::state::InsightTicket;
use super::state::Mood;
use super::state::Notice;

#[derive(Debug, Clone)]
pub enum MoodAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    SelectMood(Mood),
    MoodCursorNext,
    MoodCursorPrev,
    SelectMoodAtCursor,
    SetJournalText(String),
    JournalInput(char),
    JournalPaste(String),
    JournalBackspace,
    JournalNewline,
    RequestInsight,
    SaveEntry { at: DateTime<Utc> },
    DiscardDraft,
    ToggleExpand(EntryId),
    HistoryCursorUp,
    HistoryCursorDown,
    ToggleExpandAtCursor,
    CopyExpandedEntry,
    CycleFocus,
    ToggleLog,
    DismissNotices,
}

#[derive(Debug, Clone)]
pub enum RuntimeAction {
    InsightResolved {
        ticket: InsightTicket,
        outcome: Result<String, ServiceError>,
    },
    Tick {
        now_ms: i64,
        notice_ttl_ms: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoodEffect {
    RequestFrame,
    /// Transient highlight on the chosen mood; not part of the data model.
    Pulse(Mood),
    DispatchInsight(InsightRequest),
    Notify(Notice),
    CopyToClipboard(String),
}
