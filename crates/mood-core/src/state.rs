use std::collections::VecDeque;

use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::config::InsightConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Calm,
    Sad,
    Angry,
    Anxious,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodTheme {
    pub mood: Mood,
    pub label: &'static str,
    pub emoji: &'static str,
    pub color: Rgb,
    pub gradient: [Rgb; 2],
}

const MOOD_THEMES: [MoodTheme; 5] = [
    MoodTheme {
        mood: Mood::Happy,
        label: "Happy",
        emoji: "😊",
        color: Rgb::new(0xFF, 0xD7, 0x00),
        gradient: [Rgb::new(0xFF, 0xE2, 0x59), Rgb::new(0xFF, 0xA7, 0x51)],
    },
    MoodTheme {
        mood: Mood::Calm,
        label: "Calm",
        emoji: "😌",
        color: Rgb::new(0x90, 0xEE, 0x90),
        gradient: [Rgb::new(0x00, 0xB4, 0xDB), Rgb::new(0x00, 0x83, 0xB0)],
    },
    MoodTheme {
        mood: Mood::Sad,
        label: "Sad",
        emoji: "😔",
        color: Rgb::new(0x87, 0xCE, 0xEB),
        gradient: [Rgb::new(0x8E, 0x2D, 0xE2), Rgb::new(0x4A, 0x00, 0xE0)],
    },
    MoodTheme {
        mood: Mood::Angry,
        label: "Angry",
        emoji: "😤",
        color: Rgb::new(0xFF, 0x6B, 0x6B),
        gradient: [Rgb::new(0xFF, 0x41, 0x6C), Rgb::new(0xFF, 0x4B, 0x2B)],
    },
    MoodTheme {
        mood: Mood::Anxious,
        label: "Anxious",
        emoji: "😰",
        color: Rgb::new(0xDD, 0xA0, 0xDD),
        gradient: [Rgb::new(0x83, 0x4D, 0x9B), Rgb::new(0xD0, 0x4E, 0xD6)],
    },
];

/// Header gradient used while no mood is selected.
pub const NEUTRAL_GRADIENT: [Rgb; 2] = [Rgb::new(0x4C, 0x66, 0x9F), Rgb::new(0x19, 0x2F, 0x6A)];

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Happy,
        Mood::Calm,
        Mood::Sad,
        Mood::Angry,
        Mood::Anxious,
    ];

    pub fn theme(self) -> &'static MoodTheme {
        match self {
            Self::Happy => &MOOD_THEMES[0],
            Self::Calm => &MOOD_THEMES[1],
            Self::Sad => &MOOD_THEMES[2],
            Self::Angry => &MOOD_THEMES[3],
            Self::Anxious => &MOOD_THEMES[4],
        }
    }

    pub fn label(self) -> &'static str {
        self.theme().label
    }

    pub fn emoji(self) -> &'static str {
        self.theme().emoji
    }

    pub fn color(self) -> Rgb {
        self.theme().color
    }

    pub fn gradient(self) -> [Rgb; 2] {
        self.theme().gradient
    }

    pub fn index(self) -> usize {
        match self {
            Self::Happy => 0,
            Self::Calm => 1,
            Self::Sad => 2,
            Self::Angry => 3,
            Self::Anxious => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|mood| mood.label().eq_ignore_ascii_case(raw))
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub mood: Option<Mood>,
}

/// Generation token handed out when an insight request is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InsightTicket(pub u64);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub journal_text: String,
    pub insight: Option<String>,
    /// Only the reducer mints, clears or compares this ticket.
    pub(crate) pending: Option<InsightTicket>,
}

impl Draft {
    pub fn insight_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<InsightTicket> {
        self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.journal_text.is_empty() && self.insight.is_none() && self.pending.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub i64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: EntryId,
    pub mood: Mood,
    pub journal_text: String,
    pub insight: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn clipboard_text(&self) -> String {
        let mut text = format!(
            "{} {} ({})\n\n{}",
            self.mood.emoji(),
            self.mood.label(),
            self.created_at.to_rfc3339(),
            self.journal_text
        );
        if let Some(insight) = &self.insight {
            text.push_str("\n\nInsight: ");
            text.push_str(insight);
        }
        text
    }
}

/// Saved entries, newest first. Entries are never removed or edited.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    expanded: Option<EntryId>,
    last_id: Option<EntryId>,
}

impl HistoryStore {
    /// Ids are creation timestamps in milliseconds, bumped past the last issued id.
    pub fn next_id(&self, at: DateTime<Utc>) -> EntryId {
        let millis = at.timestamp_millis();
        match self.last_id {
            Some(EntryId(last)) if millis <= last => EntryId(last + 1),
            _ => EntryId(millis),
        }
    }

    pub fn prepend(&mut self, entry: HistoryEntry) {
        self.last_id = Some(entry.id);
        self.entries.insert(0, entry);
    }

    pub fn toggle_expand(&mut self, id: EntryId) {
        self.expanded = if self.expanded == Some(id) {
            None
        } else {
            Some(id)
        };
    }

    pub fn expanded(&self) -> Option<EntryId> {
        self.expanded
    }

    pub fn is_expanded(&self, id: EntryId) -> bool {
        self.expanded == Some(id)
    }

    pub fn expanded_entry(&self) -> Option<&HistoryEntry> {
        self.expanded.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: EntryId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn get_at(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub seq: u64,
    pub level: NoticeLevel,
    pub message: String,
    pub raised_at_ms: i64,
}

#[derive(Debug, Clone)]
pub struct NoticeQueue {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<Notice>,
}

impl NoticeQueue {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            next_seq: 1,
            buf: VecDeque::with_capacity(cap),
        }
    }

    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>, now_ms: i64) -> Notice {
        let notice = Notice {
            seq: self.next_seq,
            level,
            message: message.into(),
            raised_at_ms: now_ms,
        };
        self.next_seq += 1;
        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(notice.clone());
        notice
    }

    pub fn expire(&mut self, now_ms: i64, ttl_ms: i64) -> usize {
        let before = self.buf.len();
        self.buf
            .retain(|notice| now_ms.saturating_sub(notice.raised_at_ms) < ttl_ms);
        before - self.buf.len()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.buf.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.buf.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    Selection,
    Draft,
    Insight,
    History,
}

impl LogSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::Draft => "draft",
            Self::Insight => "insight",
            Self::History => "history",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub seq: u64,
    pub level: LogLevel,
    pub source: LogSource,
    pub message: String,
    pub ticket: Option<InsightTicket>,
}

impl LogEntry {
    pub fn new(level: LogLevel, source: LogSource, message: impl Into<String>) -> Self {
        Self {
            seq: 0,
            level,
            source,
            message: message.into(),
            ticket: None,
        }
    }

    pub fn with_ticket(mut self, ticket: InsightTicket) -> Self {
        self.ticket = Some(ticket);
        self
    }
}

#[derive(Debug, Clone)]
pub struct LogBuffer {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<LogEntry>,
}

impl LogBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            next_seq: 1,
            buf: VecDeque::with_capacity(cap),
        }
    }

    pub fn append(&mut self, mut entry: LogEntry) {
        entry.seq = self.next_seq;
        self.next_seq += 1;

        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.buf.iter()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Moods,
    Journal,
    History,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Self::Moods => Self::Journal,
            Self::Journal => Self::History,
            Self::History => Self::Moods,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Moods => "Moods",
            Self::Journal => "Journal",
            Self::History => "History",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Interaction {
    pub focus: Focus,
    pub mood_cursor: Mood,
    pub history_cursor: usize,
    pub show_log: bool,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            focus: Focus::Moods,
            mood_cursor: Mood::Happy,
            history_cursor: 0,
            show_log: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsightPolicy {
    pub min_words: usize,
    pub require_mood: bool,
}

impl Default for InsightPolicy {
    fn default() -> Self {
        Self {
            min_words: super::insight::MIN_INSIGHT_WORDS,
            require_mood: false,
        }
    }
}

impl From<&InsightConfig> for InsightPolicy {
    fn from(config: &InsightConfig) -> Self {
        Self {
            min_words: config.min_words.max(1),
            require_mood: config.require_mood,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MoodState {
    pub selection: Selection,
    pub draft: Draft,
    pub history: HistoryStore,
    pub interaction: Interaction,
    pub notices: NoticeQueue,
    pub logs: LogBuffer,
    pub policy: InsightPolicy,
    /// Last wall-clock reading delivered by the runtime, in milliseconds.
    pub clock_ms: i64,
    next_ticket: u64,
}

impl Default for MoodState {
    fn default() -> Self {
        Self::new(InsightPolicy::default())
    }
}

impl MoodState {
    pub fn new(policy: InsightPolicy) -> Self {
        Self {
            selection: Selection::default(),
            draft: Draft::default(),
            history: HistoryStore::default(),
            interaction: Interaction::default(),
            notices: NoticeQueue::new(8),
            logs: LogBuffer::new(500),
            policy,
            clock_ms: 0,
            next_ticket: 1,
        }
    }

    pub(crate) fn mint_ticket(&mut self) -> InsightTicket {
        let ticket = InsightTicket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    /// Empties the draft and selection. Any in-flight ticket stops matching.
    pub(crate) fn reset_draft(&mut self) {
        self.draft = Draft::default();
        self.selection = Selection::default();
    }

    pub fn header_gradient(&self) -> [Rgb; 2] {
        self.selection
            .mood
            .map_or(NEUTRAL_GRADIENT, |mood| mood.gradient())
    }
}

pub fn timestamp_ms(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub fn from_timestamp_ms(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}
