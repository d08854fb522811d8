use chrono::DateTime;
use chrono::Utc;

pub(super) use super::reduce;
pub(super) use super::COPIED_MESSAGE;
pub(super) use super::SAVED_MESSAGE;
pub(super) use crate::actions::MoodAction;
pub(super) use crate::actions::MoodEffect;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::error::ServiceError;
pub(super) use crate::insight::InsightRequest;
pub(super) use crate::state::from_timestamp_ms;
pub(super) use crate::state::Draft;
pub(super) use crate::state::EntryId;
pub(super) use crate::state::Focus;
pub(super) use crate::state::InsightPolicy;
pub(super) use crate::state::InsightTicket;
pub(super) use crate::state::LogLevel;
pub(super) use crate::state::Mood;
pub(super) use crate::state::MoodState;
pub(super) use crate::state::NoticeLevel;
pub(super) use crate::state::Selection;

mod insight_lifecycle;

const TWELVE_WORDS: &str =
    "Walked by the river this morning and felt the tension slowly fade away";

fn state() -> MoodState {
    MoodState::default()
}

fn at(ms: i64) -> DateTime<Utc> {
    from_timestamp_ms(ms)
}

fn user(state: &mut MoodState, action: UserAction) -> Vec<MoodEffect> {
    reduce(state, MoodAction::User(action))
}

fn runtime(state: &mut MoodState, action: RuntimeAction) -> Vec<MoodEffect> {
    reduce(state, MoodAction::Runtime(action))
}

fn compose(state: &mut MoodState, mood: Mood, text: &str) {
    user(state, UserAction::SelectMood(mood));
    user(state, UserAction::SetJournalText(text.to_string()));
}

/// Dispatches an insight request and returns the request the reducer emitted.
fn dispatch(state: &mut MoodState) -> InsightRequest {
    let effects = user(state, UserAction::RequestInsight);
    match effects.as_slice() {
        [MoodEffect::DispatchInsight(request), MoodEffect::RequestFrame] => request.clone(),
        other => panic!("expected dispatch, got {other:?}"),
    }
}

fn resolve(
    state: &mut MoodState,
    ticket: InsightTicket,
    outcome: Result<&str, ServiceError>,
) -> Vec<MoodEffect> {
    runtime(
        state,
        RuntimeAction::InsightResolved {
            ticket,
            outcome: outcome.map(str::to_string),
        },
    )
}

fn save(state: &mut MoodState, ms: i64) -> Vec<MoodEffect> {
    user(state, UserAction::SaveEntry { at: at(ms) })
}

fn notice_messages(effects: &[MoodEffect]) -> Vec<(NoticeLevel, String)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            MoodEffect::Notify(notice) => Some((notice.level, notice.message.clone())),
            _ => None,
        })
        .collect()
}
