use super::*;
use pretty_assertions::assert_eq;

#[test]
fn short_journal_never_dispatches() {
    let mut state = state();
    compose(&mut state, Mood::Happy, "I feel ok today");

    let effects = user(&mut state, UserAction::RequestInsight);

    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, MoodEffect::DispatchInsight(_))));
    assert_eq!(
        notice_messages(&effects),
        vec![(
            NoticeLevel::Warning,
            "Please write at least 10 words about how you feel".to_string()
        )]
    );
    assert!(!state.draft.insight_pending());
    assert_eq!(state.draft.insight, None);
}

#[test]
fn whitespace_padding_does_not_count_as_words() {
    let mut state = state();
    compose(
        &mut state,
        Mood::Sad,
        "  one   two\n\nthree \t four five six seven eight nine   ",
    );

    let effects = user(&mut state, UserAction::RequestInsight);
    assert!(matches!(effects.as_slice(), [MoodEffect::Notify(_), MoodEffect::RequestFrame]));
}

#[test]
fn calm_scenario_stores_insight_then_saves_it() {
    let mut state = state();
    compose(&mut state, Mood::Calm, TWELVE_WORDS);

    let request = dispatch(&mut state);
    assert_eq!(request.mood, Some(Mood::Calm));
    assert_eq!(request.journal_text, TWELVE_WORDS);
    assert!(request.prompt().user.starts_with("Mood: Calm\nJournal: Walked"));
    assert!(state.draft.insight_pending());

    resolve(
        &mut state,
        request.ticket,
        Ok("Take a breath, you're doing fine."),
    );
    assert_eq!(
        state.draft.insight.as_deref(),
        Some("Take a breath, you're doing fine.")
    );
    assert!(!state.draft.insight_pending());

    save(&mut state, 1_700_000_000_000);
    let entry = state.history.get_at(0).expect("saved entry");
    assert_eq!(entry.mood, Mood::Calm);
    assert_eq!(entry.journal_text, TWELVE_WORDS);
    assert_eq!(
        entry.insight.as_deref(),
        Some("Take a breath, you're doing fine.")
    );
    assert_eq!(state.draft, Draft::default());
    assert_eq!(state.selection, Selection::default());
}

#[test]
fn dispatch_clears_previous_insight() {
    let mut state = state();
    compose(&mut state, Mood::Happy, TWELVE_WORDS);
    let first = dispatch(&mut state);
    resolve(&mut state, first.ticket, Ok("first"));

    let second = dispatch(&mut state);
    assert_eq!(state.draft.insight, None);
    assert!(second.ticket > first.ticket);
}

#[test]
fn second_request_while_pending_is_ignored() {
    let mut state = state();
    compose(&mut state, Mood::Angry, TWELVE_WORDS);
    let request = dispatch(&mut state);

    let effects = user(&mut state, UserAction::RequestInsight);
    assert!(effects.is_empty());
    assert_eq!(state.draft.pending(), Some(request.ticket));
}

#[test]
fn failure_after_redispatch_leaves_insight_empty() {
    let mut state = state();
    compose(&mut state, Mood::Anxious, TWELVE_WORDS);
    let first = dispatch(&mut state);
    resolve(&mut state, first.ticket, Ok("keep going"));

    // A new dispatch clears the insight, so failure leaves it empty.
    let second = dispatch(&mut state);
    let effects = resolve(&mut state, second.ticket, Err(ServiceError::Status(502)));

    assert_eq!(
        notice_messages(&effects),
        vec![(
            NoticeLevel::Error,
            "Unable to generate insights right now".to_string()
        )]
    );
    assert_eq!(state.draft.insight, None);
    assert!(!state.draft.insight_pending());
    assert_eq!(state.draft.journal_text, TWELVE_WORDS);
}

#[test]
fn blank_completion_is_treated_as_failure() {
    let mut state = state();
    compose(&mut state, Mood::Calm, TWELVE_WORDS);
    let request = dispatch(&mut state);

    let effects = resolve(&mut state, request.ticket, Ok("   "));
    assert_eq!(notice_messages(&effects).len(), 1);
    assert_eq!(state.draft.insight, None);
    assert!(!state.draft.insight_pending());
}

#[test]
fn late_result_after_save_does_not_resurrect_draft() {
    for outcome in [Ok("too late"), Err(ServiceError::TimedOut)] {
        let mut state = state();
        compose(&mut state, Mood::Sad, TWELVE_WORDS);
        let request = dispatch(&mut state);

        save(&mut state, 1_700_000_000_000);
        let effects = resolve(&mut state, request.ticket, outcome);

        assert!(effects.is_empty());
        assert_eq!(state.draft, Draft::default());
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history.get_at(0).and_then(|e| e.insight.clone()), None);
        assert!(state
            .logs
            .iter()
            .any(|entry| entry.level == LogLevel::Debug
                && entry.ticket == Some(request.ticket)
                && entry.message.contains("stale")));
    }
}

#[test]
fn late_result_after_discard_is_dropped() {
    let mut state = state();
    compose(&mut state, Mood::Happy, TWELVE_WORDS);
    let request = dispatch(&mut state);

    user(&mut state, UserAction::DiscardDraft);
    resolve(&mut state, request.ticket, Ok("ghost"));

    assert_eq!(state.draft, Draft::default());
    assert_eq!(state.selection.mood, None);
}

#[test]
fn old_ticket_cannot_overwrite_newer_request() {
    let mut state = state();
    compose(&mut state, Mood::Calm, TWELVE_WORDS);
    let old = dispatch(&mut state);
    user(&mut state, UserAction::DiscardDraft);

    compose(&mut state, Mood::Calm, TWELVE_WORDS);
    let current = dispatch(&mut state);

    resolve(&mut state, old.ticket, Ok("stale"));
    assert_eq!(state.draft.pending, Some(current.ticket));
    assert_eq!(state.draft.insight, None);

    resolve(&mut state, current.ticket, Ok("fresh"));
    assert_eq!(state.draft.insight.as_deref(), Some("fresh"));
}

#[test]
fn insight_without_mood_is_allowed_by_default() {
    let mut state = state();
    user(
        &mut state,
        UserAction::SetJournalText(TWELVE_WORDS.to_string()),
    );

    let request = dispatch(&mut state);
    assert_eq!(request.mood, None);
    assert!(request.prompt().user.starts_with("Mood: unspecified\n"));
    assert!(state
        .logs
        .iter()
        .any(|entry| entry.level == LogLevel::Warn));
}

#[test]
fn strict_policy_requires_mood_for_insight() {
    let mut state = MoodState::new(InsightPolicy {
        require_mood: true,
        ..InsightPolicy::default()
    });
    user(
        &mut state,
        UserAction::SetJournalText(TWELVE_WORDS.to_string()),
    );

    let effects = user(&mut state, UserAction::RequestInsight);
    assert_eq!(
        notice_messages(&effects),
        vec![(NoticeLevel::Warning, "Please select a mood".to_string())]
    );
    assert!(!state.draft.insight_pending());
}

#[test]
fn editing_text_keeps_stale_insight() {
    let mut state = state();
    compose(&mut state, Mood::Happy, TWELVE_WORDS);
    let request = dispatch(&mut state);
    resolve(&mut state, request.ticket, Ok("nice"));

    user(&mut state, UserAction::JournalInput('!'));
    assert_eq!(state.draft.insight.as_deref(), Some("nice"));
}
