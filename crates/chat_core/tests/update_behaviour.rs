use std::sync::Once;

use chat_core::{
    update, AppState, CharCountLevel, Effect, Focus, Msg, Overlay, Sender,
    CONNECTION_ERROR_MESSAGE, GREETING,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(chat_logging::initialize_for_tests);
}

fn submit(state: AppState, input: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(input.to_string()));
    update(state, Msg::SubmitPressed)
}

fn answer(state: AppState, text: &str, sources: &[&str]) -> AppState {
    let (state, effects) = update(
        state,
        Msg::AnswerReceived {
            answer: text.to_string(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
        },
    );
    assert!(effects.is_empty());
    state
}

#[test]
fn starts_with_single_greeting() {
    init_logging();
    let view = AppState::new().view();

    assert_eq!(view.messages.len(), 1);
    assert_eq!(view.messages[0].content, GREETING);
    assert_eq!(view.messages[0].sender, Sender::Bot);
    assert!(view.send_enabled);
    assert!(!view.typing_visible);
    assert_eq!(view.status, None);
    assert_eq!(view.focus, Focus::Input);
}

#[test]
fn submit_trims_and_appends_user_entry_before_request() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "  what is onboarding?  \n");
    let view = state.view();

    assert_eq!(view.messages.len(), 2);
    assert_eq!(view.messages[1].content, "what is onboarding?");
    assert_eq!(view.messages[1].sender, Sender::User);
    assert!(view.messages[1].sources.is_empty());
    assert_eq!(
        effects,
        vec![Effect::Ask {
            query: "what is onboarding?".to_string()
        }]
    );

    assert_eq!(view.input, "");
    assert_eq!(view.char_count, 0);
    assert!(view.typing_visible);
    assert!(!view.send_enabled);
    assert!(state.is_busy());
}

#[test]
fn whitespace_only_submit_is_noop() {
    init_logging();
    for input in ["", "   ", "\n\t \n"] {
        let (state, _) = update(AppState::new(), Msg::InputChanged(input.to_string()));
        let before = state.clone();
        let (next, effects) = update(state, Msg::SubmitPressed);

        assert_eq!(next, before);
        assert!(effects.is_empty());
    }
}

#[test]
fn second_submit_while_busy_has_no_effect() {
    init_logging();
    let (state, _) = submit(AppState::new(), "first");
    let (state, effects) = submit(state, "second");
    let view = state.view();

    assert!(effects.is_empty());
    assert_eq!(view.messages.len(), 2);
    // The pending text stays in the input for a later retry.
    assert_eq!(view.input, "second");
    assert!(!view.send_enabled);
}

#[test]
fn answer_appends_bot_entry_with_sources_and_returns_to_idle() {
    init_logging();
    let (state, _) = submit(AppState::new(), "hello");
    let (state, _) = update(state, Msg::FocusToggled);
    let state = answer(state, "Hi", &["doc1"]);
    let view = state.view();

    let last = view.messages.last().expect("bot entry");
    assert_eq!(last.sender, Sender::Bot);
    assert_eq!(last.content, "Hi");
    assert_eq!(last.sources, vec!["doc1".to_string()]);
    assert!(!view.typing_visible);
    assert!(view.send_enabled);
    assert_eq!(view.focus, Focus::Input);
    assert_eq!(view.overlay, None);
}

#[test]
fn answer_without_sources_has_empty_attribution() {
    init_logging();
    let (state, _) = submit(AppState::new(), "hello");
    let state = answer(state, "Hi", &[]);

    let view = state.view();
    assert!(view.messages.last().unwrap().sources.is_empty());
}

#[test]
fn failure_opens_error_overlay_and_reenables_send() {
    init_logging();
    let (state, _) = submit(AppState::new(), "hello");
    let (state, effects) = update(
        state,
        Msg::AskFailed {
            reason: "http status 500".to_string(),
        },
    );
    let view = state.view();

    assert!(effects.is_empty());
    assert_eq!(
        view.overlay,
        Some(Overlay::Error {
            message: CONNECTION_ERROR_MESSAGE.to_string()
        })
    );
    assert!(view.send_enabled);
    assert!(!view.typing_visible);
    assert_eq!(view.focus, Focus::Input);
    // No bot entry and no automatic retry.
    assert_eq!(view.messages.len(), 2);

    let (state, _) = update(state, Msg::ErrorDismissed);
    assert_eq!(state.view().overlay, None);

    let (_, effects) = submit(state, "hello again");
    assert_eq!(effects.len(), 1);
}

#[test]
fn messages_keep_submission_order() {
    init_logging();
    let (state, _) = submit(AppState::new(), "one");
    let state = answer(state, "first answer", &[]);
    let (state, _) = submit(state, "two");
    let state = answer(state, "second answer", &["a.md", "b.md"]);

    let contents: Vec<_> = state
        .view()
        .messages
        .into_iter()
        .map(|message| message.content)
        .collect();
    assert_eq!(
        contents,
        vec![GREETING, "one", "first answer", "two", "second answer"]
    );
}

#[test]
fn char_counter_follows_thresholds() {
    init_logging();
    let cases = [
        (899, CharCountLevel::Normal),
        (900, CharCountLevel::Warning),
        (999, CharCountLevel::Warning),
        (1000, CharCountLevel::Error),
    ];
    for (len, expected) in cases {
        let (state, _) = update(AppState::new(), Msg::InputChanged("x".repeat(len)));
        let view = state.view();
        assert_eq!(view.char_count, len);
        assert_eq!(view.char_level, expected, "length {len}");
    }
}

#[test]
fn char_counter_counts_characters_not_bytes() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::InputChanged("é".repeat(900)));
    let view = state.view();

    assert_eq!(view.char_count, 900);
    assert_eq!(view.char_level, CharCountLevel::Warning);
}

#[test]
fn clear_twice_leaves_exactly_one_greeting() {
    init_logging();
    let (state, _) = submit(AppState::new(), "hello");
    let state = answer(state, "Hi", &["doc1"]);

    let mut state = state;
    for _ in 0..2 {
        let (next, _) = update(state, Msg::ClearRequested);
        assert_eq!(next.view().overlay, Some(Overlay::ConfirmClear));
        let (next, _) = update(next, Msg::ClearConfirmed);
        state = next;
    }

    let view = state.view();
    assert_eq!(view.messages.len(), 1);
    assert_eq!(view.messages[0].content, GREETING);
    assert_eq!(view.overlay, None);
}

#[test]
fn cancelled_clear_keeps_transcript() {
    init_logging();
    let (state, _) = submit(AppState::new(), "hello");
    let state = answer(state, "Hi", &[]);

    let (state, _) = update(state, Msg::ClearRequested);
    let (state, _) = update(state, Msg::ClearCancelled);
    let view = state.view();

    assert_eq!(view.messages.len(), 3);
    assert_eq!(view.overlay, None);
}

#[test]
fn cleared_transcript_uses_fresh_message_ids() {
    init_logging();
    let first_id = AppState::new().view().messages[0].id;
    let (state, _) = update(AppState::new(), Msg::ClearRequested);
    let (state, _) = update(state, Msg::ClearConfirmed);

    assert!(state.view().messages[0].id > first_id);
}

#[test]
fn focus_shortcut_returns_to_input() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FocusToggled);
    assert_eq!(state.view().focus, Focus::Transcript);

    let (state, _) = update(state, Msg::FocusInputRequested);
    assert_eq!(state.view().focus, Focus::Input);
}

#[test]
fn export_carries_current_transcript() {
    init_logging();
    let (state, _) = submit(AppState::new(), "hello");
    let state = answer(state, "Hi", &["doc1"]);
    let expected = state.transcript().to_vec();

    let (state, effects) = update(state, Msg::ExportRequested);
    assert_eq!(effects, vec![Effect::ExportTranscript { messages: expected }]);

    let (state, _) = update(state, Msg::ExportFinished(Ok("out/transcript.html".to_string())));
    assert_eq!(
        state.view().notice.as_deref(),
        Some("Transcript exported to out/transcript.html")
    );
}

#[test]
fn dirty_flag_is_consumed_once() {
    init_logging();
    let mut state = AppState::new();
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());

    let (mut state, _) = update(state, Msg::InputChanged("a".to_string()));
    assert!(state.consume_dirty());

    let (mut state, _) = update(state, Msg::InputChanged("a".to_string()));
    assert!(!state.consume_dirty());
}
