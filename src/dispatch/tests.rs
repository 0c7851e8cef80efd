use super::*;
use crate::{
    recording::{PlatformCall, RecordingPlatform},
    types::TouchPoint,
    voice::{DirectNavigation, RecognizerLanguage},
};

fn activation(kind: GestureKind, t_ms: u64) -> Activation {
    Activation {
        kind,
        t_ms,
        down_ms: t_ms.saturating_sub(1_500),
        origin: TouchPoint::new(100, 100),
    }
}

fn screen() -> ScreenContext {
    ScreenContext::new("chats")
}

fn start_voice(dispatcher: &mut ActivationDispatcher, platform: &mut RecordingPlatform) -> u32 {
    match dispatcher.dispatch(&activation(GestureKind::Dual, 1_500), &screen(), platform) {
        DispatchOutcome::VoiceStarted { session_id } => session_id,
        other => panic!("voice did not start: {other:?}"),
    }
}

fn run_due(dispatcher: &mut ActivationDispatcher, now_ms: u64, platform: &mut RecordingPlatform) {
    while dispatcher.fire_due(now_ms, platform).is_some() {}
}

#[test]
fn single_press_opens_menu_with_context_and_wheel_settings() {
    let mut dispatcher = ActivationDispatcher::default();
    let mut platform = RecordingPlatform::new();

    let outcome = dispatcher.dispatch(&activation(GestureKind::Single, 1_500), &screen(), &mut platform);
    assert_eq!(outcome, DispatchOutcome::MenuOpened);
    assert!(dispatcher.menu_visible());
    assert_eq!(
        platform.calls,
        std::vec![
            PlatformCall::Haptic,
            PlatformCall::OpenMenu(MenuRequest {
                screen: screen(),
                blur_intensity: 60,
                dismiss_margin_px: 24,
            }),
        ]
    );
}

#[test]
fn dual_press_registers_before_opening_and_listening() {
    let mut dispatcher = ActivationDispatcher::default();
    let mut platform = RecordingPlatform::new();

    start_voice(&mut dispatcher, &mut platform);
    assert_eq!(
        platform.labels(),
        std::vec!["haptic", "listener_attach", "voice_open", "listen_start"]
    );
    assert_eq!(
        platform.calls[3],
        PlatformCall::StartListening(RecognizerLanguage::default())
    );
    assert_eq!(dispatcher.channel_state(), ChannelState::Registered);
    assert!(dispatcher.is_listening());
}

#[test]
fn overlays_are_mutually_exclusive() {
    let mut dispatcher = ActivationDispatcher::default();
    let mut platform = RecordingPlatform::new();

    dispatcher.dispatch(&activation(GestureKind::Single, 1_500), &screen(), &mut platform);
    let outcome = dispatcher.dispatch(&activation(GestureKind::Dual, 1_600), &screen(), &mut platform);
    assert_eq!(outcome, DispatchOutcome::Ignored(IgnoreReason::OverlayOpen));
    assert!(!dispatcher.voice_visible());
    assert_eq!(platform.count("haptic"), 1);
}

#[test]
fn voice_disabled_discards_dual_press_silently() {
    let mut config = HoldgateConfig::default();
    config.voice.enabled = false;
    let mut dispatcher = ActivationDispatcher::new(&config);
    let mut platform = RecordingPlatform::new();

    let outcome = dispatcher.dispatch(&activation(GestureKind::Dual, 1_500), &screen(), &mut platform);
    assert_eq!(outcome, DispatchOutcome::Ignored(IgnoreReason::VoiceDisabled));
    assert!(platform.calls.is_empty());
}

#[test]
fn haptics_can_be_disabled() {
    let mut config = HoldgateConfig::default();
    config.feedback.haptics_enabled = false;
    let mut dispatcher = ActivationDispatcher::new(&config);
    let mut platform = RecordingPlatform::new();

    dispatcher.dispatch(&activation(GestureKind::Single, 1_500), &screen(), &mut platform);
    assert_eq!(platform.count("haptic"), 0);
    assert_eq!(platform.count("menu_open"), 1);
}

#[test]
fn navigation_result_closes_and_navigates() {
    let mut dispatcher = ActivationDispatcher::default();
    let mut platform = RecordingPlatform::new();
    start_voice(&mut dispatcher, &mut platform);
    platform.take_calls();

    let outcome = dispatcher.on_voice_result(
        2_400,
        &VoiceResult::navigation("contacts", "open contacts"),
        &mut DirectNavigation,
        &mut platform,
    );
    assert_eq!(outcome, VoiceOutcome::Navigated("contacts".into()));
    assert_eq!(
        platform.labels(),
        std::vec!["listener_detach", "voice_close", "listen_stop", "navigate"]
    );
    assert!(!dispatcher.voice_visible());
    assert_eq!(dispatcher.channel_state(), ChannelState::Idle);
    assert_eq!(dispatcher.next_deadline_ms(), None);
}

#[test]
fn unknown_result_keeps_overlay_open_and_listens_again() {
    let mut dispatcher = ActivationDispatcher::default();
    let mut platform = RecordingPlatform::new();
    let session_id = start_voice(&mut dispatcher, &mut platform);
    platform.take_calls();

    let outcome = dispatcher.on_voice_result(
        2_000,
        &VoiceResult::error("no match"),
        &mut DirectNavigation,
        &mut platform,
    );
    assert_eq!(outcome, VoiceOutcome::Retrying);
    assert!(dispatcher.voice_visible());
    assert_eq!(dispatcher.channel_state(), ChannelState::Registered);
    assert_eq!(dispatcher.active_session().map(|s| s.id), Some(session_id));
    assert_eq!(
        platform.labels(),
        std::vec!["listener_detach", "listener_attach", "listen_stop", "listen_start"]
    );
    assert!(dispatcher.is_listening());
}

#[test]
fn action_result_is_handed_over_then_overlay_closes() {
    let mut dispatcher = ActivationDispatcher::default();
    let mut platform = RecordingPlatform::new();
    start_voice(&mut dispatcher, &mut platform);
    platform.take_calls();

    let outcome = dispatcher.on_voice_result(
        2_000,
        &VoiceResult::action("Anna", "call Anna"),
        &mut DirectNavigation,
        &mut platform,
    );
    assert_eq!(outcome, VoiceOutcome::ActionRun);
    assert_eq!(platform.calls[1], PlatformCall::RunAction("call Anna".into()));
    assert!(!dispatcher.voice_visible());
}

#[test]
fn late_result_inside_grace_is_delivered() {
    let mut dispatcher = ActivationDispatcher::default();
    let mut platform = RecordingPlatform::new();
    start_voice(&mut dispatcher, &mut platform);

    assert!(dispatcher.close_voice_overlay(5_000, CloseReason::Dismissed, &mut platform));
    assert_eq!(dispatcher.channel_state(), ChannelState::GracePending);
    assert_eq!(dispatcher.next_deadline_ms(), Some(8_000));

    run_due(&mut dispatcher, 6_000, &mut platform);
    let outcome = dispatcher.on_voice_result(
        6_000,
        &VoiceResult::navigation("settings", "settings"),
        &mut DirectNavigation,
        &mut platform,
    );
    assert_eq!(outcome, VoiceOutcome::Navigated("settings".into()));
    assert_eq!(dispatcher.channel_state(), ChannelState::Idle);
    assert_eq!(dispatcher.next_deadline_ms(), None);
}

#[test]
fn late_non_navigation_result_is_dropped() {
    let mut dispatcher = ActivationDispatcher::default();
    let mut platform = RecordingPlatform::new();
    start_voice(&mut dispatcher, &mut platform);
    dispatcher.close_voice_overlay(5_000, CloseReason::Dismissed, &mut platform);
    platform.take_calls();

    let outcome = dispatcher.on_voice_result(
        5_500,
        &VoiceResult::unknown("hmm"),
        &mut DirectNavigation,
        &mut platform,
    );
    assert_eq!(outcome, VoiceOutcome::Dropped);
    assert_eq!(platform.labels(), std::vec!["listener_detach"]);
    assert_eq!(dispatcher.channel_state(), ChannelState::Idle);
}

#[test]
fn result_after_grace_is_dropped_and_recognizer_reset() {
    let mut dispatcher = ActivationDispatcher::default();
    let mut platform = RecordingPlatform::new();
    start_voice(&mut dispatcher, &mut platform);
    dispatcher.close_voice_overlay(5_000, CloseReason::Dismissed, &mut platform);
    platform.take_calls();

    run_due(&mut dispatcher, 8_100, &mut platform);
    assert_eq!(dispatcher.channel_state(), ChannelState::Idle);
    assert_eq!(platform.labels(), std::vec!["listener_detach"]);

    let outcome = dispatcher.on_voice_result(
        8_100,
        &VoiceResult::navigation("settings", "settings"),
        &mut DirectNavigation,
        &mut platform,
    );
    assert_eq!(outcome, VoiceOutcome::Dropped);
    assert_eq!(platform.count("navigate"), 0);
}

#[test]
fn reopen_during_grace_reuses_registration() {
    let mut dispatcher = ActivationDispatcher::default();
    let mut platform = RecordingPlatform::new();
    start_voice(&mut dispatcher, &mut platform);
    dispatcher.close_voice_overlay(5_000, CloseReason::Dismissed, &mut platform);
    platform.take_calls();

    let second = match dispatcher.dispatch(&activation(GestureKind::Dual, 6_000), &screen(), &mut platform) {
        DispatchOutcome::VoiceStarted { session_id } => session_id,
        other => panic!("voice did not start: {other:?}"),
    };
    assert_eq!(platform.count("listener_attach"), 0);
    assert_eq!(dispatcher.channel_state(), ChannelState::Registered);
    assert_eq!(dispatcher.active_session().map(|s| s.id), Some(second));

    run_due(&mut dispatcher, 20_000, &mut platform);
    assert_eq!(dispatcher.channel_state(), ChannelState::Registered);
}

#[test]
fn closing_twice_is_a_no_op() {
    let mut dispatcher = ActivationDispatcher::default();
    let mut platform = RecordingPlatform::new();
    start_voice(&mut dispatcher, &mut platform);

    assert!(dispatcher.close_voice_overlay(3_000, CloseReason::Cancelled, &mut platform));
    assert!(!dispatcher.close_voice_overlay(3_100, CloseReason::Cancelled, &mut platform));
    assert_eq!(platform.count("voice_close"), 1);
    assert!(!dispatcher.close_navigation_menu(&mut platform));
}
