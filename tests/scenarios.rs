use holdgate::{
    gesture::RejectReason,
    recording::{PlatformCall, RecordingPlatform},
    voice::ChannelState,
    CloseReason, DispatchOutcome, GestureController, GestureKind, HoldgateConfig, ScreenContext,
    TouchFrame, TouchPhase, TouchPoint, VoiceOutcome, VoiceResult,
};

type Controller = GestureController<RecordingPlatform>;

fn controller() -> Controller {
    GestureController::new(&HoldgateConfig::default(), RecordingPlatform::new()).unwrap()
}

fn p(x: u16, y: u16) -> TouchPoint {
    TouchPoint::new(x, y)
}

/// Starts a voice session with two fingers held from 0 to 1600ms.
fn open_voice(controller: &mut Controller) {
    controller.on_touch(0, &TouchFrame::two(TouchPhase::Start, p(100, 100), p(140, 100)));
    let out = controller.on_touch(1_600, &TouchFrame::released(TouchPhase::End));
    assert!(matches!(
        out.dispatched.as_slice(),
        [DispatchOutcome::VoiceStarted { .. }]
    ));
}

#[test]
fn scenario_a_single_hold_opens_menu_once() {
    let mut controller = controller();
    controller.set_screen_context(ScreenContext::new("home"));

    let mut activations = Vec::new();
    activations.extend(
        controller
            .on_touch(0, &TouchFrame::one(TouchPhase::Start, p(100, 100)))
            .activations,
    );
    for now_ms in (100..=1_600).step_by(100) {
        activations.extend(controller.tick(now_ms).activations);
    }
    activations.extend(
        controller
            .on_touch(1_600, &TouchFrame::released(TouchPhase::End))
            .activations,
    );

    assert_eq!(activations.len(), 1);
    assert_eq!(activations[0].kind, GestureKind::Single);
    assert_eq!(activations[0].t_ms, 1_500);

    let platform = controller.platform();
    assert_eq!(platform.labels(), vec!["haptic", "menu_open"]);
    match &platform.calls[1] {
        PlatformCall::OpenMenu(request) => assert_eq!(request.screen.route(), "home"),
        other => panic!("unexpected call {other:?}"),
    }
}

#[test]
fn scenario_b_second_finger_at_50ms_fires_dual_only() {
    let mut controller = controller();
    let first = p(100, 100);
    let second = p(120, 100);

    let mut kinds = Vec::new();
    kinds.extend(
        controller
            .on_touch(0, &TouchFrame::one(TouchPhase::Start, first))
            .activations
            .iter()
            .map(|a| (a.kind, a.t_ms)),
    );
    kinds.extend(
        controller
            .on_touch(50, &TouchFrame::two(TouchPhase::Start, first, second))
            .activations
            .iter()
            .map(|a| (a.kind, a.t_ms)),
    );
    kinds.extend(
        controller
            .tick(1_500)
            .activations
            .iter()
            .map(|a| (a.kind, a.t_ms)),
    );
    controller.on_touch(1_700, &TouchFrame::one(TouchPhase::End, first));
    controller.on_touch(1_720, &TouchFrame::released(TouchPhase::End));

    assert_eq!(kinds, vec![(GestureKind::Dual, 1_500)]);
    assert_eq!(controller.platform().count("menu_open"), 0);
    assert_eq!(controller.platform().count("voice_open"), 1);
}

#[test]
fn scenario_c_one_finger_drifts_15px_cancels_dual() {
    let mut controller = controller();
    controller.on_touch(0, &TouchFrame::two(TouchPhase::Start, p(100, 100), p(140, 100)));
    let out = controller.on_touch(
        800,
        &TouchFrame::two(TouchPhase::Move, p(100, 100), p(155, 100)),
    );
    assert_eq!(
        out.trace.map(|t| t.reject_reason),
        Some(RejectReason::Moved)
    );

    assert!(controller.tick(2_000).activations.is_empty());
    assert!(controller.platform().calls.is_empty());
}

#[test]
fn three_fingers_cancel_even_after_dropping_back_to_two() {
    let mut controller = controller();
    let (a, b) = (p(100, 100), p(130, 100));
    controller.on_touch(0, &TouchFrame::two(TouchPhase::Start, a, b));
    controller.on_touch(200, &TouchFrame::many(TouchPhase::Start, 3, [a, b]));
    controller.on_touch(300, &TouchFrame::two(TouchPhase::End, a, b));

    assert!(controller.tick(3_000).activations.is_empty());
    assert!(controller.platform().calls.is_empty());
}

#[test]
fn voice_start_registers_listener_before_overlay_and_recognizer() {
    let mut controller = controller();
    open_voice(&mut controller);
    assert_eq!(
        controller.platform().labels(),
        vec!["haptic", "listener_attach", "voice_open", "listen_start"]
    );
}

#[test]
fn late_result_1000ms_after_close_is_delivered() {
    let mut controller = controller();
    open_voice(&mut controller);
    controller.close_voice_overlay(2_000, CloseReason::Dismissed);
    assert_eq!(
        controller.dispatcher().channel_state(),
        ChannelState::GracePending
    );

    let out = controller.on_voice_result(3_000, &VoiceResult::navigation("agenda", "agenda"));
    assert_eq!(out.voice, Some(VoiceOutcome::Navigated("agenda".into())));
    assert_eq!(
        controller.platform().calls.last(),
        Some(&PlatformCall::Navigate("agenda".into()))
    );
    assert_eq!(controller.dispatcher().channel_state(), ChannelState::Idle);
    assert_eq!(controller.next_deadline_ms(), None);
}

#[test]
fn late_result_3100ms_after_close_is_dropped() {
    let mut controller = controller();
    open_voice(&mut controller);
    controller.close_voice_overlay(2_000, CloseReason::Dismissed);

    let out = controller.on_voice_result(5_100, &VoiceResult::navigation("agenda", "agenda"));
    assert!(out.grace_expired);
    assert_eq!(out.voice, Some(VoiceOutcome::Dropped));
    assert_eq!(controller.platform().count("navigate"), 0);
    assert_eq!(controller.dispatcher().channel_state(), ChannelState::Idle);
}

#[test]
fn reopening_during_grace_reuses_the_registration() {
    let mut controller = controller();
    open_voice(&mut controller);
    controller.close_voice_overlay(2_000, CloseReason::Dismissed);

    controller.on_touch(3_000, &TouchFrame::two(TouchPhase::Start, p(100, 100), p(140, 100)));
    let out = controller.tick(4_500);
    assert!(matches!(
        out.dispatched.as_slice(),
        [DispatchOutcome::VoiceStarted { .. }]
    ));
    assert_eq!(controller.platform().count("listener_attach"), 1);

    // The first session's teardown would have fired at 5000.
    assert!(!controller.tick(10_000).grace_expired);
    assert_eq!(
        controller.dispatcher().channel_state(),
        ChannelState::Registered
    );
}

#[test]
fn failed_recognition_keeps_overlay_open_for_retry() {
    let mut controller = controller();
    open_voice(&mut controller);

    let out = controller.on_voice_result(2_500, &VoiceResult::error("no speech"));
    assert_eq!(out.voice, Some(VoiceOutcome::Retrying));
    assert!(controller.dispatcher().voice_visible());
    assert_eq!(controller.platform().count("listen_start"), 2);
    assert_eq!(controller.platform().count("listen_stop"), 1);

    let out = controller.on_voice_result(4_000, &VoiceResult::navigation("mail", "mail"));
    assert_eq!(out.voice, Some(VoiceOutcome::Navigated("mail".into())));
    assert!(!controller.dispatcher().voice_visible());
}

#[test]
fn menu_and_voice_never_open_together() {
    let mut controller = controller();
    controller.on_touch(0, &TouchFrame::one(TouchPhase::Start, p(100, 100)));
    controller.on_touch(1_600, &TouchFrame::released(TouchPhase::End));
    assert!(controller.dispatcher().menu_visible());

    controller.on_touch(2_000, &TouchFrame::two(TouchPhase::Start, p(100, 100), p(140, 100)));
    controller.tick(4_000);
    assert!(!controller.dispatcher().voice_visible());
    assert_eq!(controller.platform().count("voice_open"), 0);
}
