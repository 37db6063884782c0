use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::geometry::{FitMode, NaturalSize, Size};

// =============================================================
// Helpers
// =============================================================

#[derive(Default)]
struct MockState {
    container: Option<ViewportSize>,
    surface_present: bool,
    natural: Option<NaturalSize>,
    has_hook: bool,
    hook_calls: u32,
    applied: Vec<SurfaceStyle>,
    current: Option<SurfaceStyle>,
}

#[derive(Clone, Default)]
struct MockHost(Rc<RefCell<MockState>>);

struct MockSurface(Rc<RefCell<MockState>>);

impl Host for MockHost {
    type Surface = MockSurface;

    fn container_size(&self) -> Option<ViewportSize> {
        self.0.borrow().container
    }

    fn find_surface(&self) -> Option<Self::Surface> {
        self.0.borrow().surface_present.then(|| MockSurface(Rc::clone(&self.0)))
    }

    fn invoke_library_resize(&self) -> bool {
        let mut state = self.0.borrow_mut();
        if state.has_hook {
            state.hook_calls += 1;
        }
        state.has_hook
    }
}

impl MediaSurface for MockSurface {
    fn natural_size(&self) -> Option<NaturalSize> {
        self.0.borrow().natural
    }

    fn apply_style(&self, style: &SurfaceStyle) {
        let mut state = self.0.borrow_mut();
        state.applied.push(*style);
        state.current = Some(*style);
    }
}

fn size(w: u32, h: u32) -> Size {
    Size::new(w, h).unwrap()
}

fn config() -> StabilizerConfig {
    StabilizerConfig { max_attempts: 5, confirm_passes: 2, ..StabilizerConfig::default() }
}

/// Host with a visible 390x844 container and a loaded 1280x720 feed.
fn ready_host() -> MockHost {
    let host = MockHost::default();
    {
        let mut state = host.0.borrow_mut();
        state.container = Some(size(390, 844));
        state.surface_present = true;
        state.natural = Some(size(1280, 720));
    }
    host
}

fn started(host: &MockHost, config: StabilizerConfig) -> Stabilizer<MockHost> {
    let mut s = Stabilizer::new(host.clone(), config);
    s.stabilize();
    s
}

fn run_until_settled(s: &mut Stabilizer<MockHost>) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..100 {
        if s.next_delay().is_none() {
            break;
        }
        events.extend(s.tick());
    }
    events
}

fn count_reveals(events: &[Event]) -> usize {
    events.iter().filter(|e| matches!(e, Event::OverlayRevealed { .. })).count()
}

fn count_stable(events: &[Event]) -> usize {
    events.iter().filter(|e| matches!(e, Event::Stable { .. })).count()
}

const EXPECTED: Transform = Transform { width: 1500, height: 844, left: -555, top: 0 };

// =============================================================
// Lifecycle
// =============================================================

#[test]
fn new_is_idle_until_stabilize() {
    let s = Stabilizer::new(ready_host(), config());
    assert_eq!(s.state(), StabilizationState::Pending);
    assert_eq!(s.cycle(), 0);
    assert!(s.next_delay().is_none());
}

#[test]
fn tick_before_stabilize_is_ignored() {
    let host = ready_host();
    let mut s = Stabilizer::new(host.clone(), config());
    assert!(s.tick().is_empty());
    assert!(host.0.borrow().applied.is_empty());
}

#[test]
fn stabilize_starts_first_cycle_and_polls() {
    let s = started(&ready_host(), config());
    assert_eq!(s.cycle(), 1);
    assert_eq!(s.next_delay(), Some(config().poll_interval()));
}

#[test]
fn stabilize_reads_container() {
    let s = started(&ready_host(), config());
    assert_eq!(s.container(), Some(size(390, 844)));
}

// =============================================================
// Happy path
// =============================================================

#[test]
fn first_successful_poll_applies_and_enters_retrying() {
    let host = ready_host();
    let mut s = started(&host, config());
    let events = s.tick();
    assert_eq!(s.state(), StabilizationState::Retrying);
    assert!(events.contains(&Event::TransformApplied {
        style: SurfaceStyle::new(FitMode::Cover, EXPECTED),
        pass: 0,
    }));
    assert!(events.contains(&Event::StateChanged {
        from: StabilizationState::Pending,
        to: StabilizationState::Retrying,
    }));
    assert_eq!(s.next_delay(), Some(config().confirm_interval()));
}

#[test]
fn confirmation_window_reapplies_then_stabilizes() {
    let host = ready_host();
    let mut s = started(&host, config());
    s.tick();
    let second = s.tick();
    assert_eq!(s.state(), StabilizationState::Retrying);
    assert_eq!(count_stable(&second), 0);

    let third = s.tick();
    assert_eq!(s.state(), StabilizationState::Stable);
    assert!(third.contains(&Event::Stable { cycle: 1, transform: EXPECTED }));
    assert_eq!(host.0.borrow().applied.len(), 3);
}

#[test]
fn stable_stops_polling() {
    let host = ready_host();
    let mut s = started(&host, config());
    run_until_settled(&mut s);
    assert_eq!(s.state(), StabilizationState::Stable);
    assert!(s.next_delay().is_none());
    assert!(s.tick().is_empty());
    assert_eq!(host.0.borrow().applied.len(), 3);
}

#[test]
fn stable_reveals_overlay_once() {
    let mut s = started(&ready_host(), config());
    let events = run_until_settled(&mut s);
    assert_eq!(count_reveals(&events), 1);
    assert!(events.contains(&Event::OverlayRevealed { reason: RevealReason::Stable }));
    assert!(s.overlay_revealed());
}

#[test]
fn zero_confirm_passes_goes_straight_to_stable() {
    let host = ready_host();
    let mut s = started(&host, StabilizerConfig { confirm_passes: 0, ..config() });
    let events = s.tick();
    assert_eq!(s.state(), StabilizationState::Stable);
    assert_eq!(count_stable(&events), 1);
    assert_eq!(host.0.borrow().applied.len(), 1);
}

#[test]
fn confirmation_passes_are_numbered() {
    let mut s = started(&ready_host(), config());
    let events = run_until_settled(&mut s);
    let passes: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            Event::TransformApplied { pass, .. } => Some(*pass),
            _ => None,
        })
        .collect();
    assert_eq!(passes, vec![0, 1, 2]);
}

#[test]
fn repeated_apply_is_idempotent() {
    let host = ready_host();
    let mut s = started(&host, config());
    run_until_settled(&mut s);
    let state = host.0.borrow();
    assert!(state.applied.iter().all(|style| *style == state.applied[0]));
    assert_eq!(state.current, Some(SurfaceStyle::new(FitMode::Cover, EXPECTED)));
    assert_eq!(s.last_style(), state.current);
}

#[test]
fn contain_fit_mode_is_honored() {
    let host = ready_host();
    let mut s = started(&host, StabilizerConfig { fit_mode: FitMode::Contain, ..config() });
    run_until_settled(&mut s);
    let current = host.0.borrow().current.unwrap();
    assert_eq!(current.fit, FitMode::Contain);
    assert_eq!(current.transform, Transform { width: 390, height: 219, left: 0, top: 313 });
}

#[test]
fn library_hook_invoked_before_each_apply() {
    let host = ready_host();
    host.0.borrow_mut().has_hook = true;
    let mut s = started(&host, config());
    run_until_settled(&mut s);
    assert_eq!(host.0.borrow().hook_calls, 3);
    assert_eq!(s.state(), StabilizationState::Stable);
}

// =============================================================
// Waiting
// =============================================================

#[test]
fn missing_surface_stays_pending() {
    let host = ready_host();
    host.0.borrow_mut().surface_present = false;
    let mut s = started(&host, config());
    s.tick();
    assert_eq!(s.state(), StabilizationState::Pending);
    assert_eq!(s.attempts(), 1);
    assert!(host.0.borrow().applied.is_empty());
}

#[test]
fn missing_metadata_stays_pending() {
    let host = ready_host();
    host.0.borrow_mut().natural = None;
    let mut s = started(&host, config());
    s.tick();
    assert_eq!(s.state(), StabilizationState::Pending);
    assert!(host.0.borrow().applied.is_empty());
}

#[test]
fn hidden_container_skips_computation() {
    let host = ready_host();
    host.0.borrow_mut().container = None;
    let mut s = started(&host, config());
    s.tick();
    s.tick();
    assert_eq!(s.state(), StabilizationState::Pending);
    assert!(host.0.borrow().applied.is_empty());
    assert!(s.last_style().is_none());
}

#[test]
fn surface_appearing_late_still_stabilizes() {
    let host = ready_host();
    host.0.borrow_mut().surface_present = false;
    let mut s = started(&host, config());
    s.tick();
    s.tick();
    host.0.borrow_mut().surface_present = true;
    let events = run_until_settled(&mut s);
    assert_eq!(s.state(), StabilizationState::Stable);
    assert_eq!(count_stable(&events), 1);
}

#[test]
fn surface_lost_during_confirmation_returns_to_pending() {
    let host = ready_host();
    let mut s = started(&host, config());
    s.tick();
    host.0.borrow_mut().surface_present = false;
    let events = s.tick();
    assert_eq!(s.state(), StabilizationState::Pending);
    assert!(events.contains(&Event::StateChanged {
        from: StabilizationState::Retrying,
        to: StabilizationState::Pending,
    }));
    assert_eq!(s.next_delay(), Some(config().poll_interval()));
}

#[test]
fn container_collapse_during_confirmation_keeps_attempt_budget() {
    let host = ready_host();
    let mut s = started(&host, StabilizerConfig { max_attempts: 2, ..config() });
    s.tick();
    assert_eq!(s.state(), StabilizationState::Retrying);

    host.0.borrow_mut().container = None;
    let events = s.tick();
    assert_eq!(
        events,
        vec![Event::StateChanged { from: StabilizationState::Retrying, to: StabilizationState::Pending }]
    );
    assert_eq!(s.attempts(), 1);

    let events = s.tick();
    assert_eq!(
        events,
        vec![
            Event::StateChanged { from: StabilizationState::Pending, to: StabilizationState::Aborted },
            Event::Aborted { cycle: 1, attempts: 2 },
            Event::OverlayRevealed { reason: RevealReason::Fallback },
        ]
    );
    assert_eq!(host.0.borrow().applied.len(), 1);
}

// =============================================================
// Abort fallback
// =============================================================

#[test]
fn surface_never_appearing_aborts_after_max_attempts() {
    let host = ready_host();
    host.0.borrow_mut().surface_present = false;
    let mut s = started(&host, config());
    let events = run_until_settled(&mut s);
    assert_eq!(s.state(), StabilizationState::Aborted);
    assert_eq!(s.attempts(), 5);
    assert!(events.contains(&Event::Aborted { cycle: 1, attempts: 5 }));
    assert!(s.next_delay().is_none());
}

#[test]
fn abort_reveals_overlay_exactly_once() {
    let host = ready_host();
    host.0.borrow_mut().surface_present = false;
    let mut s = started(&host, config());
    let mut events = run_until_settled(&mut s);
    assert_eq!(count_reveals(&events), 1);
    assert!(events.contains(&Event::OverlayRevealed { reason: RevealReason::Fallback }));

    // A later cycle that also aborts must not reveal again.
    events = s.on_resize();
    events.extend(run_until_settled(&mut s));
    assert_eq!(s.state(), StabilizationState::Aborted);
    assert_eq!(count_reveals(&events), 0);
}

#[test]
fn abort_without_reveal_keeps_overlay_hidden() {
    let host = ready_host();
    host.0.borrow_mut().surface_present = false;
    let mut s = started(&host, StabilizerConfig { reveal_on_abort: false, ..config() });
    let events = run_until_settled(&mut s);
    assert_eq!(s.state(), StabilizationState::Aborted);
    assert_eq!(count_reveals(&events), 0);
    assert!(!s.overlay_revealed());
}

#[test]
fn abort_is_not_terminal_across_resize() {
    let host = ready_host();
    host.0.borrow_mut().surface_present = false;
    let mut s = started(&host, config());
    run_until_settled(&mut s);
    assert_eq!(s.state(), StabilizationState::Aborted);

    host.0.borrow_mut().surface_present = true;
    let mut events = s.on_resize();
    assert_eq!(s.state(), StabilizationState::Pending);
    assert_eq!(s.cycle(), 2);
    assert_eq!(s.attempts(), 0);
    events.extend(run_until_settled(&mut s));
    assert_eq!(s.state(), StabilizationState::Stable);
    assert!(events.contains(&Event::Stable { cycle: 2, transform: EXPECTED }));
    // Already revealed by the fallback.
    assert_eq!(count_reveals(&events), 0);
}

// =============================================================
// Resize
// =============================================================

#[test]
fn resize_while_stable_restarts_cycle() {
    let host = ready_host();
    let mut s = started(&host, config());
    run_until_settled(&mut s);

    host.0.borrow_mut().container = Some(size(844, 390));
    let events = s.on_resize();
    assert_eq!(s.state(), StabilizationState::Pending);
    assert_eq!(s.container(), Some(size(844, 390)));
    assert!(events.contains(&Event::StateChanged {
        from: StabilizationState::Stable,
        to: StabilizationState::Pending,
    }));

    let events = run_until_settled(&mut s);
    assert_eq!(count_stable(&events), 1);
    assert_eq!(count_reveals(&events), 0);
    let current = host.0.borrow().current.unwrap();
    // 1280x720 into 844x390: scale = max(0.659, 0.5417)
    assert_eq!(current.transform.width, 844);
    assert_eq!(current.transform.height, 475);
    assert_eq!(current.transform.top, -43);
}

#[test]
fn resize_while_retrying_resets_confirmation() {
    let host = ready_host();
    let mut s = started(&host, config());
    s.tick();
    assert_eq!(s.state(), StabilizationState::Retrying);
    s.on_resize();
    assert_eq!(s.state(), StabilizationState::Pending);
    assert_eq!(s.next_delay(), Some(config().poll_interval()));
    let events = run_until_settled(&mut s);
    assert_eq!(count_stable(&events), 1);
}

#[test]
fn resize_while_pending_resets_attempts() {
    let host = ready_host();
    host.0.borrow_mut().surface_present = false;
    let mut s = started(&host, config());
    s.tick();
    s.tick();
    assert_eq!(s.attempts(), 2);
    let events = s.on_resize();
    assert_eq!(s.attempts(), 0);
    assert_eq!(s.cycle(), 2);
    assert!(events.is_empty());
}

// =============================================================
// Wait display
// =============================================================

#[test]
fn wait_display_names_missing_piece() {
    assert_eq!(Wait::Container.to_string(), "visible container");
    assert_eq!(Wait::Surface.to_string(), "media surface");
    assert_eq!(Wait::Metadata.to_string(), "media metadata");
}
