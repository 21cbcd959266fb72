#![allow(missing_docs)]
//! Host-level tests for the button state machine.

use std::sync::atomic::{AtomicU32, Ordering};

use input_envoy::Error;
use input_envoy::button::{Button, ButtonAction, ButtonConfig};
use input_envoy::debounce::DebounceChannelStatic;
use input_envoy::pin::{Level, PressedTo, Pull};
use input_envoy::sim::{SimPin, SimTicks};

const MASK: u32 = 1 << 2;

/// Active-low button, 20 tick debounce, 500 tick long press.
const ACTIVE_LOW: ButtonConfig = ButtonConfig {
    debounce_window: 20,
    ..ButtonConfig::new(PressedTo::Ground)
};

fn new_button<'a>(
    button_static: &'a DebounceChannelStatic,
    pin: &SimPin,
    ticks: &'a SimTicks,
    config: ButtonConfig,
) -> Button<'a, SimPin, &'a SimTicks> {
    Button::new(button_static, pin.clone(), ticks, config).expect("valid button")
}

/// Steps the tick counter over `ticks_range`, driving the line to each scripted level at
/// its tick (as the edge interrupt would see it) and polling the button once per tick.
fn run(
    button: &mut Button<'_, SimPin, &SimTicks>,
    button_static: &DebounceChannelStatic,
    pin: &SimPin,
    ticks: &SimTicks,
    ticks_range: std::ops::Range<u32>,
    edges: &[(u32, Level)],
) -> Vec<(u32, ButtonAction)> {
    ticks_range
        .filter_map(|now| {
            ticks.set(now);
            for &(at, level) in edges {
                if at == now {
                    edge(button_static, pin, now, level);
                }
            }
            button.process().map(|action| (now, action))
        })
        .collect()
}

fn edge(button_static: &DebounceChannelStatic, pin: &SimPin, now: u32, level: Level) {
    pin.set_level(level);
    button_static.notify(now, MASK);
}

#[test]
fn press_long_press_then_suppressed_release() {
    let button_static = DebounceChannelStatic::new(MASK);
    let pin = SimPin::new(Level::High);
    let ticks = SimTicks::new(0);
    let mut button = new_button(&button_static, &pin, &ticks, ACTIVE_LOW);

    edge(&button_static, &pin, 100, Level::Low);
    ticks.set(125);
    assert_eq!(button.process(), Some(ButtonAction::Press));
    assert!(button.is_pressed());

    ticks.set(625);
    assert_eq!(button.process(), Some(ButtonAction::LongPress));

    edge(&button_static, &pin, 630, Level::High);
    ticks.set(655);
    assert_eq!(button.process(), None);
    assert!(!button.is_pressed());
    assert!(!button.pending_timeout());
}

#[test]
fn long_press_fires_once_per_hold() {
    let button_static = DebounceChannelStatic::new(MASK);
    let pin = SimPin::new(Level::High);
    let ticks = SimTicks::new(0);
    let mut button = new_button(&button_static, &pin, &ticks, ACTIVE_LOW);

    let actions = run(
        &mut button,
        &button_static,
        &pin,
        &ticks,
        100..5_000,
        &[(100, Level::Low)],
    );
    assert_eq!(
        actions,
        vec![(120, ButtonAction::Press), (620, ButtonAction::LongPress)]
    );

    // The next hold gets its own long press.
    let actions = run(
        &mut button,
        &button_static,
        &pin,
        &ticks,
        5_000..6_000,
        &[(5_000, Level::High), (5_100, Level::Low)],
    );
    assert_eq!(
        actions,
        vec![(5_120, ButtonAction::Press), (5_620, ButtonAction::LongPress)]
    );
}

#[test]
fn consecutive_long_presses_repeat_every_window() {
    let button_static = DebounceChannelStatic::new(MASK);
    let pin = SimPin::new(Level::High);
    let ticks = SimTicks::new(0);
    let config = ButtonConfig {
        allow_consecutive_long_presses: true,
        ..ACTIVE_LOW
    };
    let mut button = new_button(&button_static, &pin, &ticks, config);

    let actions = run(
        &mut button,
        &button_static,
        &pin,
        &ticks,
        100..1_700,
        &[(100, Level::Low)],
    );
    assert_eq!(
        actions,
        vec![
            (120, ButtonAction::Press),
            (620, ButtonAction::LongPress),
            (1_120, ButtonAction::LongPress),
            (1_620, ButtonAction::LongPress),
        ]
    );
}

#[test]
fn release_after_long_press_reported_when_not_suppressed() {
    let button_static = DebounceChannelStatic::new(MASK);
    let pin = SimPin::new(Level::High);
    let ticks = SimTicks::new(0);
    let config = ButtonConfig {
        suppress_release_after_long_press: false,
        ..ACTIVE_LOW
    };
    let mut button = new_button(&button_static, &pin, &ticks, config);

    edge(&button_static, &pin, 100, Level::Low);
    ticks.set(125);
    assert_eq!(button.process(), Some(ButtonAction::Press));
    ticks.set(625);
    assert_eq!(button.process(), Some(ButtonAction::LongPress));
    edge(&button_static, &pin, 630, Level::High);
    ticks.set(655);
    assert_eq!(button.process(), Some(ButtonAction::Release));
}

#[test]
fn short_press_reports_release_and_no_long_press() {
    let button_static = DebounceChannelStatic::new(MASK);
    let pin = SimPin::new(Level::High);
    let ticks = SimTicks::new(0);
    let mut button = new_button(&button_static, &pin, &ticks, ACTIVE_LOW);

    let actions = run(
        &mut button,
        &button_static,
        &pin,
        &ticks,
        100..2_000,
        &[(100, Level::Low), (300, Level::High)],
    );
    assert_eq!(
        actions,
        vec![(120, ButtonAction::Press), (320, ButtonAction::Release)]
    );
}

#[test]
fn suppression_does_not_leak_into_next_short_press() {
    let button_static = DebounceChannelStatic::new(MASK);
    let pin = SimPin::new(Level::High);
    let ticks = SimTicks::new(0);
    let mut button = new_button(&button_static, &pin, &ticks, ACTIVE_LOW);

    let actions = run(
        &mut button,
        &button_static,
        &pin,
        &ticks,
        100..1_500,
        &[
            (100, Level::Low),
            (700, Level::High),
            (1_000, Level::Low),
            (1_100, Level::High),
        ],
    );
    assert_eq!(
        actions,
        vec![
            (120, ButtonAction::Press),
            (620, ButtonAction::LongPress),
            (1_020, ButtonAction::Press),
            (1_120, ButtonAction::Release),
        ]
    );
}

#[test]
fn long_press_is_timed_from_latest_press() {
    let button_static = DebounceChannelStatic::new(MASK);
    let pin = SimPin::new(Level::High);
    let ticks = SimTicks::new(0);
    let mut button = new_button(&button_static, &pin, &ticks, ACTIVE_LOW);

    // A short press long ago must not shorten the next hold.
    let actions = run(
        &mut button,
        &button_static,
        &pin,
        &ticks,
        100..1_200,
        &[(100, Level::Low), (200, Level::High), (600, Level::Low)],
    );
    assert_eq!(
        actions,
        vec![
            (120, ButtonAction::Press),
            (220, ButtonAction::Release),
            (620, ButtonAction::Press),
            (1_120, ButtonAction::LongPress),
        ]
    );
}

#[test]
fn long_press_waits_for_pending_release() {
    let button_static = DebounceChannelStatic::new(MASK);
    let pin = SimPin::new(Level::High);
    let ticks = SimTicks::new(0);
    let mut button = new_button(&button_static, &pin, &ticks, ACTIVE_LOW);

    edge(&button_static, &pin, 100, Level::Low);
    ticks.set(120);
    assert_eq!(button.process(), Some(ButtonAction::Press));

    // Released just before the threshold; the release is still settling at 620.
    edge(&button_static, &pin, 610, Level::High);
    ticks.set(620);
    assert_eq!(button.process(), None);
    ticks.set(630);
    assert_eq!(button.process(), Some(ButtonAction::Release));
}

#[test]
fn long_press_spans_counter_wraparound() {
    let button_static = DebounceChannelStatic::new(MASK);
    let pin = SimPin::new(Level::High);
    let start = u32::MAX - 200;
    let ticks = SimTicks::new(start);
    let mut button = new_button(&button_static, &pin, &ticks, ACTIVE_LOW);

    edge(&button_static, &pin, start, Level::Low);
    ticks.set(start.wrapping_add(20));
    assert_eq!(button.process(), Some(ButtonAction::Press));
    ticks.set(start.wrapping_add(519));
    assert_eq!(button.process(), None);
    ticks.set(start.wrapping_add(520));
    assert_eq!(button.process(), Some(ButtonAction::LongPress));
}

#[test]
fn press_at_tick_zero_is_still_debounced() {
    let button_static = DebounceChannelStatic::new(MASK);
    let pin = SimPin::new(Level::High);
    let ticks = SimTicks::new(0);
    let mut button = new_button(&button_static, &pin, &ticks, ACTIVE_LOW);

    edge(&button_static, &pin, 0, Level::Low);
    assert_eq!(button.process(), None);
    assert!(!button.is_pressed());

    let actions = run(&mut button, &button_static, &pin, &ticks, 0..100, &[]);
    assert_eq!(actions, vec![(19, ButtonAction::Press)]);
}

#[test]
fn active_high_button_is_symmetric() {
    let button_static = DebounceChannelStatic::new(MASK);
    let pin = SimPin::new(Level::Low);
    let ticks = SimTicks::new(0);
    let config = ButtonConfig {
        debounce_window: 20,
        ..ButtonConfig::new(PressedTo::Voltage)
    };
    let mut button = new_button(&button_static, &pin, &ticks, config);
    button.begin().expect("sim pin setup");
    assert_eq!(pin.pull(), Some(Pull::Down));

    let actions = run(
        &mut button,
        &button_static,
        &pin,
        &ticks,
        100..400,
        &[(100, Level::High), (300, Level::Low)],
    );
    assert_eq!(
        actions,
        vec![(120, ButtonAction::Press), (320, ButtonAction::Release)]
    );
}

#[test]
fn long_press_tracking_can_be_disabled() {
    let button_static = DebounceChannelStatic::new(MASK);
    let pin = SimPin::new(Level::High);
    let ticks = SimTicks::new(0);
    let config = ButtonConfig {
        long_press_window: None,
        ..ACTIVE_LOW
    };
    let mut button = new_button(&button_static, &pin, &ticks, config);

    let actions = run(
        &mut button,
        &button_static,
        &pin,
        &ticks,
        100..3_000,
        &[(100, Level::Low)],
    );
    assert_eq!(actions, vec![(120, ButtonAction::Press)]);
    assert!(button.is_pressed());
    assert!(!button.pending_timeout());
}

#[test]
fn pending_timeout_covers_debounce_and_hold() {
    let button_static = DebounceChannelStatic::new(MASK);
    let pin = SimPin::new(Level::High);
    let ticks = SimTicks::new(0);
    let mut button = new_button(&button_static, &pin, &ticks, ACTIVE_LOW);
    assert!(!button.pending_timeout());

    edge(&button_static, &pin, 100, Level::Low);
    assert!(button.pending_timeout());
    ticks.set(120);
    assert_eq!(button.process(), Some(ButtonAction::Press));
    assert!(button.pending_timeout(), "held: a long press may still be due");

    edge(&button_static, &pin, 200, Level::High);
    ticks.set(220);
    assert_eq!(button.process(), Some(ButtonAction::Release));
    assert!(!button.pending_timeout());
}

#[test]
fn callbacks_run_once_per_action() {
    static PRESSES: AtomicU32 = AtomicU32::new(0);
    static LONG_PRESSES: AtomicU32 = AtomicU32::new(0);
    static RELEASES: AtomicU32 = AtomicU32::new(0);
    fn on_press() {
        PRESSES.fetch_add(1, Ordering::Relaxed);
    }
    fn on_long_press() {
        LONG_PRESSES.fetch_add(1, Ordering::Relaxed);
    }
    fn on_release() {
        RELEASES.fetch_add(1, Ordering::Relaxed);
    }

    let button_static = DebounceChannelStatic::new(MASK);
    let pin = SimPin::new(Level::High);
    let ticks = SimTicks::new(0);
    let mut button = new_button(&button_static, &pin, &ticks, ACTIVE_LOW);
    button.set_on_press(Some(on_press));
    button.set_on_long_press(Some(on_long_press));
    button.set_on_release(Some(on_release));

    run(
        &mut button,
        &button_static,
        &pin,
        &ticks,
        100..1_500,
        &[
            (100, Level::Low),
            (700, Level::High),
            (1_000, Level::Low),
            (1_100, Level::High),
        ],
    );

    assert_eq!(PRESSES.load(Ordering::Relaxed), 2);
    assert_eq!(LONG_PRESSES.load(Ordering::Relaxed), 1);
    assert_eq!(RELEASES.load(Ordering::Relaxed), 1);

    button.set_on_press(None);
    run(
        &mut button,
        &button_static,
        &pin,
        &ticks,
        2_000..2_100,
        &[(2_000, Level::Low)],
    );
    assert_eq!(PRESSES.load(Ordering::Relaxed), 2);
}

#[test]
fn zero_long_press_window_is_rejected() {
    let button_static = DebounceChannelStatic::new(MASK);
    let config = ButtonConfig {
        long_press_window: Some(0),
        ..ACTIVE_LOW
    };
    let ticks = SimTicks::new(0);
    let result = Button::new(&button_static, SimPin::new(Level::High), &ticks, config);
    assert!(matches!(result, Err(Error::ZeroLongPressWindow)));
}
