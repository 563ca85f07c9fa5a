use crate::angle;
use crate::geometry::{KnobGeometry, Point, Rect};
use crate::interpolation::{DEFAULT_DURATION, Easing, Interpolation};
use crate::listener::{KnobId, KnobListener};
use std::fmt;
use std::time::Duration;
use strum::Display as StrumDisplay;

pub const DEFAULT_MAX: i32 = 100;
pub const ARC_START_DEGREES: f64 = -90.0; // 12 o'clock, with 0 at 3 o'clock
const HIDDEN_TEXT: &str = "--%";

/// Which palette entry the label, readout and arc use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum Tint {
    Highlight,
    Disabled,
}

/// What the host has to do after a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerResponse {
    /// The knob changed and must be repainted.
    pub redraw: bool,
    /// Keep the pointer sequence; ancestors must not intercept it.
    pub claim: bool,
    /// An on/off run started; frame ticks are needed until it finishes.
    pub animate: bool,
}

impl PointerResponse {
    pub fn new(redraw: bool, claim: bool, animate: bool) -> Self {
        Self {
            redraw,
            claim,
            animate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No run in flight.
    Idle,
    Running,
    /// The run ended on this tick.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct DragState {
    last: Point,
    moved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSpan {
    pub rect: Rect,
    pub start_degrees: f64,
    pub sweep_degrees: f64,
}

/// Everything a painter needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct KnobFrame<'a> {
    pub label: &'a str,
    pub value_text: &'a str,
    pub tint: Tint,
    pub indicator: Rect,
    pub arc: Option<ArcSpan>,
}

/// A rotary on/off knob.
///
/// `progress` is what is drawn; `original_progress` is the setting the knob
/// returns to when switched back on. While the knob is off and idle,
/// `progress` stays at 0.
pub struct Knob {
    id: KnobId,
    label: String,
    progress: f64,
    original_progress: f64,
    max: i32,
    on: bool,
    enabled: bool,
    progress_text: String,
    animation: Option<Interpolation>,
    duration: Duration,
    easing: Easing,
    drag: DragState,
    indicator_size: Option<f64>,
    geometry: KnobGeometry,
    listener: Option<Box<dyn KnobListener>>,
}

impl fmt::Debug for Knob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Knob")
            .field("id", &self.id)
            .field("progress", &self.progress)
            .field("original_progress", &self.original_progress)
            .field("max", &self.max)
            .field("on", &self.on)
            .field("enabled", &self.enabled)
            .field("animating", &self.animation.is_some())
            .finish_non_exhaustive()
    }
}

impl Knob {
    pub fn new(id: KnobId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            progress: 0.0,
            original_progress: 0.0,
            max: DEFAULT_MAX,
            on: false,
            enabled: false,
            progress_text: HIDDEN_TEXT.to_string(),
            animation: None,
            duration: DEFAULT_DURATION,
            easing: Easing::default(),
            drag: DragState::default(),
            indicator_size: None,
            geometry: KnobGeometry::default(),
            listener: None,
        }
    }

    pub fn with_animation(mut self, duration: Duration, easing: Easing) -> Self {
        self.duration = duration;
        self.easing = easing;
        self
    }

    /// Replaces the listener, dropping the previous one.
    pub fn set_listener(&mut self, listener: impl KnobListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn id(&self) -> &KnobId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn original_progress(&self) -> f64 {
        self.original_progress
    }

    /// Integer value of the current progress on the `[0, max]` scale.
    pub fn value(&self) -> i32 {
        (self.progress * f64::from(self.max)).round() as i32
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn progress_text(&self) -> &str {
        &self.progress_text
    }

    pub fn tint(&self) -> Tint {
        if self.enabled {
            Tint::Highlight
        } else {
            Tint::Disabled
        }
    }

    pub fn geometry(&self) -> &KnobGeometry {
        &self.geometry
    }

    /// Sets the integer value; ignored while `max` is 0.
    pub fn set_value(&mut self, value: i32) {
        if self.max == 0 {
            return;
        }
        self.original_progress = (f64::from(value) / f64::from(self.max)).clamp(0.0, 1.0);
        self.set_progress(self.original_progress, false);
    }

    pub fn set_progress(&mut self, progress: f64, from_user: bool) {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        self.progress = progress;
        self.update_progress_text(self.enabled && self.on, progress);
        self.notify_value(from_user);
    }

    /// Changes the integer scale. The stored progress is left as is.
    pub fn set_max(&mut self, max: i32) {
        self.max = max;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        log::debug!("knob '{}' tint {}", self.id, self.tint());

        if enabled {
            self.set_on(self.on, false);
        }
    }

    /// Switches the knob on or off, optionally through an interpolation run.
    ///
    /// Any run in flight is cancelled first, without its completion callback.
    /// Without animation the final state and `on_animation_finished` are
    /// applied right away.
    pub fn set_on(&mut self, on: bool, animate: bool) {
        self.on = on;
        self.cancel_animation();
        self.original_progress = self.original_progress.clamp(0.0, 1.0);

        let target = if on { self.original_progress } else { 0.0 };

        if animate {
            log::debug!(
                "knob '{}' animating {:.3} -> {:.3}",
                self.id,
                self.progress,
                target
            );
            self.animation = Some(Interpolation::new(
                self.progress,
                target,
                self.duration,
                self.easing,
            ));
        } else {
            self.update_progress_text(self.enabled && on, self.original_progress);
            self.progress = target;
            self.notify_finished(on);
        }
    }

    /// Drops the run in flight, if any. No callback fires.
    pub fn cancel_animation(&mut self) -> bool {
        let cancelled = self.animation.take().is_some();
        if cancelled {
            log::debug!("knob '{}' animation cancelled", self.id);
        }
        cancelled
    }

    /// Feeds one frame to the run in flight.
    pub fn advance(&mut self, dt: Duration) -> TickOutcome {
        let Some(run) = self.animation.as_mut() else {
            return TickOutcome::Idle;
        };

        let step = run.advance(dt);
        let value = step.value().clamp(0.0, 1.0);

        self.progress = value;
        self.notify_value(true);
        self.update_progress_text(true, value);

        if !step.is_finished() {
            return TickOutcome::Running;
        }

        self.animation = None;
        self.update_progress_text(self.on && self.enabled, self.original_progress);
        log::debug!("knob '{}' settled {}", self.id, if self.on { "on" } else { "off" });
        self.notify_finished(self.on);
        TickOutcome::Finished
    }

    /// Size-changed event from the host layout.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.geometry = KnobGeometry::new(width, height, self.indicator_size);
    }

    /// Fixes the indicator diameter in pixels; `None` scales it with the knob.
    pub fn set_indicator_size(&mut self, size: Option<f64>) {
        self.indicator_size = size;
        self.geometry = KnobGeometry::new(self.geometry.width, self.geometry.height, size);
    }

    pub fn pointer_down(&mut self, point: Point) -> PointerResponse {
        if !self.on {
            return PointerResponse::default();
        }
        self.drag.last = point;
        PointerResponse::new(false, true, false)
    }

    pub fn pointer_move(&mut self, point: Point) -> PointerResponse {
        if !self.on {
            return PointerResponse::default();
        }

        // once a gesture left the deadzone it keeps dragging, even back inside
        let dragging = self.drag.moved || !self.geometry.in_deadzone(point);

        if dragging {
            let delta = angle::delta(self.geometry.center, self.drag.last, point);
            self.original_progress = (self.progress + delta / 360.0).clamp(0.0, 1.0);
            self.set_progress(self.original_progress, true);
            self.drag.moved = true;
        }
        self.drag.last = point;

        PointerResponse::new(dragging, dragging, false)
    }

    /// Ends the gesture. A gesture that never dragged is a tap and asks the
    /// listener whether the knob may switch.
    pub fn pointer_up(&mut self) -> PointerResponse {
        let mut response = PointerResponse::default();

        if !self.drag.moved {
            let proposed = !self.on;
            let approved = self
                .listener
                .as_mut()
                .is_none_or(|l| l.on_switch_changed(&self.id, proposed));

            if approved && self.enabled {
                self.set_on(proposed, true);
                response = PointerResponse::new(true, false, true);
            }
        }

        self.drag.moved = false;
        response
    }

    pub fn frame(&self) -> KnobFrame<'_> {
        KnobFrame {
            label: &self.label,
            value_text: &self.progress_text,
            tint: self.tint(),
            indicator: self.geometry.indicator_rect(self.progress),
            arc: self.enabled.then(|| ArcSpan {
                rect: self.geometry.arc_rect,
                start_degrees: ARC_START_DEGREES,
                sweep_degrees: self.progress * 360.0,
            }),
        }
    }

    fn update_progress_text(&mut self, show: bool, progress: f64) {
        self.progress_text = if show {
            format!("{}%", (progress * 100.0).round() as i32)
        } else {
            HIDDEN_TEXT.to_string()
        };
    }

    fn notify_value(&mut self, from_user: bool) {
        let value = self.value();
        if let Some(listener) = self.listener.as_mut() {
            listener.on_value_changed(&self.id, value, from_user);
        }
    }

    fn notify_finished(&mut self, on: bool) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_animation_finished(&self.id, on);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Event {
        Value(i32, bool),
        Switch(bool),
        Finished(bool),
    }

    struct Recorder {
        events: Rc<RefCell<Vec<Event>>>,
        approve: bool,
    }

    impl KnobListener for Recorder {
        fn on_value_changed(&mut self, _knob: &KnobId, value: i32, from_user: bool) {
            self.events.borrow_mut().push(Event::Value(value, from_user));
        }

        fn on_switch_changed(&mut self, _knob: &KnobId, on: bool) -> bool {
            self.events.borrow_mut().push(Event::Switch(on));
            self.approve
        }

        fn on_animation_finished(&mut self, _knob: &KnobId, on: bool) {
            self.events.borrow_mut().push(Event::Finished(on));
        }
    }

    fn recorded(approve: bool) -> (Knob, Rc<RefCell<Vec<Event>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut knob = Knob::new(KnobId::new("bass"), "Bass")
            .with_animation(Duration::from_millis(500), Easing::Linear);
        knob.resize(200.0, 200.0);
        knob.set_listener(Recorder {
            events: events.clone(),
            approve,
        });
        (knob, events)
    }

    /// Enabled, switched on at `value`, events cleared.
    fn on_at(value: i32) -> (Knob, Rc<RefCell<Vec<Event>>>) {
        let (mut knob, events) = recorded(true);
        knob.set_enabled(true);
        knob.set_value(value);
        knob.set_on(true, false);
        events.borrow_mut().clear();
        (knob, events)
    }

    // `degrees` clockwise from the top, `r` pixels from the center
    fn polar(degrees: f64, r: f64) -> Point {
        let theta = degrees.to_radians();
        Point::new(100.0 + r * theta.sin(), 100.0 - r * theta.cos())
    }

    fn at(degrees: f64) -> Point {
        polar(degrees, 80.0)
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_set_progress_clamps() {
        let (mut knob, events) = recorded(true);
        for (input, stored) in [(-0.5, 0.0), (1.7, 1.0), (0.3, 0.3), (f64::NAN, 0.0)] {
            knob.set_progress(input, false);
            assert_eq!(knob.progress(), stored);
        }
        assert_eq!(
            *events.borrow(),
            vec![
                Event::Value(0, false),
                Event::Value(100, false),
                Event::Value(30, false),
                Event::Value(0, false),
            ]
        );
    }

    #[test]
    fn test_set_value_clamps_to_full_scale() {
        let (mut knob, events) = recorded(true);
        knob.set_value(150);
        assert_eq!(knob.progress(), 1.0);
        assert_eq!(knob.original_progress(), 1.0);
        assert_eq!(knob.value(), 100);
        assert_eq!(*events.borrow(), vec![Event::Value(100, false)]);

        knob.set_value(-20);
        assert_eq!(knob.progress(), 0.0);
    }

    #[test]
    fn test_set_value_rounds_on_other_scales() {
        let (mut knob, _) = recorded(true);
        knob.set_max(1000);
        knob.set_value(573);
        assert_eq!(knob.value(), 573);
        knob.set_max(100);
        assert_close(knob.progress(), 0.573);
        assert_eq!(knob.value(), 57);
    }

    #[test]
    fn test_zero_max_ignores_set_value() {
        let (mut knob, events) = recorded(true);
        knob.set_value(40);
        knob.set_max(0);
        knob.set_value(80);
        assert_close(knob.progress(), 0.4);
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn test_progress_text() {
        let (mut knob, _) = recorded(true);
        knob.set_value(42);
        assert_eq!(knob.progress_text(), "--%");

        knob.set_enabled(true);
        knob.set_on(true, false);
        assert_eq!(knob.progress_text(), "42%");

        knob.set_progress(0.5, false);
        assert_eq!(knob.progress_text(), "50%");

        knob.set_on(false, false);
        assert_eq!(knob.progress_text(), "--%");
        assert_eq!(knob.progress(), 0.0);
    }

    #[test]
    fn test_set_on_without_animation_is_synchronous() {
        let (mut knob, events) = recorded(true);
        knob.set_enabled(true);
        knob.set_value(60);
        events.borrow_mut().clear();

        knob.set_on(true, false);
        assert!(!knob.is_animating());
        assert_close(knob.progress(), 0.6);
        assert_eq!(*events.borrow(), vec![Event::Finished(true)]);
    }

    #[test]
    fn test_animated_switch_on() {
        let (mut knob, events) = on_at(50);
        knob.set_on(false, false);
        events.borrow_mut().clear();

        knob.set_on(true, true);
        assert!(knob.is_animating());
        assert_eq!(knob.progress(), 0.0);

        assert_eq!(knob.advance(Duration::from_millis(250)), TickOutcome::Running);
        assert_close(knob.progress(), 0.25);
        assert_eq!(knob.progress_text(), "25%");

        assert_eq!(knob.advance(Duration::from_millis(250)), TickOutcome::Finished);
        assert_close(knob.progress(), 0.5);
        assert_eq!(knob.progress_text(), "50%");
        assert!(!knob.is_animating());
        assert_eq!(knob.advance(Duration::from_millis(16)), TickOutcome::Idle);

        assert_eq!(
            *events.borrow(),
            vec![
                Event::Value(25, true),
                Event::Value(50, true),
                Event::Finished(true),
            ]
        );
    }

    #[test]
    fn test_new_run_cancels_old_one_silently() {
        let (mut knob, events) = on_at(80);
        knob.set_on(false, false);
        events.borrow_mut().clear();

        knob.set_on(true, true);
        knob.advance(Duration::from_millis(250));
        assert_close(knob.progress(), 0.4);

        knob.set_on(false, true);
        assert!(!events.borrow().contains(&Event::Finished(true)));

        knob.advance(Duration::from_millis(250));
        assert_close(knob.progress(), 0.2);
        assert_eq!(knob.advance(Duration::from_millis(250)), TickOutcome::Finished);
        assert_eq!(knob.progress(), 0.0);
        assert_eq!(knob.progress_text(), "--%");

        let finished: Vec<_> = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Finished(_)))
            .copied()
            .collect();
        assert_eq!(finished, vec![Event::Finished(false)]);
        // the original setting survives the off transition
        assert_close(knob.original_progress(), 0.8);
    }

    #[test]
    fn test_cancel_animation_on_teardown() {
        let (mut knob, events) = on_at(30);
        knob.set_on(false, true);
        assert!(knob.cancel_animation());
        assert!(!knob.cancel_animation());
        assert_eq!(knob.advance(Duration::from_millis(500)), TickOutcome::Idle);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_tap_requests_switch_only() {
        let (mut knob, events) = recorded(true);
        knob.set_enabled(true);
        events.borrow_mut().clear();

        assert_eq!(knob.pointer_down(Point::new(100.0, 100.0)), PointerResponse::default());
        let response = knob.pointer_up();
        assert!(response.animate);
        assert!(knob.is_on());
        assert!(knob.is_animating());
        assert_eq!(*events.borrow(), vec![Event::Switch(true)]);
    }

    #[test]
    fn test_tap_inside_deadzone_while_on() {
        let (mut knob, events) = on_at(40);

        knob.pointer_down(Point::new(100.0, 100.0));
        let response = knob.pointer_move(Point::new(110.0, 95.0));
        assert!(!response.redraw);
        knob.pointer_up();

        assert_eq!(*events.borrow(), vec![Event::Switch(false)]);
        assert!(!knob.is_on());
    }

    #[test]
    fn test_vetoed_tap_keeps_state() {
        let (mut knob, events) = recorded(false);
        knob.set_enabled(true);
        events.borrow_mut().clear();

        let response = knob.pointer_up();
        assert_eq!(response, PointerResponse::default());
        assert!(!knob.is_on());
        assert!(!knob.is_animating());
        assert_eq!(*events.borrow(), vec![Event::Switch(true)]);
    }

    #[test]
    fn test_disabled_tap_is_asked_but_ignored() {
        let (mut knob, events) = recorded(true);
        knob.pointer_up();
        assert!(!knob.is_on());
        assert_eq!(*events.borrow(), vec![Event::Switch(true)]);
    }

    #[test]
    fn test_tap_without_listener_switches() {
        let mut knob = Knob::new(KnobId::new("treble"), "Treble");
        knob.resize(200.0, 200.0);
        knob.set_enabled(true);
        knob.pointer_up();
        assert!(knob.is_on());
    }

    #[test]
    fn test_drag_changes_value_without_switching() {
        let (mut knob, events) = on_at(25);

        let down = knob.pointer_down(Point::new(100.0, 10.0));
        assert!(down.claim);
        let response = knob.pointer_move(Point::new(190.0, 100.0));
        assert!(response.redraw);
        assert_close(knob.progress(), 0.5);
        assert_close(knob.original_progress(), 0.5);
        assert_eq!(knob.pointer_up(), PointerResponse::default());

        assert_eq!(*events.borrow(), vec![Event::Value(50, true)]);
        assert!(knob.is_on());
    }

    #[test]
    fn test_drag_is_ignored_while_off() {
        let (mut knob, events) = on_at(25);
        knob.set_on(false, false);
        events.borrow_mut().clear();

        knob.pointer_down(at(0.0));
        assert_eq!(knob.pointer_move(at(90.0)), PointerResponse::default());
        assert_eq!(knob.progress(), 0.0);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_drag_stays_sticky_inside_deadzone() {
        let (mut knob, _) = on_at(10);

        knob.pointer_down(at(0.0));
        knob.pointer_move(at(36.0));
        assert_close(knob.progress(), 0.2);

        // back inside the deadzone, a quarter turn further round
        knob.pointer_move(polar(126.0, 10.0));
        assert_close(knob.progress(), 0.45);
        knob.pointer_up();
        assert!(knob.is_on());

        // a fresh gesture starts from the deadzone again
        knob.pointer_down(Point::new(100.0, 95.0));
        knob.pointer_move(Point::new(105.0, 100.0));
        assert_close(knob.progress(), 0.45);
    }

    #[test]
    fn test_drag_clockwise_over_seam_stops_at_full() {
        let (mut knob, _) = on_at(90);

        knob.pointer_down(at(324.0));
        knob.pointer_move(at(20.0));
        assert_close(knob.progress(), 1.0);
        knob.pointer_move(at(40.0));
        assert_eq!(knob.progress(), 1.0);
        assert_eq!(knob.value(), 100);
    }

    #[test]
    fn test_drag_counter_clockwise_over_seam_stops_at_zero() {
        let (mut knob, _) = on_at(10);

        knob.pointer_down(at(36.0));
        knob.pointer_move(at(340.0));
        assert_close(knob.progress(), 0.0);
        knob.pointer_move(at(300.0));
        assert_eq!(knob.progress(), 0.0);
    }

    #[test]
    fn test_enable_reapplies_original_progress() {
        let (mut knob, events) = on_at(70);
        knob.set_enabled(false);
        knob.set_progress(0.1, false);
        events.borrow_mut().clear();

        knob.set_enabled(true);
        assert!(!knob.is_animating());
        assert_close(knob.progress(), 0.7);
        assert_close(knob.original_progress(), 0.7);
        assert_eq!(knob.progress_text(), "70%");
        assert_eq!(*events.borrow(), vec![Event::Finished(true)]);
    }

    #[test]
    fn test_frame_reflects_state() {
        let (mut knob, _) = on_at(25);
        let frame = knob.frame();
        assert_eq!(frame.tint, Tint::Highlight);
        assert_eq!(frame.value_text, "25%");
        assert_eq!(frame.label, "Bass");
        let arc = frame.arc.expect("enabled knob draws its arc");
        assert_eq!(arc.start_degrees, -90.0);
        assert_close(arc.sweep_degrees, 90.0);

        knob.set_enabled(false);
        let frame = knob.frame();
        assert_eq!(frame.tint, Tint::Disabled);
        assert!(frame.arc.is_none());
        // the indicator keeps its position while disabled
        assert_close(frame.indicator.center().x, 176.0);
    }

    #[test]
    fn test_fixed_indicator_size_survives_resize() {
        let (mut knob, _) = on_at(25);
        assert_close(knob.frame().indicator.width, 24.0);

        knob.set_indicator_size(Some(16.0));
        knob.resize(300.0, 200.0);
        let indicator = knob.frame().indicator;
        assert_close(indicator.width, 16.0);
        assert_close(indicator.center().x, 226.0);
        assert_close(indicator.center().y, 100.0);

        knob.set_indicator_size(None);
        assert_close(knob.frame().indicator.width, 24.0);
    }
}
