use super::FOREGROUND_SIZE;
use crate::config::ThemeConfig;
use crate::gui::theme::ThemeColors;
use gdk_pixbuf::Pixbuf;
use gtk::prelude::*;
use gtk4 as gtk;
use knob::{Knob, KnobListener, Point, TickOutcome};
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

/// Frame-clock subscription of one knob. Present only while a run is in flight.
#[derive(Default)]
struct Ticker {
    id: RefCell<Option<gtk::TickCallbackId>>,
    last_frame: Cell<Option<i64>>,
}

/// A [`Knob`] hosted in a `gtk::DrawingArea`.
///
/// The area forwards resizes, drag gestures and frame ticks to the knob and
/// repaints it through [`super::draw`].
pub struct KnobWidget {
    area: gtk::DrawingArea,
    knob: Rc<RefCell<Knob>>,
    ticker: Rc<Ticker>,
}

impl KnobWidget {
    pub fn new(
        mut knob: Knob,
        listener: impl KnobListener + 'static,
        theme: Rc<ThemeConfig>,
        foreground: Option<&Path>,
    ) -> Self {
        knob.set_listener(listener);

        let area = gtk::DrawingArea::builder()
            .hexpand(true)
            .vexpand(true)
            .build();
        area.add_css_class("audiofx-knob");

        let widget = Self {
            area,
            knob: Rc::new(RefCell::new(knob)),
            ticker: Rc::default(),
        };

        widget.connect_draw(theme, foreground.and_then(load_foreground));
        widget.connect_resize();
        widget.connect_gestures();
        widget.connect_teardown();
        widget
    }

    pub fn area(&self) -> &gtk::DrawingArea {
        &self.area
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.knob.borrow_mut().set_enabled(enabled);
        self.area.queue_draw();
    }

    fn connect_draw(&self, theme: Rc<ThemeConfig>, foreground: Option<Pixbuf>) {
        let knob = self.knob.clone();
        self.area.set_draw_func(move |area, cr, _, _| {
            let style_context = area.style_context();
            let colors = ThemeColors::from_context(&style_context).with_overrides(&theme);
            if let Err(e) = super::draw(cr, &knob.borrow(), &colors, foreground.as_ref()) {
                log::error!("Drawing error: {}", e);
            }
        });
    }

    fn connect_resize(&self) {
        let knob = self.knob.clone();
        self.area.connect_resize(move |area, width, height| {
            knob.borrow_mut().resize(width as f64, height as f64);
            area.queue_draw();
        });
    }

    fn connect_gestures(&self) {
        let drag = gtk::GestureDrag::new();

        {
            let knob = self.knob.clone();
            drag.connect_drag_begin(move |gesture, x, y| {
                let response = knob.borrow_mut().pointer_down(Point::new(x, y));
                if response.claim {
                    gesture.set_state(gtk::EventSequenceState::Claimed);
                }
            });
        }

        {
            let knob = self.knob.clone();
            let area = self.area.clone();
            drag.connect_drag_update(move |gesture, dx, dy| {
                let Some((x, y)) = gesture.start_point() else {
                    return;
                };
                let response = knob.borrow_mut().pointer_move(Point::new(x + dx, y + dy));
                if response.claim {
                    gesture.set_state(gtk::EventSequenceState::Claimed);
                }
                if response.redraw {
                    area.queue_draw();
                }
            });
        }

        {
            let knob = self.knob.clone();
            let area = self.area.clone();
            let ticker = self.ticker.clone();
            drag.connect_drag_end(move |_, _, _| {
                let response = knob.borrow_mut().pointer_up();
                if response.animate {
                    start_ticking(&area, &knob, &ticker);
                }
                if response.redraw {
                    area.queue_draw();
                }
            });
        }

        self.area.add_controller(drag);
    }

    // a run must never tick into a knob that left the window
    fn connect_teardown(&self) {
        let knob = self.knob.clone();
        let ticker = self.ticker.clone();
        self.area.connect_unrealize(move |_| {
            if let Some(id) = ticker.id.borrow_mut().take() {
                id.remove();
            }
            knob.borrow_mut().cancel_animation();
        });
    }
}

fn start_ticking(area: &gtk::DrawingArea, knob: &Rc<RefCell<Knob>>, ticker: &Rc<Ticker>) {
    if ticker.id.borrow().is_some() {
        return;
    }
    // the run starts at the current frame, so the first tick already moves it
    ticker
        .last_frame
        .set(area.frame_clock().map(|clock| clock.frame_time()));

    let knob = knob.clone();
    let state = ticker.clone();
    let id = area.add_tick_callback(move |area, clock| {
        let now = clock.frame_time();
        let dt = frame_delta(state.last_frame.replace(Some(now)), now);

        let outcome = knob.borrow_mut().advance(dt);
        area.queue_draw();

        match outcome {
            TickOutcome::Running => glib::ControlFlow::Continue,
            TickOutcome::Finished | TickOutcome::Idle => {
                state.id.borrow_mut().take();
                glib::ControlFlow::Break
            }
        }
    });
    *ticker.id.borrow_mut() = Some(id);
}

/// Time since the previous frame. Without one, or when the clock went
/// backwards, the tick does not advance.
fn frame_delta(previous: Option<i64>, now: i64) -> Duration {
    previous
        .and_then(|prev| u64::try_from(now.saturating_sub(prev)).ok())
        .map(Duration::from_micros)
        .unwrap_or_default()
}

fn load_foreground(path: &Path) -> Option<Pixbuf> {
    Pixbuf::from_file_at_scale(path, FOREGROUND_SIZE, FOREGROUND_SIZE, true)
        .map_err(|e| log::error!("Failed to load knob image {}: {}", path.display(), e))
        .ok()
}
