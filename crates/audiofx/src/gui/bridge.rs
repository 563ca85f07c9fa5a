use crate::gui::app::AppMsg;
use knob::{KnobId, KnobListener};
use relm4::Sender;

/// Forwards knob notifications into the app's message queue.
///
/// Messages are queued, never handled inline, so the app can touch any knob
/// again once the current callback returns.
pub struct KnobBridge {
    sender: Sender<AppMsg>,
    locked: bool,
}

impl KnobBridge {
    pub fn new(sender: Sender<AppMsg>, locked: bool) -> Self {
        Self { sender, locked }
    }
}

impl KnobListener for KnobBridge {
    fn on_value_changed(&mut self, knob: &KnobId, value: i32, from_user: bool) {
        self.sender
            .emit(AppMsg::ValueChanged(knob.clone(), value, from_user));
    }

    fn on_switch_changed(&mut self, knob: &KnobId, on: bool) -> bool {
        if self.locked {
            log::debug!("refusing to switch locked knob '{}'", knob);
            self.sender.emit(AppMsg::SwitchRefused(knob.clone()));
            return false;
        }
        log::debug!("switching knob '{}' {}", knob, if on { "on" } else { "off" });
        true
    }

    fn on_animation_finished(&mut self, knob: &KnobId, on: bool) {
        self.sender.emit(AppMsg::Switched(knob.clone(), on));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(bridge: KnobBridge, rx: relm4::Receiver<AppMsg>) -> Vec<AppMsg> {
        drop(bridge);
        std::iter::from_fn(|| rx.recv_sync()).collect()
    }

    #[test]
    fn test_locked_knob_refuses_switch() {
        let (tx, rx) = relm4::channel::<AppMsg>();
        let mut bridge = KnobBridge::new(tx, true);
        let id = KnobId::from("bass");

        assert!(!bridge.on_switch_changed(&id, false));

        let queued = drain(bridge, rx);
        assert_eq!(queued.len(), 1);
        assert!(matches!(&queued[0], AppMsg::SwitchRefused(refused) if *refused == id));
    }

    #[test]
    fn test_unlocked_knob_allows_switch() {
        let (tx, rx) = relm4::channel::<AppMsg>();
        let mut bridge = KnobBridge::new(tx, false);

        assert!(bridge.on_switch_changed(&KnobId::from("treble"), true));
        assert!(drain(bridge, rx).is_empty());
    }

    #[test]
    fn test_callbacks_are_queued_in_order() {
        let (tx, rx) = relm4::channel::<AppMsg>();
        let mut bridge = KnobBridge::new(tx, false);
        let id = KnobId::from("virtualizer");

        bridge.on_value_changed(&id, 40, true);
        bridge.on_animation_finished(&id, false);

        let queued = drain(bridge, rx);
        assert!(matches!(&queued[..], [
            AppMsg::ValueChanged(_, 40, true),
            AppMsg::Switched(_, false),
        ]));
    }
}
