use crate::config::{self, Config, KnobConfig};
use crate::events::AppEvent;
use crate::gui::bridge::KnobBridge;
use crate::gui::dial::KnobWidget;
use crate::gui::theme;
use gtk::prelude::*;
use gtk4 as gtk;
use knob::{Knob, KnobId};
use relm4::prelude::*;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

pub struct AppModel {
    pub config: Config,
    pub config_path: PathBuf,
    pub enabled: bool,
    pub status: String,
    pub knobs: Vec<KnobWidget>,
    pub knob_box: gtk::Box,
}

#[derive(Debug)]
pub enum AppMsg {
    SetEnabled(bool),
    ValueChanged(KnobId, i32, bool),
    Switched(KnobId, bool),
    SwitchRefused(KnobId),
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (Config, PathBuf, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        gtk::ApplicationWindow {
            set_title: Some("AudioFX"),
            set_default_width: 640,
            set_default_height: 300,

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_spacing: 12,
                set_margin_all: 12,

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_spacing: 8,

                    gtk::Label {
                        set_label: "Effects",
                        set_hexpand: true,
                        set_xalign: 0.0,
                    },

                    gtk::Switch {
                        set_active: model.enabled,
                        connect_state_set[sender] => move |_, state| {
                            sender.input(AppMsg::SetEnabled(state));
                            glib::Propagation::Proceed
                        }
                    }
                },

                #[name = "knob_box"]
                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_spacing: 12,
                    set_homogeneous: true,
                    set_vexpand: true,
                },

                gtk::Label {
                    #[watch]
                    set_label: &model.status,
                    set_xalign: 0.0,
                    add_css_class: "audiofx-status",
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (config, config_path, rx) = init;

        theme::load_css();

        let model = AppModel {
            enabled: config.enabled,
            config,
            config_path,
            status: String::new(),
            knobs: Vec::new(),
            knob_box: gtk::Box::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.knob_box = widgets.knob_box.clone();
        model.rebuild_knobs(&sender);

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            AppMsg::SetEnabled(enabled) => {
                if self.enabled == enabled {
                    return;
                }
                self.enabled = enabled;
                for widget in &self.knobs {
                    widget.set_enabled(enabled);
                }
                self.status = format!("Effects {}", if enabled { "on" } else { "off" });
            }
            AppMsg::ValueChanged(id, value, from_user) => {
                log::debug!("knob '{}' value {} (user: {})", id, value, from_user);
                if from_user {
                    self.status = format!("{}: {}", self.label_of(&id), value);
                }
            }
            AppMsg::Switched(id, on) => {
                log::debug!("knob '{}' is {}", id, if on { "on" } else { "off" });
            }
            AppMsg::SwitchRefused(id) => {
                self.status = format!("{} is locked", self.label_of(&id));
            }
            AppMsg::ConfigReload => match config::load_config(&self.config_path) {
                Ok(new_config) => {
                    self.config = new_config;
                    self.rebuild_knobs(&sender);
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}

impl AppModel {
    fn build_knob(&self, cfg: &KnobConfig) -> Knob {
        let mut knob = Knob::new(cfg.id.clone(), cfg.label.clone()).with_animation(
            Duration::from_millis(self.config.animation_ms),
            self.config.easing,
        );
        knob.set_indicator_size(self.config.theme.indicator_size);
        knob.set_max(cfg.max);
        knob.set_value(cfg.value);
        knob.set_on(cfg.on, false);
        knob.set_enabled(self.enabled);
        knob
    }

    /// Replaces every knob on screen with a fresh one built from the config.
    fn rebuild_knobs(&mut self, sender: &ComponentSender<Self>) {
        while let Some(child) = self.knob_box.first_child() {
            self.knob_box.remove(&child);
        }

        let theme = Rc::new(self.config.theme.clone());
        let knobs = self
            .config
            .knobs
            .iter()
            .map(|cfg| {
                let widget = KnobWidget::new(
                    self.build_knob(cfg),
                    KnobBridge::new(sender.input_sender().clone(), cfg.locked),
                    theme.clone(),
                    cfg.foreground.as_deref(),
                );
                self.knob_box.append(widget.area());
                widget
            })
            .collect();
        self.knobs = knobs;
    }

    fn label_of<'a>(&'a self, id: &'a KnobId) -> &'a str {
        self.config
            .knobs
            .iter()
            .find(|k| &k.id == id)
            .map(|k| k.label.as_str())
            .unwrap_or(id.as_str())
    }
}
