use crate::config::ThemeConfig;
use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use knob::Tint;
use palette::{Srgba, WithAlpha};

pub struct ThemeColors {
    pub highlight: Srgba<f64>,
    pub lowlight: Srgba<f64>,
    pub disabled: Srgba<f64>,
    pub shadow: Srgba<f64>,
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        Self {
            highlight: Self::lookup_color(
                context,
                "theme_selected_bg_color",
                Srgba::new(0.2, 0.71, 0.9, 1.0),
                None,
            ),
            lowlight: Self::lookup_color(
                context,
                "theme_bg_color",
                Srgba::new(0.16, 0.16, 0.16, 0.6),
                Some(0.6),
            ),
            disabled: Self::lookup_color(
                context,
                "insensitive_fg_color",
                Srgba::new(0.44, 0.44, 0.44, 1.0),
                None,
            ),
            shadow: Srgba::new(0.0, 0.0, 0.0, 0.35),
        }
    }

    /// Colours set in the config file win over the GTK theme.
    pub fn with_overrides(mut self, theme: &ThemeConfig) -> Self {
        if let Some(c) = theme.highlight {
            self.highlight = c.to_srgba(self.highlight.alpha);
        }
        if let Some(c) = theme.lowlight {
            self.lowlight = c.to_srgba(self.lowlight.alpha);
        }
        if let Some(c) = theme.disabled {
            self.disabled = c.to_srgba(self.disabled.alpha);
        }
        self
    }

    pub fn tint(&self, tint: Tint) -> Srgba<f64> {
        match tint {
            Tint::Highlight => self.highlight,
            Tint::Disabled => self.disabled,
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha: Option<f64>,
    ) -> Srgba<f64> {
        let Some(rgba) = context.lookup_color(name) else {
            log::debug!("theme has no '{}', using fallback", name);
            return fallback;
        };
        let color: Srgba<f64> = Srgba::new(rgba.red(), rgba.green(), rgba.blue(), rgba.alpha())
            .into_format();
        match alpha {
            Some(a) => color.without_alpha().with_alpha(a),
            None => color,
        }
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.audiofx-knob {
    min-width: 140px;
    min-height: 140px;
}
.audiofx-status {
    font-size: smaller;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
