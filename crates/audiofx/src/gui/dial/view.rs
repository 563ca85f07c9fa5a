use super::{ARC_WIDTH, BODY_INSET, FONT_FACE, SHADOW_OFFSET};
use crate::gui::theme::ThemeColors;
use cairo::Context;
use gdk_pixbuf::Pixbuf;
use gdk4::prelude::*;
use knob::{ArcSpan, Knob, KnobFrame, KnobGeometry};
use palette::Srgba;
use std::f64::consts::PI;

struct KnobRenderer<'a> {
    frame: KnobFrame<'a>,
    geometry: &'a KnobGeometry,
    colors: &'a ThemeColors,
}

impl<'a> KnobRenderer<'a> {
    fn new(knob: &'a Knob, colors: &'a ThemeColors) -> Self {
        Self {
            frame: knob.frame(),
            geometry: knob.geometry(),
            colors,
        }
    }

    fn draw(&self, cr: &Context, foreground: Option<&Pixbuf>) -> Result<(), cairo::Error> {
        self.draw_body(cr, foreground)?;
        if let Some(arc) = &self.frame.arc {
            self.draw_arc(cr, arc)?;
        }
        self.draw_indicator(cr)?;
        self.draw_text(cr)
    }

    fn body_radius(&self) -> f64 {
        self.geometry.arc_rect.width / 2.0 * (1.0 - BODY_INSET)
    }

    fn draw_body(&self, cr: &Context, foreground: Option<&Pixbuf>) -> Result<(), cairo::Error> {
        let radius = self.body_radius();
        if radius <= 0.0 {
            return Ok(());
        }
        let center = self.geometry.center;

        if let Some(pixbuf) = foreground {
            // fit image into the body disc
            let scale = radius * 2.0 / pixbuf.width().max(pixbuf.height()).max(1) as f64;
            let (iw, ih) = (
                pixbuf.width() as f64 * scale,
                pixbuf.height() as f64 * scale,
            );

            cr.save()?;
            cr.translate(center.x - iw / 2.0, center.y - ih / 2.0);
            cr.scale(scale, scale);
            cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
            cr.paint()?;
            return cr.restore();
        }

        set_source(cr, self.colors.lowlight);
        cr.new_path();
        cr.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
        cr.fill()
    }

    fn draw_arc(&self, cr: &Context, arc: &ArcSpan) -> Result<(), cairo::Error> {
        let radius = arc.rect.width / 2.0;
        if radius <= 0.0 || arc.sweep_degrees <= 0.0 {
            return Ok(());
        }
        let center = arc.rect.center();
        let start = arc.start_degrees.to_radians();
        let end = (arc.start_degrees + arc.sweep_degrees).to_radians();

        cr.save()?;
        cr.set_line_width(ARC_WIDTH);
        cr.set_line_cap(cairo::LineCap::Butt);

        // drop shadow
        cr.translate(SHADOW_OFFSET.0, SHADOW_OFFSET.1);
        set_source(cr, self.colors.shadow);
        cr.new_path();
        cr.arc(center.x, center.y, radius, start, end);
        cr.stroke()?;
        cr.translate(-SHADOW_OFFSET.0, -SHADOW_OFFSET.1);

        set_source(cr, self.colors.tint(self.frame.tint));
        cr.new_path();
        cr.arc(center.x, center.y, radius, start, end);
        cr.stroke()?;
        cr.restore()
    }

    fn draw_indicator(&self, cr: &Context) -> Result<(), cairo::Error> {
        let rect = self.frame.indicator;
        if rect.width <= 0.0 {
            return Ok(());
        }
        let center = rect.center();
        set_source(cr, self.colors.tint(self.frame.tint));
        cr.new_path();
        cr.arc(center.x, center.y, rect.width / 2.0, 0.0, 2.0 * PI);
        cr.fill()
    }

    fn draw_text(&self, cr: &Context) -> Result<(), cairo::Error> {
        let t = &self.geometry.typography;
        let top = self.geometry.center.y - self.geometry.size / 2.0;

        set_source(cr, self.colors.tint(self.frame.tint));

        let value_baseline = top + t.value_padding + t.value_size;
        self.show_centered(
            cr,
            self.frame.value_text,
            t.value_size,
            cairo::FontWeight::Bold,
            value_baseline,
            None,
        )?;

        let label_baseline = value_baseline + t.label_padding + t.label_size;
        self.show_centered(
            cr,
            self.frame.label,
            t.label_size,
            cairo::FontWeight::Normal,
            label_baseline,
            Some(t.label_width),
        )
    }

    fn show_centered(
        &self,
        cr: &Context,
        text: &str,
        size: f64,
        weight: cairo::FontWeight,
        baseline: f64,
        max_width: Option<f64>,
    ) -> Result<(), cairo::Error> {
        if text.is_empty() || size <= 0.0 {
            return Ok(());
        }
        cr.select_font_face(FONT_FACE, cairo::FontSlant::Normal, weight);
        cr.set_font_size(size);

        let mut ext = cr.text_extents(text)?;
        // shrink labels that do not fit their column
        if let Some(max) = max_width
            && max > 0.0
            && ext.width() > max
        {
            cr.set_font_size(size * max / ext.width());
            ext = cr.text_extents(text)?;
        }

        cr.move_to(
            self.geometry.center.x - ext.width() / 2.0 - ext.x_bearing(),
            baseline,
        );
        cr.show_text(text)
    }
}

fn set_source(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

pub fn draw(
    cr: &Context,
    knob: &Knob,
    colors: &ThemeColors,
    foreground: Option<&Pixbuf>,
) -> Result<(), cairo::Error> {
    KnobRenderer::new(knob, colors).draw(cr, foreground)
}
