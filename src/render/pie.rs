//! Sentiment distribution pie chart.

use std::collections::BTreeMap;
use std::f32::consts::PI;

use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::font::GlyphFont;
use super::palette;

/// First slice starts pointing straight down and slices run counter-clockwise.
const START_ANGLE_DEG: f32 = 270.0;
const LABEL_SIZE_RATIO: f32 = 0.03;

/// One slice of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    /// Label the slice stands for
    pub label: String,
    /// Count behind it
    pub count: usize,
    /// Start angle in degrees, counter-clockwise from the positive x axis
    pub start: f32,
    /// Angular extent in degrees
    pub sweep: f32,
}

impl Slice {
    /// Share of the whole, in percent.
    pub fn percent(&self) -> f32 {
        self.sweep / 360.0 * 100.0
    }

    /// Percentage annotation, one decimal.
    pub fn annotation(&self) -> String {
        format!("{:.1}%", self.percent())
    }

    fn mid_angle(&self) -> f32 {
        (self.start + self.sweep / 2.0).to_radians()
    }
}

/// Slices in label order. Empty when every count is zero.
pub fn slices(counts: &BTreeMap<String, usize>) -> Vec<Slice> {
    let total: usize = counts.values().sum();
    if total == 0 {
        return vec![];
    }

    let mut start = START_ANGLE_DEG;
    counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(label, count)| {
            let sweep = *count as f32 / total as f32 * 360.0;
            let slice = Slice {
                label: label.clone(),
                count: *count,
                start,
                sweep,
            };
            start += sweep;
            slice
        })
        .collect()
}

/// Draw the chart onto a white square pixmap of edge `size`.
pub fn draw(pixmap: &mut Pixmap, counts: &BTreeMap<String, usize>, font: &GlyphFont) {
    pixmap.fill(Color::WHITE);

    let size = pixmap.width().min(pixmap.height()) as f32;
    let (cx, cy) = (pixmap.width() as f32 / 2.0, pixmap.height() as f32 / 2.0);
    let radius = size * 0.35;
    let text_size = (size * LABEL_SIZE_RATIO).max(10.0);

    let slices = slices(counts);

    let mut edge = Paint::default();
    edge.set_color(Color::WHITE);
    edge.anti_alias = true;
    let stroke = Stroke {
        width: 1.5,
        ..Stroke::default()
    };

    for (i, slice) in slices.iter().enumerate() {
        let Some(path) = wedge(cx, cy, radius, slice.start, slice.sweep) else {
            continue;
        };
        let mut fill = Paint::default();
        fill.set_color(palette::category(i));
        fill.anti_alias = true;
        pixmap.fill_path(&path, &fill, FillRule::Winding, Transform::identity(), None);
        if slices.len() > 1 {
            pixmap.stroke_path(&path, &edge, &stroke, Transform::identity(), None);
        }
    }

    let mut ink = Paint::default();
    ink.set_color(Color::BLACK);
    ink.anti_alias = true;

    for slice in &slices {
        let angle = slice.mid_angle();
        let (dx, dy) = (angle.cos(), -angle.sin());

        let pct = slice.annotation();
        let (w, h) = font.measure(&pct, text_size);
        let (px, py) = (cx + dx * radius * 0.6, cy + dy * radius * 0.6);
        font.draw(pixmap, &pct, px - w / 2.0, py - h / 2.0, text_size, &ink);

        let (w, h) = font.measure(&slice.label, text_size);
        let (lx, ly) = (cx + dx * radius * 1.12, cy + dy * radius * 1.12);
        let left = if dx >= 0.0 { lx } else { lx - w };
        font.draw(pixmap, &slice.label, left, ly - h / 2.0, text_size, &ink);
    }
}

/// Closed wedge from the centre, with the arc approximated by short segments.
fn wedge(cx: f32, cy: f32, radius: f32, start_deg: f32, sweep_deg: f32) -> Option<tiny_skia::Path> {
    let steps = (sweep_deg / 2.0).ceil().max(1.0) as usize;
    let mut builder = PathBuilder::new();
    let full = sweep_deg >= 359.999;

    if !full {
        builder.move_to(cx, cy);
    }
    for step in 0..=steps {
        let angle = (start_deg + sweep_deg * step as f32 / steps as f32) * PI / 180.0;
        let (x, y) = (cx + radius * angle.cos(), cy - radius * angle.sin());
        if full && step == 0 {
            builder.move_to(x, y);
        } else {
            builder.line_to(x, y);
        }
    }
    builder.close();
    builder.finish()
}
