//! Glyph drawing for chart labels and cloud words.
//!
//! Glyph outlines come from `ttf-parser` and are filled with `tiny-skia`.
//! When no font can be found, text is drawn as one block per character so the
//! layout stays visible.

use std::path::Path;

use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

/// Average advance, in ems, assumed when no font is available.
const FALLBACK_ADVANCE: f32 = 0.6;

/// A loaded font face, or the block fallback.
#[derive(Clone)]
pub struct GlyphFont {
    face: Option<(Vec<u8>, u32)>,
}

impl GlyphFont {
    /// Load `path` if given, otherwise the system sans-serif face, otherwise
    /// any system face.
    pub fn load(path: Option<&Path>) -> Self {
        let mut db = fontdb::Database::new();
        match path {
            Some(path) => {
                if let Err(e) = db.load_font_file(path) {
                    log::warn!("Cannot load font {}: {}", path.display(), e);
                }
            },
            None => db.load_system_fonts(),
        }

        let query = fontdb::Query {
            families: &[fontdb::Family::SansSerif],
            weight: fontdb::Weight::NORMAL,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };
        let id = db.query(&query).or_else(|| db.faces().next().map(|face| face.id));
        let face = id.and_then(|id| db.with_face_data(id, |data, index| (data.to_vec(), index)));

        match &face {
            Some(_) => log::debug!("Loaded font face for rendering"),
            None => log::warn!("No usable font found; text is drawn as blocks"),
        }

        Self { face }
    }

    /// Font that always uses the block fallback.
    pub fn blocks() -> Self {
        Self { face: None }
    }

    /// True when real glyph outlines are available.
    pub fn has_face(&self) -> bool {
        self.face.is_some()
    }

    fn parsed(&self) -> Option<ttf_parser::Face<'_>> {
        let (data, index) = self.face.as_ref()?;
        ttf_parser::Face::parse(data, *index).ok()
    }

    /// Width and height of `text` at `size` pixels.
    pub fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        match self.parsed() {
            Some(face) => {
                let scale = size / f32::from(face.units_per_em());
                let width: f32 = text
                    .chars()
                    .map(|c| advance(&face, c) as f32 * scale)
                    .sum();
                (width, size)
            },
            None => (text.chars().count() as f32 * size * FALLBACK_ADVANCE, size),
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn draw(&self, pixmap: &mut Pixmap, text: &str, x: f32, y: f32, size: f32, paint: &Paint) {
        let mut builder = PathBuilder::new();

        match self.parsed() {
            Some(face) => {
                let scale = size / f32::from(face.units_per_em());
                let ascent = f32::from(face.ascender()) * scale;
                let baseline = y + ascent.min(size);
                let mut pen = x;

                for c in text.chars() {
                    if let Some(glyph) = face.glyph_index(c) {
                        let mut outline = SkiaOutline {
                            builder: &mut builder,
                            x: pen,
                            y: baseline,
                            scale,
                        };
                        face.outline_glyph(glyph, &mut outline);
                    }
                    pen += advance(&face, c) as f32 * scale;
                }
            },
            None => {
                let advance = size * FALLBACK_ADVANCE;
                for (i, c) in text.chars().enumerate() {
                    if c.is_whitespace() {
                        continue;
                    }
                    let left = x + i as f32 * advance;
                    if let Some(rect) = tiny_skia::Rect::from_xywh(
                        left,
                        y + size * 0.2,
                        advance * 0.8,
                        size * 0.7,
                    ) {
                        builder.push_rect(rect);
                    }
                }
            },
        }

        if let Some(path) = builder.finish() {
            pixmap.fill_path(&path, paint, FillRule::Winding, Transform::identity(), None);
        }
    }
}

fn advance(face: &ttf_parser::Face<'_>, c: char) -> u16 {
    face.glyph_index(c)
        .and_then(|glyph| face.glyph_hor_advance(glyph))
        .unwrap_or(face.units_per_em() / 2)
}

/// Feeds font-unit outlines into a pixel-space path, flipping the y axis.
struct SkiaOutline<'a> {
    builder: &'a mut PathBuilder,
    x: f32,
    y: f32,
    scale: f32,
}

impl SkiaOutline<'_> {
    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.x + x * self.scale, self.y - y * self.scale)
    }
}

impl ttf_parser::OutlineBuilder for SkiaOutline<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x, y) = self.point(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x2, y2) = self.point(x2, y2);
        let (x, y) = self.point(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
