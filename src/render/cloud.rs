//! Word clouds.
//!
//! Words are counted case-insensitively, common English stop words are
//! dropped, and the most frequent words are placed along a spiral from the
//! centre, largest first, shrinking a word until it fits or giving up on it.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use tiny_skia::{Color, Paint, Pixmap};

use super::font::GlyphFont;
use super::palette;

/// Most words placed in one cloud.
pub const MAX_WORDS: usize = 100;
/// Font size of the most frequent word.
pub const MAX_FONT_SIZE: f32 = 50.0;
/// Words are not shrunk below this size.
pub const MIN_FONT_SIZE: f32 = 8.0;
const TITLE_SIZE: f32 = 14.0;
const TITLE_BAND: f32 = 24.0;
const SPIRAL_STEPS: usize = 4000;

lazy_static! {
    /// A letter followed by letters, digits, apostrophes or hyphens
    static ref WORD: Regex = Regex::new(r"\p{L}[\p{L}\p{N}'-]*").unwrap();
}

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "else",
    "ever", "few", "for", "from", "further", "get", "had", "has", "have", "having", "he", "her",
    "here", "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in", "into",
    "is", "it", "its", "itself", "just", "like", "may", "me", "more", "most", "my", "myself",
    "no", "nor", "not", "of", "off", "on", "once", "only", "or", "other", "otherwise", "ought",
    "our", "ours", "ourselves", "out", "over", "own", "same", "shall", "she", "should", "since",
    "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "therefore", "these", "they", "this", "those", "through", "to", "too", "under",
    "until", "up", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who",
    "whom", "why", "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

/// Word frequencies over `texts`, most frequent first, ties in first-seen order.
pub fn word_frequencies(texts: &[String]) -> Vec<(String, usize)> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();

    for text in texts {
        for m in WORD.find_iter(text) {
            let mut word = m.as_str().to_lowercase();
            if let Some(stem) = word.strip_suffix("'s") {
                word = stem.to_string();
            }
            let word = word.trim_matches(|c| c == '\'' || c == '-').to_string();
            if word.chars().count() < 2 || STOP_WORDS.contains(&word.as_str()) {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    let mut words: Vec<(String, usize)> = counts.into_iter().collect();
    words.sort_by(|a, b| b.1.cmp(&a.1));
    words.truncate(MAX_WORDS);
    words
}

/// A word with its box in pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    /// The word
    pub word: String,
    /// Font size in pixels
    pub size: f32,
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Box width
    pub width: f32,
    /// Box height
    pub height: f32,
}

impl PlacedWord {
    fn overlaps(&self, x: f32, y: f32, w: f32, h: f32) -> bool {
        x < self.x + self.width && self.x < x + w && y < self.y + self.height && self.y < y + h
    }
}

/// Lay out `words` inside a `width` x `height` area without overlaps.
///
/// `measure` returns the box of a word at a font size.
pub fn layout<F>(words: &[(String, usize)], width: f32, height: f32, measure: F) -> Vec<PlacedWord>
where
    F: Fn(&str, f32) -> (f32, f32),
{
    let Some(max_count) = words.first().map(|(_, c)| *c as f32) else {
        return vec![];
    };

    let (cx, cy) = (width / 2.0, height / 2.0);
    let aspect = height / width.max(1.0);
    let mut placed: Vec<PlacedWord> = Vec::new();

    for (word, count) in words {
        let ratio = *count as f32 / max_count;
        let mut size = (MAX_FONT_SIZE * (0.5 + 0.5 * ratio)).max(MIN_FONT_SIZE);

        while size >= MIN_FONT_SIZE {
            let (w, h) = measure(word, size);
            if let Some((x, y)) = find_spot(&placed, cx, cy, aspect, w, h, width, height) {
                placed.push(PlacedWord {
                    word: word.clone(),
                    size,
                    x,
                    y,
                    width: w,
                    height: h,
                });
                break;
            }
            size -= 2.0;
        }
    }

    placed
}

fn find_spot(
    placed: &[PlacedWord],
    cx: f32,
    cy: f32,
    aspect: f32,
    w: f32,
    h: f32,
    width: f32,
    height: f32,
) -> Option<(f32, f32)> {
    if w > width || h > height {
        return None;
    }

    for step in 0..SPIRAL_STEPS {
        let t = step as f32 * 0.1;
        let x = cx + t * t.cos() * 2.0 - w / 2.0;
        let y = cy + t * t.sin() * 2.0 * aspect - h / 2.0;

        if x < 0.0 || y < 0.0 || x + w > width || y + h > height {
            continue;
        }
        if placed.iter().all(|p| !p.overlaps(x, y, w, h)) {
            return Some((x, y));
        }
    }
    None
}

/// Draw a titled cloud of `texts`. Returns false when there were no words and
/// only the title was drawn.
pub fn draw(pixmap: &mut Pixmap, title: &str, texts: &[String], font: &GlyphFont) -> bool {
    pixmap.fill(Color::WHITE);

    let mut ink = Paint::default();
    ink.set_color(Color::BLACK);
    ink.anti_alias = true;

    let width = pixmap.width() as f32;
    let (title_w, _) = font.measure(title, TITLE_SIZE);
    font.draw(pixmap, title, (width - title_w).max(0.0) / 2.0, 4.0, TITLE_SIZE, &ink);

    let words = word_frequencies(texts);
    if words.is_empty() {
        return false;
    }

    let area_height = (pixmap.height() as f32 - TITLE_BAND).max(1.0);
    let placed = layout(&words, width, area_height, |word, size| font.measure(word, size));
    log::debug!("Word cloud '{}': placed {} of {} word(s)", title, placed.len(), words.len());

    for (i, word) in placed.iter().enumerate() {
        let mut paint = Paint::default();
        paint.set_color(palette::sequential(i, placed.len()));
        paint.anti_alias = true;
        font.draw(pixmap, &word.word, word.x, word.y + TITLE_BAND, word.size, &paint);
    }

    true
}
