//! Text wrapping, block layout and glyph rasterization.
//!
//! Layout works in template pixels against a [`TextMeasure`], so it can be
//! tested without fonts. Rasterization happens per line at device
//! resolution with fontdue.

use fontdue::Font;
use stayframe_core::{Rect, Rgba, TextAlign};
use tiny_skia::{ColorU8, Pixmap};

/// Total horizontal padding inside a text box (half on each side).
pub const TEXT_PADDING: f32 = 20.0;

/// Measures the advance width of a run of text in template pixels.
pub trait TextMeasure {
    /// Width of `text` including letter spacing.
    fn measure(&self, text: &str) -> f32;
}

/// Measurement against a real font face.
#[derive(Clone, Copy)]
pub struct GlyphMeasure<'a> {
    font: &'a Font,
    font_size: f32,
    letter_spacing: f32,
}

impl<'a> GlyphMeasure<'a> {
    /// Measure with `font` at `font_size` template pixels.
    #[must_use]
    pub fn new(font: &'a Font, font_size: f32, letter_spacing: f32) -> Self {
        Self {
            font,
            font_size,
            letter_spacing,
        }
    }

    /// Pen position of every character, followed by the total advance.
    fn pen_positions(&self, text: &str) -> (Vec<(char, f32)>, f32) {
        let mut pen = 0.0;
        let mut prev: Option<char> = None;
        let mut out = Vec::with_capacity(text.len());
        for ch in text.chars() {
            if let Some(left) = prev {
                pen += self
                    .font
                    .horizontal_kern(left, ch, self.font_size)
                    .unwrap_or(0.0);
            }
            out.push((ch, pen));
            pen += self.font.metrics(ch, self.font_size).advance_width + self.letter_spacing;
            prev = Some(ch);
        }
        (out, pen)
    }
}

impl TextMeasure for GlyphMeasure<'_> {
    fn measure(&self, text: &str) -> f32 {
        self.pen_positions(text).1
    }
}

/// Greedy word wrap.
///
/// Explicit newlines always break. Within a paragraph words are added to the
/// current line while it fits in `max_width`; a word that does not fit on
/// an empty line gets a line of its own. Empty paragraphs are kept as blank
/// lines.
#[must_use]
pub fn wrap_lines(text: &str, max_width: f32, measure: &dyn TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measure.measure(&candidate) > max_width {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }
    lines
}

/// One positioned line of a text block.
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    /// Line text.
    pub text: String,
    /// Left edge of the line in template pixels.
    pub x: f32,
    /// Vertical middle of the line in template pixels.
    pub center_y: f32,
    /// Measured width.
    pub width: f32,
}

/// A wrapped, aligned and vertically centered text block.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    /// Lines top to bottom.
    pub lines: Vec<LineLayout>,
    /// Line advance in template pixels.
    pub line_height: f32,
}

impl TextLayout {
    /// Total block height.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn block_height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }
}

/// Lay out `text` inside `rect`.
///
/// Lines wrap to `rect.width - TEXT_PADDING`; the block is centered
/// vertically and each line is placed horizontally according to `align`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn layout_text(
    text: &str,
    rect: Rect,
    align: TextAlign,
    font_size: f32,
    line_height: f32,
    measure: &dyn TextMeasure,
) -> TextLayout {
    let max_width = (rect.width - TEXT_PADDING).max(0.0);
    let line_px = font_size * line_height;
    let wrapped = wrap_lines(text, max_width, measure);
    let block = wrapped.len() as f32 * line_px;
    let top = rect.y + rect.height / 2.0 - block / 2.0;
    let inset = TEXT_PADDING / 2.0;

    let lines = wrapped
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let width = measure.measure(&text);
            let x = match align {
                TextAlign::Left => rect.x + inset,
                TextAlign::Center => rect.x + (rect.width - width) / 2.0,
                TextAlign::Right => rect.right() - inset - width,
            };
            LineLayout {
                text,
                x,
                center_y: top + (i as f32 + 0.5) * line_px,
                width,
            }
        })
        .collect();

    TextLayout {
        lines,
        line_height: line_px,
    }
}

/// A rasterized line of text.
#[derive(Debug, Clone)]
pub struct RasterLine {
    /// Glyph coverage tinted with the text color.
    pub pixmap: Pixmap,
    /// Distance in device pixels from the pixmap's left edge to the pen
    /// origin.
    pub origin_x: f32,
    /// Distance in device pixels from the pixmap's top edge to the middle
    /// of the em box.
    pub middle_y: f32,
}

/// Rasterize one line with `font`.
///
/// `font_size` and `letter_spacing` are in template pixels and `scale` is
/// the device pixels per template pixel. Returns `None` for blank lines.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn rasterize_line(
    font: &Font,
    text: &str,
    font_size: f32,
    letter_spacing: f32,
    scale: f32,
    color: Rgba,
) -> Option<RasterLine> {
    if text.trim().is_empty() || !scale.is_finite() || scale <= 0.0 {
        return None;
    }
    let px = font_size * scale;
    let (ascent, descent) = font
        .horizontal_line_metrics(px)
        .map_or((px * 0.8, -px * 0.2), |m| (m.ascent, m.descent));

    let (pens, advance) = GlyphMeasure::new(font, font_size, letter_spacing).pen_positions(text);
    let glyphs: Vec<_> = pens
        .into_iter()
        .map(|(ch, pen)| {
            let (metrics, coverage) = font.rasterize(ch, px);
            (pen * scale, metrics, coverage)
        })
        .collect();

    // Horizontal extent including glyph overhangs.
    let min_x = glyphs
        .iter()
        .map(|(pen, m, _)| pen + m.xmin as f32)
        .fold(0.0_f32, f32::min)
        .floor();
    let max_x = glyphs
        .iter()
        .map(|(pen, m, _)| pen + m.xmin as f32 + m.width as f32)
        .fold(advance * scale, f32::max)
        .ceil();
    let top = ascent.ceil() + 1.0;
    let height = (top - descent.floor() + 1.0).max(1.0);
    let width = (max_x - min_x).max(1.0);

    let mut pixmap = Pixmap::new(width as u32, height as u32)?;
    let stride = pixmap.width() as i32;
    let rows = pixmap.height() as i32;
    let origin_x = -min_x;
    let pixels = pixmap.pixels_mut();

    for (pen, metrics, coverage) in &glyphs {
        let gx = (origin_x + pen).round() as i32 + metrics.xmin;
        let gy = top as i32 - (metrics.height as i32 + metrics.ymin);
        for row in 0..metrics.height {
            for col in 0..metrics.width {
                let cov = coverage[row * metrics.width + col];
                if cov == 0 {
                    continue;
                }
                let x = gx + col as i32;
                let y = gy + row as i32;
                if x < 0 || y < 0 || x >= stride || y >= rows {
                    continue;
                }
                let idx = (y * stride + x) as usize;
                let alpha = (u16::from(cov) * u16::from(color.a) / 255) as u8;
                if alpha > pixels[idx].alpha() {
                    pixels[idx] = ColorU8::from_rgba(color.r, color.g, color.b, alpha).premultiply();
                }
            }
        }
    }

    Some(RasterLine {
        pixmap,
        origin_x,
        middle_y: top - (ascent + descent) / 2.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Every character is 10px wide.
    struct Mono;

    impl TextMeasure for Mono {
        #[allow(clippy::cast_precision_loss)]
        fn measure(&self, text: &str) -> f32 {
            text.chars().count() as f32 * 10.0
        }
    }

    #[test]
    fn test_wraps_greedily() {
        let lines = wrap_lines("aaa bbb ccc ddd", 75.0, &Mono);
        assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn test_long_word_gets_own_line() {
        let lines = wrap_lines("hi supercalifragilistic yo", 50.0, &Mono);
        assert_eq!(lines, vec!["hi", "supercalifragilistic", "yo"]);
        assert_eq!(wrap_lines("nospacesatallhere", 30.0, &Mono), vec!["nospacesatallhere"]);
    }

    #[test]
    fn test_newlines_break_and_blank_lines_survive() {
        let lines = wrap_lines("one\n\ntwo", 500.0, &Mono);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn test_top_text_is_centered() {
        // 800x800 template, text box (40,20,720,100), size 60, line height 1.2.
        let rect = Rect::new(40.0, 20.0, 720.0, 100.0);
        let layout = layout_text("TOP TEXT", rect, TextAlign::Center, 60.0, 1.2, &Mono);
        assert_eq!(layout.lines.len(), 1);
        let line = &layout.lines[0];
        assert!((line.center_y - 70.0).abs() < 1e-4);
        assert!((line.x + line.width / 2.0 - 400.0).abs() < 1e-4);
    }

    #[test]
    fn test_alignment_insets() {
        let rect = Rect::new(0.0, 0.0, 200.0, 50.0);
        let left = layout_text("abc", rect, TextAlign::Left, 20.0, 1.0, &Mono);
        let right = layout_text("abc", rect, TextAlign::Right, 20.0, 1.0, &Mono);
        assert!((left.lines[0].x - 10.0).abs() < f32::EPSILON);
        assert!((right.lines[0].x - 160.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_block_is_vertically_centered() {
        let rect = Rect::new(0.0, 100.0, 70.0, 300.0);
        let layout = layout_text("aaa bbb ccc", rect, TextAlign::Center, 20.0, 1.5, &Mono);
        assert_eq!(layout.lines.len(), 3);
        let first = layout.lines[0].center_y - layout.line_height / 2.0;
        let last = layout.lines[2].center_y + layout.line_height / 2.0;
        assert!(((first + last) / 2.0 - 250.0).abs() < 1e-4);
        assert!((layout.block_height() - 90.0).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_no_overflow_with_break_opportunities(
            words in proptest::collection::vec("[a-z]{1,8}", 1..20),
            width in 80.0f32..400.0,
        ) {
            let text = words.join(" ");
            for line in wrap_lines(&text, width, &Mono) {
                // A line only overflows if it is a single unbreakable word.
                prop_assert!(Mono.measure(&line) <= width || !line.contains(' '));
            }
        }

        #[test]
        fn prop_no_words_dropped(words in proptest::collection::vec("[a-z]{1,30}", 0..20)) {
            let text = words.join(" ");
            let rejoined = wrap_lines(&text, 60.0, &Mono).join(" ");
            prop_assert_eq!(rejoined.split(' ').filter(|w| !w.is_empty()).collect::<Vec<_>>(), words);
        }
    }
}
