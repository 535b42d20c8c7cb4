/// Text width oracle used by automatic line breaking and width-bounded merging.
pub trait TextMeasure {
    /// Rendered width of `text` in pixels at `font_size_px`.
    fn width(&self, text: &str, font_size_px: f64) -> f64;
}

/// Font-free width estimate from per-character advances expressed in ems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphWidthMeasure {
    /// Advance of a narrow (Latin, digit, punctuation) character.
    pub narrow_em: f64,
    /// Advance of a wide (CJK, Hangul, fullwidth) character.
    pub wide_em: f64,
    pub space_em: f64,
}

impl Default for GlyphWidthMeasure {
    fn default() -> Self {
        Self {
            narrow_em: 0.55,
            wide_em: 1.0,
            space_em: 0.3,
        }
    }
}

impl GlyphWidthMeasure {
    fn advance_em(&self, c: char) -> f64 {
        if c.is_whitespace() {
            self.space_em
        } else if is_wide(c) {
            self.wide_em
        } else {
            self.narrow_em
        }
    }
}

impl TextMeasure for GlyphWidthMeasure {
    fn width(&self, text: &str, font_size_px: f64) -> f64 {
        text.chars().map(|c| self.advance_em(c)).sum::<f64>() * font_size_px
    }
}

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F      // Hangul Jamo
        | 0x2E80..=0x303E    // CJK radicals, punctuation
        | 0x3041..=0x33FF    // Kana, CJK symbols
        | 0x3400..=0x4DBF    // CJK ext A
        | 0x4E00..=0x9FFF    // CJK unified
        | 0xAC00..=0xD7A3    // Hangul syllables
        | 0xF900..=0xFAFF    // CJK compatibility
        | 0xFF01..=0xFF60    // Fullwidth forms
        | 0xFFE0..=0xFFE6)
}

#[cfg(test)]
#[path = "../../tests/unit/processor/measure.rs"]
mod tests;
