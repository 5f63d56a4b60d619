use crate::card::ELLIPSIS;
use crate::types::Pt;

/// Base-14 Type1 fonts; always available to PDF viewers, never embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
}

// AFM advance widths (1/1000 em) for U+0020..=U+007E.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

impl BuiltinFont {
    pub const ALL: [BuiltinFont; 3] = [
        BuiltinFont::Helvetica,
        BuiltinFont::HelveticaBold,
        BuiltinFont::HelveticaOblique,
    ];

    pub fn base_font(self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
            BuiltinFont::HelveticaOblique => "Helvetica-Oblique",
        }
    }

    pub fn resource_name(self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "F1",
            BuiltinFont::HelveticaBold => "F2",
            BuiltinFont::HelveticaOblique => "F3",
        }
    }

    /// Advance of `ch` in 1/1000 em. Characters outside ASCII get the widest
    /// glyph of the font, so measurement stays an upper bound.
    pub fn char_width(self, ch: char) -> u32 {
        let (table, widest) = match self {
            BuiltinFont::Helvetica | BuiltinFont::HelveticaOblique => (&HELVETICA_WIDTHS, 1015),
            BuiltinFont::HelveticaBold => (&HELVETICA_BOLD_WIDTHS, 1000),
        };
        let code = ch as u32;
        if (0x20..=0x7e).contains(&code) {
            u32::from(table[(code - 0x20) as usize])
        } else {
            widest
        }
    }
}

pub fn measure_text_width(font: BuiltinFont, font_size: Pt, text: &str) -> Pt {
    let units: i64 = text.chars().map(|ch| i64::from(font.char_width(ch))).sum();
    // Round up so a measured line is never narrower than the drawn one.
    let milli = (font_size.to_milli_i64() * units + 999) / 1000;
    Pt::from_milli_i64(milli)
}

/// Greedy word wrap capped at `max_lines`. When text remains after the last
/// permitted line, that line is shortened to make room for `...`.
pub fn wrap_text(
    text: &str,
    font: BuiltinFont,
    font_size: Pt,
    max_width: Pt,
    max_lines: usize,
) -> Vec<String> {
    if max_lines == 0 {
        return Vec::new();
    }
    let fits = |candidate: &str| measure_text_width(font, font_size, candidate) <= max_width;
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        for piece in split_long_word(word, &fits) {
            let candidate = if current.is_empty() {
                piece.clone()
            } else {
                format!("{current} {piece}")
            };
            if fits(&candidate) {
                current = candidate;
            } else {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current = piece;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = ellipsize(last, &fits);
        }
    }
    lines
}

// Chunks wider than the line are cut at character boundaries; every chunk
// keeps at least one character.
fn split_long_word(word: &str, fits: &impl Fn(&str) -> bool) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        current.push(ch);
        if !fits(&current) && current.chars().count() > 1 {
            current.pop();
            chunks.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn ellipsize(line: &str, fits: &impl Fn(&str) -> bool) -> String {
    let mut kept: String = line.to_string();
    loop {
        let trimmed = kept.trim_end();
        let candidate = format!("{trimmed}{ELLIPSIS}");
        if fits(&candidate) || trimmed.is_empty() {
            return candidate;
        }
        kept.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(v: f32) -> Pt {
        Pt::from_f32(v)
    }

    #[test]
    fn measure_uses_glyph_widths() {
        // a=556 b=556 c=500 d=556
        let regular = measure_text_width(BuiltinFont::Helvetica, size(10.0), "abcd");
        assert_eq!(regular.to_milli_i64(), 21_680);
        let bold = measure_text_width(BuiltinFont::HelveticaBold, size(10.0), "abcd");
        assert_eq!(bold.to_milli_i64(), 23_340);
        let oblique = measure_text_width(BuiltinFont::HelveticaOblique, size(10.0), "abcd");
        assert_eq!(oblique, regular);
        let caps = measure_text_width(BuiltinFont::Helvetica, size(10.0), "WWWW");
        assert_eq!(caps.to_milli_i64(), 37_760);
    }

    #[test]
    fn non_ascii_is_measured_wide() {
        let accented = measure_text_width(BuiltinFont::Helvetica, size(10.0), "\u{e9}");
        let plain = measure_text_width(BuiltinFont::Helvetica, size(10.0), "e");
        assert!(accented > plain);
    }

    #[test]
    fn wrap_respects_width() {
        let max = size(60.0);
        let lines = wrap_text(
            "the quick brown fox jumps over the lazy dog",
            BuiltinFont::Helvetica,
            size(10.0),
            max,
            10,
        );
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
        for line in &lines {
            assert!(measure_text_width(BuiltinFont::Helvetica, size(10.0), line) <= max);
        }
    }

    #[test]
    fn capital_heavy_text_stays_inside_the_line() {
        let text = "WWWW ".repeat(60);
        let max = size(467.28);
        let lines = wrap_text(&text, BuiltinFont::Helvetica, size(10.0), max, 3);
        assert_eq!(lines.len(), 3);
        assert!(lines[2].ends_with("..."));
        for line in &lines {
            assert!(measure_text_width(BuiltinFont::Helvetica, size(10.0), line) <= max);
        }
    }

    #[test]
    fn wrap_caps_lines_with_ellipsis() {
        let max = size(60.0);
        let lines = wrap_text(
            "one two three four five six seven eight",
            BuiltinFont::Helvetica,
            size(10.0),
            max,
            2,
        );
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("..."));
        assert!(measure_text_width(BuiltinFont::Helvetica, size(10.0), &lines[1]) <= max);
    }

    #[test]
    fn long_words_are_broken() {
        let max = size(40.0);
        let lines = wrap_text(
            "supercalifragilistic",
            BuiltinFont::HelveticaBold,
            size(10.0),
            max,
            5,
        );
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "supercalifragilistic");
        for line in &lines {
            assert!(measure_text_width(BuiltinFont::HelveticaBold, size(10.0), line) <= max);
        }
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap_text("   ", BuiltinFont::Helvetica, size(10.0), size(60.0), 3).is_empty());
    }
}
