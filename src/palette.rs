//! Deterministic colors for part-of-speech and semantic-group badges.

use crate::types::Color;
use std::fmt;

pub const NEUTRAL_GRAY: &str = "#6B7280";

const HASHED_SATURATION: u8 = 65;
const HASHED_LIGHTNESS: u8 = 45;

/// A badge color as the renderers consume it: a fixed table entry or a hue
/// derived from the label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swatch {
    Hex(&'static str),
    Hsl {
        hue: u16,
        saturation: u8,
        lightness: u8,
    },
}

impl Swatch {
    pub fn css(&self) -> String {
        match self {
            Swatch::Hex(hex) => hex.to_string(),
            Swatch::Hsl {
                hue,
                saturation,
                lightness,
            } => format!("hsl({hue}, {saturation}%, {lightness}%)"),
        }
    }

    pub fn to_color(&self) -> Color {
        match self {
            Swatch::Hex(hex) => Color::from_hex(hex).unwrap_or(Color::rgb(0.42, 0.45, 0.5)),
            Swatch::Hsl {
                hue,
                saturation,
                lightness,
            } => Color::from_hsl(*hue as f32, *saturation as f32, *lightness as f32),
        }
    }
}

impl fmt::Display for Swatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css())
    }
}

/// Legend rows in display order: label shown to the learner and its color.
pub const PART_OF_SPEECH_LEGEND: &[(&str, &str)] = &[
    ("Noun", "#3B82F6"),
    ("Verb", "#10B981"),
    ("Adjective", "#F59E0B"),
    ("Adverb", "#8B5CF6"),
    ("Preposition / Conjunction / Article", "#EC4899"),
    ("Pronoun", "#06B6D4"),
    ("Other", NEUTRAL_GRAY),
];

pub fn color_for_part_of_speech(pos: &str) -> Swatch {
    let hex = match pos.trim().to_ascii_lowercase().as_str() {
        "noun" => "#3B82F6",
        "verb" => "#10B981",
        "adjective" => "#F59E0B",
        "adverb" => "#8B5CF6",
        "preposition" | "conjunction" | "article" => "#EC4899",
        "pronoun" => "#06B6D4",
        _ => NEUTRAL_GRAY,
    };
    Swatch::Hex(hex)
}

pub fn color_for_semantic_group(label: &str) -> Swatch {
    let hex = match label.trim().to_ascii_lowercase().as_str() {
        "business" => "#1E40AF",
        "technology" => "#7C3AED",
        "nature" => "#059669",
        "emotions" => "#DC2626",
        "culture" => "#D97706",
        "education" => "#2563EB",
        "health" => "#16A34A",
        "travel" => "#0891B2",
        _ => {
            let hue = (i64::from(label_hash(label)).abs() % 360) as u16;
            return Swatch::Hsl {
                hue,
                saturation: HASHED_SATURATION,
                lightness: HASHED_LIGHTNESS,
            };
        }
    };
    Swatch::Hex(hex)
}

/// `acc * 31 + unit` over UTF-16 code units with 32-bit wraparound.
pub fn label_hash(label: &str) -> i32 {
    label.encode_utf16().fold(0i32, |acc, unit| {
        (acc << 5).wrapping_sub(acc).wrapping_add(i32::from(unit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_of_speech_table_is_case_insensitive() {
        assert_eq!(color_for_part_of_speech("verb"), Swatch::Hex("#10B981"));
        assert_eq!(color_for_part_of_speech(" VERB "), Swatch::Hex("#10B981"));
        assert_eq!(
            color_for_part_of_speech("conjunction"),
            color_for_part_of_speech("Article")
        );
        assert_eq!(color_for_part_of_speech("particle"), Swatch::Hex(NEUTRAL_GRAY));
        assert_eq!(color_for_part_of_speech(""), Swatch::Hex(NEUTRAL_GRAY));
    }

    #[test]
    fn known_semantic_groups_use_the_table() {
        assert_eq!(color_for_semantic_group("Travel"), Swatch::Hex("#0891B2"));
        assert_eq!(color_for_semantic_group("health").css(), "#16A34A");
    }

    #[test]
    fn label_hash_matches_reference_values() {
        assert_eq!(label_hash(""), 0);
        assert_eq!(label_hash("a"), 97);
        assert_eq!(label_hash("ab"), 97 * 31 + 98);
        // Long labels wrap around instead of overflowing.
        let long = "z".repeat(64);
        let _ = label_hash(&long);
    }

    #[test]
    fn unknown_groups_hash_to_a_stable_hue() {
        let first = color_for_semantic_group("Maritime Law");
        let second = color_for_semantic_group("Maritime Law");
        assert_eq!(first, second);
        let Swatch::Hsl { hue, saturation, lightness } = first else {
            panic!("expected hashed color, got {first:?}");
        };
        assert!(hue < 360);
        assert_eq!((saturation, lightness), (65, 45));
        assert_eq!(
            first.css(),
            format!("hsl({}, 65%, 45%)", (i64::from(label_hash("Maritime Law")).abs() % 360))
        );
    }

    #[test]
    fn different_unknown_labels_usually_differ() {
        let labels = ["astronomy", "cooking", "finance", "gardening", "sports", "music"];
        let hues: std::collections::BTreeSet<String> = labels
            .iter()
            .map(|l| color_for_semantic_group(l).css())
            .collect();
        assert!(hues.len() >= labels.len() - 1);
    }

    #[test]
    fn swatches_convert_to_channels() {
        let green = Swatch::Hex("#10B981").to_color();
        assert!(green.g > green.r && green.g > green.b);
        let hashed = Swatch::Hsl {
            hue: 0,
            saturation: 65,
            lightness: 45,
        }
        .to_color();
        assert!(hashed.r > hashed.g && hashed.r > hashed.b);
    }
}
