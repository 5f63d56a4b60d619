//! Display-ready card models.
//!
//! Both renderers read cards built here, so item caps, character budgets and
//! section order are decided once per profile rather than per backend.

use crate::palette::{Swatch, color_for_part_of_speech, color_for_semantic_group};
use crate::pronunciation::{self, Emphasis};
use crate::vocabulary::{SemanticMap, VocabularyWord};

pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    AdditionalExample,
    WordFamily,
    Collocations,
    UsageNotes,
    SemanticMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticCategory {
    Synonyms,
    Antonyms,
    RelatedConcepts,
    Contexts,
}

impl SemanticCategory {
    pub fn label(self) -> &'static str {
        match self {
            SemanticCategory::Synonyms => "Synonyms",
            SemanticCategory::Antonyms => "Antonyms",
            SemanticCategory::RelatedConcepts => "Related",
            SemanticCategory::Contexts => "Contexts",
        }
    }

    fn values(self, map: &SemanticMap) -> &[String] {
        match self {
            SemanticCategory::Synonyms => &map.synonyms,
            SemanticCategory::Antonyms => &map.antonyms,
            SemanticCategory::RelatedConcepts => &map.related_concepts,
            SemanticCategory::Contexts => &map.contexts,
        }
    }
}

/// Per-output caps. `None` budgets leave free text untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CardLimits {
    pub sections: Vec<SectionKind>,
    pub semantic_categories: Vec<(SemanticCategory, usize)>,
    pub emphasis: Emphasis,
    pub badge_chars: Option<usize>,
    pub additional_example_chars: Option<usize>,
    pub word_family_chars: Option<usize>,
    pub collocation_chars: Option<usize>,
    pub usage_note_chars: Option<usize>,
    pub semantic_value_chars: Option<usize>,
}

impl CardLimits {
    /// Flow document: item caps only.
    pub fn markup() -> Self {
        Self {
            sections: vec![
                SectionKind::Collocations,
                SectionKind::WordFamily,
                SectionKind::SemanticMap,
                SectionKind::UsageNotes,
            ],
            semantic_categories: vec![
                (SemanticCategory::Synonyms, 3),
                (SemanticCategory::Contexts, 2),
            ],
            emphasis: Emphasis::Html,
            badge_chars: None,
            additional_example_chars: None,
            word_family_chars: None,
            collocation_chars: None,
            usage_note_chars: None,
            semantic_value_chars: None,
        }
    }

    /// Fixed page geometry: one line per section, so every string has a budget.
    pub fn print() -> Self {
        Self {
            sections: vec![
                SectionKind::AdditionalExample,
                SectionKind::WordFamily,
                SectionKind::Collocations,
                SectionKind::UsageNotes,
                SectionKind::SemanticMap,
            ],
            semantic_categories: vec![
                (SemanticCategory::Synonyms, 3),
                (SemanticCategory::Antonyms, 3),
                (SemanticCategory::RelatedConcepts, 3),
                (SemanticCategory::Contexts, 3),
            ],
            emphasis: Emphasis::Caps,
            badge_chars: Some(10),
            additional_example_chars: Some(80),
            word_family_chars: Some(70),
            collocation_chars: Some(70),
            usage_note_chars: Some(75),
            semantic_value_chars: Some(32),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub label: String,
    pub color: Swatch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SemanticEntry {
    pub category: SemanticCategory,
    pub values: Vec<String>,
    pub text: String,
}

/// Optional card content. A section is present only when its data is.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailSection {
    AdditionalExample(String),
    WordFamily {
        words: Vec<String>,
        text: String,
        description: String,
    },
    Collocations {
        items: Vec<String>,
        text: String,
    },
    UsageNotes(String),
    SemanticMap(Vec<SemanticEntry>),
}

impl DetailSection {
    pub fn kind(&self) -> SectionKind {
        match self {
            DetailSection::AdditionalExample(_) => SectionKind::AdditionalExample,
            DetailSection::WordFamily { .. } => SectionKind::WordFamily,
            DetailSection::Collocations { .. } => SectionKind::Collocations,
            DetailSection::UsageNotes(_) => SectionKind::UsageNotes,
            DetailSection::SemanticMap(_) => SectionKind::SemanticMap,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardModel {
    pub term: String,
    pub part_of_speech: String,
    pub part_of_speech_badge: String,
    pub part_of_speech_color: Swatch,
    pub semantic_badge: Option<Badge>,
    pub pronunciation: Option<String>,
    pub definition: String,
    pub example: String,
    pub details: Vec<DetailSection>,
}

impl CardModel {
    pub fn build(word: &VocabularyWord, limits: &CardLimits) -> Self {
        let semantic_badge = word.semantic_group.as_deref().map(|group| Badge {
            label: truncate_opt(group, limits.badge_chars),
            color: color_for_semantic_group(group),
        });
        let pronunciation =
            pronunciation::format_optional(word.pronunciation.as_ref(), limits.emphasis);

        Self {
            term: word.term.clone(),
            part_of_speech: word.part_of_speech.clone(),
            part_of_speech_badge: word.part_of_speech.to_uppercase(),
            part_of_speech_color: color_for_part_of_speech(&word.part_of_speech),
            semantic_badge,
            pronunciation: (!pronunciation.is_empty()).then_some(pronunciation),
            definition: word.definition.clone(),
            example: word.example.clone(),
            details: limits
                .sections
                .iter()
                .filter_map(|kind| detail_section(*kind, word, limits))
                .collect(),
        }
    }

    pub fn build_all(words: &[VocabularyWord], limits: &CardLimits) -> Vec<CardModel> {
        words.iter().map(|word| CardModel::build(word, limits)).collect()
    }
}

fn detail_section(
    kind: SectionKind,
    word: &VocabularyWord,
    limits: &CardLimits,
) -> Option<DetailSection> {
    match kind {
        SectionKind::AdditionalExample => word.additional_examples.first().map(|first| {
            DetailSection::AdditionalExample(truncate_opt(first, limits.additional_example_chars))
        }),
        SectionKind::WordFamily => {
            let family = word.word_family.as_ref().filter(|f| !f.words.is_empty())?;
            Some(DetailSection::WordFamily {
                text: truncate_opt(&family.words.join(", "), limits.word_family_chars),
                words: family.words.clone(),
                description: family.description.clone(),
            })
        }
        SectionKind::Collocations => {
            if word.collocations.is_empty() {
                return None;
            }
            Some(DetailSection::Collocations {
                text: truncate_opt(&word.collocations.join(", "), limits.collocation_chars),
                items: word.collocations.clone(),
            })
        }
        SectionKind::UsageNotes => word
            .usage_notes
            .as_deref()
            .map(|notes| DetailSection::UsageNotes(truncate_opt(notes, limits.usage_note_chars))),
        SectionKind::SemanticMap => {
            let map = word.semantic_map.as_ref()?;
            let entries = limits
                .semantic_categories
                .iter()
                .map(|(category, cap)| {
                    let values: Vec<String> =
                        category.values(map).iter().take(*cap).cloned().collect();
                    SemanticEntry {
                        category: *category,
                        text: truncate_opt(&values.join(", "), limits.semantic_value_chars),
                        values,
                    }
                })
                .collect();
            Some(DetailSection::SemanticMap(entries))
        }
    }
}

fn truncate_opt(text: &str, budget: Option<usize>) -> String {
    match budget {
        Some(budget) => truncate_chars(text, budget),
        None => text.to_string(),
    }
}

/// Keeps at most `max_chars` characters, appending `...` when text was cut.
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let mut out: String = input.chars().take(max_chars).collect();
    out.truncate(out.trim_end().len());
    out.push_str(ELLIPSIS);
    out
}
