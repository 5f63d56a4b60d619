//! Canonical vocabulary records and the normalizer that builds them.
//!
//! Lesson blobs carry vocabulary in several historical shapes. Everything in
//! this module converges on [`VocabularyWord`], whose list fields are always
//! present so renderers can iterate without checks.

use crate::lesson::LessonDocument;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const FALLBACK_TERM: &str = "Unknown word";
pub const FALLBACK_PART_OF_SPEECH: &str = "noun";
pub const FALLBACK_DEFINITION: &str = "Definition not available.";
pub const NOT_FOUND_TERM: &str = "Vocabulary not found";
pub const NOT_FOUND_DEFINITION: &str =
    "No vocabulary words were found in this lesson. Please regenerate the lesson to create vocabulary content.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyWord {
    pub term: String,
    pub part_of_speech: String,
    pub definition: String,
    pub example: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<Pronunciation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_group: Option<String>,
    #[serde(default)]
    pub additional_examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_family: Option<WordFamily>,
    #[serde(default)]
    pub collocations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_map: Option<SemanticMap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pronunciation {
    #[serde(default)]
    pub syllables: Vec<String>,
    #[serde(default)]
    pub stress_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic_guide: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordFamily {
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticMap {
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
    #[serde(default)]
    pub related_concepts: Vec<String>,
    #[serde(default)]
    pub contexts: Vec<String>,
    #[serde(default)]
    pub associated_words: Vec<String>,
}

impl VocabularyWord {
    /// A minimal canonical word; optional fields empty.
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        let term = term.into();
        Self {
            example: fallback_example(&term),
            term,
            part_of_speech: FALLBACK_PART_OF_SPEECH.to_string(),
            definition: definition.into(),
            pronunciation: None,
            semantic_group: None,
            additional_examples: Vec::new(),
            word_family: None,
            collocations: Vec::new(),
            usage_notes: None,
            semantic_map: None,
        }
    }

    fn not_found() -> Self {
        Self::new(NOT_FOUND_TERM, NOT_FOUND_DEFINITION)
    }
}

fn fallback_example(term: &str) -> String {
    format!("Example sentence for \"{term}\" is not available.")
}

/// Coerces a loosely-typed list into owned, trimmed, non-empty strings.
///
/// Arrays keep their string and number entries, strings are split on commas,
/// and anything else (including `null`) yields an empty list.
pub fn parse_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn field<'a>(raw: &'a Map<String, Value>, names: &[&str]) -> &'a Value {
    names
        .iter()
        .filter_map(|name| raw.get(*name))
        .find(|value| !is_blank(value))
        .unwrap_or(&Value::Null)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn text_field(raw: &Map<String, Value>, names: &[&str]) -> Option<String> {
    match field(raw, names) {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn stress_index(value: &Value) -> usize {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0) as usize,
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn normalize_pronunciation(raw: &Map<String, Value>) -> Option<Pronunciation> {
    match field(raw, &["pronunciation"]) {
        Value::String(s) => {
            return Some(Pronunciation {
                syllables: Vec::new(),
                stress_index: 0,
                phonetic_guide: Some(s.trim().to_string()),
            });
        }
        Value::Object(obj) => {
            let syllables = parse_list(field(obj, &["syllables"]));
            let phonetic_guide = text_field(obj, &["phoneticGuide", "phonetic"]);
            if syllables.is_empty() && phonetic_guide.is_none() {
                return None;
            }
            return Some(Pronunciation {
                syllables,
                stress_index: stress_index(field(obj, &["stressIndex"])),
                phonetic_guide,
            });
        }
        _ => {}
    }

    // Oldest shape: syllables and stress index live on the word itself.
    let syllables = parse_list(field(raw, &["syllables"]));
    if syllables.is_empty() {
        return None;
    }
    Some(Pronunciation {
        syllables,
        stress_index: stress_index(field(raw, &["stressIndex"])),
        phonetic_guide: None,
    })
}

fn normalize_word_family(raw: &Map<String, Value>) -> Option<WordFamily> {
    let (words, description) = match field(raw, &["wordFamily", "family"]) {
        Value::Object(obj) => (
            parse_list(field(obj, &["words"])),
            text_field(obj, &["description"]).unwrap_or_default(),
        ),
        other => (parse_list(other), String::new()),
    };
    if words.is_empty() && description.is_empty() {
        return None;
    }
    Some(WordFamily { words, description })
}

fn normalize_semantic_map(raw: &Map<String, Value>) -> Option<SemanticMap> {
    let Value::Object(obj) = field(raw, &["semanticMap", "semantics"]) else {
        return None;
    };
    Some(SemanticMap {
        synonyms: parse_list(field(obj, &["synonyms"])),
        antonyms: parse_list(field(obj, &["antonyms"])),
        related_concepts: parse_list(field(obj, &["relatedConcepts", "related"])),
        contexts: parse_list(field(obj, &["contexts"])),
        associated_words: parse_list(field(obj, &["associatedWords", "associations"])),
    })
}

/// Builds a canonical word from any known raw shape.
///
/// Normalizing an already canonical (serialized) word returns it unchanged.
pub fn normalize(raw: &Value) -> VocabularyWord {
    let empty = Map::new();
    let raw = match raw {
        Value::Object(obj) => obj,
        Value::String(term) => {
            let mut obj = Map::new();
            obj.insert("term".to_string(), Value::String(term.clone()));
            return normalize(&Value::Object(obj));
        }
        _ => &empty,
    };

    let term = text_field(raw, &["term", "word"]).unwrap_or_else(|| FALLBACK_TERM.to_string());
    let example = text_field(raw, &["example", "exampleSentence"])
        .unwrap_or_else(|| fallback_example(&term));

    VocabularyWord {
        part_of_speech: text_field(raw, &["partOfSpeech", "pos"])
            .unwrap_or_else(|| FALLBACK_PART_OF_SPEECH.to_string()),
        definition: text_field(raw, &["definition", "meaning"])
            .unwrap_or_else(|| FALLBACK_DEFINITION.to_string()),
        example,
        pronunciation: normalize_pronunciation(raw),
        semantic_group: text_field(raw, &["semanticGroup", "category"]),
        additional_examples: parse_list(field(raw, &["additionalExamples", "examples"])),
        word_family: normalize_word_family(raw),
        collocations: parse_list(field(raw, &["collocations", "commonCollocations"])),
        usage_notes: text_field(raw, &["usageNotes", "usage"]),
        semantic_map: normalize_semantic_map(raw),
        term,
    }
}

/// Normalizes either an array of raw words or a `term -> definition` map.
fn words_from_source(source: &Value) -> Vec<VocabularyWord> {
    match source {
        Value::Array(items) => items
            .iter()
            .filter(|item| !is_blank(item))
            .map(normalize)
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter(|(term, _)| !term.trim().is_empty())
            .map(|(term, entry)| match entry {
                Value::Object(obj) => {
                    let mut obj = obj.clone();
                    if is_blank(field(&obj, &["term", "word"])) {
                        obj.insert("term".to_string(), Value::String(term.clone()));
                    }
                    normalize(&Value::Object(obj))
                }
                definition => {
                    let mut obj = Map::new();
                    obj.insert("term".to_string(), Value::String(term.clone()));
                    obj.insert("definition".to_string(), definition.clone());
                    normalize(&Value::Object(obj))
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Finds the lesson's vocabulary, first matching source wins:
/// a `vocabulary` section with a `words` array, then root `targetVocabulary`,
/// then root `vocabulary`. Falls back to a single "not found" word.
pub fn resolve_vocabulary(lesson: &LessonDocument) -> Vec<VocabularyWord> {
    let from_section = lesson
        .sections
        .iter()
        .find(|section| section.kind.eq_ignore_ascii_case("vocabulary") && section.words.is_array())
        .map(|section| words_from_source(&section.words))
        .unwrap_or_default();
    if !from_section.is_empty() {
        debug!("vocabulary resolved from section ({} words)", from_section.len());
        return from_section;
    }

    for (name, source) in [
        ("targetVocabulary", &lesson.target_vocabulary),
        ("vocabulary", &lesson.vocabulary),
    ] {
        let words = words_from_source(source);
        if !words.is_empty() {
            debug!("vocabulary resolved from {name} ({} words)", words.len());
            return words;
        }
    }

    warn!("no vocabulary found in lesson {:?}; using placeholder", lesson.title);
    vec![VocabularyWord::not_found()]
}
