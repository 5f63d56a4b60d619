use crate::error::VocabDeckError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A parsed lesson as handed over by the storage layer.
///
/// Only `sections`, `targetVocabulary` and `vocabulary` are consulted when
/// resolving words; every other root key is ignored. Fields are parsed
/// leniently because lesson blobs were written by several generations of the
/// lesson generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDocument {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub level: String,
    #[serde(default, deserialize_with = "lenient_sections")]
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub target_vocabulary: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub vocabulary: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub words: Value,
}

impl LessonDocument {
    pub fn from_json(raw: &str) -> Result<Self, VocabDeckError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_value(value: Value) -> Result<Self, VocabDeckError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Title block data shared by both renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonHeader {
    pub title: String,
    pub level: String,
}

impl LessonHeader {
    /// The caller's target level wins; the lesson's own label is the fallback.
    pub fn new(lesson: &LessonDocument, target_level: &str) -> Self {
        let level = if target_level.trim().is_empty() {
            lesson.level.trim().to_string()
        } else {
            target_level.trim().to_string()
        };
        let title = match lesson.title.trim() {
            "" => "Vocabulary Lesson".to_string(),
            title => title.to_string(),
        };
        Self { title, level }
    }
}

impl From<&LessonDocument> for LessonHeader {
    fn from(lesson: &LessonDocument) -> Self {
        LessonHeader::new(lesson, "")
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_sections<'de, D>(deserializer: D) -> Result<Vec<Section>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_sections_and_root_sources() {
        let lesson = LessonDocument::from_json(
            r#"{
                "title": "At the Airport",
                "level": "B1",
                "sections": [
                    {"type": "warmup", "title": "Warm up"},
                    {"type": "vocabulary", "words": [{"term": "gate"}]}
                ],
                "targetVocabulary": ["boarding pass"]
            }"#,
        )
        .expect("lesson parses");
        assert_eq!(lesson.title, "At the Airport");
        assert_eq!(lesson.sections.len(), 2);
        assert_eq!(lesson.sections[1].kind, "vocabulary");
        assert!(lesson.sections[1].words.is_array());
        assert_eq!(lesson.target_vocabulary, json!(["boarding pass"]));
        assert!(lesson.vocabulary.is_null());
    }

    #[test]
    fn tolerates_null_and_odd_shapes() {
        let lesson = LessonDocument::from_value(json!({
            "title": null,
            "level": 2,
            "sections": "not a list"
        }))
        .expect("lenient parse");
        assert_eq!(lesson.title, "");
        assert_eq!(lesson.level, "2");
        assert!(lesson.sections.is_empty());

        let lesson = LessonDocument::from_value(json!({
            "sections": [42, {"type": null, "words": "a, b"}]
        }))
        .expect("lenient parse");
        assert_eq!(lesson.sections.len(), 1);
        assert_eq!(lesson.sections[0].kind, "");
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = LessonDocument::from_json("{ nope").unwrap_err();
        assert!(err.to_string().starts_with("invalid lesson document"));
    }

    #[test]
    fn header_prefers_target_level() {
        let lesson = LessonDocument {
            title: "  ".to_string(),
            level: "A2".to_string(),
            ..LessonDocument::default()
        };
        assert_eq!(LessonHeader::new(&lesson, "C1").level, "C1");
        let header = LessonHeader::from(&lesson);
        assert_eq!(header.level, "A2");
        assert_eq!(header.title, "Vocabulary Lesson");
    }
}
