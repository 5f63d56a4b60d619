use crate::markup::escape_html;
use crate::vocabulary::Pronunciation;

/// How the stressed syllable is marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    /// Upper-cases the stressed syllable; for plain-text surfaces like PDF.
    Caps,
    /// HTML-escapes every syllable and wraps the stressed one in `<strong>`.
    Html,
}

/// Renders a pronunciation. Returns an empty string when there is nothing to
/// show, in which case callers omit the pronunciation slot.
pub fn format(pronunciation: &Pronunciation, emphasis: Emphasis) -> String {
    let guide = pronunciation
        .phonetic_guide
        .as_deref()
        .map(str::trim)
        .filter(|guide| !guide.is_empty());
    if let Some(guide) = guide {
        return match emphasis {
            Emphasis::Caps => guide.to_string(),
            Emphasis::Html => escape_html(guide),
        };
    }

    pronunciation
        .syllables
        .iter()
        .enumerate()
        .map(|(idx, syllable)| {
            let stressed = idx == pronunciation.stress_index;
            match (emphasis, stressed) {
                (Emphasis::Caps, true) => syllable.to_uppercase(),
                (Emphasis::Caps, false) => syllable.clone(),
                (Emphasis::Html, true) => format!("<strong>{}</strong>", escape_html(syllable)),
                (Emphasis::Html, false) => escape_html(syllable),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

pub fn format_optional(pronunciation: Option<&Pronunciation>, emphasis: Emphasis) -> String {
    pronunciation
        .map(|p| format(p, emphasis))
        .unwrap_or_default()
}
