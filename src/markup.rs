//! Self-contained HTML rendering of vocabulary cards.

use crate::card::{CardLimits, CardModel, DetailSection, SemanticEntry};
use crate::lesson::LessonHeader;
use crate::palette::PART_OF_SPEECH_LEGEND;
use crate::vocabulary::VocabularyWord;

pub const CONTENT_TYPE: &str = "text/html; charset=utf-8";

const STYLE: &str = r#"
        * { box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
            line-height: 1.5;
            color: #1f2937;
            max-width: 960px;
            margin: 0 auto;
            padding: 2rem;
            background: #f9fafb;
        }
        .header { border-bottom: 2px solid #e5e7eb; margin-bottom: 1.5rem; padding-bottom: 1rem; }
        .header h1 { margin: 0 0 0.25rem 0; }
        .meta { color: #6b7280; font-size: 0.95rem; }
        .legend { display: flex; flex-wrap: wrap; gap: 0.75rem; margin-bottom: 1.5rem; font-size: 0.85rem; }
        .legend-item { display: flex; align-items: center; gap: 0.35rem; }
        .legend-dot { width: 0.8rem; height: 0.8rem; border-radius: 50%; display: inline-block; }
        .card {
            position: relative;
            background: white;
            border: 1px solid #e5e7eb;
            border-radius: 10px;
            padding: 1.25rem;
            margin-bottom: 1rem;
            box-shadow: 0 1px 3px rgba(0,0,0,0.06);
        }
        .group-badge {
            position: absolute;
            top: 1rem;
            right: 1rem;
            color: white;
            font-size: 0.75rem;
            padding: 0.15rem 0.6rem;
            border-radius: 999px;
        }
        .term-row { display: flex; align-items: baseline; flex-wrap: wrap; gap: 0.6rem; }
        .term { font-size: 1.4rem; font-weight: 700; margin: 0; }
        .pos-badge {
            color: white;
            font-size: 0.7rem;
            font-weight: 600;
            letter-spacing: 0.04em;
            padding: 0.1rem 0.5rem;
            border-radius: 4px;
        }
        .pronunciation { color: #4b5563; font-style: italic; }
        .definition { margin: 0.6rem 0; }
        .example {
            background: #f3f4f6;
            border-left: 4px solid #9ca3af;
            padding: 0.5rem 0.75rem;
            font-style: italic;
            margin: 0.6rem 0;
        }
        .tags { display: flex; flex-wrap: wrap; gap: 0.4rem; margin: 0.4rem 0; }
        .tag { background: #eef2ff; color: #3730a3; font-size: 0.8rem; padding: 0.1rem 0.5rem; border-radius: 999px; }
        .section-label { font-weight: 600; font-size: 0.85rem; color: #374151; }
        .family-description { color: #6b7280; font-size: 0.85rem; }
        .semantic { border-top: 1px dashed #e5e7eb; margin-top: 0.6rem; padding-top: 0.5rem; font-size: 0.9rem; }
        .usage-notes { color: #92400e; background: #fffbeb; padding: 0.4rem 0.6rem; border-radius: 6px; }
"#;

/// Renders the full HTML document for already normalized words.
pub fn render(header: &LessonHeader, words: &[VocabularyWord]) -> String {
    let cards = CardModel::build_all(words, &CardLimits::markup());
    render_cards(header, &cards)
}

pub fn render_cards(header: &LessonHeader, cards: &[CardModel]) -> String {
    let cards_html: String = cards.iter().map(render_card).collect();
    let level = if header.level.is_empty() {
        String::new()
    } else {
        format!("Level: {} &middot; ", escape_html(&header.level))
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Vocabulary</title>
    <style>{style}    </style>
</head>
<body>
    <div class="header">
        <h1>{title}</h1>
        <div class="meta">{level}{count} {noun}</div>
    </div>
{legend}{cards}</body>
</html>
"#,
        title = escape_html(&header.title),
        style = STYLE,
        level = level,
        count = cards.len(),
        noun = if cards.len() == 1 { "word" } else { "words" },
        legend = render_legend(),
        cards = cards_html,
    )
}

fn render_legend() -> String {
    let mut out = String::from("    <div class=\"legend\">\n");
    for (label, color) in PART_OF_SPEECH_LEGEND {
        out.push_str(&format!(
            "        <span class=\"legend-item\"><span class=\"legend-dot\" style=\"background: {color}\"></span>{label}</span>\n",
            label = escape_html(label),
        ));
    }
    out.push_str("    </div>\n");
    out
}

fn render_card(card: &CardModel) -> String {
    let mut out = String::from("    <div class=\"card\">\n");
    if let Some(badge) = &card.semantic_badge {
        out.push_str(&format!(
            "        <span class=\"group-badge\" style=\"background: {}\">{}</span>\n",
            badge.color.css(),
            escape_html(&badge.label)
        ));
    }

    out.push_str("        <div class=\"term-row\">\n");
    out.push_str(&format!(
        "            <h2 class=\"term\">{}</h2>\n",
        escape_html(&card.term)
    ));
    out.push_str(&format!(
        "            <span class=\"pos-badge\" style=\"background: {}\">{}</span>\n",
        card.part_of_speech_color.css(),
        escape_html(&card.part_of_speech_badge)
    ));
    if let Some(pronunciation) = &card.pronunciation {
        // Already escaped by the formatter.
        out.push_str(&format!(
            "            <span class=\"pronunciation\">{pronunciation}</span>\n"
        ));
    }
    out.push_str("        </div>\n");

    out.push_str(&format!(
        "        <p class=\"definition\">{}</p>\n",
        escape_html(&card.definition)
    ));
    out.push_str(&format!(
        "        <div class=\"example\">{}</div>\n",
        escape_html(&card.example)
    ));

    let mut semantic = String::new();
    for section in &card.details {
        match section {
            DetailSection::Collocations { items, .. } => {
                out.push_str("        <div class=\"section-label\">Collocations</div>\n");
                out.push_str(&render_tags(items));
            }
            DetailSection::WordFamily {
                words, description, ..
            } => {
                out.push_str("        <div class=\"section-label\">Word family</div>\n");
                out.push_str(&render_tags(words));
                if !description.is_empty() {
                    out.push_str(&format!(
                        "        <div class=\"family-description\">{}</div>\n",
                        escape_html(description)
                    ));
                }
            }
            DetailSection::SemanticMap(entries) => semantic.push_str(&render_semantic(entries)),
            DetailSection::UsageNotes(notes) => semantic.push_str(&format!(
                "            <div class=\"usage-notes\"><span class=\"section-label\">Usage:</span> {}</div>\n",
                escape_html(notes)
            )),
            DetailSection::AdditionalExample(example) => out.push_str(&format!(
                "        <div class=\"example\">{}</div>\n",
                escape_html(example)
            )),
        }
    }
    if !semantic.is_empty() {
        out.push_str("        <div class=\"semantic\">\n");
        out.push_str(&semantic);
        out.push_str("        </div>\n");
    }

    out.push_str("    </div>\n");
    out
}

fn render_tags(items: &[String]) -> String {
    let mut out = String::from("        <div class=\"tags\">");
    for item in items {
        out.push_str(&format!("<span class=\"tag\">{}</span>", escape_html(item)));
    }
    out.push_str("</div>\n");
    out
}

fn render_semantic(entries: &[SemanticEntry]) -> String {
    entries
        .iter()
        .filter(|entry| !entry.values.is_empty())
        .map(|entry| {
            format!(
                "            <div><span class=\"section-label\">{}:</span> {}</div>\n",
                entry.category.label(),
                escape_html(&entry.values.join(", "))
            )
        })
        .collect()
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::LessonDocument;
    use crate::vocabulary::{NOT_FOUND_TERM, normalize, resolve_vocabulary};
    use serde_json::json;

    fn header() -> LessonHeader {
        LessonHeader {
            title: "Business English".to_string(),
            level: "B2".to_string(),
        }
    }

    #[test]
    fn document_has_header_legend_and_cards_in_order() {
        let words = vec![
            normalize(&json!({"term": "merger", "partOfSpeech": "noun"})),
            normalize(&json!({"term": "negotiate", "partOfSpeech": "verb"})),
        ];
        let html = render(&header(), &words);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Business English</h1>"));
        assert!(html.contains("Level: B2"));
        assert!(html.contains("2 words"));
        assert!(html.contains("class=\"legend\""));
        let merger = html.find(">merger<").expect("first card");
        let negotiate = html.find(">negotiate<").expect("second card");
        assert!(merger < negotiate);
        assert_eq!(html.matches("<div class=\"card\">").count(), 2);
    }

    #[test]
    fn optional_blocks_only_when_present() {
        let bare = render(&header(), &[normalize(&json!({"term": "plain"}))]);
        assert!(!bare.contains("group-badge\" style"));
        assert!(!bare.contains("class=\"pronunciation\""));
        assert!(!bare.contains("Collocations</div>"));
        assert!(!bare.contains("class=\"semantic\""));
        assert!(bare.contains("class=\"example\""));

        let rich = render(
            &header(),
            &[normalize(&json!({
                "term": "innovation",
                "semanticGroup": "Business",
                "pronunciation": {"syllables": ["in", "no", "va", "tion"], "stressIndex": 2},
                "collocations": "drive innovation, foster innovation",
                "wordFamily": {"words": ["innovate"], "description": "verb form"},
                "usageNotes": "Uncountable.",
                "semanticMap": {
                    "synonyms": ["creativity", "invention", "breakthrough", "novelty"],
                    "contexts": ["business", "science", "art"]
                }
            }))],
        );
        assert!(rich.contains("style=\"background: #1E40AF\">Business</span>"));
        assert!(rich.contains("in-no-<strong>va</strong>-tion"));
        assert!(rich.contains("<span class=\"tag\">drive innovation</span><span class=\"tag\">foster innovation</span>"));
        assert!(rich.contains("verb form"));
        assert!(rich.contains("creativity, invention, breakthrough</div>"));
        assert!(!rich.contains("novelty"));
        assert!(rich.contains("business, science</div>"));
        assert!(!rich.contains("art</div>"));
        assert!(rich.contains("Uncountable."));
    }

    #[test]
    fn part_of_speech_colors_match_palette() {
        let html = render(
            &header(),
            &[
                normalize(&json!({"term": "run", "partOfSpeech": "verb"})),
                normalize(&json!({"term": "up", "partOfSpeech": "particle"})),
            ],
        );
        assert!(html.contains("style=\"background: #10B981\">VERB</span>"));
        assert!(html.contains("style=\"background: #6B7280\">PARTICLE</span>"));
    }

    #[test]
    fn unknown_groups_use_hashed_hsl() {
        let html = render(
            &header(),
            &[normalize(&json!({"term": "tide", "semanticGroup": "Maritime"}))],
        );
        assert!(html.contains("style=\"background: hsl("));
    }

    #[test]
    fn free_text_is_escaped_not_truncated() {
        let long_definition = "a <b>very</b> long definition ".repeat(20);
        let html = render(
            &header(),
            &[normalize(&json!({"term": "x&y", "definition": long_definition}))],
        );
        assert!(html.contains(">x&amp;y<"));
        assert!(html.contains(&escape_html(long_definition.trim())));
        assert!(!html.contains("<b>very</b>"));
    }

    #[test]
    fn placeholder_lesson_renders_sentinel_term() {
        let lesson = LessonDocument::from_value(json!({"title": "Empty", "sections": []}))
            .expect("lesson");
        let html = render(&LessonHeader::from(&lesson), &resolve_vocabulary(&lesson));
        assert!(html.contains(NOT_FOUND_TERM));
        assert!(html.contains("1 word<"));
    }

    #[test]
    fn empty_list_still_renders() {
        let html = render(&header(), &[]);
        assert!(html.contains("0 words"));
        assert!(!html.contains("<div class=\"card\">"));
    }
}
