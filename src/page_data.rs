use crate::canvas::{Command, Document};
use std::collections::HashMap;

/// Meta key recorded once per placed card; its value is the card's term.
pub const CARD_META_KEY: &str = "vocab.card";

#[derive(Debug, Clone, Default)]
pub struct PageDataContext {
    pub page_count: usize,
    // Per page (1-based externally, 0-based index here): key -> meta count.
    pub pages: Vec<HashMap<String, usize>>,
    // Document totals across pages: key -> meta count.
    pub totals: HashMap<String, usize>,
}

impl PageDataContext {
    /// Number of `key` meta entries on each page, in page order.
    pub fn counts(&self, key: &str) -> Vec<usize> {
        self.pages
            .iter()
            .map(|page| page.get(key).copied().unwrap_or(0))
            .collect()
    }
}

/// Counts `Meta` commands per page for each of `keys`. Other meta keys are skipped.
pub fn compute_page_data_context(doc: &Document, keys: &[&str]) -> PageDataContext {
    let mut pages_out: Vec<HashMap<String, usize>> = Vec::with_capacity(doc.pages.len());
    let mut totals: HashMap<String, usize> =
        keys.iter().map(|key| (key.to_string(), 0)).collect();

    for page in &doc.pages {
        let mut computed: HashMap<String, usize> =
            keys.iter().map(|key| (key.to_string(), 0)).collect();
        for cmd in &page.commands {
            match cmd {
                Command::Meta { key, .. } if computed.contains_key(key) => {
                    *computed.entry(key.clone()).or_default() += 1;
                }
                _ => {}
            }
        }
        for (key, count) in &computed {
            if let Some(total) = totals.get_mut(key) {
                *total = total.saturating_add(*count);
            }
        }
        pages_out.push(computed);
    }

    PageDataContext {
        page_count: doc.pages.len(),
        pages: pages_out,
        totals,
    }
}

/// Expands `{page}`, `{pages}`, `{date}` and the page-data tokens
/// `{count:key}` and `{total_count:key}`. Unknown tokens stay as written.
pub fn substitute_placeholders(
    template: &str,
    page_number: usize,
    page_count: usize,
    date: &str,
    ctx: Option<&PageDataContext>,
) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest: &str = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        rest = &rest[start + 1..];

        let Some(end) = rest.find('}') else {
            // Unclosed token; keep as-is.
            out.push('{');
            out.push_str(rest);
            return out;
        };

        let token = &rest[..end];
        let replacement = match token {
            "page" => Some(page_number.to_string()),
            "pages" => Some(page_count.to_string()),
            "date" => Some(date.to_string()),
            _ => resolve_token(token, page_number, ctx),
        };
        match replacement {
            Some(rep) => out.push_str(&rep),
            None => {
                out.push('{');
                out.push_str(token);
                out.push('}');
            }
        }

        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    out
}

fn resolve_token(token: &str, page_number: usize, ctx: Option<&PageDataContext>) -> Option<String> {
    let ctx = ctx?;
    let page_index = page_number.checked_sub(1)?;

    let (kind, key) = token.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    let count = match kind.trim() {
        "count" => ctx.pages.get(page_index)?.get(key),
        "total_count" => ctx.totals.get(key),
        _ => None,
    }?;
    Some(count.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Page;
    use crate::types::Size;

    fn meta(value: &str) -> Command {
        Command::Meta {
            key: CARD_META_KEY.to_string(),
            value: value.to_string(),
        }
    }

    fn two_page_doc() -> Document {
        Document {
            page_size: Size::a4(),
            pages: vec![
                Page {
                    commands: vec![meta("arrive"), meta("depart")],
                },
                Page {
                    commands: vec![
                        meta("travel"),
                        Command::Meta {
                            key: "other".to_string(),
                            value: "ignored".to_string(),
                        },
                    ],
                },
            ],
        }
    }

    #[test]
    fn counts_meta_per_page() {
        let ctx = compute_page_data_context(&two_page_doc(), &[CARD_META_KEY]);
        assert_eq!(ctx.page_count, 2);
        assert_eq!(ctx.counts(CARD_META_KEY), vec![2, 1]);
        assert_eq!(ctx.totals.get(CARD_META_KEY), Some(&3));
        assert_eq!(ctx.counts("other"), vec![0, 0]);
    }

    #[test]
    fn placeholder_substitution() {
        let ctx = compute_page_data_context(&two_page_doc(), &[CARD_META_KEY]);
        assert_eq!(
            substitute_placeholders(
                "Page {page} of {pages} ({count:vocab.card}/{total_count:vocab.card}) {date}",
                1,
                2,
                "2026-10-16",
                Some(&ctx)
            ),
            "Page 1 of 2 (2/3) 2026-10-16"
        );
        assert_eq!(
            substitute_placeholders("{unknown} {count:missing} {open", 2, 2, "", Some(&ctx)),
            "{unknown} {count:missing} {open"
        );
    }

    #[test]
    fn list_tokens_are_not_expanded() {
        let ctx = compute_page_data_context(&two_page_doc(), &[CARD_META_KEY]);
        assert_eq!(
            substitute_placeholders("{every:vocab.card} {total_count:other}", 1, 2, "", Some(&ctx)),
            "{every:vocab.card} {total_count:other}"
        );
    }
}
