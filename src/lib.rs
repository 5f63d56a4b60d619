//! Lesson vocabulary rendering.
//!
//! A lesson arrives as loosely shaped JSON. `resolve_vocabulary` reconciles it
//! into canonical [`VocabularyWord`] records, and [`VocabDeck`] turns those into
//! either a self-contained HTML card sheet or a paginated PDF. Both outputs
//! share one card model, so colors, caps and section order agree.

mod canvas;
mod card;
mod debug;
mod error;
mod font;
mod layout;
mod lesson;
pub mod markup;
mod metrics;
mod page_data;
mod palette;
mod pdf;
mod pdfinspect;
pub mod pronunciation;
mod types;
mod vocabulary;

pub use canvas::{Canvas, Command, Document, Page};
pub use card::{
    Badge, CardLimits, CardModel, DetailSection, SectionKind, SemanticCategory, SemanticEntry,
    truncate_chars,
};
use debug::{DebugLogger, RenderTrace};
pub use error::{LayoutError, VocabDeckError};
pub use font::{BuiltinFont, measure_text_width, wrap_text};
pub use layout::{
    CardGeometry, CardPlacement, LayoutOutcome, PageFooterSpec, apply_page_footer,
    estimate_card_height, layout_cards,
};
pub use lesson::{LessonDocument, LessonHeader, Section};
pub use metrics::{DocumentMetrics, PageMetrics};
pub use page_data::{
    CARD_META_KEY, PageDataContext, compute_page_data_context, substitute_placeholders,
};
pub use palette::{
    NEUTRAL_GRAY, PART_OF_SPEECH_LEGEND, Swatch, color_for_part_of_speech,
    color_for_semantic_group, label_hash,
};
use pdf::PdfOptions;
pub use pdfinspect::{PdfInspectError, PdfInspectReport, inspect_pdf_bytes};
pub use pronunciation::Emphasis;
pub use types::{Color, Margins, Pt, Size};
pub use vocabulary::{
    Pronunciation, SemanticMap, VocabularyWord, WordFamily, normalize, parse_list,
    resolve_vocabulary,
};

use chrono::{Local, NaiveDate};
use log::info;
use std::path::PathBuf;
use std::time::Instant;

pub struct VocabDeck {
    geometry: CardGeometry,
    footer: PageFooterSpec,
    generated_on: Option<NaiveDate>,
    document_title: Option<String>,
    debug: Option<DebugLogger>,
}

impl Default for VocabDeck {
    fn default() -> Self {
        Self {
            geometry: CardGeometry::default(),
            footer: PageFooterSpec::default(),
            generated_on: None,
            document_title: None,
            debug: None,
        }
    }
}

impl VocabDeck {
    pub fn builder() -> VocabDeckBuilder {
        VocabDeckBuilder::new()
    }

    pub fn geometry(&self) -> &CardGeometry {
        &self.geometry
    }

    /// HTML card sheet for browser preview. Never fails.
    pub fn render_markup(&self, lesson: &LessonDocument, target_level: &str) -> String {
        let header = LessonHeader::new(lesson, target_level);
        let words = resolve_vocabulary(lesson);
        markup::render(&header, &words)
    }

    pub fn render_paginated(
        &self,
        lesson: &LessonDocument,
        target_level: &str,
    ) -> Result<Vec<u8>, VocabDeckError> {
        self.render_with_metrics(lesson, target_level)
            .map(|(bytes, _)| bytes)
    }

    pub fn render_paginated_words(
        &self,
        header: &LessonHeader,
        words: &[VocabularyWord],
    ) -> Result<Vec<u8>, VocabDeckError> {
        self.render_words_with_metrics(header, words)
            .map(|(bytes, _)| bytes)
    }

    pub fn render_with_metrics(
        &self,
        lesson: &LessonDocument,
        target_level: &str,
    ) -> Result<(Vec<u8>, DocumentMetrics), VocabDeckError> {
        let header = LessonHeader::new(lesson, target_level);
        let words = resolve_vocabulary(lesson);
        self.render_words_with_metrics(&header, &words)
    }

    pub fn render_words_with_metrics(
        &self,
        header: &LessonHeader,
        words: &[VocabularyWord],
    ) -> Result<(Vec<u8>, DocumentMetrics), VocabDeckError> {
        let mut trace = self.debug.as_ref().map(RenderTrace::new);
        let result = self
            .paginate(header, words, trace.as_mut())
            .map_err(VocabDeckError::Generation);
        if let Some(trace) = trace {
            trace.finish("render_paginated");
        }
        result
    }

    /// Renders each lesson on the rayon pool. Results keep input order.
    pub fn render_many_parallel(
        &self,
        lessons: &[LessonDocument],
        target_level: &str,
    ) -> Vec<Result<Vec<u8>, VocabDeckError>> {
        use rayon::prelude::*;

        let mut results: Vec<(usize, Result<Vec<u8>, VocabDeckError>)> = lessons
            .par_iter()
            .enumerate()
            .map(|(idx, lesson)| (idx, self.render_paginated(lesson, target_level)))
            .collect();
        results.sort_by_key(|(idx, _)| *idx);
        results.into_iter().map(|(_, res)| res).collect()
    }

    fn paginate(
        &self,
        header: &LessonHeader,
        words: &[VocabularyWord],
        mut trace: Option<&mut RenderTrace<'_>>,
    ) -> Result<(Vec<u8>, DocumentMetrics), LayoutError> {
        let started = Instant::now();
        let cards = CardModel::build_all(words, &self.geometry.limits);
        let outcome =
            layout::layout_cards_logged(header, &cards, &self.geometry, trace.as_deref_mut())?;
        let mut document = outcome.document;

        let page_data = compute_page_data_context(&document, &[CARD_META_KEY]);
        apply_page_footer(
            &mut document,
            &self.footer,
            &self.geometry,
            &self.date_label(),
            Some(&page_data),
        );

        let mut metrics = DocumentMetrics::for_pages(document.pages.len());
        for ((page_metrics, page), words_on_page) in metrics
            .pages
            .iter_mut()
            .zip(&document.pages)
            .zip(page_data.counts(CARD_META_KEY))
        {
            page_metrics.word_count = words_on_page;
            page_metrics.command_count = page.commands.len();
        }

        let options = PdfOptions {
            document_title: Some(
                self.document_title
                    .clone()
                    .unwrap_or_else(|| header.title.clone()),
            ),
            ..PdfOptions::default()
        };
        let bytes = pdf::document_to_pdf(&document, Some(&mut metrics), &options)?;
        metrics.total_bytes = bytes.len();
        metrics.total_render_ms = started.elapsed().as_secs_f64() * 1000.0;

        info!(
            "rendered {:?}: {} word(s) on {} page(s), {} bytes in {:.1}ms",
            header.title,
            metrics.word_count(),
            metrics.pages.len(),
            metrics.total_bytes,
            metrics.total_render_ms
        );
        if let Some(trace) = trace {
            trace.increment("render.pages", metrics.pages.len() as u64);
            trace.increment("render.bytes", metrics.total_bytes as u64);
        }
        Ok((bytes, metrics))
    }

    fn date_label(&self) -> String {
        self.generated_on
            .unwrap_or_else(|| Local::now().date_naive())
            .format("%B %-d, %Y")
            .to_string()
    }
}

#[derive(Clone)]
pub struct VocabDeckBuilder {
    geometry: CardGeometry,
    footer: PageFooterSpec,
    generated_on: Option<NaiveDate>,
    document_title: Option<String>,
    debug_path: Option<PathBuf>,
}

impl Default for VocabDeckBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VocabDeckBuilder {
    pub fn new() -> Self {
        Self {
            geometry: CardGeometry::default(),
            footer: PageFooterSpec::default(),
            generated_on: None,
            document_title: None,
            debug_path: None,
        }
    }

    pub fn page_size(mut self, size: Size) -> Self {
        self.geometry.page_size = size;
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.geometry.margins = margins;
        self
    }

    pub fn geometry(mut self, geometry: CardGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn card_limits(mut self, limits: CardLimits) -> Self {
        self.geometry.limits = limits;
        self
    }

    /// Left footer template; `{page}`, `{pages}` and `{date}` are substituted per page.
    pub fn footer_left(mut self, template: impl Into<String>) -> Self {
        self.footer.left = Some(template.into());
        self
    }

    pub fn footer_right(mut self, template: impl Into<String>) -> Self {
        self.footer.right = Some(template.into());
        self
    }

    pub fn without_footer(mut self) -> Self {
        self.footer.left = None;
        self.footer.right = None;
        self
    }

    /// Fixes the `{date}` placeholder; the local date is used otherwise.
    pub fn generated_on(mut self, date: NaiveDate) -> Self {
        self.generated_on = Some(date);
        self
    }

    /// PDF `/Title`; the lesson title is used otherwise.
    pub fn document_title(mut self, title: impl Into<String>) -> Self {
        self.document_title = Some(title.into());
        self
    }

    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<VocabDeck, VocabDeckError> {
        self.geometry
            .validate()
            .map_err(VocabDeckError::InvalidConfiguration)?;
        if self.footer.font_size <= Pt::ZERO {
            return Err(VocabDeckError::InvalidConfiguration(
                "footer font size must be positive".to_string(),
            ));
        }
        let debug = match self.debug_path {
            Some(path) => Some(DebugLogger::new(&path).map_err(|err| {
                VocabDeckError::InvalidConfiguration(format!(
                    "cannot open debug log {}: {err}",
                    path.display()
                ))
            })?),
            None => None,
        };
        Ok(VocabDeck {
            geometry: self.geometry,
            footer: self.footer,
            generated_on: self.generated_on,
            document_title: self.document_title,
            debug,
        })
    }
}

/// Paginated PDF with the default configuration.
pub fn render_paginated(
    header: &LessonHeader,
    words: &[VocabularyWord],
) -> Result<Vec<u8>, VocabDeckError> {
    VocabDeck::default().render_paginated_words(header, words)
}

/// Download name such as `travel-basics-vocabulary.pdf`.
pub fn suggested_filename(title: &str, extension: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    let extension = extension.trim_start_matches('.');
    if slug.is_empty() {
        format!("vocabulary.{extension}")
    } else {
        format!("{slug}-vocabulary.{extension}")
    }
}
