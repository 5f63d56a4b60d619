//! Card pagination for the print output.
//!
//! Every card is measured before it is drawn. The estimate comes from the
//! same `DetailSection` list the draw pass walks, and `CardGeometry::validate`
//! guarantees the fixed part of a card fits inside `base_card_height`, so the
//! drawn extent of a card never passes `top + estimate`.

use crate::canvas::{Canvas, Command, Document};
use crate::card::{CardLimits, CardModel, DetailSection};
use crate::debug::RenderTrace;
use crate::error::LayoutError;
use crate::font::{BuiltinFont, measure_text_width, wrap_text};
use crate::lesson::LessonHeader;
use crate::page_data::{CARD_META_KEY, PageDataContext, substitute_placeholders};
use crate::types::{Color, Margins, Pt, Size};
use log::debug;
use serde_json::json;

const DEFINITION_MAX_LINES: usize = 3;
const EXAMPLE_MAX_LINES: usize = 2;
// Term, part-of-speech badge and group badge side by side, with their gaps.
const MIN_INNER_WIDTH: f32 = 240.0;

const TEXT: Color = Color {
    r: 0.067,
    g: 0.094,
    b: 0.153,
};
const MUTED: Color = Color {
    r: 0.420,
    g: 0.447,
    b: 0.502,
};
const BORDER: Color = Color {
    r: 0.898,
    g: 0.906,
    b: 0.922,
};

/// Fixed page geometry for the print layout. All values are points.
#[derive(Debug, Clone, PartialEq)]
pub struct CardGeometry {
    pub page_size: Size,
    /// `top` is where content starts on every page; `bottom` is the footer band.
    pub margins: Margins,
    pub card_padding: Pt,
    /// Height of a card with no detail sections.
    pub base_card_height: Pt,
    /// Increment for each single-line detail section.
    pub line_section_height: Pt,
    /// Increment for the two-row semantic grid.
    pub semantic_map_height: Pt,
    pub card_gap: Pt,
    /// Horizontal offset of grid values from their column start.
    pub semantic_label_width: Pt,
    pub title_font_size: Pt,
    pub term_font_size: Pt,
    pub body_font_size: Pt,
    pub detail_font_size: Pt,
    pub badge_font_size: Pt,
    pub limits: CardLimits,
}

impl Default for CardGeometry {
    fn default() -> Self {
        Self {
            page_size: Size::a4(),
            margins: Margins {
                top: Pt::from_f32(50.0),
                right: Pt::from_f32(40.0),
                bottom: Pt::from_f32(60.0),
                left: Pt::from_f32(40.0),
            },
            card_padding: Pt::from_f32(12.0),
            base_card_height: Pt::from_f32(144.0),
            line_section_height: Pt::from_f32(14.0),
            semantic_map_height: Pt::from_f32(32.0),
            card_gap: Pt::from_f32(12.0),
            semantic_label_width: Pt::from_f32(58.0),
            title_font_size: Pt::from_f32(20.0),
            term_font_size: Pt::from_f32(14.0),
            body_font_size: Pt::from_f32(10.0),
            detail_font_size: Pt::from_f32(8.0),
            badge_font_size: Pt::from_f32(8.0),
            limits: CardLimits::print(),
        }
    }
}

fn line_height(font_size: Pt) -> Pt {
    font_size * 1.25
}

impl CardGeometry {
    pub fn card_width(&self) -> Pt {
        self.page_size.width - self.margins.left - self.margins.right
    }

    /// Lowest y a card may reach; the footer band lies below it.
    pub fn max_y(&self) -> Pt {
        self.page_size.height - self.margins.bottom
    }

    fn badge_height(&self) -> Pt {
        line_height(self.badge_font_size) + Pt::from_f32(4.0)
    }

    fn header_height(&self) -> Pt {
        (line_height(self.term_font_size) + Pt::from_f32(2.0))
            .max(self.badge_height() + Pt::from_f32(2.0))
    }

    fn example_block_height(&self, lines: usize) -> Pt {
        line_height(self.body_font_size) * (lines.max(1) as i32) + Pt::from_f32(8.0)
    }

    /// What the fixed part of a card consumes when every capped block is full.
    pub fn required_base_height(&self) -> Pt {
        self.card_padding * 2
            + self.header_height()
            + Pt::from_f32(4.0)
            + line_height(self.body_font_size) * (1 + DEFINITION_MAX_LINES as i32)
            + Pt::from_f32(4.0)
            + self.example_block_height(EXAMPLE_MAX_LINES)
            + Pt::from_f32(6.0)
    }

    pub fn validate(&self) -> Result<(), String> {
        let inner = self.card_width() - self.card_padding * 2;
        if inner < Pt::from_f32(MIN_INNER_WIDTH) {
            return Err(format!(
                "card content width {:.1}pt is below the {MIN_INNER_WIDTH}pt the header row needs",
                inner.to_f32()
            ));
        }
        let max_y = self.max_y();
        if max_y <= Pt::ZERO || max_y >= self.page_size.height {
            return Err("max_y must lie inside the page, above its bottom edge".to_string());
        }
        if self.margins.top < Pt::ZERO || self.margins.top >= max_y {
            return Err("top margin must be above max_y".to_string());
        }
        if self.base_card_height < self.required_base_height() {
            return Err(format!(
                "base card height {:.1}pt is below the {:.1}pt a card needs",
                self.base_card_height.to_f32(),
                self.required_base_height().to_f32()
            ));
        }
        let detail_line = line_height(self.detail_font_size);
        if self.line_section_height < detail_line || self.semantic_map_height < detail_line * 2 {
            return Err("detail section increments are smaller than their text".to_string());
        }
        Ok(())
    }
}

impl DetailSection {
    pub fn height(&self, geometry: &CardGeometry) -> Pt {
        match self {
            DetailSection::SemanticMap(_) => geometry.semantic_map_height,
            _ => geometry.line_section_height,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DetailSection::AdditionalExample(_) => "Another example:",
            DetailSection::WordFamily { .. } => "Word family:",
            DetailSection::Collocations { .. } => "Collocations:",
            DetailSection::UsageNotes(_) => "Usage:",
            DetailSection::SemanticMap(_) => "",
        }
    }

    /// Draws the section into the band `[y, y + height)`.
    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, width: Pt, geometry: &CardGeometry) {
        let size = geometry.detail_font_size;
        let text = match self {
            DetailSection::AdditionalExample(text) | DetailSection::UsageNotes(text) => text,
            DetailSection::WordFamily { text, .. } | DetailSection::Collocations { text, .. } => {
                text
            }
            DetailSection::SemanticMap(entries) => {
                let row_height = geometry.semantic_map_height / 2;
                let column_width = width / 2;
                for (row, pair) in entries.chunks(2).take(2).enumerate() {
                    let row_y = y + row_height * (row as i32);
                    for (column, entry) in pair.iter().enumerate() {
                        let column_x = x + column_width * (column as i32);
                        let value = if entry.text.is_empty() {
                            "-"
                        } else {
                            entry.text.as_str()
                        };
                        draw_labelled_line(
                            canvas,
                            column_x,
                            row_y,
                            column_width - Pt::from_f32(6.0),
                            &format!("{}:", entry.category.label()),
                            Some(geometry.semantic_label_width),
                            value,
                            size,
                        );
                    }
                }
                return;
            }
        };
        draw_labelled_line(canvas, x, y, width, self.label(), None, text, size);
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_labelled_line(
    canvas: &mut Canvas,
    x: Pt,
    y: Pt,
    width: Pt,
    label: &str,
    value_offset: Option<Pt>,
    value: &str,
    size: Pt,
) {
    let label_width = measure_text_width(BuiltinFont::HelveticaBold, size, label);
    let offset = value_offset.unwrap_or(label_width + Pt::from_f32(4.0));
    canvas.set_fill_color(MUTED);
    canvas.set_font(BuiltinFont::HelveticaBold, size);
    canvas.draw_string(x, y, label);

    if let Some(line) = first_line(value, BuiltinFont::Helvetica, size, width - offset) {
        canvas.set_fill_color(TEXT);
        canvas.set_font(BuiltinFont::Helvetica, size);
        canvas.draw_string(x + offset, y, line);
    }
}

pub fn estimate_card_height(card: &CardModel, geometry: &CardGeometry) -> Pt {
    geometry.base_card_height
        + card
            .details
            .iter()
            .map(|section| section.height(geometry))
            .sum::<Pt>()
}

/// Where one card landed. `content_bottom` is the lowest point its content reached.
#[derive(Debug, Clone, PartialEq)]
pub struct CardPlacement {
    pub term: String,
    pub page: usize,
    pub top: Pt,
    pub estimated_height: Pt,
    pub content_bottom: Pt,
}

#[derive(Debug, Clone)]
pub struct LayoutOutcome {
    pub document: Document,
    pub placements: Vec<CardPlacement>,
}

pub fn layout_cards(
    header: &LessonHeader,
    cards: &[CardModel],
    geometry: &CardGeometry,
) -> Result<LayoutOutcome, LayoutError> {
    layout_cards_logged(header, cards, geometry, None)
}

pub(crate) fn layout_cards_logged(
    header: &LessonHeader,
    cards: &[CardModel],
    geometry: &CardGeometry,
    mut trace: Option<&mut RenderTrace<'_>>,
) -> Result<LayoutOutcome, LayoutError> {
    if cards.is_empty() {
        return Err(LayoutError::NoVocabulary);
    }
    let max_y = geometry.max_y();
    let usable = max_y - geometry.margins.top;

    let mut canvas = Canvas::new(geometry.page_size);
    let mut y = draw_title_block(&mut canvas, header, cards.len(), geometry);
    let mut placements: Vec<CardPlacement> = Vec::with_capacity(cards.len());

    for card in cards {
        let estimate = estimate_card_height(card, geometry);
        if estimate > usable {
            return Err(LayoutError::Unplaceable(format!(
                "\"{}\" needs {:.1}pt, a page offers {:.1}pt",
                card.term,
                estimate.to_f32(),
                usable.to_f32()
            )));
        }

        if y + estimate > max_y && y > geometry.margins.top {
            debug!(
                "page break before {:?}: y={:.1} + {:.1} > {:.1}",
                card.term,
                y.to_f32(),
                estimate.to_f32(),
                max_y.to_f32()
            );
            if let Some(trace) = trace.as_mut() {
                trace.event(
                    "layout.page_break",
                    json!({
                        "before": card.term,
                        "from_page": canvas.page_number(),
                        "y": y.to_f32(),
                        "estimate": estimate.to_f32(),
                    }),
                );
            }
            canvas.show_page();
            y = geometry.margins.top;
        }

        canvas.meta(CARD_META_KEY, card.term.clone());
        let content_bottom = draw_card(&mut canvas, card, y, estimate, geometry);
        let placement = CardPlacement {
            term: card.term.clone(),
            page: canvas.page_number(),
            top: y,
            estimated_height: estimate,
            content_bottom,
        };
        debug!(
            "placed {:?} on page {} at y={:.1} (estimate {:.1}pt)",
            placement.term,
            placement.page,
            y.to_f32(),
            estimate.to_f32()
        );
        if let Some(trace) = trace.as_mut() {
            trace.event(
                "layout.card",
                json!({
                    "term": placement.term,
                    "page": placement.page,
                    "top": y.to_f32(),
                    "estimate": estimate.to_f32(),
                    "content_bottom": content_bottom.to_f32(),
                    "sections": card.details.len(),
                }),
            );
        }
        placements.push(placement);
        y += estimate + geometry.card_gap;
    }

    Ok(LayoutOutcome {
        document: canvas.finish(),
        placements,
    })
}

fn draw_title_block(
    canvas: &mut Canvas,
    header: &LessonHeader,
    word_count: usize,
    geometry: &CardGeometry,
) -> Pt {
    let x = geometry.margins.left;
    let width = geometry.card_width();
    let mut y = geometry.margins.top;

    canvas.set_fill_color(TEXT);
    canvas.set_font(BuiltinFont::HelveticaBold, geometry.title_font_size);
    for line in wrap_text(
        &header.title,
        BuiltinFont::HelveticaBold,
        geometry.title_font_size,
        width,
        2,
    ) {
        canvas.draw_string(x, y, line);
        y += line_height(geometry.title_font_size);
    }

    let count = match word_count {
        1 => "1 word".to_string(),
        n => format!("{n} words"),
    };
    let info = if header.level.is_empty() {
        count
    } else {
        format!("Level: {} | {}", header.level, count)
    };
    canvas.set_fill_color(MUTED);
    canvas.set_font(BuiltinFont::Helvetica, geometry.body_font_size);
    if let Some(line) = first_line(&info, BuiltinFont::Helvetica, geometry.body_font_size, width) {
        canvas.draw_string(x, y, line);
    }
    y += line_height(geometry.body_font_size) + Pt::from_f32(6.0);

    canvas.set_fill_color(BORDER);
    canvas.draw_rect(x, y, width, Pt::from_f32(1.0));
    y + Pt::from_f32(1.0) + geometry.card_gap
}

/// Draws one card with its frame `estimate` tall and returns the content bottom.
fn draw_card(
    canvas: &mut Canvas,
    card: &CardModel,
    top: Pt,
    estimate: Pt,
    geometry: &CardGeometry,
) -> Pt {
    let left = geometry.margins.left;
    let width = geometry.card_width();
    let pad = geometry.card_padding;
    let accent = card.part_of_speech_color.to_color();

    canvas.set_fill_color(Color::WHITE);
    canvas.set_stroke_color(BORDER);
    canvas.set_line_width(Pt::from_f32(0.75));
    canvas.rect(left, top, width, estimate);
    canvas.fill_stroke();
    canvas.set_fill_color(accent);
    canvas.draw_rect(left, top, Pt::from_f32(3.0), estimate);

    let x = left + pad;
    let inner = width - pad * 2;
    let mut y = top + pad;

    draw_header_row(canvas, card, x, y, inner, geometry);
    y += geometry.header_height() + Pt::from_f32(4.0);

    let body = geometry.body_font_size;
    let body_line = line_height(body);
    canvas.set_fill_color(TEXT);
    canvas.set_font(BuiltinFont::HelveticaBold, body);
    canvas.draw_string(x, y, "Definition:");
    y += body_line;
    canvas.set_font(BuiltinFont::Helvetica, body);
    for line in wrap_text(
        &card.definition,
        BuiltinFont::Helvetica,
        body,
        inner,
        DEFINITION_MAX_LINES,
    ) {
        canvas.draw_string(x, y, line);
        y += body_line;
    }
    y += Pt::from_f32(4.0);

    let example_lines = wrap_text(
        &format!("Example: {}", card.example),
        BuiltinFont::HelveticaOblique,
        body,
        inner - Pt::from_f32(12.0),
        EXAMPLE_MAX_LINES,
    );
    let block_height = geometry.example_block_height(example_lines.len());
    canvas.set_fill_color(accent.tint(0.9));
    canvas.draw_rect(x, y, inner, block_height);
    canvas.set_fill_color(accent);
    canvas.draw_rect(x, y, Pt::from_f32(3.0), block_height);
    canvas.set_fill_color(TEXT);
    canvas.set_font(BuiltinFont::HelveticaOblique, body);
    let mut line_y = y + Pt::from_f32(4.0);
    for line in example_lines {
        canvas.draw_string(x + Pt::from_f32(8.0), line_y, line);
        line_y += body_line;
    }
    y += block_height + Pt::from_f32(6.0);

    for section in &card.details {
        section.draw(canvas, x, y, inner, geometry);
        y += section.height(geometry);
    }

    y + pad
}

fn first_line(text: &str, font: BuiltinFont, size: Pt, max_width: Pt) -> Option<String> {
    if max_width <= Pt::ZERO {
        return None;
    }
    wrap_text(text, font, size, max_width, 1).into_iter().next()
}

// Header row shares of the inner width; what is left goes to the pronunciation.
const TERM_SHARE: f32 = 0.45;
const POS_BADGE_SHARE: f32 = 0.2;
const GROUP_BADGE_SHARE: f32 = 0.25;
const HEADER_GAP: f32 = 8.0;
const BADGE_PADDING: f32 = 4.0;

fn draw_header_row(
    canvas: &mut Canvas,
    card: &CardModel,
    x: Pt,
    y: Pt,
    width: Pt,
    geometry: &CardGeometry,
) {
    let badge_size = geometry.badge_font_size;
    let badge_height = geometry.badge_height();
    let padding = Pt::from_f32(BADGE_PADDING);
    let gap = Pt::from_f32(HEADER_GAP);
    let mut right_edge = x + width;

    if let Some(badge) = &card.semantic_badge {
        let max_label = width * GROUP_BADGE_SHARE - padding * 2;
        if let Some(label) = first_line(&badge.label, BuiltinFont::HelveticaBold, badge_size, max_label)
        {
            let badge_width =
                measure_text_width(BuiltinFont::HelveticaBold, badge_size, &label) + padding * 2;
            let badge_x = right_edge - badge_width;
            draw_badge(canvas, badge_x, y, badge_width, badge_height, badge.color.to_color());
            canvas.set_font(BuiltinFont::HelveticaBold, badge_size);
            canvas.draw_string(badge_x + padding, y + Pt::from_f32(2.0), label);
            right_edge = badge_x - gap;
        }
    }

    let term_size = geometry.term_font_size;
    let term = first_line(&card.term, BuiltinFont::HelveticaBold, term_size, width * TERM_SHARE)
        .unwrap_or_default();
    canvas.set_fill_color(TEXT);
    canvas.set_font(BuiltinFont::HelveticaBold, term_size);
    let mut cursor =
        x + measure_text_width(BuiltinFont::HelveticaBold, term_size, &term) + gap;
    canvas.draw_string(x, y, term);

    let max_pos = width * POS_BADGE_SHARE - padding * 2;
    if let Some(label) = first_line(
        &card.part_of_speech_badge,
        BuiltinFont::HelveticaBold,
        badge_size,
        max_pos,
    ) {
        let pos_width = measure_text_width(BuiltinFont::HelveticaBold, badge_size, &label) + padding * 2;
        let pos_color = card.part_of_speech_color.to_color();
        draw_badge(canvas, cursor, y + Pt::from_f32(2.0), pos_width, badge_height, pos_color);
        canvas.set_font(BuiltinFont::HelveticaBold, badge_size);
        canvas.draw_string(cursor + padding, y + Pt::from_f32(4.0), label);
        cursor += pos_width + gap;
    }

    if let Some(pronunciation) = &card.pronunciation {
        let body = geometry.body_font_size;
        if let Some(line) = first_line(
            &format!("/{pronunciation}/"),
            BuiltinFont::HelveticaOblique,
            body,
            right_edge - cursor,
        ) {
            canvas.set_fill_color(MUTED);
            canvas.set_font(BuiltinFont::HelveticaOblique, body);
            canvas.draw_string(cursor, y + Pt::from_f32(3.0), line);
        }
    }
}

fn draw_badge(canvas: &mut Canvas, x: Pt, y: Pt, width: Pt, height: Pt, color: Color) {
    canvas.set_fill_color(color);
    canvas.draw_rect(x, y, width, height);
    canvas.set_fill_color(Color::WHITE);
}

/// Footer lines stamped on every page once the page count is known.
#[derive(Debug, Clone, PartialEq)]
pub struct PageFooterSpec {
    pub left: Option<String>,
    pub right: Option<String>,
    pub font_size: Pt,
    pub color: Color,
    pub y_from_bottom: Pt,
}

impl Default for PageFooterSpec {
    fn default() -> Self {
        Self {
            left: Some("Generated on {date}".to_string()),
            right: Some("Page {page} of {pages}".to_string()),
            font_size: Pt::from_f32(8.0),
            color: MUTED,
            y_from_bottom: Pt::from_f32(30.0),
        }
    }
}

pub fn apply_page_footer(
    doc: &mut Document,
    spec: &PageFooterSpec,
    geometry: &CardGeometry,
    date: &str,
    page_data: Option<&PageDataContext>,
) {
    let total_pages = doc.pages.len();
    // Our coordinate system is top-left origin; DrawString expects y = top of the text box.
    let y = (doc.page_size.height - spec.y_from_bottom - spec.font_size).max(Pt::ZERO);
    let left_x = geometry.margins.left;
    let right_edge = doc.page_size.width - geometry.margins.right;

    for (idx0, page) in doc.pages.iter_mut().enumerate() {
        let page_number = idx0 + 1;
        let mut stamp = |template: &str, align_right: bool| {
            let text = substitute_placeholders(template, page_number, total_pages, date, page_data);
            let x = if align_right {
                right_edge - measure_text_width(BuiltinFont::Helvetica, spec.font_size, &text)
            } else {
                left_x
            };
            page.commands.push(Command::SetFillColor(spec.color));
            page.commands.push(Command::SetFont(BuiltinFont::Helvetica));
            page.commands.push(Command::SetFontSize(spec.font_size));
            page.commands.push(Command::DrawString { x, y, text });
        };
        if let Some(left) = spec.left.as_deref() {
            stamp(left, false);
        }
        if let Some(right) = spec.right.as_deref() {
            stamp(right, true);
        }
    }
}
