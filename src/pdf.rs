use crate::canvas::{Command, Document, Page};
use crate::font::BuiltinFont;
use crate::metrics::DocumentMetrics;
use crate::types::{Color, Pt, Size};
use fixed::types::I32F32;
use log::warn;
use std::io::{self, Write};

#[derive(Debug, Clone)]
pub(crate) struct PdfOptions {
    pub document_title: Option<String>,
    pub producer: String,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            document_title: None,
            producer: format!("vocabdeck {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

const PDF_CATALOG_ID: usize = 1;
const PDF_PAGES_ID: usize = 2;
const PDF_RESOURCES_ID: usize = 3;
const PDF_FIRST_FONT_ID: usize = 4;

pub(crate) struct PdfStreamWriter<'a, W: Write> {
    writer: &'a mut W,
    offset: usize,
    offsets: Vec<usize>, // index by object id; 0 is the free object.
    next_id: usize,
    page_size: Size,
    options: PdfOptions,
    page_ids: Vec<usize>,
    page_content_bytes: Vec<usize>,
    replaced_chars: usize,
}

impl<'a, W: Write> PdfStreamWriter<'a, W> {
    pub(crate) fn new(writer: &'a mut W, page_size: Size, options: PdfOptions) -> io::Result<Self> {
        let mut offset: usize = 0;
        write_bytes(writer, b"%PDF-1.7\n", &mut offset)?;
        write_bytes(writer, b"%\xE2\xE3\xCF\xD3\n", &mut offset)?;

        let first_free = PDF_FIRST_FONT_ID + BuiltinFont::ALL.len();
        Ok(Self {
            writer,
            offset,
            offsets: vec![0; first_free],
            next_id: first_free,
            page_size,
            options,
            page_ids: Vec::new(),
            page_content_bytes: Vec::new(),
            replaced_chars: 0,
        })
    }

    pub(crate) fn add_document(&mut self, document: &Document) -> io::Result<()> {
        if (document.page_size.width - self.page_size.width).abs() > Pt::from_f32(0.01)
            || (document.page_size.height - self.page_size.height).abs() > Pt::from_f32(0.01)
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "mixed page sizes are not supported in a single PDF stream",
            ));
        }
        for page in &document.pages {
            self.add_page(page)?;
        }
        Ok(())
    }

    fn add_page(&mut self, page: &Page) -> io::Result<()> {
        let start = self.alloc_ids(2);
        let content_id = start;
        let page_id = start + 1;

        let (content_stream, replaced) = render_page(page, self.page_size.height);
        self.replaced_chars += replaced;
        self.page_content_bytes.push(content_stream.len());
        self.write_object(content_id, &stream_object(&content_stream))?;
        self.page_ids.push(page_id);

        let page_obj = format!(
            "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Resources {} 0 R /Contents {} 0 R >>",
            PDF_PAGES_ID,
            fmt_pt(self.page_size.width),
            fmt_pt(self.page_size.height),
            PDF_RESOURCES_ID,
            content_id,
        );
        self.write_object(page_id, &page_obj)
    }

    /// Writes shared objects, xref and trailer. Returns the total byte count.
    pub(crate) fn finish(&mut self) -> io::Result<usize> {
        let mut font_entries: Vec<(String, usize)> = Vec::new();
        for (idx, font) in BuiltinFont::ALL.iter().enumerate() {
            let id = PDF_FIRST_FONT_ID + idx;
            self.write_object(id, &font_object(font.base_font()))?;
            font_entries.push((font.resource_name().to_string(), id));
        }
        self.write_object(
            PDF_RESOURCES_ID,
            &format!("<< /Font {} >>", font_resources(&font_entries)),
        )?;

        let kids = self
            .page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        self.write_object(
            PDF_PAGES_ID,
            &format!(
                "<< /Type /Pages /Count {} /Kids [{}] >>",
                self.page_ids.len(),
                kids
            ),
        )?;
        self.write_object(
            PDF_CATALOG_ID,
            &format!("<< /Type /Catalog /Pages {} 0 R >>", PDF_PAGES_ID),
        )?;

        let info_id = self.alloc_ids(1);
        let info = info_object(self.options.document_title.as_deref(), &self.options.producer);
        self.write_object(info_id, &info)?;

        if self.replaced_chars > 0 {
            warn!(
                "{} character(s) outside WinAnsi were replaced with '?'",
                self.replaced_chars
            );
        }

        let xref_start = self.offset;
        let mut xref = format!("xref\n0 {}\n", self.next_id);
        xref.push_str("0000000000 65535 f \n");
        for offset in self.offsets.iter().skip(1) {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        write_str(self.writer, &xref, &mut self.offset)?;
        let trailer = format!(
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.next_id, PDF_CATALOG_ID, info_id, xref_start
        );
        write_str(self.writer, &trailer, &mut self.offset)?;
        self.writer.flush()?;
        Ok(self.offset)
    }

    pub(crate) fn page_content_bytes(&self) -> &[usize] {
        &self.page_content_bytes
    }

    fn alloc_ids(&mut self, count: usize) -> usize {
        let start = self.next_id;
        self.next_id += count;
        self.offsets.resize(self.next_id, 0);
        start
    }

    fn write_object(&mut self, obj_id: usize, body: &str) -> io::Result<()> {
        write_pdf_object(
            self.writer,
            &mut self.offset,
            &mut self.offsets,
            obj_id,
            body,
        )
    }
}

pub(crate) fn document_to_pdf(
    document: &Document,
    metrics: Option<&mut DocumentMetrics>,
    options: &PdfOptions,
) -> io::Result<Vec<u8>> {
    let mut out: Vec<u8> = Vec::new();
    let total = {
        let mut writer = PdfStreamWriter::new(&mut out, document.page_size, options.clone())?;
        writer.add_document(document)?;
        let total = writer.finish()?;
        if let Some(metrics) = metrics {
            for (page, bytes) in metrics.pages.iter_mut().zip(writer.page_content_bytes()) {
                page.content_bytes = *bytes;
            }
        }
        total
    };
    debug_assert_eq!(total, out.len());
    Ok(out)
}

fn render_page(page: &Page, page_height: Pt) -> (String, usize) {
    let mut out = String::new();
    let mut replaced = 0usize;
    let mut current_font = BuiltinFont::Helvetica;
    let mut current_font_size = Pt::from_f32(12.0);

    for cmd in &page.commands {
        match cmd {
            Command::Meta { .. } => {}
            Command::SetFillColor(color) => out.push_str(&color_to_pdf_fill(*color)),
            Command::SetStrokeColor(color) => out.push_str(&color_to_pdf_stroke(*color)),
            Command::SetLineWidth(width) => {
                out.push_str(&format!("{} w\n", fmt_pt(*width)));
            }
            Command::SetFont(font) => current_font = *font,
            Command::SetFontSize(size) => current_font_size = *size,
            Command::Rect {
                x,
                y,
                width,
                height,
            } => {
                // Coordinates are in our top-left-origin space; PDF uses bottom-left-origin.
                out.push_str(&format!(
                    "{} {} {} {} re\n",
                    fmt_pt(*x),
                    fmt_pt(page_height - *y - *height),
                    fmt_pt(*width),
                    fmt_pt(*height)
                ));
            }
            Command::FillStroke => out.push_str("B\n"),
            Command::DrawString { x, y, text } => {
                let encoded = encode_winansi_pdf_string(text);
                replaced += encoded.replaced;
                out.push_str("BT\n");
                out.push_str(&format!(
                    "/{} {} Tf\n",
                    current_font.resource_name(),
                    fmt_pt(current_font_size)
                ));
                out.push_str(&format!(
                    "{} {} Td\n",
                    fmt_pt(*x),
                    fmt_pt(page_height - *y - current_font_size)
                ));
                out.push_str(&format!("({}) Tj\n", encoded.text));
                out.push_str("ET\n");
            }
            Command::DrawRect {
                x,
                y,
                width,
                height,
            } => {
                out.push_str(&format!(
                    "{} {} {} {} re\nf\n",
                    fmt_pt(*x),
                    fmt_pt(page_height - *y - *height),
                    fmt_pt(*width),
                    fmt_pt(*height)
                ));
            }
        }
    }

    (out, replaced)
}

fn stream_object(content: &str) -> String {
    format!(
        "<< /Length {} >>\nstream\n{}\nendstream",
        content.len(),
        content
    )
}

fn font_object(base_font: &str) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        base_font
    )
}

fn font_resources(fonts: &[(String, usize)]) -> String {
    let entries = fonts
        .iter()
        .map(|(name, id)| format!("/{} {} 0 R", name, id))
        .collect::<Vec<_>>()
        .join(" ");
    format!("<< {} >>", entries)
}

fn info_object(title: Option<&str>, producer: &str) -> String {
    let mut entries: Vec<String> = Vec::new();
    if let Some(title) = title {
        entries.push(format!("/Title ({})", encode_winansi_pdf_string(title).text));
    }
    entries.push(format!(
        "/Producer ({})",
        encode_winansi_pdf_string(producer).text
    ));
    format!("<< {} >>", entries.join(" "))
}

fn write_pdf_object<W: Write>(
    writer: &mut W,
    offset: &mut usize,
    offsets: &mut [usize],
    obj_id: usize,
    body: &str,
) -> io::Result<()> {
    if let Some(slot) = offsets.get_mut(obj_id) {
        *slot = *offset;
    }
    write_str(writer, &format!("{} 0 obj\n", obj_id), offset)?;
    write_bytes(writer, body.as_bytes(), offset)?;
    write_bytes(writer, b"\nendobj\n", offset)?;
    Ok(())
}

fn write_bytes<W: Write>(writer: &mut W, data: &[u8], offset: &mut usize) -> io::Result<()> {
    writer.write_all(data)?;
    *offset += data.len();
    Ok(())
}

fn write_str<W: Write>(writer: &mut W, data: &str, offset: &mut usize) -> io::Result<()> {
    write_bytes(writer, data.as_bytes(), offset)
}

struct WinAnsiEncoded {
    text: String,
    replaced: usize,
}

// Content streams are emitted as ASCII; non-ASCII WinAnsi bytes become octal escapes.
fn encode_winansi_pdf_string(input: &str) -> WinAnsiEncoded {
    let mut out = String::new();
    let mut replaced = 0usize;
    for ch in input.chars() {
        let byte = match ch {
            // ASCII
            '\u{0000}'..='\u{007F}' => ch as u8,
            // Latin-1
            '\u{00A0}'..='\u{00FF}' => ch as u8,
            // WinAnsi extensions (cp1252)
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201E}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02C6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8A,
            '\u{2039}' => 0x8B,
            '\u{0152}' => 0x8C,
            '\u{017D}' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{02DC}' => 0x98,
            '\u{2122}' => 0x99,
            '\u{0161}' => 0x9A,
            '\u{203A}' => 0x9B,
            '\u{0153}' => 0x9C,
            '\u{017E}' => 0x9E,
            '\u{0178}' => 0x9F,
            _ => {
                replaced += 1;
                b'?'
            }
        };

        match byte {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b if b < 0x20 || b >= 0x7f => out.push_str(&format!("\\{:03o}", b)),
            b => out.push(b as char),
        }
    }

    WinAnsiEncoded {
        text: out,
        replaced,
    }
}

fn fmt(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = I32F32::from_num(value);
    let scaled = (fixed * I32F32::from_num(1000)).round();
    let milli: i64 = scaled.to_num();
    format_milli(milli)
}

fn format_milli(milli: i64) -> String {
    if milli == 0 {
        return "0".to_string();
    }
    let sign = if milli < 0 { "-" } else { "" };
    let abs = milli.abs();
    let int_part = abs / 1000;
    let frac_part = abs % 1000;
    if frac_part == 0 {
        format!("{}{}", sign, int_part)
    } else {
        let mut s = format!("{}{}.{:03}", sign, int_part, frac_part);
        while s.ends_with('0') {
            s.pop();
        }
        s
    }
}

fn fmt_pt(value: Pt) -> String {
    format_milli(value.to_milli_i64())
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn color_to_pdf_fill(color: Color) -> String {
    format!(
        "{} {} {} rg\n",
        fmt(clamp_unit(color.r)),
        fmt(clamp_unit(color.g)),
        fmt(clamp_unit(color.b))
    )
}

fn color_to_pdf_stroke(color: Color) -> String {
    format!(
        "{} {} {} RG\n",
        fmt(clamp_unit(color.r)),
        fmt(clamp_unit(color.g)),
        fmt(clamp_unit(color.b))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;

    #[test]
    fn numbers_are_formatted_compactly() {
        assert_eq!(format_milli(0), "0");
        assert_eq!(format_milli(12_000), "12");
        assert_eq!(format_milli(12_500), "12.5");
        assert_eq!(format_milli(-1_250), "-1.25");
        assert_eq!(fmt(0.5), "0.5");
        assert_eq!(fmt(f32::NAN), "0");
    }

    #[test]
    fn winansi_escapes_and_replaces() {
        let encoded = encode_winansi_pdf_string("a(b)\\ caf\u{00E9} \u{2026} \u{4E2D}");
        assert_eq!(encoded.text, "a\\(b\\)\\\\ caf\\351 \\205 ?");
        assert_eq!(encoded.replaced, 1);
    }

    #[test]
    fn text_is_placed_from_top_left_origin() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_font(BuiltinFont::HelveticaBold, Pt::from_f32(10.0));
        canvas.draw_string(Pt::from_f32(40.0), Pt::from_f32(100.0), "Hi");
        let doc = canvas.finish();
        let (content, replaced) = render_page(&doc.pages[0], doc.page_size.height);
        assert_eq!(replaced, 0);
        assert!(content.contains("/F2 10 Tf\n"));
        // 841.89 - 100 - 10
        assert!(content.contains("40 731.89 Td\n"));
        assert!(content.contains("(Hi) Tj\n"));
    }

    #[test]
    fn output_parses_and_counts_pages() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_fill_color(Color::rgb(0.2, 0.4, 0.6));
        canvas.draw_rect(Pt::ZERO, Pt::ZERO, Pt::from_f32(50.0), Pt::from_f32(50.0));
        canvas.show_page();
        canvas.draw_string(Pt::from_f32(10.0), Pt::from_f32(10.0), "second");
        let doc = canvas.finish();

        let options = PdfOptions {
            document_title: Some("Deck (test)".to_string()),
            ..PdfOptions::default()
        };
        let bytes = document_to_pdf(&doc, None, &options).expect("pdf");
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.ends_with(b"%%EOF\n"));

        let parsed = lopdf::Document::load_mem(&bytes).expect("lopdf parses output");
        assert_eq!(parsed.get_pages().len(), 2);
    }

    #[test]
    fn metrics_receive_content_sizes() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.draw_string(Pt::ZERO, Pt::ZERO, "x");
        let doc = canvas.finish();
        let mut metrics = DocumentMetrics::for_pages(1);
        document_to_pdf(&doc, Some(&mut metrics), &PdfOptions::default()).expect("pdf");
        assert!(metrics.pages[0].content_bytes > 0);
    }
}
