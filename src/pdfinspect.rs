use lopdf::{Document as LoDocument, Object as LoObject};
use std::collections::BTreeSet;

#[derive(Debug, thiserror::Error)]
pub enum PdfInspectError {
    #[error("PDF_PARSE_FAILED: {0}")]
    ParseFailed(String),
    #[error("PDF_EMPTY_OR_NO_PAGES: pdf has no pages")]
    NoPages,
}

/// What a reader sees when it opens generated output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfInspectReport {
    pub pdf_version: String,
    pub page_count: usize,
    pub file_size_bytes: usize,
    pub title: Option<String>,
    pub base_fonts: BTreeSet<String>,
}

pub fn inspect_pdf_bytes(bytes: &[u8]) -> Result<PdfInspectReport, PdfInspectError> {
    let pdf =
        LoDocument::load_mem(bytes).map_err(|err| PdfInspectError::ParseFailed(err.to_string()))?;

    let page_count = pdf.get_pages().len();
    if page_count == 0 {
        return Err(PdfInspectError::NoPages);
    }

    Ok(PdfInspectReport {
        pdf_version: pdf.version.clone(),
        page_count,
        file_size_bytes: bytes.len(),
        title: info_title(&pdf),
        base_fonts: base_fonts(&pdf),
    })
}

fn info_title(pdf: &LoDocument) -> Option<String> {
    let info_id = match pdf.trailer.get(b"Info").ok()? {
        LoObject::Reference(id) => *id,
        _ => return None,
    };
    let LoObject::Dictionary(info) = pdf.get_object(info_id).ok()? else {
        return None;
    };
    match info.get(b"Title").ok()? {
        LoObject::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

fn base_fonts(pdf: &LoDocument) -> BTreeSet<String> {
    pdf.objects
        .values()
        .filter_map(|object| match object {
            LoObject::Dictionary(dict) => match (dict.get(b"Type"), dict.get(b"BaseFont")) {
                (Ok(LoObject::Name(kind)), Ok(LoObject::Name(name))) if kind == b"Font" => {
                    Some(String::from_utf8_lossy(name).into_owned())
                }
                _ => None,
            },
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream as LoStream, dictionary};

    fn make_pdf_bytes(page_count: usize) -> Vec<u8> {
        let mut doc = LoDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let mut kids: Vec<LoObject> = Vec::new();
        for idx in 0..page_count {
            let content = format!("BT /F1 18 Tf 72 720 Td (card {}) Tj ET", idx).into_bytes();
            let content_id = doc.add_object(LoStream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        };
        doc.objects.insert(pages_id, LoObject::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).expect("save");
        out
    }

    #[test]
    fn reads_version_pages_and_fonts() {
        let bytes = make_pdf_bytes(2);
        let report = inspect_pdf_bytes(&bytes).expect("inspect");
        assert_eq!(report.page_count, 2);
        assert_eq!(report.file_size_bytes, bytes.len());
        assert_eq!(report.pdf_version, "1.5");
        assert!(report.base_fonts.contains("Helvetica"));
        assert_eq!(report.title, None);
    }

    #[test]
    fn rejects_malformed_data() {
        let err = inspect_pdf_bytes(b"not a pdf").expect_err("invalid");
        assert!(matches!(err, PdfInspectError::ParseFailed(_)));
        assert!(err.to_string().starts_with("PDF_PARSE_FAILED"));
    }
}
