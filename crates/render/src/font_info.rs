//! Font information extraction from PDF pages
//!
//! Builds the page font table the rewrite engine picks its font from, and maps
//! standard font names onto PDFium's built-in fonts.
//!
//! PDFium has no per-page font dictionary accessor, so the table is read off the
//! text objects: one entry per distinct family, in paint order, sized by the
//! first object using it.

use pdf_text_editor_core::{FontTableEntry, RawFontSize};
use pdfium_render::prelude::*;

/// Strip the six-letter subset tag PDF producers prepend to embedded fonts
/// ("ABCDEF+Arial-BoldMT" becomes "Arial-BoldMT").
pub fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest))
            if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) && !rest.is_empty() =>
        {
            rest
        }
        _ => name,
    }
}

/// PDFium built-in font for one of the 14 standard PDF font names
pub fn builtin_font(family: &str) -> Option<PdfFontBuiltin> {
    let builtin = match family {
        "Courier" => PdfFontBuiltin::Courier,
        "Courier-Bold" => PdfFontBuiltin::CourierBold,
        "Courier-Oblique" => PdfFontBuiltin::CourierOblique,
        "Courier-BoldOblique" => PdfFontBuiltin::CourierBoldOblique,
        "Helvetica" => PdfFontBuiltin::Helvetica,
        "Helvetica-Bold" => PdfFontBuiltin::HelveticaBold,
        "Helvetica-Oblique" => PdfFontBuiltin::HelveticaOblique,
        "Helvetica-BoldOblique" => PdfFontBuiltin::HelveticaBoldOblique,
        "Times-Roman" => PdfFontBuiltin::TimesRoman,
        "Times-Bold" => PdfFontBuiltin::TimesBold,
        "Times-Italic" => PdfFontBuiltin::TimesItalic,
        "Times-BoldItalic" => PdfFontBuiltin::TimesBoldItalic,
        "Symbol" => PdfFontBuiltin::Symbol,
        "ZapfDingbats" => PdfFontBuiltin::ZapfDingbats,
        _ => return None,
    };
    Some(builtin)
}

/// Font table of a page, one entry per family in paint order.
pub fn page_font_table(page: &PdfPage) -> Vec<FontTableEntry> {
    let mut entries: Vec<FontTableEntry> = Vec::new();

    for object in page.objects().iter() {
        let text_object = match object {
            PdfPageObject::Text(ref text_obj) => text_obj,
            _ => continue,
        };
        if text_object.text().trim().is_empty() {
            continue;
        }

        let name = text_object.font().name();
        let family = strip_subset_prefix(&name);
        if family.is_empty() || entries.iter().any(|entry| entry.family == family) {
            continue;
        }

        let size = text_object.scaled_font_size().value;
        entries.push(FontTableEntry::new(family, RawFontSize::Numeric(size)));
    }

    log::debug!(
        "Page font table: {:?}",
        entries.iter().map(|e| e.family.as_str()).collect::<Vec<_>>()
    );
    entries
}
