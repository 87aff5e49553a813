// src/export/pdf.rs
use crate::export::capabilities::{ArtifactRef, Renderer};
use crate::export::document::{ReportDocument, ReportRow, COLUMNS};
use crate::export::ExportError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

// A4 in points.
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN_LEFT: i64 = 50;
const MARGIN_BOTTOM: i64 = 60;

const LINE_HEIGHT: i64 = 14;
const FONT_SIZE: i64 = 10;
const TITLE_SIZE: i64 = 16;

const HEADER_Y_FIRST_PAGE: i64 = 730;
const HEADER_Y: i64 = 790;

/// Left edge and max characters per line for each column (Helvetica 10pt).
const COLUMN_LAYOUT: [(i64, usize); 3] = [(50, 40), (280, 26), (420, 28)];

pub const LINES_FIRST_PAGE: usize = ((HEADER_Y_FIRST_PAGE - MARGIN_BOTTOM) / LINE_HEIGHT) as usize - 1;
pub const LINES_PER_PAGE: usize = ((HEADER_Y - MARGIN_BOTTOM) / LINE_HEIGHT) as usize - 1;

/// One printed line of the table: the slice of each column's text that
/// falls on it.
pub type Line = [String; 3];

/// Writes report documents as paginated PDFs into one output directory.
#[derive(Debug)]
pub struct PdfRenderer {
    output_dir: PathBuf,
    seq: AtomicU64,
}

impl PdfRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            seq: AtomicU64::new(0),
        }
    }

    fn next_file_name(&self, document: &ReportDocument) -> String {
        let n = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        format!(
            "recycle-report-{}-{n}.pdf",
            document.generated_at.format("%Y%m%d-%H%M%S")
        )
    }
}

impl Renderer for PdfRenderer {
    fn render(&self, document: &ReportDocument) -> Result<ArtifactRef, ExportError> {
        let bytes = render_pdf(document)?;

        fs::create_dir_all(&self.output_dir).map_err(|e| {
            ExportError::Render(format!("create {}: {e}", self.output_dir.display()))
        })?;

        let path = self.output_dir.join(self.next_file_name(document));
        fs::write(&path, &bytes)
            .map_err(|e| ExportError::Render(format!("write {}: {e}", path.display())))?;

        log::info!("📄 PDF written to {} ({} bytes)", path.display(), bytes.len());
        Ok(ArtifactRef::new(path))
    }
}

/// Lay the document out on A4 pages and return the encoded PDF.
pub fn render_pdf(document: &ReportDocument) -> Result<Vec<u8>, ExportError> {
    let pages = paginate(&document.rows);
    let total = pages.len();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(total);
    for (index, lines) in pages.iter().enumerate() {
        let content = Content {
            operations: page_operations(document, lines, index, total),
        };
        let encoded = content
            .encode()
            .map_err(|e| ExportError::Render(format!("encode page {}: {e}", index + 1)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => total as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| ExportError::Render(format!("serialize PDF: {e}")))?;
    Ok(out)
}

/// Wrap a row's cells to their column widths and line them up.
/// The row is as tall as its tallest cell.
pub fn row_lines(row: &ReportRow) -> Vec<Line> {
    let wrapped: Vec<Vec<String>> = COLUMN_LAYOUT
        .iter()
        .zip(row.cells())
        .map(|((_, width), cell)| wrap(cell, *width))
        .collect();
    let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);

    (0..height)
        .map(|i| {
            let cell = |c: usize| wrapped[c].get(i).cloned().unwrap_or_default();
            [cell(0), cell(1), cell(2)]
        })
        .collect()
}

/// Split the table into pages by line count. A row stays on one page unless
/// it is taller than a whole page. Always at least one page.
pub fn paginate(rows: &[ReportRow]) -> Vec<Vec<Line>> {
    let mut pages = Vec::new();
    let mut page: Vec<Line> = Vec::new();
    let mut capacity = LINES_FIRST_PAGE;

    for row in rows {
        let block = row_lines(row);
        if !page.is_empty() && page.len() + block.len() > capacity && block.len() <= LINES_PER_PAGE {
            pages.push(std::mem::take(&mut page));
            capacity = LINES_PER_PAGE;
        }
        for line in block {
            if page.len() == capacity {
                pages.push(std::mem::take(&mut page));
                capacity = LINES_PER_PAGE;
            }
            page.push(line);
        }
    }

    pages.push(page);
    pages
}

fn page_operations(
    document: &ReportDocument,
    lines: &[Line],
    index: usize,
    total: usize,
) -> Vec<Operation> {
    let mut ops = Vec::new();
    let first = index == 0;

    if first {
        text(&mut ops, "F2", TITLE_SIZE, MARGIN_LEFT, 790, &document.title);
        text(&mut ops, "F1", FONT_SIZE, MARGIN_LEFT, 765, &document.subtitle());
    }

    let header_y = if first { HEADER_Y_FIRST_PAGE } else { HEADER_Y };
    for ((x, _), label) in COLUMN_LAYOUT.iter().zip(COLUMNS) {
        text(&mut ops, "F2", FONT_SIZE, *x, header_y, label);
    }
    rule(&mut ops, header_y - 6);

    let mut y = header_y - LINE_HEIGHT - 4;
    if lines.is_empty() && first {
        text(&mut ops, "F1", FONT_SIZE, MARGIN_LEFT, y, "No records");
    }
    for line in lines {
        for ((x, _), cell) in COLUMN_LAYOUT.iter().zip(line) {
            if !cell.is_empty() {
                text(&mut ops, "F1", FONT_SIZE, *x, y, cell);
            }
        }
        y -= LINE_HEIGHT;
    }

    let footer = format!("Page {} of {}", index + 1, total);
    text(&mut ops, "F1", 8, PAGE_WIDTH - MARGIN_LEFT - 50, 30, &footer);

    ops
}

fn text(ops: &mut Vec<Operation>, font: &str, size: i64, x: i64, y: i64, value: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), Object::Integer(size)]));
    ops.push(Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(value))]));
    ops.push(Operation::new("ET", vec![]));
}

fn rule(ops: &mut Vec<Operation>, y: i64) {
    ops.push(Operation::new("w", vec![Object::Integer(1)]));
    ops.push(Operation::new("m", vec![Object::Integer(MARGIN_LEFT), Object::Integer(y)]));
    ops.push(Operation::new(
        "l",
        vec![Object::Integer(PAGE_WIDTH - MARGIN_LEFT), Object::Integer(y)],
    ));
    ops.push(Operation::new("S", vec![]));
}

/// Greedy word wrap to `width` characters. Words longer than a line are
/// split across lines.
fn wrap(value: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in value.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = chars.split_off(width);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }

        let used = current.chars().count();
        if used > 0 && used + 1 + chars.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(chars);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Encode for the standard fonts' WinAnsiEncoding (Windows-1252).
/// Characters it has no slot for become '?'.
fn win_ansi(value: &str) -> Vec<u8> {
    value.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c {
        ' '..='~' | '\u{a0}'..='\u{ff}' => c as u8,
        '\t' | '\u{202f}' => b' ',
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        _ => b'?',
    }
}
