//! Spreadsheet, PDF and CSV export of the booking collection
//!
//! Exports always take the complete collection. Callers must not pass a
//! filtered page here.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;
use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::{ParcelError, Result};
use crate::models::Booking;

pub const SHEET_NAME: &str = "Bookings";

/// Spreadsheet header: the serialized field names of [`Booking`].
pub const SHEET_HEADER: [&str; 8] = [
    "customerId",
    "bookingId",
    "bookingDate",
    "receiverName",
    "deliveredAddress",
    "amount",
    "status",
    "hasFeedback",
];

pub const PDF_HEADER: [&str; 7] = [
    "Customer ID",
    "Booking ID",
    "Date",
    "Receiver",
    "Address",
    "Amount",
    "Status",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Pdf,
    Csv,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Xlsx, ExportFormat::Pdf, ExportFormat::Csv];

    pub fn file_name(&self) -> &str {
        match self {
            ExportFormat::Xlsx => "bookings.xlsx",
            ExportFormat::Pdf => "bookings.pdf",
            ExportFormat::Csv => "bookings.csv",
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ParcelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "pdf" => Ok(ExportFormat::Pdf),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ParcelError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Render `bookings` in `format` and write it under `dir` with the fixed file name.
pub fn write_export(format: ExportFormat, bookings: &[Booking], dir: &Path) -> Result<PathBuf> {
    let bytes = match format {
        ExportFormat::Xlsx => to_xlsx(bookings)?,
        ExportFormat::Pdf => to_pdf(bookings)?,
        ExportFormat::Csv => to_csv(bookings)?,
    };

    std::fs::create_dir_all(dir)?;
    let path = dir.join(format.file_name());
    std::fs::write(&path, bytes)?;

    info!("Exported {} bookings to {}", bookings.len(), path.display());
    Ok(path)
}

pub fn to_csv(bookings: &[Booking]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for booking in bookings {
        writer.serialize(booking)?;
    }
    writer
        .into_inner()
        .map_err(|e| ParcelError::Io(e.into_error()))
}

// ---- xlsx ----------------------------------------------------------------

const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const PACKAGE_RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const DOCUMENT_RELS_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const WORKSHEET_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";

fn xml_writer() -> quick_xml::Result<Writer<Vec<u8>>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(writer)
}

fn content_types_xml() -> quick_xml::Result<Vec<u8>> {
    let mut writer = xml_writer()?;
    writer
        .create_element("Types")
        .with_attribute(("xmlns", CONTENT_TYPES_NS))
        .write_inner_content::<_, quick_xml::Error>(|w| {
            w.create_element("Default")
                .with_attributes([
                    ("Extension", "rels"),
                    ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
                ])
                .write_empty()?;
            w.create_element("Default")
                .with_attributes([("Extension", "xml"), ("ContentType", "application/xml")])
                .write_empty()?;
            w.create_element("Override")
                .with_attributes([
                    ("PartName", "/xl/workbook.xml"),
                    (
                        "ContentType",
                        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
                    ),
                ])
                .write_empty()?;
            w.create_element("Override")
                .with_attributes([
                    ("PartName", "/xl/worksheets/sheet1.xml"),
                    (
                        "ContentType",
                        "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
                    ),
                ])
                .write_empty()?;
            Ok(())
        })?;
    Ok(writer.into_inner())
}

/// Relationships part holding a single `rId1` entry.
fn relationships_xml(rel_type: &str, target: &str) -> quick_xml::Result<Vec<u8>> {
    let mut writer = xml_writer()?;
    writer
        .create_element("Relationships")
        .with_attribute(("xmlns", PACKAGE_RELS_NS))
        .write_inner_content::<_, quick_xml::Error>(|w| {
            w.create_element("Relationship")
                .with_attributes([("Id", "rId1"), ("Type", rel_type), ("Target", target)])
                .write_empty()?;
            Ok(())
        })?;
    Ok(writer.into_inner())
}

fn workbook_xml() -> quick_xml::Result<Vec<u8>> {
    let mut writer = xml_writer()?;
    writer
        .create_element("workbook")
        .with_attributes([("xmlns", SPREADSHEET_NS), ("xmlns:r", DOCUMENT_RELS_NS)])
        .write_inner_content::<_, quick_xml::Error>(|w| {
            w.create_element("sheets").write_inner_content::<_, quick_xml::Error>(|w| {
                w.create_element("sheet")
                    .with_attributes([("name", SHEET_NAME), ("sheetId", "1"), ("r:id", "rId1")])
                    .write_empty()?;
                Ok(())
            })?;
            Ok(())
        })?;
    Ok(writer.into_inner())
}

/// Column letter for a zero-based index (A..Z, AA..).
fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

enum Cell<'a> {
    Text(&'a str),
    Number(u32),
    Bool(bool),
}

/// Write one `<row>`; `None` cells are left out, as for absent fields.
fn write_row<W: Write>(writer: &mut Writer<W>, row: usize, cells: &[Option<Cell<'_>>]) -> quick_xml::Result<()> {
    let row_number = row.to_string();
    writer
        .create_element("row")
        .with_attribute(("r", row_number.as_str()))
        .write_inner_content::<_, quick_xml::Error>(|w| {
            for (col, cell) in cells.iter().enumerate() {
                let Some(cell) = cell else { continue };
                let reference = format!("{}{}", column_name(col), row);
                let element = w.create_element("c").with_attribute(("r", reference.as_str()));
                match cell {
                    Cell::Text(text) => {
                        element
                            .with_attribute(("t", "inlineStr"))
                            .write_inner_content::<_, quick_xml::Error>(|w| {
                                w.create_element("is").write_inner_content::<_, quick_xml::Error>(|w| {
                                    w.create_element("t").write_text_content(BytesText::new(text))?;
                                    Ok(())
                                })?;
                                Ok(())
                            })?;
                    }
                    Cell::Number(value) => {
                        let value = value.to_string();
                        element.write_inner_content::<_, quick_xml::Error>(|w| {
                            w.create_element("v").write_text_content(BytesText::new(&value))?;
                            Ok(())
                        })?;
                    }
                    Cell::Bool(flag) => {
                        let value = if *flag { "1" } else { "0" };
                        element.with_attribute(("t", "b")).write_inner_content::<_, quick_xml::Error>(|w| {
                            w.create_element("v").write_text_content(BytesText::new(value))?;
                            Ok(())
                        })?;
                    }
                }
            }
            Ok(())
        })?;
    Ok(())
}

fn sheet_xml(bookings: &[Booking]) -> quick_xml::Result<Vec<u8>> {
    let mut writer = xml_writer()?;
    writer
        .create_element("worksheet")
        .with_attribute(("xmlns", SPREADSHEET_NS))
        .write_inner_content::<_, quick_xml::Error>(|w| {
            w.create_element("sheetData").write_inner_content::<_, quick_xml::Error>(|w| {
                let header: Vec<Option<Cell>> = SHEET_HEADER.iter().map(|h| Some(Cell::Text(*h))).collect();
                write_row(w, 1, &header)?;

                for (i, booking) in bookings.iter().enumerate() {
                    let date = booking.booking_date.format("%Y-%m-%d").to_string();
                    let feedback: Option<bool> = booking.feedback.into();
                    let cells = [
                        Some(Cell::Text(&booking.customer_id)),
                        Some(Cell::Text(&booking.booking_id)),
                        Some(Cell::Text(&date)),
                        Some(Cell::Text(&booking.receiver_name)),
                        Some(Cell::Text(&booking.delivered_address)),
                        Some(Cell::Number(booking.amount)),
                        Some(Cell::Text(booking.status.as_str())),
                        feedback.map(Cell::Bool),
                    ];
                    write_row(w, i + 2, &cells)?;
                }
                Ok(())
            })?;
            Ok(())
        })?;
    Ok(writer.into_inner())
}

/// One-sheet workbook named "Bookings".
pub fn to_xlsx(bookings: &[Booking]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, Vec<u8>); 5] = [
        ("[Content_Types].xml", content_types_xml()?),
        ("_rels/.rels", relationships_xml(OFFICE_DOCUMENT_REL, "xl/workbook.xml")?),
        ("xl/workbook.xml", workbook_xml()?),
        ("xl/_rels/workbook.xml.rels", relationships_xml(WORKSHEET_REL, "worksheets/sheet1.xml")?),
        ("xl/worksheets/sheet1.xml", sheet_xml(bookings)?),
    ];

    for (name, body) in parts.iter() {
        zip.start_file(*name, options)?;
        zip.write_all(body)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

// ---- pdf -----------------------------------------------------------------

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN_LEFT: i64 = 30;
const TABLE_TOP: i64 = 790;
const ROW_HEIGHT: i64 = 14;
const ROWS_PER_PAGE: usize = 50;
const FONT_SIZE: i64 = 8;
const COLUMN_X: [i64; 7] = [30, 100, 170, 225, 295, 470, 515];
const COLUMN_CHARS: [usize; 7] = [14, 14, 10, 14, 38, 8, 12];

fn fit(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars.saturating_sub(2)).collect();
        cut.push_str("..");
        cut
    }
}

fn text_op(font: &str, x: i64, y: i64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), FONT_SIZE.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

fn table_row(operations: &mut Vec<Operation>, font: &str, y: i64, cells: &[String]) {
    for (col, cell) in cells.iter().enumerate() {
        let text = fit(cell, COLUMN_CHARS[col]);
        operations.extend(text_op(font, COLUMN_X[col], y, &text));
    }
}

fn page_content(bookings: &[Booking], page: usize, total_pages: usize) -> Content {
    let mut operations = Vec::new();

    operations.extend(text_op(
        "F2",
        MARGIN_LEFT,
        TABLE_TOP + 20,
        &format!("Previous Bookings - page {} of {}", page, total_pages),
    ));

    let header: Vec<String> = PDF_HEADER.iter().map(|h| h.to_string()).collect();
    table_row(&mut operations, "F2", TABLE_TOP, &header);

    // rule under the header
    let rule_y = TABLE_TOP - 4;
    operations.push(Operation::new("m", vec![MARGIN_LEFT.into(), rule_y.into()]));
    operations.push(Operation::new("l", vec![(PAGE_WIDTH - MARGIN_LEFT).into(), rule_y.into()]));
    operations.push(Operation::new("S", vec![]));

    for (i, booking) in bookings.iter().enumerate() {
        let y = TABLE_TOP - ROW_HEIGHT * (i as i64 + 1);
        let cells = [
            booking.customer_id.clone(),
            booking.booking_id.clone(),
            booking.booking_date.format("%Y-%m-%d").to_string(),
            booking.receiver_name.clone(),
            booking.delivered_address.clone(),
            booking.amount.to_string(),
            booking.status.as_str().to_string(),
        ];
        table_row(&mut operations, "F1", y, &cells);
    }

    Content { operations }
}

/// Tabular PDF, header repeated on every page.
pub fn to_pdf(bookings: &[Booking]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let chunks: Vec<&[Booking]> = if bookings.is_empty() {
        vec![&bookings[..0]]
    } else {
        bookings.chunks(ROWS_PER_PAGE).collect()
    };

    let mut kids: Vec<Object> = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let content = page_content(chunk, i + 1, chunks.len());
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let media_box: Vec<Object> = vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()];
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => media_box,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::generate_with_seed;
    use crate::models::FeedbackMark;
    use chrono::NaiveDate;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn dataset(count: usize) -> Vec<Booking> {
        generate_with_seed(count, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(), Some(9))
    }

    fn read_sheet(bytes: Vec<u8>) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut sheet = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut sheet)
            .unwrap();
        sheet
    }

    #[test]
    fn test_column_names() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(7), "H");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
    }

    #[test]
    fn test_xlsx_escapes_cell_text() {
        let mut bookings = dataset(1);
        bookings[0].receiver_name = "Smith & <Sons>".to_string();
        let sheet = read_sheet(to_xlsx(&bookings).unwrap());
        assert!(sheet.contains("<t>Smith &amp; &lt;Sons&gt;</t>"));
    }

    #[test]
    fn test_xlsx_feedback_flag_is_boolean_cell() {
        let mut bookings = dataset(3);
        bookings[0].feedback = FeedbackMark::NotSubmitted;
        bookings[1].feedback = FeedbackMark::Submitted;
        bookings[2].feedback = FeedbackMark::Unknown;
        let sheet = read_sheet(to_xlsx(&bookings).unwrap());

        assert!(sheet.contains("<c r=\"H2\" t=\"b\"><v>0</v></c>"));
        assert!(sheet.contains("<c r=\"H3\" t=\"b\"><v>1</v></c>"));
        assert!(!sheet.contains("<c r=\"H4\""));
        assert!(sheet.contains("<c r=\"G4\""));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert_eq!("pdf".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_xlsx_contains_every_booking() {
        let bookings = dataset(50);
        let sheet = read_sheet(to_xlsx(&bookings).unwrap());

        assert_eq!(sheet.matches("<row ").count(), 51);
        assert!(sheet.contains("<t>customerId</t>"));
        assert!(sheet.contains("<t>hasFeedback</t>"));
        assert!(sheet.contains("<t>BK-2025001</t>"));
        assert!(sheet.contains("<t>BK-2025050</t>"));
        assert!(sheet.contains(&format!("<c r=\"F2\"><v>{}</v></c>", bookings[0].amount)));
    }

    #[test]
    fn test_xlsx_workbook_has_single_named_sheet() {
        let bytes = to_xlsx(&dataset(3)).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut workbook = String::new();
        archive
            .by_name("xl/workbook.xml")
            .unwrap()
            .read_to_string(&mut workbook)
            .unwrap();
        assert_eq!(workbook.matches("<sheet ").count(), 1);
        assert!(workbook.contains("name=\"Bookings\""));
    }

    #[test]
    fn test_pdf_pages_and_header() {
        let bookings = dataset(120);
        let bytes = to_pdf(&bookings).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);

        let raw = String::from_utf8_lossy(&bytes);
        for column in PDF_HEADER {
            assert!(raw.contains(&format!("({})", column)), "missing column {}", column);
        }
        assert!(raw.contains("(BK-2025120)"));
    }

    #[test]
    fn test_pdf_of_empty_collection_has_one_page() {
        let bytes = to_pdf(&[]).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_csv_header_and_rows() {
        let bookings = dataset(4);
        let text = String::from_utf8(to_csv(&bookings).unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), SHEET_HEADER.join(","));
        assert_eq!(lines.count(), 4);
    }

    #[test]
    fn test_write_export_uses_fixed_names() {
        let temp_dir = TempDir::new().unwrap();
        let bookings = dataset(12);
        for format in ExportFormat::ALL {
            let path = write_export(format, &bookings, temp_dir.path()).unwrap();
            assert_eq!(path, temp_dir.path().join(format.file_name()));
            assert!(std::fs::metadata(&path).unwrap().len() > 0);
        }
    }
}
