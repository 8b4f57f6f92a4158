//! CSV codec with encoding and delimiter auto-detection.
//!
//! Converts raw bytes into a [`Table`] of string records and back. Knows
//! nothing about vendors beyond the two parsing switches they can request
//! through [`ParseOptions`].

pub mod archive;
pub mod entities;

use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::{Record, Table};

pub use archive::{extract_first_csv, load_file, InputFile};
pub use entities::decode_html_entities;

/// Vendor-driven parsing switches.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions<'a> {
    /// Synthetic header row for files exported without one
    pub force_headers: Option<&'a [&'a str]>,
    /// Decode HTML entities in every field
    pub html_decode: bool,
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed headers and records
    pub table: Table,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 (with or without a BOM) is taken as is; chardet only guesses
/// for bytes that are not.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        // Not UTF-8, whatever chardet says.
        "" | "ascii" | "utf-8" | "utf8" => "windows-1252".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => match String::from_utf8(bytes.to_vec()) {
            Ok(s) => s,
            Err(_) => encoding_rs::Encoding::for_label(encoding.as_bytes())
                .unwrap_or(encoding_rs::WINDOWS_1252)
                .decode(bytes)
                .0
                .into_owned(),
        },
    };
    Ok(decoded.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// # Example
/// ```
/// use stocksync::parser::parse_str;
///
/// let table = parse_str("SKU,Title\nA1,Red Shoe", ',').unwrap();
/// assert_eq!(table.records[0].get("Title"), Some("Red Shoe"));
/// ```
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<Table> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let mut record = Record::new();
        for (i, header) in headers.iter().enumerate() {
            record.set(header.clone(), row.get(i).unwrap_or(""));
        }
        records.push(record);
    }

    Ok(Table::new(headers, records))
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes(bytes: &[u8], options: &ParseOptions<'_>) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let mut content = decode_content(bytes, &encoding)?;

    if let Some(headers) = options.force_headers {
        content = format!("{}\n{}", headers.join(","), content);
    }

    let delimiter = detect_delimiter(&content);
    let mut table = parse_str(&content, delimiter)?;

    if options.html_decode {
        for record in &mut table.records {
            record.map_values(|v| decode_html_entities(v).into_owned());
        }
    }

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Parse a CSV file from disk with auto-detection.
pub fn parse_file<P: AsRef<Path>>(path: P, options: &ParseOptions<'_>) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes, options)
}

/// Serialize records for the given column list.
///
/// Columns a record lacks are written empty; fields outside `columns` are dropped.
pub fn write_csv<'a, I>(columns: &[&str], records: I) -> CsvResult<Vec<u8>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(columns)
        .map_err(|e| CsvError::WriteError(e.to_string()))?;

    for record in records {
        writer
            .write_record(columns.iter().map(|c| record.text(c)))
            .map_err(|e| CsvError::WriteError(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| CsvError::WriteError(e.to_string()))
}

/// Serialize a whole table using its own header order.
pub fn write_table(table: &Table) -> CsvResult<Vec<u8>> {
    let columns: Vec<&str> = table.headers.iter().map(String::as_str).collect();
    write_csv(&columns, &table.records)
}
