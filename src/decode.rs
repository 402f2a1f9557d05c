//! Document decoding: decompression and format-specific parsing
//!
//! Decoding is pure transformation: no network calls, no hidden state across
//! calls. The same bytes always decode to the same record sequence.

use crate::error::{Error, Result};
use crate::types::Record;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use flate2::read::GzDecoder;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Wire format of a report document, resolved statically per report type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "format")]
pub enum DocumentFormat {
    /// Delimited text with a header row defining field names
    Csv {
        /// Field delimiter (comma for CSV, tab for flat-file reports)
        delimiter: u8,
    },
    /// XML where each `record_element` becomes one record and its text-bearing
    /// descendants become fields
    Xml {
        /// Element name that wraps a single record
        record_element: String,
    },
    /// Array-of-objects, a single wrapping object, or newline-delimited objects
    Json,
    /// Fixed-width text with statically known column layout
    FixedWidth {
        /// Column layout, in order
        columns: Vec<FixedColumn>,
    },
}

impl DocumentFormat {
    /// Comma-separated with header row
    pub fn csv() -> Self {
        DocumentFormat::Csv { delimiter: b',' }
    }

    /// Tab-separated with header row (the common "flat file" report shape)
    pub fn tsv() -> Self {
        DocumentFormat::Csv { delimiter: b'\t' }
    }
}

/// One column of a fixed-width document
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedColumn {
    /// Field name the column maps to
    pub name: String,
    /// Column width in characters
    pub width: usize,
}

/// Decompress a gzip-compressed document body
pub fn decompress_gzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::Decode(format!("gzip decompression failed: {e}")))?;
    Ok(out)
}

/// Parse a raw (already decompressed) document body into ordered records.
///
/// Values of `date_fields` that arrive in non-ISO formats are normalized to
/// canonical `YYYY-MM-DD` strings; unparseable values pass through unchanged.
pub fn decode(bytes: &[u8], format: &DocumentFormat, date_fields: &[String]) -> Result<Vec<Record>> {
    let mut records = match format {
        DocumentFormat::Csv { delimiter } => decode_csv(bytes, *delimiter)?,
        DocumentFormat::Xml { record_element } => decode_xml(bytes, record_element)?,
        DocumentFormat::Json => decode_json(bytes)?,
        DocumentFormat::FixedWidth { columns } => decode_fixed_width(bytes, columns)?,
    };

    if !date_fields.is_empty() {
        for record in &mut records {
            normalize_date_fields(record, date_fields);
        }
    }

    Ok(records)
}

fn decode_csv(bytes: &[u8], delimiter: u8) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| Error::Decode(format!("invalid CSV header row: {e}")))?
        .clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| Error::Decode(format!("invalid CSV row: {e}")))?;
        let mut record = Record::new();
        for (header, value) in headers.iter().zip(row.iter()) {
            record.insert(
                header.to_string(),
                serde_json::Value::String(value.to_string()),
            );
        }
        records.push(record);
    }
    Ok(records)
}

fn decode_xml(bytes: &[u8], record_element: &str) -> Result<Vec<Record>> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    let mut records = Vec::new();
    let mut current: Option<Record> = None;
    // Innermost open element inside the current record; text lands in it
    let mut open_field: Vec<String> = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| Error::Decode(format!("invalid XML: {e}")))?;
        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if current.is_none() {
                    if name == record_element {
                        current = Some(Record::new());
                        open_field.clear();
                    }
                } else {
                    open_field.push(name);
                }
            }
            Event::Text(t) => {
                if let Some(record) = current.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| Error::Decode(format!("invalid XML text: {e}")))?;
                    let text = text.trim();
                    if !text.is_empty()
                        && let Some(field) = open_field.last()
                    {
                        record.insert(
                            field.clone(),
                            serde_json::Value::String(text.to_string()),
                        );
                    }
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if current.is_some() && name == record_element && open_field.is_empty() {
                    if let Some(record) = current.take() {
                        records.push(record);
                    }
                } else if !open_field.is_empty() {
                    open_field.pop();
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(records)
}

fn decode_json(bytes: &[u8]) -> Result<Vec<Record>> {
    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(serde_json::Value::Array(items)) => items.into_iter().map(as_record).collect(),
        Ok(serde_json::Value::Object(map)) => {
            // Wrapped shape: a single array-valued key holds the records
            if map.len() == 1
                && let Some(serde_json::Value::Array(items)) = map.values().next()
            {
                return items.iter().cloned().map(as_record).collect();
            }
            Ok(vec![map])
        }
        Ok(other) => Err(Error::Decode(format!(
            "JSON document must be an array or object, got {other}"
        ))),
        // Fall back to newline-delimited objects
        Err(_) => String::from_utf8_lossy(bytes)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str::<serde_json::Value>(line)
                    .map_err(|e| Error::Decode(format!("invalid JSON line: {e}")))
                    .and_then(as_record)
            })
            .collect(),
    }
}

fn as_record(value: serde_json::Value) -> Result<Record> {
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(Error::Decode(format!(
            "expected a JSON object per record, got {other}"
        ))),
    }
}

fn decode_fixed_width(bytes: &[u8], columns: &[FixedColumn]) -> Result<Vec<Record>> {
    let text = String::from_utf8_lossy(bytes);
    let mut records = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let chars: Vec<char> = line.chars().collect();
        let mut record = Record::new();
        let mut offset = 0;
        for column in columns {
            let end = (offset + column.width).min(chars.len());
            let value: String = if offset < chars.len() {
                chars[offset..end].iter().collect::<String>().trim().to_string()
            } else {
                String::new()
            };
            record.insert(column.name.clone(), serde_json::Value::String(value));
            offset = end;
        }
        records.push(record);
    }

    Ok(records)
}

/// Accepted non-canonical date layouts, tried in order
const DATE_INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%d.%m.%Y", "%Y/%m/%d"];

/// Normalize a date string to canonical `YYYY-MM-DD`, if it parses
fn normalize_date(value: &str) -> Option<String> {
    for format in DATE_INPUT_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive().format("%Y-%m-%d").to_string());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date().format("%Y-%m-%d").to_string());
    }
    None
}

fn normalize_date_fields(record: &mut Record, date_fields: &[String]) {
    for field in date_fields {
        if let Some(serde_json::Value::String(value)) = record.get(field)
            && let Some(normalized) = normalize_date(value)
        {
            record.insert(field.clone(), serde_json::Value::String(normalized));
        }
    }
}
