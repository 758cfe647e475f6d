//! Stats feed parser.
//!
//! The first line is the header (`# pxname,svname,...`). Every following
//! non-empty, non-comment line is a data record split with the same
//! delimiter and quoting rules.

use csv::ReaderBuilder;

use crate::feed::{Cell, ColumnName, FeedError};

/// Field delimiter of `show stat` output.
const DELIMITER: u8 = b',';

/// Comment marker; also prefixes the header line.
const COMMENT_MARKER: u8 = b'#';

fn reader_builder(comment: Option<u8>) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .comment(comment);
    builder
}

/// A parsed stats feed: ordered column names and typed rows.
///
/// Every row holds exactly `columns().len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsFeed {
    columns: Vec<ColumnName>,
    rows: Vec<Vec<Cell>>,
}

impl StatsFeed {
    /// Parse raw feed bytes.
    ///
    /// # Errors
    ///
    /// - [`FeedError::InvalidFeed`]: empty input or blank header line
    /// - [`FeedError::IllegalColumnName`]: a header field fails sanitization
    /// - [`FeedError::NoData`]: header without data records
    /// - [`FeedError::ShortRow`]: a record narrower than the header
    pub fn parse(data: &[u8]) -> Result<Self, FeedError> {
        let (header, body) = split_header(data)?;
        let columns = parse_header(header)?;
        let rows = parse_rows(body, columns.len())?;
        if rows.is_empty() {
            return Err(FeedError::NoData);
        }

        tracing::debug!(
            columns = columns.len(),
            rows = rows.len(),
            "Stats feed parsed"
        );
        Ok(Self { columns, rows })
    }

    /// Sanitized column names in header order.
    pub fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    /// Typed rows in feed order.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }
}

/// Split off the first line and strip its comment marker.
fn split_header(data: &[u8]) -> Result<(&[u8], &[u8]), FeedError> {
    let (line, body) = match data.iter().position(|&b| b == b'\n') {
        Some(index) => (&data[..index], &data[index + 1..]),
        None => (data, &data[data.len()..]),
    };

    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let header = line.strip_prefix(&[COMMENT_MARKER]).unwrap_or(line).trim_ascii();
    if header.is_empty() {
        return Err(FeedError::InvalidFeed);
    }
    Ok((header, body))
}

fn parse_header(header: &[u8]) -> Result<Vec<ColumnName>, FeedError> {
    // The marker is already stripped; a further `#` belongs to the field.
    let mut reader = reader_builder(None).from_reader(header);
    let record = reader
        .records()
        .next()
        .transpose()?
        .ok_or(FeedError::InvalidFeed)?;

    let mut fields: Vec<&str> = record.iter().collect();
    // A trailing delimiter yields one empty last field; drop only that one.
    if fields.len() > 1 && fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }

    fields.into_iter().map(ColumnName::parse).collect()
}

fn parse_rows(body: &[u8], width: usize) -> Result<Vec<Vec<Cell>>, FeedError> {
    let mut reader = reader_builder(Some(COMMENT_MARKER)).from_reader(body);
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        // Body line numbers are offset by the header line.
        let line = record.position().map_or(0, |p| p.line() + 1);

        if record.len() < width {
            return Err(FeedError::ShortRow {
                line,
                expected: width,
                found: record.len(),
            });
        }
        if record.len() > width {
            tracing::trace!(
                line,
                extra = record.len() - width,
                "Discarding fields beyond header width"
            );
        }

        rows.push(record.iter().take(width).map(Cell::cast).collect());
    }

    Ok(rows)
}
