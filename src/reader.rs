//! Readers that turn raw bytes into a [`Dataset`]: delimited text via the
//! `csv` crate, plus the boxed table output of the psql and mysql console
//! clients. All load failures are fatal and reported before the UI starts.

use std::io::{BufRead, Read};

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::data::{Column, Dataset};

/// Read delimited text. The first record fixes the column count: with
/// `has_header` it names the columns, otherwise it is consumed for the count
/// only and columns are named `[0]`, `[1]`, ... At most `limit` data records
/// are kept; a record with a differing field count fails the load.
pub fn read_delimited<R: Read>(
    reader: R,
    delimiter: u8,
    has_header: bool,
    limit: usize,
) -> Result<Dataset> {
    let mut csv = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut data = Dataset::default();
    let mut records = csv.records();

    match records.next() {
        Some(first) => {
            let first = first?;
            data.columns = first
                .iter()
                .enumerate()
                .map(|(i, field)| {
                    if has_header {
                        Column::new(field)
                    } else {
                        Column::new(format!("[{}]", i))
                    }
                })
                .collect();
        }
        None => return Err(eyre!("no records found in input")),
    }

    for record in records.take(limit) {
        let record = record?;
        if record.len() != data.columns.len() {
            return Err(eyre!(
                "row {} has {} columns, expected {}",
                data.rows.len() + 1,
                record.len(),
                data.columns.len()
            ));
        }
        data.push_row(record.iter().map(str::to_owned).collect());
    }

    Ok(data)
}

/// Parse psql console output:
///
/// ```text
///  colA | colB | colC
/// ------+------+-----
///  foo  | bar  | baz
/// (1 row)
/// ```
pub fn read_psql_table<R: BufRead>(reader: R, limit: usize) -> Result<Dataset> {
    let mut lines = reader.lines();
    let header = next_line(&mut lines)?;
    let mut data = Dataset {
        columns: parse_columns(&header),
        rows: Vec::new(),
    };

    // Skip the dashed rule under the header.
    next_line(&mut lines)?;

    for line in lines.take(limit) {
        let line = line?;
        // The trailing "(N rows)" summary ends the table.
        if line.starts_with('(') {
            break;
        }
        let row = parse_row(&data.columns, &line);
        data.push_row(row);
    }

    Ok(data)
}

/// Parse mysql console output:
///
/// ```text
/// +------+------+------+
/// | colA | colB | colC |
/// +------+------+------+
/// | foo  | bar  | baz  |
/// +------+------+------+
/// ```
pub fn read_mysql_table<R: BufRead>(reader: R, limit: usize) -> Result<Dataset> {
    let mut lines = reader.lines();

    // Leading border.
    next_line(&mut lines)?;
    let header = next_line(&mut lines)?;
    let mut data = Dataset {
        columns: parse_columns(trim_edges(&header)),
        rows: Vec::new(),
    };
    // Border under the header.
    next_line(&mut lines)?;

    for line in lines.take(limit) {
        let line = line?;
        // The closing border ends the table.
        if line.starts_with('+') {
            break;
        }
        let row = parse_row(&data.columns, trim_edges(&line));
        data.push_row(row);
    }

    Ok(data)
}

fn next_line(lines: &mut impl Iterator<Item = std::io::Result<String>>) -> Result<String> {
    lines
        .next()
        .ok_or_else(|| eyre!("unexpected end of input"))?
        .map_err(Into::into)
}

/// Strip the outer `| ` ... ` |` decoration of a mysql header or data line.
fn trim_edges(line: &str) -> &str {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() < 3 {
        return line;
    }
    let start = line.char_indices().nth(1).map(|(i, _)| i).unwrap_or(0);
    let end = line
        .char_indices()
        .nth(chars.len() - 2)
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    &line[start..end]
}

/// Split a ` colA | colB ` header into columns whose widths are the raw field
/// widths, used afterwards to slice the fixed-width data lines.
fn parse_columns(header: &str) -> Vec<Column> {
    let mut columns: Vec<Column> = header
        .split(" | ")
        .map(|field| {
            let mut col = Column::new(field.trim());
            col.width = field.chars().count();
            col
        })
        .collect();

    // The first field carries a leading pad space the others share with the
    // separator; drop it so the slicing offsets line up.
    if let Some(first) = columns.first_mut() {
        first.width = first.width.saturating_sub(1);
    }

    columns
}

/// Slice a fixed-width data line into one trimmed cell per column.
fn parse_row(columns: &[Column], line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut offset = 1;

    columns
        .iter()
        .map(|col| {
            let end = (offset + col.width).min(chars.len());
            let start = offset.min(chars.len());
            let cell: String = chars[start..end].iter().collect();
            offset += col.width + 3;
            cell.trim().to_string()
        })
        .collect()
}
