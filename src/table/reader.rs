//! CSV reading into typed rows.

use anyhow::{Context, Result};
use camino::Utf8Path;
use flate2::read::GzDecoder;
use indexmap::IndexMap;
use log::{debug, info};
use std::io::Read;

use crate::model::{Cell, Row};

const DELIMITER_CANDIDATES: [u8; 3] = [b',', b'\t', b';'];
const SNIFF_LINES: usize = 10;

/// Configurable reader for delimited call tables.
#[derive(Debug, Clone)]
pub struct TableReader {
    delimiter: Option<u8>,
    progress_every: usize,
}

impl Default for TableReader {
    fn default() -> Self {
        Self {
            delimiter: None,
            progress_every: 500,
        }
    }
}

impl TableReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a delimiter instead of detecting it from the leading lines.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Report progress every `n` rows (0 disables intermediate reports).
    pub fn progress_every(mut self, n: usize) -> Self {
        self.progress_every = n;
        self
    }

    /// Parse CSV text. `on_progress` receives the number of rows read so far,
    /// periodically and once more when reading is complete.
    pub fn read_str(&self, text: &str, on_progress: &mut dyn FnMut(usize)) -> Result<Vec<Row>> {
        let text = text.trim_start_matches('\u{feff}');
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| sniff_delimiter(text));
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(text.as_bytes());

        let headers = unique_headers(rdr.headers().context("Failed to read CSV header")?);
        let mut rows = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record.with_context(|| format!("Malformed CSV record {}", i + 1))?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let mut row: Row = IndexMap::with_capacity(headers.len());
            for (col, name) in headers.iter().enumerate() {
                let cell = record.get(col).map_or(Cell::Empty, Cell::infer);
                row.insert(name.clone(), cell);
            }
            rows.push(row);
            if self.progress_every > 0 && rows.len() % self.progress_every == 0 {
                on_progress(rows.len());
            }
        }
        on_progress(rows.len());
        debug!(
            "Read {} rows, {} columns (delimiter {:?})",
            rows.len(),
            headers.len(),
            delimiter as char
        );
        Ok(rows)
    }

    pub fn read<R: Read>(&self, mut reader: R, on_progress: &mut dyn FnMut(usize)) -> Result<Vec<Row>> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .context("Failed to read table as UTF-8 text")?;
        self.read_str(&text, on_progress)
    }

    /// Read a table from disk; `.gz` files are decompressed transparently.
    pub fn load(&self, path: &Utf8Path, on_progress: &mut dyn FnMut(usize)) -> Result<Vec<Row>> {
        let file = std::fs::File::open(path).with_context(|| format!("Open {}", path))?;
        let reader = std::io::BufReader::new(file);
        let rows = if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("gz")) {
            self.read(GzDecoder::new(reader), on_progress)
        } else {
            self.read(reader, on_progress)
        }
        .with_context(|| format!("Failed to read table {}", path))?;
        info!("Loaded {} rows from {}", rows.len(), path);
        Ok(rows)
    }
}

/// Read a table with default settings.
pub fn read_table<R: Read>(reader: R) -> Result<Vec<Row>> {
    TableReader::new().read(reader, &mut |_| {})
}

/// Load a table file with default settings.
pub fn load_table(path: impl AsRef<Utf8Path>) -> Result<Vec<Row>> {
    TableReader::new().load(path.as_ref(), &mut |_| {})
}

/// Pick the delimiter that splits the header into the most fields while
/// keeping the field count consistent over the first non-blank lines.
/// Delimiters inside double quotes are ignored. Falls back to `,`.
fn sniff_delimiter(text: &str) -> u8 {
    let sample: Vec<&str> = text
        .lines()
        .filter(|l| !l.is_empty())
        .take(SNIFF_LINES)
        .collect();
    let Some(header) = sample.first() else {
        return b',';
    };
    let mut best = (b',', 0usize, 0usize);
    for d in DELIMITER_CANDIDATES {
        let fields = count_fields(header, d);
        if fields < 2 {
            continue;
        }
        let consistent = sample.iter().filter(|l| count_fields(l, d) == fields).count();
        if (consistent, fields) > (best.1, best.2) {
            best = (d, consistent, fields);
        }
    }
    best.0
}

/// Fields in one line when split on `delimiter` outside quotes.
fn count_fields(line: &str, delimiter: u8) -> usize {
    let mut quoted = false;
    let mut n = 1;
    for b in line.bytes() {
        if b == b'"' {
            quoted = !quoted;
        } else if b == delimiter && !quoted {
            n += 1;
        }
    }
    n
}

/// Header names with duplicates suffixed `_1`, `_2`, ... so every column
/// stays addressable.
fn unique_headers(headers: &csv::StringRecord) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(headers.len());
    for h in headers.iter() {
        let mut name = h.to_string();
        let mut n = 1;
        while out.contains(&name) {
            name = format!("{}_{}", h, n);
            n += 1;
        }
        out.push(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_tab_and_semicolon() {
        assert_eq!(sniff_delimiter("id\ts1\ts2"), b'\t');
        assert_eq!(sniff_delimiter("call;n"), b';');
        assert_eq!(sniff_delimiter("call,n"), b',');
        assert_eq!(sniff_delimiter("call"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn sniffing_skips_blank_lines_and_quoted_fields() {
        assert_eq!(sniff_delimiter("\n\nid\ts1\ts2\nrs1\tAA\tBB\n"), b'\t');
        assert_eq!(sniff_delimiter("\"pos,chr\"\tcall\n1,2\tAA\n"), b'\t');
        assert_eq!(count_fields("\"a;b\";c", b';'), 2);
    }

    #[test]
    fn sniffing_prefers_consistent_field_counts() {
        // one comma in every line, semicolons only in the header
        let text = "call;n,x\nAA,1\nBB,2\n";
        assert_eq!(sniff_delimiter(text), b',');
    }

    #[test]
    fn duplicate_headers_get_suffixes() {
        let rec = csv::StringRecord::from(vec!["id", "s", "s", "s"]);
        assert_eq!(unique_headers(&rec), vec!["id", "s", "s_1", "s_2"]);
    }
}
