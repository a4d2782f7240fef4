//! Delimiter-separated tables with one text column to transliterate.
//!
//! Files are read as UTF-8 (a leading BOM is dropped), without quoting, and
//! written back line for line with a BOM. Rows before `start_line` (headers) are copied
//! untouched; every later row that has a source cell gets its target cell
//! set, padding the row with empty cells when it is too short.
use crate::{
    corpus::{CorpusError, DocumentProcessor},
    translit::Transliterator,
};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};
use tracing::debug;

const BOM: &str = "\u{feff}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    pub delimiter: u8,
    pub source_col: usize,
    pub target_col: usize,
    /// Index of the first data row; rows above it are headers.
    pub start_line: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            source_col: 0,
            target_col: 1,
            start_line: 1,
        }
    }
}

pub struct TableProcessor<'t> {
    translit: &'t Transliterator,
    config: TableConfig,
}

impl<'t> TableProcessor<'t> {
    pub fn new(translit: &'t Transliterator, config: TableConfig) -> Self {
        Self { translit, config }
    }

    #[inline]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Transliterate a whole table held in memory.
    ///
    /// Every input line yields one output line, blank lines included, and
    /// the output ends with a newline exactly when the input does.
    pub fn process_str(&self, text: &str) -> Result<String, CorpusError> {
        let text = text.strip_prefix(BOM).unwrap_or(text);
        let body = text.strip_suffix('\n').unwrap_or(text);
        let trailing_newline = body.len() != text.len();

        let mut reader = ReaderBuilder::new();
        reader
            .delimiter(self.config.delimiter)
            .has_headers(false)
            .flexible(true)
            .quoting(false);

        let mut rows = Vec::new();
        for (index, line) in body.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            // A blank line is one empty cell; the csv reader would skip it.
            let record = match reader.from_reader(line.as_bytes()).records().next() {
                Some(record) => record?,
                None => StringRecord::from(vec![""]),
            };
            rows.push(if index >= self.config.start_line {
                self.process_row(&record)?
            } else {
                record
            });
        }
        debug!(rows = rows.len(), "table transliterated");

        let mut builder = WriterBuilder::new();
        builder
            .delimiter(self.config.delimiter)
            .flexible(true)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'));
        let mut bytes = Vec::new();
        for row in &rows {
            if row.iter().all(str::is_empty) && row.len() <= 1 {
                bytes.push(b'\n');
                continue;
            }
            let mut writer = builder.from_writer(&mut bytes);
            writer.write_record(row)?;
            writer.flush()?;
        }
        if !trailing_newline {
            bytes.pop();
        }
        String::from_utf8(bytes).map_err(|e| CorpusError::Utf8(e.utf8_error()))
    }

    fn process_row(&self, record: &StringRecord) -> Result<StringRecord, CorpusError> {
        let Some(source) = record.get(self.config.source_col) else {
            return Ok(record.clone());
        };
        let target = self.translit.transliterate(source)?;
        let width = record.len().max(self.config.target_col + 1);
        let mut row = StringRecord::with_capacity(record.as_slice().len() + target.len(), width);
        for col in 0..width {
            if col == self.config.target_col {
                row.push_field(&target);
            } else {
                row.push_field(record.get(col).unwrap_or(""));
            }
        }
        Ok(row)
    }
}

impl DocumentProcessor for TableProcessor<'_> {
    fn extensions(&self) -> &'static [&'static str] {
        &["csv", "tsv"]
    }

    fn process_file(&mut self, input: &Path, output: &Path) -> Result<(), CorpusError> {
        let text = fs::read_to_string(input)?;
        let table = self.process_str(&text)?;
        let mut out = BufWriter::new(fs::File::create(output)?);
        out.write_all(BOM.as_bytes())?;
        out.write_all(table.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
