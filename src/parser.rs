//! The CSV parsing capability and its default `csv-async` implementation.
//!
//! A parser is driven entirely through the hooks in a [`ParseConfig`]: it calls
//! `step` once per record with the byte cursor reached, `complete` once at the end,
//! and `error` if it cannot continue. Nothing is returned.

use csv_async::{AsyncReaderBuilder, StringRecord, Trim};
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::config::{ConfigValue, ParseConfig};
use crate::{CsvReaderError, CsvReaderResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowData {
    /// Values in column order (`header` off).
    Fields(Vec<String>),
    /// `(column, value)` pairs in column order (`header` on).
    Record(Vec<(String, String)>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepMeta {
    /// Byte offset into the text just past this record.
    pub cursor: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub data: RowData,
    pub meta: StepMeta,
}

impl ParsedRow {
    /// Look up a value by column name; only available in header mode.
    pub fn get(&self, column: &str) -> Option<&str> {
        match &self.data {
            RowData::Record(pairs) => pairs
                .iter()
                .find(|(name, _)| name == column)
                .map(|(_, value)| value.as_str()),
            RowData::Fields(_) => None,
        }
    }
}

pub trait CsvParser: Send + Sync {
    fn parse<'a>(&'a self, text: String, config: ParseConfig) -> BoxFuture<'a, ()>;
}

/// Streams the text through `csv_async`.
///
/// Recognized options: `delimiter`, `quote_char`, `escape_char`, `comment` (single ASCII
/// characters), `header`, `trim`, `flexible` (booleans) and `preview` (row limit, 0 = all).
#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncCsvParser;

impl CsvParser for AsyncCsvParser {
    fn parse<'a>(&'a self, text: String, config: ParseConfig) -> BoxFuture<'a, ()> {
        run(text, config).boxed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParserSettings {
    delimiter: u8,
    quote: u8,
    escape: Option<u8>,
    comment: Option<u8>,
    has_headers: bool,
    trim: bool,
    flexible: bool,
    preview: Option<u64>,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            escape: None,
            comment: None,
            has_headers: false,
            trim: false,
            flexible: true,
            preview: None,
        }
    }
}

impl ParserSettings {
    fn from_config(config: &ParseConfig) -> CsvReaderResult<Self> {
        let mut settings = Self::default();
        if let Some(b) = byte_option(config, "delimiter")? {
            settings.delimiter = b;
        }
        if let Some(b) = byte_option(config, "quote_char")? {
            settings.quote = b;
        }
        settings.escape = byte_option(config, "escape_char")?;
        settings.comment = byte_option(config, "comment")?;
        if let Some(v) = bool_option(config, "header")? {
            settings.has_headers = v;
        }
        if let Some(v) = bool_option(config, "trim")? {
            settings.trim = v;
        }
        if let Some(v) = bool_option(config, "flexible")? {
            settings.flexible = v;
        }
        settings.preview = match config.get("preview") {
            None | Some(ConfigValue::Int(0)) => None,
            Some(ConfigValue::Int(n)) if *n > 0 => Some(*n as u64),
            Some(other) => return Err(invalid("preview", format!("expected a row count, got {other:?}"))),
        };
        Ok(settings)
    }

    fn builder(&self) -> AsyncReaderBuilder {
        let mut builder = AsyncReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .escape(self.escape)
            .comment(self.comment)
            .has_headers(self.has_headers)
            .flexible(self.flexible)
            .trim(if self.trim { Trim::All } else { Trim::None })
            // Larger internal buffer reduces allocator churn on big files
            .buffer_capacity(1 << 20); // 1 MiB
        builder
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> CsvReaderError {
    CsvReaderError::InvalidOption {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn byte_option(config: &ParseConfig, key: &str) -> CsvReaderResult<Option<u8>> {
    let Some(value) = config.get(key) else {
        return Ok(None);
    };
    let ConfigValue::Text(raw) = value else {
        return Err(invalid(key, format!("expected a single character, got {value:?}")));
    };
    let raw = match raw.as_str() {
        "\\t" => "\t",
        other => other,
    };
    match raw.as_bytes() {
        [b] if b.is_ascii() => Ok(Some(*b)),
        _ => Err(invalid(key, format!("expected a single ASCII character, got {raw:?}"))),
    }
}

fn bool_option(config: &ParseConfig, key: &str) -> CsvReaderResult<Option<bool>> {
    match config.get(key) {
        None => Ok(None),
        Some(ConfigValue::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(invalid(key, format!("expected true or false, got {other:?}"))),
    }
}

fn report(config: &ParseConfig, err: CsvReaderError) {
    match config.error() {
        Some(hook) => hook(&err),
        None => tracing::warn!(error = %err, "csv parse failed with no error hook"),
    }
}

async fn run(text: String, config: ParseConfig) {
    let settings = match ParserSettings::from_config(&config) {
        Ok(settings) => settings,
        Err(err) => return report(&config, err),
    };
    let mut rdr = settings.builder().create_reader(text.as_bytes());

    let headers: Option<Vec<String>> = if settings.has_headers {
        match rdr.headers().await {
            Ok(h) => Some(h.iter().map(str::to_owned).collect()),
            Err(err) => return report(&config, err.into()),
        }
    } else {
        None
    };

    let step = config.step();
    let mut record = StringRecord::new();
    let mut emitted = 0u64;
    loop {
        match rdr.read_record(&mut record).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => return report(&config, err.into()),
        }
        emitted += 1;

        if let Some(step) = step {
            let data = match &headers {
                Some(names) => RowData::Record(
                    record
                        .iter()
                        .enumerate()
                        .map(|(i, value)| {
                            let name = names
                                .get(i)
                                .cloned()
                                .unwrap_or_else(|| format!("__extra_{i}"));
                            (name, value.to_owned())
                        })
                        .collect(),
                ),
                None => RowData::Fields(record.iter().map(str::to_owned).collect()),
            };
            step(ParsedRow {
                data,
                meta: StepMeta {
                    cursor: rdr.position().byte(),
                },
            });
        }

        if settings.preview.is_some_and(|limit| emitted >= limit) {
            break;
        }
    }

    tracing::debug!(rows = emitted, "csv parse complete");
    if let Some(complete) = config.complete() {
        complete();
    }
}
