//! Per-file read → parse pipeline with cursor-based progress.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigValue, ParseConfig, ReaderProps};
use crate::io::{resolve_encoding, FileDescriptor, FileReader};
use crate::parser::{CsvParser, ParsedRow};
use crate::view::Presenter;
use crate::CsvReaderError;

/// How long the progress bar stays up after a file has been read.
pub const HIDE_DELAY: Duration = Duration::from_secs(2);

/// `floor(cursor / size * 100)`, clamped to 100. An empty file counts as done.
///
/// `cursor` is a byte offset into the decoded text while `size` is the raw file size, so
/// the two only agree for plain UTF-8. A stripped BOM keeps the last cursor short of `size`
/// (a 7-byte `\xEF\xBB\xBFa\nb\n` file ends at 57), and text that decodes longer than
/// its raw bytes reaches 100 early.
pub fn percent_of(cursor: u64, size: u64) -> u8 {
    if size == 0 {
        return 100;
    }
    let scaled = u128::from(cursor.min(size)) * 100 / u128::from(size);
    scaled as u8
}

/// Turns a stream of cursors into a strictly increasing stream of percentages.
#[derive(Debug, Clone, Copy)]
pub struct PercentTracker {
    size: u64,
    last: u8,
}

impl PercentTracker {
    pub fn new(size: u64) -> Self {
        Self { size, last: 0 }
    }

    /// The new percentage, or `None` if it would repeat (or undercut) the last one.
    pub fn advance(&mut self, cursor: u64) -> Option<u8> {
        let percent = percent_of(cursor, self.size);
        if percent <= self.last {
            return None;
        }
        self.last = percent;
        Some(percent)
    }
}

/// Runs batches of files through the reader and parser, one file at a time.
pub struct Ingestor {
    props: Arc<ReaderProps>,
    parser: Arc<dyn CsvParser>,
    reader: Arc<dyn FileReader>,
    view: Presenter,
}

impl Ingestor {
    pub fn new(
        props: Arc<ReaderProps>,
        parser: Arc<dyn CsvParser>,
        reader: Arc<dyn FileReader>,
        view: Presenter,
    ) -> Self {
        Self {
            props,
            parser,
            reader,
            view,
        }
    }

    /// Ingest one batch. Progress is reset once, then files run strictly in order.
    ///
    /// A queued batch may start after the previous one scheduled its hide, so the bar is
    /// re-shown here and that hide dropped.
    pub async fn ingest(&self, files: Vec<FileDescriptor>) {
        self.view.cancel_hide();
        self.view.set_visible(true);
        self.view.set_percent(0);
        for file in &files {
            self.ingest_file(file).await;
        }
    }

    async fn ingest_file(&self, file: &FileDescriptor) {
        tracing::debug!(name = %file.name, size = file.size, "ingesting file");
        self.view.show_file(file);

        let config = self.assemble_config(file.size);
        let encoding = resolve_encoding(self.props.config_options.text("encoding"));
        let read = self.reader.read_as_text(file, encoding).await;
        self.view.schedule_hide(HIDE_DELAY);

        match read {
            Ok(text) => self.parser.parse(text, config).await,
            Err(source) => {
                let err = CsvReaderError::Read {
                    name: file.name.clone(),
                    source,
                };
                match &self.props.on_error {
                    Some(on_error) => on_error(&err),
                    None => tracing::warn!(error = %err, "read failed with no error hook"),
                }
            }
        }
    }

    /// Internal hooks first, caller options (minus reserved keys) on top.
    pub fn assemble_config(&self, size: u64) -> ParseConfig {
        let mut config = ParseConfig::new();

        if let Some(on_file_loaded) = &self.props.on_file_loaded {
            let rows: Arc<Mutex<Vec<ParsedRow>>> = Arc::default();
            let tracker = Mutex::new(PercentTracker::new(size));

            let complete = {
                let rows = rows.clone();
                let on_file_loaded = on_file_loaded.clone();
                move || {
                    let rows = std::mem::take(&mut *rows.lock());
                    tracing::debug!(rows = rows.len(), "file loaded");
                    on_file_loaded(rows);
                }
            };
            let step = {
                let view = self.view.clone();
                move |row: ParsedRow| {
                    let cursor = row.meta.cursor;
                    rows.lock().push(row);
                    if let Some(percent) = tracker.lock().advance(cursor) {
                        view.set_percent(percent);
                    }
                }
            };
            config.insert("complete", ConfigValue::Complete(Arc::new(complete)));
            config.insert("step", ConfigValue::Step(Arc::new(step)));
        }

        if let Some(on_error) = &self.props.on_error {
            config.insert("error", ConfigValue::Error(on_error.clone()));
        }

        config.merge(self.props.config_options.sanitized());
        config
    }
}
