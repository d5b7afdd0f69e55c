//! Headless drag-and-drop CSV file picker.
//!
//! - Drop zone: drag, click and file-input events normalized into one file batch.
//! - Ingestion: each file is read as text, parsed with progress, handed to the host.
//! - View: a `ViewState` published over a `tokio::sync::watch` channel for the host to render.
//!
//! Data shape:
//! - Completed files arrive as `Vec<ParsedRow>` through `ReaderProps::on_file_loaded`
//! - Progress is `ProgressState { percent, visible }` on the published `ViewState`
#![cfg_attr(docsrs, feature(doc_cfg))]
//
mod codec;
pub mod component;
pub mod config;
pub mod drop_zone;
pub mod ingest;
mod io;
pub mod parser;
pub mod style;
pub mod view;

pub use crate::component::{CsvReader, MountedReader};
pub use crate::config::{ConfigValue, ParseConfig, ReaderProps, RESERVED_KEYS};
pub use crate::drop_zone::{
    DataTransfer, DropSource, DropZone, EventDisposition, FileInputTarget, FilePicker, UiEvent,
};
pub use crate::ingest::{percent_of, Ingestor, PercentTracker, HIDE_DELAY};
pub use crate::io::{decode_to_text, resolve_encoding, FileDescriptor, FileHandle, FileReader, FsReader};
pub use crate::parser::{AsyncCsvParser, CsvParser, ParsedRow, RowData, StepMeta};
pub use crate::style::{DropAreaStyle, Style};
pub use crate::view::{format_size, FileInfo, Layout, Presenter, ProgressState, ViewState};

use thiserror::Error;

/// Errors reported to the host through the `error` hook.
#[derive(Debug, Error)]
pub enum CsvReaderError {
    #[error("failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv_async::Error),
    #[error("invalid value for option `{key}`: {reason}")]
    InvalidOption { key: String, reason: String },
}

pub type CsvReaderResult<T> = std::result::Result<T, CsvReaderError>;
