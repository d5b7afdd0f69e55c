//! Host-facing configuration: component props and parser options.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::drop_zone::FilePicker;
use crate::parser::ParsedRow;
use crate::style::Style;
use crate::CsvReaderError;

/// Called by the parser for every record.
pub type StepHook = Arc<dyn Fn(ParsedRow) + Send + Sync>;
/// Called by the parser once, after the last record.
pub type CompleteHook = Arc<dyn Fn() + Send + Sync>;
/// Called on any read or parse failure.
pub type ErrorHook = Arc<dyn Fn(&CsvReaderError) + Send + Sync>;
/// Receives every row of a file once it has been parsed.
pub type FileLoadedHook = Arc<dyn Fn(Vec<ParsedRow>) + Send + Sync>;

/// Option names owned by the ingestion pipeline. Caller values under these keys are dropped.
pub const RESERVED_KEYS: [&str; 3] = ["error", "step", "complete"];

pub const DEFAULT_LABEL: &str = "Drop CSV file here or click to upload.";

#[derive(Clone)]
pub enum ConfigValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Step(StepHook),
    Complete(CompleteHook),
    Error(ErrorHook),
}

impl ConfigValue {
    /// Interpret a command-line style literal: `true`/`false`, an integer, or text.
    pub fn parse_literal(raw: &str) -> Self {
        match raw {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => raw
                .parse::<i64>()
                .map(Self::Int)
                .unwrap_or_else(|_| Self::Text(raw.to_string())),
        }
    }
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Self::Step(_) => f.write_str("Step(<hook>)"),
            Self::Complete(_) => f.write_str("Complete(<hook>)"),
            Self::Error(_) => f.write_str("Error(<hook>)"),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Parser options keyed by name. Later merges win.
#[derive(Clone, Default, Debug)]
pub struct ParseConfig {
    options: BTreeMap<String, ConfigValue>,
}

impl ParseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.options.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.options.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn step(&self) -> Option<&StepHook> {
        match self.get("step")? {
            ConfigValue::Step(hook) => Some(hook),
            _ => None,
        }
    }

    pub fn complete(&self) -> Option<&CompleteHook> {
        match self.get("complete")? {
            ConfigValue::Complete(hook) => Some(hook),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorHook> {
        match self.get("error")? {
            ConfigValue::Error(hook) => Some(hook),
            _ => None,
        }
    }

    /// A copy without the reserved lifecycle keys.
    pub fn sanitized(&self) -> Self {
        let options = self
            .options
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self { options }
    }

    /// Overlay `other` onto `self`; keys present in both take `other`'s value.
    pub fn merge(&mut self, other: ParseConfig) {
        self.options.extend(other.options);
    }
}

/// Everything the host configures on the component.
#[derive(Clone, Default)]
pub struct ReaderProps {
    pub on_file_loaded: Option<FileLoadedHook>,
    pub on_error: Option<ErrorHook>,
    /// The hidden native file-selection control a click forwards to.
    pub input_ref: Option<Arc<dyn FilePicker>>,
    /// Pass-through parser options. `encoding` also selects the text encoding for reads.
    pub config_options: ParseConfig,
    pub style: Style,
    pub label: Option<String>,
}

impl ReaderProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_file_loaded(mut self, hook: impl Fn(Vec<ParsedRow>) + Send + Sync + 'static) -> Self {
        self.on_file_loaded = Some(Arc::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl Fn(&CsvReaderError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }

    pub fn input_ref(mut self, picker: impl FilePicker + 'static) -> Self {
        self.input_ref = Some(Arc::new(picker));
        self
    }

    pub fn config_options(mut self, options: ParseConfig) -> Self {
        self.config_options = options;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Text shown while no file has been handled yet.
    pub fn label_text(&self) -> &str {
        self.label.as_deref().unwrap_or(DEFAULT_LABEL)
    }
}

impl fmt::Debug for ReaderProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderProps")
            .field("on_file_loaded", &self.on_file_loaded.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("input_ref", &self.input_ref.is_some())
            .field("config_options", &self.config_options)
            .field("style", &self.style)
            .field("label", &self.label)
            .finish()
    }
}
