#![allow(dead_code)]

use csv_drop::{CsvParser, ParseConfig, ParsedRow, RowData, StepMeta};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::{Arc, Mutex};

pub type Tap = Arc<dyn Fn() + Send + Sync>;

/// Stands in for a real parser: emits one row per scripted cursor, then completes.
#[derive(Clone, Default)]
pub struct ScriptedParser {
    pub cursors: Vec<u64>,
    /// Every config the parser was called with.
    pub seen: Arc<Mutex<Vec<ParseConfig>>>,
    /// Runs once before the first step.
    pub before: Option<Tap>,
    /// Runs after every step.
    pub after_step: Option<Tap>,
}

impl ScriptedParser {
    pub fn new(cursors: impl Into<Vec<u64>>) -> Self {
        Self {
            cursors: cursors.into(),
            ..Default::default()
        }
    }
}

pub fn row(cursor: u64) -> ParsedRow {
    ParsedRow {
        data: RowData::Fields(vec![format!("row@{cursor}")]),
        meta: StepMeta { cursor },
    }
}

impl CsvParser for ScriptedParser {
    fn parse<'a>(&'a self, _text: String, config: ParseConfig) -> BoxFuture<'a, ()> {
        async move {
            self.seen.lock().unwrap().push(config.clone());
            if let Some(before) = &self.before {
                before();
            }
            for &cursor in &self.cursors {
                if let Some(step) = config.step() {
                    step(row(cursor));
                }
                if let Some(after) = &self.after_step {
                    after();
                }
            }
            if let Some(complete) = config.complete() {
                complete();
            }
        }
        .boxed()
    }
}

/// Records every call made to a callback.
#[derive(Clone)]
pub struct Calls<T>(pub Arc<Mutex<Vec<T>>>);

impl<T> Default for Calls<T> {
    fn default() -> Self {
        Self(Arc::default())
    }
}

impl<T: Clone> Calls<T> {
    pub fn push(&self, value: T) {
        self.0.lock().unwrap().push(value);
    }

    pub fn all(&self) -> Vec<T> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}
