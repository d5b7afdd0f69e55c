//! The mounted component: drop zone, ingestion worker and view wired together.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::ReaderProps;
use crate::drop_zone::{DropZone, EventDisposition, UiEvent};
use crate::ingest::Ingestor;
use crate::io::{FileDescriptor, FileReader, FsReader};
use crate::parser::{AsyncCsvParser, CsvParser};
use crate::view::{Presenter, ViewState};

/// An unmounted CSV reader. Swap collaborators before calling [`CsvReader::mount`].
pub struct CsvReader {
    props: Arc<ReaderProps>,
    parser: Arc<dyn CsvParser>,
    reader: Arc<dyn FileReader>,
}

impl CsvReader {
    pub fn new(props: ReaderProps) -> Self {
        Self {
            props: Arc::new(props),
            parser: Arc::new(AsyncCsvParser),
            reader: Arc::new(FsReader),
        }
    }

    pub fn with_parser(mut self, parser: impl CsvParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    pub fn with_file_reader(mut self, reader: impl FileReader + 'static) -> Self {
        self.reader = Arc::new(reader);
        self
    }

    /// Start the event loop and ingestion worker on the current tokio runtime.
    ///
    /// Everything stops when the returned handle is dropped.
    pub fn mount(self) -> MountedReader {
        let view = Presenter::new();
        let zone = DropZone::new(view.clone(), self.props.input_ref.clone());
        let ingestor = Ingestor::new(self.props.clone(), self.parser, self.reader, view.clone());

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (batch_tx, batch_rx) = mpsc::unbounded_channel();
        let event_loop = tokio::spawn(run_events(zone, event_rx, batch_tx));
        let worker = tokio::spawn(run_batches(ingestor, batch_rx));
        tracing::debug!("csv reader mounted");

        MountedReader {
            events: event_tx,
            state: view.subscribe(),
            props: self.props,
            view,
            event_loop,
            worker,
        }
    }
}

async fn run_events(
    zone: DropZone,
    mut events: mpsc::UnboundedReceiver<UiEvent>,
    batches: mpsc::UnboundedSender<Vec<FileDescriptor>>,
) {
    while let Some(event) = events.recv().await {
        let Some(files) = zone.handle_event(event) else {
            continue;
        };
        if batches.send(files).is_err() {
            break;
        }
    }
}

/// Batches queue behind each other so no two files are ever read at once.
async fn run_batches(ingestor: Ingestor, mut batches: mpsc::UnboundedReceiver<Vec<FileDescriptor>>) {
    while let Some(files) = batches.recv().await {
        ingestor.ingest(files).await;
    }
}

/// A live component. Feed it platform events with [`MountedReader::dispatch`] and
/// render from [`MountedReader::state`].
pub struct MountedReader {
    events: mpsc::UnboundedSender<UiEvent>,
    state: watch::Receiver<ViewState>,
    props: Arc<ReaderProps>,
    view: Presenter,
    event_loop: JoinHandle<()>,
    worker: JoinHandle<()>,
}

impl MountedReader {
    /// Queue an event. The returned disposition must be applied to the platform event
    /// synchronously, before the handler returns.
    pub fn dispatch(&self, event: UiEvent) -> EventDisposition {
        let disposition = event.disposition();
        if self.events.send(event).is_err() {
            tracing::warn!("event dropped, csv reader is no longer running");
        }
        disposition
    }

    pub fn state(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Text for the idle drop area.
    pub fn label(&self) -> &str {
        self.props.label_text()
    }

    /// Same as dropping the handle.
    pub fn unmount(self) {}
}

impl Drop for MountedReader {
    fn drop(&mut self) {
        self.event_loop.abort();
        self.worker.abort();
        self.view.cancel_hide();
        tracing::debug!("csv reader unmounted");
    }
}
