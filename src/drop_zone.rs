//! The interactive surface: drag, click and file-input events in, file batches out.

use std::sync::Arc;

use crate::io::FileDescriptor;
use crate::view::Presenter;

/// Files carried by a drop.
#[derive(Debug, Clone, Default)]
pub struct DataTransfer {
    pub files: Vec<FileDescriptor>,
}

/// The native file input after its selection changed.
#[derive(Debug, Clone, Default)]
pub struct FileInputTarget {
    pub files: Vec<FileDescriptor>,
}

/// The two shapes a batch of files can arrive in.
#[derive(Debug, Clone)]
pub enum DropSource {
    DataTransfer(DataTransfer),
    FileInput(FileInputTarget),
}

impl DropSource {
    pub fn into_files(self) -> Vec<FileDescriptor> {
        match self {
            Self::DataTransfer(dt) => dt.files,
            Self::FileInput(target) => target.files,
        }
    }
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    DragEnter,
    DragOver,
    DragLeave,
    Drop(DataTransfer),
    Click,
    InputChange(FileInputTarget),
}

impl UiEvent {
    pub fn is_drag_family(&self) -> bool {
        matches!(
            self,
            Self::DragEnter | Self::DragOver | Self::DragLeave | Self::Drop(_)
        )
    }

    /// What the host must do with the platform event before dispatching it.
    ///
    /// Drag-family events never reach the platform default (which would open the file).
    pub fn disposition(&self) -> EventDisposition {
        if self.is_drag_family() {
            EventDisposition {
                prevent_default: true,
                stop_propagation: true,
            }
        } else {
            EventDisposition::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventDisposition {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

/// The host's hidden file-selection control. `open` should eventually lead to a
/// [`UiEvent::InputChange`] once the user picks files.
pub trait FilePicker: Send + Sync {
    fn open(&self);
}

/// Applies UI transitions for incoming events and hands back batches to ingest.
#[derive(Clone)]
pub struct DropZone {
    view: Presenter,
    picker: Option<Arc<dyn FilePicker>>,
}

impl DropZone {
    pub fn new(view: Presenter, picker: Option<Arc<dyn FilePicker>>) -> Self {
        Self { view, picker }
    }

    /// Returns the files to ingest, if the event produced a non-empty batch.
    pub fn handle_event(&self, event: UiEvent) -> Option<Vec<FileDescriptor>> {
        match event {
            UiEvent::DragEnter | UiEvent::DragOver => {
                self.view.set_highlight(true);
                self.view.set_percent(0);
                None
            }
            UiEvent::DragLeave => {
                self.view.set_highlight(false);
                None
            }
            UiEvent::Drop(dt) => {
                self.view.set_highlight(false);
                self.handle_drop(DropSource::DataTransfer(dt))
            }
            UiEvent::Click => {
                match &self.picker {
                    Some(picker) => picker.open(),
                    None => tracing::debug!("click ignored, no file picker registered"),
                }
                None
            }
            UiEvent::InputChange(target) => self.handle_drop(DropSource::FileInput(target)),
        }
    }

    /// Common entry for drops and input selections.
    pub fn handle_drop(&self, source: DropSource) -> Option<Vec<FileDescriptor>> {
        let files = source.into_files();
        if files.is_empty() {
            tracing::debug!("empty selection ignored");
            return None;
        }
        self.view.cancel_hide();
        self.view.set_visible(true);
        self.view.activate();
        tracing::debug!(files = files.len(), "batch accepted");
        Some(files)
    }
}
