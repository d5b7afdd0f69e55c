//! Presentation state and the single writer that owns it.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::io::FileDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// No file handled yet; the label is shown.
    #[default]
    Idle,
    /// At least one file handled; the file card is shown. Never reverts.
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub percent: u8,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
}

impl FileInfo {
    pub fn size_label(&self) -> String {
        format_size(self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub layout: Layout,
    pub highlighted: bool,
    pub file: Option<FileInfo>,
    pub progress: ProgressState,
}

impl ViewState {
    /// Progress fill width, e.g. `"45%"`.
    pub fn fill_width(&self) -> String {
        format!("{}%", self.progress.percent.min(100))
    }

    /// One-line rendering for terminal hosts.
    pub fn render_line(&self, label: &str, bar_width: usize) -> String {
        let body = match (&self.layout, &self.file) {
            (Layout::Active, Some(file)) => format!("{} ({})", file.name, file.size_label()),
            _ => label.to_string(),
        };
        let body = if self.highlighted {
            format!("> {body} <")
        } else {
            body
        };
        if !self.progress.visible {
            return body;
        }
        let percent = self.progress.percent.min(100);
        let filled = bar_width * usize::from(percent) / 100;
        format!(
            "{body} [{}{}] {:>3}%",
            "#".repeat(filled),
            "-".repeat(bar_width - filled),
            percent
        )
    }
}

/// Human-readable byte count: `512 B`, `1.5 KB`, `2.0 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Owns the published [`ViewState`] and the pending hide timer.
///
/// Cloning shares the same state. Updates only notify subscribers when something changed.
#[derive(Clone)]
pub struct Presenter {
    state: Arc<watch::Sender<ViewState>>,
    hide_timer: Arc<Mutex<Option<AbortHandle>>>,
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ViewState::default());
        Self {
            state: Arc::new(tx),
            hide_timer: Arc::new(Mutex::new(None)),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn set_highlight(&self, highlighted: bool) {
        self.state
            .send_if_modified(|s| std::mem::replace(&mut s.highlighted, highlighted) != highlighted);
    }

    pub fn set_percent(&self, percent: u8) {
        let percent = percent.min(100);
        self.state
            .send_if_modified(|s| std::mem::replace(&mut s.progress.percent, percent) != percent);
    }

    pub fn set_visible(&self, visible: bool) {
        self.state
            .send_if_modified(|s| std::mem::replace(&mut s.progress.visible, visible) != visible);
    }

    pub fn activate(&self) {
        self.state
            .send_if_modified(|s| std::mem::replace(&mut s.layout, Layout::Active) != Layout::Active);
    }

    pub fn show_file(&self, file: &FileDescriptor) {
        let info = FileInfo {
            name: file.name.clone(),
            size: file.size,
        };
        self.state.send_if_modified(|s| {
            if s.file.as_ref() == Some(&info) {
                return false;
            }
            s.file = Some(info);
            true
        });
    }

    /// Hide the progress bar after `delay`, replacing any pending hide.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule_hide(&self, delay: Duration) {
        let state = self.state.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.send_if_modified(|s| std::mem::replace(&mut s.progress.visible, false));
            tracing::debug!("progress bar hidden");
        });
        if let Some(previous) = self.hide_timer.lock().replace(task.abort_handle()) {
            previous.abort();
        }
    }

    pub fn cancel_hide(&self) {
        if let Some(pending) = self.hide_timer.lock().take() {
            pending.abort();
        }
    }
}
