mod common;

use common::{Calls, ScriptedParser};
use csv_drop::{
    CsvParser, CsvReader, DataTransfer, FileDescriptor, FileInputTarget, FilePicker, Layout,
    ParseConfig, ReaderProps, UiEvent, ViewState,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;

fn csv(name: &str) -> FileDescriptor {
    FileDescriptor::from_bytes(name.to_string(), format!("id\n{name}\n").into_bytes())
}

fn drop_of(files: Vec<FileDescriptor>) -> UiEvent {
    UiEvent::Drop(DataTransfer { files })
}

/// Mount with a real parser; every loaded file's row count arrives on the receiver.
fn mount_counting(props: ReaderProps) -> (csv_drop::MountedReader, mpsc::UnboundedReceiver<usize>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let props = props.on_file_loaded(move |rows| {
        let _ = tx.send(rows.len());
    });
    (CsvReader::new(props).mount(), rx)
}

#[tokio::test]
async fn drag_events_suppress_platform_default() {
    let (reader, _loaded) = mount_counting(ReaderProps::new());
    assert!(reader.dispatch(UiEvent::DragEnter).prevent_default);
    assert!(reader.dispatch(UiEvent::DragLeave).stop_propagation);
    assert!(!reader.dispatch(UiEvent::Click).prevent_default);
    assert_eq!(reader.label(), "Drop CSV file here or click to upload.");
}

#[tokio::test(start_paused = true)]
async fn drop_activates_and_bar_hides_two_seconds_after_read() {
    let (reader, mut loaded) = mount_counting(ReaderProps::new());
    reader.dispatch(UiEvent::DragOver);
    reader.dispatch(drop_of(vec![csv("orders.csv")]));
    assert_eq!(loaded.recv().await, Some(2));

    let state = reader.snapshot();
    assert_eq!(state.layout, Layout::Active);
    assert!(!state.highlighted);
    assert!(state.progress.visible);
    assert_eq!(state.progress.percent, 100);
    assert_eq!(state.file.map(|f| f.name), Some("orders.csv".to_string()));

    sleep(Duration::from_millis(1999)).await;
    assert!(reader.snapshot().progress.visible);

    let mut rx = reader.state();
    rx.borrow_and_update();
    sleep(Duration::from_millis(2)).await;
    assert!(rx.has_changed().unwrap());
    assert!(!rx.borrow_and_update().progress.visible);

    sleep(Duration::from_secs(10)).await;
    assert!(!rx.has_changed().unwrap());
    assert_eq!(reader.snapshot().layout, Layout::Active);
}

#[tokio::test(start_paused = true)]
async fn new_drop_cancels_pending_hide() {
    let (reader, mut loaded) = mount_counting(ReaderProps::new());
    reader.dispatch(drop_of(vec![csv("first.csv")]));
    assert_eq!(loaded.recv().await, Some(2));

    sleep(Duration::from_millis(1500)).await;
    reader.dispatch(drop_of(vec![csv("second.csv")]));
    assert_eq!(loaded.recv().await, Some(2));

    // The first file's timer would have fired here.
    sleep(Duration::from_millis(1000)).await;
    assert!(reader.snapshot().progress.visible);

    sleep(Duration::from_millis(1100)).await;
    assert!(!reader.snapshot().progress.visible);
}

#[tokio::test]
async fn click_opens_picker_and_selection_is_ingested() {
    struct Picker(mpsc::UnboundedSender<()>);
    impl FilePicker for Picker {
        fn open(&self) {
            let _ = self.0.send(());
        }
    }

    let (opened_tx, mut opened) = mpsc::unbounded_channel();
    let (reader, mut loaded) = mount_counting(ReaderProps::new().input_ref(Picker(opened_tx)));

    reader.dispatch(UiEvent::Click);
    assert_eq!(opened.recv().await, Some(()));

    reader.dispatch(UiEvent::InputChange(FileInputTarget {
        files: vec![csv("picked.csv")],
    }));
    assert_eq!(loaded.recv().await, Some(2));

    let state = reader.snapshot();
    assert_eq!(state.layout, Layout::Active);
    assert!(state.progress.visible);
    assert_eq!(state.file.map(|f| f.size_label()), Some("14 B".to_string()));
}

#[tokio::test]
async fn header_option_flows_through_to_the_parser() {
    let (reader, mut loaded) =
        mount_counting(ReaderProps::new().config_options(ParseConfig::new().with("header", true)));
    reader.dispatch(drop_of(vec![csv("one.csv")]));
    assert_eq!(loaded.recv().await, Some(1));
}

/// Logs parse start/end with a yield in between so interleaving would show.
#[derive(Clone, Default)]
struct SlowParser {
    log: Calls<String>,
}

impl CsvParser for SlowParser {
    fn parse<'a>(&'a self, text: String, config: ParseConfig) -> BoxFuture<'a, ()> {
        async move {
            let name = text.lines().nth(1).unwrap_or_default().to_string();
            self.log.push(format!("start {name}"));
            for _ in 0..5 {
                tokio::task::yield_now().await;
            }
            self.log.push(format!("end {name}"));
            if let Some(complete) = config.complete() {
                complete();
            }
        }
        .boxed()
    }
}

#[tokio::test]
async fn files_and_batches_never_interleave() {
    let parser = SlowParser::default();
    let log = parser.log.clone();
    let (tx, mut loaded) = mpsc::unbounded_channel();
    let props = ReaderProps::new().on_file_loaded(move |_| {
        let _ = tx.send(());
    });
    let reader = CsvReader::new(props).with_parser(parser).mount();

    reader.dispatch(drop_of(vec![csv("a"), csv("b")]));
    reader.dispatch(drop_of(vec![csv("c")]));
    for _ in 0..3 {
        loaded.recv().await;
    }

    assert_eq!(
        log.all(),
        vec!["start a", "end a", "start b", "end b", "start c", "end c"]
    );
}

/// Takes three seconds per file and notes whether the bar was up when parsing began.
#[derive(Clone, Default)]
struct LingeringParser {
    view: Arc<OnceLock<watch::Receiver<ViewState>>>,
    log: Calls<String>,
}

impl CsvParser for LingeringParser {
    fn parse<'a>(&'a self, text: String, config: ParseConfig) -> BoxFuture<'a, ()> {
        async move {
            let name = text.lines().nth(1).unwrap_or_default().to_string();
            let visible = self
                .view
                .get()
                .is_some_and(|rx| rx.borrow().progress.visible);
            self.log.push(format!("{name} visible={visible}"));
            sleep(Duration::from_secs(3)).await;
            if let Some(complete) = config.complete() {
                complete();
            }
        }
        .boxed()
    }
}

#[tokio::test(start_paused = true)]
async fn queued_batch_parses_with_the_bar_shown() {
    let parser = LingeringParser::default();
    let (view, log) = (parser.view.clone(), parser.log.clone());
    let (tx, mut loaded) = mpsc::unbounded_channel();
    let props = ReaderProps::new().on_file_loaded(move |_| {
        let _ = tx.send(());
    });
    let reader = CsvReader::new(props).with_parser(parser).mount();
    let _ = view.set(reader.state());

    reader.dispatch(drop_of(vec![csv("a"), csv("b")]));
    sleep(Duration::from_secs(1)).await;
    reader.dispatch(drop_of(vec![csv("c")]));
    for _ in 0..3 {
        loaded.recv().await;
    }

    // b's hide fires at t=5, before c starts at t=6.
    assert_eq!(
        log.all(),
        vec!["a visible=true", "b visible=true", "c visible=true"]
    );

    // c finished parsing at t=9; its own hide from t=6 has fired.
    assert!(!reader.snapshot().progress.visible);
}

#[tokio::test]
async fn empty_drop_leaves_the_view_idle() {
    let parser = ScriptedParser::new([1]);
    let seen = parser.seen.clone();
    let (tx, mut loaded) = mpsc::unbounded_channel();
    let props = ReaderProps::new().on_file_loaded(move |_| {
        let _ = tx.send(());
    });
    let reader = CsvReader::new(props).with_parser(parser).mount();

    reader.dispatch(drop_of(vec![]));
    reader.dispatch(drop_of(vec![csv("marker.csv")]));
    loaded.recv().await;

    // Only the second drop reached the parser.
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn unmount_tears_everything_down() {
    let (reader, _loaded) = mount_counting(ReaderProps::new());
    let mut state = reader.state();
    reader.unmount();
    assert!(state.changed().await.is_err());
}
