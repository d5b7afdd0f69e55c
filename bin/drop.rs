use clap::{Arg, ArgAction, Command};
use csv_drop::{
    ConfigValue, CsvReader, DataTransfer, FileDescriptor, ParseConfig, ReaderProps, UiEvent,
};
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

enum Outcome {
    Loaded(usize),
    Failed(String),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("csv-drop")
        .about("Drop CSV files onto a headless reader and watch them load")
        .arg(Arg::new("paths").required(true).num_args(1..).value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("encoding").long("encoding").help("Text encoding label (default utf-8)"))
        .arg(Arg::new("delimiter").long("delimiter").help("Field delimiter, a single character or \\t"))
        .arg(Arg::new("no-header").long("no-header").help("Treat the first row as data").action(ArgAction::SetTrue))
        .arg(Arg::new("preview").long("preview").help("Stop after N rows per file").value_parser(clap::value_parser!(i64)))
        .arg(Arg::new("option").long("option").short('o').help("Extra parser option as key=value").action(ArgAction::Append))
        .get_matches();

    let mut options = ParseConfig::new().with("header", !matches.get_flag("no-header"));
    if let Some(encoding) = matches.get_one::<String>("encoding") {
        options.insert("encoding", encoding.as_str());
    }
    if let Some(delimiter) = matches.get_one::<String>("delimiter") {
        options.insert("delimiter", delimiter.as_str());
    }
    if let Some(preview) = matches.get_one::<i64>("preview") {
        options.insert("preview", *preview);
    }
    for raw in matches.get_many::<String>("option").into_iter().flatten() {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("--option expects key=value, got {raw:?}"))?;
        options.insert(key, ConfigValue::parse_literal(value));
    }

    let (tx, mut outcomes) = mpsc::unbounded_channel();
    let loaded_tx = tx.clone();
    let props = ReaderProps::new()
        .config_options(options)
        .on_file_loaded(move |rows| {
            let _ = loaded_tx.send(Outcome::Loaded(rows.len()));
        })
        .on_error(move |err| {
            let _ = tx.send(Outcome::Failed(err.to_string()));
        });

    let mut files = Vec::new();
    for path in matches.get_many::<PathBuf>("paths").into_iter().flatten() {
        files.push(FileDescriptor::from_path(path).await?);
    }
    let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();

    let start = Instant::now();
    let reader = CsvReader::new(props).mount();
    let mut state = reader.state();
    reader.dispatch(UiEvent::DragEnter);
    reader.dispatch(UiEvent::Drop(DataTransfer { files }));

    // Exactly one outcome arrives per file, in drop order.
    let mut results = Vec::with_capacity(names.len());
    while results.len() < names.len() {
        tokio::select! {
            Some(outcome) = outcomes.recv() => results.push(outcome),
            Ok(()) = state.changed() => {
                eprintln!("{}", state.borrow_and_update().render_line(reader.label(), 30));
            }
        }
    }
    let elapsed = start.elapsed().as_secs_f64();

    for (name, outcome) in names.iter().zip(&results) {
        match outcome {
            Outcome::Loaded(rows) => println!("{name}: rows={rows}"),
            Outcome::Failed(err) => println!("{name}: error={err}"),
        }
    }
    println!("files={} elapsed={:.2}s", names.len(), elapsed);
    reader.unmount();
    Ok(())
}
