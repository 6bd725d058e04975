//! Terminal front end for the pacer.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml`.
//! - Load a text-layer dump of the rendered document.
//! - Drive a [`Reader`] in real time, printing each active unit to stdout.

use anyhow::{Context, Result, anyhow, bail};
use pdf_pacer::app::{Command, ExtractionState, Message, Reader};
use pdf_pacer::config::load_config;
use pdf_pacer::geometry::LayoutSnapshot;
use pdf_pacer::persistence::SessionStore;
use pdf_pacer::shutdown::ShutdownSignal;
use pdf_pacer::source::{DocumentSource, SourceRef, fetch_remote, looks_like_pdf};
use std::collections::VecDeque;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const TICK: Duration = Duration::from_millis(50);

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

struct Args {
    layout: PathBuf,
    source: Option<String>,
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args()?;
    let config = load_config(Path::new("conf/config.toml"));
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        layout = %args.layout.display(),
        level = %config.log_level,
        granularity = %config.granularity,
        "Starting pacer"
    );

    let layout = LayoutSnapshot::load(&args.layout)?;
    let store = SessionStore::on_disk(Path::new(&config.cache_dir));
    let mut reader = Reader::new(config, store);

    let shutdown = ShutdownSignal::new();
    shutdown.install_ctrlc()?;

    let first = match (reader.resume_offer(), args.source.as_deref()) {
        (Some(offer), arg) if arg.is_none_or(|a| matches_saved(&reader, a)) => {
            info!(
                source = %offer.source_name,
                position = offer.position,
                wpm = offer.wpm,
                "Resuming previous session"
            );
            Message::Resume
        }
        (_, Some(arg)) => Message::OpenSource(open_source(arg)?),
        (_, None) => {
            return Err(anyhow!(
                "No saved session to resume; pass the document path or URL"
            ));
        }
    };

    let now = Instant::now();
    let commands = reader.update(first, now);
    if drive(&mut reader, &layout, commands, now) {
        return Ok(());
    }
    if !reader.has_document() {
        return Err(anyhow!("Saved document could not be reopened"));
    }
    if reader.extraction_state() == ExtractionState::Idle {
        // The dump is already laid out; announce it the way a renderer would.
        let commands = reader.update(Message::PagesRendered, now);
        drive(&mut reader, &layout, commands, now);
    }
    if !reader.is_ready() {
        warn!("The layout dump contains no text to pace");
        return Ok(());
    }

    let mut shown = None;
    show_current(&reader, &mut shown);
    let commands = reader.update(Message::Play, Instant::now());
    drive(&mut reader, &layout, commands, Instant::now());

    loop {
        if shutdown.is_requested() {
            reader.update(Message::Pause, Instant::now());
            info!(
                index = reader.current_index(),
                "Interrupted; position saved"
            );
            break;
        }

        let now = Instant::now();
        let wake = reader
            .next_deadline()
            .map_or(now + TICK, |deadline| deadline.min(now + TICK));
        std::thread::sleep(wake.saturating_duration_since(now));

        let now = Instant::now();
        let commands = reader.update(Message::Tick, now);
        let finished = drive(&mut reader, &layout, commands, now);
        show_current(&reader, &mut shown);
        if finished {
            info!("Reached the end of the document");
            break;
        }
        if !reader.is_playing() {
            info!(index = reader.current_index(), "Playback paused");
            break;
        }
    }
    Ok(())
}

/// Carry out reader commands. The layout dump stands in for the renderer and
/// scroll requests land instantly. Returns true once playback finished.
fn drive(
    reader: &mut Reader,
    layout: &LayoutSnapshot,
    commands: Vec<Command>,
    now: Instant,
) -> bool {
    let mut queue: VecDeque<Command> = commands.into();
    let mut finished = false;
    while let Some(command) = queue.pop_front() {
        let follow_up = match command {
            Command::LoadSource(source) => {
                info!(source = source.display_name(), "Rendering document");
                reader.update(Message::PagesRendered, now)
            }
            Command::RequestFrame => reader.extract_pending(layout, now),
            Command::ScrollTo { top, .. } => reader.update(
                Message::Scrolled {
                    scroll_top: top,
                    viewport_height: layout.container.height,
                },
                now,
            ),
            Command::PlaybackFinished => {
                finished = true;
                Vec::new()
            }
        };
        queue.extend(follow_up);
    }
    finished
}

fn show_current(reader: &Reader, shown: &mut Option<usize>) {
    let index = reader.current_index();
    if *shown == Some(index) {
        return;
    }
    if let Some(unit) = reader.current_unit() {
        println!(
            "[{}/{}] {}",
            reader.current_page(),
            reader.page_count(),
            unit.text_content
        );
        *shown = Some(index);
    }
}

fn matches_saved(reader: &Reader, arg: &str) -> bool {
    reader.saved_source() == Some(&SourceRef::from_arg(arg))
}

fn open_source(arg: &str) -> Result<DocumentSource> {
    match SourceRef::from_arg(arg) {
        SourceRef::Remote { url } => {
            let bytes = fetch_remote(&url)?;
            if !looks_like_pdf(&bytes) {
                bail!("{url} did not return a PDF document");
            }
            Ok(DocumentSource::remote(url).with_bytes(bytes))
        }
        SourceRef::Local { name } => {
            let bytes = fs::read(arg).with_context(|| format!("Failed to read {arg}"))?;
            Ok(DocumentSource::local(name, bytes))
        }
    }
}

fn parse_args() -> Result<Args> {
    let mut args = env::args().skip(1);
    let layout = args
        .next()
        .ok_or_else(|| anyhow!("Usage: pdf-pacer <layout.json> [document-path-or-url]"))?;

    let layout = PathBuf::from(layout);
    if !layout.exists() {
        return Err(anyhow!("File not found: {}", layout.as_path().display()));
    }
    Ok(Args {
        layout,
        source: args.next(),
    })
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
