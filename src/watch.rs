//! Live rebuild (`lead dev`).
//!
//! Watches the project root and, for each relevant change, runs a
//! serialized cycle:
//!
//! ```text
//! stop preview server → full rebuild → drain queued events → start server
//! ```
//!
//! Events that pile up while a rebuild runs are drained afterwards; if any
//! of them are relevant, one more rebuild follows before the server comes
//! back. Changes under the output directory, dotfiles, editor temp files
//! and generated thumbnails never trigger a rebuild.
//!
//! An interrupt stops the watcher and the server before returning.

use crate::build::build_site;
use crate::config::{ConfigError, DirRole, SiteConfig, load_config};
use crate::imaging::THUMBNAIL_MARKER;
use crate::output;
use crate::serve::{PreviewServer, ServeError};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("file watcher failed: {0}")]
    Watcher(#[from] notify::Error),
    #[error("could not install interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error(transparent)]
    Serve(#[from] ServeError),
}

enum Signal {
    Change(notify::Result<Event>),
    Interrupt,
}

#[derive(Debug, PartialEq, Eq)]
enum Drained {
    Quiet,
    Changed,
    Interrupted,
}

/// Decides which filesystem events are worth a rebuild.
pub struct ChangeFilter {
    root: PathBuf,
    output: PathBuf,
    log_images: PathBuf,
}

impl ChangeFilter {
    pub fn new(config: &SiteConfig, root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            output: config.output_root(root),
            log_images: config.source_path(root, DirRole::LogImages),
        }
    }

    /// The first path in `event` that should trigger a rebuild.
    pub fn trigger<'e>(&self, event: &'e Event) -> Option<&'e Path> {
        if !matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) {
            return None;
        }
        event
            .paths
            .iter()
            .map(PathBuf::as_path)
            .find(|p| self.is_relevant(p))
    }

    fn is_relevant(&self, path: &Path) -> bool {
        if path.starts_with(&self.output) || is_temp_file(path) {
            return false;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let hidden = relative.components().any(|c| match c {
            Component::Normal(name) => name.to_string_lossy().starts_with('.'),
            _ => false,
        });
        if hidden {
            return false;
        }
        let generated = path.starts_with(&self.log_images)
            && path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().contains(THUMBNAIL_MARKER));
        !generated
    }
}

/// Editor artifacts: backups, swap files, dotfiles.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Empty the queue without blocking. Relevant changes collapse into one.
fn drain(rx: &Receiver<Signal>, filter: &ChangeFilter) -> Drained {
    let mut result = Drained::Quiet;
    loop {
        match rx.try_recv() {
            Ok(Signal::Interrupt) | Err(TryRecvError::Disconnected) => return Drained::Interrupted,
            Ok(Signal::Change(Ok(event))) => {
                if filter.trigger(&event).is_some() {
                    result = Drained::Changed;
                }
            }
            Ok(Signal::Change(Err(e))) => log::warn!("watch error: {e}"),
            Err(TryRecvError::Empty) => return result,
        }
    }
}

/// One full build. Failures are logged; the loop keeps watching.
fn rebuild(config: &SiteConfig, root: &Path) {
    match build_site(config, root) {
        Ok(report) => output::print_build_report(&report),
        Err(e) => log::error!("{e}"),
    }
}

/// Rebuild until no relevant change arrived during the last build.
fn rebuild_until_quiet(
    config: &SiteConfig,
    root: &Path,
    rx: &Receiver<Signal>,
    filter: &ChangeFilter,
) -> bool {
    loop {
        rebuild(config, root);
        match drain(rx, filter) {
            Drained::Quiet => return true,
            Drained::Changed => log::info!("Changed during rebuild, rebuilding again..."),
            Drained::Interrupted => return false,
        }
    }
}

/// Build, serve and rebuild on every change until interrupted.
pub fn run_dev(root: &Path, addr: &str) -> Result<(), WatchError> {
    let root = fs::canonicalize(root).map_err(|e| WatchError::Io {
        path: root.to_path_buf(),
        source: e,
    })?;
    let config = load_config(&root)?;
    let output = config.output_root(&root);
    let filter = ChangeFilter::new(&config, &root);

    let (tx, rx) = mpsc::channel();
    let interrupt = tx.clone();
    ctrlc::set_handler(move || {
        let _ = interrupt.send(Signal::Interrupt);
    })?;

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let _ = tx.send(Signal::Change(res));
    })?;
    watcher.watch(&root, RecursiveMode::Recursive)?;
    log::info!("Watching {}", root.display());

    if !rebuild_until_quiet(&config, &root, &rx, &filter) {
        return Ok(());
    }
    let mut server = Some(PreviewServer::start(&output, addr)?);

    while let Ok(signal) = rx.recv() {
        let event = match signal {
            Signal::Interrupt => break,
            Signal::Change(Err(e)) => {
                log::warn!("watch error: {e}");
                continue;
            }
            Signal::Change(Ok(event)) => event,
        };
        let Some(path) = filter.trigger(&event) else {
            continue;
        };
        log::info!(
            "{} changed, rebuilding...",
            path.strip_prefix(&root).unwrap_or(path).display()
        );

        if let Some(running) = server.take() {
            running.stop();
        }
        if !rebuild_until_quiet(&config, &root, &rx, &filter) {
            break;
        }
        server = Some(PreviewServer::start(&output, addr)?);
    }

    log::info!("Shutting down...");
    drop(watcher);
    if let Some(running) = server {
        running.stop();
    }
    Ok(())
}
