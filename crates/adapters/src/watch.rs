// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-modification watcher: a process-wide registry mapping an
//! absolute path to a callback, coalescing write-then-close sequences
//! into a single notification.
//!
//! Grounded on the `notify` crate rather than raw inotify bindings — the
//! kernel-level MODIFY/CLOSE_WRITE/MOVE_SELF/DELETE_SELF mask becomes
//! `notify::EventKind` matching below.

use notify::event::{AccessKind, AccessMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

struct WatchEntry {
    callback: Arc<dyn Fn() + Send + Sync>,
    modified: bool,
}

/// Lazily initializes its single `notify` watcher on the first call to
/// [`FileModificationWatcher::add`], and tears it down again once the
/// last watch entry is removed.
pub struct FileModificationWatcher {
    watcher: Option<RecommendedWatcher>,
    entries: HashMap<PathBuf, WatchEntry>,
    event_tx: mpsc::UnboundedSender<notify::Result<Event>>,
    event_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
}

impl FileModificationWatcher {
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            watcher: None,
            entries: HashMap::new(),
            event_tx,
            event_rx,
        }
    }

    pub fn has_watches(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Registers `callback` to fire on a coalesced write of `path`.
    /// Rejects a path that's already registered.
    pub fn add(&mut self, path: PathBuf, callback: Arc<dyn Fn() + Send + Sync>) -> bool {
        if self.entries.contains_key(&path) {
            tracing::warn!(path = %path.display(), "watch entry already exists");
            return false;
        }

        if self.watcher.is_none() {
            match create_watcher(self.event_tx.clone()) {
                Ok(watcher) => self.watcher = Some(watcher),
                Err(err) => {
                    tracing::error!(error = %err, "failed to initialize file modification watcher");
                    return false;
                }
            }
        }

        let Some(watcher) = self.watcher.as_mut() else {
            return false;
        };

        if let Err(err) = watcher.watch(&path, RecursiveMode::NonRecursive) {
            tracing::error!(path = %path.display(), error = %err, "failed to add a watch");
            if self.entries.is_empty() {
                self.watcher = None;
            }
            return false;
        }

        self.entries.insert(
            path,
            WatchEntry {
                callback,
                modified: false,
            },
        );
        true
    }

    /// Unregisters `path`. Tears down the shared watcher if this was the
    /// last remaining entry.
    pub fn delete(&mut self, path: &Path) -> bool {
        let Some(_entry) = self.entries.remove(path) else {
            tracing::error!(path = %path.display(), "watch entry does not exist");
            return false;
        };

        let mut ok = true;
        if let Some(watcher) = self.watcher.as_mut() {
            if let Err(err) = watcher.unwatch(path) {
                tracing::error!(path = %path.display(), error = %err, "failed to remove a watch");
                ok = false;
            }
        }

        if self.entries.is_empty() {
            tracing::debug!("last watch entry removed, tearing down file modification watcher");
            self.watcher = None;
        }

        ok
    }

    /// Awaits the next raw event from the shared watcher. Callers drive
    /// this from their event loop and pass the result to [`Self::handle_event`].
    pub async fn next_event(&mut self) -> Option<notify::Result<Event>> {
        self.event_rx.recv().await
    }

    /// Applies one kernel notification: modify-then-close coalescing,
    /// and removal on an unwatchable-path signal.
    pub fn handle_event(&mut self, result: notify::Result<Event>) {
        let event = match result {
            Ok(event) => event,
            Err(err) => {
                if is_fatal(&err) {
                    tracing::error!(error = %err, "fatal error reading file modification events");
                    self.entries.clear();
                    self.watcher = None;
                } else {
                    tracing::warn!(error = %err, "transient error reading file modification events");
                }
                return;
            }
        };

        for path in &event.paths {
            if is_unwatchable_signal(&event.kind) {
                tracing::warn!(path = %path.display(), kind = ?event.kind, "watch target no longer watchable");
                self.delete(path);
                continue;
            }

            let Some(entry) = self.entries.get_mut(path) else {
                continue;
            };

            if matches!(event.kind, EventKind::Modify(_)) {
                entry.modified = true;
            }

            if entry.modified && is_close_write(&event.kind) {
                (entry.callback)();
                entry.modified = false;
            }
        }
    }
}

impl Default for FileModificationWatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn create_watcher(
    tx: mpsc::UnboundedSender<notify::Result<Event>>,
) -> notify::Result<RecommendedWatcher> {
    notify::recommended_watcher(move |res: notify::Result<Event>| {
        let _ = tx.send(res);
    })
}

/// NOTE: stands in for the kernel mask `{MOVE_SELF, DELETE_SELF, IGNORED,
/// Q_OVERFLOW, UNMOUNT}` — any of these mean the path is no longer
/// watchable and the entry must be dropped without firing its callback.
fn is_unwatchable_signal(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Remove(_))
}

fn is_close_write(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Access(AccessKind::Close(AccessMode::Write)))
}

/// Distinguishes a fatal read (tear down the whole subsystem) from a
/// transient one (warn and keep going), the same distinction an
/// `errno == EINVAL || errno == EINTR` check would make on a raw fd.
fn is_fatal(err: &notify::Error) -> bool {
    matches!(
        &err.kind,
        notify::ErrorKind::Io(io_err)
            if matches!(
                io_err.kind(),
                std::io::ErrorKind::InvalidInput | std::io::ErrorKind::Interrupted
            )
    )
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
