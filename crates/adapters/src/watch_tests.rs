// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use notify::event::{ModifyKind, RemoveKind};
use std::sync::atomic::{AtomicUsize, Ordering};

fn modify_event(path: &Path) -> notify::Result<Event> {
    Ok(Event::new(EventKind::Modify(ModifyKind::Any)).add_path(path.to_path_buf()))
}

fn close_write_event(path: &Path) -> notify::Result<Event> {
    Ok(Event::new(EventKind::Access(AccessKind::Close(AccessMode::Write))).add_path(path.to_path_buf()))
}

fn remove_event(path: &Path) -> notify::Result<Event> {
    Ok(Event::new(EventKind::Remove(RemoveKind::Any)).add_path(path.to_path_buf()))
}

#[test]
fn modify_then_close_write_fires_callback_once() {
    let file = tempfile::NamedTempFile::new().expect("create temp file");
    let path = file.path().to_path_buf();

    let mut watcher = FileModificationWatcher::new();
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&count);
    assert!(watcher.add(
        path.clone(),
        Arc::new(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        })
    ));

    watcher.handle_event(modify_event(&path));
    watcher.handle_event(modify_event(&path));
    watcher.handle_event(modify_event(&path));
    watcher.handle_event(close_write_event(&path));

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn close_write_alone_does_not_fire_callback() {
    let file = tempfile::NamedTempFile::new().expect("create temp file");
    let path = file.path().to_path_buf();

    let mut watcher = FileModificationWatcher::new();
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&count);
    watcher.add(
        path.clone(),
        Arc::new(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }),
    );

    watcher.handle_event(close_write_event(&path));

    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn duplicate_path_is_rejected() {
    let file = tempfile::NamedTempFile::new().expect("create temp file");
    let path = file.path().to_path_buf();

    let mut watcher = FileModificationWatcher::new();
    assert!(watcher.add(path.clone(), Arc::new(|| {})));
    assert!(!watcher.add(path, Arc::new(|| {})));
}

#[test]
fn remove_signal_deletes_entry_without_firing_callback() {
    let file = tempfile::NamedTempFile::new().expect("create temp file");
    let path = file.path().to_path_buf();

    let mut watcher = FileModificationWatcher::new();
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&count);
    watcher.add(
        path.clone(),
        Arc::new(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }),
    );

    watcher.handle_event(remove_event(&path));

    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(!watcher.has_watches());
}

#[test]
fn delete_tears_down_watcher_when_last_entry_removed() {
    let file = tempfile::NamedTempFile::new().expect("create temp file");
    let path = file.path().to_path_buf();

    let mut watcher = FileModificationWatcher::new();
    watcher.add(path.clone(), Arc::new(|| {}));
    assert!(watcher.has_watches());

    assert!(watcher.delete(&path));
    assert!(!watcher.has_watches());
}

#[test]
fn deleting_unknown_path_returns_false() {
    let mut watcher = FileModificationWatcher::new();
    assert!(!watcher.delete(Path::new("/nonexistent/path")));
}
