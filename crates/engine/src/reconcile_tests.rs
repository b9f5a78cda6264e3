// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rusqlite::Connection;
use slicectl_adapters::effects::fake::RecordedCall;
use slicectl_adapters::FakeEffects;
use slicectl_core::{DatapathId, MacAddr, Port, SliceNumber, Vid};
use std::path::Path;

fn seed(path: &Path) -> Connection {
    let conn = Connection::open(path).expect("open sqlite file");
    conn.execute_batch(
        "CREATE TABLE slices (number INTEGER, id TEXT);
         CREATE TABLE bindings (type INTEGER, datapath_id INTEGER, port INTEGER,
                                 vid INTEGER, mac INTEGER, id TEXT, slice_number INTEGER);",
    )
    .expect("create schema");
    conn
}

#[test]
fn basic_port_binding_via_reconcile() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("slice.db");
    let conn = seed(&path);
    conn.execute("INSERT INTO slices (number, id) VALUES (16, 'red')", ())
        .expect("insert slice");
    conn.execute(
        "INSERT INTO bindings (type, datapath_id, port, vid, mac, id, slice_number)
         VALUES (1, 1, 2, 100, 0, 'b', 16)",
        (),
    )
    .expect("insert binding");
    drop(conn);

    let mut reconciler = Reconciler::new(DefinitionStore::new(&path));
    let mut table = SliceTable::new();
    let effects = FakeEffects::new();
    let outcome = reconciler
        .run(&mut table, &effects, Instant::now())
        .expect("reconcile");
    assert!(outcome.ran);

    let binding = table
        .get_port_binding(DatapathId::new(1), Port::new(2), Vid::new(100))
        .expect("port binding loaded");
    assert_eq!(binding.slice_number, SliceNumber::new(16));
    assert_eq!(
        table.get_port_vid(DatapathId::new(1), Port::new(2), SliceNumber::new(16)),
        Some(Vid::new(100))
    );
}

#[test]
fn unchanged_file_is_a_no_op() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("slice.db");
    let conn = seed(&path);
    conn.execute("INSERT INTO slices (number, id) VALUES (1, 'a')", ())
        .expect("insert slice");
    drop(conn);

    let mut reconciler = Reconciler::new(DefinitionStore::new(&path));
    let mut table = SliceTable::new();
    let effects = FakeEffects::new();
    let now = Instant::now();

    let first = reconciler.run(&mut table, &effects, now).expect("first pass");
    assert!(first.ran);
    let second = reconciler.run(&mut table, &effects, now).expect("second pass");
    assert!(!second.ran, "unchanged mtime must short-circuit");
}

#[test]
fn reconciling_twice_with_identical_content_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("slice.db");
    let conn = seed(&path);
    conn.execute("INSERT INTO slices (number, id) VALUES (1, 'a')", ())
        .expect("insert slice");
    conn.execute(
        "INSERT INTO bindings (type, datapath_id, port, vid, mac, id, slice_number)
         VALUES (1, 1, 1, 1, 0, 'b', 1)",
        (),
    )
    .expect("insert binding");
    drop(conn);

    let mut reconciler = Reconciler::new(DefinitionStore::new(&path));
    let mut table = SliceTable::new();
    let effects = FakeEffects::new();
    reconciler
        .run(&mut table, &effects, Instant::now())
        .expect("first pass");

    // Touch the file so the mtime guard doesn't short-circuit the second pass,
    // without changing its content.
    let conn = Connection::open(&path).expect("reopen");
    conn.execute("UPDATE slices SET id = id", ()).expect("touch");
    drop(conn);

    reconciler
        .run(&mut table, &effects, Instant::now())
        .expect("second pass");

    assert_eq!(table.slices().count(), 1);
    assert_eq!(table.port_bindings().count(), 1);
    assert!(effects.calls().is_empty(), "nothing should have been torn down");
}

#[test]
fn cascade_on_mac_deletion() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("slice.db");
    let conn = seed(&path);
    conn.execute("INSERT INTO slices (number, id) VALUES (0x11, 'blue')", ())
        .expect("insert slice");
    let mac_packed: i64 = 0x00aa_bbcc_ddee_ffi64 & 0xffff_ffff_ffff;
    conn.execute(
        "INSERT INTO bindings (type, datapath_id, port, vid, mac, id, slice_number)
         VALUES (2, 0, 0, 0, ?1, 'm', 0x11)",
        [mac_packed],
    )
    .expect("insert mac binding");
    drop(conn);

    let mut reconciler = Reconciler::new(DefinitionStore::new(&path));
    let mut table = SliceTable::new();
    let effects = FakeEffects::new();
    let t0 = Instant::now();
    reconciler.run(&mut table, &effects, t0).expect("initial load");

    let mac = MacAddr::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
    let slice_number = crate::resolver::lookup_slice(
        &mut table,
        slicectl_core::Mode::default(),
        DatapathId::new(5),
        Port::new(6),
        Vid::new(7),
        Some(mac),
        t0,
    );
    assert_eq!(slice_number, Some(SliceNumber::new(0x11)));
    assert!(table
        .get_port_binding(DatapathId::new(5), Port::new(6), Vid::new(7))
        .is_some());

    // Remove the MAC binding row from the store and reconcile again.
    let conn = Connection::open(&path).expect("reopen");
    conn.execute("DELETE FROM bindings WHERE type = 2", ())
        .expect("delete mac row");
    drop(conn);

    let t1 = t0 + std::time::Duration::from_secs(1);
    let outcome = reconciler.run(&mut table, &effects, t1).expect("cascade pass");
    assert!(outcome.ran);
    assert_eq!(outcome.mac_removed, 1);
    assert_eq!(outcome.port_removed, 1);

    assert!(table.get_mac_binding(mac).is_none());
    assert!(table
        .get_port_binding(DatapathId::new(5), Port::new(6), Vid::new(7))
        .is_none());

    let calls = effects.calls();
    assert!(calls.contains(&RecordedCall::TeardownByMatch(
        slicectl_adapters::TeardownMatch::DlSrc(mac)
    )));
    assert!(calls.contains(&RecordedCall::TeardownByMatch(
        slicectl_adapters::TeardownMatch::DlDst(mac)
    )));
    assert!(calls.contains(&RecordedCall::TeardownByPort(DatapathId::new(5), Port::new(6))));
}

#[test]
fn referential_protection_keeps_slice_and_bindings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("slice.db");
    let conn = seed(&path);
    conn.execute("INSERT INTO slices (number, id) VALUES (0x20, 's')", ())
        .expect("insert slice");
    conn.execute(
        "INSERT INTO bindings (type, datapath_id, port, vid, mac, id, slice_number)
         VALUES (4, 1, 1, 1, 123, 'pm', 0x20)",
        (),
    )
    .expect("insert port_mac binding");
    drop(conn);

    let mut reconciler = Reconciler::new(DefinitionStore::new(&path));
    let mut table = SliceTable::new();
    let effects = FakeEffects::new();
    let t0 = Instant::now();
    reconciler.run(&mut table, &effects, t0).expect("initial load");

    let conn = Connection::open(&path).expect("reopen");
    conn.execute("DELETE FROM slices WHERE number = 0x20", ())
        .expect("delete slice row");
    drop(conn);

    let t1 = t0 + std::time::Duration::from_secs(1);
    let outcome = reconciler
        .run(&mut table, &effects, t1)
        .expect("pass with referential violation");
    assert_eq!(outcome.slices_removed, 0);

    assert!(table.slice_exists(SliceNumber::new(0x20)));
    assert_eq!(table.port_mac_bindings().count(), 1);
}
