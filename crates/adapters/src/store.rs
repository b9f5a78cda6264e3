// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads the external definition store: a local SQLite file with exactly
//! two tables, `slices(number, id)` and
//! `bindings(type, datapath_id, port, vid, mac, id, slice_number)`.
//!
//! One connection is opened and closed per reconciliation pass — this
//! type never holds a long-lived handle.

use crate::error::StoreError;
use rusqlite::Connection;
use slicectl_core::{BindingKind, DatapathId, MacAddr, Port, SliceNumber, TruncatedString, Vid};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const BINDING_TYPE_PORT: i64 = 1;
const BINDING_TYPE_MAC: i64 = 2;
const BINDING_TYPE_PORT_MAC: i64 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceRow {
    pub number: SliceNumber,
    pub id: TruncatedString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingRow {
    pub kind: BindingKind,
    pub id: TruncatedString,
    pub slice_number: SliceNumber,
}

pub struct DefinitionStore {
    path: PathBuf,
}

impl DefinitionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Modification time of the definition file, for the reconciliation
    /// loop's mtime guard.
    pub fn mtime(&self) -> Result<SystemTime, StoreError> {
        std::fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .map_err(|source| StoreError::Stat {
                path: self.path.clone(),
                source,
            })
    }

    pub fn load_slices(&self) -> Result<Vec<SliceRow>, StoreError> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare("SELECT number, id FROM slices")
            .map_err(|source| StoreError::Query {
                table: "slices",
                source,
            })?;
        let rows = stmt
            .query_map([], |row| {
                let number: i64 = row.get(0)?;
                let id: String = row.get(1)?;
                Ok((number, id))
            })
            .map_err(|source| StoreError::Query {
                table: "slices",
                source,
            })?;

        let mut out = Vec::new();
        for row in rows {
            let (number, id) = row.map_err(|source| StoreError::Query {
                table: "slices",
                source,
            })?;
            out.push(SliceRow {
                number: SliceNumber::new(number as u16),
                id: TruncatedString::new(id),
            });
        }
        Ok(out)
    }

    pub fn load_bindings(&self) -> Result<Vec<BindingRow>, StoreError> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare("SELECT type, datapath_id, port, vid, mac, id, slice_number FROM bindings")
            .map_err(|source| StoreError::Query {
                table: "bindings",
                source,
            })?;
        let rows = stmt
            .query_map([], |row| {
                let tag: i64 = row.get(0)?;
                let datapath_id: i64 = row.get(1)?;
                let port: i64 = row.get(2)?;
                let vid: i64 = row.get(3)?;
                let mac: i64 = row.get(4)?;
                let id: String = row.get(5)?;
                let slice_number: i64 = row.get(6)?;
                Ok((tag, datapath_id, port, vid, mac, id, slice_number))
            })
            .map_err(|source| StoreError::Query {
                table: "bindings",
                source,
            })?;

        let mut out = Vec::new();
        for row in rows {
            let (tag, datapath_id, port, vid, mac, id, slice_number) =
                row.map_err(|source| StoreError::Query {
                    table: "bindings",
                    source,
                })?;

            let datapath_id = DatapathId::new(datapath_id as u64);
            let port = Port::new(port as u16);
            let vid = Vid::new(vid as u16);
            let mac = MacAddr::from_u48(mac as u64);
            let slice_number = SliceNumber::new(slice_number as u16);

            let kind = match tag {
                BINDING_TYPE_PORT => BindingKind::Port {
                    datapath_id,
                    port,
                    vid,
                },
                BINDING_TYPE_MAC => BindingKind::Mac { mac },
                BINDING_TYPE_PORT_MAC => BindingKind::PortMac {
                    datapath_id,
                    port,
                    vid,
                    mac,
                },
                other => {
                    return Err(StoreError::UnknownBindingType {
                        table: "bindings",
                        tag: other,
                    })
                }
            };

            out.push(BindingRow {
                kind,
                id: TruncatedString::new(id),
                slice_number,
            });
        }
        Ok(out)
    }

    fn open(&self) -> Result<Connection, StoreError> {
        Connection::open(&self.path).map_err(|source| StoreError::Open {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
