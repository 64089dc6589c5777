// Copyright 2026 FedSQL Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Temp table store boundary
//!
//! Temporary relations are scoped to the invoking connection and named
//! case-insensitively. Drop must be idempotent: the interpreter drops by
//! name during scope cleanup and again on close without tracking whether a
//! drop already happened.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::core::error::{Error, Result};
use crate::core::row::Row;
use crate::core::schema::Column;

use super::SessionContext;

/// Narrow contract for connection-scoped temporary relations
pub trait TempTableStore {
    /// Create (or replace) a temp table with the given shape
    fn create(&self, context: &SessionContext, name: &str, columns: Vec<Column>) -> Result<()>;

    /// Drop a temp table by name; dropping a missing table is not an error
    fn drop_table(&self, context: &SessionContext, name: &str);

    /// Insert a row into a temp table
    fn insert(&self, context: &SessionContext, name: &str, row: Row) -> Result<()>;

    /// Whether a temp table exists for this connection
    fn contains(&self, context: &SessionContext, name: &str) -> bool;

    /// Names of all temp tables for this connection
    fn list(&self, context: &SessionContext) -> Vec<String>;
}

struct TempTable {
    #[allow(dead_code)]
    columns: Vec<Column>,
    rows: Vec<Row>,
}

/// In-memory temp table store shared between an invocation and its session
#[derive(Default)]
pub struct SessionTempStore {
    tables: RwLock<FxHashMap<(u64, String), TempTable>>,
}

impl SessionTempStore {
    /// Create an empty store
    pub fn new() -> Self {
        SessionTempStore::default()
    }

    /// Snapshot the rows of a temp table, if it exists
    pub fn rows(&self, context: &SessionContext, name: &str) -> Option<Vec<Row>> {
        let key = (context.connection_id, normalize_table(name));
        self.tables.read().get(&key).map(|t| t.rows.clone())
    }

    /// Number of rows in a temp table, if it exists
    pub fn row_count(&self, context: &SessionContext, name: &str) -> Option<usize> {
        let key = (context.connection_id, normalize_table(name));
        self.tables.read().get(&key).map(|t| t.rows.len())
    }
}

fn normalize_table(name: &str) -> String {
    name.to_ascii_uppercase()
}

impl TempTableStore for SessionTempStore {
    fn create(&self, context: &SessionContext, name: &str, columns: Vec<Column>) -> Result<()> {
        let key = (context.connection_id, normalize_table(name));
        self.tables.write().insert(
            key,
            TempTable {
                columns,
                rows: Vec::new(),
            },
        );
        Ok(())
    }

    fn drop_table(&self, context: &SessionContext, name: &str) {
        let key = (context.connection_id, normalize_table(name));
        self.tables.write().remove(&key);
    }

    fn insert(&self, context: &SessionContext, name: &str, row: Row) -> Result<()> {
        let key = (context.connection_id, normalize_table(name));
        match self.tables.write().get_mut(&key) {
            Some(table) => {
                table.rows.push(row);
                Ok(())
            }
            None => Err(Error::TempTableNotFound(name.to_string())),
        }
    }

    fn contains(&self, context: &SessionContext, name: &str) -> bool {
        let key = (context.connection_id, normalize_table(name));
        self.tables.read().contains_key(&key)
    }

    fn list(&self, context: &SessionContext) -> Vec<String> {
        self.tables
            .read()
            .keys()
            .filter(|(conn, _)| *conn == context.connection_id)
            .map(|(_, name)| name.clone())
            .collect()
    }
}
