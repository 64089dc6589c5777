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

//! Data manager boundary
//!
//! Registering a relational plan with the data manager yields a pull-based
//! tuple source. The relational engine beneath this boundary is out of
//! scope; `StaticDataManager` is the in-memory implementation used for
//! embedding and tests.

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::error::Result;
use crate::core::row::Row;
use crate::core::schema::Column;

use super::plan::RelationalPlan;
use super::source::{MemoryTupleSource, PendingSource, TupleSource, UpdateCountSource};
use super::SessionContext;

/// Narrow contract for subordinate plan execution
pub trait DataManager {
    /// Register a compiled plan for execution under the given session,
    /// obtaining a pull-based row iterator
    fn register_request(
        &self,
        plan: &RelationalPlan,
        context: &SessionContext,
    ) -> Result<Box<dyn TupleSource>>;
}

/// In-memory data manager serving canned results, keyed by SQL text
///
/// Unknown queries produce an empty source with the plan's declared shape.
/// Statements flagged pending are wrapped so each poll suspends once first.
#[derive(Default)]
pub struct StaticDataManager {
    results: RwLock<FxHashMap<String, (Vec<Column>, Vec<Row>)>>,
    update_counts: RwLock<FxHashMap<String, i64>>,
    pending: RwLock<FxHashSet<String>>,
    requests: RwLock<FxHashMap<String, usize>>,
}

impl StaticDataManager {
    /// Create an empty data manager
    pub fn new() -> Self {
        StaticDataManager::default()
    }

    /// Provide the result rows for a query
    pub fn insert_result(&self, sql: impl Into<String>, columns: Vec<Column>, rows: Vec<Row>) {
        self.results.write().insert(sql.into(), (columns, rows));
    }

    /// Provide the count an updating statement reports
    pub fn set_update_count(&self, sql: impl Into<String>, count: i64) {
        self.update_counts.write().insert(sql.into(), count);
    }

    /// Make every poll of the statement's source suspend once first
    pub fn set_pending(&self, sql: impl Into<String>) {
        self.pending.write().insert(sql.into());
    }

    /// How many times the statement has been registered for execution
    pub fn request_count(&self, sql: &str) -> usize {
        self.requests.read().get(sql).copied().unwrap_or(0)
    }
}

impl DataManager for StaticDataManager {
    fn register_request(
        &self,
        plan: &RelationalPlan,
        _context: &SessionContext,
    ) -> Result<Box<dyn TupleSource>> {
        *self
            .requests
            .write()
            .entry(plan.sql().to_string())
            .or_insert(0) += 1;

        let base: Box<dyn TupleSource> = if plan.is_updating() {
            let count = self
                .update_counts
                .read()
                .get(plan.sql())
                .copied()
                .unwrap_or(0);
            Box::new(UpdateCountSource::new(count))
        } else if let Some((columns, rows)) = self.results.read().get(plan.sql()).cloned() {
            Box::new(MemoryTupleSource::new(columns, rows))
        } else {
            Box::new(MemoryTupleSource::new(plan.columns().to_vec(), Vec::new()))
        };

        if self.pending.read().contains(plan.sql()) {
            Ok(Box::new(PendingSource::new(base)))
        } else {
            Ok(base)
        }
    }
}
