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

//! Compiled relational plan handles
//!
//! The interpreter treats relational plans as opaque: a handle with an
//! identity, the SQL text it came from, the shape of its output, and an
//! updating flag. Execution happens behind the `DataManager` boundary.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::core::schema::Column;
use crate::core::types::DataType;

static NEXT_PLAN_ID: AtomicU32 = AtomicU32::new(1);

/// Opaque handle to a compiled relational plan
///
/// Cloning preserves the plan identity; two clones refer to the same
/// compiled plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationalPlan {
    id: u32,
    sql: String,
    columns: Vec<Column>,
    updating: bool,
}

impl RelationalPlan {
    /// Create a handle for a row-producing plan
    pub fn query(sql: impl Into<String>, columns: Vec<Column>) -> Self {
        RelationalPlan {
            id: NEXT_PLAN_ID.fetch_add(1, Ordering::Relaxed),
            sql: sql.into(),
            columns,
            updating: false,
        }
    }

    /// Create a handle for an updating plan; its output is a single count row
    pub fn update(sql: impl Into<String>) -> Self {
        RelationalPlan {
            id: NEXT_PLAN_ID.fetch_add(1, Ordering::Relaxed),
            sql: sql.into(),
            columns: vec![Column::new("count", DataType::Integer).not_null()],
            updating: true,
        }
    }

    /// Create a handle with an explicit shape, used by compile pipelines
    pub fn with_shape(sql: impl Into<String>, columns: Vec<Column>, updating: bool) -> Self {
        if updating {
            RelationalPlan::update(sql)
        } else {
            RelationalPlan::query(sql, columns)
        }
    }

    /// Unique plan identity
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The SQL text this plan was compiled from
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Output column shape
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns true if this plan performs writes
    pub fn is_updating(&self) -> bool {
        self.updating
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_identity() {
        let a = RelationalPlan::query("SELECT 1", vec![]);
        let b = RelationalPlan::query("SELECT 1", vec![]);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn test_update_shape() {
        let plan = RelationalPlan::update("UPDATE t SET x = 1");
        assert!(plan.is_updating());
        assert_eq!(plan.columns().len(), 1);
        assert_eq!(plan.columns()[0].data_type, DataType::Integer);
    }

    #[test]
    fn test_with_shape() {
        let cols = vec![Column::new("x", DataType::Text)];
        let plan = RelationalPlan::with_shape("SELECT x FROM t", cols.clone(), false);
        assert!(!plan.is_updating());
        assert_eq!(plan.columns(), cols.as_slice());

        let plan = RelationalPlan::with_shape("DELETE FROM t", vec![], true);
        assert!(plan.is_updating());
    }
}
