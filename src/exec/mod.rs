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

//! External execution boundaries
//!
//! The interpreter consumes the surrounding engine through narrow
//! contracts: tuple sources, the data manager, the dynamic-SQL compile
//! pipeline, metadata lookup, and the temp table store. Each trait ships
//! with an in-memory implementation suitable for embedding and tests.

pub mod data;
pub mod metadata;
pub mod pipeline;
pub mod plan;
pub mod source;
pub mod temp;

pub use data::{DataManager, StaticDataManager};
pub use metadata::{MetadataLookup, SystemMetadata};
pub use pipeline::{CompilePipeline, PassthroughPipeline, SqlAst};
pub use plan::RelationalPlan;
pub use source::{
    collect_rows, EmptyTupleSource, MemoryTupleSource, PendingSource, TupleSource,
    UpdateCountSource,
};
pub use temp::{SessionTempStore, TempTableStore};

/// Identity of the session an invocation runs under
///
/// Temp tables and subordinate requests are scoped by the connection id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionContext {
    /// Connection this invocation belongs to
    pub connection_id: u64,
}

impl SessionContext {
    /// Create a context for the given connection
    pub fn new(connection_id: u64) -> Self {
        SessionContext { connection_id }
    }
}
