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

//! # FedSQL - Procedural SQL plan execution
//!
//! FedSQL executes compiled virtual stored procedures inside a federated
//! SQL engine. A procedure arrives as a program of instructions; the
//! `ProcedurePlan` interprets it over a variable scope chain, named
//! cursors, and connection-scoped temporary tables, pulling rows from
//! subordinate relational plans through narrow engine boundaries.
//!
//! ## Key Features
//!
//! - **Resumable execution** - Any subordinate fetch may suspend with
//!   `Step::Pending`; a retry re-enters at the exact suspended instruction
//! - **Structured control flow** - Cursor-driven loops, WHILE loops,
//!   CONTINUE, and nested program scopes
//! - **Dynamic SQL** - Runtime-built statements compiled through a
//!   parse/resolve/rewrite/optimize pipeline, with declared-column
//!   validation and a recursion guard
//! - **Scoped resources** - Cursors and temp tables release with the scope
//!   frame that created them
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use fedsql::exec::{
//!     PassthroughPipeline, SessionContext, SessionTempStore, StaticDataManager, SystemMetadata,
//! };
//! use fedsql::procedure::{
//!     AssignmentInstruction, AssignmentSource, BufferConfig, Expression, Instruction, Program,
//!     ProcedurePlan, WriteTarget,
//! };
//! use fedsql::DataType;
//!
//! let program = Program::builder()
//!     .add(Instruction::Assignment(AssignmentInstruction {
//!         variable: "greeting".to_string(),
//!         source: AssignmentSource::Expression(Expression::text("hello")),
//!         target: WriteTarget::Declare { data_type: DataType::Text },
//!     }))
//!     .build();
//!
//! let mut plan = ProcedurePlan::new("demo.hello", program);
//! plan.initialize(
//!     Arc::new(StaticDataManager::new()),
//!     Arc::new(PassthroughPipeline::new()),
//!     Arc::new(SystemMetadata::new()),
//!     Arc::new(SessionTempStore::new()),
//!     BufferConfig::default(),
//!     SessionContext::new(1),
//! )
//! .unwrap();
//! plan.open().unwrap();
//! let batch = plan.next_batch().unwrap().expect_ready("ready");
//! assert!(batch.is_terminal());
//! ```
//!
//! ## Modules
//!
//! - [`core`] - Core types ([`Step`], [`Value`], [`Row`], [`Batch`], [`Error`])
//! - [`exec`] - Engine boundaries (tuple sources, data manager, compile
//!   pipeline, metadata, temp tables)
//! - [`procedure`] - The interpreter ([`procedure::ProcedurePlan`],
//!   programs, instructions, scopes, cursors)

pub mod core;
pub mod exec;
pub mod procedure;

// Re-export main types for convenience
pub use core::{Batch, Column, DataType, Error, PollResult, Result, Row, Step, Value};

// Re-export engine boundaries
pub use exec::{
    CompilePipeline, DataManager, MetadataLookup, RelationalPlan, SessionContext, TempTableStore,
    TupleSource,
};

// Re-export interpreter types
pub use procedure::{
    BufferConfig, Expression, Instruction, ParamSpec, ProcedurePlan, Program, ProgramBuilder,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit the crate was built from, when available
pub fn git_commit() -> Option<&'static str> {
    option_env!("FEDSQL_GIT_COMMIT")
}
