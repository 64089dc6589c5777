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

//! Procedural SQL execution
//!
//! Compiled procedures are programs of instructions interpreted by a
//! `ProcedurePlan` over a variable scope chain, named cursors, and
//! connection-scoped temp tables. Execution is resumable: any fetch from a
//! subordinate source may suspend, and the plan re-enters at the exact
//! suspended instruction on retry.

pub mod cursor;
pub mod expression;
pub mod instruction;
pub mod plan;
pub mod program;
pub mod scope;

pub use cursor::Cursor;
pub use expression::{BinaryOp, EvalContext, Expression, UnaryOp};
pub use instruction::{
    AssignmentInstruction, AssignmentSource, CreateCursorInstruction, ExecDynamicSqlInstruction,
    ExecSqlInstruction, Flow, Instruction, LoopInstruction, RaiseErrorInstruction,
    WhileInstruction, WriteTarget,
};
pub use plan::{BufferConfig, ParamSpec, ProcedurePlan};
pub use program::{Program, ProgramBuilder};
pub use scope::{normalize, ScopeChain, ScopeFrame};
