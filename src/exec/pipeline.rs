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

//! Dynamic SQL compile pipeline boundary
//!
//! Dynamic SQL text is compiled in four stages: parse, resolve, rewrite,
//! optimize. Each stage may fail with a processing error carrying the
//! offending SQL text. The engine behind the stages is out of scope;
//! `PassthroughPipeline` is the in-memory implementation for embedding and
//! tests.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::core::error::{Error, Result};
use crate::core::schema::Column;
use crate::core::value::Value;

use super::metadata::MetadataLookup;
use super::plan::RelationalPlan;

/// Intermediate statement representation flowing between pipeline stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlAst {
    /// The original SQL text
    pub sql: String,

    /// Projected columns, filled in during resolution
    pub columns: Vec<Column>,

    /// Whether the statement performs writes, filled in during resolution
    pub updating: bool,
}

/// Parse/resolve/rewrite/optimize services for dynamic SQL
pub trait CompilePipeline {
    /// Parse SQL text into an AST
    fn parse(&self, sql: &str) -> Result<SqlAst>;

    /// Resolve the AST against metadata, filling in its projected shape
    fn resolve(&self, ast: SqlAst, metadata: &dyn MetadataLookup) -> Result<SqlAst>;

    /// Rewrite the AST with contextual variable bindings
    fn rewrite(&self, ast: SqlAst, bindings: &FxHashMap<String, Value>) -> Result<SqlAst>;

    /// Optimize the AST into an executable plan
    fn optimize(&self, ast: SqlAst) -> Result<RelationalPlan>;

    /// Run all four stages in order
    fn compile(
        &self,
        sql: &str,
        metadata: &dyn MetadataLookup,
        bindings: &FxHashMap<String, Value>,
    ) -> Result<RelationalPlan> {
        let ast = self.parse(sql)?;
        let ast = self.resolve(ast, metadata)?;
        let ast = self.rewrite(ast, bindings)?;
        self.optimize(ast)
    }
}

/// In-memory pipeline resolving statements against registered shapes
///
/// The rewrite stage records the bindings it was handed, so embedders and
/// tests can observe what a USING clause supplied.
#[derive(Default)]
pub struct PassthroughPipeline {
    shapes: RwLock<FxHashMap<String, (Vec<Column>, bool)>>,
    last_bindings: RwLock<FxHashMap<String, Value>>,
}

impl PassthroughPipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        PassthroughPipeline::default()
    }

    /// Register the shape a statement resolves to
    pub fn register_shape(&self, sql: impl Into<String>, columns: Vec<Column>, updating: bool) {
        self.shapes.write().insert(sql.into(), (columns, updating));
    }

    /// The bindings handed to the most recent rewrite
    pub fn last_bindings(&self) -> FxHashMap<String, Value> {
        self.last_bindings.read().clone()
    }
}

impl CompilePipeline for PassthroughPipeline {
    fn parse(&self, sql: &str) -> Result<SqlAst> {
        if sql.trim().is_empty() {
            return Err(Error::parse_failed(sql, "empty statement"));
        }
        Ok(SqlAst {
            sql: sql.to_string(),
            columns: Vec::new(),
            updating: false,
        })
    }

    fn resolve(&self, mut ast: SqlAst, _metadata: &dyn MetadataLookup) -> Result<SqlAst> {
        match self.shapes.read().get(&ast.sql) {
            Some((columns, updating)) => {
                ast.columns = columns.clone();
                ast.updating = *updating;
                Ok(ast)
            }
            None => Err(Error::resolve_failed(&ast.sql, "statement does not resolve")),
        }
    }

    fn rewrite(&self, ast: SqlAst, bindings: &FxHashMap<String, Value>) -> Result<SqlAst> {
        *self.last_bindings.write() = bindings.clone();
        Ok(ast)
    }

    fn optimize(&self, ast: SqlAst) -> Result<RelationalPlan> {
        Ok(RelationalPlan::with_shape(ast.sql, ast.columns, ast.updating))
    }
}
