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

//! Error types for FedSQL
//!
//! This module defines all error types used throughout the procedural
//! execution engine. Errors fall into three families: processing errors
//! (semantic problems reportable to an end user), user-raised errors
//! (produced deliberately by RAISE ERROR), and infrastructure errors
//! (failures in subordinate services, always fatal for the invocation).

use thiserror::Error;

/// Result type alias for FedSQL operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for procedural plan execution
///
/// This enum covers all error cases including both sentinel errors
/// and structured errors with context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Lifecycle errors
    // =========================================================================
    /// The plan has not been opened yet, or has been closed
    #[error("procedure plan is not open")]
    PlanNotOpen,

    /// The plan is already open and cannot be re-initialized
    #[error("procedure plan is already open")]
    PlanAlreadyOpen,

    // =========================================================================
    // Variable and parameter errors
    // =========================================================================
    /// Variable not declared in any visible scope
    #[error("variable '{0}' not found")]
    VariableNotFound(String),

    /// A non-nullable parameter evaluated to NULL
    #[error("parameter '{0}' cannot be null")]
    NullParameter(String),

    // =========================================================================
    // Expression errors
    // =========================================================================
    /// Expression evaluation failed with message
    #[error("expression evaluation failed: {message}")]
    ExpressionEvaluation { message: String },

    /// Cannot compare NULL with non-NULL value
    #[error("cannot compare NULL with non-NULL value")]
    NullComparison,

    /// Cannot compare incompatible types
    #[error("cannot compare incompatible types")]
    IncomparableTypes,

    /// Division by zero
    #[error("division by zero")]
    DivisionByZero,

    /// Type conversion error
    #[error("type conversion error: cannot convert {from} to {to}")]
    TypeConversion { from: String, to: String },

    /// Invalid type name in a declaration
    #[error("invalid column type")]
    InvalidColumnType,

    // =========================================================================
    // Cardinality errors
    // =========================================================================
    /// A scalar query produced more than one row
    #[error("scalar query '{sql}' returned more than one row")]
    ScalarQueryMultipleRows { sql: String },

    // =========================================================================
    // Cursor errors
    // =========================================================================
    /// Cursor not found under the given result-set name
    #[error("cursor '{0}' not found")]
    CursorNotFound(String),

    /// Column not found in a cursor's row shape
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    // =========================================================================
    // Dynamic SQL errors
    // =========================================================================
    /// The dynamic SQL string expression evaluated to NULL
    #[error("dynamic SQL string evaluated to NULL")]
    NullDynamicSql,

    /// Parse stage failed
    #[error("parse error in '{sql}': {message}")]
    ParseFailed { sql: String, message: String },

    /// Resolve stage failed
    #[error("cannot resolve '{sql}': {message}")]
    ResolveFailed { sql: String, message: String },

    /// Rewrite stage failed
    #[error("rewrite failed for '{sql}': {message}")]
    RewriteFailed { sql: String, message: String },

    /// Optimize stage failed
    #[error("optimization failed for '{sql}': {message}")]
    OptimizeFailed { sql: String, message: String },

    /// Dynamic SQL projected a different number of columns than declared
    #[error("dynamic SQL column count mismatch, expected {expected}, got {got}")]
    DynamicColumnCount { expected: usize, got: usize },

    /// Dynamic SQL projected a column that cannot convert to its declared type
    #[error("dynamic SQL column '{column}' of type {from} cannot be implicitly converted to declared type {to}")]
    DynamicColumnType {
        column: String,
        from: String,
        to: String,
    },

    /// Dynamic SQL recursion guard tripped
    #[error("dynamic SQL recursion limit {limit} exceeded in procedure '{identity}'")]
    RecursionLimit { identity: String, limit: usize },

    // =========================================================================
    // User-raised errors
    // =========================================================================
    /// Raised deliberately by a RAISE ERROR instruction
    #[error("{0}")]
    UserRaised(String),

    // =========================================================================
    // Infrastructure errors
    // =========================================================================
    /// Failure in a subordinate row source
    #[error("source error: {message}")]
    Source { message: String },

    /// Failure in metadata access
    #[error("metadata error: {message}")]
    Metadata { message: String },

    /// Temp table missing from the session store
    #[error("temp table '{0}' not found")]
    TempTableNotFound(String),

    /// IO error (wrapped)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error for unexpected conditions
    #[error("{message}")]
    Internal { message: String },
}

impl Error {
    /// Create a new ExpressionEvaluation error
    pub fn expression(message: impl Into<String>) -> Self {
        Error::ExpressionEvaluation {
            message: message.into(),
        }
    }

    /// Create a new TypeConversion error
    pub fn type_conversion(from: impl Into<String>, to: impl Into<String>) -> Self {
        Error::TypeConversion {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a new ParseFailed error
    pub fn parse_failed(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ParseFailed {
            sql: sql.into(),
            message: message.into(),
        }
    }

    /// Create a new ResolveFailed error
    pub fn resolve_failed(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ResolveFailed {
            sql: sql.into(),
            message: message.into(),
        }
    }

    /// Create a new RewriteFailed error
    pub fn rewrite_failed(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Error::RewriteFailed {
            sql: sql.into(),
            message: message.into(),
        }
    }

    /// Create a new OptimizeFailed error
    pub fn optimize_failed(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Error::OptimizeFailed {
            sql: sql.into(),
            message: message.into(),
        }
    }

    /// Create a new DynamicColumnType error
    pub fn dynamic_column_type(
        column: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Error::DynamicColumnType {
            column: column.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a new ScalarQueryMultipleRows error
    pub fn scalar_query_multiple_rows(sql: impl Into<String>) -> Self {
        Error::ScalarQueryMultipleRows { sql: sql.into() }
    }

    /// Create a new Source error
    pub fn source(message: impl Into<String>) -> Self {
        Error::Source {
            message: message.into(),
        }
    }

    /// Create a new Metadata error
    pub fn metadata(message: impl Into<String>) -> Self {
        Error::Metadata {
            message: message.into(),
        }
    }

    /// Create a new Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Check if this error was raised deliberately by RAISE ERROR
    pub fn is_user_raised(&self) -> bool {
        matches!(self, Error::UserRaised(_))
    }

    /// Check if this is an infrastructure failure (not the caller's fault)
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Error::Source { .. }
                | Error::Metadata { .. }
                | Error::TempTableNotFound(_)
                | Error::Io { .. }
                | Error::Internal { .. }
        )
    }

    /// Check if this is a semantic processing error, reportable to an end user
    pub fn is_processing(&self) -> bool {
        !self.is_user_raised() && !self.is_infrastructure()
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
        }
    }
}
