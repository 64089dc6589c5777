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

//! Output batches
//!
//! A batch is a bounded group of output rows plus a terminal flag that is
//! set only when the producing source is exhausted. The row offset records
//! the index of the batch's first row within the whole result, for callers
//! that page.

use super::row::Row;

/// A bounded group of output rows
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    rows: Vec<Row>,
    row_offset: usize,
    terminal: bool,
}

impl Batch {
    /// Create a batch
    pub fn new(rows: Vec<Row>, row_offset: usize, terminal: bool) -> Self {
        Batch {
            rows,
            row_offset,
            terminal,
        }
    }

    /// Create an empty terminal batch
    pub fn empty_terminal(row_offset: usize) -> Self {
        Batch::new(Vec::new(), row_offset, true)
    }

    /// The rows in this batch
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows in this batch
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the batch holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first row within the whole result
    pub fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// Returns true if no more rows follow this batch
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Consume the batch, yielding its rows
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}
