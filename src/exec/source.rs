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

//! Tuple sources - the pull-based row boundary beneath the interpreter
//!
//! A tuple source yields one row at a time and may signal `Pending` when its
//! data is not yet available. The interpreter never sees the relational
//! machinery that produces rows, only this interface.

use std::collections::VecDeque;

use crate::core::error::{Error, Result};
use crate::core::row::Row;
use crate::core::schema::Column;
use crate::core::step::{PollResult, Step};
use crate::core::types::DataType;
use crate::core::value::Value;

/// Pull-based row iterator over a subordinate execution
pub trait TupleSource {
    /// The columns this source produces
    fn columns(&self) -> &[Column];

    /// Fetch the next row, `Ready(None)` at end of data
    fn next_row(&mut self) -> PollResult<Option<Row>>;

    /// Cancel the source and release its resources
    fn close(&mut self);
}

/// In-memory tuple source over pre-materialized rows
pub struct MemoryTupleSource {
    columns: Vec<Column>,
    rows: VecDeque<Row>,
    closed: bool,
}

impl MemoryTupleSource {
    /// Create a source over the given rows
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        MemoryTupleSource {
            columns,
            rows: rows.into(),
            closed: false,
        }
    }
}

impl TupleSource for MemoryTupleSource {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn next_row(&mut self) -> PollResult<Option<Row>> {
        if self.closed {
            return Err(Error::source("source is closed"));
        }
        Ok(Step::Ready(self.rows.pop_front()))
    }

    fn close(&mut self) {
        self.closed = true;
        self.rows.clear();
    }
}

/// Tuple source with no rows
pub struct EmptyTupleSource {
    columns: Vec<Column>,
}

impl EmptyTupleSource {
    /// Create an empty source with the given shape
    pub fn new(columns: Vec<Column>) -> Self {
        EmptyTupleSource { columns }
    }
}

impl TupleSource for EmptyTupleSource {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn next_row(&mut self) -> PollResult<Option<Row>> {
        Ok(Step::Ready(None))
    }

    fn close(&mut self) {}
}

/// One-row, one-column source carrying an update count
pub struct UpdateCountSource {
    columns: Vec<Column>,
    count: i64,
    consumed: bool,
}

impl UpdateCountSource {
    /// Create a source that yields the given count once
    pub fn new(count: i64) -> Self {
        UpdateCountSource {
            columns: vec![Column::new("count", DataType::Integer).not_null()],
            count,
            consumed: false,
        }
    }
}

impl TupleSource for UpdateCountSource {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn next_row(&mut self) -> PollResult<Option<Row>> {
        if self.consumed {
            return Ok(Step::Ready(None));
        }
        self.consumed = true;
        Ok(Step::Ready(Some(Row::from_values(vec![Value::integer(
            self.count,
        )]))))
    }

    fn close(&mut self) {
        self.consumed = true;
    }
}

/// Adapter that signals `Pending` once before every poll of the inner source
///
/// Models a source whose data depends on work still in flight elsewhere in
/// the engine. Used to exercise suspension paths.
pub struct PendingSource {
    inner: Box<dyn TupleSource>,
    pending_next: bool,
}

impl PendingSource {
    /// Wrap a source so every poll suspends once first
    pub fn new(inner: Box<dyn TupleSource>) -> Self {
        PendingSource {
            inner,
            pending_next: true,
        }
    }
}

impl TupleSource for PendingSource {
    fn columns(&self) -> &[Column] {
        self.inner.columns()
    }

    fn next_row(&mut self) -> PollResult<Option<Row>> {
        if self.pending_next {
            self.pending_next = false;
            return Ok(Step::Pending);
        }
        self.pending_next = true;
        self.inner.next_row()
    }

    fn close(&mut self) {
        self.inner.close();
    }
}

/// Drain every remaining row from a source, retrying through suspensions.
///
/// Convenience for callers that hold the whole result in memory anyway.
pub fn collect_rows(source: &mut dyn TupleSource, max_polls: usize) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    let mut polls = 0;
    loop {
        match source.next_row()? {
            Step::Pending => {
                polls += 1;
                if polls > max_polls {
                    return Err(Error::source("source never became ready"));
                }
            }
            Step::Ready(Some(row)) => rows.push(row),
            Step::Ready(None) => return Ok(rows),
        }
    }
}
