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

//! Named cursors over subordinate tuple sources
//!
//! A cursor wraps a tuple source behind a one-row-at-a-time interface and
//! remembers the most recently fetched row. Advancing may suspend; the
//! retry re-advances without losing position because the underlying source
//! itself holds the position.

use crate::core::row::Row;
use crate::core::schema::Column;
use crate::core::step::{PollResult, Step};
use crate::exec::source::TupleSource;

/// A named, lazily-advanced pointer into a subordinate result
pub struct Cursor {
    name: String,
    source: Box<dyn TupleSource>,
    current: Option<Row>,
}

impl Cursor {
    /// Wrap a source as a named cursor with no current row yet
    pub fn new(name: impl Into<String>, source: Box<dyn TupleSource>) -> Self {
        Cursor {
            name: name.into(),
            source,
            current: None,
        }
    }

    /// The cursor's result-set name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The columns of the underlying source
    pub fn columns(&self) -> &[Column] {
        self.source.columns()
    }

    /// Fetch the next row into the cursor; `Ready(false)` at end of data
    pub fn advance(&mut self) -> PollResult<bool> {
        match self.source.next_row()? {
            Step::Pending => Ok(Step::Pending),
            Step::Ready(Some(row)) => {
                self.current = Some(row);
                Ok(Step::Ready(true))
            }
            Step::Ready(None) => {
                self.current = None;
                Ok(Step::Ready(false))
            }
        }
    }

    /// The most recently fetched row
    pub fn current(&self) -> Option<&Row> {
        self.current.as_ref()
    }

    /// Release the underlying source
    pub fn close(&mut self) {
        self.source.close();
        self.current = None;
    }

    /// Consume the cursor, yielding the underlying source
    pub fn into_source(self) -> Box<dyn TupleSource> {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DataType;
    use crate::core::value::Value;
    use crate::exec::source::{MemoryTupleSource, PendingSource};

    fn make_cursor(rows: Vec<i64>) -> Cursor {
        let rows = rows
            .into_iter()
            .map(|n| Row::from_values(vec![Value::integer(n)]))
            .collect();
        let source = MemoryTupleSource::new(vec![Column::new("n", DataType::Integer)], rows);
        Cursor::new("C", Box::new(source))
    }

    #[test]
    fn test_advance_and_current() {
        let mut cursor = make_cursor(vec![1, 2]);
        assert_eq!(cursor.current(), None);

        assert_eq!(cursor.advance().unwrap(), Step::Ready(true));
        assert_eq!(
            cursor.current(),
            Some(&Row::from_values(vec![Value::integer(1)]))
        );

        assert_eq!(cursor.advance().unwrap(), Step::Ready(true));
        assert_eq!(cursor.advance().unwrap(), Step::Ready(false));
        assert_eq!(cursor.current(), None);
    }

    #[test]
    fn test_advance_through_pending() {
        let inner = make_cursor(vec![5]).into_source();
        let mut cursor = Cursor::new("C", Box::new(PendingSource::new(inner)));

        assert_eq!(cursor.advance().unwrap(), Step::Pending);
        assert_eq!(cursor.current(), None);
        assert_eq!(cursor.advance().unwrap(), Step::Ready(true));
        assert_eq!(
            cursor.current(),
            Some(&Row::from_values(vec![Value::integer(5)]))
        );
    }

    #[test]
    fn test_name_and_columns() {
        let cursor = make_cursor(vec![]);
        assert_eq!(cursor.name(), "C");
        assert_eq!(cursor.columns()[0].name, "n");
    }
}
