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

//! Variable scope chain
//!
//! Scopes are kept as a stack of frames rather than parent-linked nodes:
//! one frame per entered program scope, lookups walking from the innermost
//! frame outward. Each frame also tracks the temp tables and cursors
//! created while it was active, so popping the frame can clean up exactly
//! what it owns. Variable, temp table, and cursor names are
//! case-insensitive.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::error::{Error, Result};
use crate::core::value::Value;

/// Normalize an identifier for case-insensitive lookup
pub fn normalize(name: &str) -> String {
    name.to_ascii_uppercase()
}

/// One scope frame: variable bindings plus resource-creation tracking
#[derive(Debug, Clone, Default)]
pub struct ScopeFrame {
    variables: FxHashMap<String, Value>,
    temp_tables: FxHashSet<String>,
    cursors: FxHashSet<String>,
}

impl ScopeFrame {
    /// Split the frame into its variables, temp table names, and cursor names
    pub fn into_parts(self) -> (FxHashMap<String, Value>, FxHashSet<String>, FxHashSet<String>) {
        (self.variables, self.temp_tables, self.cursors)
    }

    /// Temp tables created in this frame
    pub fn temp_tables(&self) -> &FxHashSet<String> {
        &self.temp_tables
    }

    /// Cursors opened in this frame
    pub fn cursors(&self) -> &FxHashSet<String> {
        &self.cursors
    }
}

/// The full scope chain, innermost frame last
#[derive(Debug, Clone, Default)]
pub struct ScopeChain {
    frames: Vec<ScopeFrame>,
}

impl ScopeChain {
    /// Create an empty chain
    pub fn new() -> Self {
        ScopeChain::default()
    }

    /// Number of frames
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Push a fresh frame
    pub fn push_frame(&mut self) {
        self.frames.push(ScopeFrame::default());
    }

    /// Push a frame pre-seeded with variable bindings
    pub fn push_frame_with(&mut self, variables: FxHashMap<String, Value>) {
        let variables = variables
            .into_iter()
            .map(|(name, value)| (normalize(&name), value))
            .collect();
        self.frames.push(ScopeFrame {
            variables,
            temp_tables: FxHashSet::default(),
            cursors: FxHashSet::default(),
        });
    }

    /// Pop the innermost frame
    pub fn pop_frame(&mut self) -> Option<ScopeFrame> {
        self.frames.pop()
    }

    /// Drop all frames
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Look up a variable, falling through to enclosing frames
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        let key = normalize(name);
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.variables.get(&key))
    }

    /// Bind a variable in the innermost frame, shadowing any outer binding
    pub fn declare(&mut self, name: &str, value: Value) -> Result<()> {
        let key = normalize(name);
        match self.frames.last_mut() {
            Some(frame) => {
                frame.variables.insert(key, value);
                Ok(())
            }
            None => Err(Error::internal("no active scope")),
        }
    }

    /// Assign to an already-declared variable in the nearest frame holding it
    pub fn assign(&mut self, name: &str, value: Value) -> Result<()> {
        let key = normalize(name);
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.variables.get_mut(&key) {
                *slot = value;
                return Ok(());
            }
        }
        Err(Error::VariableNotFound(name.to_string()))
    }

    /// Remove a binding from the innermost frame only
    pub fn remove_local(&mut self, name: &str) {
        let key = normalize(name);
        if let Some(frame) = self.frames.last_mut() {
            frame.variables.remove(&key);
        }
    }

    /// Record a temp table as created in the innermost frame
    pub fn note_temp_table(&mut self, name: &str) -> Result<()> {
        let key = normalize(name);
        match self.frames.last_mut() {
            Some(frame) => {
                frame.temp_tables.insert(key);
                Ok(())
            }
            None => Err(Error::internal("no active scope")),
        }
    }

    /// Record a cursor as opened in the innermost frame
    pub fn note_cursor(&mut self, name: &str) -> Result<()> {
        let key = normalize(name);
        match self.frames.last_mut() {
            Some(frame) => {
                frame.cursors.insert(key);
                Ok(())
            }
            None => Err(Error::internal("no active scope")),
        }
    }

    /// Whether any remaining frame opened the named cursor
    pub fn cursor_noted_in_chain(&self, name: &str) -> bool {
        let key = normalize(name);
        self.frames.iter().any(|frame| frame.cursors.contains(&key))
    }

    /// Whether any remaining frame created the named temp table
    pub fn temp_created_in_chain(&self, name: &str) -> bool {
        let key = normalize(name);
        self.frames
            .iter()
            .any(|frame| frame.temp_tables.contains(&key))
    }

    /// Every temp table name created across all remaining frames
    pub fn all_temp_tables(&self) -> Vec<String> {
        let mut names: FxHashSet<String> = FxHashSet::default();
        for frame in &self.frames {
            names.extend(frame.temp_tables.iter().cloned());
        }
        names.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_falls_through() {
        let mut chain = ScopeChain::new();
        chain.push_frame();
        chain.declare("x", Value::integer(1)).unwrap();
        chain.push_frame();
        chain.declare("y", Value::integer(2)).unwrap();

        assert_eq!(chain.lookup("x"), Some(&Value::integer(1)));
        assert_eq!(chain.lookup("y"), Some(&Value::integer(2)));
        assert_eq!(chain.lookup("z"), None);

        chain.pop_frame();
        assert_eq!(chain.lookup("y"), None);
    }

    #[test]
    fn test_case_insensitive_names() {
        let mut chain = ScopeChain::new();
        chain.push_frame();
        chain.declare("Total", Value::integer(5)).unwrap();
        assert_eq!(chain.lookup("TOTAL"), Some(&Value::integer(5)));
        assert_eq!(chain.lookup("total"), Some(&Value::integer(5)));
        chain.assign("toTal", Value::integer(6)).unwrap();
        assert_eq!(chain.lookup("Total"), Some(&Value::integer(6)));
    }

    #[test]
    fn test_assign_targets_declaring_frame() {
        let mut chain = ScopeChain::new();
        chain.push_frame();
        chain.declare("x", Value::integer(1)).unwrap();
        chain.push_frame();
        chain.assign("x", Value::integer(9)).unwrap();
        chain.pop_frame();
        assert_eq!(chain.lookup("x"), Some(&Value::integer(9)));
    }

    #[test]
    fn test_assign_unknown_variable() {
        let mut chain = ScopeChain::new();
        chain.push_frame();
        let err = chain.assign("missing", Value::integer(1)).unwrap_err();
        assert_eq!(err, Error::VariableNotFound("missing".to_string()));
    }

    #[test]
    fn test_shadowing() {
        let mut chain = ScopeChain::new();
        chain.push_frame();
        chain.declare("x", Value::integer(1)).unwrap();
        chain.push_frame();
        chain.declare("x", Value::integer(2)).unwrap();
        assert_eq!(chain.lookup("x"), Some(&Value::integer(2)));
        chain.pop_frame();
        assert_eq!(chain.lookup("x"), Some(&Value::integer(1)));
    }

    #[test]
    fn test_temp_table_tracking() {
        let mut chain = ScopeChain::new();
        chain.push_frame();
        chain.note_temp_table("t1").unwrap();
        chain.push_frame();
        chain.note_temp_table("t1").unwrap();
        chain.note_temp_table("t2").unwrap();

        let frame = chain.pop_frame().unwrap();
        assert!(frame.temp_tables().contains("T1"));
        assert!(frame.temp_tables().contains("T2"));
        // t1 was also created in the root frame and must survive its pop
        assert!(chain.temp_created_in_chain("t1"));
        assert!(!chain.temp_created_in_chain("t2"));
    }

    #[test]
    fn test_no_active_scope() {
        let mut chain = ScopeChain::new();
        assert!(chain.declare("x", Value::integer(1)).is_err());
        assert!(chain.note_temp_table("t").is_err());
    }

    #[test]
    fn test_seeded_frame_normalizes_keys() {
        let mut chain = ScopeChain::new();
        let mut bindings = FxHashMap::default();
        bindings.insert("param".to_string(), Value::integer(7));
        chain.push_frame_with(bindings);
        assert_eq!(chain.lookup("PARAM"), Some(&Value::integer(7)));
    }
}
