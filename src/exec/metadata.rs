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

//! Metadata lookup boundary
//!
//! The interpreter consults metadata for element support flags and for the
//! implicit type conversion matrix used when validating dynamic SQL's
//! declared AS-columns.

use crate::core::types::DataType;

/// Narrow contract for catalog metadata access
pub trait MetadataLookup {
    /// Whether the named element allows NULL values
    fn is_nullable(&self, element: &str) -> bool;

    /// Whether the named group supports updates
    fn supports_updates(&self, group: &str) -> bool;

    /// Human-readable name of a data type, for error messages
    fn type_name(&self, data_type: DataType) -> &'static str;

    /// Whether a value of `from` converts to `to` without an explicit cast
    fn can_implicitly_convert(&self, from: DataType, to: DataType) -> bool;
}

/// Default metadata implementation with the standard conversion matrix
///
/// Implicit conversions: identity, NULL to anything, numeric widening
/// (INTEGER to FLOAT), and anything to TEXT. There is deliberately no
/// implicit TEXT to INTEGER conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMetadata;

impl SystemMetadata {
    /// Create the default metadata
    pub fn new() -> Self {
        SystemMetadata
    }
}

impl MetadataLookup for SystemMetadata {
    fn is_nullable(&self, _element: &str) -> bool {
        true
    }

    fn supports_updates(&self, _group: &str) -> bool {
        true
    }

    fn type_name(&self, data_type: DataType) -> &'static str {
        match data_type {
            DataType::Null => "NULL",
            DataType::Integer => "INTEGER",
            DataType::Float => "FLOAT",
            DataType::Text => "TEXT",
            DataType::Boolean => "BOOLEAN",
            DataType::Timestamp => "TIMESTAMP",
        }
    }

    fn can_implicitly_convert(&self, from: DataType, to: DataType) -> bool {
        if from == to || from == DataType::Null {
            return true;
        }
        matches!(
            (from, to),
            (DataType::Integer, DataType::Float) | (_, DataType::Text)
        )
    }
}
