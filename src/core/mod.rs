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

//! Core types for FedSQL
//!
//! Fundamental types shared across the engine: errors, data types, runtime
//! values, rows, column descriptors, output batches, and the suspension
//! signal.

pub mod batch;
pub mod error;
pub mod row;
pub mod schema;
pub mod step;
pub mod types;
pub mod value;

pub use batch::Batch;
pub use error::{Error, Result};
pub use row::Row;
pub use schema::Column;
pub use step::{PollResult, Step};
pub use types::DataType;
pub use value::Value;
