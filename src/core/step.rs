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

//! Suspension signal
//!
//! A subordinate source whose data is not yet available reports `Pending`
//! instead of blocking. `Pending` is not an error: the caller retries the
//! same operation later and execution resumes where it suspended. Errors
//! travel separately through `Result`, so the full signature of a
//! suspendable operation is `PollResult<T>`.

/// Outcome of one attempt at a suspendable operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<T> {
    /// The operation completed with a value
    Ready(T),

    /// The operation cannot make progress yet; retry later
    Pending,
}

impl<T> Step<T> {
    /// Returns true if this is `Pending`
    pub fn is_pending(&self) -> bool {
        matches!(self, Step::Pending)
    }

    /// Returns true if this is `Ready`
    pub fn is_ready(&self) -> bool {
        matches!(self, Step::Ready(_))
    }

    /// Map the ready value, leaving `Pending` untouched
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Step<U> {
        match self {
            Step::Ready(value) => Step::Ready(f(value)),
            Step::Pending => Step::Pending,
        }
    }

    /// Unwrap the ready value, panicking with the message on `Pending`
    ///
    /// For tests and callers that know the operation cannot suspend.
    pub fn expect_ready(self, msg: &str) -> T {
        match self {
            Step::Ready(value) => value,
            Step::Pending => panic!("{}", msg),
        }
    }
}

/// Result of polling a suspendable operation
pub type PollResult<T> = crate::core::error::Result<Step<T>>;

/// Unwrap a `PollResult`, propagating errors with `?` and early-returning
/// `Ok(Step::Pending)` on suspension.
///
/// The analogue of `std::task::ready!` for this crate's poll signature.
#[macro_export]
macro_rules! ready {
    ($poll:expr) => {
        match $poll? {
            $crate::core::step::Step::Ready(value) => value,
            $crate::core::step::Step::Pending => {
                return Ok($crate::core::step::Step::Pending);
            }
        }
    };
}
