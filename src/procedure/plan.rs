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

//! Procedure plan interpreter
//!
//! A `ProcedurePlan` drives a program stack over a scope chain: one scope
//! frame per stacked program, always. Repeated instructions re-evaluate
//! their condition each time their body program pops; a finished program
//! pops together with its frame, releasing the cursors and temp tables the
//! frame created. Any subordinate fetch may suspend with `Step::Pending`;
//! the retry re-enters at the exact same instruction because no state is
//! mutated before every suspendable sub-step has returned ready.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::batch::Batch;
use crate::core::error::{Error, Result};
use crate::core::row::Row;
use crate::core::step::{PollResult, Step};
use crate::core::value::Value;
use crate::exec::data::DataManager;
use crate::exec::metadata::MetadataLookup;
use crate::exec::pipeline::CompilePipeline;
use crate::exec::plan::RelationalPlan;
use crate::exec::source::{EmptyTupleSource, TupleSource, UpdateCountSource};
use crate::exec::temp::TempTableStore;
use crate::exec::SessionContext;
use crate::ready;

use super::cursor::Cursor;
use super::expression::{EvalContext, Expression};
use super::instruction::Flow;
use super::program::Program;
use super::scope::ScopeChain;

// ============================================================================
// Configuration
// ============================================================================

/// Tuning knobs for an invocation
#[derive(Debug, Clone)]
pub struct BufferConfig {
    /// Maximum rows per output batch
    pub batch_size: usize,

    /// Maximum times one procedure identity may appear on the dynamic-SQL
    /// call stack
    pub max_recursion_depth: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        BufferConfig {
            batch_size: 256,
            max_recursion_depth: 10,
        }
    }
}

/// One declared input parameter of a procedure
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub expression: Expression,
    pub nullable: bool,
}

impl ParamSpec {
    /// Declare a nullable parameter bound to the given argument expression
    pub fn new(name: impl Into<String>, expression: Expression) -> Self {
        ParamSpec {
            name: name.into(),
            expression,
            nullable: true,
        }
    }

    /// Mark the parameter as rejecting NULL arguments
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

// ============================================================================
// Interpreter environment
// ============================================================================

enum SubqueryState {
    Running {
        source: Box<dyn TupleSource>,
        first: Option<Value>,
    },
    Done(Value),
}

/// Mutable interpreter state plus the engine services behind it
pub(crate) struct ProcedureEnv {
    pub(crate) data_manager: Arc<dyn DataManager>,
    pub(crate) pipeline: Arc<dyn CompilePipeline>,
    pub(crate) metadata: Arc<dyn MetadataLookup>,
    pub(crate) temp_store: Arc<dyn TempTableStore>,
    pub(crate) config: BufferConfig,
    pub(crate) context: SessionContext,
    pub(crate) scopes: ScopeChain,
    pub(crate) cursors: FxHashMap<String, Cursor>,
    pub(crate) call_stack: Vec<String>,
    subqueries: FxHashMap<u32, SubqueryState>,
    pub(crate) in_flight: Option<Box<dyn TupleSource>>,
    pub(crate) last_result: Option<String>,
    pub(crate) update_count: i64,
}

impl ProcedureEnv {
    fn new(
        data_manager: Arc<dyn DataManager>,
        pipeline: Arc<dyn CompilePipeline>,
        metadata: Arc<dyn MetadataLookup>,
        temp_store: Arc<dyn TempTableStore>,
        config: BufferConfig,
        context: SessionContext,
    ) -> Self {
        ProcedureEnv {
            data_manager,
            pipeline,
            metadata,
            temp_store,
            config,
            context,
            scopes: ScopeChain::new(),
            cursors: FxHashMap::default(),
            call_stack: Vec::new(),
            subqueries: FxHashMap::default(),
            in_flight: None,
            last_result: None,
            update_count: 0,
        }
    }

    /// Drop cached subquery values, closing any still-running source
    fn clear_subqueries(&mut self) {
        for (_, state) in self.subqueries.drain() {
            if let SubqueryState::Running { mut source, .. } = state {
                source.close();
            }
        }
    }

    /// Pop the innermost scope frame and release the resources it created.
    ///
    /// Cursors opened in the frame are closed, except the one designated as
    /// the invocation's output. Temp tables drop only when no remaining
    /// frame also created them.
    fn unwind_frame(&mut self) {
        if let Some(frame) = self.scopes.pop_frame() {
            let (_, temp_tables, cursors) = frame.into_parts();
            for name in cursors {
                if self.last_result.as_deref() == Some(name.as_str()) {
                    continue;
                }
                if let Some(mut cursor) = self.cursors.remove(&name) {
                    cursor.close();
                }
            }
            for table in temp_tables {
                if !self.scopes.temp_created_in_chain(&table) {
                    self.temp_store.drop_table(&self.context, &table);
                }
            }
        }
    }
}

impl EvalContext for ProcedureEnv {
    fn variable(&self, name: &str) -> Option<Value> {
        self.scopes.lookup(name).cloned()
    }

    fn scalar_subquery(&mut self, plan: &RelationalPlan) -> PollResult<Value> {
        let id = plan.id();
        if let Some(SubqueryState::Done(value)) = self.subqueries.get(&id) {
            return Ok(Step::Ready(value.clone()));
        }
        if !self.subqueries.contains_key(&id) {
            let source = self.data_manager.register_request(plan, &self.context)?;
            self.subqueries
                .insert(id, SubqueryState::Running { source, first: None });
        }

        enum Outcome {
            Pending,
            Value(Value),
            TooMany,
        }

        let outcome = loop {
            let (source, first) = match self.subqueries.get_mut(&id) {
                Some(SubqueryState::Running { source, first }) => (source, first),
                _ => return Err(Error::internal("scalar subquery state lost")),
            };
            match source.next_row()? {
                Step::Pending => break Outcome::Pending,
                Step::Ready(Some(row)) => {
                    if first.is_some() {
                        break Outcome::TooMany;
                    }
                    let value = match row.get(0) {
                        Some(value) => value.clone(),
                        None => Value::null_unknown(),
                    };
                    *first = Some(value);
                }
                Step::Ready(None) => {
                    let value = match first.take() {
                        Some(value) => value,
                        None => match plan.columns().first() {
                            Some(column) => Value::null(column.data_type),
                            None => Value::null_unknown(),
                        },
                    };
                    break Outcome::Value(value);
                }
            }
        };

        match outcome {
            Outcome::Pending => Ok(Step::Pending),
            Outcome::Value(value) => {
                self.subqueries.insert(id, SubqueryState::Done(value.clone()));
                Ok(Step::Ready(value))
            }
            Outcome::TooMany => {
                if let Some(SubqueryState::Running { mut source, .. }) =
                    self.subqueries.remove(&id)
                {
                    source.close();
                }
                Err(Error::scalar_query_multiple_rows(plan.sql()))
            }
        }
    }
}

// ============================================================================
// Procedure plan
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlanState {
    Created,
    Initialized,
    Open,
    Closed,
}

/// What the interpreter loop decided to do with the top of the stack
enum Action {
    Pop,
    Advance,
    Push(Program, FxHashMap<String, Value>),
    Repeat(Program),
    Unwind,
}

/// Resumable interpreter over a compiled procedural program
pub struct ProcedurePlan {
    identity: String,
    program: Program,
    params: Vec<ParamSpec>,
    updating: bool,
    state: PlanState,
    stack: Vec<Program>,
    env: Option<ProcedureEnv>,
    output: Option<Box<dyn TupleSource>>,
    buffer: Vec<Row>,
    rows_delivered: usize,
    done: bool,
}

impl ProcedurePlan {
    /// Create a plan over a compiled program
    pub fn new(identity: impl Into<String>, program: Program) -> Self {
        ProcedurePlan {
            identity: identity.into(),
            program,
            params: Vec::new(),
            updating: false,
            state: PlanState::Created,
            stack: Vec::new(),
            env: None,
            output: None,
            buffer: Vec::new(),
            rows_delivered: 0,
            done: false,
        }
    }

    /// Declare an input parameter
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Mark the procedure as updating; its output is a single update count
    pub fn with_updating(mut self) -> Self {
        self.updating = true;
        self
    }

    /// The procedure's call identity
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Returns true if the invocation's output is an update count
    pub fn is_updating(&self) -> bool {
        self.updating
    }

    /// Bind the plan to its engine services
    pub fn initialize(
        &mut self,
        data_manager: Arc<dyn DataManager>,
        pipeline: Arc<dyn CompilePipeline>,
        metadata: Arc<dyn MetadataLookup>,
        temp_store: Arc<dyn TempTableStore>,
        config: BufferConfig,
        context: SessionContext,
    ) -> Result<()> {
        if self.state == PlanState::Open {
            return Err(Error::PlanAlreadyOpen);
        }
        self.env = Some(ProcedureEnv::new(
            data_manager,
            pipeline,
            metadata,
            temp_store,
            config,
            context,
        ));
        self.state = PlanState::Initialized;
        Ok(())
    }

    /// Evaluate parameters into the root scope and arm the program stack.
    ///
    /// Parameter evaluation may suspend; the retry skips parameters that
    /// already bound and resumes at the first unbound one.
    pub fn open(&mut self) -> PollResult<()> {
        match self.state {
            PlanState::Created => return Err(Error::internal("plan was not initialized")),
            PlanState::Closed => return Err(Error::PlanNotOpen),
            PlanState::Open => return Err(Error::PlanAlreadyOpen),
            PlanState::Initialized => {}
        }
        log::debug!("opening procedure {}", self.identity);

        let env = match self.env.as_mut() {
            Some(env) => env,
            None => return Err(Error::internal("plan has no environment")),
        };
        if env.scopes.depth() == 0 {
            env.scopes.push_frame();
        }
        for param in &self.params {
            if env.scopes.lookup(&param.name).is_some() {
                continue;
            }
            let value = ready!(param.expression.evaluate(env));
            // NULL is accepted only when the declaration and the catalog agree
            if value.is_null() && !(param.nullable && env.metadata.is_nullable(&param.name)) {
                return Err(Error::NullParameter(param.name.clone()));
            }
            env.scopes.declare(&param.name, value)?;
        }
        env.clear_subqueries();

        if self.stack.is_empty() {
            let mut root = self.program.clone();
            root.reset();
            self.stack.push(root);
        }
        self.state = PlanState::Open;
        Ok(Step::Ready(()))
    }

    /// Fetch the next batch of output rows.
    ///
    /// The program runs to completion before the first batch; `Pending`
    /// surfaces whenever a subordinate source suspends, and the retry
    /// picks up at the suspended instruction. Terminal batches repeat once
    /// the output is exhausted.
    pub fn next_batch(&mut self) -> PollResult<Batch> {
        if self.state != PlanState::Open {
            return Err(Error::PlanNotOpen);
        }
        if self.done {
            return Ok(Step::Ready(Batch::empty_terminal(self.rows_delivered)));
        }
        if self.output.is_none() {
            ready!(self.run_to_output());
        }

        let batch_size = match self.env.as_ref() {
            Some(env) => env.config.batch_size,
            None => BufferConfig::default().batch_size,
        };
        let output = match self.output.as_mut() {
            Some(output) => output,
            None => return Err(Error::internal("program finished without an output")),
        };
        while self.buffer.len() < batch_size {
            match output.next_row()? {
                Step::Pending => return Ok(Step::Pending),
                Step::Ready(Some(row)) => self.buffer.push(row),
                Step::Ready(None) => {
                    self.done = true;
                    break;
                }
            }
        }

        let rows = std::mem::take(&mut self.buffer);
        let offset = self.rows_delivered;
        self.rows_delivered += rows.len();
        Ok(Step::Ready(Batch::new(rows, offset, self.done)))
    }

    /// Run the program stack until it empties, then settle the output source
    fn run_to_output(&mut self) -> PollResult<()> {
        let env = match self.env.as_mut() {
            Some(env) => env,
            None => return Err(Error::internal("plan has no environment")),
        };

        loop {
            let action = {
                let program = match self.stack.last() {
                    Some(program) => program,
                    None => break,
                };
                match program.current() {
                    None => Action::Pop,
                    Some(instruction) => {
                        log::trace!("processing: {}", instruction.describe());
                        if instruction.is_repeated() {
                            if ready!(instruction.condition(env)) {
                                let body = match instruction.body() {
                                    Some(body) => body.clone(),
                                    None => {
                                        return Err(Error::internal(
                                            "repeated instruction without a body",
                                        ))
                                    }
                                };
                                Action::Repeat(body)
                            } else {
                                Action::Advance
                            }
                        } else {
                            match ready!(instruction.process(env)) {
                                Flow::Advance => Action::Advance,
                                Flow::Push { program, bindings } => {
                                    Action::Push(program, bindings)
                                }
                                Flow::Continue => Action::Unwind,
                            }
                        }
                    }
                }
            };

            // Cached subquery values live for exactly one instruction
            env.clear_subqueries();

            match action {
                Action::Pop => {
                    self.stack.pop();
                    env.unwind_frame();
                }
                Action::Advance => {
                    if let Some(program) = self.stack.last_mut() {
                        if let Some(instruction) = program.current() {
                            if instruction.is_repeated() {
                                instruction.post_exit(env)?;
                            }
                        }
                        program.advance();
                    }
                }
                Action::Push(mut nested, bindings) => {
                    if let Some(parent) = self.stack.last_mut() {
                        parent.advance();
                    }
                    env.scopes.push_frame_with(bindings);
                    nested.reset();
                    self.stack.push(nested);
                }
                Action::Repeat(mut body) => {
                    // the repeated instruction's counter stays put until
                    // its condition turns false
                    body.reset();
                    env.scopes.push_frame();
                    self.stack.push(body);
                }
                Action::Unwind => loop {
                    match self.stack.last() {
                        None => return Err(Error::internal("CONTINUE outside of a loop")),
                        Some(program) => {
                            let at_loop = program
                                .current()
                                .map(|i| i.is_repeated())
                                .unwrap_or(false);
                            if at_loop {
                                break;
                            }
                        }
                    }
                    self.stack.pop();
                    env.unwind_frame();
                },
            }
        }

        let output: Box<dyn TupleSource> = if self.updating {
            Box::new(UpdateCountSource::new(env.update_count))
        } else {
            match env.last_result.take() {
                Some(key) => match env.cursors.remove(&key) {
                    Some(cursor) => cursor.into_source(),
                    None => Box::new(EmptyTupleSource::new(Vec::new())),
                },
                None => Box::new(EmptyTupleSource::new(Vec::new())),
            }
        };
        self.output = Some(output);
        Ok(Step::Ready(()))
    }

    /// Release every resource of the current invocation; idempotent
    pub fn close(&mut self) {
        if self.state == PlanState::Closed {
            return;
        }
        log::debug!("closing procedure {}", self.identity);
        self.release_resources();
        self.env = None;
        self.state = PlanState::Closed;
    }

    /// Return an initialized plan to its pre-open state, keeping its
    /// environment bindings so it can open again
    pub fn reset(&mut self) {
        self.release_resources();
        if self.env.is_some() {
            self.state = PlanState::Initialized;
        }
    }

    fn release_resources(&mut self) {
        if let Some(env) = self.env.as_mut() {
            for (_, mut cursor) in env.cursors.drain() {
                cursor.close();
            }
            if let Some(mut source) = env.in_flight.take() {
                source.close();
            }
            env.clear_subqueries();
            for table in env.scopes.all_temp_tables() {
                env.temp_store.drop_table(&env.context, &table);
            }
            env.scopes.clear();
            env.call_stack.clear();
            env.last_result = None;
            env.update_count = 0;
        }
        if let Some(mut output) = self.output.take() {
            output.close();
        }
        self.stack.clear();
        self.buffer.clear();
        self.rows_delivered = 0;
        self.done = false;
    }

    /// Clone the plan for a fresh invocation; shares no mutable state
    pub fn clone_plan(&self) -> ProcedurePlan {
        let mut clone = ProcedurePlan::new(self.identity.clone(), self.program.clone());
        clone.params = self.params.clone();
        clone.updating = self.updating;
        if let Some(env) = &self.env {
            clone.env = Some(ProcedureEnv::new(
                Arc::clone(&env.data_manager),
                Arc::clone(&env.pipeline),
                Arc::clone(&env.metadata),
                Arc::clone(&env.temp_store),
                env.config.clone(),
                env.context.clone(),
            ));
            clone.state = PlanState::Initialized;
        }
        clone
    }

    /// Whether executing this plan can write data
    pub fn requires_transaction(&self) -> bool {
        self.updating
            || self
                .program
                .instructions()
                .iter()
                .any(|instruction| instruction.updates_data())
    }

    /// Render the plan as an indented instruction listing
    pub fn describe(&self) -> String {
        format!("PROCEDURE {}\n{}", self.identity, self.program.describe(1))
    }

    /// Current value of a variable, if a frame in the chain binds it
    pub fn variable(&self, name: &str) -> Option<Value> {
        self.env.as_ref().and_then(|env| env.scopes.lookup(name).cloned())
    }

    /// Names of the cursors currently open, sorted
    pub fn open_cursors(&self) -> Vec<String> {
        let mut names: Vec<String> = match self.env.as_ref() {
            Some(env) => env.cursors.keys().cloned().collect(),
            None => Vec::new(),
        };
        names.sort();
        names
    }
}

impl Drop for ProcedurePlan {
    fn drop(&mut self) {
        self.close();
    }
}
