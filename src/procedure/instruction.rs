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

//! Procedural instructions
//!
//! Each instruction is immutable template data plus a `process` operation
//! over the interpreter environment. Loop and While are repeated
//! instructions: they carry a pre-condition, an owned body program, and a
//! post-exit hook, surfaced to the interpreter loop through `is_repeated`,
//! `condition`, and `post_exit`.

use rustc_hash::FxHashMap;

use crate::core::error::{Error, Result};
use crate::core::schema::Column;
use crate::core::step::{PollResult, Step};
use crate::core::types::DataType;
use crate::core::value::Value;
use crate::exec::plan::RelationalPlan;
use crate::ready;

use super::cursor::Cursor;
use super::expression::{EvalContext, Expression};
use super::plan::ProcedureEnv;
use super::program::Program;
use super::scope::normalize;

/// What the interpreter loop does after an instruction processes
#[derive(Debug)]
pub enum Flow {
    /// Move the counter past this instruction
    Advance,

    /// Advance, then push a nested program whose scope frame is seeded
    /// with the given bindings
    Push {
        program: Program,
        bindings: FxHashMap<String, Value>,
    },

    /// Unwind to the nearest enclosing repeated instruction
    Continue,
}

/// Whether an assignment declares its target or writes an existing one
#[derive(Debug, Clone, PartialEq)]
pub enum WriteTarget {
    /// Register the variable in the current frame with a declared type
    Declare { data_type: DataType },

    /// Write to the frame where the variable is already declared
    Assign,
}

/// Where an assignment's value comes from
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentSource {
    /// A scalar expression over the current scope
    Expression(Expression),

    /// A nested plan expected to yield one row and one column
    Plan(RelationalPlan),
}

/// DECLARE / assignment instruction
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentInstruction {
    pub variable: String,
    pub source: AssignmentSource,
    pub target: WriteTarget,
}

/// Execute a compiled relational plan under a result-set name
#[derive(Debug, Clone, PartialEq)]
pub struct ExecSqlInstruction {
    pub result_set: String,
    pub plan: RelationalPlan,
    /// SELECT-INTO destination; rows are materialized into this temp table
    pub into_table: Option<String>,
}

/// Compile and execute SQL text produced at runtime
#[derive(Debug, Clone, PartialEq)]
pub struct ExecDynamicSqlInstruction {
    pub result_set: String,
    /// String-valued expression producing the SQL text
    pub sql: Expression,
    /// Declared AS-columns validated against the compiled projection
    pub declared_columns: Vec<Column>,
    /// USING-clause bindings, evaluated into the pushed scope
    pub bindings: Vec<(String, Expression)>,
    /// Identity of the enclosing procedure, for the recursion guard
    pub identity: String,
}

/// Ensure a named result set exists, replacing any stale one
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCursorInstruction {
    pub result_set: String,
    pub plan: RelationalPlan,
}

/// Cursor-driven loop over a result set
#[derive(Debug, Clone, PartialEq)]
pub struct LoopInstruction {
    pub result_set: String,
    pub plan: RelationalPlan,
    pub body: Program,
}

/// Predicate-driven loop
#[derive(Debug, Clone, PartialEq)]
pub struct WhileInstruction {
    pub condition: Expression,
    pub body: Program,
}

/// Fail the invocation with a user-raised error
#[derive(Debug, Clone, PartialEq)]
pub struct RaiseErrorInstruction {
    pub message: Expression,
}

/// One executable step of a procedural program
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Assignment(AssignmentInstruction),
    ExecSql(ExecSqlInstruction),
    ExecDynamicSql(ExecDynamicSqlInstruction),
    CreateCursor(CreateCursorInstruction),
    Loop(LoopInstruction),
    While(WhileInstruction),
    Continue,
    RaiseError(RaiseErrorInstruction),
    /// Internal: pop the dynamic-SQL recursion frame
    PopCallFrame,
}

impl Instruction {
    /// Returns true for instructions with a pre-condition and nested body
    pub fn is_repeated(&self) -> bool {
        matches!(self, Instruction::Loop(_) | Instruction::While(_))
    }

    /// The nested body program, for repeated instructions
    pub fn body(&self) -> Option<&Program> {
        match self {
            Instruction::Loop(l) => Some(&l.body),
            Instruction::While(w) => Some(&w.body),
            _ => None,
        }
    }

    /// Returns true if executing this instruction can write data
    pub fn updates_data(&self) -> bool {
        match self {
            Instruction::ExecSql(i) => i.plan.is_updating() || i.into_table.is_some(),
            Instruction::ExecDynamicSql(_) => true,
            Instruction::Loop(l) => l.body.instructions().iter().any(|i| i.updates_data()),
            Instruction::While(w) => w.body.instructions().iter().any(|i| i.updates_data()),
            _ => false,
        }
    }

    /// Human-readable description
    pub fn describe(&self) -> String {
        match self {
            Instruction::Assignment(a) => match &a.target {
                WriteTarget::Declare { data_type } => {
                    format!("DECLARE {} {}", data_type, a.variable)
                }
                WriteTarget::Assign => format!("ASSIGN {}", a.variable),
            },
            Instruction::ExecSql(e) => match &e.into_table {
                Some(table) => format!("EXEC '{}' INTO {}", e.plan.sql(), table),
                None => format!("EXEC '{}' -> {}", e.plan.sql(), e.result_set),
            },
            Instruction::ExecDynamicSql(e) => format!("EXEC DYNAMIC -> {}", e.result_set),
            Instruction::CreateCursor(c) => {
                format!("CREATE CURSOR {} OVER '{}'", c.result_set, c.plan.sql())
            }
            Instruction::Loop(l) => format!("LOOP ON {}", l.result_set),
            Instruction::While(_) => "WHILE".to_string(),
            Instruction::Continue => "CONTINUE".to_string(),
            Instruction::RaiseError(_) => "RAISE ERROR".to_string(),
            Instruction::PopCallFrame => "POP CALL FRAME".to_string(),
        }
    }

    /// Execute the instruction against the interpreter environment
    pub(crate) fn process(&self, env: &mut ProcedureEnv) -> PollResult<Flow> {
        match self {
            Instruction::Assignment(a) => process_assignment(a, env),
            Instruction::ExecSql(e) => process_exec_sql(e, env),
            Instruction::ExecDynamicSql(e) => process_exec_dynamic(e, env),
            Instruction::CreateCursor(c) => {
                create_cursor(&c.result_set, &c.plan, env)?;
                Ok(Step::Ready(Flow::Advance))
            }
            Instruction::Continue => Ok(Step::Ready(Flow::Continue)),
            Instruction::RaiseError(r) => {
                let value = ready!(r.message.evaluate(env));
                Err(Error::UserRaised(value.as_string().unwrap_or_default()))
            }
            Instruction::PopCallFrame => {
                env.call_stack.pop();
                Ok(Step::Ready(Flow::Advance))
            }
            Instruction::Loop(_) | Instruction::While(_) => Err(Error::internal(
                "repeated instructions are driven by condition, not process",
            )),
        }
    }

    /// Evaluate the pre-condition of a repeated instruction.
    ///
    /// For Loop, a true condition has already fetched the next row and
    /// copied its columns into scope.
    pub(crate) fn condition(&self, env: &mut ProcedureEnv) -> PollResult<bool> {
        match self {
            Instruction::Loop(l) => loop_condition(l, env),
            Instruction::While(w) => {
                let value = ready!(w.condition.evaluate(env));
                let entered = match value.as_boolean() {
                    Some(b) => b,
                    // NULL conditions fall out of the loop, as in WHERE
                    None if value.is_null() => false,
                    None => {
                        return Err(Error::expression(format!(
                            "WHILE condition must be boolean, got {}",
                            value.data_type()
                        )))
                    }
                };
                Ok(Step::Ready(entered))
            }
            _ => Err(Error::internal("condition on a non-repeated instruction")),
        }
    }

    /// Run the post-exit hook of a repeated instruction
    pub(crate) fn post_exit(&self, env: &mut ProcedureEnv) -> Result<()> {
        match self {
            Instruction::Loop(l) => {
                let key = normalize(&l.result_set);
                if let Some(mut cursor) = env.cursors.remove(&key) {
                    for column in cursor.columns() {
                        env.scopes
                            .remove_local(&format!("{}.{}", l.result_set, column.name));
                    }
                    cursor.close();
                }
                Ok(())
            }
            Instruction::While(_) => Ok(()),
            _ => Ok(()),
        }
    }
}

/// Evaluate the assignment's value and write it to its target
fn process_assignment(
    instruction: &AssignmentInstruction,
    env: &mut ProcedureEnv,
) -> PollResult<Flow> {
    let value = match &instruction.source {
        AssignmentSource::Expression(expr) => ready!(expr.evaluate(env)),
        AssignmentSource::Plan(plan) => ready!(env.scalar_subquery(plan)),
    };
    match &instruction.target {
        WriteTarget::Declare { data_type } => {
            let value = if value.is_null() {
                Value::null(*data_type)
            } else {
                value
            };
            env.scopes.declare(&instruction.variable, value)?;
        }
        WriteTarget::Assign => env.scopes.assign(&instruction.variable, value)?,
    }
    Ok(Step::Ready(Flow::Advance))
}

fn process_exec_sql(instruction: &ExecSqlInstruction, env: &mut ProcedureEnv) -> PollResult<Flow> {
    if env.in_flight.is_none() {
        if let Some(table) = &instruction.into_table {
            if !env.metadata.supports_updates(table) {
                return Err(Error::metadata(format!(
                    "target '{}' does not support updates",
                    table
                )));
            }
        }
        let source = env
            .data_manager
            .register_request(&instruction.plan, &env.context)?;

        if let Some(table) = &instruction.into_table {
            env.temp_store
                .create(&env.context, table, instruction.plan.columns().to_vec())?;
            env.scopes.note_temp_table(table)?;
        } else if !instruction.plan.is_updating() {
            // rows become a named cursor for later instructions
            let key = normalize(&instruction.result_set);
            if let Some(mut stale) = env.cursors.remove(&key) {
                stale.close();
            }
            env.cursors
                .insert(key.clone(), Cursor::new(instruction.result_set.clone(), source));
            env.scopes.note_cursor(&key)?;
            if let Some(prev) = env.last_result.take() {
                // a former output cursor whose owning frame already popped
                // has no one left to close it
                if prev != key && !env.scopes.cursor_noted_in_chain(&prev) {
                    if let Some(mut superseded) = env.cursors.remove(&prev) {
                        superseded.close();
                    }
                }
            }
            env.last_result = Some(key);
            return Ok(Step::Ready(Flow::Advance));
        }

        env.in_flight = Some(source);
    }

    // Update-count or SELECT-INTO drain; resumes here after Pending with
    // already-consumed rows untouched.
    let source = match env.in_flight.as_mut() {
        Some(source) => source,
        None => return Err(Error::internal("exec drain without a registered source")),
    };
    loop {
        match ready!(source.next_row()) {
            Some(row) => match &instruction.into_table {
                Some(table) => {
                    env.temp_store.insert(&env.context, table, row)?;
                    env.update_count += 1;
                }
                None => {
                    env.update_count += row.get(0).and_then(|v| v.as_int64()).unwrap_or(0);
                }
            },
            None => break,
        }
    }
    if let Some(mut source) = env.in_flight.take() {
        source.close();
    }
    Ok(Step::Ready(Flow::Advance))
}

fn process_exec_dynamic(
    instruction: &ExecDynamicSqlInstruction,
    env: &mut ProcedureEnv,
) -> PollResult<Flow> {
    let sql_value = ready!(instruction.sql.evaluate(env));
    if sql_value.is_null() {
        return Err(Error::NullDynamicSql);
    }
    let sql = sql_value.as_string().unwrap_or_default();

    let mut bindings: FxHashMap<String, Value> = FxHashMap::default();
    for (name, expr) in &instruction.bindings {
        let value = ready!(expr.evaluate(env));
        bindings.insert(normalize(name), value);
    }

    let plan = env
        .pipeline
        .compile(&sql, env.metadata.as_ref(), &bindings)?;

    // Declared AS-columns are validated before any row is produced
    if !instruction.declared_columns.is_empty() {
        if plan.columns().len() != instruction.declared_columns.len() {
            return Err(Error::DynamicColumnCount {
                expected: instruction.declared_columns.len(),
                got: plan.columns().len(),
            });
        }
        for (actual, declared) in plan.columns().iter().zip(&instruction.declared_columns) {
            if !env
                .metadata
                .can_implicitly_convert(actual.data_type, declared.data_type)
            {
                return Err(Error::dynamic_column_type(
                    declared.name.as_str(),
                    env.metadata.type_name(actual.data_type),
                    env.metadata.type_name(declared.data_type),
                ));
            }
        }
    }

    let occurrences = env
        .call_stack
        .iter()
        .filter(|id| id.as_str() == instruction.identity)
        .count();
    if occurrences >= env.config.max_recursion_depth {
        return Err(Error::RecursionLimit {
            identity: instruction.identity.clone(),
            limit: env.config.max_recursion_depth,
        });
    }
    env.call_stack.push(instruction.identity.clone());

    let program = Program::new(vec![
        Instruction::ExecSql(ExecSqlInstruction {
            result_set: instruction.result_set.clone(),
            plan,
            into_table: None,
        }),
        Instruction::PopCallFrame,
    ]);
    Ok(Step::Ready(Flow::Push { program, bindings }))
}

/// Replace any stale cursor under the name and execute the plan into a new one
fn create_cursor(result_set: &str, plan: &RelationalPlan, env: &mut ProcedureEnv) -> Result<()> {
    let key = normalize(result_set);
    if let Some(mut stale) = env.cursors.remove(&key) {
        stale.close();
    }
    let source = env.data_manager.register_request(plan, &env.context)?;
    env.cursors
        .insert(key.clone(), Cursor::new(result_set.to_string(), source));
    env.scopes.note_cursor(&key)?;
    Ok(())
}

fn loop_condition(instruction: &LoopInstruction, env: &mut ProcedureEnv) -> PollResult<bool> {
    let key = normalize(&instruction.result_set);
    if !env.cursors.contains_key(&key) {
        create_cursor(&instruction.result_set, &instruction.plan, env)?;
    }
    let cursor = match env.cursors.get_mut(&key) {
        Some(cursor) => cursor,
        None => return Err(Error::CursorNotFound(instruction.result_set.clone())),
    };
    let advanced = ready!(cursor.advance());
    if advanced {
        let values: Vec<(String, Value)> = cursor
            .columns()
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let value = cursor
                    .current()
                    .and_then(|row| row.get(i))
                    .cloned()
                    .unwrap_or_else(|| Value::null(column.data_type));
                (
                    format!("{}.{}", instruction.result_set, column.name),
                    value,
                )
            })
            .collect();
        for (name, value) in values {
            env.scopes.declare(&name, value)?;
        }
    }
    Ok(Step::Ready(advanced))
}
