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

//! Dynamic SQL compilation, validation, and the recursion guard

mod common;

use fedsql::core::{Column, DataType, Error, Row, Value};
use fedsql::procedure::{
    BufferConfig, ExecDynamicSqlInstruction, Expression, Instruction, Program,
};

use common::{drive, Fixture};

fn n_column() -> Vec<Column> {
    vec![Column::new("n", DataType::Integer)]
}

fn dynamic(sql: Expression) -> ExecDynamicSqlInstruction {
    ExecDynamicSqlInstruction {
        result_set: "R".to_string(),
        sql,
        declared_columns: Vec::new(),
        bindings: Vec::new(),
        identity: "p.dyn".to_string(),
    }
}

#[test]
fn test_dynamic_select_delivers_rows_and_bindings() {
    let fixture = Fixture::new();
    fixture
        .pipeline
        .register_shape("SELECT n FROM dyn", n_column(), false);
    fixture.data.insert_result(
        "SELECT n FROM dyn",
        n_column(),
        vec![
            Row::from_values(vec![Value::integer(10)]),
            Row::from_values(vec![Value::integer(20)]),
        ],
    );

    let mut instruction = dynamic(Expression::text("SELECT n FROM dyn"));
    instruction.bindings = vec![("b".to_string(), Expression::integer(3))];
    let program = Program::new(vec![Instruction::ExecDynamicSql(instruction)]);

    let mut plan = fixture.plan("p.dyn", program);
    let rows = drive(&mut plan).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get(0), Some(&Value::integer(10)));

    // the USING clause flowed through the rewrite stage, normalized
    assert_eq!(
        fixture.pipeline.last_bindings().get("B"),
        Some(&Value::integer(3))
    );
}

#[test]
fn test_declared_column_type_checked_before_rows() {
    let fixture = Fixture::new();
    fixture.pipeline.register_shape(
        "SELECT s FROM t2",
        vec![Column::new("s", DataType::Text)],
        false,
    );
    fixture.data.insert_result(
        "SELECT s FROM t2",
        vec![Column::new("s", DataType::Text)],
        vec![Row::from_values(vec![Value::text("9")])],
    );

    let mut instruction = dynamic(Expression::text("SELECT s FROM t2"));
    instruction.declared_columns = vec![Column::new("s", DataType::Integer)];
    let program = Program::new(vec![Instruction::ExecDynamicSql(instruction)]);

    let mut plan = fixture.plan("p.dyn", program);
    let err = drive(&mut plan).unwrap_err();
    assert!(matches!(err, Error::DynamicColumnType { .. }));
    // validation failed before the statement ever executed
    assert_eq!(fixture.data.request_count("SELECT s FROM t2"), 0);
}

#[test]
fn test_declared_column_count_mismatch() {
    let fixture = Fixture::new();
    fixture
        .pipeline
        .register_shape("SELECT n FROM dyn", n_column(), false);

    let mut instruction = dynamic(Expression::text("SELECT n FROM dyn"));
    instruction.declared_columns = vec![
        Column::new("a", DataType::Integer),
        Column::new("b", DataType::Integer),
    ];
    let program = Program::new(vec![Instruction::ExecDynamicSql(instruction)]);

    let mut plan = fixture.plan("p.dyn", program);
    let err = drive(&mut plan).unwrap_err();
    assert_eq!(err, Error::DynamicColumnCount { expected: 2, got: 1 });
}

#[test]
fn test_null_sql_string_rejected() {
    let fixture = Fixture::new();
    let program = Program::new(vec![Instruction::ExecDynamicSql(dynamic(
        Expression::Literal(Value::null_unknown()),
    ))]);

    let mut plan = fixture.plan("p.dyn", program);
    let err = drive(&mut plan).unwrap_err();
    assert_eq!(err, Error::NullDynamicSql);
}

#[test]
fn test_unresolvable_statement_rejected() {
    let fixture = Fixture::new();
    let program = Program::new(vec![Instruction::ExecDynamicSql(dynamic(
        Expression::text("SELECT nothing"),
    ))]);

    let mut plan = fixture.plan("p.dyn", program);
    let err = drive(&mut plan).unwrap_err();
    assert!(matches!(err, Error::ResolveFailed { .. }));
}

#[test]
fn test_recursion_limit() {
    let fixture = Fixture::new();
    fixture
        .pipeline
        .register_shape("SELECT n FROM dyn", n_column(), false);

    let program = Program::new(vec![Instruction::ExecDynamicSql(dynamic(
        Expression::text("SELECT n FROM dyn"),
    ))]);
    let config = BufferConfig {
        max_recursion_depth: 0,
        ..BufferConfig::default()
    };

    let mut plan = fixture.plan_with_config("p.dyn", program, config);
    let err = drive(&mut plan).unwrap_err();
    assert_eq!(
        err,
        Error::RecursionLimit {
            identity: "p.dyn".to_string(),
            limit: 0,
        }
    );
}
