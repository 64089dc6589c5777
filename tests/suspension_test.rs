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

//! Suspension and resumption at every fetch boundary

mod common;

use fedsql::core::{Column, DataType, Error, Row, Step, Value};
use fedsql::TempTableStore;
use fedsql::exec::RelationalPlan;
use fedsql::procedure::{
    AssignmentInstruction, AssignmentSource, BinaryOp, BufferConfig, ExecSqlInstruction,
    Expression, Instruction, Program, RaiseErrorInstruction, WhileInstruction, WriteTarget,
};

use common::{drive, drive_batches, Fixture};

fn n_column() -> Vec<Column> {
    vec![Column::new("n", DataType::Integer)]
}

fn integer_rows(values: &[i64]) -> Vec<Row> {
    values
        .iter()
        .map(|n| Row::from_values(vec![Value::integer(*n)]))
        .collect()
}

#[test]
fn test_pending_query_still_delivers_all_rows() {
    let fixture = Fixture::new();
    fixture
        .data
        .insert_result("SELECT n FROM t", n_column(), integer_rows(&[1, 2, 3]));
    fixture.data.set_pending("SELECT n FROM t");

    let program = Program::new(vec![Instruction::ExecSql(ExecSqlInstruction {
        result_set: "R".to_string(),
        plan: RelationalPlan::query("SELECT n FROM t", n_column()),
        into_table: None,
    })]);

    let mut plan = fixture.plan("p.pending", program);
    let rows = drive(&mut plan).unwrap();
    assert_eq!(rows, integer_rows(&[1, 2, 3]));
}

#[test]
fn test_while_condition_subquery_resumes() {
    let fixture = Fixture::new();
    fixture
        .data
        .insert_result("SELECT lim", n_column(), integer_rows(&[2]));
    fixture.data.set_pending("SELECT lim");

    let subquery = RelationalPlan::query("SELECT lim", n_column());
    let body = Program::new(vec![Instruction::Assignment(AssignmentInstruction {
        variable: "i".to_string(),
        source: AssignmentSource::Expression(Expression::binary(
            BinaryOp::Add,
            Expression::variable("i"),
            Expression::integer(1),
        )),
        target: WriteTarget::Assign,
    })]);
    let program = Program::builder()
        .add(Instruction::Assignment(AssignmentInstruction {
            variable: "i".to_string(),
            source: AssignmentSource::Expression(Expression::integer(0)),
            target: WriteTarget::Declare {
                data_type: DataType::Integer,
            },
        }))
        .add(Instruction::While(WhileInstruction {
            condition: Expression::binary(
                BinaryOp::Gt,
                Expression::ScalarSubquery(subquery),
                Expression::variable("i"),
            ),
            body,
        }))
        .add(Instruction::RaiseError(RaiseErrorInstruction {
            message: Expression::variable("i"),
        }))
        .build();

    let mut plan = fixture.plan("p.subquery", program);
    let err = drive(&mut plan).unwrap_err();
    assert_eq!(err, Error::UserRaised("2".to_string()));
    // one registration per condition evaluation: true, true, false
    assert_eq!(fixture.data.request_count("SELECT lim"), 3);
}

#[test]
fn test_close_at_suspension_point_releases_temp_tables() {
    let fixture = Fixture::new();
    fixture
        .data
        .insert_result("SELECT n FROM src", n_column(), integer_rows(&[1, 2]));
    fixture.data.set_pending("SELECT n FROM src");

    let program = Program::new(vec![Instruction::ExecSql(ExecSqlInstruction {
        result_set: "R".to_string(),
        plan: RelationalPlan::query("SELECT n FROM src", n_column()),
        into_table: Some("#x".to_string()),
    })]);

    let mut plan = fixture.plan("p.abort", program);
    plan.open().unwrap();
    assert_eq!(plan.next_batch().unwrap(), Step::Pending);
    assert!(fixture.temp_store.contains(&fixture.context, "#x"));

    plan.close();
    assert!(!fixture.temp_store.contains(&fixture.context, "#x"));
}

#[test]
fn test_batches_page_with_offsets() {
    let fixture = Fixture::new();
    fixture.data.insert_result(
        "SELECT n FROM t",
        n_column(),
        integer_rows(&[1, 2, 3, 4, 5]),
    );

    let program = Program::new(vec![Instruction::ExecSql(ExecSqlInstruction {
        result_set: "R".to_string(),
        plan: RelationalPlan::query("SELECT n FROM t", n_column()),
        into_table: None,
    })]);
    let config = BufferConfig {
        batch_size: 2,
        ..BufferConfig::default()
    };

    let mut plan = fixture.plan_with_config("p.page", program, config);
    let batches = drive_batches(&mut plan).unwrap();
    assert_eq!(batches.len(), 3);

    assert_eq!(batches[0].len(), 2);
    assert_eq!(batches[0].row_offset(), 0);
    assert!(!batches[0].is_terminal());

    assert_eq!(batches[1].len(), 2);
    assert_eq!(batches[1].row_offset(), 2);
    assert!(!batches[1].is_terminal());

    assert_eq!(batches[2].len(), 1);
    assert_eq!(batches[2].row_offset(), 4);
    assert!(batches[2].is_terminal());
}

#[test]
fn test_multi_row_scalar_assignment_fails() {
    let fixture = Fixture::new();
    fixture
        .data
        .insert_result("SELECT n FROM t", n_column(), integer_rows(&[1, 2]));

    let program = Program::new(vec![Instruction::Assignment(AssignmentInstruction {
        variable: "v".to_string(),
        source: AssignmentSource::Plan(RelationalPlan::query("SELECT n FROM t", n_column())),
        target: WriteTarget::Declare {
            data_type: DataType::Integer,
        },
    })]);

    let mut plan = fixture.plan("p.scalar", program);
    let err = drive(&mut plan).unwrap_err();
    assert!(matches!(err, Error::ScalarQueryMultipleRows { .. }));
}
