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

//! Shared fixtures for procedure integration tests

#![allow(dead_code)]

use std::sync::Arc;

use fedsql::core::{Batch, Error, Result, Row, Step};
use fedsql::exec::{
    PassthroughPipeline, SessionContext, SessionTempStore, StaticDataManager, SystemMetadata,
};
use fedsql::procedure::{BufferConfig, ProcedurePlan, Program};

/// Everything a procedure invocation runs against
pub struct Fixture {
    pub data: Arc<StaticDataManager>,
    pub pipeline: Arc<PassthroughPipeline>,
    pub metadata: Arc<SystemMetadata>,
    pub temp_store: Arc<SessionTempStore>,
    pub context: SessionContext,
}

impl Fixture {
    pub fn new() -> Self {
        Fixture {
            data: Arc::new(StaticDataManager::new()),
            pipeline: Arc::new(PassthroughPipeline::new()),
            metadata: Arc::new(SystemMetadata::new()),
            temp_store: Arc::new(SessionTempStore::new()),
            context: SessionContext::new(7),
        }
    }

    /// Build an initialized plan over the fixture's services
    pub fn plan(&self, identity: &str, program: Program) -> ProcedurePlan {
        self.plan_with_config(identity, program, BufferConfig::default())
    }

    pub fn plan_with_config(
        &self,
        identity: &str,
        program: Program,
        config: BufferConfig,
    ) -> ProcedurePlan {
        let mut plan = ProcedurePlan::new(identity, program);
        plan.initialize(
            self.data.clone(),
            self.pipeline.clone(),
            self.metadata.clone(),
            self.temp_store.clone(),
            config,
            self.context.clone(),
        )
        .expect("initialize");
        plan
    }
}

const MAX_RETRIES: usize = 1000;

/// Open the plan and collect every output row, retrying through suspensions
pub fn drive(plan: &mut ProcedurePlan) -> Result<Vec<Row>> {
    let mut retries = 0;
    loop {
        match plan.open()? {
            Step::Ready(()) => break,
            Step::Pending => {
                retries += 1;
                if retries > MAX_RETRIES {
                    return Err(Error::internal("open never became ready"));
                }
            }
        }
    }
    let mut rows = Vec::new();
    loop {
        match plan.next_batch()? {
            Step::Pending => {
                retries += 1;
                if retries > MAX_RETRIES {
                    return Err(Error::internal("next_batch never became ready"));
                }
            }
            Step::Ready(batch) => {
                let terminal = batch.is_terminal();
                rows.extend(batch.into_rows());
                if terminal {
                    return Ok(rows);
                }
            }
        }
    }
}

/// Open the plan and collect batches as delivered, retrying through suspensions
pub fn drive_batches(plan: &mut ProcedurePlan) -> Result<Vec<Batch>> {
    let mut retries = 0;
    loop {
        match plan.open()? {
            Step::Ready(()) => break,
            Step::Pending => {
                retries += 1;
                if retries > MAX_RETRIES {
                    return Err(Error::internal("open never became ready"));
                }
            }
        }
    }
    let mut batches = Vec::new();
    loop {
        match plan.next_batch()? {
            Step::Pending => {
                retries += 1;
                if retries > MAX_RETRIES {
                    return Err(Error::internal("next_batch never became ready"));
                }
            }
            Step::Ready(batch) => {
                let terminal = batch.is_terminal();
                batches.push(batch);
                if terminal {
                    return Ok(batches);
                }
            }
        }
    }
}
