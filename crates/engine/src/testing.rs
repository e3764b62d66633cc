//! A scripted in-process backend for engine tests.

use api_client::error::ApiError;
use api_client::{AggregateRow, FinanceBackend, RpcSummary};
use async_trait::async_trait;
use core_types::{DateRange, Filters, RawRecord};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Tier1,
    Tier2,
    Raw { limit: usize },
}

/// `None` in a slot makes that query fail: tiers 1 and 2 with their
/// recoverable error, the raw fetch with an HTTP 500.
#[derive(Default)]
pub struct ScriptedBackend {
    pub tier1: Option<Vec<AggregateRow>>,
    pub tier2: Option<RpcSummary>,
    pub raw: Option<Vec<RawRecord>>,
    pub log: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.log.lock().unwrap().push(call);
    }
}

#[async_trait]
impl FinanceBackend for ScriptedBackend {
    async fn fetch_summary_tier1(&self, _range: &DateRange) -> Result<Vec<AggregateRow>, ApiError> {
        self.record(Call::Tier1);
        self.tier1
            .clone()
            .ok_or_else(|| ApiError::BackendUnavailable("view not provisioned".to_string()))
    }

    async fn fetch_summary_tier2(
        &self,
        _range: &DateRange,
        _filters: &Filters,
    ) -> Result<RpcSummary, ApiError> {
        self.record(Call::Tier2);
        self.tier2
            .clone()
            .ok_or_else(|| ApiError::RpcUnavailable("function does not exist".to_string()))
    }

    async fn fetch_raw_records(
        &self,
        _range: &DateRange,
        _filters: &Filters,
        limit: usize,
    ) -> Result<Vec<RawRecord>, ApiError> {
        self.record(Call::Raw { limit });
        self.raw.clone().ok_or_else(|| ApiError::Status {
            status: 500,
            body: "internal error".to_string(),
        })
    }
}
