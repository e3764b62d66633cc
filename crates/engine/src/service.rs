use crate::error::EngineError;
use crate::resolver::FallbackResolver;
use analytics::BreakdownProjector;
use api_client::{FinanceBackend, RestBackend};
use chrono::NaiveDate;
use configuration::settings::Config;
use core_types::{BreakdownRow, DateRange, FinanceReport, Filters};
use std::sync::Arc;

/// The entry point the dashboard calls: one summary read path and one
/// detail-table read path, both gated on a complete date range.
///
/// Nothing is cached here. Results are a pure function of the range and
/// filters, so callers memoize by that pair if they want to.
pub struct FinanceService {
    backend: Arc<dyn FinanceBackend>,
    resolver: FallbackResolver,
    projector: BreakdownProjector,
}

impl FinanceService {
    pub fn new(backend: Arc<dyn FinanceBackend>, config: &Config) -> Self {
        Self {
            resolver: FallbackResolver::new(backend.clone(), config),
            projector: BreakdownProjector::new(
                config.categories.clone(),
                config.engine.raw_sample_limit,
            ),
            backend,
        }
    }

    /// Builds the service over the REST gateway described in `config`.
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        config.validate()?;
        let backend = RestBackend::new(&config.backend)?;
        Ok(Self::new(Arc::new(backend), config))
    }

    /// Resolves the income/expense summary.
    ///
    /// Returns `Ok(None)` without touching the backend when either bound is
    /// missing; the query is not runnable yet.
    pub async fn load_summary(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        filters: &Filters,
    ) -> Result<Option<FinanceReport>, EngineError> {
        let Some(range) = DateRange::from_bounds(from, to)? else {
            tracing::debug!("date range incomplete; summary not loaded");
            return Ok(None);
        };
        self.resolver.resolve(&range, filters).await.map(Some)
    }

    /// Loads the most recent raw transactions for the detail table.
    /// Same precondition as [`FinanceService::load_summary`].
    pub async fn load_breakdown(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        filters: &Filters,
    ) -> Result<Option<Vec<BreakdownRow>>, EngineError> {
        let Some(range) = DateRange::from_bounds(from, to)? else {
            tracing::debug!("date range incomplete; breakdown not loaded");
            return Ok(None);
        };
        let records = self
            .backend
            .fetch_raw_records(&range, filters, self.projector.limit())
            .await?;
        Ok(Some(self.projector.project(&records)))
    }
}
