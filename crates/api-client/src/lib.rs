use crate::error::ApiError;
use crate::responses::OneOrMany;
use async_trait::async_trait;
use configuration::BackendConfig;
use core_types::normalize::format_day;
use core_types::{DateRange, Filters, RawRecord};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

pub mod error;
pub mod responses;
// --- Public API ---
pub use responses::{AggregateRow, RpcSummary, RpcSummaryParams, TransactionRow};

const AGGREGATE_COLUMNS: &str = "total_revenue,total_commission,total_service_costs,total_payout";

/// The generic, abstract interface for the finance data backend.
/// This trait is the contract the fallback resolver uses, allowing the
/// underlying implementation (REST gateway or a test double) to be swapped out.
///
/// Retry, backoff and timeouts are the implementation's business; callers
/// only see the final outcome of each query.
#[async_trait]
pub trait FinanceBackend: Send + Sync {
    /// Tier 1: rows of the materialized aggregate view for the range.
    /// Fails with `ApiError::BackendUnavailable` if the view is not provisioned.
    async fn fetch_summary_tier1(&self, range: &DateRange) -> Result<Vec<AggregateRow>, ApiError>;

    /// Tier 2: the `get_finance_summary` procedure.
    /// Fails with `ApiError::RpcUnavailable` if it is missing or errors.
    async fn fetch_summary_tier2(
        &self,
        range: &DateRange,
        filters: &Filters,
    ) -> Result<RpcSummary, ApiError>;

    /// Tier 3 and the breakdown table: at most `limit` normalized raw
    /// transactions, newest first. Any failure here is fatal to the caller.
    async fn fetch_raw_records(
        &self,
        range: &DateRange,
        filters: &Filters,
        limit: usize,
    ) -> Result<Vec<RawRecord>, ApiError>;
}

/// A concrete `FinanceBackend` for a PostgREST-style gateway
/// (`/rest/v1/<relation>` for reads, `/rest/v1/rpc/<name>` for procedures).
#[derive(Clone)]
pub struct RestBackend {
    client: reqwest::Client,
    rest_url: String,
    settings: BackendConfig,
}

impl RestBackend {
    pub fn new(settings: &BackendConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if !settings.api_key.is_empty() {
            let key = HeaderValue::from_str(&settings.api_key)
                .map_err(|e| ApiError::InvalidConfig(format!("api key: {}", e)))?;
            let bearer = HeaderValue::from_str(&format!("Bearer {}", settings.api_key))
                .map_err(|e| ApiError::InvalidConfig(format!("api key: {}", e)))?;
            headers.insert("apikey", key);
            headers.insert(AUTHORIZATION, bearer);
        }

        Ok(Self {
            client: reqwest::Client::builder().default_headers(headers).build()?,
            rest_url: format!("{}/rest/v1", settings.base_url.trim_end_matches('/')),
            settings: settings.clone(),
        })
    }

    /// Sends a request and decodes a successful body; anything else becomes
    /// a `Status` or `Deserialization` error carrying the response text.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| {
                ApiError::Deserialization(format!("{}. Original text: {}", e, text))
            })
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            })
        }
    }

    /// A PostgREST `and=(...)` filter selecting the inclusive day range on
    /// `field`. The upper bound is exclusive on the following day so that
    /// timestamp columns include the whole last day.
    fn range_filter(field: &str, range: &DateRange) -> String {
        let upper = match range.to.succ_opt() {
            Some(next) => format!("{}.lt.{}", field, format_day(next)),
            None => format!("{}.lte.{}", field, range.to_day()),
        };
        format!("({}.gte.{},{})", field, range.from_day(), upper)
    }
}

#[async_trait]
impl FinanceBackend for RestBackend {
    async fn fetch_summary_tier1(&self, range: &DateRange) -> Result<Vec<AggregateRow>, ApiError> {
        let url = format!("{}/{}", self.rest_url, self.settings.aggregate_view);
        let filter = Self::range_filter(&self.settings.aggregate_date_field, range);
        let request = self
            .client
            .get(&url)
            .query(&[("select", AGGREGATE_COLUMNS), ("and", filter.as_str())]);

        self.send_json::<Vec<AggregateRow>>(request)
            .await
            .map_err(|e| ApiError::BackendUnavailable(e.to_string()))
    }

    async fn fetch_summary_tier2(
        &self,
        range: &DateRange,
        filters: &Filters,
    ) -> Result<RpcSummary, ApiError> {
        let url = format!("{}/rpc/{}", self.rest_url, self.settings.summary_rpc);
        let params = RpcSummaryParams {
            start_date: range.from_day(),
            end_date: range.to_day(),
            date_type: filters.date_type.as_str().to_string(),
            sku_filter: filters.sku,
            region_filter: filters.region.clone(),
        };

        let result = self
            .send_json::<OneOrMany<RpcSummary>>(self.client.post(&url).json(&params))
            .await
            .map_err(|e| ApiError::RpcUnavailable(e.to_string()))?;

        result.into_first().ok_or_else(|| {
            ApiError::RpcUnavailable(format!("{} returned no rows", self.settings.summary_rpc))
        })
    }

    async fn fetch_raw_records(
        &self,
        range: &DateRange,
        filters: &Filters,
        limit: usize,
    ) -> Result<Vec<RawRecord>, ApiError> {
        let field = &self.settings.transactions_date_field;
        let url = format!("{}/{}", self.rest_url, self.settings.transactions_source);
        let mut query = vec![
            ("select".to_string(), "*".to_string()),
            ("and".to_string(), Self::range_filter(field, range)),
            ("order".to_string(), format!("{}.desc", field)),
            ("limit".to_string(), limit.to_string()),
        ];
        if let Some(sku) = filters.sku {
            query.push(("sku".to_string(), format!("eq.{}", sku)));
        }

        let rows = self
            .send_json::<Vec<TransactionRow>>(self.client.get(&url).query(&query))
            .await?;
        tracing::debug!(
            rows = rows.len(),
            source = %self.settings.transactions_source,
            "fetched raw transactions"
        );

        Ok(rows.into_iter().map(TransactionRow::into_record).collect())
    }
}
