use crate::error::EngineError;
use analytics::{Aggregator, Categorizer};
use api_client::error::ApiError;
use api_client::{AggregateRow, FinanceBackend, RpcSummary};
use configuration::settings::Config;
use core_types::{DateRange, FinanceReport, FinanceSummary, Filters, SummarySource};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Tiers whose failure is absorbed, in the order they are tried. The raw
/// transaction tier always runs last and its failure is returned as-is.
const RECOVERABLE_TIERS: [SummarySource; 2] =
    [SummarySource::MaterializedView, SummarySource::SummaryRpc];

/// The outcome of trying one tier.
#[derive(Debug)]
pub enum Attempt {
    Success(FinanceReport),
    Recoverable(ApiError),
}

/// Produces a finance report by trying the backend tiers in fixed order.
///
/// Tier 1 reads the materialized aggregate view, tier 2 calls the summary
/// procedure, tier 3 classifies and aggregates a bounded window of raw
/// transactions. Calls are strictly sequential: a tier only runs once every
/// tier above it has failed. The first success wholly replaces any earlier
/// attempt; nothing is merged across tiers.
///
/// Per-tier semantics, tagged by `FinanceReport::source`:
/// - tier 1 splits service costs into delivery/services by a configured share
///   and reports the backend payout as `net_profit`;
/// - tier 2 takes the six buckets and `net_profit` as reported;
/// - tier 3 derives `net_profit` as income minus expenses.
///
/// Income and expense totals and the category list are always rebuilt from
/// the buckets the same way.
pub struct FallbackResolver {
    backend: Arc<dyn FinanceBackend>,
    categorizer: Categorizer,
    aggregator: Aggregator,
    raw_sample_limit: usize,
    tier1_delivery_share: Decimal,
}

impl FallbackResolver {
    pub fn new(backend: Arc<dyn FinanceBackend>, config: &Config) -> Self {
        Self {
            backend,
            categorizer: Categorizer::new(config.categories.clone()),
            aggregator: Aggregator::new(config.categories.clone()),
            raw_sample_limit: config.engine.raw_sample_limit,
            tier1_delivery_share: config.engine.tier1_delivery_share,
        }
    }

    pub async fn resolve(
        &self,
        range: &DateRange,
        filters: &Filters,
    ) -> Result<FinanceReport, EngineError> {
        for tier in RECOVERABLE_TIERS {
            match self.attempt(tier, range, filters).await? {
                Attempt::Success(report) => return Ok(Self::resolved(report)),
                Attempt::Recoverable(err) => {
                    tracing::warn!(%tier, error = %err, "finance tier unavailable, falling through");
                }
            }
        }

        match self.attempt(SummarySource::RawTransactions, range, filters).await? {
            Attempt::Success(report) => Ok(Self::resolved(report)),
            Attempt::Recoverable(err) => Err(err.into()),
        }
    }

    /// Runs a single tier. Tiers 1 and 2 turn every failure into
    /// `Attempt::Recoverable`; a tier 3 failure is returned as an error.
    pub async fn attempt(
        &self,
        tier: SummarySource,
        range: &DateRange,
        filters: &Filters,
    ) -> Result<Attempt, EngineError> {
        tracing::debug!(%tier, from = %range.from, to = %range.to, "trying finance tier");
        let outcome = match tier {
            SummarySource::MaterializedView => self
                .backend
                .fetch_summary_tier1(range)
                .await
                .and_then(|rows| self.from_aggregate_rows(&rows)),
            SummarySource::SummaryRpc => self
                .backend
                .fetch_summary_tier2(range, filters)
                .await
                .map(|summary| self.from_rpc_summary(&summary)),
            SummarySource::RawTransactions => {
                return self.resolve_raw(range, filters).await.map(Attempt::Success);
            }
        };

        Ok(match outcome {
            Ok(summary) => Attempt::Success(self.report(tier, summary)),
            Err(err) => Attempt::Recoverable(err),
        })
    }

    fn resolved(report: FinanceReport) -> FinanceReport {
        tracing::info!(source = %report.source, has_data = report.has_data, "finance summary resolved");
        report
    }

    /// Tier 3. A failed fetch is fatal and not retried.
    async fn resolve_raw(
        &self,
        range: &DateRange,
        filters: &Filters,
    ) -> Result<FinanceReport, EngineError> {
        let records = self
            .backend
            .fetch_raw_records(range, filters, self.raw_sample_limit)
            .await?;
        let classified = self.categorizer.classify_all(&records);
        let summary = self.aggregator.summarize(&classified);

        if summary.is_empty() {
            tracing::info!(records = records.len(), "raw transactions aggregate to zero; reporting no data");
        }
        Ok(self.report(SummarySource::RawTransactions, summary))
    }

    fn from_aggregate_rows(&self, rows: &[AggregateRow]) -> Result<FinanceSummary, ApiError> {
        if rows.is_empty() {
            return Err(ApiError::BackendUnavailable(
                "aggregate view returned no rows for the range".to_string(),
            ));
        }

        let mut revenue = Decimal::ZERO;
        let mut commission = Decimal::ZERO;
        let mut service_costs = Decimal::ZERO;
        let mut payout = Decimal::ZERO;
        for row in rows {
            revenue += row.total_revenue;
            commission += row.total_commission.abs();
            service_costs += row.total_service_costs.abs();
            payout += row.total_payout;
        }

        // The view has no per-category split of service costs; this is an
        // estimate, not a classification.
        let delivery = service_costs * self.tier1_delivery_share;
        let services = service_costs - delivery;

        let mut summary = FinanceSummary::from_buckets(
            revenue,
            commission,
            delivery,
            Decimal::ZERO,
            Decimal::ZERO,
            services,
        );
        summary.net_profit = payout;
        Ok(summary)
    }

    fn from_rpc_summary(&self, rpc: &RpcSummary) -> FinanceSummary {
        let mut summary = FinanceSummary::from_buckets(
            rpc.total_sales,
            rpc.total_commissions.abs(),
            rpc.total_delivery.abs(),
            rpc.total_returns.abs(),
            rpc.total_ads.abs(),
            rpc.total_services.abs(),
        );
        if summary.total_income != rpc.total_income || summary.total_expenses != rpc.total_expenses {
            tracing::debug!(
                reported_income = %rpc.total_income,
                reported_expenses = %rpc.total_expenses,
                derived_income = %summary.total_income,
                derived_expenses = %summary.total_expenses,
                "summary rpc totals disagree with its buckets; using bucket sums"
            );
        }
        summary.net_profit = rpc.net_profit;
        summary
    }

    fn report(&self, source: SummarySource, summary: FinanceSummary) -> FinanceReport {
        FinanceReport {
            source,
            categories: self.aggregator.category_amounts(&summary),
            has_data: !summary.is_empty(),
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, ScriptedBackend};
    use chrono::NaiveDate;
    use core_types::{Category, RawRecord};
    use rust_decimal_macros::dec;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap()
    }

    fn resolver(backend: &Arc<ScriptedBackend>) -> FallbackResolver {
        FallbackResolver::new(backend.clone(), &Config::default())
    }

    fn reference_records() -> Vec<RawRecord> {
        vec![
            RawRecord {
                accruals_for_sale: dec!(1000),
                ..Default::default()
            },
            RawRecord {
                sale_commission: dec!(-150),
                ..Default::default()
            },
            RawRecord {
                operation_type_name: Some("Доставка".to_string()),
                amount: dec!(80),
                ..Default::default()
            },
        ]
    }

    #[tokio::test]
    async fn test_tier1_success_stops_the_chain() {
        let backend = Arc::new(ScriptedBackend {
            tier1: Some(vec![
                AggregateRow {
                    total_revenue: dec!(10000),
                    total_commission: dec!(-1500),
                    total_service_costs: dec!(1000),
                    total_payout: dec!(7400),
                },
                AggregateRow {
                    total_revenue: dec!(0),
                    total_commission: dec!(0),
                    total_service_costs: dec!(0),
                    total_payout: dec!(100),
                },
            ]),
            ..Default::default()
        });

        let report = resolver(&backend).resolve(&range(), &Filters::default()).await.unwrap();

        assert_eq!(backend.calls(), vec![Call::Tier1]);
        assert_eq!(report.source, SummarySource::MaterializedView);
        assert!(report.has_data);
        let s = &report.summary;
        assert_eq!(s.sales, dec!(10000));
        assert_eq!(s.commissions, dec!(1500));
        assert_eq!(s.delivery, dec!(300));
        assert_eq!(s.services, dec!(700));
        assert_eq!(s.returns, Decimal::ZERO);
        assert_eq!(s.total_income, dec!(10000));
        assert_eq!(s.total_expenses, dec!(2500));
        // Reported payout, not income minus expenses.
        assert_eq!(s.net_profit, dec!(7500));
        assert_eq!(report.categories.len(), 4);
        assert_eq!(report.categories[0].category, Category::Sales);
    }

    #[tokio::test]
    async fn test_tier1_failure_falls_through_to_tier2_without_merging() {
        let backend = Arc::new(ScriptedBackend {
            tier1: None,
            tier2: Some(RpcSummary {
                total_sales: dec!(2000),
                total_commissions: dec!(300),
                total_delivery: dec!(-120),
                total_returns: dec!(40),
                total_ads: dec!(90),
                total_services: dec!(50),
                total_income: dec!(2000),
                total_expenses: dec!(600),
                net_profit: dec!(1390),
            }),
            ..Default::default()
        });

        let report = resolver(&backend).resolve(&range(), &Filters::default()).await.unwrap();

        assert_eq!(backend.calls(), vec![Call::Tier1, Call::Tier2]);
        assert_eq!(report.source, SummarySource::SummaryRpc);
        let s = &report.summary;
        assert_eq!(s.delivery, dec!(120));
        assert_eq!(s.total_expenses, dec!(600));
        assert_eq!(s.net_profit, dec!(1390));
        // Tier 2 gets the same category list as every other tier.
        let order: Vec<_> = report.categories.iter().map(|c| c.category).collect();
        assert_eq!(
            order,
            vec![
                Category::Sales,
                Category::Commissions,
                Category::Delivery,
                Category::Ads,
                Category::Services,
                Category::Returns,
            ]
        );
    }

    #[tokio::test]
    async fn test_negative_rpc_sales_keep_shares_within_100() {
        let backend = Arc::new(ScriptedBackend {
            tier2: Some(RpcSummary {
                total_sales: dec!(-500),
                total_commissions: dec!(600),
                ..Default::default()
            }),
            ..Default::default()
        });

        let report = resolver(&backend).resolve(&range(), &Filters::default()).await.unwrap();

        assert_eq!(report.source, SummarySource::SummaryRpc);
        assert_eq!(report.categories.len(), 1);
        assert_eq!(report.categories[0].category, Category::Commissions);
        let mut total = Decimal::ZERO;
        for entry in &report.categories {
            assert!(entry.percentage <= dec!(100));
            total += entry.percentage;
        }
        assert!(total <= dec!(100));
    }

    #[tokio::test]
    async fn test_both_summaries_unavailable_runs_raw_tier() {
        let backend = Arc::new(ScriptedBackend {
            raw: Some(reference_records()),
            ..Default::default()
        });

        let report = resolver(&backend).resolve(&range(), &Filters::default()).await.unwrap();

        assert_eq!(
            backend.calls(),
            vec![Call::Tier1, Call::Tier2, Call::Raw { limit: 100 }]
        );
        assert_eq!(report.source, SummarySource::RawTransactions);
        let s = &report.summary;
        assert_eq!(
            *s,
            FinanceSummary {
                sales: dec!(1000),
                commissions: dec!(150),
                delivery: dec!(80),
                returns: dec!(0),
                ads: dec!(0),
                services: dec!(0),
                total_income: dec!(1000),
                total_expenses: dec!(230),
                net_profit: dec!(770),
            }
        );
        let slices: Vec<_> = report
            .categories
            .iter()
            .map(|c| (c.category, c.amount, c.percentage.round_dp(1)))
            .collect();
        assert_eq!(
            slices,
            vec![
                (Category::Sales, dec!(1000), dec!(81.3)),
                (Category::Commissions, dec!(150), dec!(12.2)),
                (Category::Delivery, dec!(80), dec!(6.5)),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_tier1_result_falls_through() {
        let backend = Arc::new(ScriptedBackend {
            tier1: Some(vec![]),
            raw: Some(vec![]),
            ..Default::default()
        });

        let report = resolver(&backend).resolve(&range(), &Filters::default()).await.unwrap();
        assert_eq!(report.source, SummarySource::RawTransactions);
    }

    #[tokio::test]
    async fn test_empty_raw_window_reports_no_data() {
        let backend = Arc::new(ScriptedBackend {
            raw: Some(vec![]),
            ..Default::default()
        });

        let report = resolver(&backend).resolve(&range(), &Filters::default()).await.unwrap();

        assert!(!report.has_data);
        assert_eq!(report.summary, FinanceSummary::default());
        assert!(report.categories.is_empty());
    }

    #[tokio::test]
    async fn test_raw_fetch_failure_is_fatal() {
        let backend = Arc::new(ScriptedBackend::default());

        let err = resolver(&backend)
            .resolve(&range(), &Filters::default())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::ApiClient(ApiError::Status { status: 500, .. })));
        assert_eq!(backend.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_attempt_reports_recoverable_errors() {
        let backend = Arc::new(ScriptedBackend::default());
        let resolver = resolver(&backend);

        let attempt = resolver
            .attempt(SummarySource::MaterializedView, &range(), &Filters::default())
            .await
            .unwrap();
        assert!(matches!(attempt, Attempt::Recoverable(ApiError::BackendUnavailable(_))));

        let attempt = resolver
            .attempt(SummarySource::SummaryRpc, &range(), &Filters::default())
            .await
            .unwrap();
        assert!(matches!(attempt, Attempt::Recoverable(ApiError::RpcUnavailable(_))));

        let fatal = resolver
            .attempt(SummarySource::RawTransactions, &range(), &Filters::default())
            .await;
        assert!(fatal.is_err());
    }

    #[tokio::test]
    async fn test_configured_sample_limit_and_delivery_share_are_used() {
        let backend = Arc::new(ScriptedBackend {
            raw: Some(vec![]),
            ..Default::default()
        });
        let mut config = Config::default();
        config.engine.raw_sample_limit = 25;
        config.engine.tier1_delivery_share = dec!(0.5);
        let resolver = FallbackResolver::new(backend.clone(), &config);

        resolver.resolve(&range(), &Filters::default()).await.unwrap();
        assert_eq!(
            backend.calls().last(),
            Some(&Call::Raw { limit: 25 })
        );

        let summary = resolver
            .from_aggregate_rows(&[AggregateRow {
                total_service_costs: dec!(-200),
                ..Default::default()
            }])
            .unwrap();
        assert_eq!(summary.delivery, dec!(100));
        assert_eq!(summary.services, dec!(100));
    }
}
