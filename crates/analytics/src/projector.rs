use configuration::CategoryCatalog;
use core_types::{BreakdownRow, Category, RawRecord};
use rust_decimal::Decimal;

/// Rows shown in the detail table when no other limit is configured.
pub const DEFAULT_BREAKDOWN_LIMIT: usize = 100;

/// Projects raw records into per-row contributions for the detail table.
///
/// Unlike the [`Categorizer`](crate::Categorizer), a row may contribute to
/// several columns at once: each structured field is read straight into its
/// own column. Ads and services are derived from `|amount|`, ads when the
/// operation name carries an ads keyword, services when no structured field
/// is set and the name mentions neither delivery nor ads.
///
/// Only the most recent `limit` records by operation time are kept. There is
/// no paging; callers that page do it over this window.
#[derive(Debug, Clone)]
pub struct BreakdownProjector {
    catalog: CategoryCatalog,
    limit: usize,
}

impl Default for BreakdownProjector {
    fn default() -> Self {
        Self::new(CategoryCatalog::default(), DEFAULT_BREAKDOWN_LIMIT)
    }
}

impl BreakdownProjector {
    pub fn new(catalog: CategoryCatalog, limit: usize) -> Self {
        Self { catalog, limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn project(&self, records: &[RawRecord]) -> Vec<BreakdownRow> {
        let mut ordered: Vec<&RawRecord> = records.iter().collect();
        // Newest first; undated rows sink to the bottom. Stable for equal times.
        ordered.sort_by(|a, b| b.operation_date.cmp(&a.operation_date));
        ordered
            .into_iter()
            .take(self.limit)
            .map(|record| self.project_one(record))
            .collect()
    }

    pub fn project_one(&self, record: &RawRecord) -> BreakdownRow {
        let text = record.operation_text();
        let magnitude = record.amount.abs();

        let has_structured = [
            record.accruals_for_sale,
            record.sale_commission,
            record.delivery_charge,
            record.return_delivery_charge,
        ]
        .iter()
        .any(|v| !v.is_zero());
        let ads_tagged = self.catalog.matches(Category::Ads, &text);
        let delivery_tagged = self.catalog.matches(Category::Delivery, &text);

        BreakdownRow {
            date: record.operation_date.map(|ts| ts.date()),
            posting_ref: record.posting_number.clone(),
            sales: record.accruals_for_sale,
            commissions: record.sale_commission.abs(),
            delivery: record.delivery_charge.abs(),
            returns: record.return_delivery_charge.abs(),
            ads: if ads_tagged { magnitude } else { Decimal::ZERO },
            services: if !has_structured && !ads_tagged && !delivery_tagged {
                magnitude
            } else {
                Decimal::ZERO
            },
            net_profit: record.amount,
            operation_type: record.operation_type_name.clone(),
        }
    }
}
