use crate::enums::{Category, DateType, SummarySource};
use crate::error::CoreError;
use crate::normalize::format_day;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An inclusive calendar-day range. Both bounds are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, CoreError> {
        if from > to {
            return Err(CoreError::InvertedRange {
                from: format_day(from),
                to: format_day(to),
            });
        }
        Ok(Self { from, to })
    }

    /// Builds a range from optional bounds.
    ///
    /// Returns `Ok(None)` when either bound is missing: the query is simply
    /// not runnable yet, which is not an error.
    pub fn from_bounds(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Option<Self>, CoreError> {
        match (from, to) {
            (Some(from), Some(to)) => Self::new(from, to).map(Some),
            _ => Ok(None),
        }
    }

    pub fn from_day(&self) -> String {
        format_day(self.from)
    }

    pub fn to_day(&self) -> String {
        format_day(self.to)
    }
}

/// Optional narrowing of a finance query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filters {
    pub date_type: DateType,
    pub sku: Option<i64>,
    pub region: Option<String>,
}

/// A single normalized row from the raw transaction-detail source.
///
/// Every numeric field has already been coerced: anything missing, null or
/// non-numeric on the wire is zero here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub operation_date: Option<NaiveDateTime>,
    pub posting_number: Option<String>,
    pub operation_type_name: Option<String>,
    pub sku: Option<i64>,
    pub accruals_for_sale: Decimal,
    pub sale_commission: Decimal,
    pub delivery_charge: Decimal,
    pub return_delivery_charge: Decimal,
    pub amount: Decimal,
}

impl RawRecord {
    /// The operation name lower-cased for keyword matching; empty if absent.
    pub fn operation_text(&self) -> String {
        self.operation_type_name
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default()
    }
}

/// The outcome of classifying one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedAmount {
    pub category: Category,
    /// Signed for sales, an absolute magnitude for every other category.
    pub amount: Decimal,
}

impl ClassifiedAmount {
    pub fn new(category: Category, amount: Decimal) -> Self {
        Self { category, amount }
    }
}

/// Income/expense totals for one query.
///
/// `total_income` is always the sales bucket and `total_expenses` the sum of
/// the five expense buckets. `net_profit` depends on the tier that produced
/// the summary (see [`SummarySource`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    pub sales: Decimal,
    pub commissions: Decimal,
    pub delivery: Decimal,
    pub returns: Decimal,
    pub ads: Decimal,
    pub services: Decimal,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
}

impl FinanceSummary {
    /// Builds a summary from the six buckets, deriving the totals.
    /// `net_profit` is set to income minus expenses; callers whose source
    /// reports its own figure overwrite it.
    pub fn from_buckets(
        sales: Decimal,
        commissions: Decimal,
        delivery: Decimal,
        returns: Decimal,
        ads: Decimal,
        services: Decimal,
    ) -> Self {
        let total_expenses = commissions + delivery + returns + ads + services;
        Self {
            sales,
            commissions,
            delivery,
            returns,
            ads,
            services,
            total_income: sales,
            total_expenses,
            net_profit: sales - total_expenses,
        }
    }

    pub fn bucket(&self, category: Category) -> Decimal {
        match category {
            Category::Sales => self.sales,
            Category::Commissions => self.commissions,
            Category::Delivery => self.delivery,
            Category::Returns => self.returns,
            Category::Ads => self.ads,
            Category::Services => self.services,
        }
    }

    /// True when every bucket is exactly zero.
    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.bucket(*c).is_zero())
    }
}

/// One slice of the category breakdown chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub category: Category,
    pub label: String,
    pub amount: Decimal,
    /// Share of `total_income + total_expenses`, in `[0, 100]`.
    pub percentage: Decimal,
    pub color: String,
}

/// One raw record projected for the detail table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub date: Option<NaiveDate>,
    pub posting_ref: Option<String>,
    pub sales: Decimal,
    pub commissions: Decimal,
    pub delivery: Decimal,
    pub returns: Decimal,
    pub ads: Decimal,
    pub services: Decimal,
    pub net_profit: Decimal,
    pub operation_type: Option<String>,
}

/// The result handed to the caller: which tier answered, the summary, and the
/// chart slices derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceReport {
    pub source: SummarySource,
    pub summary: FinanceSummary,
    pub categories: Vec<CategoryAmount>,
    /// False when every bucket is zero; the caller renders an empty state.
    pub has_data: bool,
}
