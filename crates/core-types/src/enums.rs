use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the six mutually exclusive financial buckets.
///
/// Variant order is the fixed display order and doubles as the tie-break
/// order when two buckets carry the same amount, so `Ord` is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sales,
    Commissions,
    Delivery,
    Returns,
    Ads,
    Services,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Category; 6] = [
        Category::Sales,
        Category::Commissions,
        Category::Delivery,
        Category::Returns,
        Category::Ads,
        Category::Services,
    ];

    /// The five expense buckets, i.e. everything except sales.
    pub const EXPENSES: [Category; 5] = [
        Category::Commissions,
        Category::Delivery,
        Category::Returns,
        Category::Ads,
        Category::Services,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sales => "sales",
            Category::Commissions => "commissions",
            Category::Delivery => "delivery",
            Category::Returns => "returns",
            Category::Ads => "ads",
            Category::Services => "services",
        }
    }

    /// Sales is the only income bucket.
    pub fn is_income(&self) -> bool {
        matches!(self, Category::Sales)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::InvalidInput("category".to_string(), s.to_string()))
    }
}

/// Which date column the date range filters on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateType {
    #[default]
    ShipDate,
    DeliveryDate,
    OrderDate,
}

impl DateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateType::ShipDate => "ship_date",
            DateType::DeliveryDate => "delivery_date",
            DateType::OrderDate => "order_date",
        }
    }
}

impl fmt::Display for DateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ship_date" => Ok(DateType::ShipDate),
            "delivery_date" => Ok(DateType::DeliveryDate),
            "order_date" => Ok(DateType::OrderDate),
            other => Err(CoreError::InvalidInput("date type".to_string(), other.to_string())),
        }
    }
}

/// The backend tier that produced a summary.
///
/// `net_profit` semantics differ per source: the first two report it from the
/// backend, the raw-transaction tier derives it as income minus expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    MaterializedView,
    SummaryRpc,
    RawTransactions,
}

impl SummarySource {
    pub fn tier(&self) -> u8 {
        match self {
            SummarySource::MaterializedView => 1,
            SummarySource::SummaryRpc => 2,
            SummarySource::RawTransactions => 3,
        }
    }
}

impl fmt::Display for SummarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SummarySource::MaterializedView => "materialized view",
            SummarySource::SummaryRpc => "summary rpc",
            SummarySource::RawTransactions => "raw transactions",
        };
        write!(f, "tier {} ({})", self.tier(), name)
    }
}
