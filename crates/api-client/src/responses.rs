use core_types::normalize::{coerce_decimal, coerce_optional, parse_timestamp};
use core_types::RawRecord;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// Every numeric field is optional on the wire and may be a number, a numeric
// string or null. `lenient_decimal` folds all of that into a Decimal (zero
// when unusable) so the typed rows below never fail on a bad number.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(coerce_optional(value.as_ref()))
}

/// One row of the tier 1 materialized aggregate view (usually one per day).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AggregateRow {
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_revenue: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_commission: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_service_costs: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_payout: Decimal,
}

/// The tier 2 `get_finance_summary` result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RpcSummary {
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_sales: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_commissions: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_delivery: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_returns: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_ads: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_services: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_income: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_expenses: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub net_profit: Decimal,
}

/// Arguments of the tier 2 procedure call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcSummaryParams {
    pub start_date: String,
    pub end_date: String,
    pub date_type: String,
    pub sku_filter: Option<i64>,
    pub region_filter: Option<String>,
}

/// A procedure returning a row set comes back as an array, a scalar record
/// as a bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    // Must be tried first: a struct would also accept a sequence.
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_first(self) -> Option<T> {
        match self {
            OneOrMany::One(item) => Some(item),
            OneOrMany::Many(items) => items.into_iter().next(),
        }
    }
}

/// A row from the raw transaction-detail source exactly as it arrives.
///
/// Nothing is trusted here; [`TransactionRow::into_record`] is the only way
/// these fields reach the rest of the system.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionRow {
    #[serde(default, alias = "operation_date")]
    pub operation_date_msk: Option<Value>,
    #[serde(default)]
    pub posting_number: Option<Value>,
    #[serde(default)]
    pub operation_type_name: Option<Value>,
    #[serde(default)]
    pub sku: Option<Value>,
    #[serde(default)]
    pub accruals_for_sale: Option<Value>,
    #[serde(default)]
    pub sale_commission: Option<Value>,
    #[serde(default)]
    pub delivery_charge: Option<Value>,
    #[serde(default)]
    pub return_delivery_charge: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
}

impl TransactionRow {
    /// Normalizes the wire row into a `RawRecord`: numbers are coerced (zero
    /// when absent or garbage), text is kept only when it is non-empty text,
    /// and the timestamp is parsed into business-local time.
    pub fn into_record(self) -> RawRecord {
        RawRecord {
            operation_date: self
                .operation_date_msk
                .as_ref()
                .and_then(Value::as_str)
                .and_then(parse_timestamp),
            posting_number: text_of(self.posting_number),
            operation_type_name: text_of(self.operation_type_name),
            sku: self.sku.as_ref().and_then(integer_of),
            accruals_for_sale: coerce_optional(self.accruals_for_sale.as_ref()),
            sale_commission: coerce_optional(self.sale_commission.as_ref()),
            delivery_charge: coerce_optional(self.delivery_charge.as_ref()),
            return_delivery_charge: coerce_optional(self.return_delivery_charge.as_ref()),
            amount: coerce_optional(self.amount.as_ref()),
        }
    }
}

fn text_of(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn integer_of(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    // Numeric strings and whole floats such as "123" or 123.0 still identify a SKU.
    let d = coerce_decimal(value);
    if d.is_zero() || !d.fract().is_zero() {
        return None;
    }
    d.to_i64()
}
