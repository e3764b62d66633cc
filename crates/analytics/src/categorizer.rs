use configuration::CategoryCatalog;
use core_types::{Category, ClassifiedAmount, RawRecord};
use rust_decimal::Decimal;

/// Order in which the operation name is tested against the keyword table.
const KEYWORD_ORDER: [Category; 6] = Category::ALL;

/// Assigns every raw record to exactly one financial category.
///
/// Rules are evaluated strictly in order and the first match wins:
///
/// 1. Structured fields: positive `accruals_for_sale` is sales (amount kept
///    signed); otherwise a non-zero `sale_commission`, `delivery_charge` or
///    `return_delivery_charge` (in that order) gives commissions, delivery or
///    returns with the absolute value.
/// 2. Keywords: the lower-cased operation name is tested against the catalog
///    in display order. A services hit is ignored when the text also names
///    delivery. The amount is `|amount|`.
/// 3. Catch-all: a positive `amount` with no other signal is services.
///
/// Anything left over is reported as services with a zero amount, so the
/// function stays total while contributing nothing to the totals.
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    catalog: CategoryCatalog,
}

impl Categorizer {
    pub fn new(catalog: CategoryCatalog) -> Self {
        Self { catalog }
    }

    pub fn classify(&self, record: &RawRecord) -> ClassifiedAmount {
        if let Some(classified) = Self::classify_structured(record) {
            return classified;
        }

        let text = record.operation_text();
        if let Some(category) = self.classify_text(&text) {
            return ClassifiedAmount::new(category, record.amount.abs());
        }

        if record.amount > Decimal::ZERO {
            return ClassifiedAmount::new(Category::Services, record.amount);
        }

        tracing::trace!(
            posting = record.posting_number.as_deref().unwrap_or("-"),
            operation = %text,
            "record has no classifiable signal"
        );
        ClassifiedAmount::new(Category::Services, Decimal::ZERO)
    }

    /// Classifies a batch, preserving order.
    pub fn classify_all(&self, records: &[RawRecord]) -> Vec<ClassifiedAmount> {
        records.iter().map(|r| self.classify(r)).collect()
    }

    fn classify_structured(record: &RawRecord) -> Option<ClassifiedAmount> {
        if record.accruals_for_sale > Decimal::ZERO {
            return Some(ClassifiedAmount::new(Category::Sales, record.accruals_for_sale));
        }
        let magnitude_fields = [
            (Category::Commissions, record.sale_commission),
            (Category::Delivery, record.delivery_charge),
            (Category::Returns, record.return_delivery_charge),
        ];
        magnitude_fields
            .into_iter()
            .find(|(_, value)| !value.is_zero())
            .map(|(category, value)| ClassifiedAmount::new(category, value.abs()))
    }

    /// First category whose keywords occur in `text` (already lower-cased).
    pub fn classify_text(&self, text: &str) -> Option<Category> {
        KEYWORD_ORDER.into_iter().find(|category| match category {
            Category::Services => {
                self.catalog.matches(Category::Services, text)
                    && !self.catalog.matches(Category::Delivery, text)
            }
            other => self.catalog.matches(*other, text),
        })
    }
}
