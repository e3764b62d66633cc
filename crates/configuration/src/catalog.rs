use core_types::Category;
use serde::{Deserialize, Serialize};

/// Presentation and classification settings for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStyle {
    pub label: String,
    /// Colour token handed to the chart layer.
    pub color: String,
    /// Substrings matched against the lower-cased operation name.
    pub keywords: Vec<String>,
}

impl CategoryStyle {
    fn new(label: &str, color: &str, keywords: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            color: color.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// `text` must already be lower-cased.
    pub fn matches(&self, text: &str) -> bool {
        !text.is_empty()
            && self
                .keywords
                .iter()
                .any(|k| !k.is_empty() && text.contains(k.to_lowercase().as_str()))
    }
}

/// The label, colour and bilingual keyword table for every category.
///
/// This is plain data owned by whoever classifies or aggregates, so tests can
/// swap in their own table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryCatalog {
    pub sales: CategoryStyle,
    pub commissions: CategoryStyle,
    pub delivery: CategoryStyle,
    pub returns: CategoryStyle,
    pub ads: CategoryStyle,
    pub services: CategoryStyle,
}

impl CategoryCatalog {
    pub fn style(&self, category: Category) -> &CategoryStyle {
        match category {
            Category::Sales => &self.sales,
            Category::Commissions => &self.commissions,
            Category::Delivery => &self.delivery,
            Category::Returns => &self.returns,
            Category::Ads => &self.ads,
            Category::Services => &self.services,
        }
    }

    pub fn label(&self, category: Category) -> &str {
        &self.style(category).label
    }

    pub fn color(&self, category: Category) -> &str {
        &self.style(category).color
    }

    /// Whether the lower-cased `text` contains any keyword of `category`.
    pub fn matches(&self, category: Category, text: &str) -> bool {
        self.style(category).matches(text)
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self {
            sales: CategoryStyle::new("Продажи", "#10b981", &["продаж", "sale", "оплат", "payment"]),
            commissions: CategoryStyle::new("Комиссии", "#f59e0b", &["комисс", "commission", "сбор", "fee"]),
            delivery: CategoryStyle::new("Доставка", "#3b82f6", &["доставк", "delivery", "логистик", "shipping"]),
            returns: CategoryStyle::new("Возвраты", "#ef4444", &["возврат", "return", "отмен", "cancel"]),
            ads: CategoryStyle::new("Реклама", "#8b5cf6", &["реклам", "ads", "продвиж", "promotion"]),
            services: CategoryStyle::new("Услуги", "#6b7280", &["услуг", "service", "обслуж", "processing"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keywords_are_bilingual() {
        let catalog = CategoryCatalog::default();
        assert!(catalog.matches(Category::Delivery, "доставка товара"));
        assert!(catalog.matches(Category::Delivery, "last mile shipping"));
        assert!(catalog.matches(Category::Ads, "оплата продвижения"));
        assert!(!catalog.matches(Category::Returns, "продажа"));
    }

    #[test]
    fn test_empty_text_never_matches() {
        let catalog = CategoryCatalog::default();
        for category in Category::ALL {
            assert!(!catalog.matches(category, ""));
        }
    }

    #[test]
    fn test_keywords_match_case_insensitively() {
        let mut catalog = CategoryCatalog::default();
        catalog.ads.keywords = vec!["PROMO".to_string()];
        assert!(catalog.matches(Category::Ads, "promo campaign"));
    }
}
