use configuration::CategoryCatalog;
use core_types::{Category, CategoryAmount, ClassifiedAmount, FinanceSummary};
use rust_decimal::Decimal;

/// A stateless calculator folding classified amounts into a summary and the
/// chart slices shown next to it.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    catalog: CategoryCatalog,
}

impl Aggregator {
    pub fn new(catalog: CategoryCatalog) -> Self {
        Self { catalog }
    }

    /// The main entry point: sums the buckets, derives the totals and builds
    /// the sorted category list.
    pub fn aggregate(
        &self,
        classified: &[ClassifiedAmount],
    ) -> (FinanceSummary, Vec<CategoryAmount>) {
        let summary = self.summarize(classified);
        let categories = self.category_amounts(&summary);
        (summary, categories)
    }

    /// Sales are summed signed; the five expense buckets are summed as
    /// magnitudes. `net_profit` is income minus expenses.
    pub fn summarize(&self, classified: &[ClassifiedAmount]) -> FinanceSummary {
        let mut buckets = [Decimal::ZERO; 6];
        for item in classified {
            let slot = &mut buckets[item.category as usize];
            *slot += if item.category.is_income() {
                item.amount
            } else {
                item.amount.abs()
            };
        }
        let [sales, commissions, delivery, returns, ads, services] = buckets;
        FinanceSummary::from_buckets(sales, commissions, delivery, returns, ads, services)
    }

    /// Builds chart slices from any summary, whichever tier produced it.
    ///
    /// Only buckets strictly above zero are listed: a category is presented by
    /// its net contribution, so net sales of zero or less are left out even
    /// when sale transactions exist. Percentages are taken over
    /// `total_income + total_expenses`, with negative income counted as zero
    /// so that no slice exceeds 100; they are zero when that is not positive.
    /// The list is sorted by amount, largest first, ties in display order.
    pub fn category_amounts(&self, summary: &FinanceSummary) -> Vec<CategoryAmount> {
        let denominator = summary.total_income.max(Decimal::ZERO) + summary.total_expenses;

        let mut amounts: Vec<CategoryAmount> = Category::ALL
            .into_iter()
            .map(|category| (category, summary.bucket(category)))
            .filter(|(_, amount)| *amount > Decimal::ZERO)
            .map(|(category, amount)| CategoryAmount {
                category,
                label: self.catalog.label(category).to_string(),
                amount,
                percentage: percentage_of(amount, denominator),
                color: self.catalog.color(category).to_string(),
            })
            .collect();

        amounts.sort_by(|a, b| {
            b.amount
                .cmp(&a.amount)
                .then_with(|| a.category.cmp(&b.category))
        });
        amounts
    }
}

fn percentage_of(amount: Decimal, denominator: Decimal) -> Decimal {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    amount / denominator * Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(category: Category, amount: Decimal) -> ClassifiedAmount {
        ClassifiedAmount::new(category, amount)
    }

    #[test]
    fn test_reference_example() {
        let aggregator = Aggregator::default();
        let (summary, categories) = aggregator.aggregate(&[
            item(Category::Sales, dec!(1000)),
            item(Category::Commissions, dec!(150)),
            item(Category::Delivery, dec!(80)),
        ]);

        assert_eq!(summary.sales, dec!(1000));
        assert_eq!(summary.commissions, dec!(150));
        assert_eq!(summary.delivery, dec!(80));
        assert_eq!(summary.returns, Decimal::ZERO);
        assert_eq!(summary.total_income, dec!(1000));
        assert_eq!(summary.total_expenses, dec!(230));
        assert_eq!(summary.net_profit, dec!(770));

        let order: Vec<_> = categories.iter().map(|c| c.category).collect();
        assert_eq!(order, vec![Category::Sales, Category::Commissions, Category::Delivery]);
        let pct: Vec<_> = categories.iter().map(|c| c.percentage.round_dp(1)).collect();
        assert_eq!(pct, vec![dec!(81.3), dec!(12.2), dec!(6.5)]);
        assert_eq!(categories[0].label, "Продажи");
        assert_eq!(categories[0].color, "#10b981");
    }

    #[test]
    fn test_total_expenses_is_sum_of_expense_buckets() {
        let aggregator = Aggregator::default();
        let summary = aggregator.summarize(&[
            item(Category::Commissions, dec!(10.10)),
            item(Category::Delivery, dec!(20.20)),
            item(Category::Returns, dec!(30.30)),
            item(Category::Ads, dec!(40.40)),
            item(Category::Services, dec!(50.50)),
            item(Category::Services, dec!(0.05)),
        ]);
        let expected: Decimal = Category::EXPENSES.iter().map(|c| summary.bucket(*c)).sum();
        assert_eq!(summary.total_expenses, expected);
        assert_eq!(summary.total_expenses, dec!(151.55));
    }

    #[test]
    fn test_percentages_match_formula_and_stay_within_100() {
        let aggregator = Aggregator::default();
        let (summary, categories) = aggregator.aggregate(&[
            item(Category::Sales, dec!(333)),
            item(Category::Ads, dec!(111)),
            item(Category::Services, dec!(7)),
        ]);
        let denominator = summary.total_income + summary.total_expenses;
        let mut total = Decimal::ZERO;
        for entry in &categories {
            assert_eq!(entry.percentage, entry.amount / denominator * dec!(100));
            assert!(entry.percentage >= Decimal::ZERO && entry.percentage <= dec!(100));
            total += entry.percentage;
        }
        assert!(total.round_dp(10) <= dec!(100));
    }

    #[test]
    fn test_non_positive_net_sales_are_not_listed() {
        let aggregator = Aggregator::default();
        let (summary, categories) = aggregator.aggregate(&[
            item(Category::Sales, dec!(100)),
            item(Category::Sales, dec!(-100)),
            item(Category::Commissions, dec!(15)),
        ]);
        assert_eq!(summary.sales, Decimal::ZERO);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].category, Category::Commissions);
        assert_eq!(categories[0].percentage, dec!(100));
    }

    #[test]
    fn test_negative_income_does_not_inflate_expense_shares() {
        let aggregator = Aggregator::default();
        let summary = FinanceSummary::from_buckets(
            dec!(-500),
            dec!(600),
            dec!(200),
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
        );
        let categories = aggregator.category_amounts(&summary);

        let pct: Vec<_> = categories.iter().map(|c| (c.category, c.percentage)).collect();
        assert_eq!(pct, vec![(Category::Commissions, dec!(75)), (Category::Delivery, dec!(25))]);
    }

    #[test]
    fn test_ties_follow_display_order() {
        let aggregator = Aggregator::default();
        let (_, categories) = aggregator.aggregate(&[
            item(Category::Services, dec!(50)),
            item(Category::Ads, dec!(50)),
            item(Category::Delivery, dec!(50)),
            item(Category::Sales, dec!(10)),
        ]);
        let order: Vec<_> = categories.iter().map(|c| c.category).collect();
        assert_eq!(
            order,
            vec![Category::Delivery, Category::Ads, Category::Services, Category::Sales]
        );
    }

    #[test]
    fn test_expense_magnitudes_are_absolute() {
        let aggregator = Aggregator::default();
        let summary = aggregator.summarize(&[item(Category::Returns, dec!(-25))]);
        assert_eq!(summary.returns, dec!(25));
        assert_eq!(summary.net_profit, dec!(-25));
    }

    #[test]
    fn test_empty_input_yields_empty_summary() {
        let aggregator = Aggregator::default();
        let (summary, categories) = aggregator.aggregate(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary, FinanceSummary::default());
        assert!(categories.is_empty());
    }
}
