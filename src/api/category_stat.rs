use std::collections::BTreeMap;

use async_graphql::{Context, Object, Result, SimpleObject};

use crate::{
    api::OrderFilter,
    dataset::{Dataset, Order},
};

/// Group label for rows whose product has no category. Rows are never
/// dropped for lacking one.
pub(super) const UNKNOWN_CATEGORY: &str = "unknown";

#[derive(SimpleObject)]
pub(super) struct CategorySales {
    /// Product category name, or "unknown" when the source row has none.
    category: String,
    /// The number of rows (item occurrences) in the category. This is a
    /// row count, not a distinct-order count: each item in a multi-item
    /// order counts.
    order_count: usize,
}

#[derive(SimpleObject)]
pub(super) struct CategoryStat {
    /// Per-category sales ranking, descending by count. Equal counts come
    /// out in lexicographic category order.
    categories: Vec<CategorySales>,
}

pub(super) fn compute(orders: &[Order]) -> CategoryStat {
    let mut categories: Vec<CategorySales> = orders
        .iter()
        .fold(BTreeMap::new(), |mut acc, order| {
            let key = order.product_category.as_deref().unwrap_or(UNKNOWN_CATEGORY);
            *acc.entry(key).or_insert(0) += 1;
            acc
        })
        .into_iter()
        .map(|(category, order_count)| CategorySales {
            category: category.to_string(),
            order_count,
        })
        .collect();
    // Stable sort keeps the sorted group-key order for ties.
    categories.sort_by(|a, b| b.order_count.cmp(&a.order_count));
    CategoryStat { categories }
}

#[derive(Default)]
pub(super) struct CategoryStatQuery {}

#[Object]
impl CategoryStatQuery {
    #[allow(clippy::unused_async)]
    async fn category_stat(&self, ctx: &Context<'_>, filter: OrderFilter) -> Result<CategoryStat> {
        let dataset = ctx.data::<Dataset>()?;
        Ok(compute(&filter.apply(dataset.orders())))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        api::TestSchema,
        dataset::{order::tests::order, Order},
    };

    fn with_category(mut order: Order, category: &str) -> Order {
        order.product_category = Some(category.to_string());
        order
    }

    #[tokio::test]
    async fn counts_rows_per_category_descending() {
        let schema = TestSchema::with_orders(vec![
            with_category(order("O1", "C1", "2018-01-05 10:00:00", 10.0), "toys"),
            with_category(order("O1", "C1", "2018-01-05 10:00:00", 5.0), "toys"),
            with_category(order("O2", "C2", "2018-01-06 10:00:00", 20.0), "bed_bath"),
        ]);

        let query = "
        {
            categoryStat(filter: {}) {
                categories {
                    category
                    orderCount
                }
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(
            data["categoryStat"]["categories"],
            serde_json::json!([
                { "category": "toys", "orderCount": 2 },
                { "category": "bed_bath", "orderCount": 1 }
            ])
        );
    }

    #[tokio::test]
    async fn equal_counts_keep_lexicographic_order() {
        let schema = TestSchema::with_orders(vec![
            with_category(order("O1", "C1", "2018-01-05 10:00:00", 10.0), "toys"),
            with_category(order("O2", "C2", "2018-01-06 10:00:00", 20.0), "auto"),
            with_category(order("O3", "C3", "2018-01-07 10:00:00", 30.0), "garden"),
        ]);

        let query = "
        {
            categoryStat(filter: {}) {
                categories {
                    category
                }
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(
            data["categoryStat"]["categories"],
            serde_json::json!([
                { "category": "auto" },
                { "category": "garden" },
                { "category": "toys" }
            ])
        );
    }

    #[tokio::test]
    async fn missing_category_groups_under_unknown() {
        let schema = TestSchema::with_orders(vec![
            order("O1", "C1", "2018-01-05 10:00:00", 10.0),
            order("O2", "C2", "2018-01-06 10:00:00", 20.0),
            with_category(order("O3", "C3", "2018-01-07 10:00:00", 30.0), "toys"),
        ]);

        let query = "
        {
            categoryStat(filter: {}) {
                categories {
                    category
                    orderCount
                }
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(
            data["categoryStat"]["categories"],
            serde_json::json!([
                { "category": "unknown", "orderCount": 2 },
                { "category": "toys", "orderCount": 1 }
            ])
        );
    }

    #[tokio::test]
    async fn empty_input_yields_no_categories() {
        let schema = TestSchema::with_orders(Vec::new());

        let query = "
        {
            categoryStat(filter: {}) {
                categories {
                    category
                }
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(data["categoryStat"]["categories"], serde_json::json!([]));
    }
}
