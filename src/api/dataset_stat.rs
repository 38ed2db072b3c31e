use std::collections::HashSet;

use async_graphql::{Context, Object, Result, SimpleObject};

use crate::{api::Date, dataset::Dataset};

#[derive(SimpleObject)]
pub(super) struct DatasetStat {
    /// The number of order rows (line items), not distinct orders.
    row_count: usize,

    /// The number of distinct order ids.
    order_count: usize,

    /// The number of distinct customers.
    customer_count: usize,

    /// The earliest purchase date in the dataset. Together with
    /// `lastPurchaseDate` it bounds the date-range picker.
    first_purchase_date: Option<Date>,

    /// The latest purchase date in the dataset.
    last_purchase_date: Option<Date>,

    /// The number of deduplicated geolocation entries.
    geolocation_count: usize,
}

#[derive(Default)]
pub(super) struct DatasetStatQuery {}

#[Object]
impl DatasetStatQuery {
    /// Summary of the whole loaded dataset, unaffected by any range filter.
    #[allow(clippy::unused_async)]
    async fn dataset_stat(&self, ctx: &Context<'_>) -> Result<DatasetStat> {
        let dataset = ctx.data::<Dataset>()?;
        let orders = dataset.orders();
        let order_count = orders
            .iter()
            .map(|order| order.order_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        let customer_count = orders
            .iter()
            .map(|order| order.customer_unique_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        // Orders are sorted by purchase timestamp at load.
        Ok(DatasetStat {
            row_count: orders.len(),
            order_count,
            customer_count,
            first_purchase_date: orders.first().map(|order| Date(order.purchased_at.date())),
            last_purchase_date: orders.last().map(|order| Date(order.purchased_at.date())),
            geolocation_count: dataset.geolocations().len(),
        })
    }
}
