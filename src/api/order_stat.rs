use std::collections::{BTreeMap, HashSet};

use async_graphql::{Context, Object, Result, SimpleObject};

use crate::{
    api::{Date, OrderFilter},
    dataset::{Dataset, Order},
};

#[derive(SimpleObject)]
pub(super) struct DailyOrders {
    /// Calendar day of purchase.
    date: Date,
    /// The number of distinct orders purchased that day.
    order_count: usize,
    /// The sum of payment values over all rows that day. A multi-item order
    /// contributes each row's payment.
    revenue: f64,
}

#[derive(SimpleObject)]
pub(super) struct OrderStat {
    /// The number of distinct orders in the range, summed per day.
    total_order_count: usize,

    /// The total revenue in the range.
    total_revenue: f64,

    /// The daily time series, ascending by day. Days with no orders produce
    /// no row; a continuous calendar axis is the renderer's concern.
    daily_orders: Vec<DailyOrders>,
}

/// Daily rollup of the filtered rows: distinct order count and summed
/// payment value per calendar day of purchase.
pub(super) fn compute(orders: &[Order]) -> OrderStat {
    let daily_orders: Vec<DailyOrders> = orders
        .iter()
        .fold(BTreeMap::new(), |mut acc, order| {
            let entry = acc
                .entry(order.purchased_at.date())
                .or_insert_with(|| (HashSet::new(), 0.0));
            entry.0.insert(order.order_id.as_str());
            entry.1 += order.payment_value;
            acc
        })
        .into_iter()
        .map(|(date, (order_ids, revenue))| DailyOrders {
            date: Date(date),
            order_count: order_ids.len(),
            revenue,
        })
        .collect();

    OrderStat {
        total_order_count: daily_orders.iter().map(|day| day.order_count).sum(),
        total_revenue: daily_orders.iter().map(|day| day.revenue).sum(),
        daily_orders,
    }
}

#[derive(Default)]
pub(super) struct OrderStatQuery {}

#[Object]
impl OrderStatQuery {
    #[allow(clippy::unused_async)]
    async fn order_stat(&self, ctx: &Context<'_>, filter: OrderFilter) -> Result<OrderStat> {
        let dataset = ctx.data::<Dataset>()?;
        Ok(compute(&filter.apply(dataset.orders())))
    }
}
