use std::collections::{BTreeMap, HashSet};

use async_graphql::{Context, Object, Result, SimpleObject};
use jiff::civil;
use num_traits::ToPrimitive;

use crate::{
    api::OrderFilter,
    dataset::{Dataset, Order},
};

#[derive(SimpleObject)]
pub(super) struct RfmEntry {
    customer_unique_id: String,
    /// Whole days between the customer's last purchase and the latest
    /// purchase date in the filtered range. Never negative.
    recency: i64,
    /// The number of distinct orders the customer placed.
    frequency: usize,
    /// The customer's summed payment value across all rows.
    monetary: f64,
}

#[derive(SimpleObject)]
pub(super) struct RfmStat {
    /// The number of distinct customers in the filtered range.
    customer_count: usize,

    /// The average recency in days.
    avg_recency: Option<f64>,

    /// The average distinct-order count per customer.
    avg_frequency: Option<f64>,

    /// The average summed payment value per customer.
    avg_monetary: Option<f64>,

    /// One entry per distinct customer, in customer-id order. Consumers
    /// re-sort for display (top-N by recency, frequency or monetary).
    customers: Vec<RfmEntry>,
}

/// The recency reference point: the latest purchase date in the filtered
/// range. `None` over an empty table.
fn latest_purchase_date(orders: &[Order]) -> Option<civil::Date> {
    orders.iter().map(|order| order.purchased_at.date()).max()
}

/// Per-customer recency, frequency and monetary aggregates against an
/// explicit reference date, so the computation stays a pure function of its
/// inputs.
fn rfm_rows(orders: &[Order], reference: civil::Date) -> Vec<RfmEntry> {
    orders
        .iter()
        .fold(
            BTreeMap::<&str, (civil::Date, HashSet<&str>, f64)>::new(),
            |mut acc, order| {
                let purchase_date = order.purchased_at.date();
                let entry = acc
                    .entry(order.customer_unique_id.as_str())
                    .or_insert_with(|| (purchase_date, HashSet::new(), 0.0));
                entry.0 = entry.0.max(purchase_date);
                entry.1.insert(order.order_id.as_str());
                entry.2 += order.payment_value;
                acc
            },
        )
        .into_iter()
        .map(
            |(customer, (last_purchase, order_ids, monetary))| RfmEntry {
                customer_unique_id: customer.to_string(),
                recency: i64::from((reference - last_purchase).get_days()),
                frequency: order_ids.len(),
                monetary,
            },
        )
        .collect()
}

pub(super) fn compute(orders: &[Order]) -> RfmStat {
    let customers = match latest_purchase_date(orders) {
        Some(reference) => rfm_rows(orders, reference),
        None => Vec::new(),
    };
    let count = customers.len().to_f64().filter(|count| *count > 0.0);
    let avg = |total: f64| count.map(|count| total / count);
    RfmStat {
        customer_count: customers.len(),
        avg_recency: avg(customers.iter().map(|c| c.recency as f64).sum()),
        avg_frequency: avg(customers.iter().map(|c| c.frequency as f64).sum()),
        avg_monetary: avg(customers.iter().map(|c| c.monetary).sum()),
        customers,
    }
}

#[derive(Default)]
pub(super) struct RfmStatQuery {}

#[Object]
impl RfmStatQuery {
    #[allow(clippy::unused_async)]
    async fn rfm_stat(&self, ctx: &Context<'_>, filter: OrderFilter) -> Result<RfmStat> {
        let dataset = ctx.data::<Dataset>()?;
        Ok(compute(&filter.apply(dataset.orders())))
    }
}
