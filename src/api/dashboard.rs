use std::sync::Arc;

use async_graphql::{Context, Object, Result};
use tokio::task;

use super::{category_stat, geo_stat, order_stat, review_stat, rfm_stat};
use crate::{
    api::OrderFilter,
    dataset::{Dataset, GeoTable, Order},
};

#[derive(Default)]
pub(super) struct DashboardQuery {}

#[Object]
impl DashboardQuery {
    /// Applies the range filter once and fans out to the five analytical
    /// views over the same snapshot.
    #[allow(clippy::unused_async)]
    async fn dashboard(&self, ctx: &Context<'_>, filter: OrderFilter) -> Result<Dashboard> {
        let dataset = ctx.data::<Dataset>()?;
        Ok(Dashboard {
            orders: Arc::new(filter.apply(dataset.orders())),
            geolocations: dataset.geolocations_handle(),
        })
    }
}

/// The filtered order snapshot shared by the five views.
///
/// Each field runs its aggregation on a blocking task, and sibling fields
/// resolve independently: one view's failure surfaces as that field's error
/// without blocking the others.
pub(super) struct Dashboard {
    orders: Arc<Vec<Order>>,
    geolocations: Arc<GeoTable>,
}

#[Object]
impl Dashboard {
    /// Daily order-count and revenue time series.
    async fn order_stat(&self) -> Result<order_stat::OrderStat> {
        let orders = Arc::clone(&self.orders);
        run(move || order_stat::compute(&orders)).await
    }

    /// Per-category sales ranking.
    async fn category_stat(&self) -> Result<category_stat::CategoryStat> {
        let orders = Arc::clone(&self.orders);
        run(move || category_stat::compute(&orders)).await
    }

    /// Review-score histogram.
    async fn review_stat(&self) -> Result<review_stat::ReviewStat> {
        let orders = Arc::clone(&self.orders);
        run(move || review_stat::compute(&orders)).await
    }

    /// Per-customer recency/frequency/monetary table.
    async fn rfm_stat(&self) -> Result<rfm_stat::RfmStat> {
        let orders = Arc::clone(&self.orders);
        run(move || rfm_stat::compute(&orders)).await
    }

    /// Heat-map input points.
    async fn geo_stat(&self) -> Result<geo_stat::GeoStat> {
        let orders = Arc::clone(&self.orders);
        let geolocations = Arc::clone(&self.geolocations);
        run(move || geo_stat::compute(&orders, &geolocations)).await
    }
}

async fn run<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    Ok(task::spawn_blocking(f)
        .await
        .map_err(|e| format!("aggregation task failed: {e}"))?)
}
