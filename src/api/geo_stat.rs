use async_graphql::{Context, Object, Result, SimpleObject};

use crate::{
    api::OrderFilter,
    dataset::{Dataset, GeoTable, Order},
};

// Approximate bounding box of Brazil; coordinates outside it are treated as
// geographically invalid and dropped.
const LAT_MIN: f64 = -33.751_169;
const LAT_MAX: f64 = 5.274_388;
const LNG_MIN: f64 = -73.982_830_5;
const LNG_MAX: f64 = -34.710_462;

#[derive(SimpleObject)]
pub(super) struct HeatmapPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(SimpleObject)]
pub(super) struct GeoStat {
    /// The number of heat-map points, duplicates included.
    point_count: usize,

    /// One point per filtered row whose zip prefix has coordinates inside
    /// the bounding box. Repeated coordinates are kept on purpose: they are
    /// the heat-map weight.
    points: Vec<HeatmapPoint>,
}

/// Inner join of the filtered rows to the deduplicated geolocation table on
/// zip prefix, restricted to the bounding box. Rows without a matching
/// prefix are dropped silently; they still count in every other view.
pub(super) fn compute(orders: &[Order], geolocations: &GeoTable) -> GeoStat {
    let points: Vec<HeatmapPoint> = orders
        .iter()
        .filter_map(|order| geolocations.coordinates(&order.customer_zip_code_prefix))
        .filter(|&(latitude, longitude)| {
            (LAT_MIN..=LAT_MAX).contains(&latitude) && (LNG_MIN..=LNG_MAX).contains(&longitude)
        })
        .map(|(latitude, longitude)| HeatmapPoint {
            latitude,
            longitude,
        })
        .collect();
    GeoStat {
        point_count: points.len(),
        points,
    }
}

#[derive(Default)]
pub(super) struct GeoStatQuery {}

#[Object]
impl GeoStatQuery {
    #[allow(clippy::unused_async)]
    async fn geo_stat(&self, ctx: &Context<'_>, filter: OrderFilter) -> Result<GeoStat> {
        let dataset = ctx.data::<Dataset>()?;
        Ok(compute(
            &filter.apply(dataset.orders()),
            dataset.geolocations(),
        ))
    }
}
