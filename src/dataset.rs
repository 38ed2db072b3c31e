pub(crate) mod geolocation;
pub(crate) mod order;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

pub(crate) use self::geolocation::{GeoTable, Geolocation};
pub(crate) use self::order::Order;

/// The in-memory order and geolocation tables, loaded once at startup.
///
/// Cloning is cheap; the underlying tables are shared and never mutated
/// after load.
#[derive(Clone)]
pub(crate) struct Dataset {
    orders: Arc<Vec<Order>>,
    geolocations: Arc<GeoTable>,
}

impl Dataset {
    /// Load and validate both CSV tables. Any malformed row fails the whole
    /// load; aggregations never see partially parsed data.
    pub(crate) fn load(orders_path: &Path, geolocations_path: &Path) -> Result<Dataset> {
        let orders = order::read_orders(orders_path)
            .with_context(|| format!("failed to load orders from {}", orders_path.display()))?;
        let geolocations = geolocation::read_geolocations(geolocations_path).with_context(|| {
            format!(
                "failed to load geolocations from {}",
                geolocations_path.display()
            )
        })?;
        let raw_geolocation_count = geolocations.len();
        let dataset = Dataset::from_records(orders, geolocations);
        info!(
            orders = dataset.orders.len(),
            geolocations = dataset.geolocations.len(),
            geolocation_duplicates = raw_geolocation_count - dataset.geolocations.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Build a dataset from already-parsed records. Orders are stably sorted
    /// by purchase timestamp; geolocations are deduplicated by zip prefix,
    /// first occurrence winning.
    pub(crate) fn from_records(mut orders: Vec<Order>, geolocations: Vec<Geolocation>) -> Dataset {
        orders.sort_by_key(|order| order.purchased_at);
        Dataset {
            orders: Arc::new(orders),
            geolocations: Arc::new(GeoTable::from_rows(geolocations)),
        }
    }

    pub(crate) fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub(crate) fn geolocations(&self) -> &GeoTable {
        &self.geolocations
    }

    /// Shared handle to the geolocation table, for aggregations that run on
    /// their own tasks.
    pub(crate) fn geolocations_handle(&self) -> Arc<GeoTable> {
        Arc::clone(&self.geolocations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_are_sorted_by_purchase_timestamp() {
        let dataset = Dataset::from_records(
            vec![
                order::tests::order("O2", "C1", "2018-01-10 09:00:00", 10.0),
                order::tests::order("O1", "C1", "2018-01-05 12:00:00", 5.0),
            ],
            Vec::new(),
        );
        let ids: Vec<_> = dataset
            .orders()
            .iter()
            .map(|order| order.order_id.as_str())
            .collect();
        assert_eq!(ids, ["O1", "O2"]);
    }

    #[test]
    fn empty_dataset_is_valid() {
        let dataset = Dataset::from_records(Vec::new(), Vec::new());
        assert!(dataset.orders().is_empty());
        assert_eq!(dataset.geolocations().len(), 0);
    }
}
