pub(crate) mod category_stat;
pub(crate) mod dashboard;
pub(crate) mod dataset_stat;
pub(crate) mod geo_stat;
pub(crate) mod order_stat;
pub(crate) mod review_stat;
pub(crate) mod rfm_stat;

use async_graphql::{
    EmptyMutation, EmptySubscription, InputObject, InputValueError, InputValueResult, MergedObject,
    Scalar, ScalarType, Value,
};
use jiff::civil;

use crate::dataset::{Dataset, Order};

/// A set of queries defined in the schema.
///
/// This is exposed only for [`Schema`], and not used directly.
#[derive(Default, MergedObject)]
pub(crate) struct Query(
    category_stat::CategoryStatQuery,
    dashboard::DashboardQuery,
    dataset_stat::DatasetStatQuery,
    geo_stat::GeoStatQuery,
    order_stat::OrderStatQuery,
    review_stat::ReviewStatQuery,
    rfm_stat::RfmStatQuery,
);

pub(crate) type Schema = async_graphql::Schema<Query, EmptyMutation, EmptySubscription>;

/// A calendar date without a time component, e.g. "2018-01-05".
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy)]
pub(crate) struct Date(pub(crate) civil::Date);

#[Scalar]
impl ScalarType for Date {
    fn parse(value: Value) -> InputValueResult<Self> {
        match &value {
            Value::String(s) => Ok(Date(s.parse()?)),
            _ => Err(InputValueError::expected_type(value)),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.0.to_string())
    }
}

/// The purchase-date range restriction shared by every analytical view.
///
/// Both bounds are inclusive calendar dates; an absent bound leaves that
/// side unbounded. A reversed range (`startDate` after `endDate`) is not an
/// error and simply matches nothing.
#[derive(InputObject, Debug)]
pub(crate) struct OrderFilter {
    /// Start of the purchase date range. (inclusive)
    /// Example format: "2018-01-05"
    start_date: Option<Date>,
    /// End of the purchase date range. (inclusive)
    /// Example format: "2018-01-31"
    end_date: Option<Date>,
}

impl OrderFilter {
    /// Rows whose purchase date falls inside the range, in their original
    /// order.
    pub(crate) fn apply(&self, orders: &[Order]) -> Vec<Order> {
        orders
            .iter()
            .filter(|order| {
                let purchase_date = order.purchased_at.date();
                self.start_date
                    .as_ref()
                    .is_none_or(|start| purchase_date >= start.0)
                    && self
                        .end_date
                        .as_ref()
                        .is_none_or(|end| purchase_date <= end.0)
            })
            .cloned()
            .collect()
    }
}

pub(crate) fn schema(dataset: Dataset) -> Schema {
    Schema::build(Query::default(), EmptyMutation, EmptySubscription)
        .data(dataset)
        .finish()
}

#[cfg(test)]
struct TestSchema {
    schema: Schema,
}

#[cfg(test)]
impl TestSchema {
    fn new(orders: Vec<Order>, geolocations: Vec<crate::dataset::Geolocation>) -> Self {
        let dataset = Dataset::from_records(orders, geolocations);
        Self {
            schema: schema(dataset),
        }
    }

    fn with_orders(orders: Vec<Order>) -> Self {
        Self::new(orders, Vec::new())
    }

    async fn execute(&self, query: &str) -> async_graphql::Response {
        let request: async_graphql::Request = query.into();
        self.schema.execute(request).await
    }
}
