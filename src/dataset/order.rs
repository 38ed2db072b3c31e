use std::path::Path;

use anyhow::{bail, Context, Result};
use jiff::civil;
use serde::Deserialize;

/// Timestamp format used by both timestamp columns in the order CSV.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One order line item. `order_id` is NOT unique: a multi-item or
/// multi-installment order appears as several rows sharing the id, so
/// anything counting "orders" must count distinct ids.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Order {
    pub(crate) order_id: String,
    pub(crate) customer_unique_id: String,
    pub(crate) customer_zip_code_prefix: String,
    pub(crate) purchased_at: civil::DateTime,
    pub(crate) delivered_at: Option<civil::DateTime>,
    pub(crate) payment_value: f64,
    pub(crate) product_category: Option<String>,
    pub(crate) review_score: Option<u8>,
}

/// Raw CSV row; column names are the contract. Unknown extra columns in the
/// source file are ignored.
#[derive(Debug, Deserialize)]
struct OrderRow {
    order_id: String,
    customer_unique_id: String,
    customer_zip_code_prefix: String,
    order_purchase_timestamp: String,
    order_delivered_customer_date: Option<String>,
    payment_value: f64,
    product_category_name_english: Option<String>,
    review_score: Option<f64>,
}

impl TryFrom<OrderRow> for Order {
    type Error = anyhow::Error;

    fn try_from(row: OrderRow) -> Result<Order> {
        let purchased_at =
            parse_timestamp(&row.order_purchase_timestamp).context("order_purchase_timestamp")?;
        let delivered_at = row
            .order_delivered_customer_date
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .context("order_delivered_customer_date")?;
        if row.payment_value < 0.0 {
            bail!("negative payment_value: {}", row.payment_value);
        }
        let review_score = row
            .review_score
            .map(parse_review_score)
            .transpose()
            .context("review_score")?;
        Ok(Order {
            order_id: row.order_id,
            customer_unique_id: row.customer_unique_id,
            customer_zip_code_prefix: row.customer_zip_code_prefix,
            purchased_at,
            delivered_at,
            payment_value: row.payment_value,
            product_category: row.product_category_name_english,
            review_score,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<civil::DateTime> {
    civil::DateTime::strptime(TIMESTAMP_FORMAT, value)
        .with_context(|| format!("unparsable timestamp {value:?}"))
}

// The merged CSV stores review scores as floats ("4.0"), but the contract
// is an integer in 1..=5.
fn parse_review_score(value: f64) -> Result<u8> {
    if value.fract() != 0.0 || !(1.0..=5.0).contains(&value) {
        bail!("review_score out of range: {value}");
    }
    Ok(value as u8)
}

/// Read and validate the order table. Fails on the first malformed row with
/// its line number; line 1 is the header.
pub(crate) fn read_orders(path: &Path) -> Result<Vec<Order>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut orders = Vec::new();
    for (index, row) in reader.deserialize::<OrderRow>().enumerate() {
        let line = index + 2;
        let row = row.with_context(|| format!("malformed order row at line {line}"))?;
        let order =
            Order::try_from(row).with_context(|| format!("invalid order row at line {line}"))?;
        orders.push(order);
    }
    Ok(orders)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A minimal order row for tests: no delivery, no category, no review.
    pub(crate) fn order(
        order_id: &str,
        customer_unique_id: &str,
        purchased_at: &str,
        payment_value: f64,
    ) -> Order {
        Order {
            order_id: order_id.to_string(),
            customer_unique_id: customer_unique_id.to_string(),
            customer_zip_code_prefix: "01310".to_string(),
            purchased_at: parse_timestamp(purchased_at).unwrap(),
            delivered_at: None,
            payment_value,
            product_category: None,
            review_score: None,
        }
    }

    fn row(purchase: &str, delivered: Option<&str>, payment: f64, review: Option<f64>) -> OrderRow {
        OrderRow {
            order_id: "O1".to_string(),
            customer_unique_id: "C1".to_string(),
            customer_zip_code_prefix: "01310".to_string(),
            order_purchase_timestamp: purchase.to_string(),
            order_delivered_customer_date: delivered.map(str::to_string),
            payment_value: payment,
            product_category_name_english: None,
            review_score: review,
        }
    }

    #[test]
    fn valid_row_is_converted() {
        let order = Order::try_from(row(
            "2018-01-05 10:30:00",
            Some("2018-01-09 16:00:00"),
            35.5,
            Some(4.0),
        ))
        .unwrap();
        assert_eq!(order.purchased_at.date(), civil::date(2018, 1, 5));
        assert_eq!(
            order.delivered_at.map(|ts| ts.date()),
            Some(civil::date(2018, 1, 9))
        );
        assert_eq!(order.review_score, Some(4));
    }

    #[test]
    fn missing_delivery_and_review_are_allowed() {
        let order = Order::try_from(row("2018-01-05 10:30:00", None, 10.0, None)).unwrap();
        assert_eq!(order.delivered_at, None);
        assert_eq!(order.review_score, None);
    }

    #[test]
    fn unparsable_purchase_timestamp_is_rejected() {
        assert!(Order::try_from(row("05/01/2018 10:30", None, 10.0, None)).is_err());
    }

    #[test]
    fn unparsable_delivery_timestamp_is_rejected() {
        assert!(Order::try_from(row("2018-01-05 10:30:00", Some("not a date"), 10.0, None)).is_err());
    }

    #[test]
    fn negative_payment_is_rejected() {
        assert!(Order::try_from(row("2018-01-05 10:30:00", None, -1.0, None)).is_err());
    }

    #[test]
    fn fractional_or_out_of_range_review_score_is_rejected() {
        assert!(Order::try_from(row("2018-01-05 10:30:00", None, 10.0, Some(3.5))).is_err());
        assert!(Order::try_from(row("2018-01-05 10:30:00", None, 10.0, Some(0.0))).is_err());
        assert!(Order::try_from(row("2018-01-05 10:30:00", None, 10.0, Some(6.0))).is_err());
    }

    #[test]
    fn read_orders_reports_the_failing_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"order_id,customer_unique_id,customer_zip_code_prefix,order_purchase_timestamp,\
order_delivered_customer_date,payment_value,product_category_name_english,review_score\n\
O1,C1,01310,2018-01-05 10:30:00,,10.0,toys,4.0\n\
O2,C2,01310,bogus,,20.0,,\n",
        )
        .unwrap();
        let err = read_orders(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("line 3"));
    }

    #[test]
    fn read_orders_parses_optional_columns() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"order_id,customer_unique_id,customer_zip_code_prefix,order_purchase_timestamp,\
order_delivered_customer_date,payment_value,product_category_name_english,review_score\n\
O1,C1,01310,2018-01-05 10:30:00,2018-01-09 16:00:00,10.0,toys,4.0\n\
O2,C2,04001,2018-01-06 08:00:00,,20.0,,\n",
        )
        .unwrap();
        let orders = read_orders(file.path()).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].product_category.as_deref(), Some("toys"));
        assert_eq!(orders[1].product_category, None);
        assert_eq!(orders[1].review_score, None);
    }
}
