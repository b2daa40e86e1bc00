mod channel;
mod parser;
pub mod report;

pub use channel::Channel;
pub use parser::OrderRow;

use crate::config::ColumnMapping;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub enum OrderImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn { column: String },
}

impl std::fmt::Display for OrderImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderImportError::Io(err) => write!(f, "failed to read order export: {}", err),
            OrderImportError::Csv(err) => write!(f, "invalid order CSV data: {}", err),
            OrderImportError::MissingColumn { column } => {
                write!(f, "order export has no '{}' column", column)
            }
        }
    }
}

impl std::error::Error for OrderImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrderImportError::Io(err) => Some(err),
            OrderImportError::Csv(err) => Some(err),
            OrderImportError::MissingColumn { .. } => None,
        }
    }
}

impl From<std::io::Error> for OrderImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for OrderImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads order exports into [`OrderRow`]s.
pub struct OrderImporter;

impl OrderImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        columns: &ColumnMapping,
    ) -> Result<Vec<OrderRow>, OrderImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, columns)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        columns: &ColumnMapping,
    ) -> Result<Vec<OrderRow>, OrderImportError> {
        let rows = parser::parse_rows(reader, columns)?;
        debug!(
            rows = rows.len(),
            refunded = rows.iter().filter(|row| row.is_refunded).count(),
            "parsed order export"
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;

    const HEADER: &str = "订单编号,商品名称,订购数,是否退款,店铺类型,付款时间,让利后金额\n";

    fn import(body: &str) -> Vec<OrderRow> {
        let csv = format!("{HEADER}{body}");
        OrderImporter::from_reader(Cursor::new(csv), &ColumnMapping::default())
            .expect("import succeeds")
    }

    #[test]
    fn parse_payment_date_supports_export_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
        for raw in [
            "2025-03-08 14:22:05",
            "2025-03-08 14:22",
            "2025/03/08 09:00:00",
            "2025-03-08",
            "2025/03/08",
            "2025-03-08T14:22:05+08:00",
            "45724",
            "45724.6",
        ] {
            assert_eq!(
                parser::parse_payment_date_for_tests(raw),
                Some(expected),
                "{raw}"
            );
        }

        assert!(parser::parse_payment_date_for_tests("  ").is_none());
        assert!(parser::parse_payment_date_for_tests("下周").is_none());
        assert!(parser::parse_payment_date_for_tests("-3").is_none());
    }

    #[test]
    fn unparseable_counts_default_to_zero() {
        assert_eq!(parser::parse_count_for_tests("3"), 3);
        assert_eq!(parser::parse_count_for_tests("2.0"), 2);
        assert_eq!(parser::parse_count_for_tests("abc"), 0);
        assert_eq!(parser::parse_count_for_tests("NaN"), 0);
    }

    #[test]
    fn out_of_range_counts_default_to_zero() {
        assert_eq!(parser::parse_count_for_tests("1e30"), 0);
        assert_eq!(parser::parse_count_for_tests("-1e30"), 0);
        assert_eq!(parser::parse_count_for_tests("inf"), 0);
        assert_eq!(parser::parse_count_for_tests("1e3"), 1000);

        let rows = import("A1,帽子,1e30\nA2,帽子,1e30\n");
        assert!(rows.iter().all(|row| row.order_count == 0));
    }

    #[test]
    fn refunded_minimum_count_does_not_overflow() {
        let rows = import(&format!("A1,帽子,{},退款成功\n", i64::MIN));
        assert_eq!(rows[0].order_count, i64::MIN);
        assert_eq!(rows[0].net_order_count(), i64::MAX);
    }

    #[test]
    fn rows_capture_refunds_channels_and_amounts() {
        let rows = import(
            "A1,舰帽--红-42,2,退款成功,抖音小店,2025-03-08 10:00:00,\"1,280.50\"\n\
A2,帽子-58, 3 ,,天猫旗舰店,,99\n",
        );
        assert_eq!(rows.len(), 2);

        let refunded = &rows[0];
        assert_eq!(refunded.product_name.as_deref(), Some("舰帽--红-42"));
        assert!(refunded.is_refunded);
        assert_eq!(refunded.net_order_count(), -2);
        assert_eq!(refunded.channel(), Channel::Douyin);
        assert_eq!(refunded.discounted_amount, 1280.5);
        assert_eq!(refunded.paid_on, NaiveDate::from_ymd_opt(2025, 3, 8));

        let sold = &rows[1];
        assert_eq!(sold.order_count, 3);
        assert!(!sold.is_refunded);
        assert_eq!(sold.channel(), Channel::Tmall);
        assert!(sold.paid_at.is_none());
    }

    #[test]
    fn short_rows_and_blank_cells_are_tolerated() {
        let rows = import("A1,,\nA2\n");
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.product_name.is_none()));
        assert!(rows.iter().all(|row| row.order_count == 0));
    }

    #[test]
    fn header_bom_is_ignored() {
        let csv = "\u{feff}商品名称,订购数\n熊猫抱枕,4\n";
        let rows = OrderImporter::from_reader(Cursor::new(csv), &ColumnMapping::default())
            .expect("import succeeds");
        assert_eq!(rows[0].order_count, 4);
    }

    #[test]
    fn missing_product_column_is_an_error() {
        let csv = "订购数,店铺类型\n1,天猫\n";
        let err = OrderImporter::from_reader(Cursor::new(csv), &ColumnMapping::default())
            .expect_err("missing column");
        match err {
            OrderImportError::MissingColumn { column } => assert_eq!(column, "商品名称"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn custom_column_labels_are_honoured() {
        let columns = ColumnMapping {
            product_name: "Product".to_string(),
            order_count: "Qty".to_string(),
            refund_status: "Refund".to_string(),
            refunded_marker: "refunded".to_string(),
            ..ColumnMapping::default()
        };
        let csv = "Product,Qty,Refund\nPanda plush,5,refunded\n";
        let rows = OrderImporter::from_reader(Cursor::new(csv), &columns).expect("import");
        assert_eq!(rows[0].product_name.as_deref(), Some("Panda plush"));
        assert!(rows[0].is_refunded);
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        let error = OrderImporter::from_path("./does-not-exist.csv", &ColumnMapping::default())
            .expect_err("expected io error");
        match error {
            OrderImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
