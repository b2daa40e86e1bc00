use super::super::parser::OrderRow;
use super::grouping::canonical_or_raw;
use crate::catalog::ProductNameNormalizer;
use std::io::Write;

const DETAIL_HEADERS: [&str; 4] = ["付款日期", "店铺类型", "商品类型", "订购数"];
const MISSING_VALUE: &str = "无";

/// Writes non-refunded rows with canonical product names as CSV and returns
/// the number of data rows written.
pub fn write_order_details<W: Write>(
    rows: &[OrderRow],
    normalizer: &ProductNameNormalizer,
    writer: W,
) -> Result<usize, csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(DETAIL_HEADERS)?;

    let mut written = 0;
    for row in rows.iter().filter(|row| !row.is_refunded) {
        let paid = row
            .payment_day()
            .unwrap_or_else(|| MISSING_VALUE.to_string());
        let shop = row.shop_type.as_deref().unwrap_or(MISSING_VALUE);
        let product = canonical_or_raw(row, normalizer);
        let count = row.order_count.to_string();

        csv_writer.write_record([paid.as_str(), shop, product.as_str(), count.as_str()])?;
        written += 1;
    }

    csv_writer.flush()?;
    Ok(written)
}
