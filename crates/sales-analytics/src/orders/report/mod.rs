mod category;
mod detail;
mod export;
mod grouping;
mod sales;

pub use category::{CategoryEntry, CategoryReport, ProductCategory};
pub use detail::{ChannelSales, DailySales, DateRange, ProductDetail, ReportError};
pub use export::write_order_details;
pub use grouping::{group_orders, GroupBy, GroupEntry};
pub use sales::{ProductSales, SalesReport, ShopOrders};
