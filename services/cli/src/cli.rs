use crate::commands::{
    run_export, run_group, run_normalize, run_product, run_report, run_rules, ExportArgs,
    GroupArgs, NormalizeArgs, ProductArgs, ReportArgs, RulesArgs,
};
use crate::infra::Context;
use clap::{Parser, Subcommand};
use sales_analytics::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "sales-analytics-cli",
    about = "Normalize product names and aggregate multi-channel order exports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the canonical name of each product name
    Normalize(NormalizeArgs),
    /// List the active product rule table
    Rules(RulesArgs),
    /// Net orders by product and shop type, plus category breakdowns
    Report(ReportArgs),
    /// Daily sales curve and channel split for one canonical product
    Product(ProductArgs),
    /// Gross order totals grouped by one column
    Group(GroupArgs),
    /// Write non-refunded rows with canonical names to a CSV file
    Export(ExportArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let context = Context::load()?;

    match cli.command {
        Command::Normalize(args) => run_normalize(&context, args),
        Command::Rules(args) => run_rules(&context, args),
        Command::Report(args) => run_report(&context, args),
        Command::Product(args) => run_product(&context, args),
        Command::Group(args) => run_group(&context, args),
        Command::Export(args) => run_export(&context, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sales_analytics::orders::report::GroupBy;
    use std::path::PathBuf;

    #[test]
    fn normalize_takes_several_names() {
        let cli = Cli::try_parse_from([
            "sales-analytics-cli",
            "normalize",
            "舰帽-58",
            "包-58CM",
            "--explain",
        ])
        .expect("arguments parse");
        let Command::Normalize(args) = cli.command else {
            panic!("expected normalize command");
        };
        assert_eq!(
            args.names,
            vec!["舰帽-58".to_string(), "包-58CM".to_string()]
        );
        assert!(args.explain);
        assert!(!args.json);
    }

    #[test]
    fn normalize_requires_a_name() {
        assert!(Cli::try_parse_from(["sales-analytics-cli", "normalize"]).is_err());
    }

    #[test]
    fn report_collects_repeated_categories() {
        let cli = Cli::try_parse_from([
            "sales-analytics-cli",
            "report",
            "--csv",
            "orders.csv",
            "--category",
            "帽子",
            "--category",
            "夹克",
        ])
        .expect("arguments parse");
        let Command::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.csv, PathBuf::from("orders.csv"));
        assert_eq!(args.category, vec!["帽子".to_string(), "夹克".to_string()]);
    }

    #[test]
    fn product_parses_date_bounds() {
        let cli = Cli::try_parse_from([
            "sales-analytics-cli",
            "product",
            "--csv",
            "orders.csv",
            "--name",
            "舰载熊猫公仔",
            "--start",
            "2025-03-01",
            "--end",
            "2025-03-07",
        ])
        .expect("arguments parse");
        let Command::Product(args) = cli.command else {
            panic!("expected product command");
        };
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid"));
        assert_eq!(args.end, NaiveDate::from_ymd_opt(2025, 3, 7).expect("valid"));
    }

    #[test]
    fn product_rejects_malformed_dates() {
        let result = Cli::try_parse_from([
            "sales-analytics-cli",
            "product",
            "--csv",
            "orders.csv",
            "--name",
            "熊猫",
            "--start",
            "03/01/2025",
            "--end",
            "2025-03-07",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn group_parses_the_grouping_column() {
        let cli = Cli::try_parse_from([
            "sales-analytics-cli",
            "group",
            "--csv",
            "orders.csv",
            "--by",
            "shop",
        ])
        .expect("arguments parse");
        let Command::Group(args) = cli.command else {
            panic!("expected group command");
        };
        assert_eq!(args.by, GroupBy::Shop);
    }
}
