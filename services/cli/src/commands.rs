use crate::infra::{parse_date, parse_group_by, print_json, Context};
use chrono::NaiveDate;
use clap::Args;
use sales_analytics::catalog::NormalizationTrace;
use sales_analytics::error::AppError;
use sales_analytics::orders::report::{
    group_orders, write_order_details, CategoryReport, DateRange, GroupBy, ProductCategory,
    ProductDetail, SalesReport,
};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct NormalizeArgs {
    /// Raw product names to normalize
    #[arg(required = true)]
    pub(crate) names: Vec<String>,
    /// Show every rule that changed the name
    #[arg(long)]
    pub(crate) explain: bool,
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RulesArgs {
    /// Emit the table as a JSON rule file
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Order export (CSV)
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Category to break down; repeatable. Defaults to the standard categories.
    #[arg(long)]
    pub(crate) category: Vec<String>,
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ProductArgs {
    /// Order export (CSV)
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Canonical product name
    #[arg(long)]
    pub(crate) name: String,
    /// First payment date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) start: NaiveDate,
    /// Last payment date, inclusive (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) end: NaiveDate,
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct GroupArgs {
    /// Order export (CSV)
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Grouping column: date, shop, product or quantity
    #[arg(long, value_parser = parse_group_by)]
    pub(crate) by: GroupBy,
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Order export (CSV)
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Destination CSV file
    #[arg(long)]
    pub(crate) out: PathBuf,
}

#[derive(Serialize)]
struct NormalizedName<'a> {
    raw: &'a str,
    canonical: String,
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    sales: &'a SalesReport,
    categories: &'a [CategoryReport],
}

pub(crate) fn run_normalize(context: &Context, args: NormalizeArgs) -> Result<(), AppError> {
    let NormalizeArgs {
        names,
        explain,
        json,
    } = args;
    let normalizer = &context.normalizer;

    if explain {
        let traces: Vec<NormalizationTrace> =
            names.iter().map(|name| normalizer.explain(name)).collect();
        if json {
            return print_json(&traces);
        }
        for trace in &traces {
            println!("{} -> {}", trace.raw, trace.canonical);
            if trace.steps.is_empty() {
                println!("  (no rule applied)");
            }
            for step in &trace.steps {
                println!(
                    "  #{} {} '{}' => {}",
                    step.index,
                    step.kind.label(),
                    step.matcher,
                    step.result
                );
            }
        }
        return Ok(());
    }

    let normalized: Vec<NormalizedName<'_>> = names
        .iter()
        .map(|name| NormalizedName {
            raw: name,
            canonical: normalizer.normalize(name),
        })
        .collect();
    if json {
        return print_json(&normalized);
    }
    for entry in &normalized {
        println!("{}\t{}", entry.raw, entry.canonical);
    }
    Ok(())
}

pub(crate) fn run_rules(context: &Context, args: RulesArgs) -> Result<(), AppError> {
    let rules = context.normalizer.rules();
    if args.json {
        return print_json(&rules.specs());
    }

    println!("Active product rules ({})", rules.len());
    for (index, rule) in rules.rules().iter().enumerate() {
        match rule.mapped_name() {
            Some(mapped) => println!(
                "{:>4} {:<7} {} -> {}",
                index,
                rule.kind().label(),
                rule.matcher(),
                mapped
            ),
            None => println!("{:>4} {:<7} {}", index, rule.kind().label(), rule.matcher()),
        }
    }

    let shadowed = rules.shadowed_rules();
    if !shadowed.is_empty() {
        println!("\nRules that can never match");
        for entry in &shadowed {
            println!(
                "- #{} {} '{}' (always preceded by #{})",
                entry.index,
                entry.kind.label(),
                entry.matcher,
                entry.shadowed_by
            );
        }
    }
    Ok(())
}

pub(crate) fn run_report(context: &Context, args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        csv,
        category,
        json,
    } = args;
    let rows = context.load_orders(&csv)?;
    let normalizer = &context.normalizer;

    let sales = SalesReport::build(&rows, normalizer);
    let categories: Vec<ProductCategory> = if category.is_empty() {
        ProductCategory::standard()
    } else {
        category
            .iter()
            .map(|name| ProductCategory::resolve(name))
            .collect()
    };
    let breakdowns: Vec<CategoryReport> = categories
        .iter()
        .map(|category| CategoryReport::build(&rows, normalizer, category))
        .collect();

    if json {
        return print_json(&ReportOutput {
            sales: &sales,
            categories: &breakdowns,
        });
    }

    println!(
        "Net orders by product ({} products, {} orders)",
        sales.products.len(),
        sales.total_net_orders()
    );
    for product in &sales.products {
        println!(
            "- {}: {} | {}",
            product.name,
            product.net_orders,
            product.shop_types.join(", ")
        );
    }

    println!("\nNet orders by shop type");
    for shop in &sales.shops {
        println!("- {}: {}", shop.shop_type, shop.net_orders);
    }

    for breakdown in &breakdowns {
        println!("\nCategory {}", breakdown.category.name);
        if breakdown.is_empty() {
            println!("  (no orders)");
        }
        for entry in &breakdown.entries {
            println!(
                "  - {}: {} orders | {:.2}",
                entry.name, entry.order_count, entry.discounted_amount
            );
        }
    }
    Ok(())
}

pub(crate) fn run_product(context: &Context, args: ProductArgs) -> Result<(), AppError> {
    let ProductArgs {
        csv,
        name,
        start,
        end,
        json,
    } = args;
    let range = DateRange::new(start, end)?;
    let rows = context.load_orders(&csv)?;

    let detail = ProductDetail::build(&rows, &context.normalizer, name.trim(), range);
    if json {
        return print_json(&detail);
    }

    println!(
        "{} from {} to {}",
        detail.product,
        detail.range.start(),
        detail.range.end()
    );
    println!(
        "- {} units | {:.2} total | {:.2} average order value",
        detail.total_quantity, detail.total_amount, detail.average_order_value
    );
    println!("Daily sales:");
    for day in &detail.sales_curve {
        println!("  - {}: {} units | {:.2}", day.date, day.quantity, day.amount);
    }
    println!("Channels:");
    for channel in &detail.channel_sales {
        println!("  - {}: {}", channel.label, channel.quantity);
    }
    Ok(())
}

pub(crate) fn run_group(context: &Context, args: GroupArgs) -> Result<(), AppError> {
    let GroupArgs { csv, by, json } = args;
    let rows = context.load_orders(&csv)?;

    let groups = group_orders(&rows, &context.normalizer, by);
    if json {
        return print_json(&groups);
    }

    println!("Orders by {}", by.label());
    for entry in &groups {
        println!("- {}: {}", entry.key, entry.orders);
    }
    Ok(())
}

pub(crate) fn run_export(context: &Context, args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs { csv, out } = args;
    let rows = context.load_orders(&csv)?;

    let writer = BufWriter::new(File::create(&out)?);
    let written = write_order_details(&rows, &context.normalizer, writer)?;
    info!(path = %out.display(), rows = written, "wrote order details");
    println!("Wrote {} rows to {}", written, out.display());
    Ok(())
}
