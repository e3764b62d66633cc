use anyhow::Context;
use chrono::{Days, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Table};
use configuration::{init_logging, load_config, load_config_from, ConfigOverrides};
use core_types::normalize::{business_day, format_day};
use core_types::{BreakdownRow, DateType, FinanceReport, Filters};
use engine::FinanceService;
use rust_decimal::Decimal;

/// The main entry point for the Finboard command-line client.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let result = run().await;
    if let Err(e) = &result {
        tracing::error!(error = ?e, "finboard failed");
    }
    result
}

async fn run() -> anyhow::Result<()> {
    // Load environment variables from .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = match &cli.overrides.config {
        Some(path) => load_config_from(path, true),
        None => load_config(),
    }
    .context("failed to load configuration")?;
    cli.overrides.apply(&mut config);

    let _log_guard = init_logging(&config.logging).context("failed to initialise logging")?;
    tracing::debug!(base_url = %config.backend.base_url, "finance backend configured");
    let service = FinanceService::from_config(&config).context("failed to build finance service")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Summary(args) => handle_summary(&service, args).await,
        Commands::Breakdown(args) => handle_breakdown(&service, args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Income/expense analytics for marketplace seller operations.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the income/expense summary and the category breakdown.
    Summary(QueryArgs),
    /// Show the most recent transactions with per-category contributions.
    Breakdown(QueryArgs),
}

#[derive(Args)]
struct QueryArgs {
    /// First day of the range (format: YYYY-MM-DD).
    #[arg(long, conflicts_with = "last_days")]
    from: Option<NaiveDate>,

    /// Last day of the range, inclusive (format: YYYY-MM-DD).
    #[arg(long, conflicts_with = "last_days")]
    to: Option<NaiveDate>,

    /// Use the N business days ending today (Moscow time) instead of --from/--to.
    #[arg(long)]
    last_days: Option<u32>,

    /// Which date column the range applies to.
    #[arg(long, default_value = "ship_date")]
    date_type: DateType,

    /// Restrict to a single SKU.
    #[arg(long)]
    sku: Option<i64>,

    /// Restrict to a single region.
    #[arg(long)]
    region: Option<String>,
}

impl QueryArgs {
    fn bounds(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match self.last_days {
            Some(days) => {
                let today = business_day(Utc::now());
                let span = Days::new(u64::from(days.max(1) - 1));
                (today.checked_sub_days(span), Some(today))
            }
            None => (self.from, self.to),
        }
    }

    fn filters(&self) -> Filters {
        Filters {
            date_type: self.date_type,
            sku: self.sku,
            region: self.region.clone(),
        }
    }
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_summary(service: &FinanceService, args: QueryArgs) -> anyhow::Result<()> {
    let (from, to) = args.bounds();
    let Some(report) = service.load_summary(from, to, &args.filters()).await? else {
        println!("Date range incomplete: both --from and --to are required.");
        return Ok(());
    };
    print_summary(&report);
    Ok(())
}

async fn handle_breakdown(service: &FinanceService, args: QueryArgs) -> anyhow::Result<()> {
    let (from, to) = args.bounds();
    let Some(rows) = service.load_breakdown(from, to, &args.filters()).await? else {
        println!("Date range incomplete: both --from and --to are required.");
        return Ok(());
    };
    print_breakdown(&rows);
    Ok(())
}

fn money(value: Decimal) -> Cell {
    Cell::new(value.round_dp(2)).set_alignment(CellAlignment::Right)
}

fn print_summary(report: &FinanceReport) {
    println!("Source: {}", report.source);
    if !report.has_data {
        println!("No financial data for the selected period.");
        return;
    }

    let s = &report.summary;
    let mut totals = Table::new();
    totals.load_preset(UTF8_FULL).set_header(vec!["Total", "Amount"]);
    totals.add_row(vec![Cell::new("Income"), money(s.total_income)]);
    totals.add_row(vec![Cell::new("Expenses"), money(s.total_expenses)]);
    totals.add_row(vec![Cell::new("Net profit"), money(s.net_profit)]);
    println!("{totals}");

    let mut categories = Table::new();
    categories
        .load_preset(UTF8_FULL)
        .set_header(vec!["Category", "Amount", "Share, %", "Color"]);
    for entry in &report.categories {
        categories.add_row(vec![
            Cell::new(&entry.label),
            money(entry.amount),
            money(entry.percentage),
            Cell::new(&entry.color),
        ]);
    }
    println!("{categories}");
}

fn print_breakdown(rows: &[BreakdownRow]) {
    if rows.is_empty() {
        println!("No transactions for the selected period.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Date", "Posting", "Sales", "Commissions", "Delivery", "Returns", "Ads", "Services",
        "Net", "Operation",
    ]);
    for row in rows {
        table.add_row(vec![
            Cell::new(row.date.map(format_day).unwrap_or_default()),
            Cell::new(row.posting_ref.as_deref().unwrap_or("-")),
            money(row.sales),
            money(row.commissions),
            money(row.delivery),
            money(row.returns),
            money(row.ads),
            money(row.services),
            money(row.net_profit),
            Cell::new(row.operation_type.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
    println!("{} most recent transactions shown.", rows.len());
}
