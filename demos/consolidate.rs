//! Consolidation example: CSV ledger in, summary or mismatch report out

use intercompany_consolidation::utils::{CsvLedger, CsvTaggedWriter};
use intercompany_consolidation::{ConsolidationError, Consolidator};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intercompany_consolidation=info".into()),
        )
        .init();

    let data_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/data");
    let source = CsvLedger::new(
        data_dir.join("transactions.csv"),
        data_dir.join("group_companies.txt"),
    );
    let output = std::env::temp_dir().join("tagged_transactions.csv");
    let mut sink = CsvTaggedWriter::new(&output);

    println!("Intercompany Consolidation Example\n");

    match Consolidator::new(source).run_with_sink(&mut sink).await {
        Ok(report) => {
            println!("All internal transactions are matched.\n");
            for pair in &report.pairs {
                println!(
                    "  {}: revenue {}, expense {} ({} records)",
                    pair.key, pair.revenue, pair.expense, pair.record_count
                );
            }

            println!("\nEliminations:");
            for elimination in &report.eliminations {
                println!(
                    "  {:?} {} {}",
                    elimination.entry_type, elimination.amount, elimination.description
                );
            }

            println!("\nUnadjusted totals (double counted):");
            println!("  Revenue:    {}", report.unadjusted.total_revenue);
            println!("  Expense:    {}", report.unadjusted.total_expense);
            println!("  Net Profit: {}", report.unadjusted.net_profit);

            println!("\nConsolidated Financial Summary:");
            println!("  Revenue:    {}", report.consolidated.total_revenue);
            println!("  Expense:    {}", report.consolidated.total_expense);
            println!("  Net Profit: {}", report.consolidated.net_profit);
        }
        Err(ConsolidationError::Mismatch(reports)) => {
            println!("Internal transaction mismatches detected:");
            for report in &reports {
                println!("  {}", report);
            }
            println!("\nNo consolidated summary was produced.");
        }
        Err(e) => return Err(e.into()),
    }

    println!("\nTagged transactions saved to: {}", output.display());
    Ok(())
}
