use anyhow::Result;
use colored::*;
use contracts_validator::SchemaValidationError;
use serde_json::json;

use crate::OutputFormat;

pub fn print_passed(contract: &str, rows: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let output = json!({
                "contract": contract,
                "passed": true,
                "rows": rows,
                "errors": [],
            });
            println!("{}", output);
        }
        OutputFormat::Text => {
            print_header();
            println!(
                "\n{} {}",
                "✓".green().bold(),
                "Validation PASSED".green().bold()
            );
            println!("\n{}", "Summary:".bold());
            println!("  Contract:     {}", contract);
            println!("  Rows checked: {}", rows);
            println!("{}", "═".repeat(60));
        }
    }
}

pub fn print_failures(
    contract: &str,
    failures: &SchemaValidationError,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = json!({
                "contract": contract,
                "passed": false,
                "rows": failures.data().len(),
                "message": failures.message(),
                "errors": failures.errors(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            print_header();
            println!(
                "\n{} {}",
                "✗".red().bold(),
                "Validation FAILED".red().bold()
            );
            println!("\n{}", failures.message().red());
            println!("\n{}", failures.render_table());

            println!("\n{}", "Summary:".bold());
            println!("  Contract:      {}", contract);
            println!("  Rows checked:  {}", failures.data().len());
            println!("  Failure cases: {}", failures.failure_cases().len());
            println!("  Errors:        {}", failures.errors().len());
            println!("{}", "═".repeat(60));
        }
    }
    Ok(())
}

fn print_header() {
    println!("\n{}", "═".repeat(60));
    println!("{}", "  VALIDATION REPORT".bold());
    println!("{}", "═".repeat(60));
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}
