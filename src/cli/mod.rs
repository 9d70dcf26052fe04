use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use crate::application::{AppError, LedgerService, PaymentForm, Summary};
use crate::config::{parse_timezone, LedgerConfig, MonthScope, DEFAULT_STORE_PATH};
use crate::domain::{format_amount, PaymentMethod, TIMESTAMP_FORMAT};
use crate::io::{ExportFormat, Exporter};
use crate::storage::XlsxStore;

/// Salon Ledger - payment log for a hair salon
#[derive(Parser)]
#[command(name = "salon-ledger")]
#[command(about = "Record salon payments in a spreadsheet and see daily and monthly totals")]
#[command(version)]
pub struct Cli {
    /// Ledger spreadsheet path
    #[arg(short, long, global = true, default_value = DEFAULT_STORE_PATH)]
    pub file: PathBuf,

    /// IANA timezone used for timestamps, "today" and "this month"
    #[arg(long, global = true, default_value = "America/Argentina/Buenos_Aires")]
    pub timezone: String,

    /// Match the monthly total on month and year instead of month only
    #[arg(long, global = true)]
    pub calendar_month: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the ledger file if it does not exist
    Init,

    /// Record a payment
    Add {
        /// Client name
        #[arg(short, long, default_value = "")]
        client: String,

        /// Payment method: cash (efectivo) or transfer (transferencia)
        #[arg(short, long, default_value = "cash")]
        method: String,

        /// Amount paid (e.g., "1500" or "1500.50")
        #[arg(short, long, default_value = "")]
        amount: String,
    },

    /// Show today's totals per payment method and the monthly total
    Summary {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored payments
    List {
        /// Only today's payments
        #[arg(long)]
        today: bool,
    },

    /// Write today's payments to cierre_DD-MM-YYYY.xlsx
    Close {
        /// Directory for the closure file
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Export the whole ledger
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Format: xlsx (the stored file, unchanged) or csv
        #[arg(long, default_value = "xlsx")]
        format: String,
    },
}

impl Cli {
    pub fn config(&self) -> Result<LedgerConfig> {
        let timezone = parse_timezone(&self.timezone)?;
        let month_scope = if self.calendar_month {
            MonthScope::CalendarMonth
        } else {
            MonthScope::MonthOfYear
        };

        Ok(LedgerConfig::new(self.file.clone())
            .with_timezone(timezone)
            .with_month_scope(month_scope))
    }

    pub fn run(self) -> Result<()> {
        let config = self.config()?;

        // Every command but init starts from a fully initialized ledger
        match self.command {
            Commands::Init => {
                let service = LedgerService::new(XlsxStore::new(&config.store_path), config);
                if service.initialize()? {
                    println!("Ledger created: {}", self.file.display());
                } else {
                    println!("Ledger already exists: {}", self.file.display());
                }
            }

            Commands::Add {
                client,
                method,
                amount,
            } => {
                let service = LedgerService::open(config)?;
                let payment_method = PaymentMethod::from_str(&method).with_context(|| {
                    format!(
                        "Unknown payment method '{}'. Use 'cash' or 'transfer'",
                        method
                    )
                })?;
                let form = PaymentForm::new(client, payment_method, amount);

                match service.submit(&form) {
                    Ok(record) => {
                        println!(
                            "Payment saved: {} {} {} ({})",
                            record.client,
                            record.payment_method,
                            format_amount(record.amount),
                            record.timestamp.format(TIMESTAMP_FORMAT)
                        );
                    }
                    Err(AppError::MissingField(field)) => {
                        bail!("Fill in all fields (missing {})", field)
                    }
                    Err(AppError::InvalidAmount(reason)) => bail!("Invalid amount: {}", reason),
                    Err(e) => return Err(e.into()),
                }

                print_summary(&service.summary()?);
            }

            Commands::Summary { json } => {
                let service = LedgerService::open(config)?;
                let summary = service.summary()?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                } else {
                    print_summary(&summary);
                }
            }

            Commands::List { today } => {
                let service = LedgerService::open(config)?;
                let loaded = service.load()?;
                let day = service.now().date_naive();
                let rows = if today {
                    loaded.rows_on(day)
                } else {
                    loaded.ledger.rows().to_vec()
                };

                if rows.is_empty() {
                    println!("No payments found.");
                } else {
                    println!(
                        "{:<20} {:<24} {:<14} {:>12}",
                        "DATE", "CLIENT", "METHOD", "AMOUNT"
                    );
                    println!("{}", "-".repeat(73));
                    for row in rows {
                        let amount = row
                            .amount
                            .as_number()
                            .map(format_amount)
                            .unwrap_or_else(|| row.amount.to_string());
                        println!(
                            "{:<20} {:<24} {:<14} {:>12}",
                            row.timestamp, row.client, row.payment_method, amount
                        );
                    }
                }

                if !loaded.issues.is_empty() {
                    eprintln!();
                    for issue in &loaded.issues {
                        eprintln!("Warning: row {} ignored in totals: {}", issue.line, issue.error);
                    }
                }
            }

            Commands::Close { output_dir } => {
                let service = LedgerService::open(config)?;
                let exporter = Exporter::new(&service);
                match exporter.close_day(&output_dir)? {
                    Some(closure) => println!(
                        "Day closure written: {} ({} payments)",
                        closure.path.display(),
                        closure.rows
                    ),
                    None => println!("No payments recorded today, nothing to close."),
                }
            }

            Commands::Export { output, format } => {
                let format = ExportFormat::from_str(&format).with_context(|| {
                    format!("Unknown export format: {}. Use xlsx or csv", format)
                })?;
                if let Some(path) = &output {
                    if same_file(path, &config.store_path) {
                        bail!(
                            "Refusing to export onto the ledger itself: {}",
                            path.display()
                        );
                    }
                }
                let service = LedgerService::open(config)?;
                run_export_command(&service, output, format)?;
            }
        }

        Ok(())
    }
}

fn print_summary(summary: &Summary) {
    println!("Today ({})", summary.date.format("%d/%m/%Y"));
    println!("  {}", summary.daily_line());
    println!("This month");
    println!("  {}", summary.monthly_line());

    if summary.skipped_rows > 0 {
        eprintln!(
            "Warning: {} row(s) with an invalid date or value were ignored",
            summary.skipped_rows
        );
    }
}

fn run_export_command(
    service: &LedgerService,
    output: Option<PathBuf>,
    format: ExportFormat,
) -> Result<()> {
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    // Build the whole export before touching the output, so a failure leaves it as it was
    let mut buffer = Vec::new();
    let count = exporter.export_ledger(format, &mut buffer)?;

    match &output {
        Some(path) => {
            fs::write(path, &buffer)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            match format {
                ExportFormat::Xlsx => eprintln!("Exported ledger file ({} bytes)", count),
                ExportFormat::Csv => eprintln!("Exported {} rows", count),
            }
        }
        None => {
            let mut out = stdout().lock();
            out.write_all(&buffer)?;
            out.flush()?;
        }
    }

    Ok(())
}

/// Whether `a` and `b` name the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
