//! Stocksync CLI - Reconcile a Shopify catalog against supplier feeds
//!
//! # Main Commands
//!
//! ```bash
//! stocksync serve                                        # Start HTTP server (port 3000)
//! stocksync inventory -i inventory.csv --vendor unicorn=unicorn.csv
//! stocksync update -p products.csv --vendor reydon=reydon.zip
//! stocksync add -p products.csv --vendor blitz=blitz.csv
//! stocksync swap-options -p products.csv
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! stocksync vendors                 # List registered vendors
//! stocksync detect feed.csv         # Guess which vendor a file belongs to
//! stocksync parse feed.csv          # Parse a CSV (or zip) to JSON
//! ```

use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use stocksync::api::logs::LOG_BROADCASTER;
use stocksync::parser::load_file;
use stocksync::{
    parse_bytes, run_operation, version_label, InputFile, Operation, ParseOptions, ReconcileError,
    RunControl, RunInputs, RunOptions, RunResult, RunToken, VendorRegistry,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "stocksync", version)]
#[command(about = "Reconcile a Shopify catalog against supplier stock and product feeds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "STOCKSYNC_PORT", default_value = "3000")]
        port: u16,
    },

    /// List registered vendors and what they manage
    Vendors,

    /// Guess which vendor a supplier file belongs to from its headers
    Detect {
        /// Input CSV or zip file
        input: PathBuf,
    },

    /// Parse a CSV (or zipped CSV) file and output JSON
    Parse {
        /// Input CSV or zip file
        input: PathBuf,

        /// Apply this vendor's parsing switches (forced headers, HTML decoding)
        #[arg(long)]
        vendor: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Update on-hand quantities in a Shopify inventory export
    Inventory {
        /// Shopify inventory export(s)
        #[arg(short, long = "inventory", required = true)]
        inventory: Vec<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Update prices, barcodes, tags and images in a Shopify product export
    Update {
        /// Shopify product export(s)
        #[arg(short, long = "products", required = true)]
        products: Vec<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Add supplier products missing from a Shopify product export
    Add {
        /// Shopify product export(s)
        #[arg(short, long = "products", required = true)]
        products: Vec<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Swap Size / Colour options to Colour / Size
    SwapOptions {
        /// Shopify product export(s)
        #[arg(short, long = "products", required = true)]
        products: Vec<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },
}

/// Options shared by the reconciliation commands.
#[derive(Args)]
struct RunArgs {
    /// Supplier file as NAME=PATH (repeatable)
    #[arg(long = "vendor", value_name = "NAME=PATH", value_parser = parse_vendor_arg)]
    vendors: Vec<(String, PathBuf)>,

    /// Cap applied to every supplier quantity
    #[arg(long, env = "STOCKSYNC_MAX_QUANTITY", default_value_t = RunOptions::default().max_quantity)]
    max_quantity: i64,

    /// Overwrite main and variant images even when already set
    #[arg(long)]
    update_images: bool,

    /// Overwrite product descriptions with the supplier's
    #[arg(long)]
    update_descriptions: bool,

    /// Show debug logs
    #[arg(short, long)]
    verbose: bool,

    /// Output file or directory (default: current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RunArgs {
    fn options(&self) -> RunOptions {
        RunOptions {
            max_quantity: self.max_quantity,
            update_images: self.update_images,
            update_descriptions: self.update_descriptions,
            verbose: self.verbose,
        }
    }
}

fn parse_vendor_arg(raw: &str) -> Result<(String, PathBuf), String> {
    match raw.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=PATH, got '{}'", raw)),
    }
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port } => cmd_serve(port).await,
        Commands::Vendors => cmd_vendors(),
        Commands::Detect { input } => cmd_detect(&input).await,
        Commands::Parse { input, vendor, output } => {
            cmd_parse(&input, vendor.as_deref(), output.as_deref()).await
        }
        Commands::Inventory { inventory, run } => {
            cmd_run(Operation::Inventory, inventory, Vec::new(), run).await
        }
        Commands::Update { products, run } => {
            cmd_run(Operation::UpdateProducts, Vec::new(), products, run).await
        }
        Commands::Add { products, run } => cmd_run(Operation::AddProducts, Vec::new(), products, run).await,
        Commands::SwapOptions { products, run } => {
            cmd_run(Operation::SwapOptions, Vec::new(), products, run).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(port: u16) -> CliResult {
    stocksync::server::start_server(port).await?;
    Ok(())
}

fn cmd_vendors() -> CliResult {
    let registry = VendorRegistry::new();
    eprintln!("📋 Registered vendors ({}):\n", registry.list().len());
    for vendor in registry.list() {
        let mut manages = Vec::new();
        if vendor.update_inventory {
            manages.push("inventory");
        }
        if vendor.update_products {
            manages.push("update");
        }
        if vendor.add_products {
            manages.push("add");
        }
        println!("  📄 {} ({})", vendor.name, vendor.import_label);
        println!("     Operations: {}", manages.join(", "));
        println!("     Headers: {}", vendor.expected_headers.join(", "));
        println!();
    }
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

async fn cmd_detect(input: &Path) -> CliResult {
    eprintln!("🔍 Detecting vendor for: {}", input.display());

    let (name, bytes) = load_file(&InputFile::from_path(input), &RunToken::new()).await?;
    let parsed = parse_bytes(&bytes, &ParseOptions::default())?;
    eprintln!("   File: {}", name);
    eprintln!("   Columns: {}", parsed.table.headers.join(", "));

    let registry = VendorRegistry::new();
    let found = registry.find_compatible(&parsed.table.headers);
    if found.is_empty() {
        eprintln!("❌ No vendor recognises these headers");
        return Ok(());
    }
    for (vendor, score) in found {
        println!("  {:>5.0}%  {}", score * 100.0, vendor.name);
    }
    Ok(())
}

async fn cmd_parse(input: &Path, vendor: Option<&str>, output: Option<&Path>) -> CliResult {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let registry = VendorRegistry::new();
    let options = match vendor {
        Some(name) => {
            let vendor = registry
                .get(name)
                .ok_or_else(|| ReconcileError::UnknownVendor(name.to_string()))?;
            ParseOptions {
                force_headers: vendor.force_headers,
                html_decode: vendor.html_decode,
            }
        }
        None => ParseOptions::default(),
    };

    let (_, bytes) = load_file(&InputFile::from_path(input), &RunToken::new()).await?;
    let result = parse_bytes(&bytes, &options)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(result.delimiter));
    eprintln!("   Columns: {}", result.table.headers.join(", "));
    eprintln!("✅ Parsed {} records", result.table.len());

    let json = serde_json::to_string_pretty(&result.table.records)?;
    write_output(&json, output)?;

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> CliResult {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

/// Where to write an operation's file: into `output` when it is a
/// directory, to `output` itself otherwise, else the current directory.
fn output_path(output: Option<&Path>, file_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}

async fn cmd_run(operation: Operation, inventory: Vec<PathBuf>, products: Vec<PathBuf>, args: RunArgs) -> CliResult {
    eprintln!("📦 Stocksync {} - {}", version_label(), operation);
    LOG_BROADCASTER.set_verbose(args.verbose);

    let registry = VendorRegistry::new();
    let mut inputs = RunInputs::new().with_options(args.options());
    inputs.inventory = inventory.iter().map(InputFile::from_path).collect();
    inputs.products = products.iter().map(InputFile::from_path).collect();
    for (name, path) in &args.vendors {
        inputs = inputs.with_vendor(name.as_str(), InputFile::from_path(path));
    }

    let control = RunControl::new();
    let (inputs, registry) = (&inputs, &registry);
    let result = control
        .run(operation.as_str(), |token| async move {
            // Ctrl-C stops the run at its next checkpoint.
            let watcher = token.clone();
            let ctrl_c = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!("\n⚠️  Cancelling...");
                    watcher.cancel();
                }
            });
            let result = run_operation(operation, inputs, registry, &token).await;
            ctrl_c.abort();
            result
        })
        .await;

    match result {
        Ok(result) => report(result, args.output.as_deref()),
        Err(ReconcileError::Cancelled) => Err("run cancelled, no file written".into()),
        Err(e) => Err(e.user_message().into()),
    }
}

fn report(result: RunResult, output: Option<&Path>) -> CliResult {
    eprintln!("\n{}", "=".repeat(70));
    eprintln!("📊 SUMMARY");
    eprintln!("{}", "=".repeat(70));
    for vendor in &result.report.vendors {
        eprintln!(
            "   {:<18} read {:>6}  matched {:>6}  not found {:>6}  skipped {:>5}  changed {:>5}",
            vendor.vendor, vendor.records, vendor.matched, vendor.not_found, vendor.skipped, vendor.changed
        );
    }
    eprintln!("{}\n", "=".repeat(70));

    match result.output {
        Some(out) => {
            let path = output_path(output, out.file_name);
            fs::write(&path, &out.csv)?;
            eprintln!("💾 {} rows written to: {}", out.rows, path.display());
        }
        None => eprintln!("✨ Nothing to download"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_vendor_arg() {
        assert_eq!(
            parse_vendor_arg("unicorn=feeds/unicorn.csv").unwrap(),
            ("unicorn".to_string(), PathBuf::from("feeds/unicorn.csv"))
        );
        assert!(parse_vendor_arg("unicorn").is_err());
        assert!(parse_vendor_arg("=x.csv").is_err());
    }

    #[test]
    fn test_run_args_parse() {
        let cli = Cli::parse_from([
            "stocksync", "inventory", "-i", "inv.csv", "--vendor", "cartas=stock.csv", "--max-quantity", "50",
        ]);
        match cli.command {
            Commands::Inventory { inventory, run } => {
                assert_eq!(inventory, vec![PathBuf::from("inv.csv")]);
                assert_eq!(run.max_quantity, 50);
                assert_eq!(run.vendors[0].0, "cartas");
            }
            _ => panic!("expected inventory command"),
        }
    }
}
