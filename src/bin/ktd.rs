//! ktd CLI
//!
//! Inspect a KTD container and run point lookups against it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ktdreader::{Config, IndexSearch, KtdReader, LineWidth, Row};
use tracing_subscriber::{fmt, EnvFilter};

/// ktd
#[derive(Parser, Debug)]
#[command(name = "ktd")]
#[command(about = "Point lookups against KTD flat-file tables")]
#[command(version)]
struct Args {
    /// Container file
    file: PathBuf,

    /// Scan key indexes linearly instead of binary searching them
    #[arg(long)]
    linear: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the table schema
    Schema,

    /// Look up a row by primary key
    Get {
        /// The primary key
        key: String,

        /// Record length prefix width (1 or 2)
        #[arg(short, long, default_value = "1")]
        width: u8,
    },

    /// Look up a row by a secondary key field
    Find {
        /// Field name belonging to a secondary key group
        field: String,

        /// The key to match
        key: String,

        /// Record length prefix width (1 or 2)
        #[arg(short, long, default_value = "1")]
        width: u8,
    },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,ktdreader=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .index_search(if args.linear {
            IndexSearch::Linear
        } else {
            IndexSearch::Binary
        })
        .build();

    let reader = match KtdReader::open_with_config(&args.file, config) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to open {}: {}", args.file.display(), e);
            return ExitCode::from(1);
        }
    };

    let result = match &args.command {
        Commands::Schema => {
            print_schema(&reader);
            return ExitCode::SUCCESS;
        }
        Commands::Get { key, width } => LineWidth::try_from(*width)
            .and_then(|width| reader.find_by_primary_key(key, width)),
        Commands::Find { field, key, width } => LineWidth::try_from(*width)
            .and_then(|width| reader.find_by_secondary_key(field, key, width)),
    };

    match result {
        Ok(Some(row)) => {
            print_row(&row);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            tracing::info!("No matching row");
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!("Lookup failed: {}", e);
            ExitCode::from(1)
        }
    }
}

fn print_schema(reader: &KtdReader) {
    let schema = reader.schema();
    println!("table:    {}", schema.table_name);
    println!("version:  {}", schema.version);
    println!("records:  {}", schema.record_count);
    println!("primary key ({} bytes):", schema.primary_key_length);
    for field in &schema.primary_key {
        println!("  {} [{}, +{}]", field.name, field.start_position, field.length);
    }
    for (i, group) in schema.secondary_groups.iter().enumerate() {
        println!("secondary key {} ({} bytes):", i, group.key_length);
        for field in &group.fields {
            println!("  {} [{}, +{}]", field.name, field.start_position, field.length);
        }
    }
    println!("columns:");
    for column in &schema.columns {
        match column.reference_table {
            Some(table) => println!("  {} -> reference table {}", column.name(), table),
            None => println!(
                "  {} [{}, +{}]",
                column.name(),
                column.spec.start_position,
                column.spec.length
            ),
        }
    }
}

fn print_row(row: &Row) {
    println!("_PK: {}", row.primary_key());
    for (name, value) in row.iter() {
        println!("{}: {}", name, value);
    }
}
