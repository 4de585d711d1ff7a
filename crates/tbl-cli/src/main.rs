//! Table CLI
//!
//! Command-line tool for inspecting, checking and exporting tab-separated
//! game configuration tables.

use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tbl_core::{
    read_column_int_list, read_column_string_list, ColumnSplitter, LineReader, Table, TableLayout,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tbl-cli")]
#[command(about = "Tab-separated game table reader", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every raw row as a JSON array
    Rows {
        /// Path to table file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show a table with its header checked
    Show {
        /// Path to table file
        #[arg(short, long)]
        file: PathBuf,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,

        /// Columns to display (comma-separated)
        #[arg(short, long)]
        columns: Option<String>,
    },

    /// Validate a table file, optionally against a layout
    Check {
        /// Path to table file
        #[arg(short, long)]
        file: PathBuf,

        /// Path to layout file (JSON)
        #[arg(short, long)]
        layout: Option<PathBuf>,
    },

    /// Export a table as typed JSON
    Export {
        /// Path to table file
        #[arg(short, long)]
        file: PathBuf,

        /// Path to layout file (JSON)
        #[arg(short, long)]
        layout: PathBuf,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split one cell and print its elements as JSON
    Split {
        /// Cell text
        #[arg(short, long)]
        text: String,

        /// Element delimiter
        #[arg(short, long, default_value_t = tbl_core::list::LIST_DELIMITER)]
        delimiter: char,

        /// Convert elements to integers
        #[arg(long)]
        int: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Commands) -> tbl_core::Result<()> {
    match command {
        Commands::Rows { file } => cmd_rows(&file),
        Commands::Show {
            file,
            limit,
            columns,
        } => cmd_show(&file, limit, columns),
        Commands::Check { file, layout } => cmd_check(&file, layout.as_deref()),
        Commands::Export {
            file,
            layout,
            output,
        } => cmd_export(&file, &layout, output.as_deref()),
        Commands::Split {
            text,
            delimiter,
            int,
        } => cmd_split(&text, delimiter, int),
    }
}

/// Read a UTF-8 table file, dropping a leading byte order mark
fn read_table_file(path: &Path) -> tbl_core::Result<String> {
    let text = fs::read_to_string(path).map_err(|e| tbl_core::Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(path = %path.display(), bytes = text.len(), "read table file");

    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

fn cmd_rows(file: &Path) -> tbl_core::Result<()> {
    let text = read_table_file(file)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let mut count = 0;
    for row in LineReader::new(&text) {
        writeln!(out, "{}", serde_json::to_string(&row)?)?;
        count += 1;
    }
    out.flush()?;

    info!(rows = count, "printed raw rows");
    Ok(())
}

fn cmd_show(file: &Path, limit: Option<usize>, columns: Option<String>) -> tbl_core::Result<()> {
    let text = read_table_file(file)?;
    let table = Table::parse(&text)?;

    // Filter columns if specified
    let col_filter: Option<Vec<&str>> = columns.as_ref().map(|c| c.split(',').collect());

    let display_cols: Vec<&tbl_core::Column> = if let Some(ref filter) = col_filter {
        for name in filter {
            table.column_index(name)?;
        }
        table
            .columns
            .iter()
            .filter(|c| filter.contains(&c.name.as_str()))
            .collect()
    } else {
        table.columns.iter().collect()
    };

    // Print header
    let header: Vec<&str> = display_cols.iter().map(|c| c.name.as_str()).collect();
    println!("{}", header.join("\t"));
    println!("{}", "-".repeat(header.len() * 12));

    // Print rows
    let row_limit = limit.unwrap_or(table.row_count());
    for record in table.records.iter().take(row_limit) {
        let values: Vec<&str> = display_cols
            .iter()
            .map(|col| record.get(col.index).unwrap_or_default())
            .collect();
        println!("{}", values.join("\t"));
    }

    if table.row_count() > row_limit {
        println!("... ({} more rows)", table.row_count() - row_limit);
    }

    Ok(())
}

fn cmd_check(file: &Path, layout: Option<&Path>) -> tbl_core::Result<()> {
    let text = read_table_file(file)?;
    let table = Table::parse(&text)?;

    println!("File: {}", file.display());
    println!("Columns: {}", table.column_count());
    println!("Rows: {}", table.row_count());

    if let Some(layout_path) = layout {
        let layout = TableLayout::load(layout_path)?;
        let typed = layout.apply(&table)?;
        println!(
            "Layout: {} ({} rows converted)",
            layout_path.display(),
            typed.records.len()
        );
    }

    println!("OK");
    Ok(())
}

fn cmd_export(file: &Path, layout: &Path, output: Option<&Path>) -> tbl_core::Result<()> {
    let text = read_table_file(file)?;
    let table = Table::parse(&text)?;
    let layout = TableLayout::load(layout)?;
    let json = layout.apply(&table)?.to_json()?;

    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, &json)?;
            writeln!(writer)?;
            writer.flush()?;
            println!("Exported {} rows to {}", table.row_count(), path.display());
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}

fn cmd_split(text: &str, delimiter: char, int: bool) -> tbl_core::Result<()> {
    let json = if delimiter == tbl_core::list::LIST_DELIMITER {
        if int {
            serde_json::to_string(&read_column_int_list(text))?
        } else {
            serde_json::to_string(&read_column_string_list(text))?
        }
    } else {
        let mut splitter = ColumnSplitter::new(text, delimiter);
        if int {
            let values: Vec<i32> = std::iter::from_fn(|| splitter.next_int()).collect();
            serde_json::to_string(&values)?
        } else {
            let tokens: Vec<&str> = splitter.collect();
            serde_json::to_string(&tokens)?
        }
    };

    println!("{}", json);
    Ok(())
}
