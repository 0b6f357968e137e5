//! relschema CLI - Generate a relational schema document from a live database
//!
//! Usage:
//!   relschema introspect [--config <file>] [--client <mysql|pg>] [connection flags] [--outdir <dir>] [--format <format>]
//!   relschema tree --table <name> --schema-file <file> [--show-backward-relations] [--max-depth <n>]
//!
//! Examples:
//!   relschema introspect --client pg --host localhost --user postgres --database app --format ts
//!   relschema tree --table users --schema-file gen/relational-schema.json --max-depth 2

use clap::{ArgAction, Parser, Subcommand};
use relschema::config::{ConnectionSettings, LogLevel, Settings};
use relschema::introspection::introspect_schema;
use relschema::output::{write_schema, Format};
use relschema::tree::{load_schema, render_relation_tree, TreeOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relschema")]
#[command(about = "relschema - Introspect MySQL/PostgreSQL into a relation-aware schema document")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Introspect a database and write the schema document
    Introspect(IntrospectArgs),

    /// Print the relation tree of a table from a generated schema document
    Tree {
        /// Root table
        #[arg(short, long)]
        table: String,

        /// Path to a generated relational-schema file
        #[arg(short, long)]
        schema_file: PathBuf,

        /// Also follow one-to-many relations
        #[arg(long)]
        show_backward_relations: bool,

        /// Levels of relations to print below the root
        #[arg(long, default_value_t = 5)]
        max_depth: usize,
    },
}

#[derive(clap::Args)]
struct IntrospectArgs {
    /// Path to a relschema.toml settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database client
    #[arg(long)]
    client: Option<String>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    #[arg(short, long)]
    user: Option<String>,

    #[arg(long)]
    password: Option<String>,

    #[arg(short, long)]
    database: Option<String>,

    /// Schema to introspect (Postgres only)
    #[arg(long)]
    schema: Option<String>,

    /// Output directory
    #[arg(short, long)]
    outdir: Option<PathBuf>,

    /// Output format
    #[arg(short, long)]
    format: Option<Format>,

    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Emit many-to-many relations through junction tables
    #[arg(long, action = ArgAction::Set)]
    transitive_relations: Option<bool>,
}

impl IntrospectArgs {
    fn connection_overrides(&self) -> ConnectionSettings {
        ConnectionSettings {
            driver: self.client.clone(),
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
            schema: self.schema.clone(),
        }
    }
}

fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,relschema={}", level.as_str())));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Introspect(args) => cmd_introspect(args).await,
        Commands::Tree {
            table,
            schema_file,
            show_backward_relations,
            max_depth,
        } => cmd_tree(table, schema_file, show_backward_relations, max_depth),
    }
}

async fn cmd_introspect(args: IntrospectArgs) -> ExitCode {
    let settings = match &args.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(args.log_level.unwrap_or(settings.log_level));

    let config = ConnectionSettings::from_env()
        .and_then(|env| settings.connection_config(&env, &args.connection_overrides()));
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut options = settings.builder.options();
    if let Some(transitive) = args.transitive_relations {
        options.include_transitive_relations = transitive;
    }
    let format = args.format.unwrap_or(settings.output.format);
    let outdir = args.outdir.unwrap_or(settings.output.outdir);

    info!(driver = %config.driver, database = %config.database, "generating schema");

    let report = match introspect_schema(&config, &options).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match write_schema(&report.schema, &outdir, format) {
        Ok(path) => {
            for (table, count) in report.diagnostic_counts() {
                warn!(table, count, "table built with warnings");
            }
            println!(
                "Generated {} tables in {} ({} warnings)",
                report.schema.tables.len(),
                path.display(),
                report.diagnostics.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_tree(table: String, schema_file: PathBuf, show_backward: bool, max_depth: usize) -> ExitCode {
    let schema = match load_schema(&schema_file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = TreeOptions {
        max_depth,
        show_backward,
    };

    match render_relation_tree(&schema, &table, &options) {
        Ok(tree) => {
            print!("{}", tree);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
