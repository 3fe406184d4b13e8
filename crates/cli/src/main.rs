use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indexmap::IndexMap;
use luminar::{FlagSchema, FlagType, FlagValue, Ignored, ParseOptions, Schema};
use serde::Serialize;
use std::{fs, path::PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "luminar")]
#[command(version, about = "Parse argv flags against a schema and print the result as JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse ARGS against a flag schema
    Parse(ParseArgs),

    /// Extract a single flag from ARGS
    Get(GetArgs),
}

#[derive(Parser)]
struct ParseArgs {
    /// Flag schema as JSON, e.g. '{"size": "number", "tag": ["string"]}'
    #[arg(short, long, value_name = "JSON", required_unless_present = "schema_file")]
    schema: Option<String>,

    /// Read the flag schema from a JSON file
    #[arg(long, value_name = "FILE", conflicts_with = "schema")]
    schema_file: Option<PathBuf>,

    /// Leave flags missing from the schema in place
    #[arg(long)]
    ignore_unknown: bool,

    /// Stop parsing at the first positional argument
    #[arg(long)]
    stop_early: bool,

    /// Arguments to parse
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

#[derive(Parser)]
struct GetArgs {
    /// Comma-separated flag names in flag syntax, e.g. "--size,-s"
    #[arg(short, long, value_name = "NAMES", allow_hyphen_values = true)]
    name: String,

    /// Value type of the flag
    #[arg(short = 't', long = "type", value_enum, default_value_t = ValueType::String)]
    kind: ValueType,

    /// Collect every occurrence instead of the first one
    #[arg(short, long)]
    multiple: bool,

    /// Arguments to read the flag from
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ValueType {
    String,
    Number,
    Boolean,
}

impl From<ValueType> for FlagType {
    fn from(kind: ValueType) -> Self {
        match kind {
            ValueType::String => FlagType::String,
            ValueType::Number => FlagType::Number,
            ValueType::Boolean => FlagType::Boolean,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct ParseOutput<'a> {
    flags: &'a IndexMap<String, Option<FlagValue>>,
    unknown_flags: &'a IndexMap<String, Vec<FlagValue>>,
    arguments: &'a [String],
    end_of_flags: &'a [String],
    remaining: &'a [String],
}

#[derive(Serialize)]
struct GetOutput<'a> {
    value: Option<&'a FlagValue>,
    remaining: &'a [String],
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse(args) => parse_command(args),
        Commands::Get(args) => get_command(args),
    }
}

fn load_schema(args: &ParseArgs) -> Result<Schema> {
    let text = match &args.schema_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read schema file: {}", path.display()))?,
        None => args
            .schema
            .clone()
            .context("either --schema or --schema-file is required")?,
    };
    Schema::from_json(&text).context("failed to load flag schema")
}

fn parse_command(args: ParseArgs) -> Result<()> {
    let schema = load_schema(&args)?;
    tracing::debug!(flags = schema.len(), args = args.args.len(), "parsing argv");

    let mut argv = args.args;
    let ignore_unknown = args.ignore_unknown;
    let stop_early = args.stop_early;
    let mut stopped = false;
    let options = ParseOptions::new().ignore(|event| {
        if stopped {
            return true;
        }
        match event {
            Ignored::UnknownFlag { .. } => ignore_unknown,
            Ignored::Argument(_) if stop_early => {
                stopped = true;
                true
            }
            _ => false,
        }
    });

    let parsed = luminar::parse_with(&schema, &mut argv, options)
        .context("failed to parse arguments against the flag schema")?;
    let output = ParseOutput {
        flags: &parsed.flags,
        unknown_flags: &parsed.unknown_flags,
        arguments: &parsed.arguments,
        end_of_flags: parsed.arguments.end_of_flags(),
        remaining: &argv,
    };
    print_json(&output)
}

fn get_command(args: GetArgs) -> Result<()> {
    let mut schema = FlagSchema::new(args.kind.into());
    if args.multiple {
        schema = schema.multiple();
    }

    let mut argv = args.args;
    let value = luminar::get_flag(&args.name, schema, &mut argv)
        .with_context(|| format!("failed to read flag {}", args.name))?;
    let output = GetOutput {
        value: value.as_ref(),
        remaining: &argv,
    };
    print_json(&output)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
