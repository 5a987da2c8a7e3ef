use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tagunion_core::{Schema, SchemaDef, Value};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "tagunion")]
#[command(about = "Validate JSON data against declarative discriminated-union schemas")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON document against a schema definition
    Validate {
        /// Schema definition file
        schema: PathBuf,

        /// JSON data file to validate
        data: PathBuf,

        /// Output file for the parsed value (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run the asynchronous parser
        #[arg(long = "async")]
        run_async: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Print the discriminator, options and dispatch values of a union schema
    Inspect {
        /// Schema definition file
        schema: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Pretty,
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate {
            schema,
            data,
            output,
            run_async,
            format,
        } => {
            let schema = load_schema(&schema)?;
            let input = Value::from(read_json(&data, "input data")?);

            let result = if run_async {
                futures::executor::block_on(schema.parse_async(&input))
            } else {
                schema.parse(&input)
            };

            match result {
                Ok(parsed) => write_json(&parsed.to_json(), output.as_ref(), format)?,
                Err(err) => {
                    write_json(&err.to_json(), None, format)?;
                    bail!("Validation failed with {} issue(s)", err.issues.len());
                }
            }
        }
        Commands::Inspect { schema, format } => {
            let schema = load_schema(&schema)?;
            let Schema::DiscriminatedUnion(union) = &schema else {
                bail!(
                    "Schema is `{}`, not a discriminated union",
                    schema.kind_name()
                );
            };

            let summary = serde_json::json!({
                "discriminator": union.discriminator(),
                "options": union.options().len(),
                "values": union.discriminator_values(),
                "description": union.description(),
            });
            write_json(&summary, None, format)?;
        }
    }

    Ok(())
}

fn read_json(path: &Path, what: &str) -> Result<serde_json::Value> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {what} file: {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {what} from: {}", path.display()))
}

fn load_schema(path: &Path) -> Result<Schema> {
    let definition = SchemaDef::from_json(read_json(path, "schema")?)
        .map_err(|e| anyhow::Error::from(e).context("Invalid schema definition"))?;
    definition
        .build()
        .map_err(|e| anyhow::Error::from(e).context("Schema construction failed"))
}

fn write_json<T: serde::Serialize>(
    val: &T,
    path: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    match format {
        OutputFormat::Pretty => {
            serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
        }
        OutputFormat::Compact => {
            serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
        }
    }

    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush output")?;

    Ok(())
}
