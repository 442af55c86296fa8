//! NMEAScope CLI - Command-line interface
//!
//! Decodes NMEA 0183 streams from files or stdin, inspects the sentence
//! catalog and generates test sentences.

use clap::{Parser as ClapParser, Subcommand};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use nmeascope_core::cli::{
    format_info, format_sentence, format_summary, print_exit_codes, ChunkReader, CliResult, OutputFormat,
    PipeMode, CSV_HEADER, DEFAULT_CHUNK_SIZE,
};
use nmeascope_core::config::{ConfigError, ParserConfig};
use nmeascope_core::core::protocol_dsl::{protocols_json_schema, write_json_schema, ProtocolsInput};
use nmeascope_core::Parser;

/// NMEAScope CLI
#[derive(ClapParser, Debug)]
#[command(
    name = "nmeascope",
    version,
    about = "Streaming NMEA 0183 sentence decoder",
    long_about = None
)]
struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Config file (defaults to the user config directory)
    #[arg(short, long, global = true, env = "NMEASCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Extra protocols file (YAML), may be repeated
    #[arg(short, long = "protocols", global = true)]
    protocols: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode sentences from a file or stdin
    Parse {
        /// Input file (stdin if omitted)
        file: Option<PathBuf>,

        /// Bytes read per chunk
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Do not join frames split across chunks
        #[arg(long)]
        no_memory: bool,
    },

    /// List known sentences grouped by protocol
    Protocols,

    /// Show the definition of a sentence
    Info {
        /// Sentence identifier, with or without talker (GGA, GPGGA)
        id: String,
    },

    /// Generate random valid sentences
    Fake {
        /// Sentence identifier, with or without talker
        id: String,

        /// Number of sentences
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// Print or write the JSON-Schema of protocols files
    Schema {
        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List exit codes
    ExitCodes,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match run(&cli) {
        Ok(result) => result,
        Err(e) => CliResult::from(e),
    };

    match &result {
        CliResult::Success(Some(msg)) if !cli.quiet => eprintln!("{}", msg),
        CliResult::Error(_, msg) => eprintln!("Error: {}", msg),
        _ => {}
    }
    result.to_exit_code()
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        tracing::Level::ERROR
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<CliResult> {
    match &cli.command {
        Commands::Parse { file, chunk_size, no_memory } => parse(cli, file.as_deref(), *chunk_size, *no_memory),
        Commands::Protocols => {
            let parser = build_parser(cli)?;
            println!("{}", format_summary(&parser.protocols(), cli.format)?);
            Ok(CliResult::success())
        }
        Commands::Info { id } => {
            let parser = build_parser(cli)?;
            match parser.sentence_info(id) {
                Some(info) => {
                    println!("{}", format_info(&info, cli.format)?);
                    Ok(CliResult::success())
                }
                None => Ok(CliResult::sentence_not_found(id)),
            }
        }
        Commands::Fake { id, count } => fake(cli, id, *count),
        Commands::Schema { output } => schema(output.as_deref()),
        Commands::ExitCodes => {
            print_exit_codes();
            Ok(CliResult::success())
        }
    }
}

fn load_config(cli: &Cli) -> Result<ParserConfig, ConfigError> {
    match &cli.config {
        Some(path) => ParserConfig::load_from(path),
        None => match ParserConfig::load() {
            Err(ConfigError::NoConfigDir) => {
                tracing::warn!("No config directory, using defaults");
                Ok(ParserConfig::default())
            }
            other => other,
        },
    }
}

fn build_parser(cli: &Cli) -> anyhow::Result<Parser> {
    let config = load_config(cli)?;
    let mut parser = Parser::from_config(&config)?;
    for path in &cli.protocols {
        parser.add_protocols(ProtocolsInput::File(path.clone()))?;
    }
    Ok(parser)
}

fn parse(cli: &Cli, file: Option<&Path>, chunk_size: usize, no_memory: bool) -> anyhow::Result<CliResult> {
    if chunk_size == 0 {
        return Ok(CliResult::error(
            nmeascope_core::ExitCodes::INVALID_ARGS,
            "--chunk-size must be positive",
        ));
    }

    let mut parser = build_parser(cli)?;
    if no_memory {
        parser.set_memory(false);
    }

    let input: Box<dyn Read> = match file {
        Some(path) => Box::new(File::open(path)?),
        None => {
            if PipeMode::detect().is_interactive() && !cli.quiet {
                eprintln!("Reading NMEA from stdin, Ctrl+D to finish");
            }
            Box::new(io::stdin().lock())
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.format == OutputFormat::Csv {
        writeln!(out, "{}", CSV_HEADER)?;
    }

    let (mut total, mut known) = (0usize, 0usize);
    for chunk in ChunkReader::new(input, chunk_size) {
        for sentence in parser.parse_data(&chunk?) {
            total += 1;
            if sentence.is_known() {
                known += 1;
            }
            writeln!(out, "{}", format_sentence(&sentence, cli.format)?)?;
        }
    }
    out.flush()?;

    if !parser.pending().is_empty() {
        tracing::debug!("Discarding {} unterminated characters at end of input", parser.pending().len());
    }
    tracing::info!("Decoded {} sentences, {} known", total, known);

    if cli.verbose {
        Ok(CliResult::success_with_message(format!("{} sentences ({} known)", total, known)))
    } else {
        Ok(CliResult::success())
    }
}

fn fake(cli: &Cli, id: &str, count: usize) -> anyhow::Result<CliResult> {
    let parser = build_parser(cli)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for _ in 0..count {
        let Some(frame) = parser.fake_sentence(id) else {
            return Ok(CliResult::sentence_not_found(id));
        };
        match cli.format {
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&frame)?)?,
            _ => write!(out, "{}", frame)?,
        }
    }
    out.flush()?;
    Ok(CliResult::success())
}

fn schema(output: Option<&Path>) -> anyhow::Result<CliResult> {
    let Some(output) = output else {
        println!("{}", serde_json::to_string_pretty(&protocols_json_schema())?);
        return Ok(CliResult::success());
    };

    let path = if output.is_dir() {
        write_json_schema(output, None)?
    } else {
        let dir = output.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        write_json_schema(dir, output.file_name().and_then(|n| n.to_str()))?
    };
    Ok(CliResult::success_with_message(format!("Schema written to {}", path.display())))
}
