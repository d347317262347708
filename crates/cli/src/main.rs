//! synclint: parse, analyze, demux and filter sync-daemon logs.
//!
//! Thin entry points over the `pipeline` crate; everything here is argument
//! handling, file/stdin opening and JSON printing.

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use pipeline::analyzer::{self, Analyzer, Check};
use pipeline::parser::sources::{dpll, gnss, pmc, ts2phc};
use pipeline::parser::{muxed, LineParser, Registry};
use pipeline::Config;

#[derive(Parser)]
#[command(
    name = "synclint",
    about = "Validate time-synchronization daemon logs against timing requirements"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse log messages from a single source into canonical records
    Parse {
        /// Present timestamps relative to the first accepted record
        #[arg(short, long)]
        relative: bool,
        /// Input file, or '-' to read from stdin
        input: String,
        /// Data to parse from the input
        parser: String,
    },
    /// Analyze log messages from a single source
    Analyze {
        /// Input contains canonical records
        #[arg(long)]
        canonical: bool,
        /// TOML file specifying test requirements and parameters
        #[arg(long)]
        config: Option<String>,
        /// Input file, or '-' to read from stdin
        input: String,
        /// Analyzer to run over the input
        analyzer: String,
    },
    /// Demultiplex one source's log messages from multiplexed input
    Demux {
        /// Input file, or '-' to read from stdin
        input: String,
        /// Data to demultiplex from the input
        parser: String,
    },
    /// Filter one collector's records out of a multiplexed capture
    Filter {
        /// Collector file, or '-' to read from stdin
        input: String,
        /// Filtered data to extract from the collector file
        parser: String,
    },
}

fn main() -> Result<()> {
    init_logging();
    match Cli::parse().command {
        Command::Parse {
            relative,
            input,
            parser,
        } => run_parse(&input, &parser, relative),
        Command::Analyze {
            canonical,
            config,
            input,
            analyzer,
        } => run_analyze(&input, &analyzer, config.as_deref(), canonical),
        Command::Demux { input, parser } => run_demux(&input, &parser),
        Command::Filter { input, parser } => run_filter(&input, &parser),
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn open_input(path: &str) -> Result<Box<dyn BufRead>> {
    if path == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        let file = File::open(path).with_context(|| format!("cannot open {path}"))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn run_parse(input: &str, parser: &str, relative: bool) -> Result<()> {
    let reader = open_input(input)?;
    match parser {
        dpll::PhaseOffsetParser::ID => print_parsed(&dpll::PhaseOffsetParser, reader, relative),
        dpll::TimeErrorParser::ID => print_parsed(&dpll::TimeErrorParser, reader, relative),
        gnss::TimeErrorParser::ID => print_parsed(&gnss::TimeErrorParser, reader, relative),
        ts2phc::TimeErrorParser::ID => {
            print_parsed(&ts2phc::TimeErrorParser::new(), reader, relative)
        }
        pmc::ClockClassParser::ID => print_parsed(&pmc::ClockClassParser, reader, relative),
        _ => bail!("unknown parser {parser:?}"),
    }
}

fn print_parsed<P: LineParser>(parser: &P, reader: Box<dyn BufRead>, relative: bool) -> Result<()> {
    let stream = if relative {
        parser.parse_relative(reader)
    } else {
        parser.parse(reader)
    };
    for record in stream {
        println!("{}", serde_json::to_string(&record?)?);
    }
    Ok(())
}

fn run_analyze(input: &str, analyzer: &str, config: Option<&str>, canonical: bool) -> Result<()> {
    let config = match config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let reader = open_input(input)?;
    let output = match analyzer {
        analyzer::gnss::TimeErrorCheck::ID => analyze_with(
            &gnss::TimeErrorParser,
            analyzer::gnss::TimeErrorCheck::new(&config)?,
            reader,
            canonical,
        )?,
        analyzer::ts2phc::TimeErrorCheck::ID => analyze_with(
            &ts2phc::TimeErrorParser::new(),
            analyzer::ts2phc::TimeErrorCheck::new(&config)?,
            reader,
            canonical,
        )?,
        analyzer::dpll::PhaseOffsetCheck::ID => analyze_with(
            &dpll::PhaseOffsetParser,
            analyzer::dpll::PhaseOffsetCheck::new(&config)?,
            reader,
            canonical,
        )?,
        analyzer::pmc::ClockStateCheck::ID => analyze_with(
            &pmc::ClockClassParser,
            analyzer::pmc::ClockStateCheck::new(&config)?,
            reader,
            canonical,
        )?,
        _ => bail!("unknown analyzer {analyzer:?}"),
    };
    println!("{output}");
    Ok(())
}

fn analyze_with<P, C>(
    parser: &P,
    check: C,
    reader: Box<dyn BufRead>,
    canonical: bool,
) -> Result<String>
where
    P: LineParser,
    C: Check<Record = P::Record>,
{
    let mut analyzer = Analyzer::new(check);
    if canonical {
        for record in parser.canonical(reader) {
            analyzer.collect([record?])?;
        }
    } else {
        for record in parser.parse(reader) {
            analyzer.collect([record?])?;
        }
    }
    let document = json!({
        "result": analyzer.result(),
        "reason": analyzer.reason(),
        "analysis": Value::Object(analyzer.analysis().clone()),
    });
    Ok(serde_json::to_string(&document)?)
}

fn run_demux(input: &str, parser: &str) -> Result<()> {
    let registry = Registry::default();
    if !registry.contains(parser) {
        bail!("unknown parser {parser:?}");
    }
    print_demuxed(open_input(input)?, &registry, parser)
}

fn run_filter(input: &str, parser: &str) -> Result<()> {
    // collector captures only interleave the CSV time-error sources
    let filters = [dpll::TimeErrorParser::ID, gnss::TimeErrorParser::ID];
    if !filters.contains(&parser) {
        bail!("unknown parser {parser:?}");
    }
    print_demuxed(open_input(input)?, &Registry::default(), parser)
}

fn print_demuxed(reader: Box<dyn BufRead>, registry: &Registry, parser: &str) -> Result<()> {
    for pair in muxed(reader, registry) {
        let (id, record) = pair?;
        if id == parser {
            println!("{}", serde_json::to_string(&record)?);
        }
    }
    Ok(())
}
