//! Command-line interface for citemark
//! Parses citation-annotated draft text and prints the resulting segments.
//!
//! Usage:
//!   citemark [`<path>`] [--format json|tag|numbered] [--config `<file>`] [--sources `<file>`]
//!   citemark --list-formats
//!
//! Text is read from stdin when no path (or `-`) is given. Set `RUST_LOG` or pass
//! `--verbose` for diagnostics on stderr.

mod output;

use citemark_config::Loader;
use citemark_parser::{build_segments_with, SourceEntry, SourceIndex};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::Read;

fn main() {
    let matches = Command::new("citemark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse citation and implementation annotations in drafted text")
        .arg(
            Arg::new("path")
                .help("Path to the annotated text (stdin when omitted or '-')")
                .index(1),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format: json, tag or numbered (default from config)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML file layered over the built-in configuration"),
        )
        .arg(
            Arg::new("sources")
                .long("sources")
                .short('s')
                .help("JSON array of {id, title} sources to resolve citations against"),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .help("Print JSON on a single line")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log debug diagnostics to stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available output formats")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    init_logging(matches.get_flag("verbose"));

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    if let Err(message) = handle_parse_command(&matches) {
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Parse the input and print it in the configured format
fn handle_parse_command(matches: &ArgMatches) -> Result<(), String> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(name) = matches.get_one::<String>("format") {
        if output::parse_format(name).is_none() {
            return Err(format!(
                "unknown format '{}' (available: {})",
                name,
                output::AVAILABLE_FORMATS.join(", ")
            ));
        }
        loader = loader
            .set_override("output.format", name.as_str())
            .map_err(|e| e.to_string())?;
    }
    if matches.get_flag("compact") {
        loader = loader
            .set_override("output.pretty", false)
            .map_err(|e| e.to_string())?;
    }
    let (config, syntax) = loader.load().map_err(|e| e.to_string())?;

    let sources = match matches.get_one::<String>("sources") {
        Some(path) => Some(load_sources(path)?),
        None => None,
    };

    let path = matches.get_one::<String>("path").map(String::as_str);
    let text = read_input(path)?;
    log::debug!("read {} bytes from {}", text.len(), path.unwrap_or("stdin"));

    let segments = build_segments_with(&text, &syntax);
    log::debug!(
        "{} segments, {} citations",
        segments.len(),
        segments.citations().count()
    );

    let rendered = output::render(
        &segments,
        config.output.format,
        config.output.pretty,
        sources.as_ref(),
    )?;
    println!("{}", rendered);
    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String, String> {
    match path {
        None | Some("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| format!("failed to read stdin: {}", e))?;
            Ok(text)
        }
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read '{}': {}", path, e)),
    }
}

fn load_sources(path: &str) -> Result<SourceIndex, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read sources '{}': {}", path, e))?;
    let entries: Vec<SourceEntry> = serde_json::from_str(&contents)
        .map_err(|e| format!("invalid sources file '{}': {}", path, e))?;
    log::debug!("loaded {} sources from {}", entries.len(), path);
    Ok(SourceIndex::new(entries))
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    println!("Available output formats:\n");
    for name in output::AVAILABLE_FORMATS {
        println!("  {}", name);
    }
}
