mod config;

use std::{
    io::Read,
    path::Path,
    process::ExitCode,
    str::FromStr,
};

use anyhow::{bail, Context};
use clap::Parser;
use config::{Args, Config, FileConfig, OutputFormat};
use pegtree::{span::line_col, GrammarError};

/// The input did not match the grammar.
const EXIT_NO_MATCH: u8 = 1;
/// The grammar could not be built, or anything else went wrong before parsing.
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    init_logger();

    let args = Args::parse();
    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn init_logger() {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| log::LevelFilter::from_str(&level).ok())
        .unwrap_or(log::LevelFilter::Warn);

    // only fails if a logger is already installed
    _ = simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_time_format_custom(&[])
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    let file_config = match &args.config {
        Some(path) => FileConfig::read(path)?,
        None => FileConfig::default(),
    };
    let config = Config::new(args, file_config)?;
    log::debug!("{config:?}");

    let description = std::fs::read_to_string(&args.grammar)
        .with_context(|| format!("Failed to read grammar `{}`", args.grammar.display()))?;

    let grammar = match pegtree::compile_grammar_with_predicates(&description, &config.predicates)
    {
        Ok(grammar) => grammar,
        Err(e) => {
            report_grammar_error(&args.grammar, &description, &e);
            return Ok(ExitCode::from(EXIT_ERROR));
        }
    };

    if args.print_grammar {
        print!("{grammar}");
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(start) = &config.start {
        if grammar.rule(start).is_none() {
            bail!("Grammar `{}` has no rule `{start}`", args.grammar.display());
        }
    }

    let (input_name, input) = read_input(args.input.as_deref())?;
    let tree = pegtree::parse(&grammar, config.start.as_deref(), &input);

    match config.output {
        OutputFormat::Tree => print!("{}", tree.display(&grammar)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&tree.serialize(&grammar))
                .context("Failed to serialize the parse tree")?;
            println!("{json}");
        }
    }

    if !tree.is_valid() {
        let failure = tree.deepest_failure().unwrap_or(&tree);
        let (line, col) = line_col(&input, failure.span().end());
        eprintln!("{input_name}:{line}:{col} Input does not match the grammar");
        return Ok(ExitCode::from(EXIT_NO_MATCH));
    }

    let consumed = tree.span().end();
    if config.require_full_match && consumed as usize != input.len() {
        let (line, col) = line_col(&input, consumed);
        eprintln!("{input_name}:{line}:{col} Unexpected trailing input");
        return Ok(ExitCode::from(EXIT_NO_MATCH));
    }

    Ok(ExitCode::SUCCESS)
}

fn read_input(path: Option<&Path>) -> anyhow::Result<(String, String)> {
    match path {
        Some(path) => {
            let input = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read input `{}`", path.display()))?;
            Ok((path.display().to_string(), input))
        }
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(("<stdin>".to_owned(), input))
        }
    }
}

fn report_grammar_error(path: &Path, description: &str, error: &GrammarError) {
    let file = path.display();
    match error.span() {
        Some(span) => {
            let offset = match error {
                GrammarError::TrailingInput { .. } => span.start(),
                _ => span.end(),
            };
            let (line, col) = line_col(description, offset);
            eprintln!("{file}:{line}:{col} {error}");
        }
        None => eprintln!("{file}: {error}"),
    }
}
