use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use pegtree::Predicate;
use serde::Deserialize;
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "pegtree", version)]
#[command(about = "Parse text with a grammar description and print the parse tree")]
pub struct Args {
    /// Grammar description file
    pub grammar: PathBuf,
    /// File to parse, stdin when missing
    pub input: Option<PathBuf>,
    /// Rule to start parsing at, the first rule of the grammar by default
    #[arg(short, long, value_name = "NAME")]
    pub rule: Option<String>,
    /// Print the parse tree as json
    #[arg(long)]
    pub json: bool,
    /// Fail unless the whole input was consumed
    #[arg(long)]
    pub full: bool,
    /// Bind a built-in predicate to undefined rule references of the same name
    #[arg(short, long = "predicate", value_name = "NAME")]
    pub predicates: Vec<String>,
    /// Json file with defaults for the options above
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Print the compiled grammar instead of parsing anything
    #[arg(long)]
    pub print_grammar: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputFormat {
    #[default]
    Tree,
    Json,
}

/// Contents of the `--config` file, every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FileConfig {
    pub start: Option<String>,
    pub predicates: Vec<String>,
    pub output: OutputFormat,
    pub require_full_match: bool,
}

impl FileConfig {
    pub fn new(value: Value) -> anyhow::Result<Self> {
        if !value.is_object() {
            bail!("Config is not a json object");
        }
        serde_json::from_value(value).context("Invalid config")
    }

    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config `{}`", path.display()))?;
        let value = serde_json::from_str(&text)
            .with_context(|| format!("Config `{}` is not valid json", path.display()))?;
        Self::new(value).with_context(|| format!("In config `{}`", path.display()))
    }
}

/// Command line flags layered over the config file.
#[derive(Debug)]
pub struct Config {
    pub start: Option<String>,
    pub predicates: Vec<Predicate>,
    pub output: OutputFormat,
    pub require_full_match: bool,
}

impl Config {
    pub fn new(args: &Args, file: FileConfig) -> anyhow::Result<Self> {
        let mut predicates: Vec<Predicate> = Vec::new();
        for name in file.predicates.iter().chain(&args.predicates) {
            let Some(predicate) = Predicate::builtin(name) else {
                let known: Vec<_> = Predicate::builtins().iter().map(|p| p.name).collect();
                bail!("Unknown predicate `{name}`, expected one of {}", known.join(", "));
            };
            if !predicates.contains(&predicate) {
                predicates.push(predicate);
            }
        }

        let output = match args.json {
            true => OutputFormat::Json,
            false => file.output,
        };

        Ok(Self {
            start: args.rule.clone().or(file.start),
            predicates,
            output,
            require_full_match: args.full || file.require_full_match,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn args(extra: &[&str]) -> Args {
        let argv = ["pegtree", "grammar.peg"].iter().chain(extra).copied();
        Args::parse_from(argv)
    }

    #[test]
    fn parses_flags() {
        let args = args(&["input.txt", "--rule", "expr", "-p", "digit", "-p", "space", "--json"]);
        assert_eq!(args.grammar, PathBuf::from("grammar.peg"));
        assert_eq!(args.input, Some(PathBuf::from("input.txt")));
        assert_eq!(args.rule.as_deref(), Some("expr"));
        assert_eq!(args.predicates, ["digit", "space"]);
        assert!(args.json);
        assert!(!args.full);
    }

    #[test]
    fn file_config() {
        let file = FileConfig::new(json!({
            "start": "list",
            "predicates": ["alpha"],
            "output": "json",
            "requireFullMatch": true
        }))
        .unwrap();
        assert_eq!(file.start.as_deref(), Some("list"));
        assert_eq!(file.output, OutputFormat::Json);
        assert!(file.require_full_match);

        let empty = FileConfig::new(json!({})).unwrap();
        assert_eq!(empty.output, OutputFormat::Tree);
        assert!(empty.predicates.is_empty());

        assert!(FileConfig::new(json!([1, 2])).is_err());
        assert!(FileConfig::new(json!({ "output": "xml" })).is_err());
        assert!(FileConfig::new(json!({ "strat": "typo" })).is_err());
    }

    #[test]
    fn flags_override_file() {
        let file = FileConfig::new(json!({
            "start": "list",
            "predicates": ["alpha", "digit"],
        }))
        .unwrap();
        let config = Config::new(&args(&["-r", "item", "-p", "digit", "--full"]), file).unwrap();
        assert_eq!(config.start.as_deref(), Some("item"));
        assert_eq!(config.predicates.len(), 2);
        assert_eq!(config.output, OutputFormat::Tree);
        assert!(config.require_full_match);
    }

    #[test]
    fn unknown_predicate() {
        let err = Config::new(&args(&["-p", "letter"]), FileConfig::default()).unwrap_err();
        assert!(err.to_string().starts_with("Unknown predicate `letter`"));
    }
}
