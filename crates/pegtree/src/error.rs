use std::fmt::Display;

use crate::span::Span;

/// Everything that stops a grammar from being built. Parse failures are never reported through
/// this type, see [`ParseNode::is_valid`](crate::ParseNode::is_valid).
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GrammarError {
    /// The description does not follow the description syntax, `at` covers the text that was
    /// understood up to the deepest failure.
    Syntax { at: Span },
    /// The description parsed but left text behind, `at` covers that text.
    TrailingInput { at: Span },
    NoProductions,
    EmptyRuleName,
    DuplicateRule { name: String },
    EmptyExpression { rule: String },
    UndefinedRule { rule: String, name: String },
    /// Rules which can reach themselves without consuming input, in call order. The first rule is
    /// repeated at the end.
    LeftRecursion { cycle: Vec<String> },
}

impl GrammarError {
    /// Position in the description text, only syntax errors have one.
    pub fn span(&self) -> Option<Span> {
        match self {
            GrammarError::Syntax { at } | GrammarError::TrailingInput { at } => Some(*at),
            _ => None,
        }
    }
}

impl Display for GrammarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarError::Syntax { at } => {
                write!(f, "The grammar is invalid, stopped understanding it at {}", at.end())
            }
            GrammarError::TrailingInput { at } => {
                write!(f, "Unexpected trailing text at {at}")
            }
            GrammarError::NoProductions => f.write_str("Grammar has no productions"),
            GrammarError::EmptyRuleName => f.write_str("Rule name is empty"),
            GrammarError::DuplicateRule { name } => write!(f, "Duplicate rule `{name}`"),
            GrammarError::EmptyExpression { rule } => {
                write!(f, "Rule `{rule}` contains an empty sequence or choice")
            }
            GrammarError::UndefinedRule { rule, name } => {
                write!(f, "Rule `{rule}` references undefined rule `{name}`")
            }
            GrammarError::LeftRecursion { cycle } => {
                f.write_str("Detected left recursion: ")?;
                for (i, name) in cycle.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" -> ")?;
                    }
                    f.write_str(name)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for GrammarError {}
