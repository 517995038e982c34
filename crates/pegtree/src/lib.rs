//! Parsing expression grammars interpreted at runtime.
//!
//! A [`Grammar`] is an ordered set of named [`Expression`]s built either programmatically or from
//! a textual description with [`compile_grammar`]:
//!
//! ```
//! let grammar = pegtree::compile_grammar(r#"foo: "(" bar ")"; bar: foo | "";"#).unwrap();
//!
//! let tree = grammar.parse("(())");
//! assert!(tree.is_valid());
//! assert_eq!(tree.text(), "(())");
//!
//! let tree = grammar.parse("(()");
//! assert!(!tree.is_valid());
//! ```
//!
//! Parsing never fails with an error, the returned [`ParseNode`] records whether it matched and
//! how much of the input it consumed at every level. Everything that can go wrong with the
//! grammar itself, including left recursion, is reported when it is built.

mod check;
mod cursor;
pub mod description;
mod engine;
mod error;
pub mod expr;
pub mod grammar;
mod lower;
pub mod predicate;
pub mod span;
pub mod tree;

pub use description::{compile_grammar, compile_grammar_with_predicates, read_grammar};
pub use error::GrammarError;
pub use expr::{Expression, Production};
pub use grammar::{Grammar, RuleHandle};
pub use predicate::Predicate;
pub use span::Span;
pub use tree::{NodeKind, ParseNode};

/// Parses `input` with `grammar` starting at the rule named `start`, or the first declared rule.
///
/// An unknown `start` results in an invalid, empty [`NodeKind::Sequence`] without any children.
/// No expression produces that shape on its own, lowering rejects empty sequences.
pub fn parse<'a>(grammar: &Grammar, start: Option<&str>, input: &'a str) -> ParseNode<'a> {
    let Some(name) = start else {
        return grammar.parse(input);
    };
    match grammar.parse_named(name, input) {
        Some(node) => node,
        None => {
            log::warn!("Grammar has no rule `{name}`, nothing was parsed");
            ParseNode::new(false, Span::at(0), input, NodeKind::Sequence(Vec::new()))
        }
    }
}
