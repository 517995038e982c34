//! Grammar descriptions, productions written as text.
//!
//! Descriptions are parsed by the engine itself running [`bootstrap::grammar`], the resulting tree
//! is then folded into productions. [`read_grammar`] is a separate hand written reader for the
//! same syntax.

pub mod bootstrap;
mod fold;
mod reader;

pub use reader::read_grammar;

use crate::{
    error::GrammarError, expr::Production, grammar::Grammar, predicate::Predicate, span::Span,
    tree::ParseNode,
};

pub fn compile_grammar(description: &str) -> Result<Grammar, GrammarError> {
    compile_grammar_with_predicates(description, &[])
}

/// Like [`compile_grammar`], `predicates` are bound to rule references which don't name any
/// production, see [`Grammar::with_predicates`].
pub fn compile_grammar_with_predicates(
    description: &str,
    predicates: &[Predicate],
) -> Result<Grammar, GrammarError> {
    let productions = parse_description(description)?;
    Grammar::with_predicates(productions, predicates)
}

/// Parses a description with the description grammar, without building a [`Grammar`] out of it.
pub fn parse_description(description: &str) -> Result<Vec<Production>, GrammarError> {
    let cx = bootstrap::grammar();
    let tree = cx.parse(description);

    if !tree.is_valid() {
        return Err(syntax_error(&tree, description));
    }
    // `grammar` ends with `$eoi`
    debug_assert_eq!(tree.text().len(), description.len());

    fold::grammar(&tree, cx).ok_or(GrammarError::Syntax { at: tree.span() })
}

fn syntax_error(tree: &ParseNode, description: &str) -> GrammarError {
    // every production was fine but something follows them
    if let Some(seq) = tree.child() {
        let before = seq.get(bootstrap::GRAMMAR_EOI - 1);
        let eoi = seq.get(bootstrap::GRAMMAR_EOI);
        if let (Some(before), Some(eoi)) = (before, eoi) {
            if before.is_valid() && !eoi.is_valid() {
                let start = eoi.span().start();
                return match malformed_production(&description[start as usize..]) {
                    Some(end) => {
                        log::debug!("Production at {start} failed to parse at {}", start + end);
                        GrammarError::Syntax {
                            at: Span::new(0, start + end),
                        }
                    }
                    None => GrammarError::TrailingInput {
                        at: Span::new(start, description.len() as u32),
                    },
                };
            }
        }
    }

    let failure = tree.deepest_failure().unwrap_or(tree);
    log::debug!("Description failed to parse at {}", failure.span());
    GrammarError::Syntax {
        at: Span::new(0, failure.span().end()),
    }
}

/// If `rest` starts a production which got as far as its `:`, the end of its deepest failure.
///
/// The repetition in `grammar` drops the failed attempt, so anything that only goes wrong after
/// the first production would otherwise look like trailing input.
fn malformed_production(rest: &str) -> Option<u32> {
    let node = bootstrap::grammar().parse_named("production", rest)?;
    let colon = node.child()?.get(bootstrap::PRODUCTION_COLON)?;
    if !colon.is_valid() {
        return None;
    }
    let failure = node.deepest_failure().unwrap_or(&node);
    Some(failure.span().end())
}
