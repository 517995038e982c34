//! The description syntax written as a grammar of its own.
//!
//! ```text
//! grammar     : _ production (_ production)* _ $eoi;
//! production  : nonterminal _ ":" _ expression _ ";";
//! expression  : alt_expr;
//! alt_expr    : seq_expr (_ "|" _ seq_expr)*;
//! seq_expr    : prim_expr (__ prim_expr)*;
//! prim_expr   : paren_expr | terminal | nonterminal;
//! paren_expr  : "(" _ expression _ ")";
//! terminal    : "\"" literal "\"";
//! literal     : $nonquote*;
//! nonterminal : id_char id_char*;
//! id_char     : $alnum | "_";
//! __          : $space _;
//! _           : $space*;
//! ```

use std::sync::OnceLock;

use crate::{
    expr::{choice, nonterminal, predicate, repetition, sequence, terminal, Production},
    grammar::Grammar,
    predicate::{ALNUM, EOI, NONQUOTE, SPACE},
};

/// Position of the end of input check in the `grammar` rule's sequence.
pub(crate) const GRAMMAR_EOI: usize = 4;
/// Position of the `:` in the `production` rule's sequence.
pub(crate) const PRODUCTION_COLON: usize = 2;

pub fn productions() -> Vec<Production> {
    let nt = nonterminal;
    vec![
        Production::new(
            "grammar",
            sequence([
                nt("_"),
                nt("production"),
                repetition(sequence([nt("_"), nt("production")])),
                nt("_"),
                predicate(EOI),
            ]),
        ),
        Production::new(
            "production",
            sequence([
                nt("nonterminal"),
                nt("_"),
                terminal(":"),
                nt("_"),
                nt("expression"),
                nt("_"),
                terminal(";"),
            ]),
        ),
        Production::new("expression", nt("alt_expr")),
        Production::new(
            "alt_expr",
            sequence([
                nt("seq_expr"),
                repetition(sequence([nt("_"), terminal("|"), nt("_"), nt("seq_expr")])),
            ]),
        ),
        Production::new(
            "seq_expr",
            sequence([
                nt("prim_expr"),
                repetition(sequence([nt("__"), nt("prim_expr")])),
            ]),
        ),
        Production::new(
            "prim_expr",
            choice([nt("paren_expr"), nt("terminal"), nt("nonterminal")]),
        ),
        Production::new(
            "paren_expr",
            sequence([
                terminal("("),
                nt("_"),
                nt("expression"),
                nt("_"),
                terminal(")"),
            ]),
        ),
        Production::new(
            "terminal",
            sequence([terminal("\""), nt("literal"), terminal("\"")]),
        ),
        Production::new("literal", repetition(predicate(NONQUOTE))),
        Production::new(
            "nonterminal",
            sequence([nt("id_char"), repetition(nt("id_char"))]),
        ),
        Production::new("id_char", choice([predicate(ALNUM), terminal("_")])),
        Production::new("__", sequence([predicate(SPACE), nt("_")])),
        Production::new("_", repetition(predicate(SPACE))),
    ]
}

/// The description grammar, built on first use.
pub fn grammar() -> &'static Grammar {
    static GRAMMAR: OnceLock<Grammar> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Grammar::new(productions()).expect("The description grammar is well formed")
    })
}
