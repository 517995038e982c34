//! Built-in character tests that host grammars can bind by name.
//!
//! None of these are reachable from the description syntax itself, a grammar gets them either
//! through [`Expression::Predicate`](crate::Expression::Predicate) or by passing them to
//! [`Grammar::with_predicates`](crate::Grammar::with_predicates), which binds every otherwise
//! undefined rule reference of the same name.

use std::fmt::Debug;

#[derive(Clone, Copy)]
pub enum PredicateFn {
    /// Tests the first char of the remaining input, a match consumes exactly that char.
    Char(fn(char) -> bool),
    /// Inspects the remaining input and returns the number of bytes it matched.
    Prefix(fn(&str) -> Option<usize>),
}

#[derive(Clone, Copy)]
pub struct Predicate {
    pub name: &'static str,
    pub test: PredicateFn,
}

impl Predicate {
    pub const fn char(name: &'static str, test: fn(char) -> bool) -> Predicate {
        Predicate {
            name,
            test: PredicateFn::Char(test),
        }
    }
    pub const fn prefix(name: &'static str, test: fn(&str) -> Option<usize>) -> Predicate {
        Predicate {
            name,
            test: PredicateFn::Prefix(test),
        }
    }

    pub fn builtins() -> &'static [Predicate] {
        BUILTINS
    }

    pub fn builtin(name: &str) -> Option<Predicate> {
        BUILTINS.iter().find(|p| p.name == name).copied()
    }

    /// Whether the predicate may succeed without consuming input.
    pub fn matches_empty(&self) -> bool {
        matches!(self.test, PredicateFn::Prefix(_))
    }

    /// Runs the predicate against the remaining input, returning the matched length in bytes.
    pub fn matches(&self, rest: &str) -> Option<usize> {
        match self.test {
            PredicateFn::Char(test) => {
                let c = rest.chars().next()?;
                test(c).then(|| c.len_utf8())
            }
            PredicateFn::Prefix(test) => {
                let len = test(rest)?;
                if len <= rest.len() && rest.is_char_boundary(len) {
                    Some(len)
                } else {
                    log::warn!(
                        "Predicate ${} matched {len} bytes of a {} byte input, treating it as a failure",
                        self.name,
                        rest.len()
                    );
                    None
                }
            }
        }
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Predicate {}

impl Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self.name)
    }
}

pub fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t')
}

pub fn is_space(c: char) -> bool {
    is_blank(c) || matches!(c, '\n' | '\r' | '\x0B' | '\x0C')
}

pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic()
}

pub fn is_alnum(c: char) -> bool {
    is_alpha(c) || is_digit(c)
}

pub fn is_nonquote(c: char) -> bool {
    c != '"'
}

pub fn end_of_input(rest: &str) -> Option<usize> {
    rest.is_empty().then_some(0)
}

pub const BLANK: Predicate = Predicate::char("blank", is_blank);
pub const SPACE: Predicate = Predicate::char("space", is_space);
pub const DIGIT: Predicate = Predicate::char("digit", is_digit);
pub const ALPHA: Predicate = Predicate::char("alpha", is_alpha);
pub const ALNUM: Predicate = Predicate::char("alnum", is_alnum);
pub const NONQUOTE: Predicate = Predicate::char("nonquote", is_nonquote);
pub const EOI: Predicate = Predicate::prefix("eoi", end_of_input);

static BUILTINS: &[Predicate] = &[BLANK, SPACE, DIGIT, ALPHA, ALNUM, NONQUOTE, EOI];
