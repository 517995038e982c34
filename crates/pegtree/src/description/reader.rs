//! Reads descriptions directly, without going through the engine.

use crate::{
    cursor::Cursor,
    error::GrammarError,
    expr::{Expression, Production},
    predicate::{is_alnum, is_nonquote, is_space},
    span::Span,
};

/// Reads a grammar description into its productions.
///
/// Accepts exactly what the description grammar accepts and produces the same productions as
/// [`compile_grammar`](crate::compile_grammar), without resolving any names.
pub fn read_grammar(description: &str) -> Result<Vec<Production>, GrammarError> {
    let mut reader = Reader {
        cursor: Cursor::new(description),
        furthest: 0,
    };
    reader.grammar()
}

struct Reader<'a> {
    cursor: Cursor<'a>,
    /// Furthest position at which something failed to match.
    furthest: u32,
}

impl Reader<'_> {
    fn grammar(&mut self) -> Result<Vec<Production>, GrammarError> {
        self.skip_space();
        let Some(first) = self.production() else {
            return Err(GrammarError::Syntax {
                at: Span::new(0, self.furthest),
            });
        };

        let mut productions = vec![first];
        loop {
            let pos = self.cursor.pos();
            self.skip_space();
            let start = self.cursor.pos();
            match self.production() {
                Some(production) => productions.push(production),
                // got past its `:`, so this is a broken production rather than trailing input
                None if self.has_colon(start) => {
                    return Err(GrammarError::Syntax {
                        at: Span::new(0, self.furthest),
                    })
                }
                None => {
                    self.cursor.restore_pos(pos);
                    break;
                }
            }
        }

        self.skip_space();
        if !self.cursor.is_empty() {
            let end = self.cursor.src().len() as u32;
            return Err(GrammarError::TrailingInput {
                at: Span::new(self.cursor.pos(), end),
            });
        }

        Ok(productions)
    }

    fn production(&mut self) -> Option<Production> {
        let name = self.nonterminal()?;
        self.skip_space();
        self.expect(':')?;
        self.skip_space();
        let expression = self.expression()?;
        self.skip_space();
        self.expect(';')?;
        Some(Production::new(name, expression))
    }

    fn expression(&mut self) -> Option<Expression> {
        let mut alternatives = vec![self.seq_expr()?];
        while let Some(alternative) = self.attempt(|r| {
            r.skip_space();
            r.expect('|')?;
            r.skip_space();
            r.seq_expr()
        }) {
            alternatives.push(alternative);
        }
        Some(collapse(alternatives, Expression::Choice))
    }

    fn seq_expr(&mut self) -> Option<Expression> {
        let mut elements = vec![self.prim_expr()?];
        while let Some(element) = self.attempt(|r| {
            // at least one space separates elements
            r.expect_with(is_space)?;
            r.skip_space();
            r.prim_expr()
        }) {
            elements.push(element);
        }
        Some(collapse(elements, Expression::Sequence))
    }

    fn prim_expr(&mut self) -> Option<Expression> {
        match self.cursor.peek() {
            Some('(') => {
                self.cursor.next();
                self.skip_space();
                let inner = self.expression()?;
                self.skip_space();
                self.expect(')')?;
                Some(inner)
            }
            Some('"') => {
                self.cursor.next();
                let literal = self.cursor.consume_while(is_nonquote);
                self.expect('"')?;
                Some(Expression::Terminal(
                    literal.as_str(self.cursor.src()).to_owned(),
                ))
            }
            _ => self.nonterminal().map(Expression::Nonterminal),
        }
    }

    fn nonterminal(&mut self) -> Option<String> {
        let span = self.cursor.consume_while(|c| is_alnum(c) || c == '_');
        if span.is_empty() {
            self.fail();
            return None;
        }
        Some(span.as_str(self.cursor.src()).to_owned())
    }

    /// Whether the text at `pos` is a name followed by `:`.
    fn has_colon(&self, pos: u32) -> bool {
        let mut cursor = Cursor::at(self.cursor.src(), pos);
        if cursor.consume_while(|c| is_alnum(c) || c == '_').is_empty() {
            return false;
        }
        cursor.consume_while(is_space);
        cursor.consume(':')
    }

    fn skip_space(&mut self) {
        self.cursor.consume_while(is_space);
    }

    fn expect(&mut self, c: char) -> Option<()> {
        if self.cursor.consume(c) {
            Some(())
        } else {
            self.fail();
            None
        }
    }

    fn expect_with(&mut self, test: impl Fn(char) -> bool) -> Option<()> {
        match self.cursor.peek() {
            Some(next) if test(next) => {
                self.cursor.next();
                Some(())
            }
            _ => {
                self.fail();
                None
            }
        }
    }

    fn fail(&mut self) {
        self.furthest = self.furthest.max(self.cursor.pos());
    }

    /// Runs `fun`, putting the cursor back where it was if it fails.
    fn attempt<T>(&mut self, fun: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let pos = self.cursor.pos();
        let result = fun(self);
        if result.is_none() {
            self.cursor.restore_pos(pos);
        }
        result
    }
}

fn collapse(mut items: Vec<Expression>, wrap: fn(Vec<Expression>) -> Expression) -> Expression {
    match items.len() {
        1 => items.remove(0),
        _ => wrap(items),
    }
}
