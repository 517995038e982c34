use std::fmt::{Display, Write};

use crate::predicate::Predicate;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Expression {
    // base nodes
    Terminal(String),
    Nonterminal(String),
    Predicate(Predicate),
    // structuring nodes
    Sequence(Vec<Expression>),
    Choice(Vec<Expression>),
    // repetition
    Repetition(Box<Expression>),
}

pub fn terminal(text: impl Into<String>) -> Expression {
    Expression::Terminal(text.into())
}

pub fn nonterminal(name: impl Into<String>) -> Expression {
    Expression::Nonterminal(name.into())
}

pub fn predicate(predicate: Predicate) -> Expression {
    Expression::Predicate(predicate)
}

pub fn sequence(children: impl IntoIterator<Item = Expression>) -> Expression {
    Expression::Sequence(children.into_iter().collect())
}

pub fn choice(alternatives: impl IntoIterator<Item = Expression>) -> Expression {
    Expression::Choice(alternatives.into_iter().collect())
}

pub fn repetition(element: Expression) -> Expression {
    Expression::Repetition(Box::new(element))
}

impl Expression {
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::Choice(_))
    }
    pub fn children(&self) -> &[Expression] {
        match self {
            Expression::Sequence(vec) | Expression::Choice(vec) => vec,
            Expression::Repetition(a) => std::slice::from_ref(&**a),
            _ => &[],
        }
    }
    pub fn visit(&self, fun: &mut dyn FnMut(&Expression)) {
        fun(self);
        for child in self.children() {
            child.visit(fun);
        }
    }

    fn display_into(&self, buf: &mut dyn Write, nested: bool) -> std::fmt::Result {
        match self {
            Expression::Terminal(text) => write!(buf, "\"{text}\""),
            Expression::Nonterminal(name) => buf.write_str(name),
            Expression::Predicate(p) => write!(buf, "${}", p.name),
            Expression::Sequence(vec) | Expression::Choice(vec) => {
                let separator = match self.is_sequence() {
                    true => " ",
                    false => " | ",
                };
                // a sequence nested directly in a sequence, or a choice nested anywhere, needs
                // parentheses to survive a round trip through the description syntax
                let parens = nested && (self.is_choice() || vec.len() > 1);
                if parens {
                    buf.write_char('(')?;
                }
                for (i, child) in vec.iter().enumerate() {
                    if i > 0 {
                        buf.write_str(separator)?;
                    }
                    let nested_child = match self.is_sequence() {
                        true => true,
                        false => child.is_choice(),
                    };
                    child.display_into(buf, nested_child)?;
                }
                if parens {
                    buf.write_char(')')?;
                }
                Ok(())
            }
            Expression::Repetition(element) => {
                buf.write_char('(')?;
                element.display_into(buf, false)?;
                buf.write_str(")*")
            }
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.display_into(f, false)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Production {
    pub name: String,
    pub expression: Expression,
}

impl Production {
    pub fn new(name: impl Into<String>, expression: Expression) -> Production {
        Production {
            name: name.into(),
            expression,
        }
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {};", self.name, self.expression)
    }
}
