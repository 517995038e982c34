//! Resolve rule references into handles. There are no scopes nor shadowing beyond productions
//! taking precedence over host predicates of the same name.

use std::collections::HashMap;

use crate::{error::GrammarError, expr::Expression, grammar::RuleHandle, predicate::Predicate};

/// Expression with every name resolved, this is what the engine runs.
#[derive(Clone, Debug)]
pub(crate) enum Op {
    Terminal(Box<str>),
    Rule(RuleHandle),
    Predicate(Predicate),
    Sequence(Box<[Op]>),
    Choice(Box<[Op]>),
    Repetition(Box<Op>),
}

impl Op {
    pub(crate) fn children(&self) -> &[Op] {
        match self {
            Op::Sequence(ops) | Op::Choice(ops) => ops,
            Op::Repetition(op) => std::slice::from_ref(&**op),
            _ => &[],
        }
    }
}

pub(crate) struct LowerCx<'a> {
    pub name_to_rule: &'a HashMap<String, RuleHandle>,
    pub predicates: &'a [Predicate],
    /// The production being lowered, for error reporting.
    pub rule: &'a str,
}

impl LowerCx<'_> {
    fn resolve(&self, name: &str) -> Result<Op, GrammarError> {
        if let Some(&handle) = self.name_to_rule.get(name) {
            return Ok(Op::Rule(handle));
        }
        if let Some(predicate) = self.predicates.iter().find(|p| p.name == name) {
            return Ok(Op::Predicate(*predicate));
        }
        Err(GrammarError::UndefinedRule {
            rule: self.rule.to_owned(),
            name: name.to_owned(),
        })
    }
}

pub(crate) fn lower(expr: &Expression, cx: &LowerCx) -> Result<Op, GrammarError> {
    let lower_all = |children: &[Expression]| -> Result<Box<[Op]>, GrammarError> {
        if children.is_empty() {
            return Err(GrammarError::EmptyExpression {
                rule: cx.rule.to_owned(),
            });
        }
        children.iter().map(|child| lower(child, cx)).collect()
    };

    let op = match expr {
        Expression::Terminal(text) => Op::Terminal(text.as_str().into()),
        Expression::Nonterminal(name) => cx.resolve(name)?,
        Expression::Predicate(predicate) => Op::Predicate(*predicate),
        Expression::Sequence(children) => Op::Sequence(lower_all(children)?),
        Expression::Choice(children) => Op::Choice(lower_all(children)?),
        Expression::Repetition(element) => Op::Repetition(Box::new(lower(element, cx)?)),
    };
    Ok(op)
}
