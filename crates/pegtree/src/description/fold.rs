//! Parse tree of the description grammar to [`Production`]s.
//!
//! Every function expects a valid node of its rule and returns `None` when the tree does not have
//! the expected shape.

use crate::{
    expr::{Expression, Production},
    grammar::Grammar,
    tree::ParseNode,
};

pub(crate) fn grammar(node: &ParseNode, cx: &Grammar) -> Option<Vec<Production>> {
    let seq = rule_body(node, cx, "grammar")?;

    let mut productions = vec![production(seq.get(1)?, cx)?];
    for rep in seq.get(2)?.repetitions()? {
        productions.push(production(rep.get(1)?, cx)?);
    }

    Some(productions)
}

/// The node the rule `name` dispatched to, `node` must be a valid reference to it.
fn rule_body<'n, 'a>(
    node: &'n ParseNode<'a>,
    cx: &Grammar,
    name: &str,
) -> Option<&'n ParseNode<'a>> {
    if !node.is_valid() || node.rule()?.name(cx) != name {
        return None;
    }
    node.child()
}

fn production(node: &ParseNode, cx: &Grammar) -> Option<Production> {
    let seq = rule_body(node, cx, "production")?;

    let name = seq.get(0)?;
    rule_body(name, cx, "nonterminal")?;
    let expression = expression(seq.get(4)?, cx)?;

    Some(Production::new(name.text(), expression))
}

fn expression(node: &ParseNode, cx: &Grammar) -> Option<Expression> {
    let alt = rule_body(node, cx, "expression")?;
    alt_expr(alt, cx)
}

fn alt_expr(node: &ParseNode, cx: &Grammar) -> Option<Expression> {
    let seq = rule_body(node, cx, "alt_expr")?;

    let mut alternatives = vec![seq_expr(seq.get(0)?, cx)?];
    for rep in seq.get(1)?.repetitions()? {
        alternatives.push(seq_expr(rep.get(3)?, cx)?);
    }

    Some(collapse(alternatives, Expression::Choice))
}

fn seq_expr(node: &ParseNode, cx: &Grammar) -> Option<Expression> {
    let seq = rule_body(node, cx, "seq_expr")?;

    let mut elements = vec![prim_expr(seq.get(0)?, cx)?];
    for rep in seq.get(1)?.repetitions()? {
        elements.push(prim_expr(rep.get(1)?, cx)?);
    }

    Some(collapse(elements, Expression::Sequence))
}

fn prim_expr(node: &ParseNode, cx: &Grammar) -> Option<Expression> {
    let choice = rule_body(node, cx, "prim_expr")?;
    let (_, inner) = choice.alternative()?;

    match inner.rule()?.name(cx) {
        "paren_expr" => {
            let seq = rule_body(inner, cx, "paren_expr")?;
            expression(seq.get(2)?, cx)
        }
        "terminal" => {
            let seq = rule_body(inner, cx, "terminal")?;
            Some(Expression::Terminal(seq.get(1)?.text().to_owned()))
        }
        "nonterminal" => {
            rule_body(inner, cx, "nonterminal")?;
            Some(Expression::Nonterminal(inner.text().to_owned()))
        }
        _ => None,
    }
}

/// A single element stands for itself.
fn collapse(mut items: Vec<Expression>, wrap: fn(Vec<Expression>) -> Expression) -> Expression {
    match items.len() {
        1 => items.remove(0),
        _ => wrap(items),
    }
}
