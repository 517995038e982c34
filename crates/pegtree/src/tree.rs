use std::fmt::{Display, Write};

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::{
    grammar::{Grammar, RuleHandle},
    span::Span,
};

/// The result of running one expression at one position.
///
/// Nodes borrow the text they matched from the parsed input and mirror the shape of the
/// expression that produced them, see [`NodeKind`]. A node which failed is still a complete
/// tree, its children record how far the match got.
#[derive(Clone, Debug)]
pub struct ParseNode<'a> {
    valid: bool,
    span: Span,
    text: &'a str,
    kind: NodeKind<'a>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum NodeKind<'a> {
    Terminal,
    Predicate {
        name: &'static str,
    },
    /// `child` is only missing when the reference itself was never attempted.
    Nonterminal {
        rule: RuleHandle,
        child: Option<Box<ParseNode<'a>>>,
    },
    /// Always one node per element of the sequence.
    Sequence(Vec<ParseNode<'a>>),
    /// The winning alternative, or the last one if all of them failed.
    Choice {
        index: usize,
        node: Box<ParseNode<'a>>,
    },
    /// Only the successful iterations.
    Repetition(Vec<ParseNode<'a>>),
}

impl<'a> ParseNode<'a> {
    pub(crate) fn new(valid: bool, span: Span, src: &'a str, kind: NodeKind<'a>) -> Self {
        Self {
            valid,
            span,
            text: span.as_str(src),
            kind,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The consumed part of the input. On failure this is how far the match got before failing.
    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn kind(&self) -> &NodeKind<'a> {
        &self.kind
    }

    pub fn rule(&self) -> Option<RuleHandle> {
        match &self.kind {
            NodeKind::Nonterminal { rule, .. } => Some(*rule),
            _ => None,
        }
    }

    /// The node of the production a nonterminal dispatched to.
    pub fn child(&self) -> Option<&ParseNode<'a>> {
        match &self.kind {
            NodeKind::Nonterminal { child, .. } => child.as_deref(),
            _ => None,
        }
    }

    /// The `i`-th element of a sequence.
    pub fn get(&self, i: usize) -> Option<&ParseNode<'a>> {
        match &self.kind {
            NodeKind::Sequence(children) => children.get(i),
            _ => None,
        }
    }

    pub fn alternative(&self) -> Option<(usize, &ParseNode<'a>)> {
        match &self.kind {
            NodeKind::Choice { index, node } => Some((*index, node)),
            _ => None,
        }
    }

    pub fn repetitions(&self) -> Option<&[ParseNode<'a>]> {
        match &self.kind {
            NodeKind::Repetition(children) => Some(children),
            _ => None,
        }
    }

    pub fn children(&self) -> &[ParseNode<'a>] {
        match &self.kind {
            NodeKind::Terminal | NodeKind::Predicate { .. } => &[],
            NodeKind::Nonterminal { child, .. } => match child {
                Some(child) => std::slice::from_ref(&**child),
                None => &[],
            },
            NodeKind::Sequence(children) | NodeKind::Repetition(children) => children,
            NodeKind::Choice { node, .. } => std::slice::from_ref(&**node),
        }
    }

    /// Follows the failure down to the innermost node which was attempted and failed, `None` for
    /// a valid node.
    pub fn deepest_failure(&self) -> Option<&ParseNode<'a>> {
        if self.valid {
            return None;
        }
        let inner = match &self.kind {
            NodeKind::Nonterminal { child, .. } => {
                child.as_deref().and_then(ParseNode::deepest_failure)
            }
            // elements after the first failure are placeholders
            NodeKind::Sequence(children) => children
                .iter()
                .find(|c| !c.valid)
                .and_then(ParseNode::deepest_failure),
            NodeKind::Choice { node, .. } => node.deepest_failure(),
            NodeKind::Terminal | NodeKind::Predicate { .. } | NodeKind::Repetition(_) => None,
        };
        Some(inner.unwrap_or(self))
    }

    /// Indented rendering of the tree, one node per line.
    pub fn display<'n, 'g>(&'n self, grammar: &'g Grammar) -> TreeDisplay<'n, 'g, 'a> {
        TreeDisplay {
            node: self,
            grammar,
        }
    }

    /// A view of the tree which serializes with rule names instead of handles.
    pub fn serialize<'n, 'g>(&'n self, grammar: &'g Grammar) -> SerializeNode<'n, 'g, 'a> {
        SerializeNode {
            node: self,
            grammar,
        }
    }

    fn print(&self, buf: &mut dyn Write, grammar: &Grammar, level: usize) -> std::fmt::Result {
        for _ in 0..level {
            buf.write_str("  ")?;
        }
        match &self.kind {
            NodeKind::Terminal => buf.write_str("Terminal")?,
            NodeKind::Predicate { name } => write!(buf, "${name}")?,
            NodeKind::Nonterminal { rule, .. } => buf.write_str(rule.name(grammar))?,
            NodeKind::Sequence(_) => buf.write_str("Sequence")?,
            NodeKind::Choice { index, .. } => write!(buf, "Choice #{index}")?,
            NodeKind::Repetition(_) => buf.write_str("Repetition")?,
        }
        write!(buf, " {:?}", self.text)?;
        if !self.valid {
            buf.write_str(" !!invalid")?;
        }
        buf.write_char('\n')?;
        for child in self.children() {
            child.print(buf, grammar, level + 1)?;
        }
        Ok(())
    }

    fn kind_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Terminal => "terminal",
            NodeKind::Predicate { .. } => "predicate",
            NodeKind::Nonterminal { .. } => "nonterminal",
            NodeKind::Sequence(_) => "sequence",
            NodeKind::Choice { .. } => "choice",
            NodeKind::Repetition(_) => "repetition",
        }
    }
}

/// Offsets are ignored, two nodes matching the same text the same way are equal wherever they
/// appear in the input.
impl PartialEq for ParseNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.valid == other.valid && self.text == other.text && self.kind == other.kind
    }
}

impl Eq for ParseNode<'_> {}

pub struct TreeDisplay<'n, 'g, 'a> {
    node: &'n ParseNode<'a>,
    grammar: &'g Grammar,
}

impl Display for TreeDisplay<'_, '_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.node.print(f, self.grammar, 0)
    }
}

pub struct SerializeNode<'n, 'g, 'a> {
    node: &'n ParseNode<'a>,
    grammar: &'g Grammar,
}

impl<'n, 'g, 'a> SerializeNode<'n, 'g, 'a> {
    fn wrap(&self, node: &'n ParseNode<'a>) -> SerializeNode<'n, 'g, 'a> {
        SerializeNode {
            node,
            grammar: self.grammar,
        }
    }
}

impl Serialize for SerializeNode<'_, '_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.node;
        let extra = match node.kind {
            NodeKind::Terminal => 0,
            NodeKind::Predicate { .. } | NodeKind::Sequence(_) | NodeKind::Repetition(_) => 1,
            NodeKind::Nonterminal { .. } | NodeKind::Choice { .. } => 2,
        };

        let mut state = serializer.serialize_struct("ParseNode", 5 + extra)?;
        state.serialize_field("kind", node.kind_name())?;
        state.serialize_field("valid", &node.valid)?;
        state.serialize_field("start", &node.span.start())?;
        state.serialize_field("end", &node.span.end())?;
        state.serialize_field("text", node.text)?;
        match &node.kind {
            NodeKind::Terminal => {}
            NodeKind::Predicate { name } => state.serialize_field("name", name)?,
            NodeKind::Nonterminal { rule, child } => {
                state.serialize_field("rule", rule.name(self.grammar))?;
                state.serialize_field("child", &child.as_deref().map(|c| self.wrap(c)))?;
            }
            NodeKind::Sequence(children) | NodeKind::Repetition(children) => {
                let children: Vec<_> = children.iter().map(|c| self.wrap(c)).collect();
                state.serialize_field("children", &children)?;
            }
            NodeKind::Choice { index, node } => {
                state.serialize_field("index", index)?;
                state.serialize_field("node", &self.wrap(node))?;
            }
        }
        state.end()
    }
}
