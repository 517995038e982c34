//! Runs resolved rules against an input.
//!
//! Every op produces exactly one node, evaluation is a pure function of the op and the position
//! it starts at. Nothing is memoized and nothing backtracks past a sequence or choice boundary.

use crate::{
    cursor::Cursor,
    grammar::{Grammar, RuleHandle},
    lower::Op,
    span::Span,
    tree::{NodeKind, ParseNode},
};

impl Grammar {
    /// Parses `input` starting at the first declared rule.
    pub fn parse<'a>(&self, input: &'a str) -> ParseNode<'a> {
        self.parse_rule(self.start(), input)
    }

    #[track_caller]
    pub fn parse_rule<'a>(&self, rule: RuleHandle, input: &'a str) -> ParseNode<'a> {
        // guard every later offset conversion in one place
        assert!(u32::try_from(input.len()).is_ok(), "Input too large");
        Engine {
            grammar: self,
            src: input,
        }
        .rule(rule, 0)
    }

    /// Like [`Grammar::parse_rule`], `None` when no rule called `name` exists.
    pub fn parse_named<'a>(&self, name: &str, input: &'a str) -> Option<ParseNode<'a>> {
        let rule = self.rule(name)?;
        Some(self.parse_rule(rule, input))
    }
}

struct Engine<'g, 'a> {
    grammar: &'g Grammar,
    src: &'a str,
}

impl<'g, 'a> Engine<'g, 'a> {
    fn node(&self, valid: bool, start: u32, end: u32, kind: NodeKind<'a>) -> ParseNode<'a> {
        ParseNode::new(valid, Span::new(start, end), self.src, kind)
    }

    fn rule(&self, handle: RuleHandle, pos: u32) -> ParseNode<'a> {
        log::trace!("{} at {pos}", handle.name(self.grammar));

        let child = self.eval(self.grammar.op(handle), pos);
        self.node(
            child.is_valid(),
            pos,
            child.span().end(),
            NodeKind::Nonterminal {
                rule: handle,
                child: Some(Box::new(child)),
            },
        )
    }

    fn eval(&self, op: &'g Op, pos: u32) -> ParseNode<'a> {
        let mut cursor = Cursor::at(self.src, pos);
        match op {
            Op::Terminal(text) => {
                let valid = cursor.sequence(text);
                self.node(valid, pos, cursor.pos(), NodeKind::Terminal)
            }
            Op::Predicate(predicate) => {
                let kind = NodeKind::Predicate {
                    name: predicate.name,
                };
                match predicate.matches(cursor.rest()) {
                    Some(len) => self.node(true, pos, pos + len as u32, kind),
                    None => self.node(false, pos, pos, kind),
                }
            }
            Op::Rule(handle) => self.rule(*handle, pos),
            Op::Sequence(children) => self.sequence(children, cursor),
            Op::Choice(alternatives) => self.choice(alternatives, pos),
            Op::Repetition(element) => self.repetition(element, cursor),
        }
    }

    fn sequence(&self, children: &'g [Op], mut cursor: Cursor<'a>) -> ParseNode<'a> {
        let start = cursor.pos();
        let mut nodes = Vec::with_capacity(children.len());
        let mut children = children.iter();

        let mut valid = true;
        for child in children.by_ref() {
            let node = self.eval(child, cursor.pos());
            // a failed element still accounts for what it consumed before failing
            cursor.restore_pos(node.span().end());
            valid = node.is_valid();
            nodes.push(node);
            if !valid {
                break;
            }
        }
        for child in children {
            nodes.push(self.unattempted(child, cursor.pos()));
        }

        self.node(valid, start, cursor.pos(), NodeKind::Sequence(nodes))
    }

    fn choice(&self, alternatives: &'g [Op], pos: u32) -> ParseNode<'a> {
        let mut last = None;
        for (index, alternative) in alternatives.iter().enumerate() {
            let node = self.eval(alternative, pos);
            let valid = node.is_valid();
            last = Some((index, node));
            if valid {
                break;
            }
        }

        match last {
            Some((index, node)) => self.node(
                node.is_valid(),
                pos,
                node.span().end(),
                NodeKind::Choice {
                    index,
                    node: Box::new(node),
                },
            ),
            // lowering never produces an empty choice
            None => self.unattempted_choice(alternatives, pos),
        }
    }

    fn repetition(&self, element: &'g Op, mut cursor: Cursor<'a>) -> ParseNode<'a> {
        let start = cursor.pos();
        let mut nodes = Vec::new();
        loop {
            let node = self.eval(element, cursor.pos());
            // an empty match would repeat forever
            if !node.is_valid() || node.span().is_empty() {
                break;
            }
            cursor.restore_pos(node.span().end());
            nodes.push(node);
        }
        self.node(true, start, cursor.pos(), NodeKind::Repetition(nodes))
    }

    /// The shape `op` would have produced, without running it.
    fn unattempted(&self, op: &'g Op, pos: u32) -> ParseNode<'a> {
        let kind = match op {
            Op::Terminal(_) => NodeKind::Terminal,
            Op::Predicate(predicate) => NodeKind::Predicate {
                name: predicate.name,
            },
            Op::Rule(handle) => NodeKind::Nonterminal {
                rule: *handle,
                child: None,
            },
            Op::Sequence(children) => NodeKind::Sequence(
                children
                    .iter()
                    .map(|child| self.unattempted(child, pos))
                    .collect(),
            ),
            Op::Choice(alternatives) => return self.unattempted_choice(alternatives, pos),
            Op::Repetition(_) => NodeKind::Repetition(Vec::new()),
        };
        self.node(false, pos, pos, kind)
    }

    fn unattempted_choice(&self, alternatives: &'g [Op], pos: u32) -> ParseNode<'a> {
        let node = match alternatives.first() {
            Some(first) => self.unattempted(first, pos),
            None => self.node(false, pos, pos, NodeKind::Sequence(Vec::new())),
        };
        self.node(
            false,
            pos,
            pos,
            NodeKind::Choice {
                index: 0,
                node: Box::new(node),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::{expr::*, grammar::Grammar, predicate::Predicate, tree::NodeKind};

    fn grammar(productions: impl IntoIterator<Item = Production>) -> Grammar {
        Grammar::with_predicates(productions, Predicate::builtins()).unwrap()
    }

    fn single(expression: Expression) -> Grammar {
        grammar([Production::new("r", expression)])
    }

    #[test]
    fn terminal_must_match_exactly() {
        let g = single(terminal("foo"));

        let node = g.parse("foo");
        assert!(node.is_valid());
        assert_eq!(node.text(), "foo");

        let node = g.parse("bar");
        assert!(!node.is_valid());
        assert_eq!(node.text(), "");
        assert_eq!(node.child().unwrap().kind(), &NodeKind::Terminal);

        let node = g.parse("fo");
        assert!(!node.is_valid());
        assert_eq!(node.text(), "");
    }

    #[test]
    fn sequence_stops_at_first_failure() {
        let g = single(sequence([terminal("foo"), terminal("bar"), terminal("baz")]));
        let node = g.parse("foobbar");
        assert!(!node.is_valid());
        assert_eq!(node.text(), "foo");

        let seq = node.child().unwrap();
        assert_eq!(seq.children().len(), 3);
        let (foo, bar, baz) = (seq.get(0).unwrap(), seq.get(1).unwrap(), seq.get(2).unwrap());
        assert!(foo.is_valid());
        assert_eq!(foo.text(), "foo");
        assert!(!bar.is_valid());
        assert_eq!(bar.text(), "");
        assert!(!baz.is_valid());
        assert_eq!(baz.span().start(), 3);
    }

    #[test]
    fn sequence_placeholders_keep_shape() {
        let g = grammar([
            Production::new(
                "r",
                sequence([
                    terminal("x"),
                    nonterminal("s"),
                    choice([sequence([terminal("a"), terminal("b")]), terminal("c")]),
                    repetition(terminal("d")),
                ]),
            ),
            Production::new("s", terminal("s")),
        ]);
        let node = g.parse("y");
        let seq = node.child().unwrap();

        let s = seq.get(1).unwrap();
        assert!(!s.is_valid());
        assert!(s.rule().is_some());
        assert!(s.child().is_none());

        let (index, first) = seq.get(2).unwrap().alternative().unwrap();
        assert_eq!(index, 0);
        assert_eq!(first.children().len(), 2);

        let rep = seq.get(3).unwrap();
        assert!(!rep.is_valid());
        assert_eq!(rep.repetitions().map(<[_]>::len), Some(0));
    }

    #[test]
    fn choice_failure_keeps_last_alternative() {
        let g = single(choice([terminal("foo"), sequence([terminal("b"), terminal("x")])]));

        let node = g.parse("bar");
        assert!(!node.is_valid());
        let (index, last) = node.child().unwrap().alternative().unwrap();
        assert_eq!(index, 1);
        assert_eq!(last.text(), "b");
        assert_eq!(node.text(), "b");
    }

    #[test]
    fn repetition_stops_on_empty_match() {
        let g = single(repetition(choice([terminal("a"), terminal("")])));
        let node = g.parse("aab");
        assert!(node.is_valid());
        assert_eq!(node.text(), "aa");
        assert_eq!(node.child().unwrap().repetitions().unwrap().len(), 2);
    }

    #[test]
    fn predicates() {
        let g = single(sequence([
            predicate(Predicate::builtin("alpha").unwrap()),
            repetition(nonterminal("alnum")),
            nonterminal("eoi"),
        ]));
        assert!(g.parse("a1b2").is_valid());
        assert!(!g.parse("1ab").is_valid());
        assert!(!g.parse("ab-").is_valid());

        let node = g.parse("ab-");
        assert_eq!(node.text(), "ab");
        let eoi = node.child().unwrap().get(2).unwrap();
        assert_eq!(eoi.kind(), &NodeKind::Predicate { name: "eoi" });
    }

    #[test]
    fn parse_named() {
        let g = grammar([
            Production::new("a", terminal("a")),
            Production::new("b", terminal("b")),
        ]);
        assert!(g.parse_named("b", "b").unwrap().is_valid());
        assert!(!g.parse("b").is_valid());
        assert!(g.parse_named("c", "c").is_none());
    }
}
