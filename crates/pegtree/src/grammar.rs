use std::{
    collections::{hash_map::Entry, HashMap},
    fmt::{Debug, Display},
};

use cranelift_entity::{entity_impl, EntityRef, PrimaryMap};

use crate::{
    check,
    error::GrammarError,
    expr::{Expression, Production},
    lower::{self, LowerCx, Op},
    predicate::Predicate,
};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RuleHandle(u32);

entity_impl! { RuleHandle }

impl RuleHandle {
    pub fn name(self, grammar: &Grammar) -> &str {
        &grammar.production(self).name
    }
}

#[derive(Clone)]
pub(crate) struct Rule {
    pub production: Production,
    pub op: Op,
}

/// An ordered set of productions with every rule reference resolved.
///
/// A grammar is immutable once built and can be shared between any number of threads, each
/// running its own parses.
#[derive(Clone)]
pub struct Grammar {
    pub(crate) rules: PrimaryMap<RuleHandle, Rule>,
    name_to_rule: HashMap<String, RuleHandle>,
}

impl Grammar {
    pub fn new(productions: impl IntoIterator<Item = Production>) -> Result<Grammar, GrammarError> {
        Self::with_predicates(productions, &[])
    }

    /// Like [`Grammar::new`], `predicates` are bound to rule references which don't name any
    /// production.
    pub fn with_predicates(
        productions: impl IntoIterator<Item = Production>,
        predicates: &[Predicate],
    ) -> Result<Grammar, GrammarError> {
        let productions: Vec<Production> = productions.into_iter().collect();
        if productions.is_empty() {
            return Err(GrammarError::NoProductions);
        }

        let mut name_to_rule = HashMap::new();
        for (i, production) in productions.iter().enumerate() {
            if production.name.is_empty() {
                return Err(GrammarError::EmptyRuleName);
            }
            match name_to_rule.entry(production.name.clone()) {
                Entry::Occupied(_) => {
                    return Err(GrammarError::DuplicateRule {
                        name: production.name.clone(),
                    })
                }
                Entry::Vacant(entry) => {
                    entry.insert(RuleHandle::new(i));
                }
            }
        }

        let mut rules = PrimaryMap::with_capacity(productions.len());
        for production in productions {
            let cx = LowerCx {
                name_to_rule: &name_to_rule,
                predicates,
                rule: &production.name,
            };
            let op = lower::lower(&production.expression, &cx)?;
            rules.push(Rule { production, op });
        }

        let grammar = Grammar {
            rules,
            name_to_rule,
        };
        check::check_left_recursion(&grammar)?;

        log::debug!(
            "Compiled grammar with {} rules, starting at `{}`",
            grammar.len(),
            grammar.start().name(&grammar)
        );
        Ok(grammar)
    }

    pub fn rule(&self, name: &str) -> Option<RuleHandle> {
        self.name_to_rule.get(name).copied()
    }

    /// The first declared rule.
    pub fn start(&self) -> RuleHandle {
        RuleHandle::new(0)
    }

    #[track_caller]
    pub fn production(&self, handle: RuleHandle) -> &Production {
        &self.rules[handle].production
    }

    pub fn productions(&self) -> impl ExactSizeIterator<Item = &Production> + '_ {
        self.rules.values().map(|rule| &rule.production)
    }

    pub fn handles(&self) -> impl Iterator<Item = RuleHandle> {
        self.rules.keys()
    }

    pub fn expression(&self, name: &str) -> Option<&Expression> {
        let handle = self.rule(name)?;
        Some(&self.production(handle).expression)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Always false for a grammar that was built successfully.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn into_productions(self) -> Vec<Production> {
        self.rules
            .into_iter()
            .map(|(_, rule)| rule.production)
            .collect()
    }

    pub(crate) fn op(&self, handle: RuleHandle) -> &Op {
        &self.rules[handle].op
    }
}

impl PartialEq for Grammar {
    fn eq(&self, other: &Self) -> bool {
        self.productions().eq(other.productions())
    }
}

impl Eq for Grammar {}

impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for production in self.productions() {
            writeln!(f, "{production}")?;
        }
        Ok(())
    }
}

impl Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.productions()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{expr::*, predicate};

    fn parens() -> Vec<Production> {
        vec![
            Production::new(
                "foo",
                sequence([terminal("("), nonterminal("bar"), terminal(")")]),
            ),
            Production::new("bar", choice([nonterminal("foo"), terminal("")])),
        ]
    }

    #[test]
    fn lookup() {
        let grammar = Grammar::new(parens()).unwrap();
        assert_eq!(grammar.len(), 2);
        assert_eq!(grammar.start().name(&grammar), "foo");

        let bar = grammar.rule("bar").unwrap();
        assert_eq!(grammar.production(bar).name, "bar");
        assert_eq!(
            grammar.expression("bar"),
            Some(&choice([nonterminal("foo"), terminal("")]))
        );
        assert_eq!(grammar.rule("baz"), None);
        assert_eq!(grammar.expression("baz"), None);

        let names: Vec<_> = grammar.productions().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["foo", "bar"]);
    }

    #[test]
    fn equality_is_by_productions() {
        let a = Grammar::new(parens()).unwrap();
        let b = Grammar::new(parens()).unwrap();
        assert_eq!(a, b);

        let mut reversed = parens();
        reversed.reverse();
        let c = Grammar::new(reversed).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn display_lists_productions() {
        let grammar = Grammar::new(parens()).unwrap();
        assert_eq!(grammar.to_string(), "foo: \"(\" bar \")\";\nbar: foo | \"\";\n");
    }

    #[test]
    fn validation_errors() {
        assert_eq!(
            Grammar::new(Vec::new()).unwrap_err(),
            GrammarError::NoProductions
        );
        assert_eq!(
            Grammar::new([Production::new("", terminal("a"))]).unwrap_err(),
            GrammarError::EmptyRuleName
        );
        assert_eq!(
            Grammar::new([
                Production::new("a", terminal("a")),
                Production::new("a", terminal("b")),
            ])
            .unwrap_err(),
            GrammarError::DuplicateRule {
                name: "a".to_owned()
            }
        );
        assert_eq!(
            Grammar::new([Production::new("a", sequence([]))]).unwrap_err(),
            GrammarError::EmptyExpression {
                rule: "a".to_owned()
            }
        );
        assert_eq!(
            Grammar::new([Production::new("a", nonterminal("b"))]).unwrap_err(),
            GrammarError::UndefinedRule {
                rule: "a".to_owned(),
                name: "b".to_owned()
            }
        );
    }

    #[test]
    fn predicates_fill_undefined_names() {
        let productions = [Production::new(
            "number",
            sequence([nonterminal("digit"), repetition(nonterminal("digit"))]),
        )];
        assert!(Grammar::new(productions.clone()).is_err());

        let grammar = Grammar::with_predicates(productions, Predicate::builtins()).unwrap();
        // the expression keeps the name, only the resolved form changes
        assert_eq!(
            grammar.expression("number"),
            Some(&sequence([nonterminal("digit"), repetition(nonterminal("digit"))]))
        );
        assert!(matches!(
            grammar.op(grammar.start()).children()[0],
            Op::Predicate(p) if p == predicate::DIGIT
        ));
    }
}
