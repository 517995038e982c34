use pegtree::{
    compile_grammar, description::parse_description, expr::*, read_grammar, Grammar, ParseNode,
};
use proptest::prelude::*;

fn expression() -> impl Strategy<Value = Expression> {
    let leaf = prop_oneof![
        "[a-z ;|()]{0,4}".prop_map(Expression::Terminal),
        "[a-z_][a-z0-9_]{0,5}".prop_map(Expression::Nonterminal),
    ];
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4).prop_map(Expression::Sequence),
            prop::collection::vec(inner, 2..4).prop_map(Expression::Choice),
        ]
    })
}

fn check_spans(node: &ParseNode, input: &str) {
    let span = node.span();
    assert!(span.end() as usize <= input.len());
    assert_eq!(node.text(), span.as_str(input));
    for child in node.children() {
        assert!(span.contains_span(child.span()));
        check_spans(child, input);
    }
}

fn parens() -> Grammar {
    compile_grammar(r#"list: item list | ""; item: "(" list ")" | "x";"#).unwrap()
}

proptest! {
    #[test]
    fn description_round_trip(expr in expression()) {
        let description = format!("r: {expr};");
        let expected = vec![Production::new("r", expr)];
        prop_assert_eq!(parse_description(&description).unwrap(), expected.clone());
        prop_assert_eq!(read_grammar(&description).unwrap(), expected);
    }

    #[test]
    fn spans_nest_within_input(input in "[()x ]{0,30}") {
        let grammar = parens();
        let tree = grammar.parse(&input);
        prop_assert_eq!(tree.span().start(), 0);
        check_spans(&tree, &input);
    }

    #[test]
    fn repetition_always_succeeds(input in "[abc]{0,20}") {
        let grammar = Grammar::new([Production::new(
            "r",
            repetition(choice([terminal("a"), terminal("b")])),
        )])
        .unwrap();
        let tree = grammar.parse(&input);
        prop_assert!(tree.is_valid());

        let expected = input.find('c').unwrap_or(input.len());
        prop_assert_eq!(tree.text(), &input[..expected]);
        prop_assert_eq!(tree.child().unwrap().repetitions().unwrap().len(), expected);
    }

    #[test]
    fn sequences_keep_their_shape(input in "[ab]{0,4}") {
        let grammar = Grammar::new([Production::new(
            "r",
            sequence([terminal("a"), terminal("b"), terminal("a"), terminal("b")]),
        )])
        .unwrap();
        let tree = grammar.parse(&input);
        let seq = tree.child().unwrap();
        prop_assert_eq!(seq.children().len(), 4);

        // everything after the first failure is a placeholder
        let first_failure = seq.children().iter().position(|c| !c.is_valid());
        prop_assert_eq!(tree.is_valid(), first_failure.is_none());
        if let Some(i) = first_failure {
            for placeholder in &seq.children()[i..] {
                prop_assert!(!placeholder.is_valid());
                prop_assert!(placeholder.text().is_empty());
            }
        }
    }

    #[test]
    fn parses_are_deterministic(input in "[()x]{0,12}") {
        let grammar = parens();
        prop_assert_eq!(grammar.parse(&input), grammar.parse(&input));
    }
}
