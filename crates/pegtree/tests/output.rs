use pegtree::compile_grammar;
use serde_json::json;

#[test]
fn tree_display() {
    let grammar = compile_grammar(r#"foo: "(" bar ")"; bar: foo | "";"#).unwrap();
    let tree = grammar.parse("()");
    let expected = r#"foo "()"
  Sequence "()"
    Terminal "("
    bar ""
      Choice #1 ""
        Terminal ""
    Terminal ")"
"#;
    assert_eq!(tree.display(&grammar).to_string(), expected);
}

#[test]
fn tree_display_marks_failures() {
    let grammar = compile_grammar(r#"r: "a" "b";"#).unwrap();
    let tree = grammar.parse("ac");
    let expected = r#"r "a" !!invalid
  Sequence "a" !!invalid
    Terminal "a"
    Terminal "" !!invalid
"#;
    assert_eq!(tree.display(&grammar).to_string(), expected);
}

#[test]
fn tree_json() {
    let grammar = compile_grammar(r#"r: "a" s; s: "b" | "c";"#).unwrap();
    let tree = grammar.parse("ac");
    let value = serde_json::to_value(tree.serialize(&grammar)).unwrap();
    assert_eq!(
        value,
        json!({
            "kind": "nonterminal",
            "valid": true,
            "start": 0,
            "end": 2,
            "text": "ac",
            "rule": "r",
            "child": {
                "kind": "sequence",
                "valid": true,
                "start": 0,
                "end": 2,
                "text": "ac",
                "children": [
                    { "kind": "terminal", "valid": true, "start": 0, "end": 1, "text": "a" },
                    {
                        "kind": "nonterminal",
                        "valid": true,
                        "start": 1,
                        "end": 2,
                        "text": "c",
                        "rule": "s",
                        "child": {
                            "kind": "choice",
                            "valid": true,
                            "start": 1,
                            "end": 2,
                            "text": "c",
                            "index": 1,
                            "node": { "kind": "terminal", "valid": true, "start": 1, "end": 2, "text": "c" }
                        }
                    }
                ]
            }
        })
    );
}

#[test]
fn unattempted_rule_has_null_child() {
    let grammar = compile_grammar(r#"r: "a" s; s: "b";"#).unwrap();
    let tree = grammar.parse("x");
    let value = serde_json::to_value(tree.serialize(&grammar)).unwrap();
    let placeholder = &value["child"]["children"][1];
    assert_eq!(placeholder["rule"], "s");
    assert_eq!(placeholder["valid"], false);
    assert!(placeholder["child"].is_null());
}

#[test]
fn unknown_start_rule_is_an_empty_sequence() {
    let grammar = compile_grammar(r#"r: "a";"#).unwrap();
    let tree = pegtree::parse(&grammar, Some("missing"), "a");
    let value = serde_json::to_value(tree.serialize(&grammar)).unwrap();
    assert_eq!(
        value,
        json!({
            "kind": "sequence",
            "valid": false,
            "start": 0,
            "end": 0,
            "text": "",
            "children": []
        })
    );
}
