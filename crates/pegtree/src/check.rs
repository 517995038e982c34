use cranelift_entity::{EntitySet, SecondaryMap};

use crate::{
    error::GrammarError,
    grammar::{Grammar, RuleHandle},
    lower::Op,
};

/// Computes which rules can succeed without consuming any input.
pub(crate) fn nullable_rules(grammar: &Grammar) -> SecondaryMap<RuleHandle, bool> {
    let mut nullable: SecondaryMap<RuleHandle, bool> = SecondaryMap::with_capacity(grammar.len());

    // a rule only ever flips from false to true so this terminates in at most `len` rounds
    loop {
        let mut changed = false;
        for handle in grammar.handles() {
            if !nullable[handle] && is_nullable(grammar.op(handle), &nullable) {
                nullable[handle] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    nullable
}

fn is_nullable(op: &Op, nullable: &SecondaryMap<RuleHandle, bool>) -> bool {
    match op {
        Op::Terminal(text) => text.is_empty(),
        Op::Rule(handle) => nullable[*handle],
        Op::Predicate(predicate) => predicate.matches_empty(),
        Op::Sequence(children) => children.iter().all(|c| is_nullable(c, nullable)),
        Op::Choice(children) => children.iter().any(|c| is_nullable(c, nullable)),
        Op::Repetition(_) => true,
    }
}

/// Rules which may be entered at the position where `op` itself starts.
fn collect_prefix_rules(
    op: &Op,
    nullable: &SecondaryMap<RuleHandle, bool>,
    rules: &mut Vec<RuleHandle>,
) {
    match op {
        Op::Terminal(_) | Op::Predicate(_) => {}
        Op::Rule(handle) => {
            if !rules.contains(handle) {
                rules.push(*handle);
            }
        }
        Op::Sequence(children) => {
            for child in children.iter() {
                collect_prefix_rules(child, nullable, rules);
                if !is_nullable(child, nullable) {
                    break;
                }
            }
        }
        Op::Choice(_) | Op::Repetition(_) => {
            for child in op.children() {
                collect_prefix_rules(child, nullable, rules);
            }
        }
    }
}

pub(crate) fn check_left_recursion(grammar: &Grammar) -> Result<(), GrammarError> {
    let nullable = nullable_rules(grammar);

    let mut prefix_rules: SecondaryMap<RuleHandle, Vec<RuleHandle>> = SecondaryMap::new();
    for handle in grammar.handles() {
        let mut rules = Vec::new();
        collect_prefix_rules(grammar.op(handle), &nullable, &mut rules);
        prefix_rules[handle] = rules;
    }

    let mut visited = EntitySet::new();
    let mut stack = Vec::new();
    for handle in grammar.handles() {
        if let Some(cycle) = find_prefix_cycle(handle, &prefix_rules, &mut visited, &mut stack) {
            let cycle: Vec<String> = cycle
                .into_iter()
                .map(|h| h.name(grammar).to_owned())
                .collect();
            log::debug!("Rejecting left recursive grammar: {}", cycle.join(" -> "));
            return Err(GrammarError::LeftRecursion { cycle });
        }
    }

    Ok(())
}

fn find_prefix_cycle(
    handle: RuleHandle,
    prefix_rules: &SecondaryMap<RuleHandle, Vec<RuleHandle>>,
    visited: &mut EntitySet<RuleHandle>,
    stack: &mut Vec<RuleHandle>,
) -> Option<Vec<RuleHandle>> {
    if let Some(pos) = stack.iter().position(|rule| *rule == handle) {
        //      /pos
        // A -> B -> C -> D
        //      ↑________|
        let mut cycle = stack[pos..].to_vec();
        cycle.push(handle);
        return Some(cycle);
    }

    if visited.contains(handle) {
        return None;
    }

    stack.push(handle);
    for &next in &prefix_rules[handle] {
        if let Some(cycle) = find_prefix_cycle(next, prefix_rules, visited, stack) {
            return Some(cycle);
        }
    }
    stack.pop();
    visited.insert(handle);

    None
}
