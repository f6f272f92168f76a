//! Justification text for a winning path
//!
//! One sentence per supertype or synonym transition. Role texts continue
//! the sentence their supertype started; head words only move the subject
//! of the next sentence.

use super::path::{PathStep, StepRole};
use xte_common::lexical::{capitalize, starts_with_vowel, to_surface};

fn article(word: &str, capital: bool) -> &'static str {
    match (starts_with_vowel(word), capital) {
        (true, true) => "An",
        (false, true) => "A",
        (true, false) => "an",
        (false, false) => "a",
    }
}

/// Drop one leading "to", "a", "an" and "the" in turn
fn strip_determiners(node: &str) -> &str {
    let mut node = node;
    for prefix in ["to ", "a ", "an ", "the "] {
        if let Some(rest) = node.strip_prefix(prefix) {
            node = rest;
        }
    }
    node
}

fn subject(current: &str, verb: bool) -> String {
    if verb {
        format!("To {} is ", current)
    } else {
        format!("{} {} is ", article(current, true), current)
    }
}

pub fn write_justification(path: &[PathStep]) -> String {
    let Some(first) = path.first() else {
        return String::new();
    };

    let mut justification = String::new();
    let mut current = first.concept.clone();

    for (i, step) in path.iter().enumerate().take(path.len() - 1) {
        let next = &path[i + 1].role;
        let node = to_surface(&step.concept);
        let verb = step.tag.as_deref().unwrap_or("").starts_with("VB");

        match &step.role {
            StepRole::SupertypeOf(_) | StepRole::SupertypeHead
                if step.role == StepRole::SupertypeHead || *next != StepRole::SupertypeHead =>
            {
                let closes = matches!(
                    next,
                    StepRole::SupertypeOf(_) | StepRole::SupertypeHead | StepRole::SynonymOf(_) | StepRole::Target
                );
                justification.push_str(&subject(&current, verb));

                if closes {
                    let node = strip_determiners(&node);
                    if verb {
                        let to = if node.ends_with("ing") { "" } else { "to " };
                        justification.push_str(&format!("a way of {}{}\n", to, node));
                    } else {
                        justification.push_str(&format!("a kind of {}\n", node));
                    }
                    current = node.to_string();
                } else {
                    if verb {
                        justification.push_str(&format!("to {} ", node));
                    } else {
                        justification.push_str(&format!("{} {} ", article(&node, false), node));
                    }
                    current = node;
                }
            }
            StepRole::SynonymOf(target) => {
                if verb {
                    justification.push_str(&format!("To {} is synonym of to {}\n", node, target));
                } else {
                    justification.push_str(&format!("{} is synonym of {}\n", capitalize(&node), target));
                }
                current = node;
            }
            StepRole::RoleLabel(_) => {
                justification.push_str(&node);
                justification.push('\n');
            }
            StepRole::Head => current = node,
            _ => {}
        }
    }

    justification
}
