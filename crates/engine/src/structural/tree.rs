//! Dependency trees in bracket notation
//!
//! A sentence's basic dependencies become `{lemma{rel{child}}...}`: every
//! dependent hangs under a node named after its relation, and siblings are
//! ordered by relation name, then by position in the sentence.

use std::collections::{BTreeSet, HashMap};
use xte_common::{
    lexical::{AnnotatedSentence, DependencyEdge},
    Result, XteError,
};

/// Ordered labelled tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledTree {
    pub label: String,
    pub children: Vec<LabeledTree>,
}

fn escape(lemma: &str) -> String {
    lemma.to_lowercase().replace('{', "\\{").replace('}', "\\}")
}

/// Count braces not preceded by a backslash
fn bracket_balance(tree: &str) -> (usize, usize) {
    let mut open = 0;
    let mut close = 0;
    let mut escaped = false;
    for c in tree.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '{' => open += 1,
            '}' => close += 1,
            _ => {}
        }
    }
    (open, close)
}

struct Renderer<'a> {
    lemmas: HashMap<usize, String>,
    edges: HashMap<usize, Vec<&'a DependencyEdge>>,
    visited: BTreeSet<usize>,
    out: String,
}

impl<'a> Renderer<'a> {
    fn children(&mut self, node: usize) {
        self.visited.insert(node);
        let edges = self.edges.get(&node).cloned().unwrap_or_default();

        if edges.is_empty() {
            self.out.push_str("}}");
            return;
        }
        for edge in edges {
            let lemma = self.lemmas.get(&edge.dependent).cloned().unwrap_or_default();
            self.out.push('{');
            self.out.push_str(&edge.relation);
            self.out.push('{');
            self.out.push_str(&lemma);

            if self.visited.contains(&edge.dependent) {
                self.out.push_str("}}");
            } else {
                self.children(edge.dependent);
            }
        }
        self.out.push_str("}}");
    }
}

/// Bracket rendering of one sentence's dependency graph
///
/// Nodes no root reaches are appended without an opening bracket, which
/// unbalances the rendering; that is reported as an internal error.
pub fn render_dependencies(sentence: &AnnotatedSentence) -> Result<String> {
    let lemmas: HashMap<usize, String> = sentence
        .tokens
        .iter()
        .enumerate()
        .map(|(i, t)| (i + 1, escape(&t.lemma)))
        .collect();

    let mut edges: HashMap<usize, Vec<&DependencyEdge>> = HashMap::new();
    let mut roots = Vec::new();
    for edge in &sentence.dependencies {
        if edge.governor == 0 {
            roots.push(edge.dependent);
        } else {
            edges.entry(edge.governor).or_default().push(edge);
        }
    }
    for list in edges.values_mut() {
        list.sort_by(|a, b| a.relation.cmp(&b.relation).then(a.dependent.cmp(&b.dependent)));
    }

    let mut renderer = Renderer {
        lemmas,
        edges,
        visited: BTreeSet::new(),
        out: String::new(),
    };

    for root in roots {
        let lemma = renderer.lemmas.get(&root).cloned().unwrap_or_default();
        renderer.out.push('{');
        renderer.out.push_str(&lemma);
        renderer.children(root);
        // the closing pair ends one bracket too many
        renderer.out.pop();
    }

    let mut unreached: Vec<usize> = sentence
        .dependencies
        .iter()
        .flat_map(|e| [e.governor, e.dependent])
        .filter(|n| *n != 0 && !renderer.visited.contains(n))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    while let Some(node) = unreached.first().copied() {
        let lemma = renderer.lemmas.get(&node).cloned().unwrap_or_default();
        renderer.out.push_str(&lemma);
        renderer.children(node);
        unreached.retain(|n| !renderer.visited.contains(n));
    }

    let (open, close) = bracket_balance(&renderer.out);
    if open != close {
        return Err(XteError::Internal {
            message: format!(
                "unbalanced dependency tree ({} opening, {} closing): {}",
                open, close, renderer.out
            ),
        });
    }
    Ok(renderer.out)
}

impl LabeledTree {
    pub fn new(label: impl Into<String>, children: Vec<LabeledTree>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    /// Parse bracket notation. Several top-level trees are gathered under
    /// an unlabelled root.
    pub fn parse(input: &str) -> Result<Self> {
        let chars: Vec<char> = input.trim().chars().collect();
        let mut pos = 0;
        let mut trees = Vec::new();

        while pos < chars.len() {
            if chars[pos] != '{' {
                return Err(XteError::Internal {
                    message: format!("expected '{{' at offset {} in tree {}", pos, input),
                });
            }
            trees.push(Self::parse_node(&chars, &mut pos, input)?);
        }

        match trees.len() {
            0 => Err(XteError::Internal {
                message: "empty dependency tree".to_string(),
            }),
            1 => Ok(trees.remove(0)),
            _ => Ok(Self::new("", trees)),
        }
    }

    fn parse_node(chars: &[char], pos: &mut usize, input: &str) -> Result<Self> {
        // skip '{'
        *pos += 1;
        let mut label = String::new();
        let mut children = Vec::new();

        while let Some(&c) = chars.get(*pos) {
            match c {
                '\\' => {
                    if let Some(&next) = chars.get(*pos + 1) {
                        label.push(next);
                    }
                    *pos += 2;
                }
                '{' => children.push(Self::parse_node(chars, pos, input)?),
                '}' => {
                    *pos += 1;
                    return Ok(Self::new(label, children));
                }
                _ => {
                    label.push(c);
                    *pos += 1;
                }
            }
        }

        Err(XteError::Internal {
            message: format!("unterminated node in tree {}", input),
        })
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(LabeledTree::node_count).sum::<usize>()
    }

    /// Children left to right, then the node
    #[cfg(test)]
    pub fn postorder(&self) -> Vec<&LabeledTree> {
        let mut nodes = Vec::with_capacity(self.node_count());
        self.collect_postorder(&mut nodes);
        nodes
    }

    #[cfg(test)]
    fn collect_postorder<'a>(&'a self, nodes: &mut Vec<&'a LabeledTree>) {
        for child in &self.children {
            child.collect_postorder(nodes);
        }
        nodes.push(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xte_common::lexical::AnnotatedToken;

    fn sentence(words: &[(&str, &str)], edges: Vec<DependencyEdge>) -> AnnotatedSentence {
        AnnotatedSentence {
            tokens: words
                .iter()
                .map(|(word, lemma)| AnnotatedToken {
                    word: word.to_string(),
                    lemma: lemma.to_string(),
                    tag: "NN".to_string(),
                })
                .collect(),
            parse: String::new(),
            dependencies: edges,
        }
    }

    #[test]
    fn test_render_orders_children_by_relation() {
        let s = sentence(
            &[("The", "the"), ("cat", "cat"), ("sleeps", "sleep"), (".", ".")],
            vec![
                DependencyEdge::new(0, 3, "root"),
                DependencyEdge::new(3, 4, "punct"),
                DependencyEdge::new(2, 1, "det"),
                DependencyEdge::new(3, 2, "nsubj"),
            ],
        );
        assert_eq!(
            render_dependencies(&s).unwrap(),
            "{sleep{nsubj{cat{det{the}}}}{punct{.}}}"
        );
    }

    #[test]
    fn test_unreached_node_is_an_internal_error() {
        let s = sentence(
            &[("a", "a"), ("b", "b"), ("c", "c")],
            vec![DependencyEdge::new(0, 1, "root"), DependencyEdge::new(3, 2, "dep")],
        );
        let err = render_dependencies(&s).unwrap_err();
        assert!(matches!(err, XteError::Internal { .. }));
    }

    #[test]
    fn test_braces_in_lemmas_are_escaped() {
        let s = sentence(&[("{", "{")], vec![DependencyEdge::new(0, 1, "root")]);
        let rendered = render_dependencies(&s).unwrap();
        assert_eq!(rendered, "{\\{}");
        assert_eq!(LabeledTree::parse(&rendered).unwrap().label, "{");
    }

    #[test]
    fn test_parse_bracket_tree() {
        let tree = LabeledTree::parse("{sleep{nsubj{cat{det{the}}}}{punct{.}}}").unwrap();
        assert_eq!(tree.label, "sleep");
        assert_eq!(tree.node_count(), 7);
        let labels: Vec<&str> = tree.postorder().iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["the", "det", "cat", "nsubj", ".", "punct", "sleep"]);
    }

    #[test]
    fn test_parse_rejects_unterminated_tree() {
        assert!(LabeledTree::parse("{a{b}").is_err());
        assert!(LabeledTree::parse("").is_err());
    }
}
