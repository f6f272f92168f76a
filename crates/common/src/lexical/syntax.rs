//! Penn Treebank constituency trees
//!
//! Parses bracketed parses such as `(ROOT (S (NP (DT A) (NN cat)) (VP (VBZ sleeps))))`
//! and counts clause-introducing constructs.

use crate::errors::{Result, XteError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstituencyTree {
    pub label: String,
    pub children: Vec<ConstituencyTree>,
}

/// Category without function tags or indices: `NP-TMP` and `NP=2` are `NP`.
/// Labels starting with `-` (`-LRB-`) are kept whole.
pub fn basic_category(label: &str) -> &str {
    if label.starts_with('-') {
        return label;
    }
    match label.find(['-', '=']) {
        Some(end) if end > 0 => &label[..end],
        _ => label,
    }
}

#[derive(Debug, PartialEq)]
enum Lexeme {
    Open,
    Close,
    Atom(String),
}

fn lex(input: &str) -> Vec<Lexeme> {
    let mut lexemes = Vec::new();
    let mut atom = String::new();

    for c in input.chars() {
        match c {
            '(' | ')' => {
                if !atom.is_empty() {
                    lexemes.push(Lexeme::Atom(std::mem::take(&mut atom)));
                }
                lexemes.push(if c == '(' { Lexeme::Open } else { Lexeme::Close });
            }
            c if c.is_whitespace() => {
                if !atom.is_empty() {
                    lexemes.push(Lexeme::Atom(std::mem::take(&mut atom)));
                }
            }
            c => atom.push(c),
        }
    }
    if !atom.is_empty() {
        lexemes.push(Lexeme::Atom(atom));
    }
    lexemes
}

impl ConstituencyTree {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        let lexemes = lex(input);
        let mut pos = 0;
        let tree = Self::parse_node(&lexemes, &mut pos)?;
        if pos != lexemes.len() {
            return Err(XteError::malformed("constituency parse", None, "trailing input after tree"));
        }
        Ok(tree)
    }

    fn parse_node(lexemes: &[Lexeme], pos: &mut usize) -> Result<Self> {
        match lexemes.get(*pos) {
            Some(Lexeme::Open) => {
                *pos += 1;
                // An unlabeled outer bracket is allowed: `( (S ...))`
                let label = match lexemes.get(*pos) {
                    Some(Lexeme::Atom(label)) => {
                        *pos += 1;
                        label.clone()
                    }
                    _ => String::new(),
                };

                let mut children = Vec::new();
                loop {
                    match lexemes.get(*pos) {
                        Some(Lexeme::Close) => {
                            *pos += 1;
                            break;
                        }
                        Some(_) => children.push(Self::parse_node(lexemes, pos)?),
                        None => {
                            return Err(XteError::malformed(
                                "constituency parse",
                                None,
                                "unbalanced brackets",
                            ))
                        }
                    }
                }

                if label.is_empty() && children.len() == 1 {
                    return Ok(children.remove(0));
                }
                Ok(Self { label, children })
            }
            Some(Lexeme::Atom(word)) => {
                *pos += 1;
                Ok(Self::leaf(word.clone()))
            }
            Some(Lexeme::Close) | None => Err(XteError::malformed(
                "constituency parse",
                None,
                "expected '(' or a word",
            )),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of coordinated or subordinate clauses: a `CC` whose immediate
    /// right sister is an `S` or a `VP`, plus every `SBAR`.
    pub fn clause_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];

        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                continue;
            }
            if basic_category(&node.label) == "SBAR" {
                count += 1;
            }
            for (i, child) in node.children.iter().enumerate() {
                if child.is_leaf() || basic_category(&child.label) != "CC" {
                    continue;
                }
                if let Some(sister) = node.children.get(i + 1) {
                    if sister.label == "S" || basic_category(&sister.label) == "VP" {
                        count += 1;
                    }
                }
            }
            stack.extend(node.children.iter());
        }
        count
    }

    /// Words at the leaves, left to right
    pub fn words(&self) -> Vec<&str> {
        let mut words = Vec::new();
        self.collect_words(&mut words);
        words
    }

    fn collect_words<'a>(&'a self, words: &mut Vec<&'a str>) {
        if self.is_leaf() {
            words.push(&self.label);
        }
        for child in &self.children {
            child.collect_words(words);
        }
    }
}
