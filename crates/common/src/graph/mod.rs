//! Knowledge graph capability
//!
//! A definitions graph exposes synsets (senses with synonym labels), their
//! supertypes, and the semantic-role triples a definition attaches to each
//! supertype edge. One graph is loaded per knowledge base.

pub mod definition;

pub use definition::DefinitionGraph;

use crate::errors::XteError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role label linking a concept to its supertype
pub const HAS_SUPERTYPE: &str = "has_supertype";

/// Knowledge base a definition graph was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnowledgeBase {
    WordNet,
    Wiktionary,
    Wikipedia,
    Webster,
}

impl KnowledgeBase {
    pub const ALL: [KnowledgeBase; 4] = [
        KnowledgeBase::WordNet,
        KnowledgeBase::Wiktionary,
        KnowledgeBase::Wikipedia,
        KnowledgeBase::Webster,
    ];

    /// Short code used on the command line and in resource file names
    pub fn code(&self) -> &'static str {
        match self {
            KnowledgeBase::WordNet => "WN",
            KnowledgeBase::Wiktionary => "WKT",
            KnowledgeBase::Wikipedia => "WKP",
            KnowledgeBase::Webster => "WBT",
        }
    }

    /// Configuration key of the graph file
    pub fn config_key(&self) -> &'static str {
        match self {
            KnowledgeBase::WordNet => "wngraph",
            KnowledgeBase::Wiktionary => "wktgraph",
            KnowledgeBase::Wikipedia => "wkpgraph",
            KnowledgeBase::Webster => "wbtgraph",
        }
    }
}

impl fmt::Display for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KnowledgeBase::WordNet => "WordNet",
            KnowledgeBase::Wiktionary => "Wiktionary",
            KnowledgeBase::Wikipedia => "Wikipedia",
            KnowledgeBase::Webster => "Webster's",
        };
        f.write_str(name)
    }
}

impl FromStr for KnowledgeBase {
    type Err = XteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnowledgeBase::ALL
            .into_iter()
            .find(|kb| kb.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| XteError::Configuration {
                message: format!("unknown knowledge base '{}', expected one of WN, WKT, WKP, WBT", s),
            })
    }
}

/// Graph node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SynsetId(pub usize);

/// Label namespace a synset is looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosNamespace {
    Noun,
    Verb,
}

impl PosNamespace {
    /// Nouns for `NN*` tags, verbs for everything else
    pub fn from_tag(tag: &str) -> Self {
        if tag.starts_with("NN") {
            PosNamespace::Noun
        } else {
            PosNamespace::Verb
        }
    }
}

/// Target side of a role triple: its text and role label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleEntry {
    pub text: String,
    pub label: String,
}

impl RoleEntry {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }

    pub fn is_supertype(&self) -> bool {
        self.label == HAS_SUPERTYPE
    }
}

/// Read-only definitions graph
///
/// Lookups that find nothing return empty lists, never
/// [`XteError::NotFound`](crate::errors::XteError::NotFound); that kind is
/// kept for resources that are missing altogether.
pub trait KnowledgeGraph: Send + Sync {
    /// Synsets labelled `word` in the namespace
    fn synsets_by_label(&self, word: &str, namespace: PosNamespace) -> Vec<SynsetId>;

    /// Supertype names of the synsets, first-seen order, without repeats
    fn supertypes_of(&self, synsets: &[SynsetId]) -> Vec<String>;

    /// Synsets among `synsets` having `supertype`
    fn synsets_by_supertype(&self, synsets: &[SynsetId], supertype: &str) -> Vec<SynsetId>;

    /// Synonym labels of a synset, words separated by blanks
    fn synonyms_of(&self, synset: SynsetId) -> Vec<String>;

    /// Roles attached to the `supertype` edge of the synsets. The supertype
    /// itself always comes first, labelled [`HAS_SUPERTYPE`].
    fn roles_by_supertype(&self, synsets: &[SynsetId], supertype: &str) -> Vec<RoleEntry>;

    /// [`KnowledgeGraph::roles_by_supertype`] for each supertype, in the given order
    fn roles_grouped_by_supertype(
        &self,
        synsets: &[SynsetId],
        supertypes: &[String],
    ) -> Vec<(String, Vec<RoleEntry>)> {
        let mut groups: Vec<(String, Vec<RoleEntry>)> = Vec::new();
        for supertype in supertypes {
            let roles = self.roles_by_supertype(synsets, supertype);
            match groups.iter_mut().find(|(name, _)| name == supertype) {
                Some((_, existing)) => existing.extend(roles),
                None => groups.push((supertype.clone(), roles)),
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knowledge_base_codes() {
        assert_eq!("wn".parse::<KnowledgeBase>().unwrap(), KnowledgeBase::WordNet);
        assert_eq!("WBT".parse::<KnowledgeBase>().unwrap(), KnowledgeBase::Webster);
        assert!("XYZ".parse::<KnowledgeBase>().is_err());
        assert_eq!(KnowledgeBase::Wikipedia.config_key(), "wkpgraph");
        assert_eq!(KnowledgeBase::Wiktionary.to_string(), "Wiktionary");
    }

    #[test]
    fn test_namespace_from_tag() {
        assert_eq!(PosNamespace::from_tag("NNS"), PosNamespace::Noun);
        assert_eq!(PosNamespace::from_tag("VBZ"), PosNamespace::Verb);
        assert_eq!(PosNamespace::from_tag("JJ"), PosNamespace::Verb);
    }
}
