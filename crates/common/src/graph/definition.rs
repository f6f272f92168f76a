//! In-memory definitions graph
//!
//! Loaded from a JSON graph file:
//!
//! ```json
//! {
//!   "synsets": [
//!     {
//!       "id": "violence.n.01",
//!       "pos": "noun",
//!       "labels": ["violence", "force"],
//!       "supertypes": ["act"],
//!       "roles": [
//!         { "supertype": "act", "predicate": "has_diff_qual", "object": "that causes damage" },
//!         { "supertype": "act", "predicate": "has_purpose",
//!           "object": { "subject": "harm_people", "predicate": "has_object", "object": "people" } }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! A role object is either literal role text or a reified statement whose
//! subject and object both become role entries.

use super::{KnowledgeGraph, PosNamespace, RoleEntry, SynsetId, HAS_SUPERTYPE};
use crate::errors::{Result, XteError};
use crate::lexical::{to_entry, to_surface};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleObject {
    Literal(String),
    Statement {
        subject: String,
        predicate: String,
        object: String,
    },
}

/// A role triple hanging off one supertype edge of a definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRecord {
    pub supertype: String,
    pub predicate: String,
    pub object: RoleObject,
}

impl RoleRecord {
    pub fn literal(supertype: &str, predicate: &str, text: &str) -> Self {
        Self {
            supertype: supertype.to_string(),
            predicate: predicate.to_string(),
            object: RoleObject::Literal(text.to_string()),
        }
    }

    pub fn statement(
        supertype: &str,
        predicate: &str,
        subject: &str,
        inner_predicate: &str,
        object: &str,
    ) -> Self {
        Self {
            supertype: supertype.to_string(),
            predicate: predicate.to_string(),
            object: RoleObject::Statement {
                subject: subject.to_string(),
                predicate: inner_predicate.to_string(),
                object: object.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynsetRecord {
    pub id: String,
    pub pos: String,
    pub labels: Vec<String>,
    #[serde(default)]
    pub supertypes: Vec<String>,
    #[serde(default)]
    pub roles: Vec<RoleRecord>,
}

#[derive(Debug, Deserialize)]
struct GraphFile {
    synsets: Vec<SynsetRecord>,
}

fn namespace_of(pos: &str) -> PosNamespace {
    match pos.trim().to_lowercase().as_str() {
        "noun" | "n" => PosNamespace::Noun,
        _ => PosNamespace::Verb,
    }
}

#[derive(Debug, Default)]
pub struct DefinitionGraph {
    synsets: Vec<SynsetRecord>,
    by_label: HashMap<(String, PosNamespace), Vec<SynsetId>>,
}

impl DefinitionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: GraphFile = serde_json::from_str(json)?;
        let mut graph = Self::new();
        for record in file.synsets {
            graph.add_synset(record);
        }
        Ok(graph)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(XteError::NotFound {
                resource_type: "definition graph".to_string(),
                id: path.display().to_string(),
            });
        }
        let graph = Self::from_json(&std::fs::read_to_string(path)?)?;
        tracing::info!(path = %path.display(), synsets = graph.len(), "Definition graph loaded");
        Ok(graph)
    }

    pub fn add_synset(&mut self, record: SynsetRecord) -> SynsetId {
        let id = SynsetId(self.synsets.len());
        let namespace = namespace_of(&record.pos);
        for label in &record.labels {
            let ids = self.by_label.entry((to_entry(label), namespace)).or_default();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        self.synsets.push(record);
        id
    }

    /// Builder form of [`DefinitionGraph::add_synset`]
    pub fn with_synset(
        mut self,
        pos: &str,
        labels: &[&str],
        supertypes: &[&str],
        roles: Vec<RoleRecord>,
    ) -> Self {
        let id = format!("{}.{}.{:02}", labels.first().copied().unwrap_or("_"), pos, self.len() + 1);
        self.add_synset(SynsetRecord {
            id,
            pos: pos.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            supertypes: supertypes.iter().map(|s| s.to_string()).collect(),
            roles,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.synsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synsets.is_empty()
    }

    fn records<'a>(&'a self, synsets: &'a [SynsetId]) -> impl Iterator<Item = &'a SynsetRecord> + 'a {
        synsets.iter().filter_map(|id| self.synsets.get(id.0))
    }
}

fn has_supertype(record: &SynsetRecord, supertype: &str) -> bool {
    let wanted = to_entry(supertype);
    record.supertypes.iter().any(|s| to_entry(s) == wanted)
}

impl KnowledgeGraph for DefinitionGraph {
    fn synsets_by_label(&self, word: &str, namespace: PosNamespace) -> Vec<SynsetId> {
        self.by_label
            .get(&(to_entry(word), namespace))
            .cloned()
            .unwrap_or_default()
    }

    fn supertypes_of(&self, synsets: &[SynsetId]) -> Vec<String> {
        let mut supertypes: Vec<String> = Vec::new();
        for record in self.records(synsets) {
            for supertype in &record.supertypes {
                if !supertypes.contains(supertype) {
                    supertypes.push(supertype.clone());
                }
            }
        }
        supertypes
    }

    fn synsets_by_supertype(&self, synsets: &[SynsetId], supertype: &str) -> Vec<SynsetId> {
        synsets
            .iter()
            .copied()
            .filter(|id| {
                self.synsets
                    .get(id.0)
                    .map(|r| has_supertype(r, supertype))
                    .unwrap_or(false)
            })
            .collect()
    }

    fn synonyms_of(&self, synset: SynsetId) -> Vec<String> {
        self.synsets
            .get(synset.0)
            .map(|r| r.labels.iter().map(|l| to_surface(l)).collect())
            .unwrap_or_default()
    }

    fn roles_by_supertype(&self, synsets: &[SynsetId], supertype: &str) -> Vec<RoleEntry> {
        let matching: Vec<&SynsetRecord> = self
            .records(synsets)
            .filter(|r| has_supertype(r, supertype))
            .collect();
        if matching.is_empty() {
            return Vec::new();
        }

        let wanted = to_entry(supertype);
        let mut roles = vec![RoleEntry::new(to_surface(supertype), HAS_SUPERTYPE)];
        for record in matching {
            for role in record.roles.iter().filter(|r| to_entry(&r.supertype) == wanted) {
                match &role.object {
                    RoleObject::Literal(text) => {
                        roles.push(RoleEntry::new(text.clone(), role.predicate.clone()));
                    }
                    RoleObject::Statement {
                        subject,
                        predicate,
                        object,
                    } => {
                        roles.push(RoleEntry::new(to_surface(subject), role.predicate.clone()));
                        roles.push(RoleEntry::new(object.clone(), predicate.clone()));
                    }
                }
            }
        }
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAPH: &str = r#"{
        "synsets": [
            {
                "id": "violence.n.01",
                "pos": "noun",
                "labels": ["violence", "force"],
                "supertypes": ["act"],
                "roles": [
                    { "supertype": "act", "predicate": "has_diff_qual", "object": "that causes damage" },
                    { "supertype": "act", "predicate": "has_purpose",
                      "object": { "subject": "harm_people", "predicate": "has_object", "object": "people" } }
                ]
            },
            { "id": "act.n.02", "pos": "noun", "labels": ["act", "deed"], "supertypes": ["human_action"] },
            { "id": "act.v.01", "pos": "verb", "labels": ["act"], "supertypes": ["behave"] }
        ]
    }"#;

    #[test]
    fn test_lookup_by_label_and_namespace() {
        let graph = DefinitionGraph::from_json(GRAPH).unwrap();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.synsets_by_label("Violence", PosNamespace::Noun), vec![SynsetId(0)]);
        assert_eq!(graph.synsets_by_label("act", PosNamespace::Verb), vec![SynsetId(2)]);
        assert!(graph.synsets_by_label("violence", PosNamespace::Verb).is_empty());
        assert!(graph.synsets_by_label("damage", PosNamespace::Noun).is_empty());
    }

    #[test]
    fn test_supertypes_and_synonyms() {
        let graph = DefinitionGraph::from_json(GRAPH).unwrap();
        let ids = graph.synsets_by_label("act", PosNamespace::Noun);
        assert_eq!(graph.supertypes_of(&ids), vec!["human_action"]);
        assert_eq!(graph.synsets_by_supertype(&ids, "human action"), ids);
        assert_eq!(graph.synonyms_of(SynsetId(1)), vec!["act", "deed"]);
    }

    #[test]
    fn test_roles_by_supertype() {
        let graph = DefinitionGraph::from_json(GRAPH).unwrap();
        let ids = graph.synsets_by_label("violence", PosNamespace::Noun);
        let roles = graph.roles_by_supertype(&ids, "act");
        assert_eq!(
            roles,
            vec![
                RoleEntry::new("act", HAS_SUPERTYPE),
                RoleEntry::new("that causes damage", "has_diff_qual"),
                RoleEntry::new("harm people", "has_purpose"),
                RoleEntry::new("people", "has_object"),
            ]
        );
        assert!(graph.roles_by_supertype(&ids, "event").is_empty());
    }

    #[test]
    fn test_grouped_roles_keep_given_order() {
        let graph = DefinitionGraph::new()
            .with_synset("noun", &["storm"], &["weather", "disturbance"], vec![
                RoleRecord::literal("disturbance", "has_diff_qual", "with strong winds"),
            ]);
        let ids = graph.synsets_by_label("storm", PosNamespace::Noun);
        let supertypes = graph.supertypes_of(&ids);
        let groups = graph.roles_grouped_by_supertype(&ids, &supertypes);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "weather");
        assert_eq!(groups[0].1, vec![RoleEntry::new("weather", HAS_SUPERTYPE)]);
        assert_eq!(groups[1].1.len(), 2);
    }

    #[test]
    fn test_malformed_graph_file() {
        assert!(DefinitionGraph::from_json("{\"synsets\": 3}").is_err());
    }

    #[test]
    fn test_missing_graph_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = DefinitionGraph::load(dir.path().join("wn_graph.json")).unwrap_err();
        assert!(matches!(err, XteError::NotFound { .. }), "{}", err);
    }
}
