//! Entailment decisions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reasoning strategy behind a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Model {
    StructuralSimilarity,
    GraphNavigation,
}

impl Model {
    /// Name printed in decision texts and result files
    pub fn name(&self) -> &'static str {
        match self {
            Model::StructuralSimilarity => "Tree Edit Distance",
            Model::GraphNavigation => "Graph Navigation",
        }
    }

    /// Label used for metrics
    pub fn metric_label(&self) -> &'static str {
        match self {
            Model::StructuralSimilarity => "tree_edit_distance",
            Model::GraphNavigation => "graph_navigation",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Yes,
    No,
    /// No conclusive context signal; only ever returned by the veto
    Pending,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Yes => "yes",
            Decision::No => "no",
            Decision::Pending => "pending",
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Decision::Yes)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntailmentDecision {
    pub model: Model,
    pub decision: Decision,
    /// One sentence per line, no trailing newline
    pub justification: Option<String>,
}

impl EntailmentDecision {
    pub fn yes(model: Model, justification: impl Into<String>) -> Self {
        let justification: String = justification.into();
        Self {
            model,
            decision: Decision::Yes,
            justification: Some(justification.trim_end_matches('\n').to_string()),
        }
    }

    pub fn no(model: Model) -> Self {
        Self {
            model,
            decision: Decision::No,
            justification: None,
        }
    }

    /// Text shown for a single decided pair
    pub fn render(&self) -> String {
        let mut output = format!(
            "Using model '{}'\nEntailment: {}",
            self.model.name(),
            self.decision
        );
        if let Some(justification) = &self.justification {
            output.push_str("\nJustification:\n");
            output.push_str(justification);
        }
        output
    }
}
