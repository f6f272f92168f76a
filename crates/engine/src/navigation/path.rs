//! Search paths
//!
//! Branches of the path search share their prefixes: every step lives once
//! in a [`PathArena`] and points back at its parent, so deferring a branch
//! costs one index instead of a copy of the whole path. Each node also
//! carries a hash of its whole path, so equal paths are found without
//! walking them.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Meaningful hops allowed before a branch is cut
pub const MAX_DEPTH: usize = 5;

/// Paths longer than this are assumed to be cycling
const MAX_RAW_STEPS: usize = 50;

/// How a step was reached from the one before it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StepRole {
    Source,
    /// Supertype of the named concept
    SupertypeOf(String),
    /// Role text attached to a supertype edge, with its role label
    RoleLabel(String),
    /// Synonym of the named target
    SynonymOf(String),
    /// Head word of a role text
    Head,
    /// Head word of a multi-word supertype the graph has no entry for
    SupertypeHead,
    Target,
    DeadEnd,
}

impl StepRole {
    fn is_supertype_of(&self) -> bool {
        matches!(self, StepRole::SupertypeOf(_))
    }

    fn is_head(&self) -> bool {
        matches!(self, StepRole::Head | StepRole::SupertypeHead)
    }
}

impl fmt::Display for StepRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepRole::Source => f.write_str("source"),
            StepRole::SupertypeOf(concept) => write!(f, "supertype of {}", concept),
            StepRole::RoleLabel(label) => f.write_str(label),
            StepRole::SynonymOf(target) => write!(f, "synonym of {}", target),
            StepRole::Head => f.write_str("head"),
            StepRole::SupertypeHead => f.write_str("supertype head"),
            StepRole::Target => f.write_str("target"),
            StepRole::DeadEnd => f.write_str("null"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathStep {
    pub concept: String,
    /// Penn tag of the concept; role texts and targets carry none
    pub tag: Option<String>,
    pub role: StepRole,
}

impl PathStep {
    pub fn new(concept: impl Into<String>, tag: Option<&str>, role: StepRole) -> Self {
        Self {
            concept: concept.into(),
            tag: tag.map(str::to_string),
            role,
        }
    }

    pub fn dead_end() -> Self {
        Self::new("null", None, StepRole::DeadEnd)
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}#{};{}", self.concept, tag, self.role),
            None => write!(f, "{};{}", self.concept, self.role),
        }
    }
}

/// Handle on a path stored in a [`PathArena`]: the index of its last step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRef {
    tip: usize,
    len: usize,
}

impl PathRef {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

struct Node {
    step: PathStep,
    parent: Option<usize>,
    /// Hash of every step from the root to this one
    hash: u64,
}

fn chain_hash(parent: Option<u64>, step: &PathStep) -> u64 {
    let mut hasher = DefaultHasher::new();
    parent.hash(&mut hasher);
    step.hash(&mut hasher);
    hasher.finish()
}

#[derive(Default)]
pub struct PathArena {
    nodes: Vec<Node>,
}

impl PathArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a path with a single step
    pub fn root(&mut self, step: PathStep) -> PathRef {
        let hash = chain_hash(None, &step);
        self.nodes.push(Node {
            step,
            parent: None,
            hash,
        });
        PathRef {
            tip: self.nodes.len() - 1,
            len: 1,
        }
    }

    /// A new path: `path` followed by `step`. `path` itself is unchanged.
    pub fn extend(&mut self, path: PathRef, step: PathStep) -> PathRef {
        let hash = chain_hash(Some(self.nodes[path.tip].hash), &step);
        self.nodes.push(Node {
            step,
            parent: Some(path.tip),
            hash,
        });
        PathRef {
            tip: self.nodes.len() - 1,
            len: path.len + 1,
        }
    }

    pub fn last(&self, path: PathRef) -> &PathStep {
        &self.nodes[path.tip].step
    }

    /// Steps of the path, first to last
    pub fn steps(&self, path: PathRef) -> Vec<PathStep> {
        let mut steps = Vec::with_capacity(path.len);
        let mut index = Some(path.tip);
        while let Some(i) = index {
            steps.push(self.nodes[i].step.clone());
            index = self.nodes[i].parent;
        }
        steps.reverse();
        steps
    }

    /// Hash of the path's steps; equal paths hash alike wherever they were built
    pub fn fingerprint(&self, path: PathRef) -> u64 {
        self.nodes[path.tip].hash
    }

    /// Whether both paths hold the same steps, compared tip to root
    pub fn same_steps(&self, a: PathRef, b: PathRef) -> bool {
        if a.len != b.len {
            return false;
        }
        let (mut left, mut right) = (Some(a.tip), Some(b.tip));
        while let (Some(l), Some(r)) = (left, right) {
            if l == r {
                return true;
            }
            if self.nodes[l].hash != self.nodes[r].hash || self.nodes[l].step != self.nodes[r].step {
                return false;
            }
            left = self.nodes[l].parent;
            right = self.nodes[r].parent;
        }
        left.is_none() && right.is_none()
    }

    /// Number of stored steps across all paths
    pub fn size(&self) -> usize {
        self.nodes.len()
    }
}

/// Number of hops that reach a new concept
///
/// Source, head and synonym steps never count. A supertype step counts when
/// another supertype follows it, or when a head follows it right after the
/// source. Paths over 50 steps get `MAX_DEPTH + 1`.
pub fn path_depth(path: &[PathStep]) -> usize {
    if path.len() > MAX_RAW_STEPS {
        return MAX_DEPTH + 1;
    }

    let mut depth = 0;
    let mut previous = &StepRole::Source;
    for (i, step) in path.iter().enumerate() {
        let next = path.get(i + 1).map(|s| &s.role).unwrap_or(&step.role);

        let counts = match &step.role {
            StepRole::Source | StepRole::Head | StepRole::SupertypeHead | StepRole::SynonymOf(_) => false,
            StepRole::SupertypeOf(_) => {
                next.is_supertype_of() || (next.is_head() && *previous == StepRole::Source)
            }
            _ => true,
        };
        if counts {
            depth += 1;
        }
        previous = &step.role;
    }
    depth
}

/// Drop steps that add nothing to a finished path
///
/// The first two steps and the last one are kept verbatim. In between, a
/// step goes when it repeats its predecessor or the last kept step, when it
/// is a supertype of itself followed by another supertype, or when its
/// neighbours are the same step.
pub fn clean_path(path: Vec<PathStep>) -> Vec<PathStep> {
    if path.len() <= 2 {
        return path;
    }

    let last = path.len() - 1;
    let mut cleaned: Vec<PathStep> = path[..2].to_vec();
    for i in 2..last {
        let step = &path[i];
        let previous = &path[i - 1];
        let next = &path[i + 1];

        let self_supertype = matches!(&step.role, StepRole::SupertypeOf(of) if *of == step.concept)
            && (next.role.is_supertype_of() || next.role == StepRole::SupertypeHead);

        let repeats = step == previous || cleaned.last() == Some(step);
        if !repeats && !self_supertype && previous != next {
            cleaned.push(step.clone());
        }
    }
    cleaned.push(path[last].clone());
    cleaned
}
