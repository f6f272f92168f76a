//! Depth-first path search from a source concept to a target concept
//!
//! The walk climbs from a concept to its supertypes and follows the role
//! texts a definition attaches to each supertype edge, moving on through the
//! role's head words. At every fork the branch most related to the target is
//! explored at once and the others are deferred on a LIFO stack.

use super::path::{clean_path, path_depth, PathArena, PathRef, PathStep, StepRole, MAX_DEPTH};
use super::ranking::{best_matches, head_words};
use crate::context::EngineContext;
use std::collections::HashMap;
use tracing::debug;
use xte_common::{
    graph::{PosNamespace, RoleEntry, SynsetId},
    lexical::{to_surface, Phrase},
    metrics, Result,
};

/// Branches tried before giving up once a target has been reached
pub const MAX_PATHS: usize = 100;

/// Branches tried before giving up
pub const SEARCH_LIMIT: usize = 200;

fn coarse_tag(tag: &str) -> &'static str {
    if tag.starts_with("VB") {
        "VB"
    } else {
        "NN"
    }
}

pub struct PathSearch<'a> {
    ctx: &'a EngineContext,
    target: String,
    /// Base form of the target, words joined by underscores
    target_entry: String,
    /// Base form of the target, words separated by blanks
    target_surface: String,
    arena: PathArena,
    stack: Vec<PathRef>,
    /// Paths currently on the stack, by fingerprint
    pending: HashMap<u64, Vec<PathRef>>,
    /// Tag of the concept under analysis
    pos: String,
}

impl<'a> PathSearch<'a> {
    pub fn new(ctx: &'a EngineContext, target: &str, target_tag: &str) -> Self {
        let target_entry = ctx.handler.normalize(target, coarse_tag(target_tag));
        Self {
            ctx,
            target: target.to_string(),
            target_surface: to_surface(&target_entry),
            target_entry,
            arena: PathArena::new(),
            stack: Vec::new(),
            pending: HashMap::new(),
            pos: "NN".to_string(),
        }
    }

    /// Every distinct path reaching the target from `source`
    pub async fn run(mut self, source: &str, source_tag: &str) -> Result<Vec<Vec<PathStep>>> {
        self.pos = coarse_tag(source_tag).to_string();
        let step = PathStep::new(source, Some(&self.pos), StepRole::Source);
        let root = self.arena.root(step);
        self.push(root);

        let mut paths: Vec<Vec<PathStep>> = Vec::new();
        let mut tried = 0;
        let mut reached = false;

        while let Some(start) = self.pop() {
            let (end, matched) = self.explore(start).await?;

            let mut steps = self.arena.steps(end);
            steps.push(if matched {
                PathStep::new(self.target.clone(), None, StepRole::Target)
            } else {
                PathStep::dead_end()
            });
            let steps = clean_path(steps);

            if !paths.contains(&steps) {
                if matched {
                    reached = true;
                }
                debug!(path = %render(&steps), matched, "Branch finished");
                paths.push(steps);
            }

            tried += 1;
            if (reached && tried >= MAX_PATHS) || tried >= SEARCH_LIMIT {
                break;
            }
        }

        paths.retain(|p| {
            p.last().map(|s| s.role == StepRole::Target).unwrap_or(false)
                && path_depth(p) <= MAX_DEPTH + 1
        });
        metrics::record_search(tried, paths.len());
        debug!(source, to = %self.target, tried, accepted = paths.len(), "Search finished");
        Ok(paths)
    }

    /// Stack a path unless an equal one is already waiting
    fn push(&mut self, path: PathRef) {
        let waiting = self.pending.entry(self.arena.fingerprint(path)).or_default();
        if waiting.iter().any(|p| self.arena.same_steps(*p, path)) {
            return;
        }
        waiting.push(path);
        self.stack.push(path);
    }

    fn pop(&mut self) -> Option<PathRef> {
        let path = self.stack.pop()?;
        let key = self.arena.fingerprint(path);
        if let Some(waiting) = self.pending.get_mut(&key) {
            waiting.retain(|p| *p != path);
            if waiting.is_empty() {
                self.pending.remove(&key);
            }
        }
        Some(path)
    }

    fn extend(&mut self, path: PathRef, concept: &str, tag: Option<&str>, role: StepRole) -> PathRef {
        self.arena.extend(path, PathStep::new(concept, tag, role))
    }

    /// Follow one branch until it reaches the target, dead-ends or runs too
    /// deep. Returns the branch and whether it matched.
    async fn explore(&mut self, start: PathRef) -> Result<(PathRef, bool)> {
        let ctx = self.ctx;
        let mut current = start;

        let last = self.arena.last(current).clone();
        if let Some(tag) = &last.tag {
            self.pos = tag.clone();
        }
        let mut depth = path_depth(&self.arena.steps(current));
        let mut next_node = ctx.handler.normalize(&last.concept, &self.pos);
        let mut matched = next_node == self.target_entry;
        let mut last_not_found = String::new();

        if ctx.tables.synonyms.are_synonyms(&next_node, &self.target_entry, &self.pos) {
            let pos = self.pos.clone();
            let role = StepRole::SynonymOf(self.target_surface.clone());
            current = self.extend(current, &next_node, Some(&pos), role);
        }

        while next_node != self.target_entry && depth <= MAX_DEPTH {
            matched = false;
            let role = self.arena.last(current).role.clone();
            if matches!(role, StepRole::SynonymOf(_)) {
                matched = true;
                break;
            }

            let pos = self.pos.clone();
            let synsets = ctx.graph.synsets_by_label(&next_node, PosNamespace::from_tag(&pos));

            if synsets.is_empty() {
                // A multi-word supertype may be a wrong word combination;
                // retry with its head words
                let supertype_step = matches!(role, StepRole::SupertypeOf(_) | StepRole::SupertypeHead);
                if !supertype_step || !next_node.contains('_') || next_node == last_not_found {
                    break;
                }
                last_not_found = next_node.clone();

                let chunks = ctx.handler.split(&to_surface(&next_node)).await?;
                let heads = head_words(ctx, chunks, &self.target_surface, false).await;
                let Some(best) = heads.first().cloned() else {
                    break;
                };
                for head in &heads[1..] {
                    let alt = self.extend(current, &head.text, Some(&head.tag), StepRole::SupertypeHead);
                    self.push(alt);
                }
                next_node = best.text.replace(' ', "_");
                self.pos = best.tag.clone();
                current = self.extend(current, &best.text, Some(&best.tag), StepRole::SupertypeHead);
                matched = next_node == self.target_entry;
                depth = path_depth(&self.arena.steps(current));
                continue;
            }

            if role == StepRole::Source && self.has_target_synonym(&synsets) {
                let concept = self.arena.last(current).concept.clone();
                let role = StepRole::SynonymOf(self.target_surface.clone());
                current = self.extend(current, &concept, Some(&pos), role);
                matched = true;
                break;
            }

            let best_supertypes = self.best_supertypes(&synsets).await;
            let Some(first) = best_supertypes.first() else {
                break;
            };

            // Alternatives start from the path as it stands now
            let backup = current;
            let last_node = self.arena.last(backup).concept.clone();
            for supertype in &best_supertypes[1..] {
                let alt_synsets = ctx.graph.synsets_by_supertype(&synsets, supertype);
                if self.has_target_synonym(&alt_synsets) {
                    let role = StepRole::SynonymOf(self.target_surface.clone());
                    let alt = self.extend(backup, &last_node, Some(&pos), role);
                    self.push(alt);
                    continue;
                }

                let roles = self.best_roles(&alt_synsets, supertype, true).await;
                let alt = self.extend(backup, supertype, Some(&pos), StepRole::SupertypeOf(last_node.clone()));
                for role in &roles {
                    self.defer_role(alt, role).await?;
                }
            }

            let first_synsets = ctx.graph.synsets_by_supertype(&synsets, first);
            if self.has_target_synonym(&first_synsets) {
                let role = StepRole::SynonymOf(self.target_surface.clone());
                current = self.extend(current, &to_surface(&next_node), Some(&pos), role);
                matched = true;
                next_node = self.target_entry.clone();
                continue;
            }

            let roles = self.best_roles(&first_synsets, first, false).await;
            let Some(first_role) = roles.first() else {
                break;
            };
            current = self.extend(current, first, Some(&pos), StepRole::SupertypeOf(last_node));
            for role in &roles[1..] {
                self.defer_role(current, role).await?;
            }

            if first_role.is_supertype() {
                next_node = ctx.handler.normalize(&first_role.text, &pos);
            } else {
                current = self.extend(current, &first_role.text, None, StepRole::RoleLabel(first_role.label.clone()));
                let heads = self.role_heads(&first_role.text, false).await?;
                let Some(best) = heads.first().cloned() else {
                    break;
                };
                for head in &heads[1..] {
                    let alt = self.extend(current, &head.text, Some(&head.tag), StepRole::Head);
                    self.push(alt);
                }
                next_node = best.text.replace(' ', "_");
                self.pos = best.tag.clone();
                current = self.extend(current, &best.text, Some(&best.tag), StepRole::Head);
            }

            matched = next_node == self.target_entry;
            depth = path_depth(&self.arena.steps(current));
        }

        Ok((current, matched))
    }

    /// Whether any synonym of the synsets is a known synonym of the target
    fn has_target_synonym(&self, synsets: &[SynsetId]) -> bool {
        let synonyms = &self.ctx.tables.synonyms;
        synsets.iter().any(|&synset| {
            self.ctx
                .graph
                .synonyms_of(synset)
                .iter()
                .any(|word| synonyms.are_synonyms(word, &self.target_surface, &self.pos))
        })
    }

    /// Supertypes whose roles relate best to the target, best first. A
    /// supertype repeats once per best role it carries.
    async fn best_supertypes(&self, synsets: &[SynsetId]) -> Vec<String> {
        let graph = &self.ctx.graph;
        let supertypes = graph.supertypes_of(synsets);
        let groups = graph.roles_grouped_by_supertype(synsets, &supertypes);

        let entries: Vec<&RoleEntry> = groups.iter().flat_map(|(_, roles)| roles).collect();
        let segments: Vec<String> = entries.iter().map(|e| e.text.clone()).collect();
        let best = best_matches(self.ctx.scorer.as_ref(), &self.target_surface, &segments, false).await;

        let mut best_supertypes = Vec::new();
        for segment in &best {
            let Some(entry) = entries.iter().find(|e| &e.text == segment) else {
                continue;
            };
            for (supertype, roles) in &groups {
                if roles.contains(entry) {
                    best_supertypes.push(supertype.clone());
                }
            }
        }
        best_supertypes
    }

    /// Roles of one supertype edge ranked against the target
    async fn best_roles(&self, synsets: &[SynsetId], supertype: &str, ascending: bool) -> Vec<RoleEntry> {
        let roles = self.ctx.graph.roles_by_supertype(synsets, supertype);
        let texts: Vec<String> = roles.iter().map(|r| r.text.clone()).collect();
        best_matches(self.ctx.scorer.as_ref(), &self.target_surface, &texts, ascending)
            .await
            .iter()
            .filter_map(|text| roles.iter().find(|r| &r.text == text).cloned())
            .collect()
    }

    async fn role_heads(&self, text: &str, ascending: bool) -> Result<Vec<Phrase>> {
        let chunks = self.ctx.handler.split(text).await?;
        Ok(head_words(self.ctx, chunks, &self.target_surface, ascending).await)
    }

    /// Put a role on the stack: a supertype role as is, any other role once
    /// per head word
    async fn defer_role(&mut self, path: PathRef, role: &RoleEntry) -> Result<()> {
        if role.is_supertype() {
            self.push(path);
            return Ok(());
        }

        let labelled = self.extend(path, &role.text, None, StepRole::RoleLabel(role.label.clone()));
        for head in self.role_heads(&role.text, true).await? {
            let alt = self.extend(labelled, &head.text, Some(&head.tag), StepRole::Head);
            self.push(alt);
        }
        Ok(())
    }
}

fn render(path: &[PathStep]) -> String {
    path.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" > ")
}
