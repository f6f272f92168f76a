//! Tree edit distance (Zhang-Shasha)
//!
//! Unit costs per operation: deleting or inserting a node costs 2,
//! relabelling costs 3.

use super::tree::LabeledTree;
use std::collections::HashSet;

pub const DELETE_COST: f64 = 2.0;
pub const INSERT_COST: f64 = 2.0;
pub const RENAME_COST: f64 = 3.0;

/// Postorder view: labels, leftmost leaf descendants and keyroots
struct Indexed<'a> {
    labels: Vec<&'a str>,
    lld: Vec<usize>,
    keyroots: Vec<usize>,
}

impl<'a> Indexed<'a> {
    fn new(tree: &'a LabeledTree) -> Self {
        let mut labels = Vec::new();
        let mut lld = Vec::new();
        Self::walk(tree, &mut labels, &mut lld);

        let mut seen = HashSet::new();
        let mut keyroots: Vec<usize> = (0..labels.len())
            .rev()
            .filter(|&i| seen.insert(lld[i]))
            .collect();
        keyroots.sort_unstable();

        Self {
            labels,
            lld,
            keyroots,
        }
    }

    fn walk(node: &'a LabeledTree, labels: &mut Vec<&'a str>, lld: &mut Vec<usize>) -> usize {
        let mut first_leaf = None;
        for child in &node.children {
            let index = Self::walk(child, labels, lld);
            first_leaf.get_or_insert(lld[index]);
        }
        labels.push(&node.label);
        let index = labels.len() - 1;
        lld.push(first_leaf.unwrap_or(index));
        index
    }
}

/// Minimum cost of turning `a` into `b`
pub fn tree_edit_distance(a: &LabeledTree, b: &LabeledTree) -> f64 {
    let a = Indexed::new(a);
    let b = Indexed::new(b);
    let mut tree_dist = vec![vec![0.0; b.labels.len()]; a.labels.len()];

    for &i in &a.keyroots {
        for &j in &b.keyroots {
            forest_distance(&a, &b, i, j, &mut tree_dist);
        }
    }

    tree_dist[a.labels.len() - 1][b.labels.len() - 1]
}

fn forest_distance(a: &Indexed, b: &Indexed, i: usize, j: usize, tree_dist: &mut [Vec<f64>]) {
    let li = a.lld[i];
    let lj = b.lld[j];
    let rows = i - li + 2;
    let cols = j - lj + 2;
    let mut fd = vec![vec![0.0; cols]; rows];

    for x in 1..rows {
        fd[x][0] = fd[x - 1][0] + DELETE_COST;
    }
    for y in 1..cols {
        fd[0][y] = fd[0][y - 1] + INSERT_COST;
    }

    for x in 1..rows {
        for y in 1..cols {
            let ai = li + x - 1;
            let bj = lj + y - 1;
            let delete = fd[x - 1][y] + DELETE_COST;
            let insert = fd[x][y - 1] + INSERT_COST;

            if a.lld[ai] == li && b.lld[bj] == lj {
                let rename = if a.labels[ai] == b.labels[bj] { 0.0 } else { RENAME_COST };
                fd[x][y] = delete.min(insert).min(fd[x - 1][y - 1] + rename);
                tree_dist[ai][bj] = fd[x][y];
            } else {
                let px = a.lld[ai] - li;
                let py = b.lld[bj] - lj;
                fd[x][y] = delete.min(insert).min(fd[px][py] + tree_dist[ai][bj]);
            }
        }
    }
}

/// Distance relative to the size difference of the trees, as a rounded
/// percentage; equal sizes divide by one
pub fn normalize_distance(raw: f64, node_diff: usize) -> f64 {
    let diff = node_diff.max(1) as f64;
    ((raw / diff) * 100.0).round()
}
