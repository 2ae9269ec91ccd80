//! Dynamic-programming cost table over feasible boundary nodes.

use crate::bounds::FeasibleBounds;

/// Cumulative correlation scores and predecessor pointers for one sample row.
///
/// Stored flat over the nodes of [`FeasibleBounds`]: node `k` of boundary `i`
/// is its `k`-th feasible position. The start node scores `0`; every other
/// node starts at `-inf` and stays there when it has no reachable predecessor.
#[derive(Debug, Clone, PartialEq)]
pub struct CostTable {
    bounds: FeasibleBounds,
    scores: Vec<f64>,
    predecessors: Vec<Option<usize>>,
}

impl CostTable {
    /// Allocate a table with the start node at score `0`.
    pub(crate) fn new(bounds: &FeasibleBounds) -> Self {
        let n = bounds.n_nodes();
        let mut scores = vec![f64::NEG_INFINITY; n];
        scores[0] = 0.0;
        Self {
            bounds: bounds.clone(),
            scores,
            predecessors: vec![None; n],
        }
    }

    /// Return the bounds this table is laid out over.
    #[must_use]
    pub fn bounds(&self) -> &FeasibleBounds {
        &self.bounds
    }

    /// Cumulative score of boundary `i` at sample `position`, `-inf` when
    /// unreachable or outside the feasible window.
    #[must_use]
    pub fn score(&self, i: usize, position: usize) -> f64 {
        self.bounds
            .node(i, position)
            .map_or(f64::NEG_INFINITY, |k| self.scores[k])
    }

    /// Position of the predecessor on boundary `i - 1` chosen for boundary `i`
    /// at `position`.
    #[must_use]
    pub fn predecessor(&self, i: usize, position: usize) -> Option<usize> {
        self.bounds.node(i, position).and_then(|k| self.predecessors[k])
    }

    /// Return true if boundary `i` at `position` can be reached from the start.
    #[must_use]
    pub fn is_reachable(&self, i: usize, position: usize) -> bool {
        self.score(i, position) > f64::NEG_INFINITY
    }

    /// Iterate `(position, score, predecessor)` over the nodes of boundary `i`.
    pub fn nodes(&self, i: usize) -> impl Iterator<Item = (usize, f64, Option<usize>)> + '_ {
        let start = self.bounds.node_offset(i);
        self.bounds.range(i).enumerate().map(move |(k, position)| {
            (position, self.scores[start + k], self.predecessors[start + k])
        })
    }

    pub(crate) fn set(&mut self, i: usize, position: usize, score: f64, predecessor: usize) {
        if let Some(k) = self.bounds.node(i, position) {
            self.scores[k] = score;
            self.predecessors[k] = Some(predecessor);
        }
    }

    /// Follow predecessor pointers back from the last boundary at `end`.
    ///
    /// Returns the `N + 1` positions in forward order, or `None` if `end` is
    /// unreachable.
    pub(crate) fn trace_back(&self, end: usize) -> Option<Vec<usize>> {
        let last = self.bounds.n_boundaries() - 1;
        if !self.is_reachable(last, end) {
            return None;
        }
        let mut path = vec![0; last + 1];
        path[last] = end;
        for i in (1..=last).rev() {
            path[i - 1] = self.predecessor(i, path[i])?;
        }
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::BandConstraint;
    use crate::segment::{SegmentSpec, Segmentation};

    fn bounds() -> FeasibleBounds {
        let s = Segmentation::build(&SegmentSpec::Length(6), 1, 21, 21, false).unwrap();
        FeasibleBounds::new(&s, BandConstraint::Unconstrained, 21, 21).unwrap()
    }

    #[test]
    fn start_node_scores_zero() {
        let t = CostTable::new(&bounds());
        assert_eq!(t.score(0, 0), 0.0);
        assert!(t.is_reachable(0, 0));
        assert_eq!(t.predecessor(0, 0), None);
    }

    #[test]
    fn other_nodes_start_unreachable() {
        let t = CostTable::new(&bounds());
        for i in 1..5 {
            assert!(t.nodes(i).all(|(_, s, p)| s == f64::NEG_INFINITY && p.is_none()));
        }
        assert_eq!(t.score(1, 19), f64::NEG_INFINITY);
    }

    #[test]
    fn trace_back_follows_pointers() {
        let mut t = CostTable::new(&bounds());
        t.set(1, 6, 0.9, 0);
        t.set(2, 11, 1.8, 6);
        t.set(3, 15, 2.7, 11);
        t.set(4, 20, 3.6, 15);
        assert_eq!(t.trace_back(20), Some(vec![0, 6, 11, 15, 20]));
    }

    #[test]
    fn trace_back_unreachable_end() {
        let t = CostTable::new(&bounds());
        assert_eq!(t.trace_back(20), None);
    }
}
