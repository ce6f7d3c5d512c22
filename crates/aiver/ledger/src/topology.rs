//! Graph traversals over digest-keyed adjacency.
//!
//! All traversals are iterative; none recurse on graph depth.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::error::LedgerError;
use crate::types::Digest;

/// Borrowed view of a ledger graph: the node digests in insertion order plus
/// forward adjacency (parent → children).
///
/// The adjacency may mention digests that are not nodes when it was loaded
/// from an untrusted snapshot. Those digests still take part in traversals.
#[derive(Clone, Copy)]
pub struct Adjacency<'a> {
    nodes: &'a [Digest],
    children: &'a HashMap<Digest, Vec<Digest>>,
}

impl<'a> Adjacency<'a> {
    pub fn new(nodes: &'a [Digest], children: &'a HashMap<Digest, Vec<Digest>>) -> Self {
        Self { nodes, children }
    }

    pub fn children_of(&self, digest: &Digest) -> &'a [Digest] {
        self.children
            .get(digest)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every digest in the graph: nodes in insertion order, then any digest
    /// that only appears in the adjacency, sorted.
    pub fn universe(&self) -> Vec<Digest> {
        let known: HashSet<&Digest> = self.nodes.iter().collect();
        let mut extra: Vec<Digest> = self
            .children
            .iter()
            .flat_map(|(parent, kids)| std::iter::once(parent).chain(kids.iter()))
            .filter(|d| !known.contains(d))
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        extra.sort();

        let mut all = Vec::with_capacity(self.nodes.len() + extra.len());
        all.extend_from_slice(self.nodes);
        all.extend(extra);
        all
    }
}

/// Kahn's algorithm. Seeds are the in-degree-zero digests in universe order,
/// so the result is deterministic for a given graph.
///
/// Edges are the union of the forward adjacency and every node's declared
/// parents (`parents_of`), so a graph whose adjacency is missing edges still
/// puts each parent before its children. Only digests that are nodes appear
/// in the output. Fails with `CycleDetected` naming the first digest that
/// could not be linearized.
pub fn topological_order<'p, P>(
    graph: Adjacency<'_>,
    parents_of: P,
) -> Result<Vec<Digest>, LedgerError>
where
    P: Fn(&Digest) -> &'p [Digest],
{
    let mut universe = graph.universe();
    let mut known: HashSet<Digest> = universe.iter().copied().collect();
    let mut edges: HashSet<(Digest, Digest)> = HashSet::new();
    let mut successors: HashMap<Digest, Vec<Digest>> = HashMap::new();

    for parent in &universe {
        for child in graph.children_of(parent) {
            if edges.insert((*parent, *child)) {
                successors.entry(*parent).or_default().push(*child);
            }
        }
    }
    let mut dangling = Vec::new();
    for node in graph.nodes {
        for parent in parents_of(node) {
            if edges.insert((*parent, *node)) {
                successors.entry(*parent).or_default().push(*node);
            }
            if known.insert(*parent) {
                dangling.push(*parent);
            }
        }
    }
    dangling.sort();
    universe.extend(dangling);

    let mut in_degree: HashMap<Digest, usize> = universe.iter().map(|d| (*d, 0)).collect();
    for (_, child) in &edges {
        *in_degree.entry(*child).or_insert(0) += 1;
    }

    let mut queue: VecDeque<Digest> = universe
        .iter()
        .filter(|d| in_degree.get(*d) == Some(&0))
        .copied()
        .collect();

    let mut sorted = Vec::with_capacity(universe.len());
    while let Some(current) = queue.pop_front() {
        sorted.push(current);
        for child in successors.get(&current).map(Vec::as_slice).unwrap_or(&[]) {
            if let Some(deg) = in_degree.get_mut(child) {
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(*child);
                }
            }
        }
    }

    if sorted.len() != universe.len() {
        let stuck = universe
            .iter()
            .find(|d| in_degree.get(*d).is_some_and(|deg| *deg > 0))
            .copied()
            .unwrap_or(universe[0]);
        return Err(LedgerError::CycleDetected(stuck));
    }

    let nodes: HashSet<&Digest> = graph.nodes.iter().collect();
    sorted.retain(|d| nodes.contains(d));
    debug!(
        nodes = sorted.len(),
        edges = edges.len(),
        "Topological order computed"
    );
    Ok(sorted)
}

/// Breadth-first walk from `start` (exclusive) following `next`. Each digest
/// is reported once, in discovery order.
pub fn breadth_first<'a, F>(start: Digest, mut next: F) -> Vec<Digest>
where
    F: FnMut(&Digest) -> &'a [Digest],
{
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    let mut out = Vec::new();
    while let Some(current) = queue.pop_front() {
        for d in next(&current) {
            if seen.insert(*d) {
                out.push(*d);
                queue.push_back(*d);
            }
        }
    }
    out
}
