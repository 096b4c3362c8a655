use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::error::{FuzzyError, Result};

new_key_type! {
    /// A graph node key
    pub struct NodeKey;
}

#[derive(Clone, Copy, PartialEq)]
enum Color {
    /// Not visited yet
    White,
    /// On the current DFS path
    Grey,
    /// Done, with all its successors
    Black,
}

/// A directed graph over arbitrary payloads. Nodes keep their insertion
/// order, which makes the topological order deterministic.
#[derive(Clone, Debug)]
pub struct DirectedGraph<T> {
    nodes: SlotMap<NodeKey, T>,
    order: Vec<NodeKey>,
    edges: SecondaryMap<NodeKey, Vec<NodeKey>>,
}

impl<T> DirectedGraph<T> {
    pub fn new() -> Self {
        DirectedGraph {
            nodes: SlotMap::with_key(),
            order: Vec::new(),
            edges: SecondaryMap::new(),
        }
    }

    pub fn add_node(&mut self, payload: T) -> NodeKey {
        let key = self.nodes.insert(payload);

        self.order.push(key);

        key
    }

    /// Adds the edges `from -> to[i]`. Keys absent from this graph are
    /// ignored. Keys only carry a slot index and version, so a key minted
    /// by another graph is accepted when this graph holds the same slot.
    pub fn add_edge(&mut self, from: NodeKey, to: &[NodeKey]) -> &mut Self {
        if !self.nodes.contains_key(from) {
            return self;
        }

        let to = to.iter().copied().filter(|key| self.nodes.contains_key(*key));

        match self.edges.get_mut(from) {
            Some(successors) => successors.extend(to),
            None => {
                let successors: Vec<NodeKey> = to.collect();

                self.edges.insert(from, successors);
            },
        }

        self
    }

    pub fn node(&self, key: NodeKey) -> Option<&T> {
        self.nodes.get(key)
    }

    pub fn successors(&self, key: NodeKey) -> &[NodeKey] {
        self.edges.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_cyclic(&self) -> bool {
        self.post_order().is_err()
    }

    /// Topological order: for every edge `u -> v`, `u` comes before `v`.
    pub fn flatten(&self) -> Result<Vec<NodeKey>> {
        let mut flat = self.post_order()?;

        flat.reverse();

        Ok(flat)
    }

    /// Payloads in topological order.
    pub fn into_sorted(mut self) -> Result<Vec<T>> {
        let flat = self.flatten()?;

        Ok(flat.into_iter().filter_map(|key| self.nodes.remove(key)).collect())
    }

    // Iterative three color DFS from every white node, in insertion order.
    // A node is emitted once all its successors are; reaching a grey node
    // closes a cycle.
    fn post_order(&self) -> Result<Vec<NodeKey>> {
        let mut colors: SecondaryMap<NodeKey, Color> = self.order.iter().map(|key| (*key, Color::White)).collect();
        let mut flat = Vec::with_capacity(self.order.len());
        let mut stack: Vec<(NodeKey, usize)> = Vec::new();

        for &root in &self.order {
            if colors.get(root) != Some(&Color::White) {
                continue;
            }

            colors.insert(root, Color::Grey);
            stack.push((root, 0));

            while let Some((node, next)) = stack.last_mut() {
                let node = *node;

                match self.successors(node).get(*next) {
                    Some(&child) => {
                        *next += 1;

                        match colors.get(child) {
                            Some(Color::Grey) => return Err(FuzzyError::CyclicDependency),
                            Some(Color::White) => {
                                colors.insert(child, Color::Grey);
                                stack.push((child, 0));
                            },
                            _ => {},
                        }
                    },
                    None => {
                        colors.insert(node, Color::Black);
                        flat.push(node);
                        stack.pop();
                    },
                }
            }
        }

        Ok(flat)
    }
}

impl<T> Default for DirectedGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
fn letters(n: usize) -> (DirectedGraph<char>, Vec<NodeKey>) {
    let mut graph = DirectedGraph::new();
    let keys = ('a'..).take(n).map(|c| graph.add_node(c)).collect();

    (graph, keys)
}

#[cfg(test)]
fn payloads(graph: &DirectedGraph<char>) -> String {
    graph
        .flatten()
        .unwrap()
        .into_iter()
        .filter_map(|key| graph.node(key))
        .collect()
}

#[test]
fn test_graph_without_edges() {
    let (graph, _) = letters(8);

    assert!(!graph.is_cyclic());
    assert_eq!(payloads(&graph), "hgfedcba");
    assert!(DirectedGraph::<char>::new().flatten().unwrap().is_empty());
}

#[test]
fn test_graph_order() {
    let (mut graph, k) = letters(3);

    graph.add_edge(k[0], &[k[2]]).add_edge(k[1], &[k[2]]);

    assert!(!graph.is_cyclic());
    assert_eq!(payloads(&graph), "bac");

    let (mut graph, k) = letters(8);
    let (a, b, c, d, e, f, g) = (k[0], k[1], k[2], k[3], k[4], k[5], k[6]);

    graph
        .add_edge(a, &[c])
        .add_edge(b, &[c, e])
        .add_edge(c, &[g])
        .add_edge(d, &[e, f])
        .add_edge(e, &[g]);

    assert!(!graph.is_cyclic());
    assert_eq!(payloads(&graph), "hdfbeacg");

    // Same edges, declared in reverse
    let (mut graph, k) = letters(8);
    let (a, b, c, d, e, f, g) = (k[0], k[1], k[2], k[3], k[4], k[5], k[6]);

    graph
        .add_edge(e, &[g])
        .add_edge(d, &[e, f])
        .add_edge(c, &[g])
        .add_edge(b, &[c, e])
        .add_edge(a, &[c]);

    assert_eq!(payloads(&graph), "hdfbeacg");
    assert_eq!(graph.into_sorted().unwrap(), ['h', 'd', 'f', 'b', 'e', 'a', 'c', 'g']);
}

#[test]
fn test_graph_cycles() {
    let (mut graph, k) = letters(4);
    let (a, b, c, d) = (k[0], k[1], k[2], k[3]);

    graph.add_edge(a, &[b, c]).add_edge(b, &[c]).add_edge(c, &[d, a]).add_edge(d, &[d]);

    assert!(graph.is_cyclic());
    assert_eq!(graph.flatten(), Err(FuzzyError::CyclicDependency));

    let (mut graph, k) = letters(4);

    graph
        .add_edge(k[0], &[k[1]])
        .add_edge(k[1], &[k[2]])
        .add_edge(k[2], &[k[3]])
        .add_edge(k[3], &[k[0]]);

    assert!(graph.is_cyclic());
    assert_eq!(graph.into_sorted(), Err(FuzzyError::CyclicDependency));

    let (mut graph, k) = letters(2);

    graph.add_edge(k[1], &[k[1]]);

    assert!(graph.is_cyclic());
}

#[test]
fn test_graph_foreign_keys() {
    let (mut graph, k) = letters(2);
    let (other, foreign) = letters(3);

    // The third slot was never allocated here
    graph.add_edge(k[0], &[foreign[2], k[1]]).add_edge(foreign[2], &[k[0]]);

    assert_eq!(graph.node(foreign[2]), None);
    assert_eq!(graph.successors(k[0]), &[k[1]]);
    assert!(graph.successors(foreign[2]).is_empty());
    assert_eq!(payloads(&graph), "ab");
    assert_eq!(other.len(), 3);

    // Same slot as `k[1]`: indistinguishable from it
    assert_eq!(graph.node(foreign[1]), Some(&'b'));
}

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::letters;

    fn dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
        (1usize..12).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..30)))
    }

    proptest! {
        #[test]
        fn flatten_respects_edges((n, pairs) in dag()) {
            let (mut graph, keys) = letters(n);
            // Forward edges only: always acyclic
            let edges: Vec<(usize, usize)> = pairs.into_iter().filter(|(u, v)| u < v).collect();

            for &(u, v) in &edges {
                graph.add_edge(keys[u], &[keys[v]]);
            }

            let flat = graph.flatten().unwrap();
            let position = |key| flat.iter().position(|k| *k == key).unwrap();

            prop_assert_eq!(flat.len(), n);
            for &(u, v) in &edges {
                prop_assert!(position(keys[u]) < position(keys[v]));
            }
        }

        #[test]
        fn ring_is_cyclic(n in 1usize..12) {
            let (mut graph, keys) = letters(n);

            for i in 0..n {
                graph.add_edge(keys[i], &[keys[(i + 1) % n]]);
            }

            prop_assert!(graph.is_cyclic());
        }
    }
}
