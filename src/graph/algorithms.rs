//! Traversal primitives shared by the analysis engines

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use crate::graph::compressed::{Adjacency, CompressedGraph};

/// Union-Find data structure for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Size of each set (for union by size)
    rank: Vec<u32>,
}

impl DisjointSets {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            rank: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }

        let mut current = x;
        while self.parent[current as usize] != root {
            let next = self.parent[current as usize];
            self.parent[current as usize] = root;
            current = next;
        }
        root
    }

    /// Union the sets containing x and y
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return;
        }

        // Attach smaller tree under root of larger tree
        if self.rank[root_x as usize] > self.rank[root_y as usize] {
            self.parent[root_y as usize] = root_x;
            self.rank[root_x as usize] += self.rank[root_y as usize];
        } else {
            self.parent[root_x as usize] = root_y;
            self.rank[root_y as usize] += self.rank[root_x as usize];
        }
    }
}

/// Weakly connected components, largest first, members ascending
pub fn connected_components(graph: &CompressedGraph) -> Vec<Vec<usize>> {
    let mut sets = DisjointSets::new(graph.node_count);
    for node in 0..graph.node_count {
        for &dst in graph.undirected.neighbors(node) {
            sets.union(node as u32, dst);
        }
    }

    let mut by_root: HashMap<u32, Vec<usize>> = HashMap::new();
    for node in 0..graph.node_count {
        let root = sets.find(node as u32);
        by_root.entry(root).or_default().push(node);
    }

    let mut components: Vec<Vec<usize>> = by_root.into_values().collect();
    components.sort_by(|a, b| b.len().cmp(&a.len()).then(a[0].cmp(&b[0])));
    components
}

/// Whether every node reaches every other node along edge direction
pub fn is_strongly_connected(graph: &CompressedGraph) -> bool {
    if graph.node_count == 0 {
        return false;
    }
    let forward = bfs(&graph.outgoing, 0);
    let backward = bfs(&graph.incoming, 0);
    forward.distances.iter().all(Option::is_some) && backward.distances.iter().all(Option::is_some)
}

/// Distances and predecessors from one source
#[derive(Debug, Clone)]
pub struct ShortestPathTree<D> {
    pub source: usize,
    pub distances: Vec<Option<D>>,
    pub predecessors: Vec<Option<usize>>,
}

impl<D> ShortestPathTree<D> {
    /// Node indices on the path from the source to `target`, both inclusive
    pub fn path_to(&self, target: usize) -> Option<Vec<usize>> {
        self.distances[target].as_ref()?;

        let mut path = vec![target];
        let mut current = target;
        while current != self.source {
            current = self.predecessors[current]?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }
}

/// Unweighted breadth-first search, in the frontier order of `adjacency`
pub fn bfs(adjacency: &Adjacency, source: usize) -> ShortestPathTree<usize> {
    let node_count = adjacency.offsets.len() - 1;
    let mut distances = vec![None; node_count];
    let mut predecessors = vec![None; node_count];
    let mut queue = VecDeque::new();

    distances[source] = Some(0);
    queue.push_back(source);

    while let Some(node) = queue.pop_front() {
        let next = distances[node].unwrap_or(0) + 1;
        for &dst in adjacency.neighbors(node) {
            let dst = dst as usize;
            if distances[dst].is_none() {
                distances[dst] = Some(next);
                predecessors[dst] = Some(node);
                queue.push_back(dst);
            }
        }
    }

    ShortestPathTree {
        source,
        distances,
        predecessors,
    }
}

/// Heap entry ordered so that `BinaryHeap` pops the smallest distance first
#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapEntry {
    distance: f64,
    node: usize,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra over edge weights as distances
pub fn dijkstra(adjacency: &Adjacency, source: usize) -> ShortestPathTree<f64> {
    let node_count = adjacency.offsets.len() - 1;
    let mut distances: Vec<Option<f64>> = vec![None; node_count];
    let mut predecessors = vec![None; node_count];
    let mut settled = vec![false; node_count];
    let mut heap = BinaryHeap::new();

    distances[source] = Some(0.0);
    heap.push(HeapEntry {
        distance: 0.0,
        node: source,
    });

    while let Some(HeapEntry { distance, node }) = heap.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;

        for (dst, weight) in adjacency.weighted_neighbors(node) {
            let candidate = distance + weight;
            let better = match distances[dst] {
                None => true,
                Some(current) => candidate < current,
            };
            if better && !settled[dst] {
                distances[dst] = Some(candidate);
                predecessors[dst] = Some(node);
                heap.push(HeapEntry {
                    distance: candidate,
                    node: dst,
                });
            }
        }
    }

    ShortestPathTree {
        source,
        distances,
        predecessors,
    }
}

/// Distances from `source` as floats, weighted or in hops
pub fn distances_from(adjacency: &Adjacency, source: usize, weighted: bool) -> Vec<Option<f64>> {
    if weighted {
        dijkstra(adjacency, source).distances
    } else {
        bfs(adjacency, source)
            .distances
            .into_iter()
            .map(|d| d.map(|hops| hops as f64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Graph};

    fn csr(edges: &[(&str, &str, f64)], directed: bool) -> CompressedGraph {
        let mut graph = Graph::new(directed);
        for &(a, b, w) in edges {
            graph.add_edge(Edge::new(a, b).with_weight(w)).unwrap();
        }
        CompressedGraph::from_graph(&graph)
    }

    #[test]
    fn disjoint_sets_merge_roots() {
        let mut sets = DisjointSets::new(5);
        sets.union(0, 1);
        sets.union(3, 4);
        sets.union(1, 4);

        assert_eq!(sets.find(3), sets.find(0));
        assert_eq!(sets.find(4), sets.find(1));
        assert_ne!(sets.find(2), sets.find(0));
        assert_eq!(sets.find(2), 2);
    }

    #[test]
    fn components_sorted_largest_first() {
        let graph = csr(&[("a", "b", 1.0), ("c", "d", 1.0), ("d", "e", 1.0)], false);
        let components = connected_components(&graph);

        assert_eq!(components.len(), 2);
        assert_eq!(components[0].len(), 3);
        assert_eq!(components[1].len(), 2);
    }

    #[test]
    fn bfs_reconstructs_paths() {
        let graph = csr(&[("a", "b", 1.0), ("b", "c", 1.0), ("c", "d", 1.0)], false);
        let a = graph.index_of("a").unwrap();
        let d = graph.index_of("d").unwrap();

        let tree = bfs(&graph.outgoing, a);
        assert_eq!(tree.distances[d], Some(3));
        let path: Vec<&str> = tree.path_to(d).unwrap().into_iter().map(|i| graph.id_of(i)).collect();
        assert_eq!(path, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn dijkstra_prefers_lighter_detour() {
        let graph = csr(&[("a", "b", 10.0), ("a", "c", 1.0), ("c", "b", 2.0)], false);
        let a = graph.index_of("a").unwrap();
        let b = graph.index_of("b").unwrap();

        let tree = dijkstra(&graph.outgoing, a);
        assert_eq!(tree.distances[b], Some(3.0));
        assert_eq!(tree.path_to(b).unwrap().len(), 3);
    }

    #[test]
    fn strong_connectivity_respects_direction() {
        let cycle = csr(&[("a", "b", 1.0), ("b", "c", 1.0), ("c", "a", 1.0)], true);
        let chain = csr(&[("a", "b", 1.0), ("b", "c", 1.0)], true);

        assert!(is_strongly_connected(&cycle));
        assert!(!is_strongly_connected(&chain));
    }
}
