//! Adjacency construction for the compressed snapshot

use crate::graph::compressed::Adjacency;

/// Builder for incrementally constructing one CSR adjacency
pub struct AdjacencyBuilder {
    /// Weighted neighbor lists for each node
    adjacency_lists: Vec<Vec<(u32, f64)>>,
}

impl AdjacencyBuilder {
    /// Create a builder for `node_count` nodes
    pub fn with_capacity(node_count: usize) -> Self {
        Self {
            adjacency_lists: vec![Vec::new(); node_count],
        }
    }

    /// Add an arc from one node index to another
    pub fn add_arc(&mut self, src: u32, dst: u32, weight: f64) {
        self.adjacency_lists[src as usize].push((dst, weight));
    }

    /// Build the adjacency
    ///
    /// Lists are sorted by target so lookups can binary search. Parallel arcs
    /// collapse into one entry carrying the smallest weight.
    pub fn build(mut self) -> Adjacency {
        let mut offsets = Vec::with_capacity(self.adjacency_lists.len() + 1);
        offsets.push(0u32);

        let edge_count: usize = self.adjacency_lists.iter().map(|list| list.len()).sum();
        let mut targets = Vec::with_capacity(edge_count);
        let mut weights = Vec::with_capacity(edge_count);

        let mut offset = 0u32;
        for list in &mut self.adjacency_lists {
            list.sort_unstable_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
            list.dedup_by_key(|entry| entry.0);

            for &(dst, weight) in list.iter() {
                targets.push(dst);
                weights.push(weight);
            }
            offset += list.len() as u32;
            offsets.push(offset);
        }

        Adjacency {
            offsets,
            targets,
            weights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_sorts_and_collapses_parallel_arcs() {
        let mut builder = AdjacencyBuilder::with_capacity(3);
        builder.add_arc(0, 2, 4.0);
        builder.add_arc(0, 1, 1.0);
        builder.add_arc(0, 2, 0.5);
        builder.add_arc(2, 0, 3.0);

        let adjacency = builder.build();
        assert_eq!(adjacency.neighbors(0), &[1, 2]);
        assert_eq!(adjacency.weights(0), &[1.0, 0.5]);
        assert!(adjacency.neighbors(1).is_empty());
        assert_eq!(adjacency.degree(2), 1);
    }
}
