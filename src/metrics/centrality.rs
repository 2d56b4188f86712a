//! Degree, betweenness, closeness and eigenvector centrality over the CSR snapshot

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use rayon::prelude::*;

use crate::graph::algorithms::distances_from;
use crate::graph::compressed::Adjacency;
use crate::graph::CompressedGraph;

/// Degree divided by the largest possible degree
///
/// Degree counts distinct adjacent nodes (in plus out when directed), so self-loops
/// and repeated edges add nothing. A graph with a single node gives that node
/// a score of 1.
pub fn degree_centrality(graph: &CompressedGraph) -> Vec<f64> {
    let n = graph.node_count;
    if n <= 1 {
        return vec![1.0; n];
    }
    let scale = 1.0 / (n - 1) as f64;
    (0..n).map(|node| graph.degree(node) as f64 * scale).collect()
}

/// Shortest path DAG from one source, in non-decreasing distance order
struct SourceSweep {
    order: Vec<usize>,
    predecessors: Vec<Vec<usize>>,
    sigma: Vec<f64>,
}

#[derive(PartialEq)]
struct Tentative {
    distance: f64,
    node: usize,
    via: usize,
}

impl Eq for Tentative {}

impl Ord for Tentative {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
            .then_with(|| other.via.cmp(&self.via))
    }
}

impl PartialOrd for Tentative {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn sweep_unweighted(adjacency: &Adjacency, source: usize, n: usize) -> SourceSweep {
    let mut order = Vec::with_capacity(n);
    let mut predecessors = vec![Vec::new(); n];
    let mut sigma = vec![0.0; n];
    let mut distance: Vec<Option<usize>> = vec![None; n];
    let mut queue = VecDeque::new();

    sigma[source] = 1.0;
    distance[source] = Some(0);
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        order.push(v);
        let next = distance[v].unwrap_or(0) + 1;
        for &w in adjacency.neighbors(v) {
            let w = w as usize;
            if distance[w].is_none() {
                distance[w] = Some(next);
                queue.push_back(w);
            }
            if distance[w] == Some(next) {
                sigma[w] += sigma[v];
                predecessors[w].push(v);
            }
        }
    }

    SourceSweep {
        order,
        predecessors,
        sigma,
    }
}

fn sweep_weighted(adjacency: &Adjacency, source: usize, n: usize) -> SourceSweep {
    let mut order = Vec::with_capacity(n);
    let mut predecessors = vec![Vec::new(); n];
    let mut sigma = vec![0.0; n];
    let mut seen: Vec<Option<f64>> = vec![None; n];
    let mut settled: Vec<Option<f64>> = vec![None; n];
    let mut heap = BinaryHeap::new();

    seen[source] = Some(0.0);
    sigma[source] = 1.0;
    heap.push(Tentative {
        distance: 0.0,
        node: source,
        via: source,
    });

    while let Some(Tentative { distance, node, via }) = heap.pop() {
        if settled[node].is_some() {
            continue;
        }
        if node != source {
            sigma[node] += sigma[via];
        }
        settled[node] = Some(distance);
        order.push(node);

        for (w, weight) in adjacency.weighted_neighbors(node) {
            let candidate = distance + weight;
            if settled[w].is_some() {
                continue;
            }
            match seen[w] {
                Some(current) if candidate > current => {}
                Some(current) if candidate == current => {
                    sigma[w] += sigma[node];
                    predecessors[w].push(node);
                }
                _ => {
                    seen[w] = Some(candidate);
                    sigma[w] = 0.0;
                    predecessors[w] = vec![node];
                    heap.push(Tentative {
                        distance: candidate,
                        node: w,
                        via: node,
                    });
                }
            }
        }
    }

    SourceSweep {
        order,
        predecessors,
        sigma,
    }
}

/// Pair dependencies of one source (Brandes back-propagation)
fn source_dependencies(adjacency: &Adjacency, source: usize, n: usize, weighted: bool) -> Vec<f64> {
    let sweep = if weighted {
        sweep_weighted(adjacency, source, n)
    } else {
        sweep_unweighted(adjacency, source, n)
    };

    let mut delta = vec![0.0; n];
    let mut scores = vec![0.0; n];
    for &w in sweep.order.iter().rev() {
        let coefficient = (1.0 + delta[w]) / sweep.sigma[w];
        for &v in &sweep.predecessors[w] {
            delta[v] += sweep.sigma[v] * coefficient;
        }
        if w != source {
            scores[w] += delta[w];
        }
    }
    scores
}

/// Normalized betweenness, summing per-source dependencies in parallel
pub fn betweenness_centrality(graph: &CompressedGraph, weighted: bool) -> Vec<f64> {
    let n = graph.node_count;
    let adjacency = &graph.outgoing;

    let raw = (0..n)
        .into_par_iter()
        .map(|source| source_dependencies(adjacency, source, n, weighted))
        .reduce(
            || vec![0.0; n],
            |mut acc, partial| {
                acc.iter_mut().zip(partial).for_each(|(a, p)| *a += p);
                acc
            },
        );

    if n <= 2 {
        return raw;
    }
    let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
    raw.into_iter().map(|score| score * scale).collect()
}

/// Wasserman-Faust closeness, using distances towards each node when directed
pub fn closeness_centrality(graph: &CompressedGraph, weighted: bool) -> Vec<f64> {
    let n = graph.node_count;
    if n <= 1 {
        return vec![0.0; n];
    }
    let adjacency = &graph.incoming;

    (0..n)
        .into_par_iter()
        .map(|node| {
            let (reachable, total) = distances_from(adjacency, node, weighted)
                .into_iter()
                .enumerate()
                .filter(|&(other, _)| other != node)
                .filter_map(|(_, d)| d)
                .fold((0usize, 0.0f64), |(count, sum), d| (count + 1, sum + d));

            if reachable == 0 || total <= 0.0 {
                return 0.0;
            }
            let r = reachable as f64;
            (r / total) * (r / (n - 1) as f64)
        })
        .collect()
}

/// Outcome of the eigenvector power iteration
#[derive(Debug, Clone)]
pub struct EigenvectorScores {
    pub scores: Vec<f64>,
    pub converged: bool,
}

/// Eigenvector centrality by power iteration on `A + I`
///
/// Scores flow along edge direction, so a directed node is central when
/// central nodes point at it. On non-convergence all scores are zero.
pub fn eigenvector_centrality(
    graph: &CompressedGraph,
    max_iter: usize,
    tolerance: f64,
) -> EigenvectorScores {
    let n = graph.node_count;
    if n == 0 {
        return EigenvectorScores {
            scores: Vec::new(),
            converged: true,
        };
    }

    let incoming = &graph.incoming;
    let threshold = n as f64 * tolerance;
    let mut scores = vec![1.0 / n as f64; n];

    for iteration in 1..=max_iter {
        let previous = scores;
        let mut next: Vec<f64> = (0..n)
            .into_par_iter()
            .map(|v| {
                previous[v]
                    + incoming
                        .neighbors(v)
                        .iter()
                        .map(|&u| previous[u as usize])
                        .sum::<f64>()
            })
            .collect();

        let norm = next.iter().map(|x| x * x).sum::<f64>().sqrt();
        let norm = if norm == 0.0 { 1.0 } else { norm };
        next.iter_mut().for_each(|x| *x /= norm);

        let change: f64 = next
            .iter()
            .zip(&previous)
            .map(|(a, b)| (a - b).abs())
            .sum();
        scores = next;

        if change < threshold {
            log::debug!("Eigenvector centrality converged after {} iterations", iteration);
            return EigenvectorScores {
                scores,
                converged: true,
            };
        }
    }

    log::warn!(
        "Eigenvector centrality did not converge in {} iterations, reporting zeros",
        max_iter
    );
    EigenvectorScores {
        scores: vec![0.0; n],
        converged: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Graph};

    fn csr(edges: &[(&str, &str)], directed: bool) -> CompressedGraph {
        let mut graph = Graph::new(directed);
        for &(a, b) in edges {
            graph.add_edge(Edge::new(a, b)).unwrap();
        }
        CompressedGraph::from_graph(&graph)
    }

    fn score(graph: &CompressedGraph, scores: &[f64], id: &str) -> f64 {
        scores[graph.index_of(id).unwrap()]
    }

    #[test]
    fn star_degree_and_betweenness() {
        let graph = csr(&[("hub", "a"), ("hub", "b"), ("hub", "c")], false);

        let degree = degree_centrality(&graph);
        assert_eq!(score(&graph, &degree, "hub"), 1.0);
        assert!((score(&graph, &degree, "a") - 1.0 / 3.0).abs() < 1e-12);

        let betweenness = betweenness_centrality(&graph, false);
        assert!((score(&graph, &betweenness, "hub") - 1.0).abs() < 1e-12);
        assert_eq!(score(&graph, &betweenness, "a"), 0.0);
    }

    #[test]
    fn path_betweenness_matches_pair_counts() {
        let graph = csr(&[("a", "b"), ("b", "c"), ("c", "d")], false);
        let betweenness = betweenness_centrality(&graph, false);

        // b lies on a-c and a-d out of three pairs not involving it
        assert!((score(&graph, &betweenness, "b") - 2.0 / 3.0).abs() < 1e-12);
        assert!((score(&graph, &betweenness, "c") - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn weighted_betweenness_prefers_light_detour() {
        let mut graph = Graph::undirected();
        graph.add_edge(Edge::new("a", "c").with_weight(10.0)).unwrap();
        graph.add_edge(Edge::new("a", "b").with_weight(1.0)).unwrap();
        graph.add_edge(Edge::new("b", "c").with_weight(1.0)).unwrap();
        let graph = CompressedGraph::from_graph(&graph);

        let unweighted = betweenness_centrality(&graph, false);
        let weighted = betweenness_centrality(&graph, true);
        assert_eq!(score(&graph, &unweighted, "b"), 0.0);
        assert!(score(&graph, &weighted, "b") > 0.0);
    }

    #[test]
    fn closeness_on_path_and_isolates() {
        let graph = csr(&[("a", "b"), ("b", "c")], false);
        let closeness = closeness_centrality(&graph, false);
        assert!((score(&graph, &closeness, "b") - 1.0).abs() < 1e-12);
        assert!((score(&graph, &closeness, "a") - 2.0 / 3.0).abs() < 1e-12);

        let mut lonely = Graph::undirected();
        lonely.add_edge(Edge::new("x", "y")).unwrap();
        lonely.ensure_node("z");
        let lonely = CompressedGraph::from_graph(&lonely);
        let closeness = closeness_centrality(&lonely, false);
        assert_eq!(score(&lonely, &closeness, "z"), 0.0);
        assert!((score(&lonely, &closeness, "x") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn directed_closeness_uses_incoming_distances() {
        let graph = csr(&[("a", "b")], true);
        let closeness = closeness_centrality(&graph, false);
        assert_eq!(score(&graph, &closeness, "a"), 0.0);
        assert_eq!(score(&graph, &closeness, "b"), 1.0);
    }

    #[test]
    fn eigenvector_favours_the_hub() {
        let graph = csr(&[("hub", "a"), ("hub", "b"), ("hub", "c"), ("a", "b")], false);
        let result = eigenvector_centrality(&graph, 1000, 1e-6);

        assert!(result.converged);
        let hub = score(&graph, &result.scores, "hub");
        assert!(hub > score(&graph, &result.scores, "c"));
        let norm: f64 = result.scores.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn eigenvector_gives_zeros_without_convergence() {
        let graph = csr(&[("a", "b"), ("b", "c"), ("c", "d")], false);
        let result = eigenvector_centrality(&graph, 1, 1e-12);

        assert!(!result.converged);
        assert!(result.scores.iter().all(|&s| s == 0.0));
    }
}
