//! Greedy agglomerative modularity maximization (Clauset-Newman-Moore)

use std::collections::BTreeMap;

use crate::community::WeightedView;

/// Merge the pair of connected communities with the largest modularity gain
/// until no merge has a positive gain
pub(crate) fn greedy_modularity(view: &WeightedView) -> Vec<usize> {
    let n = view.len();
    let mut labels: Vec<usize> = (0..n).collect();
    let m2 = view.total_strength();
    if m2 <= 0.0 {
        return labels;
    }

    // e[i][j]: fraction of edge ends joining communities i and j
    let mut e: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
    for (node, links) in view.adjacency.iter().enumerate() {
        for &(other, w) in links {
            *e[node].entry(other).or_default() += w / m2;
        }
    }
    let mut a: Vec<f64> = (0..n).map(|node| view.strength(node) / m2).collect();
    let mut alive = vec![true; n];
    let mut merges = 0;

    loop {
        let mut best: Option<(f64, usize, usize)> = None;
        for i in (0..n).filter(|&i| alive[i]) {
            for (&j, &eij) in e[i].range(i + 1..) {
                let gain = 2.0 * (eij - a[i] * a[j]);
                if best.map_or(true, |(g, _, _)| gain > g) {
                    best = Some((gain, i, j));
                }
            }
        }

        let Some((gain, keep, absorb)) = best else {
            break;
        };
        if gain <= 0.0 {
            break;
        }

        let absorbed = std::mem::take(&mut e[absorb]);
        for (k, ejk) in absorbed {
            if k == keep {
                continue;
            }
            *e[keep].entry(k).or_default() += ejk;
            let row = &mut e[k];
            row.remove(&absorb);
            *row.entry(keep).or_default() += ejk;
        }
        e[keep].remove(&absorb);
        a[keep] += a[absorb];
        alive[absorb] = false;

        for label in labels.iter_mut() {
            if *label == absorb {
                *label = keep;
            }
        }
        merges += 1;
    }

    log::debug!("Greedy modularity made {} merges", merges);
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(n: usize, edges: &[(usize, usize)]) -> WeightedView {
        let mut adjacency = vec![Vec::new(); n];
        for &(a, b) in edges {
            adjacency[a].push((b, 1.0));
            adjacency[b].push((a, 1.0));
        }
        WeightedView {
            adjacency,
            loops: vec![0.0; n],
        }
    }

    #[test]
    fn two_cliques_stay_apart() {
        let v = view(
            6,
            &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)],
        );
        let labels = greedy_modularity(&v);

        assert!(labels[..3].iter().all(|&l| l == labels[0]));
        assert!(labels[3..].iter().all(|&l| l == labels[3]));
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn single_edge_merges() {
        let labels = greedy_modularity(&view(2, &[(0, 1)]));
        assert_eq!(labels[0], labels[1]);
    }
}
