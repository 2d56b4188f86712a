//! Louvain modularity optimization: local moving followed by aggregation

use std::collections::HashMap;

use crate::community::WeightedView;

/// Gains at or below this are treated as no improvement
const MIN_GAIN: f64 = 1e-12;

/// Move nodes between communities until no single move improves modularity
///
/// Returns the community of every node and whether anything moved.
fn local_moving(view: &WeightedView) -> (Vec<usize>, bool) {
    let n = view.len();
    let m2 = view.total_strength();
    let strength: Vec<f64> = (0..n).map(|node| view.strength(node)).collect();
    let mut community: Vec<usize> = (0..n).collect();
    let mut totals = strength.clone();
    let mut moved_any = false;

    loop {
        let mut moved = false;

        for node in 0..n {
            let current = community[node];
            let k = strength[node];
            totals[current] -= k;

            // Weight from this node into each neighboring community, in first-seen order
            let mut links: Vec<(usize, f64)> = Vec::new();
            let mut slot: HashMap<usize, usize> = HashMap::new();
            for &(other, w) in &view.adjacency[node] {
                let c = community[other];
                let idx = *slot.entry(c).or_insert_with(|| {
                    links.push((c, 0.0));
                    links.len() - 1
                });
                links[idx].1 += w;
            }

            let gain = |c: usize, w: f64| w - totals[c] * k / m2;
            let own = slot.get(&current).map_or(0.0, |&idx| links[idx].1);
            let mut best = current;
            let mut best_gain = gain(current, own);

            for &(c, w) in &links {
                let candidate = gain(c, w);
                if candidate > best_gain + MIN_GAIN {
                    best = c;
                    best_gain = candidate;
                }
            }

            totals[best] += k;
            if best != current {
                community[node] = best;
                moved = true;
            }
        }

        if !moved {
            break;
        }
        moved_any = true;
    }

    (community, moved_any)
}

/// Renumber labels to 0..count in order of first appearance
fn renumber(community: &mut [usize]) -> usize {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    for c in community.iter_mut() {
        let next = mapping.len();
        *c = *mapping.entry(*c).or_insert(next);
    }
    mapping.len()
}

/// Collapse each community into one node, internal weight becoming a self-loop
fn aggregate(view: &WeightedView, community: &[usize], count: usize) -> WeightedView {
    let mut loops = vec![0.0; count];
    let mut between: Vec<HashMap<usize, f64>> = vec![HashMap::new(); count];

    for node in 0..view.len() {
        let c = community[node];
        loops[c] += view.loops[node];
        for &(other, w) in &view.adjacency[node] {
            if other <= node {
                continue;
            }
            let d = community[other];
            if c == d {
                loops[c] += w;
            } else {
                *between[c].entry(d).or_default() += w;
                *between[d].entry(c).or_default() += w;
            }
        }
    }

    let adjacency = between
        .into_iter()
        .map(|links| {
            let mut links: Vec<(usize, f64)> = links.into_iter().collect();
            links.sort_by_key(|&(other, _)| other);
            links
        })
        .collect();

    WeightedView { adjacency, loops }
}

/// Louvain community labels for every node of the view
pub(crate) fn louvain(view: &WeightedView) -> Vec<usize> {
    let mut membership: Vec<usize> = (0..view.len()).collect();
    if view.total_strength() <= 0.0 {
        return membership;
    }

    let mut level_view = view.clone();
    let mut level = 0;
    loop {
        let (mut community, moved) = local_moving(&level_view);
        if !moved {
            break;
        }
        let count = renumber(&mut community);
        level += 1;
        log::debug!(
            "Louvain level {}: {} nodes -> {} communities",
            level,
            level_view.len(),
            count
        );

        for label in membership.iter_mut() {
            *label = community[*label];
        }
        level_view = aggregate(&level_view, &community, count);
    }

    membership
}
