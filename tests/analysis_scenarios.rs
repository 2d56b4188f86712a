use std::collections::HashSet;

use graph_insight_analyzer::analysis::{run, AnalysisPayload, AnalysisRequest};
use graph_insight_analyzer::community::{detect_communities, modularity, CommunityMethod};
use graph_insight_analyzer::metrics::compute_metrics;
use graph_insight_analyzer::paths::{neighborhood, shortest_paths, PathResult};
use graph_insight_analyzer::robustness::simulate;
use graph_insight_analyzer::{Config, Edge, Graph};

fn build(edges: &[(&str, &str)], directed: bool) -> Graph {
    let mut graph = Graph::new(directed);
    for &(a, b) in edges {
        graph.add_edge(Edge::new(a, b)).unwrap();
    }
    graph
}

/// Two dense groups of five joined through a single broker
fn two_groups() -> Graph {
    let mut edges = Vec::new();
    let left = ["l1", "l2", "l3", "l4", "l5"];
    let right = ["r1", "r2", "r3", "r4", "r5"];
    for group in [left, right] {
        for i in 0..group.len() {
            for j in i + 1..group.len() {
                edges.push((group[i], group[j]));
            }
        }
    }
    edges.push(("l1", "broker"));
    edges.push(("broker", "r1"));
    build(&edges, false)
}

fn distance(graph: &Graph, from: &str, to: &str) -> f64 {
    match shortest_paths(graph, from, Some(to), false).unwrap() {
        PathResult::Single { length, .. } => length,
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn path_graph_scenario() {
    let graph = build(&[("A", "B"), ("B", "C"), ("C", "D")], false);
    let metrics = compute_metrics(&graph, &Config::default()).unwrap();

    assert_eq!(metrics.density, 0.5);
    assert_eq!(metrics.diameter, Some(3));
    match shortest_paths(&graph, "A", Some("D"), false).unwrap() {
        PathResult::Single { path, .. } => assert_eq!(path.unwrap(), vec!["A", "B", "C", "D"]),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn disconnected_scenario() {
    let graph = build(&[("a", "b"), ("c", "d")], false);
    let metrics = compute_metrics(&graph, &Config::default()).unwrap();

    assert_eq!(metrics.num_connected_components, 2);
    assert!(metrics.average_shortest_path_length.is_none());
    assert!(metrics.diameter.is_none());
    assert!(distance(&graph, "a", "d").is_infinite());
}

#[test]
fn density_stays_in_unit_interval() {
    let graphs = [
        two_groups(),
        build(&[("a", "b"), ("b", "a"), ("a", "a")], true),
        build(&[("a", "b"), ("a", "b"), ("b", "c")], false),
        Graph::undirected(),
    ];
    for graph in &graphs {
        let density = compute_metrics(graph, &Config::default()).unwrap().density;
        assert!((0.0..=1.0).contains(&density), "density {}", density);
    }
}

#[test]
fn top_k_zero_gives_empty_rankings() {
    let graph = two_groups();
    let result = run(
        &graph,
        &AnalysisRequest::Centrality { top_k: Some(0) },
        &Config::default(),
    )
    .unwrap();

    match result.result {
        AnalysisPayload::Centrality(leaders) => {
            assert!(leaders.values().all(|ranking| ranking.is_empty()))
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn broker_leads_betweenness() {
    let graph = two_groups();
    let metrics = compute_metrics(&graph, &Config::default()).unwrap();
    let top = metrics.top_k(graph_insight_analyzer::CentralityMeasure::Betweenness, 3);
    let leaders: HashSet<&str> = top.iter().map(|(id, _)| id.as_str()).collect();

    assert!(leaders.contains("broker"));
    assert!(leaders.contains("l1"));
    assert!(leaders.contains("r1"));
}

#[test]
fn partitions_cover_every_node_once() {
    let mut graph = two_groups();
    graph.ensure_node("hermit");

    for method in [CommunityMethod::Louvain, CommunityMethod::GreedyModularity] {
        let report = detect_communities(&graph, method).unwrap();
        let mut seen = HashSet::new();
        for member in report.communities.iter().flatten() {
            assert!(seen.insert(member.clone()), "{} assigned twice", member);
        }
        assert_eq!(seen.len(), graph.node_count());
        assert!(report.num_communities >= 2);

        let rescored = modularity(&graph, &report.communities).unwrap();
        assert!((rescored - report.modularity).abs() < 1e-9);
    }
}

#[test]
fn undirected_distances_are_symmetric() {
    let graph = two_groups();
    let ids: Vec<String> = graph.node_ids().map(str::to_string).collect();
    for u in &ids {
        assert_eq!(distance(&graph, u, u), 0.0);
        for v in &ids {
            assert_eq!(distance(&graph, u, v), distance(&graph, v, u));
        }
    }
}

#[test]
fn radius_one_neighborhood_is_adjacency() {
    let graph = two_groups();
    for id in graph.node_ids() {
        let stats = neighborhood(&graph, id, 1).unwrap();
        let mut expected: Vec<String> = graph
            .edges()
            .iter()
            .filter_map(|e| {
                if e.source == id {
                    Some(e.target.clone())
                } else if e.target == id {
                    Some(e.source.clone())
                } else {
                    None
                }
            })
            .collect();
        expected.sort();
        expected.dedup();
        assert_eq!(stats.neighbors, expected);
    }
}

#[test]
fn removing_the_broker_disconnects_the_groups() {
    let graph = two_groups();
    let report = simulate(&graph, 3, &Config::default()).unwrap();

    let broker = report
        .trials
        .iter()
        .find(|trial| trial.node_removed == "broker")
        .unwrap();
    assert_eq!(broker.components_before, 1);
    assert_eq!(broker.components_after, Some(2));
    assert_eq!(broker.largest_component_after, Some(5));
    assert_eq!(graph.node_count(), 11);
}

#[test]
fn removing_a_group_member_leaves_one_component() {
    let graph = two_groups();
    let report = simulate(&graph, 11, &Config::default()).unwrap();

    let cut_nodes = ["broker", "l1", "r1"];
    let members: Vec<_> = report
        .trials
        .iter()
        .filter(|trial| !cut_nodes.contains(&trial.node_removed.as_str()))
        .collect();
    assert_eq!(members.len(), 8);
    for trial in members {
        assert_eq!(trial.components_after, Some(1), "{}", trial.node_removed);
        assert_eq!(trial.largest_component_after, Some(10));
    }
}
