//! Граф смежности кластеров одного вида.
//!
//! Узел `i` графа соответствует кластеру с индексом `i`.

use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashSet;

use crate::cluster::Cluster;
use crate::region::{ClusterId, Region};

/// Строит граф смежности: кластеры соседствуют, если соседствует хотя бы пара их регионов.
/// `owner` выбирает вид кластера (биом, государство), регионы без кластера пропускаются.
pub fn build_cluster_graph(
    regions: &[Region],
    cluster_count: usize,
    owner: impl Fn(&Region) -> Option<ClusterId>,
) -> UnGraph<ClusterId, ()> {
    let mut graph = UnGraph::with_capacity(cluster_count, cluster_count * 3);
    for id in 0..cluster_count {
        graph.add_node(id);
    }

    let mut edges = HashSet::new();
    for region in regions {
        let Some(a) = owner(region) else {
            continue;
        };
        for &n in &region.neighbors {
            let Some(b) = owner(&regions[n]) else {
                continue;
            };
            if a == b {
                continue;
            }
            let key = (a.min(b), a.max(b));
            if edges.insert(key) {
                graph.add_edge(NodeIndex::new(key.0), NodeIndex::new(key.1), ());
            }
        }
    }
    graph
}

/// Заполняет `Cluster::neighbors` по графу (по возрастанию индекса)
pub fn link_neighbors(clusters: &mut [Cluster], graph: &UnGraph<ClusterId, ()>) {
    for (id, cluster) in clusters.iter_mut().enumerate() {
        let mut neighbors: Vec<ClusterId> = graph
            .neighbors(NodeIndex::new(id))
            .map(|n| graph[n])
            .collect();
        neighbors.sort_unstable();
        cluster.neighbors = neighbors;
    }
}
