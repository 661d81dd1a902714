// src/cluster/merge.rs
//! Поглощение мелких территорий государств соседними крупными.

use petgraph::graph::{NodeIndex, UnGraph};
use tracing::{debug, info};

use crate::cluster::Cluster;
use crate::region::{ClusterId, Region};

/// Территории меньше этого размера проверяются на поглощение
const SMALL_TERRITORY: usize = 200;
/// Совсем мелкие территории поглощаются любым не меньшим соседом
const TINY_TERRITORY: usize = 50;
/// Во сколько раз сосед должен быть больше, чтобы поглотить территорию
const DOMINANCE: usize = 4;

/// Сливает мелкие территории в самого крупного соседа.
///
/// Территория размера `s < 200` переходит к крупнейшей соседней территории размера `b`,
/// если `b > 4s` или `s < 50 && b >= s`. Регионы получают государство поглотителя.
/// Пустые территории остаются в списке, их убирает вызывающий. Возвращает число слияний.
pub fn merge_small_territories(
    regions: &mut [Region],
    territories: &mut [Cluster],
    graph: &mut UnGraph<ClusterId, ()>,
) -> usize {
    let mut merged = 0;

    for small in 0..territories.len() {
        let size = territories[small].regions.len();
        if size == 0 || size >= SMALL_TERRITORY {
            continue;
        }

        let dominant = graph
            .neighbors(NodeIndex::new(small))
            .map(|n| graph[n])
            .filter(|&n| n != small && !territories[n].regions.is_empty())
            .max_by_key(|&n| (territories[n].regions.len(), std::cmp::Reverse(n)));
        let Some(large) = dominant else {
            continue;
        };

        let large_size = territories[large].regions.len();
        let absorb =
            large_size > DOMINANCE * size || (size < TINY_TERRITORY && large_size >= size);
        if !absorb {
            continue;
        }

        let state = territories[large].states.first().copied();
        debug!(
            "State correction: {} ({} regions) -> {} ({} regions)",
            territories[small].name, size, territories[large].name, large_size
        );
        let moved = std::mem::take(&mut territories[small].regions);
        for &r in &moved {
            regions[r].state = state;
            regions[r].state_cluster = Some(large);
        }
        territories[large].regions.extend(moved);

        // соседи поглощённой территории становятся соседями поглотителя
        let inherited: Vec<NodeIndex> = graph.neighbors(NodeIndex::new(small)).collect();
        for n in inherited {
            if n.index() != large {
                graph.update_edge(NodeIndex::new(large), n, ());
            }
        }
        merged += 1;
    }

    if merged > 0 {
        info!("State corrections: {merged}");
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::Biome;
    use crate::cluster::graph::build_cluster_graph;
    use crate::geometry::Point;
    use crate::region::build_regions;
    use crate::subdivision::CellGraph;

    /// Полоса регионов, разбитая на территории заданных длин
    fn strip(lengths: &[usize]) -> (Vec<Region>, Vec<Cluster>) {
        let total: usize = lengths.iter().sum();
        let mut regions = build_regions(&CellGraph::grid(total, 1, 1.0), &|_: Point| 1.0);
        let mut territories = Vec::new();
        let mut next = 0;
        for (id, &len) in lengths.iter().enumerate() {
            let mut cluster = Cluster::new(format!("t{id}"), Biome::Land, true);
            cluster.states.push(id);
            for r in next..next + len {
                regions[r].state = Some(id);
                regions[r].state_cluster = Some(id);
                cluster.regions.push(r);
            }
            next += len;
            territories.push(cluster);
        }
        (regions, territories)
    }

    #[test]
    fn test_dominant_neighbor_absorbs() {
        let (mut regions, mut territories) = strip(&[100, 20]);
        let mut graph = build_cluster_graph(&regions, 2, |r| r.state_cluster);

        let merged = merge_small_territories(&mut regions, &mut territories, &mut graph);
        assert_eq!(merged, 1);
        assert_eq!(territories[0].regions.len(), 120);
        assert!(territories[1].regions.is_empty());
        assert!(regions.iter().all(|r| r.state == Some(0)));
        assert!(regions.iter().all(|r| r.state_cluster == Some(0)));
    }

    #[test]
    fn test_comparable_territories_stay() {
        let (mut regions, mut territories) = strip(&[120, 100]);
        let mut graph = build_cluster_graph(&regions, 2, |r| r.state_cluster);

        assert_eq!(
            merge_small_territories(&mut regions, &mut territories, &mut graph),
            0
        );
        assert_eq!(regions[150].state, Some(1));
    }

    #[test]
    fn test_tiny_territory_joins_equal_neighbor() {
        let (mut regions, mut territories) = strip(&[10, 10]);
        let mut graph = build_cluster_graph(&regions, 2, |r| r.state_cluster);

        assert_eq!(
            merge_small_territories(&mut regions, &mut territories, &mut graph),
            1
        );
        assert_eq!(territories[1].regions.len(), 20);
        assert!(regions.iter().all(|r| r.state == Some(1)));
    }

    #[test]
    fn test_absorber_inherits_neighbors() {
        // 300 | 10 | 40: после поглощения средней территории крайняя правая
        // граничит с большой и тоже поглощается
        let (mut regions, mut territories) = strip(&[300, 10, 40]);
        let mut graph = build_cluster_graph(&regions, 3, |r| r.state_cluster);

        let merged = merge_small_territories(&mut regions, &mut territories, &mut graph);
        assert_eq!(merged, 2);
        assert_eq!(territories[0].regions.len(), 350);
    }
}
