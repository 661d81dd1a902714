//! Кластеры биомов — сплошные пятна одного биома внутри материков и океанов.

use tracing::debug;

use crate::cluster::graph::{build_cluster_graph, link_neighbors};
use crate::cluster::{Cluster, ClusterStrategy, clusterize};
use crate::region::{ClusterId, Region, RegionId};
use crate::world::World;

#[derive(Default)]
struct PatchStrategy {
    created: usize,
}

impl ClusterStrategy for PatchStrategy {
    fn is_different(&self, regions: &[Region], region: RegionId, neighbor: RegionId) -> bool {
        regions[region].biome != regions[neighbor].biome
    }

    fn create_cluster(&mut self, regions: &[Region], region: RegionId) -> Cluster {
        let biome = regions[region].biome;
        self.created += 1;
        Cluster::new(
            format!("{} #{}", biome.name(), self.created),
            biome,
            biome.border() > 0.0,
        )
    }

    fn on_assign(&mut self, regions: &mut [Region], region: RegionId, cluster: ClusterId) {
        regions[region].cluster = Some(cluster);
    }

    fn on_boundary(&mut self, regions: &mut [Region], region: RegionId) {
        regions[region].border = true;
    }
}

/// Разбивает мир на пятна окончательных биомов и привязывает их к материкам
pub fn make_clusters(world: &mut World) {
    world.set_status("Meeting with neighbors...");

    let members: Vec<RegionId> = (0..world.regions.len()).collect();
    let mut clusters = clusterize(&mut world.regions, &members, &mut PatchStrategy::default());

    for cluster in &mut clusters {
        let first = cluster.regions[0];
        cluster.mega_cluster = world.regions[first].mega_cluster;
        cluster.has_river = cluster.regions.iter().any(|&r| world.regions[r].has_river);
    }

    let graph = build_cluster_graph(&world.regions, clusters.len(), |r| r.cluster);
    link_neighbors(&mut clusters, &graph);

    debug!("Biome clusters: {}", clusters.len());
    world.clusters = clusters;
}
