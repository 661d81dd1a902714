// src/cluster/mega.rs
//! Материки и океаны — самые крупные кластеры.

use rand::Rng;
use tracing::debug;

use crate::biome::Biome;
use crate::cluster::{Cluster, ClusterStrategy, clusterize};
use crate::geometry::{Point, same_vertex};
use crate::names;
use crate::region::{ClusterId, Region, RegionId};
use crate::world::World;

struct MegaStrategy<'a, R: Rng> {
    rng: &'a mut R,
}

impl<R: Rng> ClusterStrategy for MegaStrategy<'_, R> {
    fn is_different(&self, regions: &[Region], region: RegionId, neighbor: RegionId) -> bool {
        regions[region].biome != regions[neighbor].biome
    }

    fn create_cluster(&mut self, regions: &[Region], region: RegionId) -> Cluster {
        let biome = regions[region].biome;
        let is_land = biome == Biome::Land;
        let name = if is_land {
            names::land_name(self.rng)
        } else {
            names::sea_name(self.rng)
        };
        Cluster::new(name, biome, is_land)
    }

    fn on_assign(&mut self, regions: &mut [Region], region: RegionId, cluster: ClusterId) {
        regions[region].mega_cluster = Some(cluster);
        regions[region].cluster = Some(cluster);
    }

    fn on_boundary(&mut self, regions: &mut [Region], region: RegionId) {
        regions[region].border = true;
    }
}

/// Группирует все регионы в материки (суша) и океаны (море).
/// До прохода по биомам кластер региона совпадает с его материком.
pub fn make_mega_clusters<R: Rng>(world: &mut World, rng: &mut R) {
    world.set_status("Finding far lands...");

    let members: Vec<RegionId> = (0..world.regions.len()).collect();
    let mut strategy = MegaStrategy { rng };
    let mut clusters = clusterize(&mut world.regions, &members, &mut strategy);

    for (id, cluster) in clusters.iter_mut().enumerate() {
        cluster.mega_cluster = Some(id);
        cluster.border = border_points(&world.regions, &cluster.regions);
        debug!(
            "{} ({}): {} regions, {} border points",
            cluster.name,
            if cluster.is_land { "land" } else { "sea" },
            cluster.regions.len(),
            cluster.border.len()
        );
    }
    world.mega_clusters = clusters;
}

/// Вершины, общие у пограничных регионов и их соседей другого биома
fn border_points(regions: &[Region], members: &[RegionId]) -> Vec<Point> {
    let mut border: Vec<Point> = Vec::new();

    for &r in members {
        let region = &regions[r];
        if !region.border {
            continue;
        }
        for &n in &region.neighbors {
            let neighbor = &regions[n];
            if neighbor.biome == region.biome {
                continue;
            }
            for &v in &region.vertices {
                let shared = neighbor.vertices.iter().any(|&nv| same_vertex(v, nv));
                if shared && !border.iter().any(|&b| same_vertex(b, v)) {
                    border.push(v);
                }
            }
        }
    }
    border
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tests::grid_world;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_island_in_ocean() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // 4×4, суша — центральные 2×2
        let mut world = grid_world(4, 4, |x, y| {
            if (1..=2).contains(&x) && (1..=2).contains(&y) {
                0.5
            } else {
                -0.5
            }
        });
        make_mega_clusters(&mut world, &mut rng);

        assert_eq!(world.mega_clusters.len(), 2);
        let ocean = &world.mega_clusters[0];
        let island = &world.mega_clusters[1];
        assert!(!ocean.is_land);
        assert_eq!(ocean.regions.len(), 12);
        assert!(island.is_land);
        assert_eq!(island.regions.len(), 4);
        assert_eq!(island.mega_cluster, Some(1));

        for (i, region) in world.regions.iter().enumerate() {
            let mc = region.mega_cluster.unwrap();
            assert!(world.mega_clusters[mc].regions.contains(&i));
            assert_eq!(region.cluster, region.mega_cluster);
        }

        // береговая линия острова — квадрат 20×20 по узлам сетки: 8 вершин
        assert_eq!(island.border.len(), 8);
        assert!(island.border.iter().all(|p| {
            (10.0..=30.0).contains(&p.x) && (10.0..=30.0).contains(&p.y)
        }));
        assert!(world.regions[5].border);
        assert!(!world.regions[0].border);
    }

    #[test]
    fn test_two_islands_are_separate_land_masses() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut world = grid_world(5, 1, |x, _| if x % 2 == 0 { 0.5 } else { -0.5 });
        make_mega_clusters(&mut world, &mut rng);

        let land = world.mega_clusters.iter().filter(|c| c.is_land).count();
        let sea = world.mega_clusters.len() - land;
        assert_eq!(land, 3);
        assert_eq!(sea, 2);
        assert_eq!(world.status, "Finding far lands...");
    }
}
