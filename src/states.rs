// src/states.rs
//! Государства и их территории.
//!
//! Каждое государство растёт из своей точки: регион суши принадлежит государству
//! с ближайшей точкой (то есть ячейке Вороного этих точек). Затем сплошные куски
//! территорий собираются в кластеры, мелкие поглощаются соседями, и размечаются
//! сухопутные и морские границы.

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::cluster::graph::{build_cluster_graph, link_neighbors};
use crate::cluster::merge::merge_small_territories;
use crate::cluster::{Cluster, ClusterStrategy, clusterize};
use crate::geometry::Point;
use crate::names;
use crate::region::{ClusterId, Region, RegionId, SettlementId, StateId};
use crate::subdivision::random_sites;
use crate::world::World;

#[derive(Debug, Clone, Serialize)]
pub struct State {
    pub name: String,
    /// Точка, из которой выросло государство
    pub center: Point,
    pub capital: Option<SettlementId>,
}

impl State {
    #[must_use]
    pub fn new(name: String, center: Point) -> Self {
        Self {
            name,
            center,
            capital: None,
        }
    }
}

struct TerritoryStrategy {
    names: Vec<String>,
}

impl ClusterStrategy for TerritoryStrategy {
    fn is_different(&self, regions: &[Region], region: RegionId, neighbor: RegionId) -> bool {
        regions[region].state != regions[neighbor].state
    }

    fn create_cluster(&mut self, regions: &[Region], region: RegionId) -> Cluster {
        let origin = &regions[region];
        let name = origin
            .state
            .and_then(|s| self.names.get(s).cloned())
            .unwrap_or_default();
        let mut cluster = Cluster::new(name, origin.biome, true);
        cluster.mega_cluster = origin.mega_cluster;
        cluster.states.extend(origin.state);
        cluster
    }

    fn on_assign(&mut self, regions: &mut [Region], region: RegionId, cluster: ClusterId) {
        regions[region].state_cluster = Some(cluster);
    }
}

/// Создаёт `count` государств, делит между ними сушу и выбирает столицы
pub fn make_states<R: Rng>(world: &mut World, count: usize, rng: &mut R) {
    world.set_status("Making states...");

    let centers = random_sites(rng, world.width, world.height, count);
    world.states = centers
        .into_iter()
        .map(|center| State::new(names::state_name(rng), center))
        .collect();

    assign_states(world);
    build_territories(world);
    mark_borders(world);
    choose_capitals(world);
}

/// Государство с ближайшей к `point` точкой (при равенстве — первое)
#[must_use]
pub fn nearest_state(states: &[State], point: Point) -> Option<StateId> {
    states
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| point.distance(a.center).total_cmp(&point.distance(b.center)))
        .map(|(id, _)| id)
}

/// Раздаёт регионы суши государствам; морские регионы остаются ничьими
pub fn assign_states(world: &mut World) {
    for r in 0..world.regions.len() {
        let state = if world.is_land(r) {
            nearest_state(&world.states, world.regions[r].site)
        } else {
            None
        };
        world.regions[r].state = state;
        world.regions[r].state_cluster = None;
    }
}

/// Собирает сплошные территории, поглощает мелкие и отмечает государства
/// на материках и кластерах, которых они касаются
pub fn build_territories(world: &mut World) {
    let members: Vec<RegionId> = (0..world.regions.len())
        .filter(|&r| world.is_land(r))
        .collect();
    let mut strategy = TerritoryStrategy {
        names: world.states.iter().map(|s| s.name.clone()).collect(),
    };
    let mut territories = clusterize(&mut world.regions, &members, &mut strategy);

    territories.retain(|t| !t.regions.is_empty() && !t.states.is_empty());
    reindex(&mut world.regions, &territories);

    let mut graph = build_cluster_graph(&world.regions, territories.len(), |r| r.state_cluster);
    merge_small_territories(&mut world.regions, &mut territories, &mut graph);

    territories.retain(|t| !t.regions.is_empty() && !t.states.is_empty());
    reindex(&mut world.regions, &territories);
    let graph = build_cluster_graph(&world.regions, territories.len(), |r| r.state_cluster);
    link_neighbors(&mut territories, &graph);
    debug!("Territories: {}", territories.len());
    world.state_clusters = territories;

    for cluster in world.mega_clusters.iter_mut().chain(world.clusters.iter_mut()) {
        cluster.states.clear();
    }
    for region in &world.regions {
        let Some(state) = region.state else {
            continue;
        };
        if let Some(mc) = region.mega_cluster {
            world.mega_clusters[mc].add_state(state);
        }
        if let Some(cluster) = region.cluster.and_then(|c| world.clusters.get_mut(c)) {
            cluster.add_state(state);
        }
    }
}

fn reindex(regions: &mut [Region], territories: &[Cluster]) {
    for region in regions.iter_mut() {
        region.state_cluster = None;
    }
    for (id, territory) in territories.iter().enumerate() {
        for &r in &territory.regions {
            regions[r].state_cluster = Some(id);
        }
    }
}

/// Граница государства: у региона суши есть сосед другого государства.
/// Морская граница: все такие соседи — море.
pub fn mark_borders(world: &mut World) {
    for r in 0..world.regions.len() {
        if !world.is_land(r) {
            continue;
        }
        let state = world.regions[r].state;
        let mut foreign = 0;
        let mut sea = 0;
        for &n in &world.regions[r].neighbors {
            if world.regions[n].state != state {
                foreign += 1;
                if !world.is_land(n) {
                    sea += 1;
                }
            }
        }

        let region = &mut world.regions[r];
        region.state_border = foreign > 0;
        region.sea_border = foreign > 0 && sea == foreign;
    }
}

/// Столица государства — поселение в самом «приятном» из его регионов
pub fn choose_capitals(world: &mut World) {
    for state in 0..world.states.len() {
        let capital = world
            .settlements
            .iter()
            .enumerate()
            .filter(|(_, s)| world.regions[s.region].state == Some(state))
            .fold(None, |best: Option<(SettlementId, f32)>, (id, s)| {
                let nice = world.regions[s.region].nice;
                match best {
                    Some((_, b)) if b >= nice => best,
                    _ => Some((id, nice)),
                }
            })
            .map(|(id, _)| id);

        world.states[state].capital = capital;
        if let Some(id) = capital {
            world.settlements[id].is_capital = true;
            debug!(
                "Capital of {}: {}",
                world.states[state].name, world.settlements[id].name
            );
        }
    }
}
