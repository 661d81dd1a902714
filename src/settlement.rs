// src/settlement.rs
//! Поселения: шахты, фермы и порты.
//!
//! Каждый материк заселяется в несколько проходов: сначала шахты на богатых
//! минералами местах, затем фермы на плодородных и приятных, затем порты в
//! закрытых бухтах. Рядом с уже основанным поселением новое не ставится.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::debug;

use crate::biome::Biome;
use crate::names;
use crate::region::{ClusterId, RegionId, RoadId, SettlementId};
use crate::world::World;

const MINE_MINERALS: f32 = 1.0;
const AGRO_NICE: f32 = 0.7;
const AGRO_FERTILITY: f32 = 0.7;
/// Сосед порта должен быть глубже этого
const PORT_DEPTH: f32 = 0.01;
/// Радиус заливки моря вокруг порта
const BAY_RADIUS: f64 = 100.0;
/// Бухта — меньше стольких морских регионов в радиусе заливки
const BAY_SIZE: usize = 200;
/// Минимальное расстояние между портами одного прохода
const PORT_SPACING: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SettlementKind {
    Capital,
    Port,
    Mine,
    Agro,
    Trade,
    Lighthouse,
    Cave,
    Fort,
}

impl SettlementKind {
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            SettlementKind::Capital => "Capital",
            SettlementKind::Port => "Port",
            SettlementKind::Mine => "Mine",
            SettlementKind::Agro => "Agro",
            SettlementKind::Trade => "Trade",
            SettlementKind::Lighthouse => "Lighthouse",
            SettlementKind::Cave => "Cave",
            SettlementKind::Fort => "Fort",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Settlement {
    pub name: String,
    pub region: RegionId,
    pub kind: SettlementKind,
    pub is_capital: bool,
    pub population: u32,
    pub wealth: f32,
    pub roads: Vec<RoadId>,
    /// Цены по торговым партнёрам (заполняет внешняя симуляция)
    pub prices: BTreeMap<SettlementId, f32>,
}

impl Settlement {
    #[must_use]
    pub fn new(name: String, region: RegionId, kind: SettlementKind) -> Self {
        Self {
            name,
            region,
            kind,
            is_capital: false,
            population: 1000,
            wealth: 1.0,
            roads: Vec::new(),
            prices: BTreeMap::new(),
        }
    }
}

/// Основывает поселения на всех материках и перемешивает их список
pub fn place_settlements<R: Rng>(world: &mut World, rng: &mut R) {
    world.set_status("Founding cities...");

    let land: Vec<ClusterId> = (0..world.mega_clusters.len())
        .filter(|&mc| world.mega_clusters[mc].is_land)
        .collect();

    for &mc in &land {
        let mut places: Vec<RegionId> = world.mega_clusters[mc]
            .regions
            .iter()
            .copied()
            .filter(|&r| {
                let region = &world.regions[r];
                region.settlement.is_none()
                    && region.minerals > MINE_MINERALS
                    && !matches!(region.biome, Biome::Lake | Biome::Snow | Biome::Ice)
            })
            .collect();
        places.sort_by(|&a, &b| world.regions[b].minerals.total_cmp(&world.regions[a].minerals));
        found_where_free(world, &places, SettlementKind::Mine, rng);
    }

    for &mc in &land {
        let score = |r: RegionId| world.regions[r].nice * world.regions[r].fertility();
        let mut places: Vec<RegionId> = world.mega_clusters[mc]
            .regions
            .iter()
            .copied()
            .filter(|&r| {
                let region = &world.regions[r];
                region.settlement.is_none()
                    && region.nice > AGRO_NICE
                    && region.fertility() > AGRO_FERTILITY
                    && region.biome != Biome::Lake
            })
            .collect();
        places.sort_by(|&a, &b| score(b).total_cmp(&score(a)));
        found_where_free(world, &places, SettlementKind::Agro, rng);
    }

    for &mc in &land {
        if world.mega_clusters[mc].settlements.is_empty() {
            continue;
        }
        let places = port_places(world, mc);
        for id in found_where_free(world, &places, SettlementKind::Port, rng) {
            debug!("Port {} on {}", world.settlements[id].name, world.mega_clusters[mc].name);
        }
    }

    for &mc in &land {
        let cluster = &world.mega_clusters[mc];
        if cluster.has_port || cluster.settlements.is_empty() {
            continue;
        }
        let coast: Vec<RegionId> = cluster
            .regions
            .iter()
            .copied()
            .filter(|&r| world.regions[r].settlement.is_none() && world.is_coast(r))
            .collect();
        if let Some(&r) = coast.choose(rng) {
            found(world, r, SettlementKind::Port, rng);
        }
    }

    shuffle_settlements(world, rng);
    debug!("Settlements: {}", world.settlements.len());
}

/// Кандидаты в порты: у берега глубокая вода, бухта небольшая, и до уже
/// отобранных кандидатов не меньше [`PORT_SPACING`].
fn port_places(world: &World, mc: ClusterId) -> Vec<RegionId> {
    let mut places: Vec<RegionId> = Vec::new();

    for &r in &world.mega_clusters[mc].regions {
        let region = &world.regions[r];
        let deep = region
            .neighbors
            .iter()
            .any(|&n| world.regions[n].height() < PORT_DEPTH);
        if !deep || region.settlement.is_some() {
            continue;
        }
        if bay_size(world, r) >= BAY_SIZE {
            continue;
        }
        let crowded = places
            .iter()
            .any(|&p| world.regions[p].site.distance(region.site) < PORT_SPACING);
        if !crowded {
            places.push(r);
        }
    }
    places
}

/// Сколько морских регионов достижимо от `base`, если расширяться только
/// из регионов ближе [`BAY_RADIUS`] к нему
#[must_use]
pub fn bay_size(world: &World, base: RegionId) -> usize {
    let origin = world.regions[base].site;
    let mut seen = vec![false; world.regions.len()];
    let mut stack = vec![base];
    let mut count = 0;

    while let Some(r) = stack.pop() {
        for &n in &world.regions[r].neighbors {
            if seen[n] || world.is_land(n) {
                continue;
            }
            seen[n] = true;
            count += 1;
            if origin.distance(world.regions[n].site) < BAY_RADIUS {
                stack.push(n);
            }
        }
    }
    count
}

/// Основывает поселения по порядку `places`, пропуская регионы с заселёнными соседями
fn found_where_free<R: Rng>(
    world: &mut World,
    places: &[RegionId],
    kind: SettlementKind,
    rng: &mut R,
) -> Vec<SettlementId> {
    let mut founded = Vec::new();
    for &r in places {
        let region = &world.regions[r];
        let crowded = region.settlement.is_some()
            || region
                .neighbors
                .iter()
                .any(|&n| world.regions[n].settlement.is_some());
        if !crowded {
            founded.push(found(world, r, kind, rng));
        }
    }
    founded
}

fn found<R: Rng>(world: &mut World, r: RegionId, kind: SettlementKind, rng: &mut R) -> SettlementId {
    let id = world.settlements.len();
    world
        .settlements
        .push(Settlement::new(names::city_name(rng), r, kind));
    world.regions[r].settlement = Some(id);

    if let Some(mc) = world.regions[r].mega_cluster {
        let cluster = &mut world.mega_clusters[mc];
        cluster.settlements.push(id);
        cluster.has_port |= kind == SettlementKind::Port;
    }
    if let Some(c) = world.regions[r].cluster {
        if let Some(cluster) = world.clusters.get_mut(c) {
            cluster.settlements.push(id);
        }
    }
    id
}

/// Перемешивает поселения и переписывает все ссылки на них
fn shuffle_settlements<R: Rng>(world: &mut World, rng: &mut R) {
    let mut order: Vec<SettlementId> = (0..world.settlements.len()).collect();
    order.shuffle(rng);

    let mut new_index = vec![0; order.len()];
    for (new, &old) in order.iter().enumerate() {
        new_index[old] = new;
    }

    let mut old: Vec<Option<Settlement>> = std::mem::take(&mut world.settlements)
        .into_iter()
        .map(Some)
        .collect();
    world.settlements = order.iter().filter_map(|&o| old[o].take()).collect();

    for region in &mut world.regions {
        if let Some(s) = region.settlement.as_mut() {
            *s = new_index[*s];
        }
    }
    for cluster in world.mega_clusters.iter_mut().chain(world.clusters.iter_mut()) {
        for s in &mut cluster.settlements {
            *s = new_index[*s];
        }
    }
}
