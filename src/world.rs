// src/world.rs
//! Мир целиком и конвейер его генерации.
//!
//! [`World`] — арена: регионы, кластеры трёх видов, реки, государства, поселения
//! и дороги лежат в плоских векторах и ссылаются друг на друга индексами.
//! Проходы генерации выполняются строго по порядку в [`generate_world`].

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

use crate::biome::{Biome, assign_biomes};
use crate::climate::{Wind, calc_humidity, calc_temperature};
use crate::cluster::Cluster;
use crate::cluster::mega::make_mega_clusters;
use crate::cluster::patch::make_clusters;
use crate::config::{ClimateSettings, WorldGenerationParams};
use crate::error::MapgenResult;
use crate::geometry::Point;
use crate::heightmap::NoiseField;
use crate::region::{Region, RegionId, RoadId, SEA_LEVEL, SettlementId, build_regions};
use crate::rivers::{River, make_rivers, simplify_rivers};
use crate::roads::{Road, make_roads};
use crate::settlement::{Settlement, place_settlements};
use crate::states::{State, make_states};
use crate::subdivision::{build_diagram, random_sites};

#[derive(Debug, Clone, Serialize)]
pub struct World {
    pub width: f64,
    pub height: f64,
    pub regions: Vec<Region>,
    /// Материки и океаны
    pub mega_clusters: Vec<Cluster>,
    /// Пятна одного биома
    pub clusters: Vec<Cluster>,
    /// Территории государств
    pub state_clusters: Vec<Cluster>,
    pub states: Vec<State>,
    pub rivers: Vec<River>,
    pub settlements: Vec<Settlement>,
    pub roads: Vec<Road>,
    /// Дорога по паре поселений (меньший индекс первым)
    #[serde(skip)]
    pub road_map: BTreeMap<(SettlementId, SettlementId), RoadId>,
    pub wind: Wind,
    pub climate: ClimateSettings,
    /// Что сейчас происходит (только для отображения)
    pub status: String,
}

impl World {
    #[must_use]
    pub fn new(width: f64, height: f64, regions: Vec<Region>, climate: ClimateSettings) -> Self {
        Self {
            width,
            height,
            regions,
            mega_clusters: Vec::new(),
            clusters: Vec::new(),
            state_clusters: Vec::new(),
            states: Vec::new(),
            rivers: Vec::new(),
            settlements: Vec::new(),
            roads: Vec::new(),
            road_map: BTreeMap::new(),
            wind: Wind::default(),
            climate,
            status: String::new(),
        }
    }

    pub fn set_status(&mut self, status: &str) {
        status.clone_into(&mut self.status);
        info!("{status}");
    }

    /// Регион на суше: по материку, а до его появления — по уровню моря
    #[must_use]
    pub fn is_land(&self, r: RegionId) -> bool {
        let region = &self.regions[r];
        match region.mega_cluster {
            Some(mc) => self.mega_clusters[mc].is_land,
            None => region.height() >= SEA_LEVEL,
        }
    }

    /// Есть ли у региона морской сосед
    #[must_use]
    pub fn is_coast(&self, r: RegionId) -> bool {
        self.regions[r].neighbors.iter().any(|&n| !self.is_land(n))
    }

    /// Есть ли у региона сосед-озеро
    #[must_use]
    pub fn is_lake_coast(&self, r: RegionId) -> bool {
        self.regions[r]
            .neighbors
            .iter()
            .any(|&n| self.regions[n].biome == Biome::Lake)
    }

    /// Регион, содержащий точку
    #[must_use]
    pub fn region_at(&self, point: Point) -> Option<RegionId> {
        self.regions.iter().position(|r| r.contains(point))
    }
}

/// Полный прогон генерации.
///
/// # Ошибки
/// Параметры не проходят проверку или разбиение так и не избавилось
/// от вырожденных ячеек.
pub fn generate_world(params: &WorldGenerationParams) -> MapgenResult<World> {
    params.validate()?;
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let width = f64::from(params.width);
    let height = f64::from(params.height);

    info!("Making heights...");
    let heights = NoiseField::heights(params);

    info!("Making diagram ({} points)...", params.point_count);
    let sites = random_sites(&mut rng, width, height, params.point_count);
    let graph = build_diagram(
        &sites,
        width,
        height,
        params.relax,
        params.max_relax_attempts,
    )?;

    let regions = build_regions(&graph, &heights);
    let mut world = World::new(width, height, regions, params.climate.clone());
    world.set_status("Making regions...");

    make_mega_clusters(&mut world, &mut rng);

    make_rivers(&mut world, &mut rng);
    if params.simple_rivers {
        simplify_rivers(&mut world);
    }

    world.wind = Wind::random(&mut rng);
    calc_humidity(&mut world);
    calc_temperature(&mut world);

    assign_biomes(&mut world, &NoiseField::minerals(params));
    make_clusters(&mut world);

    place_settlements(&mut world, &mut rng);
    make_states(&mut world, params.state_count, &mut rng);

    if params.roads {
        make_roads(&mut world);
    }

    world.set_status("");
    info!(
        "World ready: {} regions, {} land masses and seas, {} settlements, {} roads",
        world.regions.len(),
        world.mega_clusters.len(),
        world.settlements.len(),
        world.roads.len()
    );
    Ok(world)
}
