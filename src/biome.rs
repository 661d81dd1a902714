//! Биомы и их назначение регионам.
//!
//! Биом выбирается по высотному поясу, внутри пояса — по влажности
//! (чем влажнее, тем «богаче» биом), а жаркие сухие регионы получают
//! засушливый вариант (луг → трава → прерия → пустыня).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::heightmap::ScalarField;
use crate::region::{Region, RegionId};
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Abyss,
    Deep,
    Shallow,
    Shore,
    Sand,
    Grass,
    Forest,
    RainForest,
    Rock,
    Snow,
    Ice,
    Prairie,
    Meadow,
    Desert,
    Lake,
    /// Предварительная метка суши до классификации
    Land,
    /// Предварительная метка моря до классификации
    Sea,
}

/// Высотные пояса в порядке возрастания нижней границы
pub const HEIGHT_BANDS: [Biome; 10] = [
    Biome::Abyss,
    Biome::Deep,
    Biome::Shallow,
    Biome::Shore,
    Biome::Sand,
    Biome::Grass,
    Biome::Forest,
    Biome::Rock,
    Biome::Snow,
    Biome::Ice,
];

/// Биомы каждого пояса: от самого влажного к самому сухому
const BIOMES_BY_HEIGHT: [&[Biome]; 10] = [
    &[Biome::Abyss],
    &[Biome::Deep],
    &[Biome::Shallow],
    &[Biome::Shore],
    &[Biome::Sand],
    &[Biome::Meadow, Biome::Grass, Biome::Prairie, Biome::Sand],
    &[
        Biome::RainForest,
        Biome::Forest,
        Biome::Grass,
        Biome::Prairie,
        Biome::Sand,
    ],
    &[Biome::Rock],
    &[Biome::Snow, Biome::Rock],
    &[Biome::Ice],
];

impl Biome {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Biome::Abyss => "Abyss",
            Biome::Deep => "Deep",
            Biome::Shallow => "Shallow",
            Biome::Shore => "Shore",
            Biome::Sand => "Sand",
            Biome::Grass => "Grass",
            Biome::Forest => "Forest",
            Biome::RainForest => "Rain forest",
            Biome::Rock => "Rock",
            Biome::Snow => "Snow",
            Biome::Ice => "Ice",
            Biome::Prairie => "Prairie",
            Biome::Meadow => "Meadow",
            Biome::Desert => "Desert",
            Biome::Lake => "Lake",
            Biome::Land => "Land",
            Biome::Sea => "Sea",
        }
    }

    /// Нижняя граница высотного пояса. У биомов вне поясов — заведомо недостижимая.
    #[must_use]
    pub fn border(self) -> f32 {
        match self {
            Biome::Abyss => -2.0,
            Biome::Deep | Biome::Sea => -1.0,
            Biome::Shallow => -0.25,
            Biome::Shore => 0.0,
            Biome::Sand => 0.0625,
            Biome::Grass => 0.125,
            Biome::Forest | Biome::RainForest => 0.375,
            Biome::Land => 0.5,
            Biome::Rock => 0.75,
            Biome::Snow => 1.0,
            Biome::Ice => 1.2,
            Biome::Prairie | Biome::Meadow | Biome::Desert | Biome::Lake => 999.0,
        }
    }

    #[must_use]
    pub fn fertility(self) -> f32 {
        match self {
            Biome::Grass => 0.8,
            Biome::Forest | Biome::RainForest | Biome::Prairie => 0.6,
            Biome::Meadow => 1.0,
            _ => 0.0,
        }
    }

    /// Засушливый вариант биома для жарких и сухих регионов
    #[must_use]
    pub fn hot_dry_variant(self) -> Option<Biome> {
        match self {
            Biome::Sand | Biome::Prairie => Some(Biome::Desert),
            Biome::Grass => Some(Biome::Prairie),
            Biome::Meadow => Some(Biome::Grass),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_forest(self) -> bool {
        matches!(self, Biome::Forest | Biome::RainForest)
    }
}

/// Выбирает биом по высоте, влажности и температуре.
///
/// Берётся самый высокий пояс, нижняя граница которого ниже `height`; внутри пояса
/// индекс равен `(n-1) - humidity*(n-1)` с отбрасыванием дробной части. Отрицательный
/// индекс (влажность заметно выше 1) пропускает пояс, слишком большой
/// (отрицательная влажность) прижимается к последнему элементу.
#[must_use]
pub fn classify(height: f32, humidity: f32, temperature: f32, base_temperature: f32) -> Biome {
    let mut biome = HEIGHT_BANDS[0];

    for (band, candidates) in HEIGHT_BANDS.iter().zip(BIOMES_BY_HEIGHT) {
        if height <= band.border() {
            continue;
        }

        let last = (candidates.len() - 1) as f32;
        let index = (last - humidity * last) as i32;
        if index < 0 {
            continue;
        }

        let mut candidate = candidates[(index as usize).min(candidates.len() - 1)];
        if let Some(variant) = candidate.hot_dry_variant() {
            if temperature > base_temperature * 4.0 / 5.0 && humidity < 0.2 {
                candidate = variant;
            }
        }
        biome = candidate;
    }
    biome
}

/// Оценка пригодности для жизни: три «колокола» с пиками при влажности 0.8,
/// высоте 0.7 и температуре 2/3 базовой, каждый делится на 3 и не уходит ниже нуля.
#[must_use]
pub fn niceness(height: f32, humidity: f32, temperature: f32, base_temperature: f32) -> f32 {
    let bell = |value: f32, peak: f32| {
        let v = 1.0 - (value - peak).abs();
        if v <= 0.0 { 0.0 } else { v / 3.0 }
    };

    bell(humidity, 0.8) + bell(height, 0.7) + bell(temperature, base_temperature * 2.0 / 3.0)
}

/// Назначает минералы, окончательные биомы и «приятность» всем регионам,
/// затем собирает ресурсные и «хорошие» точки материков.
pub fn assign_biomes<F: ScalarField>(world: &mut World, minerals: &F) {
    world.set_status("Making forests and deserts...");

    let base = world.climate.base_temperature;
    for region in &mut world.regions {
        if region.biome == Biome::Lake {
            region.minerals = 0.0;
            continue;
        }
        region.minerals = minerals.sample(region.site).max(0.0);
        region.biome = classify(region.height(), region.humidity, region.temperature, base);
        region.nice = niceness(region.height(), region.humidity, region.temperature, base);
    }

    for mc in 0..world.mega_clusters.len() {
        if !world.mega_clusters[mc].is_land {
            continue;
        }

        let mut resource_points = Vec::new();
        let mut good_points = Vec::new();
        for &r in &world.mega_clusters[mc].regions {
            let region = &world.regions[r];
            if region.minerals != 0.0
                && !exceeded_by_neighbor(&world.regions, r, |n| n.minerals > region.minerals)
            {
                resource_points.push(r);
            }
            if region.biome != Biome::Lake
                && !exceeded_by_neighbor(&world.regions, r, |n| n.nice >= region.nice)
            {
                good_points.push(r);
            }
        }

        let cluster = &mut world.mega_clusters[mc];
        debug!(
            "{}: resource points {}, good points {}",
            cluster.name,
            resource_points.len(),
            good_points.len()
        );
        cluster.resource_points = resource_points;
        cluster.good_points = good_points;
    }
}

fn exceeded_by_neighbor(regions: &[Region], r: RegionId, beats: impl Fn(&Region) -> bool) -> bool {
    regions[r].neighbors.iter().any(|&n| beats(&regions[n]))
}
