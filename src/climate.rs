//! Климат: ветер, влажность и температура регионов.
//!
//! Влажность растекается от морей, озёр и рек к соседям (прямой и обратный
//! проход), затем ветер подмешивает значение «наветренного» соседа, и в конце
//! каждое значение заменяется средним по соседям. Значения не обрезаются до [0, 1].

use rand::Rng;
use serde::Serialize;

use crate::biome::Biome;
use crate::region::{Region, RegionId};
use crate::world::World;

/// Насыщенный влагой регион дальше не увлажняется
const SATURATED: f32 = 0.9;
/// Прибавка за соседа с рекой или озером
const WATER_NEIGHBOR_BONUS: f32 = 0.05;
/// Влага перетекает только с соседей, поднятых не выше этого
const MAX_MOIST_CLIMB: f32 = 0.04;
const RIVER_HUMIDITY: f32 = 0.2;
const LAKE_WARMTH: f32 = 2.0;
const LAKE_FERTILITY: f32 = 0.2;
/// Допустимый подъём к соседу при ветре силы 1
const WIND_CLIMB: f32 = 0.07;

/// Преобладающий ветер мира
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Wind {
    /// Направление в градусах, [0, 270)
    pub angle: f32,
    /// Сила, [0, 1)
    pub force: f32,
}

impl Wind {
    #[must_use]
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let force = rng.gen_range(0.0..1.0);
        let angle = rng.gen_range(0.0..270.0);
        Self { angle, force }
    }
}

/// Наибольшее отклонение пеленга соседа от направления ветра, в градусах
#[must_use]
pub fn max_bearing_deviation(force: f32) -> f32 {
    15.0 + 45.0 * force
}

/// Разность двух направлений в градусах, [0, 180]
fn angle_between(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Сосед, лежащий ближе всего к направлению `angle`.
///
/// Если и регион, и сосед на суше, соседи выше региона более чем на `0.07 * force`
/// не рассматриваются. При равных отклонениях выигрывает первый по списку соседей.
/// `None`, если лучший сосед отклоняется больше чем на [`max_bearing_deviation`].
#[must_use]
pub fn region_toward(world: &World, r: RegionId, angle: f32, force: f32) -> Option<RegionId> {
    let region = &world.regions[r];
    let region_land = world.is_land(r);
    let mut best: Option<(RegionId, f32)> = None;

    for &n in &region.neighbors {
        let neighbor = &world.regions[n];
        if region_land
            && world.is_land(n)
            && neighbor.height() - region.height() > WIND_CLIMB * force
        {
            continue;
        }

        let deviation = angle_between(region.site.bearing_to(neighbor.site), angle);
        if best.is_none_or(|(_, d)| deviation < d) {
            best = Some((n, deviation));
        }
    }

    best.filter(|&(_, d)| d <= max_bearing_deviation(force))
        .map(|(n, _)| n)
}

fn is_wet_source(world: &World, r: RegionId) -> bool {
    !world.is_land(r) || world.regions[r].biome == Biome::Lake
}

pub fn calc_humidity(world: &mut World) {
    world.set_status("Making world moist...");

    for r in 0..world.regions.len() {
        let humidity = if is_wet_source(world, r) {
            1.0
        } else if world.regions[r].has_river {
            RIVER_HUMIDITY
        } else {
            0.0
        };
        world.regions[r].humidity = humidity;
    }

    let order: Vec<RegionId> = (0..world.regions.len()).collect();
    spread_moisture(world, order.iter().copied());
    spread_moisture(world, order.iter().rev().copied());

    blow(world, |r| r.humidity, |r| &mut r.humidity, 0.2);
    smooth(world, |r| r.humidity, |r| &mut r.humidity);
}

/// Один проход растекания влаги в заданном порядке
fn spread_moisture(world: &mut World, order: impl Iterator<Item = RegionId>) {
    for r in order {
        if !world.is_land(r) || world.regions[r].humidity >= SATURATED {
            continue;
        }

        let height = world.regions[r].height();
        let mut humidity = world.regions[r].humidity;
        for &n in &world.regions[r].neighbors {
            let neighbor = &world.regions[n];
            if neighbor.has_river || neighbor.biome == Biome::Lake {
                humidity += WATER_NEIGHBOR_BONUS;
            }
            let climb = neighbor.height() - height;
            if neighbor.humidity > humidity && humidity != 1.0 && climb < MAX_MOIST_CLIMB {
                humidity += (neighbor.humidity - humidity) / (1.8 - climb * 2.0);
            }
        }
        world.regions[r].humidity = humidity;
    }
}

/// Температура: базовая минус поправки на влажность и высоту, тепло и плодородие у озёр
pub fn calc_temperature(world: &mut World) {
    world.set_status("Making world cool...");
    let base = world.climate.base_temperature;

    for r in 0..world.regions.len() {
        let lakes = world.regions[r]
            .neighbors
            .iter()
            .filter(|&&n| world.regions[n].biome == Biome::Lake)
            .count() as f32;

        let region = &mut world.regions[r];
        region.temperature = base - base / 5.0 * region.humidity - base / 1.2 * region.height()
            + LAKE_WARMTH * lakes;
        region.fertility_bonus += LAKE_FERTILITY * lakes;
    }

    blow(world, |r| r.temperature, |r| &mut r.temperature, 1.0);
    smooth(world, |r| r.temperature, |r| &mut r.temperature);
}

/// Ветер: каждый регион суши тянется к значению наветренного соседа.
/// Если сосед больше, прибавляется `force * v`, иначе вычитается `loss * force * v`.
fn blow(
    world: &mut World,
    get: impl Fn(&Region) -> f32,
    get_mut: impl Fn(&mut Region) -> &mut f32,
    loss: f32,
) {
    let Wind { angle, force } = world.wind;

    for r in 0..world.regions.len() {
        if !world.is_land(r) {
            continue;
        }
        let Some(n) = region_toward(world, r, angle, force) else {
            continue;
        };

        let upwind = get(&world.regions[n]);
        let value = get_mut(&mut world.regions[r]);
        if upwind > *value {
            *value += force * upwind;
        } else {
            *value -= loss * force * upwind;
        }
    }
}

/// Каждое значение заменяется средним по соседям (по месту, в порядке регионов)
fn smooth(
    world: &mut World,
    get: impl Fn(&Region) -> f32,
    get_mut: impl Fn(&mut Region) -> &mut f32,
) {
    for r in 0..world.regions.len() {
        let neighbors = &world.regions[r].neighbors;
        if neighbors.is_empty() {
            continue;
        }
        let sum: f32 = neighbors.iter().map(|&n| get(&world.regions[n])).sum();
        let mean = sum / neighbors.len() as f32;
        *get_mut(&mut world.regions[r]) = mean;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::mega::make_mega_clusters;
    use crate::world::tests::grid_world;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn world_with_megas(
        cols: usize,
        rows: usize,
        height: impl Fn(usize, usize) -> f32,
    ) -> World {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut world = grid_world(cols, rows, height);
        make_mega_clusters(&mut world, &mut rng);
        world
    }

    #[test]
    fn test_bearing_tolerance_bounds() {
        assert_eq!(max_bearing_deviation(0.0), 15.0);
        assert_eq!(max_bearing_deviation(1.0), 60.0);
    }

    #[test]
    fn test_angle_wraps_around() {
        assert!((angle_between(-90.0, 270.0)).abs() < 1e-4);
        assert!((angle_between(170.0, -170.0) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_region_toward_picks_closest_bearing() {
        let world = world_with_megas(3, 3, |_, _| 0.5);
        // центр 4: слева 3 (180°), справа 5 (0°), сверху 1 (-90°), снизу 7 (90°)
        assert_eq!(region_toward(&world, 4, 0.0, 0.0), Some(5));
        assert_eq!(region_toward(&world, 4, 90.0, 0.0), Some(7));
        assert_eq!(region_toward(&world, 4, 180.0, 0.0), Some(3));
        assert_eq!(region_toward(&world, 4, 265.0, 0.0), Some(1));
        // 45° — ровно между соседями, допуск 15° не проходит
        assert_eq!(region_toward(&world, 4, 45.0, 0.0), None);
        // при силе 1 допуск 60°, выигрывает первый по списку (справа)
        assert_eq!(region_toward(&world, 4, 45.0, 1.0), Some(5));
    }

    #[test]
    fn test_region_toward_skips_steep_land() {
        let world = world_with_megas(3, 1, |x, _| if x == 2 { 0.9 } else { 0.5 });
        assert_eq!(region_toward(&world, 1, 0.0, 1.0), None);

        // в море подъём не мешает
        let world = world_with_megas(3, 1, |x, _| if x == 2 { 0.01 } else { -0.5 });
        assert_eq!(region_toward(&world, 1, 0.0, 0.0), Some(2));
    }

    #[test]
    fn test_humidity_flows_from_sea_inland() {
        // море | суша | суша | суша | суша
        let mut world = world_with_megas(5, 1, |x, _| if x == 0 { -0.5 } else { 0.3 });
        calc_humidity(&mut world);

        let h: Vec<f32> = world.regions.iter().map(|r| r.humidity).collect();
        assert!(h.iter().all(|v| v.is_finite()));
        assert!(h[1] > h[4], "coast must be wetter than inland: {h:?}");
        assert_eq!(world.status, "Making world moist...");
    }

    #[test]
    fn test_river_and_lake_moisten_neighbors() {
        let mut world = world_with_megas(4, 1, |_, _| 0.3);
        world.regions[0].has_river = true;
        world.regions[3].biome = Biome::Lake;
        calc_humidity(&mut world);

        assert!(world.regions.iter().all(|r| r.humidity > 0.0));
    }

    #[test]
    fn test_smoothing_is_neighbor_mean() {
        let mut world = world_with_megas(3, 1, |_, _| 0.3);
        world.regions[0].humidity = 0.0;
        world.regions[1].humidity = 0.6;
        world.regions[2].humidity = 0.9;
        smooth(&mut world, |r| r.humidity, |r| &mut r.humidity);

        // по месту: 0 берёт 0.6, 1 — среднее (0.6, 0.9), 2 — обновлённое значение 1
        assert!((world.regions[0].humidity - 0.6).abs() < 1e-6);
        assert!((world.regions[1].humidity - 0.75).abs() < 1e-6);
        assert!((world.regions[2].humidity - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_temperature_falls_with_height_and_rises_near_lakes() {
        let mut world = world_with_megas(3, 3, |x, _| match x {
            0 => 0.1,
            1 => 0.4,
            _ => 0.9,
        });
        calc_temperature(&mut world);
        assert!(world.regions[3].temperature > world.regions[5].temperature);

        let mut world = world_with_megas(3, 1, |_, _| 0.3);
        world.regions[2].biome = Biome::Lake;
        calc_temperature(&mut world);
        assert!((world.regions[1].fertility_bonus - 0.2).abs() < 1e-6);
        assert_eq!(world.regions[0].fertility_bonus, 0.0);
    }

    #[test]
    fn test_wind_pushes_wetness_downwind() {
        let mut world = world_with_megas(2, 1, |_, _| 0.3);
        world.wind = Wind {
            angle: 0.0,
            force: 0.5,
        };
        world.regions[0].humidity = 0.2;
        world.regions[1].humidity = 0.8;
        blow(&mut world, |r| r.humidity, |r| &mut r.humidity, 0.2);

        // регион 0 берёт влагу справа: 0.2 + 0.5 * 0.8
        assert!((world.regions[0].humidity - 0.6).abs() < 1e-6);
        // регион 1 смотрит вправо — соседей там нет
        assert!((world.regions[1].humidity - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_random_wind_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..100 {
            let wind = Wind::random(&mut rng);
            assert!((0.0..1.0).contains(&wind.force));
            assert!((0.0..270.0).contains(&wind.angle));
        }
    }
}
