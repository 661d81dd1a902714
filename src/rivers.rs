//! Реки: трассировка от вершин к морю и бессточные озёра.
//!
//! Река начинается в локальном максимуме высоты и на каждом шаге осматривает ещё
//! не посещённых соседей текущего региона. Если у кого-то из них есть вершина ниже
//! достигнутого уровня, река переходит в самого низкого из них. Река заканчивается
//! в море или, исчерпав шаги (или соседей), разливается озером.

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::biome::Biome;
use crate::geometry::Point;
use crate::names;
use crate::region::{RegionId, SEA_LEVEL};
use crate::world::World;

/// Наибольшее число регионов в одной реке (вместе с истоком)
pub const MAX_RIVER_STEPS: usize = 100;
/// Истоки ищутся только на материках не меньше этого размера
const MIN_LAND_MASS: usize = 50;
/// Исток должен быть выше этого уровня
const SOURCE_HEIGHT: f32 = 0.66;
const RIVER_FERTILITY: f32 = 0.2;

#[derive(Debug, Clone, Serialize)]
pub struct River {
    pub name: String,
    /// Ломаная по сайтам регионов
    pub points: Vec<Point>,
    pub regions: Vec<RegionId>,
    /// Река не дошла до моря и разлилась озером
    pub ends_in_lake: bool,
}

/// Находит истоки и прокладывает от каждого реку
pub fn make_rivers<R: Rng>(world: &mut World, rng: &mut R) {
    world.set_status("Making rivers...");

    let sources = find_sources(world);
    debug!("River sources: {}", sources.len());

    let mut rivers = Vec::with_capacity(sources.len());
    for source in sources {
        let name = names::river_name(rng);
        rivers.push(trace_river(world, source, name));
    }
    world.rivers = rivers;
}

/// Локальные максимумы выше [`SOURCE_HEIGHT`] на крупных материках
fn find_sources(world: &World) -> Vec<RegionId> {
    let mut sources = Vec::new();
    for cluster in &world.mega_clusters {
        if !cluster.is_land || cluster.regions.len() < MIN_LAND_MASS {
            continue;
        }
        for &r in &cluster.regions {
            let region = &world.regions[r];
            let peak = region
                .neighbors
                .iter()
                .all(|&n| world.regions[n].height() <= region.height());
            if peak && region.height() > SOURCE_HEIGHT {
                sources.push(r);
            }
        }
    }
    sources
}

/// Прокладывает одну реку от `source`
pub fn trace_river(world: &mut World, source: RegionId, name: String) -> River {
    let mut visited = vec![false; world.regions.len()];
    visited[source] = true;

    let mut river = River {
        name,
        points: Vec::new(),
        regions: Vec::new(),
        ends_in_lake: false,
    };
    let mut level = world.regions[source]
        .lowest_vertex()
        .map_or(world.regions[source].height(), |(_, h)| h);
    flow_through(world, &mut river, source);

    let mut head = source;
    let mut steps = 1;
    river.ends_in_lake = loop {
        if world.regions[head].height() < SEA_LEVEL {
            break false;
        }
        if steps >= MAX_RIVER_STEPS {
            break true;
        }
        steps += 1;

        let fresh: Vec<RegionId> = world.regions[head]
            .neighbors
            .iter()
            .copied()
            .filter(|&n| !visited[n])
            .collect();
        if fresh.is_empty() {
            break true;
        }

        let mut lowest: Option<(RegionId, f32)> = None;
        for n in fresh {
            visited[n] = true;
            if let Some(mc) = world.regions[n].mega_cluster {
                world.mega_clusters[mc].has_river = true;
            }
            let Some((_, h)) = world.regions[n].lowest_vertex() else {
                continue;
            };
            if h < level && lowest.is_none_or(|(_, best)| h < best) {
                lowest = Some((n, h));
            }
        }

        if let Some((next, h)) = lowest {
            level = h;
            head = next;
            flow_through(world, &mut river, next);
        }
    };

    if river.ends_in_lake {
        flood(world, head);
    }
    debug!(
        "River {}: {} regions, ends in {}",
        river.name,
        river.regions.len(),
        if river.ends_in_lake { "lake" } else { "sea" }
    );
    river
}

fn flow_through(world: &mut World, river: &mut River, r: RegionId) {
    let region = &mut world.regions[r];
    region.has_river = true;
    region.fertility_bonus += RIVER_FERTILITY;
    river.points.push(region.site);
    river.regions.push(r);

    if let Some(mc) = region.mega_cluster {
        world.mega_clusters[mc].has_river = true;
    }
}

/// Регион и все его соседи становятся озером
fn flood(world: &mut World, r: RegionId) {
    let neighbors = world.regions[r].neighbors.clone();
    for lake in std::iter::once(r).chain(neighbors) {
        world.regions[lake].biome = Biome::Lake;
        world.regions[lake].humidity = 1.0;
    }
}

/// Прореживает ломаные всех рек
pub fn simplify_rivers(world: &mut World) {
    world.set_status("Simplify rivers...");
    for river in &mut world.rivers {
        river.points = simplify(&river.points);
    }
}

/// Из каждой тройки подряд идущих точек оставляет ближайшую к первой из двух следующих;
/// если ближе оказалась дальняя по порядку, промежуточная пропускается.
/// Точки с неконечными или неположительными координатами отбрасываются.
#[must_use]
pub fn simplify(points: &[Point]) -> Vec<Point> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };

    let mut result = vec![first];
    let mut i = 0;
    while i + 2 < points.len() {
        let p = points[i];
        let (p2, p3) = (points[i + 1], points[i + 2]);
        if p.distance(p3) < p.distance(p2) {
            result.push(p2);
        } else {
            result.push(p3);
            i += 1;
        }
        i += 1;
    }

    result.retain(|p| p.is_finite() && p.x > 0.0 && p.y > 0.0);
    result
}
