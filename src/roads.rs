// src/roads.rs
//! Стоимость пути по графу регионов и дороги между поселениями.
//!
//! [`RouteCostModel`] отдаёт поиску пути две вещи: оценку перехода между
//! двумя регионами и список проходимых соседей с ценой шага. Сам поиск
//! делает `astar` из `pathfinding`. Проложенная дорога помечает свои регионы.

use pathfinding::prelude::astar;
use serde::Serialize;
use tracing::debug;

use crate::biome::Biome;
use crate::region::{RegionId, RoadId, SettlementId};
use crate::settlement::SettlementKind;
use crate::world::World;

/// Штраф за спуск на каждую единицу перепада высот
const DESCENT_PENALTY: f32 = 1000.0;
/// Скидка за заход в регион с поселением
const SETTLEMENT_DISCOUNT: f32 = 500.0;
const RIVER_FACTOR: f32 = 0.6;
const STATE_BORDER_FACTOR: f32 = 1.2;
const FOREST_FACTOR: f32 = 1.1;
const ROAD_FACTOR: f32 = 0.2;
const SEA_FACTOR: f32 = 0.8;
/// Цены переводятся в целые тысячные: поиску нужен полный порядок
const COST_SCALE: f32 = 1000.0;

#[derive(Debug, Clone, Serialize)]
pub struct Road {
    pub from: SettlementId,
    pub to: SettlementId,
    pub regions: Vec<RegionId>,
    pub cost: f32,
    /// Хотя бы часть пути идёт морем
    pub sea_path: bool,
}

/// Стоимость перемещения по регионам мира
pub struct RouteCostModel<'a> {
    world: &'a World,
}

impl<'a> RouteCostModel<'a> {
    #[must_use]
    pub fn new(world: &'a World) -> Self {
        Self { world }
    }

    /// Цена перехода из `a` в `b`.
    ///
    /// По суше: расстояние между сайтами, плюс штраф за спуск на более низкую сушу
    /// (и скидка, если там поселение), дешевле вдоль рек и дорог, дороже через
    /// границу государств и в лес. По морю — фиксированная скидка.
    #[must_use]
    pub fn cost(&self, a: RegionId, b: RegionId) -> f32 {
        if a == b {
            return 0.0;
        }
        let (from, to) = (&self.world.regions[a], &self.world.regions[b]);
        let mut d = from.site.distance(to.site) as f32;

        if !self.world.is_land(a) {
            return d * SEA_FACTOR;
        }

        let drop = from.height() - to.height();
        if drop > 0.0 && self.world.is_land(b) {
            d += DESCENT_PENALTY * drop;
            if to.settlement.is_some() && d >= SETTLEMENT_DISCOUNT {
                d -= SETTLEMENT_DISCOUNT;
            }
        }
        if to.has_river {
            d *= RIVER_FACTOR;
        }
        if to.state != from.state {
            d *= STATE_BORDER_FACTOR;
        }
        if to.biome.is_forest() {
            d *= FOREST_FACTOR;
        }
        if to.has_road {
            d *= ROAD_FACTOR;
        }
        d
    }

    /// Проходимые соседи `r` с ценой шага.
    ///
    /// Озёра непроходимы. С суши в море и с моря на сушу можно попасть только
    /// через регион с портом.
    #[must_use]
    pub fn adjacent(&self, r: RegionId) -> Vec<(RegionId, f32)> {
        let land = self.world.is_land(r);
        self.world.regions[r]
            .neighbors
            .iter()
            .copied()
            .filter(|&n| self.world.regions[n].biome != Biome::Lake)
            .filter(|&n| {
                if land == self.world.is_land(n) {
                    true
                } else if land {
                    self.has_port(r)
                } else {
                    self.has_port(n)
                }
            })
            .map(|n| (n, self.cost(r, n)))
            .collect()
    }

    fn has_port(&self, r: RegionId) -> bool {
        self.world.regions[r]
            .settlement
            .is_some_and(|s| self.world.settlements[s].kind == SettlementKind::Port)
    }
}

fn quantise(cost: f32) -> u64 {
    (cost.max(0.0) * COST_SCALE).round() as u64
}

/// Самый дешёвый путь из `from` в `to` и его цена; `None`, если пути нет
#[must_use]
pub fn find_route(world: &World, from: RegionId, to: RegionId) -> Option<(Vec<RegionId>, f32)> {
    let model = RouteCostModel::new(world);
    let (path, cost) = astar(
        &from,
        |&r| {
            model
                .adjacent(r)
                .into_iter()
                .map(|(n, c)| (n, quantise(c)))
                .collect::<Vec<_>>()
        },
        |_| 0,
        |&r| r == to,
    )?;
    Some((path, cost as f32 / COST_SCALE))
}

/// Прокладывает дорогу между двумя поселениями и помечает её регионы.
/// Возвращает `None`, если дорога уже есть или пути нет.
pub fn build_road(world: &mut World, from: SettlementId, to: SettlementId) -> Option<RoadId> {
    let key = (from.min(to), from.max(to));
    if from == to || world.road_map.contains_key(&key) {
        return None;
    }

    let start = world.settlements[from].region;
    let goal = world.settlements[to].region;
    let Some((regions, cost)) = find_route(world, start, goal) else {
        debug!(
            "No road between {} and {}",
            world.settlements[from].name, world.settlements[to].name
        );
        return None;
    };

    for &r in &regions {
        world.regions[r].has_road = true;
        world.regions[r].traffic += 1;
    }
    let sea_path = regions.iter().any(|&r| !world.is_land(r));

    let id = world.roads.len();
    world.roads.push(Road {
        from,
        to,
        regions,
        cost,
        sea_path,
    });
    world.road_map.insert(key, id);
    world.settlements[from].roads.push(id);
    world.settlements[to].roads.push(id);
    Some(id)
}

/// Связывает каждое поселение с ближайшим ещё не связанным с ним поселением того
/// же материка, а каждый порт с ближайшим портом другого материка
pub fn make_roads(world: &mut World) {
    world.set_status("Making roads...");

    for from in 0..world.settlements.len() {
        let mc = world.regions[world.settlements[from].region].mega_cluster;
        let nearest = nearest_settlement(world, from, |world, to| {
            world.regions[world.settlements[to].region].mega_cluster == mc
        });
        if let Some(to) = nearest {
            build_road(world, from, to);
        }
    }

    for from in 0..world.settlements.len() {
        if world.settlements[from].kind != SettlementKind::Port {
            continue;
        }
        let mc = world.regions[world.settlements[from].region].mega_cluster;
        let nearest = nearest_settlement(world, from, |world, to| {
            world.settlements[to].kind == SettlementKind::Port
                && world.regions[world.settlements[to].region].mega_cluster != mc
        });
        if let Some(to) = nearest {
            build_road(world, from, to);
        }
    }

    debug!("Roads: {}", world.roads.len());
}

/// Ближайшее к `from` поселение, подходящее под `accept` и ещё не связанное с ним дорогой
fn nearest_settlement(
    world: &World,
    from: SettlementId,
    accept: impl Fn(&World, SettlementId) -> bool,
) -> Option<SettlementId> {
    let site = world.regions[world.settlements[from].region].site;
    (0..world.settlements.len())
        .filter(|&to| to != from)
        .filter(|&to| !world.road_map.contains_key(&(from.min(to), from.max(to))))
        .filter(|&to| accept(world, to))
        .min_by(|&a, &b| {
            let da = site.distance(world.regions[world.settlements[a].region].site);
            let db = site.distance(world.regions[world.settlements[b].region].site);
            da.total_cmp(&db)
        })
}
