// src/cluster/mod.rs
//! Кластеры — связные группы регионов.
//!
//! Одна структура используется в трёх ролях:
//! - материк/океан (мега-кластер) — суша и море на самом грубом уровне;
//! - кластер — сплошное пятно одного биома;
//! - кластер государства — сплошная территория одного государства.

pub mod engine;
pub mod graph;
pub mod mega;
pub mod merge;
pub mod patch;

use serde::Serialize;

use crate::biome::Biome;
use crate::geometry::Point;
use crate::region::{ClusterId, RegionId, SettlementId, StateId};

pub use engine::{ClusterStrategy, clusterize};

#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    pub name: String,
    pub regions: Vec<RegionId>,
    /// Соседние кластеры того же вида
    pub neighbors: Vec<ClusterId>,
    /// Материк, к которому относится кластер (мега-кластер указывает сам на себя)
    pub mega_cluster: Option<ClusterId>,
    pub biome: Biome,
    pub is_land: bool,
    pub has_river: bool,
    /// Вершины, по которым проходит граница с регионами другого биома
    pub border: Vec<Point>,
    /// Локальные максимумы минералов
    pub resource_points: Vec<RegionId>,
    /// Локальные максимумы «приятности»
    pub good_points: Vec<RegionId>,
    pub settlements: Vec<SettlementId>,
    pub has_port: bool,
    pub states: Vec<StateId>,
}

impl Cluster {
    #[must_use]
    pub fn new(name: String, biome: Biome, is_land: bool) -> Self {
        Self {
            name,
            regions: Vec::new(),
            neighbors: Vec::new(),
            mega_cluster: None,
            biome,
            is_land,
            has_river: false,
            border: Vec::new(),
            resource_points: Vec::new(),
            good_points: Vec::new(),
            settlements: Vec::new(),
            has_port: false,
            states: Vec::new(),
        }
    }

    /// Добавляет государство в список, если его там ещё нет
    pub fn add_state(&mut self, state: StateId) {
        if !self.states.contains(&state) {
            self.states.push(state);
        }
    }
}
