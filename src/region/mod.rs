// src/region/mod.rs
//! Регионы — ячейки мирового графа.
//!
//! Граф хранится как арена `Vec<Region>`: все «указатели» (соседи, кластеры,
//! государство, поселение) — это индексы в соответствующие массивы [`crate::world::World`].

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::biome::Biome;
use crate::geometry::{Point, point_in_polygon};
use crate::heightmap::ScalarField;
use crate::subdivision::{Cell, CellGraph};

pub type RegionId = usize;
pub type ClusterId = usize;
pub type StateId = usize;
pub type SettlementId = usize;
pub type RoadId = usize;

/// Уровень моря: ниже — море, выше — суша
pub const SEA_LEVEL: f32 = 0.0625;

#[derive(Debug, Clone, Serialize)]
pub struct Region {
    pub site: Point,
    /// Вершины границы ячейки
    pub vertices: Vec<Point>,
    /// Высоты вершин, в том же порядке, что и `vertices`
    pub vertex_heights: Vec<f32>,
    /// Высота сайта — среднее высот вершин
    pub site_height: f32,
    pub biome: Biome,
    pub humidity: f32,
    pub temperature: f32,
    pub minerals: f32,
    /// Оценка пригодности для жизни
    pub nice: f32,
    /// Прибавка к плодородию биома (реки, соседние озёра)
    pub fertility_bonus: f32,
    pub neighbors: Vec<RegionId>,

    pub has_river: bool,
    pub has_road: bool,
    pub border: bool,
    pub state_border: bool,
    pub sea_border: bool,
    pub traffic: u32,

    pub cluster: Option<ClusterId>,
    pub mega_cluster: Option<ClusterId>,
    pub state_cluster: Option<ClusterId>,
    pub state: Option<StateId>,
    pub settlement: Option<SettlementId>,
}

impl Region {
    #[must_use]
    pub fn new(site: Point, vertices: Vec<Point>, vertex_heights: Vec<f32>) -> Self {
        let site_height = if vertex_heights.is_empty() {
            0.0
        } else {
            vertex_heights.iter().sum::<f32>() / vertex_heights.len() as f32
        };
        let biome = if site_height < SEA_LEVEL {
            Biome::Sea
        } else {
            Biome::Land
        };

        Self {
            site,
            vertices,
            vertex_heights,
            site_height,
            biome,
            humidity: 0.0,
            temperature: 0.0,
            minerals: 0.0,
            nice: 0.0,
            fertility_bonus: 0.0,
            neighbors: Vec::new(),
            has_river: false,
            has_road: false,
            border: false,
            state_border: false,
            sea_border: false,
            traffic: 0,
            cluster: None,
            mega_cluster: None,
            state_cluster: None,
            state: None,
            settlement: None,
        }
    }

    /// Высота сайта региона
    #[must_use]
    pub fn height(&self) -> f32 {
        self.site_height
    }

    /// Самая низкая вершина границы
    #[must_use]
    pub fn lowest_vertex(&self) -> Option<(Point, f32)> {
        self.vertices
            .iter()
            .copied()
            .zip(self.vertex_heights.iter().copied())
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    #[must_use]
    pub fn fertility(&self) -> f32 {
        self.biome.fertility() + self.fertility_bonus
    }

    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point_in_polygon(point, &self.vertices)
    }
}

/// Строит регионы по ячейкам разбиения: высоты вершин берутся из поля,
/// высота сайта — их среднее, начальный биом — суша или море по уровню моря.
pub fn build_regions<F: ScalarField + Sync>(graph: &CellGraph, field: &F) -> Vec<Region> {
    let heights = sample_cells(&graph.cells, field);

    let mut regions: Vec<Region> = graph
        .cells
        .iter()
        .zip(heights)
        .map(|(cell, h)| Region::new(cell.site, cell.vertices.clone(), h))
        .collect();

    for (region, cell) in regions.iter_mut().zip(&graph.cells) {
        region.neighbors.clone_from(&cell.neighbors);
    }
    regions
}

fn sample_cell<F: ScalarField>(cell: &Cell, field: &F) -> Vec<f32> {
    cell.vertices.iter().map(|&v| field.sample(v)).collect()
}

#[cfg(feature = "parallel")]
fn sample_cells<F: ScalarField + Sync>(cells: &[Cell], field: &F) -> Vec<Vec<f32>> {
    cells.par_iter().map(|c| sample_cell(c, field)).collect()
}

#[cfg(not(feature = "parallel"))]
fn sample_cells<F: ScalarField + Sync>(cells: &[Cell], field: &F) -> Vec<Vec<f32>> {
    cells.iter().map(|c| sample_cell(c, field)).collect()
}
