// src/subdivision.rs
//! Разбиение плоскости на выпуклые ячейки (диаграмма Вороного).
//!
//! Генератор мира не работает с `voronoice` напрямую: диаграмма превращается в
//! [`CellGraph`] — список ячеек с сайтом, вершинами границы и соседями.
//! Так все проходы можно гонять и на вручную построенных графах (см. [`CellGraph::grid`]).

use rand::Rng;
use tracing::{debug, warn};
use voronoice::{BoundingBox, Voronoi, VoronoiBuilder};

use crate::error::{MapgenError, MapgenResult};
use crate::geometry::{Point, point_in_polygon};

/// Одна ячейка разбиения
#[derive(Debug, Clone)]
pub struct Cell {
    pub site: Point,
    /// Вершины границы в порядке обхода
    pub vertices: Vec<Point>,
    /// Индексы соседних ячеек в том же [`CellGraph`]
    pub neighbors: Vec<usize>,
}

impl Cell {
    /// Ячейка вырождена, если её собственный сайт лежит вне её границы
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !point_in_polygon(self.site, &self.vertices)
    }
}

#[derive(Debug, Clone)]
pub struct CellGraph {
    pub width: f64,
    pub height: f64,
    pub cells: Vec<Cell>,
}

impl CellGraph {
    /// Регулярная сетка из квадратных ячеек со стороной `size`.
    /// Соседи — четыре ортогональные ячейки в порядке: слева, справа, сверху, снизу.
    #[must_use]
    pub fn grid(cols: usize, rows: usize, size: f64) -> Self {
        let mut cells = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                let x0 = col as f64 * size;
                let y0 = row as f64 * size;
                let mut neighbors = Vec::with_capacity(4);
                if col > 0 {
                    neighbors.push(row * cols + col - 1);
                }
                if col + 1 < cols {
                    neighbors.push(row * cols + col + 1);
                }
                if row > 0 {
                    neighbors.push((row - 1) * cols + col);
                }
                if row + 1 < rows {
                    neighbors.push((row + 1) * cols + col);
                }
                cells.push(Cell {
                    site: Point::new(x0 + size / 2.0, y0 + size / 2.0),
                    vertices: vec![
                        Point::new(x0, y0),
                        Point::new(x0 + size, y0),
                        Point::new(x0 + size, y0 + size),
                        Point::new(x0, y0 + size),
                    ],
                    neighbors,
                });
            }
        }
        Self {
            width: cols as f64 * size,
            height: rows as f64 * size,
            cells,
        }
    }

    #[must_use]
    pub fn degenerate_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_degenerate()).count()
    }

    /// Упорядочивает ячейки по сайту (сначала y, затем x) и переиндексирует соседей.
    /// Порядок ячеек определяет порядок регионов, а значит и детерминизм всех проходов.
    #[must_use]
    pub fn sorted_by_site(self) -> Self {
        let mut order: Vec<usize> = (0..self.cells.len()).collect();
        order.sort_by(|&a, &b| {
            let (sa, sb) = (self.cells[a].site, self.cells[b].site);
            sa.y.total_cmp(&sb.y).then(sa.x.total_cmp(&sb.x))
        });

        let mut new_index = vec![0; self.cells.len()];
        for (new, &old) in order.iter().enumerate() {
            new_index[old] = new;
        }

        let mut old_cells: Vec<Option<Cell>> = self.cells.into_iter().map(Some).collect();
        let cells = order
            .iter()
            .filter_map(|&old| old_cells[old].take())
            .map(|mut cell| {
                for n in &mut cell.neighbors {
                    *n = new_index[*n];
                }
                cell
            })
            .collect();

        Self {
            width: self.width,
            height: self.height,
            cells,
        }
    }
}

/// Случайные сайты внутри прямоугольника с отступом в одну единицу от края.
/// Дубликаты отбрасываются.
pub fn random_sites<R: Rng>(rng: &mut R, width: f64, height: f64, count: usize) -> Vec<Point> {
    let mut sites: Vec<Point> = (0..count)
        .map(|_| {
            Point::new(
                1.0 + rng.gen_range(0.0..=1.0) * (width - 2.0),
                1.0 + rng.gen_range(0.0..=1.0) * (height - 2.0),
            )
        })
        .collect();

    sites.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
    sites.dedup();
    sites
}

/// Строит диаграмму Вороного, релаксирует её `relax` раз и, пока остаются
/// вырожденные ячейки, делает ещё по одной релаксации, но не больше `max_attempts` раз.
pub fn build_diagram(
    sites: &[Point],
    width: f64,
    height: f64,
    relax: usize,
    max_attempts: usize,
) -> MapgenResult<CellGraph> {
    let mut voronoi = compute(sites.iter().copied(), width, height, relax)?;
    let mut attempts = 0;

    loop {
        let graph = to_cell_graph(&voronoi, width, height);
        let degenerate = graph.degenerate_count();
        if degenerate == 0 {
            debug!(
                "Diagram ready: {} cells, extra relaxations: {}",
                graph.cells.len(),
                attempts
            );
            return Ok(graph.sorted_by_site());
        }

        if attempts >= max_attempts {
            return Err(MapgenError::DegenerateDiagram { attempts });
        }
        attempts += 1;
        warn!(
            "Degenerate cells: {}, relaxing again ({}/{})",
            degenerate, attempts, max_attempts
        );

        let relaxed: Vec<Point> = voronoi
            .sites()
            .iter()
            .map(|p| Point::new(p.x, p.y))
            .collect();
        voronoi = compute(relaxed.into_iter(), width, height, 1)?;
    }
}

fn compute(
    sites: impl Iterator<Item = Point>,
    width: f64,
    height: f64,
    relax: usize,
) -> MapgenResult<Voronoi> {
    let sites: Vec<voronoice::Point> = sites
        .map(|p| voronoice::Point { x: p.x, y: p.y })
        .collect();
    let site_count = sites.len();

    let bbox = BoundingBox::new(
        voronoice::Point {
            x: width / 2.0,
            y: height / 2.0,
        },
        width,
        height,
    );

    VoronoiBuilder::default()
        .set_sites(sites)
        .set_bounding_box(bbox)
        .set_lloyd_relaxation_iterations(relax)
        .build()
        .ok_or_else(|| MapgenError::DiagramFailed {
            reason: format!("voronoice rejected {site_count} sites"),
        })
}

fn to_cell_graph(voronoi: &Voronoi, width: f64, height: f64) -> CellGraph {
    let cells = (0..voronoi.sites().len())
        .map(|i| {
            let cell = voronoi.cell(i);
            let site = cell.site_position();
            Cell {
                site: Point::new(site.x, site.y),
                vertices: cell.iter_vertices().map(|v| Point::new(v.x, v.y)).collect(),
                neighbors: cell.iter_neighbors().collect(),
            }
        })
        .collect();

    CellGraph {
        width,
        height,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_grid_topology() {
        let graph = CellGraph::grid(3, 2, 10.0);
        assert_eq!(graph.cells.len(), 6);
        assert_eq!(graph.cells[0].neighbors, vec![1, 3]);
        assert_eq!(graph.cells[4].neighbors, vec![3, 5, 1]);
        assert_eq!(graph.degenerate_count(), 0);
        assert!((graph.width - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_sorted_by_site_remaps_neighbors() {
        let mut graph = CellGraph::grid(2, 2, 1.0);
        graph.cells.reverse();
        for cell in &mut graph.cells {
            for n in &mut cell.neighbors {
                *n = 3 - *n;
            }
        }
        let sorted = graph.sorted_by_site();
        let expected = CellGraph::grid(2, 2, 1.0);
        for (a, b) in sorted.cells.iter().zip(&expected.cells) {
            assert_eq!(a.site, b.site);
            let mut an = a.neighbors.clone();
            let mut bn = b.neighbors.clone();
            an.sort_unstable();
            bn.sort_unstable();
            assert_eq!(an, bn);
        }
    }

    #[test]
    fn test_degenerate_cell_detection() {
        let mut graph = CellGraph::grid(1, 1, 1.0);
        graph.cells[0].site = Point::new(5.0, 5.0);
        assert_eq!(graph.degenerate_count(), 1);
    }

    #[test]
    fn test_random_sites_inside_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let sites = random_sites(&mut rng, 64.0, 32.0, 100);
        assert!(!sites.is_empty());
        for s in &sites {
            assert!(s.x >= 1.0 && s.x <= 63.0);
            assert!(s.y >= 1.0 && s.y <= 31.0);
        }
    }

    #[test]
    fn test_voronoi_diagram_is_connected_and_sorted() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let sites = random_sites(&mut rng, 100.0, 100.0, 50);
        let graph = build_diagram(&sites, 100.0, 100.0, 2, 10).unwrap();

        assert_eq!(graph.cells.len(), sites.len());
        assert_eq!(graph.degenerate_count(), 0);
        for pair in graph.cells.windows(2) {
            assert!(pair[0].site.y <= pair[1].site.y);
        }
        for (i, cell) in graph.cells.iter().enumerate() {
            assert!(!cell.neighbors.is_empty());
            for &n in &cell.neighbors {
                assert!(graph.cells[n].neighbors.contains(&i));
            }
        }
    }
}
