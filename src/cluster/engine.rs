// src/cluster/engine.rs
//! Универсальная кластеризация регионов.
//!
//! Один линейный проход по регионам: каждый регион смотрит на уже посещённых
//! соседей «той же группы». Если таких нет, создаётся новый кластер. Если найден
//! один, регион присоединяется к нему. Если найдено два разных, второй кластер
//! целиком переезжает в первый (первый встреченный в порядке соседей выживает).
//! В конце пустые кластеры отбрасываются, остальные сортируются по убыванию размера.

use crate::cluster::Cluster;
use crate::region::{ClusterId, Region, RegionId};

/// Стратегия конкретного вида кластеров
pub trait ClusterStrategy {
    /// Разделяет ли ребро `region → neighbor` разные группы
    fn is_different(&self, regions: &[Region], region: RegionId, neighbor: RegionId) -> bool;

    /// Новый пустой кластер, основанный регионом `region`
    fn create_cluster(&mut self, regions: &[Region], region: RegionId) -> Cluster;

    /// Запоминает принадлежность региона кластеру
    fn on_assign(&mut self, regions: &mut [Region], region: RegionId, cluster: ClusterId);

    /// Регион переехал в `cluster` при слиянии двух кластеров
    fn on_reassign(&mut self, regions: &mut [Region], region: RegionId, cluster: ClusterId) {
        self.on_assign(regions, region, cluster);
    }

    /// У региона есть сосед из другой группы
    fn on_boundary(&mut self, _regions: &mut [Region], _region: RegionId) {}
}

/// Разбивает `members` на связные компоненты по правилу стратегии.
///
/// Соседи вне `members` в кластеры не попадают, но участвуют в проверке границы.
/// Возвращает кластеры по убыванию размера (при равенстве — в порядке создания);
/// после сортировки `on_assign` вызывается для каждого региона с итоговым индексом.
pub fn clusterize<S: ClusterStrategy>(
    regions: &mut [Region],
    members: &[RegionId],
    strategy: &mut S,
) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut index: Vec<Option<ClusterId>> = vec![None; regions.len()];

    for &r in members {
        let mut known: Option<ClusterId> = None;
        let neighbors = regions[r].neighbors.clone();

        for n in neighbors {
            if strategy.is_different(regions, r, n) {
                strategy.on_boundary(regions, r);
                continue;
            }
            let Some(found) = index[n] else {
                continue;
            };

            match known {
                None => {
                    known = Some(found);
                    clusters[found].regions.push(r);
                    index[r] = Some(found);
                    strategy.on_assign(regions, r, found);
                }
                Some(target) if target != found => {
                    let moved = std::mem::take(&mut clusters[found].regions);
                    for m in moved {
                        index[m] = Some(target);
                        clusters[target].regions.push(m);
                        strategy.on_reassign(regions, m, target);
                    }
                }
                Some(_) => {}
            }
        }

        if known.is_none() {
            let id = clusters.len();
            let mut cluster = strategy.create_cluster(regions, r);
            cluster.regions.push(r);
            clusters.push(cluster);
            index[r] = Some(id);
            strategy.on_assign(regions, r, id);
        }
    }

    clusters.retain(|c| !c.regions.is_empty());
    clusters.sort_by(|a, b| b.regions.len().cmp(&a.regions.len()));

    for (id, cluster) in clusters.iter().enumerate() {
        for &r in &cluster.regions {
            strategy.on_assign(regions, r, id);
        }
    }
    clusters
}
