//! Плоская геометрия: точки, расстояния, пеленги и попадание точки в многоугольник.

use serde::{Deserialize, Serialize};

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Евклидово расстояние до другой точки
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Направление на `other` в градусах, диапазон (-180, 180].
    /// 0° — вдоль оси X, 90° — вдоль оси Y.
    #[must_use]
    pub fn bearing_to(self, other: Point) -> f32 {
        let dy = other.y - self.y;
        let dx = other.x - self.x;
        dy.atan2(dx).to_degrees() as f32
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Проверяет, лежит ли точка внутри многоугольника (граница считается внутренней).
#[must_use]
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];

        if on_segment(point, a, b) {
            return true;
        }

        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn on_segment(p: Point, a: Point, b: Point) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    let scale = a.distance(b).max(1.0);
    if cross.abs() > EPSILON * scale {
        return false;
    }
    p.x >= a.x.min(b.x) - EPSILON
        && p.x <= a.x.max(b.x) + EPSILON
        && p.y >= a.y.min(b.y) - EPSILON
        && p.y <= a.y.max(b.y) + EPSILON
}

/// Совпадают ли две вершины (с учётом погрешности вычислений диаграммы)
#[must_use]
pub fn same_vertex(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
}
