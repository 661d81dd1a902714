//! Шумовые поля: высоты и залежи минералов.
//!
//! Поле — это просто функция «точка мира → число». Генератор регионов принимает
//! любой [`ScalarField`], поэтому в тестах вместо шума можно подставить замыкание.

use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

use crate::config::{TerrainStyle, WorldGenerationParams};
use crate::geometry::Point;

/// Протяжённость карты в пространстве шума
const NOISE_SPAN: f32 = 10.0;
/// Поле минералов берётся из соседнего участка шума, чтобы не повторять рельеф
const MINERAL_OFFSET: f32 = 10.0;
const MINERAL_SCALE: f32 = 1.5;
/// Октавы «клубящегося» шума (и рельефа архипелага, и минералов)
const BILLOW_OCTAVES: u32 = 6;
const BILLOW_PERSISTENCE: f32 = 0.5;
/// Сдвиг суммы октав «клубящегося» шума вверх
const BILLOW_BIAS: f32 = 0.5;
/// Затухание амплитуды октав в FBm FastNoiseLite (значение `gain` по умолчанию)
const FBM_GAIN: f32 = 0.5;

pub trait ScalarField {
    fn sample(&self, point: Point) -> f32;
}

impl<F: Fn(Point) -> f32> ScalarField for F {
    fn sample(&self, point: Point) -> f32 {
        self(point)
    }
}

/// Как именно комбинируются октавы шума
#[derive(Debug, Clone, Copy, PartialEq)]
enum Composition {
    /// Встроенный фрактальный режим FastNoiseLite (FBm или Ridged).
    /// FastNoiseLite делит сумму октав на `amplitude`, здесь она умножается обратно.
    Fractal { amplitude: f32 },
    /// Сумма октав вида `2|n| - 1` без нормировки, плюс [`BILLOW_BIAS`]
    Billow { octaves: u32, persistence: f32 },
}

/// Сумма амплитуд `octaves` октав, каждая в `persistence` раз меньше предыдущей
#[must_use]
pub fn octave_amplitude(octaves: u32, persistence: f32) -> f32 {
    (0..octaves).fold((0.0, 1.0), |(sum, amp), _| (sum + amp, amp * persistence)).0
}

/// Детерминированное шумовое поле, привязанное к размеру карты
pub struct NoiseField {
    noise: FastNoiseLite,
    composition: Composition,
    width: f32,
    height: f32,
    offset: f32,
    scale: f32,
}

impl NoiseField {
    /// Поле высот для выбранного стиля рельефа
    #[must_use]
    pub fn heights(params: &WorldGenerationParams) -> Self {
        let seed = params.seed as i32;
        let mut noise = FastNoiseLite::new();
        noise.set_noise_type(Some(NoiseType::Perlin));

        let composition = match params.terrain_style {
            TerrainStyle::Flat => {
                noise.set_seed(Some(seed));
                noise.set_fractal_type(Some(FractalType::FBm));
                noise.set_fractal_octaves(Some(params.octaves as i32));
                noise.set_frequency(Some(params.frequency));
                Composition::Fractal {
                    amplitude: octave_amplitude(params.octaves, FBM_GAIN),
                }
            }
            TerrainStyle::Archipelago => {
                noise.set_seed(Some(seed.wrapping_add(1)));
                noise.set_fractal_type(Some(FractalType::None));
                noise.set_frequency(Some(0.5));
                Composition::Billow {
                    octaves: BILLOW_OCTAVES,
                    persistence: BILLOW_PERSISTENCE,
                }
            }
            TerrainStyle::Ridged => {
                noise.set_seed(Some(seed.wrapping_add(2)));
                noise.set_fractal_type(Some(FractalType::Ridged));
                noise.set_fractal_octaves(Some(params.octaves as i32));
                noise.set_frequency(Some(params.frequency));
                Composition::Fractal { amplitude: 1.0 }
            }
        };

        Self {
            noise,
            composition,
            width: params.width as f32,
            height: params.height as f32,
            offset: 0.0,
            scale: 1.0,
        }
    }

    /// Поле минералов (неотрицательность обеспечивает классификатор биомов)
    #[must_use]
    pub fn minerals(params: &WorldGenerationParams) -> Self {
        let mut noise = FastNoiseLite::new();
        noise.set_seed(Some((params.seed as i32).wrapping_add(5)));
        noise.set_noise_type(Some(NoiseType::Perlin));
        noise.set_fractal_type(Some(FractalType::None));
        noise.set_frequency(Some(1.0));

        Self {
            noise,
            composition: Composition::Billow {
                octaves: BILLOW_OCTAVES,
                persistence: BILLOW_PERSISTENCE,
            },
            width: params.width as f32,
            height: params.height as f32,
            offset: MINERAL_OFFSET,
            scale: MINERAL_SCALE,
        }
    }

    fn billow(&self, x: f32, y: f32, octaves: u32, persistence: f32) -> f32 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;

        for _ in 0..octaves {
            let n = self.noise.get_noise_2d(x * frequency, y * frequency);
            value += (2.0 * n.abs() - 1.0) * amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }

        value + BILLOW_BIAS
    }
}

impl ScalarField for NoiseField {
    fn sample(&self, point: Point) -> f32 {
        let nx = self.offset + point.x as f32 / self.width * NOISE_SPAN;
        let ny = self.offset + point.y as f32 / self.height * NOISE_SPAN;

        let value = match self.composition {
            Composition::Fractal { amplitude } => self.noise.get_noise_2d(nx, ny) * amplitude,
            Composition::Billow {
                octaves,
                persistence,
            } => self.billow(nx, ny, octaves, persistence),
        };
        value * self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(style: TerrainStyle) -> WorldGenerationParams {
        WorldGenerationParams {
            seed: 42,
            width: 64,
            height: 64,
            terrain_style: style,
            ..Default::default()
        }
    }

    #[test]
    fn test_closure_is_a_field() {
        let field = |p: Point| (p.x + p.y) as f32;
        assert_eq!(field.sample(Point::new(1.0, 2.0)), 3.0);
    }

    #[test]
    fn test_noise_is_deterministic_and_bounded() {
        for style in [
            TerrainStyle::Flat,
            TerrainStyle::Archipelago,
            TerrainStyle::Ridged,
        ] {
            let a = NoiseField::heights(&params(style));
            let b = NoiseField::heights(&params(style));
            for i in 0..32 {
                let p = Point::new(f64::from(i) * 2.0, f64::from(i) * 1.5);
                let v = a.sample(p);
                assert_eq!(v, b.sample(p));
                assert!(v.is_finite());
                let bound = octave_amplitude(BILLOW_OCTAVES, BILLOW_PERSISTENCE) + BILLOW_BIAS;
                assert!(v.abs() <= bound, "{style:?}: {v}");
            }
        }
    }

    #[test]
    fn test_octave_amplitude() {
        assert!((octave_amplitude(4, 0.5) - 1.875).abs() < 1e-6);
        assert!((octave_amplitude(1, 0.5) - 1.0).abs() < 1e-6);
        assert_eq!(octave_amplitude(0, 0.5), 0.0);
    }

    #[test]
    fn test_flat_heights_restore_octave_range() {
        let field = NoiseField::heights(&params(TerrainStyle::Flat));
        assert_eq!(field.composition, Composition::Fractal { amplitude: 1.875 });

        let ridged = NoiseField::heights(&params(TerrainStyle::Ridged));
        assert_eq!(ridged.composition, Composition::Fractal { amplitude: 1.0 });
    }

    #[test]
    fn test_billow_is_biased_and_unnormalised() {
        let p = params(TerrainStyle::Archipelago);
        let field = NoiseField::heights(&p);
        let minerals = NoiseField::minerals(&p);
        let expected = Composition::Billow {
            octaves: BILLOW_OCTAVES,
            persistence: BILLOW_PERSISTENCE,
        };
        assert_eq!(field.composition, expected);
        assert_eq!(minerals.composition, expected);

        // сумма октав из одних нулей шума: -(1 + 0.5 + ...) + 0.5
        let silent = -octave_amplitude(BILLOW_OCTAVES, BILLOW_PERSISTENCE) + BILLOW_BIAS;
        let lowest = (0..256)
            .map(|i| field.billow(i as f32 * 0.37, i as f32 * 0.11, BILLOW_OCTAVES, BILLOW_PERSISTENCE))
            .fold(f32::INFINITY, f32::min);
        assert!(lowest >= silent - 1e-4);
        assert!(lowest < BILLOW_BIAS);
    }

    #[test]
    fn test_height_field_varies() {
        let field = NoiseField::heights(&params(TerrainStyle::Flat));
        let first = field.sample(Point::new(0.0, 0.0));
        let varies = (1..64).any(|i| {
            (field.sample(Point::new(f64::from(i), f64::from(i))) - first).abs() > 1e-3
        });
        assert!(varies, "height noise should not be constant");
    }

    #[test]
    fn test_minerals_differ_from_heights() {
        let p = params(TerrainStyle::Flat);
        let heights = NoiseField::heights(&p);
        let minerals = NoiseField::minerals(&p);
        let differs = (0..16).any(|i| {
            let pt = Point::new(f64::from(i) * 4.0, 10.0);
            (heights.sample(pt) - minerals.sample(pt)).abs() > 1e-3
        });
        assert!(differs);
    }
}
