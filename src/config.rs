// src/config.rs
//! Конфигурация генерации мира
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией мира:
//! - Размер карты и плотность точек диаграммы Вороного
//! - Стиль рельефа (равнины, архипелаг, хребты)
//! - Параметры шума и релаксации диаграммы
//! - Климатические настройки, реки, государства и дороги
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{MapgenError, MapgenResult};

/// Стиль рельефа
///
/// Выбирает композицию шумовых модулей, из которой строится поле высот.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TerrainStyle {
    /// Обычный фрактальный шум Перлина
    #[default]
    Flat,
    /// «Клубящийся» шум: много мелких островов
    Archipelago,
    /// Гребенчатый мультифрактал: вытянутые хребты
    Ridged,
}

impl TerrainStyle {
    /// Разбирает имя стиля (`flat`, `archipelago`, `ridged`).
    ///
    /// # Примеры
    /// ```
    /// use mapgen::config::TerrainStyle;
    /// assert_eq!(TerrainStyle::from_name("ridged"), Some(TerrainStyle::Ridged));
    /// assert_eq!(TerrainStyle::from_name("basic"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "flat" => Some(TerrainStyle::Flat),
            "archipelago" => Some(TerrainStyle::Archipelago),
            "ridged" => Some(TerrainStyle::Ridged),
            _ => None,
        }
    }
}

/// Глобальные климатические настройки
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClimateSettings {
    /// Базовая температура мира (условные единицы). От неё отсчитываются
    /// охлаждение с высотой и влажностью, а также пороги пустынь и «приятности».
    #[serde(default = "default_base_temperature")]
    pub base_temperature: f32,
}

fn default_base_temperature() -> f32 {
    30.0
}

impl Default for ClimateSettings {
    fn default() -> Self {
        Self {
            base_temperature: 30.0,
        }
    }
}

/// Основные параметры генерации мира
///
/// Полная конфигурация для генерации одного мира. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldGenerationParams {
    /// Сид генератора случайных чисел (детерминированная генерация)
    #[serde(default)]
    pub seed: u64,

    /// Ширина карты в мировых единицах (по умолчанию 1024)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Высота карты в мировых единицах (по умолчанию 768)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Количество точек (ячеек) диаграммы Вороного
    #[serde(default = "default_point_count")]
    pub point_count: usize,

    /// Количество октав шума высот
    #[serde(default = "default_octaves")]
    pub octaves: u32,

    /// Частота шума высот
    #[serde(default = "default_frequency")]
    pub frequency: f32,

    /// Начальное число итераций релаксации Ллойда
    #[serde(default = "default_relax")]
    pub relax: usize,

    /// Сколько дополнительных релаксаций допускается, пока в диаграмме
    /// остаются вырожденные ячейки
    #[serde(default = "default_max_relax_attempts")]
    pub max_relax_attempts: usize,

    /// Стиль рельефа (по умолчанию `flat`)
    #[serde(default)]
    pub terrain_style: TerrainStyle,

    /// Упрощать ли ломаные рек после трассировки
    #[serde(default = "default_true")]
    pub simple_rivers: bool,

    /// Количество государств
    #[serde(default = "default_state_count")]
    pub state_count: usize,

    /// Прокладывать ли дороги между поселениями
    #[serde(default = "default_true")]
    pub roads: bool,

    /// Климатические настройки
    #[serde(default)]
    pub climate: ClimateSettings,
}

impl WorldGenerationParams {
    /// Загружает параметры из TOML-файла
    ///
    /// # Ошибки
    /// Возвращает ошибку, если файл не найден, содержит недопустимый формат
    /// или параметры не проходят [`WorldGenerationParams::validate`].
    ///
    /// # Пример
    /// ```toml
    /// # world.toml
    /// seed = 42
    /// width = 1024
    /// height = 512
    /// terrain_style = "archipelago"
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> MapgenResult<Self> {
        let contents = fs::read_to_string(path)?;
        let params: Self = toml::from_str(&contents)?;
        params.validate()?;
        Ok(params)
    }

    /// Проверяет согласованность параметров.
    pub fn validate(&self) -> MapgenResult<()> {
        let reason = if self.width < 2 || self.height < 2 {
            Some(format!(
                "map size must be at least 2×2, got {}×{}",
                self.width, self.height
            ))
        } else if self.point_count < 3 {
            Some(format!(
                "at least 3 points are required, got {}",
                self.point_count
            ))
        } else if self.octaves == 0 {
            Some("octave count must be positive".to_string())
        } else if !(self.frequency > 0.0) {
            Some(format!("frequency must be positive, got {}", self.frequency))
        } else if self.state_count == 0 {
            Some("at least one state is required".to_string())
        } else if self.max_relax_attempts == 0 {
            Some("max_relax_attempts must be positive".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => Err(MapgenError::InvalidConfig { reason }),
            None => Ok(()),
        }
    }
}

fn default_width() -> u32 {
    1024
}
fn default_height() -> u32 {
    768
}
fn default_point_count() -> usize {
    10_000
}
fn default_octaves() -> u32 {
    4
}
fn default_frequency() -> f32 {
    0.3
}
fn default_relax() -> usize {
    5
}
fn default_max_relax_attempts() -> usize {
    20
}
fn default_state_count() -> usize {
    2
}
fn default_true() -> bool {
    true
}

impl Default for WorldGenerationParams {
    fn default() -> Self {
        Self {
            seed: 0,
            width: 1024,
            height: 768,
            point_count: 10_000,
            octaves: 4,
            frequency: 0.3,
            relax: 5,
            max_relax_attempts: 20,
            terrain_style: TerrainStyle::Flat,
            simple_rivers: true,
            state_count: 2,
            roads: true,
            climate: ClimateSettings::default(),
        }
    }
}
