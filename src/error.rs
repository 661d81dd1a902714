// src/error.rs
//! Ошибки генератора.
//!
//! Фатальными считаются только проблемы конфигурации и геометрии диаграммы.
//! Недостижимая дорога, пустой кластер или «бесконечная» река ошибками не являются
//! и обрабатываются внутри соответствующих проходов.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapgenError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid generation parameters: {reason}")]
    InvalidConfig { reason: String },

    #[error("Failed to build Voronoi diagram: {reason}")]
    DiagramFailed { reason: String },

    #[error("Diagram still has degenerate cells after {attempts} relaxation attempts")]
    DegenerateDiagram { attempts: usize },
}

/// Результат любой операции генератора
pub type MapgenResult<T> = Result<T, MapgenError>;
