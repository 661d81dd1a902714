pub mod biome;
pub mod climate;
pub mod cluster;
pub mod config;
pub mod error;
pub mod geometry;
pub mod heightmap;
pub mod names;
pub mod region;
pub mod rivers;
pub mod roads;
pub mod settlement;
pub mod states;
pub mod subdivision;
pub mod world;

pub use config::{ClimateSettings, TerrainStyle, WorldGenerationParams};
pub use error::{MapgenError, MapgenResult};
pub use world::{World, generate_world};
