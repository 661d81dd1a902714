use clap::Parser;
use mapgen::{WorldGenerationParams, generate_world};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Генератор мира на графе регионов
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: PathBuf,

    /// Путь для сохранения мира в JSON (по умолчанию: ./world.json)
    #[arg(short, long, default_value = "world.json")]
    output: PathBuf,

    /// Переопределить сид из конфигурации
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    println!("🔍 Загрузка конфигурации...");
    let mut params = WorldGenerationParams::from_toml_file(&cli.config)?;
    if let Some(seed) = cli.seed {
        params.seed = seed;
    }

    println!(
        "Генерация мира (размер: {}×{}, точек: {}, сид: {})...",
        params.width, params.height, params.point_count, params.seed
    );
    let world = generate_world(&params)?;

    println!(
        "Регионов: {}, материков и морей: {}, рек: {}, государств: {}, поселений: {}, дорог: {}",
        world.regions.len(),
        world.mega_clusters.len(),
        world.rivers.len(),
        world.states.len(),
        world.settlements.len(),
        world.roads.len()
    );

    println!("Сохранение в {:?}", cli.output);
    let writer = BufWriter::new(File::create(&cli.output)?);
    serde_json::to_writer(writer, &world)?;

    println!("\nГотово! Мир сохранён.");
    Ok(())
}
