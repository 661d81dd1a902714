use std::io::Write;

use mapgen::biome::Biome;
use mapgen::settlement::SettlementKind;
use mapgen::{TerrainStyle, World, WorldGenerationParams, generate_world};

fn small_params(seed: u64) -> WorldGenerationParams {
    WorldGenerationParams {
        seed,
        width: 512,
        height: 384,
        point_count: 1500,
        state_count: 3,
        ..Default::default()
    }
}

fn generate(seed: u64) -> World {
    generate_world(&small_params(seed)).unwrap()
}

#[test]
fn small_flat_world_is_built() {
    let params = WorldGenerationParams {
        seed: 42,
        width: 64,
        height: 64,
        point_count: 200,
        terrain_style: TerrainStyle::Flat,
        ..Default::default()
    };
    let world = generate_world(&params).unwrap();
    assert_eq!(world.regions.len(), 200);
    assert!(world.mega_clusters.iter().any(|c| c.is_land), "flat world has land");
    assert!(world.mega_clusters.iter().any(|c| !c.is_land), "flat world has sea");

    for (r, region) in world.regions.iter().enumerate() {
        if world.is_land(r) {
            assert!(region.humidity.is_finite());
        }
    }

    let placeable = world.regions.iter().enumerate().any(|(r, region)| {
        world.is_land(r)
            && region.biome != Biome::Lake
            && ((region.minerals > 1.0 && !matches!(region.biome, Biome::Snow | Biome::Ice))
                || (region.nice > 0.7 && region.fertility() > 0.7))
    });
    if placeable {
        assert!(!world.settlements.is_empty());
    }
}

#[test]
fn default_flat_world_has_rivers_and_mines() {
    let params = WorldGenerationParams {
        seed: 42,
        roads: false,
        ..Default::default()
    };
    let world = generate_world(&params).unwrap();

    assert!(!world.rivers.is_empty(), "flat world grows rivers");
    let rich: Vec<usize> = (0..world.regions.len())
        .filter(|&r| world.regions[r].minerals > 1.0)
        .collect();
    assert!(!rich.is_empty(), "some regions carry minerals above 1");

    let minable = rich.iter().any(|&r| {
        world.is_land(r) && !matches!(world.regions[r].biome, Biome::Lake | Biome::Snow | Biome::Ice)
    });
    if minable {
        assert!(world.settlements.iter().any(|s| s.kind == SettlementKind::Mine));
    }
}

#[test]
fn archipelago_world_has_islands() {
    let params = WorldGenerationParams {
        terrain_style: TerrainStyle::Archipelago,
        ..small_params(42)
    };
    let world = generate_world(&params).unwrap();

    let land = (0..world.regions.len()).filter(|&r| world.is_land(r)).count();
    assert!(land >= 30, "only {land} land regions");
    assert!(world.mega_clusters.iter().any(|c| c.is_land));
    assert!(world.mega_clusters.iter().any(|c| !c.is_land));
}

#[test]
fn clusters_partition_the_regions() {
    let world = generate(42);
    assert_eq!(world.regions.len(), 1500);

    let mut mega_members = vec![0usize; world.regions.len()];
    for (id, mega) in world.mega_clusters.iter().enumerate() {
        assert!(!mega.regions.is_empty());
        for &r in &mega.regions {
            mega_members[r] += 1;
            assert_eq!(world.regions[r].mega_cluster, Some(id));
        }
    }
    assert!(mega_members.iter().all(|&n| n == 1), "every region in exactly one mega-cluster");

    let mut members = vec![0usize; world.regions.len()];
    for (id, cluster) in world.clusters.iter().enumerate() {
        for &r in &cluster.regions {
            members[r] += 1;
            assert_eq!(world.regions[r].cluster, Some(id));
        }
    }
    assert!(members.iter().all(|&n| n == 1), "every region in exactly one cluster");

    // крупнейшие кластеры идут первыми
    for pair in world.mega_clusters.windows(2) {
        assert!(pair[0].regions.len() >= pair[1].regions.len());
    }
}

#[test]
fn climate_and_states_are_consistent() {
    let world = generate(42);

    for (r, region) in world.regions.iter().enumerate() {
        assert!(region.humidity.is_finite(), "humidity of {r}");
        assert!(region.temperature.is_finite(), "temperature of {r}");
        if !world.is_land(r) {
            assert_eq!(region.state, None);
            assert!(!region.state_border);
        }
    }

    for territory in &world.state_clusters {
        let state = territory.states[0];
        for &r in &territory.regions {
            assert_eq!(world.regions[r].state, Some(state));
        }
    }
}

#[test]
fn settlements_and_roads_are_linked() {
    let world = generate(7);

    for (id, settlement) in world.settlements.iter().enumerate() {
        assert_eq!(world.regions[settlement.region].settlement, Some(id));
        assert!(world.is_land(settlement.region));
        assert_eq!(settlement.population, 1000);
    }

    for state in &world.states {
        if let Some(capital) = state.capital {
            assert!(world.settlements[capital].is_capital);
        }
    }

    for (id, road) in world.roads.iter().enumerate() {
        assert_eq!(road.regions.first(), Some(&world.settlements[road.from].region));
        assert_eq!(road.regions.last(), Some(&world.settlements[road.to].region));
        assert!(road.regions.iter().all(|&r| world.regions[r].has_road));
        assert!(world.settlements[road.from].roads.contains(&id));
        assert!(world.settlements[road.to].roads.contains(&id));
    }
}

#[test]
fn generation_is_deterministic() {
    let a = generate(99);
    let b = generate(99);

    let biomes = |w: &World| w.regions.iter().map(|r| r.biome).collect::<Vec<_>>();
    assert_eq!(biomes(&a), biomes(&b));

    let towns = |w: &World| {
        w.settlements
            .iter()
            .map(|s| (s.name.clone(), s.region))
            .collect::<Vec<_>>()
    };
    assert_eq!(towns(&a), towns(&b));
    assert_eq!(a.rivers.len(), b.rivers.len());
    assert_eq!(a.roads.len(), b.roads.len());
}

#[test]
fn world_serializes_to_json() {
    let world = generate(3);
    let json = serde_json::to_value(&world).unwrap();
    assert_eq!(json["regions"].as_array().map(Vec::len), Some(1500));
    assert!(json.get("road_map").is_none());
    assert_eq!(json["status"], "");
}

#[test]
fn config_file_drives_generation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("world.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "seed = 5\nwidth = 256\nheight = 256\npoint_count = 400\nterrain_style = \"ridged\"\nroads = false\n\n[climate]\nbase_temperature = 25.0"
    )
    .unwrap();
    drop(file);

    let params = WorldGenerationParams::from_toml_file(&path).unwrap();
    assert_eq!(params.terrain_style, TerrainStyle::Ridged);
    assert!((params.climate.base_temperature - 25.0).abs() < f32::EPSILON);

    let world = generate_world(&params).unwrap();
    assert_eq!(world.regions.len(), 400);
    assert!(world.roads.is_empty());
}

#[test]
fn bad_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "point_count = 1").unwrap();
    assert!(WorldGenerationParams::from_toml_file(&path).is_err());
    assert!(WorldGenerationParams::from_toml_file(dir.path().join("missing.toml")).is_err());
}
