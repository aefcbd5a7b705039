use astar_grid::common::{Location, Path};
use astar_grid::config::{Cli, Config, HeuristicKind};
use astar_grid::map::Map;
use astar_grid::pathfinder::find_path;
use astar_grid::stat::Stats;

use anyhow::{bail, ensure, Context};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct Report<'a> {
    start: Location,
    goal: Location,
    path: Option<&'a Path>,
    stats: &'a Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;
    config.validate()?;

    let mut map = match &config.map_path {
        Some(map_path) => Map::from_file(map_path, config.diagonal)
            .with_context(|| format!("error loading map: {map_path}"))?,
        None => {
            info!(
                "No map file specified, generating {}x{} map with seed {}",
                config.width, config.height, config.seed
            );
            let mut rng = StdRng::seed_from_u64(config.seed);
            Map::random(
                config.width,
                config.height,
                config.obstacle_ratio,
                config.diagonal,
                &[config.start, config.goal],
                &mut rng,
            )
        }
    };

    for (name, location) in [("start", config.start), ("goal", config.goal)] {
        if !map.is_passable(location) {
            bail!("{name} location {location} is outside the map or blocked");
        }
    }

    if config.heuristic == HeuristicKind::Exact {
        map.prepare_exact_heuristic(config.goal);
    }

    let mut stats = Stats::default();
    let path = find_path(&map, config.start, config.goal, config.max_cost, &mut stats)?;
    match &path {
        Some(path) => {
            ensure!(
                path.verify(&map, config.start, config.goal),
                "search returned a broken path"
            );
            info!("path: {:?}", path.steps);
        }
        None => error!("no path from {} to {}", config.start, config.goal),
    }
    stats.print();

    if let Some(output_path) = &config.output_path {
        let file = File::create(output_path)
            .with_context(|| format!("error creating output file: {output_path}"))?;
        let report = Report {
            start: config.start,
            goal: config.goal,
            path: path.as_ref(),
            stats: &stats,
        };
        serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
        info!("result written to {output_path}");
    }

    Ok(())
}
