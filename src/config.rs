use anyhow::anyhow;
use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::common::Location;

#[derive(Parser, Debug)]
#[command(
    name = "astar-grid",
    about = "A* shortest path search on weighted 2D grids.",
    version = "1.0"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the map file; a random map is generated if absent")]
    pub map_path: Option<String>,

    #[arg(long, help = "Start location as x,y", value_delimiter = ',')]
    pub start: Vec<i32>,

    #[arg(long, help = "Goal location as x,y", value_delimiter = ',')]
    pub goal: Vec<i32>,

    #[arg(long, help = "Give up once the cheapest open waypoint costs more than this")]
    pub max_cost: Option<f64>,

    #[arg(long, help = "Allow diagonal moves", default_value_t = false)]
    pub diagonal: bool,

    #[arg(long, value_enum, help = "Heuristic used to estimate the remaining cost")]
    pub heuristic: Option<HeuristicKind>,

    #[arg(long, help = "Width of the random map")]
    pub width: Option<usize>,

    #[arg(long, help = "Height of the random map")]
    pub height: Option<usize>,

    #[arg(long, help = "Probability of a tile being blocked in the random map")]
    pub obstacle_ratio: Option<f64>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,

    #[arg(long, help = "Path to write the result as JSON")]
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeuristicKind {
    /// Straight-line distance to the goal.
    #[default]
    Euclidean,
    /// Exact remaining cost from a backward Dijkstra over the map.
    Exact,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub map_path: Option<String>,
    pub start: Location,
    pub goal: Location,
    pub max_cost: Option<f64>,
    pub diagonal: bool,
    pub heuristic: HeuristicKind,
    pub width: usize,
    pub height: usize,
    pub obstacle_ratio: f64,
    pub seed: u64,
    pub output_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map_path: None,
            start: Location::new(0, 0),
            goal: Location::new(31, 31),
            max_cost: None,
            diagonal: false,
            heuristic: HeuristicKind::Euclidean,
            width: 32,
            height: 32,
            obstacle_ratio: 0.2,
            seed: 0,
            output_path: None,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(map_path) = &cli.map_path {
            self.map_path = Some(map_path.clone());
        }
        if !cli.start.is_empty() {
            self.start = location_from_arg(&cli.start, "start")?;
        }
        if !cli.goal.is_empty() {
            self.goal = location_from_arg(&cli.goal, "goal")?;
        }
        if let Some(max_cost) = cli.max_cost {
            self.max_cost = Some(max_cost);
        }
        if cli.diagonal {
            self.diagonal = true;
        }
        if let Some(heuristic) = cli.heuristic {
            self.heuristic = heuristic;
        }
        if let Some(width) = cli.width {
            self.width = width;
        }
        if let Some(height) = cli.height {
            self.height = height;
        }
        if let Some(obstacle_ratio) = cli.obstacle_ratio {
            self.obstacle_ratio = obstacle_ratio;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = Some(output_path.clone());
        }
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(max_cost) = self.max_cost {
            if max_cost.is_nan() || max_cost < 0.0 {
                return Err(anyhow!(
                    "Max cost must be a non-negative number, got {}",
                    max_cost
                ));
            }
        }

        if self.map_path.is_none() {
            if self.width == 0 || self.height == 0 {
                return Err(anyhow!(
                    "Random map needs positive dimensions, got {}x{}",
                    self.width,
                    self.height
                ));
            }
            if !(0.0..1.0).contains(&self.obstacle_ratio) {
                return Err(anyhow!(
                    "Obstacle ratio must be in [0, 1), got {}",
                    self.obstacle_ratio
                ));
            }
        }
        Ok(())
    }
}

fn location_from_arg(values: &[i32], name: &str) -> anyhow::Result<Location> {
    match values {
        [x, y] => Ok(Location::new(*x, *y)),
        _ => Err(anyhow!(
            "--{name} expects exactly two coordinates as x,y, got {values:?}"
        )),
    }
}
