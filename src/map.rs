use ordered_float::OrderedFloat;
use rand::Rng;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::iter::Enumerate;
use std::str::Lines;

use crate::common::Location;
use crate::error::{Result, SearchError};

/// What a search needs to know about the ground it walks on.
pub trait Terrain {
    /// Reachable neighbors of `loc`.
    fn neighbors(&self, loc: Location) -> Vec<Location>;

    /// Cost of stepping from `from` onto the adjacent `to`.
    fn step_cost(&self, from: Location, to: Location) -> f64;

    /// Admissible estimate of the remaining cost from `from` to `goal`.
    fn estimate(&self, from: Location, goal: Location) -> f64;
}

#[derive(Debug, Clone)]
pub struct Tile {
    passable: bool,
    cost: f64,                    // Extra cost paid when stepping onto this tile
    pub neighbors: Vec<Location>, // Stores accessible neighbors
}

impl Tile {
    fn from_char(ch: char) -> Option<Self> {
        let (passable, cost) = match ch {
            '.' | 'G' => (true, 0.0),
            'S' => (true, 1.0),
            '@' | 'O' | 'T' | 'W' => (false, 0.0),
            _ => return None,
        };
        Some(Tile {
            passable,
            cost,
            neighbors: Vec::new(),
        })
    }

    pub fn is_passable(&self) -> bool {
        self.passable
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }
}

#[derive(Debug, Clone)]
pub struct Map {
    pub height: usize,
    pub width: usize,
    pub grid: Vec<Vec<Tile>>, // Indexed as grid[y][x]
    diagonal: bool,
    heuristic: Option<(Location, Vec<Vec<f64>>)>,
}

impl Map {
    pub fn from_file(path: &str, diagonal: bool) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, diagonal)
    }

    /// Parses a MovingAI style grid: `type`, `height`, `width` and `map`
    /// header lines followed by `height` rows of tiles.
    pub fn parse(text: &str, diagonal: bool) -> Result<Self> {
        let mut lines = text.lines().enumerate();

        let _type = header_line(&mut lines, "type")?;
        let height = header_value(&mut lines, "height")?;
        let width = header_value(&mut lines, "width")?;
        let _map = header_line(&mut lines, "map")?;

        // Rows are pushed as they are read; `height` comes from the file.
        let mut grid = Vec::new();
        for _ in 0..height {
            let (index, line) = lines.next().ok_or_else(|| SearchError::MapFormat {
                line: text.lines().count() + 1,
                message: format!("expected {height} rows, found {}", grid.len()),
            })?;
            let row = line.trim_end();
            if row.chars().count() != width {
                return Err(SearchError::MapFormat {
                    line: index + 1,
                    message: format!("expected {width} tiles, found {}", row.chars().count()),
                });
            }
            let tiles_row = row
                .chars()
                .map(|ch| {
                    Tile::from_char(ch).ok_or_else(|| SearchError::MapFormat {
                        line: index + 1,
                        message: format!("unknown tile {ch:?}"),
                    })
                })
                .collect::<Result<Vec<Tile>>>()?;
            grid.push(tiles_row);
        }

        let mut map = Map {
            height,
            width,
            grid,
            diagonal,
            heuristic: None,
        };
        map.initialize_neighbors();
        Ok(map)
    }

    /// Generates a map where each tile is blocked with probability
    /// `obstacle_ratio`. Locations in `keep_clear` are always passable.
    pub fn random<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        obstacle_ratio: f64,
        diagonal: bool,
        keep_clear: &[Location],
        rng: &mut R,
    ) -> Self {
        let grid = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        let clear = keep_clear
                            .iter()
                            .any(|loc| loc.x == x as i32 && loc.y == y as i32);
                        Tile {
                            passable: clear || !rng.gen_bool(obstacle_ratio),
                            cost: 0.0,
                            neighbors: Vec::new(),
                        }
                    })
                    .collect()
            })
            .collect();

        let mut map = Map {
            height,
            width,
            grid,
            diagonal,
            heuristic: None,
        };
        map.initialize_neighbors();
        map
    }

    fn initialize_neighbors(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                if self.grid[y][x].passable {
                    let neighbors = self.get_neighbors(Location::new(x as i32, y as i32));
                    self.grid[y][x].neighbors = neighbors;
                }
            }
        }
    }

    pub fn get_neighbors(&self, loc: Location) -> Vec<Location> {
        const STRAIGHT: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)]; // Up, down, left, right
        const DIAGONAL: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

        let directions: Vec<(i32, i32)> = if self.diagonal {
            STRAIGHT.iter().chain(DIAGONAL.iter()).copied().collect()
        } else {
            STRAIGHT.to_vec()
        };

        directions
            .into_iter()
            .filter_map(|(dx, dy)| {
                Some(Location::new(loc.x.checked_add(dx)?, loc.y.checked_add(dy)?))
            })
            .filter(|next| self.is_passable(*next))
            .collect()
    }

    pub fn contains(&self, loc: Location) -> bool {
        loc.x >= 0 && loc.y >= 0 && (loc.x as usize) < self.width && (loc.y as usize) < self.height
    }

    pub fn tile(&self, loc: Location) -> Option<&Tile> {
        if self.contains(loc) {
            Some(&self.grid[loc.y as usize][loc.x as usize])
        } else {
            None
        }
    }

    pub fn is_passable(&self, loc: Location) -> bool {
        self.tile(loc).is_some_and(Tile::is_passable)
    }

    /// Replaces the straight-line estimate towards `goal` with exact
    /// remaining costs, computed by a backward Dijkstra from the goal.
    /// Tiles that cannot reach the goal get an infinite estimate.
    pub fn prepare_exact_heuristic(&mut self, goal: Location) {
        let table = self.heuristic_dji(goal);
        self.heuristic = Some((goal, table));
    }

    pub fn heuristic_dji(&self, goal: Location) -> Vec<Vec<f64>> {
        let mut heuristic = vec![vec![f64::INFINITY; self.width]; self.height];
        if !self.is_passable(goal) {
            return heuristic;
        }

        let mut heap = BinaryHeap::new();
        heuristic[goal.y as usize][goal.x as usize] = 0.0;
        heap.push((Reverse(OrderedFloat(0.0)), goal));

        while let Some((Reverse(OrderedFloat(cost)), current)) = heap.pop() {
            if cost > heuristic[current.y as usize][current.x as usize] {
                continue;
            }

            for &prev in &self.grid[current.y as usize][current.x as usize].neighbors {
                let next_cost = cost + self.step_cost(prev, current);
                let best = &mut heuristic[prev.y as usize][prev.x as usize];
                if next_cost < *best {
                    *best = next_cost;
                    heap.push((Reverse(OrderedFloat(next_cost)), prev));
                }
            }
        }

        heuristic
    }
}

impl Terrain for Map {
    fn neighbors(&self, loc: Location) -> Vec<Location> {
        self.tile(loc)
            .map(|tile| tile.neighbors.clone())
            .unwrap_or_default()
    }

    fn step_cost(&self, from: Location, to: Location) -> f64 {
        match self.tile(to) {
            Some(tile) => from.distance(&to) + tile.cost,
            None => f64::INFINITY,
        }
    }

    fn estimate(&self, from: Location, goal: Location) -> f64 {
        match &self.heuristic {
            Some((target, table)) if *target == goal && self.contains(from) => {
                table[from.y as usize][from.x as usize]
            }
            _ => from.distance(&goal),
        }
    }
}

fn header_line<'a>(lines: &mut Enumerate<Lines<'a>>, key: &str) -> Result<(usize, &'a str)> {
    let (index, line) = lines.next().ok_or_else(|| SearchError::MapFormat {
        line: 0,
        message: format!("missing `{key}` header"),
    })?;
    if line.split_whitespace().next() != Some(key) {
        return Err(SearchError::MapFormat {
            line: index + 1,
            message: format!("expected `{key}` header, found {line:?}"),
        });
    }
    Ok((index + 1, line))
}

fn header_value(lines: &mut Enumerate<Lines<'_>>, key: &str) -> Result<usize> {
    let (line_number, line) = header_line(lines, key)?;
    line.split_whitespace()
        .last()
        .and_then(|value| value.parse::<usize>().ok())
        .ok_or_else(|| SearchError::MapFormat {
            line: line_number,
            message: format!("`{key}` header needs a non-negative integer, found {line:?}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_read_map() {
        let map = Map::from_file("map_file/test/test.map", false).unwrap();

        assert_eq!(map.height, 5);
        assert_eq!(map.width, 5);

        assert!(map.is_passable(Location::new(0, 0)));
        assert!(!map.is_passable(Location::new(1, 1)));
        assert!(!map.is_passable(Location::new(3, 2)));
        assert!(map.is_passable(Location::new(3, 3)));
        assert_eq!(map.tile(Location::new(3, 3)).unwrap().cost(), 1.0);
        assert!(!map.is_passable(Location::new(5, 0)));
        assert!(!map.is_passable(Location::new(0, -1)));

        let neighbors = map.neighbors(Location::new(0, 1));
        assert_eq!(neighbors.len(), 2);
        assert!(neighbors.contains(&Location::new(0, 0)));
        assert!(neighbors.contains(&Location::new(0, 2)));
    }

    #[test]
    fn test_diagonal_neighbors() {
        let map = Map::parse("type octile\nheight 3\nwidth 3\nmap\n...\n.@.\n...\n", true).unwrap();

        assert_eq!(map.neighbors(Location::new(0, 0)).len(), 2);
        assert_eq!(map.neighbors(Location::new(1, 0)).len(), 4);
        assert!(map.neighbors(Location::new(1, 1)).is_empty());
        assert!(map.neighbors(Location::new(9, 9)).is_empty());
        assert!(map.get_neighbors(Location::new(i32::MAX, i32::MIN)).is_empty());
        assert!(map.get_neighbors(Location::new(i32::MIN, i32::MAX)).is_empty());
    }

    #[test]
    fn test_parse_errors() {
        let missing_row = Map::parse("type octile\nheight 2\nwidth 2\nmap\n..\n", false);
        assert!(matches!(missing_row, Err(SearchError::MapFormat { .. })));

        let short_row = Map::parse("type octile\nheight 1\nwidth 3\nmap\n..\n", false);
        assert!(matches!(short_row, Err(SearchError::MapFormat { line: 5, .. })));

        let bad_tile = Map::parse("type octile\nheight 1\nwidth 2\nmap\n.x\n", false);
        assert!(matches!(bad_tile, Err(SearchError::MapFormat { line: 5, .. })));

        let huge_height = Map::parse(
            "type octile\nheight 18446744073709551615\nwidth 1\nmap\n.\n",
            false,
        );
        assert!(matches!(huge_height, Err(SearchError::MapFormat { .. })));

        let bad_header = Map::parse("type octile\nwidth 2\nheight 1\nmap\n..\n", false);
        assert!(matches!(bad_header, Err(SearchError::MapFormat { line: 2, .. })));

        assert!(matches!(
            Map::from_file("map_file/test/missing.map", false),
            Err(SearchError::Io(_))
        ));
    }

    #[test]
    fn test_step_cost_and_estimate() {
        let map = Map::from_file("map_file/test/test.map", true).unwrap();
        let origin = Location::new(0, 0);

        assert_eq!(map.step_cost(origin, Location::new(1, 0)), 1.0);
        let diagonal = map.step_cost(Location::new(2, 2), Location::new(3, 3));
        assert!((diagonal - (2f64.sqrt() + 1.0)).abs() < 1e-9);
        assert_eq!(map.step_cost(origin, Location::new(-1, 0)), f64::INFINITY);
        assert_eq!(map.estimate(origin, Location::new(3, 4)), 5.0);
    }

    #[test]
    fn test_exact_heuristic() {
        let mut map = Map::from_file("map_file/test/test.map", false).unwrap();
        let goal = Location::new(4, 4);
        map.prepare_exact_heuristic(goal);

        assert_eq!(map.estimate(goal, goal), 0.0);
        assert_eq!(map.estimate(Location::new(4, 0), goal), 4.0);
        assert_eq!(map.estimate(Location::new(0, 0), goal), 8.0);
        assert_eq!(map.estimate(Location::new(1, 1), goal), f64::INFINITY);

        // Other goals still fall back to the straight-line distance.
        assert_eq!(map.estimate(Location::new(0, 0), Location::new(0, 3)), 3.0);
    }

    #[test]
    fn test_random_map() {
        let keep_clear = [Location::new(0, 0), Location::new(9, 9)];
        let map_1 = Map::random(10, 10, 0.4, false, &keep_clear, &mut StdRng::seed_from_u64(7));
        let map_2 = Map::random(10, 10, 0.4, false, &keep_clear, &mut StdRng::seed_from_u64(7));

        assert_eq!(map_1.width, 10);
        assert_eq!(map_1.height, 10);
        for loc in keep_clear {
            assert!(map_1.is_passable(loc));
        }
        for y in 0..10 {
            for x in 0..10 {
                let loc = Location::new(x, y);
                assert_eq!(map_1.is_passable(loc), map_2.is_passable(loc));
            }
        }

        let open = Map::random(4, 3, 0.0, false, &[], &mut StdRng::seed_from_u64(0));
        assert!(open.grid.iter().flatten().all(Tile::is_passable));
    }
}
