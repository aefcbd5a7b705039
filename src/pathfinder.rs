use crate::common::{Location, Path, Waypoint};
use crate::error::Result;
use crate::map::Terrain;
use crate::state::SearchState;
use crate::stat::Stats;

use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, instrument, trace};

/// Runs A* from `start` to `goal`.
///
/// Returns `Ok(None)` when the open set runs dry, or when the cheapest open
/// waypoint already costs more than `max_cost`.
#[instrument(skip_all, name = "a_star", fields(start = %start, goal = %goal), level = "debug")]
pub fn find_path<M: Terrain + ?Sized>(
    map: &M,
    start: Location,
    goal: Location,
    max_cost: Option<f64>,
    stats: &mut Stats,
) -> Result<Option<Path>> {
    let search_start_time = Instant::now();
    let mut state = SearchState::new(Some(map))?;

    state.add_open_waypoint(Waypoint::new(start, 0.0, map.estimate(start, goal), None));
    stats.opened_waypoints += 1;

    let result = loop {
        let Some(current) = state.min_open_waypoint() else {
            debug!("open set exhausted");
            break None;
        };

        if max_cost.is_some_and(|max_cost| current.total_cost() > max_cost) {
            debug!("cheapest open waypoint exceeds max cost: {}", current.total_cost());
            break None;
        }

        if current.location() == goal {
            break Some(Path::from_waypoint(&current));
        }

        trace!(
            "expand waypoint {} g {} h {}",
            current.location(),
            current.previous_cost(),
            current.heuristic_cost()
        );
        state.close_waypoint(current.location());
        stats.expanded_waypoints += 1;

        take_next_step(&mut state, &current, goal, stats);
    };

    stats.time_us = search_start_time.elapsed().as_micros() as usize;
    if let Some(path) = &result {
        stats.cost = path.cost;
        debug!("found path of {} steps with cost {}", path.len(), path.cost);
    }
    Ok(result)
}

fn take_next_step<M: Terrain + ?Sized>(
    state: &mut SearchState<'_, M>,
    current: &Rc<Waypoint>,
    goal: Location,
    stats: &mut Stats,
) {
    let map = state.map();
    let location = current.location();

    for neighbor in map.neighbors(location) {
        // Settled locations are never offered again.
        if state.is_location_closed(neighbor) {
            continue;
        }

        let previous_cost = current.previous_cost() + map.step_cost(location, neighbor);
        let candidate = Waypoint::new(
            neighbor,
            previous_cost,
            map.estimate(neighbor, goal),
            Some(Rc::clone(current)),
        );

        if state.add_open_waypoint(candidate) {
            stats.opened_waypoints += 1;
        }
    }
}

impl Path {
    /// Checks the path runs from `start` to `goal` through neighboring steps.
    pub fn verify<M: Terrain + ?Sized>(&self, map: &M, start: Location, goal: Location) -> bool {
        if self.steps.first() != Some(&start) || self.steps.last() != Some(&goal) {
            return false;
        }

        self.steps
            .windows(2)
            .all(|pair| map.neighbors(pair[0]).contains(&pair[1]))
    }
}
