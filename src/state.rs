use crate::common::{Location, Waypoint};
use crate::error::{Result, SearchError};
use crate::map::Terrain;

use ordered_float::OrderedFloat;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::trace;

/// Open and closed waypoint collections for a single A* search.
///
/// A location moves `unseen -> open -> closed` and never back. While open,
/// its waypoint may be replaced by one with a strictly smaller previous cost.
#[derive(Debug)]
pub struct SearchState<'m, M: Terrain + ?Sized> {
    map: &'m M,
    open_waypoints: HashMap<Location, Rc<Waypoint>>,
    closed_waypoints: HashMap<Location, Rc<Waypoint>>,
}

impl<'m, M: Terrain + ?Sized> SearchState<'m, M> {
    pub fn new(map: Option<&'m M>) -> Result<Self> {
        let map =
            map.ok_or_else(|| SearchError::InvalidArgument("map cannot be absent".to_string()))?;
        Ok(SearchState {
            map,
            open_waypoints: HashMap::new(),
            closed_waypoints: HashMap::new(),
        })
    }

    pub fn map(&self) -> &'m M {
        self.map
    }

    /// Returns the open waypoint with the smallest total cost.
    ///
    /// Ties go to the smallest location in `(x, y)` order, so the result does
    /// not depend on hash iteration order.
    pub fn min_open_waypoint(&self) -> Option<Rc<Waypoint>> {
        self.open_waypoints
            .values()
            .min_by_key(|waypoint| (OrderedFloat(waypoint.total_cost()), waypoint.location()))
            .cloned()
    }

    /// Offers a candidate for its location. Returns whether it was stored.
    ///
    /// An open incumbent is only replaced when the candidate's previous cost
    /// is strictly lower; total cost plays no part here. Closed locations
    /// are never reopened.
    pub fn add_open_waypoint(&mut self, candidate: Waypoint) -> bool {
        let location = candidate.location();
        if self.closed_waypoints.contains_key(&location) {
            trace!("reject {location}: already closed");
            return false;
        }

        let replace = match self.open_waypoints.get(&location) {
            None => true,
            Some(existing) => candidate.previous_cost() < existing.previous_cost(),
        };
        if replace {
            self.open_waypoints.insert(location, Rc::new(candidate));
        } else {
            trace!(
                "keep {location}: candidate previous cost {} is not lower",
                candidate.previous_cost()
            );
        }
        replace
    }

    pub fn num_open_waypoints(&self) -> usize {
        self.open_waypoints.len()
    }

    pub fn num_closed_waypoints(&self) -> usize {
        self.closed_waypoints.len()
    }

    /// Moves the waypoint at `loc` from the open set to the closed set.
    /// Does nothing if `loc` is not open.
    pub fn close_waypoint(&mut self, loc: Location) {
        if let Some(waypoint) = self.open_waypoints.remove(&loc) {
            self.closed_waypoints.insert(loc, waypoint);
        }
    }

    pub fn is_location_closed(&self, loc: Location) -> bool {
        self.closed_waypoints.contains_key(&loc)
    }

    pub fn open_waypoint(&self, loc: Location) -> Option<&Rc<Waypoint>> {
        self.open_waypoints.get(&loc)
    }

    pub fn closed_waypoint(&self, loc: Location) -> Option<&Rc<Waypoint>> {
        self.closed_waypoints.get(&loc)
    }
}
