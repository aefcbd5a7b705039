use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Integer grid coordinate, used as the identity key of a waypoint.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub fn new(x: i32, y: i32) -> Self {
        Location { x, y }
    }

    pub fn distance(&self, other: &Location) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        dx.hypot(dy)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A search node. The total cost is always derived from its two parts.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    location: Location,
    previous_cost: f64,
    heuristic_cost: f64,
    predecessor: Option<Rc<Waypoint>>,
}

impl Waypoint {
    pub fn new(
        location: Location,
        previous_cost: f64,
        heuristic_cost: f64,
        predecessor: Option<Rc<Waypoint>>,
    ) -> Self {
        Waypoint {
            location,
            previous_cost,
            heuristic_cost,
            predecessor,
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Cost accumulated from the start to this waypoint.
    pub fn previous_cost(&self) -> f64 {
        self.previous_cost
    }

    /// Estimated remaining cost to the goal.
    pub fn heuristic_cost(&self) -> f64 {
        self.heuristic_cost
    }

    pub fn total_cost(&self) -> f64 {
        self.previous_cost + self.heuristic_cost
    }

    pub fn predecessor(&self) -> Option<&Rc<Waypoint>> {
        self.predecessor.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    pub steps: Vec<Location>,
    pub cost: f64,
}

impl Path {
    /// Walks predecessor links from `waypoint` back to the start.
    pub fn from_waypoint(waypoint: &Waypoint) -> Self {
        let mut steps = vec![waypoint.location()];
        let mut current = waypoint.predecessor();
        while let Some(prev) = current {
            steps.push(prev.location());
            current = prev.predecessor();
        }
        steps.reverse();
        Path {
            steps,
            cost: waypoint.previous_cost(),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(loc: &Location) -> u64 {
        let mut hasher = DefaultHasher::new();
        loc.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_location_identity() {
        for &(x, y) in &[(0, 0), (3, -7), (-12, 40), (i32::MAX, i32::MIN)] {
            let a = Location::new(x, y);
            let b = Location::new(x, y);
            assert_eq!(a, b);
            assert_eq!(hash_of(&a), hash_of(&b));
            assert_ne!(a, Location::new(x, y.wrapping_add(1)));
        }
        assert_eq!(Location::default(), Location::new(0, 0));
    }

    #[test]
    fn test_location_distance() {
        let a = Location::new(0, 0);
        assert_eq!(a.distance(&Location::new(3, 4)), 5.0);
        assert_eq!(a.distance(&a), 0.0);

        let far = Location::new(i32::MIN, 0).distance(&Location::new(i32::MAX, 0));
        assert_eq!(far, u32::MAX as f64);
    }

    #[test]
    fn test_waypoint_total_cost() {
        let wp = Waypoint::new(Location::new(2, 3), 4.5, 1.5, None);
        assert_eq!(wp.total_cost(), 6.0);
        assert!(wp.predecessor().is_none());
    }

    #[test]
    fn test_path_from_waypoint_chain() {
        let start = Rc::new(Waypoint::new(Location::new(0, 0), 0.0, 2.0, None));
        let mid = Rc::new(Waypoint::new(Location::new(1, 0), 1.0, 1.0, Some(start)));
        let goal = Waypoint::new(Location::new(2, 0), 2.0, 0.0, Some(mid));

        let path = Path::from_waypoint(&goal);
        assert_eq!(
            path.steps,
            vec![Location::new(0, 0), Location::new(1, 0), Location::new(2, 0)]
        );
        assert_eq!(path.cost, 2.0);
        assert_eq!(path.len(), 3);
    }
}
