use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub cost: f64,
    pub time_us: usize,
    pub expanded_waypoints: usize,
    pub opened_waypoints: usize,
}

impl Stats {
    pub fn print(&self) {
        info!(
            "Cost {:?} Time(microseconds) {:?} Expanded waypoints: {:?} Opened waypoints: {:?}",
            self.cost, self.time_us, self.expanded_waypoints, self.opened_waypoints
        );
    }
}
