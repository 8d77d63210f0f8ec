pub mod occupancy_handler;
pub mod proximity_handler;
