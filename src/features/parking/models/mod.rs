mod coordinate;
mod parking_lot;
mod parking_spot;
mod spot_detection;

pub use coordinate::Coordinate;
pub use parking_lot::{LotFilter, ParkingLot};
pub use parking_spot::{ParkingSpot, SpotFilter, SpotStatus};
pub use spot_detection::{DetectionResult, SpotDetection};
