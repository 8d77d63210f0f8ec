use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Output of the occupancy classifier for one spot image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub is_occupied: bool,
    /// Classifier confidence in [0, 1]
    pub confidence: f64,
}

/// Database model for a recorded detection
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SpotDetection {
    pub id: Uuid,
    pub spot_id: Uuid,
    pub is_occupied: bool,
    pub confidence: f64,
    pub detected_at: DateTime<Utc>,
}
