use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Page, Record, ScoreState};

/// Tempo em cada zona de frequência cardíaca, em milissegundos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDurations {
    pub zone_zero_milli: i64,
    pub zone_one_milli: i64,
    pub zone_two_milli: i64,
    pub zone_three_milli: i64,
    pub zone_four_milli: i64,
    pub zone_five_milli: i64,
}

impl ZoneDurations {
    /// Soma das zonas, saturando em vez de estourar
    pub fn total_milli(&self) -> i64 {
        [
            self.zone_one_milli,
            self.zone_two_milli,
            self.zone_three_milli,
            self.zone_four_milli,
            self.zone_five_milli,
        ]
        .into_iter()
        .fold(self.zone_zero_milli, i64::saturating_add)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutScore {
    pub strain: f64,
    pub average_heart_rate: i64,
    pub max_heart_rate: i64,
    pub kilojoule: f64,
    pub percent_recorded: f64,
    pub distance_meter: Option<f64>,
    pub altitude_gain_meter: Option<f64>,
    pub altitude_change_meter: Option<f64>,
    pub zone_durations: ZoneDurations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutV2 {
    pub id: Uuid,
    pub v1_id: Option<i64>,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub timezone_offset: String,
    pub sport_name: String,
    /// Descontinuado junto com `v1_id`
    pub sport_id: Option<i64>,
    pub score_state: ScoreState,
    pub score: Option<WorkoutScore>,
}

impl Record for WorkoutV2 {
    const NAME: &'static str = "WorkoutV2";
}

pub type WorkoutCollection = Page<WorkoutV2>;
