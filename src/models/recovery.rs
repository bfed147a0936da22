use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Page, Record, ScoreState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryScore {
    /// Usuário ainda em calibração; dados insuficientes
    pub user_calibrating: bool,
    /// 0 a 100%
    pub recovery_score: f64,
    pub resting_heart_rate: f64,
    pub hrv_rmssd_milli: f64,
    /// Apenas dispositivos 4.0+
    pub spo2_percentage: Option<f64>,
    /// Apenas dispositivos 4.0+
    pub skin_temp_celsius: Option<f64>,
}

/// Recuperação associada a um ciclo e ao sono que o encerrou
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recovery {
    pub cycle_id: i64,
    pub sleep_id: Uuid,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub score_state: ScoreState,
    pub score: Option<RecoveryScore>,
}

impl Record for Recovery {
    const NAME: &'static str = "Recovery";
}

pub type RecoveryCollection = Page<Recovery>;
