use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Page, Record, ScoreState};

/// Medições da WHOOP para um ciclo fisiológico
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleScore {
    /// Carga cardiovascular, escala de 0 a 21
    pub strain: f64,
    pub kilojoule: f64,
    pub average_heart_rate: i64,
    pub max_heart_rate: i64,
}

/// Ciclo fisiológico
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub start: DateTime<Utc>,
    /// Ausente enquanto o usuário ainda está neste ciclo
    pub end: Option<DateTime<Utc>>,
    /// `+hh:mm`, `-hh:mm` ou `Z`
    pub timezone_offset: String,
    pub score_state: ScoreState,
    /// Presente apenas quando `score_state` é `SCORED`
    pub score: Option<CycleScore>,
}

impl Record for Cycle {
    const NAME: &'static str = "Cycle";
}

pub type CycleCollection = Page<Cycle>;
