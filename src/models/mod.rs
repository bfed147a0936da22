//! Modelos de dados da API WHOOP v2
//!
//! Cada registro é decodificado com serde (campos obrigatórios, enums, UUIDs e datas
//! RFC 3339 são verificados pelo próprio decoder) e depois passa por [`Record::validate`]
//! para as regras que o formato JSON sozinho não expressa.

pub mod common;
pub mod cycle;
pub mod recovery;
pub mod sleep;
pub mod user;
pub mod workout;

pub use common::{Page, ScoreState};
pub use cycle::{Cycle, CycleCollection, CycleScore};
pub use recovery::{Recovery, RecoveryCollection, RecoveryScore};
pub use sleep::{Sleep, SleepCollection, SleepNeeded, SleepScore, SleepStageSummary};
pub use user::{UserBasicProfile, UserBodyMeasurement};
pub use workout::{WorkoutCollection, WorkoutScore, WorkoutV2, ZoneDurations};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Corpo de resposta fora do formato esperado
#[derive(Debug, Error)]
pub enum ValidationError {
    /// JSON inválido, campo obrigatório ausente, valor de enum desconhecido,
    /// UUID ou data mal formados
    #[error("invalid {record} payload: {source}")]
    Malformed {
        record: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),
}

/// Registro decodificável a partir de uma resposta da API
pub trait Record: DeserializeOwned {
    /// Nome usado nas mensagens de erro
    const NAME: &'static str;

    /// Regras adicionais além do formato
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Decodifica e valida um corpo JSON
pub fn decode<T: Record>(body: &[u8]) -> Result<T, ValidationError> {
    let record: T = serde_json::from_slice(body).map_err(|source| ValidationError::Malformed {
        record: T::NAME,
        source,
    })?;
    record.validate()?;
    Ok(record)
}
