use serde::{Deserialize, Serialize};

use super::{Record, ValidationError};

/// Estado do cálculo de score de uma atividade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreState {
    /// Score calculado; os valores de medição estão presentes
    Scored,
    /// A WHOOP ainda está avaliando a atividade
    PendingScore,
    /// Não foi possível calcular (geralmente por falta de dados)
    Unscorable,
}

impl ScoreState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scored => "SCORED",
            Self::PendingScore => "PENDING_SCORE",
            Self::Unscorable => "UNSCORABLE",
        }
    }
}

impl std::fmt::Display for ScoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uma página de uma coleção: registros em ordem do servidor + cursor de continuação
///
/// O cursor chega como `next_token` na resposta e volta ao servidor como o parâmetro
/// de query `nextToken`. O valor nunca é interpretado pelo cliente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
    #[serde(default)]
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// Cursor da próxima página; string vazia conta como ausente
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_token.as_deref().filter(|token| !token.is_empty())
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor().is_some()
    }
}

impl<T: Record> Record for Page<T> {
    const NAME: &'static str = "page";

    fn validate(&self) -> Result<(), ValidationError> {
        self.records.iter().try_for_each(Record::validate)
    }
}
