use chrono::{DateTime, SecondsFormat, Utc};

/// Quantidade de registros por página quando nada é informado
pub const DEFAULT_LIMIT: u32 = 10;
/// Maior página aceita pela API
pub const MAX_LIMIT: u32 = 25;

/// Filtros e cursor de uma consulta de coleção
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionParams {
    pub limit: u32,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub next_token: Option<String>,
}

impl Default for CollectionParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            start: None,
            end: None,
            next_token: None,
        }
    }
}

impl CollectionParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }

    /// Limite efetivamente enviado, nunca acima de [`MAX_LIMIT`]
    pub fn effective_limit(&self) -> u32 {
        self.limit.min(MAX_LIMIT)
    }

    /// Parâmetros de query na ordem `limit`, `start`, `end`, `nextToken`
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("limit", self.effective_limit().to_string())];

        if let Some(start) = self.start {
            query.push(("start", format_instant(start)));
        }
        if let Some(end) = self.end {
            query.push(("end", format_instant(end)));
        }
        if let Some(token) = self.next_token.as_deref().filter(|t| !t.is_empty()) {
            query.push(("nextToken", token.to_string()));
        }

        query
    }
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
