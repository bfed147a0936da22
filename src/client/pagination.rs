//! Percorre coleções paginadas seguindo o cursor `next_token`
//!
//! Os streams são preguiçosos: nenhuma requisição é feita até que o consumidor peça um
//! registro além dos que já estão em memória. Um erro é emitido uma única vez e encerra
//! o stream. Cada stream mantém o cliente emprestado mutavelmente enquanto existir.

use chrono::{DateTime, Utc};
use futures_util::stream::{self, Stream};
use tracing::debug;

use crate::error::WhoopResult;
use crate::models::{Cycle, Recovery, Sleep, WorkoutV2};

use super::api::{Collection, Cycles, Recoveries, Sleeps, WhoopClient, Workouts};
use super::params::{CollectionParams, MAX_LIMIT};

/// Tamanho de página usado pelos iteradores
pub const DEFAULT_PAGE_SIZE: u32 = MAX_LIMIT;

struct Walk<'a, C: Collection> {
    client: &'a mut WhoopClient,
    params: CollectionParams,
    buffered: std::vec::IntoIter<C::Record>,
    exhausted: bool,
    pages: usize,
}

impl<'a, C: Collection> Walk<'a, C> {
    /// Próximo registro, buscando uma nova página quando o buffer esvazia
    async fn advance(mut self) -> WhoopResult<Option<(C::Record, Self)>> {
        loop {
            if let Some(record) = self.buffered.next() {
                return Ok(Some((record, self)));
            }
            if self.exhausted {
                debug!("Paginação de {} concluída em {} página(s)", C::PATH, self.pages);
                return Ok(None);
            }

            let page = self.client.fetch_page::<C>(&self.params).await?;
            self.pages += 1;

            // Uma página vazia com cursor continua a caminhada
            match page.next_cursor().map(str::to_string) {
                Some(cursor) => self.params.next_token = Some(cursor),
                None => self.exhausted = true,
            }
            self.buffered = page.records.into_iter();
        }
    }
}

impl WhoopClient {
    /// Stream de todos os registros da coleção `C`, página por página
    ///
    /// O cursor de `params` é ignorado: toda caminhada começa do início.
    pub fn iterate<C>(
        &mut self,
        params: CollectionParams,
    ) -> impl Stream<Item = WhoopResult<C::Record>> + '_
    where
        C: Collection + 'static,
    {
        let walk = Walk::<C> {
            client: self,
            params: CollectionParams {
                next_token: None,
                ..params
            },
            buffered: Vec::new().into_iter(),
            exhausted: false,
            pages: 0,
        };

        stream::try_unfold(walk, Walk::advance)
    }

    pub fn iterate_cycles(
        &mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        page_size: Option<u32>,
    ) -> impl Stream<Item = WhoopResult<Cycle>> + '_ {
        self.iterate::<Cycles>(walk_params(start, end, page_size))
    }

    pub fn iterate_sleeps(
        &mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        page_size: Option<u32>,
    ) -> impl Stream<Item = WhoopResult<Sleep>> + '_ {
        self.iterate::<Sleeps>(walk_params(start, end, page_size))
    }

    pub fn iterate_recoveries(
        &mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        page_size: Option<u32>,
    ) -> impl Stream<Item = WhoopResult<Recovery>> + '_ {
        self.iterate::<Recoveries>(walk_params(start, end, page_size))
    }

    pub fn iterate_workouts(
        &mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        page_size: Option<u32>,
    ) -> impl Stream<Item = WhoopResult<WorkoutV2>> + '_ {
        self.iterate::<Workouts>(walk_params(start, end, page_size))
    }
}

fn walk_params(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    page_size: Option<u32>,
) -> CollectionParams {
    CollectionParams {
        limit: page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        start,
        end,
        next_token: None,
    }
}
