use std::{future::Future, sync::Arc, time::Duration};

use sqlx::{
    Database, Error, IntoArguments, PgPool, Postgres,
    postgres::{PgPoolOptions, PgRow},
};
use tokio::{
    runtime::{Handle, Runtime},
    task::block_in_place,
};

use crate::{FilingError, Result};

/// Blocking facade over a sqlx pool, driven by the engine's runtime.
///
/// Collections are synchronous, so every call parks the current thread on the
/// runtime. Inside a runtime worker the call goes through `block_in_place`,
/// which requires the multi-threaded runtime the engine builds.
#[derive(Debug, Clone)]
pub struct SynClient {
    pool: PgPool,

    runtime: Arc<Runtime>,
}

impl SynClient {
    pub fn connect(
        db_url: &str,
        runtime: Arc<Runtime>,
    ) -> Result<Self> {
        let connect = async move { PgPoolOptions::new().acquire_timeout(Duration::from_secs(5)).max_connections(200).connect(db_url).await };
        let pool = Self::block_on(&runtime, connect).map_err(|e| FilingError::Store(format!("failed to connect to DB {}: {}", db_url, e)))?;

        Ok(Self {
            pool,
            runtime,
        })
    }

    fn block_on<F: Future>(
        runtime: &Runtime,
        fut: F,
    ) -> F::Output {
        if Handle::try_current().is_ok() {
            block_in_place(|| runtime.block_on(fut))
        } else {
            runtime.block_on(fut)
        }
    }

    pub fn query_one<'q, A>(
        &self,
        sql: &'q str,
        params: A,
    ) -> std::result::Result<PgRow, Error>
    where
        A: IntoArguments<'q, Postgres> + 'q,
    {
        Self::block_on(&self.runtime, async move {
            let mut conn = self.pool.acquire().await?;

            sqlx::query_with(sql, params).fetch_one(&mut *conn).await
        })
    }

    pub fn query<'q, A>(
        &self,
        sql: &'q str,
        params: A,
    ) -> std::result::Result<Vec<PgRow>, Error>
    where
        A: IntoArguments<'q, Postgres> + 'q,
    {
        Self::block_on(&self.runtime, async move {
            let mut conn = self.pool.acquire().await?;

            sqlx::query_with(sql, params).fetch_all(&mut *conn).await
        })
    }

    pub fn execute<'q, A>(
        &self,
        sql: &'q str,
        params: A,
    ) -> std::result::Result<<Postgres as Database>::QueryResult, Error>
    where
        A: IntoArguments<'q, Postgres> + 'q,
    {
        Self::block_on(&self.runtime, async move {
            let mut conn = self.pool.acquire().await?;

            sqlx::query_with(sql, params).execute(&mut *conn).await
        })
    }

    pub fn batch_execute(
        &self,
        sqls: &[String],
    ) -> std::result::Result<(), Error> {
        Self::block_on(&self.runtime, async move {
            let mut tx = self.pool.begin().await?;

            for sql in sqls {
                sqlx::query(sql).execute(&mut *tx).await?;
            }
            tx.commit().await
        })
    }
}
