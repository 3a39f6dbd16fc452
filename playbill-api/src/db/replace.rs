//! Delete-then-rebuild transaction driver
//!
//! Every write request replaces an entity's nested collections wholesale
//! inside one transaction. The driver starts in [`DeletePhase`], where
//! validation reads and detach operations run; [`ReplaceDriver::build`]
//! moves it into [`BuildPhase`], the only phase that can create edges and
//! the only one that can commit. Dropping a driver rolls back.

use playbill_common::Result;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::marker::PhantomData;

/// Validation reads and removal of the previous state
#[derive(Debug)]
pub struct DeletePhase;

/// Recreation of the submitted state
#[derive(Debug)]
pub struct BuildPhase;

pub struct ReplaceDriver<P> {
    tx: Transaction<'static, Sqlite>,
    _phase: PhantomData<P>,
}

impl<P> ReplaceDriver<P> {
    /// Connection inside the transaction, for reads
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    /// Abandon all changes
    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

impl ReplaceDriver<DeletePhase> {
    pub async fn begin(pool: &SqlitePool) -> Result<Self> {
        Ok(Self {
            tx: pool.begin().await?,
            _phase: PhantomData,
        })
    }

    pub fn build(self) -> ReplaceDriver<BuildPhase> {
        ReplaceDriver {
            tx: self.tx,
            _phase: PhantomData,
        }
    }
}

impl ReplaceDriver<BuildPhase> {
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
