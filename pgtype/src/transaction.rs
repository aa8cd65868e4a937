//! The [`Transaction`] type.
use std::io;

use crate::{
    Result,
    common::{span, unit_error, verbose},
    large_object::{self, LargeObjects},
    postgres::{
        BackendProtocol, FrontendProtocol,
        backend::{CommandComplete, ReadyForQuery},
        frontend::Query,
    },
    transport::{PgTransport, PgTransportExt},
};

unit_error! {
    /// `COMMIT` of a failed transaction, the server rolled it back instead.
    pub struct CommitRolledBack("transaction was rolled back by the server");
}

/// Begin a transaction.
pub async fn begin<IO: PgTransport>(mut io: IO) -> Result<Transaction<IO>> {
    // no transaction to roll back until `BEGIN` succeeds
    simple(&mut io, "BEGIN").await?;
    verbose!("transaction begin");
    Ok(Transaction { io, finished: false })
}

/// Run a statement without result rows.
async fn simple<IO: PgTransport>(io: &mut IO, sql: &'static str) -> Result<CommandComplete> {
    io.request(Query { sql }).await?;
    let complete = match io.recv::<CommandComplete>().await {
        Ok(ok) => ok,
        Err(err) => {
            io.ready_request();
            return Err(err);
        }
    };
    io.recv::<ReadyForQuery>().await?;
    Ok(complete)
}

/// An RAII implementation of transaction scope.
///
/// To begin a transaction, use [`begin`] function.
///
/// To commit transaction, use [`Transaction::commit`].
///
/// If not commited, when this structure is dropped, transaction will be rolled back.
///
/// Large objects can only be used inside a transaction, see
/// [`Transaction::large_objects`].
///
/// # Example
///
/// ```no_run
/// # async fn test(conn: &mut impl pgtype::transport::PgTransport) -> pgtype::Result<()> {
/// let mut tx = pgtype::begin(conn).await?;
///
/// let mut lo = tx.large_objects();
/// let oid = lo.create(0).await?;
///
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```
pub struct Transaction<IO: PgTransport> {
    io: IO,
    finished: bool,
}

impl<IO> Transaction<IO>
where
    IO: PgTransport
{
    /// Commit transaction.
    ///
    /// Commit of a transaction which had an error returns [`CommitRolledBack`],
    /// the server rolled it back.
    pub async fn commit(mut self) -> Result<()> {
        self.finished = true;
        let complete = simple(&mut self.io, "COMMIT").await?;
        if complete.tag == "ROLLBACK" {
            #[cfg(feature = "log")]
            log::warn!("commit of failed transaction is rolled back");
            return Err(CommitRolledBack.into());
        }
        verbose!("transaction commit");
        Ok(())
    }

    /// Rollback transaction.
    pub async fn rollback(mut self) -> Result<()> {
        self.finished = true;
        simple(&mut self.io, "ROLLBACK").await?;
        verbose!("transaction rollback");
        Ok(())
    }

    /// Large object interface of this transaction with default [`Config`][large_object::Config].
    pub fn large_objects(&mut self) -> LargeObjects<'_, IO> {
        LargeObjects::new(self, large_object::Config::default())
    }

    /// Large object interface of this transaction.
    pub fn large_objects_with(&mut self, config: large_object::Config) -> LargeObjects<'_, IO> {
        LargeObjects::new(self, config)
    }
}

impl<IO> Drop for Transaction<IO>
where
    IO: PgTransport
{
    fn drop(&mut self) {
        if !self.finished {
            span!("transaction drop");
            #[cfg(feature = "log")]
            log::warn!("transaction dropped without commit, rolling back");
            verbose!("implicit rollback");
            self.io.send(Query { sql: "ROLLBACK" });
            self.io.ready_request();
        }
    }
}

impl<IO> PgTransport for Transaction<IO>
where
    IO: PgTransport
{
    fn poll_flush(&mut self, cx: &mut std::task::Context) -> std::task::Poll<io::Result<()>> {
        IO::poll_flush(&mut self.io, cx)
    }

    fn poll_recv<B: BackendProtocol>(&mut self, cx: &mut std::task::Context) -> std::task::Poll<Result<B>> {
        IO::poll_recv(&mut self.io, cx)
    }

    fn ready_request(&mut self) {
        IO::ready_request(&mut self.io)
    }

    fn send<F: FrontendProtocol>(&mut self, message: F) {
        IO::send(&mut self.io, message)
    }
}
