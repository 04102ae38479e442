//! Dedicated writer actor. SQLite allows a single writer at a time; every
//! mutation is funneled through one thread, and each job runs inside its own
//! transaction so a domain write and its outbox append commit or roll back
//! together.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::error;
use tokio::sync::{mpsc, oneshot};

use liftlog_core::errors::{DatabaseError, Error, Result};

type WriteJob = Box<dyn FnOnce(&mut SqliteConnection) + Send + 'static>;

enum TxError {
    Diesel(diesel::result::Error),
    App(Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Diesel(err)
    }
}

#[derive(Clone)]
pub struct WriteHandle {
    sender: mpsc::UnboundedSender<WriteJob>,
}

impl WriteHandle {
    /// Runs a closure on the writer thread inside one transaction. Commits
    /// when the closure returns `Ok`, rolls back on `Err`.
    pub async fn exec<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let wrapped: WriteJob = Box::new(move |conn| {
            let result = conn
                .transaction::<T, TxError, _>(|conn| job(conn).map_err(TxError::App))
                .map_err(|err| match err {
                    TxError::App(err) => err,
                    TxError::Diesel(err) => {
                        Error::Database(DatabaseError::QueryFailed(err.to_string()))
                    }
                });
            let _ = reply_tx.send(result);
        });

        self.sender.send(wrapped).map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Writer actor is no longer running".to_string(),
            ))
        })?;
        reply_rx.await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Writer actor dropped the job".to_string(),
            ))
        })?
    }
}

/// Spawns the writer thread. Jobs execute strictly in submission order.
pub fn spawn_writer(pool: Pool<ConnectionManager<SqliteConnection>>) -> WriteHandle {
    let (sender, mut receiver) = mpsc::unbounded_channel::<WriteJob>();
    std::thread::spawn(move || {
        while let Some(job) = receiver.blocking_recv() {
            match pool.get() {
                Ok(mut conn) => job(&mut conn),
                Err(err) => error!("Writer actor could not acquire a connection: {err}"),
            }
        }
    });
    WriteHandle { sender }
}
