use fl_core::error::FrontloopError;
use fl_core::store::Store;
use rusqlite::Connection;

use crate::knowledge_repo::KnowledgeRepo;
use crate::request_repo::RequestRepo;

pub struct DbStore {
    conn: Connection,
}

impl DbStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn internal(err: &rusqlite::Error) -> FrontloopError {
    FrontloopError::Internal {
        message: err.to_string(),
    }
}

impl Store for DbStore {
    type Help<'a>
        = RequestRepo<'a>
    where
        Self: 'a;
    type Knowledge<'a>
        = KnowledgeRepo<'a>
    where
        Self: 'a;

    fn help(&self) -> Self::Help<'_> {
        RequestRepo::new(&self.conn)
    }

    fn knowledge(&self) -> Self::Knowledge<'_> {
        KnowledgeRepo::new(&self.conn)
    }

    fn with_tx<F, T>(&self, f: F) -> Result<T, FrontloopError>
    where
        F: FnOnce(&Self) -> Result<T, FrontloopError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|err| internal(&err))?;
        match f(self) {
            Ok(value) => {
                self.conn
                    .execute_batch("COMMIT")
                    .map_err(|err| internal(&err))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.conn.execute_batch("ROLLBACK") {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}
