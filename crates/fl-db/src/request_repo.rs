use crate::util::{decode_enum, encode_enum, from_rfc3339, to_rfc3339};
use fl_core::error::{HelpError, ValidationError};
use fl_core::help::HelpRepository;
use fl_core::types::{
    CreateHelpRequestInput, HelpRequest, HelpRequestId, RequestFilter, RequestStatus,
};
use rusqlite::{Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, customer_name, question, status, answer, created_at, resolved_at";

pub struct RequestRepo<'a> {
    conn: &'a Connection,
}

impl<'a> RequestRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn invalid(err: impl ToString) -> HelpError {
    HelpError::InvalidInput {
        message: err.to_string(),
    }
}

impl HelpRepository for RequestRepo<'_> {
    fn create(&self, input: CreateHelpRequestInput) -> Result<HelpRequest, HelpError> {
        let request = HelpRequest::pending(
            HelpRequestId::generate(),
            input.customer_name,
            input.question,
            chrono::Utc::now(),
        );
        self.conn
            .execute(
                "INSERT INTO help_requests (id, customer_name, question, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                (
                    request.id.as_str(),
                    &request.customer_name,
                    &request.question,
                    encode_enum(&request.status).map_err(invalid)?,
                    to_rfc3339(&request.created_at),
                ),
            )
            .map_err(invalid)?;
        Ok(request)
    }

    fn get(&self, id: &HelpRequestId) -> Result<Option<HelpRequest>, HelpError> {
        let sql = format!("SELECT {COLUMNS} FROM help_requests WHERE id = ?1");
        let raw = self
            .conn
            .query_row(&sql, [id.as_str()], RawRequest::from_row)
            .optional()
            .map_err(invalid)?;
        raw.map(RawRequest::decode).transpose()
    }

    fn list(&self, filter: &RequestFilter) -> Result<Vec<HelpRequest>, HelpError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM help_requests WHERE (?1 IS NULL OR id = ?1) AND (?2 IS NULL OR status = ?2) ORDER BY created_at DESC, rowid DESC"
        );
        let status = filter
            .status
            .as_ref()
            .map(encode_enum)
            .transpose()
            .map_err(invalid)?;
        let mut stmt = self.conn.prepare(&sql).map_err(invalid)?;
        let rows = stmt
            .query_map(
                (filter.id.as_ref().map(HelpRequestId::as_str), status),
                RawRequest::from_row,
            )
            .map_err(invalid)?;
        let mut requests = Vec::new();
        for raw in rows {
            requests.push(raw.map_err(invalid)?.decode()?);
        }
        Ok(requests)
    }

    fn resolve(&self, id: &HelpRequestId, answer: &str) -> Result<HelpRequest, HelpError> {
        let resolved_at = chrono::Utc::now();
        let changed = self
            .conn
            .execute(
                "UPDATE help_requests SET status = ?1, answer = ?2, resolved_at = ?3 WHERE id = ?4 AND status = ?5",
                (
                    encode_enum(&RequestStatus::Resolved).map_err(invalid)?,
                    answer,
                    to_rfc3339(&resolved_at),
                    id.as_str(),
                    encode_enum(&RequestStatus::Pending).map_err(invalid)?,
                ),
            )
            .map_err(invalid)?;
        let current = self.get(id)?.ok_or(HelpError::HelpNotFound)?;
        if changed == 0 {
            tracing::debug!(request_id = %id, "resolve lost to an earlier resolution");
            return Err(ValidationError::AlreadyResolved.into());
        }
        Ok(current)
    }
}

struct RawRequest {
    id: String,
    customer_name: String,
    question: String,
    status: String,
    answer: Option<String>,
    created_at: String,
    resolved_at: Option<String>,
}

impl RawRequest {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            customer_name: row.get(1)?,
            question: row.get(2)?,
            status: row.get(3)?,
            answer: row.get(4)?,
            created_at: row.get(5)?,
            resolved_at: row.get(6)?,
        })
    }

    fn decode(self) -> Result<HelpRequest, HelpError> {
        Ok(HelpRequest {
            id: HelpRequestId::new(self.id).map_err(invalid)?,
            customer_name: self.customer_name,
            question: self.question,
            status: decode_enum(&self.status).map_err(invalid)?,
            created_at: from_rfc3339(&self.created_at).map_err(invalid)?,
            resolved_at: self
                .resolved_at
                .as_deref()
                .map(from_rfc3339)
                .transpose()
                .map_err(invalid)?,
            answer: self.answer,
        })
    }
}
