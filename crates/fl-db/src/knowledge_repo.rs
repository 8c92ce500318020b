use crate::util::{from_rfc3339, to_rfc3339};
use fl_core::error::KnowledgeError;
use fl_core::knowledge::{KnowledgeRepository, normalize_question};
use fl_core::types::KnowledgeEntry;
use rusqlite::{Connection, OptionalExtension};

pub struct KnowledgeRepo<'a> {
    conn: &'a Connection,
}

impl<'a> KnowledgeRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn invalid(err: impl ToString) -> KnowledgeError {
    KnowledgeError::InvalidInput {
        message: err.to_string(),
    }
}

impl KnowledgeRepository for KnowledgeRepo<'_> {
    fn add(&self, question: &str, answer: &str) -> Result<KnowledgeEntry, KnowledgeError> {
        let entry = KnowledgeEntry {
            question: normalize_question(question),
            answer: answer.trim().to_string(),
            updated_at: chrono::Utc::now(),
        };
        self.conn
            .execute(
                "INSERT INTO knowledge_base (question, answer, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(question) DO UPDATE SET answer = excluded.answer, updated_at = excluded.updated_at",
                (&entry.question, &entry.answer, to_rfc3339(&entry.updated_at)),
            )
            .map_err(invalid)?;
        Ok(entry)
    }

    fn get_answer(&self, question: &str) -> Result<Option<String>, KnowledgeError> {
        self.conn
            .query_row(
                "SELECT answer FROM knowledge_base WHERE question = ?1",
                [normalize_question(question)],
                |row| row.get(0),
            )
            .optional()
            .map_err(invalid)
    }

    fn list(&self) -> Result<Vec<KnowledgeEntry>, KnowledgeError> {
        let mut stmt = self
            .conn
            .prepare("SELECT question, answer, updated_at FROM knowledge_base ORDER BY question")
            .map_err(invalid)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(invalid)?;
        let mut entries = Vec::new();
        for row in rows {
            let (question, answer, updated_at) = row.map_err(invalid)?;
            entries.push(KnowledgeEntry {
                question,
                answer,
                updated_at: from_rfc3339(&updated_at).map_err(invalid)?,
            });
        }
        Ok(entries)
    }
}
