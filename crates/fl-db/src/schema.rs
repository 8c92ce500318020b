use rusqlite::{Connection, Result};

pub fn open(path: &str) -> Result<Connection> {
    let conn = Connection::open(path)?;
    configure(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;
    Ok(())
}

/// Idempotent; safe to run on every open.
pub fn migrate(conn: &Connection) -> Result<()> {
    let sql = include_str!("../migrations/0001_init.sql");
    conn.execute_batch(sql)?;
    Ok(())
}

pub fn open_and_migrate(path: &str) -> Result<Connection> {
    let conn = open(path)?;
    migrate(&conn)?;
    Ok(conn)
}

pub fn with_test_db() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    migrate(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_seeds_known_answers_once() {
        let conn = with_test_db().expect("db");
        migrate(&conn).expect("second run is a no-op");
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM knowledge_base", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 3);
    }

    #[test]
    fn resolution_invariant_is_enforced_by_the_table() {
        let conn = with_test_db().expect("db");
        let insert = |status: &str, answer: Option<&str>, resolved_at: Option<&str>| {
            conn.execute(
                "INSERT INTO help_requests (id, customer_name, question, status, answer, created_at, resolved_at) \
                 VALUES ('r1', 'Dana', 'q', ?1, ?2, '2025-03-01T10:00:00+00:00', ?3)",
                rusqlite::params![status, answer, resolved_at],
            )
        };
        let at = Some("2025-03-01T10:05:00+00:00");

        assert!(insert("resolved", Some("a"), None).is_err());
        assert!(insert("resolved", None, at).is_err());
        assert!(insert("resolved", None, None).is_err());
        assert!(insert("pending", Some("a"), None).is_err());
        assert!(insert("pending", None, at).is_err());
        assert!(insert("resolved", Some("a"), at).is_ok());
    }

    #[test]
    fn pending_rows_carry_no_resolution() {
        let conn = with_test_db().expect("db");
        conn.execute(
            "INSERT INTO help_requests (id, customer_name, question, status, created_at) VALUES ('r2', 'Dana', 'q', 'pending', '2025-03-01T10:00:00+00:00')",
            [],
        )
        .expect("pending row without answer is valid");
    }
}
