use rusqlite::Connection;
use tracing::info;

use crate::StoreError;

pub fn run(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE students (
                student_id  INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name  TEXT NOT NULL,
                last_name   TEXT NOT NULL,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE companies (
                company_id    INTEGER PRIMARY KEY AUTOINCREMENT,
                company_name  TEXT NOT NULL,
                email         TEXT NOT NULL UNIQUE,
                password      TEXT NOT NULL,
                created_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE internships (
                internship_id    INTEGER PRIMARY KEY AUTOINCREMENT,
                company_id       INTEGER NOT NULL REFERENCES companies(company_id),
                title            TEXT NOT NULL,
                description      TEXT NOT NULL,
                location         TEXT NOT NULL,
                type             TEXT NOT NULL,
                skills_required  TEXT NOT NULL,
                salary           TEXT NOT NULL,
                duration         TEXT NOT NULL,
                deadline         TEXT NOT NULL,
                posted_at        TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX idx_internships_company
                ON internships(company_id, posted_at);

            CREATE TABLE applications (
                application_id    INTEGER PRIMARY KEY AUTOINCREMENT,
                internship_id     INTEGER NOT NULL REFERENCES internships(internship_id),
                student_id        INTEGER NOT NULL REFERENCES students(student_id),
                status            TEXT NOT NULL DEFAULT 'Pending'
                    CHECK (status IN ('Pending', 'Shortlisted', 'Accepted', 'Rejected')),
                application_date  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                UNIQUE(internship_id, student_id)
            );

            CREATE INDEX idx_applications_student
                ON applications(student_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
