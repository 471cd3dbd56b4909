//! Application lifecycle: apply, review, withdraw, and removal with the
//! parent internship.
//!
//! Uniqueness of (internship, student) is enforced by the schema. Apply
//! never reads before writing, so concurrent duplicates race inside SQLite
//! and the loser comes back as [`StoreError::Conflict`].

use internhub_types::models::{
    Applicant, ApplicantRoster, ApplicationStatus, CompanyApplication, StudentApplication,
};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::queries::{OptionalExt, date_at, expect_affected, status_at, timestamp_at};
use crate::{Database, StoreError};

impl Database {
    /// Create a `Pending` application. Returns the new application id.
    pub fn apply(&self, internship_id: i64, student_id: i64) -> Result<i64, StoreError> {
        let id = self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO applications (internship_id, student_id) VALUES (?1, ?2)",
                [internship_id, student_id],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        info!(application_id = id, internship_id, student_id, "application created");
        Ok(id)
    }

    /// Move an application into one of the review states. The date is untouched.
    pub fn set_status(
        &self,
        application_id: i64,
        status: ApplicationStatus,
    ) -> Result<(), StoreError> {
        if !status.is_review() {
            warn!(application_id, %status, "refusing non-review status");
            return Err(StoreError::Invalid(format!(
                "status must be one of Shortlisted, Accepted, Rejected; got {}",
                status
            )));
        }

        self.with_conn_mut(|conn| {
            let rows = conn.execute(
                "UPDATE applications SET status = ?1 WHERE application_id = ?2",
                rusqlite::params![status.as_str(), application_id],
            )?;
            expect_affected(rows, "application")
        })?;

        info!(application_id, %status, "application status changed");
        Ok(())
    }

    /// Remove a student's own application.
    pub fn withdraw(&self, internship_id: i64, student_id: i64) -> Result<(), StoreError> {
        self.with_conn_mut(|conn| {
            let rows = conn.execute(
                "DELETE FROM applications WHERE internship_id = ?1 AND student_id = ?2",
                [internship_id, student_id],
            )?;
            expect_affected(rows, "application")
        })?;

        info!(internship_id, student_id, "application withdrawn");
        Ok(())
    }

    pub fn get_status(&self, application_id: i64) -> Result<Option<ApplicationStatus>, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT status FROM applications WHERE application_id = ?1",
                [application_id],
                |row| status_at(row, 0),
            )
            .optional()
        })
    }

    /// Title of the internship plus everyone who applied, newest first.
    pub fn applicants_for_internship(&self, internship_id: i64) -> Result<ApplicantRoster, StoreError> {
        self.with_conn(|conn| {
            let title: String = conn
                .query_row(
                    "SELECT title FROM internships WHERE internship_id = ?1",
                    [internship_id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or(StoreError::NotFound("internship"))?;

            let mut stmt = conn.prepare(
                "SELECT a.application_id, s.student_id, s.first_name, s.last_name, s.email,
                        a.status, a.application_date
                 FROM applications a
                 JOIN students s ON a.student_id = s.student_id
                 WHERE a.internship_id = ?1
                 ORDER BY a.application_date DESC, a.application_id DESC",
            )?;

            let applications = stmt
                .query_map([internship_id], |row| {
                    let first: String = row.get(2)?;
                    let last: String = row.get(3)?;
                    Ok(Applicant {
                        application_id: row.get(0)?,
                        student_id: row.get(1)?,
                        student_name: format!("{} {}", first, last),
                        student_email: row.get(4)?,
                        status: status_at(row, 5)?,
                        application_date: timestamp_at(row, 6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(ApplicantRoster {
                internship_title: title,
                applications,
            })
        })
    }

    /// Every application across a company's postings, newest first.
    pub fn applications_for_company(&self, company_id: i64) -> Result<Vec<CompanyApplication>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT a.application_id, i.internship_id, i.title,
                        s.first_name, s.last_name, s.email, a.status, a.application_date
                 FROM applications a
                 JOIN students s ON a.student_id = s.student_id
                 JOIN internships i ON a.internship_id = i.internship_id
                 WHERE i.company_id = ?1
                 ORDER BY a.application_date DESC, a.application_id DESC",
            )?;

            let rows = stmt
                .query_map([company_id], |row| {
                    let first: String = row.get(3)?;
                    let last: String = row.get(4)?;
                    Ok(CompanyApplication {
                        application_id: row.get(0)?,
                        internship_id: row.get(1)?,
                        internship_title: row.get(2)?,
                        student_name: format!("{} {}", first, last),
                        student_email: row.get(5)?,
                        status: status_at(row, 6)?,
                        application_date: timestamp_at(row, 7)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// A student's applications with the internship and company they target.
    pub fn applications_for_student(&self, student_id: i64) -> Result<Vec<StudentApplication>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT a.application_id, a.internship_id, a.status, a.application_date,
                        i.title, i.location, i.type, i.salary, i.duration, i.deadline,
                        c.company_name
                 FROM applications a
                 JOIN internships i ON a.internship_id = i.internship_id
                 JOIN companies c ON i.company_id = c.company_id
                 WHERE a.student_id = ?1
                 ORDER BY a.application_id",
            )?;

            let rows = stmt
                .query_map([student_id], |row| {
                    Ok(StudentApplication {
                        application_id: row.get(0)?,
                        internship_id: row.get(1)?,
                        status: status_at(row, 2)?,
                        application_date: timestamp_at(row, 3)?,
                        title: row.get(4)?,
                        location: row.get(5)?,
                        kind: row.get(6)?,
                        salary: row.get(7)?,
                        duration: row.get(8)?,
                        deadline: date_at(row, 9)?,
                        company_name: row.get(10)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

pub(crate) fn delete_for_internship(conn: &Connection, internship_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM applications WHERE internship_id = ?1",
        [internship_id],
    )
}
