use internhub_types::api::InternshipFields;
use internhub_types::models::{CompanyInternship, Internship};
use rusqlite::Connection;
use tracing::{error, info};

use crate::applications::delete_for_internship;
use crate::queries::{
    INTERNSHIP_COLUMNS, INTERNSHIP_COLUMN_COUNT, OptionalExt, expect_affected, internship_from_row,
};
use crate::{Cascade, Database, StoreError};

impl Database {
    /// Insert a posting owned by `company_id`. Returns the new internship id.
    pub fn post_internship(&self, company_id: i64, fields: &InternshipFields) -> Result<i64, StoreError> {
        let id = self
            .with_conn_mut(|conn| {
                conn.execute(
                    "INSERT INTO internships
                        (company_id, title, description, location, type, skills_required, salary, duration, deadline)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    rusqlite::params![
                        company_id,
                        fields.title,
                        fields.description,
                        fields.location,
                        fields.kind,
                        fields.skills_required,
                        fields.salary,
                        fields.duration,
                        fields.deadline.to_string(),
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .map_err(|e| match e {
                StoreError::NotFound(_) => StoreError::NotFound("company"),
                other => other,
            })?;

        info!(internship_id = id, company_id, "internship posted");
        Ok(id)
    }

    /// Overwrite every mutable attribute of a posting.
    pub fn update_internship(&self, internship_id: i64, fields: &InternshipFields) -> Result<(), StoreError> {
        self.with_conn_mut(|conn| {
            let rows = conn.execute(
                "UPDATE internships
                 SET title = ?1, description = ?2, location = ?3, type = ?4,
                     skills_required = ?5, salary = ?6, duration = ?7, deadline = ?8
                 WHERE internship_id = ?9",
                rusqlite::params![
                    fields.title,
                    fields.description,
                    fields.location,
                    fields.kind,
                    fields.skills_required,
                    fields.salary,
                    fields.duration,
                    fields.deadline.to_string(),
                    internship_id,
                ],
            )?;
            expect_affected(rows, "internship")
        })
    }

    /// Delete a posting and its applications, children first.
    /// Returns how many applications were removed with it.
    pub fn delete_internship(&self, internship_id: i64) -> Result<usize, StoreError> {
        let cascade = self.cascade;
        let removed = self.with_conn_mut(|conn| match cascade {
            Cascade::Atomic => {
                let tx = conn.transaction()?;
                let removed = delete_with_children(&tx, internship_id)?;
                tx.commit()?;
                Ok(removed)
            }
            Cascade::Sequential => delete_with_children(conn, internship_id),
        })?;

        info!(internship_id, applications = removed, ?cascade, "internship deleted");
        Ok(removed)
    }

    pub fn get_internship(&self, internship_id: i64) -> Result<Option<Internship>, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {} FROM internships i WHERE i.internship_id = ?1",
                    INTERNSHIP_COLUMNS
                ),
                [internship_id],
                internship_from_row,
            )
            .optional()
        })
    }

    /// A company's postings with applicant counts, newest first. Postings
    /// without applications report a count of zero.
    pub fn list_for_company(&self, company_id: i64) -> Result<Vec<CompanyInternship>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {}, COUNT(a.application_id)
                 FROM internships i
                 LEFT JOIN applications a ON a.internship_id = i.internship_id
                 WHERE i.company_id = ?1
                 GROUP BY i.internship_id
                 ORDER BY i.posted_at DESC, i.internship_id DESC",
                INTERNSHIP_COLUMNS
            ))?;

            let rows = stmt
                .query_map([company_id], |row| {
                    Ok(CompanyInternship {
                        internship: internship_from_row(row)?,
                        applicant_count: row.get(INTERNSHIP_COLUMN_COUNT)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

/// Children first; a failure there returns before the parent row is touched.
/// Either failure is a plain storage error, whatever SQLite reported.
fn delete_with_children(conn: &Connection, internship_id: i64) -> Result<usize, StoreError> {
    let removed = delete_for_internship(conn, internship_id).map_err(|e| {
        error!(internship_id, "failed to delete applications: {}", e);
        StoreError::Sqlite(e)
    })?;

    let rows = conn
        .execute(
            "DELETE FROM internships WHERE internship_id = ?1",
            [internship_id],
        )
        .map_err(|e| {
            error!(internship_id, "failed to delete internship: {}", e);
            StoreError::Sqlite(e)
        })?;
    expect_affected(rows, "internship")?;

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{company, db, fields, student};

    fn internship_count(db: &Database, id: i64) -> i64 {
        db.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM internships WHERE internship_id = ?1",
                [id],
                |r| r.get(0),
            )?)
        })
        .unwrap()
    }

    fn application_count(db: &Database, id: i64) -> i64 {
        db.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM applications WHERE internship_id = ?1",
                [id],
                |r| r.get(0),
            )?)
        })
        .unwrap()
    }

    fn fail_on_delete(db: &Database, table: &str) {
        db.with_conn_mut(|conn| {
            conn.execute_batch(&format!(
                "CREATE TRIGGER block_{table} BEFORE DELETE ON {table}
                 BEGIN SELECT RAISE(ABORT, 'blocked'); END;"
            ))?;
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn post_and_fetch_round_trip_fields() {
        let db = db();
        let c = company(&db, "Acme");
        let id = db.post_internship(c, &fields("Backend")).unwrap();

        let got = db.get_internship(id).unwrap().unwrap();
        assert_eq!(got.company_id, c);
        assert_eq!(got.title, "Backend");
        assert_eq!(got.deadline.to_string(), "2025-06-01");
        assert!(db.get_internship(id + 1).unwrap().is_none());
    }

    #[test]
    fn post_for_unknown_company_is_not_found() {
        let db = db();
        let err = db.post_internship(77, &fields("Orphan")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound("company")), "{err:?}");
    }

    #[test]
    fn update_overwrites_and_reports_missing() {
        let db = db();
        let c = company(&db, "Acme");
        let id = db.post_internship(c, &fields("Backend")).unwrap();

        let mut changed = fields("Platform");
        changed.salary = "negotiable".into();
        db.update_internship(id, &changed).unwrap();

        let got = db.get_internship(id).unwrap().unwrap();
        assert_eq!(got.title, "Platform");
        assert_eq!(got.salary, "negotiable");

        let err = db.update_internship(id + 100, &changed).unwrap_err();
        assert!(matches!(err, StoreError::NotFound("internship")));
    }

    #[test]
    fn company_listing_counts_applicants_including_zero() {
        let db = db();
        let c = company(&db, "Acme");
        let busy = db.post_internship(c, &fields("Busy")).unwrap();
        let quiet = db.post_internship(c, &fields("Quiet")).unwrap();
        db.apply(busy, student(&db, "Ada")).unwrap();
        db.apply(busy, student(&db, "Bob")).unwrap();

        let listed = db.list_for_company(c).unwrap();
        let counts: Vec<_> = listed
            .iter()
            .map(|l| (l.internship.internship_id, l.applicant_count))
            .collect();
        assert_eq!(counts, vec![(quiet, 0), (busy, 2)]);
    }

    #[test]
    fn delete_removes_applications_then_internship() {
        let db = db();
        let c = company(&db, "Acme");
        let i = db.post_internship(c, &fields("Backend")).unwrap();
        db.apply(i, student(&db, "Ada")).unwrap();
        db.apply(i, student(&db, "Bob")).unwrap();

        assert_eq!(db.delete_internship(i).unwrap(), 2);
        assert_eq!(internship_count(&db, i), 0);
        assert_eq!(application_count(&db, i), 0);
        assert!(matches!(
            db.applicants_for_internship(i).unwrap_err(),
            StoreError::NotFound("internship")
        ));

        let again = db.delete_internship(i).unwrap_err();
        assert!(matches!(again, StoreError::NotFound("internship")));
    }

    #[test]
    fn failed_child_delete_leaves_parent_in_place() {
        for cascade in [Cascade::Atomic, Cascade::Sequential] {
            let db = db().with_cascade(cascade);
            let c = company(&db, "Acme");
            let i = db.post_internship(c, &fields("Backend")).unwrap();
            db.apply(i, student(&db, "Ada")).unwrap();
            fail_on_delete(&db, "applications");

            let err = db.delete_internship(i).unwrap_err();
            assert!(matches!(err, StoreError::Sqlite(_)), "{err:?}");
            assert_eq!(internship_count(&db, i), 1, "{cascade:?}");
            assert_eq!(application_count(&db, i), 1, "{cascade:?}");
        }
    }

    #[test]
    fn failed_parent_delete_rolls_back_only_when_atomic() {
        let atomic = db();
        let c = company(&atomic, "Acme");
        let i = atomic.post_internship(c, &fields("Backend")).unwrap();
        atomic.apply(i, student(&atomic, "Ada")).unwrap();
        fail_on_delete(&atomic, "internships");

        let err = atomic.delete_internship(i).unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)), "{err:?}");
        assert_eq!(application_count(&atomic, i), 1);

        let sequential = db().with_cascade(Cascade::Sequential);
        let c = company(&sequential, "Acme");
        let i = sequential.post_internship(c, &fields("Backend")).unwrap();
        sequential.apply(i, student(&sequential, "Ada")).unwrap();
        fail_on_delete(&sequential, "internships");

        let err = sequential.delete_internship(i).unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)), "{err:?}");
        assert_eq!(internship_count(&sequential, i), 1);
        assert_eq!(application_count(&sequential, i), 0);
    }

    #[test]
    fn end_to_end_company_scenario() {
        use internhub_types::models::ApplicationStatus;

        let db = db();
        let c = company(&db, "Acme");
        let i = db.post_internship(c, &fields("Backend")).unwrap();
        let count = |db: &Database| db.list_for_company(c).unwrap().first().map(|l| l.applicant_count);

        let s1 = student(&db, "Ada");
        let a1 = db.apply(i, s1).unwrap();
        assert_eq!(count(&db), Some(1));

        db.apply(i, student(&db, "Bob")).unwrap();
        assert_eq!(count(&db), Some(2));

        db.set_status(a1, ApplicationStatus::Accepted).unwrap();
        db.delete_internship(i).unwrap();

        assert_eq!(application_count(&db, i), 0);
        assert!(db.list_for_company(c).unwrap().is_empty());
        assert!(db.applications_for_student(s1).unwrap().is_empty());
    }
}
