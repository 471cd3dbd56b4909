//! Student and company accounts.
//!
//! Both kinds share one shape of operations; [`Role`] picks the table with
//! fixed SQL per variant. Duplicate emails are rejected by each table's
//! unique constraint, so the same address may exist once per role.

use internhub_types::models::{CompanyProfile, Profile, Role, StudentProfile};
use rusqlite::Connection;
use tracing::info;

use crate::models::CredentialRow;
use crate::queries::{OptionalExt, expect_affected};
use crate::{Database, StoreError};

impl Database {
    pub fn create_student(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, StoreError> {
        let id = self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO students (first_name, last_name, email, password) VALUES (?1, ?2, ?3, ?4)",
                (first_name, last_name, email, password_hash),
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        info!(student_id = id, "student registered");
        Ok(id)
    }

    pub fn create_company(&self, company_name: &str, email: &str, password_hash: &str) -> Result<i64, StoreError> {
        let id = self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO companies (company_name, email, password) VALUES (?1, ?2, ?3)",
                (company_name, email, password_hash),
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        info!(company_id = id, "company registered");
        Ok(id)
    }

    pub fn credentials_by_email(&self, role: Role, email: &str) -> Result<Option<CredentialRow>, StoreError> {
        let sql = match role {
            Role::Student => "SELECT student_id, email, password FROM students WHERE email = ?1",
            Role::Company => "SELECT company_id, email, password FROM companies WHERE email = ?1",
        };
        self.with_conn(|conn| query_credentials(conn, sql, email))
    }

    pub fn credentials_by_id(&self, role: Role, id: i64) -> Result<Option<CredentialRow>, StoreError> {
        let sql = match role {
            Role::Student => "SELECT student_id, email, password FROM students WHERE student_id = ?1",
            Role::Company => "SELECT company_id, email, password FROM companies WHERE company_id = ?1",
        };
        self.with_conn(|conn| query_credentials(conn, sql, id))
    }

    pub fn get_profile(&self, role: Role, id: i64) -> Result<Option<Profile>, StoreError> {
        self.with_conn(|conn| match role {
            Role::Student => conn
                .query_row(
                    "SELECT first_name, last_name, email FROM students WHERE student_id = ?1",
                    [id],
                    |row| {
                        Ok(Profile::Student(StudentProfile {
                            first_name: row.get(0)?,
                            last_name: row.get(1)?,
                            email: row.get(2)?,
                        }))
                    },
                )
                .optional(),
            Role::Company => conn
                .query_row(
                    "SELECT company_name, email FROM companies WHERE company_id = ?1",
                    [id],
                    |row| {
                        Ok(Profile::Company(CompanyProfile {
                            company_name: row.get(0)?,
                            email: row.get(1)?,
                        }))
                    },
                )
                .optional(),
        })
    }

    /// Overwrite identity fields. The variant decides which table is addressed.
    pub fn update_profile(&self, id: i64, profile: &Profile) -> Result<(), StoreError> {
        let role = profile.role();
        self.with_conn_mut(|conn| {
            let rows = match profile {
                Profile::Student(p) => conn.execute(
                    "UPDATE students SET first_name = ?1, last_name = ?2, email = ?3 WHERE student_id = ?4",
                    rusqlite::params![p.first_name, p.last_name, p.email, id],
                )?,
                Profile::Company(p) => conn.execute(
                    "UPDATE companies SET company_name = ?1, email = ?2 WHERE company_id = ?3",
                    rusqlite::params![p.company_name, p.email, id],
                )?,
            };
            expect_affected(rows, role.as_str())
        })?;

        info!(user_id = id, %role, "account updated");
        Ok(())
    }

    pub fn update_password(&self, role: Role, id: i64, password_hash: &str) -> Result<(), StoreError> {
        let sql = match role {
            Role::Student => "UPDATE students SET password = ?1 WHERE student_id = ?2",
            Role::Company => "UPDATE companies SET password = ?1 WHERE company_id = ?2",
        };
        self.with_conn_mut(|conn| {
            let rows = conn.execute(sql, rusqlite::params![password_hash, id])?;
            expect_affected(rows, role.as_str())
        })?;

        info!(user_id = id, %role, "password changed");
        Ok(())
    }
}

fn query_credentials<P: rusqlite::ToSql>(
    conn: &Connection,
    sql: &str,
    key: P,
) -> Result<Option<CredentialRow>, StoreError> {
    conn.query_row(sql, [key], |row| {
        Ok(CredentialRow {
            id: row.get(0)?,
            email: row.get(1)?,
            password: row.get(2)?,
        })
    })
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::db;

    #[test]
    fn email_is_unique_per_role_only() {
        let db = db();
        db.create_student("Ada", "Lovelace", "ada@x.test", "h1").unwrap();

        let dup = db.create_student("Ada", "Again", "ada@x.test", "h2").unwrap_err();
        assert!(matches!(dup, StoreError::Conflict(_)), "{dup:?}");

        // The other role's table has its own constraint.
        db.create_company("Ada Corp", "ada@x.test", "h3").unwrap();
        let dup = db.create_company("Ada Two", "ada@x.test", "h4").unwrap_err();
        assert!(matches!(dup, StoreError::Conflict(_)), "{dup:?}");
    }

    #[test]
    fn credentials_lookup_is_scoped_by_role() {
        let db = db();
        let s = db.create_student("Ada", "Lovelace", "ada@x.test", "student-hash").unwrap();
        let c = db.create_company("Acme", "ada@x.test", "company-hash").unwrap();

        let student = db.credentials_by_email(Role::Student, "ada@x.test").unwrap().unwrap();
        let company = db.credentials_by_email(Role::Company, "ada@x.test").unwrap().unwrap();
        assert_eq!((student.id, student.password.as_str()), (s, "student-hash"));
        assert_eq!((company.id, company.password.as_str()), (c, "company-hash"));

        assert!(db.credentials_by_email(Role::Student, "nobody@x.test").unwrap().is_none());
        assert_eq!(db.credentials_by_id(Role::Company, c).unwrap().unwrap().email, "ada@x.test");
    }

    #[test]
    fn profile_read_and_overwrite() {
        let db = db();
        let s = db.create_student("Ada", "Lovelace", "ada@x.test", "h").unwrap();

        let updated = Profile::Student(StudentProfile {
            first_name: "Augusta".into(),
            last_name: "King".into(),
            email: "augusta@x.test".into(),
        });
        db.update_profile(s, &updated).unwrap();
        assert_eq!(db.get_profile(Role::Student, s).unwrap(), Some(updated));

        // Same id, other role: nothing there.
        assert_eq!(db.get_profile(Role::Company, s).unwrap(), None);
        let missing = Profile::Company(CompanyProfile {
            company_name: "Ghost".into(),
            email: "ghost@x.test".into(),
        });
        let err = db.update_profile(s, &missing).unwrap_err();
        assert!(matches!(err, StoreError::NotFound("company")));
    }

    #[test]
    fn profile_update_to_taken_email_conflicts() {
        let db = db();
        db.create_company("Acme", "hr@acme.test", "h").unwrap();
        let other = db.create_company("Globex", "hr@globex.test", "h").unwrap();

        let err = db
            .update_profile(
                other,
                &Profile::Company(CompanyProfile {
                    company_name: "Globex".into(),
                    email: "hr@acme.test".into(),
                }),
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn password_overwrite() {
        let db = db();
        let c = db.create_company("Acme", "hr@acme.test", "old").unwrap();
        db.update_password(Role::Company, c, "new").unwrap();
        assert_eq!(db.credentials_by_id(Role::Company, c).unwrap().unwrap().password, "new");

        let err = db.update_password(Role::Student, 999, "x").unwrap_err();
        assert!(matches!(err, StoreError::NotFound("student")));
    }
}
