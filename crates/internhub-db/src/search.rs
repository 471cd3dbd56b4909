//! Filtered listing of internships.
//!
//! A filter is folded into an ordered list of predicates, each rendered as a
//! fixed column reference plus a numbered placeholder. Filter values only
//! ever travel as bound parameters.
//!
//! SQLite's `LIKE` and `LOWER` fold ASCII only, so substring matching goes
//! through `fold`, a scalar function registered on every connection.

use internhub_types::api::InternshipFilter;
use internhub_types::models::ListedInternship;
use rusqlite::Connection;
use rusqlite::functions::FunctionFlags;
use tracing::debug;

use crate::queries::{INTERNSHIP_COLUMNS, INTERNSHIP_COLUMN_COUNT, internship_from_row};
use crate::{Database, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Unicode case-insensitive substring match.
    Contains,
    Equals,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: &'static str,
    pub op: Op,
    pub value: String,
}

/// Rendered SQL with its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub sql: String,
    pub params: Vec<String>,
}

impl Predicate {
    fn render(&self, placeholder: usize) -> String {
        match self.op {
            Op::Contains => format!("instr(fold({}), fold(?{})) > 0", self.column, placeholder),
            Op::Equals => format!("{} = ?{}", self.column, placeholder),
        }
    }
}

/// Register `fold(text)`: full Unicode lowercase, NULL passes through.
pub(crate) fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "fold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

/// Present, non-blank criteria in a fixed order.
pub fn predicates(filter: &InternshipFilter) -> Vec<Predicate> {
    let candidates = [
        ("i.title", Op::Contains, &filter.title),
        ("c.company_name", Op::Contains, &filter.company),
        ("i.skills_required", Op::Contains, &filter.skills),
        ("i.location", Op::Contains, &filter.location),
        ("i.type", Op::Equals, &filter.kind),
        ("i.salary", Op::Contains, &filter.salary),
    ];

    candidates
        .into_iter()
        .filter_map(|(column, op, value)| {
            let value = value.as_deref()?.trim();
            (!value.is_empty()).then(|| Predicate {
                column,
                op,
                value: value.to_string(),
            })
        })
        .collect()
}

impl SearchQuery {
    pub fn build(filter: &InternshipFilter) -> Self {
        let preds = predicates(filter);

        let mut sql = format!(
            "SELECT {}, c.company_name FROM internships i \
             JOIN companies c ON i.company_id = c.company_id",
            INTERNSHIP_COLUMNS
        );

        let clauses: Vec<String> = preds
            .iter()
            .enumerate()
            .map(|(idx, p)| p.render(idx + 1))
            .collect();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY i.posted_at DESC, i.internship_id DESC");

        Self {
            sql,
            params: preds.into_iter().map(|p| p.value).collect(),
        }
    }
}

impl Database {
    /// Internships matching every present criterion, newest first.
    pub fn search_internships(
        &self,
        filter: &InternshipFilter,
    ) -> Result<Vec<ListedInternship>, StoreError> {
        let query = SearchQuery::build(filter);
        debug!(params = query.params.len(), "internship search");

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&query.sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(query.params.iter()), |row| {
                    Ok(ListedInternship {
                        internship: internship_from_row(row)?,
                        company_name: row.get(INTERNSHIP_COLUMN_COUNT)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{company, db, fields};

    fn filter() -> InternshipFilter {
        InternshipFilter::default()
    }

    #[test]
    fn empty_filter_has_no_where_clause() {
        let q = SearchQuery::build(&filter());
        assert!(!q.sql.contains("WHERE"));
        assert!(q.params.is_empty());
        assert!(q.sql.ends_with("ORDER BY i.posted_at DESC, i.internship_id DESC"));
    }

    #[test]
    fn blank_values_are_skipped_and_rest_are_anded() {
        let q = SearchQuery::build(&InternshipFilter {
            title: Some("rust".into()),
            company: Some("".into()),
            location: Some("   ".into()),
            kind: Some("Internship".into()),
            ..filter()
        });

        assert!(q.sql.contains("WHERE instr(fold(i.title), fold(?1)) > 0 AND i.type = ?2"));
        assert_eq!(q.params, vec!["rust".to_string(), "Internship".to_string()]);
    }

    #[test]
    fn values_never_reach_sql_text() {
        let hostile = "x'; DROP TABLE internships; --";
        let q = SearchQuery::build(&InternshipFilter {
            company: Some(hostile.into()),
            ..filter()
        });
        assert!(!q.sql.contains("DROP"));
        assert_eq!(q.params, vec![hostile.to_string()]);
    }

    #[test]
    fn search_applies_and_semantics_case_insensitively() {
        let db = db();
        let acme = company(&db, "Acme");
        let globex = company(&db, "Globex");

        let mut rust_remote = fields("Rust Backend Intern");
        rust_remote.location = "Remote".into();
        let mut rust_berlin = fields("Rust Tooling");
        rust_berlin.location = "Berlin".into();
        rust_berlin.kind = "Full-time".into();
        let mut design = fields("Product Design");
        design.skills_required = "Figma".into();
        design.salary = "50% equity".into();

        let a = db.post_internship(acme, &rust_remote).unwrap();
        let b = db.post_internship(globex, &rust_berlin).unwrap();
        let c = db.post_internship(acme, &design).unwrap();

        let ids = |f: InternshipFilter| -> Vec<i64> {
            db.search_internships(&f)
                .unwrap()
                .into_iter()
                .map(|l| l.internship.internship_id)
                .collect()
        };

        // Newest first when unfiltered.
        assert_eq!(ids(filter()), vec![c, b, a]);

        assert_eq!(ids(InternshipFilter { title: Some("RUST".into()), ..filter() }), vec![b, a]);
        assert_eq!(
            ids(InternshipFilter {
                title: Some("rust".into()),
                company: Some("acm".into()),
                ..filter()
            }),
            vec![a]
        );
        assert_eq!(ids(InternshipFilter { kind: Some("Full-time".into()), ..filter() }), vec![b]);
        // Exact match only for type.
        assert!(ids(InternshipFilter { kind: Some("Full".into()), ..filter() }).is_empty());
        assert_eq!(ids(InternshipFilter { skills: Some("figma".into()), ..filter() }), vec![c]);
        // A literal percent sign is not a wildcard.
        assert_eq!(ids(InternshipFilter { salary: Some("50%".into()), ..filter() }), vec![c]);
        assert!(ids(InternshipFilter { salary: Some("%".into()), location: Some("Berlin".into()), ..filter() }).is_empty());
        assert!(ids(InternshipFilter { title: Some("_".into()), ..filter() }).is_empty());

        // Folding covers more than ASCII.
        let mut translator = fields("Übersetzer");
        translator.location = "München".into();
        let d = db.post_internship(globex, &translator).unwrap();
        assert_eq!(ids(InternshipFilter { title: Some("übersetzer".into()), ..filter() }), vec![d]);
        assert_eq!(ids(InternshipFilter { location: Some("MÜNCHEN".into()), ..filter() }), vec![d]);
        assert_eq!(
            ids(InternshipFilter {
                title: Some("ÜBER".into()),
                location: Some("münchen".into()),
                ..filter()
            }),
            vec![d]
        );
    }

    #[test]
    fn fold_lowercases_unicode_and_keeps_null() {
        let db = db();
        let (folded, missing): (String, Option<String>) = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT fold('ÄÖÜ Straße'), fold(NULL)", [], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?)
            })
            .unwrap();
        assert_eq!(folded, "äöü straße");
        assert_eq!(missing, None);
    }

    #[test]
    fn results_carry_company_name() {
        let db = db();
        let acme = company(&db, "Acme");
        db.post_internship(acme, &fields("Ops")).unwrap();

        let listed = db.search_internships(&filter()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].company_name, "Acme");
        assert_eq!(listed[0].internship.company_id, acme);
    }
}
