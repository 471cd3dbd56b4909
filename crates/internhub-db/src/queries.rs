use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use internhub_types::models::{ApplicationStatus, Internship};
use rusqlite::Row;
use rusqlite::types::Type;

use crate::StoreError;

/// Column list matching [`internship_from_row`], for an `internships i` alias.
pub(crate) const INTERNSHIP_COLUMNS: &str = "i.internship_id, i.company_id, i.title, i.description, i.location, \
     i.type, i.skills_required, i.salary, i.duration, i.deadline, i.posted_at";

pub(crate) const INTERNSHIP_COLUMN_COUNT: usize = 11;

pub(crate) fn internship_from_row(row: &Row) -> rusqlite::Result<Internship> {
    Ok(Internship {
        internship_id: row.get(0)?,
        company_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        location: row.get(4)?,
        kind: row.get(5)?,
        skills_required: row.get(6)?,
        salary: row.get(7)?,
        duration: row.get(8)?,
        deadline: date_at(row, 9)?,
        posted_at: timestamp_at(row, 10)?,
    })
}

/// Store timestamps are RFC 3339 with milliseconds; older rows may carry
/// SQLite's `datetime('now')` shape without a zone.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    raw.parse::<DateTime<Utc>>().or_else(|_| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
    })
}

pub(crate) fn timestamp_at(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn date_at(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn status_at(row: &Row, idx: usize) -> rusqlite::Result<ApplicationStatus> {
    let raw: String = row.get(idx)?;
    raw.parse::<ApplicationStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, StoreError>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, StoreError> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Turn a zero affected-row count into `NotFound`.
pub(crate) fn expect_affected(rows: usize, what: &'static str) -> Result<(), StoreError> {
    if rows == 0 {
        Err(StoreError::NotFound(what))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_timestamp_shapes() {
        let rfc = parse_timestamp("2025-03-04T05:06:07.891Z").unwrap();
        let legacy = parse_timestamp("2025-03-04 05:06:07").unwrap();
        assert_eq!(rfc.timestamp(), legacy.timestamp());
        assert_eq!(rfc.timestamp_subsec_millis(), 891);
        assert!(parse_timestamp("yesterday").is_err());
    }
}
