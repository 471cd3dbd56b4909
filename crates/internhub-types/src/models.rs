use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Which account table a user lives in. Emails are unique per role, not globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Company,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Company => "company",
        }
    }

    /// Landing page the UI navigates to after a successful login.
    pub fn dashboard(&self) -> &'static str {
        match self {
            Role::Student => "student-dashboard.html",
            Role::Company => "company-dashboard.html",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review state of an application.
///
/// `Pending` is the state every application starts in. The three review
/// states can be set by the owning company in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Shortlisted,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Shortlisted => "Shortlisted",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub fn is_review(&self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }

    /// Parse a status a reviewer is allowed to assign. `Pending` is not one of them.
    pub fn parse_review(s: &str) -> Option<Self> {
        s.parse::<Self>().ok().filter(Self::is_review)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown application status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ApplicationStatus::Pending),
            "Shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "Accepted" => Ok(ApplicationStatus::Accepted),
            "Rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Internship {
    pub internship_id: i64,
    pub company_id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub skills_required: String,
    pub salary: String,
    pub duration: String,
    pub deadline: NaiveDate,
    pub posted_at: DateTime<Utc>,
}

/// Search result row: an internship with its owner's display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListedInternship {
    #[serde(flatten)]
    pub internship: Internship,
    pub company_name: String,
}

/// A company's own posting with the number of applications received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyInternship {
    #[serde(flatten)]
    pub internship: Internship,
    pub applicant_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Applicant {
    pub application_id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantRoster {
    #[serde(rename = "internshipTitle")]
    pub internship_title: String,
    pub applications: Vec<Applicant>,
}

/// One row of a company's inbox across all of its postings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyApplication {
    pub application_id: i64,
    pub internship_id: i64,
    pub internship_title: String,
    pub student_name: String,
    pub student_email: String,
    pub status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
}

/// An application as the applying student sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentApplication {
    pub application_id: i64,
    pub internship_id: i64,
    pub status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
    pub title: String,
    pub location: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub salary: String,
    pub duration: String,
    pub deadline: NaiveDate,
    pub company_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_name: String,
    pub email: String,
}

/// Identity fields of either account kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Profile {
    Student(StudentProfile),
    Company(CompanyProfile),
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Profile::Student(_) => Role::Student,
            Profile::Company(_) => Role::Company,
        }
    }
}
