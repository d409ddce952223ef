//! Role-tagged user profiles.
//!
//! Every portal user is exactly one of the variants of [`UserProfile`]; the
//! serialized form carries a `role` tag so requests can be routed by role.

use serde::{Deserialize, Serialize};

/// Fields shared by every profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileIdentity {
    /// Unique identifier of the user.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
}

/// A portal user, tagged by role.
///
/// # Example
///
/// ```
/// use erp_engine::models::{UserProfile, UserRole};
///
/// let json = r#"{
///     "role": "student",
///     "id": "stu_001",
///     "name": "Asha Rao",
///     "email": "asha@example.edu",
///     "roll_number": "21CS042",
///     "department_id": "cse",
///     "semester": 5
/// }"#;
///
/// let profile: UserProfile = serde_json::from_str(json).unwrap();
/// assert_eq!(profile.role(), UserRole::Student);
/// assert_eq!(profile.id(), "stu_001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum UserProfile {
    /// An enrolled student.
    Student {
        /// Shared identity fields.
        #[serde(flatten)]
        identity: ProfileIdentity,
        /// University roll number.
        roll_number: String,
        /// Home department.
        department_id: String,
        /// Current semester.
        semester: u8,
    },
    /// A teaching staff member.
    Faculty {
        /// Shared identity fields.
        #[serde(flatten)]
        identity: ProfileIdentity,
        /// Home department.
        department_id: String,
        /// Academic designation (e.g., "Associate Professor").
        designation: String,
    },
    /// A system administrator.
    Admin {
        /// Shared identity fields.
        #[serde(flatten)]
        identity: ProfileIdentity,
    },
    /// A non-teaching employee.
    Employee {
        /// Shared identity fields.
        #[serde(flatten)]
        identity: ProfileIdentity,
        /// Office or section the employee works in.
        section: String,
    },
    /// The head of the institution.
    Principal {
        /// Shared identity fields.
        #[serde(flatten)]
        identity: ProfileIdentity,
    },
    /// A finance office member.
    Finance {
        /// Shared identity fields.
        #[serde(flatten)]
        identity: ProfileIdentity,
    },
}

/// The role a profile is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// See [`UserProfile::Student`].
    Student,
    /// See [`UserProfile::Faculty`].
    Faculty,
    /// See [`UserProfile::Admin`].
    Admin,
    /// See [`UserProfile::Employee`].
    Employee,
    /// See [`UserProfile::Principal`].
    Principal,
    /// See [`UserProfile::Finance`].
    Finance,
}

impl UserProfile {
    /// Returns the shared identity of the profile.
    pub fn identity(&self) -> &ProfileIdentity {
        match self {
            UserProfile::Student { identity, .. }
            | UserProfile::Faculty { identity, .. }
            | UserProfile::Admin { identity }
            | UserProfile::Employee { identity, .. }
            | UserProfile::Principal { identity }
            | UserProfile::Finance { identity } => identity,
        }
    }

    /// Returns the user ID.
    pub fn id(&self) -> &str {
        &self.identity().id
    }

    /// Returns the role tag.
    pub fn role(&self) -> UserRole {
        match self {
            UserProfile::Student { .. } => UserRole::Student,
            UserProfile::Faculty { .. } => UserRole::Faculty,
            UserProfile::Admin { .. } => UserRole::Admin,
            UserProfile::Employee { .. } => UserRole::Employee,
            UserProfile::Principal { .. } => UserRole::Principal,
            UserProfile::Finance { .. } => UserRole::Finance,
        }
    }

    /// Returns the department of students and faculty.
    pub fn department_id(&self) -> Option<&str> {
        match self {
            UserProfile::Student { department_id, .. }
            | UserProfile::Faculty { department_id, .. } => Some(department_id),
            _ => None,
        }
    }
}
