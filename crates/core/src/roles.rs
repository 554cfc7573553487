//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_users_and_roles.sql`.

pub const ROLE_STUDENT: &str = "estudiante";
pub const ROLE_TUTOR: &str = "tutor";
pub const ROLE_DIRECTOR: &str = "director";
pub const ROLE_COORDINATOR: &str = "coordinador";

/// Roles allowed to browse every proposal.
pub const REVIEWER_ROLES: &[&str] = &[ROLE_DIRECTOR, ROLE_COORDINATOR, ROLE_TUTOR];

/// Roles allowed to grade a progress report.
pub const GRADER_ROLES: &[&str] = &[ROLE_TUTOR, ROLE_DIRECTOR];

/// Semester recorded for a newly registered student.
pub const DEFAULT_STUDENT_SEMESTER: i32 = 7;

/// True if any of `held` appears in `allowed`.
pub fn has_any_role<S: AsRef<str>>(held: &[S], allowed: &[&str]) -> bool {
    held.iter().any(|r| allowed.contains(&r.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn director_is_a_reviewer_and_a_grader() {
        let held = vec![ROLE_DIRECTOR.to_string()];
        assert!(has_any_role(&held, REVIEWER_ROLES));
        assert!(has_any_role(&held, GRADER_ROLES));
    }

    #[test]
    fn coordinator_reviews_but_does_not_grade() {
        let held = [ROLE_COORDINATOR];
        assert!(has_any_role(&held, REVIEWER_ROLES));
        assert!(!has_any_role(&held, GRADER_ROLES));
    }

    #[test]
    fn student_holds_no_staff_capability() {
        let held = [ROLE_STUDENT];
        assert!(!has_any_role(&held, REVIEWER_ROLES));
        assert!(!has_any_role(&held, GRADER_ROLES));
    }

    #[test]
    fn empty_role_list_matches_nothing() {
        let held: [&str; 0] = [];
        assert!(!has_any_role(&held, REVIEWER_ROLES));
        assert!(!has_any_role(&held, GRADER_ROLES));
    }
}
