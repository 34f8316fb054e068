use serde::{Deserialize, Serialize};

/// Account role as issued by the login endpoint.
///
/// The backend may grow new roles before the client does, so anything
/// unrecognized deserializes to `Unknown` instead of failing the whole
/// login response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Faculty,
    Student,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Faculty => "FACULTY",
            Role::Student => "STUDENT",
            Role::Unknown => "UNKNOWN",
        }
    }
}

/// A navigation target. Workflows return destinations instead of
/// performing page redirects themselves; the caller decides how to act
/// on one (a browser shell navigates, the CLI prints it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Login,
    Home,
    AdminDashboard,
    FacultyDashboard,
    StudentDashboard,
    ClubForm,
}

impl Destination {
    /// Role-based landing page after login. Unknown roles fall back to
    /// the public home page rather than erroring.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Destination::AdminDashboard,
            Role::Faculty => Destination::FacultyDashboard,
            Role::Student => Destination::StudentDashboard,
            Role::Unknown => Destination::Home,
        }
    }

    /// Stable page path for this destination.
    pub fn page(&self) -> &'static str {
        match self {
            Destination::Login => "login.html",
            Destination::Home => "index.html",
            Destination::AdminDashboard => "admin_db.html",
            Destination::FacultyDashboard => "clubofficialdashboard.html",
            Destination::StudentDashboard => "student_db.html",
            Destination::ClubForm => "club_form.html",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_maps_to_a_distinct_dashboard() {
        assert_eq!(Destination::for_role(Role::Admin), Destination::AdminDashboard);
        assert_eq!(Destination::for_role(Role::Faculty), Destination::FacultyDashboard);
        assert_eq!(Destination::for_role(Role::Student), Destination::StudentDashboard);
        assert_eq!(Destination::for_role(Role::Unknown), Destination::Home);
    }

    #[test]
    fn unknown_role_deserializes_without_error() {
        let role: Role = serde_json::from_str("\"SUPERVISOR\"").unwrap();
        assert_eq!(role, Role::Unknown);
        let role: Role = serde_json::from_str("\"FACULTY\"").unwrap();
        assert_eq!(role, Role::Faculty);
    }
}
