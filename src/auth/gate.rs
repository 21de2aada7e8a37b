use super::Role;
use crate::session::Session;

/// Every navigable page of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Login,
    Register,
    Unauthorized,
    NotFound,
    AdminDashboard,
    AdminUsers,
    AdminAdvisors,
    AdminDeletedUsers,
    AdminReports,
    AdminAchievements,
    StudentDashboard,
    StudentAchievements,
    LecturerDashboard,
    LecturerAchievements,
    LecturerAdvisees,
}

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const STUDENT_ONLY: &[Role] = &[Role::Student];
const LECTURER_ONLY: &[Role] = &[Role::Lecturer];

impl Page {
    pub const ALL: [Page; 15] = [
        Page::Login,
        Page::Register,
        Page::Unauthorized,
        Page::NotFound,
        Page::AdminDashboard,
        Page::AdminUsers,
        Page::AdminAdvisors,
        Page::AdminDeletedUsers,
        Page::AdminReports,
        Page::AdminAchievements,
        Page::StudentDashboard,
        Page::StudentAchievements,
        Page::LecturerDashboard,
        Page::LecturerAchievements,
        Page::LecturerAdvisees,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Unauthorized => "/unauthorized",
            Self::NotFound => "/404",
            Self::AdminDashboard => "/admin/dashboard",
            Self::AdminUsers => "/admin/users",
            Self::AdminAdvisors => "/admin/advisors",
            Self::AdminDeletedUsers => "/admin/deleted-users",
            Self::AdminReports => "/admin/reports",
            Self::AdminAchievements => "/admin/achievements",
            Self::StudentDashboard => "/student/dashboard",
            Self::StudentAchievements => "/student/achievements",
            Self::LecturerDashboard => "/lecturer/dashboard",
            Self::LecturerAchievements => "/lecturer/achievements",
            Self::LecturerAdvisees => "/lecturer/advisees",
        }
    }

    /// Roles allowed to open the page; `None` marks a public page.
    pub fn allowed_roles(self) -> Option<&'static [Role]> {
        match self {
            Self::Login | Self::Register | Self::Unauthorized | Self::NotFound => None,
            Self::AdminDashboard
            | Self::AdminUsers
            | Self::AdminAdvisors
            | Self::AdminDeletedUsers
            | Self::AdminReports
            | Self::AdminAchievements => Some(ADMIN_ONLY),
            Self::StudentDashboard | Self::StudentAchievements => Some(STUDENT_ONLY),
            Self::LecturerDashboard | Self::LecturerAchievements | Self::LecturerAdvisees => {
                Some(LECTURER_ONLY)
            }
        }
    }

    pub fn is_public(self) -> bool {
        self.allowed_roles().is_none()
    }

    fn from_exact_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.path() == path)
    }
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow(Page),
    /// No session: go to the login page.
    RedirectToLogin,
    /// A session exists but its role may not see the page.
    RedirectToUnauthorized,
    /// Role-home redirect for `/` and `/dashboard`.
    RedirectTo(Page),
}

impl GateDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow(_))
    }

    /// The page that ends up rendered.
    pub fn target(self) -> Page {
        match self {
            Self::Allow(page) | Self::RedirectTo(page) => page,
            Self::RedirectToLogin => Page::Login,
            Self::RedirectToUnauthorized => Page::Unauthorized,
        }
    }
}

/// Decides whether `session` may open `page`.
pub fn authorize(page: Page, session: &Session) -> GateDecision {
    let Some(allowed) = page.allowed_roles() else {
        return GateDecision::Allow(page);
    };

    let Some(user) = session.user() else {
        tracing::info!(page = page.path(), "navigation denied: no session");
        return GateDecision::RedirectToLogin;
    };

    if allowed.contains(&user.role) {
        GateDecision::Allow(page)
    } else {
        tracing::info!(
            page = page.path(),
            user_id = %user.id,
            role = %user.role,
            "navigation denied: role not allowed"
        );
        GateDecision::RedirectToUnauthorized
    }
}

/// The home dashboard of the session's role, or the login page without a session.
pub fn dashboard_for(session: &Session) -> Page {
    match session.user().map(|user| user.role) {
        Some(Role::Admin) => Page::AdminDashboard,
        Some(Role::Student) => Page::StudentDashboard,
        Some(Role::Lecturer) => Page::LecturerDashboard,
        None => Page::Login,
    }
}

/// Resolves a raw path to a gate decision, including the role-home redirects.
pub fn navigate(path: &str, session: &Session) -> GateDecision {
    let normalized = match path.trim().trim_end_matches('/') {
        "" => "/",
        other => other,
    };

    match normalized {
        "/" | "/dashboard" => GateDecision::RedirectTo(dashboard_for(session)),
        other => authorize(Page::from_exact_path(other).unwrap_or(Page::NotFound), session),
    }
}
