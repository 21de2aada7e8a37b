use crate::api::{AchievementQuery, ClientError, PageRequest};
use crate::auth::{dashboard_for, Role};
use crate::core::context::AppContext;
use crate::schemas::achievement::Achievement;
use crate::schemas::report::Statistics;
use crate::workflow::AchievementStatus;

use super::{Notice, ViewCore};

const RECENT_LIMIT: usize = 5;
const SAMPLE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub draft: u64,
    pub submitted: u64,
    pub verified: u64,
    pub rejected: u64,
}

impl StatusCounts {
    pub fn from_achievements(items: &[Achievement]) -> Self {
        items.iter().fold(Self::default(), |mut counts, item| {
            match item.status {
                AchievementStatus::Draft => counts.draft += 1,
                AchievementStatus::Submitted => counts.submitted += 1,
                AchievementStatus::Verified => counts.verified += 1,
                AchievementStatus::Rejected => counts.rejected += 1,
                AchievementStatus::Deleted => {}
            }
            counts
        })
    }

    pub fn from_statistics(stats: &Statistics) -> Self {
        Self {
            draft: stats.count(AchievementStatus::Draft),
            submitted: stats.count(AchievementStatus::Submitted),
            verified: stats.count(AchievementStatus::Verified),
            rejected: stats.count(AchievementStatus::Rejected),
        }
    }

    pub fn total(&self) -> u64 {
        self.draft + self.submitted + self.verified + self.rejected
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub role: Role,
    pub counts: StatusCounts,
    /// Newest first.
    pub recent: Vec<Achievement>,
    pub advisees: Option<usize>,
    pub students: Option<u64>,
    pub lecturers: Option<u64>,
}

impl DashboardSummary {
    fn empty(role: Role) -> Self {
        Self { role, counts: StatusCounts::default(), recent: Vec::new(), advisees: None, students: None, lecturers: None }
    }
}

/// The role home page: status counts plus the latest activity.
pub struct DashboardView {
    core: ViewCore<DashboardSummary>,
}

impl DashboardView {
    pub async fn mount(ctx: &AppContext) -> Result<Self, ClientError> {
        let session = ctx.snapshot();
        let page = dashboard_for(&session);
        let role = session.user().map(|user| user.role).unwrap_or(Role::Student);
        let view = Self { core: ViewCore::mount("dashboard", page, ctx, DashboardSummary::empty(role))? };
        view.load().await?;
        Ok(view)
    }

    pub async fn load(&self) -> Result<(), ClientError> {
        let ticket = self.core.begin();
        let role = self.core.read(|summary| summary.role);
        let api = self.core.ctx().api();
        let sample = PageRequest::first(SAMPLE_LIMIT);

        let result = match role {
            Role::Admin => api.statistics().await.map(|stats| DashboardSummary {
                counts: StatusCounts::from_statistics(&stats),
                students: Some(stats.students),
                lecturers: Some(stats.lecturers),
                ..DashboardSummary::empty(role)
            }),
            Role::Student => api.list_achievements(AchievementQuery::new(sample)).await.map(|listing| {
                DashboardSummary {
                    counts: StatusCounts::from_achievements(&listing.items),
                    recent: recent(listing.items),
                    ..DashboardSummary::empty(role)
                }
            }),
            Role::Lecturer => {
                let query = AchievementQuery::new(sample);
                let (achievements, advisees) = tokio::join!(api.advisee_achievements(query), api.my_advisees());
                achievements.and_then(|listing| {
                    Ok(DashboardSummary {
                        counts: StatusCounts::from_achievements(&listing.items),
                        advisees: Some(advisees?.len()),
                        recent: recent(listing.items),
                        ..DashboardSummary::empty(role)
                    })
                })
            }
        };

        self.core.apply(ticket, result, |summary, loaded| *summary = loaded)?;
        Ok(())
    }

    pub fn summary(&self) -> DashboardSummary {
        self.core.read(|summary| summary.clone())
    }

    pub fn notice(&self) -> Option<Notice> {
        self.core.notice()
    }

    pub fn dismiss_notice(&self) {
        self.core.dismiss_notice();
    }

    pub fn close(&self) {
        self.core.close();
    }
}

/// RFC 3339 timestamps order lexically.
fn recent(mut items: Vec<Achievement>) -> Vec<Achievement> {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items.truncate(RECENT_LIMIT);
    items
}
