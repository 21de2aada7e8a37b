use crate::api::{AchievementQuery, ClientError, PageRequest, Paginated};
use crate::auth::{Page, Role};
use crate::core::context::AppContext;
use crate::schemas::achievement::{Achievement, AchievementHistory, RejectRequest, VerifyRequest};
use crate::workflow::{available_actions, transition, AchievementStatus, Action, Actor, Relation};

use super::{Notice, ViewCore};

struct ReviewState {
    request: PageRequest,
    status: Option<AchievementStatus>,
    listing: Paginated<Achievement>,
}

/// Verification queue. Lecturers see their advisees' achievements; admins see every
/// achievement. Both start filtered to submitted ones.
pub struct ReviewView {
    core: ViewCore<ReviewState>,
    role: Role,
}

impl ReviewView {
    pub async fn mount(ctx: &AppContext) -> Result<Self, ClientError> {
        let role = ctx.current_user().map(|user| user.role);
        let page = match role {
            Some(Role::Admin) => Page::AdminAchievements,
            _ => Page::LecturerAchievements,
        };
        let state = ReviewState {
            request: PageRequest::first(ctx.page_size()),
            status: Some(AchievementStatus::Submitted),
            listing: Paginated::default(),
        };
        let core = ViewCore::mount("review", page, ctx, state)?;
        let view = Self { core, role: role.unwrap_or(Role::Lecturer) };
        view.load().await?;
        Ok(view)
    }

    /// Lecturers only ever list advisee records; admins may review anything.
    fn actor(&self) -> Actor {
        let relation = match self.role {
            Role::Lecturer => Relation::Advisor,
            _ => Relation::Unrelated,
        };
        Actor::new(self.role, relation)
    }

    pub async fn load(&self) -> Result<(), ClientError> {
        let ticket = self.core.begin();
        let (request, status) = self.core.read(|state| (state.request, state.status));
        let api = self.core.ctx().api();

        let query = AchievementQuery::new(request).with_status(status);
        let result = match self.role {
            Role::Admin => api.list_achievements(query).await,
            _ => api.advisee_achievements(query).await,
        };

        self.core.apply(ticket, result, |state, listing| state.listing = listing)?;
        Ok(())
    }

    pub async fn set_status_filter(&self, status: Option<AchievementStatus>) -> Result<(), ClientError> {
        self.core.write(|state| {
            state.status = status;
            state.request = PageRequest::first(state.request.limit);
        });
        self.load().await
    }

    pub fn status_filter(&self) -> Option<AchievementStatus> {
        self.core.read(|state| state.status)
    }

    pub async fn go_to_page(&self, page: u32) -> Result<(), ClientError> {
        self.core.write(|state| state.request = PageRequest::new(page, state.request.limit));
        self.load().await
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        self.core.read(|state| state.listing.items.clone())
    }

    pub fn find(&self, id: &str) -> Option<Achievement> {
        self.core.read(|state| state.listing.items.iter().find(|item| item.matches_id(id)).cloned())
    }

    pub fn actions_for(&self, id: &str) -> Vec<Action> {
        self.find(id).map(|item| available_actions(self.actor(), item.status)).unwrap_or_default()
    }

    pub async fn verify(&self, id: &str, comments: &str) -> Result<(), ClientError> {
        let target = self.checked(id, Action::Verify).await?;
        let request = VerifyRequest { comments: comments.trim().to_string() };
        let envelope = self
            .core
            .ctx()
            .api()
            .verify_achievement(target.api_id(), &request)
            .await
            .map_err(|err| self.core.fail(err))?;
        self.core.succeed(&envelope, "Achievement verified");
        self.load().await
    }

    /// The reason is required; a blank one is refused before anything is sent.
    pub async fn reject(&self, id: &str, reason: &str) -> Result<(), ClientError> {
        let request = RejectRequest::new(reason).ok_or_else(|| {
            self.core.fail(ClientError::Validation("Please provide a reason for rejection".to_string()))
        })?;
        let target = self.checked(id, Action::Reject).await?;
        let envelope = self
            .core
            .ctx()
            .api()
            .reject_achievement(target.api_id(), &request)
            .await
            .map_err(|err| self.core.fail(err))?;
        self.core.succeed(&envelope, "Achievement rejected");
        self.load().await
    }

    pub async fn detail(&self, id: &str) -> Result<Achievement, ClientError> {
        let api_id = self.find(id).map(|item| item.api_id().to_string()).unwrap_or_else(|| id.to_string());
        self.core.ctx().api().achievement(&api_id).await.map_err(|err| self.core.fail(err))
    }

    pub async fn history(&self, id: &str) -> Result<AchievementHistory, ClientError> {
        let api_id = self.find(id).map(|item| item.api_id().to_string()).unwrap_or_else(|| id.to_string());
        self.core.ctx().api().achievement_history(&api_id).await.map_err(|err| self.core.fail(err))
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

    /// Resolves the record (listed, else fetched) and runs the workflow rules on it.
    async fn checked(&self, id: &str, action: Action) -> Result<Achievement, ClientError> {
        let target = match self.find(id) {
            Some(target) => target,
            None => self.core.ctx().api().achievement(id).await.map_err(|err| self.core.fail(err))?,
        };
        transition(self.actor(), action, Some(target.status)).map_err(|err| self.core.fail(err.into()))?;
        Ok(target)
    }
}
