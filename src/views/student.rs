use crate::api::{AchievementQuery, ClientError, FileUpload, PageRequest, Paginated};
use crate::auth::Page;
use crate::core::context::AppContext;
use crate::schemas::achievement::{Achievement, AchievementDraft, AchievementHistory};
use crate::workflow::{available_actions, transition, Action, Actor, Relation};

use super::{Notice, ViewCore};

struct StudentState {
    request: PageRequest,
    listing: Paginated<Achievement>,
}

/// The student's own achievements: author, edit, submit.
pub struct StudentAchievementsView {
    core: ViewCore<StudentState>,
}

impl StudentAchievementsView {
    pub async fn mount(ctx: &AppContext) -> Result<Self, ClientError> {
        let state = StudentState {
            request: PageRequest::first(ctx.page_size()),
            listing: Paginated::default(),
        };
        let view = Self {
            core: ViewCore::mount("student_achievements", Page::StudentAchievements, ctx, state)?,
        };
        view.load().await?;
        Ok(view)
    }

    /// Every record in this view belongs to the logged-in student.
    fn actor(&self) -> Result<Actor, ClientError> {
        Ok(Actor::new(self.core.user()?.role, Relation::Owner))
    }

    pub async fn load(&self) -> Result<(), ClientError> {
        let ticket = self.core.begin();
        let request = self.core.read(|state| state.request);
        let result = self.core.ctx().api().list_achievements(AchievementQuery::new(request)).await;
        self.core.apply(ticket, result, |state, listing| state.listing = listing)?;
        Ok(())
    }

    pub async fn go_to_page(&self, page: u32) -> Result<(), ClientError> {
        self.core.write(|state| state.request = PageRequest::new(page, state.request.limit));
        self.load().await
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        self.core.read(|state| state.listing.items.clone())
    }

    pub fn total(&self) -> u64 {
        self.core.read(|state| state.listing.total)
    }

    pub fn find(&self, id: &str) -> Option<Achievement> {
        self.core.read(|state| state.listing.items.iter().find(|item| item.matches_id(id)).cloned())
    }

    /// Controls to offer for a listed record.
    pub fn actions_for(&self, id: &str) -> Vec<Action> {
        match (self.actor(), self.find(id)) {
            (Ok(actor), Some(achievement)) => available_actions(actor, achievement.status),
            _ => Vec::new(),
        }
    }

    pub async fn create(&self, draft: &AchievementDraft) -> Result<(), ClientError> {
        let actor = self.actor()?;
        transition(actor, Action::Create, None).map_err(|err| self.core.fail(err.into()))?;

        let envelope = self
            .core
            .ctx()
            .api()
            .create_achievement(draft)
            .await
            .map_err(|err| self.core.fail(err))?;
        self.core.succeed(&envelope, "Achievement created");
        self.load().await
    }

    pub async fn edit(&self, id: &str, draft: &AchievementDraft) -> Result<(), ClientError> {
        let target = self.checked(id, Action::Edit)?;
        let envelope = self
            .core
            .ctx()
            .api()
            .update_achievement(target.api_id(), draft)
            .await
            .map_err(|err| self.core.fail(err))?;
        self.core.succeed(&envelope, "Achievement updated");
        self.load().await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let target = self.checked(id, Action::Delete)?;
        let envelope = self
            .core
            .ctx()
            .api()
            .delete_achievement(target.api_id())
            .await
            .map_err(|err| self.core.fail(err))?;
        self.core.succeed(&envelope, "Achievement deleted");
        self.load().await
    }

    pub async fn submit(&self, id: &str) -> Result<(), ClientError> {
        let target = self.checked(id, Action::Submit)?;
        let envelope = self
            .core
            .ctx()
            .api()
            .submit_achievement(target.api_id())
            .await
            .map_err(|err| self.core.fail(err))?;
        self.core.succeed(&envelope, "Achievement submitted for verification");
        self.load().await
    }

    /// Attaching files counts as editing the record.
    pub async fn upload_attachment(&self, id: &str, file: FileUpload) -> Result<(), ClientError> {
        let target = self.checked(id, Action::Edit)?;
        let envelope = self
            .core
            .ctx()
            .api()
            .upload_attachment(target.api_id(), file)
            .await
            .map_err(|err| self.core.fail(err))?;
        self.core.succeed(&envelope, "Attachment uploaded");
        self.load().await
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

    /// Finds the listed record and runs the workflow rules for `action` on it.
    fn checked(&self, id: &str, action: Action) -> Result<Achievement, ClientError> {
        let actor = self.actor()?;
        let target = self.find(id);
        transition(actor, action, target.as_ref().map(|item| item.status))
            .map_err(|err| self.core.fail(err.into()))?;
        target.ok_or_else(|| self.core.fail(ClientError::Validation(format!("Achievement {id} is not listed"))))
    }
}
