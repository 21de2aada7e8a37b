use crate::api::{ClientError, PageRequest, Paginated};
use crate::auth::{Page, Role};
use crate::core::context::AppContext;
use crate::schemas::user::{AssignRole, RoleRecord, User, UserCreate, UserUpdate};

use super::{Notice, ViewCore};

struct UsersState {
    request: PageRequest,
    listing: Paginated<User>,
    roles: Vec<RoleRecord>,
}

impl UsersState {
    fn new(limit: u32) -> Self {
        Self { request: PageRequest::first(limit), listing: Paginated::default(), roles: Vec::new() }
    }

    fn contains(&self, id: &str) -> bool {
        self.listing.items.iter().any(|user| user.id == id)
    }
}

/// Admin management of active accounts.
pub struct UsersView {
    core: ViewCore<UsersState>,
}

impl UsersView {
    pub async fn mount(ctx: &AppContext) -> Result<Self, ClientError> {
        let core = ViewCore::mount("users", Page::AdminUsers, ctx, UsersState::new(ctx.page_size()))?;
        let view = Self { core };
        view.load().await?;
        Ok(view)
    }

    pub async fn load(&self) -> Result<(), ClientError> {
        let ticket = self.core.begin();
        let request = self.core.read(|state| state.request);
        let result = self.core.ctx().api().list_users(request).await;
        self.core.apply(ticket, result, |state, listing| state.listing = listing)?;
        Ok(())
    }

    pub async fn go_to_page(&self, page: u32) -> Result<(), ClientError> {
        self.core.write(|state| state.request = PageRequest::new(page, state.request.limit));
        self.load().await
    }

    pub fn users(&self) -> Vec<User> {
        self.core.read(|state| state.listing.items.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.core.read(|state| state.contains(id))
    }

    pub fn total(&self) -> u64 {
        self.core.read(|state| state.listing.total)
    }

    pub async fn create(&self, request: &UserCreate) -> Result<(), ClientError> {
        let envelope =
            self.core.ctx().api().create_user(request).await.map_err(|err| self.core.fail(err))?;
        self.core.succeed(&envelope, "User created");
        self.load().await
    }

    pub async fn update(&self, id: &str, request: &UserUpdate) -> Result<(), ClientError> {
        let envelope =
            self.core.ctx().api().update_user(id, request).await.map_err(|err| self.core.fail(err))?;
        self.core.succeed(&envelope, "User updated");
        self.load().await
    }

    /// Soft delete: the account moves to the deleted-users listing.
    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.refuse_self(id)?;
        let envelope =
            self.core.ctx().api().delete_user(id).await.map_err(|err| self.core.fail(err))?;
        self.core.succeed(&envelope, "User deleted");
        self.load().await
    }

    pub async fn assign_role(&self, id: &str, role: Role) -> Result<(), ClientError> {
        let role_id = self.role_id(role).await?;
        let envelope = self
            .core
            .ctx()
            .api()
            .assign_role(id, &AssignRole { role_id })
            .await
            .map_err(|err| self.core.fail(err))?;
        self.core.succeed(&envelope, "Role assigned");
        self.load().await
    }

    /// Role ids are backend-assigned; they are looked up once and cached.
    async fn role_id(&self, role: Role) -> Result<String, ClientError> {
        let cached = self.core.read(|state| find_role(&state.roles, role));
        if let Some(id) = cached {
            return Ok(id);
        }

        let roles = self.core.ctx().api().roles().await.map_err(|err| self.core.fail(err))?;
        let found = find_role(&roles, role);
        self.core.write(|state| state.roles = roles);
        found.ok_or_else(|| {
            self.core.fail(ClientError::Validation(format!("Role {role} is not configured on the server")))
        })
    }

    fn refuse_self(&self, id: &str) -> Result<(), ClientError> {
        match self.core.user() {
            Ok(user) if user.id == id => {
                Err(self.core.fail(ClientError::Validation("You cannot delete your own account".to_string())))
            }
            _ => Ok(()),
        }
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

fn find_role(roles: &[RoleRecord], role: Role) -> Option<String> {
    roles.iter().find(|record| record.name == role).map(|record| record.id.clone())
}

/// Admin view of soft-deleted accounts.
pub struct DeletedUsersView {
    core: ViewCore<UsersState>,
}

impl DeletedUsersView {
    pub async fn mount(ctx: &AppContext) -> Result<Self, ClientError> {
        let core =
            ViewCore::mount("deleted_users", Page::AdminDeletedUsers, ctx, UsersState::new(ctx.page_size()))?;
        let view = Self { core };
        view.load().await?;
        Ok(view)
    }

    pub async fn load(&self) -> Result<(), ClientError> {
        let ticket = self.core.begin();
        let request = self.core.read(|state| state.request);
        let result = self.core.ctx().api().list_deleted_users(request).await;
        self.core.apply(ticket, result, |state, listing| state.listing = listing)?;
        Ok(())
    }

    pub async fn go_to_page(&self, page: u32) -> Result<(), ClientError> {
        self.core.write(|state| state.request = PageRequest::new(page, state.request.limit));
        self.load().await
    }

    pub fn users(&self) -> Vec<User> {
        self.core.read(|state| state.listing.items.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.core.read(|state| state.contains(id))
    }

    pub async fn restore(&self, id: &str) -> Result<(), ClientError> {
        let envelope =
            self.core.ctx().api().restore_user(id).await.map_err(|err| self.core.fail(err))?;
        self.core.succeed(&envelope, "User restored");
        self.load().await
    }

    /// Permanently removes the account.
    pub async fn hard_delete(&self, id: &str) -> Result<(), ClientError> {
        let envelope =
            self.core.ctx().api().hard_delete_user(id).await.map_err(|err| self.core.fail(err))?;
        self.core.succeed(&envelope, "User permanently deleted");
        self.load().await
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
