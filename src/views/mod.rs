//! Role-specific workflow views.
//!
//! A view owns local state and loads it through the API client. Each load takes a
//! ticket from the view's generation counter; a response is applied only while its
//! ticket is still the newest, so late answers from superseded requests (or requests
//! that outlive `close`) are dropped without touching state. Mutations re-fetch the
//! listing afterwards. Failures land in a dismissible [`Notice`] carrying the backend
//! message as sent.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::api::{ClientError, Envelope};
use crate::auth::{authorize, Page};
use crate::core::context::AppContext;
use crate::core::metrics;
use crate::schemas::auth::Profile;

mod advisees;
mod advisors;
mod dashboard;
mod reports;
mod review;
mod student;
mod users;


pub use advisees::AdviseesView;
pub use advisors::{AdvisorFilter, AdvisorsView};
pub use dashboard::{DashboardSummary, DashboardView, StatusCounts};
pub use reports::ReportsView;
pub use review::ReviewView;
pub use student::StudentAchievementsView;
pub use users::{DeletedUsersView, UsersView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket(u64);

/// Monotonic request counter of one view.
#[derive(Debug, Default)]
pub(crate) struct Generation {
    current: AtomicU64,
}

impl Generation {
    pub(crate) fn begin(&self) -> Ticket {
        Ticket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub(crate) fn is_current(&self, ticket: Ticket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }

    /// Invalidates every outstanding ticket.
    pub(crate) fn retire(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }
}

/// State and bookkeeping shared by every view.
pub(crate) struct ViewCore<T> {
    name: &'static str,
    ctx: AppContext,
    generation: Generation,
    data: Mutex<T>,
    notice: Mutex<Option<Notice>>,
}

impl<T> ViewCore<T> {
    /// Runs the gate for `page`; a view that may not be shown is never built.
    pub(crate) fn mount(name: &'static str, page: Page, ctx: &AppContext, data: T) -> Result<Self, ClientError> {
        let decision = authorize(page, &ctx.snapshot());
        if !decision.is_allowed() {
            return Err(ClientError::Authorization(decision));
        }

        Ok(Self {
            name,
            ctx: ctx.clone(),
            generation: Generation::default(),
            data: Mutex::new(data),
            notice: Mutex::new(None),
        })
    }

    pub(crate) fn ctx(&self) -> &AppContext {
        &self.ctx
    }

    /// The logged-in profile; a view outliving its session is treated as denied.
    pub(crate) fn user(&self) -> Result<Profile, ClientError> {
        self.ctx
            .current_user()
            .ok_or(ClientError::Authorization(crate::auth::GateDecision::RedirectToLogin))
    }

    pub(crate) fn begin(&self) -> Ticket {
        self.generation.begin()
    }

    pub(crate) fn close(&self) {
        self.generation.retire();
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.data.lock())
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.data.lock())
    }

    /// Stores a load result if `ticket` is still current. Returns whether it was applied.
    pub(crate) fn apply<R>(
        &self,
        ticket: Ticket,
        result: Result<R, ClientError>,
        store: impl FnOnce(&mut T, R),
    ) -> Result<bool, ClientError> {
        if !self.generation.is_current(ticket) {
            metrics::record_stale_response(self.name);
            tracing::debug!(view = self.name, "discarding stale response");
            return Ok(false);
        }

        match result {
            Ok(value) => {
                store(&mut self.data.lock(), value);
                Ok(true)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Records `err` as the current notice and hands it back.
    pub(crate) fn fail(&self, err: ClientError) -> ClientError {
        *self.notice.lock() = Some(Notice::error(err.user_message()));
        err
    }

    pub(crate) fn succeed<V>(&self, envelope: &Envelope<V>, fallback: &str) {
        let message = envelope.message.clone().unwrap_or_else(|| fallback.to_string());
        *self.notice.lock() = Some(Notice::success(message));
    }

    pub(crate) fn notice(&self) -> Option<Notice> {
        self.notice.lock().clone()
    }

    pub(crate) fn dismiss_notice(&self) {
        *self.notice.lock() = None;
    }
}
