use crate::api::ClientError;
use crate::auth::Page;
use crate::core::context::AppContext;
use crate::schemas::report::{Statistics, StudentReport, TopStudent};

use super::{Notice, ViewCore};

#[derive(Default)]
struct ReportsState {
    statistics: Statistics,
    top_students: Vec<TopStudent>,
    report: Option<StudentReport>,
}

/// Admin statistics, top students and per-student reports.
pub struct ReportsView {
    core: ViewCore<ReportsState>,
}

impl ReportsView {
    pub async fn mount(ctx: &AppContext) -> Result<Self, ClientError> {
        let core = ViewCore::mount("reports", Page::AdminReports, ctx, ReportsState::default())?;
        let view = Self { core };
        view.load().await?;
        Ok(view)
    }

    pub async fn load(&self) -> Result<(), ClientError> {
        let ticket = self.core.begin();
        let api = self.core.ctx().api();
        let (statistics, top) = tokio::join!(api.statistics(), api.top_students());
        let result = statistics.and_then(|statistics| Ok((statistics, top?.top_students)));

        self.core.apply(ticket, result, |state, (statistics, top_students)| {
            state.statistics = statistics;
            state.top_students = top_students;
        })?;
        Ok(())
    }

    pub fn statistics(&self) -> Statistics {
        self.core.read(|state| state.statistics.clone())
    }

    pub fn top_students(&self) -> Vec<TopStudent> {
        self.core.read(|state| state.top_students.clone())
    }

    pub async fn student_report(&self, student_id: &str) -> Result<Option<StudentReport>, ClientError> {
        let ticket = self.core.begin();
        let result = self.core.ctx().api().student_report(student_id).await;
        let applied = self.core.apply(ticket, result, |state, report| state.report = Some(report))?;
        Ok(if applied { self.core.read(|state| state.report.clone()) } else { None })
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
