use crate::api::ClientError;
use crate::auth::Page;
use crate::core::context::AppContext;
use crate::schemas::academic::Student;
use crate::schemas::report::StudentReport;

use super::{Notice, ViewCore};

#[derive(Default)]
struct AdviseesState {
    advisees: Vec<Student>,
    report: Option<StudentReport>,
}

/// A lecturer's advisees and their achievement reports.
pub struct AdviseesView {
    core: ViewCore<AdviseesState>,
}

impl AdviseesView {
    pub async fn mount(ctx: &AppContext) -> Result<Self, ClientError> {
        let core = ViewCore::mount("advisees", Page::LecturerAdvisees, ctx, AdviseesState::default())?;
        let view = Self { core };
        view.load().await?;
        Ok(view)
    }

    pub async fn load(&self) -> Result<(), ClientError> {
        let ticket = self.core.begin();
        let result = self.core.ctx().api().my_advisees().await;
        self.core.apply(ticket, result, |state, advisees| state.advisees = advisees)?;
        Ok(())
    }

    pub fn advisees(&self) -> Vec<Student> {
        self.core.read(|state| state.advisees.clone())
    }

    /// Loads the report of one advisee; only the latest selection is kept.
    pub async fn select(&self, student_id: &str) -> Result<Option<StudentReport>, ClientError> {
        let student = self
            .core
            .read(|state| state.advisees.iter().find(|student| student.id == student_id).cloned())
            .ok_or_else(|| self.core.fail(ClientError::Validation(format!("{student_id} is not your advisee"))))?;

        let ticket = self.core.begin();
        let result = self.core.ctx().api().student_report(student.report_id()).await;
        let applied = self.core.apply(ticket, result, |state, report| state.report = Some(report))?;
        Ok(if applied { self.report() } else { None })
    }

    pub fn report(&self) -> Option<StudentReport> {
        self.core.read(|state| state.report.clone())
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
