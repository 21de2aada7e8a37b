use crate::api::{ClientError, PageRequest};
use crate::auth::Page;
use crate::core::context::AppContext;
use crate::schemas::academic::{Lecturer, Student};

use super::{Notice, ViewCore};

/// Lecturer pages are small; one request covers them.
const LECTURER_PAGE_LIMIT: u32 = 100;

#[derive(Default)]
struct AdvisorsState {
    students: Vec<Student>,
    lecturers: Vec<Lecturer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisorFilter {
    All,
    Assigned,
    Unassigned,
}

/// Admin assignment of lecturers as student advisors.
pub struct AdvisorsView {
    core: ViewCore<AdvisorsState>,
}

impl AdvisorsView {
    pub async fn mount(ctx: &AppContext) -> Result<Self, ClientError> {
        let core = ViewCore::mount("advisors", Page::AdminAdvisors, ctx, AdvisorsState::default())?;
        let view = Self { core };
        view.load().await?;
        Ok(view)
    }

    /// Fetches students and lecturers concurrently; both must succeed.
    pub async fn load(&self) -> Result<(), ClientError> {
        let ticket = self.core.begin();
        let api = self.core.ctx().api();
        let student_page = PageRequest::first(self.core.ctx().page_size().max(LECTURER_PAGE_LIMIT));

        let (students, lecturers) = tokio::join!(
            api.list_students(student_page),
            api.list_lecturers(PageRequest::first(LECTURER_PAGE_LIMIT)),
        );
        let result = students.and_then(|students| Ok((students.items, lecturers?.items)));

        self.core.apply(ticket, result, |state, (students, lecturers)| {
            state.students = students;
            state.lecturers = lecturers;
        })?;
        Ok(())
    }

    pub fn students(&self, filter: AdvisorFilter) -> Vec<Student> {
        self.core.read(|state| {
            state
                .students
                .iter()
                .filter(|student| match filter {
                    AdvisorFilter::All => true,
                    AdvisorFilter::Assigned => student.has_advisor(),
                    AdvisorFilter::Unassigned => !student.has_advisor(),
                })
                .cloned()
                .collect()
        })
    }

    pub fn lecturers(&self) -> Vec<Lecturer> {
        self.core.read(|state| state.lecturers.clone())
    }

    /// Case-insensitive match on name, student number or study program.
    pub fn search(&self, term: &str) -> Vec<Student> {
        let needle = term.trim().to_lowercase();
        self.core.read(|state| {
            state
                .students
                .iter()
                .filter(|student| {
                    needle.is_empty()
                        || student.display_name().to_lowercase().contains(&needle)
                        || student.student_id.to_lowercase().contains(&needle)
                        || student
                            .program_study
                            .as_deref()
                            .is_some_and(|program| program.to_lowercase().contains(&needle))
                })
                .cloned()
                .collect()
        })
    }

    pub async fn assign(&self, student_id: &str, lecturer_id: &str) -> Result<(), ClientError> {
        let known = self.core.read(|state| state.lecturers.iter().any(|lecturer| lecturer.id == lecturer_id));
        if !known {
            return Err(self.core.fail(ClientError::Validation("Please select an advisor".to_string())));
        }

        let envelope = self
            .core
            .ctx()
            .api()
            .assign_advisor(student_id, lecturer_id)
            .await
            .map_err(|err| self.core.fail(err))?;
        self.core.succeed(&envelope, "Advisor assigned");
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
