use reqwest::Method;
use serde_json::Value;

use super::{segment, AchievementQuery, ApiClient, ClientError, Envelope, PageRequest, Paginated};
use crate::schemas::academic::{AssignAdvisor, Lecturer, Student};
use crate::schemas::achievement::Achievement;

impl ApiClient {
    pub async fn list_students(&self, page: PageRequest) -> Result<Paginated<Student>, ClientError> {
        self.get_page("/students", &page.to_query(), "students").await
    }

    pub async fn student(&self, id: &str) -> Result<Student, ClientError> {
        self.get(&format!("/students/{}", segment(id)?)).await?.into_data()
    }

    pub async fn student_achievements(&self, id: &str) -> Result<Envelope<Value>, ClientError> {
        self.get(&format!("/students/{}/achievements", segment(id)?)).await
    }

    pub async fn assign_advisor(
        &self,
        student_id: &str,
        advisor_id: &str,
    ) -> Result<Envelope<Value>, ClientError> {
        let request = AssignAdvisor { advisor_id: segment(advisor_id)?.to_string() };
        self.send(Method::PUT, &format!("/students/{}/advisor", segment(student_id)?), &request)
            .await
    }

    pub async fn list_lecturers(&self, page: PageRequest) -> Result<Paginated<Lecturer>, ClientError> {
        self.get_page("/lecturers", &page.to_query(), "lecturers").await
    }

    pub async fn lecturer_advisees(&self, lecturer_id: &str) -> Result<Vec<Student>, ClientError> {
        let path = format!("/lecturers/{}/advisees", segment(lecturer_id)?);
        Ok(self.get_page(&path, &[], "advisees").await?.items)
    }

    /// Advisees of the logged-in lecturer.
    pub async fn my_advisees(&self) -> Result<Vec<Student>, ClientError> {
        Ok(self.get_page("/lecturers/me/advisees", &[], "advisees").await?.items)
    }

    pub async fn advisee_achievements(
        &self,
        query: AchievementQuery,
    ) -> Result<Paginated<Achievement>, ClientError> {
        self.get_page("/lecturers/advisees/achievements", &query.to_query(), "achievements").await
    }
}
