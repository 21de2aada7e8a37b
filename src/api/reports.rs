use super::{segment, ApiClient, ClientError};
use crate::schemas::report::{Statistics, StudentReport, TopStudents};

impl ApiClient {
    pub async fn statistics(&self) -> Result<Statistics, ClientError> {
        self.get("/reports/statistics").await?.into_data()
    }

    pub async fn student_report(&self, student_id: &str) -> Result<StudentReport, ClientError> {
        self.get(&format!("/reports/students/{}", segment(student_id)?)).await?.into_data()
    }

    pub async fn top_students(&self) -> Result<TopStudents, ClientError> {
        self.get("/reports/top-students").await?.into_data()
    }
}
