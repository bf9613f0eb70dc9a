use muni_common::models::notification::{
    BatchEmailRequest, DocumentNotification, EmailRequest, NotificationStats,
    PasswordResetEmail, ReservationNotification, TaskAccepted, TaskStatus, WelcomeEmail,
};
use reqwest::Method;
use serde::Serialize;

use crate::error::Result;
use crate::session::SessionManager;

const BASE: &str = "/api/notifications";

/// Email notifications; every send is queued server-side and returns a task id
#[derive(Clone)]
pub struct NotificationsApi {
    session: SessionManager,
}

impl NotificationsApi {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    async fn enqueue<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<TaskAccepted> {
        let accepted: TaskAccepted = self
            .session
            .send_json(
                self.session
                    .request(Method::POST, &format!("{}{}", BASE, path))
                    .json(body),
            )
            .await?;
        tracing::debug!("Queued notification {} as task {}", path, accepted.task_id);
        Ok(accepted)
    }

    #[tracing::instrument(skip(self, email), fields(subject = %email.subject))]
    pub async fn send_email(&self, email: &EmailRequest) -> Result<TaskAccepted> {
        self.enqueue("/email", email).await
    }

    #[tracing::instrument(skip(self, notice))]
    pub async fn reservation_confirmation(
        &self,
        notice: &ReservationNotification,
    ) -> Result<TaskAccepted> {
        self.enqueue("/reservation/confirmation", notice).await
    }

    #[tracing::instrument(skip(self, notice))]
    pub async fn reservation_reminder(&self, notice: &ReservationNotification) -> Result<TaskAccepted> {
        self.enqueue("/reservation/reminder", notice).await
    }

    #[tracing::instrument(skip(self, notice))]
    pub async fn reservation_cancellation(
        &self,
        notice: &ReservationNotification,
    ) -> Result<TaskAccepted> {
        self.enqueue("/reservation/cancellation", notice).await
    }

    #[tracing::instrument(skip(self, notice))]
    pub async fn document(&self, notice: &DocumentNotification) -> Result<TaskAccepted> {
        self.enqueue("/document", notice).await
    }

    #[tracing::instrument(skip(self, welcome))]
    pub async fn welcome(&self, welcome: &WelcomeEmail) -> Result<TaskAccepted> {
        self.enqueue("/welcome", welcome).await
    }

    #[tracing::instrument(skip(self, reset))]
    pub async fn password_reset(&self, reset: &PasswordResetEmail) -> Result<TaskAccepted> {
        self.enqueue("/password-reset", reset).await
    }

    #[tracing::instrument(skip(self, emails), fields(count = emails.len()))]
    pub async fn batch(&self, emails: Vec<EmailRequest>) -> Result<TaskAccepted> {
        self.enqueue("/batch", &BatchEmailRequest { emails }).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn task_status(&self, task_id: &str) -> Result<TaskStatus> {
        self.session
            .send_json(
                self.session
                    .request_segments(Method::GET, &["api", "notifications", "task", task_id]),
            )
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn stats(&self) -> Result<NotificationStats> {
        self.session.get_json(&format!("{}/stats", BASE)).await
    }
}
