use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailRequest {
    pub to_emails: Vec<String>,
    pub subject: String,
    pub html_body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Vec<String>>,
}

/// Confirmation, reminder and cancellation notices share this payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReservationNotification {
    pub user_email: String,
    pub user_name: String,
    pub reservation_data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentNotification {
    pub user_email: String,
    pub user_name: String,
    pub document_data: serde_json::Value,
    /// uploaded, approved or rejected
    pub notification_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WelcomeEmail {
    pub user_email: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PasswordResetEmail {
    pub user_email: String,
    pub user_name: String,
    pub reset_token: String,
    pub reset_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchEmailRequest {
    pub emails: Vec<EmailRequest>,
}

/// Reply when a notification is queued
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskAccepted {
    pub task_id: String,
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskStatus {
    pub task_id: String,
    pub status: String,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TaskStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self.status.as_str(), "SUCCESS" | "FAILURE" | "REVOKED")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationStats {
    pub service: String,
    #[serde(default)]
    pub redis_connected: bool,
    #[serde(default)]
    pub pending_tasks: i64,
    #[serde(default)]
    pub timestamp: Option<String>,
}
