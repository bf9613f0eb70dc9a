use muni_common::models::auth::{
    Acknowledgement, EmployeeRequest, PasswordResetConfirm, PasswordResetRequest, User,
};
use reqwest::Method;

use crate::error::Result;
use crate::session::SessionManager;

const BASE: &str = "/api/auth";

/// Account administration beyond login/logout
#[derive(Clone)]
pub struct AuthApi {
    session: SessionManager,
}

impl AuthApi {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    /// All users; admin and employee scope
    #[tracing::instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.session.get_json(&format!("{}/users", BASE)).await
    }

    #[tracing::instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register_employee(&self, req: &EmployeeRequest) -> Result<User> {
        self.session
            .send_json(
                self.session
                    .request(Method::POST, &format!("{}/admin/employees", BASE))
                    .json(req),
            )
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<Acknowledgement> {
        let req = PasswordResetRequest {
            email: email.to_string(),
        };
        self.session
            .send_json(
                self.session
                    .request(Method::POST, &format!("{}/password-reset/request", BASE))
                    .json(&req),
            )
            .await
    }

    #[tracing::instrument(skip(self, token, new_password))]
    pub async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<Acknowledgement> {
        let req = PasswordResetConfirm {
            token: token.to_string(),
            new_password: new_password.to_string(),
        };
        self.session
            .send_json(
                self.session
                    .request(Method::POST, &format!("{}/password-reset/confirm", BASE))
                    .json(&req),
            )
            .await
    }
}
