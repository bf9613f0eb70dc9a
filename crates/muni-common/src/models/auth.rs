use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role claim carried by every user profile
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
    /// Archive staff digitizing paper records
    Digitalizador,
    #[default]
    User,
    /// Any role this client does not know; never admitted to staff views
    #[serde(other)]
    Other,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
            Role::Digitalizador => "digitalizador",
            Role::User => "user",
            Role::Other => "other",
        }
    }

    /// Roles allowed into staff-only views (admin dashboards, reservation search)
    pub fn staff() -> &'static [Role] {
        &[Role::Admin, Role::Employee]
    }

    /// Roles allowed into the digitization views
    pub fn digitization() -> &'static [Role] {
        &[Role::Admin, Role::Digitalizador]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            "digitalizador" => Ok(Role::Digitalizador),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Which identifier the login form submits
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoginType {
    #[default]
    Email,
    Rut,
}

impl LoginType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginType::Email => "email",
            LoginType::Rut => "rut",
        }
    }
}

impl fmt::Display for LoginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoginType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "email" => Ok(LoginType::Email),
            "rut" => Ok(LoginType::Rut),
            other => Err(format!("unknown login type '{}' (expected email or rut)", other)),
        }
    }
}

/// Current user profile as returned by `/api/auth/users/me`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rut: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
}

impl User {
    /// Name shown in greetings: `nombre`, then `username`, then the email
    pub fn display_name(&self) -> &str {
        if !self.nombre.trim().is_empty() {
            return &self.nombre;
        }
        match self.username.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    pub fn is_staff(&self) -> bool {
        self.has_any_role(Role::staff())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
    pub login_type: LoginType,
}

/// Citizen self-registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub nombre: String,
    pub rut: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
}

/// Staff registration payload, admin only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRequest {
    pub email: String,
    pub nombre: String,
    pub rut: String,
    pub password: String,
    pub cargo: String,
    pub departamento: String,
    pub fecha_ingreso: String,
    /// planta, contrata or honorarios
    pub tipo_contrato: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
}

/// Generic `{success, message}` acknowledgement several endpoints reply with
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Acknowledgement {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}
