use reqwest::StatusCode;
use thiserror::Error;

/// Shown for transport failures and 5xx replies.
pub const GENERIC_NETWORK_MESSAGE: &str = "Error de conexión. Por favor intenta nuevamente más tarde.";
/// Shown when the server rejected the stored token.
pub const SESSION_EXPIRED_MESSAGE: &str = "Tu sesión expiró. Inicia sesión nuevamente.";

#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP 401. The session has already been torn down when this is returned.
    #[error("Unauthorized{}", fmt_detail(.detail))]
    Unauthorized { detail: Option<String> },

    /// 4xx other than 401, carrying the server's `detail`.
    #[error("Request rejected with status {status}: {detail}")]
    Validation { status: u16, detail: String },

    #[error("Server error with status {status}{}", fmt_detail(.detail))]
    Server { status: u16, detail: Option<String> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// The action is blocked by a business rule (slot taken, requirement unmet).
    #[error("{0}")]
    BusinessRule(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

fn fmt_detail(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {}", d),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Build the error for a non-success reply from its status and raw body.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = extract_detail(body);
        if status == StatusCode::UNAUTHORIZED {
            ClientError::Unauthorized { detail }
        } else if status.is_server_error() {
            ClientError::Server {
                status: status.as_u16(),
                detail,
            }
        } else {
            ClientError::Validation {
                status: status.as_u16(),
                detail: detail.unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Solicitud rechazada")
                        .to_string()
                }),
            }
        }
    }

    /// Transport failures and 5xx replies, as opposed to rejections.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::Server { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    /// Text to show next to the form that triggered the request.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Unauthorized { detail: Some(d) } => d.clone(),
            ClientError::Unauthorized { detail: None } => SESSION_EXPIRED_MESSAGE.to_string(),
            ClientError::Validation { detail, .. } => detail.clone(),
            ClientError::BusinessRule(msg) => msg.clone(),
            ClientError::Server { .. } | ClientError::Network(_) | ClientError::Decode(_) => {
                GENERIC_NETWORK_MESSAGE.to_string()
            }
            ClientError::Storage(msg) => format!("No se pudo guardar la sesión: {}", msg),
            ClientError::InvalidUrl(url) => format!("URL del servidor inválida: {}", url),
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"detail": "..."}`, validation arrays of the form
/// `{"detail": [{"msg": "..."}]}`, and `{"error": "..."}` / `{"message": "..."}`.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail") {
        Some(serde_json::Value::String(s)) => return Some(s.clone()),
        Some(serde_json::Value::Array(items)) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if !msgs.is_empty() {
                return Some(msgs.join("; "));
            }
        }
        _ => {}
    }
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
