use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Candidate booking as typed into the reservation form.
///
/// Fields stay as raw strings so an incomplete form can be represented;
/// see [`crate::validation::parse_slot`] for the typed view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationSlot {
    pub date: String,
    pub time: String,
    pub service_type: String,
}

impl ReservationSlot {
    pub fn new(
        date: impl Into<String>,
        time: impl Into<String>,
        service_type: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            service_type: service_type.into(),
        }
    }

    /// True when every field has a non-blank value
    pub fn is_complete(&self) -> bool {
        !self.date.trim().is_empty()
            && !self.time.trim().is_empty()
            && !self.service_type.trim().is_empty()
    }
}

/// Reply of `check-availability`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub available: bool,
    #[serde(default)]
    pub message: String,
}

impl AvailabilityResult {
    pub fn available(message: impl Into<String>) -> Self {
        Self {
            available: true,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            available: false,
            message: message.into(),
        }
    }
}

/// Stored reservation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reservation {
    pub id: i64,
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub usuario_id: i64,
    #[serde(default)]
    pub usuario_nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_tramite: Option<String>,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub estado: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl Reservation {
    pub fn is_cancelled(&self) -> bool {
        matches!(self.estado.as_str(), "cancelada" | "anulada" | "cancelled")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewReservation {
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub usuario_id: i64,
    pub usuario_nombre: String,
    pub tipo_tramite: String,
    #[serde(default)]
    pub descripcion: String,
}

/// Partial update; only the fields that are set are sent
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReservationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hora: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_tramite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
}

impl ReservationUpdate {
    pub fn is_empty(&self) -> bool {
        self.fecha.is_none()
            && self.hora.is_none()
            && self.tipo_tramite.is_none()
            && self.descripcion.is_none()
            && self.estado.is_none()
    }
}

/// Body of a reservation DELETE
#[derive(Debug, Clone, Default, Serialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

/// Tipo de trámite offered for booking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceType {
    pub id: String,
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duracion_minutos: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequirementsRequest {
    pub tipo_tramite: String,
    pub user_id: Option<i64>,
    /// The requirements endpoint reads the caller's token from the body as well
    pub token: Option<String>,
}

/// Outcome of checking whether a citizen may perform a trámite
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequirementsCheck {
    pub puede_realizar: bool,
    #[serde(default)]
    pub bloqueantes: Vec<String>,
    #[serde(default)]
    pub advertencias: Vec<String>,
    #[serde(default)]
    pub informativos: Vec<String>,
    #[serde(default)]
    pub documentos_requeridos: Vec<String>,
}

impl RequirementsCheck {
    /// Message listing every blocking requirement, one per line
    pub fn blocking_message(&self) -> String {
        self.bloqueantes.join("\n")
    }
}
