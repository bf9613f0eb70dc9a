use std::sync::Arc;
use std::time::Duration;

use muni_common::models::auth::User;
use muni_common::models::reservation::{
    NewReservation, RequirementsCheck, Reservation, ReservationSlot, ReservationUpdate,
};
use muni_common::validation::parse_slot;

use crate::api::ReservationsApi;
use crate::availability::{AvailabilityProber, AvailabilityState};
use crate::error::{ClientError, Result};

pub const INCOMPLETE_MESSAGE: &str = "Por favor completa la fecha, hora y tipo de trámite";
pub const CHECKING_MESSAGE: &str = "Verificando disponibilidad...";
pub const APPLICANT_MESSAGE: &str = "Selecciona el usuario para la reserva";
const REQUIREMENTS_PREFIX: &str = "No puede realizar este trámite:";

/// Citizen a staff member is booking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applicant {
    pub id: i64,
    pub nombre: String,
}

/// State behind the create/edit reservation form.
///
/// Slot edits feed the availability prober; submission is refused while
/// the slot is incomplete, still being checked, taken, or the citizen does
/// not meet the trámite's requirements.
pub struct ReservationForm {
    api: ReservationsApi,
    prober: AvailabilityProber,
    slot: ReservationSlot,
    editing: Option<i64>,
    descripcion: String,
    requirements: Option<RequirementsCheck>,
    applicant: Option<Applicant>,
}

impl ReservationForm {
    /// Must be called inside a tokio runtime.
    pub fn new(api: ReservationsApi, debounce: Duration) -> Self {
        let prober = AvailabilityProber::new(Arc::new(api.clone()), debounce);
        Self {
            api,
            prober,
            slot: ReservationSlot::default(),
            editing: None,
            descripcion: String::new(),
            requirements: None,
            applicant: None,
        }
    }

    /// Prefill the form from an existing reservation.
    pub fn edit(&mut self, reservation: &Reservation) {
        self.editing = Some(reservation.id);
        self.slot = ReservationSlot::new(
            reservation.fecha.to_string(),
            reservation.hora.format("%H:%M").to_string(),
            reservation.tipo_tramite.clone().unwrap_or_default(),
        );
        self.descripcion = reservation.descripcion.clone();
        self.applicant = Some(Applicant {
            id: reservation.usuario_id,
            nombre: reservation.usuario_nombre.clone(),
        });
        self.requirements = None;
        self.refresh();
    }

    pub fn editing(&self) -> Option<i64> {
        self.editing
    }

    pub fn slot(&self) -> &ReservationSlot {
        &self.slot
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.slot.date = date.into();
        self.refresh();
    }

    pub fn set_time(&mut self, time: impl Into<String>) {
        self.slot.time = time.into();
        self.refresh();
    }

    /// Changing the trámite invalidates the last requirements check.
    pub fn set_service_type(&mut self, service_type: impl Into<String>) {
        self.slot.service_type = service_type.into();
        self.requirements = None;
        self.refresh();
    }

    pub fn set_description(&mut self, descripcion: impl Into<String>) {
        self.descripcion = descripcion.into();
    }

    pub fn set_applicant(&mut self, applicant: Option<Applicant>) {
        self.applicant = applicant;
        self.requirements = None;
    }

    fn refresh(&self) {
        self.prober.update(self.slot.clone(), self.editing);
    }

    pub fn availability(&self) -> AvailabilityState {
        self.prober.state()
    }

    /// Wait for any pending availability check to finish.
    pub async fn settle(&self) -> AvailabilityState {
        self.prober.settled().await
    }

    pub fn requirements(&self) -> Option<&RequirementsCheck> {
        self.requirements.as_ref()
    }

    /// Ask the server whether the applicant may perform the selected trámite.
    pub async fn validate_requirements(&mut self) -> Result<&RequirementsCheck> {
        let service_type = self.slot.service_type.trim();
        if service_type.is_empty() {
            return Err(ClientError::BusinessRule(INCOMPLETE_MESSAGE.to_string()));
        }
        let user_id = self.applicant.as_ref().map(|a| a.id);
        let check = self.api.validate_requirements(service_type, user_id).await?;
        if !check.puede_realizar {
            tracing::info!(
                "Requirements not met for '{}': {}",
                service_type,
                check.bloqueantes.len()
            );
        }
        Ok(self.requirements.insert(check))
    }

    /// First reason the form cannot be submitted by `user`, if any.
    pub fn blocking_reason(&self, user: &User) -> Option<String> {
        if !self.slot.is_complete() {
            return Some(INCOMPLETE_MESSAGE.to_string());
        }
        match self.prober.state() {
            AvailabilityState::Checking => return Some(CHECKING_MESSAGE.to_string()),
            AvailabilityState::Known(result) if !result.available => {
                return Some(result.message);
            }
            _ => {}
        }
        if let Some(check) = self.requirements.as_ref().filter(|c| !c.puede_realizar) {
            return Some(format!(
                "{}\n{}",
                REQUIREMENTS_PREFIX,
                check.blocking_message()
            ));
        }
        if user.is_staff() && self.applicant.is_none() {
            return Some(APPLICANT_MESSAGE.to_string());
        }
        None
    }

    pub fn can_submit(&self, user: &User) -> bool {
        self.blocking_reason(user).is_none()
    }

    /// Create or update the reservation once every check passes.
    ///
    /// Waits for a pending availability check first. A blocked form yields
    /// [`ClientError::BusinessRule`] carrying the reason and sends nothing.
    #[tracing::instrument(skip(self, user), fields(user_id = user.id, editing = ?self.editing))]
    pub async fn submit(&self, user: &User) -> Result<Reservation> {
        self.settle().await;
        if let Some(reason) = self.blocking_reason(user) {
            return Err(ClientError::BusinessRule(reason));
        }
        let (fecha, hora) =
            parse_slot(&self.slot).map_err(|e| ClientError::BusinessRule(e.to_string()))?;
        let tipo_tramite = self.slot.service_type.trim().to_string();

        let reservation = match self.editing {
            Some(id) => {
                let update = ReservationUpdate {
                    fecha: Some(fecha),
                    hora: Some(hora),
                    tipo_tramite: Some(tipo_tramite),
                    descripcion: Some(self.descripcion.clone()),
                    estado: None,
                };
                self.api.update(id, &update).await?
            }
            None => {
                let (usuario_id, usuario_nombre) = match &self.applicant {
                    Some(applicant) => (applicant.id, applicant.nombre.clone()),
                    None => (user.id, user.display_name().to_string()),
                };
                let new = NewReservation {
                    fecha,
                    hora,
                    usuario_id,
                    usuario_nombre,
                    tipo_tramite,
                    descripcion: self.descripcion.clone(),
                };
                self.api.create(&new).await?
            }
        };
        tracing::info!("Saved reservation {}", reservation.id);
        Ok(reservation)
    }
}
