use async_trait::async_trait;
use chrono::NaiveDate;
use muni_common::models::auth::{Acknowledgement, User};
use muni_common::models::reservation::{
    AvailabilityResult, CancelRequest, NewReservation, RequirementsCheck, RequirementsRequest,
    Reservation, ReservationSlot, ReservationUpdate, ServiceType,
};
use reqwest::Method;

use crate::availability::AvailabilitySource;
use crate::error::Result;
use crate::session::SessionManager;

const BASE: &str = "api";
const SERVICE: &str = "reservations";

/// Data the reservations view needs before its first render
#[derive(Debug, Clone)]
pub struct ReservationView {
    pub user: User,
    pub reservations: Vec<Reservation>,
}

#[derive(Clone)]
pub struct ReservationsApi {
    session: SessionManager,
}

impl ReservationsApi {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    fn at(&self, method: Method, rest: &[&str]) -> reqwest::RequestBuilder {
        let mut segments = vec![BASE, SERVICE];
        segments.extend_from_slice(rest);
        self.session.request_segments(method, &segments)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Reservation>> {
        self.session
            .send_json(self.at(Method::GET, &["reservations"]))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Reservation> {
        let id = id.to_string();
        self.session
            .send_json(self.at(Method::GET, &["reservations", &id]))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Reservation>> {
        let start = start.to_string();
        let end = end.to_string();
        self.session
            .send_json(self.at(Method::GET, &["reservations", "calendar", &start, &end]))
            .await
    }

    #[tracing::instrument(skip(self, reservation), fields(fecha = %reservation.fecha, hora = %reservation.hora))]
    pub async fn create(&self, reservation: &NewReservation) -> Result<Reservation> {
        self.session
            .send_json(self.at(Method::POST, &["reservations"]).json(reservation))
            .await
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update(&self, id: i64, update: &ReservationUpdate) -> Result<Reservation> {
        let id = id.to_string();
        self.session
            .send_json(self.at(Method::PUT, &["reservations", &id]).json(update))
            .await
    }

    /// Cancel a reservation, optionally telling the office why
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, id: i64, reason: Option<&str>) -> Result<Acknowledgement> {
        let id = id.to_string();
        let body = CancelRequest {
            reason: reason.map(str::to_string),
        };
        self.session
            .send_json(self.at(Method::DELETE, &["reservations", &id]).json(&body))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn service_types(&self) -> Result<Vec<ServiceType>> {
        self.session
            .send_json(self.at(Method::GET, &["tipos-tramites"]))
            .await
    }

    /// Ask whether a slot is free; `exclude` skips the reservation being edited
    #[tracing::instrument(skip(self))]
    pub async fn check_availability(
        &self,
        slot: &ReservationSlot,
        exclude: Option<i64>,
    ) -> Result<AvailabilityResult> {
        let mut builder = self.at(
            Method::GET,
            &[
                "check-availability",
                slot.date.trim(),
                slot.time.trim(),
                slot.service_type.trim(),
            ],
        );
        if let Some(id) = exclude {
            builder = builder.query(&[("reservation_id", id)]);
        }
        self.session.send_json(builder).await
    }

    /// Check whether the user meets the requirements for a trámite
    #[tracing::instrument(skip(self))]
    pub async fn validate_requirements(
        &self,
        tipo_tramite: &str,
        user_id: Option<i64>,
    ) -> Result<RequirementsCheck> {
        let req = RequirementsRequest {
            tipo_tramite: tipo_tramite.to_string(),
            user_id,
            token: self.session.token(),
        };
        self.session
            .send_json(
                self.at(Method::POST, &["validar-requisitos-tramite"])
                    .json(&req),
            )
            .await
    }

    /// Every reservation with applicant details; staff only
    #[tracing::instrument(skip(self))]
    pub async fn list_detailed(&self) -> Result<Vec<Reservation>> {
        self.session
            .send_json(self.at(Method::GET, &["admin", "reservations"]))
            .await
    }

    /// Fetch the current user and their reservations concurrently.
    ///
    /// Either failure aborts the whole load and is reported once.
    #[tracing::instrument(skip(self))]
    pub async fn load_view(&self) -> Result<ReservationView> {
        let (user, reservations) = tokio::try_join!(self.session.current_user(), self.list())?;
        tracing::debug!(
            "Loaded {} reservations for user {}",
            reservations.len(),
            user.id
        );
        Ok(ReservationView { user, reservations })
    }
}

#[async_trait]
impl AvailabilitySource for ReservationsApi {
    async fn check(&self, slot: &ReservationSlot, exclude: Option<i64>) -> Result<AvailabilityResult> {
        self.check_availability(slot, exclude).await
    }
}
