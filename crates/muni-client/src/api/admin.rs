use muni_common::models::admin::{
    DashboardData, SearchCriteria, SearchResults, StatsQuery, TramiteStats,
};
use reqwest::Method;

use crate::error::Result;
use crate::session::SessionManager;

const BASE: &str = "/api/reservations/admin";

/// Staff dashboards; the server enforces the role, callers gate the views
#[derive(Clone)]
pub struct AdminApi {
    session: SessionManager,
}

impl AdminApi {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    #[tracing::instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardData> {
        self.session.get_json(&format!("{}/dashboard", BASE)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn tramite_stats(&self, query: &StatsQuery) -> Result<TramiteStats> {
        self.session
            .send_json(
                self.session
                    .request(Method::GET, &format!("{}/estadisticas-tramites", BASE))
                    .query(query),
            )
            .await
    }

    /// Search reservations; blank criteria are dropped before sending
    #[tracing::instrument(skip(self, criteria))]
    pub async fn search_reservations(&self, criteria: SearchCriteria) -> Result<SearchResults> {
        let criteria = criteria.cleaned();
        self.session
            .send_json(
                self.session
                    .request(Method::POST, &format!("{}/buscar-reservas", BASE))
                    .json(&criteria),
            )
            .await
    }
}
