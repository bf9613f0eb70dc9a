use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::reservation::Reservation;

/// Headline counters for the admin dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardData {
    #[serde(default)]
    pub total_reservas: i64,
    #[serde(default)]
    pub reservas_activas: i64,
    #[serde(default)]
    pub reservas_completadas: i64,
    #[serde(default)]
    pub reservas_anuladas: i64,
    #[serde(default)]
    pub docs_completos: i64,
    #[serde(default)]
    pub docs_incompletos: i64,
    #[serde(default)]
    pub docs_pendientes: i64,
}

/// Optional date window for statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_inicio: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_fin: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingEntry {
    pub nombre: String,
    pub total: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TramiteStats {
    #[serde(default)]
    pub total_tramites: i64,
    #[serde(default)]
    pub ranking_tramites: Vec<RankingEntry>,
    #[serde(default)]
    pub ranking_categorias: Vec<RankingEntry>,
}

/// Advanced reservation search; blank criteria are not sent
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rut: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_tramite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria_tramite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_inicio: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_fin: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado_documental: Option<String>,
}

impl SearchCriteria {
    /// Drops criteria that are present but blank
    pub fn cleaned(mut self) -> Self {
        for field in [
            &mut self.nombre,
            &mut self.rut,
            &mut self.tipo_tramite,
            &mut self.categoria_tramite,
            &mut self.estado,
            &mut self.estado_documental,
        ] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResults {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub resultados: Vec<Reservation>,
}
