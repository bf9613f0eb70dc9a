use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Citizen document stored by the documents service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub document_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentType {
    /// Machine name, e.g. `cedula` or `licencia_conducir`
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Metadata sent alongside an uploaded file
#[derive(Debug, Clone, Default)]
pub struct DocumentUpload {
    pub document_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl DocumentUpload {
    /// Tags as the comma-separated form field the upload endpoint expects
    pub fn joined_tags(&self) -> Option<String> {
        if self.tags.is_empty() {
            None
        } else {
            Some(self.tags.join(","))
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SharePermission {
    #[default]
    Read,
    Write,
}

impl fmt::Display for SharePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SharePermission::Read => f.write_str("read"),
            SharePermission::Write => f.write_str("write"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareRequest {
    pub shared_with_email: String,
    pub permission: SharePermission,
}

// ─── Digitization ───────────────────────────────────────────────────────

/// Review outcome of a scanned citizen document
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    PendienteRevision,
    Aprobado,
    Rechazado,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewStatus::PendienteRevision => f.write_str("pendiente_revision"),
            ReviewStatus::Aprobado => f.write_str("aprobado"),
            ReviewStatus::Rechazado => f.write_str("rechazado"),
        }
    }
}

/// Scan quality recorded when an archive document is finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanQuality {
    Baja,
    Media,
    Alta,
}

impl ScanQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanQuality::Baja => "baja",
            ScanQuality::Media => "media",
            ScanQuality::Alta => "alta",
        }
    }
}

impl fmt::Display for ScanQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "baja" => Ok(ScanQuality::Baja),
            "media" => Ok(ScanQuality::Media),
            "alta" => Ok(ScanQuality::Alta),
            other => Err(format!("unknown quality '{}' (expected baja, media or alta)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveStatus {
    #[default]
    Pendiente,
    EnProceso,
    Completado,
}

/// Scan attached to a citizen's reservation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CitizenDocument {
    pub id: i64,
    #[serde(default)]
    pub reserva_id: Option<i64>,
    pub usuario_id: i64,
    #[serde(default)]
    pub usuario_rut: String,
    #[serde(default)]
    pub tipo_documento: Option<String>,
    pub nombre_archivo: String,
    #[serde(default)]
    pub tamano_bytes: i64,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub estado: ReviewStatus,
    #[serde(default)]
    pub notas: Option<String>,
    #[serde(default)]
    pub revisado_por: Option<i64>,
    #[serde(default)]
    pub fecha_carga: Option<NaiveDateTime>,
    #[serde(default)]
    pub fecha_revision: Option<NaiveDateTime>,
}

/// Paper record from the municipal archive
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchiveDocument {
    pub id: i64,
    pub numero_expediente: String,
    #[serde(default)]
    pub ciudadano_rut: Option<String>,
    #[serde(default)]
    pub ciudadano_nombre: Option<String>,
    pub tipo_tramite: String,
    #[serde(rename = "año_tramite")]
    pub anio_tramite: i32,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default = "default_fojas")]
    pub numero_fojas: u32,
    #[serde(default)]
    pub nombre_archivo: String,
    #[serde(default)]
    pub estado_digitalizacion: ArchiveStatus,
    #[serde(default)]
    pub calidad_digitalizacion: Option<ScanQuality>,
    #[serde(default)]
    pub notas: Option<String>,
    #[serde(default)]
    pub fecha_digitalizacion: Option<NaiveDateTime>,
    #[serde(default)]
    pub palabras_clave: Option<String>,
    #[serde(default)]
    pub ubicacion_fisica: Option<String>,
}

fn default_fojas() -> u32 {
    1
}

/// Catalogue data sent with a scanned archive record
#[derive(Debug, Clone, Default)]
pub struct ArchiveUpload {
    pub numero_expediente: String,
    pub tipo_tramite: String,
    pub anio_tramite: i32,
    pub descripcion: String,
    /// Sheets in the physical file; zero is sent as one
    pub numero_fojas: u32,
    pub ciudadano_rut: Option<String>,
    pub ciudadano_nombre: Option<String>,
    pub palabras_clave: Option<String>,
    pub ubicacion_fisica: Option<String>,
}

/// Reply to either digitization upload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadReceipt {
    #[serde(default)]
    pub success: bool,
    pub documento_id: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewRequest {
    pub estado: ReviewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
}

/// Archive catalogue search; unset filters are left out
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchiveSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rut: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expediente: Option<String>,
    #[serde(rename = "año", skip_serializing_if = "Option::is_none")]
    pub anio: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_tramite: Option<String>,
    pub skip: u32,
    pub limit: u32,
}

impl Default for ArchiveSearch {
    fn default() -> Self {
        Self {
            rut: None,
            nombre: None,
            expediente: None,
            anio: None,
            tipo_tramite: None,
            skip: 0,
            limit: 50,
        }
    }
}

impl ArchiveSearch {
    /// Drops text filters that are present but blank
    pub fn cleaned(mut self) -> Self {
        for field in [
            &mut self.rut,
            &mut self.nombre,
            &mut self.expediente,
            &mut self.tipo_tramite,
        ] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArchiveSearchResults {
    #[serde(default)]
    pub documentos: Vec<ArchiveDocument>,
    #[serde(default)]
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkKind {
    /// Citizen documents scanned at the counter
    Nuevo,
    /// Archive backlog
    Antiguo,
}

/// One digitizer's workday as reported to the documents service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkSession {
    pub fecha: NaiveDate,
    pub digitalizador_id: i64,
    pub digitalizador_nombre: String,
    pub tipo_trabajo: WorkKind,
    pub documentos_procesados: u32,
    pub paginas_digitalizadas: u32,
    pub tiempo_trabajado_minutos: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkSessionRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub session: WorkSession,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DigitizationTotals {
    #[serde(default)]
    pub documentos_procesados: i64,
    #[serde(default)]
    pub paginas_digitalizadas: i64,
    #[serde(default)]
    pub tiempo_trabajado_minutos: i64,
}

/// Daily, weekly or monthly digitization report
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DigitizationReport {
    /// Set on daily reports
    #[serde(default)]
    pub fecha: Option<NaiveDate>,
    /// Human-readable period on weekly and monthly reports
    #[serde(default)]
    pub periodo: Option<String>,
    #[serde(default)]
    pub registros: Vec<WorkSessionRecord>,
    #[serde(default)]
    pub estadisticas: DigitizationTotals,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArchiveBacklog {
    pub total: i64,
    pub completados: i64,
    pub en_proceso: i64,
    pub pendientes: i64,
    #[serde(default)]
    pub porcentaje_completado: f64,
}

/// Progress of the archive backlog against the digitization goal
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArchiveProgress {
    pub avance: ArchiveBacklog,
    #[serde(default)]
    pub meta_total: i64,
    #[serde(default)]
    pub meta_alcanzada_porcentaje: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_tags() {
        let mut upload = DocumentUpload {
            document_type: "cedula".to_string(),
            ..Default::default()
        };
        assert_eq!(upload.joined_tags(), None);
        upload.tags = vec!["identidad".to_string(), "2025".to_string()];
        assert_eq!(upload.joined_tags().as_deref(), Some("identidad,2025"));
    }

    #[test]
    fn test_share_request_permission_lowercase() {
        let req = ShareRequest {
            shared_with_email: "otro@muni.cl".to_string(),
            permission: SharePermission::Write,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["permission"], "write");
    }

    #[test]
    fn test_archive_document_uses_accented_year() {
        let doc: ArchiveDocument = serde_json::from_value(serde_json::json!({
            "id": 3,
            "numero_expediente": "EXP-1987-044",
            "tipo_tramite": "patente",
            "año_tramite": 1987,
            "estado_digitalizacion": "en_proceso"
        }))
        .unwrap();
        assert_eq!(doc.anio_tramite, 1987);
        assert_eq!(doc.numero_fojas, 1);
        assert_eq!(doc.estado_digitalizacion, ArchiveStatus::EnProceso);
        assert_eq!(doc.calidad_digitalizacion, None);
    }

    #[test]
    fn test_archive_search_drops_blank_filters() {
        let search = ArchiveSearch {
            rut: Some("  ".to_string()),
            expediente: Some("EXP-1987".to_string()),
            anio: Some(1987),
            ..Default::default()
        }
        .cleaned();
        let value = serde_json::to_value(&search).unwrap();
        assert!(value.get("rut").is_none());
        assert_eq!(value["expediente"], "EXP-1987");
        assert_eq!(value["año"], 1987);
        assert_eq!(value["limit"], 50);
    }

    #[test]
    fn test_work_session_record_flattens() {
        let record: WorkSessionRecord = serde_json::from_value(serde_json::json!({
            "id": 12,
            "fecha": "2025-03-10",
            "digitalizador_id": 9,
            "digitalizador_nombre": "Pedro",
            "tipo_trabajo": "antiguo",
            "documentos_procesados": 40,
            "paginas_digitalizadas": 310,
            "tiempo_trabajado_minutos": 480,
            "created_at": "2025-03-10T18:00:00"
        }))
        .unwrap();
        assert_eq!(record.id, Some(12));
        assert_eq!(record.session.tipo_trabajo, WorkKind::Antiguo);
        assert_eq!(record.session.paginas_digitalizadas, 310);
    }

    #[test]
    fn test_scan_quality_parse() {
        assert_eq!("Alta".parse::<ScanQuality>().unwrap(), ScanQuality::Alta);
        assert!("excelente".parse::<ScanQuality>().is_err());
    }
}
