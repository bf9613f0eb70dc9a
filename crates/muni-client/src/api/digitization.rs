use chrono::NaiveDate;
use muni_common::models::document::{
    ArchiveDocument, ArchiveProgress, ArchiveSearch, ArchiveSearchResults, ArchiveUpload,
    CitizenDocument, DigitizationReport, ReviewRequest, ReviewStatus, ScanQuality, UploadReceipt,
    WorkSession, WorkSessionRecord,
};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Deserialize;

use crate::error::{ClientError, Result};
use crate::session::SessionManager;

const BASE: &str = "/api/documents";

#[derive(Deserialize)]
struct DocumentList<T> {
    #[serde(default = "Vec::new")]
    documentos: Vec<T>,
}

#[derive(Deserialize)]
struct Updated<T> {
    documento: T,
}

#[derive(Deserialize)]
struct Registered {
    registro: WorkSessionRecord,
}

/// Scanning desk: citizen scans, the archive backlog and workday reports.
///
/// Most calls are limited to admins and digitizers by the server; gate the
/// views with [`Role::digitization`](muni_common::models::auth::Role::digitization).
#[derive(Clone)]
pub struct DigitizationApi {
    session: SessionManager,
}

impl DigitizationApi {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    /// Upload a scan brought in by a citizen, optionally tied to a reservation
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_citizen_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        reserva_id: Option<i64>,
        tipo_documento: Option<&str>,
    ) -> Result<UploadReceipt> {
        let mut form =
            Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        if let Some(id) = reserva_id {
            form = form.text("reserva_id", id.to_string());
        }
        if let Some(kind) = tipo_documento.map(str::trim).filter(|k| !k.is_empty()) {
            form = form.text("tipo_documento", kind.to_string());
        }

        let receipt: UploadReceipt = self
            .session
            .send_json(
                self.session
                    .request(Method::POST, &format!("{}/upload-documento", BASE))
                    .multipart(form),
            )
            .await?;
        tracing::info!("Uploaded citizen scan {}", receipt.documento_id);
        Ok(receipt)
    }

    /// Upload a scanned archive record with its catalogue data
    #[tracing::instrument(skip(self, bytes, meta), fields(size = bytes.len(), expediente = %meta.numero_expediente))]
    pub async fn upload_archive_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        meta: &ArchiveUpload,
    ) -> Result<UploadReceipt> {
        // `año_tramite` must go out as raw UTF-8, the way browsers send it
        let mut form = Form::new()
            .percent_encode_noop()
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()))
            .text("numero_expediente", meta.numero_expediente.clone())
            .text("tipo_tramite", meta.tipo_tramite.clone())
            .text("año_tramite", meta.anio_tramite.to_string())
            .text("descripcion", meta.descripcion.clone())
            .text("numero_fojas", meta.numero_fojas.max(1).to_string());
        for (name, value) in [
            ("ciudadano_rut", &meta.ciudadano_rut),
            ("ciudadano_nombre", &meta.ciudadano_nombre),
            ("palabras_clave", &meta.palabras_clave),
            ("ubicacion_fisica", &meta.ubicacion_fisica),
        ] {
            if let Some(value) = value.as_ref().filter(|v| !v.trim().is_empty()) {
                form = form.text(name, value.clone());
            }
        }

        let receipt: UploadReceipt = self
            .session
            .send_json(
                self.session
                    .request(Method::POST, &format!("{}/documentos-antiguos", BASE))
                    .multipart(form),
            )
            .await?;
        tracing::info!("Uploaded archive record {}", receipt.documento_id);
        Ok(receipt)
    }

    /// Mark an archive record as digitized
    #[tracing::instrument(skip(self, notas))]
    pub async fn complete_archive_document(
        &self,
        id: i64,
        calidad: ScanQuality,
        notas: Option<&str>,
    ) -> Result<ArchiveDocument> {
        let mut query = vec![("calidad", calidad.as_str())];
        if let Some(notas) = notas {
            query.push(("notas", notas));
        }
        let updated: Updated<ArchiveDocument> = self
            .session
            .send_json(
                self.session
                    .request(
                        Method::PUT,
                        &format!("{}/documentos-antiguos/{}/completar", BASE, id),
                    )
                    .query(&query),
            )
            .await?;
        Ok(updated.documento)
    }

    #[tracing::instrument(skip(self, search))]
    pub async fn search_archive(&self, search: ArchiveSearch) -> Result<ArchiveSearchResults> {
        let search = search.cleaned();
        self.session
            .send_json(
                self.session
                    .request(Method::POST, &format!("{}/documentos-antiguos/buscar", BASE))
                    .json(&search),
            )
            .await
    }

    /// Archive records still waiting to be scanned
    #[tracing::instrument(skip(self))]
    pub async fn pending_archive(&self, limit: u32) -> Result<Vec<ArchiveDocument>> {
        let list: DocumentList<ArchiveDocument> = self
            .session
            .send_json(
                self.session
                    .request(Method::GET, &format!("{}/documentos-antiguos/pendientes", BASE))
                    .query(&[("limit", limit)]),
            )
            .await?;
        Ok(list.documentos)
    }

    #[tracing::instrument(skip(self))]
    pub async fn reservation_documents(&self, reserva_id: i64) -> Result<Vec<CitizenDocument>> {
        let list: DocumentList<CitizenDocument> = self
            .session
            .get_json(&format!("{}/documentos/reserva/{}", BASE, reserva_id))
            .await?;
        Ok(list.documentos)
    }

    #[tracing::instrument(skip(self))]
    pub async fn user_documents(&self, usuario_id: i64) -> Result<Vec<CitizenDocument>> {
        let list: DocumentList<CitizenDocument> = self
            .session
            .get_json(&format!("{}/documentos/usuario/{}", BASE, usuario_id))
            .await?;
        Ok(list.documentos)
    }

    /// Approve or reject a citizen scan
    #[tracing::instrument(skip(self, notas))]
    pub async fn review_document(
        &self,
        id: i64,
        estado: ReviewStatus,
        notas: Option<String>,
    ) -> Result<CitizenDocument> {
        if estado == ReviewStatus::PendienteRevision {
            return Err(ClientError::BusinessRule(
                "La revisión debe aprobar o rechazar el documento".to_string(),
            ));
        }
        let req = ReviewRequest { estado, notas };
        let updated: Updated<CitizenDocument> = self
            .session
            .send_json(
                self.session
                    .request(Method::PUT, &format!("{}/documentos/{}/revisar", BASE, id))
                    .json(&req),
            )
            .await?;
        Ok(updated.documento)
    }

    /// Record a digitizer's workday
    #[tracing::instrument(skip(self, work), fields(fecha = %work.fecha))]
    pub async fn register_workday(&self, work: &WorkSession) -> Result<WorkSessionRecord> {
        let registered: Registered = self
            .session
            .send_json(
                self.session
                    .request(Method::POST, &format!("{}/registro-digitalizacion", BASE))
                    .json(work),
            )
            .await?;
        Ok(registered.registro)
    }

    #[tracing::instrument(skip(self))]
    pub async fn daily_report(&self, fecha: NaiveDate) -> Result<DigitizationReport> {
        self.report("diario", &[("fecha", fecha.to_string())]).await
    }

    /// Seven days starting at `fecha_inicio`
    #[tracing::instrument(skip(self))]
    pub async fn weekly_report(&self, fecha_inicio: NaiveDate) -> Result<DigitizationReport> {
        self.report("semanal", &[("fecha_inicio", fecha_inicio.to_string())])
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn monthly_report(&self, anio: i32, mes: u32) -> Result<DigitizationReport> {
        if !(1..=12).contains(&mes) {
            return Err(ClientError::BusinessRule(format!("Mes inválido: {}", mes)));
        }
        self.report(
            "mensual",
            &[("año", anio.to_string()), ("mes", mes.to_string())],
        )
        .await
    }

    async fn report(&self, period: &str, query: &[(&str, String)]) -> Result<DigitizationReport> {
        self.session
            .send_json(
                self.session
                    .request(
                        Method::GET,
                        &format!("{}/reportes/digitalizacion/{}", BASE, period),
                    )
                    .query(query),
            )
            .await
    }

    /// Overall progress of the archive backlog
    #[tracing::instrument(skip(self))]
    pub async fn archive_progress(&self) -> Result<ArchiveProgress> {
        self.session
            .get_json(&format!("{}/reportes/avance-antiguos", BASE))
            .await
    }
}
