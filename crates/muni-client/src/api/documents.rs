use muni_common::models::auth::Acknowledgement;
use muni_common::models::document::{
    Document, DocumentType, DocumentUpdate, DocumentUpload, SharePermission, ShareRequest,
};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::error::Result;
use crate::session::SessionManager;

const BASE: &str = "/api/documents";

/// File contents fetched from the documents service
#[derive(Debug, Clone)]
pub struct DownloadedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct DocumentsApi {
    session: SessionManager,
}

impl DocumentsApi {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_mine(&self) -> Result<Vec<Document>> {
        self.session.get_json(&format!("{}/my-documents", BASE)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn document_types(&self) -> Result<Vec<DocumentType>> {
        self.session
            .get_json(&format!("{}/document-types", BASE))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Document> {
        self.session
            .get_json(&format!("{}/documents/{}", BASE, id))
            .await
    }

    /// Upload a file as multipart form data
    #[tracing::instrument(skip(self, bytes, meta), fields(size = bytes.len(), document_type = %meta.document_type))]
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        meta: &DocumentUpload,
    ) -> Result<Document> {
        let mut form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()))
            .text("document_type", meta.document_type.clone());
        if let Some(title) = meta.title.as_ref().filter(|t| !t.is_empty()) {
            form = form.text("title", title.clone());
        }
        if let Some(description) = meta.description.as_ref().filter(|d| !d.is_empty()) {
            form = form.text("description", description.clone());
        }
        if let Some(tags) = meta.joined_tags() {
            form = form.text("tags", tags);
        }

        let document: Document = self
            .session
            .send_json(
                self.session
                    .request(Method::POST, &format!("{}/upload", BASE))
                    .multipart(form),
            )
            .await?;
        tracing::info!("Uploaded document {}", document.id);
        Ok(document)
    }

    /// Download a document; the name comes from `Content-Disposition` when present
    #[tracing::instrument(skip(self))]
    pub async fn download(&self, id: i64) -> Result<DownloadedDocument> {
        let response = self
            .session
            .send(
                self.session
                    .request(Method::GET, &format!("{}/download/{}", BASE, id)),
            )
            .await?;
        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| format!("document_{}", id));
        let bytes = response.bytes().await?.to_vec();
        Ok(DownloadedDocument { filename, bytes })
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update(&self, id: i64, update: &DocumentUpdate) -> Result<Document> {
        self.session
            .send_json(
                self.session
                    .request(Method::PUT, &format!("{}/documents/{}", BASE, id))
                    .json(update),
            )
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<Acknowledgement> {
        self.session
            .send_json(
                self.session
                    .request(Method::DELETE, &format!("{}/documents/{}", BASE, id)),
            )
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn share(
        &self,
        id: i64,
        shared_with_email: &str,
        permission: SharePermission,
    ) -> Result<Acknowledgement> {
        let req = ShareRequest {
            shared_with_email: shared_with_email.to_string(),
            permission,
        };
        self.session
            .send_json(
                self.session
                    .request(Method::POST, &format!("{}/documents/{}/share", BASE, id))
                    .json(&req),
            )
            .await
    }
}

/// Extract the file name from a `Content-Disposition` header value
fn filename_from_disposition(value: &str) -> Option<String> {
    let (_, rest) = value.split_once("filename=")?;
    let name = rest.split(';').next().unwrap_or(rest).trim().replace('"', "");
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
