use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use muni_client::api::{
    AdminApi, AuthApi, ChatbotApi, DigitizationApi, DocumentsApi, NotificationsApi,
    ReservationsApi,
};
use muni_client::availability::check_fail_closed;
use muni_client::config::{load_config_or_default, ClientConfig};
use muni_client::form::{Applicant, ReservationForm};
use muni_client::gate::RoleGate;
use muni_client::navigator::RecordingNavigator;
use muni_client::storage::FileStorage;
use muni_client::{Route, SessionManager};
use muni_common::models::admin::{SearchCriteria, StatsQuery};
use muni_common::models::auth::{EmployeeRequest, LoginType, RegisterRequest, Role, User};
use muni_common::models::document::{
    ArchiveDocument, ArchiveSearch, ArchiveUpload, DigitizationReport, DocumentUpload,
    ReviewStatus, ScanQuality, SharePermission, WorkKind, WorkSession,
};
use muni_common::models::reservation::{Reservation, ReservationSlot};
use muni_common::validation::{parse_date, validate_employee, validate_registration};

use crate::{
    AdminCommands, ChatCommands, DigitizeCommands, DocumentCommands, PasswordResetCommands,
    ReservationCommands,
};

pub struct App {
    config: ClientConfig,
    session: SessionManager,
    nav: Arc<RecordingNavigator>,
}

impl App {
    pub fn new(config_path: &str, server: Option<&str>) -> Result<Self> {
        let mut config = load_config_or_default(config_path)?;
        if let Some(server) = server {
            config.base_url = server.to_string();
        }
        tracing::debug!("Using gateway {}", config.base_url);

        let storage = Arc::new(FileStorage::new(&config.storage_path));
        let nav = Arc::new(RecordingNavigator::new());
        let session = SessionManager::new(&config, storage, nav.clone())
            .context("Failed to create session")?;
        Ok(Self {
            config,
            session,
            nav,
        })
    }

    /// Tell the user about redirects the session or a gate performed.
    pub fn report_navigation(&self) {
        for route in self.nav.visits() {
            match route {
                Route::Login => {
                    eprintln!("La sesión terminó. Inicia sesión nuevamente con `muni login`.")
                }
                other => eprintln!("Redirigido a {}", other),
            }
        }
    }

    async fn gate(&self, required: &[Role]) -> Result<User> {
        let gate = RoleGate::new(Arc::new(self.session.clone()), self.nav.clone());
        match gate.authorize(required).await {
            Some(user) => Ok(user),
            None => {
                let roles: Vec<&str> = required.iter().map(|r| r.as_str()).collect();
                bail!("Acceso denegado: se requiere rol {}", roles.join(" o "))
            }
        }
    }

    // ─── Session ────────────────────────────────────────────────────────

    pub async fn login(&self, identifier: &str, password: &str, rut: bool) -> Result<()> {
        let login_type = if rut {
            LoginType::Rut
        } else {
            self.config.default_login_type
        };
        self.session.login(identifier, password, login_type).await?;
        let user = self.session.current_user().await?;
        println!("Bienvenido/a, {} ({})", user.display_name(), user.role);
        Ok(())
    }

    pub async fn register(
        &self,
        email: String,
        nombre: String,
        rut: String,
        password: String,
        telefono: Option<String>,
        direccion: Option<String>,
    ) -> Result<()> {
        let req = RegisterRequest {
            email,
            nombre,
            rut: muni_common::rut::format_rut(&rut),
            password,
            telefono,
            direccion,
        };
        for warning in validate_registration(&req)? {
            println!("WARN: {}", warning);
        }
        self.session.register(&req).await?;
        println!("Cuenta creada para {}", req.email);
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.session.logout()?;
        println!("Sesión cerrada.");
        Ok(())
    }

    pub async fn whoami(&self) -> Result<()> {
        if !self.session.is_authenticated() {
            println!("No hay sesión activa.");
            return Ok(());
        }
        let user = self.session.current_user().await?;
        println!("ID:     {}", user.id);
        println!("Nombre: {}", user.display_name());
        println!("Email:  {}", user.email);
        println!("RUT:    {}", user.rut.as_deref().unwrap_or("-"));
        println!("Rol:    {}", user.role);
        Ok(())
    }

    pub fn show_config(&self) -> Result<()> {
        let yaml = serde_yml::to_string(&self.config).context("Failed to render config")?;
        print!("{}", yaml);
        Ok(())
    }

    // ─── Reservations ───────────────────────────────────────────────────

    pub async fn reservations(&self, command: ReservationCommands) -> Result<()> {
        let api = ReservationsApi::new(self.session.clone());
        match command {
            ReservationCommands::List => {
                let view = api.load_view().await?;
                println!("Reservas de {}:", view.user.display_name());
                print_reservations(&view.reservations);
            }
            ReservationCommands::Show { id } => {
                let r = api.get(id).await?;
                println!("ID:          {}", r.id);
                println!("Fecha:       {} {}", r.fecha, r.hora.format("%H:%M"));
                println!("Trámite:     {}", r.tipo_tramite.as_deref().unwrap_or("-"));
                println!("Solicitante: {} ({})", r.usuario_nombre, r.usuario_id);
                println!("Estado:      {}", r.estado);
                if !r.descripcion.is_empty() {
                    println!("Descripción: {}", r.descripcion);
                }
            }
            ReservationCommands::Create {
                date,
                time,
                service_type,
                description,
                user_id,
                user_name,
            } => {
                let user = self.session.current_user().await?;
                let mut form = ReservationForm::new(api, self.config.debounce());
                form.set_date(date);
                form.set_time(time);
                form.set_service_type(service_type);
                form.set_description(description);
                if let Some(id) = user_id {
                    if !user.is_staff() {
                        bail!("Solo el personal municipal puede reservar para otra persona");
                    }
                    form.set_applicant(Some(Applicant {
                        id,
                        nombre: user_name.unwrap_or_default(),
                    }));
                }
                let check = form.validate_requirements().await?;
                for warning in &check.advertencias {
                    println!("AVISO: {}", warning);
                }
                let saved = form.submit(&user).await?;
                println!(
                    "Reserva {} creada para el {} a las {}",
                    saved.id,
                    saved.fecha,
                    saved.hora.format("%H:%M")
                );
            }
            ReservationCommands::Update {
                id,
                date,
                time,
                service_type,
                description,
            } => {
                let user = self.session.current_user().await?;
                let existing = api.get(id).await?;
                let mut form = ReservationForm::new(api, self.config.debounce());
                form.edit(&existing);
                if let Some(date) = date {
                    form.set_date(date);
                }
                if let Some(time) = time {
                    form.set_time(time);
                }
                if let Some(service_type) = service_type {
                    form.set_service_type(service_type);
                    form.validate_requirements().await?;
                }
                if let Some(description) = description {
                    form.set_description(description);
                }
                let saved = form.submit(&user).await?;
                println!("Reserva {} actualizada", saved.id);
            }
            ReservationCommands::Cancel { id, reason } => {
                let ack = api.cancel(id, reason.as_deref()).await?;
                println!(
                    "{}",
                    ack.message.unwrap_or_else(|| format!("Reserva {} anulada", id))
                );
            }
            ReservationCommands::Types => {
                let types = api.service_types().await?;
                if types.is_empty() {
                    println!("No hay trámites disponibles.");
                    return Ok(());
                }
                println!("{:20} {:35} CATEGORÍA", "ID", "NOMBRE");
                println!("{}", "-".repeat(70));
                for t in types {
                    println!(
                        "{:20} {:35} {}",
                        t.id,
                        t.nombre,
                        t.categoria.as_deref().unwrap_or("-")
                    );
                }
            }
            ReservationCommands::Check {
                date,
                time,
                service_type,
                exclude,
            } => {
                let slot = ReservationSlot::new(date, time, service_type);
                let result = check_fail_closed(&api, &slot, exclude).await;
                let label = if result.available {
                    "DISPONIBLE"
                } else {
                    "NO DISPONIBLE"
                };
                println!("{} {}", label, result.message);
            }
            ReservationCommands::Calendar { start, end } => {
                let list = api
                    .by_date_range(parse_date(&start)?, parse_date(&end)?)
                    .await?;
                print_reservations(&list);
            }
            ReservationCommands::Requirements {
                service_type,
                user_id,
            } => {
                let check = api.validate_requirements(&service_type, user_id).await?;
                if check.puede_realizar {
                    println!("[OK] Cumple los requisitos para {}", service_type);
                } else {
                    println!("[FAIL] No puede realizar {}", service_type);
                }
                for b in &check.bloqueantes {
                    println!("  BLOQUEANTE: {}", b);
                }
                for w in &check.advertencias {
                    println!("  AVISO: {}", w);
                }
                for i in &check.informativos {
                    println!("  INFO: {}", i);
                }
                for d in &check.documentos_requeridos {
                    println!("  DOCUMENTO: {}", d);
                }
            }
        }
        Ok(())
    }

    // ─── Documents ──────────────────────────────────────────────────────

    pub async fn documents(&self, command: DocumentCommands) -> Result<()> {
        let api = DocumentsApi::new(self.session.clone());
        match command {
            DocumentCommands::List => {
                let docs = api.list_mine().await?;
                if docs.is_empty() {
                    println!("No tienes documentos.");
                    return Ok(());
                }
                println!("{:6} {:20} TÍTULO", "ID", "TIPO");
                println!("{}", "-".repeat(60));
                for d in docs {
                    println!(
                        "{:<6} {:20} {}",
                        d.id,
                        d.document_type,
                        d.title.as_deref().unwrap_or("-")
                    );
                }
            }
            DocumentCommands::Types => {
                for t in api.document_types().await? {
                    println!("{:25} {}", t.name, t.display_name.as_deref().unwrap_or(""));
                }
            }
            DocumentCommands::Upload {
                file,
                document_type,
                title,
                description,
                tags,
            } => {
                let (file_name, bytes) = read_upload(&file)?;
                let meta = DocumentUpload {
                    document_type,
                    title,
                    description,
                    tags,
                };
                let doc = api.upload(&file_name, bytes, &meta).await?;
                println!("Documento {} subido", doc.id);
            }
            DocumentCommands::Download { id, output } => {
                let doc = api.download(id).await?;
                let target = Path::new(&output).join(&doc.filename);
                std::fs::write(&target, &doc.bytes)
                    .with_context(|| format!("Failed to write {}", target.display()))?;
                println!("Guardado en {} ({} bytes)", target.display(), doc.bytes.len());
            }
            DocumentCommands::Delete { id } => {
                api.delete(id).await?;
                println!("Documento {} eliminado", id);
            }
            DocumentCommands::Share { id, email, write } => {
                let permission = if write {
                    SharePermission::Write
                } else {
                    SharePermission::Read
                };
                api.share(id, &email, permission).await?;
                println!("Documento {} compartido con {} ({})", id, email, permission);
            }
        }
        Ok(())
    }

    // ─── Chat ───────────────────────────────────────────────────────────

    pub async fn chat(&self, command: ChatCommands) -> Result<()> {
        let api = ChatbotApi::new(self.session.clone());
        match command {
            ChatCommands::Send { message, new } => {
                let reply = api.send_message(&message, new).await?;
                println!("{}", reply.response);
                if let Some(error) = reply.error {
                    tracing::debug!("Chatbot replied offline: {}", error);
                }
            }
            ChatCommands::History { session_id } => {
                let id = self.chat_session(session_id)?;
                let history = api.history(&id).await?;
                for msg in history.messages {
                    println!("[{}] {}", msg.role, msg.content);
                }
            }
            ChatCommands::Sessions => {
                for s in api.sessions().await? {
                    let count = s.message_count.map(|c| c.to_string());
                    println!(
                        "{:40} {:6} {}",
                        s.session_id,
                        count.as_deref().unwrap_or("-"),
                        s.last_message.as_deref().unwrap_or("")
                    );
                }
            }
            ChatCommands::Metrics => {
                let m = api.metrics().await?;
                println!("Conversaciones: {}", m.total_conversations);
                println!("Mensajes:       {}", m.total_messages);
                println!("Tokens:         {}", m.total_tokens);
                println!("Respuesta prom: {:.0} ms", m.avg_response_time_ms);
            }
            ChatCommands::Forget { session_id } => {
                let id = self.chat_session(session_id)?;
                api.delete_session(&id).await?;
                println!("Conversación {} eliminada", id);
            }
            ChatCommands::Health => {
                let health = api.health().await?;
                let label = if health.is_ok() { "OK" } else { "DEGRADED" };
                println!("{} {}", label, health.status);
            }
        }
        Ok(())
    }

    fn chat_session(&self, explicit: Option<String>) -> Result<String> {
        explicit
            .or_else(|| self.session.chat_session_id())
            .context("No hay conversación activa")
    }

    // ─── Digitization ───────────────────────────────────────────────────

    pub async fn digitize(&self, command: DigitizeCommands) -> Result<()> {
        let required: &[Role] = match command {
            DigitizeCommands::Search { .. } => {
                &[Role::Admin, Role::Employee, Role::Digitalizador]
            }
            DigitizeCommands::Review { .. } | DigitizeCommands::Reservation { .. } => {
                Role::staff()
            }
            _ => Role::digitization(),
        };
        let user = self.gate(required).await?;

        let api = DigitizationApi::new(self.session.clone());
        match command {
            DigitizeCommands::Pending { limit } => {
                print_archive(&api.pending_archive(limit).await?);
            }
            DigitizeCommands::Search {
                rut,
                nombre,
                expediente,
                year,
                tipo,
            } => {
                let search = ArchiveSearch {
                    rut,
                    nombre,
                    expediente,
                    anio: year,
                    tipo_tramite: tipo,
                    ..Default::default()
                };
                let found = api.search_archive(search).await?;
                println!("{} documento(s)", found.count);
                print_archive(&found.documentos);
            }
            DigitizeCommands::Archive {
                file,
                expediente,
                tipo,
                year,
                descripcion,
                fojas,
                rut,
                nombre,
                keywords,
                ubicacion,
            } => {
                let (file_name, bytes) = read_upload(&file)?;
                let meta = ArchiveUpload {
                    numero_expediente: expediente,
                    tipo_tramite: tipo,
                    anio_tramite: year,
                    descripcion,
                    numero_fojas: fojas,
                    ciudadano_rut: rut,
                    ciudadano_nombre: nombre,
                    palabras_clave: keywords,
                    ubicacion_fisica: ubicacion,
                };
                let receipt = api.upload_archive_document(&file_name, bytes, &meta).await?;
                println!("Expediente registrado como documento {}", receipt.documento_id);
            }
            DigitizeCommands::Scan {
                file,
                reserva,
                tipo_documento,
            } => {
                let (file_name, bytes) = read_upload(&file)?;
                let receipt = api
                    .upload_citizen_document(&file_name, bytes, reserva, tipo_documento.as_deref())
                    .await?;
                println!("Documento {} subido", receipt.documento_id);
            }
            DigitizeCommands::Complete { id, calidad, notas } => {
                let calidad: ScanQuality = calidad.parse().map_err(anyhow::Error::msg)?;
                let doc = api
                    .complete_archive_document(id, calidad, notas.as_deref())
                    .await?;
                println!("Expediente {} digitalizado ({})", doc.numero_expediente, calidad);
            }
            DigitizeCommands::Review {
                id,
                approve,
                reject,
                notas,
            } => {
                let estado = match (approve, reject) {
                    (true, false) => ReviewStatus::Aprobado,
                    (false, true) => ReviewStatus::Rechazado,
                    _ => bail!("Indica --approve o --reject"),
                };
                let doc = api.review_document(id, estado, notas).await?;
                println!("Documento {} {}", doc.id, doc.estado);
            }
            DigitizeCommands::Reservation { id } => {
                let docs = api.reservation_documents(id).await?;
                if docs.is_empty() {
                    println!("La reserva {} no tiene documentos.", id);
                }
                for d in docs {
                    println!(
                        "{:<6} {:22} {:20} {}",
                        d.id,
                        d.tipo_documento.as_deref().unwrap_or("-"),
                        d.estado,
                        d.nombre_archivo
                    );
                }
            }
            DigitizeCommands::Workday {
                date,
                archive,
                documentos,
                paginas,
                minutos,
                notas,
            } => {
                let work = WorkSession {
                    fecha: parse_date(&date)?,
                    digitalizador_id: user.id,
                    digitalizador_nombre: user.display_name().to_string(),
                    tipo_trabajo: if archive {
                        WorkKind::Antiguo
                    } else {
                        WorkKind::Nuevo
                    },
                    documentos_procesados: documentos,
                    paginas_digitalizadas: paginas,
                    tiempo_trabajado_minutos: minutos,
                    notas,
                };
                api.register_workday(&work).await?;
                println!("Jornada del {} registrada", work.fecha);
            }
            DigitizeCommands::Report { date, week, month } => {
                let report = match (date, month) {
                    (Some(date), _) if week => api.weekly_report(parse_date(&date)?).await?,
                    (Some(date), _) => api.daily_report(parse_date(&date)?).await?,
                    (None, Some(month)) => {
                        let (anio, mes) = parse_month(&month)?;
                        api.monthly_report(anio, mes).await?
                    }
                    (None, None) => bail!("Indica --date o --month"),
                };
                print_report(&report);
            }
            DigitizeCommands::Progress => {
                let p = api.archive_progress().await?;
                println!("Expedientes:   {}", p.avance.total);
                println!("  completados: {}", p.avance.completados);
                println!("  en proceso:  {}", p.avance.en_proceso);
                println!("  pendientes:  {}", p.avance.pendientes);
                println!("Avance:        {:.1}%", p.avance.porcentaje_completado);
                println!(
                    "Meta:          {:.2}% de {}",
                    p.meta_alcanzada_porcentaje, p.meta_total
                );
            }
        }
        Ok(())
    }

    // ─── Admin ──────────────────────────────────────────────────────────

    pub async fn admin(&self, command: AdminCommands) -> Result<()> {
        let required: &[Role] = match command {
            AdminCommands::Employee { .. } => &[Role::Admin],
            _ => Role::staff(),
        };
        let staff = self.gate(required).await?;
        tracing::debug!("Admin command by user {}", staff.id);

        let admin = AdminApi::new(self.session.clone());
        match command {
            AdminCommands::Dashboard => {
                let d = admin.dashboard().await?;
                println!("Reservas totales:     {}", d.total_reservas);
                println!("  activas:            {}", d.reservas_activas);
                println!("  completadas:        {}", d.reservas_completadas);
                println!("  anuladas:           {}", d.reservas_anuladas);
                println!("Documentos completos: {}", d.docs_completos);
                println!("  incompletos:        {}", d.docs_incompletos);
                println!("  pendientes:         {}", d.docs_pendientes);
            }
            AdminCommands::Stats { from, to } => {
                let query = StatsQuery {
                    fecha_inicio: from.as_deref().map(parse_date).transpose()?,
                    fecha_fin: to.as_deref().map(parse_date).transpose()?,
                };
                let stats = admin.tramite_stats(&query).await?;
                println!("Trámites: {}", stats.total_tramites);
                for entry in stats.ranking_tramites {
                    println!("  {:35} {}", entry.nombre, entry.total);
                }
                if !stats.ranking_categorias.is_empty() {
                    println!("Categorías:");
                    for entry in stats.ranking_categorias {
                        println!("  {:35} {}", entry.nombre, entry.total);
                    }
                }
            }
            AdminCommands::Search {
                nombre,
                rut,
                tipo,
                estado,
                from,
                to,
            } => {
                let criteria = SearchCriteria {
                    nombre,
                    rut: rut.map(|r| muni_common::rut::format_rut(&r)),
                    tipo_tramite: tipo,
                    estado,
                    fecha_inicio: from.as_deref().map(parse_date).transpose()?,
                    fecha_fin: to.as_deref().map(parse_date).transpose()?,
                    ..Default::default()
                };
                let results = admin.search_reservations(criteria).await?;
                println!("{} resultados", results.count);
                print_reservations(&results.resultados);
            }
            AdminCommands::Reservations => {
                let list = ReservationsApi::new(self.session.clone())
                    .list_detailed()
                    .await?;
                print_reservations(&list);
            }
            AdminCommands::Users => {
                let users = AuthApi::new(self.session.clone()).list_users().await?;
                println!("{:6} {:30} {:10} NOMBRE", "ID", "EMAIL", "ROL");
                println!("{}", "-".repeat(70));
                for u in users {
                    println!("{:<6} {:30} {:10} {}", u.id, u.email, u.role, u.display_name());
                }
            }
            AdminCommands::Employee {
                email,
                nombre,
                rut,
                password,
                cargo,
                departamento,
                fecha_ingreso,
                tipo_contrato,
            } => {
                let req = EmployeeRequest {
                    email,
                    nombre,
                    rut: muni_common::rut::format_rut(&rut),
                    password,
                    cargo,
                    departamento,
                    fecha_ingreso,
                    tipo_contrato,
                };
                validate_employee(&req)?;
                let user = AuthApi::new(self.session.clone())
                    .register_employee(&req)
                    .await?;
                println!("Funcionario/a {} registrado/a con ID {}", user.email, user.id);
            }
            AdminCommands::Task { task_id } => {
                let status = NotificationsApi::new(self.session.clone())
                    .task_status(&task_id)
                    .await?;
                println!("Tarea:  {}", status.task_id);
                println!("Estado: {}", status.status);
                if let Some(error) = status.error {
                    println!("Error:  {}", error);
                }
            }
            AdminCommands::Notifications => {
                let stats = NotificationsApi::new(self.session.clone()).stats().await?;
                println!("Servicio:        {}", stats.service);
                println!("Redis conectado: {}", stats.redis_connected);
                println!("Tareas en cola:  {}", stats.pending_tasks);
            }
        }
        Ok(())
    }

    // ─── Password reset ─────────────────────────────────────────────────

    pub async fn password_reset(&self, command: PasswordResetCommands) -> Result<()> {
        let api = AuthApi::new(self.session.clone());
        let ack = match command {
            PasswordResetCommands::Request { email } => api.request_password_reset(&email).await?,
            PasswordResetCommands::Confirm { token, password } => {
                if password.chars().count() < muni_common::validation::MIN_PASSWORD_LEN {
                    bail!(
                        "La contraseña debe tener al menos {} caracteres",
                        muni_common::validation::MIN_PASSWORD_LEN
                    );
                }
                api.confirm_password_reset(&token, &password).await?
            }
        };
        println!("{}", ack.message.unwrap_or_else(|| "Solicitud enviada".to_string()));
        Ok(())
    }
}

fn read_upload(file: &str) -> Result<(String, Vec<u8>)> {
    let path = Path::new(file);
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.to_string());
    Ok((file_name, bytes))
}

/// Parse `YYYY-MM`
fn parse_month(value: &str) -> Result<(i32, u32)> {
    let parsed = value
        .trim()
        .split_once('-')
        .and_then(|(y, m)| Some((y.parse().ok()?, m.parse().ok()?)));
    match parsed {
        Some((anio, mes)) if (1..=12).contains(&mes) => Ok((anio, mes)),
        _ => bail!("Invalid month '{}', expected YYYY-MM", value),
    }
}

fn print_archive(docs: &[ArchiveDocument]) {
    if docs.is_empty() {
        println!("Sin documentos.");
        return;
    }
    println!("{:6} {:16} {:6} {:18} {:12}", "ID", "EXPEDIENTE", "AÑO", "TRÁMITE", "ESTADO");
    println!("{}", "-".repeat(64));
    for d in docs {
        println!(
            "{:<6} {:16} {:<6} {:18} {:?}",
            d.id, d.numero_expediente, d.anio_tramite, d.tipo_tramite, d.estado_digitalizacion
        );
    }
}

fn print_report(report: &DigitizationReport) {
    if let Some(fecha) = report.fecha {
        println!("Fecha:      {}", fecha);
    }
    if let Some(periodo) = &report.periodo {
        println!("Periodo:    {}", periodo);
    }
    let totals = &report.estadisticas;
    println!("Documentos: {}", totals.documentos_procesados);
    println!("Páginas:    {}", totals.paginas_digitalizadas);
    println!("Minutos:    {}", totals.tiempo_trabajado_minutos);
    for r in &report.registros {
        println!(
            "  {} {:20} {:?} {} docs",
            r.session.fecha,
            r.session.digitalizador_nombre,
            r.session.tipo_trabajo,
            r.session.documentos_procesados
        );
    }
}

fn print_reservations(list: &[Reservation]) {
    if list.is_empty() {
        println!("No hay reservas.");
        return;
    }
    println!(
        "{:6} {:12} {:6} {:25} {:12} SOLICITANTE",
        "ID", "FECHA", "HORA", "TRÁMITE", "ESTADO"
    );
    println!("{}", "-".repeat(85));
    for r in list {
        println!(
            "{:<6} {:12} {:6} {:25} {:12} {}",
            r.id,
            r.fecha.to_string(),
            r.hora.format("%H:%M").to_string(),
            r.tipo_tramite.as_deref().unwrap_or("-"),
            r.estado,
            r.usuario_nombre
        );
    }
}
