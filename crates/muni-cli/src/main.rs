use anyhow::Result;
use clap::{Parser, Subcommand};
use muni_client::ClientError;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::App;

#[derive(Parser)]
#[command(name = "muni", version, about = "Municipal services client")]
struct Cli {
    /// Path to the client config file
    #[arg(long, env = "MUNI_CONFIG", default_value = "muni.yaml")]
    config: String,

    /// Gateway URL; overrides the config file
    #[arg(long, env = "MUNI_URL")]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with an email or RUT
    Login {
        identifier: String,
        #[arg(long, env = "MUNI_PASSWORD")]
        password: String,
        /// Treat the identifier as a RUT
        #[arg(long)]
        rut: bool,
    },
    /// Create a citizen account and log in
    Register {
        email: String,
        nombre: String,
        rut: String,
        #[arg(long, env = "MUNI_PASSWORD")]
        password: String,
        #[arg(long)]
        telefono: Option<String>,
        #[arg(long)]
        direccion: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Reservations (turnos)
    Reservations {
        #[command(subcommand)]
        command: ReservationCommands,
    },
    /// Personal documents
    Documents {
        #[command(subcommand)]
        command: DocumentCommands,
    },
    /// Municipal assistant
    Chat {
        #[command(subcommand)]
        command: ChatCommands,
    },
    /// Scanning desk for citizen documents and the paper archive
    Digitize {
        #[command(subcommand)]
        command: DigitizeCommands,
    },
    /// Staff views
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
    /// Password recovery
    PasswordReset {
        #[command(subcommand)]
        command: PasswordResetCommands,
    },
    /// Show the effective configuration
    Config,
}

#[derive(Subcommand)]
pub enum ReservationCommands {
    /// List your reservations
    List,
    Show {
        id: i64,
    },
    /// Book a slot; waits for the availability check before sending
    Create {
        /// YYYY-MM-DD
        date: String,
        /// HH:MM
        time: String,
        service_type: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Citizen to book for (staff only)
        #[arg(long)]
        user_id: Option<i64>,
        #[arg(long, requires = "user_id")]
        user_name: Option<String>,
    },
    /// Move or edit an existing reservation
    Update {
        id: i64,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        service_type: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Cancel {
        id: i64,
        #[arg(long)]
        reason: Option<String>,
    },
    /// List bookable trámites
    Types,
    /// Check whether a slot is free
    Check {
        date: String,
        time: String,
        service_type: String,
        /// Reservation being edited
        #[arg(long)]
        exclude: Option<i64>,
    },
    /// Reservations between two dates
    Calendar {
        start: String,
        end: String,
    },
    /// Check the requirements for a trámite
    Requirements {
        service_type: String,
        #[arg(long)]
        user_id: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum DocumentCommands {
    List,
    Types,
    Upload {
        file: String,
        #[arg(long = "type")]
        document_type: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    Download {
        id: i64,
        /// Directory to save into
        #[arg(long, default_value = ".")]
        output: String,
    },
    Delete {
        id: i64,
    },
    Share {
        id: i64,
        email: String,
        /// Grant write access instead of read
        #[arg(long)]
        write: bool,
    },
}

#[derive(Subcommand)]
pub enum ChatCommands {
    /// Send a message in the current conversation
    Send {
        message: String,
        /// Start a new conversation
        #[arg(long)]
        new: bool,
    },
    History {
        /// Defaults to the current conversation
        session_id: Option<String>,
    },
    Sessions,
    /// Usage counters of the assistant
    Metrics,
    /// Delete a conversation (defaults to the current one)
    Forget {
        session_id: Option<String>,
    },
    Health,
}

#[derive(Subcommand)]
pub enum DigitizeCommands {
    /// Archive records still waiting to be scanned
    Pending {
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    /// Search the archive catalogue
    Search {
        #[arg(long)]
        rut: Option<String>,
        #[arg(long)]
        nombre: Option<String>,
        #[arg(long)]
        expediente: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        tipo: Option<String>,
    },
    /// Upload a scanned archive record
    Archive {
        file: String,
        #[arg(long)]
        expediente: String,
        #[arg(long)]
        tipo: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        descripcion: String,
        #[arg(long, default_value_t = 1)]
        fojas: u32,
        #[arg(long)]
        rut: Option<String>,
        #[arg(long)]
        nombre: Option<String>,
        #[arg(long)]
        keywords: Option<String>,
        #[arg(long)]
        ubicacion: Option<String>,
    },
    /// Upload a citizen's scan
    Scan {
        file: String,
        #[arg(long)]
        reserva: Option<i64>,
        #[arg(long = "type")]
        tipo_documento: Option<String>,
    },
    /// Mark an archive record as digitized
    Complete {
        id: i64,
        /// baja, media or alta
        calidad: String,
        #[arg(long)]
        notas: Option<String>,
    },
    /// Approve or reject a citizen scan (staff)
    Review {
        id: i64,
        #[arg(long, conflicts_with = "reject")]
        approve: bool,
        #[arg(long)]
        reject: bool,
        #[arg(long)]
        notas: Option<String>,
    },
    /// Scans attached to a reservation
    Reservation {
        id: i64,
    },
    /// Record today's work
    Workday {
        /// YYYY-MM-DD
        date: String,
        #[arg(long)]
        archive: bool,
        #[arg(long)]
        documentos: u32,
        #[arg(long)]
        paginas: u32,
        #[arg(long)]
        minutos: u32,
        #[arg(long)]
        notas: Option<String>,
    },
    /// Daily report, or weekly with --week, or monthly with --month
    Report {
        /// YYYY-MM-DD; the day, or the first day of the week
        #[arg(long, conflicts_with = "month")]
        date: Option<String>,
        #[arg(long, requires = "date")]
        week: bool,
        /// YYYY-MM
        #[arg(long)]
        month: Option<String>,
    },
    /// Progress of the archive backlog
    Progress,
}

#[derive(Subcommand)]
pub enum AdminCommands {
    Dashboard,
    /// Trámite ranking for a date window
    Stats {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Search reservations
    Search {
        #[arg(long)]
        nombre: Option<String>,
        #[arg(long)]
        rut: Option<String>,
        #[arg(long)]
        tipo: Option<String>,
        #[arg(long)]
        estado: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Every reservation with applicant details
    Reservations,
    Users,
    /// Register a staff account (admin only)
    Employee {
        email: String,
        nombre: String,
        rut: String,
        #[arg(long, env = "MUNI_PASSWORD")]
        password: String,
        #[arg(long)]
        cargo: String,
        #[arg(long)]
        departamento: String,
        #[arg(long)]
        fecha_ingreso: String,
        #[arg(long, default_value = "planta")]
        tipo_contrato: String,
    },
    /// Status of a queued notification
    Task {
        task_id: String,
    },
    /// Notification queue counters
    Notifications,
}

#[derive(Subcommand)]
pub enum PasswordResetCommands {
    Request {
        email: String,
    },
    Confirm {
        token: String,
        #[arg(long, env = "MUNI_NEW_PASSWORD")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = App::new(&cli.config, cli.server.as_deref())?;
    let is_logout = matches!(cli.command, Commands::Logout);

    let result = run(&app, cli.command).await;
    if !is_logout {
        app.report_navigation();
    }

    if let Err(e) = result {
        match e.downcast_ref::<ClientError>() {
            Some(client_err) => eprintln!("Error: {}", client_err.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Login {
            identifier,
            password,
            rut,
        } => app.login(&identifier, &password, rut).await,
        Commands::Register {
            email,
            nombre,
            rut,
            password,
            telefono,
            direccion,
        } => {
            app.register(email, nombre, rut, password, telefono, direccion)
                .await
        }
        Commands::Logout => app.logout(),
        Commands::Whoami => app.whoami().await,
        Commands::Reservations { command } => app.reservations(command).await,
        Commands::Documents { command } => app.documents(command).await,
        Commands::Chat { command } => app.chat(command).await,
        Commands::Digitize { command } => app.digitize(command).await,
        Commands::Admin { command } => app.admin(command).await,
        Commands::PasswordReset { command } => app.password_reset(command).await,
        Commands::Config => app.show_config(),
    }
}
