use std::fmt;
use std::sync::Mutex;

/// Views the front end can be sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    /// General menu; default landing page for authenticated users
    Menu,
    Reservations,
    Documents,
    Admin,
    /// Archive digitization desk
    Digitization,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Menu => "/menu",
            Route::Reservations => "/reservas",
            Route::Documents => "/documentos",
            Route::Admin => "/admin",
            Route::Digitization => "/digitalizador",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Performs navigation on behalf of the session and the role gate.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Only logs the navigation; for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!("Navigating to {}", route);
    }
}

/// Remembers every navigation so the caller can react after the fact.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<Route> {
        self.visits.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn count(&self, route: Route) -> usize {
        self.visits().iter().filter(|r| **r == route).count()
    }

    pub fn last(&self) -> Option<Route> {
        self.visits().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!("Navigating to {}", route);
        if let Ok(mut visits) = self.visits.lock() {
            visits.push(route);
        }
    }
}
