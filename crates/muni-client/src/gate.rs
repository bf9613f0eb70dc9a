use std::sync::Arc;

use async_trait::async_trait;
use muni_common::models::auth::{Role, User};
use tokio::sync::watch;

use crate::error::Result;
use crate::navigator::{Navigator, Route};
use crate::session::SessionManager;

/// Placeholder shown while the gate resolves the session.
pub const LOADING_MESSAGE: &str = "Verificando permisos...";

/// Where the gate learns who is logged in.
#[async_trait]
pub trait UserSource: Send + Sync {
    fn is_authenticated(&self) -> bool;
    async fn current_user(&self) -> Result<User>;
}

#[async_trait]
impl UserSource for SessionManager {
    fn is_authenticated(&self) -> bool {
        SessionManager::is_authenticated(self)
    }

    async fn current_user(&self) -> Result<User> {
        SessionManager::current_user(self).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    Resolving,
    Allowed(User),
    Denied,
}

impl GateState {
    /// Placeholder to show instead of the child view, if any
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            GateState::Resolving => Some(LOADING_MESSAGE),
            _ => None,
        }
    }
}

/// Result of rendering through the gate
#[derive(Debug, PartialEq)]
pub enum Gated<V> {
    Shown(V),
    Redirected(Route),
}

impl<V> Gated<V> {
    pub fn shown(self) -> Option<V> {
        match self {
            Gated::Shown(view) => Some(view),
            Gated::Redirected(_) => None,
        }
    }
}

/// Admits a view only for sessions holding one of the required roles.
///
/// Denied sessions are sent to the general menu. When the user fetch was
/// itself rejected with a 401 the session manager has already sent the user
/// to the login view, so the gate does not navigate a second time.
pub struct RoleGate {
    source: Arc<dyn UserSource>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<GateState>,
}

impl RoleGate {
    pub fn new(source: Arc<dyn UserSource>, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(GateState::Resolving);
        Self {
            source,
            navigator,
            state,
        }
    }

    pub fn state(&self) -> GateState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.state.subscribe()
    }

    /// Resolve the session against `required`; `None` means denied.
    pub async fn authorize(&self, required: &[Role]) -> Option<User> {
        self.resolve(required).await.ok()
    }

    /// Decide admission, returning the route the user was sent to on denial.
    #[tracing::instrument(skip(self))]
    async fn resolve(&self, required: &[Role]) -> std::result::Result<User, Route> {
        self.state.send_replace(GateState::Resolving);

        if !self.source.is_authenticated() {
            tracing::info!("No session; redirecting to {}", Route::Menu);
            return Err(self.deny(Route::Menu, true));
        }

        match self.source.current_user().await {
            Ok(user) if user.has_any_role(required) => {
                tracing::debug!("User {} admitted as {}", user.id, user.role);
                self.state.send_replace(GateState::Allowed(user.clone()));
                Ok(user)
            }
            Ok(user) => {
                tracing::info!("User {} with role {} denied", user.id, user.role);
                Err(self.deny(Route::Menu, true))
            }
            Err(e) if e.is_unauthorized() => {
                // The session manager already navigated to the login view
                tracing::info!("Session rejected while resolving permissions");
                Err(self.deny(Route::Login, false))
            }
            Err(e) => {
                tracing::warn!("Failed to resolve current user: {}", e);
                Err(self.deny(Route::Menu, true))
            }
        }
    }

    fn deny(&self, route: Route, navigate: bool) -> Route {
        self.state.send_replace(GateState::Denied);
        if navigate {
            self.navigator.navigate(route);
        }
        route
    }

    /// Build the child view only once the session is admitted.
    pub async fn render<V, F>(&self, required: &[Role], view: F) -> Gated<V>
    where
        F: FnOnce(&User) -> V,
    {
        match self.resolve(required).await {
            Ok(user) => Gated::Shown(view(&user)),
            Err(route) => Gated::Redirected(route),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::navigator::RecordingNavigator;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeUsers {
        authenticated: bool,
        reply: Mutex<Option<Result<User>>>,
        fetches: AtomicUsize,
    }

    impl FakeUsers {
        fn new(authenticated: bool, reply: Result<User>) -> Arc<Self> {
            Arc::new(Self {
                authenticated,
                reply: Mutex::new(Some(reply)),
                fetches: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl UserSource for FakeUsers {
        fn is_authenticated(&self) -> bool {
            self.authenticated
        }

        async fn current_user(&self) -> Result<User> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Err(ClientError::Decode("no reply".into())))
        }
    }

    fn user(role: Role) -> User {
        User {
            id: 7,
            email: "ana@muni.cl".into(),
            nombre: "Ana".into(),
            role,
            ..Default::default()
        }
    }

    const STAFF: &[Role] = &[Role::Admin, Role::Employee];

    #[tokio::test]
    async fn test_employee_admitted_to_staff_view() {
        let users = FakeUsers::new(true, Ok(user(Role::Employee)));
        let nav = Arc::new(RecordingNavigator::new());
        let gate = RoleGate::new(users, nav.clone());
        assert_eq!(gate.state(), GateState::Resolving);
        assert_eq!(gate.state().placeholder(), Some(LOADING_MESSAGE));

        let gated = gate.render(STAFF, |u| format!("panel de {}", u.nombre)).await;

        assert_eq!(gated, Gated::Shown("panel de Ana".to_string()));
        assert!(matches!(gate.state(), GateState::Allowed(u) if u.role == Role::Employee));
        assert_eq!(gate.state().placeholder(), None);
        assert!(nav.visits().is_empty());
    }

    #[tokio::test]
    async fn test_citizen_redirected_to_menu() {
        let users = FakeUsers::new(true, Ok(user(Role::User)));
        let nav = Arc::new(RecordingNavigator::new());
        let gate = RoleGate::new(users, nav.clone());
        let built = AtomicBool::new(false);

        let gated = gate
            .render(&[Role::Admin], |_| built.store(true, Ordering::SeqCst))
            .await;

        assert_eq!(gated, Gated::Redirected(Route::Menu));
        assert!(!built.load(Ordering::SeqCst));
        assert_eq!(gate.state(), GateState::Denied);
        assert_eq!(nav.visits(), vec![Route::Menu]);
    }

    #[tokio::test]
    async fn test_unknown_role_gets_clean_denial() {
        let users = FakeUsers::new(true, Ok(user(Role::Other)));
        let nav = Arc::new(RecordingNavigator::new());
        let gate = RoleGate::new(users, nav.clone());

        assert_eq!(gate.render(STAFF, |_| ()).await, Gated::Redirected(Route::Menu));
        assert_eq!(nav.visits(), vec![Route::Menu]);
    }

    #[tokio::test]
    async fn test_digitalizador_reaches_archive_views_only() {
        let nav = Arc::new(RecordingNavigator::new());
        let archive = RoleGate::new(FakeUsers::new(true, Ok(user(Role::Digitalizador))), nav.clone());
        assert!(archive.authorize(Role::digitization()).await.is_some());

        let staff = RoleGate::new(FakeUsers::new(true, Ok(user(Role::Digitalizador))), nav.clone());
        assert!(staff.authorize(STAFF).await.is_none());
        assert_eq!(nav.visits(), vec![Route::Menu]);
    }

    #[tokio::test]
    async fn test_unauthenticated_skips_fetch() {
        let users = FakeUsers::new(false, Ok(user(Role::Admin)));
        let nav = Arc::new(RecordingNavigator::new());
        let gate = RoleGate::new(users.clone(), nav.clone());

        assert!(gate.authorize(&[Role::Admin]).await.is_none());
        assert_eq!(users.fetches.load(Ordering::SeqCst), 0);
        assert_eq!(nav.last(), Some(Route::Menu));
    }

    #[tokio::test]
    async fn test_fetch_failure_redirects_to_menu() {
        let users = FakeUsers::new(
            true,
            Err(ClientError::Server {
                status: 500,
                detail: None,
            }),
        );
        let nav = Arc::new(RecordingNavigator::new());
        let gate = RoleGate::new(users, nav.clone());

        assert!(gate.authorize(STAFF).await.is_none());
        assert_eq!(nav.visits(), vec![Route::Menu]);
    }

    #[tokio::test]
    async fn test_rejected_session_does_not_navigate_again() {
        let users = FakeUsers::new(true, Err(ClientError::Unauthorized { detail: None }));
        let nav = Arc::new(RecordingNavigator::new());
        let gate = RoleGate::new(users, nav.clone());

        let gated = gate.render(STAFF, |_| ()).await;
        assert_eq!(gated, Gated::Redirected(Route::Login));
        assert_eq!(gate.state(), GateState::Denied);
        assert!(nav.visits().is_empty());
    }
}
