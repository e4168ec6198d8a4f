//! Who is looking at the page, and may they open the admin console.
//!
//! A session starts `Unresolved` while the hosted auth service reports the
//! signed-in user, then settles exactly once into `Guest` or `Privileged`.
//! A browser holding the admin-session override flag skips the wait and
//! is privileged from the start.

use serde::Serialize;

use crate::flags::{ClientId, FlagKey, FlagStore, Theme};
use crate::identity::{AuthUser, Role};
use crate::repository::ProfileRepository;

/// Where non-privileged visitors are sent when they hit a privileged route.
pub const GUEST_REDIRECT: &str = "/rooms";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Unresolved,
    Guest {
        user: Option<AuthUser>,
    },
    Privileged {
        user: Option<AuthUser>,
        role: Option<Role>,
        via_override: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    /// Still waiting on the auth callback; show a placeholder
    Pending,
    Redirect(&'static str),
    Allow,
}

impl SessionState {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            SessionState::Unresolved => None,
            SessionState::Guest { user } | SessionState::Privileged { user, .. } => user.as_ref(),
        }
    }

    pub fn is_privileged(&self) -> bool {
        matches!(self, SessionState::Privileged { .. })
    }

    /// Access decision for a route that requires the operator role.
    pub fn privileged_access(&self) -> RouteAccess {
        match self {
            SessionState::Unresolved => RouteAccess::Pending,
            SessionState::Guest { .. } => RouteAccess::Redirect(GUEST_REDIRECT),
            SessionState::Privileged { .. } => RouteAccess::Allow,
        }
    }
}

pub struct SessionResolver {
    state: SessionState,
}

impl SessionResolver {
    pub fn new(override_flag: bool) -> Self {
        let state = if override_flag {
            SessionState::Privileged { user: None, role: None, via_override: true }
        } else {
            SessionState::Unresolved
        };
        Self { state }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_resolved(&self) -> bool {
        self.state != SessionState::Unresolved
    }

    /// Auth-state callback. Only the first call on an unresolved session has
    /// any effect; returns whether it did.
    pub fn on_auth_state(&mut self, user: Option<AuthUser>, role: Option<Role>) -> bool {
        if self.is_resolved() {
            return false;
        }

        self.state = match role {
            Some(role) if role.is_privileged() && user.is_some() => {
                SessionState::Privileged { user, role: Some(role), via_override: false }
            }
            _ => SessionState::Guest { user },
        };
        true
    }

    pub fn guard(&self) -> RouteAccess {
        self.state.privileged_access()
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }
}

/// Resolves a session for `user`, reading the role from the profile store.
/// A missing profile or a failed read leaves the user a guest.
pub async fn resolve_session(
    override_flag: bool,
    user: Option<AuthUser>,
    profiles: &dyn ProfileRepository,
) -> SessionState {
    let mut resolver = SessionResolver::new(override_flag);
    if resolver.is_resolved() {
        return resolver.into_state();
    }

    let role = match &user {
        Some(user) => Some(match profiles.get_profile(&user.uid).await {
            Ok(Some(profile)) => profile.role,
            Ok(None) => Role::Guest,
            Err(e) => {
                tracing::error!("Error fetching user profile {}: {}", user.uid, e);
                Role::Guest
            }
        }),
        None => None,
    };

    resolver.on_auth_state(user, role);
    resolver.into_state()
}

/// Email rule that grants the operator role at registration or first
/// sign-in. Anyone who controls a matching address gets operator access
/// without approval, so keep the allow-list short and leave the substring
/// rule unset unless the domain is owned.
#[derive(Debug, Clone, Default)]
pub struct OperatorElevation {
    allow_list: Vec<String>,
    substring: Option<String>,
}

impl OperatorElevation {
    pub fn new(allow_list: Vec<String>, substring: Option<String>) -> Self {
        Self {
            allow_list: allow_list.into_iter().map(|e| e.trim().to_lowercase()).collect(),
            substring: substring
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn grants_operator(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.allow_list.iter().any(|e| *e == email)
            || self.substring.as_deref().is_some_and(|s| email.contains(s))
    }

    pub fn initial_role(&self, email: &str) -> Role {
        if self.grants_operator(email) {
            Role::Operator
        } else {
            Role::Guest
        }
    }
}

/// Per-request view of the visitor, handed to whatever needs it.
pub trait SessionProvider {
    fn client(&self) -> Option<&ClientId>;

    fn session(&self) -> &SessionState;

    fn theme(&self) -> Theme;

    fn access(&self) -> RouteAccess {
        self.session().privileged_access()
    }
}

#[derive(Debug, Clone)]
pub struct SessionContext {
    pub client: Option<ClientId>,
    pub state: SessionState,
    pub theme: Theme,
}

impl SessionContext {
    /// Builds the context from the browser's local flags and the user the
    /// auth service reported (if any).
    pub async fn load(
        client: Option<ClientId>,
        user: Option<AuthUser>,
        flags: &dyn FlagStore,
        profiles: &dyn ProfileRepository,
    ) -> Self {
        let (override_flag, theme) = match &client {
            Some(client) => {
                let override_flag = match flags.get_flag(client, FlagKey::AdminSession).await {
                    Ok(value) => value.is_some(),
                    Err(e) => {
                        tracing::warn!("Could not read session override for {}: {}", client, e);
                        false
                    }
                };
                let theme = flags
                    .get_flag(client, FlagKey::Theme)
                    .await
                    .unwrap_or_default();
                (override_flag, Theme::from_flag(theme.as_deref()))
            }
            None => (false, Theme::default()),
        };

        let state = resolve_session(override_flag, user, profiles).await;
        Self { client, state, theme }
    }
}

impl SessionProvider for SessionContext {
    fn client(&self) -> Option<&ClientId> {
        self.client.as_ref()
    }

    fn session(&self) -> &SessionState {
        &self.state
    }

    fn theme(&self) -> Theme {
        self.theme
    }
}
