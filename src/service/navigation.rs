use crate::session::{SessionState, SessionStore};
use serde::Serialize;
use tokio::sync::watch;

pub const HOME_PATH: &str = "/";
pub const LOCATIONS_PATH: &str = "/locations";
pub const ABOUT_PATH: &str = "/about";
pub const MY_PROFILE_PATH: &str = "/myProfile";
pub const LOGIN_REGISTER_PATH: &str = "/login-register";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub path: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    authenticated: bool,
}

impl NavState {
    pub fn from_session(session: &SessionStore) -> Self {
        Self::from_state(session.state())
    }

    pub fn from_state(state: SessionState) -> Self {
        Self {
            authenticated: state == SessionState::Authenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn links(&self) -> Vec<NavLink> {
        let account = if self.authenticated {
            NavLink {
                label: "My Profile",
                path: MY_PROFILE_PATH,
            }
        } else {
            NavLink {
                label: "Sign Up",
                path: LOGIN_REGISTER_PATH,
            }
        };

        vec![
            NavLink {
                label: "Home",
                path: HOME_PATH,
            },
            NavLink {
                label: "Locations",
                path: LOCATIONS_PATH,
            },
            NavLink {
                label: "About Us",
                path: ABOUT_PATH,
            },
            account,
        ]
    }

    /// Follows login/logout without polling.
    pub fn watch(session: &SessionStore) -> NavWatcher {
        NavWatcher { rx: session.subscribe() }
    }
}

pub struct NavWatcher {
    rx: watch::Receiver<SessionState>,
}

impl NavWatcher {
    pub fn current(&self) -> NavState {
        NavState::from_state(*self.rx.borrow())
    }

    /// Waits for the next login state change. `None` once the session store is gone.
    pub async fn changed(&mut self) -> Option<NavState> {
        self.rx.changed().await.ok()?;
        Some(NavState::from_state(*self.rx.borrow_and_update()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGuard {
    Allow,
    RedirectTo(&'static str),
}

/// Protected views only check that a token is present.
pub fn guard(session: &SessionStore) -> RouteGuard {
    if session.is_authenticated() {
        RouteGuard::Allow
    } else {
        RouteGuard::RedirectTo(LOGIN_REGISTER_PATH)
    }
}
