//! Command implementations.
//!
//! Each command opens the session for the selected app, makes sure the
//! identity store has been initialized, and returns the text to print.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use servicehub_api::{AuthFlow, Credentials, FlowAction, FlowError, ServiceClient};
use servicehub_session::{AppFlavor, FileStore, IdentityStore, NavigationGate};

use crate::config::CliConfig;

/// An initialized session for one app flavor.
pub struct Session {
    flow: AuthFlow,
    gate: NavigationGate,
}

impl Session {
    /// Open the session file, read the stored identity, and attach a gate.
    pub async fn open(config: &CliConfig, flavor: AppFlavor) -> Result<Self> {
        let path = config
            .session_path(flavor)
            .context("could not determine session file location")?;
        tracing::debug!(?path, %flavor, "Opening session");

        let store = Arc::new(IdentityStore::new(Arc::new(FileStore::new(path))));
        let gate = NavigationGate::new(&store, flavor);
        store.initialize().await;

        let client = ServiceClient::new(&config.api_url)?;
        Ok(Self {
            flow: AuthFlow::new(client, flavor, store),
            gate,
        })
    }

    fn flavor(&self) -> AppFlavor {
        self.flow.flavor()
    }
}

fn surface(err: FlowError, flavor: AppFlavor, action: FlowAction) -> anyhow::Error {
    let message = err.user_message(flavor, action);
    anyhow::Error::new(err).context(message)
}

/// Sign in and persist the session.
pub async fn login(session: &Session, email: &str, password: &str) -> Result<String> {
    let creds = Credentials::new(email, password);
    session
        .flow
        .sign_in(&creds)
        .await
        .map_err(|e| surface(e, session.flavor(), FlowAction::SignIn))?;

    Ok(format!("Signed in as {email}.\n{}", status(session)))
}

/// Create an account, optionally signing in with it afterwards.
pub async fn register(
    session: &Session,
    email: &str,
    password: &str,
    confirm: Option<&str>,
    sign_in: bool,
) -> Result<String> {
    let creds = Credentials::new(email, password);
    session
        .flow
        .register(&creds, confirm)
        .await
        .map_err(|e| surface(e, session.flavor(), FlowAction::Register))?;

    if !sign_in {
        return Ok("User registered successfully.".to_string());
    }

    session
        .flow
        .sign_in(&creds)
        .await
        .map_err(|e| surface(e, session.flavor(), FlowAction::SignIn))?;
    Ok(format!(
        "User registered successfully.\nSigned in as {email}.\n{}",
        status(session)
    ))
}

/// Sign out; succeeds when already signed out.
pub async fn logout(session: &Session) -> Result<String> {
    let was_signed_in = session.flow.store().is_authenticated();
    session
        .flow
        .sign_out()
        .await
        .context("failed to clear the stored session")?;

    let headline = if was_signed_in {
        "Signed out."
    } else {
        "Already signed out."
    };
    Ok(format!("{headline}\n{}", status(session)))
}

/// Describe the identity and the screen tree the gate selects.
pub fn status(session: &Session) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "app:      {}", session.flavor());
    let _ = writeln!(out, "identity: {}", session.flow.store().current());
    let _ = writeln!(out, "gate:     {}", session.gate.state());

    if let Some(tree) = session.gate.active_tree() {
        let initial = tree.initial_route();
        let screens: Vec<String> = tree
            .screens()
            .iter()
            .map(|s| {
                if *s == initial {
                    format!("{s} (initial)")
                } else {
                    s.to_string()
                }
            })
            .collect();
        let _ = write!(out, "screens:  {}", screens.join(", "));
    }
    out
}

/// Show the effective configuration.
pub fn config_show(config: &CliConfig, path: Option<&Path>, flavor: AppFlavor) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "config file:  {}",
        path.map_or_else(|| "<none>".to_string(), |p| p.display().to_string())
    );
    let _ = writeln!(out, "api url:      {}", config.api_url);
    let _ = writeln!(out, "app:          {flavor}");
    let _ = write!(
        out,
        "session file: {}",
        config
            .session_path(flavor)
            .map_or_else(|| "<none>".to_string(), |p| p.display().to_string())
    );
    out
}

/// Persist a new backend URL.
pub fn config_set_url(path: &Path, url: &str) -> Result<String> {
    let mut config = CliConfig::load_from(path);
    config.api_url = url.trim_end_matches('/').to_string();
    config.save_to(path)?;
    Ok(format!("api url set to {}", config.api_url))
}
