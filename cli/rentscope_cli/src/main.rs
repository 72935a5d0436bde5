use std::process::ExitCode;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use redact::Secret;
use rentscope_client::api::Credentials;
use rentscope_client::{GatewayError, RequestOptions};
use rentscope_router::{Destination, Navigator, Verdict};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::app::App;
use crate::command::{Cli, Command};
use crate::config::CliConfig;
use crate::locator::RentscopeLocator;

mod app;
mod command;
mod config;
mod locator;

#[tokio::main]
async fn main() -> Result<ExitCode, anyhow::Error> {
    let cli = Cli::parse();
    if cli.debug {
        init_telemetry();
    }

    let system_home_dir = xdg_home::home_dir()
        .context("Failed to get the system home directory from the environment")?;
    let system_home_dir = Utf8PathBuf::try_from(system_home_dir)
        .context("The system home directory is not valid UTF-8")?;
    let locator = RentscopeLocator::new(&system_home_dir);

    let config_path = cli.config.unwrap_or_else(|| locator.config_file());
    let config = CliConfig::load(&config_path)
        .with_context(|| format!("Failed to load the configuration from `{config_path}`"))?;
    let storage_path = config
        .storage_path
        .clone()
        .unwrap_or_else(|| locator.storage_file());

    let app = App::assemble(config, storage_path, &cli.location).await?;
    let outcome = match cli.command {
        Command::Login { username, password } => login(&app, username, password).await,
        Command::Logout => logout(&app).await,
        Command::Whoami => whoami(&app).await,
        Command::Locale { code } => locale(&app, code.as_deref()).await,
        Command::Role { role, clear } => role_override(&app, role.as_deref(), clear).await,
        Command::Visit { path } => visit(&app, &path).await,
        Command::Request {
            method,
            path,
            query,
            body,
        } => request(&app, method, &path, query, body.as_deref()).await,
        Command::Export { city, out } => export(&app, city, &out).await,
        Command::Crawl {
            city,
            pages,
            selenium,
        } => crawl(&app, city, pages, selenium).await,
        Command::Purge { y } => purge(&app, y).await,
    };
    report_redirect(&app);
    outcome
}

#[tracing::instrument("Log in", skip_all, fields(username = %username))]
async fn login(
    app: &App,
    username: String,
    password: Secret<String>,
) -> Result<ExitCode, anyhow::Error> {
    let credentials = Credentials { username, password };
    match app.client.auth().login(&credentials).await {
        Ok(_) => {
            let user = app.client.session().user().await?.unwrap_or_default();
            eprintln!(
                "Logged in as {}",
                user.username.as_deref().unwrap_or(&credentials.username)
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => backend_failure(app, e, "Failed to log in"),
    }
}

async fn logout(app: &App) -> Result<ExitCode, anyhow::Error> {
    let outcome = app.client.auth().logout().await;
    eprintln!("{}", translated(app, "auth.logout"));
    match outcome {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => backend_failure(app, e, "The backend failed to end the session"),
    }
}

async fn whoami(app: &App) -> Result<ExitCode, anyhow::Error> {
    let session = app.client.session();
    let snapshot = session.snapshot().await?;
    let role = session.effective_role().await?;
    let report = json!({
        "authenticated": session.is_authenticated().await?,
        "user": snapshot.user,
        "role": role,
        "role_override": snapshot.role_override,
        "language": app.locale.active().as_str(),
    });
    print_json(&report)
}

async fn locale(app: &App, code: Option<&str>) -> Result<ExitCode, anyhow::Error> {
    if let Some(code) = code {
        let active = app
            .locale
            .set_locale(code)
            .await
            .context("Failed to persist the selected language")?;
        if active != code {
            eprintln!("`{code}` is not available, using `{active}` instead");
        }
    }
    app.ui_locale.flush().await;

    let state = app.locale.state();
    let available: Vec<_> = state
        .available
        .iter()
        .map(|info| json!({ "code": info.code.as_str(), "name": info.display_name }))
        .collect();
    print_json(&json!({
        "active": state.active.as_str(),
        "fallback": state.fallback.as_str(),
        "available": available,
        "ui_locale": app.ui_locale.current().map(|l| l.name),
        "app_name": translated(app, "app.name"),
    }))
}

async fn role_override(
    app: &App,
    role: Option<&str>,
    clear: bool,
) -> Result<ExitCode, anyhow::Error> {
    let session = app.client.session();
    if clear || role.is_some() {
        session
            .set_role_override(role)
            .await
            .context("Failed to update the role override")?;
    }
    match session.role_override().await? {
        Some(role) => println!("{role}"),
        None => eprintln!("No role override is set"),
    }
    Ok(ExitCode::SUCCESS)
}

async fn visit(app: &App, path: &str) -> Result<ExitCode, anyhow::Error> {
    let verdict = app
        .guard
        .navigate(app.navigator.as_ref(), path)
        .await
        .context("Failed to evaluate the route transition")?;
    let outcome = match verdict {
        Verdict::Allowed(Destination::Route { name, params }) => {
            let params: serde_json::Map<_, _> = params
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            json!({ "allowed": true, "route": name, "params": params })
        }
        Verdict::Allowed(Destination::NotFound) => json!({ "allowed": true, "route": null }),
        Verdict::Denied { redirect } => json!({ "allowed": false, "redirect": redirect }),
    };
    print_json(&json!({
        "outcome": outcome,
        "location": app.navigator.current_path(),
        "title": app.document.title(),
    }))
}

async fn request(
    app: &App,
    method: http::Method,
    path: &str,
    query: Vec<(String, String)>,
    body: Option<&str>,
) -> Result<ExitCode, anyhow::Error> {
    let mut options = RequestOptions::new();
    for (key, value) in query {
        options = options.param(key, value);
    }
    if let Some(body) = body {
        let body: Value = serde_json::from_str(body).context("The request body is not valid JSON")?;
        options = options.json(&body)?;
    }
    match app.client.send(method, path, options).await {
        Ok(payload) => print_json(&payload),
        Err(e) => backend_failure(app, e, "The request failed"),
    }
}

async fn export(
    app: &App,
    city: Option<String>,
    out: &Utf8Path,
) -> Result<ExitCode, anyhow::Error> {
    let exported = match app.client.export().houses(&json!({ "city": city })).await {
        Ok(exported) => exported,
        Err(e) => return backend_failure(app, e, "Failed to export the listings"),
    };
    let path = exported.save_into(out).await?;
    eprintln!("Saved {} bytes to `{path}`", exported.download.len());
    Ok(ExitCode::SUCCESS)
}

async fn crawl(
    app: &App,
    city: String,
    pages: u32,
    selenium: bool,
) -> Result<ExitCode, anyhow::Error> {
    let task = json!({ "city": city, "pages": pages });
    let tasks = app.client.tasks();
    let outcome = if selenium {
        tasks.create_selenium_crawl(&task).await
    } else {
        tasks.create_crawl(&task).await
    };
    match outcome {
        Ok(payload) => print_json(&payload),
        Err(e) => backend_failure(app, e, "Failed to submit the crawl task"),
    }
}

async fn purge(app: &App, confirmed: bool) -> Result<ExitCode, anyhow::Error> {
    if !confirmed {
        eprintln!("This deletes every collected listing. Re-run with `-y` to confirm.");
        return Ok(ExitCode::FAILURE);
    }
    match app.client.settings().purge().await {
        Ok(payload) => print_json(&payload),
        Err(e) => backend_failure(app, e, "Failed to purge the collected data"),
    }
}

/// Report a failed backend call, surfacing the backend's own message if there is one.
fn backend_failure(
    app: &App,
    e: GatewayError,
    context: &str,
) -> Result<ExitCode, anyhow::Error> {
    if matches!(e, GatewayError::AuthExpired { .. }) {
        eprintln!("{context}: {}", translated(app, "auth.sessionExpired"));
        return Ok(ExitCode::FAILURE);
    }
    if let Some(detail) = e.detail() {
        eprintln!("{context}: {detail}");
        return Ok(ExitCode::FAILURE);
    }
    match e.payload() {
        Some(Value::String(text)) => {
            eprintln!("{context}: {e}\n{text}");
            return Ok(ExitCode::FAILURE);
        }
        Some(payload) => {
            eprintln!("{context}: {e}\n{payload:#}");
            return Ok(ExitCode::FAILURE);
        }
        None => {}
    }
    Err(anyhow::Error::new(e).context(context.to_owned()))
}

/// Let the user know if a 401 sent the client back to the login page.
fn report_redirect(app: &App) {
    if app.navigator.navigations() == 0 {
        return;
    }
    let location = app.navigator.current_path();
    if rentscope_router::is_login_location(&location) {
        eprintln!("Redirected to `{location}`");
    }
}

fn translated(app: &App, key: &str) -> String {
    app.locale.translate(key).unwrap_or_else(|| key.to_owned())
}

fn print_json(value: &Value) -> Result<ExitCode, anyhow::Error> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render the output")?;
    println!("{rendered}");
    Ok(ExitCode::SUCCESS)
}

fn init_telemetry() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(false)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::uptime());
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rentscope_client=debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
