use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use redact::Secret;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit tracing output to stderr.
    ///
    /// The filter can be customised via `RUST_LOG`.
    #[clap(long, env = "RENTSCOPE_DEBUG")]
    pub debug: bool,
    /// The configuration file to load.
    ///
    /// Defaults to `~/.rentscope/rentscope.yml`. A missing file is not an error.
    #[clap(long, env = "RENTSCOPE_CONFIG")]
    pub config: Option<Utf8PathBuf>,
    /// The location the client is on when the command runs.
    ///
    /// It becomes the redirect target if the backend reports that the session expired.
    #[clap(long, default_value = "/")]
    pub location: String,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and persist the session.
    Login {
        #[clap(short, long)]
        username: String,
        #[clap(long, env = "RENTSCOPE_PASSWORD", hide_env_values = true)]
        password: Secret<String>,
    },
    /// Log out, clearing the persisted session.
    Logout,
    /// Show the current session.
    Whoami,
    /// Show the active language or switch to a new one.
    Locale {
        /// The language to switch to, e.g. `en-US`.
        #[arg(index = 1)]
        code: Option<String>,
    },
    /// Show, set or clear the role override sent as `X-User-Role`.
    Role {
        #[arg(index = 1, conflicts_with = "clear")]
        role: Option<String>,
        #[clap(long)]
        clear: bool,
    },
    /// Run a route transition through the navigation guard.
    Visit {
        /// The target location, query string included.
        #[arg(index = 1)]
        path: String,
    },
    /// Issue an arbitrary call through the gateway client.
    Request {
        #[arg(index = 1)]
        method: http::Method,
        /// The path, relative to the API base URL.
        #[arg(index = 2)]
        path: String,
        /// A `key=value` query parameter. Can be repeated.
        #[clap(short, long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,
        /// A JSON request body.
        #[clap(long)]
        body: Option<String>,
    },
    /// Export the collected listings as CSV.
    Export {
        #[clap(long)]
        city: Option<String>,
        /// The directory the file is saved into.
        #[clap(long, default_value = ".")]
        out: Utf8PathBuf,
    },
    /// Submit a crawl task.
    Crawl {
        #[clap(long)]
        city: String,
        #[clap(long, default_value_t = 1)]
        pages: u32,
        /// Use the browser-driven crawler.
        #[clap(long)]
        selenium: bool,
    },
    /// Delete all collected data. Requires administrator rights.
    Purge {
        /// Don't ask for confirmation.
        #[clap(short, long)]
        y: bool,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("`{s}` is not a `key=value` pair"))?;
    if key.is_empty() {
        return Err(format!("`{s}` has an empty key"));
    }
    Ok((key.to_owned(), value.to_owned()))
}
