//! Bahumati admin console.
//!
//! A terminal console for platform operators: onboarding agents review KYC
//! and create users, reconciliation agents settle withdrawals and audit
//! events, super-admins manage ads, agents, and system configuration. All
//! data lives in the platform backend; the console talks to it over HTTPS
//! with a bearer token obtained at login.

use anyhow::Result;
use bahumati::session::{FileStore, SessionManager};
use pico_args::Arguments;
use std::path::PathBuf;
use std::sync::Arc;

use ba_console::app::App;

const HELP: &str = "\
Bahumati admin console

USAGE:
  ba_console [OPTIONS]

OPTIONS:
  --server URL          Backend base URL  [default: $BAHUMATI_API_URL or http://localhost:5000/api/v1]
  --username NAME       Prefill the login username
  --password PASS       Prefill the login password
  --session-file PATH   Session file  [default: $BAHUMATI_SESSION_FILE or .bahumati-session.json]

FLAGS:
  -h, --help            Print help information
";

struct Args {
    server_url: String,
    username: Option<String>,
    password: Option<String>,
    session_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        server_url: pargs
            .opt_value_from_str("--server")?
            .or_else(|| std::env::var("BAHUMATI_API_URL").ok())
            .unwrap_or_else(|| "http://localhost:5000/api/v1".to_string()),
        username: pargs.opt_value_from_str("--username")?,
        password: pargs.opt_value_from_str("--password")?,
        session_file: pargs
            .opt_value_from_str("--session-file")?
            .or_else(|| std::env::var("BAHUMATI_SESSION_FILE").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(".bahumati-session.json")),
    };

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let store = Arc::new(FileStore::new(args.session_file));
    let session = SessionManager::new(args.server_url, store);

    let prefill = match (args.username, args.password) {
        (Some(username), Some(password)) => Some((username, password)),
        (Some(username), None) => Some((username, String::new())),
        _ => None,
    };

    let app = App::new(session, prefill);

    let terminal = ratatui::init();
    let result = app.run(terminal).await;
    ratatui::restore();
    result
}
