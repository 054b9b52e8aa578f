//! `notedesk` command-line entry point.
//!
//! # Responsibility
//! - Map subcommands onto `notedesk_core::api` calls.
//! - Print response envelopes as JSON; exit non-zero on failure.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use log::info;
use notedesk_core::db::open_db;
use notedesk_core::{
    api, init_logging, CoreConfig, DocumentExporter, PdfExporter, PlainTextExporter, Provider,
};
use serde::Serialize;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether the command succeeded; `Err` for setup failures.
fn run(cli: Cli) -> Result<bool, String> {
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir).map_err(|err| err.to_string())?;
    }

    let db_path = cli.db.unwrap_or(config.db_path);
    let mut conn = open_db(&db_path).map_err(|err| err.to_string())?;
    let session = cli.session.as_deref();
    info!("event=cli_command module=cli status=start");

    let ok = match cli.command {
        Commands::Signup { username, password } => {
            print_json(&api::signup(&conn, &username, &password))
        }
        Commands::Login { username, password } => {
            print_json(&api::login(&conn, &username, &password))
        }
        Commands::GithubLogin {
            external_id,
            username,
            avatar_url,
        } => print_json(&api::login_third_party(
            &conn,
            Provider::GitHub,
            &external_id,
            &username,
            avatar_url.as_deref(),
        )),
        Commands::Logout => {
            let token = session.ok_or("logout requires --session or NOTEDESK_SESSION")?;
            print_json(&api::logout(&conn, token))
        }
        Commands::Whoami => print_json(&api::whoami(&conn, session)),
        Commands::List { age, page } => {
            let response = api::list_notes(&mut conn, session, &age, page.as_deref());
            print_json(&response) && response.error.is_none()
        }
        Commands::Search { term } => {
            let response = api::search_notes(&mut conn, session, &term);
            print_json(&response) && response.error.is_none()
        }
        Commands::Create { title, text } => {
            print_json(&api::create_note(&mut conn, session, &title, &text))
        }
        Commands::Get { id } => print_json(&api::get_note(&mut conn, session, &id)),
        Commands::Edit { id, title, text } => {
            print_json(&api::edit_note(&mut conn, session, &id, &title, &text))
        }
        Commands::Archive { id } => print_json(&api::archive_note(&mut conn, session, &id)),
        Commands::Unarchive { id } => print_json(&api::unarchive_note(&mut conn, session, &id)),
        Commands::Delete { id } => print_json(&api::delete_note(&mut conn, session, &id)),
        Commands::DeleteArchived => print_json(&api::delete_all_archived(&mut conn, session)),
        Commands::Export { id, text, out } => {
            let exporter: &dyn DocumentExporter = if text {
                &PlainTextExporter
            } else {
                &PdfExporter
            };
            match api::download_note(&mut conn, session, &id, exporter) {
                Ok(document) => {
                    let path = out.unwrap_or_else(|| document.file_name.clone().into());
                    std::fs::write(&path, &document.bytes)
                        .map_err(|err| format!("failed to write `{}`: {err}", path.display()))?;
                    println!("{}", path.display());
                    true
                }
                Err(err) => {
                    print_json(&serde_json::json!({ "ok": false, "error": err }));
                    false
                }
            }
        }
    };

    Ok(ok)
}

/// Prints `value` as pretty JSON and reports its `ok` field when present.
fn print_json<T: Serialize>(value: &T) -> bool {
    match serde_json::to_value(value) {
        Ok(json) => {
            let ok = json.get("ok").and_then(|ok| ok.as_bool()).unwrap_or(true);
            match serde_json::to_string_pretty(&json) {
                Ok(text) => println!("{text}"),
                Err(err) => eprintln!("error: failed to render response: {err}"),
            }
            ok
        }
        Err(err) => {
            eprintln!("error: failed to render response: {err}");
            false
        }
    }
}
