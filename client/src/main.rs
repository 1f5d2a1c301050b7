//! `lunch` entry point: loads settings, wires the adapters, runs one command.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use lunch_client::config::ClientSettings;
use lunch_client::domain::AppContext;
use lunch_client::domain::ports::CredentialSource;
use lunch_client::inbound::cli::{Cli, Command, Outcome, Shell};
use lunch_client::inbound::forms::{Notice, NoticeKind};
use lunch_client::inbound::render;
use lunch_client::outbound::http::HttpBackend;
use lunch_client::outbound::storage::FileStateStore;

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let mut settings = ClientSettings::load_from_iter([OsString::from("lunch")])
        .map_err(|err| eyre::eyre!("loading configuration: {err}"))?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = Some(base_url);
    }
    if let Some(state_dir) = cli.state_dir {
        settings.state_dir = Some(state_dir);
    }
    init_tracing(settings.json_logs);

    let store = FileStateStore::open(&settings.state_dir()).wrap_err("opening client state")?;
    let context = Arc::new(AppContext::init(Arc::new(store)).wrap_err("loading client state")?);
    let credentials: Arc<dyn CredentialSource> = context.clone();
    let backend = Arc::new(
        HttpBackend::new(settings.http_config()?, credentials).wrap_err("building HTTP client")?,
    );
    let shell = Shell::new(
        Arc::clone(&backend),
        backend,
        Arc::clone(&context),
        settings.poll_interval(),
    );

    let status = run(&shell, cli.command).await;
    if let Err(err) = context.teardown() {
        warn!(error = %err, "client state was not saved on exit");
    }
    Ok(status)
}

async fn run(
    shell: &Shell<HttpBackend, HttpBackend>,
    command: Command,
) -> ExitCode {
    let outcome = match command.into_request() {
        Ok((route, fields)) => shell.navigate(route, &fields).await,
        Err(err) => Err(err),
    };
    match outcome {
        Ok(Outcome::Shown(text)) => emit(&text),
        Ok(Outcome::Navigated { text, route }) => {
            emit(&text);
            info!(%route, "now at");
        }
        Ok(Outcome::Watch(session_id)) => {
            let interrupted = async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    warn!(error = %err, "Ctrl-C handler unavailable; watching until the session ends");
                    std::future::pending::<()>().await;
                }
            };
            shell
                .watch(session_id, interrupted, |snapshot| {
                    emit(&format!("---\n{}", render::candidates(snapshot)));
                })
                .await;
        }
        Err(err) => {
            warn!(code = ?err.code(), error = %err, "command failed");
            let notice = Notice {
                kind: NoticeKind::Error,
                message: err.message().to_owned(),
            };
            report(&render::notice(&notice));
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

fn init_tracing(json: bool) {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(err) = result {
        warn!(error = %err, "tracing init failed");
    }
}

fn emit(text: &str) {
    if let Err(err) = writeln!(io::stdout().lock(), "{text}") {
        warn!(error = %err, "writing to stdout failed");
    }
}

fn report(text: &str) {
    if let Err(err) = writeln!(io::stderr().lock(), "{text}") {
        warn!(error = %err, "writing to stderr failed");
    }
}
