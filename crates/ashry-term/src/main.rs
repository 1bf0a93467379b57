use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use ashry_client::ExecutionClient;
use ashry_client::ExecutionClientFactory;
use ashry_client::wait_finished;
use ashry_client::SyncConnection;
use ashry_term::application::cli;
use ashry_term::application::ui;
use ashry_term::domain::models::Action;
use ashry_term::domain::models::Event;
use ashry_term::domain::models::Problem;
use ashry_term::domain::services::actions::ActionsService;
use ashry_term::domain::services::SessionProps;
use ashry_term::Config;
use ashry_term::ConfigKey;
use ashry_types::Language;
use tokio::sync::mpsc;
use tokio::task;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;

const SYNC_CLOSE_GRACE: Duration = Duration::from_millis(500);

/// The terminal owns stdout, so logs go to a JSON file instead.
fn init_logging() -> Result<WorkerGuard> {
    let log_file = PathBuf::from(Config::get(ConfigKey::LogFile));
    let directory = log_file
        .parent()
        .map(|parent| parent.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = log_file
        .file_name()
        .context("log-file must name a file")?
        .to_os_string();
    std::fs::create_dir_all(&directory)?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let level = LevelFilter::from_str(&Config::get(ConfigKey::LogLevel))?;

    tracing_subscriber::fmt()
        .json()
        .with_max_level(level)
        .with_target(true)
        .with_writer(writer)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;

    return Ok(guard);
}

#[tokio::main]
async fn main() -> Result<()> {
    let ready = cli::parse().await?;
    if !ready {
        return Ok(());
    }

    let _log_guard = init_logging()?;

    std::panic::set_hook(Box::new(|panic_info| {
        ui::destruct_terminal_for_panic();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let language = Language::from_str(&Config::get(ConfigKey::Language))?;
    let execution_client =
        ExecutionClientFactory::create_http_client(Config::get(ConfigKey::ServerUrl));

    let notice = match execution_client.health_check().await {
        Ok(()) => None,
        Err(err) => {
            tracing::warn!(error = ?err, "execution server is not reachable");
            Some(format!(
                "Execution server at {} is not reachable: {err}",
                Config::get(ConfigKey::ServerUrl)
            ))
        }
    };

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
    let (sync_tx, sync_rx) = mpsc::unbounded_channel();

    let connection = SyncConnection::open(&Config::get(ConfigKey::SyncUrl), sync_tx);
    let sync_finished = connection.finished();

    let mut background_futures = task::JoinSet::new();
    background_futures.spawn(async move {
        ActionsService::start(execution_client, event_tx, &mut action_rx).await
    });

    let session_props = SessionProps {
        problem: Problem::default(),
        language,
        connection: Box::new(connection),
        notice,
    };

    let ui_future = ui::start(session_props, action_tx, event_rx, sync_rx);

    let result = tokio::select!(
        res = background_futures.join_next() => match res {
            Some(joined) => joined?,
            None => Ok(()),
        },
        res = ui_future => res,
    );

    if result.is_err() {
        ui::destruct_terminal_for_panic();
    }

    // The session is gone by now and has cancelled the sync task; give it
    // time to send its close frame before the runtime shuts down.
    if !wait_finished(&sync_finished, SYNC_CLOSE_GRACE).await {
        tracing::warn!("sync connection did not close in time");
    }

    return result;
}
