use std::path::{Path, PathBuf};

use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use tokio::sync::mpsc;

use crate::app_context::AppContext;
use crate::config::{ConfigError, RuntimeReload, load_runtime_config};

/// Swaps in the new thresholds and alert caps; running panels read them on
/// their next tick.
async fn apply_runtime_reload_from_path(
    app_context: &AppContext,
    config_path: &Path,
) -> Result<RuntimeReload, ConfigError> {
    let reload = load_runtime_config(config_path, &app_context.config)?;
    app_context
        .update_runtime_config(reload.runtime.clone())
        .await;
    Ok(reload)
}

/// Editors often save by writing a temp file and renaming it over the
/// original, so the parent directory is watched and events are matched by
/// file name.
fn touches_config(event: &Event, config_path: &Path) -> bool {
    let relevant_kind = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    );
    relevant_kind
        && event
            .paths
            .iter()
            .any(|changed| changed.file_name() == config_path.file_name())
}

fn watch_directory(config_path: &Path) -> &Path {
    config_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn log_reload(config_path: &Path, reload: &RuntimeReload) {
    log::info!(
        "config_hot_reload_applied path={} thresholds={} alert_feed_capacity={} alert_visible={}",
        config_path.display(),
        reload.runtime.thresholds.iter().count(),
        reload.runtime.alerts.feed_capacity,
        reload.runtime.alerts.visible,
    );
    if !reload.restart_required.is_empty() {
        log::warn!(
            "config_restart_required path={} sections={}",
            config_path.display(),
            reload.restart_required.join(",")
        );
    }
}

pub(super) fn start_config_hot_reload_job(app_context: AppContext) {
    let config_path = PathBuf::from(&app_context.config_path);

    tokio::spawn(async move {
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let watcher = RecommendedWatcher::new(
            move |result| {
                let _ = events_tx.send(result);
            },
            NotifyConfig::default(),
        );
        let mut watcher = match watcher {
            Ok(watcher) => watcher,
            Err(error) => {
                log::warn!(
                    "config_hot_reload_disabled path={} reason=watcher_init error={}",
                    config_path.display(),
                    error
                );
                return;
            }
        };

        let directory = watch_directory(&config_path);
        if let Err(error) = watcher.watch(directory, RecursiveMode::NonRecursive) {
            log::warn!(
                "config_hot_reload_disabled path={} reason=watch_failed error={}",
                directory.display(),
                error
            );
            return;
        }
        log::debug!("config_hot_reload_watching path={}", config_path.display());

        while let Some(event) = events.recv().await {
            match event {
                Ok(event) if touches_config(&event, &config_path) => {
                    match apply_runtime_reload_from_path(&app_context, &config_path).await {
                        Ok(reload) => log_reload(&config_path, &reload),
                        Err(error) => log::warn!(
                            "config_hot_reload_rejected path={} error={}",
                            config_path.display(),
                            error
                        ),
                    }
                }
                Ok(_) => {}
                Err(error) => log::warn!(
                    "config_watch_error path={} error={}",
                    config_path.display(),
                    error
                ),
            }
        }
    });
}
