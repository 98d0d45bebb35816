use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedReceiver;

use super::{PanelDeps, RefreshContext};
use crate::api::ApiClient;
use crate::config::{Api, Config, RuntimeConfig};
use crate::dashboard::{Notification, NotificationSink, RenderSurface};
use crate::panels::Panel;

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(&Api {
        base_url: base_url.to_string(),
        request_timeout_secs: 5,
    })
    .expect("client should build")
}

pub(crate) fn context(
    base_url: &str,
    now: DateTime<Utc>,
) -> (RefreshContext, UnboundedReceiver<Notification>) {
    let config: Config = toml::from_str("").expect("empty config should parse");
    let (notifications, rx) = NotificationSink::channel();
    let client = client(base_url);

    (
        RefreshContext {
            client,
            runtime: RuntimeConfig::from_config(&config),
            notifications,
            now,
        },
        rx,
    )
}

pub(crate) fn render<P: Panel>(panel: &P, now: DateTime<Utc>) -> RenderSurface {
    let mut surface = RenderSurface::with_slots(P::SLOTS);
    panel.render(&mut surface, now);
    surface
}

/// Task collaborators pointed at `base_url`.
pub(crate) fn deps(base_url: &str) -> (PanelDeps, UnboundedReceiver<Notification>) {
    let config: Config = toml::from_str("").expect("empty config should parse");
    let (notifications, rx) = NotificationSink::channel();
    (
        PanelDeps {
            client: client(base_url),
            runtime: Arc::new(RwLock::new(RuntimeConfig::from_config(&config))),
            notifications,
        },
        rx,
    )
}
