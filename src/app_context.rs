use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, mpsc, watch};

use crate::api::ApiClient;
use crate::config::{Config, RuntimeConfig};
use crate::console::QueryConsole;
use crate::dashboard::Frame;
use crate::panels::{PanelCommand, PanelDeps, PanelRequest};

/// Operator-side end of a running panel task.
#[derive(Clone)]
pub struct PanelHandle {
    pub name: &'static str,
    pub commands: mpsc::Sender<PanelCommand>,
    pub frames: watch::Receiver<Frame>,
}

impl PanelHandle {
    /// Queues a request and waits for the panel task to answer it.
    pub async fn request(&self, request: PanelRequest) -> Result<String, String> {
        let (command, reply) = PanelCommand::new(request);
        self.commands
            .send(command)
            .await
            .map_err(|_| format!("{} panel is not running", self.name))?;
        reply
            .await
            .map_err(|_| format!("{} panel dropped the request", self.name))?
    }

    pub fn frame(&self) -> Frame {
        self.frames.borrow().clone()
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,
    pub config_path: String,
    pub client: ApiClient,
    pub panels: Arc<Vec<PanelHandle>>,
    pub console: Arc<Mutex<QueryConsole>>,
}

impl AppContext {
    pub fn new(
        config: Config,
        config_path: impl Into<String>,
        deps: PanelDeps,
        panels: Vec<PanelHandle>,
    ) -> Self {
        let console = QueryConsole::new(deps.client.clone(), deps.notifications.clone());
        Self {
            config,
            runtime_config: deps.runtime,
            config_path: config_path.into(),
            client: deps.client,
            panels: Arc::new(panels),
            console: Arc::new(Mutex::new(console)),
        }
    }

    pub async fn update_runtime_config(&self, runtime_config: RuntimeConfig) {
        let mut current = self.runtime_config.write().await;
        *current = runtime_config;
    }

    pub fn panel(&self, name: &str) -> Option<&PanelHandle> {
        self.panels
            .iter()
            .find(|panel| panel.name.eq_ignore_ascii_case(name))
    }
}
