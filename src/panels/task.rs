use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, oneshot, watch};

use super::{Panel, PanelAction, RefreshContext, Refreshed};
use crate::api::{ApiClient, ApiError};
use crate::config::RuntimeConfig;
use crate::dashboard::{Frame, Notification, NotificationSink, PollTask, RenderSurface};

/// Shared collaborators every panel task gets a handle to.
#[derive(Clone)]
pub struct PanelDeps {
    pub client: ApiClient,
    pub runtime: Arc<RwLock<RuntimeConfig>>,
    pub notifications: NotificationSink,
}

#[derive(Debug)]
pub enum PanelRequest {
    Refresh,
    Action(PanelAction),
}

/// A request plus an optional channel for the human-readable outcome.
#[derive(Debug)]
pub struct PanelCommand {
    pub request: PanelRequest,
    pub reply: Option<oneshot::Sender<Result<String, String>>>,
}

impl PanelCommand {
    pub fn new(request: PanelRequest) -> (Self, oneshot::Receiver<Result<String, String>>) {
        let (reply_tx, reply_rx) = oneshot::channel();
        (
            Self {
                request,
                reply: Some(reply_tx),
            },
            reply_rx,
        )
    }
}

/// Owns one panel; ticks and operator commands run here one at a time, so
/// panel state needs no locking.
pub struct PanelTask<P: Panel> {
    panel: P,
    deps: PanelDeps,
    frames: watch::Sender<Frame>,
}

impl<P: Panel> PanelTask<P> {
    pub fn new(panel: P, deps: PanelDeps) -> (Self, watch::Receiver<Frame>) {
        let (frames, frames_rx) = watch::channel(Frame::empty(P::NAME, P::SLOTS));
        (
            Self {
                panel,
                deps,
                frames,
            },
            frames_rx,
        )
    }

    async fn poll(&mut self) -> Result<(), ApiError> {
        let runtime = self.deps.runtime.read().await.clone();
        let ctx = RefreshContext {
            client: self.deps.client.clone(),
            runtime,
            notifications: self.deps.notifications.clone(),
            now: Utc::now(),
        };

        let refreshed = self.panel.refresh(&ctx).await?;
        self.publish(ctx.now);
        match refreshed {
            Refreshed::Complete => Ok(()),
            Refreshed::Partial(error) => Err(error),
        }
    }

    fn publish(&self, now: DateTime<Utc>) {
        let mut surface = RenderSurface::with_slots(P::SLOTS);
        self.panel.render(&mut surface, now);

        tracing::info!(
            target: "panel",
            module = "panels",
            panel = P::NAME,
            filled_slots = surface.lines().len(),
            "panel_rendered"
        );

        self.frames.send_replace(Frame {
            panel: P::NAME,
            rendered_at: Some(now),
            surface,
        });
    }

    /// A failed poll leaves the last frame untouched; a partial one has
    /// already published.
    fn report_failure(&self, error: &ApiError) {
        log::warn!(
            "panel_tick_failed panel={} code={} error={}",
            P::NAME,
            error.code(),
            error
        );
        self.deps.notifications.send(Notification::error(
            P::NAME,
            format!("Failed to load {} data: {}", P::NAME, error.user_message()),
        ));
    }

    async fn refresh_now(&mut self) -> Result<String, String> {
        match self.poll().await {
            Ok(()) => Ok(format!("{} refreshed", P::NAME)),
            Err(error) => {
                self.report_failure(&error);
                Err(error.user_message())
            }
        }
    }

    async fn apply(&mut self, action: PanelAction) -> Result<String, String> {
        let outcome = self.panel.apply(action)?;
        self.publish(Utc::now());
        if outcome.refetch
            && let Err(error) = self.poll().await
        {
            self.report_failure(&error);
        }

        self.deps
            .notifications
            .send(Notification::info(P::NAME, outcome.message.clone()));
        Ok(outcome.message)
    }
}

impl<P: Panel> PollTask for PanelTask<P> {
    type Command = PanelCommand;

    fn name(&self) -> &'static str {
        P::NAME
    }

    async fn tick(&mut self) {
        if let Err(error) = self.poll().await {
            self.report_failure(&error);
        }
    }

    async fn handle(&mut self, command: PanelCommand) {
        let result = match command.request {
            PanelRequest::Refresh => self.refresh_now().await,
            PanelRequest::Action(action) => self.apply(action).await,
        };

        if let Some(reply) = command.reply
            && reply.send(result).is_err()
        {
            log::debug!("panel_reply_dropped panel={}", P::NAME);
        }
    }
}
