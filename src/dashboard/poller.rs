use std::future::Future;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Work driven by a [`Poller`]: a periodic tick plus on-demand commands,
/// both executed by the same task and never concurrently.
pub trait PollTask: Send + 'static {
    type Command: Send + 'static;

    fn name(&self) -> &'static str;

    /// Failures are handled inside the task; the poller keeps ticking.
    fn tick(&mut self) -> impl Future<Output = ()> + Send;

    fn handle(&mut self, command: Self::Command) -> impl Future<Output = ()> + Send;
}

#[derive(Debug)]
pub struct Poller {
    name: &'static str,
    stop_tx: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            stop_tx: None,
            handle: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Spawns the loop. Returns `false` and drops `task` when this poller is
    /// already running.
    pub fn start<T: PollTask>(
        &mut self,
        interval: Duration,
        task: T,
        commands: mpsc::Receiver<T::Command>,
    ) -> bool {
        if self.is_running() {
            log::debug!("poller_start_ignored poller={} reason=running", self.name);
            return false;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let interval = interval.max(Duration::from_millis(1));
        log::info!(
            "poller_started poller={} interval_ms={}",
            self.name,
            interval.as_millis()
        );

        self.handle = Some(tokio::spawn(run(interval, task, commands, stop_rx)));
        self.stop_tx = Some(stop_tx);
        true
    }

    /// Idempotent. Waits for an in-flight tick to finish.
    pub async fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }

        if let Some(handle) = self.handle.take() {
            if let Err(error) = handle.await {
                log::warn!("poller_join_failed poller={} error={}", self.name, error);
            }
            log::info!("poller_stopped poller={}", self.name);
        }
    }
}

async fn run<T: PollTask>(
    interval: Duration,
    mut task: T,
    mut commands: mpsc::Receiver<T::Command>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut commands_open = true;

    loop {
        tokio::select! {
            biased;
            _ = stop_rx.changed() => break,
            command = commands.recv(), if commands_open => match command {
                Some(command) => task.handle(command).await,
                None => {
                    log::debug!("poller_commands_closed poller={}", task.name());
                    commands_open = false;
                }
            },
            _ = ticker.tick() => task.tick().await,
        }
    }
}
