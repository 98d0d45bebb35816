mod alerts;
mod notify;
mod poller;
mod surface;
mod thresholds;
mod window;

pub use alerts::{AlertEvent, AlertFeed, AlertTransitions};
pub use notify::{Notification, NotificationKind, NotificationSink};
pub use poller::{PollTask, Poller};
pub use surface::{Frame, RenderSurface};
pub use thresholds::{
    CACHE_HIT_RATE, CONNECTIONS, CPU, Direction, ERROR_RATE, MEMORY, QUERY_TIME, REPLICATION_LAG,
    Severity, ThresholdPair, ThresholdTable,
};
pub use window::{ChartSeries, SlidingWindow};
