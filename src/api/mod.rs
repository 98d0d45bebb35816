mod client;
mod envelope;
mod error;
mod model;

pub use client::ApiClient;
pub use envelope::Envelope;
pub use error::ApiError;
pub use model::{
    ActivityStats, CacheStats, ClusterEvent, ClusterStatus, ClusterSummary, Component,
    ConnectionStats, DatabaseInfo, DatabaseStatistics, DatabaseStats, ExecuteQueryRequest,
    HistoryRecord, IndexStat, LockStat, PerformanceInsight, PerformanceMetrics,
    PerformanceSummary, PoolNode, PoolProcess, PoolStats, QueryResult, QueryStatRow,
    QueryStatistics, QuerySummary, ReplicationStat, ResourceUsage, TableStat, parse_timestamp,
};
