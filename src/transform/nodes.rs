use crate::api::{PoolNode, PoolProcess};

const PRIMARY: &str = "primary";
const STANDBY: &str = "standby";

#[derive(Debug, Clone, PartialEq)]
pub struct NodesOverview {
    pub node_count: usize,
    pub active_connections: usize,
    pub primary_select_count: f64,
    pub standby_select_count: f64,
    pub max_replication_delay: Option<f64>,
}

pub fn nodes_overview(nodes: &[PoolNode], processes: &[PoolProcess]) -> NodesOverview {
    NodesOverview {
        node_count: nodes.len(),
        active_connections: active_pool_connections(processes),
        primary_select_count: select_count_for_role(nodes, PRIMARY),
        standby_select_count: select_count_for_role(nodes, STANDBY),
        max_replication_delay: nodes
            .iter()
            .filter_map(|node| node.replication_delay)
            .reduce(f64::max),
    }
}

/// Pool processes currently bound to a database.
pub fn active_pool_connections(processes: &[PoolProcess]) -> usize {
    processes
        .iter()
        .filter(|process| {
            process
                .database
                .as_deref()
                .is_some_and(|database| !database.is_empty())
        })
        .count()
}

/// Select count of the first node with `role`, 0 when there is none.
pub fn select_count_for_role(nodes: &[PoolNode], role: &str) -> f64 {
    nodes
        .iter()
        .find(|node| node.role.as_deref() == Some(role))
        .and_then(|node| node.select_cnt)
        .unwrap_or(0.0)
}
