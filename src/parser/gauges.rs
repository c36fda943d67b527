//! Known point-in-time readings.
//!
//! Server status output does not say which values are cumulative, so the
//! readings that are magnitudes rather than counters are listed here.
//! Everything else is treated as a counter.

use ahash::AHashSet;
use once_cell::sync::Lazy;

use crate::sample::MetricKind;

static GAUGE_NAMES: &[&str] = &[
    // Connections and threads
    "threads_cached",
    "threads_connected",
    "threads_running",
    "max_used_connections",
    "open_files",
    "open_streams",
    "open_table_definitions",
    "open_tables",
    "slave_open_temp_tables",
    "replica_open_temp_tables",
    "slave_running",
    "seconds_behind_master",
    // Key cache
    "key_blocks_not_flushed",
    "key_blocks_unused",
    "key_blocks_used",
    // Query cache
    "qcache_free_blocks",
    "qcache_free_memory",
    "qcache_queries_in_cache",
    "qcache_total_blocks",
    // InnoDB buffer pool
    "innodb_buffer_pool_bytes_data",
    "innodb_buffer_pool_bytes_dirty",
    "innodb_buffer_pool_pages_data",
    "innodb_buffer_pool_pages_dirty",
    "innodb_buffer_pool_pages_free",
    "innodb_buffer_pool_pages_latched",
    "innodb_buffer_pool_pages_misc",
    "innodb_buffer_pool_pages_old",
    "innodb_buffer_pool_pages_total",
    "innodb_page_size",
    // InnoDB pending work
    "innodb_data_pending_fsyncs",
    "innodb_data_pending_reads",
    "innodb_data_pending_writes",
    "innodb_os_log_pending_fsyncs",
    "innodb_os_log_pending_writes",
    "innodb_row_lock_current_waits",
    "innodb_row_lock_time_avg",
    "innodb_row_lock_time_max",
    "innodb_num_open_files",
    "innodb_history_list_length",
    "innodb_checkpoint_age",
    "innodb_ibuf_size",
    "innodb_mem_total",
    // Galera
    "wsrep_apply_window",
    "wsrep_cert_deps_distance",
    "wsrep_cert_index_size",
    "wsrep_cluster_size",
    "wsrep_cluster_status",
    "wsrep_commit_window",
    "wsrep_flow_control_paused",
    "wsrep_local_index",
    "wsrep_local_recv_queue",
    "wsrep_local_recv_queue_avg",
    "wsrep_local_send_queue",
    "wsrep_local_send_queue_avg",
    "wsrep_local_state",
    "wsrep_ready",
];

static GAUGES: Lazy<AHashSet<&'static str>> = Lazy::new(|| GAUGE_NAMES.iter().copied().collect());

/// Classifies a lowercased reading name.
pub fn classify(name: &str) -> MetricKind {
    if GAUGES.contains(name) {
        MetricKind::Gauge
    } else {
        MetricKind::Counter
    }
}
