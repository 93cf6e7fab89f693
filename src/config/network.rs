use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkSettings {
    /// Upper bound on a single wire frame
    /// Default: 1 MiB
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Per-connection outbound queue depth (responses + notifications)
    /// Default: 64
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,

    /// Disables Nagle's algorithm on accepted sockets
    /// Default: true
    #[serde(default = "default_tcp_nodelay")]
    pub tcp_nodelay: bool,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            max_frame_bytes: default_max_frame_bytes(),
            outbound_queue: default_outbound_queue(),
            tcp_nodelay: default_tcp_nodelay(),
        }
    }
}

// Default implementations
fn default_max_frame_bytes() -> usize {
    1024 * 1024
}
fn default_outbound_queue() -> usize {
    64
}
fn default_tcp_nodelay() -> bool {
    true
}
