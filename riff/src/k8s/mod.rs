/*
 * Kubernetes collaborators of the CLI: the generic resource client, the
 * readiness waiter and the log streamer. Each sits behind a trait so
 * commands can be exercised against in-memory fakes.
 */

mod client;
mod connection;
mod logs;
mod wait;

#[cfg(test)]
pub mod fake;

pub use client::from_dynamic;
pub use client::to_dynamic;
pub use client::Cluster;
pub use client::KubeCluster;
pub use client::Resources;
pub use connection::Connection;
pub use logs::KubeLogs;
pub use logs::LogSelector;
pub use logs::LogStreamer;
pub use wait::check_ready;
pub use wait::KubeWaiter;
pub use wait::ReadyWaiter;
