/*
 * A Config wired to in-memory collaborators, with the output captured.
 */

use crate::config::Config;
use crate::config::CLI_NAME;
use crate::k8s::fake::FakeCluster;
use crate::k8s::fake::FakeLogs;
use crate::k8s::fake::FakeWaiter;
use crate::output::testing::buffered;
use crate::output::testing::Buffer;
use crate::pack::fake::FakeBuilder;

use std::sync::Arc;
use std::time::Duration;

pub const TEST_NAMESPACE: &str = "default";

pub struct Harness {
    pub config: Config,
    pub cluster: Arc<FakeCluster>,
    pub builder: Arc<FakeBuilder>,
    pub logs: Arc<FakeLogs>,
    stdout: Buffer,
    stderr: Buffer,
}

impl Harness {

    pub fn new() -> Self {
	Self::with(FakeWaiter::Ready(Duration::ZERO), FakeLogs::default())
    }

    pub fn with(waiter: FakeWaiter, logs: FakeLogs) -> Self {
	let (output, stdout, stderr) = buffered();
	let cluster = Arc::new(FakeCluster::default());
	let builder = Arc::new(FakeBuilder::default());
	let logs = Arc::new(logs);

	let config = Config{
	    name: String::from(CLI_NAME),
	    default_namespace: String::from(TEST_NAMESPACE),
	    cluster: cluster.clone(),
	    waiter: Arc::new(waiter),
	    logs: logs.clone(),
	    builder: builder.clone(),
	    output,
	};

	Self{ config, cluster, builder, logs, stdout, stderr }
    }

    pub fn stdout(&self) -> String {
	self.stdout.contents()
    }

    pub fn stderr(&self) -> String {
	self.stderr.contents()
    }
}
