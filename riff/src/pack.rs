use crate::errors::Error;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

const PACK_PROGRAM: &str = "pack";

/* builds an image from local source and publishes it */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOptions {
    pub image: String,
    pub app_path: PathBuf,
    pub builder: String,
    pub env: BTreeMap<String, String>,
    pub publish: bool,
}

impl BuildOptions {

    pub fn args(&self) -> Vec<String> {
	let mut args = vec![
	    String::from("build"),
	    self.image.clone(),
	    String::from("--path"),
	    self.app_path.display().to_string(),
	    String::from("--builder"),
	    self.builder.clone(),
	];
	for (key, value) in &self.env {
	    args.push(String::from("--env"));
	    args.push(format!("{}={}", key, value));
	}
	if self.publish {
	    args.push(String::from("--publish"));
	}
	args
    }
}

#[async_trait]
pub trait ImageBuilder: Send + Sync {
    async fn build(&self, opts: &BuildOptions) -> Result<(), Error>;
}

/*
 * Runs the Cloud Native Buildpacks `pack` CLI, which must be on the PATH
 * and able to reach a Docker daemon.
 */
pub struct PackBuilder {
    program: String,
}

impl Default for PackBuilder {
    fn default() -> Self {
	Self{ program: String::from(PACK_PROGRAM) }
    }
}

#[async_trait]
impl ImageBuilder for PackBuilder {

    async fn build(&self, opts: &BuildOptions) -> Result<(), Error> {
	let args = opts.args();
	log::info!("running {} {}", self.program, args.join(" "));

	let output = Command::new(&self.program)
	    .args(&args)
	    .stdout(Stdio::piped())
	    .stderr(Stdio::piped())
	    .output()
	    .await?;

	log::debug!("{} output:\n{}", self.program, String::from_utf8_lossy(&output.stdout));
	if !output.status.success() {
	    let stderr = String::from_utf8_lossy(&output.stderr);
	    return Err(Error::Build(format!("{} exited with {}: {}", self.program, output.status, stderr.trim())));
	}
	Ok(())
    }
}
