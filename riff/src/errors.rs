use crate::field_error::FieldError;

use riff_api::build::ImageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {

    /* encapsulate a kube-rust error */
    #[error("kube error: {0}")]
    Kube(#[from] kube::Error),

    #[error("watch error: {0}")]
    Watch(#[from] kube::runtime::watcher::Error),

    #[error("unable to load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("{0}")]
    InferConfig(#[from] kube::config::InferConfigError),

    /* one or more invalid flags, reported together */
    #[error("{0}")]
    Validation(FieldError),

    /*
     * An error whose message has already been shown to the user. The process
     * still exits non-zero but nothing else is printed.
     */
    #[error("{0}")]
    Silenced(Box<Error>),

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("operation cancelled")]
    Cancelled,

    #[error("unknown builder for {0:?}")]
    UnknownBuilder(String),

    #[error("{0}")]
    Image(#[from] ImageError),

    #[error("build failed: {0}")]
    Build(String),

    #[error("{0:?} failed to become ready: {1}")]
    NotReady(String, String),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("`{0}`")]
    Other(String),
}

impl Error {

    /* mark an error as already reported */
    pub fn silence(self) -> Error {
	match self {
	    Error::Silenced(_) => self,
	    err => Error::Silenced(Box::new(err)),
	}
    }

    pub fn is_silent(&self) -> bool {
	matches!(self, Error::Silenced(_))
    }

    /* the only classification applied to API errors */
    pub fn is_not_found(&self) -> bool {
	match self {
	    Error::Kube(kube::Error::Api(response)) => response.code == 404,
	    Error::Silenced(inner) => inner.is_not_found(),
	    _ => false,
	}
    }
}
