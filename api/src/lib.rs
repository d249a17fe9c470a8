/*
 * riff/api - the riff custom resources the CLI creates, lists and watches,
 * grouped by the API group that serves them.
 */

pub mod condition;
pub use condition::Condition;
pub use condition::ConditionStatus;
pub use condition::Conditioned;
pub use condition::Status;

pub mod build;
pub use build::Application;
pub use build::Container;
pub use build::Function;

pub mod runtime;

pub mod knative;
pub use knative::Adapter;

pub mod streaming;
pub use streaming::Processor;
pub use streaming::Stream;

pub mod bindings;
pub use bindings::Binding;
