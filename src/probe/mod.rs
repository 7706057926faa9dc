//! Batch request runner.
//!
//! A batch is the cross product of URLs, protocols, and methods. The runner
//! executes it in sequential groups of bounded size, enforces a per-task
//! deadline, and streams one [`ProbeResult`] per task over a channel as soon
//! as each task settles.
mod body;
mod plan;
mod runner;
mod transport;
mod types;


pub use body::{BodyCapture, NO_BODY, binary_marker, pretty_json};
pub use plan::{build_batch, has_explicit_scheme, normalize_url};
pub use runner::{BatchRunner, RunnerConfig};
pub use transport::{HttpTransport, ProbeResponse, ProbeTransport, TransportConfig};
pub use types::{ProbeResult, Task, TaskState};
