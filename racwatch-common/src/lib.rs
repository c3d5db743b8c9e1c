pub mod collect;
pub mod config;
pub mod correlate;
pub mod error;
pub mod model;
pub mod planner;
pub mod rac;
pub mod report;

// Re-export commonly used types
pub use collect::Collector;
pub use config::{Credentials, RacConfig};
pub use error::RacError;
pub use model::{Cluster, ClusterSnapshot, Infobase, Server, Session, Snapshot};
pub use rac::{CommandRunner, MutationOutcome, ProcessRunner, RacClient};
pub use report::ReportFormat;

/// Default port of the RAS administration service
pub const DEFAULT_RAS_PORT: u16 = 1545;

/// Default bound on a single `rac` invocation
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
