//! Boundary with the `rac` administration utility: argument building,
//! process invocation, and parsing of its list output.

pub mod client;
pub mod command;
pub mod mapper;
pub mod parser;
pub mod runner;

pub use client::{BlockRequest, Listing, MutationOutcome, RacClient, MAINTENANCE_MESSAGE};
pub use command::{CommandBuilder, RacCommand};
pub use mapper::{parse_entities, parse_timestamp, FromRecord};
pub use parser::{parse, Record};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};
