pub mod amazon;
pub mod application;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod utils;

pub use application::{PipelineRunner, Source, StaticResource};
pub use domain::{LoadInfo, RunState, TableBatch};
pub use errors::PipelineError;
pub use ports::{Destination, RecordProvider, Result};
