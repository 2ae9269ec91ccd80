//! File I/O, validation, and serialization for the twarp pipeline.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{ExperimentName, SignalDataset, SignalId};
pub use error::IoError;
pub use reader::SignalReader;
pub use writer::ResultWriter;
