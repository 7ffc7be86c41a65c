pub mod driver;
pub mod types;

pub use driver::ChunkedImportDriver;
pub use types::{
    ChunkReport, CreatedProduct, FailedProduct, ImportObserver, ImportOptions, ImportOutcome,
    ImportRequest, ImportSummary, NoopObserver, RunPhase,
};
