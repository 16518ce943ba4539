pub mod export;

pub use export::{ExportArgs, ExportCommand};
