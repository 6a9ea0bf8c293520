pub mod export;
pub mod preview;
pub mod session;

pub use export::{ExportError, ExportSummary, Exporter};
pub use preview::{PreviewFrame, PreviewRenderer};
pub use session::GradingSession;
