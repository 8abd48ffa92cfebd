pub mod decode;
pub mod ingest;
pub mod signal;
pub mod table;

pub use ingest::{ingest, ingest_file, InputKind};
pub use signal::{PlotSeries, Signal};
