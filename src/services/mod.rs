pub mod classifier;
pub mod column_detector;
pub mod exporter;
pub mod filters;
pub mod manifest_reader;
pub mod pipeline;
pub mod stop_key;

pub use classifier::{AddressClassifier, AddressKind, Classification};
pub use column_detector::{detect_columns, ColumnMap};
pub use manifest_reader::read_manifest;
pub use pipeline::{answer_question, cage_overview, run, RouteRequest, RouteResult};
pub use stop_key::{stop_key, StopStats};
