//! Stack detection: labels, the ordered classifier and port/name resolution

pub mod classifier;
pub mod label;
pub mod port;

pub use classifier::{classify, classify_detailed, Classification, DetectionRule};
pub use label::StackLabel;
pub use port::{normalize_container_name, resolve_port, route_prefix, DEFAULT_PORT};
