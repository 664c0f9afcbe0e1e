pub mod client;
pub mod types;

pub use client::{DetectionService, HttpDetectionClient};
pub use types::{DetectionResult, DetectionSummary, FraudRing, SuspiciousAccount};
