pub mod events;

pub use events::stream_validation;

use thiserror::Error;
use tracing::{debug, info_span};

use crate::engine::DiffRuleEngine;
use crate::pr::PullRequest;
use crate::report::{PrMeta, ValidationReport};

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Event stream closed before validation finished")]
    TransportClosed,
}

/// Check every file of `pr` and assemble the report in one go.
pub fn validate(pr: &PullRequest, engine: &DiffRuleEngine) -> ValidationReport {
    let mut report = ValidationReport::new(PrMeta::from(pr));
    for file in &pr.files {
        let _span = info_span!("check_file", file = %file.filename).entered();
        let issues = engine.check_file(file);
        debug!(issues = issues.len(), "file checked");
        report.record_file(&file.filename, issues);
    }
    report
}
