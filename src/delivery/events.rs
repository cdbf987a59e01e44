use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::DeliveryError;
use crate::engine::{DiffRuleEngine, Issue};
use crate::pr::PrProvider;
use crate::report::{PrMeta, ValidationReport};

/// Progress event emitted while a PR is checked incrementally.
/// Serialized as one JSON object per event, tagged by `type`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationEvent {
    Init {
        source: String,
    },
    PrInfo {
        number: u64,
        #[serde(flatten)]
        pr: PrMeta,
    },
    TotalFiles {
        count: usize,
    },
    IssueFound {
        issue: Issue,
    },
    FileChecked {
        file: String,
        issues: usize,
        files_checked: usize,
    },
    Complete {
        report: ValidationReport,
    },
    Error {
        message: String,
    },
}

async fn emit(tx: &mpsc::Sender<ValidationEvent>, event: ValidationEvent) -> Result<(), DeliveryError> {
    tx.send(event).await.map_err(|_| {
        warn!("event receiver closed, aborting validation");
        DeliveryError::TransportClosed
    })
}

/// Load the PR from `provider` and check it file by file, emitting progress
/// on `tx` and yielding to the runtime after each file.
///
/// A provider failure is reported as a terminal `Error` event and yields
/// `Ok(None)`. A closed receiver aborts with `DeliveryError::TransportClosed`;
/// events already sent stay sent.
pub async fn stream_validation(
    provider: &dyn PrProvider,
    engine: &DiffRuleEngine,
    tx: &mpsc::Sender<ValidationEvent>,
) -> Result<Option<ValidationReport>, DeliveryError> {
    emit(
        tx,
        ValidationEvent::Init {
            source: provider.name().to_string(),
        },
    )
    .await?;

    let pr = match provider.load().await {
        Ok(pr) => pr,
        Err(e) => {
            warn!(error = %e, "failed to load pull request");
            emit(
                tx,
                ValidationEvent::Error {
                    message: e.to_string(),
                },
            )
            .await?;
            return Ok(None);
        }
    };

    let meta = PrMeta::from(&pr);
    emit(
        tx,
        ValidationEvent::PrInfo {
            number: pr.number,
            pr: meta.clone(),
        },
    )
    .await?;
    emit(
        tx,
        ValidationEvent::TotalFiles {
            count: pr.files.len(),
        },
    )
    .await?;

    let mut report = ValidationReport::new(meta);
    for file in &pr.files {
        let issues = engine.check_file(file);
        let issue_count = issues.len();
        for issue in &issues {
            emit(
                tx,
                ValidationEvent::IssueFound {
                    issue: issue.clone(),
                },
            )
            .await?;
        }
        report.record_file(&file.filename, issues);
        debug!(file = %file.filename, issues = issue_count, "file checked");
        emit(
            tx,
            ValidationEvent::FileChecked {
                file: file.filename.clone(),
                issues: issue_count,
                files_checked: report.files_checked_count(),
            },
        )
        .await?;
        tokio::task::yield_now().await;
    }

    info!(files = report.files_checked_count(), issues = report.issues().len(), "streamed validation complete");
    emit(
        tx,
        ValidationEvent::Complete {
            report: report.clone(),
        },
    )
    .await?;
    Ok(Some(report))
}
