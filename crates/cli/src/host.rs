//! Input collection and fan-out through the bound export.

use std::path::{Path, PathBuf};

use anyhow::Context;
use guest::Envelope;
use reconcile::ErrorCode;
use tokio::io::AsyncReadExt;
use tracing::info_span;
use uuid::Uuid;

/// One serialized resource and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub source: String,
    pub payload: String,
}

/// Reads every file in order, or all of stdin as a single input when
/// `files` is empty.
pub async fn read_inputs(files: &[PathBuf]) -> anyhow::Result<Vec<Input>> {
    if files.is_empty() {
        let mut payload = String::new();
        tokio::io::stdin()
            .read_to_string(&mut payload)
            .await
            .context("cannot read stdin")?;
        return Ok(vec![Input {
            source: "-".to_owned(),
            payload,
        }]);
    }

    let mut inputs = Vec::with_capacity(files.len());
    for path in files {
        inputs.push(read_file(path).await?);
    }
    Ok(inputs)
}

async fn read_file(path: &Path) -> anyhow::Result<Input> {
    let payload = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    Ok(Input {
        source: path.display().to_string(),
        payload,
    })
}

/// Reconciles all inputs concurrently on blocking tasks.
///
/// The returned envelopes are in input order regardless of completion order.
pub async fn reconcile_all(inputs: Vec<Input>) -> anyhow::Result<Vec<Envelope>> {
    let handles: Vec<_> = inputs
        .into_iter()
        .map(|input| {
            let span = info_span!(
                "invocation",
                invocation_id = %Uuid::new_v4(),
                source = %input.source,
            );
            tokio::task::spawn_blocking(move || {
                span.in_scope(|| Envelope::from(guest::call(&input.payload)))
            })
        })
        .collect();

    let mut envelopes = Vec::with_capacity(handles.len());
    for handle in handles {
        envelopes.push(handle.await.context("reconcile task panicked")?);
    }
    Ok(envelopes)
}

/// Outcome counts for the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub ok: usize,
    pub input_errors: usize,
    pub internal_errors: usize,
}

impl Tally {
    pub fn of(envelopes: &[Envelope]) -> Self {
        envelopes.iter().fold(Self::default(), |mut tally, envelope| {
            match envelope {
                Envelope::Ok(_) => tally.ok += 1,
                Envelope::Err(err) if err.code == ErrorCode::INPUT.as_u32() => {
                    tally.input_errors += 1
                }
                Envelope::Err(_) => tally.internal_errors += 1,
            }
            tally
        })
    }

    pub fn failed(&self) -> usize {
        self.input_errors + self.internal_errors
    }
}

#[cfg(test)]
mod tests {
    use guest::{WireError, WireResult};

    use super::*;

    #[test]
    fn tally_splits_errors_by_class() {
        let envelopes = [
            Envelope::Ok(WireResult {
                requeue: false,
                requeue_after: 0,
                object: "{}".into(),
            }),
            Envelope::Err(WireError {
                code: 400,
                message: "cannot reconcile with empty input".into(),
            }),
            Envelope::Err(WireError {
                code: 500,
                message: "cannot encode reconciled resource".into(),
            }),
        ];

        let tally = Tally::of(&envelopes);
        assert_eq!(
            tally,
            Tally {
                ok: 1,
                input_errors: 1,
                internal_errors: 1
            }
        );
        assert_eq!(tally.failed(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_reported_with_its_path() {
        let err = read_inputs(&[PathBuf::from("/nonexistent/topology.json")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/topology.json"));
    }

    #[tokio::test]
    async fn envelopes_follow_input_order() {
        let inputs = vec![
            Input {
                source: "empty".into(),
                payload: "   ".into(),
            },
            Input {
                source: "lab".into(),
                payload: r#"{"kind":"Topology","metadata":{"name":"lab"}}"#.into(),
            },
            Input {
                source: "garbage".into(),
                payload: "{".into(),
            },
        ];

        let envelopes = reconcile_all(inputs).await.unwrap();

        assert_eq!(envelopes.len(), 3);
        match &envelopes[0] {
            Envelope::Err(err) => assert_eq!(err.message, "cannot reconcile with empty input"),
            other => panic!("expected error, got {other:?}"),
        }
        assert!(!envelopes[1].is_err());
        match &envelopes[2] {
            Envelope::Err(err) => {
                assert_eq!(err.code, 400);
                assert!(err.message.starts_with("cannot decode input:"));
            }
            other => panic!("expected error, got {other:?}"),
        }
    }
}
