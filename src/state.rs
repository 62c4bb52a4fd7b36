//! Lifecycle of a single document submission

use crate::capture::{CaptureService, ExtractRequest, Extraction};
use crate::error::CaptureError;
use crate::upload::Upload;
use serde::Serialize;

/// Where a submission currently stands. Exactly one of these holds at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SubmissionState {
    #[default]
    Idle,
    Loading,
    Success { text: String },
    Failed { message: String },
}

/// Drives one submission through its states
#[derive(Debug, Default)]
pub struct Submission {
    state: SubmissionState,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == SubmissionState::Loading
    }

    /// Enter `Loading`. Refused while a submission is already in flight.
    pub fn begin(&mut self) -> Result<(), CaptureError> {
        if self.is_loading() {
            return Err(CaptureError::SubmissionInProgress);
        }
        self.transition(SubmissionState::Loading);
        Ok(())
    }

    pub fn succeed(&mut self, text: &str) {
        self.transition(SubmissionState::Success {
            text: text.trim().to_string(),
        });
    }

    pub fn fail(&mut self, err: &CaptureError) {
        self.transition(SubmissionState::Failed {
            message: err.to_string(),
        });
    }

    /// Close the error banner
    pub fn dismiss(&mut self) {
        if matches!(self.state, SubmissionState::Failed { .. }) {
            self.transition(SubmissionState::Idle);
        }
    }

    /// Run the capture flow, ending in `Success` or `Failed`
    pub async fn submit(
        &mut self,
        service: &CaptureService,
        upload: Option<Upload>,
        request: &ExtractRequest,
    ) -> Result<Extraction, CaptureError> {
        self.begin()?;

        match service.extract(upload, request).await {
            Ok(extraction) => {
                self.succeed(&extraction.text);
                Ok(extraction)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    fn transition(&mut self, next: SubmissionState) {
        tracing::debug!("Submission {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        assert_eq!(Submission::new().state(), &SubmissionState::Idle);
    }

    #[test]
    fn test_success_trims_text() {
        let mut submission = Submission::new();
        submission.begin().unwrap();
        submission.succeed("  DL 12345\n");
        assert_eq!(
            submission.state(),
            &SubmissionState::Success {
                text: "DL 12345".to_string()
            }
        );
    }

    #[test]
    fn test_begin_refused_while_loading() {
        let mut submission = Submission::new();
        submission.begin().unwrap();
        assert!(matches!(
            submission.begin(),
            Err(CaptureError::SubmissionInProgress)
        ));
        assert!(submission.is_loading());
    }

    #[test]
    fn test_failure_then_dismiss_then_retry() {
        let mut submission = Submission::new();
        submission.fail(&CaptureError::PdfNotSupported);
        assert_eq!(
            submission.state(),
            &SubmissionState::Failed {
                message: "PDF files are not supported. Please upload an image file.".to_string()
            }
        );

        submission.dismiss();
        assert_eq!(submission.state(), &SubmissionState::Idle);

        submission.begin().unwrap();
        assert!(submission.is_loading());
    }

    #[test]
    fn test_dismiss_keeps_success() {
        let mut submission = Submission::new();
        submission.begin().unwrap();
        submission.succeed("ABC");
        submission.dismiss();
        assert!(matches!(submission.state(), SubmissionState::Success { .. }));
    }

    #[tokio::test]
    async fn test_submit_refused_while_loading_keeps_state() {
        use crate::config::Config;
        use crate::engine::{OcrEngine, OcrResult};
        use crate::engines::EngineRegistry;
        use crate::error::OcrError;
        use image::DynamicImage;
        use std::sync::Arc;

        struct Unreachable;

        impl OcrEngine for Unreachable {
            fn name(&self) -> &'static str {
                "unreachable"
            }

            fn description(&self) -> &'static str {
                "must not be called"
            }

            fn recognize(&self, _image: &DynamicImage) -> Result<OcrResult, OcrError> {
                panic!("engine called during an in-flight submission");
            }

            fn supported_languages(&self) -> Vec<String> {
                Vec::new()
            }
        }

        let engines: Vec<Arc<dyn OcrEngine>> = vec![Arc::new(Unreachable)];
        let registry = EngineRegistry::from_engines(engines).unwrap();
        let service = CaptureService::new(Arc::new(registry), &Config::default());

        let mut submission = Submission::new();
        submission.begin().unwrap();

        let err = submission
            .submit(&service, None, &ExtractRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CaptureError::SubmissionInProgress));
        assert!(submission.is_loading());
    }

    #[test]
    fn test_serializes_as_tagged_object() {
        let json = serde_json::to_value(SubmissionState::Success {
            text: "X1".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"state": "success", "text": "X1"}));

        let json = serde_json::to_value(SubmissionState::Idle).unwrap();
        assert_eq!(json, serde_json::json!({"state": "idle"}));
    }
}
