//! CV analysis flow: parse, then optionally evaluate, or run both in one call.

mod file;

pub use file::CvFile;

use crate::client::SessionService;
use crate::client::protocol::{CvEvaluation, FullCvAnalysis, ParsedCv};
use crate::error::{MockviewError, Result};
use crate::view::{Control, JsonTarget, Section, View};
use std::sync::Arc;
use tracing::{info, warn};

/// Parsed CV plus the evaluation made from it, owned by one CV flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CvRecord {
    pub parsed: Option<ParsedCv>,
    pub evaluation: Option<CvEvaluation>,
}

/// CV flow controller.
///
/// `parse` and `evaluate` share the cached [`CvRecord`]; `full_analysis` is
/// an independent path whose result is only displayed.
pub struct CvFlow {
    service: Arc<dyn SessionService>,
    view: Arc<dyn View>,
    record: CvRecord,
}

impl CvFlow {
    pub fn new(service: Arc<dyn SessionService>, view: Arc<dyn View>) -> Self {
        Self {
            service,
            view,
            record: CvRecord::default(),
        }
    }

    /// Show the CV section.
    pub fn activate(&self) {
        self.view.show_section(Section::Cv);
        for control in [Control::ParseCv, Control::EvaluateCv, Control::FullAnalysis] {
            self.view.set_enabled(control, true);
        }
    }

    pub fn record(&self) -> &CvRecord {
        &self.record
    }

    /// Upload `file` and cache the parsed result.
    ///
    /// A new parse replaces the cached one and drops the evaluation made
    /// from the old one.
    pub async fn parse(&mut self, file: Option<&CvFile>) -> Result<&ParsedCv> {
        let file = self.require_file(file)?;

        info!("Parsing CV {}", file.file_name);
        self.view.set_enabled(Control::ParseCv, false);
        let result = self.service.parse_cv(file).await;
        self.view.set_enabled(Control::ParseCv, true);
        let parsed = result.map_err(|e| self.fail(e))?;

        self.view.render_json(JsonTarget::CvOutput, parsed.as_json());
        self.record.evaluation = None;
        Ok(self.record.parsed.insert(parsed))
    }

    /// Evaluate the cached parse for `role`. The file is not uploaded again.
    pub async fn evaluate(&mut self, role: &str) -> Result<&CvEvaluation> {
        let Some(parsed) = self.record.parsed.as_ref() else {
            return Err(self.fail(MockviewError::PrerequisiteMissing {
                message: "You must parse your CV first!".to_string(),
            }));
        };

        info!("Evaluating parsed CV for role {}", role);
        self.view.set_enabled(Control::EvaluateCv, false);
        let result = self.service.evaluate_cv(role, parsed).await;
        self.view.set_enabled(Control::EvaluateCv, true);
        let evaluation = result.map_err(|e| self.fail(e))?;

        self.view
            .render_json(JsonTarget::CvOutput, evaluation.as_json());
        Ok(self.record.evaluation.insert(evaluation))
    }

    /// Parse and evaluate in one round trip without touching the cache.
    pub async fn full_analysis(
        &mut self,
        file: Option<&CvFile>,
        role: &str,
    ) -> Result<FullCvAnalysis> {
        let file = self.require_file(file)?;

        info!("Running full CV analysis of {} for role {}", file.file_name, role);
        self.view.set_enabled(Control::FullAnalysis, false);
        let result = self.service.full_cv_analysis(role, file).await;
        self.view.set_enabled(Control::FullAnalysis, true);
        let analysis = result.map_err(|e| self.fail(e))?;

        self.view
            .render_json(JsonTarget::CvOutput, &analysis.to_json());
        Ok(analysis)
    }

    fn require_file<'a>(&self, file: Option<&'a CvFile>) -> Result<&'a CvFile> {
        match file {
            Some(file) if !file.is_empty() => Ok(file),
            _ => Err(self.fail(MockviewError::NoFileSelected)),
        }
    }

    fn fail(&self, error: MockviewError) -> MockviewError {
        warn!("CV flow: {}", error);
        self.view.show_error(&error);
        error
    }
}
