//! Pure mapping from a [`SessionSnapshot`] to what the host UI draws.
//!
//! Rendering never fails: absent review notes become empty strings and absent
//! tips an empty list.

use std::fmt;

use client_core::{SessionSnapshot, SessionState};
use serde::Serialize;
use shared::domain::{AnalysisResult, Feature};

pub const SELECT_PROMPT: &str = "Choose a photo. PNG or JPG. Good lighting. Face centered.";
pub const ANALYZE_PROMPT: &str = "Analyze";
pub const LOADING_LABEL: &str = "Analyzing…";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ResultView {
    Prompt {
        file_name: Option<String>,
        preview_url: Option<String>,
    },
    Loading {
        file_name: Option<String>,
    },
    Report(ReportView),
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub score: String,
    pub cards: Vec<FeatureCard>,
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureCard {
    pub title: &'static str,
    pub note: String,
}

pub fn render(snapshot: &SessionSnapshot) -> ResultView {
    match &snapshot.state {
        SessionState::Idle | SessionState::Selected => ResultView::Prompt {
            file_name: snapshot.file_name.clone(),
            preview_url: snapshot.preview_url.clone(),
        },
        SessionState::Uploading => ResultView::Loading {
            file_name: snapshot.file_name.clone(),
        },
        SessionState::Success { result } => ResultView::Report(render_report(result)),
        SessionState::Failed { error } => ResultView::Error {
            message: error.clone(),
        },
    }
}

pub fn render_report(result: &AnalysisResult) -> ReportView {
    ReportView {
        score: format!("{}/10", result.score),
        cards: Feature::ALL
            .iter()
            .map(|feature| FeatureCard {
                title: feature.title(),
                note: result.review.note_or_empty(*feature).to_string(),
            })
            .collect(),
        tips: result.tips.clone(),
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultView::Prompt {
                file_name: None, ..
            } => writeln!(f, "{SELECT_PROMPT}"),
            ResultView::Prompt {
                file_name: Some(name),
                preview_url,
            } => {
                writeln!(f, "Selected: {name}")?;
                if let Some(url) = preview_url {
                    writeln!(f, "Preview: {url}")?;
                }
                writeln!(f, "[{ANALYZE_PROMPT}]")
            }
            ResultView::Loading { .. } => writeln!(f, "{LOADING_LABEL}"),
            ResultView::Report(report) => write!(f, "{report}"),
            ResultView::Error { message } => writeln!(f, "Error: {message}"),
        }
    }
}

impl fmt::Display for ReportView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Your results: {}", self.score)?;
        writeln!(f)?;
        for card in &self.cards {
            writeln!(f, "{}: {}", card.title, card.note)?;
        }
        if !self.tips.is_empty() {
            writeln!(f)?;
            writeln!(f, "Tips")?;
            for (i, tip) in self.tips.iter().enumerate() {
                writeln!(f, "{}. {tip}", i + 1)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
