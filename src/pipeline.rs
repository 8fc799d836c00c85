//! The fixed review pipeline.
//!
//! Three independent review lenses followed by one synthesis stage. The
//! pipeline is static data; nothing registers stages at runtime.

use serde::Serialize;

/// Literal token review templates ask the agent to finish with.
pub const END_OF_STAGE_MARKER: &str = "<review-stage-complete/>";

/// What a stage does with its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    /// An independent review pass; its output becomes a [`StageReport`].
    Review,
    /// The final pass that merges every report into one deliverable.
    Synthesize,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Review => "review",
            StageKind::Synthesize => "synthesize",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageDescriptor {
    pub id: &'static str,
    pub kind: StageKind,
    pub template_name: &'static str,
    pub label: &'static str,
}

impl StageDescriptor {
    pub fn is_review(&self) -> bool {
        self.kind == StageKind::Review
    }
}

/// The pipeline, in execution order. Exactly one synthesize stage, last.
pub const PIPELINE: [StageDescriptor; 4] = [
    StageDescriptor {
        id: "correctness",
        kind: StageKind::Review,
        template_name: "review-correctness",
        label: "Correctness",
    },
    StageDescriptor {
        id: "security",
        kind: StageKind::Review,
        template_name: "review-security",
        label: "Security",
    },
    StageDescriptor {
        id: "design",
        kind: StageKind::Review,
        template_name: "review-design",
        label: "Design & Maintainability",
    },
    StageDescriptor {
        id: "synthesize",
        kind: StageKind::Synthesize,
        template_name: "review-synthesize",
        label: "Synthesis",
    },
];

/// Look up a stage by id (case-insensitive).
pub fn find_stage(id: &str) -> Option<(usize, &'static StageDescriptor)> {
    PIPELINE
        .iter()
        .enumerate()
        .find(|(_, stage)| stage.id.eq_ignore_ascii_case(id))
}

/// Output of a review stage, kept in pipeline order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage_id: String,
    pub stage_label: String,
    pub text: String,
}

impl StageReport {
    /// Build a report from a stage's raw answer, dropping every end-of-stage marker.
    pub fn from_output(stage: &StageDescriptor, output: &str) -> Self {
        Self {
            stage_id: stage.id.to_string(),
            stage_label: stage.label.to_string(),
            text: strip_end_marker(output),
        }
    }
}

/// Remove all occurrences of [`END_OF_STAGE_MARKER`] and trim.
pub fn strip_end_marker(text: &str) -> String {
    text.replace(END_OF_STAGE_MARKER, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_synthesize_stage_and_it_is_last() {
        let synth: Vec<_> = PIPELINE
            .iter()
            .filter(|s| s.kind == StageKind::Synthesize)
            .collect();
        assert_eq!(synth.len(), 1);
        assert_eq!(PIPELINE.last().unwrap().kind, StageKind::Synthesize);
    }

    #[test]
    fn review_stages_use_distinct_templates() {
        let mut names: Vec<_> = PIPELINE.iter().map(|s| s.template_name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), PIPELINE.len());
    }

    #[test]
    fn find_stage_is_case_insensitive() {
        let (idx, stage) = find_stage("Security").unwrap();
        assert_eq!(idx, 1);
        assert_eq!(stage.template_name, "review-security");
        assert!(find_stage("performance").is_none());
    }

    #[test]
    fn strip_removes_trailing_marker() {
        let text = format!("Found two bugs.\n\n{}\n", END_OF_STAGE_MARKER);
        assert_eq!(strip_end_marker(&text), "Found two bugs.");
    }

    #[test]
    fn strip_removes_every_marker() {
        let text = format!(
            "Part one {m} part two {m}",
            m = END_OF_STAGE_MARKER
        );
        assert_eq!(strip_end_marker(&text), "Part one  part two");
    }

    #[test]
    fn missing_marker_is_fine() {
        assert_eq!(strip_end_marker("  no marker here "), "no marker here");
    }

    #[test]
    fn report_takes_stage_identity() {
        let report = StageReport::from_output(&PIPELINE[2], "ok <review-stage-complete/>");
        assert_eq!(report.stage_id, "design");
        assert_eq!(report.stage_label, "Design & Maintainability");
        assert_eq!(report.text, "ok");
    }
}
