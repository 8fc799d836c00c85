//! Stage prompt compilation.
//!
//! A stage prompt is its template with the stage variables substituted:
//! - review stages get `{{SCOPE}}`, the target's scope instructions
//! - the synthesize stage also gets `{{REPORTS}}`, every review report under
//!   a heading with its stage label, in pipeline order
//!
//! Review stages never see other stages' reports; a stray `{{REPORTS}}` in a
//! review template is blanked rather than filled.

pub mod templates;

use crate::errors::SuiteError;
use crate::pipeline::{StageDescriptor, StageKind, StageReport};
use crate::target::ReviewTarget;

pub use templates::{TemplateLoader, TemplateMeta};

pub const SCOPE_PLACEHOLDER: &str = "{{SCOPE}}";
pub const REPORTS_PLACEHOLDER: &str = "{{REPORTS}}";

/// Where stage templates come from.
///
/// Returns the template body, or an empty string when no template exists.
pub trait TemplateSource {
    fn load(&mut self, name: &str) -> String;
}

/// Build the user turn for `stage`.
///
/// Fails with [`SuiteError::MissingTemplate`] when the template is empty
/// after trimming.
pub fn compile_stage_prompt(
    templates: &mut dyn TemplateSource,
    target: &ReviewTarget,
    stage: &StageDescriptor,
    reports: &[StageReport],
) -> Result<String, SuiteError> {
    let template = templates.load(stage.template_name);
    if template.trim().is_empty() {
        return Err(SuiteError::MissingTemplate {
            template: stage.template_name.to_string(),
        });
    }

    let scope = target.scope_description();
    let prompt = match stage.kind {
        StageKind::Review => template
            .replace(SCOPE_PLACEHOLDER, &scope)
            .replace(REPORTS_PLACEHOLDER, ""),
        StageKind::Synthesize => template
            .replace(SCOPE_PLACEHOLDER, &scope)
            .replace(REPORTS_PLACEHOLDER, &format_reports(reports)),
    };

    Ok(prompt.trim().to_string())
}

/// Concatenate reports under `## <label>` headings.
pub fn format_reports(reports: &[StageReport]) -> String {
    if reports.is_empty() {
        return "_No review reports were produced._".to_string();
    }

    reports
        .iter()
        .map(|r| format!("## {}\n\n{}", r.stage_label, r.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::TemplateSource;
    use std::collections::HashMap;

    /// In-memory templates keyed by name.
    #[derive(Debug, Default, Clone)]
    pub struct StaticTemplates {
        pub templates: HashMap<String, String>,
    }

    impl StaticTemplates {
        /// Every pipeline template, each echoing its stage name and placeholders.
        pub fn pipeline() -> Self {
            let mut templates = HashMap::new();
            for stage in crate::pipeline::PIPELINE.iter() {
                templates.insert(
                    stage.template_name.to_string(),
                    format!("# {} pass\n\n{{{{SCOPE}}}}\n\n{{{{REPORTS}}}}", stage.label),
                );
            }
            Self { templates }
        }

        pub fn without(mut self, name: &str) -> Self {
            self.templates.remove(name);
            self
        }
    }

    impl TemplateSource for StaticTemplates {
        fn load(&mut self, name: &str) -> String {
            self.templates.get(name).cloned().unwrap_or_default()
        }
    }
}
