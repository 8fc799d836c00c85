//! Pipeline inspection: `review-suite stages` and `review-suite prompt`.

use anyhow::Result;
use console::style;
use std::path::Path;

use review_suite::pipeline::{PIPELINE, find_stage};
use review_suite::prompt::compile_stage_prompt;

use super::review::{load_config, resolve_target};

pub fn cmd_stages(project_dir: &Path) -> Result<()> {
    let config = load_config(project_dir)?;
    let mut loader = config.template_loader();

    println!();
    println!("Review suite stages");
    println!("===================");
    println!();
    for (i, stage) in PIPELINE.iter().enumerate() {
        println!(
            "  {}. {} {} {}",
            i + 1,
            style(stage.id).cyan().bold(),
            stage.label,
            style(format!("[{}]", stage.kind)).dim()
        );
        match loader.template(stage.template_name) {
            Some(template) => {
                if let Some(description) = &template.meta.description {
                    println!("     {}", description);
                }
                let source = template
                    .path
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "packaged".to_string());
                println!(
                    "     {} {} ({})",
                    style("template:").dim(),
                    stage.template_name,
                    source
                );
            }
            None => println!(
                "     {} {} {}",
                style("template:").dim(),
                stage.template_name,
                style("(missing)").red()
            ),
        }
    }
    println!();
    Ok(())
}

pub fn cmd_prompt(project_dir: &Path, stage_id: &str, args: &[String]) -> Result<()> {
    let Some((_, stage)) = find_stage(stage_id) else {
        let known: Vec<&str> = PIPELINE.iter().map(|s| s.id).collect();
        anyhow::bail!("Unknown stage '{}'. Known stages: {}", stage_id, known.join(", "));
    };

    let config = load_config(project_dir)?;
    let Some(target) = resolve_target(project_dir, args)? else {
        return Ok(());
    };

    let mut loader = config.template_loader();
    let prompt = compile_stage_prompt(&mut loader, &target, stage, &[])?;
    println!("{}", prompt);
    Ok(())
}
