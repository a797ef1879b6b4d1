use super::config::NodeopsConfig;
use nodeops::diagnostics::{collect, default_commands, CollectOptions, CommandProbe, Redactor};
use std::path::PathBuf;

/// Collect a redacted diagnostics bundle
pub async fn execute(
    config: &NodeopsConfig,
    output_dir: Option<PathBuf>,
    service: Option<String>,
    journal_lines: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = &config.diagnostics;
    let service = service.unwrap_or_else(|| settings.service.clone());
    let journal_lines = journal_lines.unwrap_or(settings.journal_lines);

    let options = CollectOptions {
        commands: default_commands(&service, journal_lines),
        config_paths: settings.config_paths.clone(),
        output_dir: output_dir.unwrap_or_else(|| settings.output_dir.clone()),
    };
    let redactor = Redactor::with_extra_rules(&settings.extra_redactions)?;
    let probe = CommandProbe::new(settings.command_timeout());

    println!("Collecting diagnostics for service '{}'...", service);
    let report = collect(&probe, &redactor, &options).await?;

    for entry in &report.entries {
        println!("  {} [{}]", entry.source, entry.status);
    }
    println!(
        "Wrote {} ({} values redacted)",
        report.archive.display(),
        report.total_redactions()
    );
    Ok(())
}
