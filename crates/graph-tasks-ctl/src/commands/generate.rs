//! Client generation command handlers
//!
//! Trims the Graph OpenAPI description, runs the external generator and
//! patches its output in place.

use graph_tasks_sdk::codegen::{ClientGenerator, CodegenError, GenerationReport, GeneratorConfig};

use crate::output;
use crate::GenerateCommands;

pub(crate) fn handle_generate_command(cmd: GenerateCommands) -> Result<(), CodegenError> {
    match cmd {
        GenerateCommands::Client {
            spec,
            output,
            file,
            no_trim,
            prefixes,
            command,
        } => {
            let mut config = GeneratorConfig::new(spec, output);
            config.output_file = file;
            if no_trim {
                config.path_prefixes.clear();
            } else if !prefixes.is_empty() {
                config.path_prefixes = prefixes;
            }
            if !command.is_empty() {
                config.command = command;
            }

            output::plain(format!(
                "Generating client from {}",
                config.spec_path.display()
            ));
            let report = ClientGenerator::generate(&config)?;
            print_report(&report);
            Ok(())
        }
    }
}

fn print_report(report: &GenerationReport) {
    output::success(format!("Generated {}", report.output_file.display()));
    if let Some(trimmed) = &report.trimmed_spec {
        output::label("Trimmed spec", trimmed.display());
    }
    if let Some(kept) = report.paths_kept {
        output::label("Paths kept", kept);
    }
    output::header("Patches");
    for rule in &report.rules {
        output::status_icon(rule.applied > 0, format!("{} ({} applied)", rule.rule, rule.applied));
    }
    let unapplied = report.unapplied_rules().count();
    if unapplied > 0 {
        output::warning(format!(
            "{unapplied} patch rule(s) matched nothing; the generator output format may have changed"
        ));
    }
}
