use clap::{Parser, Subcommand};
use rx_core::composer::merge_template_rows;
use rx_core::regimen::{is_complete_regimen, normalise_regimen};
use rx_core::{Medication, MergeOutcome, Template};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rx")]
#[command(about = "Rx prescription composer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalise regimen input to the d-d-d form
    Regimen {
        /// Raw regimen text, e.g. "1a0b1"
        input: String,
    },
    /// Merge a template into a draft medication list
    Merge {
        /// JSON file holding the draft medication rows
        #[arg(long)]
        draft: PathBuf,
        /// JSON file holding a stored template document
        #[arg(long)]
        template: PathBuf,
    },
}

fn merge_json(
    draft: &str,
    template: &str,
) -> Result<(Vec<Medication>, MergeOutcome), serde_json::Error> {
    let mut medications: Vec<Medication> = serde_json::from_str(draft)?;
    let template: Template = serde_json::from_str(template)?;
    let outcome = merge_template_rows(&mut medications, &template.medications, &template.id);
    Ok((medications, outcome))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Regimen { input }) => {
            let regimen = normalise_regimen(&input);
            if is_complete_regimen(&regimen) {
                println!("{}", regimen);
            } else {
                println!("{} (incomplete)", regimen);
            }
        }
        Some(Commands::Merge { draft, template }) => {
            let draft = std::fs::read_to_string(&draft)?;
            let template = std::fs::read_to_string(&template)?;
            let (medications, outcome) = merge_json(&draft, &template)?;

            println!("{}", serde_json::to_string_pretty(&medications)?);
            eprintln!(
                "Admitted {} medication(s), skipped {}.",
                outcome.admitted, outcome.skipped
            );
        }
        None => {
            println!("Use 'rx --help' for commands");
        }
    }

    Ok(())
}
