use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use layout_core::{LabelDieline, LayoutOption, LayoutOptimizer, LayoutRequest, SlotConfig};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "layout")]
#[command(about = "Label Layout Optimizer - Plan press runs for label orders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and rank layout options for an order
    Optimize {
        /// Input file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the ranked options (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only show the best N options
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Show the press geometry derived from a dieline
    Slots {
        /// Dieline file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Optimize { input, output, top } => {
            optimize_command(input, output, top)?;
        }
        Commands::Slots { input } => {
            slots_command(input)?;
        }
    }

    Ok(())
}

/// Reads YAML when the extension says so, JSON otherwise.
fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    let value = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        _ => serde_json::from_str(&content)?,
    };
    Ok(value)
}

fn optimize_command(input: PathBuf, output: Option<PathBuf>, top: Option<usize>) -> Result<()> {
    println!("{}", "🔍 Loading order...".bright_blue());

    let request: LayoutRequest = load(&input)?;
    let total_labels: u64 = request.items.iter().map(|i| i.quantity).sum();

    println!(
        "  {} items, {} labels",
        request.items.len().to_string().bright_white().bold(),
        total_labels.to_string().bright_white().bold()
    );
    println!(
        "  {} slots across",
        request.dieline.columns_across.to_string().bright_white().bold()
    );
    println!();

    println!("{}", "🚀 Generating layouts...".bright_blue());

    let optimizer = LayoutOptimizer::new(request)?;
    let mut options = optimizer.generate_layout_options();
    if let Some(top) = top {
        options.truncate(top);
    }

    println!();
    println!("{}", "✅ Optimization complete!".bright_green().bold());
    println!();

    print_slot_config(optimizer.slot_config());
    println!();

    println!("{}", "📊 Layout options (best first):".bright_yellow().bold());
    for (rank, option) in options.iter().enumerate() {
        print_option(rank + 1, option);
    }
    println!();

    let json = serde_json::to_string_pretty(&options)?;
    if let Some(output_path) = output {
        std::fs::write(&output_path, json)?;
        println!(
            "💾 Saved options to {}",
            output_path.display().to_string().bright_white()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn slots_command(input: PathBuf) -> Result<()> {
    let dieline: LabelDieline = load(&input)?;
    let config = SlotConfig::from_dieline(&dieline)?;

    print_slot_config(&config);
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn print_slot_config(config: &SlotConfig) {
    println!("{}", "📐 Press geometry:".bright_yellow().bold());
    println!(
        "  {} slots × {} labels per frame ({} templates of {:.1} mm)",
        config.total_slots.to_string().bright_white(),
        config.labels_per_slot_per_frame.to_string().bright_white(),
        config.templates_per_frame,
        config.template_height_mm
    );
    println!(
        "  {} labels per frame, {:.3} frames per meter",
        config.labels_per_frame.to_string().bright_white(),
        config.frames_per_meter
    );
}

fn print_option(rank: usize, option: &LayoutOption) {
    println!(
        "  {}. {} - score {}",
        rank,
        format!("{:?}", option.id).bright_white().bold(),
        format!("{:.3}", option.overall_score).bright_green()
    );
    println!(
        "     {} runs, {:.2} m, {:.2} m waste, ~{:.0} min",
        option.runs.len(),
        option.total_meters,
        option.total_waste_meters,
        option.estimated_production_minutes
    );

    for run in &option.runs {
        let slots: Vec<String> = run
            .slot_assignments
            .iter()
            .map(|a| match &a.item_id {
                Some(id) => format!("{}×{}", id, a.quantity_in_slot),
                None => "-".to_string(),
            })
            .collect();
        println!(
            "     • run {}: {} frames [{}]",
            run.run_number,
            run.frames,
            slots.join(", ")
        );
        if run.needs_rewinding {
            if let Some(suggestion) = &run.consolidation_suggestion {
                println!("       {}", suggestion.yellow());
            }
        }
        for warning in &run.overrun_warnings {
            println!("       {}", warning.bright_red());
        }
    }
}
