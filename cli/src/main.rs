//! slidepack CLI - build PowerPoint decks from template layouts
//!
//! A command-line tool for inspecting a template's slide layouts and adding
//! slides to it.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use slidepack::{DeckPlan, PictureScale, Presentation, SlideContent};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthStr;

/// Build PowerPoint decks from template slide layouts
#[derive(Parser)]
#[command(
    name = "slidepack",
    version,
    about = "Build PowerPoint decks from template slide layouts",
    long_about = "slidepack - fill PowerPoint template layouts with titles, text and pictures.\n\n\
                  Design the layouts in the Slide Master view, then add slides by layout name."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the slide layouts of a template
    Layouts {
        /// Template presentation
        template: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the title, body and picture placeholders of a layout
    Placeholders {
        /// Template presentation
        template: PathBuf,

        /// Layout name
        layout: String,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Add one slide to a presentation and save it
    Add {
        /// Template presentation
        template: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Layout name
        #[arg(short, long)]
        layout: String,

        /// Slide title
        #[arg(short, long, default_value = "")]
        title: String,

        /// Body text, once per body placeholder
        #[arg(short, long = "body")]
        bodies: Vec<String>,

        /// Picture file, once per picture placeholder
        #[arg(short, long = "picture")]
        pictures: Vec<PathBuf>,

        /// How pictures are sized to their placeholders
        #[arg(long, default_value = "fill")]
        scale: ScaleMode,
    },

    /// Build a deck from a JSON plan
    Build {
        /// Plan file path
        plan: PathBuf,

        /// Output file path (overrides the plan's output)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

/// Picture scale method
#[derive(Clone, ValueEnum)]
enum ScaleMode {
    /// Cover the placeholder, cropping the overflow
    Fill,
    /// Fit inside the placeholder
    Within,
}

impl From<ScaleMode> for PictureScale {
    fn from(mode: ScaleMode) -> Self {
        match mode {
            ScaleMode::Fill => PictureScale::FillPlaceholder,
            ScaleMode::Within => PictureScale::WithinPlaceholder,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Layouts { template, json } => {
            let prs = Presentation::open(&template)?;

            if json {
                println!("{}", serde_json::to_string_pretty(prs.layouts())?);
                return Ok(());
            }

            let rows: Vec<(String, String)> = prs
                .layouts()
                .iter()
                .map(|l| (l.index.to_string(), l.name.clone()))
                .collect();
            print_table(("#", "Layout"), &rows);
        }

        Commands::Placeholders {
            template,
            layout,
            json,
        } => {
            let prs = Presentation::open(&template)?;
            let index = prs.layout_index(&layout)?;
            let placeholders = prs.layout(index)?.slide_placeholders();

            if json {
                println!("{}", serde_json::to_string_pretty(&placeholders)?);
                return Ok(());
            }

            println!("{} {}", "Layout".cyan().bold(), layout);
            println!("{}", "─".repeat(40));
            let title = placeholders
                .title
                .map(|idx| idx.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("{}: {}", "Title".bold(), title);
            println!("{}: {}", "Body".bold(), join_indices(&placeholders.body));
            println!("{}: {}", "Picture".bold(), join_indices(&placeholders.picture));
            for (idx, kind) in &placeholders.other {
                println!("{}: {} ({})", "Other".bold(), idx, kind);
            }
        }

        Commands::Add {
            template,
            output,
            layout,
            title,
            bodies,
            pictures,
            scale,
        } => {
            let pb = create_spinner("Opening template...");

            let mut prs = Presentation::open(&template)?;
            pb.set_message("Adding slide...");

            let content = SlideContent::new()
                .with_title(title)
                .with_bodies(bodies)
                .with_pictures(pictures)
                .with_picture_scale(scale.into());
            let slide_id = slidepack::add_slide(&mut prs, &layout, &content)?;

            pb.set_message("Saving...");
            prs.save(&output)?;
            pb.finish_and_clear();

            println!(
                "{} Added slide {} to {}",
                "✓".green().bold(),
                slide_id,
                output.display()
            );
        }

        Commands::Build { plan, output } => {
            let pb = create_spinner("Reading plan...");

            let mut plan = DeckPlan::from_path(&plan)?;
            if output.is_some() {
                plan.output = output;
            }
            pb.set_message(format!("Building {} slides...", plan.slides.len()));

            let ids = plan.run()?;
            pb.finish_and_clear();

            let written = plan
                .output
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!(
                "{} Built {} slides into {}",
                "✓".green().bold(),
                ids.len(),
                written
            );
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_version() {
    println!("{} {}", "slidepack".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Build PowerPoint decks from template slide layouts");
    println!();
    println!("Supported formats: PPTX, POTX, PPTM");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn join_indices(indices: &[u32]) -> String {
    if indices.is_empty() {
        return "-".to_string();
    }
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print two columns, padding by display width so CJK layout names line up.
fn print_table(header: (&str, &str), rows: &[(String, String)]) {
    let width = rows
        .iter()
        .map(|(first, _)| first.width())
        .chain(std::iter::once(header.0.width()))
        .max()
        .unwrap_or(0);

    println!(
        "{}{}  {}",
        header.0.bold(),
        " ".repeat(width - header.0.width()),
        header.1.bold()
    );
    let rule = rows
        .iter()
        .map(|(_, second)| second.width())
        .max()
        .unwrap_or(0)
        .max(header.1.width());
    println!("{}", "─".repeat(width + 2 + rule));
    for (first, second) in rows {
        println!("{}{}  {}", first, " ".repeat(width - first.width()), second);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_arguments() {
        let cli = Cli::try_parse_from([
            "slidepack",
            "-v",
            "add",
            "template.pptx",
            "-o",
            "out.pptx",
            "--layout",
            "Title Only",
            "--body",
            "one",
            "--body",
            "two",
            "--scale",
            "within",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        let Commands::Add { bodies, scale, .. } = cli.command else {
            panic!("expected add");
        };
        assert_eq!(bodies, vec!["one", "two"]);
        assert!(matches!(PictureScale::from(scale), PictureScale::WithinPlaceholder));
    }

    #[test]
    fn test_join_indices() {
        assert_eq!(join_indices(&[]), "-");
        assert_eq!(join_indices(&[14, 13]), "14, 13");
    }
}
