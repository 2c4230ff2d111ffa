use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lesson_sandbox::exercise::{check_tasks, collect_tasks};
use lesson_sandbox::reporting::{print_statistics, report_failures};
use lesson_sandbox::{content, render, LanguageTag, Runner, SandboxConfig, LANGUAGES};
use std::path::{Path, PathBuf};
use std::process::exit;

#[derive(Parser)]
#[command(name = "lesson-sandbox", version, about = "Parse lesson content and run lesson code")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a source file and print its output
    Run {
        file: PathBuf,
        /// Language of the file; inferred from the extension when omitted
        #[arg(short, long)]
        language: Option<LanguageTag>,
    },
    /// Parse lesson content and print the blocks
    Parse {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Viewport width in pixels used for HTML indentation
        #[arg(long, default_value_t = 1024)]
        width: u32,
    },
    /// Run every exercise in markdown lessons and compare with its output block
    Check {
        #[arg(required = true)]
        lessons: Vec<PathBuf>,
    },
    /// List supported languages
    Languages,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Html,
}

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = handle_command(cli) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

fn handle_command(cli: Cli) -> Result<()> {
    let config = SandboxConfig::load(cli.config.as_deref())?;
    let runner = Runner::from_config(&config.limits);

    match cli.command {
        Command::Run { file, language } => {
            let language = match language {
                Some(language) => language,
                None => language_from_path(&file)?,
            };
            let source = read_file(&file)?;
            log::info!("Running {} as {}", file.display(), language);
            println!("{}", runner.run(&source, language).output_text);
        }
        Command::Parse {
            file,
            format,
            width,
        } => {
            let blocks = content::parse(&read_file(&file)?);
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&blocks)?),
                Format::Html => println!(
                    "{}",
                    render::render_html(&blocks, render::Viewport::from_width(width))
                ),
            }
        }
        Command::Check { lessons } => {
            let tasks = collect_tasks(&lessons)?;
            log::info!("Collected {} exercise(s)", tasks.len());

            let (results, duration) = check_tasks(tasks, &runner);
            print_statistics(&results, duration);

            let failed: Vec<_> = results.iter().filter(|r| !r.success()).collect();
            if !failed.is_empty() {
                report_failures(&failed)?;
            }
        }
        Command::Languages => {
            for language in LANGUAGES {
                let metadata = language.metadata();
                println!(
                    "{:<12}{:<12}{:<8}{}",
                    language.name(),
                    metadata.display_name,
                    metadata.file_extension,
                    metadata.fence_markers.join(", ")
                );
            }
        }
    }

    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn language_from_path(path: &Path) -> Result<LanguageTag> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(LanguageTag::from_extension)
        .with_context(|| {
            format!(
                "Cannot infer language of {}; pass --language",
                path.display()
            )
        })
}
