use clap::{Parser, Subcommand};

use slidegen::client::GenerationClient;
use slidegen::errors::AppError;
use slidegen::models::outline::{Language, Outline};

#[derive(Parser, Debug)]
#[command(name = "slidegen-client", about = "Generate slide decks against a slidegen server")]
struct Cli {
    /// Base URL of the slidegen server
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an outline and print it as JSON
    Outline {
        prompt: String,
        #[arg(long, default_value_t = 8)]
        slides: usize,
        #[arg(long, default_value = "da")]
        language: Language,
    },
    /// Generate an outline, then the full presentation
    Generate {
        prompt: String,
        #[arg(long, default_value_t = 8)]
        slides: usize,
        #[arg(long, default_value = "da")]
        language: Language,
    },
    /// Generate a presentation from an outline JSON file
    FromOutline {
        path: std::path::PathBuf,
        #[arg(long, default_value = "da")]
        language: Language,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let client = GenerationClient::new(reqwest::Client::new(), &cli.server);

    if let Err(e) = run(&client, cli.command).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(client: &GenerationClient, command: Command) -> Result<(), AppError> {
    match command {
        Command::Outline { prompt, slides, language } => {
            let outline = client.generate_outline(&prompt, slides, language).await?;
            println!("{}", serde_json::to_string_pretty(&outline)?);
        }
        Command::Generate { prompt, slides, language } => {
            let outline = client.generate_outline(&prompt, slides, language).await?;
            for item in outline.items() {
                println!("{:>3}. {}", item.id, item.title);
            }
            generate(client, &outline, language).await?;
        }
        Command::FromOutline { path, language } => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| AppError::Validation(format!("cannot read {}: {e}", path.display())))?;
            let outline: Outline = serde_json::from_str(&text)
                .map_err(|e| AppError::Validation(format!("invalid outline file: {e}")))?;
            generate(client, &outline, language).await?;
        }
    }
    Ok(())
}

async fn generate(client: &GenerationClient, outline: &Outline, language: Language) -> Result<(), AppError> {
    let mut last_step = String::new();
    let navigation = client
        .generate_slides(outline, language, |state| {
            if state.step != last_step {
                eprintln!("[{:>3.0}%] {}", state.progress, state.step);
                last_step = state.step.clone();
            }
        })
        .await?;
    println!("{}", navigation.path());
    Ok(())
}
