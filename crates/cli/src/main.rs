mod echo;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use referent_core::{
    Action, ExtractionResult, FetchConfig, GeneratedImage, ProviderConfig, ProviderConfigBuilder, Referent, ReferentError,
    extract_article, fetch_file, fetch_stdin, fetch_url,
};

use echo::{format_size, print_banner, print_error, print_field, print_info, print_step, print_success, print_warning};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// What to produce from the extracted article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Parse,
    Text(Action),
    Illustrate,
}

impl FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            format!("Invalid action: {}. Valid options: parse, summary, theses, telegram, translate, illustrate", s)
        };

        match s.to_lowercase().as_str() {
            "parse" => Ok(Self::Parse),
            "illustrate" | "image" => Ok(Self::Illustrate),
            other => match other.parse::<Action>() {
                Ok(Action::ImagePrompt) | Err(_) => Err(invalid()),
                Ok(action) => Ok(Self::Text(action)),
            },
        }
    }
}

impl Task {
    fn label(&self) -> &'static str {
        match self {
            Task::Parse => "parse",
            Task::Text(action) => action.as_str(),
            Task::Illustrate => "illustrate",
        }
    }
}

/// Where the HTML comes from
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Url(String),
    File(String),
    Stdin,
}

impl Input {
    fn classify(raw: &str) -> Self {
        if raw == "-" {
            return Self::Stdin;
        }

        match url::Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Url(raw.to_string()),
            _ => Self::File(raw.to_string()),
        }
    }
}

/// Result ready to be written out
enum Output {
    Text(String),
    Image(GeneratedImage),
}

impl Output {
    fn len(&self) -> usize {
        match self {
            Output::Text(text) => text.len(),
            Output::Image(image) => image.bytes.len(),
        }
    }
}

/// Extract articles from web pages and turn them into summaries, theses,
/// Telegram posts, translations or illustrations
#[derive(Parser, Debug)]
#[command(name = "referent")]
#[command(version)]
#[command(about = "Extract articles from web pages and summarize, translate or illustrate them", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// parse, summary, theses, telegram, translate or illustrate
    #[arg(short, long, default_value = "parse", value_name = "ACTION")]
    action: Task,

    /// Output file (default: stdout). Illustrations are written as image bytes
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Chat model identifier (overrides REFERENT_CHAT_MODEL)
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Output language for AI results (overrides REFERENT_LANGUAGE)
    #[arg(long, value_name = "LANG")]
    language: Option<String>,

    /// Print progress details
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn providers(&self) -> ProviderConfig {
        let mut builder = ProviderConfigBuilder::from_config(ProviderConfig::from_env());
        if let Some(model) = &self.model {
            builder = builder.chat_model(model.clone());
        }
        if let Some(language) = &self.language {
            builder = builder.target_language(language.clone());
        }
        builder.build()
    }

    fn fetch_config(&self) -> FetchConfig {
        let mut config = FetchConfig { timeout: self.timeout, ..Default::default() };
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        config
    }
}

async fn load_html(input: &Input, config: &FetchConfig, verbose: bool, total: usize) -> anyhow::Result<String> {
    let html = match input {
        Input::Stdin => {
            if verbose {
                print_step(1, total, "Reading from stdin");
            }
            fetch_stdin().context("Failed to read from stdin")?
        }
        Input::Url(url) => {
            if verbose {
                print_step(1, total, &format!("Fetching from {}", url.bright_white().underline()));
            }
            fetch_url(url, config).await.context("Failed to fetch URL")?
        }
        Input::File(path) => {
            if verbose {
                print_step(1, total, &format!("Reading from file {}", path.bright_white()));
            }
            fetch_file(path).with_context(|| format!("Failed to read file: {}", path))?
        }
    };

    if verbose {
        print_field("Size", &format_size(html.len()));
        eprintln!();
    }

    Ok(html)
}

fn print_article(article: &ExtractionResult) {
    print_field("Title", article.title.as_deref().unwrap_or("-"));
    print_field("Date", article.date.as_deref().unwrap_or("-"));
    let chars = article.content.as_deref().map(|c| c.chars().count()).unwrap_or(0);
    print_field("Content", &format!("{chars} chars"));
    eprintln!();
}

async fn run(args: Args) -> anyhow::Result<()> {
    let total = if args.action == Task::Parse { 3 } else { 4 };
    let providers = args.providers();

    if args.verbose {
        print_banner();
        print_info(&format!("Action: {}", args.action.label()));
        eprintln!();
    }

    // Credentials are checked before any network traffic.
    match args.action {
        Task::Parse => {}
        Task::Text(_) => {
            providers.require_chat_key()?;
        }
        Task::Illustrate => {
            providers.require_chat_key()?;
            providers.require_image_key()?;
        }
    }

    let model = providers.chat_model.clone();
    let referent = Referent::new(providers).with_fetch_config(args.fetch_config());

    let input = Input::classify(&args.input);
    let html = load_html(&input, referent.fetch_config(), args.verbose, total).await?;

    if args.verbose {
        print_step(2, total, "Extracting article");
    }

    let article = extract_article(&html).context("Failed to parse HTML")?;

    if args.verbose {
        print_article(&article);
    }

    let output = match args.action {
        Task::Parse => {
            if article.content.is_none() {
                print_warning("No article content found");
            }
            let mut json = serde_json::to_string_pretty(&article).context("Failed to serialize article")?;
            json.push('\n');
            Output::Text(json)
        }
        Task::Text(action) => {
            if args.verbose {
                print_step(3, total, &format!("Requesting {} from {}", action.as_str(), model.bright_white()));
            }
            let mut outcome = referent.process_article(&article, action).await?;
            if !outcome.result.ends_with('\n') {
                outcome.result.push('\n');
            }
            Output::Text(outcome.result)
        }
        Task::Illustrate => {
            if args.verbose {
                print_step(3, total, "Generating illustration");
            }
            let (prompt, image) = referent.render_illustration(&article).await?;
            if args.verbose {
                print_field("Prompt", &prompt);
                print_field("Image", &format!("{} ({})", format_size(image.bytes.len()), image.content_type));
                eprintln!();
            }

            Output::Image(image)
        }
    };

    if args.verbose {
        print_step(total, total, "Writing output");
        print_field("Size", &format_size(output.len()));
        eprintln!();
    }

    match (&args.output, output) {
        (Some(path), Output::Text(text)) => write_output(path, text.as_bytes())?,
        (Some(path), Output::Image(image)) => write_output(path, &image.bytes)?,
        (None, Output::Text(text)) => print!("{}", text),
        (None, Output::Image(image)) => println!("{}", image.to_data_url()),
    }

    Ok(())
}

fn write_output(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write to file: {}", path.display()))?;
    print_success(&format!("Output written to {}", path.display().bright_white()));
    Ok(())
}

/// Prints the error chain and, for pipeline failures, a user-facing hint.
fn report(err: &anyhow::Error) {
    print_error(&format!("{err:#}"));
    if let Some(e) = err.downcast_ref::<ReferentError>() {
        print_info(e.kind().friendly_message());
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}
