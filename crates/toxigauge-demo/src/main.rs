use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use toxigauge_classifiers::{load_vocabulary, TextEncoder, ToxicCommentClassifier};
use toxigauge_demo::cli::{Cli, Commands};
use toxigauge_demo::render::render_categories;
use toxigauge_demo::session::{read_text, run_interactive, write_classification};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.settings.verbose);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Classify { text, json } => {
            let config = cli.settings.classifier_config()?;
            let classifier = ToxicCommentClassifier::from_config(&config)?;

            let text = read_text(text, std::io::stdin().lock())?;
            let result = classifier.classify(&text)?;
            write_classification(&result, json, &mut out)?;
        }

        Commands::Interactive { json } => {
            let config = cli.settings.classifier_config()?;
            let classifier = ToxicCommentClassifier::from_config(&config)?;

            if !json {
                eprintln!("Enter text to classify, one per line (Ctrl+D to quit)");
                eprintln!("Type `:threshold <0-1>` to change the decision threshold");
            }
            let count = run_interactive(&classifier, std::io::stdin().lock(), &mut out, json)?;
            tracing::info!(count, "Session finished");
        }

        Commands::Tokens { text } => {
            let config = cli.settings.classifier_config()?;
            let vocabulary = load_vocabulary(&config.to_model_config())?;
            let encoder = TextEncoder::with_max_len(Arc::new(vocabulary), config.max_len)?;

            let text = read_text(text, std::io::stdin().lock())?;
            let tokens = encoder.tokens(&text);
            let encoded = encoder.encode(&text);

            writeln!(out, "Tokens ({}): {:?}", tokens.len(), tokens)?;
            writeln!(out, "Encoded ({}): {:?}", encoded.len(), encoded.ids())?;
        }

        Commands::Categories => {
            writeln!(out, "{}", render_categories())?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "toxigauge=debug,toxigauge_demo=debug,toxigauge_classifiers=debug"
    } else {
        "toxigauge=info,toxigauge_demo=info,toxigauge_classifiers=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
