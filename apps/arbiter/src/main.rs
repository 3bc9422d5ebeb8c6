use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::UploadState;
use report_render::{html, text, RenderedView};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod events;
mod pages;
mod routes;

use app::{AppContext, Page};
use config::load_settings;
use pages::DecisionPage;
use routes::Route;

#[derive(Parser, Debug)]
#[command(name = "arbiter", about = "Decision analysis workspace client")]
struct Cli {
    /// Config file; defaults to ./arbiter.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the backend base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a decision and print its workspace route.
    Create { title: String },
    /// Open a route such as `/decisions/12`.
    Open {
        route: String,
        /// PDF evidence to upload before anything else, in order.
        #[arg(long = "upload", value_name = "PDF")]
        uploads: Vec<PathBuf>,
        /// Run (or re-run) the analysis.
        #[arg(long)]
        run: bool,
        /// Write the rendered workspace as a standalone HTML page.
        #[arg(long, value_name = "PATH")]
        html: Option<PathBuf>,
        /// Print the rendered view as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let ctx = AppContext::from_settings(&settings)?;

    match cli.command {
        Commands::Create { title } => {
            let Page::Home(home) = ctx.open(&Route::Home) else {
                bail!("home page unavailable");
            };
            match home.submit(&title).await {
                Ok(route) => println!("{route}"),
                Err(err) => bail!(err.banner()),
            }
        }
        Commands::Open {
            route,
            uploads,
            run,
            html,
            json,
        } => match ctx.open(&Route::parse(&route)) {
            Page::Home(_) => {
                println!("Create a decision with `arbiter create <title>`.");
            }
            Page::Invalid(err) => bail!(err.banner()),
            Page::Decision(page) => {
                open_decision(&page, &uploads, run, html, json).await?;
            }
        },
    }

    Ok(())
}

async fn open_decision(
    page: &DecisionPage,
    uploads: &[PathBuf],
    run: bool,
    html_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    for path in uploads {
        match page.add_evidence_file(path).await {
            Ok(ack) => println!("uploaded {} ({})", ack.filename, ack.status),
            Err(err) => eprintln!("{}", err.banner()),
        }
    }

    if run {
        let label = page.trigger().await.label();
        info!(decision_id = %page.decision_id(), action = label, "starting analysis");
        if let Err(err) = page.run_analysis().await {
            bail!(err.banner());
        }
    }

    let snapshot = page.snapshot().await;
    if let UploadState::Pending { filename } = &snapshot.upload {
        eprintln!("upload of {filename} still pending");
    }
    if snapshot.is_fetching {
        eprintln!("analysis still in progress");
    }
    let Some(view) = snapshot.view else {
        if let Some(banner) = snapshot.banner {
            eprintln!("{banner}");
        }
        println!(
            "No analysis result for decision {}. Use --run to {}.",
            snapshot.decision_id,
            snapshot.run_label.to_ascii_lowercase()
        );
        return Ok(());
    };

    emit(&view, json)?;
    if let Some(path) = html_path {
        let title = format!("Decision {}", snapshot.decision_id);
        tokio::fs::write(&path, html::render_page(&view, &title))
            .await
            .with_context(|| format!("failed to write html to '{}'", path.display()))?;
        info!(path = %path.display(), "html report written");
    }
    Ok(())
}

fn emit(view: &RenderedView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        print!("{}", text::render_view(view));
    }
    Ok(())
}
