//! `resuscan`: command-line front end for the ResuScan backend.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resuscan_editor::analyzer::ResumeAnalyzer;
use resuscan_editor::api_client::VersionBackend;
use resuscan_editor::config::Config;
use resuscan_editor::editor::notices::{NoticeReceiver, Severity};
use resuscan_editor::editor::EditorSession;
use resuscan_editor::state::EditorContext;

#[derive(Parser, Debug)]
#[command(name = "resuscan")]
#[command(version)]
#[command(about = "Resume drafts, versions and ATS analysis against a ResuScan backend", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available PDF templates
    Templates,

    /// List saved resume versions
    Versions,

    /// Print one saved version
    Show { id: String },

    /// Delete a saved version
    Delete { id: String },

    /// Render a saved version to PDF
    Export {
        id: String,
        /// Template id (defaults to DEFAULT_TEMPLATE)
        #[arg(short, long)]
        template: Option<String>,
        /// Output file (defaults to resume_YYYY-MM-DD.pdf)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Load a saved version into the editor and print its live feedback
    Feedback { id: String },

    /// Analyze a resume file (.pdf, .docx, .doc)
    Analyze {
        file: PathBuf,
        #[arg(short, long)]
        job_title: String,
    },

    /// Analyze a LinkedIn profile screenshot (.png, .jpg, .jpeg, .gif)
    Linkedin {
        image: PathBuf,
        #[arg(short, long)]
        job_title: String,
    },

    /// Extract the plain text of a resume file
    Extract { file: PathBuf },

    /// Compare the skills in a resume file against a target job
    SkillGap {
        file: PathBuf,
        #[arg(short, long)]
        job_title: String,
    },

    /// Rewrite resume bullet points for a job title
    Bullets {
        #[arg(required = true)]
        bullets: Vec<String>,
        #[arg(short, long)]
        job_title: String,
    },

    /// Suggest projects and courses covering missing skills
    Recommend {
        #[arg(required = true)]
        skills: Vec<String>,
        #[arg(short, long)]
        job_title: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "resuscan_editor={0},resuscan={0}",
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("resuscan v{}", env!("CARGO_PKG_VERSION"));

    let ctx = EditorContext::from_config(config)?;

    match args.command {
        Commands::Templates => print_json(&ctx.client.list_templates().await?),
        Commands::Versions => print_json(&ctx.client.list_versions().await?),
        Commands::Show { id } => print_json(&ctx.client.get_version(&id).await?),
        Commands::Delete { id } => {
            let (session, mut inbox) = open_session(&ctx).await;
            let result = session.delete_version(&id).await;
            drain_notices(&mut inbox);
            result?;
            Ok(())
        }
        Commands::Export { id, template, out } => {
            let (mut session, mut inbox) = open_session(&ctx).await;
            session.load_version(&id).await?;
            if let Some(template) = template {
                session.select_template(template);
            }
            let result = session.export_pdf().await;
            drain_notices(&mut inbox);
            let export = result?;

            let path = out.unwrap_or_else(|| PathBuf::from(&export.file_name));
            tokio::fs::write(&path, &export.bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Feedback { id } => {
            let (mut session, mut inbox) = open_session(&ctx).await;
            session.load_version(&id).await?;
            drain_notices(&mut inbox);

            let target = session.revision();
            let mut feedback = session.subscribe_feedback();
            let wait = ctx.config.feedback_debounce + ctx.config.http_timeout;
            tokio::time::timeout(wait, feedback.wait_for(|state| state.revision >= target))
                .await
                .map_err(|_| anyhow!("No feedback for version {id} within {wait:?}"))?
                .context("Feedback worker stopped")?;

            print_json(&session.feedback().result)
        }
        Commands::Analyze { file, job_title } => {
            let analyzer = ResumeAnalyzer::new(ctx.client.clone());
            print_json(&analyzer.analyze_resume(Some(&file), &job_title).await?)
        }
        Commands::Linkedin { image, job_title } => {
            let analyzer = ResumeAnalyzer::new(ctx.client.clone());
            print_json(&analyzer.analyze_linkedin(Some(&image), &job_title).await?)
        }
        Commands::Extract { file } => {
            let analyzer = ResumeAnalyzer::new(ctx.client.clone());
            print_json(&analyzer.extract_text(&file).await?)
        }
        Commands::SkillGap { file, job_title } => {
            let analyzer = ResumeAnalyzer::new(ctx.client.clone());
            let uploaded = analyzer.extract_text(&file).await?;
            print_json(&analyzer.skill_gap(&uploaded.resume_text, &job_title).await?)
        }
        Commands::Bullets { bullets, job_title } => {
            let analyzer = ResumeAnalyzer::new(ctx.client.clone());
            print_json(&analyzer.improve_bullets(&bullets, &job_title).await?)
        }
        Commands::Recommend { skills, job_title } => {
            let analyzer = ResumeAnalyzer::new(ctx.client.clone());
            print_json(&analyzer.recommend(&skills, &job_title).await?)
        }
    }
}

/// One-shot commands never outlive an autosave period; keep the timer off.
async fn open_session(ctx: &EditorContext) -> (EditorSession, NoticeReceiver) {
    let (session, inbox) = EditorSession::mount(ctx).await;
    session.set_autosave(false);
    (session, inbox)
}

fn drain_notices(inbox: &mut NoticeReceiver) {
    while let Ok(notice) = inbox.try_recv() {
        match notice.severity {
            Severity::Error => eprintln!("error: {}", notice.message),
            Severity::Success | Severity::Info => eprintln!("{}", notice.message),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
