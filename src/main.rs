use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use swot_early_warning::config::AnalysisConfig;
use swot_early_warning::export;
use swot_early_warning::ingest;
use swot_early_warning::insights::generate_insights;
use swot_early_warning::pipeline::{self, AnalysisRun};
use swot_early_warning::report::build_report;
use swot_early_warning::scoring::ScoringProfile;
use swot_early_warning::telemetry;

#[derive(Parser)]
#[command(name = "swot-early-warning")]
#[command(about = "Workforce SWOT scoring and early warning reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileArg {
    Basic,
    Enhanced,
}

impl From<ProfileArg> for ScoringProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Basic => ScoringProfile::Basic,
            ProfileArg::Enhanced => ScoringProfile::Enhanced,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Score, categorize and model a table, then write all artifacts
    Analyze {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "output")]
        out: PathBuf,
        #[arg(long, value_enum)]
        profile: Option<ProfileArg>,
    },
    /// Quick validation pass with basic scores and fixed cutoffs
    Validate {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "swot_validation_report.md")]
        out: PathBuf,
    },
    /// Print the highest-risk employees
    Score {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            csv,
            config,
            out,
            profile,
        } => {
            let mut config = AnalysisConfig::load(config.as_deref()).context("failed to load analysis config")?;
            if let Some(profile) = profile {
                config.scoring_profile = profile.into();
            }
            telemetry::init(&config.log_level)?;

            let run = load_and_run(&csv, &config)?;
            let insights = generate_insights(&run);
            let report = build_report(&run, &insights);
            let artifacts = export::write_all(&out, &run, &insights, &report)
                .with_context(|| format!("failed to write artifacts to {}", out.display()))?;

            println!(
                "Analyzed {} employees ({} departments), health score {:.1}.",
                insights.dataset.total_employees, insights.dataset.departments, insights.swot.health_score
            );
            for rec in insights.recommendations.iter() {
                println!("- [{}] {}: {}", rec.priority.label(), rec.category, rec.action);
            }
            println!("Report written to {}.", artifacts.report.display());
        }
        Commands::Validate { csv, out } => {
            let config = AnalysisConfig::validator();
            telemetry::init(&config.log_level)?;

            let run = load_and_run(&csv, &config)?;
            let insights = generate_insights(&run);
            let report = build_report(&run, &insights);
            export::write_report(&out, &report)
                .with_context(|| format!("failed to write report to {}", out.display()))?;

            println!("SWOT distribution:");
            for share in insights.swot.distribution.iter() {
                println!("- {}: {} ({:.1}%)", share.category, share.count, share.percentage);
            }
            println!("Report written to {}.", out.display());
        }
        Commands::Score { csv, config, limit } => {
            let config = AnalysisConfig::load(config.as_deref()).context("failed to load analysis config")?;
            telemetry::init(&config.log_level)?;

            let run = load_and_run(&csv, &config)?;
            if run.scored.is_empty() {
                println!("No employees found in {}.", csv.display());
                return Ok(());
            }

            let mut ranked: Vec<_> = run.scored.iter().collect();
            ranked.sort_by(|a, b| b.scores.risk.total_cmp(&a.scores.risk));

            println!("Top employees by risk score:");
            for employee in ranked.into_iter().take(limit) {
                println!(
                    "- {} ({}, {}) risk {:.2}, productivity {:.2}, engagement {:.2} [{}]",
                    employee.record.employee_id,
                    employee.record.department,
                    employee.record.job_title,
                    employee.scores.risk,
                    employee.scores.productivity,
                    employee.scores.engagement,
                    employee.category
                );
            }
        }
    }

    Ok(())
}

fn load_and_run(csv: &Path, config: &AnalysisConfig) -> anyhow::Result<AnalysisRun> {
    let inputs = ingest::load_path(csv, config.missing_data)
        .with_context(|| format!("failed to load employees from {}", csv.display()))?;
    Ok(pipeline::run(inputs, config))
}
