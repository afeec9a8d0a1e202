use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use seeding_planner::campaign::{CampaignRequest, CampaignType, Guardrails};
use seeding_planner::config::{Config, ConfigOverrides};
use seeding_planner::creators::source::{source_for_path, split_tags};
use seeding_planner::creators::Creator;
use seeding_planner::eligibility::{explain_eligibility, CreatorEligibility};
use seeding_planner::output::csv::{eligibility_to_csv, selection_to_csv};
use seeding_planner::output::json::{read_json_file, render_json};
use seeding_planner::output::table::{render_eligibility_table, render_plan_table};
use seeding_planner::planner::{plan_campaign, recalculate, reoptimize_allocation};
use seeding_planner::server::run_server;
use seeding_planner::types::CampaignResult;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "seeding-planner",
    about = "Creator selection and budget allocation for seeding campaigns"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Creator export (JSON array or CSV); overrides `data.creators_path`.
    #[arg(long)]
    creators: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args, Clone)]
struct CampaignArgs {
    #[arg(long)]
    budget: f64,
    #[arg(long = "campaign-type", default_value = "audio")]
    campaign_type: String,
    /// Comma separated
    #[arg(long)]
    genres: Option<String>,
    #[arg(long = "content-types")]
    content_types: Option<String>,
    #[arg(long)]
    territories: Option<String>,
    #[arg(long = "min-median-views")]
    min_median_views: Option<u64>,
    #[arg(long = "max-cp1k")]
    max_cp1k: Option<f64>,
    /// Percentage, e.g. 3.5
    #[arg(long = "min-engagement-rate")]
    min_engagement_rate: Option<f64>,
}

impl TryFrom<CampaignArgs> for CampaignRequest {
    type Error = anyhow::Error;

    fn try_from(value: CampaignArgs) -> Result<Self> {
        if !(value.budget.is_finite() && value.budget > 0.0) {
            return Err(anyhow!("--budget must be a positive amount"));
        }
        let campaign_type = CampaignType::from_str(&value.campaign_type)?;
        Ok(CampaignRequest::new(value.budget, campaign_type)
            .with_genres(parse_list(value.genres.as_deref()))
            .with_content_types(parse_list(value.content_types.as_deref()))
            .with_territories(parse_list(value.territories.as_deref()))
            .with_guardrails(Guardrails {
                min_median_views: value.min_median_views,
                max_cp1k: value.max_cp1k,
                min_engagement_rate: value.min_engagement_rate,
            }))
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    Plan {
        #[command(flatten)]
        campaign: CampaignArgs,
        #[arg(long = "max-posts")]
        max_posts: Option<u32>,
    },
    Eligibility {
        #[command(flatten)]
        campaign: CampaignArgs,
    },
    Reoptimize {
        #[arg(long)]
        result: PathBuf,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long = "max-posts")]
        max_posts: Option<u32>,
    },
    Totals {
        #[arg(long)]
        result: PathBuf,
    },
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    let max_posts = match &cli.command {
        Commands::Plan { max_posts, .. } | Commands::Reoptimize { max_posts, .. } => *max_posts,
        _ => None,
    };
    config.apply_overrides(ConfigOverrides {
        creators_path: cli
            .creators
            .as_ref()
            .map(|p| p.to_string_lossy().to_string()),
        max_posts_per_creator: max_posts,
    });

    match cli.command {
        Commands::Plan { campaign, .. } => {
            let request = CampaignRequest::try_from(campaign)?;
            let creators = load_creators(&config)?;
            let result = plan_campaign(&creators, &request, &config.policy());
            print_result(&result, cli.output)?;
        }
        Commands::Eligibility { campaign } => {
            let request = CampaignRequest::try_from(campaign)?;
            let creators = load_creators(&config)?;
            let results = explain_eligibility(&creators, &request);
            print_eligibility(&results, cli.output)?;
        }
        Commands::Reoptimize { result, budget, .. } => {
            let previous: CampaignResult = read_json_file(&result)?;
            let budget = budget.unwrap_or(previous.budget);
            let result = reoptimize_allocation(&previous.eligible_pool, budget, &config.policy());
            print_result(&result, cli.output)?;
        }
        Commands::Totals { result } => {
            let edited: CampaignResult = read_json_file(&result)?;
            print_result(&recalculate(&edited), cli.output)?;
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let bind = format!("{host}:{port}");
            let addr: SocketAddr = bind
                .parse()
                .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
            run_server(config, addr).await?;
        }
        Commands::Config { init, show } => {
            handle_config_command(init, show, &config, &config_path)?;
        }
    }

    Ok(())
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &Path) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn load_creators(config: &Config) -> Result<Vec<Creator>> {
    let path = config.resolved_creators_path();
    let source = source_for_path(&path);
    let creators = source.load()?;
    info!(
        "loaded {} creators via {} source from {}",
        creators.len(),
        source.name(),
        path.display()
    );
    Ok(creators)
}

fn parse_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .flat_map(split_tags)
            .collect::<Vec<_>>()
    })
    .unwrap_or_default()
}

fn print_result(result: &CampaignResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_plan_table(result)),
        OutputFormat::Json => println!("{}", render_json(result)?),
        OutputFormat::Csv => print!("{}", selection_to_csv(&result.selected)?),
    }
    Ok(())
}

fn print_eligibility(results: &[CreatorEligibility], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_eligibility_table(results)),
        OutputFormat::Json => println!("{}", render_json(results)?),
        OutputFormat::Csv => print!("{}", eligibility_to_csv(results)?),
    }
    Ok(())
}
