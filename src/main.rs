use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use launchpad::{
    estimate_cost, recommend_flat, telemetry, BillingCycle, CatalogService, FileStore,
    LaunchpadConfig, StaticCatalog, TeamSizeBucket, UserId, WizardStorage, TOTAL_STEPS,
};

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(about = "Workspace onboarding wizard engine")]
#[command(long_about = "Launchpad drives the six-step workspace onboarding flow: basics, goals, \
                       features, plan, team, and branding. The CLI inspects and manages persisted \
                       wizard sessions and runs the catalog tooling (recommendations, cost \
                       estimates) from the command line.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a user's in-progress wizard: current step, progress, and completed steps
    Status {
        /// User whose persisted wizard state to inspect
        #[arg(long, help = "Authenticated user id that keys the persisted state")]
        user: String,
    },
    /// Discard a user's in-progress wizard and its persisted record
    Reset {
        /// User whose persisted wizard state to discard
        #[arg(long, help = "Authenticated user id that keys the persisted state")]
        user: String,
    },
    /// List the onboarding catalog (industries, goals, features, plans)
    Catalog {
        /// Limit output to one section
        #[arg(long, help = "Section to print: industries, goals, features, or plans")]
        section: Option<String>,
    },
    /// Run the feature recommendation tables for an industry and team size
    Recommend {
        #[arg(long, help = "Industry slug, e.g. marketing")]
        industry: String,
        #[arg(long, default_value = "solo", help = "Team size bucket: solo, small, medium, large")]
        team_size: TeamSizeBucket,
        /// Feature slugs already selected; recommendations are de-duplicated against these
        #[arg(long, help = "Already-selected feature slug (repeatable)")]
        selected: Vec<String>,
    },
    /// Estimate plan cost for a feature selection
    Estimate {
        #[arg(long, help = "Plan slug, e.g. free, pro, business")]
        plan: String,
        #[arg(long, default_value = "monthly", help = "Billing cycle: monthly or yearly")]
        cycle: String,
        #[arg(long, default_value = "0", help = "Number of enabled features")]
        features: u32,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = LaunchpadConfig::load()?;
    telemetry::init_telemetry(&config.observability)?;

    let cli = Cli::parse();
    match cli.command {
        None => {
            show_overview();
            Ok(())
        }
        Some(Commands::Status { user }) => status_command(&config, &user),
        Some(Commands::Reset { user }) => reset_command(&config, &user),
        Some(Commands::Catalog { section }) => tokio::runtime::Runtime::new()?
            .block_on(async { catalog_command(&config, section.as_deref()).await }),
        Some(Commands::Recommend { industry, team_size, selected }) => {
            tokio::runtime::Runtime::new()?
                .block_on(async { recommend_command(&config, &industry, team_size, &selected).await })
        }
        Some(Commands::Estimate { plan, cycle, features }) => tokio::runtime::Runtime::new()?
            .block_on(async { estimate_command(&config, &plan, &cycle, features).await }),
    }
}

fn show_overview() {
    println!("LAUNCHPAD - Workspace Onboarding");
    println!();
    println!("The wizard walks a new workspace through {TOTAL_STEPS} steps:");
    println!("  1. basics     workspace name, URL, industry, team size");
    println!("  2. goals      business objectives, priority-ordered");
    println!("  3. features   catalog capabilities to enable");
    println!("  4. plan       subscription tier and billing cycle");
    println!("  5. team       teammate invitations (optional)");
    println!("  6. branding   logo and colors (optional)");
    println!();
    println!("Commands:");
    println!("  launchpad status --user <id>      inspect a persisted wizard");
    println!("  launchpad reset --user <id>       discard a persisted wizard");
    println!("  launchpad catalog                 browse the onboarding catalog");
    println!("  launchpad recommend --industry m  run the recommendation tables");
    println!("  launchpad estimate --plan pro     estimate subscription cost");
}

fn storage(config: &LaunchpadConfig) -> WizardStorage {
    WizardStorage::new(Arc::new(FileStore::new(config.storage.root_dir.clone())))
}

fn build_catalog(config: &LaunchpadConfig) -> Result<StaticCatalog> {
    match &config.catalog.file {
        Some(path) => Ok(StaticCatalog::from_toml_file(path)?),
        None => Ok(StaticCatalog::builtin()),
    }
}

fn status_command(config: &LaunchpadConfig, user: &str) -> Result<()> {
    let user = UserId::new(user);
    match storage(config).load(&user) {
        Some(state) => {
            println!("Wizard for {user}:");
            println!(
                "  step {}/{TOTAL_STEPS} ({}%)",
                state.current_step,
                state.progress_percentage()
            );
            let completed: Vec<String> =
                state.completed_steps.iter().map(|s| s.to_string()).collect();
            println!(
                "  completed steps: {}",
                if completed.is_empty() { "none".to_string() } else { completed.join(", ") }
            );
            if !state.form_data.basics.name.is_empty() {
                println!(
                    "  workspace: {} ({})",
                    state.form_data.basics.name, state.form_data.basics.slug
                );
            }
        }
        None => println!("No in-progress wizard for {user}"),
    }
    Ok(())
}

fn reset_command(config: &LaunchpadConfig, user: &str) -> Result<()> {
    let user = UserId::new(user);
    storage(config).clear(&user)?;
    println!("Discarded wizard state for {user}");
    Ok(())
}

async fn catalog_command(config: &LaunchpadConfig, section: Option<&str>) -> Result<()> {
    let catalog = build_catalog(config)?;
    let all = section.is_none();

    if all || section == Some("industries") {
        println!("Industries:");
        for industry in catalog.industries().await? {
            println!("  {:<14} {}", industry.slug, industry.name);
        }
    }
    if all || section == Some("goals") {
        println!("Goals:");
        for goal in catalog.goals().await? {
            println!("  {:<22} {} [{}]", goal.id, goal.name, goal.feature_slugs.join(", "));
        }
    }
    if all || section == Some("features") {
        println!("Features:");
        for feature in catalog.features().await? {
            let gate = feature
                .min_plan
                .as_deref()
                .map(|p| format!(" (requires {p})"))
                .unwrap_or_default();
            println!("  {:<22} {}{gate}", feature.slug, feature.name);
        }
    }
    if all || section == Some("plans") {
        println!("Plans:");
        for plan in catalog.plans().await? {
            println!(
                "  {:<10} {}/mo {}/yr ({:?})",
                plan.slug, plan.base_price_monthly, plan.base_price_yearly, plan.pricing_model
            );
        }
    }
    Ok(())
}

async fn recommend_command(
    config: &LaunchpadConfig,
    industry: &str,
    team_size: TeamSizeBucket,
    selected: &[String],
) -> Result<()> {
    let catalog = build_catalog(config)?;
    let features = catalog.features().await?;
    let recommendations = recommend_flat(&features, industry, team_size, selected);
    if recommendations.is_empty() {
        println!("No recommendations for industry '{industry}' ({})", team_size.as_str());
        return Ok(());
    }
    println!("Recommended for industry '{industry}' ({}):", team_size.as_str());
    for feature in recommendations {
        println!("  {:<22} {}", feature.slug, feature.name);
    }
    Ok(())
}

async fn estimate_command(
    config: &LaunchpadConfig,
    plan_slug: &str,
    cycle: &str,
    features: u32,
) -> Result<()> {
    let cycle = match cycle {
        "monthly" => BillingCycle::Monthly,
        "yearly" => BillingCycle::Yearly,
        other => return Err(anyhow!("unknown billing cycle: {other}")),
    };
    let catalog = build_catalog(config)?;
    let plan = catalog.plan_by_slug(plan_slug).await?;
    let estimate = estimate_cost(&plan, cycle, features)?;
    println!("Plan {} with {features} enabled feature(s):", plan.slug);
    println!("  monthly: {}", estimate.monthly);
    println!("  yearly:  {}", estimate.yearly);
    println!("  savings when billed yearly: {}", estimate.savings);
    Ok(())
}
