use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use serde::Serialize;
use storefront_api::{
    config::{self, AppConfig},
    db::{self, DbPool},
    events::{Event, EventSender},
    handlers::AppServices,
    services::{ReconcileSummary, VariantRecord},
};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "storefront-cli",
    about = "Maintenance commands for the storefront catalog",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Rebuild variants from attribute selections
    Reconcile(ReconcileArgs),
    /// List a product's variants
    Variants(VariantsArgs),
    #[command(subcommand)]
    Settings(SettingsCommands),
}

#[derive(Args)]
#[command(group(ArgGroup::new("target").required(true).args(["product", "all"])))]
struct ReconcileArgs {
    #[arg(long, help = "Product to reconcile")]
    product: Option<Uuid>,
    #[arg(long, action = ArgAction::SetTrue, help = "Reconcile every variable product")]
    all: bool,
}

#[derive(Args)]
struct VariantsArgs {
    #[arg(long)]
    product: Uuid,
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Insert missing default settings
    Seed,
    /// Print settings, optionally a single group
    Show {
        #[arg(long)]
        group: Option<String>,
    },
    /// Drop cached settings
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize().await?;

    match cli.command {
        Commands::Migrate => handle_migrate(&context).await?,
        Commands::Reconcile(args) => handle_reconcile(&context, args, cli.json).await?,
        Commands::Variants(args) => handle_variants(&context, args, cli.json).await?,
        Commands::Settings(command) => handle_settings_command(&context, command, cli.json).await?,
    }

    Ok(())
}

struct CliContext {
    db: Arc<DbPool>,
    services: AppServices,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config: AppConfig =
            config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;
        let db = Arc::new(db_pool);

        let (event_tx, mut event_rx) = mpsc::channel::<Event>(32);
        let event_sender = Arc::new(EventSender::new(event_tx));

        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                debug!(target: "storefront_cli", event = ?event, "received async event");
            }
        });

        let services = AppServices::new(db.clone(), event_sender, &config);
        Ok(Self { db, services })
    }
}

async fn handle_migrate(context: &CliContext) -> Result<()> {
    db::run_migrations(&context.db)
        .await
        .context("failed to run migrations")?;
    println!("Migrations applied");
    Ok(())
}

async fn handle_reconcile(context: &CliContext, args: ReconcileArgs, json: bool) -> Result<()> {
    let summaries = match args.product {
        Some(product_id) => vec![context
            .services
            .variants
            .reconcile(product_id)
            .await
            .with_context(|| format!("failed to reconcile product {}", product_id))?],
        None => context
            .services
            .variants
            .reconcile_all_variable_products()
            .await
            .context("failed to reconcile variable products")?,
    };

    if json {
        return print_json(&summaries);
    }

    if summaries.is_empty() {
        println!("No variable products found");
    }
    for summary in &summaries {
        render_summary(summary);
    }
    Ok(())
}

async fn handle_variants(context: &CliContext, args: VariantsArgs, json: bool) -> Result<()> {
    let variants = context
        .services
        .variants
        .list_variants(args.product)
        .await
        .context("failed to load variants")?;

    if json {
        return print_json(&variants);
    }

    if variants.is_empty() {
        println!("Product {} has no variants", args.product);
    }
    for variant in &variants {
        render_variant(variant);
    }
    Ok(())
}

async fn handle_settings_command(
    context: &CliContext,
    command: SettingsCommands,
    json: bool,
) -> Result<()> {
    let settings = &context.services.settings;
    match command {
        SettingsCommands::Seed => {
            let inserted = settings
                .seed_defaults()
                .await
                .context("failed to seed settings")?;
            println!("Inserted {} default settings", inserted);
        }
        SettingsCommands::Show { group } => {
            let values = match group.as_deref() {
                Some(group) => settings.group(group).await,
                None => settings.all().await,
            }
            .context("failed to load settings")?;

            if json {
                return print_json(&values);
            }
            for (key, value) in &values {
                println!("{} = {}", key, value);
            }
        }
        SettingsCommands::ClearCache => {
            settings
                .clear_cache()
                .await
                .context("failed to clear settings cache")?;
            println!("Settings cache cleared");
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_summary(summary: &ReconcileSummary) {
    println!(
        "- Product {} • created {} • deleted {} • unchanged {}",
        summary.product_id,
        summary.created.len(),
        summary.deleted.len(),
        summary.unchanged
    );
    for variant in &summary.created {
        println!("    + {}", variant.sku);
    }
    for variant in &summary.deleted {
        println!("    - {}", variant.sku);
    }
}

fn render_variant(variant: &VariantRecord) {
    println!(
        "- {} • {} • stock {}{} • {} attribute(s)",
        variant.sku,
        variant.effective_price,
        variant.stock_quantity,
        if variant.in_stock { "" } else { " (sold out)" },
        variant.attributes.len()
    );
}
