use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn, Instrument};

use drill_console::api::HttpDrillApi;
use drill_console::app_system::{setup_tracing, ConsoleSystem};
use drill_console::clock::{SharedClock, SystemClock};
use drill_console::config::Config;
use drill_console::domain::{DrillId, SessionFilter, UserId};
use drill_console::drill_actor::CreateDrillRequest;
use drill_console::drill_card::DrillCard;
use drill_console::report::{session_rows, summarize};
use drill_console::timing::{format_cost, format_duration_hms, format_timestamp_full};
use drill_console::user_actor::CreateUserRequest;

/// admin console for timed, billable drill sessions
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
    /// drill service base URL, overrides the configured one
    #[clap(long, global = true)]
    base_url: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// list or create users
    Users {
        #[clap(subcommand)]
        action: UsersCommand,
    },
    /// list, create, start or stop drills
    Drills {
        #[clap(subcommand)]
        action: DrillsCommand,
    },
    /// session history
    Sessions {
        #[clap(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
    },
    /// per-drill totals and grand totals
    Report {
        #[clap(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
    },
    /// live board of running drills, until ctrl-c
    Board {
        /// seconds between redraws
        #[clap(long, default_value_t = 1)]
        refresh_secs: u64,
    },
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    List,
    Add {
        first_name: String,
        last_name: String,
        #[clap(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum DrillsCommand {
    List,
    Add {
        title: String,
        price_per_minute: f64,
    },
    Start {
        drill_id: DrillId,
        #[clap(required = true)]
        user_ids: Vec<UserId>,
    },
    /// stops the given users, or everyone on the drill when none are given
    Stop {
        drill_id: DrillId,
        user_ids: Vec<UserId>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum FilterArg {
    All,
    Active,
    Completed,
}

impl From<FilterArg> for SessionFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => SessionFilter::All,
            FilterArg::Active => SessionFilter::Active,
            FilterArg::Completed => SessionFilter::Completed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(base_url) = cli.base_url.clone() {
        config.api.base_url = base_url;
    }
    setup_tracing(&config.logging);
    info!(base_url = %config.api.base_url, "Starting drill console");

    let api = Arc::new(HttpDrillApi::new(&config.api)?);
    let clock: SharedClock = Arc::new(SystemClock);
    let mut system = ConsoleSystem::new(api, clock);

    let span = tracing::info_span!("command", name = command_name(&cli.command));
    let result = run(&mut system, &config, cli.command).instrument(span).await;

    system.shutdown().await?;
    result
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Users { .. } => "users",
        Command::Drills { .. } => "drills",
        Command::Sessions { .. } => "sessions",
        Command::Report { .. } => "report",
        Command::Board { .. } => "board",
    }
}

async fn run(
    system: &mut ConsoleSystem,
    config: &Config,
    command: Command,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Users { action } => users(system, action).await,
        Command::Drills { action } => drills(system, action).await,
        Command::Sessions { filter } => sessions(system, filter.into()).await,
        Command::Report { filter } => report(system, filter.into()).await,
        Command::Board { refresh_secs } => board(system, config, refresh_secs).await,
    }
}

async fn users(system: &ConsoleSystem, action: UsersCommand) -> Result<(), Box<dyn Error>> {
    match action {
        UsersCommand::List => {
            for user in system.user_client.load_users().await? {
                let email = user.email.as_deref().unwrap_or("-");
                println!("{:>5}  {:<30} {}", user.id, user.full_name(), email);
            }
        }
        UsersCommand::Add {
            first_name,
            last_name,
            email,
        } => {
            let request = CreateUserRequest::new(&first_name, &last_name, email.as_deref());
            let user = system.user_client.create_user(request).await?;
            println!("Created user {} ({})", user.full_name(), user.id);
        }
    }
    Ok(())
}

async fn drills(system: &ConsoleSystem, action: DrillsCommand) -> Result<(), Box<dyn Error>> {
    let client = &system.drill_client;
    match action {
        DrillsCommand::List => {
            for drill in client.load_drills().await? {
                println!(
                    "{:>5}  {:<30} {:>14}/хв  active: {}",
                    drill.id,
                    drill.title,
                    format_cost(drill.price_per_minute),
                    drill.users.len()
                );
            }
        }
        DrillsCommand::Add {
            title,
            price_per_minute,
        } => {
            let drill = client
                .create_drill(CreateDrillRequest::new(&title, price_per_minute))
                .await?;
            println!("Created drill {} ({})", drill.title, drill.id);
        }
        DrillsCommand::Start { drill_id, user_ids } => {
            let card = card_for(system, drill_id).await?;
            let plan = card.plan_start(&user_ids)?;
            if plan.skipped > 0 {
                println!("Skipping {} user(s) already on this drill", plan.skipped);
            }
            let drill = client.start_drill(drill_id, plan.user_ids).await?;
            println!("{}: {} active", drill.title, drill.users.len());
        }
        DrillsCommand::Stop { drill_id, user_ids } => {
            let targets = if user_ids.is_empty() {
                card_for(system, drill_id).await?.stop_targets()
            } else {
                user_ids
            };
            let drill = client.stop_drill(drill_id, targets).await?;
            println!("{}: {} active", drill.title, drill.users.len());
        }
    }
    Ok(())
}

async fn card_for(system: &ConsoleSystem, drill_id: DrillId) -> Result<DrillCard, Box<dyn Error>> {
    let drill = system
        .drill_client
        .load_drills()
        .await?
        .into_iter()
        .find(|d| d.id == drill_id)
        .ok_or_else(|| format!("Drill {drill_id} not found"))?;
    Ok(DrillCard::new(drill, system.clock()))
}

async fn sessions(system: &ConsoleSystem, filter: SessionFilter) -> Result<(), Box<dyn Error>> {
    let sessions = system.session_client.apply_filter(filter).await?;
    let now = system.clock().now_millis();
    for row in session_rows(&sessions, now) {
        println!(
            "{:<24} {:<20} {:<20} {:<20} {:>10} {:>14} {:>14}",
            row.user_name, row.drill_title, row.started, row.stopped, row.duration, row.rate, row.cost
        );
    }
    Ok(())
}

async fn report(system: &ConsoleSystem, filter: SessionFilter) -> Result<(), Box<dyn Error>> {
    let sessions = system.session_client.apply_filter(filter).await?;
    let summary = summarize(&sessions, system.clock().now_millis());

    for drill in &summary.drills {
        println!(
            "{:<30} {:>6} {:>12} {:>16}",
            drill.title,
            drill.sessions,
            format_duration_hms(drill.total_seconds),
            format_cost(drill.total_cost)
        );
    }
    println!(
        "{:<30} {:>6} {:>12} {:>16}",
        "Total",
        summary.total_sessions,
        summary.total_duration(),
        summary.total_cost_label()
    );
    Ok(())
}

async fn board(
    system: &mut ConsoleSystem,
    config: &Config,
    refresh_secs: u64,
) -> Result<(), Box<dyn Error>> {
    system.drill_client.load_drills().await?;
    system.session_client.apply_filter(SessionFilter::All).await?;
    system.start_polling(config.polling.interval());

    let mut cards: HashMap<DrillId, DrillCard> = HashMap::new();
    let mut ticker = tokio::time::interval(Duration::from_secs(refresh_secs.max(1)));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, leaving board");
                break;
            }
            _ = ticker.tick() => {
                let drills = system.drill_client.snapshot().await?;
                let starts = system.session_client.active_starts().await?;
                let stops = system.session_client.recent_stops().await?;
                if let Some(e) = &drills.last_error {
                    warn!(error = %e, "Showing last known drills");
                }

                let clock = system.clock();
                let now = clock.now_millis();
                cards.retain(|id, _| drills.items.iter().any(|d| d.id == *id));
                println!("--- {} ---", format_timestamp_full(now));
                for drill in drills.items {
                    let empty = HashMap::new();
                    let reported_starts = starts.get(&drill.id).unwrap_or(&empty);
                    let reported_stops = stops.get(&drill.id).unwrap_or(&empty);
                    let card = cards
                        .entry(drill.id)
                        .or_insert_with(|| DrillCard::new(drill.clone(), clock.clone()));
                    card.sync(drill, reported_starts, reported_stops);

                    println!("{} ({}), active: {}", card.drill().title, card.price_label(), card.active_count());
                    for row in card.rows() {
                        println!("    {:<30} {}", row.user.full_name(), row.elapsed);
                    }
                }
            }
        }
    }
    Ok(())
}
