//! # autothemectl: theme-switch control CLI
//!
//! Composition root that wires all adapters together and runs one user
//! action against the background theme service.
//!
//! ## Responsibilities
//! - Parse CLI args and load configuration (file, env vars)
//! - Initialise logging
//! - Construct the adapters and inject them into the scheduler and the
//!   autostart controller via port traits
//! - Run the requested action and print the resulting state
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use autotheme_adapter_ipc::TcpCommandChannel;
use autotheme_adapter_solar::NoaaSolarClock;
use autotheme_adapter_storage_file::{FileConfigStore, FileLocationCache};
use autotheme_adapter_virtual::{CoordinatePlaceResolver, FixedPowerStatus, ScriptedPermission};
use autotheme_app::event_bus::InProcessEventBus;
use autotheme_app::scheduler::{ApplyOutcome, ThemeSwitchScheduler};
use autotheme_app::services::autostart_controller::AutostartController;
use autotheme_app::services::location_poller::LocationPoller;
use autotheme_domain::offset::OffsetInput;
use autotheme_domain::state::{ApplyWarning, SchedulerState};
use autotheme_domain::time::Timestamp;

use crate::config::Config;

type Channel = Arc<TcpCommandChannel>;
type Store = Arc<FileConfigStore>;
type Locator =
    LocationPoller<Channel, FileLocationCache, ScriptedPermission, CoordinatePlaceResolver>;
type Scheduler = ThemeSwitchScheduler<
    Store,
    Channel,
    Locator,
    NoaaSolarClock,
    FixedPowerStatus,
    InProcessEventBus,
>;

#[derive(Debug, Parser)]
#[command(name = "autothemectl", version, about = "Schedule automatic light/dark theme switching")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, short, global = true, default_value = "autotheme.toml")]
    config: PathBuf,

    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Show the current mode and switch times.
    Status,
    /// Turn automatic switching off.
    Disable,
    /// Switch at fixed clock times.
    Fixed {
        /// Light theme start, `HH:MM`.
        #[arg(long)]
        sunrise: String,
        /// Dark theme start, `HH:MM`.
        #[arg(long)]
        sunset: String,
    },
    /// Switch at sunrise and sunset for the given position.
    Coordinates {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Switch at sunrise and sunset for the device position.
    Device,
    /// Shift sunrise and sunset by signed minutes and apply.
    Offsets {
        #[arg(long, allow_hyphen_values = true)]
        sunrise: i32,
        #[arg(long, allow_hyphen_values = true)]
        sunset: i32,
    },
    /// Commit the stored configuration to the service.
    Apply,
    /// Register or unregister the service at login.
    Autostart {
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Adapters
    let store = Arc::new(FileConfigStore::new(&config.storage.config_path));
    let channel = Arc::new(
        TcpCommandChannel::new(&config.service.address)
            .with_timeouts(config.switch_timeout(), config.command_timeout()),
    );
    let locator = LocationPoller::new(
        Arc::clone(&channel),
        FileLocationCache::new(&config.storage.location_path),
        config.location.permission,
        CoordinatePlaceResolver,
        config.poll_policy(),
    );

    // Event bus
    let event_bus = InProcessEventBus::new(64);
    let mut events = event_bus.subscribe();

    // Services
    let scheduler: Scheduler = ThemeSwitchScheduler::load(
        Arc::clone(&store),
        Arc::clone(&channel),
        locator,
        NoaaSolarClock::new(),
        FixedPowerStatus::new(config.power.energy_saver),
        event_bus,
    )
    .await
    .context("failed to load switch configuration")?;
    let autostart = AutostartController::new(store, channel);

    tracing::debug!(state = %scheduler.state(), action = ?cli.action, "session started");
    let result = run(cli.action, &scheduler, &autostart).await;
    while let Ok(event) = events.try_recv() {
        tracing::debug!(?event, "scheduler event");
    }
    result?;

    print_status(&scheduler);
    Ok(())
}

async fn run(
    action: Action,
    scheduler: &Scheduler,
    autostart: &AutostartController<Store, Channel>,
) -> anyhow::Result<()> {
    match action {
        Action::Status => {}
        Action::Disable => scheduler.select_disabled().await?,
        Action::Fixed { sunrise, sunset } => {
            scheduler.set_fixed_times(&sunrise, &sunset)?;
            scheduler.select_fixed_times().await;
            report(scheduler.apply().await?);
        }
        Action::Coordinates { lat, lon } => {
            scheduler.set_coordinates(lat, lon).await?;
            scheduler.select_coordinates().await?;
            report(scheduler.apply().await?);
        }
        Action::Device => {
            let location = scheduler.select_device_location().await?;
            println!(
                "location: {}",
                location.place_name.as_deref().unwrap_or("unknown place")
            );
            report(scheduler.apply().await?);
        }
        Action::Offsets { sunrise, sunset } => {
            resolve_pending_location(scheduler).await?;
            let outcome = scheduler
                .set_offsets(
                    &OffsetInput::from_stored(sunrise),
                    &OffsetInput::from_stored(sunset),
                )
                .await?;
            report(outcome);
        }
        Action::Apply => {
            resolve_pending_location(scheduler).await?;
            report(scheduler.apply().await?);
        }
        Action::Autostart { state: Toggle::On } => {
            let mut config = scheduler.config();
            autostart.enable(&mut config).await?;
            println!("autostart: on");
        }
        Action::Autostart { state: Toggle::Off } => {
            autostart.disable().await?;
            println!("autostart: off");
        }
    }
    Ok(())
}

/// A restored device-location session has no position until it is looked up
/// again.
async fn resolve_pending_location(scheduler: &Scheduler) -> anyhow::Result<()> {
    if let SchedulerState::DeviceLocationPending(_) = scheduler.state() {
        scheduler.select_device_location().await?;
    }
    Ok(())
}

fn report(outcome: ApplyOutcome) {
    match outcome.warning {
        Some(ApplyWarning::PowerSaverActive) => println!(
            "applied, but the energy saver is on: the theme will not switch until it is turned off"
        ),
        None => println!("applied"),
    }
}

fn print_status(scheduler: &Scheduler) {
    let config = scheduler.config();
    println!("mode: {}", scheduler.state());
    if let Some(location) = scheduler.location() {
        println!("position: {}", location.coordinates);
    }
    if let Some(times) = scheduler.sun_times() {
        println!("light theme from {}", local(times.sunrise_at));
        println!("dark theme from {}", local(times.sunset_at));
    }
    if config.mode.uses_location() {
        println!(
            "offsets: sunrise {:+} min, sunset {:+} min",
            config.sunrise_offset_min, config.sunset_offset_min
        );
    }
}

fn local(at: Timestamp) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}
