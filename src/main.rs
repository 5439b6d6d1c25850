use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{error, info};

mod cli;

use cli::{Cli, Commands};
use parceldesk::{
    config::Config,
    export::{self, ExportFormat},
    feedback::{self, FeedbackModal, SimulatedSubmitter},
    listing::{self, ListingAction, ListingState},
    mock,
    models::{Booking, BookingStatus},
    profile,
    storage::KeyValueStore,
    tui,
};

fn init_logging(to_stderr: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "parceldesk=info");
    }

    let file_appender = tracing_appender::rolling::never(".", "parceldesk.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(EnvFilter::from_default_env());

    // The TUI owns the terminal, so it only logs to file
    let stderr_layer = to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(EnvFilter::from_default_env())
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

fn load_bookings(config: &Config) -> Vec<Booking> {
    mock::generate_with_seed(
        config.mock.booking_count,
        Local::now().date_naive(),
        config.mock.seed,
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(!matches!(cli.command, Commands::Tui));

    let mut config = Config::from_env()?;
    if let Some(ref store) = cli.store {
        config.store_path = store.into();
    }
    if cli.seed.is_some() {
        config.mock.seed = cli.seed;
    }
    if let Some(count) = cli.bookings {
        config.mock.booking_count = count;
    }

    match &cli.command {
        Commands::Profile { set, clear } => {
            let store = KeyValueStore::open(config.store_path_str())
                .await
                .with_context(|| format!("Cannot open store {}", config.store_path.display()))?;

            if let Some(raw) = set {
                profile::save_profile_raw(&store, raw).await?;
            }
            if *clear {
                store.remove(profile::USER_DATA_KEY).await?;
            }

            let state = profile::load_profile(&store).await?;
            let rows = profile::profile_rows(&state.profile());
            println!("My Profile");
            if rows.is_empty() {
                println!("  (no profile data)");
            }
            for (label, value) in rows {
                println!("  {:<10} {}", label, value);
            }
        }

        Commands::Support => {
            let contact = profile::support_contact();
            println!("Support");
            println!("  Email:         {}", contact.company_email);
            println!("  Phone:         {}", contact.support_phone);
            println!("  Working days:  {}", contact.working_days);
            println!("  Working hours: {}", contact.working_hours);
        }

        Commands::Bookings { id, date, status, page, page_size } => {
            if let Some(size) = page_size {
                config.page_size = *size;
            }
            config.validate()?;

            let bookings = load_bookings(&config);
            let status = status
                .as_deref()
                .map(str::parse::<BookingStatus>)
                .transpose()?;

            let mut state = ListingState::for_bookings(config.page_size, &bookings);
            for action in [
                ListingAction::SetBookingId(id.clone().unwrap_or_default()),
                ListingAction::SetDate(*date),
                ListingAction::SetStatus(status),
                ListingAction::GoToPage(*page),
            ] {
                state = listing::reduce(state, action, &bookings);
            }

            let view = listing::view(&state, &bookings);
            println!(
                "Found {} bookings (page {}/{}):",
                view.match_count, view.current_page, view.total_pages
            );
            for booking in &view.items {
                println!(
                    "{} | {} | {} | {:<14} | {:<24} | {:>4} | {:<10} | {}",
                    booking.customer_id,
                    booking.booking_id,
                    booking.booking_date,
                    booking.receiver_name,
                    booking.delivered_address,
                    booking.amount,
                    booking.status,
                    if booking.has_feedback() { "rated" } else { "-" }
                );
            }
            if listing::show_download_options(&bookings) {
                println!("Use `parceldesk export` to download all {} bookings.", bookings.len());
            }
        }

        Commands::Export { format, output } => {
            if let Some(dir) = output {
                config.export_dir = dir.into();
            }
            config.validate()?;

            let formats: Vec<ExportFormat> = if format.eq_ignore_ascii_case("all") {
                ExportFormat::ALL.to_vec()
            } else {
                vec![format.parse::<ExportFormat>()?]
            };

            let bookings = load_bookings(&config);
            for format in formats {
                match export::write_export(format, &bookings, &config.export_dir) {
                    Ok(path) => println!("Wrote {}", path.display()),
                    Err(e) => error!("{} export failed: {}", format.as_str(), e),
                }
            }
        }

        Commands::Feedback { booking, rating, note, twice } => {
            let mut bookings = load_bookings(&config);
            let selected = bookings
                .iter()
                .find(|b| b.booking_id.eq_ignore_ascii_case(booking))
                .cloned()
                .with_context(|| format!("No booking with id {}", booking))?;

            let submitter = SimulatedSubmitter::new(config.feedback_latency());
            let mut modal = FeedbackModal::new();
            let attempts = if *twice { 2 } else { 1 };

            for _ in 0..attempts {
                modal.open(&selected);
                if let Err(e) = modal.set_rating(*rating) {
                    println!("{}", e);
                    continue;
                }
                modal.set_suggestion(note);

                println!("Submitting feedback for {}...", selected.booking_id);
                match feedback::submit_and_dismiss(
                    &mut modal,
                    &mut bookings,
                    &submitter,
                    config.feedback_dismiss_delay(),
                )
                .await
                {
                    Ok(feedback::SubmissionOutcome::Accepted) => {
                        println!("{}", feedback::SUCCESS_MESSAGE)
                    }
                    Ok(feedback::SubmissionOutcome::Rejected(reason)) => println!("{}", reason),
                    Err(e) => println!("{}", e),
                }
            }
        }

        Commands::Tui => {
            config.validate()?;
            info!("Launching TUI interface");

            match tui::run(config).await {
                Ok(_) => info!("TUI exited successfully"),
                Err(e) => error!("TUI failed: {}", e),
            }
        }
    }

    Ok(())
}
