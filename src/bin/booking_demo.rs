// Runs one booking through the flow controller and prints what a screen would show.

use anyhow::{bail, Context, Result};
use booking_flow::{
    models::parse_date, BackendConfig, BookingBackend, BookingFlow, BookingView,
    ConfirmationDetails, DateLocale, FlowConfig, HttpBackend, MockBackend, MockConfig, Service,
    Step, SubmitControl, TimeSlot,
};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendKind {
    Mock,
    Http,
}

#[derive(Debug, Parser)]
#[command(name = "booking-demo", about = "Walk through a booking from service to confirmation")]
struct Args {
    #[arg(long, value_enum, default_value = "mock", env = "BOOKING_BACKEND")]
    backend: BackendKind,

    #[arg(long, env = "BOOKING_API_URL", default_value = "http://localhost:8080")]
    base_url: String,

    #[arg(long, env = "BOOKING_API_TIMEOUT_MS", default_value_t = 5000)]
    timeout_ms: u64,

    #[arg(long, default_value_t = 1)]
    service: u32,

    // Defaults to today.
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    // Defaults to the first offered slot.
    #[arg(long)]
    time: Option<TimeSlot>,

    #[arg(long)]
    name: String,

    #[arg(long)]
    phone: String,

    #[arg(long, default_value = "pt-br")]
    locale: DateLocale,

    // Skip the mock backend's artificial latency.
    #[arg(long)]
    no_latency: bool,

    // Makes the mock backend's availability reproducible.
    #[arg(long)]
    seed: Option<u64>,
}

struct ConsoleView;

impl BookingView for ConsoleView {
    fn render_services(&mut self, services: &[Service]) {
        println!("Services:");
        for service in services {
            println!(
                "  [{}] {:<16} {:>4} min  {}",
                service.id, service.name, service.duration_minutes, service.price
            );
        }
    }

    fn highlight_service(&mut self, service_id: Option<u32>) {
        if let Some(id) = service_id {
            println!("> service {id} selected");
        }
    }

    fn show_step(&mut self, step: Step) {
        println!("--- step {} ({step:?}) ---", step.number());
    }

    fn show_slots_loading(&mut self) {
        println!("Loading available times...");
    }

    fn render_time_slots(&mut self, slots: &[TimeSlot]) {
        let labels: Vec<String> = slots.iter().map(ToString::to_string).collect();
        println!("Available times: {}", labels.join("  "));
    }

    fn show_no_availability(&mut self, message: &str) {
        println!("{message}");
    }

    fn highlight_time(&mut self, slot: Option<TimeSlot>) {
        if let Some(slot) = slot {
            println!("> time {slot} selected");
        }
    }

    fn set_submit_control(&mut self, control: SubmitControl) {
        let state = if control.enabled { "enabled" } else { "disabled" };
        println!("[{}] ({state})", control.label);
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("error: {message}");
    }

    fn show_confirmation(&mut self, details: &ConfirmationDetails) {
        println!("Booking confirmed! (#{})", details.booking_id);
        println!("{}", details.summary());
    }

    fn reset(&mut self) {
        println!("(form cleared)");
    }
}

async fn run<B: BookingBackend>(backend: B, args: &Args) -> Result<()> {
    let config = FlowConfig {
        min_date: None,
        date_locale: args.locale,
    };
    let mut flow = BookingFlow::with_config(backend, ConsoleView, config);

    flow.start().await.context("loading services")?;
    flow.choose_service(args.service)
        .context("selecting service")?;

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let offered = flow.choose_date(date).await.context("loading availability")?;
    if offered == 0 {
        bail!("no availability on {date}; try another date");
    }

    let time = match args.time {
        Some(time) => time,
        None => match flow.offered_slots().and_then(|slots| slots.first().copied()) {
            Some(first) => first,
            None => bail!("no availability on {date}"),
        },
    };
    flow.choose_time(time).context("selecting time")?;

    let details = flow
        .submit(&args.name, &args.phone)
        .await
        .context("submitting booking")?;
    info!(booking_id = %details.booking_id, "demo booking finished");

    flow.dismiss_confirmation()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match args.backend {
        BackendKind::Mock => {
            let config = MockConfig {
                seed: args.seed,
                ..if args.no_latency {
                    MockConfig::instant()
                } else {
                    MockConfig::default()
                }
            };
            run(MockBackend::new(config), &args).await
        }
        BackendKind::Http => {
            let backend = HttpBackend::new(BackendConfig {
                base_url: args.base_url.clone(),
                timeout_ms: args.timeout_ms,
            })?;
            run(backend, &args).await
        }
    }
}
