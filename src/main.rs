use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use showsplit::{assemble, segments};
use showsplit::{BroadcastDate, Cli, Commands, Config, JobRequest, JobRunner, DONE_SENTINEL};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "showsplit=debug" } else { "showsplit=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Process { date, source, artwork, title, guest } => {
            let config = Arc::new(Config::load()?);
            let runner = JobRunner::new(Arc::clone(&config));
            let registry = runner.registry();

            let id = runner.submit(JobRequest {
                broadcast_date: date,
                source,
                artwork,
                show_title: title,
                guest,
            });
            tracing::info!("Submitted job {}", id);

            // Relay progress until the job signals completion
            loop {
                match registry.next_message(id, Duration::from_millis(500)).await? {
                    Some(message) if message == DONE_SENTINEL => {
                        registry.remove(id);
                        break;
                    }
                    Some(message) => println!("{}", message),
                    None => continue,
                }
            }
        }
        Commands::Plan { date } => {
            let date = match date {
                Some(raw) => BroadcastDate::parse(&raw)?,
                None => BroadcastDate::from_naive(chrono::Local::now().date_naive()),
            };
            print_plan(&date);
        }
        Commands::Destinations => {
            let config = Config::load()?;
            println!("Configured destinations (attempted in this order):");
            for dest in &config.destinations {
                println!(
                    "  • {} - {}:{}{} ({})",
                    dest.name, dest.host, dest.port, dest.remote_dir, dest.rule
                );
            }
        }
        Commands::Config { show } => {
            let config = Config::load()?;
            if show {
                config.display();
            } else {
                println!("Edit the config file to change destinations and processing settings.");
                config.display();
            }
        }
    }

    Ok(())
}

fn print_plan(date: &BroadcastDate) {
    println!("Broadcast date: {}", date);
    println!("Week sequence number: {}", date.week_sequence_number());
    println!();
    println!("Satellite feed segments ({} WAV):", date.preceding_saturday());
    for seg in segments::feed_table() {
        println!(
            "  {}  {:>7} .. {:>7} ms  -> {}",
            seg.name,
            seg.start_ms(),
            seg.end_ms(),
            assemble::feed_filename(date, seg.name)
        );
    }
    println!();
    println!("Highlight clip (MP3 320k, first {} ms):", segments::highlight_cutoff_ms());
    println!("  -> {}", assemble::highlight_filename(date));
    println!();
    println!("Podcast assembly (MP3 96k @ 44100 Hz):");
    for range in segments::podcast_table() {
        println!("  {:>7} .. {:>7} ms", range.start_ms(), range.end_ms());
    }
    println!("  -> {}", assemble::podcast_filename(date));
}
