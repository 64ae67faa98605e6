use booking_client::{
    booking_view::BookingView,
    clock::SystemClock,
    configuration::Configuration,
    configuration_handler::ConfigurationHandler,
    http::HttpBookingApi,
    terminal::{self, Command, HELP},
};
use futures::StreamExt;
use std::{error::Error, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    println!("####################");
    println!("# Book a Meeting   #");
    println!("####################");

    let configuration = ConfigurationHandler::parse_arguments();
    info!(api = %configuration.api_base_url(), "Using booking API");
    let api = Arc::new(HttpBookingApi::new(
        &configuration.api_base_url(),
        configuration.request_timeout(),
    ));
    let view = BookingView::new(api, SystemClock, &configuration);
    view.mount();
    println!("{HELP}");

    let mut updates = view.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(state) = updates.next() => {
                let actions = view.empty_window_actions();
                print!("{}", terminal::render(&state, &view.projection(), &actions));
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(command) = terminal::parse_command(&line) else {
                    warn!(%line, "Unknown command");
                    println!("Unknown command, type 'help'.");
                    continue;
                };
                match command {
                    Command::NextWeek => view.next_week(),
                    Command::PreviousWeek => view.previous_week(),
                    Command::View(calendar_view) => view.set_view(calendar_view),
                    Command::Select(index) => {
                        if !view.select_index(index) {
                            println!("That slot can't be booked.");
                        }
                    }
                    Command::Name(name) => view.set_name(&name),
                    Command::Email(email) => view.set_email(&email),
                    Command::Book => {
                        let contact = view.snapshot().selection.contact;
                        // failures are already part of the rendered state
                        let _ = view.submit(&contact.name, &contact.email).await;
                    }
                    Command::Contact { subject, message } => {
                        let contact = view.snapshot().selection.contact;
                        let _ = view
                            .submit_contact(&contact.name, &contact.email, &subject, &message)
                            .await;
                    }
                    Command::Retry => {
                        view.retry();
                    }
                    Command::Diagnostics => {
                        if !view.run_diagnostics().await {
                            println!("Diagnostics are disabled.");
                        }
                    }
                    Command::Dismiss => view.dismiss_notice(),
                    Command::Help => println!("{HELP}"),
                    Command::Quit => break,
                }
            }
        }
    }

    view.unmount();
    Ok(())
}
