//! Submit one inquiry through the full pipeline.
//!
//! ```text
//! RUST_LOG=debug cargo run --example submit -- path/to/secrets.toml
//! ```
//!
//! Without `GOOGLE_SERVICE_ACCOUNT_JSON` the inquiry lands in the log fallback.

use std::process::ExitCode;
use thrive_inquiry::infrastructure::catalog;
use thrive_inquiry::{InquiryForm, InquiryInput, SessionId, SiteConfig, SubmissionOrchestrator};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| ".streamlit/secrets.toml".to_string());

    let config = match SiteConfig::load(&path) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    println!("{}\n", config.page_title("Inquiry"));

    for service in &catalog::load_or_empty(&config.services_path) {
        match service.meta_line() {
            Some(meta) => println!("- {} ({meta})", service.title),
            None => println!("- {}", service.title),
        }
    }

    let pipeline = match SubmissionOrchestrator::builder()
        .with_config(config)
        .build()
    {
        Ok(pipeline) => pipeline,
        Err(err) => {
            tracing::error!(error = %err, "failed to build pipeline");
            return ExitCode::FAILURE;
        }
    };

    let session = SessionId::new("demo-session");
    let form = InquiryForm {
        name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        goals: "Build strength, move without pain".to_string(),
        user_agent: "thrive-inquiry demo".to_string(),
        ..InquiryForm::default()
    };

    // The second attempt falls inside the interval
    for attempt in 1..=2 {
        let outcome = pipeline.submit(InquiryInput::from(form.clone()), &session);
        println!("\nattempt {attempt}: {}", outcome.notice());
    }

    let snapshot = pipeline.metrics().snapshot();
    println!(
        "\naccepted={} throttled={} logged_only={}",
        snapshot.accepted,
        snapshot.throttled,
        snapshot.fallback_total()
    );
    ExitCode::SUCCESS
}
