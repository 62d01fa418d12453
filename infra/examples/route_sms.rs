//! Example demonstrating configuration-driven SMS routing with failover
//!
//! Run with: cargo run -p sr_infra --example route_sms

use std::sync::Arc;

use sr_core::{SendOptions, SmsBackend};
use sr_infra::sms::{build_stack, BackendFactory, MockBackend, MockBehavior};
use sr_infra::telemetry::init_tracing;
use sr_shared::AppConfig;

const CONFIG: &str = r#"
[logging]
level = "debug"
format = "compact"

[sms]
default_sender = "primary"

[[sms.senders]]
name = "primary"
kind = "demo"

[[sms.senders]]
name = "egypt"
kind = "mock"

[sms.routing]
default = "primary"
by_country = { EG = ["egypt", "primary"] }
by_prefix = { "+44" = "egypt" }
"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_toml_str(CONFIG)?;
    init_tracing(&config.logging)?;

    // Keep a handle on the primary mock so it can start failing later
    let primary = MockBackend::new("primary");
    let handle = primary.clone();
    let factory = BackendFactory::with_defaults()
        .with_kind("demo", move |_| Ok(Arc::new(primary.clone()) as Arc<dyn SmsBackend>));

    let stack = build_stack(&config.sms, &factory).into_strict()?;
    let router = &stack.router;

    for destination in ["+14155550100", "+201001234567", "+447911123456"] {
        println!(
            "{} -> {:?}",
            destination,
            router.choose_sender_names(destination)
        );
    }

    println!("\nSending while the primary sender is healthy");
    router
        .send("+14155550100", "Your code is 123456", &SendOptions::new())
        .await?;

    println!("\nSending while the primary sender reports failure");
    handle.set_behavior(MockBehavior::ReportFailure);
    router
        .send("+14155550100", "Your code is 654321", &SendOptions::new())
        .await?;

    println!(
        "\nPrimary attempts: {}, delivered: {}",
        handle.attempt_count(),
        handle.sent_messages().len()
    );

    Ok(())
}
