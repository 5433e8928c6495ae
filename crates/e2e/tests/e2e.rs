//! Live browser harness
//!
//! Runs the admin workflows in a real browser against a running Amy server.
//! Skips (exit 0) when no live server URL is configured.
//! Run with: AMY_LIVE_SERVER_URL=http://127.0.0.1:8000 cargo test -p amy-e2e --test e2e

use tracing_subscriber::EnvFilter;

use amy_e2e::harness::HarnessArgs;
use amy_e2e::workflows;
use amy_e2e::{E2eResult, Suite};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = HarnessArgs::parse_lenient(std::env::args());

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: HarnessArgs) -> E2eResult<bool> {
    let config = args.to_config()?;

    if config.live_server_url.is_none() {
        println!("skipping browser workflows: no live server URL configured");
        return Ok(true);
    }

    let credentials = config.credentials.clone();
    let suite = Suite::launch(&config).await?;

    if args.wants("test_login") {
        suite
            .run("test_login", |s| workflows::login_reaches_dashboard(s, &credentials))
            .await;
    }
    if args.wants("test_tasks") {
        suite
            .run("test_tasks", |s| {
                workflows::task_form_defaults_to_no_event(s, &credentials)
            })
            .await;
    }

    let results = suite.finish().await;
    results.write_to(&config.results_dir)?;

    Ok(results.all_passed())
}
