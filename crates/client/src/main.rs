use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;

use carpool_client::cli::{Cli, Invocation};
use carpool_client::render;
use carpool_client::{
    AlwaysConfirm, ApiClient, App, ClientConfig, Confirm, Context, FileStorage, Notifier, Session,
    StdinConfirm,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    carpool_observability::init();

    let invocation = Invocation::from(Cli::parse());

    let config = ClientConfig::from_env().context("failed to load client configuration")?;
    tracing::debug!(api_url = %config.api_url, session_file = %config.session_file.display(), "client configured");

    let confirm: Arc<dyn Confirm> = if invocation.yes {
        Arc::new(AlwaysConfirm)
    } else {
        Arc::new(StdinConfirm)
    };
    let ctx = Context::new(
        ApiClient::new(config.api_url),
        Session::new(FileStorage::new(config.session_file)),
        Notifier::new().with_sink(|notice| println!("{}", render::notice(notice))),
        confirm,
    );
    let app = App::new(ctx);

    if let Some(screen) = app.run(invocation.command).await {
        print!("{}", render::screen(&screen));
    }
    Ok(())
}
