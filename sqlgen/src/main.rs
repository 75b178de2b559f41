use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod cmd;

use clap::Parser;
use common::tracing::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // before parsing, so .env values reach the clap env fallbacks and the api key
    let env_file = cmd::load_env_file(None);
    let args = cmd::Cli::parse();
    let _guard = init_tracing("sqlgen", "warn")?;
    if let Some(path) = env_file {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }
    args.execute().await
}
