use clap::Parser;
use gaswatch_config::ConfigLoader;
use gaswatch_server::{announce_startup, build_cycle, build_notifier, logging, CycleScheduler};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing gaswatch.toml
    #[arg(short, long, default_value = "./config")]
    config_dir: String,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Do not send the startup notification
    #[arg(long)]
    no_startup_notice: bool,

    /// Print the effective configuration (secrets redacted) and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = ConfigLoader::new(&args.config_dir).load()?;
    logging::init(&config.logging)?;

    if args.print_config {
        println!("{}", config.redacted().to_toml()?);
        return Ok(());
    }

    config.validate()?;

    let notifier = build_notifier(&config)?;
    let cycle = build_cycle(&config, notifier.clone())?;

    info!(service = %config.service.name, "The service started successfully!");
    if config.service.startup_notice && !args.no_startup_notice {
        announce_startup(notifier.as_ref(), &config.service).await;
    }

    // 启动后立即执行一次
    cycle.run_cycle().await;
    if args.once {
        return Ok(());
    }

    let scheduler = CycleScheduler::new(cycle);
    scheduler.start(&config.service.cron_expression()).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    scheduler.stop().await?;

    Ok(())
}
