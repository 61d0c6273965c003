//! hostagent daemon
//!
//! Periodically collects the host inventory and delivers it to the
//! collection service.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tokio::signal;
use tracing::{error, info};

use hostagent_client::DeliveryClient;
use hostagent_core::{
    FileStore, Job, MemoryStore, Pipeline, ScheduleStore, Scheduler, SchedulerHandle,
};
use hostagent_exec::LocalExecutor;
use hostagent_inventory::InventoryBuilder;

mod config;
mod logging;

use config::Config;

/// Name of the collection job in the schedule
const JOB_NAME: &str = "hostdata";

/// Host inventory agent
#[derive(Parser, Debug)]
#[command(name = "hostagent", version, about)]
struct Args {
    /// Config file; `$HOSTAGENT_CONFIG` or the default paths when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run one collection and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    let (config, path) = Config::load_default(args.config.as_deref())?;
    logging::init(config.agent.verbose, config.agent.log_directory.as_deref())?;
    info!(
        config = %path.display(),
        version = env!("CARGO_PKG_VERSION"),
        "hostagent starting"
    );
    config.validate()?;

    let pipeline = pipeline(&config)?;

    if args.once {
        // Failures are logged by the pipeline; only startup errors are fatal.
        if let Ok(outcome) = pipeline.run_cycle().await {
            info!(result = %outcome, "collection done");
        }
        return Ok(());
    }

    let store: Arc<dyn ScheduleStore> = match &config.schedule.state_file {
        Some(path) => Arc::new(FileStore::open(path).await?),
        None => Arc::new(MemoryStore::new()),
    };

    let mut scheduler = Scheduler::new(store);
    scheduler.register(Job::new(JOB_NAME, config.period(), Arc::new(pipeline))?)?;
    scheduler.start()?;

    tokio::spawn(shutdown_signal(scheduler.handle()));

    scheduler.wait().await;
    info!("hostagent stopped");
    Ok(())
}

fn pipeline(config: &Config) -> Result<Pipeline> {
    let mut executor = LocalExecutor::new();
    if let Some(dir) = &config.fetchers.workdir {
        executor = executor.with_workdir(dir);
    }

    let builder = InventoryBuilder::new(Arc::new(executor), config.fetchers.clone())
        .with_labels(&config.agent.environment, &config.agent.location);
    let client = DeliveryClient::new(&config.delivery())?;

    info!(
        endpoint = %client.endpoint(),
        period = ?config.period(),
        hypervisors = config.fetchers.hypervisors.len(),
        "pipeline ready"
    );

    Ok(Pipeline::new(builder, client))
}

/// Stop the scheduler on Ctrl+C or SIGTERM; in-flight collections finish first
async fn shutdown_signal(handle: SchedulerHandle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }

    handle.stop();
}
