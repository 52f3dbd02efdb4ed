use {
    crate::{
        api,
        auction::service::{
            self,
            Service,
        },
        config::{
            Config,
            RunOptions,
        },
        state::Store,
    },
    anyhow::anyhow,
    sqlx::postgres::PgPoolOptions,
    std::{
        sync::{
            atomic::{
                AtomicBool,
                Ordering,
            },
            Arc,
        },
        time::Duration,
    },
};

/// Set on SIGINT; long-running loops poll it and drain gracefully.
pub(crate) static SHOULD_EXIT: AtomicBool = AtomicBool::new(false);
pub const EXIT_CHECK_INTERVAL: Duration = Duration::from_secs(1);

const DATABASE_MAX_CONNECTIONS: u32 = 10;

pub async fn start_server(run_options: RunOptions) -> anyhow::Result<()> {
    tokio::spawn(async move {
        tracing::info!("Registered shutdown signal handler...");
        tokio::signal::ctrl_c().await.unwrap();
        tracing::info!("Shut down signal received, waiting for tasks...");
        SHOULD_EXIT.store(true, Ordering::Release);
    });

    let config = Config::load(&run_options.config.config).map_err(|err| {
        anyhow!(
            "Failed to load config from file({path}): {:?}",
            err,
            path = run_options.config.config
        )
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(DATABASE_MAX_CONNECTIONS)
        .connect(&run_options.database_url)
        .await
        .map_err(|err| anyhow!("Failed to connect to database: {:?}", err))?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|err| anyhow!("Failed to run database migrations: {:?}", err))?;

    let store = Arc::new(Store {
        auction_service: Service::new(
            pool,
            service::Config {
                bid_policy:     config.bid_policy,
                lock_timeout:   config.lock_timeout,
                commit_retries: config.commit_retries,
            },
        ),
    });

    api::start_api(run_options, store).await
}
