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
        metrics_api,
    },
    anyhow::anyhow,
    axum_prometheus::PrometheusMetricLayerBuilder,
    futures::future::join_all,
    sqlx::postgres::PgPoolOptions,
    std::{
        sync::atomic::{
            AtomicBool,
            Ordering,
        },
        time::Duration,
    },
};

const DATABASE_MAX_CONNECTIONS: u32 = 10;
// Storage calls must fail instead of hanging; waiting on a pool slot is
// bounded the same way as the queries behind it.
const DATABASE_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

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
        .acquire_timeout(DATABASE_ACQUIRE_TIMEOUT)
        .connect(&run_options.server.database_url)
        .await
        .map_err(|err| anyhow!("Failed to connect to the database: {:?}", err))?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|err| anyhow!("Failed to run database migrations: {:?}", err))?;

    let (metrics_layer, metrics_handle) = PrometheusMetricLayerBuilder::new()
        .with_prefix("auction_engine")
        .with_default_metrics()
        .build_pair();

    let service = Service::new(
        pool,
        service::Config {
            sweep_interval:        config.auction.sweep_interval,
            auction_duration:      config.auction.auction_duration,
            default_reserve_price: config.auction.default_reserve_price,
        },
    );

    let sweep_loop = tokio::spawn({
        let service = service.clone();
        async move { service.run_sweep_loop().await }
    });
    let api_loop = tokio::spawn(api::start_api(
        run_options.clone(),
        service.clone(),
        metrics_layer,
    ));
    let metrics_loop = tokio::spawn(metrics_api::start_metrics(run_options, metrics_handle));

    for result in join_all([sweep_loop, api_loop, metrics_loop]).await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::error!(error = ?err, "Server task failed"),
            Err(err) => tracing::error!(error = ?err, "Server task panicked"),
        }
    }
    Ok(())
}

// A static exit flag to indicate to running threads that we're shutting down.
// This is used to gracefully shutdown the application.
pub(crate) static SHOULD_EXIT: AtomicBool = AtomicBool::new(false);
pub const EXIT_CHECK_INTERVAL: Duration = Duration::from_secs(1);
