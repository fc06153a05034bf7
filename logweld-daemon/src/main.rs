use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use logweld_core::config::LogweldConfig;
use logweld_daemon::cli::DaemonCli;
use logweld_daemon::logging;
use logweld_stream_pipeline::{KafkaSink, KafkaSource, PipelineConfig, StreamPipelineBuilder};

#[tokio::main]
async fn main() -> Result<()> {
    let args = DaemonCli::parse();

    let mut config = LogweldConfig::from_file(&args.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config '{}': {}", args.config.display(), e))?;
    config.apply_env_overrides();

    // CLI overrides take precedence over config file and environment;
    // validation runs once, after every override layer is applied
    if let Some(level) = args.log_level {
        config.general.log_level = level;
    }
    if let Some(format) = args.log_format {
        config.general.log_format = format;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    if args.validate {
        println!("configuration OK: {}", args.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!("logweld-daemon starting");

    let pipeline_config = PipelineConfig::from_core(&config);
    let source = KafkaSource::connect(&config.input)
        .map_err(|e| anyhow::anyhow!("failed to create input channel: {}", e))?;
    let sink = KafkaSink::connect(&config.output)
        .map_err(|e| anyhow::anyhow!("failed to create output channel: {}", e))?;

    let cancel = CancellationToken::new();
    let mut pipeline = StreamPipelineBuilder::new()
        .config(pipeline_config)
        .source(source)
        .sink(sink)
        .cancellation_token(cancel.clone())
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build pipeline: {}", e))?;

    tracing::info!(
        input_topic = %config.input.topic,
        output_topic = %config.output.topic,
        "pipeline initialized"
    );

    // Graceful shutdown on Ctrl-C
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            shutdown.cancel();
        }
    });

    match pipeline.run().await {
        Ok(counters) => {
            tracing::info!(
                forwarded = counters.forwarded,
                failed = counters.failed,
                "logweld-daemon shut down"
            );
            Ok(())
        }
        Err(e) => {
            let counters = pipeline.counters();
            tracing::error!(
                error = %e,
                forwarded = counters.forwarded,
                failed = counters.failed,
                "pipeline terminated with error"
            );
            Err(anyhow::anyhow!("pipeline failed: {}", e))
        }
    }
}
