use crate::{
    BuildArgs,
    build::{Builder, base_path_from_config},
    config::DocweaveConfig,
};

pub async fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    let config_path = DocweaveConfig::resolve_path(args.config_file.as_deref())?;
    let mut config = DocweaveConfig::load_from_arg(Some(config_path.as_path())).await?;

    // Formats given on the command line replace the configured ones
    if !args.format.is_empty() {
        config.formats = args.format.clone();
    }

    // Get the base path for resolving relative paths
    let base_path = base_path_from_config(&config_path);

    let builder = Builder::new(config, base_path);
    let result = builder
        .build_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    if result.cancelled {
        println!(
            "Build cancelled after {} topics ({} files)",
            result.topics.len(),
            result.files()
        );
        return Err(anyhow::anyhow!("build cancelled"));
    }

    println!(
        "Built {} topics to {} ({} files, {} assets)",
        result.topics.len(),
        result.output_dir.display(),
        result.files(),
        result.assets.len()
    );

    let failed = result.failed();
    if !failed.is_empty() {
        for outcome in &failed {
            for failure in &outcome.failures {
                eprintln!("  {}: {failure}", outcome.topic);
            }
        }
        return Err(anyhow::anyhow!(
            "{} of {} topics failed to render, see {}",
            failed.len(),
            result.topics.len(),
            result.report_path.display()
        ));
    }

    Ok(())
}
