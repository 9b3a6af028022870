use crate::{CleanArgs, build::base_path_from_config, config::DocweaveConfig};

pub async fn run(args: &CleanArgs) -> Result<(), anyhow::Error> {
    let config_path = DocweaveConfig::resolve_path(args.config_file.as_deref())?;
    let config = DocweaveConfig::load_from_arg(Some(config_path.as_path())).await?;

    // Get the base path for resolving relative paths
    let base_path = base_path_from_config(&config_path);

    // Delete the generated output folder
    let output_path = base_path.join(&config.project.output);
    if output_path.exists() {
        if args.dry_run {
            println!("Would delete {}", output_path.display());
        } else {
            tokio::fs::remove_dir_all(&output_path).await?;
            println!("Deleted {}", output_path.display());
        }
    } else {
        println!("Nothing to clean at {}", output_path.display());
    }

    Ok(())
}
