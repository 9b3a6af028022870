use crate::{
    SectionsArgs,
    build::{Builder, base_path_from_config},
    config::DocweaveConfig,
};

/// Print the section order and element handlers the configuration produces.
pub async fn run(args: &SectionsArgs) -> Result<(), anyhow::Error> {
    let config_path = DocweaveConfig::resolve_path(args.config_file.as_deref())?;
    let config = DocweaveConfig::load_from_arg(Some(config_path.as_path())).await?;
    let base_path = base_path_from_config(&config_path);

    let transformation = Builder::new(config, base_path).transformation()?;

    println!("Sections ({}):", transformation.sections().len());
    for (position, kind) in transformation.sections().kinds().iter().enumerate() {
        println!("  {:>2}. {kind}", position + 1);
    }

    println!("Elements ({}):", transformation.elements().len());
    for name in transformation.elements().names() {
        println!("  {name}");
    }

    Ok(())
}
