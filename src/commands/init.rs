use crate::{
    InitArgs,
    config::{
        BuildConfig, DEFAULT_CONFIG_FILE, DocweaveConfig, ModsConfig, PresentationConfig,
        ProjectConfig,
    },
    resources::embedded_resources,
    transform::OutputFormat,
};

const SAMPLE_API_TOPIC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<doc id="T:Sample.Widget" title="Widget Class">
  <summary>A sample widget.</summary>
  <remarks>
    <para>Widgets are rendered with <customElement style="Style2">custom styles</customElement>.</para>
  </remarks>
  <example>
    <code language="rust">let widget = Widget::new();</code>
  </example>
  <customSection>
    <para>Content of the custom section.</para>
  </customSection>
  <seealso cref="T:Sample.Gadget"/>
</doc>
"#;

const SAMPLE_CONCEPTUAL_TOPIC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<topic id="getting-started" title="Getting Started" kind="conceptual">
  <section address="overview">
    <title>Overview</title>
    <content>
      <para>Topics live in the <c>topics</c> folder.</para>
      <note type="tip">
        <para>Run <c>docweave sections</c> to see the section order.</para>
      </note>
    </content>
  </section>
</topic>
"#;

pub async fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = if args.path.is_relative() {
        std::env::current_dir()?.join(&args.path)
    } else {
        args.path.clone()
    };

    if !path.exists() {
        if args.create {
            tokio::fs::create_dir_all(&path).await?;
            println!("Created directory {path}", path = path.display());
        } else {
            return Err(anyhow::anyhow!(
                "Directory does not exist: {path}",
                path = path.display()
            ));
        }
    }

    let config_file = path.join(DEFAULT_CONFIG_FILE);
    if config_file.exists() {
        return Err(anyhow::anyhow!(
            "Config file already exists: {config_file}",
            config_file = config_file.display()
        ));
    }

    let default_config = DocweaveConfig {
        project: ProjectConfig {
            name: "My Documentation".into(),
            topics: "topics".into(),
            output: "_output".into(),
            language: "en-US".into(),
        },
        formats: vec![OutputFormat::Website, OutputFormat::Markdown],
        presentation: PresentationConfig::default(),
        mods: ModsConfig::default(),
        build: BuildConfig::default(),
    };

    println!("Initializing project in {}", path.display());

    let config_text = serde_yaml::to_string(&default_config)?;
    tokio::fs::write(&config_file, config_text).await?;
    println!(
        "Created config file {config_file}",
        config_file = config_file.display()
    );

    let topics_dir = path.join(&default_config.project.topics);
    tokio::fs::create_dir_all(&topics_dir).await?;
    for (name, content) in [
        ("widget.xml", SAMPLE_API_TOPIC),
        ("getting-started.xml", SAMPLE_CONCEPTUAL_TOPIC),
    ] {
        tokio::fs::write(topics_dir.join(name), content).await?;
    }
    println!("Created sample topics in {}", topics_dir.display());

    let resources_dir = path.join(&default_config.presentation.resources);
    tokio::fs::create_dir_all(&resources_dir).await?;
    for (name, content) in embedded_resources() {
        tokio::fs::write(resources_dir.join(name), content).await?;
    }
    println!("Created resources in {}", resources_dir.display());

    Ok(())
}
