use std::path::PathBuf;

use anyhow::Result;
use lbryweb::config::Config;

pub async fn init_config(path: PathBuf) -> Result<()> {
    let config = Config::default();
    let config_path = path.join("lbryweb.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    let toml_content = format!(
        r#"# lbryweb configuration

[daemon]
url = "{}"
# timeout_secs = 30

[http]
listen_addr = "{}"
cors_enabled = false

[content]
base_url = "{}"
download_dir = "{}"
chunk_size = {}
# index_path = "content-index.json"

[timing]
keying = "per_call"
history_capacity = {}

[logging]
level = "info"
format = "text"
"#,
        config.daemon.url,
        config.http.listen_addr,
        config.content.base_url,
        config.content.download_dir.display(),
        config.content.chunk_size,
        config.timing.history_capacity,
    );

    std::fs::create_dir_all(&path)?;
    std::fs::write(&config_path, toml_content)?;
    println!("Created configuration file: {}", config_path.display());

    Ok(())
}
