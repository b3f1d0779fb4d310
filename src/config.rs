use clap::Parser;
use std::path::Path;

mod commandline;
mod defaults;
mod file;
mod primitives;

use commandline::{Args, Output};
use config::Config;
use defaults::Defaults;

pub(crate) use file::{ConfigFile as Configuration, Repo, Tracing};
pub(crate) use primitives::LogFormat;

/// Source for tubely's configuration when it isn't read from the command line
pub enum ConfigSource<P, T> {
    /// A configuration file on disk
    File { path: P },
    /// An in-memory configuration, anything that serializes to the config file's shape
    Memory { values: T },
    /// Defaults and environment only
    Empty,
}

pub(crate) fn configure_without_clap<P: AsRef<Path>, T: serde::Serialize, Q: AsRef<Path>>(
    source: ConfigSource<P, T>,
    save_to: Option<Q>,
) -> color_eyre::Result<Configuration> {
    let config = Config::builder().add_source(config::Config::try_from(&Defaults::default())?);

    let config = match source {
        ConfigSource::File { path } => config.add_source(config::File::from(path.as_ref())),
        ConfigSource::Memory { values } => config.add_source(config::Config::try_from(&values)?),
        ConfigSource::Empty => config,
    };

    let built = config
        .add_source(config::Environment::with_prefix("TUBELY").separator("__"))
        .build()?;

    let config: Configuration = built.try_deserialize()?;

    if let Some(save_to) = save_to {
        let output = toml::to_string_pretty(&config)?;
        std::fs::write(save_to, output)?;
    }

    Ok(config)
}

pub(crate) fn configure() -> color_eyre::Result<Configuration> {
    let Output {
        config_format,
        save_to,
        config_file,
    } = Args::parse().into_output();

    let config = Config::builder().add_source(config::Config::try_from(&Defaults::default())?);

    let config = if let Some(config_file) = config_file {
        config.add_source(config::File::from(config_file))
    } else {
        config
    };

    let built = config
        .add_source(config::Environment::with_prefix("TUBELY").separator("__"))
        .add_source(config::Config::try_from(&config_format)?)
        .build()?;

    let config: Configuration = built.try_deserialize()?;

    if let Some(save_to) = save_to {
        let output = toml::to_string_pretty(&config)?;
        std::fs::write(save_to, output)?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{configure_without_clap, ConfigSource, LogFormat, Repo};
    use std::path::PathBuf;

    fn required() -> serde_json::Value {
        serde_json::json!({
            "auth": { "jwt_secret": "shh" },
            "store": {
                "object_storage": {
                    "bucket_name": "tubely-videos",
                    "distribution_url": "https://d111111abcdef8.cloudfront.net",
                },
            },
        })
    }

    #[test]
    fn defaults_fill_the_gaps() {
        let config = configure_without_clap(
            ConfigSource::<PathBuf, _>::Memory { values: required() },
            None::<PathBuf>,
        )
        .expect("Configured");

        assert_eq!(config.server.address.port(), 8091);
        assert_eq!(config.server.public_url.as_str(), "http://localhost:8091/");
        assert_eq!(config.tracing.logging.format, LogFormat::Normal);
        assert_eq!(config.auth.issuer, "tubely-access");
        assert_eq!(config.media.max_thumbnail_size, 10);
        assert_eq!(config.media.max_video_size, 1024);
        assert_eq!(config.media.process_timeout, 120);
        assert!(config.metrics.prometheus_address.is_none());
        assert!(!config.store.object_storage.use_path_style);
        assert_eq!(config.store.object_storage.region, "us-east-2");

        let Repo::Sled(sled) = &config.repo;
        assert_eq!(sled.cache_capacity, 1024 * 1024 * 64);
    }

    #[test]
    fn secret_is_required() {
        let res = configure_without_clap(
            ConfigSource::<PathBuf, serde_json::Value>::Empty,
            None::<PathBuf>,
        );

        assert!(res.is_err());
    }

    #[test]
    fn file_overrides_defaults_and_saves() {
        let dir = tempfile::tempdir().expect("Created tempdir");
        let path = dir.path().join("tubely.toml");
        let save_to = dir.path().join("saved.toml");

        std::fs::write(
            &path,
            r#"
[media]
process_timeout = 5

[auth]
jwt_secret = "shh"

[store.object_storage]
bucket_name = "tubely-videos"
distribution_url = "https://d111111abcdef8.cloudfront.net"
use_path_style = true
"#,
        )
        .expect("Wrote config");

        let config = configure_without_clap(
            ConfigSource::<_, ()>::File { path: &path },
            Some(&save_to),
        )
        .expect("Configured");

        assert_eq!(config.media.process_timeout, 5);
        assert!(config.store.object_storage.use_path_style);

        let saved = std::fs::read_to_string(&save_to).expect("Saved config");
        assert!(saved.contains("process_timeout = 5"));
    }
}
