use crate::{
    config::primitives::{LogFormat, Targets},
    serde_str::Serde,
};
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf};
use url::Url;

impl Args {
    pub(super) fn into_output(self) -> Output {
        let Args {
            config_file,
            log_format,
            log_targets,
            opentelemetry_url,
            opentelemetry_service_name,
            opentelemetry_targets,
            save_to,
            address,
            public_url,
            temporary_directory,
            metrics_prometheus_address,
            jwt_secret,
            jwt_issuer,
            media_max_thumbnail_size,
            media_max_video_size,
            media_process_timeout,
            repo_path,
            repo_cache_capacity,
            assets_path,
            object_storage_endpoint,
            object_storage_bucket_name,
            object_storage_region,
            object_storage_use_path_style,
            object_storage_access_key,
            object_storage_secret_key,
            object_storage_session_token,
            object_storage_distribution_url,
        } = self;

        let server = Server {
            address,
            public_url,
            temporary_directory,
        };

        let tracing = Tracing {
            logging: Logging {
                format: log_format,
                targets: log_targets.map(Serde::new),
            },
            opentelemetry: OpenTelemetry {
                url: opentelemetry_url,
                service_name: opentelemetry_service_name,
                targets: opentelemetry_targets.map(Serde::new),
            },
        };

        let metrics = Metrics {
            prometheus_address: metrics_prometheus_address,
        };

        let auth = Auth {
            jwt_secret,
            issuer: jwt_issuer,
        };

        let media = Media {
            max_thumbnail_size: media_max_thumbnail_size,
            max_video_size: media_max_video_size,
            process_timeout: media_process_timeout,
        };

        let repo = Sled {
            path: repo_path,
            cache_capacity: repo_cache_capacity,
        }
        .set()
        .map(Repo::Sled);

        let store = Store {
            assets: Assets { path: assets_path },
            object_storage: ObjectStorage {
                endpoint: object_storage_endpoint,
                bucket_name: object_storage_bucket_name,
                region: object_storage_region,
                use_path_style: object_storage_use_path_style,
                access_key: object_storage_access_key,
                secret_key: object_storage_secret_key,
                session_token: object_storage_session_token,
                distribution_url: object_storage_distribution_url,
            },
        };

        Output {
            config_format: ConfigFormat {
                server,
                tracing,
                metrics,
                auth,
                media,
                repo,
                store,
            },
            save_to,
            config_file,
        }
    }
}

pub(super) struct Output {
    pub(super) config_format: ConfigFormat,
    pub(super) save_to: Option<PathBuf>,
    pub(super) config_file: Option<PathBuf>,
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub(super) struct ConfigFormat {
    server: Server,
    tracing: Tracing,
    metrics: Metrics,
    auth: Auth,
    media: Media,
    #[serde(skip_serializing_if = "Option::is_none")]
    repo: Option<Repo>,
    store: Store,
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct Server {
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<SocketAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temporary_directory: Option<PathBuf>,
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct Tracing {
    logging: Logging,
    opentelemetry: OpenTelemetry,
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct Logging {
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<LogFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    targets: Option<Serde<Targets>>,
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct OpenTelemetry {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    targets: Option<Serde<Targets>>,
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct Metrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    prometheus_address: Option<SocketAddr>,
}

#[derive(Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct Auth {
    #[serde(skip_serializing_if = "Option::is_none")]
    jwt_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issuer: Option<String>,
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct Media {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_thumbnail_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_video_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_timeout: Option<u64>,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "type")]
enum Repo {
    Sled(Sled),
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct Sled {
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_capacity: Option<u64>,
}

impl Sled {
    fn set(self) -> Option<Self> {
        if self.path.is_some() || self.cache_capacity.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct Store {
    assets: Assets,
    object_storage: ObjectStorage,
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct Assets {
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
}

#[derive(Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct ObjectStorage {
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bucket_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    use_path_style: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    distribution_url: Option<Url>,
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[redacted]"))
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl std::fmt::Debug for ObjectStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStorage")
            .field("endpoint", &self.endpoint)
            .field("bucket_name", &self.bucket_name)
            .field("region", &self.region)
            .field("use_path_style", &self.use_path_style)
            .field("access_key", &self.access_key.as_ref().map(|_| "[redacted]"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[redacted]"))
            .field("session_token", &self.session_token.as_ref().map(|_| "[redacted]"))
            .field("distribution_url", &self.distribution_url)
            .finish()
    }
}

/// Run the tubely upload server
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub(super) struct Args {
    /// Path to the tubely configuration file
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Format of logs printed to stdout
    #[arg(long)]
    log_format: Option<LogFormat>,
    /// Log levels to print to stdout, respects RUST_LOG formatting
    #[arg(long)]
    log_targets: Option<Targets>,

    /// URL to send OpenTelemetry traces
    #[arg(long)]
    opentelemetry_url: Option<Url>,
    /// Service Name to use for OpenTelemetry
    #[arg(long)]
    opentelemetry_service_name: Option<String>,
    /// Log levels to use for OpenTelemetry, respects RUST_LOG formatting
    #[arg(long)]
    opentelemetry_targets: Option<Targets>,

    /// File to save the current configuration for reproducible runs
    #[arg(long)]
    save_to: Option<PathBuf>,

    /// The address and port to bind the tubely web server
    #[arg(short, long)]
    address: Option<SocketAddr>,

    /// The url clients use to reach this server, used when building thumbnail urls
    #[arg(long)]
    public_url: Option<Url>,

    /// The temporary directory tubely should use when staging uploads
    #[arg(long)]
    temporary_directory: Option<PathBuf>,

    /// Whether to enable the prometheus scrape endpoint
    #[arg(long)]
    metrics_prometheus_address: Option<SocketAddr>,

    /// The HMAC secret access tokens are signed with
    #[arg(long)]
    jwt_secret: Option<String>,

    /// The issuer access tokens must carry
    ///
    /// This defaults to tubely-access
    #[arg(long)]
    jwt_issuer: Option<String>,

    /// The maximum size, in megabytes, for uploaded thumbnails
    #[arg(long)]
    media_max_thumbnail_size: Option<usize>,

    /// The maximum size, in megabytes, for uploaded videos
    #[arg(long)]
    media_max_video_size: Option<usize>,

    /// How long, in seconds, ffprobe and ffmpeg may run before they are killed
    #[arg(long)]
    media_process_timeout: Option<u64>,

    /// The path to the sled database holding video records
    #[arg(long)]
    repo_path: Option<PathBuf>,

    /// The cache capacity, in bytes, allowed to sled for in-memory operations
    #[arg(long)]
    repo_cache_capacity: Option<u64>,

    /// The directory thumbnails are written to and served from
    #[arg(long)]
    assets_path: Option<PathBuf>,

    /// The base endpoint for an S3-compatible object store, AWS when omitted
    #[arg(long)]
    object_storage_endpoint: Option<Url>,

    /// The bucket videos are uploaded to
    #[arg(long)]
    object_storage_bucket_name: Option<String>,

    /// The region the bucket lives in
    #[arg(long)]
    object_storage_region: Option<String>,

    /// Whether to address the bucket by path rather than by subdomain
    #[arg(long)]
    object_storage_use_path_style: Option<bool>,

    /// The access key used to authenticate against object storage
    #[arg(long)]
    object_storage_access_key: Option<String>,

    /// The secret key used to authenticate against object storage
    #[arg(long)]
    object_storage_secret_key: Option<String>,

    /// The session token used to authenticate against object storage
    #[arg(long)]
    object_storage_session_token: Option<String>,

    /// The public base url videos are served from, such as a CDN in front of the bucket
    #[arg(long)]
    object_storage_distribution_url: Option<Url>,
}
