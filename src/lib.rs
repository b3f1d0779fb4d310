mod auth;
mod config;
mod error;
mod error_code;
mod ffmpeg;
mod formats;
mod future;
mod ingest;
mod init_metrics;
mod init_tracing;
mod key;
mod process;
mod repo;
mod root_span_builder;
mod serde_str;
mod state;
mod store;
mod sync;
mod tmp_file;
mod upload;

use actix_form_data::{Field, Form, FormData, Multipart, Value};
use actix_web::{
    http::header::{CacheControl, CacheDirective},
    web, App, FromRequest, HttpRequest, HttpResponse, HttpServer,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::{
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::Instrument;
use tracing_actix_web::TracingLogger;

use self::{
    auth::Authenticator,
    config::{Configuration, Repo},
    error::{Error, UploadError},
    ffmpeg::FfMpeg,
    formats::{AcceptedFormat, AssetKind},
    ingest::Staged,
    init_metrics::init_metrics,
    init_tracing::init_tracing,
    repo::{sled::SledRepo, ArcRepo, Video},
    root_span_builder::RootSpanBuilder,
    state::State,
    store::{file_store::FileStore, object_store::ObjectStore, Store},
    tmp_file::TmpDir,
};

pub use self::config::ConfigSource;

const MEGABYTES: usize = 1024 * 1024;
const DAYS: u32 = 24 * 60 * 60;

fn upload_form<S: Store + 'static>(req: &HttpRequest, kind: AssetKind) -> Form<Staged, Error> {
    let state = req
        .app_data::<web::Data<State<S>>>()
        .expect("No state in request")
        .clone();

    let max_size = match kind {
        AssetKind::Thumbnail => state.config.media.max_thumbnail_size,
        AssetKind::Video => state.config.media.max_video_size,
    };

    // A single file under the kind's field name, nothing else
    Form::new()
        .max_files(1)
        .max_file_size(max_size * MEGABYTES)
        .transform_error(transform_error)
        .field(
            kind.field_name(),
            Field::file(
                async move |filename: String, content_type: Option<mime::Mime>, stream| {
                    let span = tracing::info_span!("file-upload", ?filename, ?content_type);

                    upload::stage_upload(&state.tmp_dir, kind, content_type.as_ref(), stream)
                        .instrument(span)
                        .await
                },
            ),
        )
}

struct ThumbnailUpload<S: Store + 'static>(Value<Staged>, PhantomData<S>);

impl<S: Store + 'static> FormData for ThumbnailUpload<S> {
    type Item = Staged;
    type Error = Error;

    fn form(req: &HttpRequest) -> Result<Form<Self::Item, Self::Error>, Self::Error> {
        Ok(upload_form::<S>(req, AssetKind::Thumbnail))
    }

    fn extract(value: Value<Self::Item>) -> Result<Self, Self::Error> {
        Ok(ThumbnailUpload(value, PhantomData))
    }
}

struct VideoUpload<S: Store + 'static>(Value<Staged>, PhantomData<S>);

impl<S: Store + 'static> FormData for VideoUpload<S> {
    type Item = Staged;
    type Error = Error;

    fn form(req: &HttpRequest) -> Result<Form<Self::Item, Self::Error>, Self::Error> {
        Ok(upload_form::<S>(req, AssetKind::Video))
    }

    fn extract(value: Value<Self::Item>) -> Result<Self, Self::Error> {
        Ok(VideoUpload(value, PhantomData))
    }
}

fn take_file(value: Value<Staged>, kind: AssetKind) -> Result<Staged, Error> {
    let file = value
        .map()
        .and_then(|mut m| m.remove(kind.field_name()))
        .and_then(|v| v.file())
        .ok_or(UploadError::NoFiles)?;

    tracing::debug!("Staged {} as {:?}", file.filename, file.result.format);

    Ok(file.result)
}

/// Authenticate and check ownership before any of the body is read
async fn authorize<S: Store>(
    req: &HttpRequest,
    state: &State<S>,
    video_id: &str,
) -> Result<Video, Error> {
    let user_id = state.auth.authenticate(req)?;

    upload::validate_owner(&state.repo, video_id, user_id).await
}

#[tracing::instrument(name = "Uploading thumbnail", skip(req, payload, state))]
async fn thumbnail_upload<S: Store + 'static>(
    req: HttpRequest,
    payload: web::Payload,
    video_id: web::Path<String>,
    state: web::Data<State<S>>,
) -> Result<HttpResponse, actix_web::Error> {
    let video = authorize(&req, &state, &video_id).await?;

    let Multipart(ThumbnailUpload(value, _)) =
        Multipart::<ThumbnailUpload<S>>::from_request(&req, &mut payload.into_inner()).await?;

    let staged = take_file(value, AssetKind::Thumbnail)?;

    let video = upload::upload_thumbnail(&state, video, staged).await?;

    Ok(HttpResponse::Ok().json(&video))
}

#[tracing::instrument(name = "Uploading video", skip(req, payload, state))]
async fn video_upload<S: Store + 'static>(
    req: HttpRequest,
    payload: web::Payload,
    video_id: web::Path<String>,
    state: web::Data<State<S>>,
) -> Result<HttpResponse, actix_web::Error> {
    let video = authorize(&req, &state, &video_id).await?;

    let Multipart(VideoUpload(value, _)) =
        Multipart::<VideoUpload<S>>::from_request(&req, &mut payload.into_inner()).await?;

    let staged = take_file(value, AssetKind::Video)?;

    let video = upload::upload_video(&state, video, staged).await?;

    Ok(HttpResponse::Ok().json(&video))
}

#[derive(Debug, serde::Deserialize)]
struct NewVideo {
    title: String,
    #[serde(default)]
    description: String,
}

#[tracing::instrument(name = "Creating video", skip(req, state))]
async fn create_video<S: Store + 'static>(
    req: HttpRequest,
    body: web::Json<NewVideo>,
    state: web::Data<State<S>>,
) -> Result<HttpResponse, Error> {
    let user_id = state.auth.authenticate(&req)?;

    let NewVideo { title, description } = body.into_inner();
    let video = Video::new(user_id, title, description);

    state.repo.create_video(&video).await?;

    Ok(HttpResponse::Created().json(&video))
}

#[tracing::instrument(name = "Fetching video", skip(req, state))]
async fn get_video<S: Store + 'static>(
    req: HttpRequest,
    video_id: web::Path<String>,
    state: web::Data<State<S>>,
) -> Result<HttpResponse, Error> {
    let video = authorize(&req, &state, &video_id).await?;

    Ok(HttpResponse::Ok().json(&video))
}

#[tracing::instrument(name = "Serving asset", skip(state))]
async fn serve_asset<S: Store + 'static>(
    filename: web::Path<String>,
    state: web::Data<State<S>>,
) -> Result<HttpResponse, Error> {
    let filename = filename.into_inner();

    let format = key::is_asset_name(&filename)
        .then(|| AcceptedFormat::from_extension(&filename))
        .flatten()
        .ok_or(UploadError::InvalidAssetName)?;

    let (len, stream) = state.assets.to_stream(&filename).await?;

    // keys are never reused
    Ok(HttpResponse::Ok()
        .content_type(format.media_type())
        .insert_header(CacheControl(vec![
            CacheDirective::Public,
            CacheDirective::MaxAge(365 * DAYS),
            CacheDirective::Extension("immutable".into(), None),
        ]))
        .no_chunking(len)
        .streaming(stream))
}

async fn healthz<S: Store>(state: web::Data<State<S>>) -> Result<HttpResponse, Error> {
    state.repo.health_check().await?;
    state.assets.health_check().await?;
    state.store.health_check().await?;
    Ok(HttpResponse::Ok().finish())
}

fn transform_error(error: actix_form_data::Error) -> actix_web::Error {
    let error: Error = error.into();
    let error: actix_web::Error = error.into();
    error
}

fn configure_endpoints<S: Store + 'static>(config: &mut web::ServiceConfig, state: State<S>) {
    config
        .app_data(web::Data::new(state))
        .route("/healthz", web::get().to(healthz::<S>))
        .service(
            web::scope("/api")
                .route(
                    "/thumbnail_upload/{video_id}",
                    web::post().to(thumbnail_upload::<S>),
                )
                .route("/video_upload/{video_id}", web::post().to(video_upload::<S>))
                .route("/videos", web::post().to(create_video::<S>))
                .route("/videos/{video_id}", web::get().to(get_video::<S>)),
        )
        .route("/assets/{filename}", web::get().to(serve_asset::<S>));
}

async fn launch<S: Store + Send + 'static>(state: State<S>) -> std::io::Result<()> {
    let address = state.config.server.address;

    tracing::info!("Starting tubely on {address}");

    HttpServer::new(move || {
        let state = state.clone();

        App::new()
            .wrap(TracingLogger::<RootSpanBuilder>::new())
            .configure(move |sc| configure_endpoints(sc, state))
    })
    .bind(address)?
    .run()
    .await
}

impl ConfigSource<PathBuf, ()> {
    /// Read configuration from a file on disk
    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        ConfigSource::File { path: path.into() }
    }

    /// Only defaults and `TUBELY__` environment variables
    pub fn empty() -> Self {
        ConfigSource::Empty
    }
}

impl<T: serde::Serialize> ConfigSource<PathBuf, T> {
    /// Anything that serializes to the shape of a configuration file
    pub fn memory(values: T) -> Self {
        ConfigSource::Memory { values }
    }
}

impl<P: AsRef<Path>, T: serde::Serialize> ConfigSource<P, T> {
    /// Initialize the tubely configuration
    ///
    /// Command line options are not available when running tubely as a library. The optional
    /// `save_to` path receives the merged configuration, defaults included.
    ///
    /// ```rust
    /// fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     tubely::ConfigSource::memory(serde_json::json!({
    ///         "server": {
    ///             "address": "127.0.0.1:8091"
    ///         },
    ///         "auth": {
    ///             "jwt_secret": "change me"
    ///         },
    ///         "store": {
    ///             "object_storage": {
    ///                 "bucket_name": "tubely-videos",
    ///                 "distribution_url": "https://d111111abcdef8.cloudfront.net"
    ///             }
    ///         }
    ///     }))
    ///     .init::<&str>(None)?;
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn init<Q: AsRef<Path>>(self, save_to: Option<Q>) -> color_eyre::Result<TubelyConfiguration> {
        config::configure_without_clap(self, save_to).map(|config| TubelyConfiguration { config })
    }
}

/// A fully merged tubely configuration, ready to run
pub struct TubelyConfiguration {
    config: Configuration,
}

impl TubelyConfiguration {
    /// Build the configuration from defaults, a config file, the environment, and the command line
    pub fn build_default() -> color_eyre::Result<Self> {
        config::configure().map(|config| TubelyConfiguration { config })
    }

    /// Install the default tracing subscriber, with OpenTelemetry export when configured
    pub fn install_tracing(self) -> color_eyre::Result<Self> {
        init_tracing(&self.config.tracing)?;
        Ok(self)
    }

    /// Install the Prometheus exporter when an address is configured
    pub fn install_metrics(self) -> color_eyre::Result<Self> {
        if let Some(addr) = self.config.metrics.prometheus_address {
            PrometheusBuilder::new()
                .with_http_listener(addr)
                .install()?;
            tracing::info!("Starting prometheus endpoint on {addr}");

            init_metrics();
        }

        Ok(self)
    }

    /// Run the tubely server until it is told to stop
    pub async fn run(self) -> color_eyre::Result<()> {
        let TubelyConfiguration { config } = self;

        TmpDir::sweep(&config.server.temporary_directory).await?;
        let tmp_dir = TmpDir::init(&config.server.temporary_directory).await?;

        let repo: ArcRepo = match &config.repo {
            Repo::Sled(sled) => Arc::new(SledRepo::build(sled.path.clone(), sled.cache_capacity)?),
        };

        let assets =
            FileStore::build(config.store.assets.path.clone(), &config.server.public_url).await?;

        let object_storage = config.store.object_storage.clone();
        let store = ObjectStore::build(
            object_storage.endpoint,
            object_storage.bucket_name,
            object_storage.region,
            object_storage.use_path_style,
            object_storage.access_key,
            object_storage.secret_key,
            object_storage.session_token,
            object_storage.distribution_url,
        )?;

        let auth = Authenticator::new(&config.auth.jwt_secret, &config.auth.issuer);
        let ffmpeg = Arc::new(FfMpeg::new(config.media.process_timeout));

        let state = State {
            config,
            tmp_dir: tmp_dir.clone(),
            repo,
            auth,
            assets,
            store,
            inspector: ffmpeg.clone(),
            normalizer: ffmpeg,
        };

        launch(state).await?;

        tmp_dir.cleanup().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{
        dev::ServiceResponse,
        http::{
            header::{AUTHORIZATION, CONTENT_TYPE},
            StatusCode,
        },
        test, web, App,
    };
    use uuid::Uuid;

    use super::configure_endpoints;
    use crate::{
        auth::sign_token,
        state::test::{landscape, CopyNormalizer, Harness, ISSUER, SECRET},
    };

    const BOUNDARY: &str = "tubely-test-boundary";

    fn bearer(user_id: Uuid) -> String {
        format!("Bearer {}", sign_token(SECRET, ISSUER, user_id, 3600))
    }

    fn multipart(field: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
        part(field, Some(content_type), bytes)
    }

    fn part(field: &str, content_type: Option<&str>, bytes: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"upload\"\r\n"
        )
        .into_bytes();
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(uri: &str, user_id: Uuid, body: Vec<u8>) -> test::TestRequest {
        test::TestRequest::post()
            .uri(uri)
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .insert_header((AUTHORIZATION, bearer(user_id)))
            .set_payload(body)
    }

    fn endpoints(harness: &Harness) -> impl FnOnce(&mut web::ServiceConfig) {
        let state = harness.state.clone();

        move |sc| configure_endpoints(sc, state)
    }

    async fn error_code(res: ServiceResponse) -> String {
        let body: serde_json::Value = test::read_body_json(res).await;

        body["code"].as_str().expect("Error code").to_owned()
    }

    #[actix_web::test]
    async fn thumbnail_upload_and_serve() {
        let harness = Harness::new(landscape(), std::sync::Arc::new(CopyNormalizer)).await;
        let app = test::init_service(App::new().configure(endpoints(&harness))).await;

        let user_id = Uuid::new_v4();
        let video = harness.video_for(user_id).await;

        let jpeg = vec![0xFFu8; 50 * 1024];
        let req = upload_request(
            &format!("/api/thumbnail_upload/{}", video.id),
            user_id,
            multipart("thumbnail", "image/jpeg", &jpeg),
        )
        .to_request();

        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(res).await;
        let url = body["thumbnail_url"].as_str().expect("Thumbnail url");
        assert!(url.starts_with("http://localhost:8091/assets/"), "{url}");
        assert!(url.ends_with(".jpg"), "{url}");

        let path = url.trim_start_matches("http://localhost:8091");
        let req = test::TestRequest::get().uri(path).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(CONTENT_TYPE).expect("Content-Type"),
            "image/jpeg"
        );

        let served = test::read_body(res).await;
        assert_eq!(served.len(), jpeg.len());

        assert!(harness.scratch_files().is_empty());
    }

    #[actix_web::test]
    async fn video_upload_lands_in_bucket() {
        let harness = Harness::new(landscape(), std::sync::Arc::new(CopyNormalizer)).await;
        let app = test::init_service(App::new().configure(endpoints(&harness))).await;

        let user_id = Uuid::new_v4();
        let video = harness.video_for(user_id).await;

        let req = upload_request(
            &format!("/api/video_upload/{}", video.id),
            user_id,
            multipart("video", "video/mp4", b"ftypmp42"),
        )
        .to_request();

        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(res).await;
        let url = body["video_url"].as_str().expect("Video url");
        assert!(
            url.starts_with("https://d111111abcdef8.cloudfront.net/landscape/"),
            "{url}"
        );
        assert!(url.ends_with(".mp4"), "{url}");

        assert!(harness.scratch_files().is_empty());
    }

    #[actix_web::test]
    async fn missing_token_is_unauthenticated() {
        let harness = Harness::new(landscape(), std::sync::Arc::new(CopyNormalizer)).await;
        let app = test::init_service(App::new().configure(endpoints(&harness))).await;

        let video = harness.video_for(Uuid::new_v4()).await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/thumbnail_upload/{}", video.id))
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart("thumbnail", "image/jpeg", b"jpeg"))
            .to_request();

        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(res).await, "unauthenticated");
    }

    #[actix_web::test]
    async fn strangers_are_forbidden_before_the_body_is_read() {
        let harness = Harness::new(landscape(), std::sync::Arc::new(CopyNormalizer)).await;
        let app = test::init_service(App::new().configure(endpoints(&harness))).await;

        let video = harness.video_for(Uuid::new_v4()).await;

        let req = upload_request(
            &format!("/api/video_upload/{}", video.id),
            Uuid::new_v4(),
            b"this is not multipart".to_vec(),
        )
        .to_request();

        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(error_code(res).await, "forbidden");

        assert!(harness.stored(&video).await.video_url.is_none());
    }

    #[actix_web::test]
    async fn gif_thumbnails_are_rejected() {
        let harness = Harness::new(landscape(), std::sync::Arc::new(CopyNormalizer)).await;
        let app = test::init_service(App::new().configure(endpoints(&harness))).await;

        let user_id = Uuid::new_v4();
        let video = harness.video_for(user_id).await;

        let req = upload_request(
            &format!("/api/thumbnail_upload/{}", video.id),
            user_id,
            multipart("thumbnail", "image/gif", b"GIF89a"),
        )
        .to_request();

        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(res).await, "unsupported-media-type");

        assert!(harness.stored(&video).await.thumbnail_url.is_none());
    }

    #[actix_web::test]
    async fn parts_without_a_content_type_are_rejected() {
        let harness = Harness::new(landscape(), std::sync::Arc::new(CopyNormalizer)).await;
        let app = test::init_service(App::new().configure(endpoints(&harness))).await;

        let user_id = Uuid::new_v4();
        let video = harness.video_for(user_id).await;

        let req = upload_request(
            &format!("/api/thumbnail_upload/{}", video.id),
            user_id,
            part("thumbnail", None, &[0xFF; 1024]),
        )
        .to_request();

        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(res).await, "unsupported-media-type");

        assert_eq!(harness.stored(&video).await, video);
        assert!(harness.scratch_files().is_empty());
    }

    #[actix_web::test]
    async fn oversized_and_misnamed_uploads_are_bad_requests() {
        let harness = Harness::new(landscape(), std::sync::Arc::new(CopyNormalizer)).await;
        let app = test::init_service(App::new().configure(endpoints(&harness))).await;

        let user_id = Uuid::new_v4();
        let video = harness.video_for(user_id).await;
        let uri = format!("/api/thumbnail_upload/{}", video.id);

        let too_big = vec![0u8; super::MEGABYTES + 1];
        let req = upload_request(&uri, user_id, multipart("thumbnail", "image/png", &too_big))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let req = upload_request(&uri, user_id, multipart("video", "image/png", b"png"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        assert!(harness.stored(&video).await.thumbnail_url.is_none());
        assert!(harness.scratch_files().is_empty());
    }

    #[actix_web::test]
    async fn bad_video_ids() {
        let harness = Harness::new(landscape(), std::sync::Arc::new(CopyNormalizer)).await;
        let app = test::init_service(App::new().configure(endpoints(&harness))).await;

        let user_id = Uuid::new_v4();

        let req = test::TestRequest::get()
            .uri("/api/videos/not-a-uuid")
            .insert_header((AUTHORIZATION, bearer(user_id)))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(res).await, "invalid-video-id");

        let req = test::TestRequest::get()
            .uri(&format!("/api/videos/{}", Uuid::new_v4()))
            .insert_header((AUTHORIZATION, bearer(user_id)))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_code(res).await, "video-not-found");
    }

    #[actix_web::test]
    async fn create_then_fetch_video() {
        let harness = Harness::new(landscape(), std::sync::Arc::new(CopyNormalizer)).await;
        let app = test::init_service(App::new().configure(endpoints(&harness))).await;

        let user_id = Uuid::new_v4();

        let req = test::TestRequest::post()
            .uri("/api/videos")
            .insert_header((AUTHORIZATION, bearer(user_id)))
            .set_json(serde_json::json!({
                "title": "Boots",
                "description": "A pair of boots",
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let created: serde_json::Value = test::read_body_json(res).await;
        let id = created["id"].as_str().expect("Video id");
        assert_eq!(created["user_id"], user_id.to_string());
        assert!(created["thumbnail_url"].is_null());

        let req = test::TestRequest::get()
            .uri(&format!("/api/videos/{id}"))
            .insert_header((AUTHORIZATION, bearer(user_id)))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let fetched: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(fetched["title"], "Boots");

        let req = test::TestRequest::get()
            .uri(&format!("/api/videos/{id}"))
            .insert_header((AUTHORIZATION, bearer(Uuid::new_v4())))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn unknown_assets_are_not_found() {
        let harness = Harness::new(landscape(), std::sync::Arc::new(CopyNormalizer)).await;
        let app = test::init_service(App::new().configure(endpoints(&harness))).await;

        for uri in ["/assets/missing.jpg", "/assets/..%2Fsecret.jpg", "/assets/file.gif"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let res = test::call_service(&app, req).await;

            assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[actix_web::test]
    async fn healthz() {
        let harness = Harness::new(landscape(), std::sync::Arc::new(CopyNormalizer)).await;
        let app = test::init_service(App::new().configure(endpoints(&harness))).await;

        let req = test::TestRequest::get().uri("/healthz").to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
    }
}
