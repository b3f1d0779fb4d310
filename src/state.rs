use std::sync::Arc;

use crate::{
    auth::Authenticator,
    config::Configuration,
    ffmpeg::{Inspector, Normalizer},
    repo::ArcRepo,
    store::file_store::FileStore,
    tmp_file::ArcTmpDir,
};

#[derive(Clone)]
pub(crate) struct State<S> {
    pub(crate) config: Configuration,
    pub(crate) tmp_dir: ArcTmpDir,
    pub(crate) repo: ArcRepo,
    pub(crate) auth: Authenticator,
    pub(crate) assets: FileStore,
    pub(crate) store: S,
    pub(crate) inspector: Arc<dyn Inspector>,
    pub(crate) normalizer: Arc<dyn Normalizer>,
}
