//! Environment variables and well-known directories.

use std::env;
use std::path::PathBuf;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn env_var_impl(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn data_dir_impl(&self) -> Option<PathBuf> {
        dirs::data_dir()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn temp_dir_impl(&self) -> PathBuf {
        env::temp_dir()
    }
}
