use bincode::{Decode, Encode};
use snafu::prelude::*;

use crate::changes::change::{ChangeError, NotAppliedSnafu};
use crate::tree::IdPath;

/// State shared by every change that targets an entry by path.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct BaseChange {
    path: String,
    /// Filled in by `apply_to`, empty until then.
    affected_id_paths: Vec<IdPath>,
}

impl BaseChange {
    pub fn new(path: impl Into<String>) -> Self {
        BaseChange {
            path: path.into(),
            affected_id_paths: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn affected_id_paths(&self) -> &[IdPath] {
        &self.affected_id_paths
    }

    pub fn is_applied(&self) -> bool {
        !self.affected_id_paths.is_empty()
    }

    pub(crate) fn record(&mut self, id_paths: Vec<IdPath>) {
        self.affected_id_paths = id_paths;
    }

    pub(crate) fn ensure_applied(&self) -> Result<(), ChangeError> {
        ensure!(self.is_applied(), NotAppliedSnafu { path: &self.path });
        Ok(())
    }
}
