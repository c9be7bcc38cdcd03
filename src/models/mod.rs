pub mod auth;
pub mod comment;
pub mod like;
pub mod media;
pub mod post;
pub mod profile;
pub mod user;

pub use auth::*;
pub use comment::*;
pub use like::*;
pub use media::*;
pub use post::*;
pub use profile::*;
pub use user::*;

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Page/limit query accepted by every list endpoint.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct ListQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub limit: Option<u64>,
}

impl ListQuery {
    pub const DEFAULT_LIMIT: u64 = 20;
    pub const MAX_LIMIT: u64 = 100;

    /// Returns `(offset, limit)` with the page clamped to at least 1.
    pub fn window(&self) -> (u64, u64) {
        let limit = self
            .limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT);
        let page = self.page.unwrap_or(1).max(1);
        ((page - 1) * limit, limit)
    }
}
