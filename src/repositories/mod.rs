//! Data-access boundary: one repository per entity.
//!
//! Repositories borrow any sea-orm `ConnectionTrait`, so the same code runs
//! against the pool or inside a transaction.

pub mod comment;
pub mod like;
pub mod media;
pub mod post;
pub mod profile;
pub mod token;
pub mod user;

pub use comment::CommentRepository;
pub use like::LikeRepository;
pub use media::MediaRepository;
pub use post::{NewPost, PostChanges, PostRepository};
pub use profile::{FollowOutcome, ProfileRepository};
pub use token::{BlacklistOutcome, TokenBlacklistRepository};
pub use user::{create_account, NewUser, UserRepository};
