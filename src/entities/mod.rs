pub mod blacklisted_token;
pub mod comment;
pub mod like;
pub mod media;
pub mod post;
pub mod post_media;
pub mod post_tagged_user;
pub mod profile;
pub mod profile_follower;
pub mod user;
