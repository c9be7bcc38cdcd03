//! Turns stored rows into wire representations.
//!
//! Counts are computed from the live relation on every call, never cached on
//! the row, so they always match what is stored.

use crate::entities::{comment, like, post, profile, user};
use crate::error::AppResult;
use crate::models::{
    CommentResponse, LikeResponse, MediaResponse, PostResponse, ProfileResponse, UserResponse,
};
use crate::repositories::{PostRepository, ProfileRepository, UserRepository};
use sea_orm::ConnectionTrait;

pub struct Representer<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> Representer<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn profile(&self, profile: profile::Model) -> AppResult<ProfileResponse> {
        let profiles = ProfileRepository::new(self.db);
        let followers = profiles.follower_ids(profile.id).await?;
        let following_count = profiles.count_following(profile.id).await?;

        Ok(ProfileResponse {
            id: profile.id,
            user: profile.user_id,
            bio: profile.bio,
            avatar: profile.avatar,
            followers_count: followers.len() as u64,
            followers,
            following_count,
        })
    }

    pub async fn profiles(&self, profiles: Vec<profile::Model>) -> AppResult<Vec<ProfileResponse>> {
        let mut responses = Vec::with_capacity(profiles.len());
        for profile in profiles {
            responses.push(self.profile(profile).await?);
        }
        Ok(responses)
    }

    /// User with its nested profile. The password hash never leaves this function.
    pub async fn user(&self, user: user::Model) -> AppResult<UserResponse> {
        let profile = match ProfileRepository::new(self.db).find_by_user(user.id).await? {
            Some(profile) => Some(self.profile(profile).await?),
            None => None,
        };

        Ok(UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            profile,
        })
    }

    pub async fn user_by_id(&self, user_id: i64) -> AppResult<UserResponse> {
        let user = UserRepository::new(self.db).get(user_id).await?;
        self.user(user).await
    }

    pub async fn users(&self, users: Vec<user::Model>) -> AppResult<Vec<UserResponse>> {
        let mut responses = Vec::with_capacity(users.len());
        for user in users {
            responses.push(self.user(user).await?);
        }
        Ok(responses)
    }

    pub async fn post(&self, post: post::Model) -> AppResult<PostResponse> {
        let posts = PostRepository::new(self.db);

        let media = posts
            .media(&post)
            .await?
            .into_iter()
            .map(MediaResponse::from)
            .collect();
        let tagged_people = self.users(posts.tagged_people(post.id).await?).await?;
        let created_by = self.user_by_id(post.created_by_id).await?;
        let likes_count = posts.count_likes(post.id).await?;
        let comments_count = posts.count_comments(post.id).await?;

        Ok(PostResponse {
            id: post.id,
            content: post.content,
            post_type: post.post_type,
            location: post.location,
            feeling: post.feeling,
            created_at: post.created_at,
            created_by,
            media,
            tagged_people,
            likes_count,
            comments_count,
        })
    }

    pub async fn posts(&self, posts: Vec<post::Model>) -> AppResult<Vec<PostResponse>> {
        let mut responses = Vec::with_capacity(posts.len());
        for post in posts {
            responses.push(self.post(post).await?);
        }
        Ok(responses)
    }

    pub async fn like(&self, like: like::Model) -> AppResult<LikeResponse> {
        Ok(LikeResponse {
            id: like.id,
            post: like.post_id,
            liked_by: self.user_by_id(like.liked_by_id).await?,
            created_at: like.created_at,
        })
    }

    pub async fn likes(&self, likes: Vec<like::Model>) -> AppResult<Vec<LikeResponse>> {
        let mut responses = Vec::with_capacity(likes.len());
        for like in likes {
            responses.push(self.like(like).await?);
        }
        Ok(responses)
    }

    pub async fn comment(&self, comment: comment::Model) -> AppResult<CommentResponse> {
        Ok(CommentResponse {
            id: comment.id,
            post: comment.post_id,
            content: comment.content,
            commented_by: self.user_by_id(comment.commented_by_id).await?,
            created_at: comment.created_at,
        })
    }

    pub async fn comments(&self, comments: Vec<comment::Model>) -> AppResult<Vec<CommentResponse>> {
        let mut responses = Vec::with_capacity(comments.len());
        for comment in comments {
            responses.push(self.comment(comment).await?);
        }
        Ok(responses)
    }
}
