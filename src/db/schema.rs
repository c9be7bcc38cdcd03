use crate::entities::{
    blacklisted_token, comment, like, media, post, post_media, post_tagged_user, profile,
    profile_follower, user,
};
use sea_orm::sea_query::{Index, TableCreateStatement};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Schema};

/// Creates every table that does not exist yet.
///
/// Tables are listed parents first so MySQL can resolve the foreign keys.
/// Every foreign key to `users` and `posts` cascades on delete.
pub async fn create_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut likes = table(&schema, like::Entity);
    likes.index(
        Index::create()
            .name(like::UNIQUE_POST_LIKED_BY)
            .col(like::Column::PostId)
            .col(like::Column::LikedById)
            .unique(),
    );

    let statements = vec![
        table(&schema, user::Entity),
        table(&schema, profile::Entity),
        table(&schema, profile_follower::Entity),
        table(&schema, media::Entity),
        table(&schema, post::Entity),
        table(&schema, post_media::Entity),
        table(&schema, post_tagged_user::Entity),
        likes,
        table(&schema, comment::Entity),
        table(&schema, blacklisted_token::Entity),
    ];

    for statement in statements {
        db.execute(backend.build(&statement)).await?;
    }

    Ok(())
}

fn table<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    statement
}
