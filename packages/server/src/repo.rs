//! Reads and writes for users and their files.
//!
//! Writes run in their own transaction; an error before `commit` drops the
//! transaction and rolls it back, so no partial row is left behind.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use thiserror::Error;

use crate::entity::{file, user};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("email is already registered")]
    EmailTaken,
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Look up a user by an already-normalized email.
pub async fn find_user_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
}

pub async fn find_user_by_id<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find_by_id(id).one(db).await
}

/// Insert a user. A duplicate email is reported as [`RepoError::EmailTaken`].
pub async fn create_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<user::Model, RepoError> {
    let txn = db.begin().await?;

    let new_user = user::ActiveModel {
        name: Set(name.to_owned()),
        email: Set(email.to_owned()),
        password: Set(password_hash.to_owned()),
        ..Default::default()
    };

    let user = new_user.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => RepoError::EmailTaken,
        _ => RepoError::Db(e),
    })?;

    txn.commit().await?;
    Ok(user)
}

/// All files owned by a user, oldest first.
pub async fn find_files_by_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<file::Model>, DbErr> {
    file::Entity::find()
        .filter(file::Column::UserId.eq(user_id))
        .order_by_asc(file::Column::CreatedAt)
        .order_by_asc(file::Column::Id)
        .all(db)
        .await
}

pub async fn find_file_by_id<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<Option<file::Model>, DbErr> {
    file::Entity::find_by_id(id).one(db).await
}

/// Insert a file row. `created_at` is filled in by the database.
pub async fn create_file(
    db: &DatabaseConnection,
    user_id: i32,
    filename: &str,
    file_path: &str,
    extracted_text: Option<&str>,
) -> Result<file::Model, DbErr> {
    let txn = db.begin().await?;

    let new_file = file::ActiveModel {
        user_id: Set(user_id),
        filename: Set(filename.to_owned()),
        file_path: Set(file_path.to_owned()),
        extracted_text: Set(extracted_text.map(str::to_owned)),
        ..Default::default()
    };
    let model = new_file.insert(&txn).await?;

    txn.commit().await?;
    Ok(model)
}

/// Store extracted text for a file. Writing the same text again is harmless.
pub async fn update_file_text(
    db: &DatabaseConnection,
    id: i32,
    text: &str,
) -> Result<(), DbErr> {
    let txn = db.begin().await?;

    file::Entity::update_many()
        .col_expr(file::Column::ExtractedText, Expr::value(text.to_owned()))
        .filter(file::Column::Id.eq(id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(())
}
