use sea_orm::entity::prelude::*;

/// An uploaded PDF and its cached text.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    /// Sanitized name, also the on-disk name inside the upload directory.
    pub filename: String,
    pub file_path: String,
    /// NULL until extraction has produced something; once set it is never recomputed.
    #[sea_orm(column_type = "Text", nullable)]
    pub extracted_text: Option<String>,

    #[sea_orm(default_expr = "sea_orm::sea_query::Expr::current_timestamp()")]
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
