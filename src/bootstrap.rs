use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    db::OrmConn,
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Role},
    services::auth_service::hash_password,
};

/// Provision the single root administrator before serving traffic.
///
/// Upsert semantics: create the account when the configured email is absent,
/// promote it to root when it exists with a lesser role. This is the only path
/// to the root role besides a registration performed by an existing root.
pub async fn ensure_root_admin(conn: &OrmConn, config: &AppConfig) -> anyhow::Result<Uuid> {
    let existing = Users::find()
        .filter(UserCol::Email.eq(config.root_email.as_str()))
        .one(conn)
        .await?;

    match existing {
        Some(user) if user.role == Role::Root => Ok(user.id),
        Some(user) => {
            let id = user.id;
            let mut active: UserActive = user.into();
            active.role = Set(Role::Root);
            active.update(conn).await?;
            tracing::info!(email = %config.root_email, "promoted existing account to root");
            Ok(id)
        }
        None => {
            let password_hash = hash_password(&config.root_password)?;
            let user = UserActive {
                id: Set(Uuid::new_v4()),
                email: Set(config.root_email.clone()),
                password_hash: Set(password_hash),
                role: Set(Role::Root),
                company_name: Set(None),
                created_at: Set(Utc::now().into()),
            }
            .insert(conn)
            .await?;
            tracing::info!(email = %config.root_email, "created root account");
            Ok(user.id)
        }
    }
}
