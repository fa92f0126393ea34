use crate::db::Store;
use crate::error::{SalonError, SalonResult};
use crate::models::Admin;

use super::require_text;

/// Check the admin credential pair.
///
/// Passwords are stored and compared as plain text. The caller keeps the resulting
/// logged-in flag; there is no server-side session.
pub async fn login(store: &dyn Store, username: &str, password: &str) -> SalonResult<bool> {
    let ok = match store.find_admin(username).await? {
        Some(admin) => admin.password == password,
        None => false,
    };

    if ok {
        tracing::info!(username, "Admin logged in");
    } else {
        tracing::warn!(username, "Rejected admin login");
    }
    Ok(ok)
}

/// Seed the admin collection with the configured credential when it is empty.
pub async fn ensure_admin(store: &dyn Store, username: &str, password: &str) -> SalonResult<()> {
    if store.count_admins().await? > 0 {
        return Ok(());
    }

    require_text("Username", username)?;
    require_text("Password", password)?;
    let admin = store.insert_admin(username.trim(), password).await?;
    tracing::info!(admin_id = admin.id, "Seeded default admin account");
    Ok(())
}

pub async fn change_password(
    store: &dyn Store,
    username: &str,
    current_password: &str,
    new_password: &str,
) -> SalonResult<Admin> {
    require_text("New password", new_password)?;

    let admin = match store.find_admin(username).await? {
        Some(admin) if admin.password == current_password => admin,
        _ => return Err(SalonError::InvalidCredentials),
    };

    store.set_admin_password(admin.id, new_password).await?;
    tracing::info!(admin_id = admin.id, "Admin password changed");

    Ok(Admin {
        password: new_password.to_string(),
        ..admin
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn test_login_requires_exact_match() {
        let store = MemoryStore::new();
        ensure_admin(&store, "admin", "Secret1").await.unwrap();

        assert!(login(&store, "admin", "Secret1").await.unwrap());
        assert!(!login(&store, "admin", "secret1").await.unwrap());
        assert!(!login(&store, "someone", "Secret1").await.unwrap());
        assert!(!login(&store, " admin", "Secret1").await.unwrap());
        assert!(!login(&store, "admin ", "Secret1").await.unwrap());
        assert!(!login(&store, "admin", " Secret1").await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_admin_only_seeds_once() {
        let store = MemoryStore::new();
        ensure_admin(&store, "admin", "first").await.unwrap();
        ensure_admin(&store, "other", "second").await.unwrap();

        assert_eq!(store.count_admins().await.unwrap(), 1);
        assert!(login(&store, "admin", "first").await.unwrap());
    }

    #[tokio::test]
    async fn test_change_password() {
        let store = MemoryStore::new();
        ensure_admin(&store, "admin", "old").await.unwrap();

        let err = change_password(&store, "admin", "wrong", "new").await.unwrap_err();
        assert!(matches!(err, SalonError::InvalidCredentials));

        change_password(&store, "admin", "old", "new").await.unwrap();
        assert!(login(&store, "admin", "new").await.unwrap());
        assert!(!login(&store, "admin", "old").await.unwrap());
    }
}
