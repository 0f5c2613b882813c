use crate::cache::{MokaObjectCache, ObjectCache};
use crate::config::{AppConfig, SeedConfig};
use crate::errors::Result;
use crate::models::users::entities::{User, UserRole};
use crate::models::users::requests::CreateUserRequest;
use crate::services::{ReminderNotifier, TracingReminderNotifier};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::random_code::generate_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub notifier: Arc<dyn ReminderNotifier>,
}

/// 创建缓存实例
fn create_cache(config: &AppConfig) -> Arc<dyn ObjectCache> {
    warn!(
        "Creating in-memory cache (capacity: {}, ttl: {}s)",
        config.cache.memory.max_capacity, config.cache.default_ttl
    );
    Arc::new(MokaObjectCache::new(
        config.cache.memory.max_capacity,
        config.cache.default_ttl,
    ))
}

/// 初始化默认教师账号
///
/// 用户表为空时创建。密码优先取 `SEED_INSTRUCTOR_PASSWORD`，否则随机生成并打印到日志。
/// 返回 `Ok(None)` 表示已有用户，无需创建。
pub async fn seed_instructor(
    storage: &Arc<dyn Storage>,
    seed: &SeedConfig,
    password: Option<String>,
) -> Result<Option<User>> {
    let count = storage.count_users().await?;
    if count > 0 {
        debug!(
            "Database already has {} user(s), skipping instructor seed",
            count
        );
        return Ok(None);
    }
    info!("No users found in database, creating default instructor account...");

    let password = password.unwrap_or_else(|| {
        let pwd = generate_password(16);
        warn!("==========================================================");
        warn!("  SEED_INSTRUCTOR_PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated instructor password: {}", pwd);
        warn!("  Please save this password or set SEED_INSTRUCTOR_PASSWORD");
        warn!("==========================================================");
        pwd
    });

    let request = CreateUserRequest {
        email: seed.instructor_email.trim().to_lowercase(),
        password: hash_password(&password)?,
        first_name: seed.instructor_first_name.clone(),
        last_name: seed.instructor_last_name.clone(),
        role: UserRole::Instructor,
        student_number: None,
    };

    let user = storage.create_user(request).await?;
    info!(
        "Default instructor account created (ID: {}, email: {})",
        user.id, user.email
    );
    Ok(Some(user))
}

/// 准备服务器启动的上下文
/// 包括存储、缓存与提醒通知
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = AppConfig::get();

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    // 初始化默认教师账号（如果需要）
    if let Err(e) = seed_instructor(
        &storage,
        &config.seed,
        std::env::var("SEED_INSTRUCTOR_PASSWORD").ok(),
    )
    .await
    {
        warn!("Failed to seed default instructor: {}", e);
    }

    let cache = create_cache(config);
    warn!("Cache backend initialized");

    let notifier: Arc<dyn ReminderNotifier> =
        Arc::new(TracingReminderNotifier::new(config.notification.clone()));

    StartupContext {
        storage,
        cache,
        notifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::memory_storage;
    use crate::utils::password::verify_password;

    fn seed_config() -> SeedConfig {
        SeedConfig {
            instructor_email: "Instructor@Example.com".to_string(),
            instructor_first_name: "Default".to_string(),
            instructor_last_name: "Instructor".to_string(),
        }
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let storage: Arc<dyn Storage> = Arc::new(memory_storage().await);

        let created = seed_instructor(&storage, &seed_config(), Some("Passw0rd!".to_string()))
            .await
            .unwrap()
            .expect("instructor should be created");
        assert_eq!(created.role, UserRole::Instructor);
        assert_eq!(created.email, "instructor@example.com");

        let stored = storage
            .get_user_by_email("instructor@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(verify_password("Passw0rd!", &stored.password_hash));

        let again = seed_instructor(&storage, &seed_config(), None).await.unwrap();
        assert!(again.is_none());
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }
}
