use crate::config::AppConfig;
use crate::errors::RatingsError;
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

/// 按全局配置的 Argon2id 参数哈希密码
pub fn hash_password(password: &str) -> Result<String, RatingsError> {
    let config = &AppConfig::get().argon2;
    hash_password_with(
        password,
        config.memory_cost,
        config.time_cost,
        config.parallelism,
    )
}

pub fn hash_password_with(
    password: &str,
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
) -> Result<String, RatingsError> {
    let params = Params::new(memory_cost, time_cost, parallelism, None)
        .map_err(|e| RatingsError::validation(format!("Argon2 参数错误: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| RatingsError::validation(format!("密码哈希失败: {e}")))?;
    Ok(hash.to_string())
}

/// 校验密码，参数从哈希串本身读取
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password_with("Sup3rSecret", 1024, 1, 1).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Sup3rSecret", &hash));
        assert!(!verify_password("sup3rsecret", &hash));
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_invalid_params_are_reported() {
        assert!(hash_password_with("Sup3rSecret", 1, 0, 1).is_err());
    }
}
