use rand::Rng;
use rand::distr::Alphanumeric;

/// 生成随机口令，保证至少包含大小写字母与数字
pub fn generate_password(len: usize) -> String {
    let len = len.max(8);
    let mut rng = rand::rng();
    loop {
        let candidate: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();
        if candidate.chars().any(|c| c.is_ascii_uppercase())
            && candidate.chars().any(|c| c.is_ascii_lowercase())
            && candidate.chars().any(|c| c.is_ascii_digit())
        {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validate::validate_password;

    #[test]
    fn test_generated_password_passes_policy() {
        for _ in 0..20 {
            let password = generate_password(16);
            assert_eq!(password.len(), 16);
            assert!(validate_password(&password).is_valid);
        }
    }
}
