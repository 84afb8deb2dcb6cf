use crate::{AppError, AppResult};

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn validate(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!("password must be at least {MIN_PASSWORD_LEN} characters")));
    }
    Ok(())
}

// bcrypt is cpu-bound, keep it off the runtime threads
pub(crate) async fn hash(password: String, cost: u32) -> AppResult<String> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(anyhow::Error::from)??;
    Ok(hashed)
}

pub(crate) async fn verify(password: String, hash: String) -> AppResult<bool> {
    let ok = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(anyhow::Error::from)??;
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_passwords_fail_validation() {
        assert!(validate("hunter2").is_err());
        assert!(validate("correct horse").is_ok());
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let hashed = hash("correct horse".into(), 4).await.unwrap();
        assert!(verify("correct horse".into(), hashed.clone()).await.unwrap());
        assert!(!verify("wrong horse".into(), hashed).await.unwrap());
    }
}
