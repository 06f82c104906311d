use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;

/// Draw random v4 identifiers until one is not already stored.
///
/// A v4 clash is astronomically unlikely, so this almost always costs a single
/// lookup. Two concurrent registrations can still draw the same unused id; the
/// store's primary key rejects the second insert.
///
/// # Errors
/// * `DatabaseError` - A lookup failed
pub async fn generate_user_id<R>(repository: &R) -> Result<UserId, UserError>
where
    R: UserRepository + ?Sized,
{
    loop {
        let candidate = UserId::new();

        if repository.find_by_id(&candidate).await?.is_none() {
            return Ok(candidate);
        }

        tracing::warn!(user_id = %candidate, "Generated user id already in use, regenerating");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use chrono::Utc;
    use mockall::Sequence;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::FullName;
    use crate::domain::user::models::User;
    use crate::domain::user::models::Username;
    use crate::user::ports::mocks::MockTestUserRepository;

    fn stored_user(id: UserId) -> User {
        User {
            id,
            username: Username::new("ab_cd").unwrap(),
            full_name: FullName::new("Ab Cd").unwrap(),
            email: EmailAddress::new("ab.cd@example.com").unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_first_free_id_returned() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let id = generate_user_id(&repository).await;
        assert!(id.is_ok());
    }

    #[tokio::test]
    async fn test_regenerates_until_id_is_free() {
        let mut repository = MockTestUserRepository::new();
        let mut sequence = Sequence::new();
        let taken = Arc::new(Mutex::new(Vec::new()));

        for _ in 0..3 {
            let taken = Arc::clone(&taken);
            repository
                .expect_find_by_id()
                .times(1)
                .in_sequence(&mut sequence)
                .returning(move |id| {
                    taken.lock().unwrap().push(*id);
                    Ok(Some(stored_user(*id)))
                });
        }
        repository
            .expect_find_by_id()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(None));

        let id = generate_user_id(&repository)
            .await
            .expect("Failed to generate id");

        let taken = taken.lock().unwrap();
        assert_eq!(taken.len(), 3);
        assert!(!taken.contains(&id));
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("connection reset".to_string())));

        let result = generate_user_id(&repository).await;
        assert!(matches!(result, Err(UserError::DatabaseError(_))));
    }
}
