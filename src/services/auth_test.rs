use super::*;

// =============================================================================
// normalize_username
// =============================================================================

#[test]
fn username_is_trimmed_and_lowercased() {
    assert_eq!(normalize_username("  Ada.Lovelace "), Some("ada.lovelace".into()));
}

#[test]
fn username_length_bounds() {
    assert_eq!(normalize_username("ab"), None);
    assert_eq!(normalize_username("abc"), Some("abc".into()));
    assert!(normalize_username(&"x".repeat(64)).is_some());
    assert_eq!(normalize_username(&"x".repeat(65)), None);
}

#[test]
fn username_rejects_spaces_and_symbols() {
    assert_eq!(normalize_username("two words"), None);
    assert_eq!(normalize_username("semi;colon"), None);
    assert_eq!(normalize_username("   "), None);
}

#[test]
fn short_password_is_weak() {
    assert!(matches!(validate_password("1234567"), Err(AuthError::WeakPassword)));
    assert!(validate_password("12345678").is_ok());
}

// =============================================================================
// PASSWORD HASHING
// =============================================================================

#[test]
fn hash_is_argon2id_phc_string() {
    let hash = hash_password("correct horse").unwrap();
    assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"), "{hash}");
    assert_eq!(hash.split('$').count(), 6);
}

#[test]
fn hash_verifies_only_the_right_password() {
    let hash = hash_password("correct horse").unwrap();
    assert!(verify_password("correct horse", &hash));
    assert!(!verify_password("correct horse ", &hash));
    assert!(!verify_password("", &hash));
}

#[test]
fn same_password_gets_distinct_salts() {
    assert_ne!(hash_password("password123").unwrap(), hash_password("password123").unwrap());
}

#[test]
fn malformed_hashes_never_verify() {
    for stored in [
        "",
        "sha256",
        "sha256$10000$00$00",
        "$argon2id$v=19$garbage",
        "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$",
    ] {
        assert!(!verify_password("pw", stored), "{stored:?}");
    }
}

#[test]
fn other_argon2_variants_never_verify() {
    let salt = SaltString::encode_b64(&[7u8; SALT_LEN]).unwrap();
    let argon2i = Argon2::new(Algorithm::Argon2i, argon2::Version::V0x13, Params::default())
        .hash_password(b"pw", &salt)
        .unwrap()
        .to_string();
    assert!(!verify_password("pw", &argon2i));
}

#[test]
fn costs_above_current_parameters_never_verify() {
    let salt = SaltString::encode_b64(&[7u8; SALT_LEN]).unwrap();
    let params = Params::new(Params::DEFAULT_M_COST, Params::DEFAULT_T_COST + 1, Params::DEFAULT_P_COST, None).unwrap();
    let costly = Argon2::new(Algorithm::Argon2id, argon2::Version::V0x13, params)
        .hash_password(b"pw", &salt)
        .unwrap()
        .to_string();
    assert!(!verify_password("pw", &costly));

    let current = Argon2::default().hash_password(b"pw", &salt).unwrap().to_string();
    assert!(verify_password("pw", &current));
}

// =============================================================================
// LIVE DB
// =============================================================================

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;

    async fn pool() -> PgPool {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL required");
        crate::db::init_pool(&url).await.expect("init pool")
    }

    fn unique_name() -> String {
        format!("user{}", &Uuid::new_v4().simple().to_string()[..12])
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    async fn register_then_login() {
        let pool = pool().await;
        let name = unique_name();
        let user = register(&pool, &format!("  {}  ", name.to_uppercase()), "password123")
            .await
            .unwrap();
        assert_eq!(user.username, name);

        let again = login(&pool, &name, "password123").await.unwrap();
        assert_eq!(again.id, user.id);
        assert!(matches!(login(&pool, &name, "wrong-password").await, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    async fn duplicate_username_is_rejected() {
        let pool = pool().await;
        let name = unique_name();
        register(&pool, &name, "password123").await.unwrap();
        assert!(matches!(register(&pool, &name, "password456").await, Err(AuthError::UsernameTaken)));
    }
}
