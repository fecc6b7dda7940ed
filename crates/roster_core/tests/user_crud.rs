use roster_core::db::open_db_in_memory;
use roster_core::validation::{validate_user, EMAIL_INVALID};
use roster_core::{
    MobileInput, RepoError, SqliteUserRepository, UserDraft, UserField, UserRepository,
    UserService, UserServiceError,
};
use uuid::Uuid;

fn draft(name: &str, email: &str) -> UserDraft {
    UserDraft {
        user: Some(name.to_string()),
        interest: Some(vec!["x".to_string()]),
        age: Some(30),
        mobile: Some(MobileInput::from("1234567890")),
        email: Some(email.to_string()),
    }
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));

    let mut input = draft("ab", "a@b.com");
    input.interest = Some(vec![
        "chess".to_string(),
        String::new(),
        " go ".to_string(),
    ]);
    let created = service.create_user(&input).unwrap();

    assert!(!created.id.is_nil());
    assert_eq!(created.interest, ["chess".to_string(), "go".to_string()]);
    assert_eq!(created.created_at, created.updated_at);

    let loaded = service.get_user(created.id).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn email_is_stored_lower_cased() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));

    let created = service.create_user(&draft("ab", " Mixed@Case.COM ")).unwrap();
    assert_eq!(created.email, "mixed@case.com");
}

#[test]
fn duplicate_email_in_any_case_is_rejected_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));

    service.create_user(&draft("ab", "a@b.com")).unwrap();
    let err = service.create_user(&draft("cd", "A@B.COM")).unwrap_err();

    assert!(matches!(err, UserServiceError::DuplicateEmail));
    assert_eq!(service.list_users().unwrap().len(), 1);
}

#[test]
fn storage_constraint_catches_duplicates_that_skip_the_precheck() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::new(&conn);

    let valid = validate_user(&draft("ab", "a@b.com")).unwrap();
    repo.create_user(&valid).unwrap();

    let again = validate_user(&draft("cd", "A@b.com")).unwrap();
    let err = repo.create_user(&again).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateEmail));

    let interests: i64 = conn
        .query_row("SELECT COUNT(*) FROM user_interests;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(interests, 1);
}

#[test]
fn invalid_draft_is_rejected_with_every_field_error() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));

    let mut input = draft("a", "not-an-email");
    input.age = Some(121);
    let err = service.create_user(&input).unwrap_err();

    match err {
        UserServiceError::Validation(errors) => {
            assert_eq!(errors.len(), 3);
            assert_eq!(errors.get(UserField::Email), Some(EMAIL_INVALID));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.list_users().unwrap().is_empty());
}

#[test]
fn update_keeping_own_email_succeeds() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));

    let created = service.create_user(&draft("ab", "a@b.com")).unwrap();
    let mut changed = draft("renamed", "A@B.com");
    changed.age = Some(31);
    let updated = service.update_user(created.id, &changed).unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.user, "renamed");
    assert_eq!(updated.age, 31);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(service.get_user(created.id).unwrap(), updated);
}

#[test]
fn update_to_another_users_email_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));

    service.create_user(&draft("ab", "a@b.com")).unwrap();
    let second = service.create_user(&draft("cd", "c@d.com")).unwrap();

    let err = service
        .update_user(second.id, &draft("cd", "a@b.com"))
        .unwrap_err();
    assert!(matches!(err, UserServiceError::DuplicateEmail));
    assert_eq!(service.get_user(second.id).unwrap().email, "c@d.com");
}

#[test]
fn update_replaces_interests() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));

    let created = service.create_user(&draft("ab", "a@b.com")).unwrap();
    let mut changed = draft("ab", "a@b.com");
    changed.interest = Some(vec!["y".to_string(), "z".to_string()]);
    service.update_user(created.id, &changed).unwrap();

    let loaded = service.get_user(created.id).unwrap();
    assert_eq!(loaded.interest, ["y".to_string(), "z".to_string()]);
}

#[test]
fn missing_ids_report_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.get_user(missing),
        Err(UserServiceError::NotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.update_user(missing, &draft("ab", "a@b.com")),
        Err(UserServiceError::NotFound(_))
    ));
    assert!(matches!(
        service.delete_user(missing),
        Err(UserServiceError::NotFound(_))
    ));
}

#[test]
fn delete_removes_user_and_interests() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));

    let created = service.create_user(&draft("ab", "a@b.com")).unwrap();
    service.delete_user(created.id).unwrap();

    assert!(matches!(
        service.get_user(created.id),
        Err(UserServiceError::NotFound(_))
    ));
    let interests: i64 = conn
        .query_row("SELECT COUNT(*) FROM user_interests;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(interests, 0);

    // The freed email can be registered again.
    service.create_user(&draft("ef", "a@b.com")).unwrap();
}

#[test]
fn list_returns_users_in_creation_order_with_interests() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::new(&conn);
    for (name, email) in [("aa", "a@b.com"), ("bb", "b@b.com"), ("cc", "c@b.com")] {
        repo.create_user(&validate_user(&draft(name, email)).unwrap())
            .unwrap();
    }

    let all = repo.list_users().unwrap();
    let names: Vec<&str> = all.iter().map(|user| user.user.as_str()).collect();
    assert_eq!(names, ["aa", "bb", "cc"]);
    assert!(all.iter().all(|user| user.interest == ["x".to_string()]));
}

#[test]
fn find_id_by_email_honors_exclusion() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::new(&conn);
    let created = repo
        .create_user(&validate_user(&draft("ab", "a@b.com")).unwrap())
        .unwrap();

    assert_eq!(
        repo.find_id_by_email("A@B.COM", None).unwrap(),
        Some(created.id)
    );
    assert_eq!(
        repo.find_id_by_email("a@b.com", Some(created.id)).unwrap(),
        None
    );
}
