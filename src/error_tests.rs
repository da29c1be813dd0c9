use super::*;

#[test]
fn http_status_mapping() {
    assert_eq!(AppError::user("bad_input", "oops").http_status(), 400);
    assert_eq!(AppError::not_found("not_found", "missing").http_status(), 404);
    assert_eq!(AppError::auth("auth", "no").http_status(), 401);
    assert_eq!(AppError::storage("storage", "disabled").http_status(), 503);
    assert_eq!(AppError::transient("lookup", "down").http_status(), 503);
    assert_eq!(AppError::internal("internal", "panic").http_status(), 500);
}

#[test]
fn auth_error_conversion_keeps_message() {
    let e: AppError = AuthError::Transient("connection refused".into()).into();
    assert_eq!(e.code_str(), "lookup_unavailable");
    assert_eq!(e.message(), "connection refused");
    assert_eq!(e.http_status(), 503);

    let e: AppError = AuthError::Directory("bad users.json".into()).into();
    assert_eq!(e.http_status(), 500);
}

#[test]
fn storage_error_maps_to_storage_variant() {
    let e: AppError = StorageError::Unavailable("quota".into()).into();
    assert_eq!(e.code_str(), "storage_error");
    assert_eq!(e.to_string(), "storage_error: storage unavailable: quota");
}

#[test]
fn serializes_with_type_tag() {
    let v = serde_json::to_value(AppError::auth("invalid_credentials", "nope")).unwrap();
    assert_eq!(v["type"], "auth");
    assert_eq!(v["code"], "invalid_credentials");
}
