use apikit::prelude::*;
use axum::http::StatusCode;
use serial_test::serial;
use std::io;

#[test]
#[serial]
fn test_new_registers_globally() {
    let err = ApiError::new(StatusCode::NOT_FOUND, "GLOBAL_ORDER_MISSING", "order not found");

    assert!(BizCodeRegistry::global().contains("GLOBAL_ORDER_MISSING"));
    assert_eq!(
        err.to_string(),
        "[statusCode: 404, bizCode: GLOBAL_ORDER_MISSING, message: order not found]"
    );
}

#[test]
#[serial]
#[should_panic(expected = "bizCode(GLOBAL_DUPLICATE) already exist, please replace it")]
fn test_new_rejects_duplicate_code() {
    ApiError::new(StatusCode::BAD_REQUEST, "GLOBAL_DUPLICATE", "first");
    ApiError::new(StatusCode::CONFLICT, "GLOBAL_DUPLICATE", "second");
}

#[test]
#[serial]
fn test_derived_errors_do_not_register() {
    let base = ApiError::new(StatusCode::BAD_GATEWAY, "GLOBAL_UPSTREAM", "upstream failed");
    let before = BizCodeRegistry::global().len();

    let derived = base
        .with_message("payment gateway timed out")
        .with_cause(io::Error::new(io::ErrorKind::TimedOut, "read timeout"), &[]);

    assert_eq!(BizCodeRegistry::global().len(), before);
    assert_eq!(derived.biz_code(), "GLOBAL_UPSTREAM");
    assert_eq!(derived.message(), "payment gateway timed out");
    assert!(derived.find_cause::<io::Error>().is_some());
    assert!(base.cause().is_none());
}
