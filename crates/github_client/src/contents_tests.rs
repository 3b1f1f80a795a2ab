use super::*;

#[test]
fn test_new_encodes_content() {
    let payload = FileCreatePayload::new(
        "Initialize repository :tada:",
        "extends: acme",
        "master",
    );

    assert_eq!(payload.content, "ZXh0ZW5kczogYWNtZQ==");
    assert_eq!(payload.branch, "master");
    assert_eq!(payload.decoded_content().as_deref(), Some("extends: acme"));
}

#[test]
fn test_decoded_content_rejects_invalid_base64() {
    let payload = FileCreatePayload {
        message: "m".to_string(),
        content: "***".to_string(),
        branch: "main".to_string(),
    };

    assert!(payload.decoded_content().is_none());
}

#[test]
fn test_payload_serialization_fields() {
    let payload = FileCreatePayload::new("msg", "a", "dev");

    let json = serde_json::to_value(&payload).unwrap();

    assert_eq!(
        json,
        serde_json::json!({ "message": "msg", "content": "YQ==", "branch": "dev" })
    );
}
