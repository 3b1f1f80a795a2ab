use super::*;
use serde_json::json;

#[test]
fn test_payload_sends_explicit_nulls() {
    let payload = BranchProtectionPayload::with_contexts(vec![
        "ci/build".to_string(),
        "ci/test".to_string(),
    ]);

    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        json!({
            "required_status_checks": { "strict": false, "contexts": ["ci/build", "ci/test"] },
            "enforce_admins": false,
            "required_pull_request_reviews": null,
            "restrictions": null
        })
    );
}

#[test]
fn test_payload_with_no_contexts() {
    let payload = BranchProtectionPayload::with_contexts(Vec::new());

    assert!(payload.required_status_checks.contexts.is_empty());
}
