use super::*;

#[test]
fn test_error_messages() {
    assert_eq!(Error::Unauthorized.to_string(), "PullApprove rejected the token");
    assert_eq!(
        Error::ServerError { status: 500 }.to_string(),
        "PullApprove returned status 500"
    );
    assert_eq!(
        Error::InvalidUrl("not a url".to_string()).to_string(),
        "Invalid PullApprove URL: not a url"
    );
}
