use shelf_core::{classify, StaticConnectivity, SystemErrorKind, UpdateFailure};

const ONLINE: StaticConnectivity = StaticConnectivity(true);
const OFFLINE: StaticConnectivity = StaticConnectivity(false);

#[test]
fn http_status_is_formatted_with_its_code() {
    assert_eq!(classify(&UpdateFailure::Http { code: 404 }, &ONLINE), "HTTP error 404");
}

#[test]
fn unknown_host_depends_on_connectivity() {
    let failure = UpdateFailure::UnknownHost {
        host: "mangadex.org".to_string(),
    };
    assert_eq!(classify(&failure, &OFFLINE), "No network connection");
    assert_eq!(
        classify(&failure, &ONLINE),
        "Couldn't resolve host: mangadex.org"
    );
}

#[test]
fn domain_failures_have_fixed_messages() {
    assert_eq!(classify(&UpdateFailure::NoResults, &ONLINE), "No results found");
    assert_eq!(
        classify(&UpdateFailure::SourceNotInstalled { source_id: 7 }, &ONLINE),
        "Source not installed"
    );
    assert_eq!(
        classify(&UpdateFailure::LicensedChapters, &ONLINE),
        "Licensed - No chapters to show"
    );
}

#[test]
fn system_kinds_use_the_table() {
    let cases = [
        ("SocketException", "Socket error"),
        ("TimeoutException", "Operation timed out"),
        ("CertificateExpiredException", "SSL certificate has expired"),
        ("MalformedURLException", "Malformed URL"),
        ("IllegalArgumentException", "Invalid argument"),
    ];
    for (name, expected) in cases {
        let failure = UpdateFailure::system(SystemErrorKind::from_name(name), "detail");
        assert_eq!(classify(&failure, &ONLINE), expected, "{name}");
    }
}

#[test]
fn io_errors_read_as_offline_without_network() {
    let failure = UpdateFailure::system(SystemErrorKind::Io, "broken pipe");
    assert_eq!(classify(&failure, &ONLINE), "IO error");
    assert_eq!(classify(&failure, &OFFLINE), "No network connection");
}

#[test]
fn generic_failures_show_their_message() {
    let with_message = UpdateFailure::system(SystemErrorKind::Generic, "Chapter list is empty");
    assert_eq!(classify(&with_message, &ONLINE), "Chapter list is empty");

    let bare = UpdateFailure::System {
        kind: SystemErrorKind::Generic,
        message: None,
    };
    assert_eq!(classify(&bare, &ONLINE), "Exception");
}

#[test]
fn unknown_kinds_fall_back_to_name_and_message() {
    let failure = UpdateFailure::system(
        SystemErrorKind::from_name("SerializationException"),
        "unexpected token",
    );
    assert_eq!(
        classify(&failure, &ONLINE),
        "SerializationException: unexpected token"
    );
    assert_eq!(failure.to_string(), "SerializationException: unexpected token");
}
