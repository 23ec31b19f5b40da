//! Turns update failures into short messages for the inbox.
//!
//! Well-known failures get a dedicated message; everything else is matched by
//! its system error kind, with `"{kind}: {message}"` as the last resort.

use std::fmt;
use std::io;

use crate::SourceId;

/// Answers whether the device currently has a network route.
pub trait Connectivity {
    fn is_online(&self) -> bool;
}

/// Fixed connectivity answer, for tests and offline tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticConnectivity(pub bool);

impl Connectivity for StaticConnectivity {
    fn is_online(&self) -> bool {
        self.0
    }
}

/// Low-level failure categories reported by the networking and security stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SystemErrorKind {
    Generic,
    Socket,
    Connect,
    Bind,
    InterruptedIo,
    HttpRetry,
    PortUnreachable,
    Io,
    Timeout,
    Ssl,
    CertificateExpired,
    CertificateNotYetValid,
    CertificateParsing,
    CertificateEncoding,
    UnrecoverableKey,
    KeyManagement,
    NoSuchAlgorithm,
    KeyStore,
    NoSuchProvider,
    Signature,
    InvalidKeySpec,
    NoRouteToHost,
    UriSyntax,
    MalformedUrl,
    Protocol,
    Cancellation,
    Interrupted,
    IllegalState,
    UnsupportedOperation,
    IllegalArgument,
    Other(String),
}

const KIND_NAMES: &[(&str, SystemErrorKind)] = &[
    ("Exception", SystemErrorKind::Generic),
    ("SocketException", SystemErrorKind::Socket),
    ("ConnectException", SystemErrorKind::Connect),
    ("BindException", SystemErrorKind::Bind),
    ("InterruptedIOException", SystemErrorKind::InterruptedIo),
    ("HttpRetryException", SystemErrorKind::HttpRetry),
    ("PortUnreachableException", SystemErrorKind::PortUnreachable),
    ("IOException", SystemErrorKind::Io),
    ("TimeoutException", SystemErrorKind::Timeout),
    ("SSLException", SystemErrorKind::Ssl),
    ("CertificateExpiredException", SystemErrorKind::CertificateExpired),
    ("CertificateNotYetValidException", SystemErrorKind::CertificateNotYetValid),
    ("CertificateParsingException", SystemErrorKind::CertificateParsing),
    ("CertificateEncodingException", SystemErrorKind::CertificateEncoding),
    ("UnrecoverableKeyException", SystemErrorKind::UnrecoverableKey),
    ("KeyManagementException", SystemErrorKind::KeyManagement),
    ("NoSuchAlgorithmException", SystemErrorKind::NoSuchAlgorithm),
    ("KeyStoreException", SystemErrorKind::KeyStore),
    ("NoSuchProviderException", SystemErrorKind::NoSuchProvider),
    ("SignatureException", SystemErrorKind::Signature),
    ("InvalidKeySpecException", SystemErrorKind::InvalidKeySpec),
    ("NoRouteToHostException", SystemErrorKind::NoRouteToHost),
    ("URISyntaxException", SystemErrorKind::UriSyntax),
    ("MalformedURLException", SystemErrorKind::MalformedUrl),
    ("ProtocolException", SystemErrorKind::Protocol),
    ("CancellationException", SystemErrorKind::Cancellation),
    ("InterruptedException", SystemErrorKind::Interrupted),
    ("IllegalStateException", SystemErrorKind::IllegalState),
    ("UnsupportedOperationException", SystemErrorKind::UnsupportedOperation),
    ("IllegalArgumentException", SystemErrorKind::IllegalArgument),
];

impl SystemErrorKind {
    /// Parses the category name reported by the update job.
    pub fn from_name(name: &str) -> Self {
        KIND_NAMES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, kind)| kind.clone())
            .unwrap_or_else(|| Self::Other(name.to_string()))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Other(name) => name,
            known => KIND_NAMES
                .iter()
                .find(|(_, kind)| kind == known)
                .map(|(name, _)| *name)
                .unwrap_or("Exception"),
        }
    }
}

/// Why a background update of one manga failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateFailure {
    Http { code: u16 },
    UnknownHost { host: String },
    NoResults,
    SourceNotInstalled { source_id: SourceId },
    LicensedChapters,
    System {
        kind: SystemErrorKind,
        message: Option<String>,
    },
}

impl UpdateFailure {
    pub fn system(kind: SystemErrorKind, message: impl Into<String>) -> Self {
        Self::System {
            kind,
            message: Some(message.into()),
        }
    }
}

impl fmt::Display for UpdateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { code } => write!(f, "HTTP error {code}"),
            Self::UnknownHost { host } => write!(f, "UnknownHostException: {host}"),
            Self::NoResults => write!(f, "NoResultsException"),
            Self::SourceNotInstalled { source_id } => {
                write!(f, "SourceNotInstalledException: {source_id}")
            }
            Self::LicensedChapters => write!(f, "LicensedMangaChaptersException"),
            Self::System { kind, message } => match message {
                Some(message) => write!(f, "{}: {message}", kind.name()),
                None => write!(f, "{}", kind.name()),
            },
        }
    }
}

impl From<&io::Error> for UpdateFailure {
    fn from(err: &io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::ConnectionRefused => SystemErrorKind::Connect,
            io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => {
                SystemErrorKind::Socket
            }
            io::ErrorKind::AddrInUse | io::ErrorKind::AddrNotAvailable => SystemErrorKind::Bind,
            io::ErrorKind::TimedOut => SystemErrorKind::Timeout,
            io::ErrorKind::Interrupted => SystemErrorKind::InterruptedIo,
            io::ErrorKind::InvalidInput => SystemErrorKind::IllegalArgument,
            io::ErrorKind::Unsupported => SystemErrorKind::UnsupportedOperation,
            _ => SystemErrorKind::Io,
        };
        Self::system(kind, err.to_string())
    }
}

const OFFLINE: &str = "No network connection";

/// Formats a failure for display. Never fails.
pub fn classify(failure: &UpdateFailure, connectivity: &dyn Connectivity) -> String {
    match failure {
        UpdateFailure::Http { code } => format!("HTTP error {code}"),
        UpdateFailure::UnknownHost { host } => {
            if connectivity.is_online() {
                format!("Couldn't resolve host: {host}")
            } else {
                OFFLINE.to_string()
            }
        }
        UpdateFailure::NoResults => "No results found".to_string(),
        UpdateFailure::SourceNotInstalled { .. } => "Source not installed".to_string(),
        UpdateFailure::LicensedChapters => "Licensed - No chapters to show".to_string(),
        UpdateFailure::System { kind, message } => classify_system(kind, message, connectivity),
    }
}

fn classify_system(
    kind: &SystemErrorKind,
    message: &Option<String>,
    connectivity: &dyn Connectivity,
) -> String {
    use SystemErrorKind as K;

    let text = match kind {
        K::Generic => return message.clone().unwrap_or_else(|| kind.name().to_string()),
        K::Io if !connectivity.is_online() => OFFLINE,
        K::Io => "IO error",
        K::Socket => "Socket error",
        K::Connect => "Connection refused",
        K::Bind => "Failed to bind to local port",
        K::InterruptedIo => "IO operation interrupted",
        K::HttpRetry => "HTTP request needs to be retried",
        K::PortUnreachable => "Port unreachable",
        K::Timeout => "Operation timed out",
        K::Ssl => "SSL connection error",
        K::CertificateExpired => "SSL certificate has expired",
        K::CertificateNotYetValid => "SSL certificate is not yet valid",
        K::CertificateParsing => "Failed to parse SSL certificate",
        K::CertificateEncoding => "Failed to encode SSL certificate",
        K::UnrecoverableKey => "Unrecoverable key",
        K::KeyManagement => "Key management error",
        K::NoSuchAlgorithm => "Requested algorithm is not available",
        K::KeyStore => "Keystore error",
        K::NoSuchProvider => "Security provider is not available",
        K::Signature => "Signature validation failed",
        K::InvalidKeySpec => "Invalid key specification",
        K::NoRouteToHost => "No route to host",
        K::UriSyntax => "Invalid URI syntax",
        K::MalformedUrl => "Malformed URL",
        K::Protocol => "Protocol error or unsupported proxy type",
        K::Cancellation => "Operation cancelled",
        K::Interrupted => "Operation interrupted",
        K::IllegalState => "Unexpected state",
        K::UnsupportedOperation => "Operation not supported",
        K::IllegalArgument => "Invalid argument",
        K::Other(name) => {
            return format!("{name}: {}", message.as_deref().unwrap_or("null"));
        }
    };
    text.to_string()
}
