//! User-Agent string sent with every archive request.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/archive-mirror";

/// Default User-Agent for archive requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("archive-mirror/{version} (+{PROJECT_UA_URL})")
}
