//! Translate EOS home-area paths into XRootD URLs for HTCondor output transfer.

use std::sync::LazyLock;

use regex::Regex;

/// XRootD endpoint serving the EOS user areas.
pub const EOS_USER_ENDPOINT: &str = "root://eosuser.cern.ch";

// Accepts /eos/user/b/bejones/..., /eos/home-b/bejones/... and /eos/home-io3/b/bejones/...
static EOS_HOME_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/eos/(?:home|user)(?:-\w+)?(?:/\w)?/(?P<username>\w+)(?P<path>/.+)$")
        .expect("valid EOS home path regex")
});

/// Return the XRootD URL for an EOS home-area path, or `None` when the path
/// does not follow the EOS home convention.
///
/// The fan-out letter of the result always comes from the username, whatever
/// letter or zone suffix the input used.
pub fn resolve(eos_path: &str) -> Option<String> {
    let captures = EOS_HOME_PATH.captures(eos_path)?;
    let username = captures.name("username")?.as_str();
    let path = captures.name("path")?.as_str();
    let initial = username.chars().next()?;

    Some(format!("{}//eos/user/{}/{}{}", EOS_USER_ENDPOINT, initial, username, path))
}
