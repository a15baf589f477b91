//! Circle lookup capability.
//!
//! Whether circles can be resolved is decided once per request and carried
//! as a `CircleLookup` value; the privileged session around a batch of
//! lookups is a guard that closes the session when dropped.

use crate::error::ResolveError;
use crate::platform::MembershipResolver;

/// Circle resolution as available for the current request.
#[derive(Clone, Copy)]
pub enum CircleLookup<'a> {
    Enabled(&'a dyn MembershipResolver),
    Disabled,
}

impl<'a> CircleLookup<'a> {
    /// Pick the capability from the host's feature switch and the optional
    /// resolver.
    pub fn select(enabled: bool, resolver: Option<&'a dyn MembershipResolver>) -> Self {
        match (enabled, resolver) {
            (true, Some(resolver)) => CircleLookup::Enabled(resolver),
            _ => CircleLookup::Disabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, CircleLookup::Enabled(_))
    }

    /// Open a privileged session if circles are enabled. The session ends
    /// when the returned guard is dropped.
    pub fn session(&self) -> Option<CircleSession<'a>> {
        match self {
            CircleLookup::Enabled(resolver) => Some(CircleSession::start(*resolver)),
            CircleLookup::Disabled => None,
        }
    }
}

/// Open privileged session on a `MembershipResolver`.
pub struct CircleSession<'a> {
    resolver: &'a dyn MembershipResolver,
}

impl<'a> CircleSession<'a> {
    pub fn start(resolver: &'a dyn MembershipResolver) -> Self {
        resolver.start_session();
        log::debug!("CIRCLE_SESSION_STARTED");
        Self { resolver }
    }

    pub fn display_name(&self, circle_id: &str) -> Result<String, ResolveError> {
        self.resolver.display_name_for_circle(circle_id)
    }
}

impl Drop for CircleSession<'_> {
    fn drop(&mut self) {
        self.resolver.stop_session();
        log::debug!("CIRCLE_SESSION_STOPPED");
    }
}
