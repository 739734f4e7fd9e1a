//! Redirect targets and the post-login routing decision.

use url::{Position, Url};

use crate::role::Role;

/// Query parameter carrying the login error indicator.
pub const ERROR_PARAM: &str = "error";

/// Reason attached to a login redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginErrorKind {
    /// The identity service is not configured.
    Configuration,
    /// The code exchange failed with this message.
    Exchange(String),
}

impl LoginErrorKind {
    /// Value of the `error` query parameter.
    #[must_use]
    pub fn as_query_value(&self) -> &str {
        match self {
            Self::Configuration => "configuration",
            Self::Exchange(message) => message,
        }
    }
}

/// Destination of a callback redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// `/login`
    Login,
    /// `/login?error=<kind>`
    LoginError(LoginErrorKind),
    /// `/clinician/register`
    ClinicianRegister,
    /// `/dashboard`
    Dashboard,
    /// `/privacy-agreement`
    PrivacyAgreement,
}

impl RedirectTarget {
    /// Path component of the target.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login | Self::LoginError(_) => "/login",
            Self::ClinicianRegister => "/clinician/register",
            Self::Dashboard => "/dashboard",
            Self::PrivacyAgreement => "/privacy-agreement",
        }
    }

    /// Builds the absolute redirect URL on `origin`.
    ///
    /// Any path or query on `origin` is discarded.
    #[must_use]
    pub fn to_url(&self, origin: &Url) -> Url {
        let mut url = origin.clone();
        url.set_path(self.path());
        url.set_query(None);
        url.set_fragment(None);
        if let Self::LoginError(kind) = self {
            url.query_pairs_mut()
                .append_pair(ERROR_PARAM, kind.as_query_value());
        }
        url
    }

    /// Path and query relative to the origin, e.g. `/login?error=configuration`.
    #[must_use]
    pub fn to_relative(&self, origin: &Url) -> String {
        self.to_url(origin)[Position::BeforePath..].to_string()
    }
}

/// Picks the destination for an authenticated user.
///
/// Clinicians always go to registration; the privacy flag only gates patients.
#[must_use]
pub fn decide(role: Role, privacy_agreed: bool) -> RedirectTarget {
    match role {
        Role::Clinician => RedirectTarget::ClinicianRegister,
        Role::Patient if privacy_agreed => RedirectTarget::Dashboard,
        Role::Patient => RedirectTarget::PrivacyAgreement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://portal.example.com").unwrap()
    }

    #[test]
    fn test_decide_clinician_ignores_privacy() {
        assert_eq!(decide(Role::Clinician, true), RedirectTarget::ClinicianRegister);
        assert_eq!(decide(Role::Clinician, false), RedirectTarget::ClinicianRegister);
    }

    #[test]
    fn test_decide_patient() {
        assert_eq!(decide(Role::Patient, true), RedirectTarget::Dashboard);
        assert_eq!(decide(Role::Patient, false), RedirectTarget::PrivacyAgreement);
    }

    #[test]
    fn test_to_url_paths() {
        let o = origin();
        assert_eq!(
            RedirectTarget::Login.to_url(&o).as_str(),
            "https://portal.example.com/login"
        );
        assert_eq!(
            RedirectTarget::ClinicianRegister.to_url(&o).as_str(),
            "https://portal.example.com/clinician/register"
        );
        assert_eq!(
            RedirectTarget::Dashboard.to_relative(&o),
            "/dashboard"
        );
        assert_eq!(
            RedirectTarget::PrivacyAgreement.to_relative(&o),
            "/privacy-agreement"
        );
    }

    #[test]
    fn test_login_error_query() {
        let o = origin();
        assert_eq!(
            RedirectTarget::LoginError(LoginErrorKind::Configuration).to_relative(&o),
            "/login?error=configuration"
        );
        assert_eq!(
            RedirectTarget::LoginError(LoginErrorKind::Exchange("invalid_grant".to_string()))
                .to_relative(&o),
            "/login?error=invalid_grant"
        );
    }

    #[test]
    fn test_login_error_message_is_encoded() {
        let target = RedirectTarget::LoginError(LoginErrorKind::Exchange(
            "code expired & reused".to_string(),
        ));
        assert_eq!(
            target.to_relative(&origin()),
            "/login?error=code+expired+%26+reused"
        );
    }

    #[test]
    fn test_to_url_discards_origin_path_and_query() {
        let o = Url::parse("http://localhost:3000/auth/callback?code=abc").unwrap();
        assert_eq!(
            RedirectTarget::Dashboard.to_url(&o).as_str(),
            "http://localhost:3000/dashboard"
        );
    }
}
