/*!
 * Institutional gateway passthrough.
 *
 * A gateway authenticates a browser session against an institutional proxy
 * and hands back a URL rewriter that maps a journal's canonical host to the
 * proxied host. A gateway with no rule for a journal is a no-op passthrough:
 * unchanged session, identity rewriter, and a diagnostic log line.
 *
 * Credentials resolve from explicit parameters first, then from environment
 * variables named `RONYAKU_GATEWAY_<GATEWAY>_<KEY>` (a key=value credentials
 * file can be loaded into the environment at startup). A required credential
 * that resolves nowhere is an error raised before any network call.
 */

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use log::{info, warn};
use once_cell::sync::Lazy;
use url::Url;

use crate::errors::GatewayError;
use crate::session::BrowserSession;

/// Credential store: explicit key/value pairs with environment fallback.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    explicit: HashMap<String, String>,
}

impl Credentials {
    pub fn new() -> Self {
        Credentials::default()
    }

    /// Build from explicit `key=value` pairs (e.g. CLI `--credential` args).
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Credentials {
            explicit: pairs.iter().cloned().collect(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.explicit.insert(key.into(), value.into());
    }

    /// Environment variable name for a gateway credential key.
    pub fn env_name(gateway_id: &str, key: &str) -> String {
        format!(
            "RONYAKU_GATEWAY_{}_{}",
            gateway_id.to_uppercase(),
            key.to_uppercase()
        )
    }

    /// Resolve a credential: explicit value first, environment second.
    pub fn get(&self, gateway_id: &str, key: &str) -> Option<String> {
        self.explicit
            .get(key)
            .cloned()
            .or_else(|| std::env::var(Self::env_name(gateway_id, key)).ok())
    }

    /// Load a key=value credentials file into the process environment.
    /// A missing file is not an error; the store is optional.
    pub fn load_file(path: &Path) {
        if !path.exists() {
            return;
        }
        if let Err(e) = dotenvy::from_path(path) {
            warn!("could not read credentials file {}: {}", path.display(), e);
        }
    }
}

/// One step of a gateway authentication flow.
#[derive(Debug, Clone)]
pub enum FormAction {
    /// Fill the form field with DOM id `.0` using the credential named `.1`
    Fill(&'static str, &'static str),
    /// Click the element with DOM id `.0`
    Click(&'static str),
}

/// Deterministic host substitution produced by a gateway passthrough.
/// Applying the rewriter twice has no additional effect.
#[derive(Debug, Clone, Default)]
pub struct UrlRewriter {
    rule: Option<(String, String)>,
}

impl UrlRewriter {
    /// Rewriter that returns every URL unchanged.
    pub fn identity() -> Self {
        UrlRewriter { rule: None }
    }

    /// Rewriter that swaps `canonical_host` for `proxied_host`.
    pub fn host_swap(canonical_host: &str, proxied_host: &str) -> Self {
        UrlRewriter {
            rule: Some((canonical_host.to_string(), proxied_host.to_string())),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.rule.is_none()
    }

    /// Apply the rewrite. URLs on other hosts, unparsable URLs and URLs
    /// already on the proxied host pass through unchanged.
    pub fn rewrite(&self, url: &str) -> String {
        let Some((canonical, proxied)) = &self.rule else {
            return url.to_string();
        };
        let Ok(mut parsed) = Url::parse(url) else {
            return url.to_string();
        };
        match parsed.host_str() {
            Some(host) if host == canonical => {
                if parsed.set_host(Some(proxied)).is_err() {
                    return url.to_string();
                }
                parsed.to_string()
            }
            _ => url.to_string(),
        }
    }
}

/// An institutional proxy/authentication layer.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Canonical gateway identifier (e.g. `"utokyo"`).
    fn id(&self) -> &'static str;

    /// Credential keys the authentication flow needs.
    fn required_credentials(&self) -> &'static [&'static str];

    /// Login page URL and the ordered form actions to run there.
    fn auth_flow(&self) -> Option<(&'static str, &'static [FormAction])> {
        None
    }

    /// (canonical host, proxied host) for a journal, if this gateway has a
    /// specialized rule for it.
    fn rewrite_rule(&self, journal_id: &str) -> Option<(&'static str, &'static str)>;

    /// Authenticate the session and produce the URL rewriter for
    /// `journal_id`. The default implementation covers every gateway:
    /// rule-less journals pass through untouched, rule-bearing journals run
    /// the auth flow after the credential check.
    async fn passthrough(
        &self,
        session: &mut dyn BrowserSession,
        journal_id: &str,
        credentials: &Credentials,
    ) -> Result<UrlRewriter, GatewayError> {
        let Some((canonical, proxied)) = self.rewrite_rule(journal_id) else {
            info!(
                "gateway '{}' has no specialized handling for journal '{}'; passing through",
                self.id(),
                journal_id
            );
            return Ok(UrlRewriter::identity());
        };

        // Credential check happens before any network call.
        let missing: Vec<String> = self
            .required_credentials()
            .iter()
            .filter(|key| credentials.get(self.id(), key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(GatewayError::MissingCredentials {
                gateway: self.id().to_string(),
                keys: missing,
            });
        }

        if let Some((login_url, actions)) = self.auth_flow() {
            session.navigate(login_url).await?;
            for action in actions {
                match action {
                    FormAction::Fill(field_id, key) => {
                        let value = credentials.get(self.id(), key).unwrap_or_default();
                        if !session.fill_field(field_id, &value).await? {
                            // A field that no longer exists must not abort
                            // authentication.
                            warn!(
                                "gateway '{}': form field '{}' not found, skipping",
                                self.id(),
                                field_id
                            );
                        }
                    }
                    FormAction::Click(element_id) => {
                        if !session.click(element_id).await? {
                            warn!(
                                "gateway '{}': control '{}' not found, skipping",
                                self.id(),
                                element_id
                            );
                        }
                    }
                }
            }
        }
        Ok(UrlRewriter::host_swap(canonical, proxied))
    }
}

/// Gateway used when no proxying is wanted: identity for every journal.
pub struct UselessGateway;

#[async_trait]
impl Gateway for UselessGateway {
    fn id(&self) -> &'static str {
        "useless"
    }

    fn required_credentials(&self) -> &'static [&'static str] {
        &[]
    }

    fn rewrite_rule(&self, _journal_id: &str) -> Option<(&'static str, &'static str)> {
        None
    }
}

/// EZproxy-style gateway of the University of Tokyo library.
pub struct UTokyoGateway;

impl UTokyoGateway {
    const LOGIN_URL: &'static str = "https://utokyo.idm.oclc.org/login";
    const AUTH_ACTIONS: &'static [FormAction] = &[
        FormAction::Fill("userNameInput", "username"),
        FormAction::Fill("passwordInput", "password"),
        FormAction::Click("submitButton"),
    ];
}

#[async_trait]
impl Gateway for UTokyoGateway {
    fn id(&self) -> &'static str {
        "utokyo"
    }

    fn required_credentials(&self) -> &'static [&'static str] {
        &["username", "password"]
    }

    fn auth_flow(&self) -> Option<(&'static str, &'static [FormAction])> {
        Some((Self::LOGIN_URL, Self::AUTH_ACTIONS))
    }

    fn rewrite_rule(&self, journal_id: &str) -> Option<(&'static str, &'static str)> {
        match journal_id {
            "nature" => Some(("www.nature.com", "www-nature-com.utokyo.idm.oclc.org")),
            "sciencedirect" => Some((
                "www.sciencedirect.com",
                "www-sciencedirect-com.utokyo.idm.oclc.org",
            )),
            "springer" => Some((
                "link.springer.com",
                "link-springer-com.utokyo.idm.oclc.org",
            )),
            "wileyonlinelibrary" => Some((
                "onlinelibrary.wiley.com",
                "onlinelibrary-wiley-com.utokyo.idm.oclc.org",
            )),
            "ieee" => Some((
                "ieeexplore.ieee.org",
                "ieeexplore-ieee-org.utokyo.idm.oclc.org",
            )),
            "science" => Some(("www.science.org", "www-science-org.utokyo.idm.oclc.org")),
            _ => None,
        }
    }
}

static GATEWAYS: Lazy<HashMap<&'static str, Box<dyn Gateway>>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, Box<dyn Gateway>> = HashMap::new();
    map.insert("useless", Box::new(UselessGateway));
    map.insert("utokyo", Box::new(UTokyoGateway));
    map
});

/// Look up a gateway by identifier.
pub fn get(id: &str) -> Result<&'static dyn Gateway, GatewayError> {
    GATEWAYS
        .get(id.to_lowercase().as_str())
        .map(|g| g.as_ref())
        .ok_or_else(|| GatewayError::UnknownGateway(id.to_string()))
}

/// Identifiers of all registered gateways.
pub fn supported() -> Vec<&'static str> {
    let mut ids: Vec<_> = GATEWAYS.keys().copied().collect();
    ids.sort_unstable();
    ids
}
