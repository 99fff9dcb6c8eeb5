//! Provider resolution: find a provider, wrap it, ask for accounts.

use crate::address::Address;
use crate::client::{parse_accounts, Web3Client};
use crate::config::ResolverConfig;
use crate::environment::Environment;
use crate::provider::{InjectedProvider, ProviderSource};
use crate::timeout::with_timeout;
use futures::future::{self, FutureExt, LocalBoxFuture, Shared};
use serde::{Deserialize, Serialize};
use std::fmt;
use web3_probe_error::{Result, Web3Error};

/// Result of the account authorization step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    /// The user granted access to these accounts
    Authorized(Vec<Address>),
    /// The request failed; the cause is kept for inspection
    Declined(Web3Error),
    /// No request was made (legacy provider, or disabled by config)
    NotRequested,
    /// No provider to ask
    Unavailable,
}

impl Authorization {
    /// True if access was granted
    pub fn is_authorized(&self) -> bool {
        matches!(self, Authorization::Authorized(_))
    }

    /// Granted accounts; empty unless authorized
    pub fn accounts(&self) -> &[Address] {
        match self {
            Authorization::Authorized(accounts) => accounts,
            _ => &[],
        }
    }

    /// Why the request was declined
    pub fn cause(&self) -> Option<&Web3Error> {
        match self {
            Authorization::Declined(cause) => Some(cause),
            _ => None,
        }
    }
}

/// Terminal state of a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionOutcome {
    /// Modern injected provider wrapped
    InjectedConnected,
    /// Legacy provider wrapped
    LegacyConnected,
    /// Nothing found
    NoProvider,
}

impl ResolutionOutcome {
    /// Stable camelCase name, as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionOutcome::InjectedConnected => "injectedConnected",
            ResolutionOutcome::LegacyConnected => "legacyConnected",
            ResolutionOutcome::NoProvider => "noProvider",
        }
    }
}

impl fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a resolution produced: at most one handle plus the authorization result.
#[derive(Debug, Clone)]
pub struct Resolution<P> {
    client: Option<Web3Client<P>>,
    authorization: Authorization,
}

impl<P: InjectedProvider> Resolution<P> {
    fn unavailable() -> Self {
        Self {
            client: None,
            authorization: Authorization::Unavailable,
        }
    }

    /// The handle, if a provider was found
    pub fn client(&self) -> Option<&Web3Client<P>> {
        self.client.as_ref()
    }

    /// Consumes the resolution, returning the handle
    pub fn into_client(self) -> Option<Web3Client<P>> {
        self.client
    }

    /// Result of the authorization step
    pub fn authorization(&self) -> &Authorization {
        &self.authorization
    }

    /// Which terminal state was reached
    pub fn outcome(&self) -> ResolutionOutcome {
        match self.client.as_ref().map(Web3Client::source) {
            Some(ProviderSource::Injected) => ResolutionOutcome::InjectedConnected,
            Some(ProviderSource::Legacy) => ResolutionOutcome::LegacyConnected,
            None => ResolutionOutcome::NoProvider,
        }
    }
}

/// A handle available right away, with authorization still in flight.
///
/// The authorization future is shared: every clone of the connection, and
/// every call to [`Connection::authorization`], observes the same single
/// request. Nothing drives it until it is first polled.
#[derive(Clone)]
pub struct Connection<P> {
    client: Option<Web3Client<P>>,
    authorization: Shared<LocalBoxFuture<'static, Authorization>>,
}

impl<P: InjectedProvider + Clone> Connection<P> {
    /// The handle, if a provider was found
    pub fn client(&self) -> Option<&Web3Client<P>> {
        self.client.as_ref()
    }

    /// Which terminal state was reached
    pub fn outcome(&self) -> ResolutionOutcome {
        match self.client.as_ref().map(Web3Client::source) {
            Some(ProviderSource::Injected) => ResolutionOutcome::InjectedConnected,
            Some(ProviderSource::Legacy) => ResolutionOutcome::LegacyConnected,
            None => ResolutionOutcome::NoProvider,
        }
    }

    /// Resolves once the wallet answers (or the timeout fires)
    pub fn authorization(&self) -> Shared<LocalBoxFuture<'static, Authorization>> {
        self.authorization.clone()
    }

    /// The authorization result, if it has already settled
    pub fn settled_authorization(&self) -> Option<Authorization> {
        self.authorization.peek().cloned()
    }

    /// Waits for authorization and collapses into a [`Resolution`]
    pub async fn into_resolution(self) -> Resolution<P> {
        let authorization = self.authorization.await;
        Resolution {
            client: self.client,
            authorization,
        }
    }
}

impl<P> fmt::Debug for Connection<P>
where
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("client", &self.client)
            .field("authorization", &self.authorization.peek())
            .finish()
    }
}

/// Resolves the provider exposed by an [`Environment`].
#[derive(Debug, Clone, Default)]
pub struct ProviderResolver {
    config: ResolverConfig,
}

impl ProviderResolver {
    /// Creates a resolver after validating `config`
    pub fn new(config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Looks for a provider without asking for accounts.
    ///
    /// A modern injected provider wins over a legacy one. When neither is
    /// present the install hint is logged and `None` returned.
    pub fn detect<E: Environment>(&self, env: &E) -> Option<Web3Client<E::Provider>> {
        if let Some(provider) = env.injected_provider() {
            tracing::info!(metamask = provider.is_metamask(), "Injected provider detected");
            return Some(Web3Client::new(provider, ProviderSource::Injected));
        }

        if let Some(provider) = env.legacy_provider() {
            tracing::info!("Legacy web3 provider detected");
            return Some(Web3Client::new(provider, ProviderSource::Legacy));
        }

        tracing::info!("{}", self.config.install_hint);
        None
    }

    /// Asks the wallet behind `client` for account access.
    ///
    /// Never fails: every error becomes [`Authorization::Declined`] and is
    /// logged.
    pub async fn authorize<E: Environment>(
        &self,
        env: &E,
        client: &Web3Client<E::Provider>,
    ) -> Authorization {
        let attempt = self.request_access(client);
        let result = match self.config.authorization_timeout() {
            Some(limit) => with_timeout(limit, "eth_requestAccounts", env.delay(limit), attempt)
                .await
                .and_then(|granted| granted),
            None => attempt.await,
        };

        match result {
            Ok(accounts) => {
                tracing::info!(accounts = accounts.len(), "Account access granted");
                Authorization::Authorized(accounts)
            }
            Err(cause) => {
                tracing::error!(error = %cause, "User denied account access");
                Authorization::Declined(cause)
            }
        }
    }

    /// Detects a provider and, for an injected one, requests account access.
    ///
    /// The handle is built before the request, so it survives a refusal.
    pub async fn resolve<E: Environment>(&self, env: &E) -> Resolution<E::Provider> {
        let Some(client) = self.detect(env) else {
            return Resolution::unavailable();
        };

        let authorization = match client.source() {
            ProviderSource::Injected if self.config.request_accounts => {
                self.authorize(env, &client).await
            }
            _ => Authorization::NotRequested,
        };

        Resolution {
            client: Some(client),
            authorization,
        }
    }

    /// Like [`resolve`](Self::resolve), but hands back the client before the
    /// wallet prompt is answered.
    pub fn connect<E>(&self, env: &E) -> Connection<E::Provider>
    where
        E: Environment + Clone + 'static,
        E::Provider: 'static,
    {
        let client = self.detect(env);

        let authorization = match &client {
            None => future::ready(Authorization::Unavailable).boxed_local(),
            Some(client)
                if client.source() == ProviderSource::Injected && self.config.request_accounts =>
            {
                let resolver = self.clone();
                let env = env.clone();
                let client = client.clone();
                async move { resolver.authorize(&env, &client).await }.boxed_local()
            }
            Some(_) => future::ready(Authorization::NotRequested).boxed_local(),
        };

        Connection {
            client,
            authorization: authorization.shared(),
        }
    }

    async fn request_access<P: InjectedProvider>(
        &self,
        client: &Web3Client<P>,
    ) -> Result<Vec<Address>> {
        match client.request_accounts().await {
            Err(err) if err.is_unsupported_method() && self.config.legacy_enable_fallback => {
                tracing::debug!("eth_requestAccounts unsupported, falling back to enable()");
                let raw = client.provider().enable().await?;
                parse_accounts(&raw)
            }
            other => other,
        }
    }
}

/// Resolves `env` with the default configuration
pub async fn resolve<E: Environment>(env: &E) -> Resolution<E::Provider> {
    ProviderResolver::default().resolve(env).await
}
