//! Identity and authorization
//!
//! Requests carry an optional bearer token. A missing token is a guest
//! checkout; a token that is present but does not verify is rejected. The
//! order lifecycle only ever sees the resolved [`AuthContext`], never the raw
//! credentials.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::core::error::OrderError;

/// Role carried by an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

/// A verified user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

impl Identity {
    pub fn customer(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Customer,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Admin,
        }
    }
}

/// Authorization context resolved for a request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthContext {
    /// No credentials supplied
    #[default]
    Guest,

    /// Bearer token verified
    User(Identity),
}

impl AuthContext {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthContext::User(identity) => Some(identity),
            AuthContext::Guest => None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.identity().map(|i| i.user_id.as_str())
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, AuthContext::User(Identity { role: Role::Admin, .. }))
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::User(_))
    }
}

/// Authorization policy for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Guests allowed
    Public,

    /// Any verified identity
    Authenticated,

    AdminOnly,
}

impl AuthPolicy {
    /// Check if auth context satisfies this policy
    pub fn check(&self, context: &AuthContext) -> bool {
        match self {
            AuthPolicy::Public => true,
            AuthPolicy::Authenticated => context.is_authenticated(),
            AuthPolicy::AdminOnly => context.is_admin(),
        }
    }

    /// Parse policy from string (for YAML config)
    pub fn parse_policy(s: &str) -> Result<Self, AuthError> {
        match s.trim() {
            "public" => Ok(AuthPolicy::Public),
            "authenticated" => Ok(AuthPolicy::Authenticated),
            "admin_only" => Ok(AuthPolicy::AdminOnly),
            other => Err(AuthError::UnknownPolicy(other.to_string())),
        }
    }

    /// Enforce the policy, distinguishing "who are you" from "not allowed"
    pub fn enforce(&self, context: &AuthContext) -> Result<(), OrderError> {
        if self.check(context) {
            return Ok(());
        }
        match context {
            AuthContext::Guest => Err(OrderError::Unauthorized {
                message: "authentication required".to_string(),
            }),
            AuthContext::User(_) => Err(OrderError::Forbidden {
                message: "insufficient privileges".to_string(),
            }),
        }
    }
}

/// Operations exposed over HTTP, keyed the same way as `auth.policies`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    PlaceOrder,
    ListOrders,
    GetOrder,
    OrdersByStatus,
    MyOrders,
    UpdateStatus,
    DeleteOrder,
    Stats,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::PlaceOrder,
        Operation::ListOrders,
        Operation::GetOrder,
        Operation::OrdersByStatus,
        Operation::MyOrders,
        Operation::UpdateStatus,
        Operation::DeleteOrder,
        Operation::Stats,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s.trim())
    }

    /// Policy applied when `auth.policies` does not name the operation
    pub fn default_policy(&self) -> AuthPolicy {
        match self {
            Operation::PlaceOrder | Operation::GetOrder => AuthPolicy::Public,
            Operation::MyOrders => AuthPolicy::Authenticated,
            Operation::ListOrders
            | Operation::OrdersByStatus
            | Operation::UpdateStatus
            | Operation::DeleteOrder
            | Operation::Stats => AuthPolicy::AdminOnly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::PlaceOrder => "place_order",
            Operation::ListOrders => "list_orders",
            Operation::GetOrder => "get_order",
            Operation::OrdersByStatus => "orders_by_status",
            Operation::MyOrders => "my_orders",
            Operation::UpdateStatus => "update_status",
            Operation::DeleteOrder => "delete_order",
            Operation::Stats => "stats",
        }
    }
}

/// Per-operation policy table
#[derive(Debug, Clone)]
pub struct AuthPolicies {
    policies: HashMap<Operation, AuthPolicy>,
}

impl Default for AuthPolicies {
    fn default() -> Self {
        let policies = Operation::ALL
            .into_iter()
            .map(|op| (op, op.default_policy()))
            .collect();
        Self { policies }
    }
}

impl AuthPolicies {
    /// Build from the `auth.policies` config map
    ///
    /// Unlisted operations keep [`Operation::default_policy`]. Unknown
    /// operation names and policy values are errors. `my_orders` is never
    /// weaker than `authenticated`, since it has no meaning for a guest.
    pub fn from_config(raw: &HashMap<String, String>) -> Result<Self, AuthError> {
        let mut table = Self::default();
        for (key, value) in raw {
            let op = Operation::parse(key)
                .ok_or_else(|| AuthError::UnknownOperation(key.clone()))?;
            let policy = match (op, AuthPolicy::parse_policy(value)?) {
                (Operation::MyOrders, AuthPolicy::Public) => AuthPolicy::Authenticated,
                (_, p) => p,
            };
            table.policies.insert(op, policy);
        }
        Ok(table)
    }

    pub fn policy_for(&self, op: Operation) -> AuthPolicy {
        self.policies
            .get(&op)
            .copied()
            .unwrap_or_else(|| op.default_policy())
    }

    pub fn enforce(&self, op: Operation, context: &AuthContext) -> Result<(), OrderError> {
        self.policy_for(op).enforce(context)
    }
}

// =============================================================================
// Identity providers
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("could not issue token: {0}")]
    Issue(String),

    #[error("unknown operation '{0}' in auth.policies")]
    UnknownOperation(String),

    #[error("unknown auth policy '{0}' (expected public, authenticated or admin_only)")]
    UnknownPolicy(String),
}

impl From<AuthError> for OrderError {
    fn from(err: AuthError) -> Self {
        OrderError::Unauthorized {
            message: err.to_string(),
        }
    }
}

/// Resolves bearer tokens into identities
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Rejects every token; guests only
pub struct NoIdentityProvider;

#[async_trait]
impl IdentityProvider for NoIdentityProvider {
    async fn resolve(&self, _token: &str) -> Result<Identity, AuthError> {
        Err(AuthError::InvalidToken(
            "no identity provider configured".to_string(),
        ))
    }
}

/// JWT claims: `{ id, role, exp }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    #[serde(default)]
    pub role: Role,
    pub exp: u64,
}

/// HS256 shared-secret JWT verification
#[derive(Clone)]
pub struct JwtIdentityProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a token for an identity, valid for `ttl`
    pub fn issue(&self, identity: &Identity, ttl: Duration) -> Result<String, AuthError> {
        let claims = Claims {
            id: identity.user_id.clone(),
            role: identity.role,
            exp: (chrono::Utc::now().timestamp().max(0) as u64) + ttl.as_secs(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Issue(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if data.claims.id.trim().is_empty() {
            return Err(AuthError::InvalidToken("empty subject".to_string()));
        }
        Ok(Identity {
            user_id: data.claims.id,
            role: data.claims.role,
        })
    }
}

/// Extract the bearer token from the `Authorization` header
///
/// Returns `Ok(None)` when the header is absent and an error when it is
/// present but not a bearer credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidToken("malformed Authorization header".to_string()))?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(Some(token.trim()))
        }
        _ => Err(AuthError::InvalidToken(
            "expected 'Bearer <token>'".to_string(),
        )),
    }
}

/// Resolve the auth context for a request
pub async fn resolve_context(
    provider: &dyn IdentityProvider,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    match bearer_token(headers)? {
        None => Ok(AuthContext::Guest),
        Some(token) => provider.resolve(token).await.map(AuthContext::User),
    }
}
