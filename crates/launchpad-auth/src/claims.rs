use serde::{Deserialize, Serialize};

/// Claims asserted by a service identity token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceClaims {
    /// Calling service
    pub service_name: String,

    /// Issuer; always the calling service for tokens minted here
    pub iss: String,

    /// Issued at (unix seconds)
    pub iat: i64,

    /// Not before (unix seconds)
    pub nbf: i64,

    /// Expires at (unix seconds)
    pub exp: i64,
}
