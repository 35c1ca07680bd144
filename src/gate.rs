//! The access gate: one ordered decision table for every guarded route.
//!
//! The gate is a pure function of the caller's identity snapshot and the requested
//! path. It performs no I/O and holds no mutable state, so it is evaluated fresh for
//! every request by the middleware in `lib.rs`.

use crate::auth::{Identity, Role};

/// GateDecision
///
/// The three outcomes of a gate evaluation. Turning `RedirectTo` into a redirect
/// response and `Unauthorized` into a 401 is the job of the calling layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectTo(String),
    Unauthorized,
}

/// RouteClass
///
/// Classification of a requested path against the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Admin,
    NgoVerification,
    NgoGeneral,
    OtherAuthenticated,
}

/// RouteTable
///
/// Static routing configuration read by the gate. Public routes are matched exactly;
/// the admin and NGO areas are matched by whole path segments.
#[derive(Debug, Clone)]
pub struct RouteTable {
    pub public: Vec<String>,
    pub admin_prefix: String,
    pub ngo_prefix: String,
    pub admin_login: String,
    pub ngo_verification: String,
    pub home: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            public: [
                "/ngo/login",
                "/ngo/register",
                "/ngo/forgot-password",
                "/ngo/reset-password",
                "/admin/login",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            admin_prefix: "/admin".to_string(),
            ngo_prefix: "/ngo".to_string(),
            admin_login: "/admin/login".to_string(),
            ngo_verification: "/ngo/verification".to_string(),
            home: "/".to_string(),
        }
    }
}

/// has_segment_prefix
///
/// Case-sensitive, segment-aligned prefix test: `/admin` matches `/admin` and
/// `/admin/stats`, but not `/administrative`.
fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl RouteTable {
    pub fn is_public(&self, path: &str) -> bool {
        self.public.iter().any(|p| p == path)
    }

    /// Whether the gate is responsible for this path at all. Paths outside the admin
    /// and NGO areas are left to per-handler extractors.
    pub fn guards(&self, path: &str) -> bool {
        has_segment_prefix(path, &self.admin_prefix) || has_segment_prefix(path, &self.ngo_prefix)
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        if self.is_public(path) {
            RouteClass::Public
        } else if has_segment_prefix(path, &self.admin_prefix) {
            RouteClass::Admin
        } else if path == self.ngo_verification {
            RouteClass::NgoVerification
        } else if has_segment_prefix(path, &self.ngo_prefix) {
            RouteClass::NgoGeneral
        } else {
            RouteClass::OtherAuthenticated
        }
    }
}

/// AccessGate
///
/// Holds the route table and the reserved admin address. Admin access is decided by
/// email equality, never by a stored role.
#[derive(Debug, Clone)]
pub struct AccessGate {
    routes: RouteTable,
    admin_email: String,
}

impl AccessGate {
    pub fn new(routes: RouteTable, admin_email: impl Into<String>) -> Self {
        Self {
            routes,
            admin_email: admin_email.into(),
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    /// evaluate
    ///
    /// First match wins:
    /// 1. public path -> Allow
    /// 2. no identity -> Unauthorized
    /// 3. admin area -> Allow for the reserved address, otherwise redirect to admin login
    /// 4. NGO area -> non-NGOs go home; verified NGOs pass; unverified NGOs only reach
    ///    the verification route and are redirected there from anywhere else
    /// 5. anything else -> Allow
    pub fn evaluate(&self, identity: Option<&Identity>, path: &str) -> GateDecision {
        let class = self.routes.classify(path);

        if class == RouteClass::Public {
            return GateDecision::Allow;
        }

        let Some(identity) = identity else {
            return GateDecision::Unauthorized;
        };

        match class {
            RouteClass::Admin => {
                if identity.email == self.admin_email {
                    GateDecision::Allow
                } else {
                    GateDecision::RedirectTo(self.routes.admin_login.clone())
                }
            }
            RouteClass::NgoVerification | RouteClass::NgoGeneral => {
                if identity.role != Role::Ngo {
                    GateDecision::RedirectTo(self.routes.home.clone())
                } else if identity.is_verified || class == RouteClass::NgoVerification {
                    GateDecision::Allow
                } else {
                    GateDecision::RedirectTo(self.routes.ngo_verification.clone())
                }
            }
            RouteClass::Public | RouteClass::OtherAuthenticated => GateDecision::Allow,
        }
    }
}
