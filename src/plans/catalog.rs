//! Plan reference data and the cap catalog.
//!
//! The catalog is the single source of truth for what each pricing tier
//! allows: per-tenant resource caps, the per-user workspace allowance, and
//! billing display data. Both the limit validator and the plan transition
//! path read from here, so the two can never drift apart.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Sentinel cap value meaning "no limit".
pub const UNLIMITED: i32 = -1;

/// The resource dimensions a plan's caps constrain.
///
/// A closed enum: an invalid resource kind is a compile-time error, not a
/// runtime branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceKind {
    /// Members of a tenant.
    User,
    /// Projects owned by a tenant.
    Project,
    /// Domains registered under a tenant.
    Domain,
    /// Source repositories linked to a tenant.
    Repo,
}

impl ResourceKind {
    /// Get the wire representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Project => "PROJECT",
            Self::Domain => "DOMAIN",
            Self::Repo => "REPO",
        }
    }

    /// All resource kinds, in a fixed order.
    #[must_use]
    pub fn all() -> [ResourceKind; 4] {
        [Self::User, Self::Project, Self::Domain, Self::Repo]
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing a resource kind string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResourceKindError {
    invalid_value: String,
}

impl fmt::Display for ParseResourceKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid resource kind: '{}' (expected: USER, PROJECT, DOMAIN, or REPO)",
            self.invalid_value
        )
    }
}

impl std::error::Error for ParseResourceKindError {}

impl FromStr for ResourceKind {
    type Err = ParseResourceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "PROJECT" => Ok(Self::Project),
            "DOMAIN" => Ok(Self::Domain),
            "REPO" => Ok(Self::Repo),
            _ => Err(ParseResourceKindError {
                invalid_value: s.to_string(),
            }),
        }
    }
}

/// Per-tenant resource caps. A value of [`UNLIMITED`] (`-1`) means no limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanCaps {
    pub max_users: i32,
    pub max_projects: i32,
    pub max_domains: i32,
    pub max_repos: i32,
}

impl PlanCaps {
    /// Build a caps set from explicit values.
    #[must_use]
    pub const fn new(max_users: i32, max_projects: i32, max_domains: i32, max_repos: i32) -> Self {
        Self {
            max_users,
            max_projects,
            max_domains,
            max_repos,
        }
    }

    /// Caps with every dimension unlimited.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self::new(UNLIMITED, UNLIMITED, UNLIMITED, UNLIMITED)
    }

    /// The fail-safe-low caps applied for unrecognized plan ids:
    /// one user, one project, nothing else.
    #[must_use]
    pub const fn minimal() -> Self {
        Self::new(1, 1, 0, 0)
    }

    /// Get the cap for a resource kind.
    #[must_use]
    pub fn cap(&self, kind: ResourceKind) -> i32 {
        match kind {
            ResourceKind::User => self.max_users,
            ResourceKind::Project => self.max_projects,
            ResourceKind::Domain => self.max_domains,
            ResourceKind::Repo => self.max_repos,
        }
    }

    /// Check whether the cap for a resource kind is unlimited.
    #[must_use]
    pub fn is_unlimited(&self, kind: ResourceKind) -> bool {
        self.cap(kind) == UNLIMITED
    }
}

/// A pricing tier: immutable reference data seeded once at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan identifier (e.g. "FREE", "PROFESSIONAL", "ENTERPRISE").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Marketing description.
    pub description: String,
    /// Monthly price in USD cents.
    pub monthly_price_usd_cents: u64,
    /// Monthly price in COP cents.
    pub monthly_price_cop_cents: u64,
    /// Per-tenant resource caps granted by this plan.
    pub caps: PlanCaps,
    /// How many workspaces a user on this plan may own ([`UNLIMITED`] = no limit).
    pub max_tenants: i32,
    /// Whether blockchain features are included.
    pub includes_blockchain: bool,
    /// Whether this is the recommended tier.
    pub recommended: bool,
}

/// The plan catalog.
///
/// Lookups are case-insensitive and resolve the legacy `PRO` alias to
/// `PROFESSIONAL`. Unknown ids are not an error: [`PlanCatalog::caps_for`]
/// falls back to [`PlanCaps::minimal`] with a warning, so a bad plan id can
/// never grant more than the smallest tier.
#[derive(Clone, Debug, Default)]
pub struct PlanCatalog {
    plans: HashMap<String, Plan>,
}

impl PlanCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog: FREE, PROFESSIONAL, and ENTERPRISE.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.add(Plan {
            id: "FREE".to_string(),
            name: "Free".to_string(),
            description: "Explore the platform. One seat, three projects, no workspaces of your own.".to_string(),
            monthly_price_usd_cents: 0,
            monthly_price_cop_cents: 0,
            caps: PlanCaps::new(1, 3, 0, 0),
            max_tenants: 0,
            includes_blockchain: false,
            recommended: false,
        });
        catalog.add(Plan {
            id: "PROFESSIONAL".to_string(),
            name: "Professional".to_string(),
            description: "For small and medium teams. Unlimited members and projects, five domains.".to_string(),
            monthly_price_usd_cents: 2_999,
            monthly_price_cop_cents: 12_000_000,
            caps: PlanCaps::new(UNLIMITED, UNLIMITED, 5, UNLIMITED),
            max_tenants: 3,
            includes_blockchain: true,
            recommended: true,
        });
        catalog.add(Plan {
            id: "ENTERPRISE".to_string(),
            name: "Enterprise".to_string(),
            description: "The full platform with extended limits and priority support.".to_string(),
            monthly_price_usd_cents: 9_999,
            monthly_price_cop_cents: 40_000_000,
            caps: PlanCaps::unlimited(),
            max_tenants: 6,
            includes_blockchain: true,
            recommended: false,
        });
        catalog
    }

    /// Add a plan to the catalog, replacing any plan with the same id.
    pub fn add(&mut self, plan: Plan) {
        self.plans.insert(plan.id.to_uppercase(), plan);
    }

    /// Look up a plan by id, case-insensitively, resolving legacy aliases.
    #[must_use]
    pub fn get(&self, plan_id: &str) -> Option<&Plan> {
        self.plans.get(&canonical_plan_id(plan_id))
    }

    /// Check whether a plan id resolves to a catalog entry.
    #[must_use]
    pub fn contains(&self, plan_id: &str) -> bool {
        self.get(plan_id).is_some()
    }

    /// Resolve the caps and blockchain flag a plan id grants.
    ///
    /// Unknown ids fall back to [`PlanCaps::minimal`] with a warning rather
    /// than failing: a tenant must never end up with more than the smallest
    /// tier because of a bad id.
    #[must_use]
    pub fn caps_for(&self, plan_id: &str) -> (PlanCaps, bool) {
        match self.get(plan_id) {
            Some(plan) => (plan.caps, plan.includes_blockchain),
            None => {
                warn!(plan_id, "Unknown plan id, applying minimal caps");
                (PlanCaps::minimal(), false)
            }
        }
    }

    /// How many workspaces a user on the given plan may own.
    ///
    /// Legacy tiers that no longer appear in the catalog (`BASIC`,
    /// `STANDARD`) still resolve here so existing users keep their
    /// allowance. Unknown plans get zero.
    #[must_use]
    pub fn max_tenants_for(&self, plan_id: &str) -> i32 {
        if let Some(plan) = self.get(plan_id) {
            return plan.max_tenants;
        }
        match plan_id.to_uppercase().as_str() {
            "BASIC" | "STANDARD" => 1,
            _ => 0,
        }
    }

    /// Number of plans in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Iterate over all plans.
    pub fn iter(&self) -> impl Iterator<Item = &Plan> {
        self.plans.values()
    }
}

/// Uppercase a plan id and resolve legacy aliases.
fn canonical_plan_id(plan_id: &str) -> String {
    let upper = plan_id.to_uppercase();
    match upper.as_str() {
        "PRO" => "PROFESSIONAL".to_string(),
        _ => upper,
    }
}
