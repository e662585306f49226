//! Tenant manager.
//!
//! Owns the tenant lifecycle (creation gates, plan transitions,
//! suspend/activate) and the quota operations sibling services call before
//! and after creating dependent resources.

use super::error::{Result, TenantError};
use super::limits::{check_limit, denial_text};
use super::storage::{ReserveOutcome, TenantStore};
use super::types::{
    LimitDecision, ResourceUsage, SubscriptionState, Tenant, TenantKind, TenantStatus,
};
use crate::directory::{
    MembershipDirectory, PlanLookup, TenantGateway, TenantProvisioner, TenantSummary,
    UserPlanSource,
};
use crate::error::MoorageError;
use crate::events::{publish_best_effort, EventPublisher, TenantCreated, TenantPlanUpgraded};
use crate::plans::{PlanCatalog, ResourceKind, UNLIMITED};
use crate::util::current_timestamp;
use std::collections::HashSet;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Parameters for creating a tenant.
#[derive(Clone, Debug)]
pub struct NewTenant {
    /// Display name; also the basis for the slug.
    pub name: String,
    pub kind: TenantKind,
    /// Registered business name (required for business tenants).
    pub business_name: Option<String>,
    /// Tax identification number (required for business tenants).
    pub nit: Option<String>,
    /// Owner contact email; a placeholder is substituted when absent.
    pub owner_email: Option<String>,
}

impl NewTenant {
    /// A personal workspace with just a name.
    #[must_use]
    pub fn personal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TenantKind::Personal,
            business_name: None,
            nit: None,
            owner_email: None,
        }
    }
}

/// Fields that can be updated on an existing tenant.
#[derive(Clone, Debug, Default)]
pub struct TenantUpdate {
    pub name: Option<String>,
    pub business_name: Option<String>,
    pub nit: Option<String>,
}

/// Tenant manager - the quota/plan engine.
///
/// Composed over a [`TenantStore`], the plan catalog, the user-plan seam,
/// the membership directory, and an event publisher.
///
/// # Example
///
/// ```rust,ignore
/// use moorage::tenants::{TenantManager, NewTenant};
///
/// let manager = TenantManager::new(
///     tenant_store,
///     PlanCatalog::builtin(),
///     user_plans,
///     membership_directory,
///     event_publisher,
/// );
///
/// let tenant = manager
///     .create_tenant(NewTenant::personal("Acme"), owner_id)
///     .await?;
/// ```
#[derive(Clone)]
pub struct TenantManager<S, U, M, E>
where
    S: TenantStore,
    U: UserPlanSource,
    M: MembershipDirectory,
    E: EventPublisher,
{
    store: S,
    plans: PlanCatalog,
    user_plans: U,
    memberships: M,
    events: E,
}

impl<S, U, M, E> TenantManager<S, U, M, E>
where
    S: TenantStore,
    U: UserPlanSource,
    M: MembershipDirectory,
    E: EventPublisher,
{
    /// Create a new tenant manager.
    pub fn new(store: S, plans: PlanCatalog, user_plans: U, memberships: M, events: E) -> Self {
        Self {
            store,
            plans,
            user_plans,
            memberships,
            events,
        }
    }

    /// Get a reference to the tenant store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a reference to the plan catalog.
    pub fn plans(&self) -> &PlanCatalog {
        &self.plans
    }

    /// Create a tenant.
    ///
    /// Business tenants must carry a business name and a NIT that passes
    /// format and check-digit validation. The owner must be on a paid plan
    /// with workspace allowance to spare. The tenant starts without a plan,
    /// on minimal caps, waiting for a subscription purchase.
    #[instrument(skip(self, req), fields(owner_id = %owner_id))]
    pub async fn create_tenant(&self, req: NewTenant, owner_id: Uuid) -> Result<Tenant> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(TenantError::EmptyName);
        }

        if req.kind == TenantKind::Business {
            let business_ok = req
                .business_name
                .as_deref()
                .is_some_and(|n| !n.trim().is_empty());
            let nit_ok = req.nit.as_deref().is_some_and(|n| !n.trim().is_empty());
            if !business_ok || !nit_ok {
                return Err(TenantError::MissingBusinessFields);
            }
        }

        if let Some(nit) = req.nit.as_deref() {
            if !nit.trim().is_empty() {
                validate_nit(nit)?;
                if self.store.exists_by_nit(nit).await? {
                    return Err(TenantError::nit_taken(nit));
                }
            }
        }

        self.ensure_user_can_create(owner_id).await?;

        let slug = self.unique_slug(name, owner_id).await?;
        let owner_email = match req.owner_email {
            Some(email) if !email.trim().is_empty() => email,
            _ => {
                warn!(%owner_id, "Owner email not provided, using placeholder");
                format!("user-{}@placeholder.local", owner_id)
            }
        };

        let now = current_timestamp();
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug,
            kind: req.kind,
            owner_id,
            owner_email,
            business_name: req.business_name,
            nit: req.nit.filter(|n| !n.trim().is_empty()),
            // No plan until a subscription is purchased
            plan_id: None,
            subscription_state: SubscriptionState::Pending,
            status: TenantStatus::Active,
            caps: Tenant::new_tenant_caps(),
            blockchain_enabled: false,
            // The owner occupies the first seat
            usage: ResourceUsage {
                users: 1,
                ..ResourceUsage::default()
            },
            subscription_id: None,
            created_at: now,
            updated_at: now,
        };

        self.store.create(&tenant).await?;
        info!(tenant_id = %tenant.id, slug = %tenant.slug, "Tenant created");

        publish_best_effort(
            &self.events,
            TenantCreated::new(tenant.id, owner_id, tenant.name.clone(), tenant.slug.clone()),
        )
        .await;

        Ok(tenant)
    }

    /// Auto-create a personal workspace for a new user.
    #[instrument(skip(self, email))]
    pub async fn create_tenant_for_user(&self, user_id: Uuid, email: &str) -> Result<Tenant> {
        let local_part = email.split('@').next().unwrap_or("user");
        let req = NewTenant {
            name: format!("{}'s Workspace", local_part),
            kind: TenantKind::Personal,
            business_name: None,
            nit: None,
            owner_email: Some(email.to_string()),
        };
        self.create_tenant(req, user_id).await
    }

    /// Get a tenant by id.
    pub async fn get(&self, tenant_id: Uuid) -> Result<Tenant> {
        self.store
            .find_by_id(tenant_id)
            .await?
            .ok_or(TenantError::NotFound { tenant_id })
    }

    /// List active tenants owned by a user.
    pub async fn list_owned(&self, owner_id: Uuid) -> Result<Vec<Tenant>> {
        let tenants = self.store.list_by_owner(owner_id).await?;
        Ok(tenants
            .into_iter()
            .filter(|t| t.status == TenantStatus::Active)
            .collect())
    }

    /// List every tenant a user can access: owned plus member tenants.
    ///
    /// When the membership directory cannot answer, degrades to owned-only
    /// rather than failing the request.
    pub async fn list_all_for_user(&self, user_id: Uuid) -> Result<Vec<Tenant>> {
        let owned = self.list_owned(user_id).await?;

        let member_ids = match self.memberships.member_tenant_ids(user_id).await {
            Ok(ids) => ids,
            Err(err) => {
                warn!(%user_id, error = %err, "Could not fetch member tenants, returning owned only");
                Vec::new()
            }
        };

        let owned_ids: HashSet<Uuid> = owned.iter().map(|t| t.id).collect();
        let member_only: Vec<Uuid> = member_ids
            .into_iter()
            .filter(|id| !owned_ids.contains(id))
            .collect();

        let mut all = owned;
        if !member_only.is_empty() {
            let member_tenants = self.store.find_all_by_ids(&member_only).await?;
            all.extend(
                member_tenants
                    .into_iter()
                    .filter(|t| t.status != TenantStatus::Deleted),
            );
        }
        Ok(all)
    }

    /// Update tenant details. Owner-only.
    #[instrument(skip(self, update))]
    pub async fn update_tenant(
        &self,
        tenant_id: Uuid,
        update: TenantUpdate,
        actor_id: Uuid,
    ) -> Result<Tenant> {
        let mut tenant = self.get(tenant_id).await?;
        if tenant.owner_id != actor_id {
            return Err(TenantError::NotOwner);
        }

        if let Some(name) = update.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(TenantError::EmptyName);
            }
            tenant.name = name;
        }

        if let Some(business_name) = update.business_name {
            tenant.business_name = Some(business_name);
        }

        if let Some(nit) = update.nit {
            validate_nit(&nit)?;
            if tenant.nit.as_deref() != Some(nit.as_str()) && self.store.exists_by_nit(&nit).await?
            {
                return Err(TenantError::nit_taken(nit));
            }
            tenant.nit = Some(nit);
        }

        tenant.updated_at = current_timestamp();
        self.store.update(&tenant).await?;
        info!(%tenant_id, "Tenant updated");
        Ok(tenant)
    }

    /// Soft-delete a tenant. Owner-only.
    #[instrument(skip(self))]
    pub async fn delete_tenant(&self, tenant_id: Uuid, actor_id: Uuid) -> Result<()> {
        let mut tenant = self.get(tenant_id).await?;
        if tenant.owner_id != actor_id {
            return Err(TenantError::NotOwner);
        }

        tenant.status = TenantStatus::Deleted;
        tenant.updated_at = current_timestamp();
        self.store.update(&tenant).await?;
        info!(%tenant_id, "Tenant deleted");
        Ok(())
    }

    /// Suspend a tenant.
    #[instrument(skip(self))]
    pub async fn suspend(&self, tenant_id: Uuid, reason: &str) -> Result<()> {
        warn!(%tenant_id, reason, "Suspending tenant");
        let mut tenant = self.get(tenant_id).await?;
        tenant.status = TenantStatus::Suspended;
        tenant.updated_at = current_timestamp();
        self.store.update(&tenant).await?;
        Ok(())
    }

    /// Reactivate a suspended tenant.
    #[instrument(skip(self))]
    pub async fn activate(&self, tenant_id: Uuid) -> Result<()> {
        let mut tenant = self.get(tenant_id).await?;
        tenant.status = TenantStatus::Active;
        tenant.updated_at = current_timestamp();
        self.store.update(&tenant).await?;
        info!(%tenant_id, "Tenant activated");
        Ok(())
    }

    /// Apply a plan to a tenant: rewrite its caps from the catalog.
    ///
    /// Usage counters are never touched: a downgrade can leave a tenant
    /// over cap until resources are deleted; caps are not enforced
    /// retroactively.
    #[instrument(skip(self))]
    pub async fn apply_plan(&self, tenant_id: Uuid, plan_id: &str) -> Result<Tenant> {
        let mut tenant = self.get(tenant_id).await?;
        self.apply_caps(&mut tenant, plan_id);
        self.store.update(&tenant).await?;
        info!(%tenant_id, plan_id, "Plan applied, new limits in effect");
        Ok(tenant)
    }

    /// Apply a purchased plan: caps, subscription linkage, and activation.
    ///
    /// Called when a payment-succeeded event is consumed.
    #[instrument(skip(self))]
    pub async fn upgrade_plan(
        &self,
        tenant_id: Uuid,
        plan_id: &str,
        subscription_id: Uuid,
    ) -> Result<Tenant> {
        let mut tenant = self.get(tenant_id).await?;
        self.apply_caps(&mut tenant, plan_id);
        tenant.subscription_id = Some(subscription_id);
        tenant.subscription_state = SubscriptionState::Active;
        self.store.update(&tenant).await?;
        info!(%tenant_id, plan_id, %subscription_id, "Tenant upgraded");

        publish_best_effort(
            &self.events,
            TenantPlanUpgraded::new(tenant_id, plan_id.to_string(), subscription_id),
        )
        .await;

        Ok(tenant)
    }

    /// Advisory limit check for a proposed resource count.
    ///
    /// No side effects; the mutation path must go through
    /// [`TenantManager::reserve_resource`], which re-checks atomically.
    pub async fn validate_limit(
        &self,
        tenant_id: Uuid,
        kind: ResourceKind,
        proposed: u32,
    ) -> Result<LimitDecision> {
        let tenant = self.get(tenant_id).await?;
        Ok(check_limit(
            &tenant.caps,
            kind,
            tenant.usage.get(kind),
            proposed,
        ))
    }

    /// Atomically claim one unit of a resource, erroring when the cap is
    /// full.
    pub async fn reserve_resource(&self, tenant_id: Uuid, kind: ResourceKind) -> Result<()> {
        let outcome = self
            .store
            .try_reserve(tenant_id, kind)
            .await
            .map_err(|err| Self::map_store_err(err, tenant_id))?;

        match outcome {
            ReserveOutcome::Reserved { .. } => Ok(()),
            ReserveOutcome::Denied { cap, current } => {
                let (_, hint) = denial_text(kind);
                Err(TenantError::LimitExceeded {
                    kind,
                    cap,
                    current,
                    upgrade_hint: hint.to_string(),
                })
            }
        }
    }

    /// Return one unit of a resource. Never goes below zero.
    pub async fn release_resource(&self, tenant_id: Uuid, kind: ResourceKind) -> Result<()> {
        self.store
            .release(tenant_id, kind)
            .await
            .map(|_| ())
            .map_err(|err| Self::map_store_err(err, tenant_id))
    }

    fn apply_caps(&self, tenant: &mut Tenant, plan_id: &str) {
        let (caps, blockchain) = self.plans.caps_for(plan_id);
        tenant.plan_id = Some(plan_id.to_string());
        tenant.caps = caps;
        tenant.blockchain_enabled = blockchain;
        tenant.updated_at = current_timestamp();
    }

    /// The plan gate for workspace creation.
    ///
    /// An unknown plan resolves to the conservative FREE default: when the
    /// authoritative service cannot answer, nobody gets a workspace they
    /// might not be entitled to.
    async fn ensure_user_can_create(&self, owner_id: Uuid) -> Result<()> {
        let plan = match self.user_plans.user_plan(owner_id).await {
            Ok(PlanLookup::Known(plan)) => plan,
            Ok(PlanLookup::Unknown) => {
                warn!(%owner_id, "User plan unknown, applying FREE defaults");
                "FREE".to_string()
            }
            Err(err) => {
                warn!(%owner_id, error = %err, "User plan lookup failed, applying FREE defaults");
                "FREE".to_string()
            }
        };

        if plan.eq_ignore_ascii_case("FREE") {
            return Err(TenantError::PlanUpgradeRequired);
        }

        let max_tenants = self.plans.max_tenants_for(&plan);
        if max_tenants == UNLIMITED {
            return Ok(());
        }

        let owned = self.store.count_owned_by(owner_id).await?;
        if i64::from(owned) < i64::from(max_tenants) {
            Ok(())
        } else {
            Err(TenantError::TenantLimitReached {
                cap: max_tenants,
                current: owned,
            })
        }
    }

    /// Generate a slug unique across tenants: sanitized name plus a short
    /// owner-derived suffix, with a numeric tiebreaker on collision.
    async fn unique_slug(&self, name: &str, owner_id: Uuid) -> Result<String> {
        let base = slugify(name);
        let short_id: String = owner_id.to_string().chars().take(8).collect();

        let mut slug = if base.is_empty() {
            short_id.clone()
        } else {
            format!("{}-{}", base, short_id)
        };

        let mut counter = 1;
        while self.store.exists_by_slug(&slug).await? {
            slug = format!("{}-{}-{}", base, short_id, counter);
            counter += 1;
        }
        Ok(slug)
    }

    fn map_store_err(err: MoorageError, tenant_id: Uuid) -> TenantError {
        match err {
            MoorageError::NotFound(_) => TenantError::NotFound { tenant_id },
            other => TenantError::Storage(other),
        }
    }
}

#[async_trait::async_trait]
impl<S, U, M, E> TenantGateway for TenantManager<S, U, M, E>
where
    S: TenantStore,
    U: UserPlanSource,
    M: MembershipDirectory,
    E: EventPublisher,
{
    async fn find_tenant(&self, tenant_id: Uuid) -> crate::Result<Option<TenantSummary>> {
        Ok(self.store.find_by_id(tenant_id).await?.map(|t| TenantSummary {
            id: t.id,
            name: t.name,
            current_users: t.usage.users,
        }))
    }

    async fn validate_limit(
        &self,
        tenant_id: Uuid,
        kind: ResourceKind,
        proposed: u32,
    ) -> crate::Result<LimitDecision> {
        TenantManager::validate_limit(self, tenant_id, kind, proposed)
            .await
            .map_err(MoorageError::from)
    }

    async fn reserve(&self, tenant_id: Uuid, kind: ResourceKind) -> crate::Result<ReserveOutcome> {
        self.store.try_reserve(tenant_id, kind).await
    }

    async fn release(&self, tenant_id: Uuid, kind: ResourceKind) -> crate::Result<()> {
        self.store.release(tenant_id, kind).await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl<S, U, M, E> TenantProvisioner for TenantManager<S, U, M, E>
where
    S: TenantStore,
    U: UserPlanSource,
    M: MembershipDirectory,
    E: EventPublisher,
{
    async fn upgrade_plan(
        &self,
        tenant_id: Uuid,
        plan_id: &str,
        subscription_id: Uuid,
    ) -> crate::Result<()> {
        TenantManager::upgrade_plan(self, tenant_id, plan_id, subscription_id)
            .await
            .map(|_| ())
            .map_err(MoorageError::from)
    }
}

/// Validate a NIT: nine digits, a dash, and a weighted check digit.
fn validate_nit(nit: &str) -> Result<()> {
    let bytes = nit.as_bytes();
    let well_formed = bytes.len() == 11
        && bytes[..9].iter().all(u8::is_ascii_digit)
        && bytes[9] == b'-'
        && bytes[10].is_ascii_digit();
    if !well_formed {
        return Err(TenantError::invalid_nit(
            "expected format XXXXXXXXX-X (nine digits, dash, check digit)",
        ));
    }

    const WEIGHTS: [u32; 9] = [71, 67, 59, 53, 47, 43, 41, 37, 29];
    let sum: u32 = bytes[..9]
        .iter()
        .zip(WEIGHTS)
        .map(|(b, w)| u32::from(b - b'0') * w)
        .sum();

    let mut check = sum % 11;
    if check >= 2 {
        check = 11 - check;
    }

    if check != u32::from(bytes[10] - b'0') {
        return Err(TenantError::invalid_nit("check digit mismatch"));
    }
    Ok(())
}

/// Lowercase, strip everything but alphanumerics/spaces/hyphens, collapse
/// whitespace runs to single hyphens, and truncate to 50 characters.
fn slugify(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();
    let hyphenated = cleaned.split_whitespace().collect::<Vec<_>>().join("-");
    hyphenated.chars().take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::StaticUserPlans;
    use crate::error::Result as CoreResult;
    use crate::events::{Event, RecordingEventPublisher};
    use crate::plans::PlanCaps;
    use crate::tenants::memory::InMemoryTenantStore;

    /// Membership directory that knows nobody.
    #[derive(Clone)]
    struct NoMembers;

    #[async_trait::async_trait]
    impl MembershipDirectory for NoMembers {
        async fn member_tenant_ids(&self, _user_id: Uuid) -> CoreResult<Vec<Uuid>> {
            Ok(Vec::new())
        }
    }

    type TestManager =
        TenantManager<InMemoryTenantStore, StaticUserPlans, NoMembers, RecordingEventPublisher>;

    fn manager() -> (TestManager, InMemoryTenantStore, StaticUserPlans, RecordingEventPublisher)
    {
        let store = InMemoryTenantStore::new();
        let user_plans = StaticUserPlans::new();
        let events = RecordingEventPublisher::new();
        let manager = TenantManager::new(
            store.clone(),
            PlanCatalog::builtin(),
            user_plans.clone(),
            NoMembers,
            events.clone(),
        );
        (manager, store, user_plans, events)
    }

    async fn paid_user(user_plans: &StaticUserPlans) -> Uuid {
        let owner = Uuid::new_v4();
        user_plans.assign(owner, "PROFESSIONAL").await;
        owner
    }

    #[tokio::test]
    async fn test_create_tenant_defaults() {
        let (manager, _, user_plans, events) = manager();
        let owner = paid_user(&user_plans).await;

        let tenant = manager
            .create_tenant(NewTenant::personal("Acme Corp"), owner)
            .await
            .unwrap();

        assert_eq!(tenant.name, "Acme Corp");
        assert!(tenant.slug.starts_with("acme-corp-"));
        assert_eq!(tenant.plan_id, None);
        assert_eq!(tenant.subscription_state, SubscriptionState::Pending);
        assert_eq!(tenant.caps, Tenant::new_tenant_caps());
        assert_eq!(tenant.usage.users, 1);
        assert_eq!(events.routing_keys(), vec!["tenant.created"]);
    }

    #[tokio::test]
    async fn test_free_user_cannot_create_tenant() {
        let (manager, store, user_plans, _) = manager();
        let owner = Uuid::new_v4();
        user_plans.assign(owner, "FREE").await;

        let err = manager
            .create_tenant(NewTenant::personal("Nope"), owner)
            .await
            .unwrap_err();
        assert!(matches!(err, TenantError::PlanUpgradeRequired));
        assert_eq!(store.count_owned_by(owner).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_plan_is_treated_as_free() {
        let (manager, _, _, _) = manager();
        let err = manager
            .create_tenant(NewTenant::personal("Nope"), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, TenantError::PlanUpgradeRequired));
    }

    #[tokio::test]
    async fn test_tenant_allowance_enforced() {
        let (manager, _, user_plans, _) = manager();
        let owner = paid_user(&user_plans).await;

        for i in 0..3 {
            manager
                .create_tenant(NewTenant::personal(format!("Workspace {}", i)), owner)
                .await
                .unwrap();
        }

        let err = manager
            .create_tenant(NewTenant::personal("One too many"), owner)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TenantError::TenantLimitReached { cap: 3, current: 3 }
        ));
    }

    #[tokio::test]
    async fn test_business_tenant_requires_fields() {
        let (manager, _, user_plans, _) = manager();
        let owner = paid_user(&user_plans).await;

        let req = NewTenant {
            name: "Acme Ltda".to_string(),
            kind: TenantKind::Business,
            business_name: None,
            nit: None,
            owner_email: None,
        };
        let err = manager.create_tenant(req, owner).await.unwrap_err();
        assert!(matches!(err, TenantError::MissingBusinessFields));
    }

    #[tokio::test]
    async fn test_business_tenant_with_valid_nit() {
        let (manager, _, user_plans, _) = manager();
        let owner = paid_user(&user_plans).await;

        let req = NewTenant {
            name: "Acme Ltda".to_string(),
            kind: TenantKind::Business,
            business_name: Some("Acme Ltda SAS".to_string()),
            nit: Some("900123456-3".to_string()),
            owner_email: Some("billing@acme.co".to_string()),
        };
        let tenant = manager.create_tenant(req, owner).await.unwrap();
        assert_eq!(tenant.nit.as_deref(), Some("900123456-3"));
        assert_eq!(tenant.kind, TenantKind::Business);
    }

    #[tokio::test]
    async fn test_duplicate_nit_conflicts() {
        let (manager, _, user_plans, _) = manager();
        let owner = paid_user(&user_plans).await;
        let other = paid_user(&user_plans).await;

        let req = |name: &str| NewTenant {
            name: name.to_string(),
            kind: TenantKind::Business,
            business_name: Some("Acme".to_string()),
            nit: Some("900123456-3".to_string()),
            owner_email: None,
        };

        manager.create_tenant(req("First"), owner).await.unwrap();
        let err = manager.create_tenant(req("Second"), other).await.unwrap_err();
        assert!(matches!(err, TenantError::NitTaken { .. }));
    }

    #[tokio::test]
    async fn test_slugs_are_unique_per_name() {
        let (manager, _, user_plans, _) = manager();
        let owner = paid_user(&user_plans).await;

        let a = manager
            .create_tenant(NewTenant::personal("Same Name"), owner)
            .await
            .unwrap();
        let b = manager
            .create_tenant(NewTenant::personal("Same Name"), owner)
            .await
            .unwrap();
        assert_ne!(a.slug, b.slug);
    }

    #[tokio::test]
    async fn test_auto_workspace_name() {
        let (manager, _, user_plans, _) = manager();
        let owner = paid_user(&user_plans).await;

        let tenant = manager
            .create_tenant_for_user(owner, "dana@example.com")
            .await
            .unwrap();
        assert_eq!(tenant.name, "dana's Workspace");
        assert_eq!(tenant.owner_email, "dana@example.com");
        assert_eq!(tenant.kind, TenantKind::Personal);
    }

    #[tokio::test]
    async fn test_apply_plan_free_caps() {
        let (manager, _, user_plans, _) = manager();
        let owner = paid_user(&user_plans).await;
        let tenant = manager
            .create_tenant(NewTenant::personal("Acme"), owner)
            .await
            .unwrap();

        let tenant = manager.apply_plan(tenant.id, "FREE").await.unwrap();
        assert_eq!(tenant.caps, PlanCaps::new(1, 3, 0, 0));
        assert!(!tenant.blockchain_enabled);
        assert_eq!(tenant.plan_id.as_deref(), Some("FREE"));
    }

    #[tokio::test]
    async fn test_apply_plan_enterprise_caps() {
        let (manager, _, user_plans, _) = manager();
        let owner = paid_user(&user_plans).await;
        let tenant = manager
            .create_tenant(NewTenant::personal("Acme"), owner)
            .await
            .unwrap();

        let tenant = manager.apply_plan(tenant.id, "ENTERPRISE").await.unwrap();
        assert_eq!(tenant.caps, PlanCaps::unlimited());
        assert!(tenant.blockchain_enabled);
    }

    #[tokio::test]
    async fn test_apply_unknown_plan_falls_back_to_minimal() {
        let (manager, _, user_plans, _) = manager();
        let owner = paid_user(&user_plans).await;
        let tenant = manager
            .create_tenant(NewTenant::personal("Acme"), owner)
            .await
            .unwrap();

        let tenant = manager.apply_plan(tenant.id, "PLATINUM").await.unwrap();
        assert_eq!(tenant.caps, PlanCaps::minimal());
        assert!(!tenant.blockchain_enabled);
        // Usage was not reset
        assert_eq!(tenant.usage.users, 1);
    }

    #[tokio::test]
    async fn test_downgrade_leaves_usage_over_cap() {
        let (manager, store, user_plans, _) = manager();
        let owner = paid_user(&user_plans).await;
        let tenant = manager
            .create_tenant(NewTenant::personal("Acme"), owner)
            .await
            .unwrap();
        manager.apply_plan(tenant.id, "ENTERPRISE").await.unwrap();

        for _ in 0..10 {
            manager
                .reserve_resource(tenant.id, ResourceKind::Project)
                .await
                .unwrap();
        }

        let downgraded = manager.apply_plan(tenant.id, "FREE").await.unwrap();
        assert_eq!(downgraded.usage.projects, 10);
        assert_eq!(downgraded.caps.max_projects, 3);

        // Over cap: the next project is denied, existing ones stay
        let decision = manager
            .validate_limit(tenant.id, ResourceKind::Project, 11)
            .await
            .unwrap();
        assert!(!decision.allowed);
        let stored = store.find_by_id(tenant.id).await.unwrap().unwrap();
        assert_eq!(stored.usage.projects, 10);
    }

    #[tokio::test]
    async fn test_upgrade_plan_activates_subscription_and_emits() {
        let (manager, _, user_plans, events) = manager();
        let owner = paid_user(&user_plans).await;
        let tenant = manager
            .create_tenant(NewTenant::personal("Acme"), owner)
            .await
            .unwrap();

        let subscription_id = Uuid::new_v4();
        let upgraded = manager
            .upgrade_plan(tenant.id, "PROFESSIONAL", subscription_id)
            .await
            .unwrap();

        assert_eq!(upgraded.subscription_state, SubscriptionState::Active);
        assert_eq!(upgraded.subscription_id, Some(subscription_id));
        assert!(upgraded.caps.is_unlimited(ResourceKind::User));

        let keys = events.routing_keys();
        assert!(keys.contains(&"tenant.plan.upgraded"));
        let upgrade_event = events
            .recorded()
            .into_iter()
            .find_map(|e| match e {
                Event::TenantPlanUpgraded(payload) => Some(payload),
                _ => None,
            })
            .unwrap();
        assert_eq!(upgrade_event.tenant_id, tenant.id);
        assert_eq!(upgrade_event.plan_id, "PROFESSIONAL");
    }

    #[tokio::test]
    async fn test_reserve_denied_maps_to_limit_exceeded() {
        let (manager, _, user_plans, _) = manager();
        let owner = paid_user(&user_plans).await;
        let tenant = manager
            .create_tenant(NewTenant::personal("Acme"), owner)
            .await
            .unwrap();

        // New tenant caps: 1 user (the owner), so the next seat is denied
        let err = manager
            .reserve_resource(tenant.id, ResourceKind::User)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TenantError::LimitExceeded {
                kind: ResourceKind::User,
                cap: 1,
                current: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_update_requires_owner() {
        let (manager, _, user_plans, _) = manager();
        let owner = paid_user(&user_plans).await;
        let tenant = manager
            .create_tenant(NewTenant::personal("Acme"), owner)
            .await
            .unwrap();

        let err = manager
            .update_tenant(
                tenant.id,
                TenantUpdate {
                    name: Some("Hijacked".to_string()),
                    ..TenantUpdate::default()
                },
                Uuid::new_v4(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TenantError::NotOwner));
    }

    #[tokio::test]
    async fn test_suspend_activate_delete() {
        let (manager, store, user_plans, _) = manager();
        let owner = paid_user(&user_plans).await;
        let tenant = manager
            .create_tenant(NewTenant::personal("Acme"), owner)
            .await
            .unwrap();

        manager.suspend(tenant.id, "payment overdue").await.unwrap();
        assert_eq!(
            store.find_by_id(tenant.id).await.unwrap().unwrap().status,
            TenantStatus::Suspended
        );

        manager.activate(tenant.id).await.unwrap();
        assert_eq!(
            store.find_by_id(tenant.id).await.unwrap().unwrap().status,
            TenantStatus::Active
        );

        manager.delete_tenant(tenant.id, owner).await.unwrap();
        assert_eq!(
            store.find_by_id(tenant.id).await.unwrap().unwrap().status,
            TenantStatus::Deleted
        );
        assert!(manager.list_owned(owner).await.unwrap().is_empty());
    }

    #[test]
    fn test_validate_nit_accepts_valid() {
        assert!(validate_nit("900123456-3").is_ok());
        assert!(validate_nit("860529817-4").is_ok());
        assert!(validate_nit("000000000-0").is_ok());
    }

    #[test]
    fn test_validate_nit_rejects_bad_check_digit() {
        let err = validate_nit("900123456-7").unwrap_err();
        assert!(matches!(err, TenantError::InvalidNit { .. }));
    }

    #[test]
    fn test_validate_nit_rejects_bad_format() {
        assert!(validate_nit("12345").is_err());
        assert!(validate_nit("90012345X-3").is_err());
        assert!(validate_nit("900123456_3").is_err());
        assert!(validate_nit("9001234567-3").is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Acme Corp"), "acme-corp");
        assert_eq!(slugify("  Señor   Dev!  "), "seor-dev");
        assert_eq!(slugify("already-sluggy"), "already-sluggy");
        assert!(slugify(&"long ".repeat(30)).chars().count() <= 50);
    }
}
