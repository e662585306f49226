//! End-to-end invitation workflow tests over the in-memory stores.

use moorage::directory::{ProjectRef, StaticProjects, StaticUserPlans};
use moorage::events::{Event, RecordingEventPublisher};
use moorage::members::{
    InMemoryMemberStore, Invitation, InvitationConfig, InvitationManager, InvitationStatus,
    InvitationTarget, InviteRequest, MemberError, MembershipStore, ProjectMemberStore,
    ProjectRole, TargetKind, TenantRole,
};
use moorage::plans::{PlanCaps, PlanCatalog};
use moorage::tenants::{
    InMemoryTenantStore, ResourceUsage, SubscriptionState, Tenant, TenantKind, TenantManager,
    TenantStatus, TenantStore,
};
use uuid::Uuid;

type Tenants =
    TenantManager<InMemoryTenantStore, StaticUserPlans, InMemoryMemberStore, RecordingEventPublisher>;
type Invitations =
    InvitationManager<InMemoryMemberStore, InMemoryMemberStore, Tenants, StaticProjects, RecordingEventPublisher>;

struct World {
    invitations: Invitations,
    members: InMemoryMemberStore,
    tenant_store: InMemoryTenantStore,
    projects: StaticProjects,
    events: RecordingEventPublisher,
}

fn world() -> World {
    let tenant_store = InMemoryTenantStore::new();
    let members = InMemoryMemberStore::new();
    let projects = StaticProjects::new();
    let events = RecordingEventPublisher::new();

    let tenants = TenantManager::new(
        tenant_store.clone(),
        PlanCatalog::builtin(),
        StaticUserPlans::new(),
        members.clone(),
        events.clone(),
    );
    let invitations = InvitationManager::new(
        members.clone(),
        members.clone(),
        tenants,
        projects.clone(),
        events.clone(),
        InvitationConfig::default(),
    );

    World {
        invitations,
        members,
        tenant_store,
        projects,
        events,
    }
}

/// Insert a tenant with explicit caps and usage, bypassing the creation
/// gates.
async fn seed_tenant(world: &World, max_users: i32, current_users: u32) -> Tenant {
    let now = 1_700_000_000;
    let tenant = Tenant {
        id: Uuid::new_v4(),
        name: "Acme".to_string(),
        slug: format!("acme-{}", Uuid::new_v4().simple()),
        kind: TenantKind::Personal,
        owner_id: Uuid::new_v4(),
        owner_email: "owner@acme.dev".to_string(),
        business_name: None,
        nit: None,
        plan_id: Some("PROFESSIONAL".to_string()),
        subscription_state: SubscriptionState::Active,
        status: TenantStatus::Active,
        caps: PlanCaps::new(max_users, -1, 5, -1),
        blockchain_enabled: true,
        usage: ResourceUsage {
            users: current_users,
            ..ResourceUsage::default()
        },
        subscription_id: None,
        created_at: now,
        updated_at: now,
    };
    world.tenant_store.insert(tenant.clone()).await;
    tenant
}

#[tokio::test]
async fn invite_then_accept_adds_member_and_counts_the_seat() {
    let world = world();
    let tenant = seed_tenant(&world, 5, 4).await;
    let inviter = Uuid::new_v4();
    let invitee = Uuid::new_v4();

    let invitation = world
        .invitations
        .invite(
            InviteRequest::to_tenant("dana@example.com", tenant.id, TenantRole::Admin),
            inviter,
            "admin@acme.dev",
        )
        .await
        .unwrap();
    assert_eq!(invitation.status, InvitationStatus::Pending);
    assert_eq!(invitation.resource_name, "Acme");

    let accepted = world
        .invitations
        .accept(&invitation.token, invitee)
        .await
        .unwrap();
    assert_eq!(accepted.status, InvitationStatus::Accepted);
    assert!(accepted.accepted_at.is_some());

    // Membership exists with the invited role
    let membership = world
        .members
        .get_membership(tenant.id, invitee)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(membership.role, TenantRole::Admin);
    assert_eq!(membership.invited_by, Some(inviter));

    // The seat was counted
    let stored = world
        .tenant_store
        .find_by_id(tenant.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.usage.users, 5);

    let keys = world.events.routing_keys();
    assert!(keys.contains(&"user.invited"));
    assert!(keys.contains(&"user.invitation.accepted"));
}

#[tokio::test]
async fn invite_at_user_cap_fails_and_persists_nothing() {
    let world = world();
    let tenant = seed_tenant(&world, 5, 5).await;

    let err = world
        .invitations
        .invite(
            InviteRequest::to_tenant("dana@example.com", tenant.id, TenantRole::Member),
            Uuid::new_v4(),
            "admin@acme.dev",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MemberError::LimitExceeded { cap: 5, current: 5, .. }));

    // No invitation row was created and no event fired
    let pending = world
        .invitations
        .pending_for_target(TargetKind::Tenant, tenant.id)
        .await
        .unwrap();
    assert!(pending.is_empty());
    assert!(world.events.recorded().is_empty());
}

#[tokio::test]
async fn invitation_token_is_single_use() {
    let world = world();
    let tenant = seed_tenant(&world, 10, 1).await;

    let invitation = world
        .invitations
        .invite(
            InviteRequest::to_tenant("dana@example.com", tenant.id, TenantRole::Member),
            Uuid::new_v4(),
            "admin@acme.dev",
        )
        .await
        .unwrap();

    world
        .invitations
        .accept(&invitation.token, Uuid::new_v4())
        .await
        .unwrap();

    let err = world
        .invitations
        .accept(&invitation.token, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MemberError::InvalidState {
            status: InvitationStatus::Accepted
        }
    ));
}

#[tokio::test]
async fn expired_invitation_fails_with_expiry_error_before_sweep() {
    let world = world();
    let tenant = seed_tenant(&world, 10, 1).await;

    // A pending invitation already past its expiry
    let invitation = Invitation {
        id: Uuid::new_v4(),
        email: "late@example.com".to_string(),
        token: "expired-token".to_string(),
        target: InvitationTarget::Tenant {
            tenant_id: tenant.id,
            role: TenantRole::Member,
        },
        resource_name: "Acme".to_string(),
        project_ids: Vec::new(),
        status: InvitationStatus::Pending,
        invited_by: Uuid::new_v4(),
        inviter_email: "admin@acme.dev".to_string(),
        expires_at: 1_000,
        accepted_at: None,
        created_at: 500,
    };
    world.members.insert_invitation(invitation.clone()).await;

    let err = world
        .invitations
        .accept("expired-token", Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, MemberError::Expired));

    // Lazy filtering hides it from pending listings while the row is
    // nominally still PENDING
    let stored = world.invitations.get(invitation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Pending);
    assert!(world
        .invitations
        .pending_for_email("late@example.com")
        .await
        .unwrap()
        .is_empty());

    // The sweep makes it terminal
    assert_eq!(world.invitations.sweep_expired().await.unwrap(), 1);
    let swept = world.invitations.get(invitation.id).await.unwrap().unwrap();
    assert_eq!(swept.status, InvitationStatus::Expired);
}

#[tokio::test]
async fn self_invite_is_rejected_before_any_persistence() {
    let world = world();
    let tenant = seed_tenant(&world, 10, 1).await;

    let err = world
        .invitations
        .invite(
            InviteRequest::to_tenant("admin@acme.dev", tenant.id, TenantRole::Member),
            Uuid::new_v4(),
            "Admin@Acme.dev",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MemberError::SelfInvite));
    assert!(world
        .invitations
        .pending_for_target(TargetKind::Tenant, tenant.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn duplicate_pending_invitation_conflicts() {
    let world = world();
    let tenant = seed_tenant(&world, 10, 1).await;
    let req = InviteRequest::to_tenant("dana@example.com", tenant.id, TenantRole::Member);

    world
        .invitations
        .invite(req.clone(), Uuid::new_v4(), "admin@acme.dev")
        .await
        .unwrap();

    let err = world
        .invitations
        .invite(req, Uuid::new_v4(), "admin@acme.dev")
        .await
        .unwrap_err();
    assert!(matches!(err, MemberError::AlreadyInvited));
}

#[tokio::test]
async fn only_the_inviter_can_revoke() {
    let world = world();
    let tenant = seed_tenant(&world, 10, 1).await;
    let inviter = Uuid::new_v4();

    let invitation = world
        .invitations
        .invite(
            InviteRequest::to_tenant("dana@example.com", tenant.id, TenantRole::Member),
            inviter,
            "admin@acme.dev",
        )
        .await
        .unwrap();

    let err = world
        .invitations
        .revoke(invitation.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, MemberError::NotInviter));

    world.invitations.revoke(invitation.id, inviter).await.unwrap();
    let stored = world.invitations.get(invitation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Revoked);

    // Revoked is terminal
    let err = world
        .invitations
        .accept(&invitation.token, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MemberError::InvalidState {
            status: InvitationStatus::Revoked
        }
    ));
}

#[tokio::test]
async fn tenant_invite_fans_out_project_memberships() {
    let world = world();
    let tenant = seed_tenant(&world, 10, 1).await;
    let invitee = Uuid::new_v4();

    let p1 = Uuid::new_v4();
    let p2 = Uuid::new_v4();
    for (id, name) in [(p1, "api"), (p2, "frontend")] {
        world
            .projects
            .insert(ProjectRef {
                id,
                name: name.to_string(),
                tenant_id: tenant.id,
            })
            .await;
    }

    let invitation = world
        .invitations
        .invite(
            InviteRequest::to_tenant("dana@example.com", tenant.id, TenantRole::Member)
                .with_projects(vec![p1, p2]),
            Uuid::new_v4(),
            "admin@acme.dev",
        )
        .await
        .unwrap();

    world
        .invitations
        .accept(&invitation.token, invitee)
        .await
        .unwrap();

    for project_id in [p1, p2] {
        assert!(world
            .members
            .is_project_member(project_id, invitee)
            .await
            .unwrap());
    }
    let memberships = world.members.list_project_members(p1).await.unwrap();
    assert_eq!(memberships[0].role, ProjectRole::Member);
    assert_eq!(memberships[0].tenant_id, tenant.id);
}

#[tokio::test]
async fn unknown_attached_project_fails_the_invite() {
    let world = world();
    let tenant = seed_tenant(&world, 10, 1).await;

    let err = world
        .invitations
        .invite(
            InviteRequest::to_tenant("dana@example.com", tenant.id, TenantRole::Member)
                .with_projects(vec![Uuid::new_v4()]),
            Uuid::new_v4(),
            "admin@acme.dev",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MemberError::ProjectNotFound { .. }));
    assert!(world
        .invitations
        .pending_for_target(TargetKind::Tenant, tenant.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn reject_is_terminal() {
    let world = world();
    let tenant = seed_tenant(&world, 10, 1).await;
    let invitee = Uuid::new_v4();

    let invitation = world
        .invitations
        .invite(
            InviteRequest::to_tenant("dana@example.com", tenant.id, TenantRole::Member),
            Uuid::new_v4(),
            "admin@acme.dev",
        )
        .await
        .unwrap();

    let rejected = world
        .invitations
        .reject(&invitation.token, invitee)
        .await
        .unwrap();
    assert_eq!(rejected.status, InvitationStatus::Rejected);

    let err = world
        .invitations
        .accept(&invitation.token, invitee)
        .await
        .unwrap_err();
    assert!(matches!(err, MemberError::InvalidState { .. }));

    // No membership was ever created
    assert!(!world.members.is_member(tenant.id, invitee).await.unwrap());
}

#[tokio::test]
async fn project_target_invite_creates_project_membership() {
    let world = world();
    let tenant = seed_tenant(&world, 10, 1).await;
    let invitee = Uuid::new_v4();

    let project_id = Uuid::new_v4();
    world
        .projects
        .insert(ProjectRef {
            id: project_id,
            name: "scanner".to_string(),
            tenant_id: tenant.id,
        })
        .await;

    let invitation = world
        .invitations
        .invite(
            InviteRequest::to_project("dana@example.com", project_id, ProjectRole::Admin),
            Uuid::new_v4(),
            "admin@acme.dev",
        )
        .await
        .unwrap();
    assert_eq!(invitation.resource_name, "scanner");

    world
        .invitations
        .accept(&invitation.token, invitee)
        .await
        .unwrap();

    let memberships = world.members.list_project_members(project_id).await.unwrap();
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].user_id, invitee);
    assert_eq!(memberships[0].role, ProjectRole::Admin);
    assert_eq!(memberships[0].tenant_id, tenant.id);

    // A project invite never creates a tenant membership
    assert!(!world.members.is_member(tenant.id, invitee).await.unwrap());
}

#[tokio::test]
async fn accepting_when_already_member_still_finalizes_without_double_count() {
    let world = world();
    let tenant = seed_tenant(&world, 10, 3).await;
    let invitee = Uuid::new_v4();

    let invitation = world
        .invitations
        .invite(
            InviteRequest::to_tenant("dana@example.com", tenant.id, TenantRole::Member),
            Uuid::new_v4(),
            "admin@acme.dev",
        )
        .await
        .unwrap();

    // The user joined through some other path in the meantime
    world
        .members
        .add_member(&moorage::members::TenantMembership {
            tenant_id: tenant.id,
            user_id: invitee,
            role: TenantRole::Member,
            invited_by: None,
            member_email: "dana@example.com".to_string(),
            joined_at: 1_700_000_000,
        })
        .await
        .unwrap();

    let accepted = world
        .invitations
        .accept(&invitation.token, invitee)
        .await
        .unwrap();
    assert_eq!(accepted.status, InvitationStatus::Accepted);

    // The counter was not bumped a second time
    let stored = world
        .tenant_store
        .find_by_id(tenant.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.usage.users, 3);
}

#[tokio::test]
async fn invite_unknown_tenant_is_target_not_found() {
    let world = world();
    let err = world
        .invitations
        .invite(
            InviteRequest::to_tenant("dana@example.com", Uuid::new_v4(), TenantRole::Member),
            Uuid::new_v4(),
            "admin@acme.dev",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MemberError::TargetNotFound { kind: "TENANT", .. }));
}

#[tokio::test]
async fn accept_event_carries_the_resource() {
    let world = world();
    let tenant = seed_tenant(&world, 10, 1).await;
    let invitee = Uuid::new_v4();

    let invitation = world
        .invitations
        .invite(
            InviteRequest::to_tenant("dana@example.com", tenant.id, TenantRole::Member),
            Uuid::new_v4(),
            "admin@acme.dev",
        )
        .await
        .unwrap();
    world
        .invitations
        .accept(&invitation.token, invitee)
        .await
        .unwrap();

    let accepted = world
        .events
        .recorded()
        .into_iter()
        .find_map(|e| match e {
            Event::InvitationAccepted(payload) => Some(payload),
            _ => None,
        })
        .unwrap();
    assert_eq!(accepted.invitation_id, invitation.id);
    assert_eq!(accepted.user_id, invitee);
    assert_eq!(accepted.resource_id, tenant.id);
    assert_eq!(accepted.resource_type, "TENANT");
}
