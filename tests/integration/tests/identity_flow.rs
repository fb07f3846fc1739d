//! Integration test: the full create → link → resolve → revoke lifecycle
//! across valence-crypto and valence-identity.

use valence_identity::{DidManager, DidStatus, IdentityError, ResolvePolicy};

// =========================================================================
// End-to-end device lifecycle
// =========================================================================

#[tokio::test]
async fn test_laptop_phone_lifecycle() {
    let mgr = DidManager::in_memory();

    let (laptop, laptop_key) = mgr.create_node(Some("laptop")).await.unwrap();
    let (phone, phone_key) = mgr.create_node(Some("phone")).await.unwrap();

    // Link the two devices into one identity.
    let proof = mgr
        .link_dids(&laptop.did, &laptop_key, &phone.did, &phone_key)
        .await
        .unwrap();
    assert!(mgr.verify_link_proof(&proof).await);

    let view = mgr.resolve_identity(&laptop.did).await.unwrap();
    assert_eq!(view.members.len(), 2);
    assert!(view.contains(&laptop.did));
    assert!(view.contains(&phone.did));

    // Phone is compromised.
    mgr.revoke_did(&phone.did, Some("key compromised"))
        .await
        .unwrap();

    let view = mgr.resolve_identity(&laptop.did).await.unwrap();
    assert_eq!(view.members.len(), 1);
    assert!(view.contains(&laptop.did));
    assert!(!view.contains(&phone.did));

    // The phone stays resolvable by its own DID, with its revoked record.
    let phone_view = mgr.resolve_identity(&phone.did).await.unwrap();
    assert_eq!(phone_view.cluster_id, view.cluster_id);
    let phone_node = mgr.get_node(&phone.did).await.unwrap();
    assert_eq!(phone_node.status, DidStatus::Revoked);
    assert_eq!(
        phone_node.revocation_reason.as_deref(),
        Some("key compromised")
    );
}

#[tokio::test]
async fn test_listing_reflects_partition() {
    let mgr = DidManager::in_memory();
    let (a, key_a) = mgr.create_node(Some("desktop")).await.unwrap();
    let (b, key_b) = mgr.create_node(Some("tablet")).await.unwrap();
    let (c, _) = mgr.create_node(Some("watch")).await.unwrap();

    assert_eq!(mgr.list_nodes().await.unwrap().len(), 3);
    assert_eq!(mgr.list_clusters().await.unwrap().len(), 3);

    mgr.link_dids(&a.did, &key_a, &b.did, &key_b).await.unwrap();

    assert_eq!(mgr.list_nodes().await.unwrap().len(), 3);
    assert_eq!(mgr.list_clusters().await.unwrap().len(), 2);

    // c stays in its own singleton cluster
    let view_c = mgr.resolve_identity(&c.did).await.unwrap();
    assert_eq!(view_c.members.len(), 1);
}

// =========================================================================
// Suspension
// =========================================================================

#[tokio::test]
async fn test_suspension_is_reversible_and_isolated() {
    let mgr = DidManager::in_memory();
    let (a, key_a) = mgr.create_node(None).await.unwrap();
    let (b, key_b) = mgr.create_node(None).await.unwrap();
    mgr.link_dids(&a.did, &key_a, &b.did, &key_b).await.unwrap();

    mgr.suspend_did(&b.did).await.unwrap();

    // a unaffected, b filtered out of active-only resolution
    let view = mgr.resolve_identity(&a.did).await.unwrap();
    assert_eq!(view.members.len(), 1);
    assert!(mgr.get_node(&a.did).await.unwrap().is_active());

    // b is still a member under the all-members policy
    let all = mgr
        .resolve_identity_with(&a.did, ResolvePolicy::All)
        .await
        .unwrap();
    assert_eq!(all.members.len(), 2);

    mgr.reinstate_did(&b.did).await.unwrap();
    let view = mgr.resolve_identity(&a.did).await.unwrap();
    assert_eq!(view.members.len(), 2);
}

// =========================================================================
// Error surfaces
// =========================================================================

#[tokio::test]
async fn test_unknown_did_errors() {
    let mgr = DidManager::in_memory();
    let missing = "did:valence:00000000000000000000000000000000";

    assert!(matches!(
        mgr.resolve_identity(missing).await,
        Err(IdentityError::DidNotFound(_))
    ));
    assert!(matches!(
        mgr.revoke_did(missing, None).await,
        Err(IdentityError::DidNotFound(_))
    ));
    assert!(matches!(
        mgr.get_node(missing).await,
        Err(IdentityError::DidNotFound(_))
    ));
}

#[tokio::test]
async fn test_revoked_did_cannot_link_but_others_can() {
    let mgr = DidManager::in_memory();
    let (a, key_a) = mgr.create_node(None).await.unwrap();
    let (b, key_b) = mgr.create_node(None).await.unwrap();
    let (c, key_c) = mgr.create_node(None).await.unwrap();

    mgr.revoke_did(&a.did, Some("stolen")).await.unwrap();

    let result = mgr.link_dids(&a.did, &key_a, &b.did, &key_b).await;
    assert!(matches!(result, Err(IdentityError::DidRevoked(_))));

    // the rest of the graph is untouched
    mgr.link_dids(&b.did, &key_b, &c.did, &key_c).await.unwrap();
    let view = mgr.resolve_identity(&b.did).await.unwrap();
    assert_eq!(view.members.len(), 2);
}
