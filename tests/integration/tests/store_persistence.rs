//! Integration test: the JSON-file store survives restarts. Partition,
//! statuses, and proof records all reload, and proofs re-verify offline.

use std::path::PathBuf;
use std::sync::Arc;

use valence_identity::{
    DidManager, DidStatus, IdentityConfig, JsonFileStore, ResolveConfig, ResolvePolicy,
    StoreConfig,
};

fn temp_store_path() -> PathBuf {
    std::env::temp_dir().join(format!("valence-it-{}.json", uuid::Uuid::now_v7()))
}

#[tokio::test]
async fn test_partition_survives_reload() {
    let path = temp_store_path();

    let (did_a, did_b, proof) = {
        let mgr = DidManager::new(Arc::new(JsonFileStore::open(&path).unwrap()));
        let (a, key_a) = mgr.create_node(Some("laptop")).await.unwrap();
        let (b, key_b) = mgr.create_node(Some("phone")).await.unwrap();
        let proof = mgr
            .link_dids(&a.did, &key_a, &b.did, &key_b)
            .await
            .unwrap();
        mgr.revoke_did(&b.did, Some("retired")).await.unwrap();
        (a.did, b.did, proof)
    };

    // "restart": fresh manager over the same file
    let mgr = DidManager::new(Arc::new(JsonFileStore::open(&path).unwrap()));

    let view = mgr.resolve_identity(&did_a).await.unwrap();
    assert_eq!(view.members.len(), 1);
    assert_eq!(view.total_members, 2);

    let node_b = mgr.get_node(&did_b).await.unwrap();
    assert_eq!(node_b.status, DidStatus::Revoked);
    assert_eq!(node_b.revocation_reason.as_deref(), Some("retired"));

    // recorded proof reloads and still verifies against the stored keys
    let proofs = mgr.proofs_for(&did_a).await.unwrap();
    assert_eq!(proofs.len(), 1);
    assert_eq!(proofs[0], proof);
    assert!(mgr.verify_link_proof(&proofs[0]).await);

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_manager_from_config_uses_file_store() {
    let path = temp_store_path();
    let config = IdentityConfig {
        store: StoreConfig {
            path: Some(path.clone()),
        },
        resolve: ResolveConfig {
            policy: ResolvePolicy::All,
        },
    };

    let did = {
        let mgr = DidManager::from_config(&config).unwrap();
        let (node, _) = mgr.create_node(Some("desktop")).await.unwrap();
        mgr.suspend_did(&node.did).await.unwrap();
        node.did
    };

    let mgr = DidManager::from_config(&config).unwrap();
    // config default policy is All, so the suspended node still shows up
    let view = mgr.resolve_identity(&did).await.unwrap();
    assert_eq!(view.members.len(), 1);
    assert_eq!(view.members[0].status, DidStatus::Suspended);

    std::fs::remove_file(&path).ok();
}
