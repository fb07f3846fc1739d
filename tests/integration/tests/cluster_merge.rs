//! Integration test: cluster merge semantics. Commutativity, transitivity,
//! and the partition invariant under every link order.

use valence_crypto::KeyPair;
use valence_identity::{DidManager, DidNode, LinkProof};

async fn four_nodes(mgr: &DidManager) -> Vec<(DidNode, KeyPair)> {
    let mut nodes = Vec::new();
    for label in ["a", "b", "c", "d"] {
        nodes.push(mgr.create_node(Some(label)).await.unwrap());
    }
    nodes
}

// =========================================================================
// Pairwise merge
// =========================================================================

#[tokio::test]
async fn test_two_pairs_merge_into_one_cluster() {
    let mgr = DidManager::in_memory();
    let nodes = four_nodes(&mgr).await;
    let (a, key_a) = &nodes[0];
    let (b, key_b) = &nodes[1];
    let (c, key_c) = &nodes[2];
    let (d, key_d) = &nodes[3];

    // {A,B} and {C,D}
    mgr.link_dids(&a.did, key_a, &b.did, key_b).await.unwrap();
    mgr.link_dids(&c.did, key_c, &d.did, key_d).await.unwrap();
    assert_eq!(mgr.list_clusters().await.unwrap().len(), 2);

    // bridging link dissolves the partition boundary
    mgr.link_dids(&b.did, key_b, &c.did, key_c).await.unwrap();

    let views = [
        mgr.resolve_identity(&a.did).await.unwrap(),
        mgr.resolve_identity(&b.did).await.unwrap(),
        mgr.resolve_identity(&c.did).await.unwrap(),
        mgr.resolve_identity(&d.did).await.unwrap(),
    ];
    for view in &views {
        assert_eq!(view.cluster_id, views[0].cluster_id);
        assert_eq!(view.members.len(), 4);
    }
    assert_eq!(mgr.list_clusters().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_merge_keeps_earliest_cluster_id() {
    let mgr = DidManager::in_memory();
    let nodes = four_nodes(&mgr).await;
    let (a, key_a) = &nodes[0];
    let (b, key_b) = &nodes[1];
    let (c, key_c) = &nodes[2];

    // a's singleton cluster is the oldest; it must survive both merges.
    mgr.link_dids(&b.did, key_b, &c.did, key_c).await.unwrap();
    mgr.link_dids(&c.did, key_c, &a.did, key_a).await.unwrap();

    let view = mgr.resolve_identity(&b.did).await.unwrap();
    assert_eq!(view.cluster_id, a.cluster_id);
}

// =========================================================================
// Commutativity / transitivity
// =========================================================================

#[tokio::test]
async fn test_link_is_commutative_in_argument_order() {
    // Same unordered pair, opposite argument order, on two fresh managers:
    // the final partitions agree.
    for flip in [false, true] {
        let mgr = DidManager::in_memory();
        let (a, key_a) = mgr.create_node(None).await.unwrap();
        let (b, key_b) = mgr.create_node(None).await.unwrap();

        if flip {
            mgr.link_dids(&b.did, &key_b, &a.did, &key_a).await.unwrap();
        } else {
            mgr.link_dids(&a.did, &key_a, &b.did, &key_b).await.unwrap();
        }

        let view = mgr.resolve_identity(&a.did).await.unwrap();
        assert_eq!(view.members.len(), 2);
        // earlier cluster always wins, regardless of argument order
        assert_eq!(view.cluster_id, a.cluster_id);
    }
}

#[tokio::test]
async fn test_transitive_merge_any_order() {
    // A-B then B-C must produce the same partition as A-C then A-B.
    let mgr1 = DidManager::in_memory();
    let n1 = four_nodes(&mgr1).await;
    mgr1.link_dids(&n1[0].0.did, &n1[0].1, &n1[1].0.did, &n1[1].1)
        .await
        .unwrap();
    mgr1.link_dids(&n1[1].0.did, &n1[1].1, &n1[2].0.did, &n1[2].1)
        .await
        .unwrap();

    let mgr2 = DidManager::in_memory();
    let n2 = four_nodes(&mgr2).await;
    mgr2.link_dids(&n2[0].0.did, &n2[0].1, &n2[2].0.did, &n2[2].1)
        .await
        .unwrap();
    mgr2.link_dids(&n2[0].0.did, &n2[0].1, &n2[1].0.did, &n2[1].1)
        .await
        .unwrap();

    for (mgr, nodes) in [(&mgr1, &n1), (&mgr2, &n2)] {
        let view = mgr.resolve_identity(&nodes[0].0.did).await.unwrap();
        assert_eq!(view.members.len(), 3);
        // the first-created node's singleton cluster is always the survivor
        assert_eq!(view.cluster_id, nodes[0].0.cluster_id);
        // d remains alone
        let view_d = mgr.resolve_identity(&nodes[3].0.did).await.unwrap();
        assert_eq!(view_d.members.len(), 1);
    }
}

#[tokio::test]
async fn test_replaying_all_proofs_changes_nothing() {
    let mgr = DidManager::in_memory();
    let nodes = four_nodes(&mgr).await;
    let (a, key_a) = &nodes[0];
    let (b, key_b) = &nodes[1];
    let (c, key_c) = &nodes[2];

    let p1 = mgr.link_dids(&a.did, key_a, &b.did, key_b).await.unwrap();
    let p2 = mgr.link_dids(&b.did, key_b, &c.did, key_c).await.unwrap();

    for proof in [&p1, &p2, &p1] {
        mgr.apply_link_proof(proof).await.unwrap();
    }

    let view = mgr.resolve_identity(&a.did).await.unwrap();
    assert_eq!(view.members.len(), 3);
    assert_eq!(view.total_members, 3);
    assert_eq!(mgr.proofs_for(&b.did).await.unwrap().len(), 2);
}

// =========================================================================
// Externally produced proofs
// =========================================================================

#[tokio::test]
async fn test_proof_created_offline_applies_after_transport() {
    let mgr = DidManager::in_memory();
    let (a, key_a) = mgr.create_node(None).await.unwrap();
    let (b, key_b) = mgr.create_node(None).await.unwrap();

    // Proof built outside the manager, serialized as if sent between
    // devices, then applied from the wire form.
    let proof = LinkProof::create(&a.did, &key_a, &b.did, &key_b).unwrap();
    let wire = serde_json::to_string(&proof).unwrap();
    let received: LinkProof = serde_json::from_str(&wire).unwrap();

    assert!(mgr.verify_link_proof(&received).await);
    mgr.apply_link_proof(&received).await.unwrap();

    let view = mgr.resolve_identity(&b.did).await.unwrap();
    assert_eq!(view.members.len(), 2);
}
