//! Concurrent creators racing on the same unseen topic.
//!
//! The registry does not serialize creators per topic. Both callers miss the
//! cache, both reach the provider, and both records end up cached.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Barrier;
use vonage_video_core::{
    CreateSessionOptions, CreatedSession, RegistryConfig, Result, SessionCreator, SessionRegistry,
};

/// Holds every caller until `parties` of them are inside the creator
struct GatedCreator {
    barrier: Barrier,
    calls: AtomicUsize,
}

#[async_trait]
impl SessionCreator for GatedCreator {
    async fn create_session(&self, _options: &CreateSessionOptions) -> Result<CreatedSession> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.barrier.wait().await;
        Ok(CreatedSession {
            session_id: format!("race-{}", n),
            project_id: None,
        })
    }
}

#[tokio::test]
async fn test_concurrent_misses_both_create_and_both_stay_reachable() {
    let registry = SessionRegistry::new(RegistryConfig::default());
    let creator = GatedCreator {
        barrier: Barrier::new(2),
        calls: AtomicUsize::new(0),
    };
    let options = CreateSessionOptions::default();

    let (a, b) = tokio::join!(
        registry.create_for_topic("spot-A", &creator, &options),
        registry.create_for_topic("spot-A", &creator, &options),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(creator.calls.load(Ordering::SeqCst), 2);
    assert_ne!(a.session_id, b.session_id);
    assert_eq!(registry.size(), 2);

    // Both remain valid by id
    assert!(registry.get(&a.session_id).is_ok());
    assert!(registry.get(&b.session_id).is_ok());

    // Topic lookups now converge on a single winner without another remote call
    let winner = registry.find_by_topic("spot-A").unwrap();
    assert!(winner.session_id == a.session_id || winner.session_id == b.session_id);

    let after = registry.create_for_topic("spot-A", &creator, &options).await.unwrap();
    assert_eq!(after.session_id, winner.session_id);
    assert_eq!(creator.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_proceed_while_creators_run() {
    let registry = Arc::new(SessionRegistry::new(RegistryConfig::default()));
    let creator = Arc::new(GatedCreator {
        barrier: Barrier::new(1),
        calls: AtomicUsize::new(0),
    });
    let options = CreateSessionOptions::default();

    let seeded = registry.create_for_topic("seed", creator.as_ref(), &options).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let registry = Arc::clone(&registry);
        let creator = Arc::clone(&creator);
        let seeded_id = seeded.session_id.clone();
        handles.push(tokio::spawn(async move {
            let topic = format!("spot-{}", i);
            let record = registry
                .create_for_topic(&topic, creator.as_ref(), &CreateSessionOptions::default())
                .await
                .unwrap();
            assert_eq!(registry.get(&seeded_id).unwrap().session_id, seeded_id);
            record
        }));
    }

    for handle in handles {
        let record = handle.await.unwrap();
        assert_eq!(registry.find_by_topic(record.topic_key.as_deref().unwrap()).unwrap(), record);
    }
    assert_eq!(registry.size(), 9);
    assert_eq!(registry.sweep(), 0);
}
