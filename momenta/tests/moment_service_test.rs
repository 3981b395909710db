mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use momenta::error::{MomentaError, Result};
use momenta::models::{MediaKind, MediaRef, Theme, Thread};
use momenta::services::{MediaFile, MediaStore, MomentService, Outcome, ThreadStore};

use common::offline_config;

#[derive(Default)]
struct MemoryThreadStore {
    threads: Mutex<Vec<Thread>>,
    fail_saves: bool,
}

#[async_trait]
impl ThreadStore for MemoryThreadStore {
    async fn load(&self) -> Result<Vec<Thread>> {
        Ok(self.threads.lock().unwrap().clone())
    }

    async fn save(&self, threads: &[Thread]) -> Result<()> {
        if self.fail_saves {
            return Err(MomentaError::Store("sync layer offline".to_string()));
        }
        *self.threads.lock().unwrap() = threads.to_vec();
        Ok(())
    }
}

#[derive(Default)]
struct MemoryMediaStore {
    fail_uploads_named: Vec<String>,
    deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn upload(&self, file: MediaFile) -> Result<MediaRef> {
        if self.fail_uploads_named.contains(&file.name) {
            return Err(MomentaError::Media(format!("upload refused: {}", file.name)));
        }
        Ok(MediaRef {
            url: format!("mem://{}", file.name),
            kind: file.kind,
            name: file.name,
        })
    }

    async fn delete(&self, url: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

fn image(name: &str) -> MediaFile {
    MediaFile {
        name: name.to_string(),
        kind: MediaKind::Image,
        bytes: vec![0xde, 0xad],
    }
}

fn service(
    store: Arc<MemoryThreadStore>,
    media: Arc<MemoryMediaStore>,
) -> MomentService {
    MomentService::new(&offline_config(), store, media)
}

#[tokio::test]
async fn offline_record_creates_and_persists_a_thread() {
    let store = Arc::new(MemoryThreadStore::default());
    let media = Arc::new(MemoryMediaStore::default());
    let service = service(store.clone(), media);

    let outcome = service
        .handle_input("数据源付费墙豁免问题已解决", Vec::new())
        .await
        .unwrap();

    let Outcome::Recorded {
        threads,
        highlight_thread_id,
    } = outcome
    else {
        panic!("expected a record outcome");
    };

    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].id, highlight_thread_id);
    assert_eq!(threads[0].category.theme, Theme::Work);
    assert_eq!(threads[0].entries.len(), 1);

    let persisted = store.load().await.unwrap();
    assert_eq!(persisted.len(), 1);
}

#[tokio::test]
async fn same_category_follow_up_merges_within_the_window() {
    let store = Arc::new(MemoryThreadStore::default());
    let media = Arc::new(MemoryMediaStore::default());
    let service = service(store.clone(), media);

    service
        .handle_input("数据源付费墙豁免问题已解决", Vec::new())
        .await
        .unwrap();
    let outcome = service
        .handle_input("付费墙数据接口联调继续推进", Vec::new())
        .await
        .unwrap();

    let Outcome::Recorded { threads, .. } = outcome else {
        panic!("expected a record outcome");
    };

    // coarse fallback rule: same category within the window collapses into
    // one card with two entries
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].entries.len(), 2);
    assert!(threads[0].entries[0].timestamp <= threads[0].entries[1].timestamp);
}

#[tokio::test]
async fn failed_upload_drops_the_attachment_but_not_the_record() {
    let store = Arc::new(MemoryThreadStore::default());
    let media = Arc::new(MemoryMediaStore {
        fail_uploads_named: vec!["broken.mp4".to_string()],
        ..Default::default()
    });
    let service = service(store, media);

    let outcome = service
        .handle_input(
            "带娃去公园玩",
            vec![image("park.jpg"), image("broken.mp4")],
        )
        .await
        .unwrap();

    let Outcome::Recorded { threads, .. } = outcome else {
        panic!("expected a record outcome");
    };

    let attachments = &threads[0].entries[0].attachments;
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].url, "mem://park.jpg");
}

#[tokio::test]
async fn save_failure_cleans_up_uploaded_media() {
    let store = Arc::new(MemoryThreadStore {
        fail_saves: true,
        ..Default::default()
    });
    let media = Arc::new(MemoryMediaStore::default());
    let service = service(store, media.clone());

    let error = service
        .handle_input("带娃去公园玩", vec![image("park.jpg")])
        .await
        .unwrap_err();

    assert!(matches!(error, MomentaError::Store(_)));
    assert_eq!(*media.deleted.lock().unwrap(), vec!["mem://park.jpg".to_string()]);
}

#[tokio::test]
async fn fresh_store_digest_is_the_deterministic_default() {
    let store = Arc::new(MemoryThreadStore::default());
    let media = Arc::new(MemoryMediaStore::default());
    let service = service(store, media);

    let digest = service.today_digest(false).await.unwrap();
    assert!(digest.deep_memories.is_empty());
    assert!(digest.tasks.is_empty());
}
