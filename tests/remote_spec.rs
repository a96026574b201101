//! HTTP client and store end-to-end against the reference notes service.

use std::time::Duration;

use stickies::api::create_router;
use stickies::db::Database;
use stickies::mirror::{FileMirror, LocalMirror};
use stickies::models::*;
use stickies::remote::{ClientError, HttpRemote, RemoteNotes};
use stickies::store::{NoteStore, StoreError};

/// Serve the notes API on an ephemeral port and return its collection URL.
async fn spawn_server() -> String {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    format!("http://{}/notes", addr)
}

/// A URL nothing is listening on.
async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    drop(listener);
    format!("http://{}/notes", addr)
}

fn make_note(id: NoteId, text: &str) -> Note {
    Note {
        id,
        text: text.to_string(),
        color: DEFAULT_COLOR.to_string(),
        pinned: false,
    }
}

mod http_remote {
    use super::*;

    #[tokio::test]
    async fn create_list_delete_round_trip() {
        let remote = HttpRemote::new(spawn_server().await);

        let saved = remote.create(&make_note(11, "over the wire")).await.unwrap();
        assert_eq!(saved, make_note(11, "over the wire"));

        assert_eq!(remote.list().await.unwrap(), vec![saved.clone()]);

        remote.delete(saved.id).await.unwrap();
        assert!(remote.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_not_found() {
        let remote = HttpRemote::new(spawn_server().await);

        let err = remote.delete(99).await.unwrap_err();

        assert!(matches!(err, ClientError::NotFound(_)));
    }

    #[tokio::test]
    async fn blank_create_is_bad_request() {
        let remote = HttpRemote::new(spawn_server().await);

        let err = remote.create(&make_note(1, " ")).await.unwrap_err();

        assert!(matches!(err, ClientError::BadRequest(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_an_http_error() {
        let remote = HttpRemote::with_timeout(dead_url().await, Some(Duration::from_secs(5)))
            .expect("Failed to build client");

        let err = remote.list().await.unwrap_err();

        assert!(matches!(err, ClientError::Http(_)));
    }
}

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn store_survives_a_restart_through_both_mirrors() {
        let url = spawn_server().await;
        let dir = tempfile::tempdir().unwrap();

        let store = NoteStore::new(FileMirror::new(dir.path()), HttpRemote::new(&url));
        store.initialize().await.unwrap();
        let kept = store.add("keep", "#00ff00").await.unwrap().unwrap();
        let dropped = store.add("drop", DEFAULT_COLOR).await.unwrap().unwrap();
        store.delete(dropped.id).await.unwrap();

        let restarted = NoteStore::new(FileMirror::new(dir.path()), HttpRemote::new(&url));
        restarted.initialize().await.unwrap();

        assert_eq!(restarted.notes(), vec![kept]);
    }

    #[tokio::test]
    async fn offline_start_serves_the_local_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = FileMirror::new(dir.path());
        mirror.save(&[make_note(1, "cached")]).unwrap();

        let store = NoteStore::new(mirror, HttpRemote::new(dead_url().await));
        let result = store.initialize().await;

        assert!(matches!(result, Err(StoreError::Remote(ClientError::Http(_)))));
        assert_eq!(store.notes(), vec![make_note(1, "cached")]);

        // Local-only edits still reach the mirror while offline
        store.toggle_pin(1).unwrap();
        let reloaded = FileMirror::new(dir.path()).load().unwrap().unwrap();
        assert!(reloaded[0].pinned);
    }
}
