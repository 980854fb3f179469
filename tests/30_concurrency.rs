mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::HashSet;

/// N concurrent creates against one dataset must all land: distinct ids and
/// no lost update, despite every write rewriting the whole dataset file.
#[tokio::test]
async fn concurrent_creates_all_survive() -> Result<()> {
    const WRITERS: usize = 12;

    let server = common::spawn_server().await?;
    let admin = common::admin_token(&server.base_url).await?;

    let tasks: Vec<_> = (0..WRITERS)
        .map(|n| {
            let base_url = server.base_url.clone();
            let token = admin.clone();
            tokio::spawn(async move {
                let client = reqwest::Client::new();
                let res = client
                    .post(format!("{}/api/shortcuts/systemShortcuts", base_url))
                    .bearer_auth(&token)
                    .json(&json!({ "sequence": format!("cmd+{}", n) }))
                    .send()
                    .await
                    .expect("request");
                assert_eq!(res.status(), StatusCode::OK);
                let body = res.json::<Value>().await.expect("json");
                body["data"]["id"].as_str().expect("id").to_string()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for task in tasks {
        ids.insert(task.await?);
    }
    assert_eq!(ids.len(), WRITERS, "every create got a distinct id");

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/api/shortcuts", server.base_url))
        .bearer_auth(&admin)
        .send()
        .await?;
    let data = res.json::<Value>().await?["data"].clone();
    let stored: HashSet<_> = data["systemShortcuts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(stored, ids, "no record lost under concurrent writers");
    Ok(())
}

/// Reads racing a stream of writes never observe a torn dataset: every
/// response parses, carries all eight collection keys, and the record count
/// only grows. Atomic rename means a reader sees pre- or post-write state.
#[tokio::test]
async fn reads_during_writes_see_consistent_snapshots() -> Result<()> {
    const WRITERS: usize = 10;

    let server = common::spawn_server().await?;
    let admin = common::admin_token(&server.base_url).await?;

    let writers: Vec<_> = (0..WRITERS)
        .map(|n| {
            let base_url = server.base_url.clone();
            let token = admin.clone();
            tokio::spawn(async move {
                let client = reqwest::Client::new();
                let res = client
                    .post(format!("{}/api/shortcuts/leaderShortcuts", base_url))
                    .bearer_auth(&token)
                    .json(&json!({ "sequence": format!("leader {}", n) }))
                    .send()
                    .await
                    .expect("request");
                assert_eq!(res.status(), StatusCode::OK);
            })
        })
        .collect();

    let client = reqwest::Client::new();
    let mut writers = writers;
    let mut seen = 0usize;
    while !writers.is_empty() {
        let res = client
            .get(format!("{}/api/shortcuts", server.base_url))
            .bearer_auth(&admin)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);

        let data = res.json::<Value>().await?["data"].clone();
        for key in [
            "systemShortcuts",
            "leaderShortcuts",
            "raycastShortcuts",
            "apps",
            "systemGroups",
            "leaderGroups",
            "raycastGroups",
            "appsLibrary",
        ] {
            assert!(data[key].is_array(), "snapshot missing '{}'", key);
        }
        let records = data["leaderShortcuts"].as_array().unwrap();
        for record in records {
            assert!(record["id"].is_string(), "record without an id");
            assert!(record["sequence"].is_string(), "record without its fields");
        }
        assert!(records.len() >= seen, "record count went backwards");
        seen = records.len();

        let mut still_running = Vec::new();
        for task in writers {
            if task.is_finished() {
                task.await?;
            } else {
                still_running.push(task);
            }
        }
        writers = still_running;
    }

    let res = client
        .get(format!("{}/api/shortcuts", server.base_url))
        .bearer_auth(&admin)
        .send()
        .await?;
    let data = res.json::<Value>().await?["data"].clone();
    assert_eq!(
        data["leaderShortcuts"].as_array().unwrap().len(),
        WRITERS,
        "all writes visible once writers finish"
    );
    Ok(())
}

/// Writers on different datasets do not block or clobber each other.
#[tokio::test]
async fn writes_to_different_datasets_are_independent() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = common::admin_token(&server.base_url).await?;
    let demo = common::demo_token(&server.base_url).await?;

    let mut tasks = Vec::new();
    for (token, name) in [(admin.clone(), "primary"), (demo.clone(), "demo")] {
        for n in 0..6 {
            let base_url = server.base_url.clone();
            let token = token.clone();
            let name = name.to_string();
            tasks.push(tokio::spawn(async move {
                let client = reqwest::Client::new();
                let res = client
                    .post(format!("{}/api/shortcuts/apps", base_url))
                    .bearer_auth(&token)
                    .json(&json!({ "name": format!("{}-{}", name, n) }))
                    .send()
                    .await
                    .expect("request");
                assert_eq!(res.status(), StatusCode::OK);
            }));
        }
    }
    for task in futures::future::join_all(tasks).await {
        task?;
    }

    let client = reqwest::Client::new();
    for (token, prefix) in [(&admin, "primary"), (&demo, "demo")] {
        let res = client
            .get(format!("{}/api/shortcuts", server.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        let data = res.json::<Value>().await?["data"].clone();
        let apps = data["apps"].as_array().unwrap();
        assert_eq!(apps.len(), 6, "{} dataset kept all its writes", prefix);
        for record in apps {
            assert!(record["name"].as_str().unwrap().starts_with(prefix));
        }
    }
    Ok(())
}
