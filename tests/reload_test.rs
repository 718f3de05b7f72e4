mod common;

use assert2::{check, let_assert};
use common::{LoadedSite, lunr_store, member, publication, site_records, site_state};
use rstest::rstest;
use sitesearch_mcp::tools::reload::{IndexInfoRequest, ReloadRequest, handle_index_info, handle_reload};
use sitesearch_mcp::{LoadError, SearchServer};

/// Test: Rewriting the store and reloading swaps in the new records.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reload_picks_up_new_records(#[future(awt)] site_state: LoadedSite) {
    let LoadedSite { site, state } = site_state;

    let mut records = site_records();
    records.push(member("Ana"));
    site.write_store(&records);

    let_assert!(Ok(output) = handle_reload(&state, ReloadRequest::default()).await);
    check!(output.contains(&format!("Documents: {}", records.len())));
    check!(state.search("ana", None).await.map(|h| h.len()) == Some(1));
}

/// Test: A broken rewrite keeps serving the previous index.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reload_failure_keeps_previous_index(#[future(awt)] site_state: LoadedSite) {
    let LoadedSite { site, state } = site_state;
    let before = state.current().await.map(|index| index.len());

    let records = site_records();
    let doubled: Vec<_> = records.iter().chain(records.iter()).cloned().collect();
    site.write_store(&doubled);

    let_assert!(Err(msg) = handle_reload(&state, ReloadRequest::default()).await);
    check!(msg.contains("duplicate url"));
    check!(state.current().await.map(|index| index.len()) == before);
    check!(state.search("claire", None).await.map(|h| h.len()) == Some(1));
}

/// Test: Reloading from a different path switches the configured store.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reload_switches_store(#[future(awt)] site_state: LoadedSite) {
    let LoadedSite { site, state } = site_state;
    let other = site.create_file(
        "other/search.json",
        &serde_json::to_string(&[publication(2021, "Crop Yield Forecasting", "W3000000001")])
            .expect("records serialize"),
    );

    let request = ReloadRequest {
        path: Some(other.display().to_string()),
    };
    let_assert!(Ok(_) = handle_reload(&state, request).await);
    check!(state.store_path().await == Some(other));
    check!(state.search("claire", None).await == Some(vec![]));
    check!(state.search("yield", None).await.map(|h| h.len()) == Some(1));
}

/// Test: Index info lists title collisions found in the store.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn index_info_reports_collisions(#[future(awt)] site_state: LoadedSite) {
    let LoadedSite { site, state } = site_state;
    let mut twin = member("Marc");
    twin["url"] = serde_json::json!("/members/marc-2/");
    site.write_store(&[member("Claire"), member("Marc"), twin]);

    let_assert!(Ok(_) = handle_reload(&state, ReloadRequest::default()).await);
    let_assert!(Ok(info) = handle_index_info(&state, IndexInfoRequest {}).await);
    check!(info.contains("Titles shared by several documents (1)"));
    check!(info.contains("/members/marc-2/"));
}

/// Test: Concurrent readers keep working while reloads run.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reload_concurrent_with_queries(#[future(awt)] site_state: LoadedSite) {
    let LoadedSite { site, state } = site_state;
    site.create_file(
        "_site/assets/js/lunr/lunr-store.js",
        &lunr_store(&[member("Claire"), member("Vishal")]),
    );

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let state = state.clone();
            tokio::spawn(async move { state.search("claire", None).await })
        })
        .collect();
    let reload = {
        let state = state.clone();
        tokio::spawn(async move { state.reload(None).await.map(|index| index.len()) })
    };

    for reader in readers {
        let_assert!(Ok(Some(hits)) = reader.await);
        check!(hits.len() == 1);
    }
    let_assert!(Ok(Ok(2)) = reload.await);
}

/// Test: A server started without a store reports it and rejects blind reloads.
#[tokio::test]
async fn server_without_store() {
    let server = SearchServer::new(std::sync::Arc::default());
    let state = server.state();

    let_assert!(Ok(info) = handle_index_info(state, IndexInfoRequest {}).await);
    check!(info.contains("No search index loaded"));
    let_assert!(Err(LoadError::NoStore) = state.reload(None).await);
}
