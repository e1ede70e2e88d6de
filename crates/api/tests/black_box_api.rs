use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use pagecraft_api::app::services::{AppServices, SharedStore};
use pagecraft_auth::{JwtClaims, PrincipalId, Role};
use pagecraft_core::{ExpectedVersion, NetworkId, PageId, PartId, TemplateId};
use pagecraft_infra::{InMemoryPageStore, PageStore, StoreError, provisioning};
use pagecraft_pages::{LocalizedText, Network, Page, Part, PartWrite, PartsSnapshot, Variable};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(services: AppServices) -> Self {
        pagecraft_observability::init_for_tests();
        // Same router as prod, bound to an ephemeral port.
        let app = pagecraft_api::app::build_app(JWT_SECRET.to_string(), services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// One network ("acme") with one empty page ("home").
struct Fixture {
    srv: TestServer,
    network_id: NetworkId,
    page_id: PageId,
    client: reqwest::Client,
}

impl Fixture {
    async fn new() -> Self {
        Self::with_store(Arc::new(InMemoryPageStore::new())).await
    }

    async fn with_store(store: SharedStore) -> Self {
        let services = AppServices::new(store);
        let network = provisioning::ensure_network(services.store(), "acme", "Acme")
            .await
            .unwrap();
        let page = services
            .store()
            .create_page(Page::new(network.network_id(), TemplateId::new(), "home", "Home").unwrap())
            .await
            .unwrap();
        services
            .variables()
            .save_variable(
                page.page_id(),
                "HERO_TITLE",
                LocalizedText::new("", "", "", "Venda mais"),
            )
            .await
            .unwrap();

        Self {
            srv: TestServer::spawn(services).await,
            network_id: network.network_id(),
            page_id: page.page_id(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.srv.base_url, path)
    }

    fn manager_token(&self) -> String {
        mint_jwt(self.network_id, vec![Role::network_manager()])
    }

    async fn insert(&self, token: &str, kind: &str) -> serde_json::Value {
        let res = self
            .client
            .post(self.url(&format!("/pages/{}/parts", self.page_id)))
            .bearer_auth(token)
            .json(&json!({
                "kind": kind,
                "acceptable_kinds": ["HERO01", "PLAN_4_COLS", "PRODUCT01", "TEAM_3_COLS"],
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }
}

/// Serves page headers until its read budget runs out, then fails them.
struct HeaderBudgetStore {
    inner: InMemoryPageStore,
    header_reads_left: AtomicUsize,
}

impl HeaderBudgetStore {
    fn new() -> Self {
        Self {
            inner: InMemoryPageStore::new(),
            header_reads_left: AtomicUsize::new(usize::MAX),
        }
    }
}

#[async_trait::async_trait]
impl PageStore for HeaderBudgetStore {
    async fn create_network(&self, network: Network) -> Result<Network, StoreError> {
        self.inner.create_network(network).await
    }

    async fn find_network(&self, slug: &str) -> Result<Network, StoreError> {
        self.inner.find_network(slug).await
    }

    async fn create_page(&self, page: Page) -> Result<Page, StoreError> {
        self.inner.create_page(page).await
    }

    async fn get_page(&self, page_id: PageId) -> Result<Page, StoreError> {
        let left = self
            .header_reads_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if left.is_err() {
            return Err(StoreError::Backend("db down".into()));
        }
        self.inner.get_page(page_id).await
    }

    async fn find_page(&self, network_slug: &str, page_slug: &str) -> Result<Page, StoreError> {
        self.inner.find_page(network_slug, page_slug).await
    }

    async fn get_parts(&self, page_id: PageId) -> Result<PartsSnapshot, StoreError> {
        self.inner.get_parts(page_id).await
    }

    async fn get_part(&self, part_id: PartId) -> Result<Part, StoreError> {
        self.inner.get_part(part_id).await
    }

    async fn commit_parts(
        &self,
        page_id: PageId,
        expected_version: ExpectedVersion,
        writes: Vec<PartWrite>,
    ) -> Result<u64, StoreError> {
        self.inner.commit_parts(page_id, expected_version, writes).await
    }

    async fn get_variables(&self, page_id: PageId) -> Result<BTreeMap<String, Variable>, StoreError> {
        self.inner.get_variables(page_id).await
    }

    async fn get_variable(&self, page_id: PageId, key: &str) -> Result<Option<Variable>, StoreError> {
        self.inner.get_variable(page_id, key).await
    }

    async fn put_variable(&self, variable: Variable) -> Result<(), StoreError> {
        self.inner.put_variable(variable).await
    }
}

fn mint_jwt(network_id: NetworkId, roles: Vec<Role>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: PrincipalId::new(),
        network_id,
        roles,
        issued_at: now - ChronoDuration::seconds(5),
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn part_ids(page: &serde_json::Value) -> Vec<String> {
    page["parts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["part_id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_is_public() {
    let fx = Fixture::new().await;
    let res = fx.client.get(fx.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn public_page_fetch_resolves_variables_with_fallback() {
    let fx = Fixture::new().await;
    let res = fx
        .client
        .get(fx.url("/networks/acme/pages/home?lang=en"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["slug"], "home");
    assert_eq!(page["page_id"].as_str().unwrap(), fx.page_id.to_string());
    assert_eq!(page["variables"]["HERO_TITLE"], "Venda mais");
    assert!(page["parts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_page_and_bad_language_are_reported() {
    let fx = Fixture::new().await;
    let res = fx
        .client
        .get(fx.url("/networks/acme/pages/nowhere"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");

    let res = fx
        .client
        .get(fx.url("/networks/acme/pages/home?lang=klingon"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn editing_requires_a_token() {
    let fx = Fixture::new().await;
    let res = fx
        .client
        .post(fx.url(&format!("/pages/{}/parts", fx.page_id)))
        .json(&json!({ "kind": "HERO01", "acceptable_kinds": ["HERO01"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = fx
        .client
        .get(fx.url(&format!("/pages/{}", fx.page_id)))
        .bearer_auth("garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn insert_move_delete_return_the_reloaded_page() {
    let fx = Fixture::new().await;
    let token = fx.manager_token();

    let a = fx.insert(&token, "HERO01").await;
    assert_eq!(a["result"]["outcome"], "inserted");
    assert_eq!(a["result"]["part"]["position"], 0);
    let b = fx.insert(&token, "PLAN_4_COLS").await;
    let c = fx.insert(&token, "PRODUCT01").await;
    assert_eq!(c["result"]["part"]["position"], 2);
    let (a_id, b_id, c_id) = (
        a["result"]["part"]["part_id"].as_str().unwrap().to_string(),
        b["result"]["part"]["part_id"].as_str().unwrap().to_string(),
        c["result"]["part"]["part_id"].as_str().unwrap().to_string(),
    );

    // [A, B, C] -> move C up -> [A, C, B]
    let res = fx
        .client
        .post(fx.url(&format!("/parts/{c_id}/move-up")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let moved: serde_json::Value = res.json().await.unwrap();
    assert_eq!(moved["result"]["changed"], true);
    assert_eq!(part_ids(&moved["page"]), vec![a_id.clone(), c_id.clone(), b_id.clone()]);

    // Head cannot move up: no-op, not an error.
    let res = fx
        .client
        .post(fx.url(&format!("/parts/{a_id}/move-up")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let noop: serde_json::Value = res.json().await.unwrap();
    assert_eq!(noop["result"]["changed"], false);
    assert_eq!(noop["page"]["version"], moved["page"]["version"]);

    // Delete C -> [A@0, B@1]
    let res = fx
        .client
        .delete(fx.url(&format!("/parts/{c_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let deleted: serde_json::Value = res.json().await.unwrap();
    assert_eq!(part_ids(&deleted["page"]), vec![a_id, b_id]);
    assert_eq!(deleted["page"]["parts"][1]["position"], 1);
}

#[tokio::test]
async fn kind_outside_the_allow_list_is_rejected() {
    let fx = Fixture::new().await;
    let res = fx
        .client
        .post(fx.url(&format!("/pages/{}/parts", fx.page_id)))
        .bearer_auth(fx.manager_token())
        .json(&json!({ "kind": "TEAM_3_COLS", "acceptable_kinds": ["PRODUCT01"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let page: serde_json::Value = fx
        .client
        .get(fx.url("/networks/acme/pages/home"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(page["parts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn update_changes_the_kind_in_place() {
    let fx = Fixture::new().await;
    let token = fx.manager_token();
    fx.insert(&token, "HERO01").await;
    let b = fx.insert(&token, "PLAN_4_COLS").await;
    let b_id = b["result"]["part"]["part_id"].as_str().unwrap();

    let res = fx
        .client
        .put(fx.url(&format!("/parts/{b_id}")))
        .bearer_auth(&token)
        .json(&json!({ "kind": "TEAM_3_COLS", "acceptable_kinds": ["TEAM_3_COLS"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["result"]["outcome"], "updated");
    assert_eq!(body["page"]["parts"][1]["kind"], "TEAM_3_COLS");
    assert_eq!(body["page"]["parts"][1]["position"], 1);
}

#[tokio::test]
async fn foreign_network_token_is_forbidden() {
    let fx = Fixture::new().await;
    let foreign = mint_jwt(NetworkId::new(), vec![Role::admin()]);

    let res = fx
        .client
        .post(fx.url(&format!("/pages/{}/parts", fx.page_id)))
        .bearer_auth(&foreign)
        .json(&json!({ "kind": "HERO01", "acceptable_kinds": ["HERO01"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = fx
        .client
        .get(fx.url(&format!("/pages/{}", fx.page_id)))
        .bearer_auth(&foreign)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_without_edit_permission_is_forbidden() {
    let fx = Fixture::new().await;
    let viewer = mint_jwt(fx.network_id, vec![Role::new("viewer")]);

    let res = fx
        .client
        .get(fx.url(&format!("/pages/{}", fx.page_id)))
        .bearer_auth(&viewer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = fx
        .client
        .put(fx.url(&format!("/pages/{}/variables/HERO_TITLE", fx.page_id)))
        .bearer_auth(&viewer)
        .json(&json!({ "english": "Sell more" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn variables_can_be_saved_and_read_back() {
    let fx = Fixture::new().await;
    let token = fx.manager_token();
    let url = fx.url(&format!("/pages/{}/variables/CTA", fx.page_id));

    let res = fx
        .client
        .put(format!("{url}?lang=fr"))
        .bearer_auth(&token)
        .json(&json!({ "english": "Buy now", "portuguese": "Compre agora" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let saved: serde_json::Value = res.json().await.unwrap();
    assert_eq!(saved["result"]["outcome"], "variable_saved");
    // French is empty: portuguese comes first in the fallback order.
    assert_eq!(saved["page"]["variables"]["CTA"], "Compre agora");

    let res = fx
        .client
        .get(format!("{url}?lang=en"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["key"], "CTA");
    assert_eq!(body["texts"]["french"], "");
    assert_eq!(body["resolved"]["found"], true);
    assert_eq!(body["resolved"]["text"], "Buy now");

    let res = fx
        .client
        .get(fx.url(&format!("/pages/{}/variables/MISSING", fx.page_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_lists_every_part_kind() {
    let fx = Fixture::new().await;
    let res = fx.client.get(fx.url("/catalog/parts")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let kinds: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds.len(), 8);
    assert!(kinds.contains(&"PRODUCT_LIST_3_COLS"));
}

#[tokio::test]
async fn whoami_reflects_the_token() {
    let fx = Fixture::new().await;
    let res = fx
        .client
        .get(fx.url("/whoami"))
        .bearer_auth(fx.manager_token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["network_id"].as_str().unwrap(), fx.network_id.to_string());
    assert!(body["roles"].as_array().unwrap().iter().any(|r| r == "network_manager"));
}

#[tokio::test]
async fn padded_variable_keys_round_trip() {
    let fx = Fixture::new().await;
    let token = fx.manager_token();
    let url = fx.url(&format!("/pages/{}/variables/%20CTA%20", fx.page_id));

    let res = fx
        .client
        .put(&url)
        .bearer_auth(&token)
        .json(&json!({ "english": "Buy now" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = fx.client.get(&url).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["key"], "CTA");
    assert_eq!(body["resolved"]["text"], "Buy now");
}

#[tokio::test]
async fn committed_insert_is_reported_even_when_the_reload_fails() {
    let store = Arc::new(HeaderBudgetStore::new());
    let fx = Fixture::with_store(store.clone()).await;

    // One header read for the edit check; the reload after commit fails.
    store.header_reads_left.store(1, Ordering::SeqCst);
    let res = fx
        .client
        .post(fx.url(&format!("/pages/{}/parts", fx.page_id)))
        .bearer_auth(fx.manager_token())
        .json(&json!({ "kind": "HERO01", "acceptable_kinds": ["HERO01"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["result"]["outcome"], "inserted");
    assert!(body["page"].is_null());

    let snapshot = store.get_parts(fx.page_id).await.unwrap();
    assert_eq!(snapshot.parts.len(), 1);
    assert_eq!(
        body["result"]["part"]["part_id"].as_str().unwrap(),
        snapshot.parts[0].part_id().to_string()
    );
}
