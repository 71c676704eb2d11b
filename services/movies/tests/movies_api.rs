//! Black-box tests for the movies HTTP surface
//!
//! Each test spawns the real router on an ephemeral port, backed by a private
//! in-memory database, and drives it over HTTP.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use common::database::DatabaseConfig;
use movies::{
    AppState,
    auth::{AuthGate, Capability, Credentials},
    create_router, fixtures,
    jwt::{JwtConfig, JwtService},
};
use reqwest::StatusCode;
use serde_json::{Value, json};

const SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    state: AppState,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(HashSet::from([Capability::SearchMovies])).await
    }

    async fn spawn_with(protected: HashSet<Capability>) -> Self {
        let gate = AuthGate::new(
            jwt(SECRET),
            protected,
            Some(Credentials {
                user: "admin".to_string(),
                password: "admin".to_string(),
            }),
        );

        let state = AppState::connect(&DatabaseConfig::in_memory(), gate)
            .await
            .expect("failed to set up state");
        let app = create_router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn jwt(secret: &str) -> JwtService {
    JwtService::new(JwtConfig {
        secret: secret.to_string(),
        access_token_expiry: 900,
    })
}

fn dune() -> Value {
    json!({
        "title": "Dune",
        "overview": "A noble family becomes embroiled in a war for Arrakis",
        "year": 2021,
        "rating": 8.5,
        "category": "Sci-Fi"
    })
}

async fn create(client: &reqwest::Client, srv: &TestServer, movie: &Value) -> i64 {
    let res = client
        .post(srv.url("/movies"))
        .json(movie)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let location = res.headers()[reqwest::header::LOCATION]
        .to_str()
        .unwrap()
        .to_string();
    location
        .strip_prefix("/movies/")
        .and_then(|id| id.parse().ok())
        .expect("location header carries the new id")
}

async fn login(client: &reqwest::Client, srv: &TestServer) -> String {
    let res = client
        .post(srv.url("/login"))
        .json(&json!({"user": "admin", "password": "admin"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn greeting_is_html() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers()[reqwest::header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert!(res.text().await.unwrap().contains("<h1>"));
}

#[tokio::test]
async fn health_reports_database_up() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn created_movie_is_retrievable_with_identical_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/movies"))
        .json(&dune())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let list: Vec<Value> = res.json().await.unwrap();
    assert_eq!(list.len(), 1);

    let id = list[0]["id"].as_i64().unwrap();
    let res = client
        .get(srv.url(&format!("/movies/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let mut expected = dune();
    expected["id"] = json!(id);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, expected);
}

#[tokio::test]
async fn create_returns_every_stored_movie() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create(&client, &srv, &dune()).await;
    let res = client
        .post(srv.url("/movies"))
        .json(&dune())
        .send()
        .await
        .unwrap();

    let list: Vec<Value> = res.json().await.unwrap();
    assert_eq!(list.len(), 2, "duplicates are allowed and both are returned");
}

#[tokio::test]
async fn long_title_is_rejected_and_nothing_is_stored() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut movie = dune();
    movie["title"] = json!("Dune: Part One, the director's cut");

    let res = client
        .post(srv.url("/movies"))
        .json(&movie)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["details"][0]["field"], "title");
    assert_eq!(srv.state.movie_repository.count().await.unwrap(), 0);
}

#[tokio::test]
async fn every_violation_is_listed() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/movies"))
        .json(&json!({"title": "Dune", "year": 2030, "rating": 0.5}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = res.json().await.unwrap();
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["category", "overview", "rating", "year"]);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/movies"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(r#"{"title": "Dune", "year": "#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(srv.state.movie_repository.count().await.unwrap(), 0);
}

#[tokio::test]
async fn missing_movie_is_not_found() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/movies/9999")).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn list_returns_all_movies() {
    let srv = TestServer::spawn().await;
    srv.state
        .movie_repository
        .seed_if_empty(&fixtures::seed_movies())
        .await
        .unwrap();

    let res = reqwest::get(srv.url("/movies")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let list: Vec<Value> = res.json().await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["title"], "Avatar");
}

#[tokio::test]
async fn update_replaces_all_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let id = create(&client, &srv, &dune()).await;

    let replacement = json!({
        "id": 12345,
        "title": "Arrival",
        "overview": "A linguist works with the military",
        "year": 2016,
        "rating": 7.9,
        "category": "Drama"
    });

    let res = client
        .put(srv.url(&format!("/movies/{}", id)))
        .json(&replacement)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = reqwest::get(srv.url(&format!("/movies/{}", id)))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let mut expected = replacement;
    expected["id"] = json!(id);
    assert_eq!(body, expected);
}

#[tokio::test]
async fn update_missing_movie_is_not_found() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .put(srv.url("/movies/77"))
        .json(&dune())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_update_is_rejected_before_lookup() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let id = create(&client, &srv, &dune()).await;

    let mut movie = dune();
    movie["rating"] = json!(12.0);

    let res = client
        .put(srv.url(&format!("/movies/{}", id)))
        .json(&movie)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let stored = srv.state.movie_repository.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.rating, 8.5);
}

#[tokio::test]
async fn second_delete_is_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let id = create(&client, &srv, &dune()).await;

    let url = srv.url(&format!("/movies/{}", id));
    let res = client.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_id_is_rejected() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/movies/abc")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn login_issues_a_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/login"))
        .json(&json!({"user": "admin", "password": "admin"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"], "admin");
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 900);

    let token = body["access_token"].as_str().unwrap();
    assert_eq!(jwt(SECRET).validate_token(token).unwrap().sub, "admin");
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(srv.url("/login"))
        .json(&json!({"user": "admin", "password": "guess"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_without_password_field_is_rejected() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(srv.url("/login"))
        .json(&json!({"user": "admin"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn search_requires_a_bearer_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create(&client, &srv, &dune()).await;

    let url = srv.url("/movies?category=Sci-Fi&year=2021");

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let foreign = jwt("other-secret").issue_token("admin").unwrap();
    let res = client.get(&url).bearer_auth(foreign).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let expired = jwt(SECRET)
        .issue_token_at("admin", Utc::now() - Duration::hours(1))
        .unwrap();
    let res = client.get(&url).bearer_auth(expired).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn search_matches_category_and_year_exactly() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create(&client, &srv, &dune()).await;

    let mut tenet = dune();
    tenet["title"] = json!("Tenet");
    tenet["year"] = json!(2020);
    create(&client, &srv, &tenet).await;

    let token = login(&client, &srv).await;

    let res = client
        .get(srv.url("/movies?category=Sci-Fi&year=2021"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let list: Vec<Value> = res.json().await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["title"], "Dune");

    let res = client
        .get(srv.url("/movies/?category=sci-fi&year=2021"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_with_one_parameter_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = login(&client, &srv).await;

    let res = client
        .get(srv.url("/movies?category=Sci-Fi"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["details"][0]["field"], "year");
}

#[tokio::test]
async fn any_route_can_be_protected_by_configuration() {
    let srv =
        TestServer::spawn_with(HashSet::from([Capability::SearchMovies, Capability::DeleteMovie]))
            .await;
    let client = reqwest::Client::new();
    let id = create(&client, &srv, &dune()).await;
    let url = srv.url(&format!("/movies/{}", id));

    let res = client.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(srv.state.movie_repository.count().await.unwrap(), 1);

    let token = login(&client, &srv).await;
    let res = client.delete(&url).bearer_auth(token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client.get(srv.url("/movies")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK, "listing stays open");
}
