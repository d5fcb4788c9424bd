//! In-memory catalog server used by the integration tests.
//!
//! Implements `HttpTransport`, so a `CatalogClient` can be pointed at it
//! directly. Every request that reaches it is recorded.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use product_catalog::api::{HttpRequest, HttpResponse, HttpTransport};
use product_catalog::auth::{MemoryStorage, TokenStore, TokenValidator};
use product_catalog::{CatalogClient, ClientError, ClientResult, Product, ProductId, User};
use reqwest::Url;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "http://catalog.test";
const SIGNING_KEY: &[u8] = b"fake-server-signing-key";

/// Sign a token for `user` expiring `exp_offset` seconds from now
pub fn issue_token(user: &User, exp_offset: i64) -> String {
    encode(
        &Header::default(),
        &json!({
            "user_id": user.id,
            "username": user.username,
            "email": user.email,
            "exp": Utc::now().timestamp() + exp_offset,
        }),
        &EncodingKey::from_secret(SIGNING_KEY),
    )
    .unwrap()
}

pub fn alice() -> User {
    User {
        id: 1,
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
    }
}

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    products: Vec<Product>,
    next_product_id: i64,
    issued: Vec<String>,
    requests: Vec<HttpRequest>,
    revoke_all: bool,
    token_lifetime: Option<i64>,
    omit_user: bool,
    offline: bool,
}

pub struct FakeServer {
    state: Mutex<State>,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        let server = Self {
            state: Mutex::new(State {
                next_product_id: 1,
                ..Default::default()
            }),
        };
        server.add_account(alice(), "Secret123");
        Arc::new(server)
    }

    /// Server pre-filled with `count` products titled "Product 1".."Product N"
    pub fn with_products(count: usize) -> Arc<Self> {
        let server = Self::new();
        for i in 1..=count {
            server.add_product(&format!("Product {i}"), Some(i as f64));
        }
        server
    }

    pub fn add_account(&self, user: User, password: &str) {
        self.state.lock().unwrap().accounts.push(Account {
            user,
            password: password.to_string(),
        });
    }

    pub fn add_product(&self, title: &str, price: Option<f64>) -> Product {
        let mut state = self.state.lock().unwrap();
        let product = Product {
            id: ProductId::Int(state.next_product_id),
            title: title.to_string(),
            price,
            description: None,
            category: None,
        };
        state.next_product_id += 1;
        state.products.push(product.clone());
        product
    }

    /// Reject every bearer token from now on, as if revoked server-side
    pub fn revoke_all_tokens(&self) {
        self.state.lock().unwrap().revoke_all = true;
    }

    /// Accept issued tokens again after `revoke_all_tokens`
    pub fn accept_tokens_again(&self) {
        self.state.lock().unwrap().revoke_all = false;
    }

    /// Lifetime of tokens issued by later logins
    pub fn set_token_lifetime(&self, seconds: i64) {
        self.state.lock().unwrap().token_lifetime = Some(seconds);
    }

    /// Leave the `user` object out of auth responses
    pub fn omit_user_in_auth_responses(&self) {
        self.state.lock().unwrap().omit_user = true;
    }

    /// Fail every request at the transport level
    pub fn go_offline(&self) {
        self.state.lock().unwrap().offline = true;
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn products(&self) -> Vec<Product> {
        self.state.lock().unwrap().products.clone()
    }

    /// A client whose session lives in its own memory store
    pub fn client(self: &Arc<Self>) -> CatalogClient {
        self.client_with_store(TokenStore::new(Arc::new(MemoryStorage::new())))
    }

    pub fn client_with_store(self: &Arc<Self>, store: TokenStore) -> CatalogClient {
        CatalogClient::with_parts(BASE_URL, store, self.clone(), TokenValidator::new()).unwrap()
    }

    /// A client already logged in as alice
    pub async fn logged_in_client(self: &Arc<Self>) -> CatalogClient {
        let client = self.client();
        client.auth().login("alice", "Secret123").await.unwrap();
        client
    }
}

fn respond(status: u16, body: Value) -> HttpResponse {
    HttpResponse::json(status, &body)
}

fn error(status: u16, message: &str) -> HttpResponse {
    respond(status, json!({ "error": message }))
}

impl State {
    fn auth_response(&mut self, user: User, status: u16) -> HttpResponse {
        let token = issue_token(&user, self.token_lifetime.unwrap_or(3600));
        self.issued.push(token.clone());
        if self.omit_user {
            respond(status, json!({ "token": token }))
        } else {
            respond(status, json!({ "token": token, "user": user }))
        }
    }

    fn authorized(&self, request: &HttpRequest) -> bool {
        if self.revoke_all {
            return false;
        }
        request
            .header("Authorization")
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|token| self.issued.iter().any(|t| t == token))
    }

    fn find_product(&self, id: &str) -> Option<usize> {
        self.products.iter().position(|p| p.id.to_string() == id)
    }

    fn route(&mut self, request: &HttpRequest) -> HttpResponse {
        let url = Url::parse(&request.url).unwrap();
        let segments: Vec<String> = url
            .path_segments()
            .map(|s| s.map(str::to_string).collect())
            .unwrap_or_default();
        let query = |key: &str| {
            url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
        };
        let body = request.body.clone().unwrap_or(Value::Null);
        let segs: Vec<&str> = segments.iter().map(String::as_str).collect();

        match (request.method.as_str(), segs.as_slice()) {
            ("POST", ["auth", "login"]) => {
                let username = body["username"].as_str().unwrap_or_default();
                let password = body["password"].as_str().unwrap_or_default();
                let user = self
                    .accounts
                    .iter()
                    .find(|a| a.user.username == username && a.password == password)
                    .map(|a| a.user.clone());
                match user {
                    Some(user) => self.auth_response(user, 200),
                    None => error(401, "Invalid username or password"),
                }
            }
            ("POST", ["auth", "register"]) => {
                let username = body["username"].as_str().unwrap_or_default().to_string();
                if self.accounts.iter().any(|a| a.user.username == username) {
                    return error(400, "Username already exists");
                }
                let user = User {
                    id: self.accounts.len() as i64 + 1,
                    username,
                    email: body["email"].as_str().unwrap_or_default().to_string(),
                };
                self.accounts.push(Account {
                    user: user.clone(),
                    password: body["password"].as_str().unwrap_or_default().to_string(),
                });
                self.auth_response(user, 201)
            }
            ("POST", ["auth", "forgot-password"]) => respond(200, json!({})),
            _ if !self.authorized(request) => error(401, "Unauthorized"),
            ("GET", ["products"]) => {
                let page: usize = query("page").and_then(|p| p.parse().ok()).unwrap_or(1);
                let per_page: usize = query("per_page").and_then(|p| p.parse().ok()).unwrap_or(10);
                let total = self.products.len();
                let items: Vec<&Product> = self
                    .products
                    .iter()
                    .skip((page - 1) * per_page)
                    .take(per_page)
                    .collect();
                respond(
                    200,
                    json!({
                        "page": page,
                        "per_page": per_page,
                        "total_items": total,
                        "total_pages": total.div_ceil(per_page),
                        "products": items,
                    }),
                )
            }
            ("GET", ["products", "search"]) => {
                let q = query("q").unwrap_or_default().to_lowercase();
                let hits: Vec<&Product> = self
                    .products
                    .iter()
                    .filter(|p| p.title.to_lowercase().contains(&q))
                    .collect();
                respond(200, json!({ "query": q, "count": hits.len(), "products": hits }))
            }
            ("GET", ["products", id]) => match self.find_product(id) {
                Some(i) => respond(200, json!(self.products[i])),
                None => error(404, "Product not found"),
            },
            ("POST", ["products"]) => {
                let Some(title) = body["title"].as_str().filter(|t| !t.is_empty()) else {
                    return error(400, "Title is required");
                };
                let product = Product {
                    id: ProductId::Int(self.next_product_id),
                    title: title.to_string(),
                    price: body["price"].as_f64(),
                    description: body["description"].as_str().map(str::to_string),
                    category: body["category"].as_str().map(str::to_string),
                };
                self.next_product_id += 1;
                self.products.push(product.clone());
                respond(201, json!(product))
            }
            ("PUT", ["products", id]) => {
                let Some(i) = self.find_product(id) else {
                    return error(404, "Product not found");
                };
                let product = &mut self.products[i];
                if let Some(title) = body["title"].as_str() {
                    product.title = title.to_string();
                }
                if let Some(price) = body["price"].as_f64() {
                    product.price = Some(price);
                }
                if let Some(description) = body["description"].as_str() {
                    product.description = Some(description.to_string());
                }
                if let Some(category) = body["category"].as_str() {
                    product.category = Some(category.to_string());
                }
                respond(200, json!(product))
            }
            ("DELETE", ["products", id]) => match self.find_product(id) {
                Some(i) => {
                    self.products.remove(i);
                    respond(200, json!({ "message": "Product deleted successfully" }))
                }
                None => error(404, "Product not found"),
            },
            _ => error(404, "Not found"),
        }
    }
}

#[async_trait]
impl HttpTransport for FakeServer {
    async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let mut state = self.state.lock().unwrap();
        if state.offline {
            return Err(ClientError::Network("connection refused".to_string()));
        }
        state.requests.push(request.clone());
        Ok(state.route(&request))
    }
}
