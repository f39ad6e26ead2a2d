//! HTTP handlers for the pet store API
//!
//! One handler per (verb, path). Each decodes its input, runs the fixed
//! statement(s) for its operation through the repositories on [`AppState`],
//! and returns either a typed body or an [`Error`](crate::error::Error) that is
//! mapped to a status code in one place.
//!
//! | Resource | Module |
//! |----------|--------|
//! | `/pet/...` | [`pets`] |
//! | `/store/...` | [`store`] |
//! | `/user/...` | [`users`] |

mod extract;
mod pets;
mod query;
mod store;
mod users;

pub use extract::{parse_id, JsonBody, QueryParams};
pub use query::{split_list, LoginQuery, PetFormQuery, StatusQuery, TagsQuery, DEFAULT_STATUS};

use axum::Router;

use crate::state::AppState;

/// Every pet store route, still waiting for its state
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(pets::routes())
        .merge(store::routes())
        .merge(users::routes())
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Drive the router in-process over a fresh in-memory store

    use axum::{
        body::{to_bytes, Body, Bytes},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::state::AppState;

    const MAX_BODY: usize = 1024 * 1024;

    pub struct TestApp {
        pub state: AppState,
        pub router: Router,
    }

    impl TestApp {
        pub async fn new() -> Self {
            let state = AppState::in_memory().await.unwrap();
            let router = super::routes().with_state(state.clone());
            Self { state, router }
        }

        pub async fn add_pet(&self, name: &str, status: &str) -> i64 {
            self.state.pets().insert(name, status).await.unwrap()
        }

        pub async fn tag_pet(&self, pet_id: i64, tag: &str) {
            let pool = self.state.db().pool();
            let tag_id = sqlx::query("INSERT INTO tags (name) VALUES (?)")
                .bind(tag)
                .execute(pool)
                .await
                .unwrap()
                .last_insert_rowid();
            sqlx::query("INSERT INTO pet_tags (pet_id, tag_id) VALUES (?, ?)")
                .bind(pet_id)
                .bind(tag_id)
                .execute(pool)
                .await
                .unwrap();
        }

        /// Make every insert of `username` fail inside the store
        pub async fn reject_username(&self, username: &str) {
            let sql = format!(
                "CREATE TRIGGER reject_{username} BEFORE INSERT ON users \
                 WHEN NEW.username = '{username}' \
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END"
            );
            sqlx::query(&sql).execute(self.state.db().pool()).await.unwrap();
        }
    }

    async fn dispatch(app: &TestApp, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), MAX_BODY).await.unwrap();
        (status, body)
    }

    fn json_or_null(body: &[u8]) -> Value {
        if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(body).unwrap()
        }
    }

    /// Send an optional JSON body; an empty response body reads as `null`
    pub async fn send(
        app: &TestApp,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let (status, bytes) = dispatch(app, builder.body(body).unwrap()).await;
        (status, json_or_null(&bytes))
    }

    /// Send a raw body, optionally with a content type
    pub async fn send_raw(
        app: &TestApp,
        method: Method,
        uri: &str,
        body: &str,
        content_type: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        let (status, bytes) = dispatch(app, request).await;
        (status, json_or_null(&bytes))
    }

    /// GET returning the body as text
    pub async fn send_text(app: &TestApp, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, bytes) = dispatch(app, request).await;
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }
}
