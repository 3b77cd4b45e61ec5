use axum::Router;

pub async fn create_test_app() -> Router {
    mathtutor_backend_rust::create_app().await
}
