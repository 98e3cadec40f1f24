pub async fn health_handler() -> &'static str {
    "Service is ready"
}
