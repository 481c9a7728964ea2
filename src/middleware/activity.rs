// src/middleware/activity.rs

use axum::{
    extract::State,
    http::Method,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{config::AppState, middleware::company::COMPANY_ID_HEADER, models::auth::User};

// Middleware de auditoria: depois de cada requisição mutante autenticada,
// grava uma linha em user_activity_logs. A gravação roda em uma task
// separada; falha de log nunca derruba a resposta.
pub async fn activity_logger(
    State(app_state): State<AppState>,
    request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let user_id = request.extensions().get::<User>().map(|u| u.id);
    let company_id = request
        .headers()
        .get(COMPANY_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok());

    let response = next.run(request).await;

    // Só leituras não geram auditoria.
    if matches!(method, Method::POST | Method::PUT | Method::DELETE) {
        let status_code = response.status().as_u16() as i32;
        let repo = app_state.activity_repo.clone();
        let method = method.to_string();
        tokio::spawn(async move {
            if let Err(e) = repo
                .insert(user_id, company_id, &method, &path, status_code)
                .await
            {
                tracing::warn!("Falha ao gravar log de atividade: {}", e);
            }
        });
    }

    response
}
