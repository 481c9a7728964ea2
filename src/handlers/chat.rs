// src/handlers/chat.rs

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, Paginated},
        response::Envelope,
    },
    config::AppState,
    middleware::company::CompanyContext,
    models::auth::User,
};

// O handshake de WebSocket não carrega o header Authorization nos
// navegadores, então o token vem pela query string.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ChatHubQuery {
    pub task_id: Uuid,
    pub token: String,
}

/// GET /chat-hub?taskId=...&token=...
/// Valida o token, confirma que a tarefa pertence à empresa do usuário e
/// entra no grupo de broadcast daquela tarefa.
pub async fn chat_hub(
    State(app_state): State<AppState>,
    Query(query): Query<ChatHubQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.auth_service.validate_token(&query.token).await?;

    // A tarefa precisa existir na empresa do próprio usuário.
    app_state
        .project_repo
        .find_task(query.task_id, user.company_id)
        .await?
        .ok_or(AppError::NotFound("Tarefa"))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, app_state, user, query.task_id)))
}

async fn handle_socket(socket: WebSocket, app_state: AppState, user: User, task_id: Uuid) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = app_state.chat_hub.subscribe(task_id).await;

    // Task de saída: tudo que o hub publicar no grupo vai para este socket.
    let mut send_task = tokio::spawn(async move {
        while let Ok(payload) = rx.recv().await {
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // Task de entrada: cada texto recebido é persistido e retransmitido.
    let recv_state = app_state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Text(body) = message {
                let body = body.trim().to_string();
                if body.is_empty() {
                    continue;
                }

                match recv_state
                    .chat_repo
                    .insert_message(user.company_id, task_id, user.id, &body)
                    .await
                {
                    Ok(saved) => {
                        if let Ok(payload) = serde_json::to_string(&saved) {
                            recv_state.chat_hub.publish(task_id, payload).await;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Falha ao persistir mensagem de chat: {}", e);
                    }
                }
            }
        }
    });

    // Se qualquer lado terminar, derruba o outro.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    app_state.chat_hub.prune(task_id).await;
}

// Histórico persistido da tarefa (a conexão WebSocket só entrega o ao vivo).
#[utoipa::path(
    get,
    path = "/api/tasks/{id}/messages",
    tag = "Chat",
    params(
        PageParams,
        ("id" = Uuid, Path, description = "ID da tarefa"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    responses((status = 200, description = "Mensagens da tarefa, paginadas")),
    security(("api_jwt" = []))
)]
pub async fn list_messages(
    State(app_state): State<AppState>,
    company: CompanyContext,
    Path(id): Path<Uuid>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .project_repo
        .find_task(id, company.0)
        .await?
        .ok_or(AppError::NotFound("Tarefa"))?;

    let (messages, total) = app_state.chat_repo.list_by_task(company.0, id, &page).await?;
    Ok(Envelope::ok(Paginated::new(messages, total, &page)))
}
