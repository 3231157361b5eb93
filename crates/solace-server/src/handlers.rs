//! API route handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, info, warn};

use solace_core::directory::{
    Counselor, CounselorUpdate, NewCounselor, NewResource, Resource, ResourceUpdate,
};

use crate::error::{ApiError, Result};
use crate::models::{
    ChatView, ChatsResponse, ClassifyRequest, ClassifyResponse, EmergencyResponse,
    SendMessageRequest, SendMessageResponse, StartChatRequest, StatsResponse, TaxonomyResponse,
};
use crate::state::AppState;

/// POST /api/classify - Check text for emergency language.
pub async fn classify(
    State(state): State<AppState>,
    Json(req): Json<ClassifyRequest>,
) -> Json<ClassifyResponse> {
    debug!(text_len = req.text.len(), "Classifying text");

    let detection = state.classifier.detect_all(&req.text);

    if detection.is_emergency {
        info!(
            matches = detection.matches.len(),
            latency_us = detection.duration_us,
            "Emergency language in classified text"
        );
    }

    Json(detection.into())
}

/// GET /api/taxonomy - List categories and trigger phrases.
pub async fn get_taxonomy(State(state): State<AppState>) -> Json<TaxonomyResponse> {
    Json(TaxonomyResponse::new(
        state.classifier.taxonomy(),
        state.classifier.mode(),
    ))
}

/// POST /api/chats - Start a demo chat with the assistant.
pub async fn start_chat(
    State(state): State<AppState>,
    Json(req): Json<StartChatRequest>,
) -> Result<(StatusCode, Json<ChatView>)> {
    let user_id = req
        .user_id
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "anonymous".to_string());
    let chat_id = state.next_chat_id();

    let chat = state.assistant.open(chat_id.clone(), user_id);
    let view = ChatView::from(&chat);

    {
        let mut directory = state.directory_mut()?;
        directory.record_chat(chat);
        directory.prune_chats(state.max_chats, &chat_id);
    }

    info!(chat_id = %chat_id, "Started demo chat");
    Ok((StatusCode::CREATED, Json(view)))
}

/// POST /api/chats/{id}/messages - Send a message in a demo chat.
pub async fn send_message(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>> {
    let (exchange, chat_is_emergency) = {
        let mut directory = state.directory_mut()?;
        let chat = directory.chat_mut(&chat_id)?;
        if chat.counselor_id.is_some() {
            return Err(ApiError::BadRequest(format!(
                "chat {} is handled by a counselor",
                chat_id
            )));
        }
        let exchange = state.assistant.respond(chat, &req.text)?;
        (exchange, chat.is_emergency())
    };

    if exchange.detection.is_emergency {
        warn!(chat_id = %chat_id, "Chat flagged as emergency");
    }

    Ok(Json(SendMessageResponse {
        user_message: exchange.user_message,
        reply: exchange.reply,
        detection: exchange.detection.into(),
        chat_is_emergency,
    }))
}

/// DELETE /api/chats/{id} - Close a chat that was never flagged.
pub async fn close_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<StatusCode> {
    state.directory_mut()?.close_chat(&chat_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/chats - List all chats.
pub async fn list_chats(State(state): State<AppState>) -> Result<Json<ChatsResponse>> {
    let directory = state.directory()?;
    let chats: Vec<ChatView> = directory.chats().iter().map(ChatView::from).collect();
    let total = chats.len();
    Ok(Json(ChatsResponse { chats, total }))
}

/// GET /api/chats/{id} - Get one chat.
pub async fn get_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatView>> {
    let directory = state.directory()?;
    let chat = directory.chat(&chat_id)?;
    Ok(Json(ChatView::from(chat)))
}

/// GET /api/chats/emergency - List chats flagged as emergencies.
pub async fn emergency_chats(State(state): State<AppState>) -> Result<Json<EmergencyResponse>> {
    let cases = state.directory()?.emergency_cases();
    let total = cases.len();
    Ok(Json(EmergencyResponse { cases, total }))
}

/// GET /api/counselors - List counselors.
pub async fn list_counselors(State(state): State<AppState>) -> Result<Json<Vec<Counselor>>> {
    Ok(Json(state.directory()?.counselors().to_vec()))
}

/// POST /api/counselors - Add a counselor.
pub async fn create_counselor(
    State(state): State<AppState>,
    Json(req): Json<NewCounselor>,
) -> Result<(StatusCode, Json<Counselor>)> {
    let counselor = state.directory_mut()?.add_counselor(req)?;
    Ok((StatusCode::CREATED, Json(counselor)))
}

/// PUT /api/counselors/{id} - Update a counselor.
pub async fn update_counselor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CounselorUpdate>,
) -> Result<Json<Counselor>> {
    Ok(Json(state.directory_mut()?.update_counselor(&id, req)?))
}

/// DELETE /api/counselors/{id} - Remove a counselor.
pub async fn delete_counselor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.directory_mut()?.delete_counselor(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/resources - List resources.
pub async fn list_resources(State(state): State<AppState>) -> Result<Json<Vec<Resource>>> {
    Ok(Json(state.directory()?.resources().to_vec()))
}

/// POST /api/resources - Add a resource.
pub async fn create_resource(
    State(state): State<AppState>,
    Json(req): Json<NewResource>,
) -> Result<(StatusCode, Json<Resource>)> {
    let resource = state.directory_mut()?.add_resource(req)?;
    Ok((StatusCode::CREATED, Json(resource)))
}

/// PUT /api/resources/{id} - Update a resource.
pub async fn update_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ResourceUpdate>,
) -> Result<Json<Resource>> {
    Ok(Json(state.directory_mut()?.update_resource(&id, req)?))
}

/// DELETE /api/resources/{id} - Remove a resource.
pub async fn delete_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.directory_mut()?.delete_resource(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/stats - Dashboard counts.
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.directory()?.stats();
    Ok(Json(StatsResponse { stats }))
}
