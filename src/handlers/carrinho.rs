// src/handlers/carrinho.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, middleware::identity::UsuarioAtual};

// ---
// Payload: AdicionarItem
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdicionarItemPayload {
    pub produto_id: Uuid,

    #[validate(range(min = 1, message = "A quantidade deve ser de pelo menos 1."))]
    pub quantidade: i32,
}

// ---
// Handler: adicionar_item
// ---
pub async fn adicionar_item(
    State(app_state): State<AppState>,
    UsuarioAtual(usuario_id): UsuarioAtual,
    Json(payload): Json<AdicionarItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let carrinho = app_state
        .carrinho_service
        .adicionar_item(usuario_id, payload.produto_id, payload.quantidade)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "mensagem": "Item adicionado ao carrinho.",
            "carrinho": carrinho,
        })),
    ))
}

// ---
// Handler: ver_carrinho
// ---
pub async fn ver_carrinho(
    State(app_state): State<AppState>,
    UsuarioAtual(usuario_id): UsuarioAtual,
) -> Result<impl IntoResponse, AppError> {
    let carrinho = app_state.carrinho_service.ver_carrinho(usuario_id).await?;
    Ok((StatusCode::OK, Json(carrinho)))
}

// ---
// Handler: remover_item
// ---
pub async fn remover_item(
    State(app_state): State<AppState>,
    UsuarioAtual(usuario_id): UsuarioAtual,
    Path(produto_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let carrinho = app_state
        .carrinho_service
        .remover_item(usuario_id, produto_id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "mensagem": "Item removido do carrinho.",
            "carrinho": carrinho,
        })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantidade_zero_eh_rejeitada() {
        let payload = AdicionarItemPayload {
            produto_id: Uuid::new_v4(),
            quantidade: 0,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("quantidade"));
    }

    #[test]
    fn quantidade_um_eh_o_minimo_aceito() {
        let payload = AdicionarItemPayload {
            produto_id: Uuid::new_v4(),
            quantidade: 1,
        };
        assert!(payload.validate().is_ok());
    }
}
