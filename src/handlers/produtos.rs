// src/handlers/produtos.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{common::error::AppError, config::AppState, models::produto::AtualizarProduto};

// ---
// Validação Customizada
// ---
// 'validator' não tem range para Decimal, então o mínimo é checado na mão.
fn validar_preco_minimo(preco: &Decimal) -> Result<(), ValidationError> {
    if *preco < Decimal::new(1, 2) {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.01);
        err.message = Some("O preço mínimo é 0.01.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: CriarProduto
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CriarProdutoPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: String,

    #[validate(custom(function = "validar_preco_minimo"))]
    pub preco: Decimal,

    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    pub estoque: i32,
}

// Os campos da atualização parcial são todos opcionais; os presentes
// seguem as mesmas regras da criação. Validação manual campo a campo
// para montar o mesmo formato de resposta do Validator.
fn validar_campos_informados(campos: &AtualizarProduto) -> Result<(), AppError> {
    let mut errors = validator::ValidationErrors::new();

    if let Some(nome) = &campos.nome {
        if nome.is_empty() {
            let mut err = ValidationError::new("length");
            err.message = Some("O nome é obrigatório.".into());
            errors.add("nome", err);
        }
    }
    if let Some(preco) = &campos.preco {
        if let Err(err) = validar_preco_minimo(preco) {
            errors.add("preco", err);
        }
    }
    if let Some(estoque) = campos.estoque {
        if estoque < 0 {
            let mut err = ValidationError::new("range");
            err.message = Some("O estoque não pode ser negativo.".into());
            errors.add("estoque", err);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}

// ---
// Handler: criar_produto
// ---
pub async fn criar_produto(
    State(app_state): State<AppState>,
    Json(payload): Json<CriarProdutoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let novo_produto = app_state
        .catalogo_service
        .criar_produto(&payload.nome, payload.preco, payload.estoque)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "mensagem": "Produto criado com sucesso.",
            "produto": novo_produto,
        })),
    ))
}

// ---
// Handler: listar_produtos
// ---
pub async fn listar_produtos(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let produtos = app_state.catalogo_service.listar_produtos().await?;
    Ok((StatusCode::OK, Json(produtos)))
}

// ---
// Handler: buscar_produto
// ---
pub async fn buscar_produto(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let produto = app_state.catalogo_service.buscar_produto(id).await?;
    Ok((StatusCode::OK, Json(produto)))
}

// ---
// Handler: atualizar_produto
// ---
pub async fn atualizar_produto(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(campos): Json<AtualizarProduto>,
) -> Result<impl IntoResponse, AppError> {
    validar_campos_informados(&campos)?;

    let produto = app_state
        .catalogo_service
        .atualizar_produto(id, &campos)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "mensagem": "Produto atualizado com sucesso.",
            "produto": produto,
        })),
    ))
}

// ---
// Handler: remover_produto
// ---
pub async fn remover_produto(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalogo_service.remover_produto(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
