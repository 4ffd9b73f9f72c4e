// src/middleware/identity.rs

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState};

// A identidade real é um colaborador externo deste serviço. Aqui apenas
// recebemos o id do dono do carrinho: pelo cabeçalho 'x-usuario-id' ou,
// na ausência dele, pelo usuário padrão configurado (placeholder até o
// sistema de identidade existir).
pub struct UsuarioAtual(pub Uuid);

fn extrair_usuario(headers: &HeaderMap, padrao: Uuid) -> Result<Uuid, AppError> {
    match headers.get("x-usuario-id") {
        Some(valor) => {
            let texto = valor.to_str().map_err(|_| AppError::UsuarioIdInvalido)?;
            Uuid::parse_str(texto).map_err(|_| AppError::UsuarioIdInvalido)
        }
        None => Ok(padrao),
    }
}

// Extrator para obter o usuário diretamente nos handlers
impl FromRequestParts<AppState> for UsuarioAtual {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        extrair_usuario(&parts.headers, state.usuario_padrao).map(UsuarioAtual)
    }
}
