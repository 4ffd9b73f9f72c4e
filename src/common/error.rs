use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Cada variante de negócio vira um status HTTP distinto no IntoResponse.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Nenhum campo informado para atualização")]
    AtualizacaoVazia,

    #[error("Cabeçalho 'x-usuario-id' inválido")]
    UsuarioIdInvalido,

    #[error("Produto não encontrado: {0}")]
    ProdutoNaoEncontrado(Uuid),

    #[error("O produto {0} não está no carrinho")]
    ItemNaoEstaNoCarrinho(Uuid),

    #[error("Já existe um produto com o nome '{0}'")]
    NomeProdutoJaExiste(String),

    #[error("Estoque insuficiente para o produto '{nome}'. Disponível: {disponivel}")]
    EstoqueInsuficiente { nome: String, disponivel: i32 },

    #[error("O produto ainda está referenciado em um carrinho")]
    ProdutoEmUso,

    // Conflito de escrita que persistiu após as tentativas de retry.
    #[error("Conflito de concorrência. Tente novamente.")]
    ConflitoDeEscrita,

    #[error("Violação de chave única: {0}")]
    UniqueConstraintViolation(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::AtualizacaoVazia | AppError::UsuarioIdInvalido => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }

            AppError::EstoqueInsuficiente { .. } => (StatusCode::BAD_REQUEST, self.to_string()),

            AppError::ProdutoNaoEncontrado(_) | AppError::ItemNaoEstaNoCarrinho(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }

            AppError::NomeProdutoJaExiste(_)
            | AppError::ProdutoEmUso
            | AppError::ConflitoDeEscrita
            | AppError::UniqueConstraintViolation(_) => (StatusCode::CONFLICT, self.to_string()),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada; o cliente recebe algo genérico.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
