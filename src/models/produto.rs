// src/models/produto.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- Produto (catálogo) ---
// Representa a tabela 'produtos'. O 'estoque' é a quantidade ainda
// disponível, ou seja, o que NÃO está reservado em nenhum carrinho.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Produto {
    pub id: Uuid,
    pub nome: String,
    pub preco: Decimal,
    pub estoque: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Atualização parcial ---
// Conjunto de campos opcionais aplicados sobre um produto existente.
// Campos ausentes no JSON ficam como estavam no banco.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtualizarProduto {
    pub nome: Option<String>,
    pub preco: Option<Decimal>,
    pub estoque: Option<i32>,
}

impl AtualizarProduto {
    /// Um payload sem nenhum campo não é uma atualização válida.
    pub fn esta_vazia(&self) -> bool {
        self.nome.is_none() && self.preco.is_none() && self.estoque.is_none()
    }
}
