// src/models/carrinho.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- Carrinho ---
// Um carrinho por usuário (UNIQUE em usuario_id), criado sob demanda.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Carrinho {
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// --- Item do carrinho ---
// A reserva de 'quantidade' unidades de um produto dentro de um carrinho.
// Enquanto a linha existe, essas unidades não contam no estoque disponível.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ItemCarrinho {
    pub id: Uuid,
    pub carrinho_id: Uuid,
    pub produto_id: Uuid,
    pub quantidade: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha do JOIN itens_carrinho × produtos, usada para montar a visão.
#[derive(Debug, Clone, FromRow)]
pub struct ItemComProduto {
    pub produto_id: Uuid,
    pub nome: String,
    pub quantidade: i32,
    pub preco: Decimal,
}

// --- Visão formatada do carrinho ---
// Totais calculados na leitura, nunca armazenados.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCarrinhoView {
    pub produto_id: Uuid,
    pub nome: String,
    pub quantidade: i32,
    pub preco_unitario: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrinhoView {
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub itens: Vec<ItemCarrinhoView>,
    pub total: Decimal,
}

impl CarrinhoView {
    /// Projeta o carrinho e suas linhas na resposta da API:
    /// subtotal = quantidade * preço unitário, total = soma dos subtotais.
    pub fn montar(carrinho: &Carrinho, linhas: Vec<ItemComProduto>) -> Self {
        let itens: Vec<ItemCarrinhoView> = linhas
            .into_iter()
            .map(|linha| {
                let subtotal = linha.preco * Decimal::from(linha.quantidade);
                ItemCarrinhoView {
                    produto_id: linha.produto_id,
                    nome: linha.nome,
                    quantidade: linha.quantidade,
                    preco_unitario: linha.preco,
                    subtotal,
                }
            })
            .collect();

        let total = itens.iter().map(|item| item.subtotal).sum();

        Self {
            id: carrinho.id,
            usuario_id: carrinho.usuario_id,
            itens,
            total,
        }
    }
}
