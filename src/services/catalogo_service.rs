// src/services/catalogo_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProdutoRepository,
    models::produto::{AtualizarProduto, Produto},
};

// Regras de negócio do catálogo. Operações de uma única linha: a
// atomicidade de cada statement basta, não há transação multi-tabela aqui.
#[derive(Clone)]
pub struct CatalogoService {
    produto_repo: ProdutoRepository,
    pool: PgPool,
}

impl CatalogoService {
    pub fn new(produto_repo: ProdutoRepository, pool: PgPool) -> Self {
        Self { produto_repo, pool }
    }

    pub async fn criar_produto(
        &self,
        nome: &str,
        preco: Decimal,
        estoque: i32,
    ) -> Result<Produto, AppError> {
        self.produto_repo.criar(&self.pool, nome, preco, estoque).await
    }

    pub async fn listar_produtos(&self) -> Result<Vec<Produto>, AppError> {
        self.produto_repo.listar().await
    }

    pub async fn buscar_produto(&self, id: Uuid) -> Result<Produto, AppError> {
        self.produto_repo
            .buscar_por_id(id)
            .await?
            .ok_or(AppError::ProdutoNaoEncontrado(id))
    }

    /// Aplica apenas os campos informados. Payload sem nenhum campo é
    /// rejeitado antes de tocar no banco.
    pub async fn atualizar_produto(
        &self,
        id: Uuid,
        campos: &AtualizarProduto,
    ) -> Result<Produto, AppError> {
        if campos.esta_vazia() {
            return Err(AppError::AtualizacaoVazia);
        }

        self.produto_repo
            .atualizar(&self.pool, id, campos)
            .await?
            .ok_or(AppError::ProdutoNaoEncontrado(id))
    }

    pub async fn remover_produto(&self, id: Uuid) -> Result<(), AppError> {
        let removido = self.produto_repo.remover(&self.pool, id).await?;
        if !removido {
            return Err(AppError::ProdutoNaoEncontrado(id));
        }
        Ok(())
    }
}
