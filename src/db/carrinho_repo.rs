// src/db/carrinho_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::carrinho::{Carrinho, ItemCarrinho, ItemComProduto},
};

// O repositório do carrinho, responsável pelas tabelas
// 'carrinhos' e 'itens_carrinho'.
#[derive(Clone)]
pub struct CarrinhoRepository {
    pool: PgPool,
}

impl CarrinhoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Carrinho
    // ---

    pub async fn buscar_por_usuario(
        &self,
        usuario_id: Uuid,
    ) -> Result<Option<Carrinho>, AppError> {
        let maybe_carrinho =
            sqlx::query_as::<_, Carrinho>("SELECT * FROM carrinhos WHERE usuario_id = $1")
                .bind(usuario_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(maybe_carrinho)
    }

    /// Tenta criar o carrinho do usuário. Em uma corrida de criação, o
    /// perdedor cai no ON CONFLICT, nenhuma linha retorna e o chamador
    /// refaz a busca em vez de receber erro.
    pub async fn criar(&self, usuario_id: Uuid) -> Result<Option<Carrinho>, AppError> {
        let maybe_carrinho = sqlx::query_as::<_, Carrinho>(
            r#"
            INSERT INTO carrinhos (usuario_id)
            VALUES ($1)
            ON CONFLICT (usuario_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(usuario_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_carrinho)
    }

    // ---
    // Itens (transacionais)
    // ---
    // Estas usam o padrão genérico 'Executor' para rodar dentro da mesma
    // transação que mexe no estoque do produto.

    /// Busca a linha de um produto no carrinho travando-a (FOR UPDATE),
    /// para que a remoção leia uma quantidade que ninguém mais está mudando.
    pub async fn buscar_item_para_atualizacao<'e, E>(
        &self,
        executor: E,
        carrinho_id: Uuid,
        produto_id: Uuid,
    ) -> Result<Option<ItemCarrinho>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe_item = sqlx::query_as::<_, ItemCarrinho>(
            r#"
            SELECT * FROM itens_carrinho
            WHERE carrinho_id = $1 AND produto_id = $2
            FOR UPDATE
            "#,
        )
        .bind(carrinho_id)
        .bind(produto_id)
        .fetch_optional(executor)
        .await?;
        Ok(maybe_item)
    }

    /// "UPSERT" da linha do carrinho: cria com a quantidade pedida ou,
    /// se o produto já está no carrinho (ON CONFLICT), acumula a
    /// quantidade na linha existente. Atômico, sem janela de corrida.
    pub async fn upsert_item<'e, E>(
        &self,
        executor: E,
        carrinho_id: Uuid,
        produto_id: Uuid,
        quantidade: i32,
    ) -> Result<ItemCarrinho, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, ItemCarrinho>(
            r#"
            INSERT INTO itens_carrinho (carrinho_id, produto_id, quantidade)
            VALUES ($1, $2, $3)
            ON CONFLICT (produto_id, carrinho_id)
            DO UPDATE SET
                quantidade = itens_carrinho.quantidade + EXCLUDED.quantidade,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(carrinho_id)
        .bind(produto_id)
        .bind(quantidade)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    /// Remove a linha inteira (não há remoção parcial de quantidade).
    pub async fn remover_item<'e, E>(&self, executor: E, item_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM itens_carrinho WHERE id = $1")
            .bind(item_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Linhas do carrinho com os dados do produto associado, para a visão
    /// formatada. Ordem de inserção, estável entre leituras.
    pub async fn listar_itens_com_produto(
        &self,
        carrinho_id: Uuid,
    ) -> Result<Vec<ItemComProduto>, AppError> {
        let linhas = sqlx::query_as::<_, ItemComProduto>(
            r#"
            SELECT ic.produto_id, p.nome, ic.quantidade, p.preco
            FROM itens_carrinho ic
            JOIN produtos p ON p.id = ic.produto_id
            WHERE ic.carrinho_id = $1
            ORDER BY ic.created_at ASC, ic.id ASC
            "#,
        )
        .bind(carrinho_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(linhas)
    }
}
