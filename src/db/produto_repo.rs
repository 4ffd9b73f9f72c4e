// src/db/produto_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::produto::{AtualizarProduto, Produto},
};

// O repositório de produtos, responsável por todas as interações
// com a tabela 'produtos'.
#[derive(Clone)]
pub struct ProdutoRepository {
    pool: PgPool,
}

impl ProdutoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---
    // Leituras simples usam a pool principal direto.

    /// Lista todos os produtos em ordem de inserção (ordem estável).
    pub async fn listar(&self) -> Result<Vec<Produto>, AppError> {
        let produtos = sqlx::query_as::<_, Produto>(
            "SELECT * FROM produtos ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(produtos)
    }

    pub async fn buscar_por_id(&self, id: Uuid) -> Result<Option<Produto>, AppError> {
        let maybe_produto =
            sqlx::query_as::<_, Produto>("SELECT * FROM produtos WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(maybe_produto)
    }

    /// Busca travando a linha (FOR UPDATE). Quem chegar depois em outra
    /// transação espera aqui, então a checagem de estoque feita em seguida
    /// nunca enxerga um saldo obsoleto.
    pub async fn buscar_por_id_para_atualizacao<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Produto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe_produto =
            sqlx::query_as::<_, Produto>("SELECT * FROM produtos WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(maybe_produto)
    }

    // ---
    // Funções de "Escrita"
    // ---

    /// Cria um produto. Nome duplicado vira erro de conflito.
    pub async fn criar<'e, E>(
        &self,
        executor: E,
        nome: &str,
        preco: Decimal,
        estoque: i32,
    ) -> Result<Produto, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Produto>(
            r#"
            INSERT INTO produtos (nome, preco, estoque)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(nome)
        .bind(preco)
        .bind(estoque)
        .fetch_one(executor)
        .await
        .map_err(|e| Self::mapear_nome_duplicado(e, nome))
    }

    /// Atualização parcial: COALESCE mantém o valor atual para os campos
    /// não informados, em um único UPDATE atômico.
    pub async fn atualizar<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        campos: &AtualizarProduto,
    ) -> Result<Option<Produto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe_produto = sqlx::query_as::<_, Produto>(
            r#"
            UPDATE produtos
            SET nome = COALESCE($2, nome),
                preco = COALESCE($3, preco),
                estoque = COALESCE($4, estoque),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(campos.nome.as_deref())
        .bind(campos.preco)
        .bind(campos.estoque)
        .fetch_optional(executor)
        .await
        .map_err(|e| Self::mapear_nome_duplicado(e, campos.nome.as_deref().unwrap_or_default()))?;

        Ok(maybe_produto)
    }

    /// Remove um produto. Retorna false se o id não existir.
    /// Um produto ainda referenciado por um carrinho é barrado pela FK
    /// (ON DELETE RESTRICT) e vira AppError::ProdutoEmUso.
    pub async fn remover<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM produtos WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::ProdutoEmUso;
                    }
                }
                e.into()
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Ajusta o estoque por um delta (negativo reserva, positivo devolve).
    /// O WHERE garante que o saldo nunca fique negativo: se a condição não
    /// bater, nenhuma linha é retornada e nada foi alterado.
    pub async fn ajustar_estoque<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        delta: i32,
    ) -> Result<Option<Produto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe_produto = sqlx::query_as::<_, Produto>(
            r#"
            UPDATE produtos
            SET estoque = estoque + $2,
                updated_at = now()
            WHERE id = $1 AND estoque + $2 >= 0
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(executor)
        .await?;

        Ok(maybe_produto)
    }

    // Converte violação de chave única da coluna 'nome' no erro de negócio.
    fn mapear_nome_duplicado(e: sqlx::Error, nome: &str) -> AppError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or_default();
                if constraint.contains("nome") {
                    return AppError::NomeProdutoJaExiste(nome.to_string());
                }
                return AppError::UniqueConstraintViolation(constraint.to_string());
            }
        }
        e.into()
    }
}
