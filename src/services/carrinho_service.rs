// src/services/carrinho_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CarrinhoRepository, ProdutoRepository},
    models::carrinho::{Carrinho, CarrinhoView},
};

// Quantas vezes uma transação derrubada por conflito de serialização é
// refeita antes de desistirmos e devolvermos 409.
const MAX_TENTATIVAS: u32 = 3;

// O coordenador de reserva de estoque. Toda mutação do carrinho move
// unidades entre produtos.estoque (disponível) e itens_carrinho.quantidade
// (reservado) dentro de UMA transação: ou as duas escritas entram, ou
// nenhuma.
#[derive(Clone)]
pub struct CarrinhoService {
    carrinho_repo: CarrinhoRepository,
    produto_repo: ProdutoRepository,
    pool: PgPool,
}

impl CarrinhoService {
    pub fn new(
        carrinho_repo: CarrinhoRepository,
        produto_repo: ProdutoRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            carrinho_repo,
            produto_repo,
            pool,
        }
    }

    /// Carrinho do usuário, criado sob demanda no primeiro acesso.
    /// Se duas requisições criarem ao mesmo tempo, o perdedor do
    /// ON CONFLICT apenas refaz a busca.
    pub async fn obter_ou_criar_carrinho(&self, usuario_id: Uuid) -> Result<Carrinho, AppError> {
        if let Some(carrinho) = self.carrinho_repo.buscar_por_usuario(usuario_id).await? {
            return Ok(carrinho);
        }

        if let Some(carrinho) = self.carrinho_repo.criar(usuario_id).await? {
            return Ok(carrinho);
        }

        // Perdemos a corrida de criação: o carrinho existe agora.
        self.carrinho_repo
            .buscar_por_usuario(usuario_id)
            .await?
            .ok_or_else(|| {
                anyhow::anyhow!("carrinho do usuário {usuario_id} sumiu após a corrida de criação")
                    .into()
            })
    }

    /// Visão formatada do carrinho: linhas com dados do produto,
    /// subtotais e total calculados na leitura.
    pub async fn ver_carrinho(&self, usuario_id: Uuid) -> Result<CarrinhoView, AppError> {
        let carrinho = self.obter_ou_criar_carrinho(usuario_id).await?;
        self.montar_view(&carrinho).await
    }

    // --- ADICIONAR ITEM (reserva de estoque) ---
    pub async fn adicionar_item(
        &self,
        usuario_id: Uuid,
        produto_id: Uuid,
        quantidade: i32,
    ) -> Result<CarrinhoView, AppError> {
        let carrinho = self.obter_ou_criar_carrinho(usuario_id).await?;

        let mut tentativa = 1;
        loop {
            match self
                .reservar_no_carrinho(carrinho.id, produto_id, quantidade)
                .await
            {
                Ok(()) => break,
                Err(erro) if eh_conflito_de_escrita(&erro) => {
                    if tentativa >= MAX_TENTATIVAS {
                        return Err(AppError::ConflitoDeEscrita);
                    }
                    tracing::warn!(
                        "Conflito de escrita ao reservar o produto {} (tentativa {}). Refazendo a transação.",
                        produto_id,
                        tentativa
                    );
                    tentativa += 1;
                }
                Err(erro) => return Err(erro),
            }
        }

        self.montar_view(&carrinho).await
    }

    // Uma tentativa da reserva, inteira dentro de uma transação.
    async fn reservar_no_carrinho(
        &self,
        carrinho_id: Uuid,
        produto_id: Uuid,
        quantidade: i32,
    ) -> Result<(), AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 1. Trava a linha do produto. Outra transação que queira mexer
        //    nesse estoque espera aqui até o nosso commit.
        let produto = self
            .produto_repo
            .buscar_por_id_para_atualizacao(&mut *tx, produto_id)
            .await?
            .ok_or(AppError::ProdutoNaoEncontrado(produto_id))?;

        // 2. Checa o saldo já com a linha travada: não há como a checagem
        //    ficar obsoleta antes do decremento abaixo.
        //    Sair com Err aqui dá rollback no drop de 'tx'.
        if produto.estoque < quantidade {
            return Err(AppError::EstoqueInsuficiente {
                nome: produto.nome,
                disponivel: produto.estoque,
            });
        }

        // 3. Decrementa o estoque. O WHERE 'estoque + delta >= 0' é a
        //    última linha de defesa do invariante, junto do CHECK no banco.
        let ajustado = self
            .produto_repo
            .ajustar_estoque(&mut *tx, produto_id, -quantidade)
            .await?;
        if ajustado.is_none() {
            return Err(AppError::EstoqueInsuficiente {
                nome: produto.nome,
                disponivel: produto.estoque,
            });
        }

        // 4. Cria a linha do carrinho ou acumula a quantidade na existente.
        self.carrinho_repo
            .upsert_item(&mut *tx, carrinho_id, produto_id, quantidade)
            .await?;

        // 5. As duas escritas entram juntas, ou nenhuma.
        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---
        Ok(())
    }

    // --- REMOVER ITEM (libera a reserva) ---
    // Remove a linha inteira e devolve toda a quantidade ao estoque.
    pub async fn remover_item(
        &self,
        usuario_id: Uuid,
        produto_id: Uuid,
    ) -> Result<CarrinhoView, AppError> {
        // Sem carrinho ainda = o item certamente não está nele.
        let carrinho = self
            .carrinho_repo
            .buscar_por_usuario(usuario_id)
            .await?
            .ok_or(AppError::ItemNaoEstaNoCarrinho(produto_id))?;

        let mut tentativa = 1;
        loop {
            match self.liberar_do_carrinho(carrinho.id, produto_id).await {
                Ok(()) => break,
                Err(erro) if eh_conflito_de_escrita(&erro) => {
                    if tentativa >= MAX_TENTATIVAS {
                        return Err(AppError::ConflitoDeEscrita);
                    }
                    tracing::warn!(
                        "Conflito de escrita ao liberar o produto {} (tentativa {}). Refazendo a transação.",
                        produto_id,
                        tentativa
                    );
                    tentativa += 1;
                }
                Err(erro) => return Err(erro),
            }
        }

        self.montar_view(&carrinho).await
    }

    // Uma tentativa da liberação, inteira dentro de uma transação.
    async fn liberar_do_carrinho(
        &self,
        carrinho_id: Uuid,
        produto_id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Trava o produto primeiro, na MESMA ordem do adicionar_item;
        //    ordem cruzada de travas entre os dois fluxos daria deadlock.
        //    Produto inexistente = certamente não é linha de carrinho (a FK
        //    garante isso).
        self.produto_repo
            .buscar_por_id_para_atualizacao(&mut *tx, produto_id)
            .await?
            .ok_or(AppError::ItemNaoEstaNoCarrinho(produto_id))?;

        // 2. Trava a linha do item; a quantidade lida é a que será devolvida.
        let item = self
            .carrinho_repo
            .buscar_item_para_atualizacao(&mut *tx, carrinho_id, produto_id)
            .await?
            .ok_or(AppError::ItemNaoEstaNoCarrinho(produto_id))?;

        // 3. Devolve a quantidade inteira ao estoque do produto.
        self.produto_repo
            .ajustar_estoque(&mut *tx, produto_id, item.quantidade)
            .await?
            .ok_or(AppError::ProdutoNaoEncontrado(produto_id))?;

        // 4. Apaga a linha do carrinho.
        self.carrinho_repo.remover_item(&mut *tx, item.id).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn montar_view(&self, carrinho: &Carrinho) -> Result<CarrinhoView, AppError> {
        let linhas = self
            .carrinho_repo
            .listar_itens_com_produto(carrinho.id)
            .await?;
        Ok(CarrinhoView::montar(carrinho, linhas))
    }
}

// SQLSTATEs que o Postgres usa para "refaça a transação":
// 40001 = serialization_failure, 40P01 = deadlock_detected.
fn codigo_indica_conflito(codigo: &str) -> bool {
    codigo == "40001" || codigo == "40P01"
}

fn eh_conflito_de_escrita(erro: &AppError) -> bool {
    if let AppError::DatabaseError(sqlx::Error::Database(db_err)) = erro {
        if let Some(codigo) = db_err.code() {
            return codigo_indica_conflito(codigo.as_ref());
        }
    }
    false
}
