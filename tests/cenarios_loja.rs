// Testes de cenário contra um PostgreSQL de verdade.
//
// Ficam atrás de #[ignore] para que `cargo test` rode sem banco. Para
// executá-los: suba um Postgres, exporte DATABASE_URL e rode
// `cargo test -- --ignored`.

use rust_decimal::Decimal;
use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use loja_backend::{
    common::error::AppError,
    db::{CarrinhoRepository, ProdutoRepository},
    models::produto::AtualizarProduto,
    services::{CarrinhoService, CatalogoService},
};

async fn preparar() -> (CatalogoService, CarrinhoService) {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL deve ser definida para os testes de integração");

    let pool: PgPool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Falha ao conectar no banco de testes");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Falha ao rodar as migrações no banco de testes");

    let produto_repo = ProdutoRepository::new(pool.clone());
    let carrinho_repo = CarrinhoRepository::new(pool.clone());
    let catalogo = CatalogoService::new(produto_repo.clone(), pool.clone());
    let carrinho = CarrinhoService::new(carrinho_repo, produto_repo, pool);

    (catalogo, carrinho)
}

// Cada teste usa nomes e usuários próprios para não colidir com os demais.
fn nome_unico(prefixo: &str) -> String {
    format!("{} {}", prefixo, Uuid::new_v4())
}

fn preco(centavos: i64) -> Decimal {
    Decimal::new(centavos, 2)
}

#[tokio::test]
#[ignore = "requer um PostgreSQL acessível via DATABASE_URL"]
async fn cenario_a_e_b_reserva_e_estoque_insuficiente() {
    let (catalogo, carrinho) = preparar().await;
    let usuario = Uuid::new_v4();

    let widget = catalogo
        .criar_produto(&nome_unico("Widget"), preco(1000), 5)
        .await
        .unwrap();

    // Cenário A: adicionar 3 reserva o estoque e calcula os totais.
    let view = carrinho.adicionar_item(usuario, widget.id, 3).await.unwrap();
    assert_eq!(view.itens.len(), 1);
    assert_eq!(view.itens[0].quantidade, 3);
    assert_eq!(view.itens[0].subtotal, preco(3000));
    assert_eq!(view.total, preco(3000));

    let widget_apos = catalogo.buscar_produto(widget.id).await.unwrap();
    assert_eq!(widget_apos.estoque, 2);

    // Cenário B: repetir a adição de 3 com só 2 disponíveis falha,
    // e nada muda nem no estoque nem na linha.
    let erro = carrinho
        .adicionar_item(usuario, widget.id, 3)
        .await
        .unwrap_err();
    match erro {
        AppError::EstoqueInsuficiente { nome, disponivel } => {
            assert_eq!(nome, widget.nome);
            assert_eq!(disponivel, 2);
        }
        outro => panic!("esperava EstoqueInsuficiente, veio {outro:?}"),
    }

    let widget_final = catalogo.buscar_produto(widget.id).await.unwrap();
    assert_eq!(widget_final.estoque, 2);

    let view_final = carrinho.ver_carrinho(usuario).await.unwrap();
    assert_eq!(view_final.itens[0].quantidade, 3);
}

#[tokio::test]
#[ignore = "requer um PostgreSQL acessível via DATABASE_URL"]
async fn cenario_c_nome_de_produto_eh_unico() {
    let (catalogo, _) = preparar().await;
    let nome = nome_unico("Widget");

    catalogo.criar_produto(&nome, preco(1000), 5).await.unwrap();

    let erro = catalogo
        .criar_produto(&nome, preco(2000), 1)
        .await
        .unwrap_err();
    assert!(matches!(erro, AppError::NomeProdutoJaExiste(n) if n == nome));
}

#[tokio::test]
#[ignore = "requer um PostgreSQL acessível via DATABASE_URL"]
async fn cenario_d_atualizacao_vazia_eh_rejeitada() {
    let (catalogo, _) = preparar().await;

    let produto = catalogo
        .criar_produto(&nome_unico("Widget"), preco(1000), 5)
        .await
        .unwrap();

    let erro = catalogo
        .atualizar_produto(produto.id, &AtualizarProduto::default())
        .await
        .unwrap_err();
    assert!(matches!(erro, AppError::AtualizacaoVazia));
}

#[tokio::test]
#[ignore = "requer um PostgreSQL acessível via DATABASE_URL"]
async fn cenario_e_adicoes_concorrentes_nao_furam_o_estoque() {
    let (catalogo, carrinho) = preparar().await;

    // 2 * 3 > 5: só uma das duas reservas pode entrar.
    let produto = catalogo
        .criar_produto(&nome_unico("Disputado"), preco(500), 5)
        .await
        .unwrap();

    let servico_a = carrinho.clone();
    let servico_b = carrinho.clone();
    let usuario_a = Uuid::new_v4();
    let usuario_b = Uuid::new_v4();

    let (resultado_a, resultado_b) = tokio::join!(
        servico_a.adicionar_item(usuario_a, produto.id, 3),
        servico_b.adicionar_item(usuario_b, produto.id, 3),
    );

    let sucessos = [&resultado_a, &resultado_b]
        .iter()
        .filter(|r| r.is_ok())
        .count();
    assert_eq!(sucessos, 1, "exatamente uma reserva deve vencer");

    let perdedor = if resultado_a.is_err() {
        resultado_a.unwrap_err()
    } else {
        resultado_b.unwrap_err()
    };
    assert!(matches!(
        perdedor,
        AppError::EstoqueInsuficiente { disponivel: 2, .. }
    ));

    // O estoque final reflete apenas o decremento do vencedor.
    let produto_final = catalogo.buscar_produto(produto.id).await.unwrap();
    assert_eq!(produto_final.estoque, 2);
}

#[tokio::test]
#[ignore = "requer um PostgreSQL acessível via DATABASE_URL"]
async fn cenario_f_remover_item_que_nunca_foi_adicionado() {
    let (_, carrinho) = preparar().await;
    let usuario = Uuid::new_v4();
    let produto_inexistente = Uuid::new_v4();

    let erro = carrinho
        .remover_item(usuario, produto_inexistente)
        .await
        .unwrap_err();
    assert!(matches!(
        erro,
        AppError::ItemNaoEstaNoCarrinho(id) if id == produto_inexistente
    ));
}

#[tokio::test]
#[ignore = "requer um PostgreSQL acessível via DATABASE_URL"]
async fn adicionar_e_remover_devolve_o_estoque_original() {
    let (catalogo, carrinho) = preparar().await;
    let usuario = Uuid::new_v4();

    let produto = catalogo
        .criar_produto(&nome_unico("Vaivém"), preco(750), 5)
        .await
        .unwrap();

    carrinho.adicionar_item(usuario, produto.id, 3).await.unwrap();

    // Conservação: disponível + reservado == estoque original.
    let durante = catalogo.buscar_produto(produto.id).await.unwrap();
    let view = carrinho.ver_carrinho(usuario).await.unwrap();
    assert_eq!(durante.estoque + view.itens[0].quantidade, 5);

    // A remoção apaga a linha inteira e devolve a quantidade toda.
    let view_final = carrinho.remover_item(usuario, produto.id).await.unwrap();
    assert!(view_final.itens.is_empty());
    assert_eq!(view_final.total, Decimal::ZERO);

    let depois = catalogo.buscar_produto(produto.id).await.unwrap();
    assert_eq!(depois.estoque, 5);
}

#[tokio::test]
#[ignore = "requer um PostgreSQL acessível via DATABASE_URL"]
async fn adicoes_repetidas_acumulam_na_mesma_linha() {
    let (catalogo, carrinho) = preparar().await;
    let usuario = Uuid::new_v4();

    let produto = catalogo
        .criar_produto(&nome_unico("Acumulável"), preco(100), 10)
        .await
        .unwrap();

    carrinho.adicionar_item(usuario, produto.id, 2).await.unwrap();
    let view = carrinho.adicionar_item(usuario, produto.id, 3).await.unwrap();

    // Uma linha só, com a quantidade acumulada.
    assert_eq!(view.itens.len(), 1);
    assert_eq!(view.itens[0].quantidade, 5);

    let produto_final = catalogo.buscar_produto(produto.id).await.unwrap();
    assert_eq!(produto_final.estoque, 5);
}

#[tokio::test]
#[ignore = "requer um PostgreSQL acessível via DATABASE_URL"]
async fn produto_em_carrinho_nao_pode_ser_removido_do_catalogo() {
    let (catalogo, carrinho) = preparar().await;
    let usuario = Uuid::new_v4();

    let produto = catalogo
        .criar_produto(&nome_unico("Preso"), preco(900), 3)
        .await
        .unwrap();
    carrinho.adicionar_item(usuario, produto.id, 1).await.unwrap();

    let erro = catalogo.remover_produto(produto.id).await.unwrap_err();
    assert!(matches!(erro, AppError::ProdutoEmUso));

    // Depois de liberar a reserva, a remoção passa.
    carrinho.remover_item(usuario, produto.id).await.unwrap();
    catalogo.remover_produto(produto.id).await.unwrap();

    let erro = catalogo.buscar_produto(produto.id).await.unwrap_err();
    assert!(matches!(erro, AppError::ProdutoNaoEncontrado(_)));
}

#[tokio::test]
#[ignore = "requer um PostgreSQL acessível via DATABASE_URL"]
async fn carrinho_eh_criado_uma_unica_vez_por_usuario() {
    let (_, carrinho) = preparar().await;
    let usuario = Uuid::new_v4();

    let primeiro = carrinho.obter_ou_criar_carrinho(usuario).await.unwrap();
    let segundo = carrinho.obter_ou_criar_carrinho(usuario).await.unwrap();
    assert_eq!(primeiro.id, segundo.id);
}

#[tokio::test]
#[ignore = "requer um PostgreSQL acessível via DATABASE_URL"]
async fn atualizacao_parcial_aplica_somente_os_campos_informados() {
    let (catalogo, _) = preparar().await;

    let produto = catalogo
        .criar_produto(&nome_unico("Parcial"), preco(1000), 5)
        .await
        .unwrap();

    let atualizado = catalogo
        .atualizar_produto(
            produto.id,
            &AtualizarProduto {
                preco: Some(preco(1250)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(atualizado.preco, preco(1250));
    assert_eq!(atualizado.nome, produto.nome);
    assert_eq!(atualizado.estoque, 5);
}

#[tokio::test]
#[ignore = "requer um PostgreSQL acessível via DATABASE_URL"]
async fn atualizar_produto_inexistente_da_nao_encontrado() {
    let (catalogo, _) = preparar().await;
    let id = Uuid::new_v4();

    let erro = catalogo
        .atualizar_produto(
            id,
            &AtualizarProduto {
                estoque: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(erro, AppError::ProdutoNaoEncontrado(i) if i == id));
}
