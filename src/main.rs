//src/main.rs

use axum::{
    Router,
    routing::{delete, get, post},
};
use tokio::net::TcpListener;

use loja_backend::{config::AppState, handlers};

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas do catálogo de produtos
    let produto_routes = Router::new()
        .route(
            "/",
            post(handlers::produtos::criar_produto).get(handlers::produtos::listar_produtos),
        )
        .route(
            "/{id}",
            get(handlers::produtos::buscar_produto)
                .put(handlers::produtos::atualizar_produto)
                .delete(handlers::produtos::remover_produto),
        );

    // Rotas do carrinho (reserva de estoque)
    let carrinho_routes = Router::new()
        .route("/", get(handlers::carrinho::ver_carrinho))
        .route("/adicionar", post(handlers::carrinho::adicionar_item))
        .route(
            "/remover/{produto_id}",
            delete(handlers::carrinho::remover_item),
        );

    // Combina tudo no router principal
    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/produtos", produto_routes)
        .nest("/carrinho", carrinho_routes)
        .with_state(app_state.clone());

    // Inicia o servidor
    let addr = format!("0.0.0.0:{}", app_state.porta);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());

    axum::serve(listener, app)
        .with_graceful_shutdown(aguardar_sinal_de_parada())
        .await
        .expect("Erro no servidor Axum");

    // Encerramento limpo: devolve as conexões antes de sair.
    app_state.db_pool.close().await;
    tracing::info!("Pool de conexões encerrada. Até mais!");
}

async fn aguardar_sinal_de_parada() {
    tokio::signal::ctrl_c()
        .await
        .expect("Falha ao instalar o handler de Ctrl+C");
    tracing::info!("Sinal de parada recebido, encerrando...");
}
