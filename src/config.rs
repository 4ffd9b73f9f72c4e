// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};
use uuid::Uuid;

use crate::{
    db::{CarrinhoRepository, ProdutoRepository},
    services::{CarrinhoService, CatalogoService},
};

// Enquanto não existe um sistema de identidade de verdade, requisições
// sem o cabeçalho 'x-usuario-id' pertencem a este dono fixo.
const USUARIO_PADRAO: &str = "00000000-0000-0000-0000-000000000001";

// O estado compartilhado que será acessível em toda a aplicação.
// É o único ponto de injeção: a pool nasce aqui e os serviços a recebem
// explicitamente, nada de handle global.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub porta: u16,
    pub usuario_padrao: Uuid,
    pub catalogo_service: CatalogoService,
    pub carrinho_service: CarrinhoService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        let porta: u16 = match env::var("PORT") {
            Ok(valor) => valor.parse()?,
            Err(_) => 3000,
        };

        let usuario_padrao = match env::var("USUARIO_PADRAO_ID") {
            Ok(valor) => Uuid::parse_str(&valor)?,
            Err(_) => Uuid::parse_str(USUARIO_PADRAO)?,
        };

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let produto_repo = ProdutoRepository::new(db_pool.clone());
        let carrinho_repo = CarrinhoRepository::new(db_pool.clone());
        let catalogo_service = CatalogoService::new(produto_repo.clone(), db_pool.clone());
        let carrinho_service =
            CarrinhoService::new(carrinho_repo, produto_repo, db_pool.clone());

        Ok(Self {
            db_pool,
            porta,
            usuario_padrao,
            catalogo_service,
            carrinho_service,
        })
    }
}
