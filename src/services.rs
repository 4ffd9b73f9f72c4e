pub mod carrinho_service;
pub use carrinho_service::CarrinhoService;
pub mod catalogo_service;
pub use catalogo_service::CatalogoService;
