pub mod produto_repo;
pub use produto_repo::ProdutoRepository;
pub mod carrinho_repo;
pub use carrinho_repo::CarrinhoRepository;
