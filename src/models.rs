pub mod carrinho;
pub mod produto;
