//! Database repositories for the API service

pub mod order;
pub mod product;

pub use order::OrderRepository;
pub use product::ProductRepository;
