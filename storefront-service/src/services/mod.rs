pub mod gateway;
pub mod jwt;
pub mod metrics;
pub mod repository;
pub mod settlement;

pub use gateway::GatewayClient;
pub use jwt::JwtService;
pub use repository::StoreRepository;
