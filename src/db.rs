pub mod memory_repo;
pub mod postgres_repo;
pub mod repository;

pub use memory_repo::MemoryPropostaRepository;
pub use postgres_repo::PgPropostaRepository;
pub use repository::PropostaRepository;
