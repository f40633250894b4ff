pub mod consultor;
pub mod dashboard;
pub mod envio;
pub mod meta;
pub mod proposta;
