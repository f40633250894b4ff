pub mod consultor_service;
pub mod dashboard_service;
pub mod envio_service;
pub mod meta_service;
pub mod notificacao;
pub mod numeracao;
pub mod proposta_service;
