pub mod consultores;
pub mod dashboard;
pub mod metas;
pub mod propostas;
