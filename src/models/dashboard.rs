// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::proposta::{Proposta, PropostaStatus};

// Snapshot completo do painel de propostas (GET /api/propostas/dashboard)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_enviadas: i64,
    pub total_aceitas: i64,
    pub valor_total_aceito: Decimal,
    pub taxa_conversao: f64,
    pub propostas_por_estado: Vec<EstadoEntry>,
    pub propostas_por_mes: Vec<MesEntry>,
    pub propostas_por_status: Vec<StatusEntry>,
    pub top_consultores: Vec<ConsultorRankingEntry>,
    pub valor_acumulado_por_mes: Vec<ValorAcumuladoEntry>,
    pub propostas_recentes: Vec<Proposta>,
    pub funil_conversao: Vec<FunilEntry>,
    pub heatmap_dia_semana: Vec<HeatmapEntry>,
    pub propostas_por_faixa_valor: Vec<FaixaValorEntry>,
    // Em horas
    pub tempo_medio_resposta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstadoEntry {
    #[schema(example = "SP")]
    pub estado: String,
    pub count: i64,
    pub aceitas: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MesEntry {
    #[schema(example = "2026-02")]
    pub mes: String,
    pub enviadas: i64,
    pub aceitas: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    pub status: PropostaStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsultorRankingEntry {
    pub consultor_id: Uuid,
    pub nome: String,
    pub total: i64,
    pub aceitas: i64,
    pub taxa: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValorAcumuladoEntry {
    pub mes: String,
    pub valor: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FunilEntry {
    #[schema(example = "Enviada")]
    pub etapa: String,
    pub count: i64,
}

// dia: 0 = domingo ... 6 = sábado; hora: 0..23 (UTC)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapEntry {
    pub dia: u32,
    pub hora: u32,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaixaValorEntry {
    #[schema(example = "1k - 5k")]
    pub faixa: String,
    pub count: i64,
}
