// src/services/dashboard_service.rs
//
// Painel de propostas. Lê tudo do repositório (sem transação) e reduz em memória.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{Datelike, Timelike};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PropostaRepository,
    models::{
        consultor::Consultor,
        dashboard::{
            ConsultorRankingEntry, DashboardMetrics, EstadoEntry, FaixaValorEntry, FunilEntry, HeatmapEntry,
            MesEntry, StatusEntry, ValorAcumuladoEntry,
        },
        proposta::{Proposta, PropostaFilters, PropostaStatus},
    },
};

const LIMITE_TOP_CONSULTORES: usize = 10;
const LIMITE_RECENTES: usize = 10;
const MS_POR_HORA: f64 = 3_600_000.0;

#[derive(Clone)]
pub struct DashboardService {
    repo: Arc<dyn PropostaRepository>,
}

impl DashboardService {
    pub fn new(repo: Arc<dyn PropostaRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_metrics(&self) -> Result<DashboardMetrics, AppError> {
        let propostas = self.repo.list_propostas(&PropostaFilters::default()).await?;
        let consultores = self.repo.list_consultores().await?;
        Ok(calcular_metricas(&propostas, &consultores))
    }
}

fn percentual(parte: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        parte as f64 / total as f64 * 100.0
    }
}

fn mes_de(p: &Proposta) -> String {
    p.created_at.format("%Y-%m").to_string()
}

fn faixa_de(valor: Decimal) -> usize {
    if valor <= Decimal::from(1_000) {
        0
    } else if valor <= Decimal::from(5_000) {
        1
    } else if valor <= Decimal::from(10_000) {
        2
    } else {
        3
    }
}

const FAIXAS: [&str; 4] = ["Até 1k", "1k - 5k", "5k - 10k", "10k+"];

/// Reduz o conjunto completo de propostas no snapshot do painel.
/// "Enviada" aqui é qualquer proposta fora do rascunho.
pub fn calcular_metricas(propostas: &[Proposta], consultores: &[Consultor]) -> DashboardMetrics {
    use PropostaStatus::*;

    let enviadas: Vec<&Proposta> = propostas.iter().filter(|p| p.status.saiu_do_rascunho()).collect();
    let aceitas: Vec<&Proposta> = propostas.iter().filter(|p| p.status == Aceita).collect();

    let total_enviadas = enviadas.len() as i64;
    let total_aceitas = aceitas.len() as i64;
    let valor_total_aceito: Decimal = aceitas.iter().map(|p| p.valor_total).sum();

    // --- Por estado (só enviadas) ---
    let mut por_estado: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for p in &enviadas {
        let estado = p
            .cliente_estado
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or("N/A");
        let entrada = por_estado.entry(estado.to_string()).or_default();
        entrada.0 += 1;
        if p.status == Aceita {
            entrada.1 += 1;
        }
    }

    // --- Por mês de criação ---
    let mut por_mes: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for p in propostas {
        let entrada = por_mes.entry(mes_de(p)).or_default();
        if p.status.saiu_do_rascunho() {
            entrada.0 += 1;
        }
        if p.status == Aceita {
            entrada.1 += 1;
        }
    }

    // --- Por status ---
    let mut por_status: BTreeMap<PropostaStatus, i64> = BTreeMap::new();
    for p in propostas {
        *por_status.entry(p.status).or_default() += 1;
    }
    let contagem = |s: PropostaStatus| por_status.get(&s).copied().unwrap_or(0);

    // --- Ranking de consultores ---
    let nomes: HashMap<Uuid, &str> = consultores.iter().map(|c| (c.id, c.nome.as_str())).collect();
    let mut por_consultor: HashMap<Uuid, (i64, i64)> = HashMap::new();
    for p in &enviadas {
        if let Some(id) = p.consultor_id {
            let entrada = por_consultor.entry(id).or_default();
            entrada.0 += 1;
            if p.status == Aceita {
                entrada.1 += 1;
            }
        }
    }
    let mut top_consultores: Vec<ConsultorRankingEntry> = por_consultor
        .into_iter()
        .map(|(id, (total, aceitas))| ConsultorRankingEntry {
            consultor_id: id,
            nome: nomes.get(&id).copied().unwrap_or("Desconhecido").to_string(),
            total,
            aceitas,
            taxa: percentual(aceitas, total),
        })
        .collect();
    top_consultores.sort_by(|a, b| {
        b.aceitas
            .cmp(&a.aceitas)
            .then_with(|| b.total.cmp(&a.total))
            .then_with(|| a.nome.cmp(&b.nome))
    });
    top_consultores.truncate(LIMITE_TOP_CONSULTORES);

    // --- Valor aceito acumulado por mês ---
    let mut valor_por_mes: BTreeMap<String, Decimal> = BTreeMap::new();
    for p in &aceitas {
        *valor_por_mes.entry(mes_de(p)).or_default() += p.valor_total;
    }
    let mut acumulado = Decimal::ZERO;
    let valor_acumulado_por_mes = valor_por_mes
        .into_iter()
        .map(|(mes, valor)| {
            acumulado += valor;
            ValorAcumuladoEntry { mes, valor: acumulado }
        })
        .collect();

    // --- Recentes ---
    let mut recentes: Vec<&Proposta> = propostas.iter().collect();
    recentes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let propostas_recentes = recentes.into_iter().take(LIMITE_RECENTES).cloned().collect();

    // --- Funil (cada etapa conta quem chegou nela ou além; EXPIRADA fica fora) ---
    let funil_conversao = vec![
        FunilEntry { etapa: "Rascunho".into(), count: contagem(Rascunho) },
        FunilEntry {
            etapa: "Enviada".into(),
            count: contagem(Enviada) + contagem(Visualizada) + contagem(Aceita) + contagem(Recusada),
        },
        FunilEntry {
            etapa: "Visualizada".into(),
            count: contagem(Visualizada) + contagem(Aceita) + contagem(Recusada),
        },
        FunilEntry { etapa: "Aceita".into(), count: contagem(Aceita) },
    ];

    // --- Heatmap dia da semana x hora (UTC) ---
    let mut heatmap: BTreeMap<(u32, u32), i64> = BTreeMap::new();
    for p in propostas {
        let dia = p.created_at.weekday().num_days_from_sunday();
        *heatmap.entry((dia, p.created_at.hour())).or_default() += 1;
    }

    // --- Faixas de valor ---
    let mut faixas = [0i64; 4];
    for p in propostas {
        faixas[faixa_de(p.valor_total)] += 1;
    }

    // --- Tempo médio de resposta (updated_at como proxy da decisão) ---
    let diferencas: Vec<i64> = propostas
        .iter()
        .filter(|p| matches!(p.status, Aceita | Recusada))
        .map(|p| (p.updated_at - p.created_at).num_milliseconds())
        .filter(|ms| *ms > 0)
        .collect();
    let tempo_medio_resposta = if diferencas.is_empty() {
        0.0
    } else {
        diferencas.iter().sum::<i64>() as f64 / diferencas.len() as f64 / MS_POR_HORA
    };

    DashboardMetrics {
        total_enviadas,
        total_aceitas,
        valor_total_aceito,
        taxa_conversao: percentual(total_aceitas, total_enviadas),
        propostas_por_estado: por_estado
            .into_iter()
            .map(|(estado, (count, aceitas))| EstadoEntry { estado, count, aceitas })
            .collect(),
        propostas_por_mes: por_mes
            .into_iter()
            .map(|(mes, (enviadas, aceitas))| MesEntry { mes, enviadas, aceitas })
            .collect(),
        propostas_por_status: por_status
            .iter()
            .map(|(status, count)| StatusEntry { status: *status, count: *count })
            .collect(),
        top_consultores,
        valor_acumulado_por_mes,
        propostas_recentes,
        funil_conversao,
        heatmap_dia_semana: heatmap
            .into_iter()
            .map(|((dia, hora), count)| HeatmapEntry { dia, hora, count })
            .collect(),
        propostas_por_faixa_valor: FAIXAS
            .iter()
            .zip(faixas)
            .map(|(faixa, count)| FaixaValorEntry { faixa: faixa.to_string(), count })
            .collect(),
        tempo_medio_resposta,
    }
}
