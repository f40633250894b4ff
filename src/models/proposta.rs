// src/models/proposta.rs

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::common::{db_utils::blank_to_none, error::AppError};

/// Validade usada quando a proposta não define uma (ou define valor não positivo).
pub const VALIDADE_PADRAO_DIAS: i32 = 30;

// --- Enums ---

// Mapeia o CREATE TYPE proposta_status do banco
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "proposta_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PropostaStatus {
    Rascunho,
    Enviada,
    Visualizada,
    Aceita,
    Recusada,
    Expirada,
}

impl PropostaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rascunho => "RASCUNHO",
            Self::Enviada => "ENVIADA",
            Self::Visualizada => "VISUALIZADA",
            Self::Aceita => "ACEITA",
            Self::Recusada => "RECUSADA",
            Self::Expirada => "EXPIRADA",
        }
    }

    /// Tabela de transições: estado atual -> próximos estados permitidos.
    ///
    /// Este núcleo só executa RASCUNHO -> ENVIADA (no envio). As demais são
    /// disparadas por colaboradores externos (visualização pelo cliente,
    /// aceite/recusa, varredura de expiração) via `registrar_status`.
    pub fn transicoes(&self) -> &'static [PropostaStatus] {
        match self {
            Self::Rascunho => &[Self::Enviada],
            Self::Enviada => &[Self::Visualizada, Self::Aceita, Self::Recusada, Self::Expirada],
            Self::Visualizada => &[Self::Aceita, Self::Recusada, Self::Expirada],
            Self::Aceita | Self::Recusada | Self::Expirada => &[],
        }
    }

    pub fn pode_transicionar(&self, para: PropostaStatus) -> bool {
        self.transicoes().contains(&para)
    }

    /// Qualquer status fora do rascunho conta como "enviada" nos indicadores.
    pub fn saiu_do_rascunho(&self) -> bool {
        *self != Self::Rascunho
    }
}

impl fmt::Display for PropostaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Mapeia o CREATE TYPE metodo_envio do banco.
// Também é usado no log de envios, onde só aparecem EMAIL e WHATSAPP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "metodo_envio", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MetodoEnvio {
    Email,
    Whatsapp,
    Ambos,
}

impl MetodoEnvio {
    /// Canais individuais implicados pelo método (AMBOS = e-mail + WhatsApp).
    pub fn canais(&self) -> &'static [MetodoEnvio] {
        match self {
            Self::Email => &[Self::Email],
            Self::Whatsapp => &[Self::Whatsapp],
            Self::Ambos => &[Self::Email, Self::Whatsapp],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Whatsapp => "WHATSAPP",
            Self::Ambos => "AMBOS",
        }
    }
}

// --- Item (value type, vai como JSON dentro da proposta) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropostaItem {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Licença anual")]
    pub descricao: String,

    #[validate(range(min = 1, message = "A quantidade mínima é 1"))]
    #[schema(example = 3)]
    pub quantidade: i32,

    #[validate(custom(function = "nao_negativo"))]
    #[schema(example = "100.00")]
    pub valor_unitario: Decimal,

    #[validate(custom(function = "nao_negativo"))]
    #[schema(example = "300.00")]
    pub valor_total: Decimal,
}

impl PropostaItem {
    pub fn total_calculado(&self) -> Decimal {
        Decimal::from(self.quantidade) * self.valor_unitario
    }
}

// --- Proposta ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Proposta {
    pub id: Uuid,
    #[schema(example = "PRP-2026-0001")]
    pub numero_proposta: String,
    pub consultor_id: Option<Uuid>,

    // Cliente
    #[schema(example = "Acme")]
    pub cliente_nome: String,
    pub cliente_email: Option<String>,
    pub cliente_whatsapp: Option<String>,
    pub cliente_empresa: Option<String>,
    pub cliente_cnpj: Option<String>,
    #[schema(example = "SP")]
    pub cliente_estado: Option<String>,
    pub cliente_cidade: Option<String>,

    // Conteúdo
    pub titulo: String,
    pub descricao: Option<String>,
    #[sqlx(json)]
    pub itens: Vec<PropostaItem>,
    #[schema(example = "300.00")]
    pub valor_total: Decimal,
    pub validade_dias: i32,
    pub observacoes: Option<String>,

    // Status
    pub status: PropostaStatus,
    pub metodo_envio: Option<MetodoEnvio>,
    pub pdf_url: Option<String>,

    // Datas do ciclo de vida
    pub data_envio: Option<DateTime<Utc>>,
    pub data_visualizacao: Option<DateTime<Utc>>,
    pub data_resposta: Option<DateTime<Utc>>,
    pub data_expiracao: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Proposta {
    /// Destino preenchido para o canal, ignorando campos em branco.
    pub fn contato(&self, canal: MetodoEnvio) -> Option<&str> {
        let campo = match canal {
            MetodoEnvio::Email => self.cliente_email.as_deref(),
            MetodoEnvio::Whatsapp => self.cliente_whatsapp.as_deref(),
            MetodoEnvio::Ambos => None,
        };
        campo.map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn validade_efetiva(&self) -> i32 {
        if self.validade_dias > 0 {
            self.validade_dias
        } else {
            VALIDADE_PADRAO_DIAS
        }
    }

    pub fn expiracao_a_partir(&self, envio: DateTime<Utc>) -> DateTime<Utc> {
        envio + Duration::days(i64::from(self.validade_efetiva()))
    }

    /// Resultado de um envio. Reenvio sobrescreve data de envio e expiração.
    pub fn marcar_enviada(&mut self, metodo: MetodoEnvio, agora: DateTime<Utc>) {
        self.status = PropostaStatus::Enviada;
        self.metodo_envio = Some(metodo);
        self.data_envio = Some(agora);
        self.data_expiracao = Some(self.expiracao_a_partir(agora));
        self.updated_at = agora;
    }

    /// Aplica uma transição da tabela, carimbando a data correspondente.
    pub fn transicionar(&mut self, para: PropostaStatus, agora: DateTime<Utc>) -> Result<(), AppError> {
        if !self.status.pode_transicionar(para) {
            return Err(AppError::InvalidTransition { de: self.status, para });
        }
        match para {
            PropostaStatus::Visualizada => self.data_visualizacao = Some(agora),
            PropostaStatus::Aceita | PropostaStatus::Recusada => self.data_resposta = Some(agora),
            _ => {}
        }
        self.status = para;
        self.updated_at = agora;
        Ok(())
    }
}

/// Soma de quantidade * valor unitário. Usada só para avisar divergências:
/// o `valorTotal` informado pelo editor continua sendo o valor gravado.
pub fn soma_itens(itens: &[PropostaItem]) -> Decimal {
    itens.iter().map(PropostaItem::total_calculado).sum()
}

// --- Payloads ---

fn validade_padrao() -> i32 {
    VALIDADE_PADRAO_DIAS
}

// Distingue campo ausente (`None`) de `null` explícito (`Some(None)`).
// Usar junto com `#[serde(default)]`.
pub(crate) fn campo_anulavel<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(crate) fn nao_negativo(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("negative_value");
        err.message = Some("O valor não pode ser negativo".into());
        return Err(err);
    }
    Ok(())
}

// Aceita "" (limpar o campo) ou um e-mail válido
pub(crate) fn email_ou_vazio(value: &String) -> Result<(), ValidationError> {
    let value = value.trim().to_string();
    if value.is_empty() || value.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_email"))
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NovaProposta {
    pub consultor_id: Option<Uuid>,

    #[validate(length(min = 1, message = "Nome do cliente é obrigatório"))]
    #[schema(example = "Acme")]
    pub cliente_nome: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "compras@acme.com")]
    pub cliente_email: Option<String>,
    #[schema(example = "+5511999998888")]
    pub cliente_whatsapp: Option<String>,
    pub cliente_empresa: Option<String>,
    pub cliente_cnpj: Option<String>,
    pub cliente_estado: Option<String>,
    pub cliente_cidade: Option<String>,

    #[validate(length(min = 1, message = "Título é obrigatório"))]
    #[schema(example = "Plano anual")]
    pub titulo: String,
    pub descricao: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub itens: Vec<PropostaItem>,

    #[serde(default)]
    #[validate(custom(function = "nao_negativo"))]
    #[schema(example = "300.00")]
    pub valor_total: Decimal,

    #[serde(default = "validade_padrao")]
    #[validate(range(min = 1, message = "A validade mínima é 1 dia"))]
    pub validade_dias: i32,

    pub observacoes: Option<String>,
    pub pdf_url: Option<String>,
}

impl NovaProposta {
    /// Remove espaços das obrigatórias e troca opcionais em branco por `None`.
    /// Deve ser chamada antes de `validate()`.
    pub fn normalizar(self) -> Self {
        Self {
            cliente_nome: self.cliente_nome.trim().to_string(),
            cliente_email: blank_to_none(self.cliente_email),
            cliente_whatsapp: blank_to_none(self.cliente_whatsapp),
            cliente_empresa: blank_to_none(self.cliente_empresa),
            cliente_cnpj: blank_to_none(self.cliente_cnpj),
            cliente_estado: blank_to_none(self.cliente_estado),
            cliente_cidade: blank_to_none(self.cliente_cidade),
            titulo: self.titulo.trim().to_string(),
            descricao: blank_to_none(self.descricao),
            observacoes: blank_to_none(self.observacoes),
            pdf_url: blank_to_none(self.pdf_url),
            ..self
        }
    }

    /// Materializa a proposta em RASCUNHO com o número já alocado.
    /// Usado pelos adaptadores de armazenamento dentro da transação de criação.
    pub fn into_proposta(self, id: Uuid, numero_proposta: String, agora: DateTime<Utc>) -> Proposta {
        Proposta {
            id,
            numero_proposta,
            consultor_id: self.consultor_id,
            cliente_nome: self.cliente_nome,
            cliente_email: self.cliente_email,
            cliente_whatsapp: self.cliente_whatsapp,
            cliente_empresa: self.cliente_empresa,
            cliente_cnpj: self.cliente_cnpj,
            cliente_estado: self.cliente_estado,
            cliente_cidade: self.cliente_cidade,
            titulo: self.titulo,
            descricao: self.descricao,
            itens: self.itens,
            valor_total: self.valor_total,
            validade_dias: self.validade_dias,
            observacoes: self.observacoes,
            status: PropostaStatus::Rascunho,
            metodo_envio: None,
            pdf_url: self.pdf_url,
            data_envio: None,
            data_visualizacao: None,
            data_resposta: None,
            data_expiracao: None,
            created_at: agora,
            updated_at: agora,
        }
    }
}

/// Edição parcial. Campos ausentes ficam como estão; para os opcionais,
/// enviar "" limpa o valor. `consultorId: null` desvincula o consultor.
/// Número, status e datas do ciclo não são editáveis.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AtualizarProposta {
    #[serde(default, deserialize_with = "campo_anulavel")]
    #[schema(value_type = Option<Uuid>)]
    pub consultor_id: Option<Option<Uuid>>,

    #[validate(length(min = 1, message = "Nome do cliente é obrigatório"))]
    pub cliente_nome: Option<String>,
    #[validate(custom(function = "email_ou_vazio"))]
    pub cliente_email: Option<String>,
    pub cliente_whatsapp: Option<String>,
    pub cliente_empresa: Option<String>,
    pub cliente_cnpj: Option<String>,
    pub cliente_estado: Option<String>,
    pub cliente_cidade: Option<String>,

    #[validate(length(min = 1, message = "Título é obrigatório"))]
    pub titulo: Option<String>,
    pub descricao: Option<String>,

    #[validate(nested)]
    pub itens: Option<Vec<PropostaItem>>,
    #[validate(custom(function = "nao_negativo"))]
    pub valor_total: Option<Decimal>,
    #[validate(range(min = 1, message = "A validade mínima é 1 dia"))]
    pub validade_dias: Option<i32>,
    pub observacoes: Option<String>,
    pub pdf_url: Option<String>,
}

impl AtualizarProposta {
    pub fn normalizar(self) -> Self {
        Self {
            cliente_nome: self.cliente_nome.map(|s| s.trim().to_string()),
            titulo: self.titulo.map(|s| s.trim().to_string()),
            ..self
        }
    }

    /// Aplica a edição sobre a proposta. Não mexe em `updated_at`:
    /// quem grava decide o carimbo.
    pub fn aplicar_em(self, p: &mut Proposta) {
        fn opcional(destino: &mut Option<String>, valor: Option<String>) {
            if let Some(v) = valor {
                *destino = blank_to_none(Some(v));
            }
        }

        if let Some(v) = self.consultor_id {
            p.consultor_id = v;
        }
        if let Some(v) = self.cliente_nome {
            p.cliente_nome = v;
        }
        opcional(&mut p.cliente_email, self.cliente_email);
        opcional(&mut p.cliente_whatsapp, self.cliente_whatsapp);
        opcional(&mut p.cliente_empresa, self.cliente_empresa);
        opcional(&mut p.cliente_cnpj, self.cliente_cnpj);
        opcional(&mut p.cliente_estado, self.cliente_estado);
        opcional(&mut p.cliente_cidade, self.cliente_cidade);
        if let Some(v) = self.titulo {
            p.titulo = v;
        }
        opcional(&mut p.descricao, self.descricao);
        if let Some(v) = self.itens {
            p.itens = v;
        }
        if let Some(v) = self.valor_total {
            p.valor_total = v;
        }
        if let Some(v) = self.validade_dias {
            p.validade_dias = v;
        }
        opcional(&mut p.observacoes, self.observacoes);
        opcional(&mut p.pdf_url, self.pdf_url);
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PropostaFilters {
    pub status: Option<PropostaStatus>,
    #[param(example = "SP")]
    pub estado: Option<String>,
    pub consultor_id: Option<Uuid>,
}

impl PropostaFilters {
    pub fn aceita(&self, p: &Proposta) -> bool {
        self.status.is_none_or(|s| p.status == s)
            && self
                .estado
                .as_deref()
                .is_none_or(|e| p.cliente_estado.as_deref() == Some(e))
            && self.consultor_id.is_none_or(|c| p.consultor_id == Some(c))
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EnviarPropostaPayload {
    #[schema(example = "AMBOS")]
    pub metodo: MetodoEnvio,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegistrarStatusPayload {
    #[schema(example = "ACEITA")]
    pub status: PropostaStatus,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn nova(cliente: &str, titulo: &str) -> NovaProposta {
        NovaProposta {
            consultor_id: None,
            cliente_nome: cliente.to_string(),
            cliente_email: None,
            cliente_whatsapp: None,
            cliente_empresa: None,
            cliente_cnpj: None,
            cliente_estado: None,
            cliente_cidade: None,
            titulo: titulo.to_string(),
            descricao: None,
            itens: vec![],
            valor_total: Decimal::ZERO,
            validade_dias: VALIDADE_PADRAO_DIAS,
            observacoes: None,
            pdf_url: None,
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn transition_table_only_moves_forward() {
        use PropostaStatus::*;

        assert!(Rascunho.pode_transicionar(Enviada));
        assert!(!Rascunho.pode_transicionar(Aceita));
        assert!(Enviada.pode_transicionar(Visualizada));
        assert!(Enviada.pode_transicionar(Expirada));
        assert!(Visualizada.pode_transicionar(Recusada));
        assert!(!Visualizada.pode_transicionar(Enviada));
        for terminal in [Aceita, Recusada, Expirada] {
            assert!(terminal.transicoes().is_empty(), "{terminal} deveria ser terminal");
        }
    }

    #[test]
    fn ambos_expands_to_both_channels() {
        assert_eq!(MetodoEnvio::Email.canais(), &[MetodoEnvio::Email]);
        assert_eq!(MetodoEnvio::Whatsapp.canais(), &[MetodoEnvio::Whatsapp]);
        assert_eq!(MetodoEnvio::Ambos.canais(), &[MetodoEnvio::Email, MetodoEnvio::Whatsapp]);
    }

    #[test]
    fn status_uses_uppercase_on_the_wire() {
        let json = serde_json::to_string(&PropostaStatus::Visualizada).unwrap();
        assert_eq!(json, "\"VISUALIZADA\"");
        let metodo: MetodoEnvio = serde_json::from_str("\"AMBOS\"").unwrap();
        assert_eq!(metodo, MetodoEnvio::Ambos);
        assert!(serde_json::from_str::<MetodoEnvio>("\"SMS\"").is_err());
    }

    #[test]
    fn blank_contacts_are_ignored() {
        let mut p = nova("Acme", "Plan").into_proposta(Uuid::new_v4(), "PRP-2026-0001".into(), Utc::now());
        p.cliente_email = Some("  ".into());
        p.cliente_whatsapp = Some(" +55 11 9999 ".into());

        assert_eq!(p.contato(MetodoEnvio::Email), None);
        assert_eq!(p.contato(MetodoEnvio::Whatsapp), Some("+55 11 9999"));
    }

    #[test]
    fn non_positive_validity_falls_back_to_default() {
        let agora = Utc::now();
        let mut p = nova("Acme", "Plan").into_proposta(Uuid::new_v4(), "PRP-2026-0001".into(), agora);

        p.validade_dias = 0;
        assert_eq!(p.expiracao_a_partir(agora), agora + Duration::days(30));

        p.validade_dias = 7;
        assert_eq!(p.expiracao_a_partir(agora), agora + Duration::days(7));
    }

    #[test]
    fn marking_sent_stamps_dates_from_validity() {
        let agora = Utc::now();
        let mut p = nova("Acme", "Plan").into_proposta(Uuid::new_v4(), "PRP-2026-0001".into(), agora);
        p.validade_dias = 15;

        p.marcar_enviada(MetodoEnvio::Email, agora);

        assert_eq!(p.status, PropostaStatus::Enviada);
        assert_eq!(p.metodo_envio, Some(MetodoEnvio::Email));
        assert_eq!(p.data_envio, Some(agora));
        assert_eq!(p.data_expiracao, Some(agora + Duration::days(15)));
    }

    #[test]
    fn transitions_stamp_view_and_answer_dates() {
        let agora = Utc::now();
        let mut p = nova("Acme", "Plan").into_proposta(Uuid::new_v4(), "PRP-2026-0001".into(), agora);

        let err = p.transicionar(PropostaStatus::Aceita, agora).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition { de: PropostaStatus::Rascunho, para: PropostaStatus::Aceita }
        ));

        p.marcar_enviada(MetodoEnvio::Email, agora);
        p.transicionar(PropostaStatus::Visualizada, agora).unwrap();
        assert_eq!(p.data_visualizacao, Some(agora));
        assert_eq!(p.data_resposta, None);

        p.transicionar(PropostaStatus::Aceita, agora).unwrap();
        assert_eq!(p.status, PropostaStatus::Aceita);
        assert_eq!(p.data_resposta, Some(agora));
        assert!(p.transicionar(PropostaStatus::Recusada, agora).is_err());
    }

    #[test]
    fn create_payload_requires_client_and_title() {
        let vazio = nova("   ", "").normalizar();
        let errors = vazio.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("cliente_nome"));
        assert!(fields.contains_key("titulo"));

        assert!(nova("Acme", "Plan").normalizar().validate().is_ok());
    }

    #[test]
    fn create_payload_accepts_empty_email_but_not_garbage() {
        let mut payload = nova("Acme", "Plan");
        payload.cliente_email = Some("".into());
        assert!(payload.clone().normalizar().validate().is_ok());

        payload.cliente_email = Some("não é email".into());
        assert!(payload.normalizar().validate().is_err());
    }

    #[test]
    fn create_payload_rejects_bad_items() {
        let mut payload = nova("Acme", "Plan");
        payload.itens = vec![PropostaItem {
            descricao: "Seat".into(),
            quantidade: 0,
            valor_unitario: dec("-1"),
            valor_total: Decimal::ZERO,
        }];
        assert!(payload.validate().is_err());
    }

    #[test]
    fn create_payload_parses_string_total_and_defaults() {
        let payload: NovaProposta = serde_json::from_value(serde_json::json!({
            "clienteNome": "Acme",
            "titulo": "Plan",
            "itens": [{"descricao": "Seat", "quantidade": 3, "valorUnitario": 100, "valorTotal": 300}],
            "valorTotal": "300.00"
        }))
        .unwrap();

        assert_eq!(payload.valor_total, dec("300.00"));
        assert_eq!(payload.validade_dias, VALIDADE_PADRAO_DIAS);
        assert_eq!(soma_itens(&payload.itens), dec("300"));
    }

    #[test]
    fn partial_update_keeps_missing_fields_and_clears_blank_ones() {
        let mut base = nova("Acme", "Plan");
        base.cliente_email = Some("c@x.com".into());
        base.cliente_estado = Some("SP".into());
        let mut p = base.into_proposta(Uuid::new_v4(), "PRP-2026-0001".into(), Utc::now());

        AtualizarProposta {
            titulo: Some("Plano novo".into()),
            cliente_estado: Some("".into()),
            ..Default::default()
        }
        .aplicar_em(&mut p);

        assert_eq!(p.titulo, "Plano novo");
        assert_eq!(p.cliente_email.as_deref(), Some("c@x.com"));
        assert_eq!(p.cliente_estado, None);
        assert_eq!(p.numero_proposta, "PRP-2026-0001");
    }

    #[test]
    fn update_distinguishes_null_consultant_from_missing() {
        let consultor = Uuid::new_v4();
        let mut base = nova("Acme", "Plan");
        base.consultor_id = Some(consultor);
        let mut p = base.into_proposta(Uuid::new_v4(), "PRP-2026-0001".into(), Utc::now());

        let ausente: AtualizarProposta = serde_json::from_value(serde_json::json!({ "titulo": "Novo" })).unwrap();
        assert_eq!(ausente.consultor_id, None);
        ausente.aplicar_em(&mut p);
        assert_eq!(p.consultor_id, Some(consultor));

        let nulo: AtualizarProposta = serde_json::from_value(serde_json::json!({ "consultorId": null })).unwrap();
        assert_eq!(nulo.consultor_id, Some(None));
        nulo.aplicar_em(&mut p);
        assert_eq!(p.consultor_id, None);

        let outro = Uuid::new_v4();
        let troca: AtualizarProposta = serde_json::from_value(serde_json::json!({ "consultorId": outro })).unwrap();
        troca.aplicar_em(&mut p);
        assert_eq!(p.consultor_id, Some(outro));
    }

    #[test]
    fn filters_combine_with_and() {
        let mut p = nova("Acme", "Plan").into_proposta(Uuid::new_v4(), "PRP-2026-0001".into(), Utc::now());
        p.cliente_estado = Some("MG".into());

        assert!(PropostaFilters::default().aceita(&p));
        assert!(PropostaFilters { estado: Some("MG".into()), ..Default::default() }.aceita(&p));
        assert!(
            !PropostaFilters {
                estado: Some("MG".into()),
                status: Some(PropostaStatus::Enviada),
                ..Default::default()
            }
            .aceita(&p)
        );
    }
}
