// src/db/postgres_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{map_unique_violation, map_write_error},
        error::AppError,
    },
    db::repository::PropostaRepository,
    models::{
        consultor::{AtualizarConsultor, Consultor, NovoConsultor},
        envio::{NovoEnvio, PropostaEnvio},
        meta::{AtualizarMeta, MetaProposta, NovaMeta},
        proposta::{AtualizarProposta, MetodoEnvio, NovaProposta, Proposta, PropostaFilters, PropostaStatus},
    },
    services::numeracao::NumeroProposta,
};

#[derive(Clone)]
pub struct PgPropostaRepository {
    pool: PgPool,
}

impl PgPropostaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lê a proposta com FOR UPDATE, aplica `altera` e grava, tudo na mesma transação.
    async fn modificar_proposta<F>(&self, id: Uuid, altera: F) -> Result<Option<Proposta>, AppError>
    where
        F: FnOnce(&mut Proposta) -> Result<(), AppError> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let Some(mut proposta) =
            sqlx::query_as::<_, Proposta>("SELECT * FROM propostas WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        else {
            return Ok(None);
        };

        altera(&mut proposta)?;
        let salva = salvar_proposta(&mut *tx, &proposta).await?;

        tx.commit().await?;
        Ok(Some(salva))
    }
}

// Grava todos os campos mutáveis. Número e created_at nunca mudam.
async fn salvar_proposta<'e, E>(executor: E, p: &Proposta) -> Result<Proposta, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, Proposta>(
        r#"
        UPDATE propostas SET
            consultor_id = $2,
            cliente_nome = $3, cliente_email = $4, cliente_whatsapp = $5,
            cliente_empresa = $6, cliente_cnpj = $7, cliente_estado = $8, cliente_cidade = $9,
            titulo = $10, descricao = $11, itens = $12, valor_total = $13,
            validade_dias = $14, observacoes = $15,
            status = $16, metodo_envio = $17, pdf_url = $18,
            data_envio = $19, data_visualizacao = $20, data_resposta = $21, data_expiracao = $22,
            updated_at = $23
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(p.id)
    .bind(p.consultor_id)
    .bind(&p.cliente_nome)
    .bind(&p.cliente_email)
    .bind(&p.cliente_whatsapp)
    .bind(&p.cliente_empresa)
    .bind(&p.cliente_cnpj)
    .bind(&p.cliente_estado)
    .bind(&p.cliente_cidade)
    .bind(&p.titulo)
    .bind(&p.descricao)
    .bind(Json(&p.itens))
    .bind(p.valor_total)
    .bind(p.validade_dias)
    .bind(&p.observacoes)
    .bind(p.status)
    .bind(p.metodo_envio)
    .bind(&p.pdf_url)
    .bind(p.data_envio)
    .bind(p.data_visualizacao)
    .bind(p.data_resposta)
    .bind(p.data_expiracao)
    .bind(p.updated_at)
    .fetch_one(executor)
    .await
    .map_err(|e| map_write_error(e, "Consultor", || "Proposta duplicada.".to_string()))
}

#[async_trait]
impl PropostaRepository for PgPropostaRepository {
    // =========================================================================
    //  CONSULTORES
    // =========================================================================

    async fn list_consultores(&self) -> Result<Vec<Consultor>, AppError> {
        let consultores = sqlx::query_as::<_, Consultor>("SELECT * FROM consultores ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(consultores)
    }

    async fn get_consultor(&self, id: Uuid) -> Result<Option<Consultor>, AppError> {
        let consultor = sqlx::query_as::<_, Consultor>("SELECT * FROM consultores WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(consultor)
    }

    async fn create_consultor(&self, dados: NovoConsultor) -> Result<Consultor, AppError> {
        sqlx::query_as::<_, Consultor>(
            r#"
            INSERT INTO consultores (nome, id_consultor, email, whatsapp, ativo)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&dados.nome)
        .bind(&dados.id_consultor)
        .bind(&dados.email)
        .bind(&dados.whatsapp)
        .bind(dados.ativo)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || format!("O ID de consultor '{}' já está em uso.", dados.id_consultor))
        })
    }

    async fn update_consultor(&self, id: Uuid, dados: AtualizarConsultor) -> Result<Option<Consultor>, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(mut consultor) =
            sqlx::query_as::<_, Consultor>("SELECT * FROM consultores WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        else {
            return Ok(None);
        };

        dados.aplicar_em(&mut consultor);

        let atualizado = sqlx::query_as::<_, Consultor>(
            r#"
            UPDATE consultores
            SET nome = $2, id_consultor = $3, email = $4, whatsapp = $5, ativo = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&consultor.nome)
        .bind(&consultor.id_consultor)
        .bind(&consultor.email)
        .bind(&consultor.whatsapp)
        .bind(consultor.ativo)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, || format!("O ID de consultor '{}' já está em uso.", consultor.id_consultor))
        })?;

        tx.commit().await?;
        Ok(Some(atualizado))
    }

    // FKs: propostas.consultor_id ON DELETE SET NULL, metas ON DELETE CASCADE
    async fn delete_consultor(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM consultores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  PROPOSTAS
    // =========================================================================

    async fn list_propostas(&self, filtros: &PropostaFilters) -> Result<Vec<Proposta>, AppError> {
        let propostas = sqlx::query_as::<_, Proposta>(
            r#"
            SELECT * FROM propostas
            WHERE ($1::proposta_status IS NULL OR status = $1)
              AND ($2::text IS NULL OR cliente_estado = $2)
              AND ($3::uuid IS NULL OR consultor_id = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filtros.status)
        .bind(filtros.estado.as_deref())
        .bind(filtros.consultor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(propostas)
    }

    async fn get_proposta(&self, id: Uuid) -> Result<Option<Proposta>, AppError> {
        let proposta = sqlx::query_as::<_, Proposta>("SELECT * FROM propostas WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(proposta)
    }

    async fn create_proposta(&self, ano: i32, dados: NovaProposta) -> Result<Proposta, AppError> {
        let alocacao = |e: sqlx::Error| AppError::Allocation(e.to_string());

        let mut tx = self.pool.begin().await.map_err(alocacao)?;

        // Upsert atômico no contador do ano: a linha fica bloqueada até o commit,
        // então duas criações simultâneas nunca recebem a mesma sequência.
        let ultima: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO proposta_sequencias (ano, ultima_sequencia)
            VALUES ($1, 1)
            ON CONFLICT (ano) DO UPDATE
                SET ultima_sequencia = proposta_sequencias.ultima_sequencia + 1
            RETURNING ultima_sequencia
            "#,
        )
        .bind(ano)
        .fetch_one(&mut *tx)
        .await
        .map_err(alocacao)?;

        let sequencia = u32::try_from(ultima)
            .map_err(|_| AppError::Allocation(format!("sequência inválida para {}: {}", ano, ultima)))?;
        let numero = NumeroProposta::new(ano, sequencia).to_string();

        let proposta = sqlx::query_as::<_, Proposta>(
            r#"
            INSERT INTO propostas (
                numero_proposta, consultor_id,
                cliente_nome, cliente_email, cliente_whatsapp, cliente_empresa,
                cliente_cnpj, cliente_estado, cliente_cidade,
                titulo, descricao, itens, valor_total, validade_dias, observacoes, pdf_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(&numero)
        .bind(dados.consultor_id)
        .bind(&dados.cliente_nome)
        .bind(&dados.cliente_email)
        .bind(&dados.cliente_whatsapp)
        .bind(&dados.cliente_empresa)
        .bind(&dados.cliente_cnpj)
        .bind(&dados.cliente_estado)
        .bind(&dados.cliente_cidade)
        .bind(&dados.titulo)
        .bind(&dados.descricao)
        .bind(Json(&dados.itens))
        .bind(dados.valor_total)
        .bind(dados.validade_dias)
        .bind(&dados.observacoes)
        .bind(&dados.pdf_url)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_write_error(e, "Consultor", || {
                format!("O número {} já está em uso. Tente criar a proposta novamente.", numero)
            })
        })?;

        tx.commit().await.map_err(alocacao)?;

        Ok(proposta)
    }

    async fn update_proposta(&self, id: Uuid, dados: AtualizarProposta) -> Result<Option<Proposta>, AppError> {
        self.modificar_proposta(id, |p| {
            dados.aplicar_em(p);
            p.updated_at = Utc::now();
            Ok(())
        })
        .await
    }

    async fn marcar_enviada(
        &self,
        id: Uuid,
        metodo: MetodoEnvio,
        agora: DateTime<Utc>,
    ) -> Result<Option<Proposta>, AppError> {
        self.modificar_proposta(id, |p| {
            p.marcar_enviada(metodo, agora);
            Ok(())
        })
        .await
    }

    async fn transicionar_status(
        &self,
        id: Uuid,
        para: PropostaStatus,
        agora: DateTime<Utc>,
    ) -> Result<Option<Proposta>, AppError> {
        self.modificar_proposta(id, |p| p.transicionar(para, agora)).await
    }

    // proposta_envios.proposta_id ON DELETE CASCADE
    async fn delete_proposta(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM propostas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  ENVIOS
    // =========================================================================

    async fn create_envio(&self, dados: NovoEnvio) -> Result<PropostaEnvio, AppError> {
        sqlx::query_as::<_, PropostaEnvio>(
            r#"
            INSERT INTO proposta_envios (proposta_id, metodo, destinatario, status, error_message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(dados.proposta_id)
        .bind(dados.metodo)
        .bind(&dados.destinatario)
        .bind(dados.status)
        .bind(&dados.error_message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Proposta", || "Envio duplicado.".to_string()))
    }

    async fn list_envios(&self, proposta_id: Uuid) -> Result<Vec<PropostaEnvio>, AppError> {
        let envios = sqlx::query_as::<_, PropostaEnvio>(
            "SELECT * FROM proposta_envios WHERE proposta_id = $1 ORDER BY created_at ASC",
        )
        .bind(proposta_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(envios)
    }

    // =========================================================================
    //  METAS
    // =========================================================================

    async fn list_metas(&self) -> Result<Vec<MetaProposta>, AppError> {
        let metas = sqlx::query_as::<_, MetaProposta>("SELECT * FROM metas_propostas ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(metas)
    }

    async fn get_meta(&self, id: Uuid) -> Result<Option<MetaProposta>, AppError> {
        let meta = sqlx::query_as::<_, MetaProposta>("SELECT * FROM metas_propostas WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(meta)
    }

    async fn create_meta(&self, dados: NovaMeta) -> Result<MetaProposta, AppError> {
        sqlx::query_as::<_, MetaProposta>(
            r#"
            INSERT INTO metas_propostas (periodo, tipo, meta_valor, meta_quantidade, consultor_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&dados.periodo)
        .bind(dados.tipo)
        .bind(dados.meta_valor)
        .bind(dados.meta_quantidade)
        .bind(dados.consultor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Consultor", || "Meta duplicada.".to_string()))
    }

    async fn update_meta(&self, id: Uuid, dados: AtualizarMeta) -> Result<Option<MetaProposta>, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(mut meta) =
            sqlx::query_as::<_, MetaProposta>("SELECT * FROM metas_propostas WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        else {
            return Ok(None);
        };

        dados.aplicar_em(&mut meta);

        let atualizada = sqlx::query_as::<_, MetaProposta>(
            r#"
            UPDATE metas_propostas
            SET periodo = $2, tipo = $3, meta_valor = $4, meta_quantidade = $5, consultor_id = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&meta.periodo)
        .bind(meta.tipo)
        .bind(meta.meta_valor)
        .bind(meta.meta_quantidade)
        .bind(meta.consultor_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Consultor", || "Meta duplicada.".to_string()))?;

        tx.commit().await?;
        Ok(Some(atualizada))
    }

    async fn delete_meta(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM metas_propostas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
