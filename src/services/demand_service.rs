// src/services/demand_service.rs

use chrono::{Datelike, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DemandRepository, TenancyRepository},
    models::{
        auth::User,
        demand::{
            ApprovalOutcome, ApprovalStatus, Demand, DemandApproval, DemandDetail,
            DemandPriority, DemandStatus,
        },
    },
};

// Dados de criação vindos do handler, já validados.
#[derive(Debug, Clone)]
pub struct NewDemand {
    pub department_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<DemandPriority>,
    pub needed_by: Option<chrono::NaiveDate>,
}

#[derive(Clone)]
pub struct DemandService {
    demand_repo: DemandRepository,
    tenancy_repo: TenancyRepository,
    pool: PgPool,
}

impl DemandService {
    pub fn new(
        demand_repo: DemandRepository,
        tenancy_repo: TenancyRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            demand_repo,
            tenancy_repo,
            pool,
        }
    }

    /// Monta o número no formato TAL-{código}-{ano}-{seq:04}.
    pub fn format_demand_number(company_code: &str, year: i32, seq: i32) -> String {
        format!("TAL-{}-{}-{:04}", company_code, year, seq)
    }

    /// Resultado geral derivado varrendo os registros de aprovação.
    /// Nada disso é persistido na demanda.
    ///
    /// Regras: qualquer nível obrigatório rejeitado derruba a demanda;
    /// todos os níveis obrigatórios aprovados a aprovam. Sem níveis
    /// obrigatórios, valem todos os níveis. Sem registros, fica pendente.
    pub fn derive_outcome(approvals: &[DemandApproval]) -> ApprovalOutcome {
        let required: Vec<&DemandApproval> =
            approvals.iter().filter(|a| a.is_required).collect();
        let relevant: Vec<&DemandApproval> = if required.is_empty() {
            approvals.iter().collect()
        } else {
            required
        };

        if relevant.is_empty() {
            return ApprovalOutcome::Pending;
        }
        if relevant.iter().any(|a| a.status == ApprovalStatus::Rejected) {
            return ApprovalOutcome::Rejected;
        }
        if relevant.iter().all(|a| a.status == ApprovalStatus::Approved) {
            return ApprovalOutcome::Approved;
        }
        ApprovalOutcome::Pending
    }

    /// Cria a demanda em DRAFT com número gerado pelo contador atômico
    /// (empresa, ano), na mesma transação do INSERT.
    pub async fn create_demand(
        &self,
        company_id: Uuid,
        user: &User,
        req: NewDemand,
    ) -> Result<Demand, AppError> {
        let company = self
            .tenancy_repo
            .find_company(company_id)
            .await?
            .ok_or(AppError::NotFound("Empresa"))?;

        let year = Utc::now().year();

        let mut tx = self.pool.begin().await?;

        let seq = self
            .demand_repo
            .next_sequence(&mut *tx, company_id, year)
            .await?;
        let demand_number = Self::format_demand_number(&company.code, year, seq);

        let demand = self
            .demand_repo
            .insert_demand(
                &mut *tx,
                company_id,
                &demand_number,
                req.department_id,
                req.project_id,
                &req.title,
                req.description.as_deref(),
                req.priority.unwrap_or(DemandPriority::Normal),
                user.id,
                req.needed_by,
            )
            .await?;

        tx.commit().await?;
        Ok(demand)
    }

    /// DRAFT -> SUBMITTED. Exige ao menos um item.
    pub async fn submit(
        &self,
        demand_id: Uuid,
        company_id: Uuid,
        user: &User,
    ) -> Result<Demand, AppError> {
        let demand = self
            .demand_repo
            .find(demand_id, company_id)
            .await?
            .ok_or(AppError::NotFound("Demanda"))?;

        if demand.status != DemandStatus::Draft {
            return Err(AppError::BusinessRule(
                "Apenas demandas em rascunho podem ser enviadas.".to_string(),
            ));
        }
        if self.demand_repo.count_items(demand_id).await? == 0 {
            return Err(AppError::BusinessRule(
                "A demanda precisa de ao menos um item antes do envio.".to_string(),
            ));
        }

        self.demand_repo
            .set_status(demand_id, company_id, DemandStatus::Submitted, user.id)
            .await
    }

    /// Decide UM registro de aprovação. As linhas são independentes: nada
    /// impede decidir o nível 2 antes do nível 1.
    pub async fn decide_approval(
        &self,
        demand_id: Uuid,
        approval_id: Uuid,
        company_id: Uuid,
        user: &User,
        decision: ApprovalStatus,
        notes: Option<&str>,
    ) -> Result<DemandApproval, AppError> {
        if decision == ApprovalStatus::Pending {
            return Err(AppError::BusinessRule(
                "A decisão deve ser APPROVED ou REJECTED.".to_string(),
            ));
        }

        let demand = self
            .demand_repo
            .find(demand_id, company_id)
            .await?
            .ok_or(AppError::NotFound("Demanda"))?;
        if demand.status != DemandStatus::Submitted {
            return Err(AppError::BusinessRule(
                "Somente demandas enviadas podem ser decididas.".to_string(),
            ));
        }

        let approval = self
            .demand_repo
            .find_approval(approval_id, demand_id)
            .await?
            .ok_or(AppError::NotFound("Registro de aprovação"))?;

        if approval.approver_id != user.id {
            return Err(AppError::Forbidden(
                "Este registro de aprovação pertence a outro usuário.".to_string(),
            ));
        }
        if approval.status != ApprovalStatus::Pending {
            return Err(AppError::Conflict(
                "Este registro de aprovação já foi decidido.".to_string(),
            ));
        }

        self.demand_repo
            .decide_approval(approval_id, demand_id, decision, notes)
            .await
    }

    /// Detalhe completo, com o resultado de aprovação calculado na hora.
    pub async fn detail(&self, demand_id: Uuid, company_id: Uuid) -> Result<DemandDetail, AppError> {
        let demand = self
            .demand_repo
            .find(demand_id, company_id)
            .await?
            .ok_or(AppError::NotFound("Demanda"))?;

        let items = self.demand_repo.list_items(demand_id).await?;
        let approvals = self.demand_repo.list_approvals(demand_id).await?;
        let comments = self.demand_repo.list_comments(demand_id).await?;
        let approval_outcome = Self::derive_outcome(&approvals);

        Ok(DemandDetail {
            demand,
            items,
            approvals,
            comments,
            approval_outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn approval(sort_order: i32, is_required: bool, status: ApprovalStatus) -> DemandApproval {
        DemandApproval {
            id: Uuid::new_v4(),
            demand_id: Uuid::new_v4(),
            approver_id: Uuid::new_v4(),
            sort_order,
            is_required,
            status,
            approval_date: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn numero_segue_o_formato_tal() {
        assert_eq!(
            DemandService::format_demand_number("TLS", 2026, 42),
            "TAL-TLS-2026-0042"
        );
        assert_eq!(
            DemandService::format_demand_number("AB", 2026, 12345),
            "TAL-AB-2026-12345"
        );
    }

    #[test]
    fn sem_registros_fica_pendente() {
        assert_eq!(DemandService::derive_outcome(&[]), ApprovalOutcome::Pending);
    }

    #[test]
    fn rejeicao_obrigatoria_derruba_a_demanda() {
        let approvals = vec![
            approval(1, true, ApprovalStatus::Approved),
            approval(2, true, ApprovalStatus::Rejected),
            approval(3, false, ApprovalStatus::Pending),
        ];
        assert_eq!(
            DemandService::derive_outcome(&approvals),
            ApprovalOutcome::Rejected
        );
    }

    #[test]
    fn todos_os_obrigatorios_aprovados_aprova() {
        let approvals = vec![
            approval(1, true, ApprovalStatus::Approved),
            approval(2, true, ApprovalStatus::Approved),
            // Nível opcional pendente não bloqueia.
            approval(3, false, ApprovalStatus::Pending),
        ];
        assert_eq!(
            DemandService::derive_outcome(&approvals),
            ApprovalOutcome::Approved
        );
    }

    #[test]
    fn obrigatorio_pendente_mantem_pendente() {
        let approvals = vec![
            approval(1, true, ApprovalStatus::Approved),
            approval(2, true, ApprovalStatus::Pending),
        ];
        assert_eq!(
            DemandService::derive_outcome(&approvals),
            ApprovalOutcome::Pending
        );
    }

    #[test]
    fn sem_obrigatorios_valem_todos_os_niveis() {
        let approvals = vec![
            approval(1, false, ApprovalStatus::Approved),
            approval(2, false, ApprovalStatus::Approved),
        ];
        assert_eq!(
            DemandService::derive_outcome(&approvals),
            ApprovalOutcome::Approved
        );
    }
}
