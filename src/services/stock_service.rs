// src/services/stock_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::StockRepository,
    models::stock::{MovementType, StockBalance, StockLot, StockMovement},
};

// Dados de uma movimentação vindos do handler, já validados.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub target_location_id: Option<Uuid>,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub lot_number: Option<String>,
    pub expiration_date: Option<chrono::NaiveDate>,
    pub document_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct StockService {
    stock_repo: StockRepository,
    pool: PgPool,
}

impl StockService {
    pub fn new(stock_repo: StockRepository, pool: PgPool) -> Self {
        Self { stock_repo, pool }
    }

    /// Aplica o sinal do tipo de movimentação sobre a quantidade informada
    /// (sempre positiva no payload).
    pub fn signed_delta(movement_type: MovementType, quantity: Decimal) -> Decimal {
        match movement_type {
            MovementType::In | MovementType::Adjustment => quantity,
            // TRANSFER usa -quantity na origem e +quantity no destino.
            MovementType::Out | MovementType::Transfer => -quantity,
        }
    }

    /// Registra a movimentação e atualiza o saldo materializado na MESMA
    /// transação: ou o razão e o saldo andam juntos, ou nada é gravado.
    pub async fn register_movement(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        req: NewMovement,
    ) -> Result<(StockMovement, StockBalance), AppError> {
        if req.quantity <= Decimal::ZERO {
            return Err(AppError::BusinessRule(
                "A quantidade da movimentação deve ser positiva.".to_string(),
            ));
        }
        if req.movement_type == MovementType::Transfer && req.target_location_id.is_none() {
            return Err(AppError::BusinessRule(
                "Transferência exige o local de destino.".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let item = self
            .stock_repo
            .find_item_tx(&mut *tx, req.item_id, company_id)
            .await?
            .ok_or(AppError::NotFound("Item de estoque"))?;

        // Os locais também precisam pertencer à empresa; a FK sozinha só
        // garante que a linha existe em algum tenant.
        self.stock_repo
            .find_location_tx(&mut *tx, req.location_id, company_id)
            .await?
            .ok_or(AppError::NotFound("Local de estoque"))?;
        if let Some(target) = req.target_location_id {
            self.stock_repo
                .find_location_tx(&mut *tx, target, company_id)
                .await?
                .ok_or(AppError::NotFound("Local de destino"))?;
        }

        // Saída (e lado de origem da transferência) exige saldo disponível.
        if matches!(req.movement_type, MovementType::Out | MovementType::Transfer) {
            let balance = self
                .stock_repo
                .get_balance_for_update(&mut *tx, company_id, req.item_id, req.location_id)
                .await?;
            let available = balance.map(|b| b.available_quantity).unwrap_or(Decimal::ZERO);
            if available < req.quantity {
                return Err(AppError::BusinessRule(format!(
                    "Estoque insuficiente: disponível {}, solicitado {}.",
                    available, req.quantity
                )));
            }
        }

        // 1. Razão (imutável) primeiro.
        let movement = self
            .stock_repo
            .insert_movement(
                &mut *tx,
                company_id,
                req.item_id,
                req.location_id,
                req.target_location_id,
                req.movement_type,
                req.quantity,
                req.unit_cost,
                req.lot_number.as_deref(),
                req.document_number.as_deref(),
                req.notes.as_deref(),
                user_id,
            )
            .await?;

        // 2. Saldo da origem.
        let delta = Self::signed_delta(req.movement_type, req.quantity);
        let balance = self
            .stock_repo
            .apply_balance_delta(&mut *tx, company_id, req.item_id, req.location_id, delta)
            .await?;

        // 3. Saldo do destino, só em transferência.
        if let (MovementType::Transfer, Some(target)) =
            (req.movement_type, req.target_location_id)
        {
            self.stock_repo
                .apply_balance_delta(&mut *tx, company_id, req.item_id, target, req.quantity)
                .await?;
        }

        // 4. Lotes: entrada alimenta o lote informado; saída consome por
        //    lote específico ou FIFO.
        match req.movement_type {
            MovementType::In => {
                if let Some(lot) = req.lot_number.as_deref() {
                    self.stock_repo
                        .apply_lot_delta(
                            &mut *tx,
                            company_id,
                            req.item_id,
                            req.location_id,
                            lot,
                            req.quantity,
                            req.expiration_date,
                        )
                        .await?;
                }
            }
            MovementType::Out => {
                self.consume_lots(
                    &mut tx,
                    company_id,
                    req.item_id,
                    req.location_id,
                    req.quantity,
                    req.lot_number.as_deref(),
                )
                .await?;
            }
            // Transferência e ajuste não mexem em lotes.
            MovementType::Transfer | MovementType::Adjustment => {}
        }

        // 5. Alerta de estoque mínimo (na origem).
        if item.minimum_quantity > Decimal::ZERO
            && balance.current_quantity <= item.minimum_quantity
        {
            self.stock_repo
                .insert_alert(
                    &mut *tx,
                    company_id,
                    req.item_id,
                    req.location_id,
                    &format!(
                        "Item '{}' atingiu o estoque mínimo ({} <= {}).",
                        item.name, balance.current_quantity, item.minimum_quantity
                    ),
                    balance.current_quantity,
                    item.minimum_quantity,
                )
                .await?;
        }

        tx.commit().await?;
        Ok((movement, balance))
    }

    /// Decide quanto tirar de cada lote. Lote específico é estrito: precisa
    /// existir com saldo suficiente (senão o UPSERT criaria um lote
    /// fantasma negativo). Sem lote informado, consome FIFO pelo mais
    /// antigo; aqui o saldo de lote é "melhor esforço", itens sem lote
    /// simplesmente não têm linhas.
    fn plan_lot_consumption(
        lots: &[StockLot],
        quantity: Decimal,
        specific_lot: Option<&str>,
    ) -> Result<Vec<(String, Decimal)>, AppError> {
        if let Some(wanted) = specific_lot {
            let lot = lots
                .iter()
                .find(|l| l.lot_number == wanted)
                .ok_or_else(|| {
                    AppError::BusinessRule(format!(
                        "Lote '{}' não encontrado ou sem saldo neste local.",
                        wanted
                    ))
                })?;
            if lot.quantity < quantity {
                return Err(AppError::BusinessRule(format!(
                    "Saldo insuficiente no lote '{}': disponível {}, solicitado {}.",
                    wanted, lot.quantity, quantity
                )));
            }
            return Ok(vec![(lot.lot_number.clone(), quantity)]);
        }

        let mut plan = Vec::new();
        let mut remaining = quantity;
        for lot in lots {
            if remaining <= Decimal::ZERO {
                break;
            }
            let to_take = lot.quantity.min(remaining);
            plan.push((lot.lot_number.clone(), to_take));
            remaining -= to_take;
        }
        Ok(plan)
    }

    async fn consume_lots(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        company_id: Uuid,
        item_id: Uuid,
        location_id: Uuid,
        quantity: Decimal,
        specific_lot: Option<&str>,
    ) -> Result<(), AppError> {
        // lots_for_consumption já trava as linhas (FOR UPDATE) e só devolve
        // lotes com saldo positivo, em ordem FIFO.
        let lots = self
            .stock_repo
            .lots_for_consumption(&mut **tx, company_id, item_id, location_id)
            .await?;

        let plan = Self::plan_lot_consumption(&lots, quantity, specific_lot)?;
        for (lot_number, to_take) in plan {
            self.stock_repo
                .apply_lot_delta(
                    &mut **tx,
                    company_id,
                    item_id,
                    location_id,
                    &lot_number,
                    -to_take,
                    None,
                )
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    fn dec(v: f64) -> Decimal {
        Decimal::from_f64(v).unwrap()
    }

    #[test]
    fn entrada_e_ajuste_somam() {
        assert_eq!(StockService::signed_delta(MovementType::In, dec(5.0)), dec(5.0));
        assert_eq!(
            StockService::signed_delta(MovementType::Adjustment, dec(2.5)),
            dec(2.5)
        );
    }

    #[test]
    fn saida_e_transferencia_subtraem_na_origem() {
        assert_eq!(StockService::signed_delta(MovementType::Out, dec(5.0)), dec(-5.0));
        assert_eq!(
            StockService::signed_delta(MovementType::Transfer, dec(3.0)),
            dec(-3.0)
        );
    }

    fn lote(numero: &str, quantidade: f64) -> StockLot {
        let now = chrono::Utc::now();
        StockLot {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            lot_number: numero.to_string(),
            quantity: dec(quantidade),
            expiration_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn lote_especifico_inexistente_e_recusado() {
        let lots = vec![lote("A", 10.0)];
        let err = StockService::plan_lot_consumption(&lots, dec(5.0), Some("X"));
        assert!(matches!(err, Err(AppError::BusinessRule(_))));
    }

    #[test]
    fn lote_especifico_nao_fica_negativo() {
        let lots = vec![lote("A", 3.0)];
        let err = StockService::plan_lot_consumption(&lots, dec(5.0), Some("A"));
        assert!(matches!(err, Err(AppError::BusinessRule(_))));

        let plan = StockService::plan_lot_consumption(&lots, dec(3.0), Some("A")).unwrap();
        assert_eq!(plan, vec![("A".to_string(), dec(3.0))]);
    }

    #[test]
    fn fifo_consome_do_mais_antigo_sem_estourar_lote() {
        let lots = vec![lote("A", 3.0), lote("B", 10.0)];
        let plan = StockService::plan_lot_consumption(&lots, dec(5.0), None).unwrap();
        assert_eq!(
            plan,
            vec![("A".to_string(), dec(3.0)), ("B".to_string(), dec(2.0))]
        );
    }
}
