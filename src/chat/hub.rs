// src/chat/hub.rs

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

// Capacidade de cada canal. Quem ficar para trás perde mensagens antigas
// (comportamento padrão do broadcast), mas continua recebendo as novas.
const CHANNEL_CAPACITY: usize = 64;

/// Hub de chat em memória: um canal de broadcast por tarefa.
/// Cada conexão WebSocket vira um receiver; publicar replica para todos.
#[derive(Clone, Default)]
pub struct ChatHub {
    groups: Arc<RwLock<HashMap<Uuid, broadcast::Sender<String>>>>,
}

impl ChatHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entra no grupo da tarefa (cria o canal se for o primeiro ouvinte).
    pub async fn subscribe(&self, task_id: Uuid) -> broadcast::Receiver<String> {
        let mut groups = self.groups.write().await;
        groups
            .entry(task_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Envia o payload (já serializado) para todos os ouvintes da tarefa.
    pub async fn publish(&self, task_id: Uuid, payload: String) {
        let groups = self.groups.read().await;
        if let Some(sender) = groups.get(&task_id) {
            // Erro aqui só significa "ninguém ouvindo"; não é problema.
            let _ = sender.send(payload);
        }
    }

    /// Remove o canal da tarefa quando o último ouvinte desconecta.
    pub async fn prune(&self, task_id: Uuid) {
        let mut groups = self.groups.write().await;
        if let Some(sender) = groups.get(&task_id) {
            if sender.receiver_count() == 0 {
                groups.remove(&task_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publica_e_recebe_no_mesmo_grupo() {
        let hub = ChatHub::new();
        let task_id = Uuid::new_v4();

        let mut rx = hub.subscribe(task_id).await;
        hub.publish(task_id, "olá".to_string()).await;

        assert_eq!(rx.recv().await.unwrap(), "olá");
    }

    #[tokio::test]
    async fn grupos_sao_isolados_por_tarefa() {
        let hub = ChatHub::new();
        let task_a = Uuid::new_v4();
        let task_b = Uuid::new_v4();

        let mut rx_a = hub.subscribe(task_a).await;
        let _rx_b = hub.subscribe(task_b).await;

        hub.publish(task_b, "só para B".to_string()).await;
        hub.publish(task_a, "só para A".to_string()).await;

        assert_eq!(rx_a.recv().await.unwrap(), "só para A");
    }

    #[tokio::test]
    async fn prune_remove_grupo_sem_ouvintes() {
        let hub = ChatHub::new();
        let task_id = Uuid::new_v4();

        let rx = hub.subscribe(task_id).await;
        drop(rx);
        hub.prune(task_id).await;

        assert!(hub.groups.read().await.get(&task_id).is_none());
    }
}
