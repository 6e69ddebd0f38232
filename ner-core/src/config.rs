//! # Configuração de Treinamento

use serde::{Deserialize, Serialize};

use crate::error::{NerError, Result};

/// Origem das tags usadas nas features de histórico durante o treino.
///
/// Na predição o histórico é sempre o da própria decodificação gulosa; a escolha
/// aqui define o quanto o treino expõe o modelo aos seus próprios erros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    /// **Teacher forcing**: histórico sempre das tags de referência. Os exemplos são
    /// extraídos uma única vez antes das épocas.
    #[default]
    Gold,
    /// **Estruturado**: histórico das predições gulosas do próprio modelo na época
    /// corrente, como acontece na predição.
    Predicted,
}

/// Hiperparâmetros do treinamento online.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Fator de regularização L2 aplicado às linhas atualizadas, em `[0, 1)`.
    pub reg: f64,
    /// Número de passadas completas pelos exemplos.
    pub epochs: usize,
    /// Embaralha a ordem dos exemplos a cada época.
    pub shuffle: bool,
    /// Semente do embaralhamento.
    pub seed: u64,
    /// Usa a média dos pesos como modelo final.
    pub average: bool,
    pub history: HistoryMode,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            reg: 0.00001,
            epochs: 100,
            shuffle: false,
            seed: 0,
            average: true,
            history: HistoryMode::Gold,
        }
    }
}

impl TrainConfig {
    /// Rejeita valores fora do domínio antes de qualquer trabalho.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.reg) {
            return Err(NerError::InvalidArgument {
                arg: "reg",
                message: format!("deve estar em [0, 1), recebeu {}", self.reg),
            });
        }
        Ok(())
    }
}
