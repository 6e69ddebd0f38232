//! # Perceptron de Margem Multiclasse para NER
//!
//! Aprendizado **online** e **mistake-driven** sobre a tabela de pesos
//! `(feature, classe) → peso`. Para cada exemplo:
//!
//! 1. Calcula o score de todas as classes com os pesos atuais.
//! 2. Escolhe a classe rival: a de maior score entre as classes erradas.
//! 3. Se `score(correta) - score(rival) < 1`, promove a classe correta e penaliza a
//!    rival nas linhas das features ativas.
//!
//! Sem violação de margem não há mutação alguma: um conjunto já separado com
//! margem não gera mais atualizações, e pesos de features nunca ativas permanecem
//! em zero.
//!
//! ## Regularização
//! Antes de cada atualização as linhas das features ativas são encolhidas pelo
//! fator `(1 - reg)` (L2 preguiçoso: só linhas tocadas pagam o custo).
//!
//! ## Lazy Averaging
//! Com `average = true` o modelo final é a média dos pesos ao longo de todos os
//! passos, acumulada apenas quando um peso muda.

use serde::{Deserialize, Serialize};

use crate::error::{NerError, Result};

/// Margem exigida entre a classe correta e a melhor classe errada.
pub const MARGIN: f64 = 1.0;

/// Tabela densa de pesos, uma linha por feature do vocabulário e uma coluna por classe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    n_features: usize,
    n_classes: usize,
    data: Vec<f64>,
}

impl WeightTable {
    /// Tabela zerada.
    pub fn zeros(n_features: usize, n_classes: usize) -> Self {
        Self {
            n_features,
            n_classes,
            data: vec![0.0; n_features * n_classes],
        }
    }

    /// Monta a tabela a partir de dados linha a linha, validando as dimensões.
    pub fn from_parts(n_features: usize, n_classes: usize, data: Vec<f64>) -> Result<Self> {
        let table = Self {
            n_features,
            n_classes,
            data,
        };
        table.validate()?;
        Ok(table)
    }

    /// Confere que `data` tem exatamente `n_features × n_classes` pesos.
    pub fn validate(&self) -> Result<()> {
        let expected = self
            .n_features
            .checked_mul(self.n_classes)
            .ok_or_else(|| NerError::InvalidModel("dimensões da tabela de pesos estouram".into()))?;
        if self.data.len() != expected {
            return Err(NerError::InvalidModel(format!(
                "tabela {}×{} deveria ter {expected} pesos, tem {}",
                self.n_features,
                self.n_classes,
                self.data.len()
            )));
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn get(&self, feature: usize, class: usize) -> f64 {
        self.data[feature * self.n_classes + class]
    }

    /// Pesos de uma feature para todas as classes.
    pub fn row(&self, feature: usize) -> &[f64] {
        let start = feature * self.n_classes;
        &self.data[start..start + self.n_classes]
    }

    /// Score de cada classe: soma das linhas das features ativas.
    ///
    /// $$ \text{score}(c) = \sum_{f \in \text{ativas}} w_{f,c} $$
    pub fn scores(&self, features: &[usize]) -> Vec<f64> {
        let mut scores = vec![0.0; self.n_classes];
        for &f in features {
            for (score, w) in scores.iter_mut().zip(self.row(f)) {
                *score += w;
            }
        }
        scores
    }
}

/// Índice da maior pontuação. Empates ficam com o menor índice.
pub fn argmax(scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &score) in scores.iter().enumerate() {
        match best {
            Some(b) if scores[b] >= score => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Melhor classe diferente de `gold` (mesma regra de desempate de [`argmax`]).
fn rival(scores: &[f64], gold: usize) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &score) in scores.iter().enumerate() {
        if i == gold {
            continue;
        }
        match best {
            Some(b) if scores[b] >= score => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Resultado do processamento de um exemplo de treino.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Classe prevista com os pesos antes da atualização.
    pub predicted: usize,
    /// Se os pesos foram alterados.
    pub updated: bool,
}

/// Aprendiz online que possui a tabela de pesos durante o treinamento.
#[derive(Debug, Clone)]
pub struct OnlineLearner {
    weights: WeightTable,
    reg: f64,
    average: bool,
    /// Soma acumulada dos pesos ao longo dos passos (só com `average`).
    totals: Vec<f64>,
    /// Último passo em que cada peso mudou (só com `average`).
    last_update: Vec<usize>,
    steps: usize,
}

impl OnlineLearner {
    pub fn new(n_features: usize, n_classes: usize, reg: f64, average: bool) -> Self {
        let size = if average { n_features * n_classes } else { 0 };
        Self {
            weights: WeightTable::zeros(n_features, n_classes),
            reg,
            average,
            totals: vec![0.0; size],
            last_update: vec![0; size],
            steps: 0,
        }
    }

    /// Pesos correntes (não médios).
    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Pontua, compara com a classe correta e atualiza se a margem for violada.
    pub fn learn(&mut self, features: &[usize], gold: usize) -> Step {
        let scores = self.weights.scores(features);
        let predicted = argmax(&scores).unwrap_or(gold);

        let updated = match rival(&scores, gold) {
            Some(r) if scores[gold] - scores[r] < MARGIN => {
                self.update(features, gold, r);
                true
            }
            _ => false,
        };

        self.steps += 1;
        Step { predicted, updated }
    }

    /// $w_{f,correta} \leftarrow (1-reg)\,w_{f,correta} + 1$
    /// $w_{f,rival} \leftarrow (1-reg)\,w_{f,rival} - 1$
    fn update(&mut self, features: &[usize], gold: usize, rival: usize) {
        let n_classes = self.weights.n_classes;
        for &f in features {
            for c in 0..n_classes {
                let w = self.weights.get(f, c);
                let mut delta = -self.reg * w;
                if c == gold {
                    delta += 1.0;
                } else if c == rival {
                    delta -= 1.0;
                }
                if delta != 0.0 {
                    self.bump(f * n_classes + c, delta);
                }
            }
        }
    }

    fn bump(&mut self, idx: usize, delta: f64) {
        if self.average {
            // Acumula o peso antigo pelos passos em que ficou constante
            let since = (self.steps - self.last_update[idx]) as f64;
            self.totals[idx] += since * self.weights.data[idx];
            self.last_update[idx] = self.steps;
        }
        self.weights.data[idx] += delta;
    }

    /// Encerra o treino e devolve a tabela final (média, se configurado).
    pub fn finish(mut self) -> WeightTable {
        if self.average && self.steps > 0 {
            let steps = self.steps as f64;
            for idx in 0..self.weights.data.len() {
                let since = (self.steps - self.last_update[idx]) as f64;
                let total = self.totals[idx] + since * self.weights.data[idx];
                self.weights.data[idx] = total / steps;
            }
        }
        self.weights
    }
}
