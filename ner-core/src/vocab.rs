//! # Vocabulário de Features
//!
//! Mapeia cada chave `nome=valor` para um índice denso. O vocabulário é construído
//! numa única passada sobre o corpus de treino ([`VocabularyBuilder`]) e depois
//! congelado ([`FeatureVocabulary`]): não há como inserir entradas novas, então
//! features vistas só na predição são descartadas em vez de adicionadas.

use std::collections::HashMap;

use crate::error::{NerError, Result};
use crate::features::FeatureSet;

/// Contador de ocorrências usado durante a passada de construção.
#[derive(Debug, Default)]
pub struct VocabularyBuilder {
    counts: HashMap<String, usize>,
    /// Ordem da primeira ocorrência, para índices reprodutíveis.
    order: Vec<String>,
}

impl VocabularyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra uma ocorrência da chave.
    pub fn add(&mut self, key: String) {
        match self.counts.get_mut(&key) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(key.clone(), 1);
                self.order.push(key);
            }
        }
    }

    /// Registra todas as features de um conjunto.
    pub fn add_features(&mut self, fs: &FeatureSet) {
        for key in fs.keys() {
            self.add(key);
        }
    }

    /// Número de chaves distintas vistas até agora.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Congela o vocabulário mantendo apenas chaves com pelo menos `min_count` ocorrências.
    pub fn build(self, min_count: usize) -> FeatureVocabulary {
        let counts = self.counts;
        let keys: Vec<String> = self
            .order
            .into_iter()
            .filter(|k| counts.get(k).copied().unwrap_or(0) >= min_count)
            .collect();
        let index = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i))
            .collect();
        FeatureVocabulary { index, keys }
    }
}

/// Vocabulário congelado: chave → índice denso em `0..len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureVocabulary {
    index: HashMap<String, usize>,
    keys: Vec<String>,
}

impl FeatureVocabulary {
    /// Reconstrói o vocabulário a partir das chaves em ordem de índice.
    ///
    /// Chaves duplicadas tornariam o mapeamento ambíguo e são rejeitadas.
    pub fn from_keys(keys: Vec<String>) -> Result<Self> {
        let mut index = HashMap::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            if index.insert(key.clone(), i).is_some() {
                return Err(NerError::InvalidModel(format!(
                    "chave de feature duplicada no vocabulário: {key}"
                )));
            }
        }
        Ok(Self { index, keys })
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn key(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    /// Chaves em ordem de índice.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Índices das features presentes no vocabulário; as ausentes são ignoradas.
    pub fn lookup<'a, I>(&self, sets: I) -> Vec<usize>
    where
        I: IntoIterator<Item = &'a FeatureSet>,
    {
        sets.into_iter()
            .flat_map(|fs| fs.keys())
            .filter_map(|key| self.get(&key))
            .collect()
    }
}
