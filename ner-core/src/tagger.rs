//! # Tagger Guloso com Perceptron Estruturado
//!
//! Junta as peças do sistema:
//!
//! 1. **Vocabulário** ([`GreedyTagger::feature_extraction`]): uma passada pelo corpus
//!    anotado registrando as features estáticas e de histórico (histórico = tags de
//!    referência), com corte de frequência mínima.
//! 2. **Treino** ([`GreedyTagger::train`]): épocas de aprendizado online sobre os
//!    exemplos token a token.
//! 3. **Decodificação** ([`GreedyTagger::tag`]): esquerda para a direita, uma única
//!    passada, sem backtracking.
//!
//! ## Decodificação gulosa
//!
//! ```text
//! histórico = []
//! para i em 0..n:
//!     features = fd(sent, i) ∪ hd(histórico, sent, i)
//!     tag_i    = argmax_c Σ_f w[f, c]
//!     histórico.push(tag_i)
//! ```
//!
//! Diferente do Viterbi, um erro no início da sentença nunca é corrigido depois: é a
//! troca aceita por uma decodificação linear no tamanho da sentença.
//!
//! ## Desempate
//! As classes são mantidas em ordem lexicográfica e, em caso de empate no score,
//! vence a de menor índice (ou seja, o menor nome de tag).

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{HistoryMode, TrainConfig};
use crate::corpus::{Sentence, Token};
use crate::error::{NerError, Result};
use crate::features::{history_features, static_features};
use crate::perceptron::{argmax, OnlineLearner, WeightTable};
use crate::vocab::{FeatureVocabulary, VocabularyBuilder};

/// Versão do formato do arquivo de modelo.
pub const FORMAT_VERSION: u32 = 1;

/// Um exemplo de treino: features ativas de uma posição e a classe correta.
#[derive(Debug, Clone)]
struct Example {
    features: Vec<usize>,
    gold: usize,
}

/// Estatísticas do treinamento, uma entrada por época.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrainReport {
    /// Posições em que a classe prevista (antes da atualização) estava errada.
    pub mistakes_per_epoch: Vec<usize>,
    /// Posições que violaram a margem e alteraram os pesos.
    pub updates_per_epoch: Vec<usize>,
    /// Número de posições visitadas por época.
    pub examples: usize,
}

/// Tagger NER guloso.
///
/// Mantém o vocabulário de features congelado, as classes (tags) em ordem
/// lexicográfica e a tabela de pesos `feature × classe`. Vocabulário e tabela estão
/// sempre co-indexados.
#[derive(Debug, Clone, Default)]
pub struct GreedyTagger {
    vocab: FeatureVocabulary,
    classes: Vec<String>,
    weights: WeightTable,
    min_count: usize,
    config: Option<TrainConfig>,
}

impl GreedyTagger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vocabulary(&self) -> &FeatureVocabulary {
        &self.vocab
    }

    /// Tags conhecidas, em ordem lexicográfica.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Configuração do último treino (também restaurada ao carregar um modelo).
    pub fn config(&self) -> Option<&TrainConfig> {
        self.config.as_ref()
    }

    pub fn class_index(&self, tag: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(tag))
            .ok()
    }

    /// Constrói o vocabulário de features e o conjunto de classes a partir do corpus anotado.
    ///
    /// As features de histórico usam as tags de referência de cada sentença. Chaves com
    /// menos de `min_count` ocorrências são descartadas. Reinicia a tabela de pesos.
    ///
    /// # Erros
    /// [`NerError::MissingLabels`] se alguma sentença não tiver tags de referência.
    pub fn feature_extraction(&mut self, corpus: &[Sentence], min_count: usize) -> Result<()> {
        let mut builder = VocabularyBuilder::new();
        let mut classes = BTreeSet::new();

        for (s, sentence) in corpus.iter().enumerate() {
            let labels = gold_labels(sentence, s)?;
            for i in 0..sentence.len() {
                builder.add_features(&static_features(&sentence.tokens, i));
                builder.add_features(&history_features(labels, &sentence.tokens, i));
            }
            classes.extend(labels.iter().cloned());
        }

        let seen = builder.len();
        self.vocab = builder.build(min_count);
        self.classes = classes.into_iter().collect();
        self.weights = WeightTable::zeros(self.vocab.len(), self.classes.len());
        self.min_count = min_count;
        self.config = None;

        info!(
            features = self.vocab.len(),
            discarded = seen - self.vocab.len(),
            classes = self.classes.len(),
            "vocabulário de features construído"
        );
        debug!(classes = ?self.classes, "classes");
        Ok(())
    }

    /// Índices das classes de referência de uma sentença.
    fn gold_indices(&self, sentence: &Sentence, s: usize) -> Result<Vec<usize>> {
        gold_labels(sentence, s)?
            .iter()
            .map(|tag| {
                self.class_index(tag).ok_or_else(|| NerError::InvalidArgument {
                    arg: "corpus",
                    message: format!("tag `{tag}` da sentença {s} não foi vista na extração de features"),
                })
            })
            .collect()
    }

    /// Treina os pesos com o corpus anotado.
    ///
    /// Cada época visita todas as posições exatamente uma vez, na ordem do corpus ou
    /// embaralhada. Com [`HistoryMode::Gold`] os exemplos são extraídos uma vez; com
    /// [`HistoryMode::Predicted`] as features de histórico vêm das predições do
    /// próprio modelo e são recalculadas a cada época.
    ///
    /// # Erros
    /// - [`NerError::NotFitted`] se `feature_extraction` não foi chamado.
    /// - [`NerError::InvalidArgument`] para configuração inválida ou tags desconhecidas.
    pub fn train(&mut self, corpus: &[Sentence], config: &TrainConfig) -> Result<TrainReport> {
        config.validate()?;
        if self.classes.is_empty() {
            return Err(NerError::NotFitted);
        }

        let gold: Vec<Vec<usize>> = corpus
            .iter()
            .enumerate()
            .map(|(s, sentence)| self.gold_indices(sentence, s))
            .collect::<Result<_>>()?;

        let mut learner = OnlineLearner::new(
            self.vocab.len(),
            self.classes.len(),
            config.reg,
            config.average,
        );

        let report = match config.history {
            HistoryMode::Gold => self.train_gold(corpus, &gold, config, &mut learner),
            HistoryMode::Predicted => self.train_predicted(corpus, &gold, config, &mut learner),
        };

        self.weights = learner.finish();
        self.config = Some(config.clone());
        if let Ok(json) = serde_json::to_string(&report) {
            debug!(report = %json, "relatório de treino");
        }
        Ok(report)
    }

    /// Teacher forcing: exemplos extraídos uma vez com histórico de referência.
    fn train_gold(
        &self,
        corpus: &[Sentence],
        gold: &[Vec<usize>],
        config: &TrainConfig,
        learner: &mut OnlineLearner,
    ) -> TrainReport {
        let examples: Vec<Example> = corpus
            .par_iter()
            .zip(gold.par_iter())
            .flat_map_iter(|(sentence, tags)| {
                let labels: &[String] = sentence.labels.as_deref().unwrap_or_default();
                (0..sentence.len()).map(move |i| {
                    let fd = static_features(&sentence.tokens, i);
                    let hd = history_features(labels, &sentence.tokens, i);
                    Example {
                        features: self.vocab.lookup([&fd, &hd]),
                        gold: tags[i],
                    }
                })
            })
            .collect();

        let mut report = TrainReport {
            examples: examples.len(),
            ..TrainReport::default()
        };
        let mut order: Vec<usize> = (0..examples.len()).collect();

        for epoch in 0..config.epochs {
            if config.shuffle {
                shuffle(&mut order, config.seed.wrapping_add(epoch as u64));
            }
            let mut mistakes = 0;
            let mut updates = 0;
            for &idx in &order {
                let example = &examples[idx];
                let step = learner.learn(&example.features, example.gold);
                if step.predicted != example.gold {
                    mistakes += 1;
                }
                if step.updated {
                    updates += 1;
                }
            }
            log_epoch(epoch, config.epochs, mistakes, updates, examples.len());
            report.mistakes_per_epoch.push(mistakes);
            report.updates_per_epoch.push(updates);
        }
        report
    }

    /// Treino estruturado: o histórico é a decodificação gulosa corrente.
    fn train_predicted(
        &self,
        corpus: &[Sentence],
        gold: &[Vec<usize>],
        config: &TrainConfig,
        learner: &mut OnlineLearner,
    ) -> TrainReport {
        // Features estáticas não dependem do histórico: calculadas uma vez
        let static_cache: Vec<Vec<Vec<usize>>> = corpus
            .par_iter()
            .map(|sentence| {
                (0..sentence.len())
                    .map(|i| self.vocab.lookup([&static_features(&sentence.tokens, i)]))
                    .collect()
            })
            .collect();

        let total: usize = corpus.iter().map(Sentence::len).sum();
        let mut report = TrainReport {
            examples: total,
            ..TrainReport::default()
        };
        let mut order: Vec<usize> = (0..corpus.len()).collect();

        for epoch in 0..config.epochs {
            if config.shuffle {
                shuffle(&mut order, config.seed.wrapping_add(epoch as u64));
            }
            let mut mistakes = 0;
            let mut updates = 0;
            for &s in &order {
                let tokens = &corpus[s].tokens;
                let mut history: Vec<&str> = Vec::with_capacity(tokens.len());
                for (i, &gold_class) in gold[s].iter().enumerate() {
                    let hd = history_features(&history, tokens, i);
                    let mut features = static_cache[s][i].clone();
                    features.extend(self.vocab.lookup([&hd]));

                    let step = learner.learn(&features, gold_class);
                    if step.predicted != gold_class {
                        mistakes += 1;
                    }
                    if step.updated {
                        updates += 1;
                    }
                    history.push(&self.classes[step.predicted]);
                }
            }
            log_epoch(epoch, config.epochs, mistakes, updates, total);
            report.mistakes_per_epoch.push(mistakes);
            report.updates_per_epoch.push(updates);
        }
        report
    }

    /// Decodifica uma sentença, da esquerda para a direita.
    ///
    /// Features fora do vocabulário são ignoradas. Determinístico: a mesma sentença
    /// com os mesmos pesos produz sempre a mesma sequência.
    ///
    /// # Erros
    /// [`NerError::NotFitted`] se o tagger não tem classes.
    pub fn tag(&self, tokens: &[Token]) -> Result<Vec<String>> {
        if self.classes.is_empty() {
            return Err(NerError::NotFitted);
        }

        let mut history: Vec<&str> = Vec::with_capacity(tokens.len());
        for i in 0..tokens.len() {
            let fd = static_features(tokens, i);
            let hd = history_features(&history, tokens, i);
            let features = self.vocab.lookup([&fd, &hd]);
            let scores = self.weights.scores(&features);
            let best = argmax(&scores).unwrap_or(0);
            history.push(&self.classes[best]);
        }
        Ok(history.into_iter().map(str::to_string).collect())
    }

    /// Decodifica todas as sentenças em paralelo, preservando a ordem.
    pub fn tag_corpus(&self, corpus: &[Sentence]) -> Result<Vec<Vec<String>>> {
        corpus
            .par_iter()
            .map(|sentence| self.tag(&sentence.tokens))
            .collect()
    }

    /// Serializa vocabulário, classes e pesos como uma unidade (JSON).
    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        let file = ModelFileRef {
            version: FORMAT_VERSION,
            classes: &self.classes,
            features: self.vocab.keys(),
            weights: &self.weights,
            min_count: self.min_count,
            config: self.config.as_ref(),
        };
        serde_json::to_writer(writer, &file)?;
        Ok(())
    }

    /// Lê um modelo gravado por [`GreedyTagger::write`].
    ///
    /// # Erros
    /// - [`NerError::DimensionMismatch`] se o vocabulário e a tabela de pesos
    ///   discordarem no número de features.
    /// - [`NerError::InvalidModel`] para versão desconhecida, classes fora de ordem,
    ///   tabela com tamanho errado ou chaves duplicadas.
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let file: ModelFile = serde_json::from_reader(reader)?;

        if file.version != FORMAT_VERSION {
            return Err(NerError::InvalidModel(format!(
                "versão de formato {} não suportada (esperava {FORMAT_VERSION})",
                file.version
            )));
        }
        file.weights.validate()?;
        if file.features.len() != file.weights.n_features() {
            return Err(NerError::DimensionMismatch {
                vocab: file.features.len(),
                weights: file.weights.n_features(),
            });
        }
        if file.classes.len() != file.weights.n_classes() {
            return Err(NerError::InvalidModel(format!(
                "{} classes, mas a tabela de pesos tem {} colunas",
                file.classes.len(),
                file.weights.n_classes()
            )));
        }
        if file.classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(NerError::InvalidModel(
                "classes devem estar em ordem lexicográfica e sem repetição".into(),
            ));
        }

        Ok(Self {
            vocab: FeatureVocabulary::from_keys(file.features)?,
            classes: file.classes,
            weights: file.weights,
            min_count: file.min_count,
            config: file.config,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read(BufReader::new(File::open(path)?))
    }
}

#[derive(Serialize)]
struct ModelFileRef<'a> {
    version: u32,
    classes: &'a [String],
    features: &'a [String],
    weights: &'a WeightTable,
    min_count: usize,
    config: Option<&'a TrainConfig>,
}

#[derive(Deserialize)]
struct ModelFile {
    version: u32,
    classes: Vec<String>,
    features: Vec<String>,
    weights: WeightTable,
    min_count: usize,
    config: Option<TrainConfig>,
}

fn gold_labels(sentence: &Sentence, s: usize) -> Result<&[String]> {
    sentence
        .labels
        .as_deref()
        .ok_or(NerError::MissingLabels { sentence: s })
}

/// Fisher-Yates reprodutível a partir da semente.
fn shuffle(order: &mut [usize], seed: u64) {
    let mut rng = oorandom::Rand64::new(u128::from(seed));
    for i in (1..order.len()).rev() {
        let j = rng.rand_range(0..(i as u64 + 1)) as usize;
        order.swap(i, j);
    }
}

fn log_epoch(epoch: usize, epochs: usize, mistakes: usize, updates: usize, total: usize) {
    let accuracy = if total > 0 {
        (total - mistakes) as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    info!(
        epoch = epoch + 1,
        epochs,
        mistakes,
        updates,
        "época concluída: acurácia de treino {accuracy:.2}%"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(tokens: &[(&str, &str, &str, &str)], tags: &[&str]) -> Sentence {
        let tokens = tokens
            .iter()
            .map(|(w, p, c, l)| Token::new(*w, *p, *c, *l))
            .collect();
        let tags = tags.iter().map(|t| t.to_string()).collect();
        Sentence::with_labels(tokens, tags).unwrap()
    }

    fn john_corpus() -> Vec<Sentence> {
        vec![labeled(
            &[("John", "NNP", "B-NP", "john"), ("lives", "VBZ", "O", "live")],
            &["B-PER", "O"],
        )]
    }

    fn small_corpus() -> Vec<Sentence> {
        vec![
            labeled(
                &[
                    ("Peter", "NNP", "I-NP", "peter"),
                    ("Blackburn", "NNP", "I-NP", "blackburn"),
                    ("visited", "VBD", "I-VP", "visit"),
                    ("Bonn", "NNP", "I-NP", "bonn"),
                ],
                &["B-PER", "I-PER", "O", "B-LOC"],
            ),
            labeled(
                &[
                    ("EU", "NNP", "I-NP", "eu"),
                    ("rejects", "VBZ", "I-VP", "reject"),
                    ("German", "JJ", "I-NP", "german"),
                    ("call", "NN", "I-NP", "call"),
                ],
                &["B-ORG", "O", "B-MISC", "O"],
            ),
        ]
    }

    fn quick_config(history: HistoryMode) -> TrainConfig {
        TrainConfig {
            epochs: 10,
            history,
            ..TrainConfig::default()
        }
    }

    fn tokens(sentence: &Sentence) -> &[Token] {
        &sentence.tokens
    }

    #[test]
    fn test_feature_extraction_builds_sorted_classes() {
        let corpus = small_corpus();
        let mut tagger = GreedyTagger::new();
        tagger.feature_extraction(&corpus, 0).unwrap();

        assert_eq!(tagger.classes(), &["B-LOC", "B-MISC", "B-ORG", "B-PER", "I-PER", "O"]);
        assert!(!tagger.vocabulary().is_empty());
        assert_eq!(tagger.weights().n_features(), tagger.vocabulary().len());
        assert_eq!(tagger.weights().n_classes(), 6);
        assert!(tagger.vocabulary().get("prev_tag=B-PER").is_some());
        assert_eq!(tagger.class_index("O"), Some(5));
        assert_eq!(tagger.class_index("I-LOC"), None);
    }

    #[test]
    fn test_min_count_shrinks_vocabulary() {
        let corpus = small_corpus();
        let mut all = GreedyTagger::new();
        all.feature_extraction(&corpus, 0).unwrap();
        let mut frequent = GreedyTagger::new();
        frequent.feature_extraction(&corpus, 2).unwrap();

        assert!(frequent.vocabulary().len() < all.vocabulary().len());
        assert!(frequent.vocabulary().get("prev2_word=<s>").is_some());
        assert!(frequent.vocabulary().get("word=Peter").is_none());
    }

    #[test]
    fn test_feature_extraction_requires_labels() {
        let corpus = vec![Sentence::new(vec![Token::new("John", "NNP", "B-NP", "john")])];
        let mut tagger = GreedyTagger::new();
        assert!(matches!(
            tagger.feature_extraction(&corpus, 0),
            Err(NerError::MissingLabels { sentence: 0 })
        ));
    }

    #[test]
    fn test_train_before_feature_extraction() {
        let mut tagger = GreedyTagger::new();
        assert!(matches!(
            tagger.train(&john_corpus(), &TrainConfig::default()),
            Err(NerError::NotFitted)
        ));
        assert!(matches!(tagger.tag(&[]), Err(NerError::NotFitted)));
    }

    #[test]
    fn test_train_rejects_unknown_tag() {
        let mut tagger = GreedyTagger::new();
        tagger.feature_extraction(&john_corpus(), 0).unwrap();
        let other = vec![labeled(&[("Bonn", "NNP", "I-NP", "bonn")], &["B-LOC"])];
        assert!(tagger.train(&other, &TrainConfig::default()).is_err());
    }

    #[test]
    fn test_end_to_end_john_lives() {
        let corpus = john_corpus();
        for history in [HistoryMode::Gold, HistoryMode::Predicted] {
            let mut tagger = GreedyTagger::new();
            tagger.feature_extraction(&corpus, 0).unwrap();
            tagger.train(&corpus, &quick_config(history)).unwrap();
            assert_eq!(tagger.tag(tokens(&corpus[0])).unwrap(), vec!["B-PER", "O"]);
        }
    }

    #[test]
    fn test_training_converges_on_separable_corpus() {
        let corpus = john_corpus();
        let mut tagger = GreedyTagger::new();
        tagger.feature_extraction(&corpus, 0).unwrap();
        let report = tagger.train(&corpus, &quick_config(HistoryMode::Gold)).unwrap();

        assert_eq!(report.examples, 2);
        assert_eq!(report.mistakes_per_epoch.len(), 10);
        assert_eq!(report.mistakes_per_epoch.last(), Some(&0));
        assert_eq!(report.updates_per_epoch.last(), Some(&0));
        assert!(report
            .mistakes_per_epoch
            .windows(2)
            .skip(1)
            .all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_train_report_as_json() {
        let corpus = john_corpus();
        let mut tagger = GreedyTagger::new();
        tagger.feature_extraction(&corpus, 0).unwrap();
        let config = TrainConfig {
            epochs: 3,
            ..TrainConfig::default()
        };
        let report = tagger.train(&corpus, &config).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["examples"], 2);
        assert_eq!(json["mistakes_per_epoch"].as_array().unwrap().len(), 3);
        assert_eq!(json["updates_per_epoch"][2], 0);
    }

    #[test]
    fn test_small_corpus_fits_training_data() {
        let corpus = small_corpus();
        for history in [HistoryMode::Gold, HistoryMode::Predicted] {
            let mut tagger = GreedyTagger::new();
            tagger.feature_extraction(&corpus, 0).unwrap();
            // pesos finais sem média: sem updates na última época implica acerto total
            let config = TrainConfig {
                reg: 0.0,
                epochs: 30,
                average: false,
                history,
                ..TrainConfig::default()
            };
            let report = tagger.train(&corpus, &config).unwrap();
            assert_eq!(report.updates_per_epoch.last(), Some(&0));

            let predicted = tagger.tag_corpus(&corpus).unwrap();
            for (sentence, tags) in corpus.iter().zip(&predicted) {
                assert_eq!(sentence.labels.as_ref(), Some(tags));
            }
        }
    }

    #[test]
    fn test_untouched_weights_stay_zero() {
        let corpus = john_corpus();
        let mut tagger = GreedyTagger::new();
        tagger.feature_extraction(&corpus, 0).unwrap();
        // extrai também features de uma sentença que nunca entra no treino
        let mut vocab_source = corpus.clone();
        vocab_source.push(labeled(&[("Bonn", "NNP", "I-NP", "bonn")], &["O"]));
        tagger.feature_extraction(&vocab_source, 0).unwrap();
        tagger.train(&corpus, &quick_config(HistoryMode::Gold)).unwrap();

        let idx = tagger.vocabulary().get("word=Bonn").unwrap();
        assert!(tagger.weights().row(idx).iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_greedy_decoding_is_deterministic() {
        let corpus = small_corpus();
        let mut tagger = GreedyTagger::new();
        tagger.feature_extraction(&corpus, 0).unwrap();
        tagger.train(&corpus, &quick_config(HistoryMode::Gold)).unwrap();

        let unseen = vec![
            Token::new("Blackburn", "NNP", "I-NP", "blackburn"),
            Token::new("visited", "VBD", "I-VP", "visit"),
            Token::new("Paris", "NNP", "I-NP", "paris"),
        ];
        let first = tagger.tag(&unseen).unwrap();
        let second = tagger.tag(&unseen).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);

        let parallel = tagger.tag_corpus(&corpus).unwrap();
        let sequential: Vec<Vec<String>> =
            corpus.iter().map(|s| tagger.tag(&s.tokens).unwrap()).collect();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_vocabulary_frozen_after_build() {
        let corpus = john_corpus();
        let mut tagger = GreedyTagger::new();
        tagger.feature_extraction(&corpus, 0).unwrap();
        let before = tagger.vocabulary().len();

        tagger.train(&corpus, &quick_config(HistoryMode::Predicted)).unwrap();
        let held_out = vec![Token::new("Zurich", "NNP", "I-NP", "zurich")];
        tagger.tag(&held_out).unwrap();

        assert_eq!(tagger.vocabulary().len(), before);
        assert!(tagger.vocabulary().get("word=Zurich").is_none());
    }

    #[test]
    fn test_empty_sentence() {
        let corpus = john_corpus();
        let mut tagger = GreedyTagger::new();
        tagger.feature_extraction(&corpus, 0).unwrap();
        assert!(tagger.tag(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_shuffled_training_is_reproducible() {
        let corpus = small_corpus();
        let config = TrainConfig {
            epochs: 5,
            shuffle: true,
            seed: 7,
            ..TrainConfig::default()
        };
        let mut a = GreedyTagger::new();
        a.feature_extraction(&corpus, 0).unwrap();
        a.train(&corpus, &config).unwrap();
        let mut b = GreedyTagger::new();
        b.feature_extraction(&corpus, 0).unwrap();
        b.train(&corpus, &config).unwrap();
        assert_eq!(a.weights(), b.weights());
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut order: Vec<usize> = (0..20).collect();
        shuffle(&mut order, 3);
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_save_and_load() {
        let corpus = john_corpus();
        let mut tagger = GreedyTagger::new();
        tagger.feature_extraction(&corpus, 0).unwrap();
        tagger.train(&corpus, &quick_config(HistoryMode::Gold)).unwrap();

        let mut buf = Vec::new();
        tagger.write(&mut buf).unwrap();
        let loaded = GreedyTagger::read(buf.as_slice()).unwrap();

        assert_eq!(loaded.classes(), tagger.classes());
        assert_eq!(loaded.vocabulary(), tagger.vocabulary());
        assert_eq!(loaded.weights(), tagger.weights());
        assert_eq!(loaded.config(), tagger.config());
        assert_eq!(
            loaded.tag(tokens(&corpus[0])).unwrap(),
            tagger.tag(tokens(&corpus[0])).unwrap()
        );
    }

    #[test]
    fn test_load_rejects_dimension_mismatch() {
        let corpus = john_corpus();
        let mut tagger = GreedyTagger::new();
        tagger.feature_extraction(&corpus, 0).unwrap();

        let mut buf = Vec::new();
        tagger.write(&mut buf).unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        value["features"].as_array_mut().unwrap().pop();
        let broken = serde_json::to_vec(&value).unwrap();

        assert!(matches!(
            GreedyTagger::read(broken.as_slice()),
            Err(NerError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_load_rejects_truncated_weights() {
        let corpus = john_corpus();
        let mut tagger = GreedyTagger::new();
        tagger.feature_extraction(&corpus, 0).unwrap();

        let mut buf = Vec::new();
        tagger.write(&mut buf).unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        value["weights"]["data"].as_array_mut().unwrap().pop();
        let broken = serde_json::to_vec(&value).unwrap();

        assert!(matches!(
            GreedyTagger::read(broken.as_slice()),
            Err(NerError::InvalidModel(_))
        ));
    }
}
