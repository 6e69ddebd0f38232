//! # ner-core — Reconhecimento de Entidades Nomeadas com Tagger Guloso
//!
//! Rotulador de sequências para NER sobre corpora no formato CoNLL (inglês e alemão),
//! treinado com um perceptron de margem multiclasse e decodificado de forma gulosa,
//! da esquerda para a direita.
//!
//! ## Arquitetura
//!
//! 1.  **Corpus** ([`corpus`]): leitura e escrita de arquivos colunares CoNLL.
//! 2.  **Features** ([`features`]): features estáticas de janela (palavra, POS, chunk,
//!     forma, afixos) e features de histórico (tags anteriores).
//! 3.  **Vocabulário** ([`vocab`]): chaves `nome=valor` → índices densos, congelado
//!     depois da construção.
//! 4.  **Aprendizado** ([`perceptron`]): tabela de pesos `feature × classe` e
//!     atualização por violação de margem, com regularização e média opcional.
//! 5.  **Tagger** ([`tagger`]): orquestra extração, treino, decodificação e persistência.
//! 6.  **Avaliação** ([`eval`]): acurácia por token e F1 por entidade.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use ner_core::{GreedyTagger, Sentence, Token, TrainConfig};
//!
//! let tokens = vec![
//!     Token::new("John", "NNP", "B-NP", "john"),
//!     Token::new("lives", "VBZ", "O", "live"),
//! ];
//! let corpus = vec![Sentence::with_labels(tokens, vec!["B-PER".into(), "O".into()]).unwrap()];
//!
//! let mut tagger = GreedyTagger::new();
//! tagger.feature_extraction(&corpus, 0).unwrap();
//! let config = TrainConfig { epochs: 10, ..TrainConfig::default() };
//! tagger.train(&corpus, &config).unwrap();
//!
//! let tags = tagger.tag(&corpus[0].tokens).unwrap();
//! assert_eq!(tags, vec!["B-PER", "O"]);
//! ```

pub mod config;
pub mod corpus;
pub mod error;
pub mod eval;
pub mod features;
pub mod perceptron;
pub mod tagger;
pub mod vocab;

pub use config::{HistoryMode, TrainConfig};
pub use corpus::{load_conll, read_conll, write_predictions, Language, Sentence, Token};
pub use error::{NerError, Result};
pub use eval::{chunk_scores, token_accuracy, ChunkScores};
pub use features::{history_features, static_features, FeatureSet, FeatureValue};
pub use tagger::{GreedyTagger, TrainReport};
pub use vocab::FeatureVocabulary;
