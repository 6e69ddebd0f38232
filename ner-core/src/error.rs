//! # Erros do ner-core
//!
//! Um único enum cobre todas as falhas recuperáveis da biblioteca. Misses de
//! vocabulário durante a decodificação **não** são erros: features desconhecidas
//! simplesmente não contribuem com peso.

use thiserror::Error;

/// Erros que podem ocorrer ao ler corpus, treinar ou carregar modelos.
#[derive(Debug, Error)]
pub enum NerError {
    /// Falha de leitura/escrita em arquivo ou stream.
    #[error("erro de E/S: {0}")]
    Io(#[from] std::io::Error),

    /// Falha ao (de)serializar o modelo em JSON.
    #[error("erro de serialização: {0}")]
    Json(#[from] serde_json::Error),

    /// Linha do corpus CoNLL mal formada.
    #[error("linha {line}: {message}")]
    Parse {
        /// Número da linha (base 1).
        line: usize,
        message: String,
    },

    /// O arquivo de modelo é estruturalmente inválido.
    #[error("modelo inválido: {0}")]
    InvalidModel(String),

    /// Vocabulário e tabela de pesos não estão co-indexados.
    #[error("vocabulário com {vocab} features, mas a tabela de pesos tem {weights} linhas")]
    DimensionMismatch { vocab: usize, weights: usize },

    /// Treinamento recebeu uma sentença sem tags de referência.
    #[error("sentença {sentence} não possui tags de referência")]
    MissingLabels { sentence: usize },

    /// `train` chamado antes de `feature_extraction`.
    #[error("o vocabulário de features ainda não foi construído")]
    NotFitted,

    /// Parâmetro fora do domínio aceito.
    #[error("argumento inválido `{arg}`: {message}")]
    InvalidArgument { arg: &'static str, message: String },
}

/// Alias de resultado para as operações do ner-core.
pub type Result<T> = std::result::Result<T, NerError>;
