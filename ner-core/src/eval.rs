//! # Avaliação
//!
//! Métricas sobre sequências de tags: acurácia por token e precisão/revocação/F1
//! por entidade (chunk), no estilo do `conlleval`.
//!
//! ## Chunks
//! Aceita tanto BIO quanto IOB1 (o esquema do CoNLL-2003 original):
//!
//! - `B-X` sempre abre uma entidade nova do tipo `X`;
//! - `I-X` continua a entidade aberta se ela for do tipo `X`, senão abre uma nova;
//! - `O` fecha qualquer entidade aberta.
//!
//! Uma entidade prevista só conta como acerto se tipo, início e fim coincidirem
//! exatamente com uma entidade de referência.

use std::collections::HashSet;

/// Entidade contínua extraída de uma sequência de tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chunk {
    pub kind: String,
    /// Índice do primeiro token.
    pub start: usize,
    /// Índice após o último token.
    pub end: usize,
}

/// Separa `B-PER` em (`B`, `PER`). Tags sem prefixo são tratadas como `I-`.
fn split_tag(tag: &str) -> Option<(&str, &str)> {
    if tag == "O" {
        return None;
    }
    match tag.split_once('-') {
        Some((prefix, kind)) => Some((prefix, kind)),
        None => Some(("I", tag)),
    }
}

/// Extrai as entidades de uma sentença.
///
/// # Exemplo
/// ```
/// use ner_core::eval::chunks;
///
/// let tags = ["I-PER", "I-PER", "O", "I-LOC", "B-LOC"];
/// let found = chunks(&tags);
/// assert_eq!(found.len(), 3);
/// assert_eq!((found[0].start, found[0].end), (0, 2));
/// ```
pub fn chunks<S: AsRef<str>>(tags: &[S]) -> Vec<Chunk> {
    let mut found = Vec::new();
    let mut open: Option<(String, usize)> = None;

    for (i, tag) in tags.iter().enumerate() {
        let parsed = split_tag(tag.as_ref());
        let continues = match (&open, parsed) {
            (Some((kind, _)), Some(("I", next))) => kind == next,
            _ => false,
        };
        if continues {
            continue;
        }
        if let Some((kind, start)) = open.take() {
            found.push(Chunk { kind, start, end: i });
        }
        if let Some((_, kind)) = parsed {
            open = Some((kind.to_string(), i));
        }
    }
    if let Some((kind, start)) = open {
        found.push(Chunk {
            kind,
            start,
            end: tags.len(),
        });
    }
    found
}

/// Fração de tokens com a tag correta, sobre todas as sentenças.
///
/// Sentenças de tamanhos diferentes são comparadas apenas no prefixo comum, mas
/// todos os tokens de referência entram no denominador.
pub fn token_accuracy(gold: &[Vec<String>], predicted: &[Vec<String>]) -> f64 {
    let total: usize = gold.iter().map(Vec::len).sum();
    if total == 0 {
        return 0.0;
    }
    let correct: usize = gold
        .iter()
        .zip(predicted)
        .map(|(g, p)| g.iter().zip(p).filter(|(a, b)| a == b).count())
        .sum();
    correct as f64 / total as f64
}

/// Precisão, revocação e F1 por entidade.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChunkScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub gold_chunks: usize,
    pub predicted_chunks: usize,
    pub correct_chunks: usize,
}

/// Compara as entidades previstas com as de referência, sentença a sentença.
pub fn chunk_scores(gold: &[Vec<String>], predicted: &[Vec<String>]) -> ChunkScores {
    let mut scores = ChunkScores::default();

    for (g, p) in gold.iter().zip(predicted) {
        let expected: HashSet<Chunk> = chunks(g).into_iter().collect();
        let found = chunks(p);
        scores.gold_chunks += expected.len();
        scores.predicted_chunks += found.len();
        scores.correct_chunks += found.iter().filter(|c| expected.contains(c)).count();
    }

    if scores.predicted_chunks > 0 {
        scores.precision = scores.correct_chunks as f64 / scores.predicted_chunks as f64;
    }
    if scores.gold_chunks > 0 {
        scores.recall = scores.correct_chunks as f64 / scores.gold_chunks as f64;
    }
    if scores.precision + scores.recall > 0.0 {
        scores.f1 =
            2.0 * scores.precision * scores.recall / (scores.precision + scores.recall);
    }
    scores
}
