//! # Corpus CoNLL-2003
//!
//! Leitura e escrita de arquivos no formato CoNLL-2003: um token por linha,
//! colunas separadas por espaço e uma linha em branco entre sentenças.
//!
//! ## Layout das colunas
//!
//! | Idioma | Colunas                            |
//! |--------|------------------------------------|
//! | `en`   | `palavra pos chunk [tag]`          |
//! | `de`   | `palavra lema pos chunk [tag]`     |
//!
//! Linhas `-DOCSTART-` separam documentos e são descartadas. O núcleo do tagger
//! só precisa de acesso de leitura à sequência de sentenças produzida aqui.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NerError, Result};

/// Campo de um token acessível pelas funções de feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Word,
    Pos,
    Chunk,
    Lemma,
}

/// Um token anotado do corpus. Imutável depois de lido.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Forma da palavra como aparece no texto (ex: "Lisboa").
    pub word: String,
    /// Tag morfossintática (ex: "NNP").
    pub pos: String,
    /// Tag de chunk sintático (ex: "I-NP").
    pub chunk: String,
    /// Lema da palavra (ex: "live" para "lives").
    pub lemma: String,
}

impl Token {
    pub fn new(
        word: impl Into<String>,
        pos: impl Into<String>,
        chunk: impl Into<String>,
        lemma: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            pos: pos.into(),
            chunk: chunk.into(),
            lemma: lemma.into(),
        }
    }

    /// Valor do campo selecionado.
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Word => &self.word,
            Field::Pos => &self.pos,
            Field::Chunk => &self.chunk,
            Field::Lemma => &self.lemma,
        }
    }
}

/// Uma sentença: sequência ordenada de tokens, opcionalmente com as tags de referência.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub tokens: Vec<Token>,
    /// Tags de referência (uma por token), presentes em corpora de treino/teste anotados.
    pub labels: Option<Vec<String>>,
}

impl Sentence {
    /// Sentença sem anotação de entidades.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            labels: None,
        }
    }

    /// Sentença anotada. Falha se o número de tags diferir do número de tokens.
    pub fn with_labels(tokens: Vec<Token>, labels: Vec<String>) -> Result<Self> {
        if tokens.len() != labels.len() {
            return Err(NerError::InvalidArgument {
                arg: "labels",
                message: format!("{} tokens, mas {} tags", tokens.len(), labels.len()),
            });
        }
        Ok(Self {
            tokens,
            labels: Some(labels),
        })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Idioma do corpus, que determina o layout das colunas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// Inglês: sem coluna de lema.
    #[default]
    En,
    /// Alemão: lema na segunda coluna.
    De,
}

impl Language {
    /// Número de colunas obrigatórias antes da tag de referência.
    pub fn columns(&self) -> usize {
        match self {
            Language::En => 3,
            Language::De => 4,
        }
    }

    fn parse_token(&self, cols: &[&str]) -> Token {
        match self {
            Language::En => Token::new(cols[0], cols[1], cols[2], cols[0].to_lowercase()),
            Language::De => Token::new(cols[0], cols[2], cols[3], cols[1]),
        }
    }

    fn render_token(&self, token: &Token) -> String {
        match self {
            Language::En => format!("{} {} {}", token.word, token.pos, token.chunk),
            Language::De => format!(
                "{} {} {} {}",
                token.word, token.lemma, token.pos, token.chunk
            ),
        }
    }
}

impl FromStr for Language {
    type Err = NerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "en" => Ok(Language::En),
            "de" => Ok(Language::De),
            other => Err(NerError::InvalidArgument {
                arg: "lang",
                message: format!("idioma desconhecido `{other}` (use `en` ou `de`)"),
            }),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::De => write!(f, "de"),
        }
    }
}

/// Acumula as linhas de uma sentença até encontrar o separador.
#[derive(Default)]
struct SentenceBuffer {
    tokens: Vec<Token>,
    labels: Vec<String>,
    labeled: Option<bool>,
}

impl SentenceBuffer {
    fn push(&mut self, token: Token, label: Option<&str>, line: usize) -> Result<()> {
        let has_label = label.is_some();
        match self.labeled {
            None => self.labeled = Some(has_label),
            Some(expected) if expected != has_label => {
                return Err(NerError::Parse {
                    line,
                    message: "sentença mistura linhas com e sem tag de referência".into(),
                });
            }
            Some(_) => {}
        }
        self.tokens.push(token);
        if let Some(label) = label {
            self.labels.push(label.to_string());
        }
        Ok(())
    }

    fn flush(&mut self, out: &mut Vec<Sentence>) {
        if self.tokens.is_empty() {
            return;
        }
        let tokens = std::mem::take(&mut self.tokens);
        let labels = std::mem::take(&mut self.labels);
        let labels = match self.labeled.take() {
            Some(true) => Some(labels),
            _ => None,
        };
        out.push(Sentence { tokens, labels });
    }
}

/// Lê um corpus CoNLL-2003 de qualquer `BufRead`.
///
/// # Erros
/// Retorna [`NerError::Parse`] quando uma linha tem menos colunas do que o layout
/// do idioma exige, ou quando uma sentença mistura linhas com e sem tag.
pub fn read_conll<R: BufRead>(reader: R, lang: Language) -> Result<Vec<Sentence>> {
    let mut corpus = Vec::new();
    let mut buffer = SentenceBuffer::default();
    let required = lang.columns();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() {
            buffer.flush(&mut corpus);
            continue;
        }
        if line.starts_with("-DOCSTART-") {
            buffer.flush(&mut corpus);
            continue;
        }

        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < required {
            return Err(NerError::Parse {
                line: i + 1,
                message: format!(
                    "esperava pelo menos {required} colunas para `{lang}`, encontrou {}",
                    cols.len()
                ),
            });
        }
        let token = lang.parse_token(&cols);
        buffer.push(token, cols.get(required).copied(), i + 1)?;
    }
    buffer.flush(&mut corpus);

    tracing::debug!(sentences = corpus.len(), "corpus lido");
    Ok(corpus)
}

/// Lê um corpus CoNLL-2003 a partir de um arquivo.
pub fn load_conll<P: AsRef<Path>>(path: P, lang: Language) -> Result<Vec<Sentence>> {
    let file = File::open(path)?;
    read_conll(BufReader::new(file), lang)
}

/// Escreve o corpus com a tag predita acrescentada ao final de cada linha.
///
/// Cada linha repete as colunas de entrada do idioma, a tag de referência (se houver)
/// e por fim a predição, no formato esperado pelo `conlleval`.
pub fn write_predictions<W: Write>(
    writer: &mut W,
    corpus: &[Sentence],
    predictions: &[Vec<String>],
    lang: Language,
) -> Result<()> {
    if corpus.len() != predictions.len() {
        return Err(NerError::InvalidArgument {
            arg: "predictions",
            message: format!(
                "{} sentenças, mas {} sequências preditas",
                corpus.len(),
                predictions.len()
            ),
        });
    }

    for (sentence, tags) in corpus.iter().zip(predictions) {
        if sentence.len() != tags.len() {
            return Err(NerError::InvalidArgument {
                arg: "predictions",
                message: format!("{} tokens, mas {} tags", sentence.len(), tags.len()),
            });
        }
        for (i, (token, tag)) in sentence.tokens.iter().zip(tags).enumerate() {
            let columns = lang.render_token(token);
            match sentence.labels.as_ref().and_then(|labels| labels.get(i)) {
                Some(gold) => writeln!(writer, "{columns} {gold} {tag}")?,
                None => writeln!(writer, "{columns} {tag}")?,
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EN_SAMPLE: &str = "-DOCSTART- -X- O O\n\
        \n\
        EU NNP I-NP I-ORG\n\
        rejects VBZ I-VP O\n\
        German JJ I-NP I-MISC\n\
        \n\
        Peter NNP I-NP I-PER\n\
        Blackburn NNP I-NP I-PER\n";

    #[test]
    fn test_read_english_layout() {
        let corpus = read_conll(EN_SAMPLE.as_bytes(), Language::En).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus[0].len(), 3);
        assert_eq!(corpus[0].tokens[1].pos, "VBZ");
        assert_eq!(corpus[0].tokens[1].lemma, "rejects");
        assert_eq!(
            corpus[1].labels.as_deref(),
            Some(&["I-PER".to_string(), "I-PER".to_string()][..])
        );
    }

    #[test]
    fn test_read_german_layout() {
        let text = "Die die ART I-NC O\nEU EU NE I-NC I-ORG\n";
        let corpus = read_conll(text.as_bytes(), Language::De).unwrap();
        assert_eq!(corpus.len(), 1);
        let token = &corpus[0].tokens[0];
        assert_eq!(token.word, "Die");
        assert_eq!(token.lemma, "die");
        assert_eq!(token.pos, "ART");
        assert_eq!(token.chunk, "I-NC");
    }

    #[test]
    fn test_unlabeled_input() {
        let text = "John NNP B-NP\nlives VBZ O\n";
        let corpus = read_conll(text.as_bytes(), Language::En).unwrap();
        assert!(corpus[0].labels.is_none());
    }

    #[test]
    fn test_missing_column_is_parse_error() {
        let text = "John NNP B-NP B-PER\nlives VBZ\n";
        match read_conll(text.as_bytes(), Language::En) {
            Err(NerError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("esperava erro de parse, obteve {other:?}"),
        }
    }

    #[test]
    fn test_mixed_labels_is_parse_error() {
        let text = "John NNP B-NP B-PER\nlives VBZ O\n";
        assert!(matches!(
            read_conll(text.as_bytes(), Language::En),
            Err(NerError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_write_predictions() {
        let corpus = read_conll(EN_SAMPLE.as_bytes(), Language::En).unwrap();
        let predictions = vec![
            vec!["I-ORG".to_string(), "O".to_string(), "I-MISC".to_string()],
            vec!["I-PER".to_string(), "O".to_string()],
        ];
        let mut out = Vec::new();
        write_predictions(&mut out, &corpus, &predictions, Language::En).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "EU NNP I-NP I-ORG I-ORG");
        assert_eq!(lines[3], "");
        assert_eq!(lines[5], "Blackburn NNP I-NP I-PER O");
    }

    #[test]
    fn test_write_predictions_german_layout() {
        let text = "Die die ART I-NC O\nEU EU NE I-NC I-ORG\n";
        let corpus = read_conll(text.as_bytes(), Language::De).unwrap();
        let predictions = vec![vec!["O".to_string(), "I-LOC".to_string()]];
        let mut out = Vec::new();
        write_predictions(&mut out, &corpus, &predictions, Language::De).unwrap();

        let written = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines, vec!["Die die ART I-NC O O", "EU EU NE I-NC I-ORG I-LOC", ""]);
        let cols: Vec<&str> = lines[0].split_whitespace().collect();
        assert_eq!(cols[1], "die");

        // a saída relida preserva lema, POS e chunk
        let reread = read_conll(written.as_bytes(), Language::De).unwrap();
        assert_eq!(reread[0].tokens, corpus[0].tokens);
    }

    #[test]
    fn test_write_rejects_length_mismatch() {
        let corpus = read_conll(EN_SAMPLE.as_bytes(), Language::En).unwrap();
        let mut out = Vec::new();
        assert!(write_predictions(&mut out, &corpus, &[], Language::En).is_err());
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("de".parse::<Language>().unwrap(), Language::De);
        assert!("pt".parse::<Language>().is_err());
    }
}
