//! # Engenharia de Features para NER (CoNLL-2003)
//!
//! Para cada posição de uma sentença são produzidos dois conjuntos de features:
//!
//! - **Estáticas** ([`static_features`]): dependem apenas da sentença de entrada,
//!   numa janela de 5 tokens `x_{i-2}..x_{i+2}`.
//! - **De histórico** ([`history_features`]): dependem das tags já atribuídas às
//!   posições anteriores. São elas que obrigam a decodificação a andar da esquerda
//!   para a direita.
//!
//! ## Features estáticas
//!
//! | Grupo            | Janela        | Exemplo                      |
//! |------------------|---------------|------------------------------|
//! | Palavra          | -2..+2        | `prev_word=Peter`            |
//! | Bigrama          | 4 pares       | `bigram_next=EU/rejects`     |
//! | POS              | -2..+2        | `next_pos=VBZ`               |
//! | Chunk            | -1, 0, +1     | `chunk=I-NP`, `chunk_word=I-NP/EU` |
//! | Forma            | -2..+2        | `is_title=true`              |
//! | Forma numérica   | -2..+2        | `num=*d**d**d**d*`           |
//! | Sufixos 1-4      | -1, 0, +1     | `suffix3=ers`                |
//! | Prefixos 3-4     | -1, 0, +1     | `next_prefix4=Germ`          |
//!
//! Toda feature é um par `(nome, valor)`; a identidade usada pelo vocabulário é a
//! string `nome=valor`, de modo que `is_title=true` e `is_title=false` são features
//! distintas.

use std::borrow::Cow;
use std::fmt;

use crate::corpus::{Field, Token};

/// Sentinela para posições antes do início da sentença.
pub const START: &str = "<s>";
/// Sentinela para posições depois do fim da sentença.
pub const END: &str = "</s>";

/// Marcador que substitui cada dígito em [`numify`].
pub const DIGIT_PLACEHOLDER: &str = "*d*";

/// Deslocamentos da janela de contexto e o prefixo do nome das features de cada um.
const WINDOW: [(isize, &str); 5] = [
    (-2, "prev2_"),
    (-1, "prev_"),
    (0, ""),
    (1, "next_"),
    (2, "next2_"),
];

/// Valor de uma feature: texto (palavra, tag, afixo...) ou predicado booleano.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeatureValue {
    Text(String),
    Flag(bool),
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Text(s) => f.write_str(s),
            FeatureValue::Flag(b) => write!(f, "{b}"),
        }
    }
}

impl From<String> for FeatureValue {
    fn from(s: String) -> Self {
        FeatureValue::Text(s)
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        FeatureValue::Text(s.to_string())
    }
}

impl From<Cow<'_, str>> for FeatureValue {
    fn from(s: Cow<'_, str>) -> Self {
        FeatureValue::Text(s.into_owned())
    }
}

impl From<bool> for FeatureValue {
    fn from(b: bool) -> Self {
        FeatureValue::Flag(b)
    }
}

/// Conjunto de features de uma posição.
///
/// Os nomes são únicos dentro de um conjunto; a ordem de inserção é irrelevante
/// para o modelo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    features: Vec<(String, FeatureValue)>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adiciona uma feature. Nomes repetidos indicam erro de programação.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FeatureValue>) {
        let name = name.into();
        debug_assert!(self.get(&name).is_none(), "feature duplicada: {name}");
        self.features.push((name, value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.features
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.features.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Chaves `nome=valor` usadas pelo vocabulário de features.
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.features
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
    }
}

/// Acesso ao contexto de um token com tratamento de bordas.
///
/// Fora do intervalo `[0, len)` retorna [`START`] para deslocamentos negativos e
/// [`END`] caso contrário. Todas as funções de feature leem o contexto por aqui,
/// garantindo o mesmo tratamento de bordas em todos os templates.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    sent: &'a [Token],
    index: usize,
}

impl<'a> Window<'a> {
    pub fn new(sent: &'a [Token], index: usize) -> Self {
        Self { sent, index }
    }

    /// Campo `field` do token em `index + offset`, ou a sentinela de borda.
    pub fn get(&self, offset: isize, field: Field) -> &'a str {
        let pos = self.index as isize + offset;
        if pos < 0 {
            START
        } else {
            match self.sent.get(pos as usize) {
                Some(token) => token.field(field),
                None => END,
            }
        }
    }

    pub fn word(&self, offset: isize) -> &'a str {
        self.get(offset, Field::Word)
    }
}

/// Primeiro código de cada bloco de 10 dígitos decimais Unicode (categoria `Nd`).
const DIGIT_ZEROS: [u32; 68] = [
    0x0030, 0x0660, 0x06F0, 0x07C0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0B66, 0x0BE6,
    0x0C66, 0x0CE6, 0x0D66, 0x0DE6, 0x0E50, 0x0ED0, 0x0F20, 0x1040, 0x1090, 0x17E0,
    0x1810, 0x1946, 0x19D0, 0x1A80, 0x1A90, 0x1B50, 0x1BB0, 0x1C40, 0x1C50, 0xA620,
    0xA8D0, 0xA900, 0xA9D0, 0xA9F0, 0xAA50, 0xABF0, 0xFF10, 0x104A0, 0x10D30, 0x11066,
    0x110F0, 0x11136, 0x111D0, 0x112F0, 0x11450, 0x114D0, 0x11650, 0x116C0, 0x11730,
    0x118E0, 0x11950, 0x11C50, 0x11D50, 0x11DA0, 0x11F50, 0x16A60, 0x16AC0, 0x16B50,
    0x1D7CE, 0x1D7D8, 0x1D7E2, 0x1D7EC, 0x1D7F6, 0x1E140, 0x1E2F0, 0x1E4F0, 0x1E950,
    0x1FBF0,
];

/// Dígito decimal em qualquer escrita (`"7"`, `"٧"`, `"７"`); frações como `"½"` não contam.
pub fn is_decimal_digit(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_digit();
    }
    let cp = c as u32;
    match DIGIT_ZEROS.binary_search(&cp) {
        Ok(_) => true,
        Err(0) => false,
        Err(i) => cp - DIGIT_ZEROS[i - 1] < 10,
    }
}

/// Abstração de dígitos.
///
/// Se a string tiver mais de 2 caracteres não-dígito ela é devolvida intacta;
/// caso contrário cada dígito vira [`DIGIT_PLACEHOLDER`].
///
/// # Exemplo
/// `"12,000"` → `"*d**d*,*d**d**d*"`; `"O2-Arena12"` permanece igual.
pub fn numify(s: &str) -> Cow<'_, str> {
    let non_digits = s.chars().filter(|&c| !is_decimal_digit(c)).count();
    if non_digits > 2 {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() * DIGIT_PLACEHOLDER.len());
    for c in s.chars() {
        if is_decimal_digit(c) {
            out.push_str(DIGIT_PLACEHOLDER);
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

fn is_cased(c: char) -> bool {
    c.is_uppercase() || c.is_lowercase()
}

/// Palavra em "title case": maiúsculas só após caracteres sem caixa e minúsculas só
/// após caracteres com caixa, com pelo menos uma letra (ex: "John", "O'Neil").
pub fn is_title(w: &str) -> bool {
    let mut cased = false;
    let mut prev_cased = false;
    for c in w.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else {
            prev_cased = false;
        }
    }
    cased
}

/// Pelo menos uma letra e nenhuma minúscula (ex: "EU", "U.S.").
pub fn is_upper(w: &str) -> bool {
    w.chars().any(is_cased) && !w.chars().any(char::is_lowercase)
}

/// Não vazia e composta só de dígitos.
pub fn is_digit(w: &str) -> bool {
    !w.is_empty() && w.chars().all(is_decimal_digit)
}

/// Não vazia e composta só de letras e números.
pub fn is_alnum(w: &str) -> bool {
    !w.is_empty() && w.chars().all(char::is_alphanumeric)
}

fn suffix(chars: &[char], n: usize) -> String {
    chars[chars.len().saturating_sub(n)..].iter().collect()
}

fn prefix(chars: &[char], n: usize) -> String {
    chars[..n.min(chars.len())].iter().collect()
}

/// Extrai as features estáticas do token `index`.
///
/// Função pura da sentença e da posição; não depende de nenhuma predição.
pub fn static_features(sent: &[Token], index: usize) -> FeatureSet {
    let ctx = Window::new(sent, index);
    let mut fs = FeatureSet::new();

    // === Palavras, POS e forma na janela de 5 tokens ===
    for (offset, p) in WINDOW {
        let w = ctx.word(offset);
        fs.insert(format!("{p}word"), w);
        fs.insert(format!("{p}pos"), ctx.get(offset, Field::Pos));

        fs.insert(format!("{p}is_title"), is_title(w));
        fs.insert(format!("{p}is_digit"), is_digit(w));
        fs.insert(format!("{p}is_upper"), is_upper(w));
        fs.insert(format!("{p}is_alnum"), is_alnum(w));
        fs.insert(format!("{p}has_hyphen"), w.contains('-'));
        fs.insert(format!("{p}num"), numify(w));
    }

    // === Bigramas de palavras adjacentes ===
    let bigram = |a: isize, b: isize| format!("{}/{}", ctx.word(a), ctx.word(b));
    fs.insert("bigram_prev2", bigram(-2, -1));
    fs.insert("bigram_prev", bigram(-1, 0));
    fs.insert("bigram_next", bigram(0, 1));
    fs.insert("bigram_next2", bigram(1, 2));

    // === Afixos (janela de 3 tokens) ===
    for (offset, p) in &WINDOW[1..4] {
        let chars: Vec<char> = ctx.word(*offset).chars().collect();
        for n in 1..=4 {
            fs.insert(format!("{p}suffix{n}"), suffix(&chars, n));
        }
        for n in 3..=4 {
            fs.insert(format!("{p}prefix{n}"), prefix(&chars, n));
        }
    }

    // === Chunk sintático ===
    let chunk = ctx.get(0, Field::Chunk);
    fs.insert("chunk", chunk);
    fs.insert("chunk_word", format!("{chunk}/{}", ctx.word(0)));
    fs.insert("prev_chunk", ctx.get(-1, Field::Chunk));
    fs.insert("next_chunk", ctx.get(1, Field::Chunk));

    fs
}

/// Extrai as features de histórico do token `index`.
///
/// Lê apenas `tags[index - 1]` e `tags[index - 2]`; posições `>= index` nunca são
/// consultadas, então `tags` pode ser tanto o histórico parcial da decodificação
/// quanto a sequência de referência completa.
pub fn history_features<S: AsRef<str>>(tags: &[S], sent: &[Token], index: usize) -> FeatureSet {
    let history = &tags[..index.min(tags.len())];
    let prev_tag = tag_before(history, index, 1);
    let word = Window::new(sent, index).word(0);

    let mut fs = FeatureSet::new();
    fs.insert("prev_tag", prev_tag);
    fs.insert("prev_tag_word", format!("{prev_tag}/{word}"));
    fs.insert("tag_bigram", format!("{}/{prev_tag}", tag_before(history, index, 2)));
    fs
}

/// Tag `back` posições antes de `index`, ou [`START`].
fn tag_before<S: AsRef<str>>(history: &[S], index: usize, back: usize) -> &str {
    index
        .checked_sub(back)
        .and_then(|i| history.get(i))
        .map_or(START, |tag| tag.as_ref())
}
