//! Linha de comando do tagger NER: `ner train` e `ner predict`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ner_core::{
    chunk_scores, load_conll, token_accuracy, write_predictions, GreedyTagger, HistoryMode,
    Language, TrainConfig,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ner", version, about = "Tagger NER guloso para corpora CoNLL-2003")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Constrói o vocabulário, treina e grava o modelo
    Train(TrainArgs),
    /// Aplica um modelo gravado a um corpus
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Verbosidade do log (0 = avisos, 1 = progresso, 2 = detalhes)
    #[arg(short, long, default_value_t = 1)]
    verbose: u8,

    /// Fator de regularização, em [0, 1)
    #[arg(short, long, default_value_t = 0.00001)]
    reg: f64,

    /// Número de épocas
    #[arg(short = 'E', long, default_value_t = 100)]
    epochs: usize,

    /// Ocorrências mínimas para uma feature entrar no vocabulário
    #[arg(long, default_value_t = 0)]
    min_count: usize,

    /// Idioma do corpus: en ou de
    #[arg(short, long, default_value = "en")]
    lang: Language,

    /// Embaralha os exemplos a cada época
    #[arg(long)]
    shuffle: bool,

    /// Semente do embaralhamento
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Usa os pesos finais em vez da média
    #[arg(long)]
    no_average: bool,

    /// Treina com o histórico das próprias predições
    #[arg(long)]
    predicted_history: bool,

    /// Corpus de treino anotado
    train_file: PathBuf,

    /// Destino do modelo
    model_file: PathBuf,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Verbosidade do log (0 = avisos, 1 = progresso, 2 = detalhes)
    #[arg(short, long, default_value_t = 1)]
    verbose: u8,

    /// Idioma do corpus: en ou de
    #[arg(short, long, default_value = "en")]
    lang: Language,

    /// Modelo gravado por `ner train`
    model_file: PathBuf,

    /// Corpus a rotular (a coluna de referência é opcional)
    test_file: PathBuf,

    /// Arquivo de saída, ou `-` para a saída padrão
    pred_file: PathBuf,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn train(args: TrainArgs) -> Result<()> {
    let corpus = load_conll(&args.train_file, args.lang)
        .with_context(|| format!("falha ao ler {}", args.train_file.display()))?;
    info!(sentences = corpus.len(), "corpus de treino carregado");

    let config = TrainConfig {
        reg: args.reg,
        epochs: args.epochs,
        shuffle: args.shuffle,
        seed: args.seed,
        average: !args.no_average,
        history: if args.predicted_history {
            HistoryMode::Predicted
        } else {
            HistoryMode::Gold
        },
    };
    config.validate()?;

    let mut tagger = GreedyTagger::new();
    tagger.feature_extraction(&corpus, args.min_count)?;

    let start = Instant::now();
    let report = tagger.train(&corpus, &config)?;
    info!(
        elapsed_secs = start.elapsed().as_secs_f64(),
        final_mistakes = report.mistakes_per_epoch.last().copied().unwrap_or(0),
        examples = report.examples,
        "treino concluído"
    );

    tagger
        .save(&args.model_file)
        .with_context(|| format!("falha ao gravar {}", args.model_file.display()))?;
    info!(path = %args.model_file.display(), "modelo gravado");
    Ok(())
}

fn predict(args: PredictArgs) -> Result<()> {
    let tagger = GreedyTagger::load(&args.model_file)
        .with_context(|| format!("falha ao carregar {}", args.model_file.display()))?;
    info!(
        features = tagger.vocabulary().len(),
        classes = tagger.classes().len(),
        "modelo carregado"
    );

    let corpus = load_conll(&args.test_file, args.lang)
        .with_context(|| format!("falha ao ler {}", args.test_file.display()))?;

    let start = Instant::now();
    let predictions = tagger.tag_corpus(&corpus)?;
    info!(
        sentences = corpus.len(),
        elapsed_secs = start.elapsed().as_secs_f64(),
        "corpus rotulado"
    );

    let mut writer = open_output(&args.pred_file)?;
    write_predictions(&mut writer, &corpus, &predictions, args.lang)?;
    writer.flush()?;

    let gold: Option<Vec<Vec<String>>> = corpus.iter().map(|s| s.labels.clone()).collect();
    match gold {
        Some(gold) if !gold.is_empty() => {
            let scores = chunk_scores(&gold, &predictions);
            info!(
                accuracy = %format!("{:.2}%", token_accuracy(&gold, &predictions) * 100.0),
                precision = %format!("{:.2}%", scores.precision * 100.0),
                recall = %format!("{:.2}%", scores.recall * 100.0),
                f1 = %format!("{:.2}", scores.f1 * 100.0),
                "avaliação"
            );
        }
        Some(_) => warn!("corpus de teste vazio"),
        None => {}
    }
    Ok(())
}

fn open_output(path: &Path) -> Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }
    let file =
        File::create(path).with_context(|| format!("falha ao criar {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Train(args) => {
            init_tracing(args.verbose);
            train(args)
        }
        Command::Predict(args) => {
            init_tracing(args.verbose);
            predict(args)
        }
    }
}
