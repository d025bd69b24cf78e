//! txdom 命令行入口
//!
//! 从 HTML 文件导出源字符串、按译文表渲染译文，或生成伪翻译页面

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use txdom::parsers::html::HtmlDocument;
use txdom::translation::{
    ConfigManager, DomTranslator, ExportParams, TranslationResult, TranslationTable,
};

#[derive(Parser)]
#[command(name = "txdom")]
#[command(about = "In-place, reversible translation of HTML documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Input and output character encoding
    #[arg(short, long, global = true, default_value = "utf-8")]
    encoding: String,

    /// Write the result to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the source strings of a document as JSON
    Extract {
        /// HTML file
        file: PathBuf,

        /// Tags added to every string
        #[arg(short, long)]
        tag: Vec<String>,

        /// Occurrence recorded for every string (e.g. the page path)
        #[arg(long)]
        occurrence: Vec<String>,
    },

    /// Render a document in another language
    Translate {
        /// HTML file
        file: PathBuf,

        /// JSON file mapping source strings to translations
        #[arg(short, long)]
        strings: PathBuf,

        /// Target locale
        #[arg(short, long)]
        locale: String,
    },

    /// Render a pseudo-localized document
    Pseudo {
        /// HTML file
        file: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_translator(cli: &Cli, file: &Path) -> TranslationResult<DomTranslator> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_file(path)?,
        None => ConfigManager::new()?,
    };

    let data = std::fs::read(file)?;
    let document = HtmlDocument::from_bytes(&data, &cli.encoding);

    let mut translator = DomTranslator::new(document, manager.into_config())?;
    translator.attach_dom(None)?;
    Ok(translator)
}

fn write_output(output: Option<&Path>, data: &[u8]) -> TranslationResult<()> {
    match output {
        Some(path) => std::fs::write(path, data)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn run(cli: &Cli) -> TranslationResult<()> {
    match &cli.command {
        Commands::Extract {
            file,
            tag,
            occurrence,
        } => {
            let translator = load_translator(cli, file)?;
            let params = ExportParams {
                tags: tag.clone(),
                occurrences: occurrence.clone(),
            };
            let mut json = translator.get_strings_json_string(&params)?;
            json.push('\n');
            write_output(cli.output.as_deref(), json.as_bytes())
        }
        Commands::Translate {
            file,
            strings,
            locale,
        } => {
            let table = TranslationTable::from_file(strings)?;
            let mut translator = load_translator(cli, file)?;

            let stats = translator.to_language(locale, |key| table.lookup(key));
            tracing::info!(
                "{} 处已翻译，{} 个片段没有译文",
                stats.translated,
                stats.untranslated_segments
            );

            write_output(
                cli.output.as_deref(),
                &translator.tree().to_bytes(&cli.encoding),
            )
        }
        Commands::Pseudo { file } => {
            let mut translator = load_translator(cli, file)?;
            translator.pseudo_translate();

            write_output(
                cli.output.as_deref(),
                &translator.tree().to_bytes(&cli.encoding),
            )
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(error) = run(&cli) {
        eprintln!("Error: {}", error);
        process::exit(1);
    }
}
