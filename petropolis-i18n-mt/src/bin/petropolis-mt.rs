use anyhow::{Context, bail};
use clap::{Arg, ArgAction, Command};
use petropolis_i18n_mt::{
    BulkTranslator, Content, ContentRequest, DeeplProvider, LayerAllowList, MockMode,
    MockTranslator, PostgresRepository, TagHandling, Translator, translate_content,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let mock = Arg::new("mock")
        .long("mock")
        .short('m')
        .help("Use the mock translator instead of DeepL")
        .action(ArgAction::SetTrue);
    let source = Arg::new("source")
        .long("source")
        .short('s')
        .help("Source language code (default: detected by the provider)");

    Command::new("petropolis-mt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Machine translation for Petropolis layers")
        .subcommand_required(true)
        .subcommand(
            Command::new("text")
                .about("Translate one or more strings")
                .arg(
                    Arg::new("target")
                        .help("Target language code (e.g. es, pt, en)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("content")
                        .help("Text to translate; several values are translated as a batch")
                        .required(true)
                        .num_args(1..)
                        .index(2),
                )
                .arg(source.clone())
                .arg(
                    Arg::new("tag-handling")
                        .long("tag-handling")
                        .help("How the provider treats tags in the text")
                        .value_parser(["none", "xml", "html"])
                        .default_value("html"),
                )
                .arg(mock.clone()),
        )
        .subcommand(
            Command::new("layer")
                .about("Translate every untranslated row of a layer table")
                .arg(
                    Arg::new("layer")
                        .help("Layer table name")
                        .required(true)
                        .index(1),
                )
                .arg(source)
                .arg(
                    Arg::new("database-url")
                        .long("database-url")
                        .env("DATABASE_URL")
                        .help("Postgres connection string")
                        .required(true),
                )
                .arg(
                    Arg::new("layers")
                        .long("layers")
                        .env("PETROPOLIS_LAYERS")
                        .help("Comma separated list of layers open for translation"),
                )
                .arg(mock),
        )
}

fn translator(use_mock: bool) -> anyhow::Result<Arc<dyn Translator>> {
    if use_mock {
        return Ok(Arc::new(MockTranslator::new(MockMode::Suffix)));
    }
    if std::env::var("DEEPL_API_KEY").is_err() {
        bail!("DEEPL_API_KEY is not set; export it or pass --mock");
    }
    Ok(Arc::new(DeeplProvider::from_env()?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match cli().get_matches().subcommand() {
        Some(("text", args)) => {
            let texts: Vec<String> = args
                .get_many::<String>("content")
                .unwrap_or_default()
                .cloned()
                .collect();
            let tag_handling = match args.get_one::<String>("tag-handling").map(String::as_str) {
                Some("none") => TagHandling::None,
                Some("xml") => TagHandling::Xml,
                _ => TagHandling::Html,
            };

            let request = ContentRequest {
                content: match texts.as_slice() {
                    [single] => Content::Text(single.clone()),
                    _ => Content::List(texts),
                },
                source_language: args.get_one::<String>("source").cloned(),
                target_language: args
                    .get_one::<String>("target")
                    .cloned()
                    .unwrap_or_default(),
                tag_handling,
            };

            let provider = translator(args.get_flag("mock"))?;
            match translate_content(provider.as_ref(), &request).await? {
                Content::Text(text) => println!("{}", text),
                Content::List(texts) => texts.iter().for_each(|t| println!("{}", t)),
            }
        }
        Some(("layer", args)) => {
            let layer = args
                .get_one::<String>("layer")
                .context("layer name is required")?;
            let database_url = args
                .get_one::<String>("database-url")
                .context("DATABASE_URL must be set")?;
            let allow_list = args
                .get_one::<String>("layers")
                .map(|l| LayerAllowList::new(l.split(',')))
                .unwrap_or_default();

            let repository = Arc::new(PostgresRepository::connect(database_url, 2).await?);
            let bulk = BulkTranslator::new(translator(args.get_flag("mock"))?, repository)
                .with_allow_list(allow_list);

            let report = bulk
                .translate_layer(layer, args.get_one::<String>("source").map(String::as_str))
                .await?;

            info!(
                rows = report.rows,
                updated = report.updated,
                failed = report.failed.len(),
                "done"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_complete() {
                bail!("{} rows could not be stored", report.failed.len());
            }
        }
        _ => unreachable!("subcommand_required is set"),
    }

    Ok(())
}
