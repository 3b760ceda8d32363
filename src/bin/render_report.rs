use anyhow::Context;
use citation_etl::core::Storage;
use citation_etl::domain::model::ReportSettings;
use citation_etl::report::{self, dataset};
use citation_etl::utils::{logger, validation::validate_output_format};
use citation_etl::{EtlError, LocalStorage};
use clap::Parser;

/// 把已產生的 resources.json 重新輸出成 Markdown 或 PDF 報表
#[derive(Debug, Parser)]
#[command(name = "render_report")]
#[command(about = "Render a citation dataset as a Markdown or PDF report")]
struct Args {
    #[arg(short, long = "input", default_value = "resources.json")]
    input_path: String,

    #[arg(short, long = "output", default_value = "resources.md")]
    output_path: String,

    #[arg(long, default_value = "Citations")]
    title: String,

    #[arg(long, default_value = "xelatex")]
    pdf_engine: String,

    #[arg(long, default_value = "pandoc")]
    pandoc: String,

    #[arg(short, long, help = "Enable verbose output")]
    verbose: bool,
}

async fn run(args: Args) -> anyhow::Result<()> {
    let format = validate_output_format("output", &args.output_path)?;
    let storage = LocalStorage::new(".");

    let data = storage
        .read_file(&args.input_path)
        .await
        .with_context(|| format!("reading dataset {}", args.input_path))?;
    let records = dataset::from_json(&data)
        .with_context(|| format!("parsing dataset {}", args.input_path))?;
    tracing::info!("📊 Loaded {} resources from {}", records.len(), args.input_path);

    let settings = ReportSettings {
        title: args.title,
        pdf_engine: args.pdf_engine,
        pandoc: args.pandoc,
    };
    let today = chrono::Local::now().date_naive();
    let output = report::render(&records, format, &settings, today).await?;

    storage
        .write_file(&args.output_path, &output)
        .await
        .with_context(|| format!("writing report {}", args.output_path))?;
    tracing::info!("💾 Report saved to: {}", args.output_path);
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    if let Err(e) = run(args).await {
        tracing::error!("❌ Rendering failed: {:#}", e);
        eprintln!("❌ {:#}", e);

        let exit_code = match e.downcast_ref::<EtlError>() {
            Some(etl_error) => {
                eprintln!("💡 建議: {}", etl_error.recovery_suggestion());
                etl_error.exit_code().max(1)
            }
            None => 1,
        };
        std::process::exit(exit_code);
    }
}
