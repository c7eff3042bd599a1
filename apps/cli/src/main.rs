use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use codesleuth_core_sdk::{analysis, config, report, scanner, telemetry};

mod banner;
mod logger;

/**
 * \brief CLI 程序入口：把源码交给 LLM 做两阶段漏洞分析并输出 markdown 报告。
 */
#[derive(Parser, Debug)]
#[command(
    name = "codesleuth",
    version,
    about = "LLM-assisted source code vulnerability scanner"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /**
     * \brief 在当前目录生成默认 .env 模板。
     */
    Init,

    /**
     * \brief 检查环境中已配置了哪家 Provider 的凭据。
     */
    Check,

    /**
     * \brief 分析单个源码文件。
     */
    Scan {
        /** \brief 待分析的源码文件 */
        #[arg(long)]
        file: PathBuf,
        /** \brief 可选：markdown 报告输出路径 */
        #[arg(long)]
        output: Option<PathBuf>,
        /** \brief 可选：JSON 凭据配置文件（代替 .env） */
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        telemetry: bool,
    },

    /**
     * \brief 批量分析目录下的源码文件，任一文件失败即中止。
     */
    ScanDir {
        /** \brief 待扫描的目录 */
        #[arg(long)]
        dir: PathBuf,
        /** \brief 参与扫描的扩展名列表 */
        #[arg(long, value_delimiter = ',', default_value = "rs,go,py,js,ts,java,c,cpp")]
        ext: Vec<String>,
        /** \brief 可选：合并报告输出路径 */
        #[arg(long)]
        output: Option<PathBuf>,
        /** \brief 可选：JSON 凭据配置文件（代替 .env） */
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        telemetry: bool,
    },
}

#[tokio::main]
async fn main() {
    banner::print();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        logger::error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => {
            let created = config::ensure_env_file(config::DEFAULT_ENV_FILE)?;
            if created {
                logger::info(".env file created with default settings. Please update it with your API keys.");
            } else {
                logger::info(".env file already exists. Nothing to do.");
            }
        }
        Commands::Check => {
            let _ = config::load_env();
            check_api_configuration();
        }
        Commands::Scan {
            file,
            output,
            config,
            telemetry: telemetry_enabled,
        } => {
            telemetry::set_enabled(telemetry_enabled);
            // 单文件入口：出错打一条日志后提前返回，不让批处理语义介入
            if let Err(err) = scan_file(&file, output.as_deref(), config.as_deref()).await {
                telemetry::log_error("cli.scan", &format!("{:#}", err));
                logger::error(&format!("{:#}", err));
            }
        }
        Commands::ScanDir {
            dir,
            ext,
            output,
            config,
            telemetry: telemetry_enabled,
        } => {
            telemetry::set_enabled(telemetry_enabled);
            scan_directory(&dir, &ext, output.as_deref(), config.as_deref()).await?;
        }
    }
    Ok(())
}

async fn scan_file(file: &Path, output: Option<&Path>, config_file: Option<&Path>) -> Result<()> {
    let api_config = load_api_config(config_file)?;
    logger::info(&format!("Using {} API", api_config.provider_name()));

    let code = scanner::read_source(file)?;
    telemetry::log_event(
        "cli.scan",
        &format!("file={} bytes={}", file.display(), code.len()),
    );

    let vulnerabilities = analysis::analyze_code(&api_config, &code)
        .await
        .context("error analyzing code")?;

    report::print_markdown(&vulnerabilities);

    if let Some(output) = output {
        report::save_markdown(&vulnerabilities, output)
            .with_context(|| format!("error saving markdown report to {}", output.display()))?;
        verify_report_file(output)?;
        logger::info(&format!("Results successfully saved to {}", output.display()));
    }

    Ok(())
}

async fn scan_directory(
    dir: &Path,
    extensions: &[String],
    output: Option<&Path>,
    config_file: Option<&Path>,
) -> Result<()> {
    let api_config = load_api_config(config_file)?;
    logger::info(&format!("Using {} API", api_config.provider_name()));

    let files = scanner::collect_sources(dir, extensions)?;
    if files.is_empty() {
        logger::warn(&format!("No matching source files under {}", dir.display()));
        return Ok(());
    }
    logger::info(&format!("Scanning {} files", files.len()));

    let mut combined = String::new();
    for file in &files {
        logger::info(&format!("Analyzing {}", file.display()));
        let code = scanner::read_source(file)?;
        let vulnerabilities = analysis::analyze_code(&api_config, &code)
            .await
            .with_context(|| format!("error analyzing {}", file.display()))?;

        report::print_markdown(&vulnerabilities);
        combined.push_str(&format!("# File: {}\n\n", file.display()));
        combined.push_str(&report::render_markdown(&vulnerabilities));
    }

    if let Some(output) = output {
        std::fs::write(output, combined)
            .with_context(|| format!("error saving markdown report to {}", output.display()))?;
        verify_report_file(output)?;
        logger::info(&format!("Results successfully saved to {}", output.display()));
    }

    Ok(())
}

fn load_api_config(config_file: Option<&Path>) -> Result<config::ApiConfig> {
    if let Some(path) = config_file {
        return config::load_config_file(path)?.into_api_config();
    }
    let created = config::load_env()?;
    if created {
        logger::info(".env file not found. Created a new one with default settings.");
    }
    config::from_env()
}

/**
 * \brief 落盘后的自检：报告文件必须存在且非空。
 */
fn verify_report_file(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("failed to create markdown file: {}", path.display());
    }
    let content = std::fs::read(path)
        .with_context(|| format!("error reading saved markdown file {}", path.display()))?;
    if content.is_empty() {
        bail!("saved markdown file is empty");
    }
    Ok(())
}

fn check_api_configuration() {
    let openai_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    let azure_key = std::env::var("AZURE_API_KEY").unwrap_or_default();

    if !openai_key.is_empty() && openai_key != "your_openai_api_key_here" {
        logger::info("OpenAI API is configured and ready.");
    } else if !azure_key.is_empty() && azure_key != "your_azure_api_key_here" {
        logger::info("Azure OpenAI API is configured and ready.");
    } else {
        logger::warn(
            "No OpenAI or Azure API configuration found. Set the appropriate environment variables.",
        );
    }
}
