//! Live Preview 命令行

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use live_preview::generator::{select_sources, ComponentGenerator, GenerateRequest, HttpGenerator};
use live_preview::renderer::HtmlRenderer;
use live_preview::storage::{preview_label, FileStore, SnippetRepository};
use live_preview::{ModuleRegistry, PreviewConfig, PreviewHost, RenderOutcome, ThemeMode};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "live-preview", version, about = "Render a pasted UI component without a build step")]
struct Cli {
    /// 配置文件
    #[arg(long, global = true, default_value = "live-preview.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 渲染组件源码
    Render(RenderArgs),
    /// 管理已保存的片段
    #[command(subcommand)]
    Saved(SavedCommand),
    /// 列出生成服务的数据源
    Sources,
    /// 调用生成服务生成组件并渲染
    Generate(GenerateArgs),
    /// 列出可导入的模块
    Modules,
}

#[derive(Args)]
struct RenderArgs {
    /// 源码文件
    file: Option<PathBuf>,
    /// 从标准输入读取
    #[arg(long, conflicts_with_all = ["file", "clipboard"])]
    stdin: bool,
    /// 从剪贴板读取
    #[arg(long, conflicts_with = "file")]
    clipboard: bool,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct OutputArgs {
    /// 写出 HTML 预览页面
    #[arg(long)]
    html: Option<PathBuf>,
    /// 以 JSON 输出结果
    #[arg(long)]
    json: bool,
    /// 覆盖配置中的主题
    #[arg(long)]
    theme: Option<ThemeMode>,
}

#[derive(Subcommand)]
enum SavedCommand {
    /// 列出片段
    List,
    /// 保存文件内容
    Add { file: PathBuf },
    /// 打印片段源码
    Show { index: usize },
    /// 删除片段
    Remove { index: usize },
    /// 渲染片段
    Render {
        index: usize,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// 组件描述
    #[arg(long)]
    description: String,
    /// 逗号分隔的功能列表
    #[arg(long, default_value = "")]
    features: String,
    /// 数据源 id，可重复
    #[arg(long = "source", required = true)]
    sources: Vec<String>,
    #[arg(long, default_value = "medium")]
    complexity: String,
    #[arg(long, default_value = "modern")]
    style: String,
    /// 生成后保存
    #[arg(long)]
    save: bool,
    #[command(flatten)]
    output: OutputArgs,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = PreviewConfig::load(&cli.config).with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Command::Render(args) => {
            let source = read_source(&args)?;
            render(&config, source, &args.output)
        }
        Command::Saved(cmd) => saved(&config, cmd),
        Command::Sources => {
            let generator = generator(&config);
            for ds in generator.data_sources()? {
                println!("{:<20} {:<30} {:>6}", ds.id, ds.name, ds.count);
            }
            Ok(())
        }
        Command::Generate(args) => generate(&config, args),
        Command::Modules => {
            for entry in ModuleRegistry::new().entries() {
                println!("{}", entry.id);
                if !entry.exports.is_empty() {
                    println!("    {}", entry.exports.join(", "));
                }
            }
            Ok(())
        }
    }
}

fn read_source(args: &RenderArgs) -> Result<String> {
    if args.stdin {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        return Ok(source);
    }
    if args.clipboard {
        let mut clipboard = arboard::Clipboard::new().context("opening clipboard")?;
        return clipboard.get_text().context("reading clipboard text");
    }
    match &args.file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display())),
        None => bail!("no source given: pass a file, --stdin or --clipboard"),
    }
}

fn render(config: &PreviewConfig, source: String, output: &OutputArgs) -> Result<()> {
    let mut config = config.clone();
    if let Some(theme) = output.theme {
        config.theme = theme;
    }

    let mut host = PreviewHost::boot(&config);
    let outcome = host.render_source(source);

    if output.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    if let Some(path) = &output.html {
        let html = HtmlRenderer::new(host.palette()).render_document(&outcome);
        std::fs::write(path, html).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "preview written");
    }

    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_outcome(outcome: &RenderOutcome) {
    match outcome {
        RenderOutcome::Success(view) => {
            println!("✅ {} ({})", outcome.status_message(), view.component);
            println!("   rule: {}", view.rule.describe());
            println!("   nodes: {}", view.tree.iter().map(|n| n.element_count()).sum::<usize>());
            if !view.handlers.is_empty() {
                println!("   handlers: {}", view.handlers.join(", "));
            }
            for module in &view.unknown_modules {
                println!("   ⚠️  unknown module: {}", module);
            }
            for line in &view.console {
                println!("   [{:?}] {}", line.level, line.message);
            }
        }
        RenderOutcome::Failure(report) => {
            println!("❌ Error ({:?})", report.kind);
            println!("   {}", report.message);
            println!("   Tip: {}", report.hint);
        }
    }
}

fn repository(config: &PreviewConfig) -> SnippetRepository<FileStore> {
    SnippetRepository::new(FileStore::new(&config.storage_path))
}

fn saved(config: &PreviewConfig, cmd: SavedCommand) -> Result<()> {
    let mut repo = repository(config);
    match cmd {
        SavedCommand::List => {
            let list = repo.list()?;
            if list.is_empty() {
                println!("No saved components yet. Save your first component to see it here.");
            }
            for (i, source) in list.iter().enumerate() {
                println!("{:>3}  {}", i, preview_label(source, i));
            }
        }
        SavedCommand::Add { file } => {
            let source = std::fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            match repo.add(&source)? {
                Ok(index) => println!("Component saved successfully. ({})", index),
                Err(rejected) => bail!("{}", rejected),
            }
        }
        SavedCommand::Show { index } => match repo.get(index)? {
            Some(source) => println!("{}", source),
            None => bail!("no saved component at index {}", index),
        },
        SavedCommand::Remove { index } => {
            repo.remove_at(index)?;
            println!("Component deleted successfully.");
        }
        SavedCommand::Render { index, output } => match repo.get(index)? {
            Some(source) => return render(config, source, &output),
            None => bail!("no saved component at index {}", index),
        },
    }
    Ok(())
}

fn generator(config: &PreviewConfig) -> HttpGenerator {
    HttpGenerator::new(&config.generator_url, Duration::from_secs(config.generator_timeout_secs))
}

fn generate(config: &PreviewConfig, args: GenerateArgs) -> Result<()> {
    let generator = generator(config);
    let available = generator.data_sources()?;
    let sources = select_sources(&available, &args.sources);
    if sources.len() != args.sources.len() {
        let missing: Vec<&String> = args.sources.iter().filter(|id| !available.iter().any(|ds| &ds.id == *id)).collect();
        bail!("unknown data sources: {:?}", missing);
    }

    let mut request = GenerateRequest::new(args.description, sources).with_features(&args.features);
    request.complexity = args.complexity;
    request.style = args.style;

    let response = generator.generate(&request)?;
    if args.save {
        match repository(config).add(&response.component_code)? {
            Ok(index) => tracing::info!(index, "generated component saved"),
            Err(rejected) => tracing::warn!("{}", rejected),
        }
    }
    render(config, response.component_code, &args.output)
}
