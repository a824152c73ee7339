use anyhow::{bail, Context, Result};
use bulk_rename_core::{
    app_paths, apply_plan, find_template, format_template, generate_with_options, load_config,
    load_templates, parse_template, remove_template, save_templates, upsert_template, ApplyOutcome,
    AppConfig, FileEntry, GenerateError, GenerateOptions, RenamePlan, SavedTemplate, Template,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "bulk-rename-cli")]
#[command(about = "画像ファイルの名前をテンプレートで一括リネームします")]
struct Cli {
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Rename(RenameArgs),
    Templates(TemplatesArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct RenameArgs {
    #[arg(required = true)]
    files: Vec<PathBuf>,
    #[arg(long)]
    template: Option<String>,
    #[arg(long, conflicts_with = "template")]
    use_template: Option<String>,
    #[arg(long)]
    save_as: Option<String>,
    #[arg(long, default_value_t = false)]
    apply: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Args)]
struct TemplatesArgs {
    #[command(subcommand)]
    action: TemplatesAction,
}

#[derive(Debug, Subcommand)]
enum TemplatesAction {
    List,
    Show { name: String },
    Delete { name: String },
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Rename(args) => cmd_rename(args),
        Commands::Templates(templates) => match templates.action {
            TemplatesAction::List => cmd_templates_list(),
            TemplatesAction::Show { name } => cmd_templates_show(&name),
            TemplatesAction::Delete { name } => cmd_templates_delete(&name),
        },
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("ロガーを初期化できませんでした")?;
    Ok(())
}

fn cmd_rename(args: RenameArgs) -> Result<()> {
    let config = load_config()?;
    let template = resolve_template(&args, &config)?;
    template.validate()?;

    let mut entries = Vec::with_capacity(args.files.len());
    for path in &args.files {
        entries.push(FileEntry::from_path(path)?);
    }

    let options = GenerateOptions {
        reference_time: None,
        case_insensitive: config.case_insensitive_collisions,
    };
    let plan = match generate_with_options(&template, &entries, &options) {
        Ok(plan) => plan,
        Err(GenerateError::Conflict(conflicts)) => {
            for conflict in &conflicts {
                eprintln!(
                    "[{}] {} : {}",
                    conflict.file_index, conflict.name, conflict.detail
                );
            }
            bail!("リネーム先の競合により中止しました: {}件", conflicts.len());
        }
        Err(err) => return Err(err.into()),
    };

    if let Some(name) = &args.save_as {
        let mut templates = load_templates()?;
        upsert_template(
            &mut templates,
            SavedTemplate {
                name: name.clone(),
                tokens: template.clone(),
            },
        );
        save_templates(&templates)?;
        eprintln!("テンプレートを保存しました: {name}");
    }

    match args.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        OutputFormat::Table => {
            print_table(&plan);
        }
    }

    if args.apply {
        let report = apply_plan(&plan);
        for outcome in &report.outcomes {
            if let ApplyOutcome::Failed { from, message, .. } = outcome {
                eprintln!("失敗: {}: {message}", from.display());
            }
        }
        eprintln!(
            "適用完了: {}件 (変更なし {}件, 失敗 {}件)",
            report.applied, report.unchanged, report.failed
        );
        if report.failed > 0 {
            bail!("{}件のリネームに失敗しました", report.failed);
        }
    } else {
        eprintln!("dry-runモード: 実ファイルは変更していません。適用するには --apply を指定してください。");
    }

    Ok(())
}

fn resolve_template(args: &RenameArgs, config: &AppConfig) -> Result<Template> {
    if let Some(name) = &args.use_template {
        let templates = load_templates()?;
        let saved = find_template(&templates, name)
            .with_context(|| format!("テンプレートが見つかりません: {name}"))?;
        return Ok(saved.tokens.clone());
    }

    let text = args.template.as_deref().unwrap_or(&config.template);
    Ok(parse_template(text)?)
}

fn cmd_templates_list() -> Result<()> {
    let templates = load_templates()?;
    if templates.is_empty() {
        println!("保存済みテンプレートはありません");
        return Ok(());
    }
    for template in &templates {
        println!("{}\t{}", template.name, format_template(&template.tokens));
    }
    Ok(())
}

fn cmd_templates_show(name: &str) -> Result<()> {
    let templates = load_templates()?;
    let saved = find_template(&templates, name)
        .with_context(|| format!("テンプレートが見つかりません: {name}"))?;
    println!("{}", serde_json::to_string_pretty(saved)?);
    Ok(())
}

fn cmd_templates_delete(name: &str) -> Result<()> {
    let mut templates = load_templates()?;
    if !remove_template(&mut templates, name) {
        bail!("テンプレートが見つかりません: {name}");
    }
    save_templates(&templates)?;
    println!("削除しました: {name}");
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("設定ファイル: {}", paths.config_path.display());
    println!("テンプレートファイル: {}", paths.templates_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn print_table(plan: &RenamePlan) {
    println!("元ファイル -> 新ファイル");
    for pair in &plan.pairs {
        let marker = if pair.changed { "  " } else { "= " };
        println!(
            "{}{} -> {}",
            marker,
            pair.entry.path.display(),
            pair.new_name
        );
    }
    println!(
        "\n集計: planned={} unchanged={}",
        plan.stats.planned, plan.stats.unchanged
    );
}
