//! 规则评估命令行工具
//!
//! 读取规则文档与事实表文件，输出评估结果 JSON。

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rule_engine::{FactTable, RuleExecutor, RuleParser};
use rule_shared::config::AppConfig;
use rule_shared::observability;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 规则评估工具
#[derive(Parser, Debug)]
#[command(name = "rule-eval")]
#[command(version, about = "声明式规则评估工具")]
#[command(propagate_version = true)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 评估规则并输出结果 JSON
    Evaluate {
        /// 规则文档路径
        #[arg(short, long)]
        rules: PathBuf,

        /// 事实表路径（JSON 对象）
        #[arg(short, long)]
        facts: PathBuf,

        /// 格式化输出
        #[arg(long)]
        pretty: bool,
    },

    /// 严格解析规则并列出可疑的书写问题
    Validate {
        #[arg(short, long)]
        rules: PathBuf,
    },

    /// 列出规则引用的全部 token
    Tokens {
        #[arg(short, long)]
        rules: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load("rule-engine").unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    observability::init(&config.observability)?;

    match cli.command {
        Commands::Evaluate {
            rules,
            facts,
            pretty,
        } => {
            let doc = RuleParser::parse(&read_file(&rules)?);
            let facts = FactTable::from_json_str(&read_file(&facts)?)
                .with_context(|| format!("无法加载事实表 {}", facts.display()))?;

            let executor = RuleExecutor::from_config(&config.engine);
            let result = executor.execute(&doc, &facts);
            info!(
                overall = result.overall,
                lines = result.lines.len(),
                "{}",
                result.message()
            );

            let output = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{}", output);
        }
        Commands::Validate { rules } => {
            let doc = RuleParser::try_parse(&read_file(&rules)?)
                .with_context(|| format!("规则文档无效 {}", rules.display()))?;

            let issues = RuleParser::validate(&doc);
            for issue in &issues {
                warn!(path = %issue.path, "{}", issue.message);
                println!("{}", issue);
            }
            if issues.is_empty() {
                println!("OK: {} 个顶层规则组", doc.groups.len());
            }
        }
        Commands::Tokens { rules } => {
            let doc = RuleParser::parse(&read_file(&rules)?);
            let tokens = doc.required_tokens();
            if tokens.is_empty() && doc.is_empty() {
                bail!("规则文档 {} 中没有规则组", rules.display());
            }
            for token in tokens {
                println!("{}", token);
            }
        }
    }

    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("无法读取文件 {}", path.display()))
}
