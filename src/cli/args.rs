use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::engine::config::DATE_FORMAT;
use crate::orchestrator::label::MAX_RANGE_DAYS;
use crate::report::config::ReportFormat;

#[derive(Parser, Debug)]
#[command(
    name = "gitlab-analysis",
    version,
    about = "GitLab 代码分析 - 统计群组内各作者的代码量与提交记录",
    long_about = "gitlab-analysis 拉取 GitLab 群组下各项目在指定时间段内的提交，按作者汇总增删行数、文件数与代码量，实时输出分析日志，并以文本、Markdown 或 JSON 格式输出统计报告。"
)]
pub struct Args {
    /// 配置文件路径（toml / yaml / json）
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// GitLab API 地址，如 https://gitlab.example.com/api/v4
    #[arg(long, value_name = "URL")]
    pub api: Option<String>,

    /// GitLab 访问令牌
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// 群组 ID
    #[arg(short = 'g', long, value_name = "ID")]
    pub group: Option<String>,

    /// 开始时间（YYYY-MM-DD 或 YYYY-MM-DD HH:mm:ss）
    #[arg(long, value_name = "DATE", value_parser = parse_since)]
    pub since: Option<NaiveDateTime>,

    /// 结束时间（YYYY-MM-DD 或 YYYY-MM-DD HH:mm:ss），日期按当天结束计算
    #[arg(long, value_name = "DATE", value_parser = parse_until)]
    pub until: Option<NaiveDateTime>,

    /// 未指定开始时间时统计最近多少天（1-3650）
    #[arg(short = 'd', long, value_name = "DAYS", value_parser = clap::value_parser!(i64).range(1..=MAX_RANGE_DAYS))]
    pub days: Option<i64>,

    /// 分析的项目数量（1-100）
    #[arg(short = 'n', long = "projects-num", value_name = "N")]
    pub projects_num: Option<u32>,

    /// 排除的项目名称，可重复或以逗号分隔
    #[arg(long, value_name = "NAME", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// 统计的文件扩展名，如 .rs,.ts；不指定时使用配置
    #[arg(long, value_name = "EXT", value_delimiter = ',')]
    pub ext: Vec<String>,

    /// 忽略的路径片段，不指定时使用配置
    #[arg(long, value_name = "PATH", value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// 最大并发请求数（1-30）
    #[arg(long, value_name = "N")]
    pub concurrency: Option<u32>,

    /// 报告格式
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub format: ReportFormat,

    /// 报告输出文件，不指定时输出到标准输出
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// 只展示该作者的提交
    #[arg(long, value_name = "NAME")]
    pub author: Option<String>,

    /// 报告中折叠所有作者的项目明细
    #[arg(long, default_value_t = false)]
    pub collapse: bool,

    /// 分析完成后不播放动画
    #[arg(long = "no-celebration", default_value_t = false)]
    pub no_celebration: bool,

    /// 日志级别（trace / debug / info / warn / error）
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Args {
    /// 转为配置层的命令行覆盖项
    pub fn config_overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        let mut set = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                overrides.insert(key.to_string(), value);
            }
        };

        set("api", self.api.clone());
        set("token", self.token.clone());
        set("group", self.group.clone());
        set("projects-num", self.projects_num.map(|n| n.to_string()));
        set("concurrency", self.concurrency.map(|n| n.to_string()));
        set("log-level", self.log_level.clone());

        overrides
    }
}

fn parse_date_time(value: &str, default_time: NaiveTime) -> Result<NaiveDateTime, String> {
    let value = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, DATE_FORMAT) {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(default_time))
        .map_err(|_| format!("无效的时间: {}，格式应为 YYYY-MM-DD 或 YYYY-MM-DD HH:mm:ss", value))
}

fn parse_since(value: &str) -> Result<NaiveDateTime, String> {
    let start_of_day = NaiveTime::from_hms_opt(0, 0, 0).ok_or("无效的时间")?;
    parse_date_time(value, start_of_day)
}

fn parse_until(value: &str) -> Result<NaiveDateTime, String> {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).ok_or("无效的时间")?;
    parse_date_time(value, end_of_day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_values() {
        let args = Args::try_parse_from(["gitlab-analysis"]).unwrap();

        assert_eq!(args.config, None);
        assert_eq!(args.api, None);
        assert_eq!(args.since, None);
        assert!(args.exclude.is_empty());
        assert!(args.ext.is_empty());
        assert_eq!(args.format, ReportFormat::Text);
        assert!(!args.collapse);
        assert!(!args.no_celebration);
        assert!(args.config_overrides().is_empty());
    }

    #[test]
    fn test_args_full() {
        let args = Args::try_parse_from([
            "gitlab-analysis",
            "--api",
            "https://gitlab.example.com/api/v4",
            "--token",
            "secret",
            "-g",
            "2177",
            "--since",
            "2024-01-01",
            "--until",
            "2024-01-07",
            "--exclude",
            "legacy,sandbox",
            "--exclude",
            "docs",
            "--ext",
            ".rs,.ts",
            "--concurrency",
            "8",
            "-f",
            "markdown",
            "-o",
            "report.md",
            "--collapse",
            "--no-celebration",
        ])
        .unwrap();

        assert_eq!(args.group.as_deref(), Some("2177"));
        assert_eq!(args.since.unwrap().format(DATE_FORMAT).to_string(), "2024-01-01 00:00:00");
        assert_eq!(args.until.unwrap().format(DATE_FORMAT).to_string(), "2024-01-07 23:59:59");
        assert_eq!(args.exclude, vec!["legacy", "sandbox", "docs"]);
        assert_eq!(args.ext, vec![".rs", ".ts"]);
        assert_eq!(args.format, ReportFormat::Markdown);
        assert_eq!(args.output, Some(PathBuf::from("report.md")));
        assert!(args.collapse);

        let overrides = args.config_overrides();
        assert_eq!(overrides.get("group").map(String::as_str), Some("2177"));
        assert_eq!(overrides.get("concurrency").map(String::as_str), Some("8"));
        assert!(!overrides.contains_key("projects-num"));
    }

    #[test]
    fn test_args_full_timestamp() {
        let args = Args::try_parse_from(["gitlab-analysis", "--since", "2024-01-01 08:30:00"]).unwrap();
        assert_eq!(args.since.unwrap().format(DATE_FORMAT).to_string(), "2024-01-01 08:30:00");
    }

    #[test]
    fn test_args_invalid_values() {
        assert!(Args::try_parse_from(["gitlab-analysis", "--since", "01/02/2024"]).is_err());
        assert!(Args::try_parse_from(["gitlab-analysis", "--format", "html"]).is_err());
        assert!(Args::try_parse_from(["gitlab-analysis", "--concurrency", "many"]).is_err());
        assert!(Args::try_parse_from(["gitlab-analysis", "--days", "0"]).is_err());
        assert!(Args::try_parse_from(["gitlab-analysis", "--days", "200000000"]).is_err());
        assert_eq!(Args::try_parse_from(["gitlab-analysis", "-d", "3650"]).unwrap().days, Some(3650));
    }
}
