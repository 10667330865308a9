use serde_json::{json, Value};
use tempfile::TempDir;

use gitlab_analysis::orchestrator::DateRangeLabel;
use gitlab_analysis::report::{
    normalize, DashboardView, ExpansionState, RawReport, ReportConfig, ReportFormat, ReportGenerator,
};

/// 引擎返回的原始结果，顺序未整理
fn raw_report() -> RawReport {
    serde_json::from_value(json!({
        "codeStats": [
            {
                "key": "bob-total", "author": "【bob】", "project": "【总计】",
                "commits": 1, "additions": 3, "deletions": 0, "lines": 3, "files": 1,
                "size": 1.5, "isTotal": true,
                "children": [
                    {"key": "bob-api", "author": "bob", "email": "bob@example.com", "project": "api",
                     "commits": 1, "additions": 3, "deletions": 0, "lines": 3, "files": 1, "size": 1.5}
                ]
            },
            {
                "key": "alice-total", "author": "【alice】", "project": "【总计】",
                "commits": 3, "additions": 20, "deletions": 5, "lines": 25, "files": 4,
                "size": 12.25, "isTotal": true,
                "children": [
                    {"key": "alice-web", "author": "alice", "email": "alice@example.com", "project": "web",
                     "commits": 1, "additions": 5, "deletions": 1, "lines": 6, "files": 1, "size": 2.0},
                    {"key": "alice-api", "author": "alice", "email": "alice@example.com", "project": "api",
                     "commits": 2, "additions": 15, "deletions": 4, "lines": 19, "files": 3, "size": 10.25}
                ]
            }
        ],
        "commitStats": [
            {"author": "alice", "email": "alice@example.com", "project": "web", "branch": "main",
             "tag": "unknown", "committedDate": "2024-01-02T10:00:00+08:00", "message": "fix | login"},
            {"author": "bob", "email": "bob@example.com", "project": "api", "branch": "feature/api",
             "tag": "v1.0.0", "committedDate": "2024-01-05T09:30:00+08:00", "message": "feat: api"}
        ]
    }))
    .unwrap()
}

fn date_range() -> DateRangeLabel {
    DateRangeLabel::new("2024-01-01 00:00:00", "2024-01-07 23:59:59")
}

#[test]
fn test_markdown_report_follows_normalized_order() {
    let report = normalize(&raw_report());
    let expansion = ExpansionState::derive(&report.code_stats);
    let range = date_range();
    let view = DashboardView::new(&report, &expansion, &range);

    let generator = ReportGenerator::new(ReportConfig {
        format: ReportFormat::Markdown,
        ..ReportConfig::default()
    });
    let content = generator.generate_content(&view).unwrap();

    assert!(content.starts_with("# GitLab 代码分析\n"));
    assert!(content.contains("## 代码统计（2024-01-01 00:00:00 至 2024-01-07 23:59:59）"));
    assert!(content.contains("## 提交统计（2024-01-01 00:00:00 至 2024-01-07 23:59:59）"));

    // 作者与明细均按代码量降序
    let alice = content.find("**【alice】**").unwrap();
    let alice_api = content.find("↳ alice | alice@example.com | api").unwrap();
    let alice_web = content.find("↳ alice | alice@example.com | web").unwrap();
    let bob = content.find("**【bob】**").unwrap();
    assert!(alice < alice_api && alice_api < alice_web && alice_web < bob);

    // 表格单元格中的竖线被转义
    assert!(content.contains("fix \\| login"));
    assert!(content.contains("共 2 条记录"));
    assert!(!content.contains("## 错误统计"));
}

#[test]
fn test_collapsed_rows_hide_children() {
    let report = normalize(&raw_report());
    let mut expansion = ExpansionState::derive(&report.code_stats);
    expansion.toggle("alice-total");
    let range = date_range();
    let view = DashboardView::new(&report, &expansion, &range);

    let content = ReportGenerator::new(ReportConfig {
        format: ReportFormat::Markdown,
        ..ReportConfig::default()
    })
    .generate_content(&view)
    .unwrap();

    assert!(content.contains("**【alice】**"));
    assert!(!content.contains("↳ alice"));
    assert!(content.contains("↳ bob"));
}

#[test]
fn test_json_report_with_author_filter() {
    let report = normalize(&raw_report());
    let expansion = ExpansionState::derive(&report.code_stats);
    let range = date_range();
    let view = DashboardView::new(&report, &expansion, &range).with_author_filter(Some("bob"));

    let content = ReportGenerator::new(ReportConfig {
        format: ReportFormat::Json,
        ..ReportConfig::default()
    })
    .generate_content(&view)
    .unwrap();
    let value: Value = serde_json::from_str(&content).unwrap();

    assert_eq!(value["dateRange"], json!(["2024-01-01 00:00:00", "2024-01-07 23:59:59"]));
    assert_eq!(value["codeStats"][0]["key"], "alice-total");
    assert_eq!(value["codeStats"][0]["children"][0]["key"], "alice-api");
    assert_eq!(value["expandedKeys"], json!(["alice-total", "bob-total"]));
    assert_eq!(value["chart"][0], json!({"name": "alice", "value": 12.25}));
    assert_eq!(value["commitTotal"], 1);
    assert_eq!(value["commitStats"][0]["author"], "bob");
    assert!(value.get("failureStats").is_none());
}

#[test]
fn test_text_report_without_colors() {
    let report = normalize(&raw_report());
    let expansion = ExpansionState::derive(&report.code_stats);
    let range = date_range();
    let view = DashboardView::new(&report, &expansion, &range);

    let content = ReportGenerator::new(ReportConfig {
        use_colors: false,
        commit_page_size: Some(1),
        ..ReportConfig::default()
    })
    .generate_content(&view)
    .unwrap();

    assert!(!content.contains('\x1b'));
    assert!(content.contains("代码统计（2024-01-01 00:00:00 至 2024-01-07 23:59:59）"));
    // 只展示第一页，最新的提交在前
    assert!(content.contains("feat: api"));
    assert!(!content.contains("fix | login"));
    assert!(content.contains("共 2 条记录"));
}

#[test]
fn test_empty_report_renders_placeholders() {
    let report = normalize(&RawReport::default());
    let expansion = ExpansionState::default();
    let range = date_range();
    let view = DashboardView::new(&report, &expansion, &range);

    let content = ReportGenerator::new(ReportConfig {
        format: ReportFormat::Markdown,
        ..ReportConfig::default()
    })
    .generate_content(&view)
    .unwrap();

    assert!(content.contains("_暂无数据_"));
    assert!(content.contains("共 0 条记录"));
}

#[tokio::test]
async fn test_write_report_creates_directories() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("nested").join("report.json");

    let report = normalize(&raw_report());
    let expansion = ExpansionState::derive(&report.code_stats);
    let range = date_range();
    let view = DashboardView::new(&report, &expansion, &range);

    let generator = ReportGenerator::new(ReportConfig {
        format: ReportFormat::Json,
        output_path: Some(output.clone()),
        ..ReportConfig::default()
    });
    let generated = generator.write(&view).await.unwrap();

    assert_eq!(generated.path, output);
    assert_eq!(generated.format, ReportFormat::Json);

    let written = tokio::fs::read_to_string(&output).await.unwrap();
    assert_eq!(written.len(), generated.size);
    let value: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["commitTotal"], 2);
}
