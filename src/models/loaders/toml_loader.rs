use crate::models::bank::QuestionBank;
use crate::models::question::{ExamJob, LessonFile};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 读取并解析单个 TOML 文件
async fn load_toml<T: DeserializeOwned>(toml_file_path: &Path) -> Result<T> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    toml::from_str(&content).with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))
}

/// 列出文件夹中所有 `.toml` 文件（按文件名排序，保证加载顺序稳定）
async fn list_toml_files(folder_path: &str) -> Result<Vec<PathBuf>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }

    toml_files.sort();
    Ok(toml_files)
}

/// 加载单个课时题库文件
pub async fn load_lesson_file(toml_file_path: &Path) -> Result<LessonFile> {
    let mut lesson: LessonFile = load_toml(toml_file_path).await?;
    lesson.file_path = Some(toml_file_path.to_string_lossy().to_string());
    Ok(lesson)
}

/// 从文件夹加载整个题库
///
/// 单个文件解析失败只记录警告并跳过
pub async fn load_question_bank(folder_path: &str) -> Result<QuestionBank> {
    let mut bank = QuestionBank::new();

    for path in list_toml_files(folder_path).await? {
        tracing::info!(
            "正在加载题库: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        let records = match load_lesson_file(&path).await {
            Ok(lesson) => lesson
                .into_records()
                .with_context(|| format!("题目文档解析失败: {}", path.display())),
            Err(e) => Err(e),
        };

        match records {
            Ok(records) => {
                tracing::info!("成功加载 {} 个题目", records.len());
                for record in records {
                    if let Some(previous) = bank.insert(record) {
                        tracing::warn!("题目 ID {} 重复，以 {} 中的版本为准", previous.id, path.display());
                    }
                }
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(bank)
}

/// 加载单个组卷任务文件
pub async fn load_exam_job(toml_file_path: &Path) -> Result<ExamJob> {
    let mut job: ExamJob = load_toml(toml_file_path).await?;
    job.file_path = Some(toml_file_path.to_string_lossy().to_string());
    Ok(job)
}

/// 从文件夹加载所有组卷任务
pub async fn load_exam_jobs(folder_path: &str) -> Result<Vec<ExamJob>> {
    let mut jobs = Vec::new();

    for path in list_toml_files(folder_path).await? {
        match load_exam_job(&path).await {
            Ok(job) => {
                tracing::info!("组卷任务: {} ({} 道题)", job.title, job.questions.len());
                jobs.push(job);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(jobs)
}
