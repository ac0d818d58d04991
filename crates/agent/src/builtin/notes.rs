use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::tools::{ParameterSchema, ParameterType, Tool, ToolError};

const PREVIEW_CHARS: usize = 200;

/// Accepts bare file names only, so every note stays inside the data directory.
fn note_path(data_dir: &Path, filename: &str) -> Option<PathBuf> {
    let filename = filename.trim();
    let is_plain = !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(['/', '\\'])
        && !filename.contains('\0');
    is_plain.then(|| data_dir.join(filename))
}

fn invalid_filename(filename: &str) -> String {
    format!("❌ 檔名無效：{filename}\n(只能使用單一檔名，不可包含路徑)")
}

#[derive(Debug, Deserialize)]
pub struct WriteNoteArgs {
    filename: String,
    content: String,
}

pub struct WriteNoteTool {
    data_dir: PathBuf,
}

impl WriteNoteTool {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }
}

#[async_trait]
impl Tool for WriteNoteTool {
    type Args = WriteNoteArgs;

    fn name(&self) -> &'static str {
        "write_note"
    }

    fn description(&self) -> &'static str {
        "Save a text note or file to the local system. Use this to remember things, save summaries, or create logs."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new()
            .required("filename", ParameterType::String, "Name of the file (e.g., memo.txt)")
            .required("content", ParameterType::String, "The content to write")
    }

    async fn call(&self, args: WriteNoteArgs) -> Result<String, ToolError> {
        let Some(path) = note_path(&self.data_dir, &args.filename) else {
            return Ok(invalid_filename(&args.filename));
        };

        if let Err(error) = tokio::fs::create_dir_all(&self.data_dir).await {
            return Ok(format!("❌ 寫入失敗: {error}"));
        }
        if let Err(error) = tokio::fs::write(&path, args.content.as_bytes()).await {
            return Ok(format!("❌ 寫入失敗: {error}"));
        }

        info!(
            event_name = "agent.tool.note.written",
            path = %path.display(),
            bytes = args.content.len(),
            "note written"
        );

        Ok(format!("✅ 已為您將內容寫入本機檔案：{}\n\n內容如下：\n{}", path.display(), args.content))
    }
}

#[derive(Debug, Deserialize)]
pub struct ReadNoteArgs {
    filename: String,
}

pub struct ReadNoteTool {
    data_dir: PathBuf,
}

impl ReadNoteTool {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }
}

#[async_trait]
impl Tool for ReadNoteTool {
    type Args = ReadNoteArgs;

    fn name(&self) -> &'static str {
        "read_note"
    }

    fn description(&self) -> &'static str {
        "Read a content of a file from the local system."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new().required(
            "filename",
            ParameterType::String,
            "Name of the file to read",
        )
    }

    async fn call(&self, args: ReadNoteArgs) -> Result<String, ToolError> {
        let Some(path) = note_path(&self.data_dir, &args.filename) else {
            return Ok(invalid_filename(&args.filename));
        };

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(format!("📄 檔案內容 ({}):\n\n{content}", args.filename.trim())),
            Err(error) => {
                debug!(
                    event_name = "agent.tool.note.read_failed",
                    path = %path.display(),
                    error = %error,
                    "note read failed"
                );
                Ok("❌ 讀取失敗 (檔案可能不存在)".to_string())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchNotesArgs {
    keyword: String,
}

pub struct SearchNotesTool {
    data_dir: PathBuf,
}

impl SearchNotesTool {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    async fn matching_notes(&self, keyword: &str) -> std::io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.data_dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();

        let needle = keyword.to_lowercase();
        let mut previews = Vec::new();
        for path in files {
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(error) => {
                    debug!(
                        event_name = "agent.tool.note.search_skipped",
                        path = %path.display(),
                        error = %error,
                        "skipping unreadable note"
                    );
                    continue;
                }
            };

            if content.to_lowercase().contains(&needle) {
                let name = path.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
                let preview = content.chars().take(PREVIEW_CHARS).collect::<String>();
                previews.push(format!("📄 [{name}]:\n{preview}... (略)"));
            }
        }

        Ok(previews)
    }
}

#[async_trait]
impl Tool for SearchNotesTool {
    type Args = SearchNotesArgs;

    fn name(&self) -> &'static str {
        "search_notes"
    }

    fn description(&self) -> &'static str {
        "Search through all saved files/notes for specific keywords. Use this to RECALL information or answer questions based on past memories."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new().required(
            "keyword",
            ParameterType::String,
            "Keyword to search for (e.g., \"會員\", \"開會\", \"APIs\")",
        )
    }

    async fn call(&self, args: SearchNotesArgs) -> Result<String, ToolError> {
        if !tokio::fs::try_exists(&self.data_dir).await.unwrap_or(false) {
            return Ok("📭 記憶庫是空的 (沒有任何筆記)".to_string());
        }

        let previews = match self.matching_notes(&args.keyword).await {
            Ok(previews) => previews,
            Err(error) => return Ok(format!("❌ 搜尋失敗: {error}")),
        };

        if previews.is_empty() {
            return Ok(format!("❌ 找不到關於 \"{}\" 的記憶。\n(Memory is clean)", args.keyword));
        }

        Ok(format!(
            "🔍 找到 {} 筆相關記憶：\n\n{}\n\n(若要查看完整內容，請用 read_note)",
            previews.len(),
            previews.join("\n\n")
        ))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::{
        note_path, ReadNoteArgs, ReadNoteTool, SearchNotesArgs, SearchNotesTool, WriteNoteArgs,
        WriteNoteTool,
    };
    use crate::tools::Tool;

    fn write_args(filename: &str, content: &str) -> WriteNoteArgs {
        WriteNoteArgs { filename: filename.to_string(), content: content.to_string() }
    }

    #[test]
    fn only_plain_file_names_are_accepted() {
        let dir = std::path::Path::new("data");
        assert!(note_path(dir, "memo.txt").is_some());
        for name in ["", " ", ".", "..", "../secret", "a/b.txt", "a\\b.txt"] {
            assert!(note_path(dir, name).is_none(), "{name:?} should be rejected");
        }
    }

    #[tokio::test]
    async fn write_creates_directory_and_read_returns_content() {
        let temp = TempDir::new().expect("temp dir");
        let data_dir = temp.path().join("data");
        let writer = WriteNoteTool::new(&data_dir);
        let reader = ReadNoteTool::new(&data_dir);

        let output = writer.call(write_args("memo.txt", "買牛奶")).await.expect("never rejects");
        let expected_path = data_dir.join("memo.txt");
        assert_eq!(
            output,
            format!("✅ 已為您將內容寫入本機檔案：{}\n\n內容如下：\n買牛奶", expected_path.display())
        );

        let output = reader
            .call(ReadNoteArgs { filename: "memo.txt".to_string() })
            .await
            .expect("never rejects");
        assert_eq!(output, "📄 檔案內容 (memo.txt):\n\n買牛奶");
    }

    #[tokio::test]
    async fn reading_a_missing_note_reports_failure() {
        let temp = TempDir::new().expect("temp dir");
        let reader = ReadNoteTool::new(temp.path());
        let output = reader
            .call(ReadNoteArgs { filename: "nope.txt".to_string() })
            .await
            .expect("never rejects");
        assert_eq!(output, "❌ 讀取失敗 (檔案可能不存在)");
    }

    #[tokio::test]
    async fn path_traversal_is_refused_without_touching_disk() {
        let temp = TempDir::new().expect("temp dir");
        let writer = WriteNoteTool::new(temp.path().join("data"));
        let output = writer.call(write_args("../escape.txt", "x")).await.expect("never rejects");

        assert!(output.starts_with("❌"));
        assert!(!temp.path().join("escape.txt").exists());
        assert!(!temp.path().join("data").exists());
    }

    #[tokio::test]
    async fn search_reports_empty_store_matches_and_misses() {
        let temp = TempDir::new().expect("temp dir");
        let data_dir = temp.path().join("data");
        let search = SearchNotesTool::new(&data_dir);

        let output = search
            .call(SearchNotesArgs { keyword: "會議".to_string() })
            .await
            .expect("never rejects");
        assert_eq!(output, "📭 記憶庫是空的 (沒有任何筆記)");

        let writer = WriteNoteTool::new(&data_dir);
        writer.call(write_args("a.txt", "Weekly MEETING notes")).await.expect("never rejects");
        writer.call(write_args("b.txt", "grocery list")).await.expect("never rejects");
        writer.call(write_args("c.txt", &"meeting ".repeat(60))).await.expect("never rejects");

        let output = search
            .call(SearchNotesArgs { keyword: "meeting".to_string() })
            .await
            .expect("never rejects");
        assert!(output.starts_with("🔍 找到 2 筆相關記憶：\n\n📄 [a.txt]:\nWeekly MEETING notes... (略)"));
        assert!(output.contains(&format!("📄 [c.txt]:\n{}... (略)", &"meeting ".repeat(60)[..200])));
        assert!(output.ends_with("(若要查看完整內容，請用 read_note)"));
        assert!(!output.contains("b.txt"));

        let output = search
            .call(SearchNotesArgs { keyword: "vacation".to_string() })
            .await
            .expect("never rejects");
        assert_eq!(output, "❌ 找不到關於 \"vacation\" 的記憶。\n(Memory is clean)");
    }
}
