use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/**
 * \brief 读取待分析的源码文件全文。
 */
pub fn read_source(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).with_context(|| format!("unable to read the file {}", path.display()))
}

/**
 * \brief 递归收集目录下匹配扩展名的源码文件，按路径排序保证批处理顺序稳定。
 */
pub fn collect_sources(dir: impl AsRef<Path>, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry =
            entry.with_context(|| format!("error walking directory {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let matched = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
            .unwrap_or(false);
        if matched {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}
