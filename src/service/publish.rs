use crate::{
    service::github::{Contents, FileChange, Hosting},
    LeetSyncError, Result, REPORT_DIR, REPORT_PATH, REPORT_PLACEHOLDER,
};
use log::{debug, info};

/// Outcome of one publish; each is exactly one commit on the default branch
/// (plus the placeholder commit when the directory was missing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Published {
    Created,
    Updated,
}

/// Write `report` to `REPORT_PATH` in `full_name`, creating or replacing it.
pub fn publish<H: Hosting + ?Sized>(hosting: &H, full_name: &str, report: &str) -> Result<Published> {
    ensure_report_dir(hosting, full_name)?;

    match hosting.contents(full_name, REPORT_PATH)? {
        Some(Contents::File { sha }) => {
            debug!("Replacing {} at {}", REPORT_PATH, sha);
            let change = FileChange {
                message: "Update LeetCode stats".into(),
                content: report.to_string(),
                sha: Some(sha),
            };
            hosting.put_file(full_name, REPORT_PATH, &change)?;
            info!("Updated {} in {}", REPORT_PATH, full_name);
            Ok(Published::Updated)
        }
        Some(Contents::Directory) => Err(LeetSyncError::Remote(format!(
            "{} is a directory in {}",
            REPORT_PATH, full_name
        ))),
        None => {
            let change = FileChange {
                message: "Create LeetCode stats".into(),
                content: report.to_string(),
                sha: None,
            };
            hosting.put_file(full_name, REPORT_PATH, &change)?;
            info!("Created {} in {}", REPORT_PATH, full_name);
            Ok(Published::Created)
        }
    }
}

fn ensure_report_dir<H: Hosting + ?Sized>(hosting: &H, full_name: &str) -> Result<()> {
    if hosting.contents(full_name, REPORT_DIR)?.is_some() {
        return Ok(());
    }

    debug!("{} missing in {}, adding placeholder", REPORT_DIR, full_name);
    let change = FileChange {
        message: "Create dsa directory".into(),
        content: String::new(),
        sha: None,
    };
    hosting.put_file(full_name, REPORT_PLACEHOLDER, &change)
}
