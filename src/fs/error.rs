use std::fmt;

use crate::fs::file_table::Handle;

/// 驱动错误类型
#[derive(Debug)]
pub enum FsError {
    Io(std::io::Error),                           // 底层网络 I/O 错误
    NotMounted,                                   // 会话未挂载
    AlreadyMounted,                               // 会话已挂载
    Controller { op: u8, status: u8 },            // 控制器返回非零状态
    InvalidHandle(Handle),                        // 句柄不存在
    FileNotOpen(Handle),                          // 文件未打开
    AlreadyOpen(String),                          // 文件已被打开
    FileTableFull,                                // 文件表已满
    StorageFull,                                  // 扇区分配表已满
    SeekOutOfBounds { offset: i64, size: usize }, // seek 越界
    NameTooLong(String),                          // 文件名过长
}

impl From<std::io::Error> for FsError {
    fn from(e: std::io::Error) -> Self {
        FsError::Io(e)
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Controller I/O error: {}", e),
            Self::NotMounted => write!(f, "Storage session is not mounted"),
            Self::AlreadyMounted => write!(f, "Storage session is already mounted"),
            Self::Controller { op, status } => {
                write!(f, "Controller rejected op {} with status {}", op, status)
            }
            Self::InvalidHandle(h) => write!(f, "Invalid file handle: {}", h),
            Self::FileNotOpen(h) => write!(f, "File is not open: handle {}", h),
            Self::AlreadyOpen(name) => write!(f, "File is already open: {}", name),
            Self::FileTableFull => write!(f, "No free file table slot"),
            Self::StorageFull => write!(f, "No unassigned sector left on the device"),
            Self::SeekOutOfBounds { offset, size } => {
                write!(f, "Seek to {} is outside the file (size {})", offset, size)
            }
            Self::NameTooLong(name) => write!(f, "File name too long: {}", name),
        }
    }
}

// 支持链式错误，方便追踪底层原因
impl std::error::Error for FsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// 驱动统一结果类型
pub type Result<T> = std::result::Result<T, FsError>;
