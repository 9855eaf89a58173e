// 远程设备几何参数：64 条磁道，每条 1024 个扇区
pub const TRACK_COUNT: usize = 64;
pub const SECTORS_PER_TRACK: usize = 1024;

// 文件表最多 1024 个描述符
pub const MAX_FILES: usize = 1024;

// 文件名长度上限
pub const MAX_NAME_LEN: usize = 128;

// 缓存默认行数，可用 RFS_CACHE_LINES 覆盖
pub const DEFAULT_CACHE_LINES: usize = 64;
pub const CACHE_LINES_ENV: &str = "RFS_CACHE_LINES";
