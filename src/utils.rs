use uuid::Uuid;

/// 生成一个随机唯一 ID
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}
