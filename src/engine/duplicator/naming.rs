// ==========================================
// 复制编号生成
// ==========================================
// 规则: 依次尝试 "{源}-2", "{源}-3", ... 直到未被占用
// ==========================================

use std::collections::HashSet;

/// 生成未被占用的 "{base}-{n}" 编号, n 从 `start` 开始递增
pub(crate) fn next_unique_key(base: &str, start: u32, taken: &HashSet<String>) -> String {
    let mut suffix = start;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if !taken.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_unique_key_skips_taken() {
        let taken: HashSet<String> = ["MO1", "MO1-2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(next_unique_key("MO1", 2, &taken), "MO1-3");
        assert_eq!(next_unique_key("MO9", 2, &taken), "MO9-2");
    }
}
