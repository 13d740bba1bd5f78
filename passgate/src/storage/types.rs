use serde::{Deserialize, Serialize};

/// Data stored in the cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CacheData {
    pub(crate) value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_data_serialization() {
        let data = CacheData {
            value: "test value".to_string(),
        };

        let json = serde_json::to_string(&data).expect("Failed to serialize CacheData");

        assert_eq!(json, "{\"value\":\"test value\"}");
    }
}
