use uuid::Uuid;

pub type Id = String;

/// Nested JSON object payload carried by configuration documents.
/// Key order is preserved, matching how the documents are stored.
pub type ValueMap = serde_json::Map<String, serde_json::Value>;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
