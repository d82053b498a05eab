use catalog_args::Arguments;
use sha2::{Digest, Sha256};

/// Stable provider id: `{name}_{hash}`, where `hash` is the SHA256 of the
/// canonical JSON of `args`, truncated to 16 hex characters.
///
/// Argument order does not matter.
pub fn provider_id(name: &str, args: &Arguments) -> String {
    let mut hasher = Sha256::new();
    hasher.update(args.canonical_json().as_bytes());
    let digest = hasher.finalize();
    format!("{name}_{}", hex::encode(&digest[..8]))
}

#[cfg(test)]
mod tests {
    use catalog_args::ArgumentSchema;

    use super::*;

    #[test]
    fn test_id_depends_on_arguments_only() {
        let schema = ArgumentSchema::new();
        let a = schema.decode("yts?limit=5&lang=en");
        let b = schema.decode("yts?lang=en&limit=5");
        let c = schema.decode("yts?limit=6&lang=en");

        let id = provider_id("yts", &a);
        assert_eq!(id, provider_id("yts", &b));
        assert_ne!(id, provider_id("yts", &c));
        assert!(id.starts_with("yts_"));
        assert_eq!(id.len(), "yts_".len() + 16);
    }
}
