//! Static product policy: store product id to credited message count.

/// Message count credited for a purchasable product id.
///
/// Unknown product ids are rejected by returning `None`; the reconciler
/// logs and skips them without crediting.
pub fn credit_count(product_id: &str) -> Option<i64> {
    match product_id {
        "messages.10" => Some(10),
        "messages.20" => Some(20),
        "messages.100" => Some(100),
        "messages.1000" => Some(1000),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_products_map_to_counts() {
        assert_eq!(credit_count("messages.10"), Some(10));
        assert_eq!(credit_count("messages.20"), Some(20));
        assert_eq!(credit_count("messages.100"), Some(100));
        assert_eq!(credit_count("messages.1000"), Some(1000));
    }

    #[test]
    fn unknown_products_are_rejected() {
        assert_eq!(credit_count("messages.999"), None);
        assert_eq!(credit_count("subscription.monthly"), None);
        assert_eq!(credit_count(""), None);
    }
}
