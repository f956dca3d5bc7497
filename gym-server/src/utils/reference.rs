//! 支付参考号生成 (`PAY_1A2B3C4D`, `PAYMENT_...`, `REFUND_...`)

use uuid::Uuid;

/// `<PREFIX>_` + 8 位大写十六进制
pub fn payment_reference(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, id[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_shape() {
        let r = payment_reference("PAY");
        assert!(r.starts_with("PAY_"));
        assert_eq!(r.len(), 12);
        assert!(r[4..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        assert_ne!(payment_reference("PAY"), payment_reference("PAY"));
    }
}
