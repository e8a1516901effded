//! 주문 입력 검증
//!
//! 모든 검증은 거래소 호출 전에 수행된다.

use crate::error::TradingError;
use crate::models::order::OrderType;

/// 심볼 검증
pub fn validate_symbol(symbol: &str) -> Result<(), TradingError> {
    if symbol.trim().is_empty() {
        return Err(TradingError::Validation("Symbol cannot be empty".to_string()));
    }
    Ok(())
}

/// 수량 검증
pub fn validate_quantity(quantity: f64) -> Result<(), TradingError> {
    if !quantity.is_finite() {
        return Err(TradingError::Validation("Quantity must be a number".to_string()));
    }
    if quantity <= 0.0 {
        return Err(TradingError::Validation("Quantity must be positive".to_string()));
    }
    Ok(())
}

/// 가격 검증 (LIMIT 주문에서만 필수)
pub fn validate_price(price: Option<f64>, order_type: OrderType) -> Result<(), TradingError> {
    if order_type != OrderType::Limit {
        return Ok(());
    }

    match price {
        None => Err(TradingError::Validation("Price is required for LIMIT orders".to_string())),
        Some(p) if !p.is_finite() => Err(TradingError::Validation("Price must be a number".to_string())),
        Some(p) if p <= 0.0 => Err(TradingError::Validation("Price must be positive".to_string())),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("BTCUSDT", true)]
    #[case("", false)]
    #[case("   ", false)]
    fn test_validate_symbol(#[case] symbol: &str, #[case] ok: bool) {
        assert_eq!(validate_symbol(symbol).is_ok(), ok);
    }

    #[rstest]
    #[case(0.001, true)]
    #[case(0.0, false)]
    #[case(-1.0, false)]
    #[case(f64::NAN, false)]
    #[case(f64::INFINITY, false)]
    fn test_validate_quantity(#[case] quantity: f64, #[case] ok: bool) {
        assert_eq!(validate_quantity(quantity).is_ok(), ok);
    }

    #[rstest]
    #[case(Some(85000.0), true)]
    #[case(None, false)]
    #[case(Some(0.0), false)]
    #[case(Some(-5.0), false)]
    #[case(Some(f64::NAN), false)]
    fn test_validate_limit_price(#[case] price: Option<f64>, #[case] ok: bool) {
        assert_eq!(validate_price(price, OrderType::Limit).is_ok(), ok);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(-5.0))]
    #[case(Some(f64::NAN))]
    fn test_market_price_never_required(#[case] price: Option<f64>) {
        assert!(validate_price(price, OrderType::Market).is_ok());
    }

    #[test]
    fn test_missing_limit_price_message() {
        let err = validate_price(None, OrderType::Limit).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Price is required for LIMIT orders");
        assert!(err.is_validation());
    }
}
