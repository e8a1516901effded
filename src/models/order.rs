use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TradingError;
use crate::order_core::validator;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, Hash, PartialEq)]
pub struct OrderId(pub String);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = TradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            _ => Err(TradingError::Validation("Side must be 'BUY' or 'SELL'".to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = TradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MARKET" => Ok(OrderType::Market),
            "LIMIT" => Ok(OrderType::Limit),
            _ => Err(TradingError::Validation("Order type must be 'MARKET' or 'LIMIT'".to_string())),
        }
    }
}

/// Validated order request, built through [`OrderRequest::new`] or the
/// `market`/`limit` shorthands. TWAP chunks come from [`TwapPlan::chunk_request`].
///
/// [`TwapPlan::chunk_request`]: crate::models::twap::TwapPlan::chunk_request
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderRequest {
    symbol: String,
    side: OrderSide,
    order_type: OrderType,
    quantity: f64,
    price: Option<f64>,
}

impl OrderRequest {
    pub fn new(
        symbol: impl Into<String>,
        side: OrderSide,
        order_type: OrderType,
        quantity: f64,
        price: Option<f64>,
    ) -> Result<Self, TradingError> {
        let symbol = symbol.into();
        validator::validate_symbol(&symbol)?;
        validator::validate_quantity(quantity)?;
        validator::validate_price(price, order_type)?;

        // MARKET orders never carry a price to the exchange
        let price = match order_type {
            OrderType::Market => None,
            OrderType::Limit => price,
        };

        Ok(OrderRequest {
            symbol,
            side,
            order_type,
            quantity,
            price,
        })
    }

    /// Build from loosely typed front-end input (side/type as text)
    pub fn from_parts(
        symbol: &str,
        side: &str,
        order_type: &str,
        quantity: f64,
        price: Option<f64>,
    ) -> Result<Self, TradingError> {
        let side = side.parse::<OrderSide>()?;
        let order_type = order_type.parse::<OrderType>()?;
        Self::new(symbol.trim(), side, order_type, quantity, price)
    }

    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: f64) -> Result<Self, TradingError> {
        Self::new(symbol, side, OrderType::Market, quantity, None)
    }

    pub fn limit(symbol: impl Into<String>, side: OrderSide, quantity: f64, price: f64) -> Result<Self, TradingError> {
        Self::new(symbol, side, OrderType::Limit, quantity, Some(price))
    }

    /// TWAP 분할 주문. 계획 생성 때 검증된 심볼을 쓰고, 분할 수량은 그대로 거래소로 넘긴다.
    pub(crate) fn chunk(symbol: &str, side: OrderSide, quantity: f64) -> Self {
        OrderRequest {
            symbol: symbol.to_string(),
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn side(&self) -> OrderSide {
        self.side
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn price(&self) -> Option<f64> {
        self.price
    }
}

impl fmt::Display for OrderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.symbol, self.side, self.order_type, self.quantity)?;
        if let Some(price) = self.price {
            write!(f, " @ {}", price)?;
        }
        Ok(())
    }
}

/// Exchange acknowledgement for one accepted order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderResult {
    pub order_id: OrderId,
    pub status: String,
    pub executed_quantity: f64,
    pub average_price: Option<f64>,
}

impl OrderResult {
    /// Average fill price worth showing to an operator. Zero means unfilled.
    pub fn display_price(&self) -> Option<f64> {
        self.average_price.filter(|p| *p > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_and_type_parse_case_insensitive() {
        assert_eq!("buy".parse::<OrderSide>().unwrap(), OrderSide::Buy);
        assert_eq!(" SELL ".parse::<OrderSide>().unwrap(), OrderSide::Sell);
        assert_eq!("limit".parse::<OrderType>().unwrap(), OrderType::Limit);
        assert!("HOLD".parse::<OrderSide>().is_err());
        assert!("STOP".parse::<OrderType>().is_err());
    }

    #[test]
    fn test_market_request_drops_price() {
        let request = OrderRequest::new("BTCUSDT", OrderSide::Buy, OrderType::Market, 0.01, Some(85000.0)).unwrap();
        assert_eq!(request.price(), None);
        assert_eq!(request.to_string(), "BTCUSDT BUY MARKET 0.01");
    }

    #[test]
    fn test_limit_request_keeps_price() {
        let request = OrderRequest::limit("BTCUSDT", OrderSide::Sell, 0.5, 85000.0).unwrap();
        assert_eq!(request.price(), Some(85000.0));
        assert_eq!(request.to_string(), "BTCUSDT SELL LIMIT 0.5 @ 85000");
    }

    #[test]
    fn test_from_parts() {
        let request = OrderRequest::from_parts(" BTCUSDT ", "sell", "limit", 2.0, Some(100.0)).unwrap();
        assert_eq!(request.symbol(), "BTCUSDT");
        assert_eq!(request.side(), OrderSide::Sell);
        assert_eq!(request.order_type(), OrderType::Limit);

        assert!(OrderRequest::from_parts("BTCUSDT", "long", "MARKET", 1.0, None).is_err());
        assert!(OrderRequest::from_parts("BTCUSDT", "BUY", "LIMIT", 1.0, None).is_err());
    }

    #[test]
    fn test_display_price_hides_zero() {
        let mut result = OrderResult {
            order_id: OrderId("1".into()),
            status: "NEW".into(),
            executed_quantity: 0.0,
            average_price: Some(0.0),
        };
        assert_eq!(result.display_price(), None);

        result.average_price = None;
        assert_eq!(result.display_price(), None);

        result.average_price = Some(85010.5);
        assert_eq!(result.display_price(), Some(85010.5));
    }
}
