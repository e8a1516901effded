//! HTML 주문 폼 페이지

use crate::error::TradingError;
use crate::models::order::{OrderRequest, OrderResult};

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:2rem auto}\
label{display:block;margin:.5rem 0}.ok{color:#1a7f37}.err{color:#cf222e}";

fn page(title: &str, body: &str) -> String {
  format!(
    "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title>\
     <style>{STYLE}</style></head><body><h1>Binance Futures Trading Bot</h1>{body}</body></html>"
  )
}

/// 사용자 입력을 HTML에 넣기 전 이스케이프
pub fn escape(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  for c in input.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}

/// 주문 입력 폼
pub fn order_form() -> String {
  page(
    "Place Order",
    "<form method=\"post\" action=\"/form/order\">\
     <label>Symbol <input name=\"symbol\" value=\"BTCUSDT\"></label>\
     <label>Side <select name=\"side\"><option>BUY</option><option>SELL</option></select></label>\
     <label>Order Type <select name=\"type\"><option>MARKET</option><option>LIMIT</option></select></label>\
     <label>Quantity <input name=\"quantity\" value=\"0.01\"></label>\
     <label>Price (LIMIT only) <input name=\"price\" value=\"\"></label>\
     <button type=\"submit\">Place Order</button></form>",
  )
}

fn request_summary(request: &OrderRequest) -> String {
  let mut html = format!(
    "<h2>Order Request Summary</h2><ul><li><b>Symbol:</b> {}</li><li><b>Side:</b> {}</li>\
     <li><b>Type:</b> {}</li><li><b>Quantity:</b> {}</li>",
    escape(request.symbol()),
    request.side(),
    request.order_type(),
    request.quantity()
  );
  if let Some(price) = request.price() {
    html.push_str(&format!("<li><b>Price:</b> {}</li>", price));
  }
  html.push_str("</ul>");
  html
}

/// 주문 성공 페이지
pub fn order_placed(request: &OrderRequest, result: &OrderResult) -> String {
  let mut html = request_summary(request);
  html.push_str(&format!(
    "<h2>Order Response</h2><ul><li><b>Order ID:</b> {}</li><li><b>Status:</b> {}</li>\
     <li><b>Executed Qty:</b> {}</li>",
    escape(&result.order_id.0),
    escape(&result.status),
    result.executed_quantity
  ));
  if let Some(price) = result.display_price() {
    html.push_str(&format!("<li><b>Avg Price:</b> {}</li>", price));
  }
  html.push_str("</ul><p class=\"ok\">&#10003; Order placed successfully</p><a href=\"/\">New order</a>");
  page("Order Placed", &html)
}

/// 주문 실패 페이지 (검증 실패 시 요청 요약 없음)
pub fn order_failed(request: Option<&OrderRequest>, error: &TradingError) -> String {
  let mut html = request.map(request_summary).unwrap_or_default();
  html.push_str(&format!(
    "<h2>Order Failed</h2><p class=\"err\">&#10007; {}</p><a href=\"/\">Back</a>",
    escape(&error.to_string())
  ));
  page("Order Failed", &html)
}
