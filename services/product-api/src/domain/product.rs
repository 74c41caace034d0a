// 商品モデル
//
// 商品テーブルに保存される商品と、その数量別価格帯を定義する。

use serde::{Deserialize, Serialize};

/// 数量別の価格帯
///
/// テーブルには `PriceBrackets` 属性としてJSON配列文字列で保存される。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPriceBracket {
    /// この価格が適用される数量
    pub quantity: u32,
    /// 単価
    pub price: f64,
}

impl ProductPriceBracket {
    pub fn new(quantity: u32, price: f64) -> Self {
        Self { quantity, price }
    }
}

/// 商品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// 商品ID（テーブルのパーティションキー）
    pub product_id: String,
    /// 商品名
    pub name: String,
    /// 基本価格
    pub price: f64,
    /// 数量別価格帯
    #[serde(default)]
    pub price_brackets: Vec<ProductPriceBracket>,
}

impl Product {
    /// 価格帯なしの商品を作成
    pub fn new(product_id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            price,
            price_brackets: Vec::new(),
        }
    }

    /// 価格帯を設定
    pub fn with_price_brackets(mut self, price_brackets: Vec<ProductPriceBracket>) -> Self {
        self.price_brackets = price_brackets;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_product_has_no_brackets() {
        let product = Product::new("p-1", "Widget", 12.5);

        assert_eq!(product.product_id, "p-1");
        assert_eq!(product.name, "Widget");
        assert_eq!(product.price, 12.5);
        assert!(product.price_brackets.is_empty());
    }

    #[test]
    fn test_price_bracket_json_shape() {
        let json = serde_json::to_string(&ProductPriceBracket::new(10, 9.5)).unwrap();
        assert_eq!(json, r#"{"quantity":10,"price":9.5}"#);
    }

    #[test]
    fn test_product_json_uses_camel_case() {
        let product = Product::new("p-1", "Widget", 12.5)
            .with_price_brackets(vec![ProductPriceBracket::new(5, 11.0)]);
        let value = serde_json::to_value(&product).unwrap();

        assert_eq!(value["productId"], "p-1");
        assert_eq!(value["priceBrackets"][0]["quantity"], 5);
    }
}
