//! Alias tables mapping Fmarket payloads onto canonical records.

use serde_json::Value;
use vietfin_core::alias::{FieldAlias, RecordVariant};
use vietfin_core::records::{FundHolding, FundInfo, FundNav};

type ParseResult = std::result::Result<Value, String>;

/// Reduces a nested `{"name": ..}` object to its name.
fn nested_name(value: Value) -> ParseResult {
    match value {
        Value::Object(mut object) => Ok(object.remove("name").unwrap_or(Value::Null)),
        other => Ok(other),
    }
}

/// Rows of `products/filter`.
#[derive(Debug)]
pub struct FmarketFundInfo;

impl RecordVariant for FmarketFundInfo {
    type Record = FundInfo;
    const NAME: &'static str = "FmarketFundInfo";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("fund_id", "id"),
        FieldAlias::new("short_name", "shortName"),
        FieldAlias::new("inception_date", "firstIssueAt"),
        FieldAlias::new("management_fee", "managementFee"),
        FieldAlias::parsed("fund_owner", "owner", nested_name),
        FieldAlias::parsed("fund_type", "dataFundAssetType", nested_name),
    ];
}

/// Rows of `product/get-nav-history`.
#[derive(Debug)]
pub struct FmarketFundNav;

impl RecordVariant for FmarketFundNav {
    type Record = FundNav;
    const NAME: &'static str = "FmarketFundNav";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("date_nav", "navDate"),
        FieldAlias::new("nav_per_share", "nav"),
        FieldAlias::new("fund_id", "productId"),
    ];
}

/// Entries of `productTopHoldingList` and `productTopHoldingBondList`.
#[derive(Debug)]
pub struct FmarketFundHolding;

impl RecordVariant for FmarketFundHolding {
    type Record = FundHolding;
    const NAME: &'static str = "FmarketFundHolding";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("stock_code", "stockCode"),
        FieldAlias::new("weight", "netAssetPercent"),
        FieldAlias::new("asset_category", "type"),
        FieldAlias::new("update_at", "updateAt"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fund_info_flattens_nested_names() {
        let fund = FmarketFundInfo::parse_value(json!({
            "id": 23,
            "shortName": "DCDS",
            "name": "Quỹ Đầu tư Chứng khoán Năng động DC",
            "firstIssueAt": 1_136_073_600_000_i64,
            "managementFee": 1.95,
            "nav": 80123.4,
            "owner": {"id": 3, "name": "DRAGON CAPITAL"},
            "dataFundAssetType": {"id": 1, "name": "Quỹ cổ phiếu"}
        }))
        .unwrap();

        assert_eq!(fund.fund_id, 23);
        assert_eq!(fund.fund_owner.as_deref(), Some("DRAGON CAPITAL"));
        assert_eq!(fund.fund_type.as_deref(), Some("Quỹ cổ phiếu"));
        assert_eq!(
            fund.inception_date.map(|d| d.date_naive().to_string()),
            Some("2006-01-01".to_string())
        );
    }

    #[test]
    fn test_missing_owner_is_none() {
        let fund = FmarketFundInfo::parse_value(json!({
            "id": 7, "shortName": "VFF", "name": "Vinacapital Fixed Income", "owner": null
        }))
        .unwrap();
        assert_eq!(fund.fund_owner, None);
        assert_eq!(fund.nav, None);
    }

    #[test]
    fn test_holding_weight() {
        let holding = FmarketFundHolding::parse_value(json!({
            "stockCode": "FPT", "industry": "Công nghệ", "netAssetPercent": 8.6,
            "type": "STOCK", "updateAt": 1_704_067_200_000_i64
        }))
        .unwrap();
        assert_eq!(holding.weight, 8.6);
        assert_eq!(holding.asset_category.as_deref(), Some("STOCK"));
    }
}
