use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use demand_forecast::{FeatureEngine, ForecastConfig, RawWeeklyRecord};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn raw(
    product: &str,
    week: u32,
    bought: f64,
    sold: f64,
    price_bought: f64,
    price_sold: f64,
) -> RawWeeklyRecord {
    let start =
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::weeks(i64::from(week) - 1);
    RawWeeklyRecord {
        week,
        product_name: product.to_string(),
        price_bought,
        quantity_bought: bought,
        price_sold,
        quantity_sold: sold,
        start_date: start,
        end_date: start + Duration::days(6),
    }
}

/// Shuffled multi-product history with an uneven number of weeks each
fn history() -> Vec<RawWeeklyRecord> {
    vec![
        raw("Milk", 3, 130.0, 121.0, 1.0, 0.8),
        raw("Bread", 2, 60.0, 60.0, 2.0, 2.0),
        raw("Milk", 1, 120.0, 100.0, 1.0, 0.95),
        raw("Eggs", 5, 30.0, 12.0, 3.0, 2.5),
        raw("Bread", 1, 60.0, 55.0, 2.0, 1.7),
        raw("Milk", 2, 120.0, 110.0, 1.0, 0.9),
        raw("Bread", 4, 70.0, 0.0, 2.0, 2.0),
    ]
}

#[test]
fn test_week_index_is_dense_per_product() {
    let enhanced = FeatureEngine::default().enhance(&history());
    assert_eq!(enhanced.len(), 7);

    for product in ["Bread", "Eggs", "Milk"] {
        let rows: Vec<_> = enhanced.iter().filter(|r| r.product_name == product).collect();
        let indices: Vec<u32> = rows.iter().map(|r| r.week_index).collect();
        let expected: Vec<u32> = (1..=rows.len() as u32).collect();
        assert_eq!(indices, expected, "{}", product);
        assert!(rows.windows(2).all(|w| w[0].week < w[1].week));
    }
}

#[test]
fn test_output_ordered_by_product_then_week() {
    let enhanced = FeatureEngine::default().enhance(&history());
    let keys: Vec<(&str, u32)> = enhanced
        .iter()
        .map(|r| (r.product_name.as_str(), r.week))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("Bread", 1),
            ("Bread", 2),
            ("Bread", 4),
            ("Eggs", 5),
            ("Milk", 1),
            ("Milk", 2),
            ("Milk", 3),
        ]
    );
}

#[test]
fn test_derived_fields_null_only_in_first_week() {
    for record in FeatureEngine::default().enhance(&history()) {
        let first = record.week_index == 1;
        assert_eq!(record.cagr_units_sold.is_none(), first);
        assert_eq!(record.lag_qty.is_none(), first);
        assert_eq!(record.lag_price.is_none(), first);
        assert_eq!(record.price_elasticity.is_none(), first);
        assert_eq!(record.is_first_week(), first);
    }
}

#[test]
fn test_milk_growth_scenario() {
    let enhanced = FeatureEngine::default().enhance(&history());
    let milk: Vec<_> = enhanced.iter().filter(|r| r.product_name == "Milk").collect();

    assert!(milk.iter().all(|r| r.qty_base == 100.0));
    assert_relative_eq!(milk[1].cagr_units_sold.unwrap(), 0.10, epsilon = 1e-12);
    assert_relative_eq!(milk[2].cagr_units_sold.unwrap(), 0.10, epsilon = 1e-12);
    assert_eq!(milk[2].lag_qty, Some(110.0));
    assert_eq!(milk[2].lag_price, Some(0.9));
}

#[test]
fn test_zero_lag_quantity_substitutes_one() {
    let records = vec![
        raw("Tea", 1, 10.0, 0.0, 1.0, 1.0),
        raw("Tea", 2, 10.0, 4.0, 1.0, 0.4),
    ];
    let enhanced = FeatureEngine::default().enhance(&records);
    // pct_qty = (4 - 0) / 1, pct_price = (0.4 - 1.0) / 1.0
    assert_relative_eq!(enhanced[1].price_elasticity.unwrap(), 4.0 / -0.6, epsilon = 1e-12);
    // Qty_Base 0: CAGR divides by zero and goes non-finite
    assert!(!enhanced[1].cagr_units_sold.unwrap().is_finite());
}

#[rstest]
#[case(0.15, 1)]
#[case(0.12, 1)]
#[case(0.05, 0)]
#[case(-0.20, 0)]
fn test_promo_flag_threshold(#[case] rate: f64, #[case] expected: u8) {
    // Discount_Rate is (Price_Sold - Price_Bought) / Price_Bought
    let record = raw("Soap", 1, 10.0, 5.0, 1.0, 1.0 + rate);
    let enhanced = FeatureEngine::default().enhance(&[record]);
    assert_eq!(enhanced[0].promo_flag, expected);
}

#[test]
fn test_configured_promo_threshold() {
    let config = ForecastConfig {
        promo_threshold: 0.5,
        ..Default::default()
    };
    let record = raw("Soap", 1, 10.0, 5.0, 1.0, 1.3);
    let default_flag = FeatureEngine::default().enhance(&[record.clone()])[0].promo_flag;
    assert_eq!(default_flag, 1);
    assert_eq!(FeatureEngine::new(&config).enhance(&[record])[0].promo_flag, 0);
}

#[test]
fn test_stockout_flag() {
    let enhanced = FeatureEngine::default().enhance(&history());
    let bread_week_2 = enhanced
        .iter()
        .find(|r| r.product_name == "Bread" && r.week == 2)
        .unwrap();
    assert_eq!(bread_week_2.stockout_flag, 1);
    assert!(enhanced
        .iter()
        .filter(|r| r.quantity_sold != r.quantity_bought)
        .all(|r| r.stockout_flag == 0));
}

#[test]
fn test_enhance_is_idempotent() {
    let engine = FeatureEngine::default();
    let once = engine.enhance(&history());
    let raw_again: Vec<RawWeeklyRecord> = once.iter().map(|r| r.raw()).collect();
    let twice = engine.enhance(&raw_again);
    assert_eq!(once, twice);
    assert_eq!(engine.enhance(&history()), once);
}
